use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn make_claims(
    account_id: u64,
    username: &str,
    role: &str,
    ttl: usize,
    token_type: TokenType,
) -> Claims {
    Claims {
        account_id,
        sub: username.to_string(),
        role: role.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 signing cannot fail")
}

pub fn generate_access_token(
    account_id: u64,
    username: &str,
    role: &str,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = make_claims(account_id, username, role, ttl, TokenType::Access);
    sign(&claims, secret)
}

/// Refresh tokens also hand back their claims so the caller can persist the
/// `jti` for later revocation.
pub fn generate_refresh_token(
    account_id: u64,
    username: &str,
    role: &str,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = make_claims(account_id, username, role, ttl, TokenType::Refresh);
    let token = sign(&claims, secret);
    (token, claims)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(7, "jane", "Office Staff", SECRET, 900);
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.account_id, 7);
        assert_eq!(claims.sub, "jane");
        assert_eq!(claims.role, "Office Staff");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_token_claims_match_the_signed_token() {
        let (token, claims) = generate_refresh_token(7, "jane", "Admin", SECRET, 3600);
        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.token_type, TokenType::Refresh);
    }

    #[test]
    fn rejects_wrong_secret_and_tampering() {
        let token = generate_access_token(7, "jane", "Admin", SECRET, 900);
        assert!(verify_token(&token, "other-secret").is_err());

        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        // Well past the default 60s validation leeway.
        let claims = Claims {
            account_id: 7,
            sub: "jane".into(),
            role: "Admin".into(),
            exp: now() - 120,
            jti: "x".into(),
            token_type: TokenType::Access,
        };
        let token = sign(&claims, SECRET);
        assert!(verify_token(&token, SECRET).is_err());
    }
}
