use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
        policy::{self, Action},
    },
    config::Config,
    error::{ApiError, is_unique_violation},
    model::role::Role,
    models::{AccountResponse, AccountSql, LoginReq, RegisterReq, TokenType},
    utils::{account_cache, validation::is_valid_email},
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOwnAccountReq {
    #[schema(example = "jane", nullable = true)]
    pub username: Option<String>,
    #[schema(example = "jane@company.com", nullable = true)]
    pub email: Option<String>,
    /// Current password; required when setting `new_password`.
    pub password: Option<String>,
    pub new_password: Option<String>,
    /// Always rejected here; role changes go through the account-management
    /// endpoint, by someone else.
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAccountRoleReq {
    #[schema(example = "Manager")]
    pub role: String,
}

fn bearer_token(req: &HttpRequest) -> Result<&str, ApiError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))
}

/// Inserts a new account and keeps the taken-username cache warm.
async fn insert_account(
    username: &str,
    email: Option<&str>,
    password: &str,
    role: Role,
    pool: &MySqlPool,
) -> Result<(), ApiError> {
    let hashed = hash_password(password);

    let result = sqlx::query(
        r#"INSERT INTO accounts (username, email, password, role) VALUES (?, ?, ?, ?)"#,
    )
    .bind(username)
    .bind(email)
    .bind(hashed)
    .bind(role.as_str())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            account_cache::mark_taken(username).await;
            Ok(())
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::validation("username or email already exists"))
        }
        Err(e) => {
            error!(error = %e, "Failed to insert account");
            Err(ApiError::Internal)
        }
    }
}

/// true  => username (and email, when given) AVAILABLE
/// false => TAKEN
async fn is_account_available(username: &str, email: Option<&str>, pool: &MySqlPool) -> bool {
    // Fast positive from the in-memory cache
    if account_cache::is_taken(username).await {
        return false;
    }

    // Database fallback, which also covers the email column
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM accounts
            WHERE username = ? OR (email IS NOT NULL AND email = ?)
            LIMIT 1
        )
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Log in with username + password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Session"
)]
#[instrument(name = "auth_login", skip(pool, config, body), fields(username = %body.username))]
pub async fn login(
    body: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    debug!("Fetching account");

    let account = sqlx::query_as::<_, AccountSql>(
        r#"
        SELECT id, username, email, password, role
        FROM accounts
        WHERE username = ?
        "#,
    )
    .bind(&body.username)
    .fetch_optional(pool.get_ref())
    .await?
    // Unknown username and wrong password are indistinguishable on purpose.
    .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !verify_password(&body.password, &account.password) {
        info!("Invalid credentials: password mismatch");
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    debug!("Password verified, issuing tokens");

    let access_token = generate_access_token(
        account.id,
        &account.username,
        &account.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        account.id,
        &account.username,
        &account.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(account_id = account.id, jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (account_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(account.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    // Non-fatal; feeds the availability-cache warmup
    if let Err(e) = sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = ?")
        .bind(account.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    account_cache::mark_taken(&account.username).await;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token,
        refresh_token,
    }))
}

/// Rotate a refresh token into a fresh token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPairResponse),
        (status = 401, description = "Missing, revoked, or non-refresh token")
    ),
    tag = "Session"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&req)?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("invalid or expired token"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::unauthorized("refresh token required"));
    }

    let record = sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, account_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let (token_id, account_id) = match record {
        Some((id, account_id, false)) => (id, account_id),
        _ => return Err(ApiError::unauthorized("refresh token revoked or unknown")),
    };

    // Revoke before reissuing; a replayed token must find this row dead.
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(token_id)
        .execute(pool.get_ref())
        .await?;

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.account_id,
        &claims.sub,
        &claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (account_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(account_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    let access_token = generate_access_token(
        claims.account_id,
        &claims.sub,
        &claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token,
        refresh_token: new_refresh_token,
    }))
}

/// Log out by revoking the presented refresh token. Always succeeds.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out (idempotent)")),
    tag = "Session"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let Ok(token) = bearer_token(&req) else {
        return HttpResponse::NoContent().finish();
    };

    let Ok(claims) = verify_token(token, &config.jwt_secret) else {
        return HttpResponse::NoContent().finish();
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // Idempotent; success even if the token was never stored
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

/// Fetch the requester's own account
#[utoipa::path(
    get,
    path = "/api/accounts/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn current_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let account = sqlx::query_as::<_, AccountResponse>(
        r#"
        SELECT id, username, email, role, created_at, last_login_at
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(auth.account_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found("account not found"))?;

    Ok(HttpResponse::Ok().json(account))
}

/// Update the requester's own profile. Role changes are refused here.
#[utoipa::path(
    put,
    path = "/api/accounts/me",
    request_body = UpdateOwnAccountReq,
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Wrong current password"),
        (status = 403, description = "Attempted self role change")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_own_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdateOwnAccountReq>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(
        auth.role,
        &Action::UpdateOwnAccount {
            changes_role: body.role.is_some(),
        },
    )?;

    let account = sqlx::query_as::<_, AccountSql>(
        r#"
        SELECT id, username, email, password, role
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(auth.account_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found("account not found"))?;

    let username = match &body.username {
        Some(u) => {
            let trimmed = u.trim();
            if trimmed.chars().count() < 3 {
                return Err(ApiError::validation("username must be at least 3 characters"));
            }
            trimmed.to_string()
        }
        None => account.username.clone(),
    };

    let email = match &body.email {
        Some(e) => {
            if !is_valid_email(e) {
                return Err(ApiError::validation("email address is not valid"));
            }
            Some(e.clone())
        }
        None => account.email.clone(),
    };

    let password_hash = match &body.new_password {
        Some(new_password) => {
            if new_password.len() < 6 {
                return Err(ApiError::validation("password must be at least 6 characters"));
            }
            let current = body
                .password
                .as_deref()
                .ok_or_else(|| ApiError::validation("current password is required"))?;
            if !verify_password(current, &account.password) {
                return Err(ApiError::unauthorized("invalid current password"));
            }
            hash_password(new_password)
        }
        None => account.password.clone(),
    };

    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET username = ?, email = ?, password = ?
        WHERE id = ?
        "#,
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(auth.account_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            account_cache::mark_taken(&username).await;
            Ok(HttpResponse::Ok().json(json!({ "message": "Account updated successfully" })))
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::validation("username or email already exists"))
        }
        Err(e) => Err(ApiError::from(e)),
    }
}

/// List all accounts, passwords excluded
#[utoipa::path(
    get,
    path = "/api/accounts",
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse]),
        (status = 403, description = "Requires Admin or Support")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_accounts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::ListAccounts)?;

    let accounts = sqlx::query_as::<_, AccountResponse>(
        r#"
        SELECT id, username, email, role, created_at, last_login_at
        FROM accounts
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(accounts))
}

/// Create an account (no self-registration; Admin/Support only)
#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation failed or duplicate"),
        (status = 403, description = "Policy denial")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn register(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<RegisterReq>,
) -> Result<HttpResponse, ApiError> {
    let new_role = match body.role.as_deref() {
        None => Role::OfficeStaff,
        Some(name) => {
            Role::from_name(name).ok_or_else(|| ApiError::validation("unknown role"))?
        }
    };

    policy::authorize(auth.role, &Action::CreateAccount { new_role })?;

    let username = body.username.trim();
    if username.chars().count() < 3 {
        return Err(ApiError::validation("username must be at least 3 characters"));
    }
    if body.password.len() < 6 {
        return Err(ApiError::validation("password must be at least 6 characters"));
    }
    if let Some(email) = &body.email {
        if !is_valid_email(email) {
            return Err(ApiError::validation("email address is not valid"));
        }
    }

    if !is_account_available(username, body.email.as_deref(), pool.get_ref()).await {
        return Err(ApiError::validation("username or email already exists"));
    }

    // Safe to insert after the availability check; a losing race still
    // surfaces as a duplicate-key validation failure inside insert_account.
    insert_account(username, body.email.as_deref(), &body.password, new_role, pool.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(json!({ "message": "Account created successfully" })))
}

/// Reassign an account's role
#[utoipa::path(
    put,
    path = "/api/accounts/{id}",
    params(("id", description = "Account ID")),
    request_body = UpdateAccountRoleReq,
    responses(
        (status = 200, description = "Role updated"),
        (status = 403, description = "Policy denial"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn update_account_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateAccountRoleReq>,
) -> Result<HttpResponse, ApiError> {
    let target_id = path.into_inner();

    let new_role =
        Role::from_name(&body.role).ok_or_else(|| ApiError::validation("unknown role"))?;

    let target = sqlx::query_as::<_, (u64, String)>("SELECT id, role FROM accounts WHERE id = ?")
        .bind(target_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("account not found"))?;

    policy::authorize(
        auth.role,
        &Action::UpdateAccountRole {
            target_is_self: target.0 == auth.account_id,
            target_role: Role::from_name(&target.1),
            new_role,
        },
    )?;

    sqlx::query("UPDATE accounts SET role = ? WHERE id = ?")
        .bind(new_role.as_str())
        .bind(target_id)
        .execute(pool.get_ref())
        .await?;

    info!(target_id, new_role = new_role.as_str(), "Account role updated");

    Ok(HttpResponse::Ok().json(json!({ "message": "Account role updated successfully" })))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    params(("id", description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 403, description = "Policy denial"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn delete_account(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let target_id = path.into_inner();

    let target = sqlx::query_as::<_, (u64, String)>("SELECT id, role FROM accounts WHERE id = ?")
        .bind(target_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("account not found"))?;

    policy::authorize(
        auth.role,
        &Action::DeleteAccount {
            target_is_self: target.0 == auth.account_id,
            target_role: Role::from_name(&target.1),
        },
    )?;

    sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(target_id)
        .execute(pool.get_ref())
        .await?;

    info!(target_id, "Account deleted");

    Ok(HttpResponse::Ok().json(json!({ "message": "Account deleted successfully" })))
}
