use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "jane")]
    pub username: String,
    #[schema(example = "hunter22")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "jane")]
    pub username: String,
    #[schema(example = "jane@company.com", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "hunter22")]
    pub password: String,
    /// Defaults to "Office Staff" when absent.
    #[schema(example = "Manager", nullable = true)]
    pub role: Option<String>,
}

/// Full account row, password hash included. Never serialized.
#[derive(FromRow)]
pub struct AccountSql {
    pub id: u64,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: String,
}

/// Public view of an account, what list/me endpoints return.
#[derive(Serialize, FromRow, ToSchema)]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "jane")]
    pub username: String,
    #[schema(example = "jane@company.com", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "Manager")]
    pub role: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: u64,
    pub sub: String,
    /// Role name as stored; parsed (and possibly rejected) by the policy,
    /// not here.
    pub role: String,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
