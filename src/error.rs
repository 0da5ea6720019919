use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::auth::policy::DenyReason;

/// The five failure kinds every handler maps to. Policy and validation
/// failures are decided before any mutation; storage failures surface as
/// `Internal` with the cause logged where it happened.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "insufficient permissions")]
    Forbidden(DenyReason),

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "unexpected storage failure")]
    Internal,
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Validation(_) => "validation-failed",
            ApiError::NotFound(_) => "not-found",
            ApiError::Internal => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let ApiError::Forbidden(reason) = self {
            body["reason"] = json!(reason.code());
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// MySQL reports duplicate unique keys under SQLSTATE 23000; creation
/// handlers turn that into a validation failure instead of `internal`.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23000"))
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "storage operation failed");
        ApiError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_the_taxonomy() {
        assert_eq!(ApiError::unauthorized("x").kind(), "unauthorized");
        assert_eq!(ApiError::Forbidden(DenyReason::SelfAction).kind(), "forbidden");
        assert_eq!(ApiError::validation("x").kind(), "validation-failed");
        assert_eq!(ApiError::not_found("x").kind(), "not-found");
        assert_eq!(ApiError::Internal.kind(), "internal");
    }

    #[test]
    fn status_codes_match_kinds() {
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden(DenyReason::Role).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
