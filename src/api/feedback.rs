use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::ApiError,
    model::feedback::FeedbackItem,
    utils::validation::is_valid_email,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateFeedback {
    #[schema(example = "The dashboard chart is off by one day")]
    pub message: String,
    #[schema(example = "reporter@company.com", nullable = true)]
    pub email: Option<String>,
}

/// Submit feedback. Any authenticated role may.
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = CreateFeedback,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackItem),
        (status = 400, description = "Empty message or malformed email")
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn create_feedback(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateFeedback>,
) -> Result<HttpResponse, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::validation("message is required"));
    }
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            return Err(ApiError::validation("email address is not valid"));
        }
    }

    let result = sqlx::query("INSERT INTO feedback (message, email) VALUES (?, ?)")
        .bind(payload.message.trim())
        .bind(payload.email.as_deref())
        .execute(pool.get_ref())
        .await?;

    let item = sqlx::query_as::<_, FeedbackItem>(
        "SELECT id, message, email, date FROM feedback WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(item))
}

/// Delete a feedback item
#[utoipa::path(
    delete,
    path = "/api/feedback/{id}",
    params(("id", description = "Feedback ID")),
    responses(
        (status = 200, description = "Feedback deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Feedback not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn delete_feedback(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeleteFeedback)?;

    let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("feedback not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Feedback deleted successfully" })))
}
