use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct FeedbackItem {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "The dashboard chart is off by one day")]
    pub message: String,

    #[schema(example = "reporter@company.com", nullable = true)]
    pub email: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub date: DateTime<Utc>,
}
