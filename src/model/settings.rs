use serde::Serialize;
use utoipa::ToSchema;

/// System-wide defaults, materialized lazily on first fetch.
pub const DEFAULT_THEME: &str = "Dark";
pub const DEFAULT_NOTIFICATIONS: bool = true;
pub const DEFAULT_CURRENCY: &str = "USD";

/// Logical singleton: at most one row is meant to exist; the first row wins
/// everywhere it is read.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct SettingsRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Dark")]
    pub theme: String,

    #[schema(example = true)]
    pub notifications: bool,

    #[schema(example = "USD")]
    pub currency: String,
}
