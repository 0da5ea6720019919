use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    /// Opaque reference, no foreign key behind it.
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "check-in")]
    pub action: String,

    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// The only two accepted attendance actions. Parsing is exact; "checkin"
/// or "Check-In" are validation failures, never coerced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
pub enum AttendanceAction {
    #[strum(serialize = "check-in")]
    CheckIn,
    #[strum(serialize = "check-out")]
    CheckOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_actions() {
        assert_eq!(
            "check-in".parse::<AttendanceAction>().ok(),
            Some(AttendanceAction::CheckIn)
        );
        assert_eq!(
            "check-out".parse::<AttendanceAction>().ok(),
            Some(AttendanceAction::CheckOut)
        );
    }

    #[test]
    fn rejects_near_misses() {
        assert!("checkin".parse::<AttendanceAction>().is_err());
        assert!("Check-In".parse::<AttendanceAction>().is_err());
        assert!("check-out ".parse::<AttendanceAction>().is_err());
        assert!("".parse::<AttendanceAction>().is_err());
    }
}
