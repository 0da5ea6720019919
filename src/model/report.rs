use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Report {
    #[schema(example = 1)]
    pub id: u64,

    #[serde(rename = "type")]
    #[schema(example = "Employee")]
    pub report_type: String,

    #[schema(example = "Monthly head-count summary")]
    pub details: String,

    #[schema(value_type = String, format = "date-time")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
pub enum ReportType {
    Employee,
    Attendance,
    Payroll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_types() {
        assert_eq!("Employee".parse::<ReportType>().ok(), Some(ReportType::Employee));
        assert_eq!("Attendance".parse::<ReportType>().ok(), Some(ReportType::Attendance));
        assert_eq!("Payroll".parse::<ReportType>().ok(), Some(ReportType::Payroll));
    }

    #[test]
    fn rejects_unknown_types() {
        assert!("employee".parse::<ReportType>().is_err());
        assert!("Expense".parse::<ReportType>().is_err());
    }
}
