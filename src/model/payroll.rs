use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayrollEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = 50000.0)]
    pub amount: f64,

    #[schema(example = "Monthly")]
    pub period: String,

    #[schema(value_type = String, format = "date-time")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
pub enum Period {
    Monthly,
    Quarterly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_periods() {
        assert_eq!("Monthly".parse::<Period>().ok(), Some(Period::Monthly));
        assert_eq!("Quarterly".parse::<Period>().ok(), Some(Period::Quarterly));
    }

    #[test]
    fn rejects_other_spellings() {
        assert!("monthly".parse::<Period>().is_err());
        assert!("Weekly".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }
}
