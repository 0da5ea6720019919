use crate::api::attendance::CreateAttendance;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::feedback::CreateFeedback;
use crate::api::payroll::CreatePayroll;
use crate::api::report::CreateReport;
use crate::api::search::SearchResult;
use crate::api::settings::UpdateSettings;
use crate::auth::handlers::{TokenPairResponse, UpdateAccountRoleReq, UpdateOwnAccountReq};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::feedback::FeedbackItem;
use crate::model::payroll::PayrollEntry;
use crate::model::report::Report;
use crate::model::settings::SettingsRecord;
use crate::models::{AccountResponse, LoginReq, RegisterReq};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Dashboard API",
        version = "1.0.0",
        description = r#"
## HRM Dashboard backend

Record-keeping for employees, attendance, payroll, reports and feedback, plus
role-gated account management and a global settings store.

### 🔐 Security
All routes except the session endpoints require a **JWT Bearer** access token.
Account management is restricted to **Admin** and **Support**; a single
access-control policy decides every gated operation.

### 📦 Response format
JSON throughout. Failures carry `{"error", "message"}` with one of five error
kinds: `unauthorized`, `forbidden`, `validation-failed`, `not-found`,
`internal`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::current_account,
        crate::auth::handlers::update_own_account,
        crate::auth::handlers::list_accounts,
        crate::auth::handlers::register,
        crate::auth::handlers::update_account_role,
        crate::auth::handlers::delete_account,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::list_attendance,
        crate::api::attendance::create_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::payroll::list_payrolls,
        crate::api::payroll::create_payroll,
        crate::api::payroll::delete_payroll,

        crate::api::report::list_reports,
        crate::api::report::create_report,
        crate::api::report::delete_report,

        crate::api::feedback::create_feedback,
        crate::api::feedback::delete_feedback,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,
        crate::api::settings::delete_settings,

        crate::api::search::search,
    ),
    components(
        schemas(
            LoginReq,
            RegisterReq,
            TokenPairResponse,
            UpdateOwnAccountReq,
            UpdateAccountRoleReq,
            AccountResponse,
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeListResponse,
            AttendanceRecord,
            CreateAttendance,
            PayrollEntry,
            CreatePayroll,
            Report,
            CreateReport,
            FeedbackItem,
            CreateFeedback,
            SettingsRecord,
            UpdateSettings,
            SearchResult
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Login, token refresh, logout"),
        (name = "Account", description = "Role-gated account management"),
        (name = "Employee", description = "Employee records"),
        (name = "Attendance", description = "Check-in / check-out records"),
        (name = "Payroll", description = "Payroll entries"),
        (name = "Report", description = "Generated reports"),
        (name = "Feedback", description = "User feedback"),
        (name = "Settings", description = "Global settings singleton"),
        (name = "Search", description = "Cross-entity search"),
    )
)]
pub struct ApiDoc;
