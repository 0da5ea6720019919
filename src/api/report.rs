use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::ApiError,
    model::report::{Report, ReportType},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateReport {
    /// Exactly "Employee", "Attendance" or "Payroll"
    #[serde(rename = "type")]
    #[schema(example = "Employee")]
    pub report_type: String,
    #[schema(example = "Monthly head-count summary")]
    pub details: String,
}

/// List reports
#[utoipa::path(
    get,
    path = "/api/reports",
    responses((status = 200, description = "All reports", body = [Report])),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn list_reports(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let reports = sqlx::query_as::<_, Report>(
        "SELECT id, report_type, details, date FROM reports ORDER BY date DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(reports))
}

/// Create a report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReport,
    responses(
        (status = 201, description = "Report created", body = Report),
        (status = 400, description = "Unknown report type or empty details"),
        (status = 403, description = "Requires Admin or Manager")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn create_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateReport>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::CreateReport)?;

    let report_type: ReportType = payload.report_type.parse().map_err(|_| {
        ApiError::validation("type must be \"Employee\", \"Attendance\" or \"Payroll\"")
    })?;

    if payload.details.trim().is_empty() {
        return Err(ApiError::validation("details are required"));
    }

    let result = sqlx::query("INSERT INTO reports (report_type, details) VALUES (?, ?)")
        .bind(report_type.to_string())
        .bind(payload.details.trim())
        .execute(pool.get_ref())
        .await?;

    let report = sqlx::query_as::<_, Report>(
        "SELECT id, report_type, details, date FROM reports WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(report))
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id", description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn delete_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeleteReport)?;

    let result = sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("report not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Report deleted successfully" })))
}
