use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::ApiError,
    model::attendance::{AttendanceAction, AttendanceRecord},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    /// Exactly "check-in" or "check-out"
    #[schema(example = "check-in")]
    pub action: String,
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// "today" narrows to the current day; anything else returns everything
    pub filter: Option<String>,
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let today_only = query
        .filter
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("today"));

    let sql = if today_only {
        r#"
        SELECT id, employee_id, action, timestamp
        FROM attendance
        WHERE timestamp >= CURDATE()
        ORDER BY timestamp DESC
        "#
    } else {
        r#"
        SELECT id, employee_id, action, timestamp
        FROM attendance
        ORDER BY timestamp DESC
        "#
    };

    let records = sqlx::query_as::<_, AttendanceRecord>(sql)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(records))
}

/// Record a check-in or check-out
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Unknown action or missing employee id"),
        (status = 403, description = "Requires Admin, Manager or Office Staff")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::CreateAttendance)?;

    let employee_id = payload.employee_id.trim();
    if employee_id.is_empty() {
        return Err(ApiError::validation("employee_id is required"));
    }

    let action: AttendanceAction = payload
        .action
        .parse()
        .map_err(|_| ApiError::validation("action must be \"check-in\" or \"check-out\""))?;

    let result = sqlx::query("INSERT INTO attendance (employee_id, action) VALUES (?, ?)")
        .bind(employee_id)
        .bind(action.to_string())
        .execute(pool.get_ref())
        .await?;

    // Re-read for the server-assigned timestamp
    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT id, employee_id, action, timestamp FROM attendance WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id", description = "Attendance record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeleteAttendance)?;

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("attendance record not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance record deleted successfully" })))
}
