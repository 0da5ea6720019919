use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::ApiError,
    model::payroll::{PayrollEntry, Period},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = 50000.0)]
    pub amount: f64,
    /// Exactly "Monthly" or "Quarterly"
    #[schema(example = "Monthly")]
    pub period: String,
}

#[derive(Deserialize, IntoParams)]
pub struct PayrollQuery {
    /// A period name narrows the list; "All" or absent returns everything
    pub filter: Option<String>,
}

/// List payroll entries
#[utoipa::path(
    get,
    path = "/api/payrolls",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Payroll entries", body = [PayrollEntry])
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, ApiError> {
    let entries = match query.filter.as_deref() {
        Some(period) if period != "All" => {
            sqlx::query_as::<_, PayrollEntry>(
                r#"
                SELECT id, employee_id, amount, period, date
                FROM payrolls
                WHERE period = ?
                ORDER BY date DESC
                "#,
            )
            .bind(period)
            .fetch_all(pool.get_ref())
            .await?
        }
        _ => {
            sqlx::query_as::<_, PayrollEntry>(
                r#"
                SELECT id, employee_id, amount, period, date
                FROM payrolls
                ORDER BY date DESC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(entries))
}

/// Create a payroll entry
#[utoipa::path(
    post,
    path = "/api/payrolls",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll entry created", body = PayrollEntry),
        (status = 400, description = "Unknown period or missing employee id"),
        (status = 403, description = "Requires Admin or Manager")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::CreatePayroll)?;

    let employee_id = payload.employee_id.trim();
    if employee_id.is_empty() {
        return Err(ApiError::validation("employee_id is required"));
    }
    if !payload.amount.is_finite() || payload.amount < 0.0 {
        return Err(ApiError::validation("amount must be a non-negative number"));
    }

    let period: Period = payload
        .period
        .parse()
        .map_err(|_| ApiError::validation("period must be \"Monthly\" or \"Quarterly\""))?;

    let result = sqlx::query("INSERT INTO payrolls (employee_id, amount, period) VALUES (?, ?, ?)")
        .bind(employee_id)
        .bind(payload.amount)
        .bind(period.to_string())
        .execute(pool.get_ref())
        .await?;

    let entry = sqlx::query_as::<_, PayrollEntry>(
        "SELECT id, employee_id, amount, period, date FROM payrolls WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(entry))
}

/// Delete a payroll entry
#[utoipa::path(
    delete,
    path = "/api/payrolls/{id}",
    params(("id", description = "Payroll entry ID")),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeletePayroll)?;

    let result = sqlx::query("DELETE FROM payrolls WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("payroll entry not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll entry deleted successfully" })))
}
