use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::{ApiError, is_unique_violation},
    model::employee::Employee,
    utils::validation::is_valid_email,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineer")]
    pub role: String,
    #[schema(example = "IT")]
    pub department: String,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty()
            || self.role.trim().is_empty()
            || self.department.trim().is_empty()
        {
            return Err(ApiError::validation(
                "name, role and department are required",
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::validation("email address is not valid"));
        }
        Ok(())
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions: Vec<&str> = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT id, name, email, role, department FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed or duplicate email"),
        (status = 403, description = "Requires Admin or Manager")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::CreateEmployee)?;
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, email, role, department)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(payload.role.trim())
    .bind(payload.department.trim())
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::validation("an employee with this email already exists"));
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    Ok(HttpResponse::Created().json(Employee {
        id: result.last_insert_id(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        role: payload.role.trim().to_string(),
        department: payload.department.trim().to_string(),
    }))
}

/// Update an employee; absent fields keep their prior value
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id", description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Updated employee", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::UpdateEmployee)?;

    let employee_id = path.into_inner();

    let current = sqlx::query_as::<_, Employee>(
        "SELECT id, name, email, role, department FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::not_found("employee not found"))?;

    let name = body.name.clone().unwrap_or(current.name);
    let email = body.email.clone().unwrap_or(current.email);
    let role = body.role.clone().unwrap_or(current.role);
    let department = body.department.clone().unwrap_or(current.department);

    if name.trim().is_empty() || role.trim().is_empty() || department.trim().is_empty() {
        return Err(ApiError::validation("name, role and department must not be empty"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email address is not valid"));
    }

    let result = sqlx::query(
        r#"
        UPDATE employees
        SET name = ?, email = ?, role = ?, department = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(&role)
    .bind(&department)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(Employee {
            id: employee_id,
            name,
            email,
            role,
            department,
        })),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::validation("an employee with this email already exists"))
        }
        Err(e) => Err(ApiError::from(e)),
    }
}

/// Delete an employee
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeleteEmployee)?;

    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("employee not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Employee deleted successfully" })))
}
