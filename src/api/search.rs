use crate::{auth::auth::AuthUser, error::ApiError};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Per-entity cap on matches; the UI shows a short dropdown, not a page.
const MAX_PER_TYPE: i64 = 5;

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct SearchResult {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "Employee")]
    pub entity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Payroll $50000", nullable = true)]
    pub title: Option<String>,
}

/// Wildcards in user input are data, not pattern syntax.
fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    for ch in q.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{}%", escaped)
}

/// Case-insensitive substring search across employees, attendance and
/// payroll, capped per entity type
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses((status = 200, description = "Tagged matches, at most 5 per entity type", body = [SearchResult])),
    security(("bearer_auth" = [])),
    tag = "Search"
)]
pub async fn search(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let q = query.q.as_deref().unwrap_or("").trim();
    if q.is_empty() {
        // An empty query is an empty answer, not an error.
        return Ok(HttpResponse::Ok().json(Vec::<SearchResult>::new()));
    }

    let pattern = like_pattern(q);
    let mut results = Vec::new();

    let employees = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT id, name
        FROM employees
        WHERE name LIKE ? OR email LIKE ? OR role LIKE ? OR department LIKE ?
        LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(MAX_PER_TYPE)
    .fetch_all(pool.get_ref())
    .await?;

    results.extend(employees.into_iter().map(|(id, name)| SearchResult {
        id,
        name,
        entity: "Employee",
        title: None,
    }));

    let attendance = sqlx::query_as::<_, (u64, String)>(
        "SELECT id, employee_id FROM attendance WHERE employee_id LIKE ? LIMIT ?",
    )
    .bind(&pattern)
    .bind(MAX_PER_TYPE)
    .fetch_all(pool.get_ref())
    .await?;

    results.extend(attendance.into_iter().map(|(id, employee_id)| SearchResult {
        id,
        name: employee_id,
        entity: "Attendance",
        title: None,
    }));

    let payrolls = sqlx::query_as::<_, (u64, String, f64)>(
        "SELECT id, employee_id, amount FROM payrolls WHERE employee_id LIKE ? LIMIT ?",
    )
    .bind(&pattern)
    .bind(MAX_PER_TYPE)
    .fetch_all(pool.get_ref())
    .await?;

    results.extend(payrolls.into_iter().map(|(id, employee_id, amount)| SearchResult {
        id,
        name: employee_id,
        entity: "Payroll",
        title: Some(format!("Payroll ${}", amount)),
    }));

    Ok(HttpResponse::Ok().json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_plain_queries_in_wildcards() {
        assert_eq!(like_pattern("jane"), "%jane%");
        assert_eq!(like_pattern("IT dept"), "%IT dept%");
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }
}
