use crate::{
    auth::{
        auth::AuthUser,
        policy::{self, Action},
    },
    error::ApiError,
    model::settings::{DEFAULT_CURRENCY, DEFAULT_NOTIFICATIONS, DEFAULT_THEME, SettingsRecord},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateSettings {
    #[schema(example = "Light", nullable = true)]
    pub theme: Option<String>,
    #[schema(example = false, nullable = true)]
    pub notifications: Option<bool>,
    #[schema(example = "EUR", nullable = true)]
    pub currency: Option<String>,
}

/// Merge a patch over the existing row, or over the defaults when no row
/// exists yet. Absent fields keep their prior value.
fn merged(current: Option<&SettingsRecord>, patch: &UpdateSettings) -> (String, bool, String) {
    let theme = patch.theme.clone().unwrap_or_else(|| {
        current
            .map(|s| s.theme.clone())
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    });
    let notifications = patch
        .notifications
        .unwrap_or_else(|| current.map(|s| s.notifications).unwrap_or(DEFAULT_NOTIFICATIONS));
    let currency = patch.currency.clone().unwrap_or_else(|| {
        current
            .map(|s| s.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
    });
    (theme, notifications, currency)
}

/// First row wins; the table is a logical singleton.
async fn fetch_settings(pool: &MySqlPool) -> Result<Option<SettingsRecord>, sqlx::Error> {
    sqlx::query_as::<_, SettingsRecord>(
        "SELECT id, theme, notifications, currency FROM settings ORDER BY id LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

/// Fetch settings, creating the defaults on first read
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Current settings", body = SettingsRecord)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    if let Some(settings) = fetch_settings(pool.get_ref()).await? {
        return Ok(HttpResponse::Ok().json(settings));
    }

    // Lazily materialize the defaults. Concurrent first reads can race this
    // insert; the first-row-wins read above keeps the outcome stable.
    let result = sqlx::query("INSERT INTO settings (theme, notifications, currency) VALUES (?, ?, ?)")
        .bind(DEFAULT_THEME)
        .bind(DEFAULT_NOTIFICATIONS)
        .bind(DEFAULT_CURRENCY)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SettingsRecord {
        id: result.last_insert_id(),
        theme: DEFAULT_THEME.to_string(),
        notifications: DEFAULT_NOTIFICATIONS,
        currency: DEFAULT_CURRENCY.to_string(),
    }))
}

/// Upsert settings; provided fields replace, absent fields persist
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettings,
    responses((status = 200, description = "Updated settings", body = SettingsRecord)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdateSettings>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::UpdateSettings)?;

    let current = fetch_settings(pool.get_ref()).await?;
    let (theme, notifications, currency) = merged(current.as_ref(), &body);

    let id = match current {
        Some(existing) => {
            sqlx::query("UPDATE settings SET theme = ?, notifications = ?, currency = ? WHERE id = ?")
                .bind(&theme)
                .bind(notifications)
                .bind(&currency)
                .bind(existing.id)
                .execute(pool.get_ref())
                .await?;
            existing.id
        }
        None => {
            let result =
                sqlx::query("INSERT INTO settings (theme, notifications, currency) VALUES (?, ?, ?)")
                    .bind(&theme)
                    .bind(notifications)
                    .bind(&currency)
                    .execute(pool.get_ref())
                    .await?;
            result.last_insert_id()
        }
    };

    Ok(HttpResponse::Ok().json(SettingsRecord {
        id,
        theme,
        notifications,
        currency,
    }))
}

/// Reset settings: drop the row so the next fetch recreates the defaults
#[utoipa::path(
    delete,
    path = "/api/settings",
    responses(
        (status = 200, description = "Settings reset"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Nothing to reset")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn delete_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    policy::authorize(auth.role, &Action::DeleteSettings)?;

    let result = sqlx::query("DELETE FROM settings")
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("settings not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Settings reset to defaults" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_patch() -> UpdateSettings {
        UpdateSettings {
            theme: None,
            notifications: None,
            currency: None,
        }
    }

    #[test]
    fn merge_over_nothing_yields_defaults() {
        let (theme, notifications, currency) = merged(None, &empty_patch());
        assert_eq!(theme, "Dark");
        assert!(notifications);
        assert_eq!(currency, "USD");
    }

    #[test]
    fn merge_keeps_unpatched_fields() {
        let current = SettingsRecord {
            id: 1,
            theme: "Light".into(),
            notifications: false,
            currency: "EUR".into(),
        };
        let patch = UpdateSettings {
            theme: None,
            notifications: Some(true),
            currency: None,
        };
        let (theme, notifications, currency) = merged(Some(&current), &patch);
        assert_eq!(theme, "Light");
        assert!(notifications);
        assert_eq!(currency, "EUR");
    }

    #[test]
    fn merge_over_nothing_honors_patch_fields() {
        let patch = UpdateSettings {
            theme: Some("Light".into()),
            notifications: None,
            currency: Some("GBP".into()),
        };
        let (theme, notifications, currency) = merged(None, &patch);
        assert_eq!(theme, "Light");
        assert!(notifications); // default survives
        assert_eq!(currency, "GBP");
    }
}
