use crate::config::{env_presence, REQUIRED_ENV_VARS};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};

/// GET /api/health
///
/// Always 200; `status` is `degraded` while a required variable is missing.
pub async fn health() -> Json<Value> {
    let presence = env_presence();

    let missing: Vec<&str> = REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|name| {
            !presence
                .iter()
                .any(|(present_name, present)| present_name == name && *present)
        })
        .collect();

    let environment: Map<String, Value> = presence
        .into_iter()
        .map(|(name, present)| (name.to_string(), Value::Bool(present)))
        .collect();

    Json(json!({
        "status": if missing.is_empty() { "ok" } else { "degraded" },
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": environment,
        "missing": missing,
    }))
}

/// GET /api/test-db
pub async fn test_db(State(state): State<AppState>) -> Response {
    match count_rows(&state.pool).await {
        Ok((users, services)) => Json(json!({
            "connected": true,
            "users": users,
            "services": services,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Database check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "connected": false,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn count_rows(pool: &sqlx::SqlitePool) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let services = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
        .fetch_one(pool)
        .await?;
    Ok((users, services))
}
