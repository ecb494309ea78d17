// handlers/public/system.rs - service root and health probe

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "meteo-field-api",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Field campaign, equipment and sensor data backend",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/* (login, register, refresh public; profile authenticated)",
            "content": "/api/publicacoes, /api/noticias, /api/favoritos, /api/notificacoes",
            "field": "/api/campaigns, /api/equipments, /api/<sensor table>",
            "users": "/api/usuarios (superusuario)"
        }
    }))
}

/// GET /health - 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "code": "SERVICE_UNAVAILABLE",
                    "message": "database unavailable",
                    "status": "degraded",
                    "timestamp": now
                })),
            )
        }
    }
}
