use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: "chess-duel".to_string(),
        layout: state.config.layout.to_string(),
        uptime,
        active_sessions: state.registry.active_count().await,
        completed_sessions: state.registry.completed_count(),
    })
}

// =========================================================================
// Sessions
// =========================================================================

/// GET /api/sessions
pub async fn list_sessions(State(state): State<SharedState>) -> Json<SessionListResponse> {
    let sessions: Vec<SessionResponse> = state
        .registry
        .list()
        .await
        .iter()
        .map(SessionResponse::from)
        .collect();
    let total = sessions.len();
    Json(SessionListResponse { sessions, total })
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid session id: {id}")))?;
    let summary = state
        .registry
        .get(uuid)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;
    Ok(Json(SessionResponse::from(&summary)))
}
