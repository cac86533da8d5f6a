use serde::Serialize;

use crate::net::registry::SessionSummary;

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
    pub layout: String,
    pub uptime: u64,
    pub active_sessions: usize,
    pub completed_sessions: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub state: String,
    pub side_to_move: Option<String>,
    pub moves_played: u32,
    pub created_at: String,
}

impl From<&SessionSummary> for SessionResponse {
    fn from(s: &SessionSummary) -> Self {
        SessionResponse {
            id: s.id.to_string(),
            state: s.state.as_str().to_string(),
            side_to_move: s.side_to_move.map(|c| c.to_string()),
            moves_played: s.moves_played,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
    pub total: usize,
}
