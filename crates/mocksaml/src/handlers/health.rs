//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Liveness plus a summary of the loaded mock users

use axum::{extract::State, http::StatusCode, Json};
use mocksaml_auth::AuthState;

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Reports how many mock users are configured.
pub async fn healthz(State(state): State<AuthState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "mock_users": state.config.users.len(),
    }))
}
