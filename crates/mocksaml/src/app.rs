use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use mocksaml_auth::{saml2_routes, AuthState};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{
    health::{healthz, livez},
    profile::profile,
    root::root,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AuthState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/accounts/profile/", get(profile))
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .merge(saml2_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
