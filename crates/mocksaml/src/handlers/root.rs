//! Root route handler.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use mocksaml_auth::{found, AuthState, OptionalUser};

use super::pages::HtmlTemplate;

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub login_url: String,
}

/// Handler for GET /
///
/// - Unauthenticated: landing page with a sign-in link
/// - Authenticated: redirects to the default post-login destination
pub async fn root(State(state): State<AuthState>, OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return found(&state.config.login_redirect_url);
    }

    HtmlTemplate(LandingTemplate {
        login_url: state.config.login_url.clone(),
    })
    .into_response()
}
