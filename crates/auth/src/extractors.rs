//! Axum extractors for browser sessions and authenticated users.

use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{request::Parts, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use mocksaml_core::auth::{is_session_expired, BrowserSession, SessionId, User};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::redirect::found;
use crate::AuthState;

/// Extractor for the browser session named by the session cookie.
///
/// `None` when there is no cookie, the session is unknown, or it has expired.
pub struct MaybeSession(pub Option<BrowserSession>);

impl<S> FromRequestParts<S> for MaybeSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(&auth_state.config.cookie_name) else {
            return Ok(MaybeSession(None));
        };

        let session_id = SessionId::new(cookie.value().to_string());
        let session = auth_state
            .sessions
            .get_session(&session_id)
            .await?
            .filter(|session| !is_session_expired(session, Utc::now()));

        Ok(MaybeSession(session))
    }
}

/// Extractor for optionally authenticated user. Returns None if not authenticated.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        let auth_state = AuthState::from_ref(state);
        let user = auth_state.current_user(session.as_ref()).await?;
        Ok(OptionalUser(user))
    }
}

/// Extractor for authenticated user.
///
/// Anonymous requests are redirected to the login page with `next` set to the
/// requested path.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalUser(user) = OptionalUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let auth_state = AuthState::from_ref(state);
                let next = request_path(parts);
                Err(login_redirect(&auth_state.config, &next))
            }
        }
    }
}

/// Path and query of the request as the client sent it.
pub(crate) fn request_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    full_path(uri)
}

/// Path plus query string, if any.
pub(crate) fn full_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Redirect to the configured login page, carrying `next`.
pub fn login_redirect(config: &AuthConfig, next: &str) -> Response {
    let separator = if config.login_url.contains('?') { '&' } else { '?' };
    found(&format!(
        "{}{}next={}",
        config.login_url,
        separator,
        urlencoding::encode(next)
    ))
}
