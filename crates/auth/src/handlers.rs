//! HTTP handlers for the mock SAML2 routes.

use axum::{
    extract::{OriginalUri, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use mocksaml_core::auth::{check_credentials, AuthError as CoreError, FormErrors, SessionId};
use serde::Deserialize;

use crate::error::AuthError;
use crate::extractors::{full_path, login_redirect, MaybeSession};
use crate::redirect::found;
use crate::templates;
use crate::AuthState;

/// Query parameters for the login page.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// Where to land after the handshake completes.
    pub next: Option<String>,
}

/// Submitted credential form.
#[derive(Deserialize, Default)]
pub struct LoginForm {
    pub next: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Post-login destination and how it was chosen.
#[derive(Debug, PartialEq, Eq)]
enum CameFrom {
    Requested(String),
    Default(String),
    /// `next` was submitted but empty.
    EmptyFallback(String),
}

fn resolve_came_from(next: Option<String>, default: &str) -> CameFrom {
    match next {
        Some(next) if next.is_empty() => CameFrom::EmptyFallback(default.to_string()),
        Some(next) => CameFrom::Requested(next),
        None => CameFrom::Default(default.to_string()),
    }
}

/// Creates the router with the mock SAML2 routes.
///
/// Routes:
/// - `GET/POST /login/` - Credential form and mock session seeding
/// - `GET/POST /acs/` - Assertion consumer service
/// - `GET/POST /logout/` - End the authenticated session
pub fn saml2_routes() -> Router<AuthState> {
    Router::new()
        .route("/login/", get(login).post(login_submit))
        .route(
            "/acs/",
            get(assertion_consumer_service).post(assertion_consumer_service),
        )
        .route("/logout/", get(logout).post(logout))
}

async fn login(State(state): State<AuthState>, Query(query): Query<LoginQuery>) -> Html<String> {
    let came_from = query
        .next
        .unwrap_or_else(|| state.config.login_redirect_url.clone());
    Html(templates::login_page(&came_from, "", &FormErrors::default()))
}

async fn login_submit(
    State(state): State<AuthState>,
    MaybeSession(session): MaybeSession,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AuthError> {
    tracing::debug!("Mock login process started");

    let came_from = match resolve_came_from(form.next, &state.config.login_redirect_url) {
        CameFrom::Requested(next) | CameFrom::Default(next) => next,
        CameFrom::EmptyFallback(next) => {
            tracing::warn!("The next parameter exists but is empty");
            next
        }
    };

    if state.current_user(session.as_ref()).await?.is_some() {
        if state.config.ignore_authenticated_users_on_login {
            return Ok(found(&came_from));
        }
        tracing::debug!("User is already logged in");
        return Ok(Html(state.render_auth_error(&came_from)).into_response());
    }

    tracing::debug!("Check credentials");
    let users = &state.config.users;
    let mock_user = match check_credentials(users, &form.username, &form.password) {
        Ok(user) => user,
        Err(errors) => {
            tracing::debug!(username = %form.username, "Invalid mock login");
            let page = templates::login_page(&came_from, &form.username, &errors);
            return Ok(Html(page).into_response());
        }
    };

    let mut session = session.unwrap_or_else(|| state.new_session());
    session.mock_session_info = Some(mock_user.session_info.clone());
    session.mock_came_from = Some(came_from);
    session.modified = true;
    state.sessions.save_session(&session).await?;

    let acs_location = state.acs_location()?;
    tracing::debug!(username = %form.username, acs = %acs_location, "Redirecting to the ACS");

    let jar = jar.add(session_cookie(&state, &session.id));
    Ok((jar, found(&acs_location)).into_response())
}

async fn assertion_consumer_service(
    State(state): State<AuthState>,
    MaybeSession(session): MaybeSession,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let attribute_mapping = state.config.attribute_mapping.resolve();
    let create_unknown_user = state.config.create_unknown_user.resolve();
    tracing::debug!("Mock assertion consumer service started");

    let session = session.ok_or(CoreError::MissingSessionKey("mock_session_info"))?;
    let session_info = session
        .mock_session_info
        .clone()
        .ok_or(CoreError::MissingSessionKey("mock_session_info"))?;
    let came_from = session
        .mock_came_from
        .clone()
        .ok_or(CoreError::MissingSessionKey("mock_came_from"))?;

    tracing::debug!("Trying to authenticate the user");
    let user = state
        .backend
        .authenticate(&session_info, &attribute_mapping, create_unknown_user)
        .await?
        .ok_or_else(|| {
            tracing::error!("The user is None");
            AuthError::PermissionDenied
        })?;

    let session = state.login(session, &user).await?;

    tracing::debug!("Sending the post_authenticated signal");
    state.post_authenticated.send_robust(&user, &session_info);

    tracing::debug!(came_from = %came_from, "Redirecting user");
    let jar = jar.add(session_cookie(&state, &session.id));
    Ok((jar, found(&came_from)).into_response())
}

async fn logout(
    State(state): State<AuthState>,
    OriginalUri(uri): OriginalUri,
    MaybeSession(session): MaybeSession,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let user = state.current_user(session.as_ref()).await?;
    let (Some(session), Some(user)) = (session, user) else {
        return Ok(login_redirect(&state.config, &full_path(&uri)));
    };

    tracing::debug!(username = %user.username, "Mock logout process started");

    let next_page = state.config.logout_redirect_url.clone();
    tracing::debug!(next_page = %next_page, "Performing logout");

    state.sessions.delete_session(&session.id).await?;
    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    Ok((jar, found(&next_page)).into_response())
}

fn session_cookie(state: &AuthState, id: &SessionId) -> Cookie<'static> {
    Cookie::build((state.config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(state.config.bounded_session_ttl().as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
    };
    use http_body_util::BodyExt;
    use mocksaml_core::auth::{
        AttributeMapping, AuthenticationBackend, SessionInfo, Setting, User, INVALID_LOGIN,
    };
    use tower::ServiceExt;

    use crate::config::{AuthConfig, StaticConfigLoader};
    use crate::signals::ObserverError;

    fn alice_info() -> SessionInfo {
        let mut info = SessionInfo::default();
        info.ava.insert("uid".to_string(), vec!["alice".to_string()]);
        info.ava
            .insert("mail".to_string(), vec!["alice@example.com".to_string()]);
        info
    }

    fn test_config() -> AuthConfig {
        AuthConfig::default().with_users(
            mocksaml_core::auth::UserTable::new().with_user("alice", "pw1", alice_info()),
        )
    }

    fn app(state: &AuthState) -> Router {
        saml2_routes().with_state(state.clone())
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_login(body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/login/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// `name=value` pair from the response's session cookie.
    fn cookie_pair(response: &Response) -> String {
        let header = response
            .headers()
            .get(SET_COOKIE)
            .expect("response sets a cookie")
            .to_str()
            .unwrap();
        header.split(';').next().unwrap().to_string()
    }

    fn session_id(pair: &str) -> SessionId {
        SessionId::new(pair.split_once('=').unwrap().1.to_string())
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Runs login + ACS and returns the authenticated cookie pair.
    async fn sign_in(app: &Router) -> String {
        let response = send(app, post_login("username=alice&password=pw1", None)).await;
        let cookie = cookie_pair(&response);
        let response = send(app, get_request("/acs/", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        cookie_pair(&response)
    }

    #[tokio::test]
    async fn test_login_page_defaults_next() {
        let state = AuthState::new(test_config());
        let response = send(&app(&state), get_request("/login/", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="next" value="/accounts/profile/""#));
    }

    #[tokio::test]
    async fn test_login_page_passes_next_through() {
        let state = AuthState::new(test_config());
        let response = send(&app(&state), get_request("/login/?next=%2Fdashboard%2F", None)).await;

        let html = body_text(response).await;
        assert!(html.contains(r#"name="next" value="/dashboard/""#));
    }

    #[tokio::test]
    async fn test_valid_login_seeds_session_and_redirects_to_acs() {
        let state = AuthState::new(test_config());
        let response = send(
            &app(&state),
            post_login("username=alice&password=pw1&next=%2Fdashboard%2F", None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/acs/");

        let session = state
            .sessions
            .get_session(&session_id(&cookie_pair(&response)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.mock_session_info, Some(alice_info()));
        assert_eq!(session.mock_came_from.as_deref(), Some("/dashboard/"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_logins_share_generic_error() {
        let state = AuthState::new(test_config());
        let app = app(&state);

        for body in [
            "username=alice&password=wrong",
            "username=mallory&password=pw1",
            "username=ALICE&password=pw1",
        ] {
            let response = send(&app, post_login(body, None)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(SET_COOKIE).is_none());
            let html = body_text(response).await;
            assert!(html.contains(&templates::html_escape(INVALID_LOGIN)));
        }
    }

    #[tokio::test]
    async fn test_invalid_login_does_not_echo_password() {
        let state = AuthState::new(test_config());
        let response = send(
            &app(&state),
            post_login("username=alice&password=s3cr3t-guess", None),
        )
        .await;

        let html = body_text(response).await;
        assert!(html.contains(r#"name="username" value="alice""#));
        assert!(!html.contains("s3cr3t-guess"));
    }

    #[tokio::test]
    async fn test_full_handshake_round_trips_next() {
        let state = AuthState::new(test_config());
        let app = app(&state);

        let response = send(
            &app,
            post_login("username=alice&password=pw1&next=%2Fdashboard%2F", None),
        )
        .await;
        let cookie = cookie_pair(&response);

        let response = send(&app, get_request("/acs/", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/dashboard/");

        let new_cookie = cookie_pair(&response);
        assert_ne!(new_cookie, cookie);
        let session = state
            .sessions
            .get_session(&session_id(&new_cookie))
            .await
            .unwrap()
            .unwrap();
        let user = state.current_user(Some(&session)).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(session.mock_session_info.is_none());
        assert!(session.mock_came_from.is_none());
    }

    #[tokio::test]
    async fn test_omitted_next_defaults_to_login_redirect_url() {
        let state = AuthState::new(test_config());
        let app = app(&state);

        let response = send(&app, post_login("username=alice&password=pw1", None)).await;
        let response = send(&app, get_request("/acs/", Some(&cookie_pair(&response)))).await;

        assert_eq!(location(&response), "/accounts/profile/");
    }

    #[test]
    fn test_resolve_came_from_flags_empty_next() {
        assert_eq!(
            resolve_came_from(Some(String::new()), "/home/"),
            CameFrom::EmptyFallback("/home/".to_string())
        );
        assert_eq!(
            resolve_came_from(None, "/home/"),
            CameFrom::Default("/home/".to_string())
        );
        assert_eq!(
            resolve_came_from(Some("/dashboard/".to_string()), "/home/"),
            CameFrom::Requested("/dashboard/".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_next_falls_back_to_default() {
        let state = AuthState::new(test_config());
        let response = send(
            &app(&state),
            post_login("username=alice&password=pw1&next=", None),
        )
        .await;

        let session = state
            .sessions
            .get_session(&session_id(&cookie_pair(&response)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.mock_came_from.as_deref(), Some("/accounts/profile/"));
    }

    #[tokio::test]
    async fn test_authenticated_user_is_redirected_from_login() {
        let state = AuthState::new(test_config());
        let app = app(&state);
        let cookie = sign_in(&app).await;
        let before = state
            .sessions
            .get_session(&session_id(&cookie))
            .await
            .unwrap()
            .unwrap();

        let response = send(
            &app,
            post_login("username=alice&password=pw1&next=%2Felsewhere%2F", Some(&cookie)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/elsewhere/");
        assert!(response.headers().get(SET_COOKIE).is_none());
        let after = state
            .sessions
            .get_session(&session_id(&cookie))
            .await
            .unwrap()
            .unwrap();
        assert!(after.mock_came_from.is_none());
        assert_eq!(after.expires_at, before.expires_at);
    }

    #[tokio::test]
    async fn test_authenticated_user_sees_notice_when_not_ignored() {
        let config = AuthConfig {
            ignore_authenticated_users_on_login: false,
            ..test_config()
        };
        let state = AuthState::new(config);
        let app = app(&state);
        let cookie = sign_in(&app).await;

        let response = send(
            &app,
            post_login("username=alice&password=pw1&next=%2Felsewhere%2F", Some(&cookie)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Authorization Error"));
        assert!(html.contains(r#"href="/elsewhere/""#));
    }

    #[tokio::test]
    async fn test_acs_without_login_is_server_error() {
        let state = AuthState::new(test_config());
        let app = app(&state);

        let response = send(&app, get_request("/acs/", None)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = send(&app, get_request("/acs/", Some("sessionid=unknown"))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_acs_rejected_user_is_forbidden() {
        let config = AuthConfig {
            create_unknown_user: Setting::Static(false),
            ..test_config()
        };
        let state = AuthState::new(config);
        let app = app(&state);

        let response = send(&app, post_login("username=alice&password=pw1", None)).await;
        let response = send(&app, get_request("/acs/", Some(&cookie_pair(&response)))).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Backend that never maps an assertion to an account.
    struct RejectAll;

    #[async_trait::async_trait]
    impl AuthenticationBackend for RejectAll {
        async fn authenticate(
            &self,
            _session_info: &SessionInfo,
            _attribute_mapping: &AttributeMapping,
            _create_unknown_user: bool,
        ) -> mocksaml_core::auth::Result<Option<User>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_acs_uses_custom_backend() {
        let state = AuthState::new(test_config()).with_backend(Arc::new(RejectAll));
        let app = app(&state);

        let response = send(&app, post_login("username=alice&password=pw1", None)).await;
        let response = send(&app, get_request("/acs/", Some(&cookie_pair(&response)))).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(state
            .users
            .get_user_by_field("username", "alice")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_acs_resolves_computed_settings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = AuthConfig {
            create_unknown_user: Setting::computed(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
            ..test_config()
        };
        let state = AuthState::new(config);
        let app = app(&state);

        let response = send(&app, post_login("username=alice&password=pw1", None)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = send(&app, get_request("/acs/", Some(&cookie_pair(&response)))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acs_survives_failing_observer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let state = AuthState::new(test_config())
            .with_observer(|_: &User, _: &SessionInfo| -> Result<(), ObserverError> {
                Err("listener down".into())
            })
            .with_observer(move |user: &User, info: &SessionInfo| -> Result<(), ObserverError> {
                assert_eq!(user.username, "alice");
                assert_eq!(info.first_value("mail"), Some("alice@example.com"));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let cookie = sign_in(&app(&state)).await;

        assert!(!cookie.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_uses_config_loader_location() {
        let state = AuthState::new(test_config()).with_config_loader(Arc::new(
            StaticConfigLoader::new("http://sp.test/saml2/acs/"),
        ));

        let response = send(&app(&state), post_login("username=alice&password=pw1", None)).await;

        assert_eq!(location(&response), "http://sp.test/saml2/acs/");
    }

    #[tokio::test]
    async fn test_logout_requires_authentication() {
        let state = AuthState::new(test_config());
        let response = send(&app(&state), get_request("/logout/", None)).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login/?next=%2Flogout%2F");
    }

    #[tokio::test]
    async fn test_logout_guard_keeps_query_string() {
        let state = AuthState::new(test_config());
        let response = send(&app(&state), get_request("/logout/?from=menu", None)).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login/?next=%2Flogout%2F%3Ffrom%3Dmenu");
    }

    #[tokio::test]
    async fn test_login_with_oversized_ttl_does_not_panic() {
        let config = AuthConfig {
            session_ttl: std::time::Duration::from_secs(10_000_000_000_000),
            ..test_config()
        };
        let state = AuthState::new(config);
        let app = app(&state);

        let response = send(&app, post_login("username=alice&password=pw1", None)).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let response = send(&app, get_request("/acs/", Some(&cookie_pair(&response)))).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/accounts/profile/");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let config = AuthConfig {
            logout_redirect_url: "/bye/".to_string(),
            ..test_config()
        };
        let state = AuthState::new(config);
        let app = app(&state);
        let cookie = sign_in(&app).await;

        let response = send(&app, get_request("/logout/", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/bye/");
        assert!(state
            .sessions
            .get_session(&session_id(&cookie))
            .await
            .unwrap()
            .is_none());

        let response = send(&app, get_request("/logout/", Some(&cookie))).await;
        assert_eq!(location(&response), "/login/?next=%2Flogout%2F");
    }
}
