//! Application state for the mock SAML2 handlers.

use std::sync::Arc;

use chrono::Utc;
use mocksaml_core::auth::{
    calculate_expiry, generate_session_id, AuthenticationBackend, BrowserSession,
    SessionRepository, User, UserRepository,
};

use crate::backend::Saml2Backend;
use crate::config::{AuthConfig, ConfigLoader, ACS_PATH};
use crate::error::AuthError;
use crate::sessions::SessionStore;
use crate::signals::{PostAuthenticated, PostAuthenticatedObserver};
use crate::users::UserStore;

/// Renders the "already authenticated" notice from the destination URL.
pub type NoticeTemplate = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub backend: Arc<dyn AuthenticationBackend>,
    pub config: Arc<AuthConfig>,
    pub post_authenticated: Arc<PostAuthenticated>,
    config_loader: Option<Arc<dyn ConfigLoader>>,
    auth_error_template: Option<NoticeTemplate>,
}

impl AuthState {
    /// Creates an AuthState with in-memory stores and the default SAML2 backend.
    pub fn new(config: AuthConfig) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new());
        let backend = Arc::new(Saml2Backend::new(
            users.clone(),
            config.user_main_attribute.clone(),
        ));

        Self {
            sessions: Arc::new(SessionStore::new()),
            users,
            backend,
            config: Arc::new(config),
            post_authenticated: Arc::new(PostAuthenticated::new()),
            config_loader: None,
            auth_error_template: None,
        }
    }

    /// Replaces the authentication backend.
    pub fn with_backend(mut self, backend: Arc<dyn AuthenticationBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Registers a `post_authenticated` observer.
    pub fn with_observer(mut self, observer: impl PostAuthenticatedObserver + 'static) -> Self {
        Arc::make_mut(&mut self.post_authenticated).connect(observer);
        self
    }

    /// Resolves the ACS location through `loader` instead of the static route.
    pub fn with_config_loader(mut self, loader: Arc<dyn ConfigLoader>) -> Self {
        self.config_loader = Some(loader);
        self
    }

    /// Overrides the "already authenticated" notice.
    pub fn with_auth_error_template(mut self, template: NoticeTemplate) -> Self {
        self.auth_error_template = Some(template);
        self
    }

    /// Where the login handler sends the browser after seeding the session.
    pub fn acs_location(&self) -> Result<String, AuthError> {
        match &self.config_loader {
            Some(loader) => loader.acs_location(),
            None => Ok(ACS_PATH.to_string()),
        }
    }

    pub fn render_auth_error(&self, came_from: &str) -> String {
        match &self.auth_error_template {
            Some(template) => template(came_from),
            None => crate::templates::auth_error_page(came_from),
        }
    }

    /// A fresh, unsaved session.
    pub fn new_session(&self) -> BrowserSession {
        let now = Utc::now();
        BrowserSession::new(generate_session_id(), now, self.session_expiry(now))
    }

    /// Returns the user bound to the session, if it is authenticated and the user still exists.
    pub async fn current_user(
        &self,
        session: Option<&BrowserSession>,
    ) -> Result<Option<User>, AuthError> {
        let Some(user_id) = session.and_then(|s| s.user_id) else {
            return Ok(None);
        };
        Ok(self.users.get_user(user_id).await?)
    }

    /// Binds `user` to the browser session.
    ///
    /// The session id is rotated and the handshake keys are dropped.
    pub async fn login(
        &self,
        mut session: BrowserSession,
        user: &User,
    ) -> Result<BrowserSession, AuthError> {
        self.sessions.delete_session(&session.id).await?;

        let now = Utc::now();
        session.id = generate_session_id();
        session.user_id = Some(user.id);
        session.mock_session_info = None;
        session.mock_came_from = None;
        session.expires_at = self.session_expiry(now);
        session.modified = true;

        self.sessions.save_session(&session).await?;
        Ok(session)
    }

    fn session_expiry(&self, now: chrono::DateTime<Utc>) -> chrono::DateTime<Utc> {
        calculate_expiry(now, self.config.bounded_session_ttl())
    }
}
