use std::path::Path;
use std::time::Duration;

use mocksaml_core::auth::{AttributeMapping, Setting, UserTable};

use crate::error::AuthError;

/// Static route of the assertion consumer service.
pub const ACS_PATH: &str = "/acs/";

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Complete configuration for the mock SAML2 flow.
///
/// Injected into [`crate::AuthState`]; nothing here is process-global, so tests
/// can build a config with their own user table.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Destination when the login request carries no `next`.
    pub login_redirect_url: String,
    /// Where unauthenticated requests to guarded routes are sent.
    pub login_url: String,
    /// Destination after logout.
    pub logout_redirect_url: String,
    /// Redirect already-authenticated users at `/login/` instead of showing a notice.
    pub ignore_authenticated_users_on_login: bool,
    pub attribute_mapping: Setting<AttributeMapping>,
    pub create_unknown_user: Setting<bool>,
    /// Local field used to look up accounts (`username` unless overridden).
    pub user_main_attribute: String,
    pub users: UserTable,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_redirect_url: "/accounts/profile/".to_string(),
            login_url: "/login/".to_string(),
            logout_redirect_url: "/".to_string(),
            ignore_authenticated_users_on_login: true,
            attribute_mapping: Setting::Static(AttributeMapping::default()),
            create_unknown_user: Setting::Static(true),
            user_main_attribute: "username".to_string(),
            users: UserTable::new(),
            session_ttl: Duration::from_secs(14 * 24 * 60 * 60),
            cookie_name: "sessionid".to_string(),
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LOGIN_REDIRECT_URL`: default post-login destination (default: `/accounts/profile/`)
    /// - `LOGIN_URL`: login page for guarded routes (default: `/login/`)
    /// - `LOGOUT_REDIRECT_URL`: post-logout destination (default: `/`)
    /// - `SAML_IGNORE_AUTHENTICATED_USERS_ON_LOGIN`: `true`/`false` (default: `true`)
    /// - `SAML_CREATE_UNKNOWN_USER`: `true`/`false` (default: `true`)
    /// - `SAML_ATTRIBUTE_MAPPING`: JSON object (default: `{"uid": ["username"]}`)
    /// - `SAML_USER_MAIN_ATTRIBUTE`: local lookup field (default: `username`)
    /// - `MOCK_SAML2_USERS_FILE`: path to the JSON user table (default: empty table)
    /// - `SESSION_TTL_SECONDS`: session lifetime (default: two weeks)
    /// - `SESSION_COOKIE_NAME`: cookie name (default: `sessionid`)
    /// - `COOKIE_SECURE`: whether to set the secure flag (default: `false`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` for unparseable values or an unreadable users file.
    pub fn from_env() -> Result<Self, AuthError> {
        let defaults = Self::default();

        let attribute_mapping = match std::env::var("SAML_ATTRIBUTE_MAPPING") {
            Ok(json) => AttributeMapping::from_json(&json)?,
            Err(_) => AttributeMapping::default(),
        };

        let users = match std::env::var("MOCK_SAML2_USERS_FILE") {
            Ok(path) => load_users(Path::new(&path))?,
            Err(_) => UserTable::new(),
        };

        let session_ttl = match std::env::var("SESSION_TTL_SECONDS") {
            Ok(value) => parse_session_ttl(&value)?,
            Err(_) => defaults.session_ttl,
        };

        Ok(Self {
            login_redirect_url: env_or("LOGIN_REDIRECT_URL", defaults.login_redirect_url),
            login_url: env_or("LOGIN_URL", defaults.login_url),
            logout_redirect_url: env_or("LOGOUT_REDIRECT_URL", defaults.logout_redirect_url),
            ignore_authenticated_users_on_login: env_bool(
                "SAML_IGNORE_AUTHENTICATED_USERS_ON_LOGIN",
                true,
            )?,
            attribute_mapping: Setting::Static(attribute_mapping),
            create_unknown_user: Setting::Static(env_bool("SAML_CREATE_UNKNOWN_USER", true)?),
            user_main_attribute: env_or(
                "SAML_USER_MAIN_ATTRIBUTE",
                defaults.user_main_attribute,
            ),
            users,
            session_ttl,
            cookie_name: env_or("SESSION_COOKIE_NAME", defaults.cookie_name),
            cookie_secure: env_bool("COOKIE_SECURE", false)?,
        })
    }

    pub fn with_users(mut self, users: UserTable) -> Self {
        self.users = users;
        self
    }

    /// Session lifetime clamped to [`MAX_SESSION_TTL`].
    pub fn bounded_session_ttl(&self) -> Duration {
        self.session_ttl.min(MAX_SESSION_TTL)
    }
}

/// Reads the JSON user table from disk.
pub fn load_users(path: &Path) -> Result<UserTable, AuthError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AuthError::Config(format!("{}: {e}", path.display())))?;
    Ok(UserTable::from_json(&json)?)
}

/// Resolves the assertion consumer location for the login redirect.
///
/// Installed on [`crate::AuthState`] to replace the static [`ACS_PATH`] route,
/// e.g. when the consumer lives behind a different host or prefix.
pub trait ConfigLoader: Send + Sync {
    fn acs_location(&self) -> Result<String, AuthError>;
}

/// Loader with a fixed ACS location (`MOCK_SAML2_ACS_URL`).
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    acs_url: String,
}

impl StaticConfigLoader {
    pub fn new(acs_url: impl Into<String>) -> Self {
        Self {
            acs_url: acs_url.into(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("MOCK_SAML2_ACS_URL").ok().map(Self::new)
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn acs_location(&self) -> Result<String, AuthError> {
        Ok(self.acs_url.clone())
    }
}

fn parse_session_ttl(value: &str) -> Result<Duration, AuthError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| AuthError::Config(format!("SESSION_TTL_SECONDS: {e}")))?;
    let ttl = Duration::from_secs(secs);
    if ttl > MAX_SESSION_TTL {
        return Err(AuthError::Config(format!(
            "SESSION_TTL_SECONDS: {secs} exceeds the maximum of {}",
            MAX_SESSION_TTL.as_secs()
        )));
    }
    Ok(ttl)
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> Result<bool, AuthError> {
    match std::env::var(name) {
        Ok(value) => parse_bool(&value)
            .ok_or_else(|| AuthError::Config(format!("{name}: expected a boolean, got {value:?}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
