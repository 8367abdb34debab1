//! Mock SAML2 identity provider for mocksaml.
//!
//! This crate provides:
//! - The login, assertion consumer and logout handlers
//! - In-memory session and user storage
//! - A SAML2-style authentication backend and the `post_authenticated` signal
//! - Axum extractors for sessions and authenticated users

mod backend;
mod config;
mod error;
mod extractors;
mod handlers;
mod redirect;
mod sessions;
mod signals;
mod state;
mod templates;
mod users;

pub use backend::Saml2Backend;
pub use config::{
    load_users, AuthConfig, ConfigLoader, StaticConfigLoader, ACS_PATH, MAX_SESSION_TTL,
};
pub use error::AuthError;
pub use extractors::{login_redirect, CurrentUser, MaybeSession, OptionalUser};
pub use handlers::saml2_routes;
pub use redirect::found;
pub use sessions::SessionStore;
pub use signals::{
    LogObserver, ObserverError, PostAuthenticated, PostAuthenticatedObserver, SignalError,
};
pub use state::{AuthState, NoticeTemplate};
pub use users::UserStore;
