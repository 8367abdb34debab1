mod credentials;
mod error;
mod functions;
mod setting;
mod traits;
mod types;

pub use credentials::{check_credentials, FormErrors, FIELD_REQUIRED, INVALID_LOGIN};
pub use error::AuthError;
pub use functions::{
    apply_attributes, calculate_expiry, generate_session_id, is_session_expired, lookup_attribute,
};
pub use setting::Setting;
pub use traits::{AuthenticationBackend, Result, SessionRepository, UserRepository};
pub use types::{
    AttributeMapping, Ava, BrowserSession, MockUser, SessionId, SessionInfo, User, UserTable,
};
