use async_trait::async_trait;
use uuid::Uuid;

use super::{AttributeMapping, AuthError, BrowserSession, SessionId, SessionInfo, User};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Browser session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert or replace a session.
    async fn save_session(&self, session: &BrowserSession) -> Result<()>;

    /// Retrieve session by ID.
    async fn get_session(&self, id: &SessionId) -> Result<Option<BrowserSession>>;

    /// Delete a specific session.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;
}

/// Local account storage used by the authentication backend.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn get_user_by_field(&self, field: &str, value: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: &User) -> Result<()>;

    /// Returns the user whose `field` equals `value`, inserting `candidate`
    /// when there is none. Lookup and insert are atomic.
    ///
    /// The flag is `true` when `candidate` was inserted.
    async fn get_or_create_by_field(
        &self,
        field: &str,
        value: &str,
        candidate: User,
    ) -> Result<(User, bool)>;

    async fn update_user(&self, user: &User) -> Result<()>;
}

/// Turns asserted attributes into a local account.
#[async_trait]
pub trait AuthenticationBackend: Send + Sync {
    /// Returns the matching (or newly created) user, or `None` when the
    /// assertion cannot be mapped to an account under the given policies.
    async fn authenticate(
        &self,
        session_info: &SessionInfo,
        attribute_mapping: &AttributeMapping,
        create_unknown_user: bool,
    ) -> Result<Option<User>>;
}
