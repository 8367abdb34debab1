//! In-memory local account storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use mocksaml_core::auth::{AuthError, Result, User, UserRepository};

/// In-memory user store backing the authentication backend.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_field(&self, field: &str, value: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.field(field) == Some(value))
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AuthError::Storage(format!("user already exists: {}", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_or_create_by_field(
        &self,
        field: &str,
        value: &str,
        candidate: User,
    ) -> Result<(User, bool)> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.values().find(|user| user.field(field) == Some(value)) {
            return Ok((existing.clone(), false));
        }
        users.insert(candidate.id, candidate.clone());
        Ok((candidate, true))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AuthError::Storage(format!("user not found: {}", user.id))),
        }
    }
}
