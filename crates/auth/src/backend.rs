//! SAML2-style authentication backend.
//!
//! Maps the attributes asserted in a `SessionInfo` onto a local account,
//! creating it when policy allows.

use std::sync::Arc;

use async_trait::async_trait;
use mocksaml_core::auth::{
    apply_attributes, lookup_attribute, AttributeMapping, AuthenticationBackend, Result,
    SessionInfo, User, UserRepository,
};

/// Default backend: looks accounts up by a single main attribute.
pub struct Saml2Backend {
    users: Arc<dyn UserRepository>,
    main_attribute: String,
}

impl Saml2Backend {
    /// # Arguments
    /// * `users` - Local account storage
    /// * `main_attribute` - Local field used to find existing accounts (usually `username`)
    pub fn new(users: Arc<dyn UserRepository>, main_attribute: impl Into<String>) -> Self {
        Self {
            users,
            main_attribute: main_attribute.into(),
        }
    }
}

#[async_trait]
impl AuthenticationBackend for Saml2Backend {
    async fn authenticate(
        &self,
        session_info: &SessionInfo,
        attribute_mapping: &AttributeMapping,
        create_unknown_user: bool,
    ) -> Result<Option<User>> {
        let Some(saml_attribute) = lookup_attribute(attribute_mapping, &self.main_attribute) else {
            tracing::error!(
                main_attribute = %self.main_attribute,
                "No SAML attribute is mapped to the main user attribute"
            );
            return Ok(None);
        };

        let Some(lookup_value) = session_info.first_value(saml_attribute) else {
            tracing::error!(
                attribute = %saml_attribute,
                "The assertion does not carry the lookup attribute"
            );
            return Ok(None);
        };

        if !create_unknown_user {
            let Some(mut user) = self
                .users
                .get_user_by_field(&self.main_attribute, lookup_value)
                .await?
            else {
                tracing::error!(
                    lookup_value = %lookup_value,
                    "User not found and unknown user creation is disabled"
                );
                return Ok(None);
            };
            self.update_attributes(&mut user, attribute_mapping, session_info)
                .await?;
            return Ok(Some(user));
        }

        let mut candidate = User::new(lookup_value);
        candidate.set_field(&self.main_attribute, lookup_value);
        apply_attributes(&mut candidate, attribute_mapping, session_info);

        let (mut user, created) = self
            .users
            .get_or_create_by_field(&self.main_attribute, lookup_value, candidate)
            .await?;
        if created {
            tracing::debug!(username = %user.username, "Created new user");
        } else {
            self.update_attributes(&mut user, attribute_mapping, session_info)
                .await?;
        }
        Ok(Some(user))
    }
}

impl Saml2Backend {
    async fn update_attributes(
        &self,
        user: &mut User,
        attribute_mapping: &AttributeMapping,
        session_info: &SessionInfo,
    ) -> Result<()> {
        if apply_attributes(user, attribute_mapping, session_info) {
            tracing::debug!(username = %user.username, "Updating user attributes");
            self.users.update_user(user).await?;
        }
        Ok(())
    }
}
