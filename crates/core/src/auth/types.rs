use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute-value assertion: SAML attribute name to its asserted values.
pub type Ava = BTreeMap<String, Vec<String>>;

/// Parsed assertion payload handed to the authentication backend.
///
/// Stands in for what a SAML2 library extracts from a signed `<Response>`.
/// Mock users carry one of these verbatim in the user table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub ava: Ava,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub came_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
}

impl SessionInfo {
    /// First asserted value for a SAML attribute, if any.
    pub fn first_value(&self, attribute: &str) -> Option<&str> {
        self.ava
            .get(attribute)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Entry in the mock user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockUser {
    pub password: String,
    #[serde(default)]
    pub session_info: SessionInfo,
}

/// Static table of mock users keyed by username.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserTable(HashMap<String, MockUser>);

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of `username -> { password, session_info }`.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json).map_err(|e| AuthError::InvalidUserTable(e.to_string()))
    }

    pub fn with_user(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        session_info: SessionInfo,
    ) -> Self {
        self.0.insert(
            username.into(),
            MockUser {
                password: password.into(),
                session_info,
            },
        );
        self
    }

    pub fn get(&self, username: &str) -> Option<&MockUser> {
        self.0.get(username)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How asserted SAML attributes map onto local user fields.
///
/// `{"uid": ["username"]}` means the `uid` attribute fills the local `username` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMapping(BTreeMap<String, Vec<String>>);

impl Default for AttributeMapping {
    fn default() -> Self {
        Self::new().with("uid", ["username"])
    }
}

impl AttributeMapping {
    /// Empty mapping. Use [`AttributeMapping::default`] for `{uid: [username]}`.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json).map_err(|e| AuthError::InvalidAttributeMapping(e.to_string()))
    }

    pub fn with<I, S>(mut self, saml_attribute: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            saml_attribute.into(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Per-browser session state.
///
/// Carries the two handshake keys between the login and assertion-consumer
/// steps, and the authenticated user once the handshake completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSession {
    pub id: SessionId,
    pub mock_session_info: Option<SessionInfo>,
    pub mock_came_from: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set when handlers change the session; the handler layer persists and re-issues the cookie.
    #[serde(skip)]
    pub modified: bool,
}

impl BrowserSession {
    pub fn new(id: SessionId, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id,
            mock_session_info: None,
            mock_came_from: None,
            user_id: None,
            created_at,
            expires_at,
            modified: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Local account produced by the authentication backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub attributes: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            attributes: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Reads a local field. `username` resolves to the dedicated field.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "username" => Some(self.username.as_str()),
            _ => self.attributes.get(name).map(String::as_str),
        }
    }

    /// Writes a local field, returning whether the value changed.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        if self.field(name) == Some(value) {
            return false;
        }
        match name {
            "username" => self.username = value.to_string(),
            _ => {
                self.attributes.insert(name.to_string(), value.to_string());
            }
        }
        true
    }
}
