use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{AttributeMapping, BrowserSession, SessionId, SessionInfo, User};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Check if a session has expired.
pub fn is_session_expired(session: &BrowserSession, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: std::time::Duration) -> DateTime<Utc> {
    Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| created_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Find the SAML attribute that feeds the given local field.
///
/// With the default mapping and `username` this returns `uid`.
pub fn lookup_attribute<'a>(mapping: &'a AttributeMapping, local_field: &str) -> Option<&'a str> {
    mapping
        .iter()
        .find(|(_, fields)| fields.iter().any(|f| f == local_field))
        .map(|(saml_attribute, _)| saml_attribute)
}

/// Copy mapped attributes from the assertion onto the user.
///
/// Uses the first asserted value of each mapped attribute. Returns whether any field changed.
pub fn apply_attributes(user: &mut User, mapping: &AttributeMapping, info: &SessionInfo) -> bool {
    let mut changed = false;
    for (saml_attribute, fields) in mapping.iter() {
        let Some(value) = info.first_value(saml_attribute) else {
            continue;
        };
        for field in fields {
            changed |= user.set_field(field, value);
        }
    }
    changed
}
