use super::{MockUser, UserTable};

/// Generic message for any username/password mismatch.
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Message attached to a blank required field.
pub const FIELD_REQUIRED: &str = "This field is required.";

/// Validation errors for the credential form, grouped by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub username: Vec<String>,
    pub password: Vec<String>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty() && self.non_field.is_empty()
    }
}

/// Checks submitted credentials against the mock user table.
///
/// Both fields are required. Beyond that, an unknown username and a wrong
/// password produce the same [`INVALID_LOGIN`] error. Comparison is exact.
pub fn check_credentials<'a>(
    users: &'a UserTable,
    username: &str,
    password: &str,
) -> Result<&'a MockUser, FormErrors> {
    let mut errors = FormErrors::default();
    if username.is_empty() {
        errors.username.push(FIELD_REQUIRED.to_string());
    }
    if password.is_empty() {
        errors.password.push(FIELD_REQUIRED.to_string());
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    match users.get(username) {
        Some(user) if user.password == password => Ok(user),
        _ => {
            errors.non_field.push(INVALID_LOGIN.to_string());
            Err(errors)
        }
    }
}
