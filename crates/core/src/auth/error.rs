use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session key missing: {0}")]
    MissingSessionKey(&'static str),

    #[error("invalid user table: {0}")]
    InvalidUserTable(String),

    #[error("invalid attribute mapping: {0}")]
    InvalidAttributeMapping(String),

    #[error("storage error: {0}")]
    Storage(String),
}
