//! Functional core for mocksaml.
//!
//! Pure types and functions for the mock SAML2 handshake, plus the storage
//! and backend traits the I/O layer implements.

pub mod auth;
