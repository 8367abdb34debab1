//! Session storage implementations.
//!
//! Provides an in-memory `SessionRepository`; sessions live as long as the process.

mod inmemory;

pub use inmemory::SessionStore;
