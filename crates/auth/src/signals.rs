//! Post-authentication notifications.
//!
//! Observers run in registration order. Each call is isolated: an error or a
//! panic in one observer is logged and recorded, and the next observer still runs.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use mocksaml_core::auth::{SessionInfo, User};
use thiserror::Error;

/// Error type observers return.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Receives a notification after a user is authenticated at the ACS.
pub trait PostAuthenticatedObserver: Send + Sync {
    fn post_authenticated(&self, user: &User, session_info: &SessionInfo)
        -> Result<(), ObserverError>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> PostAuthenticatedObserver for F
where
    F: Fn(&User, &SessionInfo) -> Result<(), ObserverError> + Send + Sync,
{
    fn post_authenticated(
        &self,
        user: &User,
        session_info: &SessionInfo,
    ) -> Result<(), ObserverError> {
        self(user, session_info)
    }
}

/// Failure of a single observer during [`PostAuthenticated::send_robust`].
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("observer {observer} failed: {message}")]
    Failed { observer: String, message: String },

    #[error("observer {observer} panicked: {message}")]
    Panicked { observer: String, message: String },
}

/// The `post_authenticated` signal.
#[derive(Clone, Default)]
pub struct PostAuthenticated {
    observers: Vec<Arc<dyn PostAuthenticatedObserver>>,
}

impl PostAuthenticated {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, observer: impl PostAuthenticatedObserver + 'static) {
        self.observers.push(Arc::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notifies every observer, returning one result per observer.
    ///
    /// Never fails as a whole; callers may ignore the returned results.
    pub fn send_robust(
        &self,
        user: &User,
        session_info: &SessionInfo,
    ) -> Vec<Result<(), SignalError>> {
        self.observers
            .iter()
            .map(|observer| {
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| observer.post_authenticated(user, session_info)));

                let result = match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(SignalError::Failed {
                        observer: observer.name().to_string(),
                        message: e.to_string(),
                    }),
                    Err(payload) => Err(SignalError::Panicked {
                        observer: observer.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    }),
                };

                if let Err(e) = &result {
                    tracing::warn!(error = %e, "post_authenticated observer failed");
                }
                result
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Observer that logs every successful authentication.
pub struct LogObserver;

impl PostAuthenticatedObserver for LogObserver {
    fn post_authenticated(
        &self,
        user: &User,
        session_info: &SessionInfo,
    ) -> Result<(), ObserverError> {
        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            issuer = session_info.issuer.as_deref().unwrap_or("-"),
            "User authenticated"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
