use std::fmt;
use std::sync::Arc;

/// A configuration value that is either fixed or computed on demand.
///
/// `Computed` resolvers run once per [`Setting::resolve`] call, at the point of use.
pub enum Setting<T> {
    Static(T),
    Computed(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Setting<T> {
    pub fn computed<F>(resolver: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(resolver))
    }

    pub fn resolve(&self) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Computed(resolver) => resolver(),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<T: Clone> Clone for Setting<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(value.clone()),
            Self::Computed(resolver) => Self::Computed(Arc::clone(resolver)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
