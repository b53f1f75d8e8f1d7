//! Component identity.
//!
//! A [`ComponentKey`] names one deferred component. The registry uses it to
//! hand out the same [`LoadHandle`](super::LoadHandle) for every declaration
//! of the same component, and the preload queue uses it to look up recorded
//! priorities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for generating anonymous component keys.
static COMPONENT_KEY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a deferred component.
///
/// Keys are cheap to clone (the string is shared).
///
/// # Example
///
/// ```
/// use deferload::loader::ComponentKey;
///
/// let key = ComponentKey::new("pages/incidents");
/// assert_eq!(key.as_str(), "pages/incidents");
///
/// let anon = ComponentKey::auto();
/// assert!(anon.as_str().starts_with("component-"));
/// ```
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ComponentKey(Arc<str>);

impl ComponentKey {
    /// Creates a key from a meaningful name (a module path, a route, ...).
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::from(key.into()))
    }

    /// Creates a unique key of the form `component-{counter}`.
    pub fn auto() -> Self {
        let counter = COMPONENT_KEY_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(Arc::from(format!("component-{}", counter)))
    }

    /// Returns the string value of this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKey({})", self.0)
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ComponentKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ComponentKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&ComponentKey> for ComponentKey {
    fn from(key: &ComponentKey) -> Self {
        key.clone()
    }
}
