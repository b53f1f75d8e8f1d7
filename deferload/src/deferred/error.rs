//! Registry errors.

use crate::loader::ComponentKey;
use thiserror::Error;

/// Errors from the [`Deferred`](super::Deferred) registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A key was reused with a different value type.
    #[error("component '{key}' is registered as {registered}, requested as {requested}")]
    TypeMismatch {
        key: ComponentKey,
        registered: &'static str,
        requested: &'static str,
    },
}
