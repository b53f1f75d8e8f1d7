//! Type-erased preloading.
//!
//! The preload queue, triggers and the component preloader deal with
//! handles of many different value types at once. They only need two
//! things from a handle: its key and a way to start a preload.

use super::error::LoadError;
use super::key::ComponentKey;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Anything that can be preloaded in the background.
///
/// Implemented by [`LoadHandle`](super::LoadHandle) for every value type.
pub trait Preloadable: Send + Sync + 'static {
    /// Key of the component this preloads.
    fn component_key(&self) -> &ComponentKey;

    /// Starts (or joins) a preload. The returned future resolves once the
    /// underlying load has settled.
    fn start_preload(&self) -> BoxFuture<'static, Result<(), LoadError>>;
}

impl<P: Preloadable + ?Sized> Preloadable for Arc<P> {
    fn component_key(&self) -> &ComponentKey {
        (**self).component_key()
    }

    fn start_preload(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        (**self).start_preload()
    }
}
