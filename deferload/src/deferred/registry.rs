//! The process-wide component registry.

use super::error::RegistryError;
use super::optimized::{OptimizedComponent, OptimizedConfig, PreloadStrategy};
use super::preloader::{ComponentPreloader, PreloadReport};
use crate::config::ConfigFile;
use crate::fallback::FallbackConfig;
use crate::loader::{ComponentKey, LoadHandle, LoadOptions, Preloadable, Producer};
use crate::log::{Logger, TracingLogger};
use crate::queue::{PreloadQueue, QueueConfig};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A registered handle with the name of its value type.
struct Registered {
    handle: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

struct DeferredInner {
    handles: DashMap<ComponentKey, Registered>,
    routes: Mutex<Vec<Arc<dyn Preloadable>>>,
    queue: PreloadQueue,
    load_defaults: LoadOptions,
    fallback_defaults: FallbackConfig,
    logger: Arc<dyn Logger>,
}

/// Registry handing out one [`LoadHandle`] per component key.
///
/// Declaring the same key twice returns the existing handle, so every
/// caller shares one cache slot and one in-flight load. The registry also
/// owns the preload queue and the set of route-predicted components.
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use deferload::deferred::Deferred;
/// use deferload::loader::{LoadOptions, ProducerError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let deferred = Deferred::default();
/// let a = deferred
///     .create_lazy("pages/training", || async { Ok::<_, ProducerError>(1u16) }, LoadOptions::default())
///     .unwrap();
/// let b = deferred
///     .create_lazy("pages/training", || async { Ok::<_, ProducerError>(2u16) }, LoadOptions::default())
///     .unwrap();
///
/// assert_eq!(*b.load().await.unwrap(), 1);
/// assert!(a.get().is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct Deferred {
    inner: Arc<DeferredInner>,
}

impl Deferred {
    pub fn new(
        load_defaults: LoadOptions,
        queue: QueueConfig,
        fallback_defaults: FallbackConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            inner: Arc::new(DeferredInner {
                handles: DashMap::new(),
                routes: Mutex::new(Vec::new()),
                queue: PreloadQueue::new(queue),
                load_defaults,
                fallback_defaults,
                logger,
            }),
        }
    }

    /// Builds a registry from a loaded configuration file.
    pub fn from_config(config: &ConfigFile) -> Self {
        Self::new(
            LoadOptions::from(&config.loader),
            QueueConfig::from(&config.queue),
            FallbackConfig::from(&config.fallback),
            Arc::new(TracingLogger),
        )
    }

    /// Default options for handles declared without their own.
    pub fn load_defaults(&self) -> &LoadOptions {
        &self.inner.load_defaults
    }

    pub fn queue(&self) -> &PreloadQueue {
        &self.inner.queue
    }

    pub fn preloader(&self) -> ComponentPreloader {
        ComponentPreloader::new(Arc::clone(&self.inner.logger))
    }

    /// Returns the handle for `key`, creating it from `producer` and
    /// `options` on first declaration.
    ///
    /// On later declarations `producer` and `options` are ignored.
    pub fn create_lazy<T: Send + Sync + 'static>(
        &self,
        key: impl Into<ComponentKey>,
        producer: impl Producer<T>,
        options: LoadOptions,
    ) -> Result<LoadHandle<T>, RegistryError> {
        let key = key.into();
        match self.inner.handles.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let registered = entry.get();
                match registered.handle.downcast_ref::<LoadHandle<T>>() {
                    Some(handle) => {
                        tracing::trace!(key = %key, "Reusing registered component");
                        Ok(handle.clone())
                    }
                    None => Err(RegistryError::TypeMismatch {
                        key,
                        registered: registered.type_name,
                        requested: std::any::type_name::<T>(),
                    }),
                }
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    key = %key,
                    retry_count = options.retry_count,
                    eager = options.preload_eagerly,
                    "Registered component"
                );
                let handle = LoadHandle::from_parts(
                    key,
                    Arc::new(producer),
                    options,
                    Arc::clone(&self.inner.logger),
                );
                entry.insert(Registered {
                    handle: Arc::new(handle.clone()),
                    type_name: std::any::type_name::<T>(),
                });
                Ok(handle)
            }
        }
    }

    /// [`create_lazy`](Self::create_lazy) with the registry's default options.
    pub fn lazy<T: Send + Sync + 'static>(
        &self,
        key: impl Into<ComponentKey>,
        producer: impl Producer<T>,
    ) -> Result<LoadHandle<T>, RegistryError> {
        self.create_lazy(key, producer, self.inner.load_defaults.clone())
    }

    /// Declares a component with a priority, a preload strategy and a
    /// fallback shape.
    ///
    /// `Immediate` components are queued right away; `RouteBased` ones are
    /// remembered for [`preload_predicted_routes`](Self::preload_predicted_routes).
    /// Must be called within a tokio runtime for `Immediate`.
    pub fn create_optimized_lazy<T: Send + Sync + 'static>(
        &self,
        key: impl Into<ComponentKey>,
        producer: impl Producer<T>,
        config: OptimizedConfig,
    ) -> Result<OptimizedComponent<T>, RegistryError> {
        let options = config
            .load
            .clone()
            .unwrap_or_else(|| self.inner.load_defaults.clone());
        let handle = self.create_lazy(key, producer, options)?;
        self.inner.queue.set_priority(handle.key(), config.priority);

        match config.preload_strategy {
            PreloadStrategy::Immediate => self.inner.queue.queue_load(handle.clone()),
            PreloadStrategy::RouteBased => {
                let mut routes = self.inner.routes.lock();
                if !routes.iter().any(|r| r.component_key() == handle.key()) {
                    routes.push(Arc::new(handle.clone()));
                }
            }
            PreloadStrategy::Hover | PreloadStrategy::None => {}
        }

        let mut fallback = self.inner.fallback_defaults.clone();
        fallback.kind = config.fallback_kind;
        fallback.variant = config.fallback_variant;

        Ok(OptimizedComponent {
            handle,
            fallback,
            strategy: config.preload_strategy,
            priority: config.priority,
            queue: self.inner.queue.clone(),
        })
    }

    /// Preloads every route-based component and waits for all of them.
    pub async fn preload_predicted_routes(&self) -> PreloadReport {
        let routes: Vec<_> = self.inner.routes.lock().clone();
        self.preloader().preload_routes(routes).await
    }

    /// Keys of the route-based components, in declaration order.
    pub fn predicted_routes(&self) -> Vec<ComponentKey> {
        self.inner
            .routes
            .lock()
            .iter()
            .map(|r| r.component_key().clone())
            .collect()
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.inner.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.handles.is_empty()
    }

    /// Forgets every registered component. Existing handles keep working
    /// but are no longer shared with new declarations.
    pub fn clear(&self) {
        self.inner.handles.clear();
        self.inner.routes.lock().clear();
        tracing::debug!("Cleared component registry");
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new(
            LoadOptions::default(),
            QueueConfig::default(),
            FallbackConfig::default(),
            Arc::new(TracingLogger),
        )
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("components", &self.inner.handles.len())
            .field("routes", &self.inner.routes.lock().len())
            .field("queue", &self.inner.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{ContentVariant, FallbackKind, SkeletonShape, View};
    use crate::loader::{HandleState, ProducerError};
    use crate::log::NoOpLogger;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn registry() -> Deferred {
        Deferred::new(
            LoadOptions::default().with_retry_count(0),
            QueueConfig::default(),
            FallbackConfig::default(),
            Arc::new(NoOpLogger),
        )
    }

    fn counted(calls: &Arc<AtomicUsize>, latency_ms: u64) -> impl Producer<usize> {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(latency_ms)).await;
                Ok::<_, ProducerError>(n)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_shares_one_handle() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = deferred.lazy::<usize>("pages/users", counted(&calls, 10)).unwrap();
        let b = deferred.lazy::<usize>("pages/users", counted(&calls, 10)).unwrap();

        let (x, y) = tokio::join!(a.load(), b.preload());
        assert_eq!(*x.unwrap(), 0);
        assert!(y.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(deferred.len(), 1);
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        deferred.lazy::<usize>("pages/users", counted(&calls, 0)).unwrap();

        let err = deferred
            .lazy::<String>("pages/users", || async { Ok::<_, ProducerError>(String::new()) })
            .unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { registered: "usize", .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_forgets_components() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = deferred.lazy::<usize>("pages/users", counted(&calls, 0)).unwrap();
        first.load().await.unwrap();

        deferred.clear();
        assert!(deferred.is_empty());
        let second = deferred.lazy::<usize>("pages/users", counted(&calls, 0)).unwrap();
        assert_eq!(second.state(), HandleState::Empty);
        assert_eq!(first.state(), HandleState::Resolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_strategy_queues_at_creation() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));

        let component = deferred
            .create_optimized_lazy::<usize>(
                "widgets/stats",
                counted(&calls, 10),
                OptimizedConfig::default()
                    .with_priority(4)
                    .with_strategy(PreloadStrategy::Immediate),
            )
            .unwrap();

        assert_eq!(deferred.queue().priority(component.handle().key()), 4);
        deferred.queue().wait_idle().await;
        assert_eq!(component.handle().state(), HandleState::Resolved);
        assert!(component.preload_trigger(Duration::from_millis(10)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_based_components_preload_together() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let config = OptimizedConfig::default().with_strategy(PreloadStrategy::RouteBased);

        let a = deferred
            .create_optimized_lazy::<usize>("pages/a", counted(&calls, 10), config.clone())
            .unwrap();
        deferred
            .create_optimized_lazy::<usize>("pages/b", counted(&calls, 10), config.clone())
            .unwrap();
        // Re-declaring does not register the route twice.
        deferred
            .create_optimized_lazy::<usize>("pages/a", counted(&calls, 10), config)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            deferred.predicted_routes(),
            vec![ComponentKey::new("pages/a"), ComponentKey::new("pages/b")]
        );

        let report = deferred.preload_predicted_routes().await;
        assert_eq!(report.succeeded.len(), 2);
        assert!(a.handle().get().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimized_render_uses_fallback_shape() {
        let deferred = registry();
        let calls = Arc::new(AtomicUsize::new(0));

        let component = deferred
            .create_optimized_lazy::<usize>(
                "forms/incident",
                counted(&calls, 400),
                OptimizedConfig::default()
                    .with_strategy(PreloadStrategy::Hover)
                    .with_fallback(FallbackKind::Content, ContentVariant::Form),
            )
            .unwrap();

        let mut boundary = component.render();
        tokio::time::sleep(Duration::from_millis(200)).await;
        match boundary.view() {
            View::Fallback(skeleton) => assert_eq!(skeleton.shape, SkeletonShape::Form),
            other => panic!("expected fallback, got {:?}", other),
        }
        assert!(boundary.settled().await.ready().is_some());
        assert!(component.preload_trigger(Duration::from_millis(10)).is_some());
    }
}
