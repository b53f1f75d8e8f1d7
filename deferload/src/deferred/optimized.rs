//! Handles pre-wrapped with a fallback boundary and a preload strategy.

use super::trigger::{with_preload_trigger, PreloadTrigger, TriggerKind};
use crate::fallback::{render, Boundary, ContentVariant, FallbackConfig, FallbackKind};
use crate::loader::{LoadHandle, LoadOptions};
use crate::queue::PreloadQueue;
use std::fmt;
use std::time::Duration;

/// Default hover delay before a hover-strategy component preloads.
pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(100);

/// When an optimized component starts preloading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PreloadStrategy {
    /// Only when rendered or preloaded explicitly.
    #[default]
    None,
    /// On hover, through [`OptimizedComponent::preload_trigger`].
    Hover,
    /// Queued at creation.
    Immediate,
    /// With [`Deferred::preload_predicted_routes`](super::Deferred::preload_predicted_routes).
    RouteBased,
}

impl fmt::Display for PreloadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Hover => write!(f, "hover"),
            Self::Immediate => write!(f, "immediate"),
            Self::RouteBased => write!(f, "route-based"),
        }
    }
}

/// Configuration for [`Deferred::create_optimized_lazy`](super::Deferred::create_optimized_lazy).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizedConfig {
    /// Options for the underlying handle; `None` uses the registry defaults.
    pub load: Option<LoadOptions>,
    /// Queue priority, higher drains first.
    pub priority: i32,
    pub preload_strategy: PreloadStrategy,
    pub fallback_kind: FallbackKind,
    pub fallback_variant: ContentVariant,
}

impl OptimizedConfig {
    pub fn with_load(mut self, load: LoadOptions) -> Self {
        self.load = Some(load);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_strategy(mut self, strategy: PreloadStrategy) -> Self {
        self.preload_strategy = strategy;
        self
    }

    pub fn with_fallback(mut self, kind: FallbackKind, variant: ContentVariant) -> Self {
        self.fallback_kind = kind;
        self.fallback_variant = variant;
        self
    }
}

/// A load handle bundled with its boundary configuration.
pub struct OptimizedComponent<T> {
    pub(super) handle: LoadHandle<T>,
    pub(super) fallback: FallbackConfig,
    pub(super) strategy: PreloadStrategy,
    pub(super) priority: i32,
    pub(super) queue: PreloadQueue,
}

impl<T> Clone for OptimizedComponent<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            fallback: self.fallback.clone(),
            strategy: self.strategy,
            priority: self.priority,
            queue: self.queue.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> OptimizedComponent<T> {
    pub fn handle(&self) -> &LoadHandle<T> {
        &self.handle
    }

    pub fn fallback_config(&self) -> &FallbackConfig {
        &self.fallback
    }

    pub fn strategy(&self) -> PreloadStrategy {
        self.strategy
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Mounts a fallback boundary around the component.
    pub fn render(&self) -> Boundary<T> {
        render(&self.handle, &self.fallback)
    }

    /// Hover trigger for this component, or `None` unless the strategy is
    /// [`PreloadStrategy::Hover`].
    pub fn preload_trigger(&self, delay: Duration) -> Option<PreloadTrigger> {
        (self.strategy == PreloadStrategy::Hover)
            .then(|| with_preload_trigger(self.handle.clone(), TriggerKind::Hover, delay))
    }

    /// [`preload_trigger`](Self::preload_trigger) with [`DEFAULT_HOVER_DELAY`].
    pub fn hover_trigger(&self) -> Option<PreloadTrigger> {
        self.preload_trigger(DEFAULT_HOVER_DELAY)
    }

    /// Queues a background preload at this component's priority.
    pub fn queue_preload(&self) {
        self.queue.queue_load(self.handle.clone());
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for OptimizedComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizedComponent")
            .field("handle", &self.handle)
            .field("strategy", &self.strategy)
            .field("priority", &self.priority)
            .field("fallback_kind", &self.fallback.kind)
            .finish()
    }
}
