//! Imperative preloading.

use crate::loader::{ComponentKey, LoadError, Preloadable};
use crate::log::{Logger, TracingLogger};
use crate::log_info;
use std::sync::Arc;

/// Outcome of a batch preload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub succeeded: Vec<ComponentKey>,
    pub failed: Vec<(ComponentKey, LoadError)>,
}

impl PreloadReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Preloads components on demand, e.g. when a route is about to change.
#[derive(Clone)]
pub struct ComponentPreloader {
    logger: Arc<dyn Logger>,
}

/// Returns a preloader that logs through `tracing`.
pub fn use_component_preloader() -> ComponentPreloader {
    ComponentPreloader::new(Arc::new(TracingLogger))
}

impl ComponentPreloader {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Preloads one component and waits for it to settle.
    pub async fn preload_component(&self, target: &impl Preloadable) -> Result<(), LoadError> {
        target.start_preload().await
    }

    /// Preloads every target concurrently and waits for all of them.
    ///
    /// Never fails; individual failures are collected in the report.
    pub async fn preload_routes<P: Preloadable>(
        &self,
        targets: impl IntoIterator<Item = P>,
    ) -> PreloadReport {
        let targets: Vec<P> = targets.into_iter().collect();
        let results =
            futures::future::join_all(targets.iter().map(|target| target.start_preload())).await;

        let mut report = PreloadReport::default();
        for (target, result) in targets.iter().zip(results) {
            let key = target.component_key().clone();
            match result {
                Ok(()) => report.succeeded.push(key),
                Err(e) => report.failed.push((key, e)),
            }
        }

        log_info!(
            self.logger,
            "Preloaded {} of {} route components",
            report.succeeded.len(),
            report.total()
        );
        report
    }
}

impl Default for ComponentPreloader {
    fn default() -> Self {
        use_component_preloader()
    }
}

impl std::fmt::Debug for ComponentPreloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentPreloader").finish_non_exhaustive()
    }
}
