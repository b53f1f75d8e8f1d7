//! Component registry and preload entry points.
//!
//! [`Deferred`] is the front door: it deduplicates handles per key, wires
//! optimized components to the preload queue and fallback boundaries, and
//! preloads route-predicted components. [`with_preload_trigger`] and
//! [`ComponentPreloader`] cover interaction-driven and imperative preloads.

mod error;
mod optimized;
mod preloader;
mod registry;
mod trigger;

pub use error::RegistryError;
pub use optimized::{OptimizedComponent, OptimizedConfig, PreloadStrategy, DEFAULT_HOVER_DELAY};
pub use preloader::{use_component_preloader, ComponentPreloader, PreloadReport};
pub use registry::Deferred;
pub use trigger::{with_preload_trigger, PreloadTrigger, TriggerKind};
