//! Suspense/fallback coordination.
//!
//! Decides what a render boundary shows while a component loads:
//!
//! - nothing, if the load finishes within the show delay (150ms by default),
//! - a placeholder skeleton once the delay has passed,
//! - the content, but no earlier than the minimum display time after
//!   mount (500ms by default) if a placeholder was shown.
//!
//! The view never moves backwards within one mount.

mod boundary;
mod config;
mod machine;
mod skeleton;

pub use boundary::{render, Boundary, View};
pub use config::{FallbackConfig, FallbackTimings, DEFAULT_MIN_DISPLAY, DEFAULT_SHOW_DELAY};
pub use machine::{BoundaryMachine, BoundaryPhase, Visible};
pub use skeleton::{
    select, ContentVariant, ElementRole, FallbackKind, Skeleton, SkeletonElement,
    SkeletonOptions, SkeletonShape,
};
