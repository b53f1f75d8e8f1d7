//! Boundary configuration.

use super::skeleton::{self, ContentVariant, FallbackKind, Skeleton, SkeletonOptions};
use std::time::Duration;

/// Default window during which no placeholder is shown.
pub const DEFAULT_SHOW_DELAY: Duration = Duration::from_millis(150);

/// Default minimum time (from mount) a shown placeholder stays visible.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(500);

/// Timing rules for one boundary, consumed by the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallbackTimings {
    /// `None` shows the placeholder at mount.
    pub show_delay: Option<Duration>,
    pub min_display: Duration,
}

/// Configuration for [`render`](super::render).
///
/// # Example
///
/// ```
/// use deferload::fallback::{ContentVariant, FallbackConfig, FallbackKind};
/// use std::time::Duration;
///
/// let config = FallbackConfig::new(FallbackKind::Content)
///     .with_variant(ContentVariant::Table)
///     .with_min_display(Duration::from_millis(300));
/// assert_eq!(config.timings().show_delay, Some(Duration::from_millis(150)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackConfig {
    /// Explicit placeholder; overrides `kind`/`variant` selection.
    pub fallback: Option<Skeleton>,
    pub kind: FallbackKind,
    pub variant: ContentVariant,
    pub show_delay: bool,
    pub show_delay_duration: Duration,
    pub min_display: Duration,
    pub skeleton: SkeletonOptions,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            fallback: None,
            kind: FallbackKind::Default,
            variant: ContentVariant::Page,
            show_delay: true,
            show_delay_duration: DEFAULT_SHOW_DELAY,
            min_display: DEFAULT_MIN_DISPLAY,
            skeleton: SkeletonOptions::default(),
        }
    }
}

impl FallbackConfig {
    pub fn new(kind: FallbackKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_variant(mut self, variant: ContentVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_fallback(mut self, fallback: Skeleton) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_show_delay(mut self, enabled: bool) -> Self {
        self.show_delay = enabled;
        self
    }

    pub fn with_show_delay_duration(mut self, delay: Duration) -> Self {
        self.show_delay_duration = delay;
        self
    }

    pub fn with_min_display(mut self, min_display: Duration) -> Self {
        self.min_display = min_display;
        self
    }

    pub fn with_skeleton_options(mut self, options: SkeletonOptions) -> Self {
        self.skeleton = options;
        self
    }

    /// Timing rules derived from this configuration.
    pub fn timings(&self) -> FallbackTimings {
        FallbackTimings {
            show_delay: self.show_delay.then_some(self.show_delay_duration),
            min_display: self.min_display,
        }
    }

    /// The placeholder this boundary shows.
    pub fn skeleton(&self) -> Skeleton {
        match &self.fallback {
            Some(explicit) => explicit.clone(),
            None => skeleton::select(self.kind, self.variant, &self.skeleton),
        }
    }
}

impl From<&crate::config::FallbackSettings> for FallbackConfig {
    fn from(settings: &crate::config::FallbackSettings) -> Self {
        Self {
            show_delay: settings.show_delay,
            show_delay_duration: Duration::from_millis(settings.show_delay_ms),
            min_display: Duration::from_millis(settings.min_display_ms),
            skeleton: SkeletonOptions {
                table_rows: settings.table_rows,
                form_fields: settings.form_fields,
                stagger: Duration::from_millis(settings.stagger_ms),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
