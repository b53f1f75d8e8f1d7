//! Interaction-driven preload triggers.
//!
//! A trigger turns UI-style events into delayed preloads: entering (hover
//! or focus) schedules a preload after a short delay, leaving before the
//! delay elapses cancels it. Preload failures are logged by the handle and
//! never reach the event source.

use crate::loader::{ComponentKey, Preloadable};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Event family that starts a preload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// `pointer_enter` schedules, `pointer_leave` cancels.
    Hover,
    /// `focus` schedules, `blur` cancels.
    Focus,
    /// Schedules once when attached.
    Immediate,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hover => write!(f, "hover"),
            Self::Focus => write!(f, "focus"),
            Self::Immediate => write!(f, "immediate"),
        }
    }
}

#[derive(Default)]
struct TriggerState {
    generation: u64,
    pending: Option<CancellationToken>,
}

struct Shared {
    target: Arc<dyn Preloadable>,
    state: Mutex<TriggerState>,
    fired: AtomicU64,
}

/// Preload trigger attached to one handle.
///
/// Event methods must be called from within a tokio runtime. Dropping the
/// trigger cancels a scheduled preload that has not started yet.
pub struct PreloadTrigger {
    kind: TriggerKind,
    delay: Duration,
    shared: Arc<Shared>,
}

/// Attaches a trigger of `kind` to `target`.
///
/// [`TriggerKind::Immediate`] schedules its preload right away.
///
/// # Example
///
/// ```
/// use deferload::deferred::{with_preload_trigger, TriggerKind};
/// use deferload::loader::{LoadHandle, LoadOptions, ProducerError};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handle = LoadHandle::new("forms/employee", || async { Ok::<_, ProducerError>(()) }, LoadOptions::default());
/// let trigger = with_preload_trigger(handle.clone(), TriggerKind::Hover, Duration::from_millis(100));
///
/// trigger.pointer_enter();
/// tokio::time::sleep(Duration::from_millis(150)).await;
/// assert_eq!(trigger.fired(), 1);
/// # }
/// ```
pub fn with_preload_trigger(
    target: impl Preloadable,
    kind: TriggerKind,
    delay: Duration,
) -> PreloadTrigger {
    let trigger = PreloadTrigger {
        kind,
        delay,
        shared: Arc::new(Shared {
            target: Arc::new(target),
            state: Mutex::new(TriggerState::default()),
            fired: AtomicU64::new(0),
        }),
    };
    if kind == TriggerKind::Immediate {
        trigger.schedule();
    }
    trigger
}

impl PreloadTrigger {
    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn key(&self) -> &ComponentKey {
        self.shared.target.component_key()
    }

    /// Pointer entered the element.
    pub fn pointer_enter(&self) -> bool {
        self.kind == TriggerKind::Hover && self.schedule()
    }

    /// Pointer left the element.
    pub fn pointer_leave(&self) -> bool {
        self.kind == TriggerKind::Hover && self.cancel()
    }

    /// Element gained focus.
    pub fn focus(&self) -> bool {
        self.kind == TriggerKind::Focus && self.schedule()
    }

    /// Element lost focus.
    pub fn blur(&self) -> bool {
        self.kind == TriggerKind::Focus && self.cancel()
    }

    /// True while a scheduled preload is waiting out its delay.
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }

    /// Number of preloads this trigger has started.
    pub fn fired(&self) -> u64 {
        self.shared.fired.load(Ordering::Relaxed)
    }

    /// Schedules a preload after the delay. Returns `false` if one is
    /// already scheduled.
    fn schedule(&self) -> bool {
        let (generation, token) = {
            let mut state = self.shared.state.lock();
            if state.pending.is_some() {
                return false;
            }
            state.generation += 1;
            let token = CancellationToken::new();
            state.pending = Some(token.clone());
            (state.generation, token)
        };

        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        let kind = self.kind;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            {
                let mut state = shared.state.lock();
                if state.generation != generation {
                    return;
                }
                state.pending = None;
            }
            shared.fired.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %shared.target.component_key(), %kind, "Trigger fired preload");

            // Failures are already logged by the handle.
            if let Err(e) = shared.target.start_preload().await {
                tracing::trace!(key = %shared.target.component_key(), error = %e, "Triggered preload failed");
            }
        });
        true
    }

    fn cancel(&self) -> bool {
        match self.shared.state.lock().pending.take() {
            Some(token) => {
                token.cancel();
                tracing::trace!(key = %self.key(), "Cancelled scheduled preload");
                true
            }
            None => false,
        }
    }
}

impl Drop for PreloadTrigger {
    fn drop(&mut self) {
        if let Some(token) = self.shared.state.lock().pending.take() {
            token.cancel();
        }
    }
}

impl fmt::Debug for PreloadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadTrigger")
            .field("key", self.key())
            .field("kind", &self.kind)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
