//! Render boundaries.
//!
//! [`render`] mounts a boundary around a load handle. The boundary publishes
//! what should be on screen as a [`View`] through a `watch` channel, driven
//! by a [`BoundaryMachine`] and its timers on a background task.

use super::config::FallbackConfig;
use super::machine::{BoundaryMachine, Visible};
use super::skeleton::Skeleton;
use crate::loader::{LoadError, LoadHandle};
use futures::future::BoxFuture;
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// What a boundary currently shows.
pub enum View<T> {
    /// Nothing yet; the show delay has not elapsed.
    Blank,
    Fallback(Arc<Skeleton>),
    Ready(Arc<T>),
    Failed(LoadError),
}

impl<T> View<T> {
    /// True for `Ready` and `Failed`.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Short label, for logs and timelines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Fallback(_) => "fallback",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Blank => Self::Blank,
            Self::Fallback(skeleton) => Self::Fallback(Arc::clone(skeleton)),
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::Failed(error) => Self::Failed(error.clone()),
        }
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "Blank"),
            Self::Fallback(skeleton) => write!(f, "Fallback({:?})", skeleton.shape),
            Self::Ready(_) => write!(f, "Ready"),
            Self::Failed(error) => write!(f, "Failed({})", error),
        }
    }
}

/// A mounted boundary. Dropping it unmounts.
pub struct Boundary<T> {
    view: watch::Receiver<View<T>>,
    cancel: CancellationToken,
    _unmount_on_drop: DropGuard,
}

impl<T: Send + Sync + 'static> Boundary<T> {
    /// Current view.
    pub fn view(&self) -> View<T> {
        self.view.borrow().clone()
    }

    /// A receiver that observes every later view change.
    pub fn subscribe(&self) -> watch::Receiver<View<T>> {
        self.view.clone()
    }

    /// Waits for the next view change; `None` once the boundary is settled
    /// or unmounted.
    pub async fn changed(&mut self) -> Option<View<T>> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }

    /// Waits until the view is `Ready` or `Failed` and returns it.
    ///
    /// If the boundary is unmounted first, returns the last view.
    pub async fn settled(&mut self) -> View<T> {
        loop {
            let current = self.view.borrow_and_update().clone();
            if current.is_settled() {
                return current;
            }
            if self.view.changed().await.is_err() {
                return self.view.borrow().clone();
            }
        }
    }

    /// Unmounts without waiting for the boundary to be dropped. Pending
    /// timers stop; the underlying load keeps running.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> fmt::Debug for Boundary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boundary")
            .field("view", &*self.view.borrow())
            .field("unmounted", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Mounts a boundary around `handle`.
///
/// An already resolved handle renders `Ready` straight away. Otherwise a
/// render request is issued and the view follows the show-delay and
/// minimum-display rules of `config`. Must be called within a tokio runtime
/// unless the handle is already resolved.
///
/// # Example
///
/// ```
/// use deferload::fallback::{render, FallbackConfig, FallbackKind, View};
/// use deferload::loader::{LoadHandle, LoadOptions, ProducerError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handle = LoadHandle::new("reports/list", || async { Ok::<_, ProducerError>(7u32) }, LoadOptions::default());
/// let mut boundary = render(&handle, &FallbackConfig::new(FallbackKind::Content));
///
/// match boundary.settled().await {
///     View::Ready(value) => assert_eq!(*value, 7),
///     other => panic!("unexpected view {:?}", other),
/// }
/// # }
/// ```
pub fn render<T: Send + Sync + 'static>(
    handle: &LoadHandle<T>,
    config: &FallbackConfig,
) -> Boundary<T> {
    let cancel = CancellationToken::new();
    let mut machine = BoundaryMachine::new(config.timings());
    let now = Instant::now();

    let (tx, rx) = match handle.get() {
        Some(value) => {
            machine.mount(now, true);
            tracing::trace!(key = %handle.key(), "Boundary mounted on resolved component");
            // Sender dropped at once: the view is final.
            let (_, rx) = watch::channel(View::Ready(value));
            (None, rx)
        }
        None => {
            let skeleton = Arc::new(config.skeleton());
            let initial = view_for(machine.mount(now, false), &skeleton, None);
            let (tx, rx) = watch::channel(initial);
            (Some((tx, skeleton)), rx)
        }
    };

    if let Some((tx, skeleton)) = tx {
        tracing::debug!(
            key = %handle.key(),
            shape = ?skeleton.shape,
            "Boundary suspended on pending component"
        );
        tokio::spawn(drive(
            machine,
            handle.clone().into_future(),
            skeleton,
            tx,
            cancel.clone(),
        ));
    }

    Boundary {
        view: rx,
        _unmount_on_drop: cancel.clone().drop_guard(),
        cancel,
    }
}

fn view_for<T>(visible: Visible, skeleton: &Arc<Skeleton>, value: Option<&Arc<T>>) -> View<T> {
    match (visible, value) {
        (Visible::Content, Some(value)) => View::Ready(Arc::clone(value)),
        (Visible::Fallback, _) | (Visible::Content, None) => View::Fallback(Arc::clone(skeleton)),
        // Errors are published directly by the driver.
        (Visible::Nothing, _) | (Visible::Error, _) => View::Blank,
    }
}

async fn drive<T: Send + Sync + 'static>(
    mut machine: BoundaryMachine,
    mut load: BoxFuture<'static, Result<Arc<T>, LoadError>>,
    skeleton: Arc<Skeleton>,
    tx: watch::Sender<View<T>>,
    cancel: CancellationToken,
) {
    let mut value: Option<Arc<T>> = None;
    let mut shown = machine.visible();

    loop {
        let deadline = machine.deadline();
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        let visible = tokio::select! {
            _ = cancel.cancelled() => {
                machine.unmount();
                tracing::trace!("Boundary unmounted");
                return;
            }
            result = &mut load, if value.is_none() => match result {
                Ok(loaded) => {
                    value = Some(loaded);
                    machine.content_ready(Instant::now())
                }
                Err(error) => {
                    machine.fail();
                    tracing::debug!(error = %error, "Boundary load failed");
                    tx.send_replace(View::Failed(error));
                    return;
                }
            },
            _ = timer => machine.timer_elapsed(Instant::now()),
        };

        if visible != shown {
            shown = visible;
            tx.send_replace(view_for(visible, &skeleton, value.as_ref()));
        }
        if machine.phase().is_terminal() {
            return;
        }
    }
}
