//! Integration tests for the deferred loading workflow.
//!
//! These tests drive the public API end to end:
//! - Retry and timeout behavior of load handles
//! - Single-flight sharing between render, preload and trigger requests
//! - Priority ordering of the preload queue
//! - Fallback timelines of render boundaries
//! - Building a registry from a configuration file

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deferload::config::ConfigFile;
use deferload::deferred::{
    with_preload_trigger, Deferred, OptimizedConfig, PreloadStrategy, TriggerKind,
};
use deferload::fallback::{FallbackConfig, View};
use deferload::loader::{HandleState, LoadError, LoadOptions, Producer, ProducerError};
use deferload::log::{LogLevel, MemoryLogger};
use deferload::queue::QueueConfig;
use parking_lot::Mutex;
use tokio::time::Instant;

// =============================================================================
// Test Helpers
// =============================================================================

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Scripted producer: each attempt sleeps, then fails while `failures`
/// remain.
fn scripted(
    calls: &Arc<AtomicUsize>,
    latency: Duration,
    failures: usize,
) -> impl Producer<String> {
    let calls = Arc::clone(calls);
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(latency).await;
            if n < failures {
                Err(ProducerError::new(format!("attempt {} rejected", n + 1)))
            } else {
                Ok(format!("component after {} failures", n))
            }
        }
    }
}

fn registry(logger: Arc<MemoryLogger>) -> Deferred {
    Deferred::new(
        LoadOptions::default()
            .with_retry_delay(ms(100))
            .with_timeout(ms(5000)),
        QueueConfig::default(),
        FallbackConfig::default(),
        logger,
    )
}

// =============================================================================
// Loader
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_rejections_then_success_with_retry_count_two() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .create_lazy(
            "pages/compliance",
            scripted(&calls, ms(10), 2),
            LoadOptions::default()
                .with_retry_count(2)
                .with_retry_delay(ms(100)),
        )
        .unwrap();
    let start = Instant::now();

    let value = handle.load().await.unwrap();

    assert_eq!(value.as_str(), "component after 2 failures");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Three 10ms attempts and two 100ms waits.
    let elapsed = start.elapsed();
    assert!(elapsed >= ms(230) && elapsed < ms(240), "{:?}", elapsed);
    assert_eq!(handle.stats().attempts, 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .create_lazy(
            "pages/reports",
            scripted(&calls, ms(10), usize::MAX),
            LoadOptions::default()
                .with_retry_count(1)
                .with_retry_delay(ms(50)),
        )
        .unwrap();

    let err = handle.load().await.unwrap_err();

    assert_eq!(err.attempts(), 2);
    assert!(err.to_string().contains("attempt 2 rejected"));
    assert_eq!(handle.state(), HandleState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_as_failed_attempt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .create_lazy(
            "widgets/slow",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    // Only the first attempt hangs.
                    let latency = if n == 0 { ms(5_000) } else { ms(10) };
                    tokio::time::sleep(latency).await;
                    Ok::<_, ProducerError>(n)
                }
            },
            LoadOptions::default()
                .with_retry_count(1)
                .with_retry_delay(ms(100))
                .with_timeout(ms(200)),
        )
        .unwrap();

    assert_eq!(*handle.load().await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_requesters_share_one_attempt_sequence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .lazy("pages/learning", scripted(&calls, ms(100), 0))
        .unwrap();
    let trigger = with_preload_trigger(handle.clone(), TriggerKind::Hover, ms(10));

    trigger.pointer_enter();
    let mut boundary = deferload::fallback::render(&handle, &FallbackConfig::default());
    let preloads: Vec<_> = (0..10).map(|_| handle.preload()).collect();
    let (results, settled) = tokio::join!(futures::future::join_all(preloads), boundary.settled());

    assert!(results.iter().all(|r| r.is_ok()));
    assert!(settled.ready().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(handle.stats().loads_started, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_preload_warns_and_next_render_starts_fresh() {
    let calls = Arc::new(AtomicUsize::new(0));
    let logger = Arc::new(MemoryLogger::new());
    let deferred = registry(Arc::clone(&logger));
    let handle = deferred
        .create_lazy(
            "forms/onboarding",
            scripted(&calls, ms(10), 1),
            LoadOptions::default().with_retry_count(0),
        )
        .unwrap();

    let report = deferred.preloader().preload_routes([handle.clone()]).await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(logger.count(LogLevel::Warn), 1);
    assert_eq!(handle.state(), HandleState::Empty);

    assert!(handle.load().await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Queue
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_queue_drains_by_priority_with_fifo_ties() {
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let order = Arc::new(Mutex::new(Vec::new()));

    // Blocks the drain loop so the rest queue up behind it.
    let blocker = deferred
        .create_optimized_lazy(
            "queue/blocker",
            scripted(&Arc::new(AtomicUsize::new(0)), ms(50), 0),
            OptimizedConfig::default()
                .with_priority(100)
                .with_strategy(PreloadStrategy::Immediate),
        )
        .unwrap();
    tokio::task::yield_now().await;

    let mut entries = Vec::new();
    for (i, priority) in [3, 1, 3, 2].into_iter().enumerate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let component = deferred
            .create_optimized_lazy(
                format!("queue/entry{}", i),
                scripted(&calls, ms(5), 0),
                OptimizedConfig::default().with_priority(priority),
            )
            .unwrap();
        entries.push(component);
    }
    for (i, component) in entries.iter().enumerate() {
        let order = Arc::clone(&order);
        deferred
            .queue()
            .queue_load_with(component.handle().clone(), move |result: Result<(), LoadError>| {
                assert!(result.is_ok());
                order.lock().push(i);
            });
    }

    deferred.queue().wait_idle().await;

    assert_eq!(blocker.handle().state(), HandleState::Resolved);
    assert_eq!(*order.lock(), vec![0, 2, 3, 1]);
}

// =============================================================================
// Boundaries
// =============================================================================

async fn timeline(latency_ms: u64, checkpoints: &[u64]) -> Vec<&'static str> {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .lazy("boundary/timeline", scripted(&calls, ms(latency_ms), 0))
        .unwrap();
    let start = Instant::now();
    let boundary = deferload::fallback::render(&handle, &FallbackConfig::default());

    let mut seen = Vec::new();
    for at in checkpoints {
        tokio::time::sleep_until(start + ms(*at)).await;
        seen.push(boundary.view().label());
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn test_boundary_timelines() {
    // Resolves within the show delay: never a placeholder.
    assert_eq!(timeline(50, &[10, 100, 600]).await, ["blank", "ready", "ready"]);

    // Resolves at 300ms: placeholder from 150ms until the 500ms floor.
    assert_eq!(
        timeline(300, &[100, 160, 350, 490, 510]).await,
        ["blank", "fallback", "fallback", "fallback", "ready"]
    );

    // Resolves at 1000ms: placeholder until then, no extra wait.
    assert_eq!(
        timeline(1000, &[160, 990, 1010]).await,
        ["fallback", "fallback", "ready"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_boundary_shows_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = registry(Arc::new(MemoryLogger::new()));
    let handle = deferred
        .create_lazy(
            "boundary/broken",
            scripted(&calls, ms(10), usize::MAX),
            LoadOptions::default().with_retry_count(1).with_retry_delay(ms(100)),
        )
        .unwrap();

    let mut boundary = deferload::fallback::render(&handle, &FallbackConfig::default());
    match boundary.settled().await {
        View::Failed(err) => assert_eq!(err.attempts(), 2),
        other => panic!("expected failure, got {:?}", other),
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_registry_from_config_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("config.ini");
    std::fs::write(
        &path,
        "[loader]\nretry_count = 0\ntimeout_ms = 50\n\n[fallback]\nshow_delay = false\n",
    )
    .unwrap();
    let config = ConfigFile::load_from(&path).unwrap();
    let deferred = Deferred::from_config(&config);

    let calls = Arc::new(AtomicUsize::new(0));
    let handle = deferred
        .lazy("config/slow", scripted(&calls, ms(100), 0))
        .unwrap();
    let err = handle.load().await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let component = deferred
        .create_optimized_lazy(
            "config/fast",
            scripted(&calls, ms(10), 0),
            OptimizedConfig::default(),
        )
        .unwrap();
    assert!(component.render().view().is_fallback());
}

#[test]
fn test_config_rejects_unbounded_fallback_timing() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("config.ini");
    std::fs::write(&path, "[fallback]\nmin_display_ms = 18446744073709551615\n").unwrap();

    let err = ConfigFile::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("fallback.min_display_ms"), "{}", err);
}
