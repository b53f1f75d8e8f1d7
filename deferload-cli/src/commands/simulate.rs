//! `deferload simulate`: run the loader against synthetic components.
//!
//! Each scenario declares a few components whose producers just sleep (and
//! sometimes fail), then prints a timeline of what the queue, the
//! boundaries or the retry loop did.

use clap::{Args, ValueEnum};
use deferload::deferred::{Deferred, OptimizedConfig};
use deferload::fallback::{ContentVariant, FallbackKind, View};
use deferload::loader::{LoadHandle, LoadOptions, Producer, ProducerError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Priority ordering of background preloads
    Queue,
    /// Show delay and minimum display of fallbacks
    Boundary,
    /// Timeouts and retries of a flaky component
    Retry,
    /// Every scenario in turn
    All,
}

/// Arguments for `deferload simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Scenario to run
    #[arg(long, value_enum, default_value = "all")]
    pub scenario: Scenario,

    /// Override the per-attempt timeout (milliseconds) for the retry scenario
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Override the retry delay (milliseconds) for the retry scenario
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,
}

/// Elapsed-time printer.
#[derive(Clone, Copy)]
struct Timeline {
    start: Instant,
}

impl Timeline {
    fn start(title: &str) -> Self {
        println!();
        println!("{}", title);
        println!("{}", "=".repeat(title.len()));
        Self {
            start: Instant::now(),
        }
    }

    fn event(&self, message: impl AsRef<str>) {
        println!(
            "[+{:>6}ms] {}",
            self.start.elapsed().as_millis(),
            message.as_ref()
        );
    }
}

/// Run the simulate command.
pub fn run(args: SimulateArgs, runner: &CliRunner) -> Result<(), CliError> {
    let deferred = Deferred::from_config(runner.config());
    let mut options = deferred.load_defaults().clone();
    if let Some(ms) = args.timeout_ms {
        if ms == 0 {
            return Err(CliError::Config("--timeout-ms must be greater than 0".to_string()));
        }
        options.timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = args.retry_delay_ms {
        options.retry_delay = Duration::from_millis(ms);
    }

    runner.block_on(async {
        match args.scenario {
            Scenario::Queue => queue_scenario(&deferred).await,
            Scenario::Boundary => boundary_scenario(&deferred).await,
            Scenario::Retry => retry_scenario(&deferred, options).await,
            Scenario::All => {
                queue_scenario(&deferred).await?;
                boundary_scenario(&deferred).await?;
                retry_scenario(&deferred, options).await
            }
        }
    })
}

/// A producer that sleeps `latency` and yields `name`.
fn sleeper(name: &'static str, latency: Duration) -> impl Producer<&'static str> {
    move || async move {
        tokio::time::sleep(latency).await;
        Ok::<_, ProducerError>(name)
    }
}

async fn queue_scenario(deferred: &Deferred) -> Result<(), CliError> {
    let timeline = Timeline::start("Preload queue");
    let components: [(&'static str, i32, u64); 5] = [
        ("pages/employees", 5, 60),
        ("pages/dashboard", 1, 80),
        ("tables/audit-log", 3, 120),
        ("forms/leave-request", 5, 40),
        ("widgets/announcements", 0, 30),
    ];

    let queue = deferred.queue().clone();
    for (name, priority, latency_ms) in components {
        let component = deferred.create_optimized_lazy(
            format!("queue/{}", name),
            sleeper(name, Duration::from_millis(latency_ms)),
            OptimizedConfig::default().with_priority(priority),
        )?;
        timeline.event(format!("queued {:<24} priority {}", name, priority));
        queue.queue_load_with(component.handle().clone(), move |result| match result {
            Ok(()) => timeline.event(format!("loaded {}", name)),
            Err(e) => timeline.event(format!("failed {}: {}", name, e)),
        });
    }

    queue.wait_idle().await;
    let stats = queue.stats();
    timeline.event(format!(
        "idle: {} queued, {} loaded, {} failed",
        stats.queued, stats.succeeded, stats.failed
    ));
    Ok(())
}

async fn boundary_scenario(deferred: &Deferred) -> Result<(), CliError> {
    let timeline = Timeline::start("Fallback boundaries");
    let components: [(&'static str, u64, FallbackKind, ContentVariant); 3] = [
        ("boundary/fast-header", 60, FallbackKind::Header, ContentVariant::Page),
        ("boundary/table", 320, FallbackKind::Content, ContentVariant::Table),
        ("boundary/slow-form", 900, FallbackKind::Content, ContentVariant::Form),
    ];

    let mut mounts = Vec::new();
    for (name, latency_ms, kind, variant) in components {
        let component = deferred.create_optimized_lazy(
            name,
            sleeper(name, Duration::from_millis(latency_ms)),
            OptimizedConfig::default().with_fallback(kind, variant),
        )?;
        let mut boundary = component.render();
        timeline.event(format!("{:<22} mounted, {}", name, describe(&boundary.view())));
        mounts.push(tokio::spawn(async move {
            while let Some(view) = boundary.changed().await {
                timeline.event(format!("{:<22} {}", name, describe(&view)));
            }
        }));
    }

    for mount in futures::future::join_all(mounts).await {
        if let Err(e) = mount {
            tracing::warn!(error = %e, "Boundary observer task failed");
        }
    }
    Ok(())
}

fn describe<T>(view: &View<T>) -> String {
    match view {
        View::Blank => "blank".to_string(),
        View::Fallback(skeleton) => format!(
            "fallback {:?} ({} elements)",
            skeleton.shape,
            skeleton.elements.len()
        ),
        View::Ready(_) => "ready".to_string(),
        View::Failed(e) => format!("failed: {}", e),
    }
}

async fn retry_scenario(deferred: &Deferred, options: LoadOptions) -> Result<(), CliError> {
    let timeline = Timeline::start("Retry and timeout");
    let retry_count = options.retry_count.max(2);
    let options = options.with_retry_count(retry_count);
    let timeout = options.timeout;
    timeline.event(format!(
        "up to {} attempts, timeout {}ms, retry delay {}ms",
        options.max_attempts(),
        timeout.as_millis(),
        options.retry_delay.as_millis()
    ));

    // Attempt 1 hangs past the timeout, attempt 2 is rejected, attempt 3 loads.
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let handle: LoadHandle<&'static str> = deferred.create_lazy(
        "retry/flaky-report",
        move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            timeline.event(format!("attempt {} started", attempt));
            async move {
                match attempt {
                    1 => {
                        tokio::time::sleep(timeout + Duration::from_millis(100)).await;
                        Ok("too late")
                    }
                    2 => Err(ProducerError::new("connection reset")),
                    _ => Ok("report"),
                }
            }
        },
        options,
    )?;

    match handle.load().await {
        Ok(value) => timeline.event(format!("loaded '{}'", value)),
        Err(e) => timeline.event(format!("gave up: {}", e)),
    }
    let stats = handle.stats();
    timeline.event(format!(
        "{} attempts, {} sequence(s), state {}",
        stats.attempts,
        stats.loads_started,
        handle.state()
    ));
    Ok(())
}
