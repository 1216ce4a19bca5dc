//! Demo host for the delay scheduler.
//!
//! Starts a dispatcher and a scheduler, schedules a few events (cancelling
//! one of them), waits for them to fire and shuts both down in order.
//!
//! Usage: `delay-scheduler-demo [config.toml]`
//!
//! Tracing output goes to stderr; set `RUST_LOG=delay_scheduler=debug` for
//! per-event detail.

use delay_scheduler::{Config, Dispatcher, ExecutionFacility, TaskScheduler, create_scheduler_task};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path)
            .map_err(|e| anyhow::anyhow!("cannot load {}: {e}", path.display()))?,
        None => Config::default(),
    };

    let dispatcher = Arc::new(Dispatcher::start(&config.dispatcher)?);
    let facility: Arc<dyn ExecutionFacility> = dispatcher.clone();
    let scheduler = TaskScheduler::start(&config.scheduler, facility)?;

    let slow = scheduler.add_event(create_scheduler_task(150, || {
        tracing::info!("slow event fired");
    }));
    let fast = scheduler.add_event(create_scheduler_task(30, || {
        tracing::info!("fast event fired");
    }));
    let doomed = scheduler.add_event(create_scheduler_task(100, || {
        tracing::error!("cancelled event fired");
    }));
    tracing::info!("scheduled events slow={slow} fast={fast} doomed={doomed}");

    std::thread::sleep(Duration::from_millis(10));
    let cancelled = scheduler.stop_event(doomed);
    tracing::info!("cancel event {doomed}: {cancelled}");

    std::thread::sleep(Duration::from_millis(300));

    scheduler.shutdown();
    scheduler.join();
    dispatcher.shutdown();
    dispatcher.join();

    tracing::info!(
        "done: {} executed, {} expired",
        dispatcher.executed_count(),
        dispatcher.expired_count()
    );
    Ok(())
}
