//! The perpetual sweep over the configured feeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::config::{format_interval, PollerConfig, WorkerConfig};
use crate::pipeline::WorkQueue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub feeds_ok: usize,
    pub feeds_failed: usize,
    pub items_seen: usize,
    pub items_queued: usize,
}

pub struct Poller {
    ctx: Arc<AppContext>,
    config: PollerConfig,
    workers: WorkerConfig,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Poller {
    pub fn new(ctx: Arc<AppContext>, config: PollerConfig, workers: WorkerConfig) -> Self {
        Self {
            ctx,
            config,
            workers,
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    fn spawn_queue(&self) -> WorkQueue {
        WorkQueue::spawn(
            self.ctx.clone(),
            self.workers.count,
            self.workers.queue_capacity,
        )
    }

    /// Fetch every feed once and queue its newest items.
    ///
    /// A feed that fails to load is logged and skipped.
    pub async fn sweep(&self, queue: &WorkQueue) -> SweepStats {
        let mut stats = SweepStats::default();
        info!("Getting submissions");

        for feed in &self.config.feeds {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let items = match self.ctx.feed.newest(feed, self.config.items_per_feed).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(%feed, error = %e, "Failed to fetch submissions");
                    stats.feeds_failed += 1;
                    continue;
                }
            };

            stats.feeds_ok += 1;
            stats.items_seen += items.len();
            for item in items {
                if queue.enqueue(item).await {
                    stats.items_queued += 1;
                }
            }
        }

        stats
    }

    /// Sweep once and wait for every queued item to finish.
    pub async fn run_once(&self) -> SweepStats {
        let queue = self.spawn_queue();
        let stats = self.sweep(&queue).await;
        queue.shutdown().await;
        stats
    }

    /// Sweep, sleep, repeat until a [`stop_handle`](Self::stop_handle) fires or SIGINT/SIGTERM.
    pub async fn run(&self) {
        self.install_signal_handler();

        let interval = self.config.interval();
        info!(
            "Poller started (interval: {}, feeds: {}, workers: {})",
            format_interval(interval.as_secs()),
            self.config.feeds.len(),
            self.workers.count
        );

        let queue = self.spawn_queue();

        while self.running.load(Ordering::SeqCst) {
            let start = Instant::now();
            let stats = self.sweep(&queue).await;
            info!(
                "Sweep complete: {} feeds, {} failed, {} items, {} queued ({:.1}s)",
                stats.feeds_ok,
                stats.feeds_failed,
                stats.items_seen,
                stats.items_queued,
                start.elapsed().as_secs_f64()
            );

            self.sleep(interval).await;
        }

        info!("Poller shutting down...");
        queue.shutdown().await;
    }

    async fn sleep(&self, interval: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = self.wake.notified() => {},
        }
    }

    /// Callback that ends [`run`](Self::run) after the current sweep
    pub fn stop_handle(&self) -> impl Fn() + Send + Sync + 'static {
        let running = self.running.clone();
        let wake = self.wake.clone();
        move || {
            running.store(false, Ordering::SeqCst);
            wake.notify_one();
        }
    }

    fn install_signal_handler(&self) {
        let stop = self.stop_handle();

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    _ => {
                        warn!("Failed to set up signal handlers");
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            stop();
        });

        #[cfg(not(unix))]
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            stop();
        });
    }
}
