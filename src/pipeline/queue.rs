use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::AppContext;
use crate::domain::Item;
use crate::pipeline::process_item;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Item ids queued or being processed
type InFlight = Arc<Mutex<HashSet<String>>>;

/// Bounded queue of items drained by a fixed pool of workers.
///
/// `enqueue` waits while the queue is full, so a slow pipeline slows the
/// poller down instead of piling up tasks.
pub struct WorkQueue {
    tx: mpsc::Sender<Item>,
    in_flight: InFlight,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    pub fn spawn(ctx: Arc<AppContext>, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(AsyncMutex::new(rx));
        let in_flight: InFlight = Arc::new(Mutex::new(HashSet::new()));

        let workers = (0..workers.max(1))
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    ctx.clone(),
                    rx.clone(),
                    in_flight.clone(),
                ))
            })
            .collect();

        Self {
            tx,
            in_flight,
            workers,
        }
    }

    /// Queue `item` for processing.
    ///
    /// Returns `false` if the same item is already queued or running.
    pub async fn enqueue(&self, item: Item) -> bool {
        {
            let mut in_flight = match self.in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !in_flight.insert(item.id.clone()) {
                debug!(item = %item.id, "Already in flight");
                return false;
            }
        }

        let id = item.id.clone();
        if let Err(e) = self.tx.send(item).await {
            warn!(item = %id, "Work queue closed: {}", e);
            release(&self.in_flight, &id);
            return false;
        }
        true
    }

    /// Number of items queued or being processed
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Stop accepting work and wait for queued items to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!("Worker join error: {}", e);
            }
        }
        info!("Work queue drained");
    }
}

async fn run_worker(
    worker: usize,
    ctx: Arc<AppContext>,
    rx: Arc<AsyncMutex<mpsc::Receiver<Item>>>,
    in_flight: InFlight,
) {
    debug!(worker, "Worker started");

    loop {
        let next = rx.lock().await.recv().await;
        let Some(item) = next else { break };

        let id = item.id.clone();
        let task_ctx = ctx.clone();
        let task_item = item.clone();
        let task = tokio::spawn(async move { process_item(&task_ctx, &task_item).await });

        match task.await {
            Ok(outcome) => debug!(worker, item = %id, ?outcome, "Item done"),
            Err(e) => {
                // Panicked mid-pipeline: finish the item so it is not retried forever
                error!(worker, item = %id, error = %e, "Item task aborted");
                ctx.responder.finalize(&item).await;
            }
        }

        release(&in_flight, &id);
    }

    debug!(worker, "Worker stopped");
}

fn release(in_flight: &InFlight, id: &str) {
    match in_flight.lock() {
        Ok(mut set) => {
            set.remove(id);
        }
        Err(poisoned) => {
            poisoned.into_inner().remove(id);
        }
    }
}
