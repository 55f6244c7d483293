//! Fixed-size worker pool over a rendezvous work channel
//!
//! One feeder task pushes items onto a capacity-1 channel shared by the
//! workers; each worker reports every finished item on a completion channel.
//! Channels close only by their senders being dropped, so no send is ever cut
//! short. Cancellation stops the feeder; items already handed over still run
//! to completion.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// What a pool run got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Items handed to the pool.
    pub total: usize,
    /// Items the feeder put on the work channel.
    pub dispatched: usize,
    /// Items a worker finished, successfully or not.
    pub completed: usize,
    pub succeeded: usize,
    pub cancelled: bool,
}

impl PoolReport {
    pub fn failed(&self) -> usize {
        self.completed - self.succeeded
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// At least one worker is always started.
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `handler` over every item, `workers` at a time.
    ///
    /// The handler receives the worker index and the item and returns
    /// whether the item succeeded. Returns once every dispatched item has
    /// finished.
    pub async fn run<T, F, Fut>(
        &self,
        items: Vec<T>,
        cancel: CancellationToken,
        handler: F,
    ) -> PoolReport
    where
        T: Send + 'static,
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let total = items.len();
        let mut report = PoolReport { total, ..PoolReport::default() };
        if total == 0 {
            return report;
        }

        let (work_tx, work_rx) = mpsc::channel::<T>(1);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (done_tx, mut done_rx) = mpsc::channel::<bool>(1);
        let handler = Arc::new(handler);

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers.min(total) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let handler = Arc::clone(&handler);
            workers.spawn(async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some(item) = next else { break };
                    let succeeded = (*handler)(worker_id, item).await;
                    if done_tx.send(succeeded).await.is_err() {
                        break;
                    }
                }
                debug!(worker_id, "worker exiting");
            });
        }
        drop(done_tx);
        drop(work_rx);

        let feeder_cancel = cancel.clone();
        let feeder = tokio::spawn(async move {
            let mut dispatched = 0usize;
            for item in items {
                tokio::select! {
                    biased;
                    () = feeder_cancel.cancelled() => break,
                    sent = work_tx.send(item) => {
                        if sent.is_err() {
                            break;
                        }
                        dispatched += 1;
                    }
                }
            }
            dispatched
        });

        loop {
            let signal = if report.cancelled {
                done_rx.recv().await
            } else {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        report.cancelled = true;
                        continue;
                    }
                    signal = done_rx.recv() => signal,
                }
            };

            match signal {
                Some(succeeded) => {
                    report.completed += 1;
                    if succeeded {
                        report.succeeded += 1;
                    }
                    if report.completed == total {
                        break;
                    }
                }
                // every worker has exited
                None => break,
            }
        }

        report.dispatched = match feeder.await {
            Ok(dispatched) => dispatched,
            Err(err) => {
                error!(error = %err, "work feeder task failed");
                report.completed
            }
        };

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "worker task failed");
            }
        }

        report
    }
}
