//! Worker task loop and report messages

use crate::pool::types::TaskHandler;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// One unit of work handed to a worker.
pub(crate) struct WorkerJob<H: TaskHandler> {
    pub task_id: u64,
    pub payload: H::Job,
}

/// Message from a worker (or one of its timers) back to the dispatcher.
pub(crate) enum WorkerReport<H: TaskHandler> {
    Finished {
        worker_id: usize,
        generation: u64,
        task_id: u64,
        result: Result<H::Output, String>,
    },
    Crashed {
        worker_id: usize,
        generation: u64,
        task_id: u64,
    },
    TimedOut {
        worker_id: usize,
        generation: u64,
        task_id: u64,
    },
    /// A crashed slot's backoff elapsed and it may be respawned.
    RestartDue { worker_id: usize },
}

/// Body of one pooled worker.
///
/// Receives jobs one at a time, so a worker never holds more than one task.
/// A handler panic is caught, reported, and ends the loop; the dispatcher's
/// supervisor decides whether to respawn the slot. Exits quietly when the
/// job channel closes.
pub(crate) async fn worker_loop<H: TaskHandler>(
    worker_id: usize,
    generation: u64,
    handler: Arc<H>,
    mut jobs: mpsc::Receiver<WorkerJob<H>>,
    reports: mpsc::UnboundedSender<WorkerReport<H>>,
) {
    debug!(
        worker_id,
        generation, "WorkerPool: worker {} (gen {}) online", worker_id, generation
    );

    while let Some(job) = jobs.recv().await {
        let task_id = job.task_id;
        let outcome = AssertUnwindSafe(handler.run(job.payload)).catch_unwind().await;
        match outcome {
            Ok(result) => {
                if reports
                    .send(WorkerReport::Finished {
                        worker_id,
                        generation,
                        task_id,
                        result,
                    })
                    .is_err()
                {
                    // dispatcher is gone; nothing left to report to
                    return;
                }
            }
            Err(panic) => {
                error!(
                    worker_id,
                    task_id,
                    "WorkerPool: worker {} crashed executing task {}: {}",
                    worker_id,
                    task_id,
                    panic_message(panic.as_ref())
                );
                let _ = reports.send(WorkerReport::Crashed {
                    worker_id,
                    generation,
                    task_id,
                });
                return;
            }
        }
    }

    debug!(
        worker_id,
        generation, "WorkerPool: worker {} (gen {}) stopped", worker_id, generation
    );
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
