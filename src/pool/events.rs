//! Lifecycle notifications emitted by the pool
//!
//! Events travel over an explicit channel registered at construction. They
//! carry no control-flow meaning and may be dropped without affecting
//! correctness.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    WorkerCreated { worker_id: usize },
    WorkerCrashed { worker_id: usize },
    WorkerReplaced { worker_id: usize, restarts: u32 },
    /// A worker slot exceeded its restart cap and was taken out of service.
    WorkerRetired { worker_id: usize },
    TaskQueued { task_id: u64 },
    TaskStarted { task_id: u64, worker_id: usize },
    TaskCompleted { task_id: u64, worker_id: usize },
    TaskFailed { task_id: u64, worker_id: usize },
    TaskTimedOut { task_id: u64, worker_id: usize },
    BatchProgress { completed: usize, total: usize },
    Terminated,
}

pub type EventSender = mpsc::UnboundedSender<PoolEvent>;
