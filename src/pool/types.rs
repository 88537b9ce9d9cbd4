//! Handler seam, pool configuration, and statistics

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Unit of work the pool knows how to execute.
///
/// Handlers hold only read-only state and are shared across workers via
/// `Arc`. A handler failure is a task outcome, not a pool failure, so it is
/// reported as a plain message rather than a typed error.
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    type Job: Send + 'static;
    type Output: Send + 'static;

    async fn run(&self, job: Self::Job) -> Result<Self::Output, String>;
}

/// Supervisor policy for replacing crashed workers.
///
/// The first replacement is immediate so a transient crash does not reduce
/// capacity; consecutive crashes back off exponentially up to a ceiling and
/// stop entirely at the restart cap, which retires the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartPolicy {
    pub max_restarts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RestartPolicy {
    /// Delay before the nth consecutive replacement of a slot (1-based).
    pub fn backoff_for(&self, restarts: u32) -> Duration {
        if restarts <= 1 {
            return Duration::ZERO;
        }
        let exponent = (restarts - 2).min(16);
        let backoff = self.base_backoff.saturating_mul(1u32 << exponent);
        backoff.min(self.max_backoff)
    }
}

/// Pool construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Requested worker count, clamped to [1, available parallelism].
    pub workers: usize,
    pub task_timeout: Duration,
    /// How long shutdown waits for workers before forcing termination.
    pub shutdown_grace: Duration,
    pub restart: RestartPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: available_parallelism(),
            task_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
            restart: RestartPolicy::default(),
        }
    }
}

impl PoolConfig {
    pub fn clamped_workers(&self) -> usize {
        self.workers.clamp(1, available_parallelism())
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Atomic task and worker counters kept by the pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub timed_out: AtomicU64,
    pub crashed: AtomicU64,
    pub worker_restarts: AtomicU64,
}

impl PoolStats {
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            crashed: self.crashed.load(Ordering::Relaxed),
            worker_restarts: self.worker_restarts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the pool counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub crashed: u64,
    pub worker_restarts: u64,
}
