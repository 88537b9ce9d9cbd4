//! Pool error taxonomy
//!
//! Pool-level failures are distinct, inspectable outcomes. They are reported
//! to the submitting caller and never silently swallowed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Submission after shutdown. Permanent: do not retry against this pool.
    #[error("pool has been terminated")]
    Terminated,

    /// The task was lost to an abnormal worker exit. The pool replaces the
    /// worker; the caller may resubmit.
    #[error("worker crashed while executing the task")]
    WorkerCrashed,

    /// The task exceeded its deadline. The caller may resubmit with a
    /// longer deadline or treat the data as unavailable.
    #[error("task exceeded its deadline")]
    TaskTimeout,

    /// The handler itself reported a failure.
    #[error("task failed: {0}")]
    TaskFailed(String),
}
