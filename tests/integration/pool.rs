//! Integration tests for the worker pool
//!
//! Covers dispatch, bounded concurrency, crash recovery, timeouts, batch
//! submission, and shutdown semantics.

use async_trait::async_trait;
use quantrix::pool::{PoolConfig, PoolError, PoolEvent, TaskHandler, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;

fn test_config(workers: usize) -> PoolConfig {
    PoolConfig {
        workers,
        task_timeout: Duration::from_secs(5),
        shutdown_grace: Duration::from_millis(250),
        ..PoolConfig::default()
    }
}

struct EchoHandler;

#[async_trait]
impl TaskHandler for EchoHandler {
    type Job = u64;
    type Output = u64;

    async fn run(&self, job: u64) -> Result<u64, String> {
        Ok(job * 2)
    }
}

/// Tracks how many tasks run at the same instant.
struct GaugeHandler {
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl TaskHandler for GaugeHandler {
    type Job = u64;
    type Output = u64;

    async fn run(&self, job: u64) -> Result<u64, String> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(20)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(job)
    }
}

/// Panics on demand, fails on demand, succeeds otherwise.
struct FlakyHandler;

#[async_trait]
impl TaskHandler for FlakyHandler {
    type Job = &'static str;
    type Output = &'static str;

    async fn run(&self, job: &'static str) -> Result<&'static str, String> {
        match job {
            "panic" => panic!("induced crash"),
            "fail" => Err("induced failure".to_string()),
            other => Ok(other),
        }
    }
}

/// Sleeps for the requested number of milliseconds.
struct SlowHandler;

#[async_trait]
impl TaskHandler for SlowHandler {
    type Job = u64;
    type Output = u64;

    async fn run(&self, job: u64) -> Result<u64, String> {
        sleep(Duration::from_millis(job)).await;
        Ok(job)
    }
}

/// Records the order in which tasks start.
struct RecordingHandler {
    started: Mutex<Vec<u64>>,
}

#[async_trait]
impl TaskHandler for RecordingHandler {
    type Job = u64;
    type Output = ();

    async fn run(&self, job: u64) -> Result<(), String> {
        self.started.lock().await.push(job);
        sleep(Duration::from_millis(5)).await;
        Ok(())
    }
}

/// Doubles a chunk of numbers.
struct ChunkHandler;

#[async_trait]
impl TaskHandler for ChunkHandler {
    type Job = Vec<u64>;
    type Output = Vec<u64>;

    async fn run(&self, job: Vec<u64>) -> Result<Vec<u64>, String> {
        Ok(job.into_iter().map(|n| n * 2).collect())
    }
}

#[tokio::test]
async fn pool_runs_a_task_and_returns_its_result() {
    let pool = WorkerPool::new(Arc::new(EchoHandler), test_config(2));
    assert_eq!(pool.submit(21).await, Ok(42));
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_never_runs_more_tasks_than_workers() {
    let handler = Arc::new(GaugeHandler {
        active: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let pool = WorkerPool::new(Arc::clone(&handler), test_config(2));

    let tasks: Vec<_> = (0..16).map(|n| pool.submit(n)).collect();
    let results = futures_util::future::join_all(tasks).await;
    assert!(results.iter().all(|r| r.is_ok()));

    assert!(handler.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(pool.stats().completed, 16);
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_dispatches_queued_tasks_in_submission_order() {
    let handler = Arc::new(RecordingHandler {
        started: Mutex::new(Vec::new()),
    });
    let pool = WorkerPool::new(Arc::clone(&handler), test_config(1));

    let tasks: Vec<_> = (0..5).map(|n| pool.submit(n)).collect();
    futures_util::future::join_all(tasks).await;

    let started = handler.started.lock().await.clone();
    assert_eq!(started, vec![0, 1, 2, 3, 4]);
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_reports_handler_failures_as_task_failed() {
    let pool = WorkerPool::new(Arc::new(FlakyHandler), test_config(2));
    let outcome = pool.submit("fail").await;
    assert_eq!(
        outcome,
        Err(PoolError::TaskFailed("induced failure".to_string()))
    );
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_replaces_a_crashed_worker_and_keeps_serving() {
    let pool = WorkerPool::new(Arc::new(FlakyHandler), test_config(2));

    assert_eq!(pool.submit("panic").await, Err(PoolError::WorkerCrashed));

    // the replacement worker picks up new work; full capacity is preserved
    let tasks: Vec<_> = (0..4).map(|_| pool.submit("ok")).collect();
    let results = futures_util::future::join_all(tasks).await;
    assert!(results.iter().all(|r| *r == Ok("ok")));

    let stats = pool.stats();
    assert_eq!(stats.crashed, 1);
    assert!(stats.worker_restarts >= 1);
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_times_out_stuck_tasks_and_frees_the_worker() {
    let config = PoolConfig {
        workers: 1,
        task_timeout: Duration::from_millis(50),
        shutdown_grace: Duration::from_millis(100),
        ..PoolConfig::default()
    };
    let pool = WorkerPool::new(Arc::new(SlowHandler), config);

    // far beyond the deadline; the worker slot is forcibly freed
    assert_eq!(pool.submit(5_000).await, Err(PoolError::TaskTimeout));

    // the freed slot serves the next task even though the abandoned job is
    // still sleeping somewhere
    assert_eq!(pool.submit(1).await, Ok(1));
    assert_eq!(pool.stats().timed_out, 1);
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_rejects_submissions_after_shutdown() {
    let pool = WorkerPool::new(Arc::new(EchoHandler), test_config(2));
    pool.shutdown().await;
    assert_eq!(pool.submit(1).await, Err(PoolError::Terminated));
}

#[tokio::test]
async fn pool_rejects_queued_tasks_on_shutdown() {
    let pool = Arc::new(WorkerPool::new(Arc::new(SlowHandler), test_config(1)));

    // occupy the only worker, then queue more work behind it
    let blocker = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.submit(300).await })
    };
    let queued = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.submit(1).await })
    };
    sleep(Duration::from_millis(30)).await;

    pool.shutdown().await;

    let queued_outcome = queued.await.expect("queued task join");
    assert_eq!(queued_outcome, Err(PoolError::Terminated));
    // the in-flight task is not awaited to completion either; its caller
    // learns the pool went away
    let blocked_outcome = blocker.await.expect("blocker task join");
    assert_eq!(blocked_outcome, Err(PoolError::Terminated));
}

#[tokio::test]
async fn batch_results_come_back_in_chunk_order() {
    let pool = WorkerPool::new(Arc::new(ChunkHandler), test_config(4));

    let items: Vec<u64> = (0..10).collect();
    let doubled = pool
        .submit_batch(items, Some(3))
        .await
        .expect("batch should succeed");
    let expected: Vec<u64> = (0..10).map(|n| n * 2).collect();
    assert_eq!(doubled, expected);
    pool.shutdown().await;
}

#[tokio::test]
async fn batch_defaults_to_one_chunk_per_worker() {
    let pool = WorkerPool::new(Arc::new(ChunkHandler), test_config(4));

    let items: Vec<u64> = (0..100).collect();
    let doubled = pool
        .submit_batch(items, None)
        .await
        .expect("batch should succeed");
    assert_eq!(doubled.len(), 100);
    assert_eq!(doubled[0], 0);
    assert_eq!(doubled[99], 198);
    pool.shutdown().await;
}

#[tokio::test]
async fn pool_emits_lifecycle_events() {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let pool = WorkerPool::with_events(Arc::new(EchoHandler), test_config(2), events_tx);

    pool.submit(7).await.expect("task should succeed");
    pool.shutdown().await;

    let mut seen = Vec::new();
    while let Ok(event) = events_rx.try_recv() {
        seen.push(event);
    }
    assert!(seen.iter().any(|e| matches!(e, PoolEvent::WorkerCreated { .. })));
    assert!(seen.iter().any(|e| matches!(e, PoolEvent::TaskQueued { .. })));
    assert!(seen.iter().any(|e| matches!(e, PoolEvent::TaskStarted { .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, PoolEvent::TaskCompleted { .. })));
    assert!(seen.iter().any(|e| matches!(e, PoolEvent::Terminated)));
}
