//! Pool handle and dispatcher actor
//!
//! All pool bookkeeping (queue, worker table) is owned by a single
//! dispatcher task and mutated only there; callers talk to it over
//! channels. FIFO dispatch to free workers is guaranteed; completion order
//! across tasks is not.

use crate::pool::error::PoolError;
use crate::pool::events::{EventSender, PoolEvent};
use crate::pool::types::{PoolConfig, PoolStats, PoolStatsSnapshot, TaskHandler};
use crate::pool::worker::{worker_loop, WorkerJob, WorkerReport};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

enum Command<H: TaskHandler> {
    Submit {
        job: H::Job,
        reply: oneshot::Sender<Result<H::Output, PoolError>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Bounded concurrent executor.
///
/// Construct inside a tokio runtime. The pool is explicitly owned: shut it
/// down when the owning process winds down. Dropping every handle without
/// calling [`WorkerPool::shutdown`] also terminates the dispatcher.
pub struct WorkerPool<H: TaskHandler> {
    commands: mpsc::UnboundedSender<Command<H>>,
    events: Option<EventSender>,
    stats: Arc<PoolStats>,
    size: usize,
}

impl<H: TaskHandler> WorkerPool<H> {
    pub fn new(handler: Arc<H>, config: PoolConfig) -> Self {
        Self::build(handler, config, None)
    }

    /// Create a pool that reports lifecycle events on the given channel.
    pub fn with_events(handler: Arc<H>, config: PoolConfig, events: EventSender) -> Self {
        Self::build(handler, config, Some(events))
    }

    fn build(handler: Arc<H>, config: PoolConfig, events: Option<EventSender>) -> Self {
        let size = config.clamped_workers();
        let stats = Arc::new(PoolStats::default());
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher::new(
            handler,
            config,
            size,
            reports_tx,
            events.clone(),
            Arc::clone(&stats),
        );
        tokio::spawn(dispatcher.run(command_rx, reports_rx));

        info!(workers = size, "WorkerPool: started with {} workers", size);
        Self {
            commands,
            events,
            stats,
            size,
        }
    }

    /// Configured (clamped) worker count.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    /// Enqueue one task and await its result.
    pub async fn submit(&self, job: H::Job) -> Result<H::Output, PoolError> {
        let (reply, result) = oneshot::channel();
        self.commands
            .send(Command::Submit { job, reply })
            .map_err(|_| PoolError::Terminated)?;
        result.await.map_err(|_| PoolError::Terminated)?
    }

    /// Partition `items` into contiguous chunks, submit one task per chunk,
    /// and return the concatenated per-chunk results in chunk order.
    ///
    /// The default chunk size spreads the items evenly over the pool. A
    /// progress event is emitted as each chunk completes; chunks complete
    /// in any order, only the returned concatenation is ordered.
    pub async fn submit_batch<I, O>(
        &self,
        items: Vec<I>,
        batch_size: Option<usize>,
    ) -> Result<Vec<O>, PoolError>
    where
        H: TaskHandler<Job = Vec<I>, Output = Vec<O>>,
        I: Send + 'static,
        O: Send + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = batch_size
            .unwrap_or_else(|| items.len().div_ceil(self.size))
            .max(1);

        let mut chunks: Vec<Vec<I>> = Vec::new();
        let mut rest = items;
        while rest.len() > chunk_size {
            let tail = rest.split_off(chunk_size);
            chunks.push(rest);
            rest = tail;
        }
        chunks.push(rest);

        let total = chunks.len();
        let mut in_flight: FuturesUnordered<_> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| async move { (index, self.submit(chunk).await) })
            .collect();

        let mut results: Vec<Option<Vec<O>>> = (0..total).map(|_| None).collect();
        let mut completed = 0usize;
        let mut first_error: Option<(usize, PoolError)> = None;

        while let Some((index, outcome)) = in_flight.next().await {
            completed += 1;
            self.emit(PoolEvent::BatchProgress { completed, total });
            match outcome {
                Ok(chunk_results) => results[index] = Some(chunk_results),
                Err(e) => {
                    if first_error.as_ref().map(|(i, _)| index < *i).unwrap_or(true) {
                        first_error = Some((index, e));
                    }
                }
            }
        }

        if let Some((_, e)) = first_error {
            return Err(e);
        }
        Ok(results.into_iter().flatten().flatten().collect())
    }

    /// Stop accepting submissions, reject everything still queued, and wait
    /// for the workers to wind down.
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self.commands.send(Command::Shutdown { done }).is_err() {
            // dispatcher already gone
            return;
        }
        let _ = finished.await;
    }

    fn emit(&self, event: PoolEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

struct QueuedTask<H: TaskHandler> {
    task_id: u64,
    job: H::Job,
    reply: oneshot::Sender<Result<H::Output, PoolError>>,
}

struct InFlight<H: TaskHandler> {
    task_id: u64,
    reply: oneshot::Sender<Result<H::Output, PoolError>>,
    timer: JoinHandle<()>,
}

/// One logical worker slot. The spawned worker task may be replaced (new
/// generation, same slot id) after a crash or a timeout; reports from older
/// generations are discarded.
struct WorkerSlot<H: TaskHandler> {
    id: usize,
    generation: u64,
    restarts: u32,
    jobs: Option<mpsc::Sender<WorkerJob<H>>>,
    current: Option<InFlight<H>>,
    join: Option<JoinHandle<()>>,
}

impl<H: TaskHandler> WorkerSlot<H> {
    /// A slot is busy exactly when it holds an in-flight task, so the busy
    /// flag and the current task can never disagree.
    fn is_free(&self) -> bool {
        self.current.is_none() && self.jobs.is_some()
    }
}

struct Dispatcher<H: TaskHandler> {
    handler: Arc<H>,
    config: PoolConfig,
    slots: Vec<WorkerSlot<H>>,
    queue: VecDeque<QueuedTask<H>>,
    reports_tx: mpsc::UnboundedSender<WorkerReport<H>>,
    events: Option<EventSender>,
    stats: Arc<PoolStats>,
    /// Abandoned worker tasks (timed out or crashed generations) that may
    /// still be winding down; joined or aborted at shutdown.
    stale_workers: Vec<JoinHandle<()>>,
    next_task_id: u64,
    next_generation: u64,
}

impl<H: TaskHandler> Dispatcher<H> {
    fn new(
        handler: Arc<H>,
        config: PoolConfig,
        size: usize,
        reports_tx: mpsc::UnboundedSender<WorkerReport<H>>,
        events: Option<EventSender>,
        stats: Arc<PoolStats>,
    ) -> Self {
        let mut dispatcher = Self {
            handler,
            config,
            slots: Vec::with_capacity(size),
            queue: VecDeque::new(),
            reports_tx,
            events,
            stats,
            stale_workers: Vec::new(),
            next_task_id: 0,
            next_generation: 0,
        };
        for id in 0..size {
            dispatcher.slots.push(WorkerSlot {
                id,
                generation: 0,
                restarts: 0,
                jobs: None,
                current: None,
                join: None,
            });
            dispatcher.spawn_worker(id);
            dispatcher.emit(PoolEvent::WorkerCreated { worker_id: id });
        }
        dispatcher
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command<H>>,
        mut reports: mpsc::UnboundedReceiver<WorkerReport<H>>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Submit { job, reply }) => self.enqueue(job, reply),
                    Some(Command::Shutdown { done }) => {
                        self.shutdown().await;
                        let _ = done.send(());
                        return;
                    }
                    None => {
                        // every pool handle was dropped
                        self.shutdown().await;
                        return;
                    }
                },
                Some(report) = reports.recv() => self.handle_report(report),
            }
        }
    }

    fn enqueue(&mut self, job: H::Job, reply: oneshot::Sender<Result<H::Output, PoolError>>) {
        let task_id = self.next_task_id;
        self.next_task_id += 1;
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        self.emit(PoolEvent::TaskQueued { task_id });
        self.queue.push_back(QueuedTask {
            task_id,
            job,
            reply,
        });
        self.dispatch_pending();
    }

    /// Hand queued tasks to free workers, oldest task first.
    fn dispatch_pending(&mut self) {
        loop {
            if self.queue.is_empty() {
                return;
            }
            let Some(slot_index) = self.slots.iter().position(|slot| slot.is_free()) else {
                return;
            };
            let Some(task) = self.queue.pop_front() else {
                return;
            };
            self.dispatch(slot_index, task);
        }
    }

    fn dispatch(&mut self, slot_index: usize, task: QueuedTask<H>) {
        let timeout = self.config.task_timeout;
        let reports = self.reports_tx.clone();
        let QueuedTask {
            task_id,
            job,
            reply,
        } = task;

        let slot = &mut self.slots[slot_index];
        let worker_id = slot.id;
        let generation = slot.generation;
        let Some(jobs) = slot.jobs.as_ref() else {
            // retired slot slipped through is_free; reject loudly
            error!(
                worker_id,
                task_id, "WorkerPool: dispatch to retired worker {}", worker_id
            );
            let _ = reply.send(Err(PoolError::WorkerCrashed));
            return;
        };

        match jobs.try_send(WorkerJob {
            task_id,
            payload: job,
        }) {
            Ok(()) => {
                let timer = tokio::spawn(async move {
                    sleep(timeout).await;
                    let _ = reports.send(WorkerReport::TimedOut {
                        worker_id,
                        generation,
                        task_id,
                    });
                });
                slot.current = Some(InFlight {
                    task_id,
                    reply,
                    timer,
                });
                self.emit(PoolEvent::TaskStarted { task_id, worker_id });
            }
            Err(_) => {
                // an idle worker with a full mailbox means the slot state is
                // inconsistent; reject the task instead of wedging the queue
                error!(
                    worker_id,
                    task_id, "WorkerPool: worker {} refused task {}", worker_id, task_id
                );
                let _ = reply.send(Err(PoolError::WorkerCrashed));
            }
        }
    }

    fn handle_report(&mut self, report: WorkerReport<H>) {
        match report {
            WorkerReport::Finished {
                worker_id,
                generation,
                task_id,
                result,
            } => self.on_finished(worker_id, generation, task_id, result),
            WorkerReport::Crashed {
                worker_id,
                generation,
                ..
            } => self.on_crashed(worker_id, generation),
            WorkerReport::TimedOut {
                worker_id,
                generation,
                task_id,
            } => self.on_timed_out(worker_id, generation, task_id),
            WorkerReport::RestartDue { worker_id } => self.on_restart_due(worker_id),
        }
    }

    fn on_finished(
        &mut self,
        worker_id: usize,
        generation: u64,
        task_id: u64,
        result: Result<H::Output, String>,
    ) {
        let slot = &mut self.slots[worker_id];
        if slot.generation != generation {
            debug!(
                worker_id,
                task_id, "WorkerPool: discarding late result for task {}", task_id
            );
            return;
        }
        let Some(in_flight) = slot.current.take() else {
            return;
        };
        if in_flight.task_id != task_id {
            slot.current = Some(in_flight);
            return;
        }
        in_flight.timer.abort();

        let succeeded = result.is_ok();
        let _ = in_flight.reply.send(result.map_err(PoolError::TaskFailed));

        if succeeded {
            self.stats.completed.fetch_add(1, Ordering::Relaxed);
            self.emit(PoolEvent::TaskCompleted { task_id, worker_id });
        } else {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            self.emit(PoolEvent::TaskFailed { task_id, worker_id });
        }
        self.dispatch_pending();
    }

    /// Supervisor path: reject the lost task, then replace the worker under
    /// the restart policy.
    fn on_crashed(&mut self, worker_id: usize, generation: u64) {
        let policy = self.config.restart.clone();
        let slot = &mut self.slots[worker_id];
        if slot.generation != generation {
            return;
        }
        // the worker task has already exited
        slot.jobs = None;
        slot.join = None;
        slot.restarts += 1;
        let restarts = slot.restarts;
        let in_flight = slot.current.take();

        if let Some(in_flight) = in_flight {
            in_flight.timer.abort();
            let _ = in_flight.reply.send(Err(PoolError::WorkerCrashed));
        }
        self.stats.crashed.fetch_add(1, Ordering::Relaxed);
        self.emit(PoolEvent::WorkerCrashed { worker_id });

        if restarts > policy.max_restarts {
            error!(
                worker_id,
                restarts, "WorkerPool: worker {} exceeded restart cap, retiring slot", worker_id
            );
            self.emit(PoolEvent::WorkerRetired { worker_id });
            return;
        }

        let backoff = policy.backoff_for(restarts);
        warn!(
            worker_id,
            restarts,
            backoff_ms = backoff.as_millis() as u64,
            "WorkerPool: replacing worker {} (restart {})",
            worker_id,
            restarts
        );
        if backoff.is_zero() {
            self.replace_worker(worker_id);
        } else {
            let reports = self.reports_tx.clone();
            tokio::spawn(async move {
                sleep(backoff).await;
                let _ = reports.send(WorkerReport::RestartDue { worker_id });
            });
        }
    }

    fn on_restart_due(&mut self, worker_id: usize) {
        if self.slots[worker_id].jobs.is_some() {
            return;
        }
        self.replace_worker(worker_id);
    }

    /// Timeout path: reject the task, abandon the stuck worker, and bring a
    /// fresh worker up in the same slot. The abandoned worker may run its
    /// task to completion; its result arrives with a stale generation and is
    /// discarded. That residual work is an accepted leak since the substrate
    /// cannot cancel an in-flight future from outside.
    fn on_timed_out(&mut self, worker_id: usize, generation: u64, task_id: u64) {
        let slot = &mut self.slots[worker_id];
        if slot.generation != generation {
            return;
        }
        let current_matches = slot
            .current
            .as_ref()
            .map(|c| c.task_id == task_id)
            .unwrap_or(false);
        if !current_matches {
            return;
        }
        let in_flight = slot.current.take();
        let stale_join = slot.join.take();
        slot.jobs = None;

        if let Some(in_flight) = in_flight {
            let _ = in_flight.reply.send(Err(PoolError::TaskTimeout));
        }
        if let Some(join) = stale_join {
            self.stale_workers.push(join);
        }
        self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
        warn!(
            worker_id,
            task_id, "WorkerPool: task {} timed out, freeing worker {}", task_id, worker_id
        );
        self.emit(PoolEvent::TaskTimedOut { task_id, worker_id });
        self.replace_worker(worker_id);
    }

    fn spawn_worker(&mut self, worker_id: usize) {
        let generation = self.next_generation;
        self.next_generation += 1;
        let (jobs_tx, jobs_rx) = mpsc::channel(1);
        let join = tokio::spawn(worker_loop(
            worker_id,
            generation,
            Arc::clone(&self.handler),
            jobs_rx,
            self.reports_tx.clone(),
        ));
        let slot = &mut self.slots[worker_id];
        slot.generation = generation;
        slot.jobs = Some(jobs_tx);
        slot.join = Some(join);
        slot.current = None;
    }

    fn replace_worker(&mut self, worker_id: usize) {
        self.spawn_worker(worker_id);
        self.stats.worker_restarts.fetch_add(1, Ordering::Relaxed);
        let restarts = self.slots[worker_id].restarts;
        self.emit(PoolEvent::WorkerReplaced {
            worker_id,
            restarts,
        });
        self.dispatch_pending();
    }

    /// Reject the queue, resolve in-flight callers, and wind the workers
    /// down, forcing termination after the grace period.
    async fn shutdown(&mut self) {
        info!(
            queued = self.queue.len(),
            "WorkerPool: terminating, rejecting {} queued tasks",
            self.queue.len()
        );
        while let Some(task) = self.queue.pop_front() {
            let _ = task.reply.send(Err(PoolError::Terminated));
        }

        let mut joins: Vec<JoinHandle<()>> = Vec::new();
        for slot in &mut self.slots {
            if let Some(in_flight) = slot.current.take() {
                // results arriving after shutdown begins are ignored
                in_flight.timer.abort();
                let _ = in_flight.reply.send(Err(PoolError::Terminated));
            }
            slot.jobs = None;
            if let Some(join) = slot.join.take() {
                joins.push(join);
            }
        }
        joins.append(&mut self.stale_workers);

        let grace = self.config.shutdown_grace;
        let wind_down = tokio::time::timeout(grace, async {
            for join in &mut joins {
                if let Err(e) = join.await {
                    // termination errors are logged, never propagated
                    warn!(error = %e, "WorkerPool: worker ended abnormally during shutdown");
                }
            }
        })
        .await;
        if wind_down.is_err() {
            warn!("WorkerPool: grace period elapsed, aborting remaining workers");
            for join in &joins {
                join.abort();
            }
        }

        self.emit(PoolEvent::Terminated);
        info!("WorkerPool: terminated");
    }

    fn emit(&self, event: PoolEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
