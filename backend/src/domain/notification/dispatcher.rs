//! Bounded notification queue served by a fixed pool of worker tasks.
//!
//! One `async-channel` queue of capacity `C` is shared by all `W` workers;
//! whichever worker is idle takes the next job. [`NotificationDispatcher::enqueue`]
//! tries the queue without waiting and, when it is full, waits for at most
//! the enqueue timeout before dropping the job with a `warn` log.
//!
//! Shutdown closes the queue once (new enqueues fail fast), lets the workers
//! drain whatever is left, then joins them within the grace period and
//! aborts whatever is still running.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, error, info, warn};

use super::NotificationJob;
use crate::domain::ports::TicketNotifier;
use crate::domain::{TicketId, TraceId};

const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_WORKER_COUNT: usize = 4;
const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(250);

/// Sizing and backpressure settings for the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Capacity `C` of the shared queue.
    pub queue_capacity: usize,
    /// Number of worker tasks `W`.
    pub worker_count: usize,
    /// How long `enqueue` waits for space before dropping the job.
    pub enqueue_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    fn validate(&self) -> Result<(), DispatcherConfigError> {
        if self.worker_count == 0 {
            return Err(DispatcherConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(DispatcherConfigError::NoCapacity);
        }
        Ok(())
    }
}

/// Rejected pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatcherConfigError {
    /// `worker_count` was zero.
    #[error("notification worker count must be at least 1")]
    NoWorkers,
    /// `queue_capacity` was zero.
    #[error("notification queue capacity must be at least 1")]
    NoCapacity,
}

/// Why a job was not accepted. Never surfaced to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue stayed full for the whole enqueue timeout; the job was
    /// dropped.
    #[error("notification queue is full")]
    Full,
    /// The dispatcher has been shut down.
    #[error("notification queue is closed")]
    Closed,
}

/// Outcome of [`NotificationDispatcher::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that drained the queue and exited within the grace period.
    pub drained: usize,
    /// Workers aborted at the deadline, or lost to a panic.
    pub aborted: usize,
}

/// Fixed pool of notification workers fed through one bounded queue.
pub struct NotificationDispatcher {
    queue: Sender<NotificationJob>,
    runtime: Handle,
    closed: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
    config: DispatcherConfig,
}

impl NotificationDispatcher {
    /// Spawn the worker pool on the current tokio runtime. Hand-offs from
    /// [`NotificationDispatcher::spawn_enqueue`] run on the same runtime.
    ///
    /// # Errors
    /// Returns [`DispatcherConfigError`] when the configuration asks for no
    /// workers or no capacity.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn start(
        config: DispatcherConfig,
        notifier: Arc<dyn TicketNotifier>,
    ) -> Result<Self, DispatcherConfigError> {
        config.validate()?;
        let (queue, jobs) = async_channel::bounded(config.queue_capacity);

        let workers = (0..config.worker_count)
            .map(|index| tokio::spawn(run_worker(index, jobs.clone(), Arc::clone(&notifier))))
            .collect();

        info!(
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            enqueue_timeout_ms = u64::try_from(config.enqueue_timeout.as_millis()).unwrap_or(u64::MAX),
            "notification dispatcher started"
        );

        Ok(Self {
            queue,
            runtime: Handle::current(),
            closed: AtomicBool::new(false),
            workers: Mutex::new(workers),
            config,
        })
    }

    /// Configuration the pool was started with.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Whether [`NotificationDispatcher::shutdown`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Jobs accepted but not yet taken by a worker. Never exceeds the
    /// configured capacity.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue a notification for `ticket_id`, tagged with the trace id in
    /// scope.
    ///
    /// # Errors
    /// Returns [`QueueError::Full`] when no slot freed up within the enqueue
    /// timeout and [`QueueError::Closed`] after shutdown.
    pub async fn enqueue(&self, ticket_id: TicketId) -> Result<(), QueueError> {
        self.enqueue_job(NotificationJob::for_ticket(ticket_id)).await
    }

    /// Queue a prepared job.
    ///
    /// # Errors
    /// See [`NotificationDispatcher::enqueue`].
    pub async fn enqueue_job(&self, job: NotificationJob) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }

        match self.queue.try_send(job) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(QueueError::Closed),
            Err(TrySendError::Full(_)) => {}
        }

        match tokio::time::timeout(self.config.enqueue_timeout, self.queue.send(job)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(QueueError::Closed),
            Err(_) => {
                let trace_id = job.trace_id.map(|id| id.to_string());
                warn!(
                    ticket_id = %job.ticket_id,
                    trace_id = trace_id.as_deref(),
                    timeout_ms = u64::try_from(self.config.enqueue_timeout.as_millis()).unwrap_or(u64::MAX),
                    "notification queue full; dropping job"
                );
                Err(QueueError::Full)
            }
        }
    }

    /// Enqueue `job` on a task owned by the dispatcher's runtime.
    ///
    /// The task outlives the caller's runtime, so a request handler on a
    /// stopping worker thread cannot drop the hand-off. Rejections are
    /// logged here.
    pub fn spawn_enqueue(self: &Arc<Self>, job: NotificationJob) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        self.runtime.spawn(
            async move {
                match dispatcher.enqueue_job(job).await {
                    // Full is already logged by enqueue_job.
                    Ok(()) | Err(QueueError::Full) => {}
                    Err(QueueError::Closed) => {
                        warn!(ticket_id = %job.ticket_id, "notification dispatcher closed; dropping job");
                    }
                }
            }
            .instrument(Span::current()),
        )
    }

    /// Stop accepting jobs, drain the queue and join the workers.
    ///
    /// Workers still running when `grace` elapses are aborted. Only the
    /// first call does any work; later calls return an empty report.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("notification dispatcher already shut down");
            return ShutdownReport::default();
        }
        // Workers keep receiving buffered jobs until the queue is empty.
        self.queue.close();

        let handles = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        let deadline = tokio::time::Instant::now() + grace;
        let mut report = ShutdownReport::default();
        for mut handle in handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => report.drained += 1,
                Ok(Err(join_error)) => {
                    error!(error = %join_error, "notification worker failed during shutdown");
                    report.aborted += 1;
                }
                Err(_) => {
                    handle.abort();
                    report.aborted += 1;
                }
            }
        }

        let abandoned = self.queue.len();
        if abandoned > 0 {
            warn!(abandoned, "notification jobs left undelivered at shutdown");
        }
        info!(
            drained = report.drained,
            aborted = report.aborted,
            "notification dispatcher stopped"
        );
        report
    }
}

async fn run_worker(index: usize, jobs: Receiver<NotificationJob>, notifier: Arc<dyn TicketNotifier>) {
    while let Ok(job) = jobs.recv().await {
        deliver(index, notifier.as_ref(), job).await;
    }
    debug!(worker = index, "notification worker exited");
}

async fn deliver(worker: usize, notifier: &dyn TicketNotifier, job: NotificationJob) {
    let attempt = TraceId::scope_optional(
        job.trace_id,
        AssertUnwindSafe(notifier.ticket_created(&job)).catch_unwind(),
    )
    .await;
    let trace_id = job.trace_id.map(|id| id.to_string());
    let trace_id = trace_id.as_deref();
    match attempt {
        Ok(Ok(())) => debug!(worker, ticket_id = %job.ticket_id, trace_id, "ticket notification delivered"),
        Ok(Err(error)) => warn!(
            worker,
            ticket_id = %job.ticket_id,
            trace_id,
            %error,
            "ticket notification failed"
        ),
        Err(_) => error!(
            worker,
            ticket_id = %job.ticket_id,
            trace_id,
            "ticket notifier panicked"
        ),
    }
}
