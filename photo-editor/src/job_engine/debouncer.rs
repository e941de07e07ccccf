// SPDX-License-Identifier: MIT

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_channel::{Receiver, Sender};
use async_io::Timer;
use futures::executor::LocalPool;
use futures::future::{self, FutureExt};
use log::{debug, info, warn};
use thiserror::Error;

use crate::global_config::{DebounceConfig, ProcessingMode};
use crate::job_engine::job::{Job, JobError, JobResult, Reply};

type ProcessFn<T, R, E> = dyn Fn(T) -> Result<R, E> + Send + Sync + 'static;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("debounce interval must be greater than zero")]
    ZeroInterval,

    #[error("failed to spawn the coordination thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// Coalesces a stream of submissions so that only the latest one of every
/// quiet period reaches the processing function.
///
/// Each instance owns one coordination thread. `submit` may be called from
/// any number of threads; it blocks until the submitted job is either
/// processed or superseded.
pub struct Debouncer<T, R, E> {
    name: String,
    tx: Sender<Job<T, R, E>>,
    next_id: AtomicU64,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T, R, E> Debouncer<T, R, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    /// Start the coordination loop for `process`.
    ///
    /// A full intake queue blocks submitters until the loop catches up.
    /// `async-channel` has no rendezvous mode, so a capacity of zero is
    /// treated as a single slot.
    pub fn new<F>(
        name: impl Into<String>,
        config: &DebounceConfig,
        process: F,
    ) -> Result<Self, SpawnError>
    where
        F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
    {
        if config.debounce.is_zero() {
            return Err(SpawnError::ZeroInterval);
        }
        let name = name.into();
        let (tx, rx) = async_channel::bounded(config.queue_capacity.max(1));

        let coordinator = Coordinator {
            name: name.clone(),
            process: Arc::new(process),
            debounce: config.debounce,
            mode: config.processing,
            intake: rx,
            current: None,
            timer: None,
            in_flight: None,
            due: false,
        };

        // the loop only ever waits on channels and a timer, a local pool on
        // a dedicated thread is all it needs
        let thread_handle = thread::Builder::new()
            .name(format!("debounce-{name}"))
            .spawn(move || {
                let mut pool = LocalPool::new();
                pool.run_until(coordinator.run());
            })?;

        Ok(Self {
            name,
            tx,
            next_id: AtomicU64::new(1),
            thread_handle: Mutex::new(Some(thread_handle)),
        })
    }

    /// Submit `payload` and block until its outcome is known.
    pub fn submit(&self, payload: T) -> JobResult<R, E> {
        let (job, outcome) = Job::new(self.next_id(), payload);
        if self.tx.send_blocking(job).is_err() {
            return Err(JobError::ShuttingDown);
        }
        outcome.recv_blocking().unwrap_or(Err(JobError::Aborted))
    }

    /// Like [`Debouncer::submit`], but waits without blocking the thread.
    pub async fn submit_async(&self, payload: T) -> JobResult<R, E> {
        let (job, outcome) = Job::new(self.next_id(), payload);
        if self.tx.send(job).await.is_err() {
            return Err(JobError::ShuttingDown);
        }
        outcome.recv().await.unwrap_or(Err(JobError::Aborted))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl<T, R, E> Debouncer<T, R, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of submissions waiting in the intake queue.
    pub fn queued(&self) -> usize {
        self.tx.len()
    }

    /// Stop accepting submissions. Jobs that have not been handed to the
    /// processing function yet resolve with [`JobError::ShuttingDown`].
    pub fn close(&self) {
        if self.tx.close() {
            debug!("{}: intake closed", self.name);
        }
    }

    /// Close the intake and join the coordination thread. An adjustment that
    /// is already being computed finishes first.
    pub fn wait_until_finished(&self) {
        self.close();
        let handle = self
            .thread_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("{}: coordination thread panicked", self.name);
            }
        }
    }
}

impl<T, R, E> Drop for Debouncer<T, R, E> {
    fn drop(&mut self) {
        self.wait_until_finished();
    }
}

impl<T, R, E> fmt::Debug for Debouncer<T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("name", &self.name)
            .field("closed", &self.tx.is_closed())
            .field("queued", &self.tx.len())
            .finish()
    }
}

/// A job whose payload was handed to a worker thread.
struct InFlight<R, E> {
    job_id: u64,
    reply: Reply<R, E>,
    done: Receiver<Result<R, E>>,
}

enum Event<T, R, E> {
    Arrived(Job<T, R, E>),
    IntakeClosed,
    Expired,
    Completed(Option<Result<R, E>>),
}

/// State owned by the coordination loop. Nothing outside the loop touches it,
/// so it needs no locking.
struct Coordinator<T, R, E> {
    name: String,
    process: Arc<ProcessFn<T, R, E>>,
    debounce: Duration,
    mode: ProcessingMode,
    intake: Receiver<Job<T, R, E>>,
    current: Option<Job<T, R, E>>,
    timer: Option<Timer>,
    in_flight: Option<InFlight<R, E>>,
    // the window of `current` elapsed while the worker was still busy
    due: bool,
}

impl<T, R, E> Coordinator<T, R, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    async fn run(mut self) {
        info!("{}: coordination loop started ({:?})", self.name, self.mode);
        loop {
            match self.next_event().await {
                Event::Arrived(job) => self.on_arrival(job),
                Event::Expired => self.on_expiry(),
                Event::Completed(outcome) => self.on_completed(outcome),
                Event::IntakeClosed => break,
            }
        }
        self.shut_down().await;
        info!("{}: coordination loop stopped", self.name);
    }

    async fn next_event(&mut self) -> Event<T, R, E> {
        let Self {
            intake,
            timer,
            in_flight,
            ..
        } = self;

        futures::select_biased! {
            outcome = completion(in_flight).fuse() => Event::Completed(outcome),
            job = intake.recv().fuse() => match job {
                Ok(job) => Event::Arrived(job),
                Err(_) => Event::IntakeClosed,
            },
            _ = expiry(timer).fuse() => Event::Expired,
        }
    }

    fn on_arrival(&mut self, job: Job<T, R, E>) {
        if self.intake.is_closed() {
            debug!("{}: job #{} arrived after close", self.name, job.id());
            job.resolve(Err(JobError::ShuttingDown));
            return;
        }

        if let Some(previous) = self.current.replace(job) {
            debug!("{}: job #{} superseded", self.name, previous.id());
            previous.resolve(Err(JobError::Cancelled));
        }
        self.due = false;

        // a fired timer is consumed by the loop itself, so re-arming never
        // leaves a stale expiry behind
        match self.timer.as_mut() {
            Some(timer) => timer.set_after(self.debounce),
            None => self.timer = Some(Timer::after(self.debounce)),
        }
    }

    fn on_expiry(&mut self) {
        self.timer = None;
        if self.current.is_none() {
            debug!("{}: timer fired with nothing pending", self.name);
            return;
        }

        match self.mode {
            ProcessingMode::InLoop => self.process_in_loop(),
            ProcessingMode::Detached if self.in_flight.is_some() => {
                debug!("{}: worker busy, pending job is due", self.name);
                self.due = true;
            }
            ProcessingMode::Detached => self.dispatch_detached(),
        }
    }

    fn process_in_loop(&mut self) {
        let Some(job) = self.current.take() else {
            return;
        };
        let (id, payload, reply) = job.into_parts();
        debug!("{}: processing job #{}", self.name, id);
        match panic::catch_unwind(AssertUnwindSafe(|| (self.process)(payload))) {
            Ok(outcome) => reply.resolve(outcome.map_err(JobError::Processing)),
            Err(_) => {
                warn!("{}: processing of job #{} panicked", self.name, id);
                reply.resolve(Err(JobError::Aborted));
            }
        }
    }

    fn dispatch_detached(&mut self) {
        let Some(job) = self.current.take() else {
            return;
        };
        let (id, payload, reply) = job.into_parts();
        let (done_tx, done_rx) = async_channel::bounded(1);
        let process = Arc::clone(&self.process);

        let spawned = thread::Builder::new()
            .name(format!("{}-worker", self.name))
            .spawn(move || {
                let _ = done_tx.send_blocking(process(payload));
            });

        match spawned {
            Ok(_) => {
                debug!("{}: job #{} handed to worker", self.name, id);
                self.in_flight = Some(InFlight {
                    job_id: id,
                    reply,
                    done: done_rx,
                });
            }
            Err(e) => {
                warn!("{}: could not spawn worker for job #{}: {e}", self.name, id);
                reply.resolve(Err(JobError::Aborted));
            }
        }
    }

    fn on_completed(&mut self, outcome: Option<Result<R, E>>) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        debug!("{}: job #{} completed", self.name, flight.job_id);
        flight.reply.resolve(match outcome {
            Some(outcome) => outcome.map_err(JobError::Processing),
            None => Err(JobError::Aborted),
        });

        if std::mem::take(&mut self.due) {
            self.dispatch_detached();
        }
    }

    async fn shut_down(&mut self) {
        self.timer = None;
        if let Some(job) = self.current.take() {
            debug!("{}: job #{} dropped by shutdown", self.name, job.id());
            job.resolve(Err(JobError::ShuttingDown));
        }
        // in-flight work has no cancellation hook, its caller gets the real outcome
        if let Some(flight) = self.in_flight.take() {
            let outcome = flight.done.recv().await.ok();
            flight.reply.resolve(match outcome {
                Some(outcome) => outcome.map_err(JobError::Processing),
                None => Err(JobError::Aborted),
            });
        }
    }
}

// Resolves whatever is still queued, however the loop ended.
impl<T, R, E> Drop for Coordinator<T, R, E> {
    fn drop(&mut self) {
        self.intake.close();
        if let Some(job) = self.current.take() {
            job.resolve(Err(JobError::ShuttingDown));
        }
        while let Ok(job) = self.intake.try_recv() {
            debug!("{}: job #{} drained from the queue", self.name, job.id());
            job.resolve(Err(JobError::ShuttingDown));
        }
    }
}

async fn expiry(timer: &mut Option<Timer>) {
    match timer {
        Some(timer) => {
            timer.await;
        }
        None => future::pending::<()>().await,
    }
}

async fn completion<R, E>(in_flight: &Option<InFlight<R, E>>) -> Option<Result<R, E>> {
    match in_flight {
        Some(flight) => flight.done.recv().await.ok(),
        None => future::pending().await,
    }
}
