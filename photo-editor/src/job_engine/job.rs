// SPDX-License-Identifier: MIT

use std::fmt;

use async_channel::{Receiver, Sender};
use log::debug;
use thiserror::Error;

/// Reasons a submitted job did not yield a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JobError<E> {
    /// A newer submission replaced this job before its debounce window elapsed.
    #[error("job cancelled due to debouncing")]
    Cancelled,

    /// The debouncer stopped accepting work before this job could be processed.
    #[error("debouncer is shutting down")]
    ShuttingDown,

    /// The job was taken by a worker that went away without reporting back,
    /// e.g. because the processing function panicked.
    #[error("processing aborted before producing an outcome")]
    Aborted,

    /// The processing function itself failed.
    #[error("processing failed: {0}")]
    Processing(E),
}

impl<E> JobError<E> {
    /// Cancellation is the normal fate of intermediate slider values and
    /// usually not worth surfacing to the user.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobError::Cancelled)
    }
}

/// The single outcome delivered for every submitted job.
pub type JobResult<R, E> = Result<R, JobError<E>>;

/// A pending unit of work: the caller's payload plus the slot its outcome goes to.
pub struct Job<T, R, E> {
    id: u64,
    payload: T,
    reply: Reply<R, E>,
}

impl<T, R, E> Job<T, R, E> {
    /// Create a job and the receiving end the submitter waits on.
    pub(crate) fn new(id: u64, payload: T) -> (Self, Receiver<JobResult<R, E>>) {
        // one outcome per job, so a single slot never blocks the resolver
        let (tx, rx) = async_channel::bounded(1);
        let job = Self {
            id,
            payload,
            reply: Reply { job_id: id, tx },
        };
        (job, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the job, so it can be resolved at most once.
    pub(crate) fn resolve(self, outcome: JobResult<R, E>) {
        self.reply.resolve(outcome);
    }

    pub(crate) fn into_parts(self) -> (u64, T, Reply<R, E>) {
        (self.id, self.payload, self.reply)
    }
}

impl<T, R, E> fmt::Debug for Job<T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("id", &self.id).finish()
    }
}

/// Write-once reply slot of a job whose payload has already been handed out.
pub(crate) struct Reply<R, E> {
    job_id: u64,
    tx: Sender<JobResult<R, E>>,
}

impl<R, E> Reply<R, E> {
    pub(crate) fn resolve(self, outcome: JobResult<R, E>) {
        if self.tx.try_send(outcome).is_err() {
            // the submitter dropped its future; nobody is listening anymore
            debug!("Outcome of job #{} discarded, caller is gone", self.job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_delivers_exactly_one_outcome() {
        let (job, rx) = Job::<&str, u32, String>::new(7, "payload");
        assert_eq!(job.id(), 7);
        assert_eq!(*job.payload(), "payload");

        job.resolve(Ok(42));
        assert_eq!(rx.recv_blocking(), Ok(Ok(42)));
        // the reply sender was consumed with the job
        assert!(rx.recv_blocking().is_err());
    }

    #[test]
    fn resolving_for_a_vanished_caller_is_harmless() {
        let (job, rx) = Job::<(), (), String>::new(1, ());
        drop(rx);
        job.resolve(Err(JobError::Cancelled));
    }

    #[test]
    fn cancellation_is_distinguishable_from_processing_errors() {
        let cancelled: JobError<String> = JobError::Cancelled;
        let failed = JobError::Processing("boom".to_string());
        assert!(cancelled.is_cancelled());
        assert!(!failed.is_cancelled());
        assert_eq!(failed.to_string(), "processing failed: boom");
        assert_eq!(cancelled.to_string(), "job cancelled due to debouncing");
    }
}
