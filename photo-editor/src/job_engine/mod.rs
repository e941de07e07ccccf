// SPDX-License-Identifier: MIT
//! # Design: Debounced Job Processor
//!
//! ## Overview
//! Throttles expensive work triggered by continuous input (a slider being
//! dragged) so that only the most recent request of every quiet period is
//! actually processed.
//!
//! - Any number of callers submit jobs into one bounded intake queue and block
//!   until their own job resolves.
//! - A single coordination loop per debouncer owns the pending job and the
//!   timer. Nothing else mutates them.
//! - A new arrival cancels the pending job right away and restarts the timer.
//! - When the timer expires, the pending job is processed and its caller gets
//!   the result (or the processing error) verbatim.
//! - Closing the intake resolves everything not yet processed with a
//!   shutting-down error and ends the loop.
//!
//!
//!    caller A   caller B   caller C
//!       |          |          |
//!       v          v          v
//!   +--------------------------------+
//!   |   bounded intake (MPSC queue)  |
//!   +---------------+----------------+
//!                   |
//!   +---------------v----------------+       +--------------+
//!   |       coordination loop        |------>| process(...) |
//!   |  current job + debounce timer  |<------| (in loop or  |
//!   +--------------------------------+       |  on worker)  |
//!                                            +--------------+

pub mod debouncer;
pub mod job;

pub use debouncer::{Debouncer, SpawnError};
pub use job::{Job, JobError, JobResult};
