// SPDX-License-Identifier: MIT

//! Replays recorded slider movements against an [`EditingSession`], firing
//! every event from its own thread the way a toolkit's change handler would.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::adjustments::{AdjustmentError, EditingSession};
use crate::job_engine::JobError;

pub mod slider_event;

pub use slider_event::{parse_base64_script, parse_script, SliderEvent};

#[derive(Debug)]
pub struct AppliedAdjustment {
    pub event: SliderEvent,
    pub image: DynamicImage,
    pub completed_at: Instant,
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Successful adjustments in completion order.
    pub applied: Vec<AppliedAdjustment>,
    pub cancelled: usize,
    pub failed: Vec<(SliderEvent, JobError<AdjustmentError>)>,
}

impl ReplayReport {
    /// The adjustment that finished last, i.e. what the viewer would show.
    pub fn latest(&self) -> Option<&AppliedAdjustment> {
        self.applied.last()
    }
}

/// Fire `events` against `image`. Every event adjusts the same source image;
/// the call returns once every event has resolved.
pub fn replay(
    session: &EditingSession,
    image: Arc<DynamicImage>,
    events: &[SliderEvent],
) -> anyhow::Result<ReplayReport> {
    let outcomes = thread::scope(|s| {
        let mut handles = Vec::with_capacity(events.len());
        for &event in events {
            if event.delay_ms > 0 {
                thread::sleep(Duration::from_millis(event.delay_ms));
            }
            let image = Arc::clone(&image);
            handles.push(s.spawn(move || {
                let outcome = session.adjust(event.adjustment, image, event.factor);
                (event, outcome, Instant::now())
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| anyhow!("a slider thread panicked"))?;

    let mut report = ReplayReport::default();
    for (event, outcome, completed_at) in outcomes {
        match outcome {
            Ok(image) => {
                debug!("{:?} {} applied", event.adjustment, event.factor);
                report.applied.push(AppliedAdjustment {
                    event,
                    image,
                    completed_at,
                });
            }
            Err(JobError::Cancelled) => report.cancelled += 1,
            Err(e) => {
                warn!("{:?} {} failed: {e}", event.adjustment, event.factor);
                report.failed.push((event, e));
            }
        }
    }
    report.applied.sort_by_key(|applied| applied.completed_at);

    info!(
        "Replayed {} slider events: {} applied, {} cancelled, {} failed",
        events.len(),
        report.applied.len(),
        report.cancelled,
        report.failed.len()
    );
    Ok(report)
}
