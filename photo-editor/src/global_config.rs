// SPDX-License-Identifier: MIT

use std::time::Duration;

use clap::ValueEnum;

/// Quiet period after the last slider event before an adjustment is processed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Submissions that may wait in the hand-off buffer before producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Where the processing function of a debouncer runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
#[clap(rename_all = "kebab-case")]
pub enum ProcessingMode {
    #[default]
    /// On the coordination thread. Intake stalls while an adjustment is computed.
    InLoop,
    /// On a worker thread. New submissions keep superseding each other while
    /// an adjustment is computed; the survivor runs once the worker is free.
    Detached,
}

/// Construction parameters shared by every debouncer of an editing session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    pub debounce: Duration,
    pub queue_capacity: usize,
    pub processing: ProcessingMode,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            processing: ProcessingMode::default(),
        }
    }
}

impl DebounceConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_processing(mut self, processing: ProcessingMode) -> Self {
        self.processing = processing;
        self
    }
}

#[test]
fn defaults_match_the_slider_tuning() {
    let config = DebounceConfig::default();
    assert_eq!(config.debounce, Duration::from_millis(10));
    assert_eq!(config.queue_capacity, 10);
    assert_eq!(config.processing, ProcessingMode::InLoop);
}
