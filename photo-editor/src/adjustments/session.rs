// SPDX-License-Identifier: MIT

use std::sync::Arc;

use image::DynamicImage;
use log::debug;

use super::backend::{AdjustmentBackend, AdjustmentError, PixelBackend};
use super::brightness::{spawn_brightness_debouncer, BrightnessDebouncer, BrightnessPayload};
use super::sharpen::{spawn_sharpen_debouncer, SharpenDebouncer, SharpenParams, SharpenPayload};
use super::AdjustmentKind;
use crate::global_config::DebounceConfig;
use crate::job_engine::{JobResult, SpawnError};

pub type AdjustmentOutcome = JobResult<DynamicImage, AdjustmentError>;

/// Owns exactly one debouncer per adjustment kind for the lifetime of an
/// editing session. Slider handlers call into it from any thread.
#[derive(Debug)]
pub struct EditingSession {
    config: DebounceConfig,
    brightness: BrightnessDebouncer,
    sharpen: SharpenDebouncer,
}

impl EditingSession {
    pub fn new(config: &DebounceConfig) -> Result<Self, SpawnError> {
        Self::with_backend(config, Arc::new(PixelBackend))
    }

    pub fn with_backend(
        config: &DebounceConfig,
        backend: Arc<dyn AdjustmentBackend>,
    ) -> Result<Self, SpawnError> {
        debug!("Starting editing session with {:?}", config);
        Ok(Self {
            config: *config,
            brightness: spawn_brightness_debouncer(config, Arc::clone(&backend))?,
            sharpen: spawn_sharpen_debouncer(config, backend)?,
        })
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn adjust_brightness(&self, image: Arc<DynamicImage>, factor: f64) -> AdjustmentOutcome {
        self.brightness.submit(BrightnessPayload { image, factor })
    }

    pub fn adjust_sharpen(&self, image: Arc<DynamicImage>, factor: f64) -> AdjustmentOutcome {
        self.adjust_sharpen_full(image, SharpenParams::from_factor(factor))
    }

    /// Sharpen with explicit parameters. Shares the debouncer of
    /// [`EditingSession::adjust_sharpen`], so either call supersedes the other.
    pub fn adjust_sharpen_full(
        &self,
        image: Arc<DynamicImage>,
        params: SharpenParams,
    ) -> AdjustmentOutcome {
        self.sharpen.submit(SharpenPayload { image, params })
    }

    pub fn adjust(
        &self,
        kind: AdjustmentKind,
        image: Arc<DynamicImage>,
        factor: f64,
    ) -> AdjustmentOutcome {
        match kind {
            AdjustmentKind::Brightness => self.adjust_brightness(image, factor),
            AdjustmentKind::Sharpen => self.adjust_sharpen(image, factor),
        }
    }

    /// Stop accepting adjustments of every kind.
    pub fn close(&self) {
        self.brightness.close();
        self.sharpen.close();
    }

    pub fn wait_until_finished(&self) {
        self.close();
        self.brightness.wait_until_finished();
        self.sharpen.wait_until_finished();
    }
}
