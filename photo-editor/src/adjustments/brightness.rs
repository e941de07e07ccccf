// SPDX-License-Identifier: MIT

use std::sync::Arc;

use image::DynamicImage;

use super::backend::{
    check_not_empty, check_parameter, match_source_layout, to_channel, AdjustmentBackend,
    AdjustmentError,
};
use crate::global_config::DebounceConfig;
use crate::job_engine::{Debouncer, SpawnError};

#[derive(Debug, Clone)]
pub struct BrightnessPayload {
    pub image: Arc<DynamicImage>,
    pub factor: f64,
}

pub type BrightnessDebouncer = Debouncer<BrightnessPayload, DynamicImage, AdjustmentError>;

pub(crate) fn spawn_brightness_debouncer(
    config: &DebounceConfig,
    backend: Arc<dyn AdjustmentBackend>,
) -> Result<BrightnessDebouncer, SpawnError> {
    Debouncer::new("brightness", config, move |payload: BrightnessPayload| {
        backend.brightness(&payload.image, payload.factor)
    })
}

/// Scale every colour band linearly by `factor`. Alpha is left alone.
pub fn apply_brightness(
    image: &DynamicImage,
    factor: f64,
) -> Result<DynamicImage, AdjustmentError> {
    check_parameter("factor", factor)?;
    check_not_empty(image)?;

    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = to_channel(f64::from(*channel) * factor);
        }
    }
    Ok(match_source_layout(image, rgba))
}
