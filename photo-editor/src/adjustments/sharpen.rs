// SPDX-License-Identifier: MIT

use std::sync::Arc;

use image::{imageops, DynamicImage};
use serde::{Deserialize, Serialize};

use super::backend::{
    check_not_empty, check_parameter, match_source_layout, to_channel, AdjustmentBackend,
    AdjustmentError,
};
use crate::global_config::DebounceConfig;
use crate::job_engine::{Debouncer, SpawnError};

/// Unsharp-mask parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpenParams {
    /// Radius (standard deviation) of the Gaussian used to find edges.
    pub sigma: f64,
    /// Detail differences up to this magnitude count as flat and stay untouched.
    pub x1: f64,
    /// Slope applied to differences above `x1`.
    pub m2: f64,
}

impl SharpenParams {
    /// Map the single slider factor onto the three unsharp-mask parameters.
    pub fn from_factor(factor: f64) -> Self {
        Self {
            sigma: factor,
            x1: factor * 0.8,
            m2: factor * 0.5,
        }
    }

    fn validate(&self) -> Result<(), AdjustmentError> {
        check_parameter("sigma", self.sigma)?;
        check_parameter("x1", self.x1)?;
        check_parameter("m2", self.m2)
    }
}

#[derive(Debug, Clone)]
pub struct SharpenPayload {
    pub image: Arc<DynamicImage>,
    pub params: SharpenParams,
}

pub type SharpenDebouncer = Debouncer<SharpenPayload, DynamicImage, AdjustmentError>;

pub(crate) fn spawn_sharpen_debouncer(
    config: &DebounceConfig,
    backend: Arc<dyn AdjustmentBackend>,
) -> Result<SharpenDebouncer, SpawnError> {
    Debouncer::new("sharpen", config, move |payload: SharpenPayload| {
        backend.sharpen(&payload.image, payload.params)
    })
}

pub fn apply_sharpen(
    image: &DynamicImage,
    params: SharpenParams,
) -> Result<DynamicImage, AdjustmentError> {
    params.validate()?;
    check_not_empty(image)?;
    if params.sigma == 0.0 {
        return Ok(image.clone());
    }
    // the blur kernel grows with sigma
    let max_sigma = f64::from(image.width().max(image.height()));
    if params.sigma > max_sigma {
        return Err(AdjustmentError::OutOfRange {
            name: "sigma",
            value: params.sigma,
            max: max_sigma,
        });
    }

    let mut rgba = image.to_rgba8();
    let blurred = imageops::blur(&rgba, params.sigma as f32);
    for (pixel, soft) in rgba.pixels_mut().zip(blurred.pixels()) {
        for band in 0..3 {
            let detail = f64::from(pixel[band]) - f64::from(soft[band]);
            if detail.abs() > params.x1 {
                pixel[band] = to_channel(f64::from(pixel[band]) + params.m2 * detail);
            }
        }
    }
    Ok(match_source_layout(image, rgba))
}
