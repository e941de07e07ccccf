// SPDX-License-Identifier: MIT

use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use super::brightness::apply_brightness;
use super::sharpen::{apply_sharpen, SharpenParams};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdjustmentError {
    #[error("invalid {name}: {value} (expected a finite, non-negative number)")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{name} {value} is out of range for this image (at most {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        max: f64,
    },

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// The pixel engine behind the adjustment debouncers. Calls are synchronous
/// and may be slow; they are made from a debouncer's coordination or worker
/// thread, never concurrently for the same adjustment kind.
pub trait AdjustmentBackend: Send + Sync + 'static {
    fn brightness(&self, image: &DynamicImage, factor: f64)
        -> Result<DynamicImage, AdjustmentError>;

    fn sharpen(
        &self,
        image: &DynamicImage,
        params: SharpenParams,
    ) -> Result<DynamicImage, AdjustmentError>;
}

/// Adjustments computed with the `image` crate on 8-bit RGBA buffers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PixelBackend;

impl AdjustmentBackend for PixelBackend {
    fn brightness(
        &self,
        image: &DynamicImage,
        factor: f64,
    ) -> Result<DynamicImage, AdjustmentError> {
        apply_brightness(image, factor)
    }

    fn sharpen(
        &self,
        image: &DynamicImage,
        params: SharpenParams,
    ) -> Result<DynamicImage, AdjustmentError> {
        apply_sharpen(image, params)
    }
}

pub(crate) fn check_parameter(name: &'static str, value: f64) -> Result<(), AdjustmentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AdjustmentError::InvalidParameter { name, value })
    }
}

pub(crate) fn check_not_empty(image: &DynamicImage) -> Result<(), AdjustmentError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(AdjustmentError::EmptyImage { width, height });
    }
    Ok(())
}

/// Images without alpha go back to RGB so the adjusted copy keeps the source layout.
pub(crate) fn match_source_layout(source: &DynamicImage, rgba: RgbaImage) -> DynamicImage {
    let adjusted = DynamicImage::ImageRgba8(rgba);
    if source.color().has_alpha() {
        adjusted
    } else {
        DynamicImage::ImageRgb8(adjusted.into_rgb8())
    }
}

/// Round and clamp a channel value back into the 8-bit range.
pub(crate) fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
