// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use photo_editor::adjustments::{AdjustmentBackend, AdjustmentError, PixelBackend, SharpenParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Brightness(f64),
    Sharpen(SharpenParams),
}

/// Backend that records every call, optionally stalls, and otherwise
/// delegates to the real pixel backend.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    delay: Duration,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

impl AdjustmentBackend for RecordingBackend {
    fn brightness(
        &self,
        image: &DynamicImage,
        factor: f64,
    ) -> Result<DynamicImage, AdjustmentError> {
        self.record(Call::Brightness(factor));
        PixelBackend.brightness(image, factor)
    }

    fn sharpen(
        &self,
        image: &DynamicImage,
        params: SharpenParams,
    ) -> Result<DynamicImage, AdjustmentError> {
        self.record(Call::Sharpen(params));
        PixelBackend.sharpen(image, params)
    }
}

/// A small uniformly grey RGBA test image.
pub fn grey_image(level: u8) -> Arc<DynamicImage> {
    Arc::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        8,
        8,
        Rgba([level, level, level, 255]),
    )))
}
