// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod brightness;
pub mod session;
pub mod sharpen;

pub use backend::{AdjustmentBackend, AdjustmentError, PixelBackend};
pub use session::{AdjustmentOutcome, EditingSession};
pub use sharpen::SharpenParams;

/// The slider-driven adjustments. Each kind gets its own debouncer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    Brightness,
    Sharpen,
}
