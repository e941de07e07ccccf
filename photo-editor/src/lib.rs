// SPDX-License-Identifier: MIT
// photo-editor: slider-driven image adjustments without the widget toolkit
//
// - Debounces continuous slider input so only the latest value is computed.
// - Brightness and sharpen adjustments on top of the `image` crate.

pub mod adjustments;
pub mod global_config;
pub mod job_engine;
pub mod replay;
