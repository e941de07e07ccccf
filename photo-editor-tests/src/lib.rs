// SPDX-License-Identifier: MIT

pub mod recording_backend;
pub mod test_log;
