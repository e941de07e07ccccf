// SPDX-License-Identifier: MIT

use photo_editor::replay::ReplayReport;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum LoggedOutcome {
    Applied,
    Failed(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedAdjustment {
    pub factor: f64,

    pub outcome: LoggedOutcome,
}

/// Serializable digest of a replay, printed by tests so a failing run can be inspected.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TestLog {
    pub adjustments: Vec<LoggedAdjustment>,

    pub cancelled: usize,
}

impl TestLog {
    pub fn from_report(report: &ReplayReport) -> Self {
        let applied = report.applied.iter().map(|applied| LoggedAdjustment {
            factor: applied.event.factor,
            outcome: LoggedOutcome::Applied,
        });
        let failed = report.failed.iter().map(|(event, e)| LoggedAdjustment {
            factor: event.factor,
            outcome: LoggedOutcome::Failed(e.to_string()),
        });
        Self {
            adjustments: applied.chain(failed).collect(),
            cancelled: report.cancelled,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
