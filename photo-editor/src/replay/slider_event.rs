// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::adjustments::AdjustmentKind;

/// One change notification of an adjustment slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderEvent {
    pub adjustment: AdjustmentKind,
    pub factor: f64,
    /// Milliseconds between the previous event and this one.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Parse a JSON array of slider events.
pub fn parse_script(json: &str) -> anyhow::Result<Vec<SliderEvent>> {
    let events: Vec<SliderEvent> =
        serde_json::from_str(json).context("invalid slider script JSON")?;
    if events.is_empty() {
        bail!("slider script contains no events");
    }
    Ok(events)
}

pub fn parse_base64_script(b64: &str) -> anyhow::Result<Vec<SliderEvent>> {
    let decoded = BASE64_STANDARD
        .decode(b64.trim())
        .context("slider script is not valid base64")?;
    let json = String::from_utf8(decoded).context("slider script is not valid UTF-8")?;
    parse_script(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"[
        {"adjustment": "brightness", "factor": 1.1},
        {"adjustment": "sharpen", "factor": 2.0, "delay_ms": 3}
    ]"#;

    #[test]
    fn parses_events_with_default_delay() {
        let events = parse_script(SCRIPT).unwrap();
        assert_eq!(
            events,
            vec![
                SliderEvent {
                    adjustment: AdjustmentKind::Brightness,
                    factor: 1.1,
                    delay_ms: 0,
                },
                SliderEvent {
                    adjustment: AdjustmentKind::Sharpen,
                    factor: 2.0,
                    delay_ms: 3,
                },
            ]
        );
    }

    #[test]
    fn base64_and_plain_scripts_agree() {
        let encoded = BASE64_STANDARD.encode(SCRIPT);
        assert_eq!(
            parse_base64_script(&encoded).unwrap(),
            parse_script(SCRIPT).unwrap()
        );
    }

    #[test]
    fn rejects_empty_and_unknown_adjustments() {
        assert!(parse_script("[]").is_err());
        assert!(parse_script(r#"[{"adjustment": "contrast", "factor": 1.0}]"#).is_err());
    }
}
