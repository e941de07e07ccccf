// SPDX-License-Identifier: MIT
// photo-editor: headless front end of the slider-driven adjustments
//
// - Loads an image, replays slider input through the debounced adjustments.
// - Writes whatever the viewer would end up showing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use image::DynamicImage;
use log::info;

use photo_editor::adjustments::EditingSession;
use photo_editor::global_config::{
    DebounceConfig, ProcessingMode, DEFAULT_DEBOUNCE, DEFAULT_QUEUE_CAPACITY,
};
use photo_editor::replay::{self, SliderEvent};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Image to edit
    #[arg(long)]
    input: PathBuf,

    /// Where to write the adjusted image (format follows the extension)
    #[arg(long)]
    output: PathBuf,

    /// Brightness factor (1.0 keeps the image as is)
    #[arg(long)]
    brightness: Option<f64>,

    /// Sharpen factor, applied after brightness
    #[arg(long)]
    sharpen: Option<f64>,

    /// Slider events to replay (JSON encoded). Note that this excludes --brightness and --sharpen.
    #[arg(long, value_name = "JSON")]
    script: Option<String>,

    /// Slider events to replay (base64-encoded JSON). Note that this excludes --brightness and --sharpen.
    #[arg(long = "script-base64", value_name = "BASE64")]
    script_base64: Option<String>,

    /// Quiet period after the last slider event before an adjustment runs
    #[arg(long = "debounce-ms", default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    debounce_ms: u64,

    /// Slider events that may queue up before the slider blocks
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Where adjustments are computed
    #[arg(long, value_enum, default_value_t)]
    processing: ProcessingMode,
}

fn validate_args(args: &Args) -> Result<(), String> {
    let has_script = match (&args.script, &args.script_base64) {
        (Some(_), Some(_)) => {
            return Err("--script and --script-base64 may not be used together".into());
        }
        (None, None) => false,
        _ => true,
    };

    match (has_script, &args.brightness, &args.sharpen) {
        (true, None, None) => {}
        (true, _, _) => {
            return Err(
                "--script or --script-base64 must not be combined with --brightness or --sharpen"
                    .into(),
            );
        }
        (false, None, None) => {
            return Err("nothing to do: pass --brightness, --sharpen or a script".into());
        }
        (false, _, _) => {}
    }

    if args.debounce_ms == 0 {
        return Err("--debounce-ms must be greater than zero".into());
    }

    Ok(())
}

fn load_script(args: &Args) -> anyhow::Result<Option<Vec<SliderEvent>>> {
    match (&args.script, &args.script_base64) {
        (Some(json), None) => replay::parse_script(json).map(Some),
        (None, Some(b64)) => replay::parse_base64_script(b64).map(Some),
        (None, None) => Ok(None),
        (Some(_), Some(_)) => bail!("--script and --script-base64 may not be used together"),
    }
}

/// Apply the single-value adjustments one after the other.
fn apply_direct(
    session: &EditingSession,
    image: Arc<DynamicImage>,
    brightness: Option<f64>,
    sharpen: Option<f64>,
) -> anyhow::Result<DynamicImage> {
    let mut image = image;
    if let Some(factor) = brightness {
        image = Arc::new(session.adjust_brightness(image, factor)?);
        info!("Applied brightness {factor}");
    }
    if let Some(factor) = sharpen {
        image = Arc::new(session.adjust_sharpen(image, factor)?);
        info!("Applied sharpen {factor}");
    }
    Ok(Arc::unwrap_or_clone(image))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let config = DebounceConfig::default()
        .with_debounce(Duration::from_millis(args.debounce_ms))
        .with_queue_capacity(args.queue_capacity)
        .with_processing(args.processing);
    let script = load_script(&args)?;

    let image = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let image = Arc::new(image);

    info!("Starting editing session");
    let session = EditingSession::new(&config)?;

    let edited = match script {
        Some(events) => {
            let report = replay::replay(&session, image, &events)?;
            let latest = report
                .applied
                .into_iter()
                .last()
                .ok_or_else(|| anyhow!("no slider event produced an image"))?;
            info!(
                "Keeping {:?} {} as final result",
                latest.event.adjustment, latest.event.factor
            );
            latest.image
        }
        None => apply_direct(&session, image, args.brightness, args.sharpen)?,
    };

    edited
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!("Stopping editing session");
    session.wait_until_finished();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["photo-editor", "--input", "in.png", "--output", "out.png"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_the_library_config() {
        let args = parse(&["--brightness", "1.2"]);
        assert_eq!(args.debounce_ms, 10);
        assert_eq!(args.queue_capacity, 10);
        assert_eq!(args.processing, ProcessingMode::InLoop);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn script_excludes_direct_factors() {
        let args = parse(&["--script", "[]", "--sharpen", "1.0"]);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn both_script_encodings_are_exclusive() {
        let args = parse(&["--script", "[]", "--script-base64", "W10="]);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn loading_both_script_encodings_fails() {
        let args = parse(&["--script", "[]", "--script-base64", "W10="]);
        assert!(load_script(&args).is_err());
    }

    #[test]
    fn something_must_be_requested() {
        assert!(validate_args(&parse(&[])).is_err());
    }

    #[test]
    fn detached_processing_is_selectable() {
        let args = parse(&["--sharpen", "2", "--processing", "detached"]);
        assert_eq!(args.processing, ProcessingMode::Detached);
    }
}
