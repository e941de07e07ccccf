// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::Rgba;
use photo_editor::adjustments::{
    AdjustmentError, AdjustmentKind, EditingSession, SharpenParams,
};
use photo_editor::global_config::{DebounceConfig, ProcessingMode};
use photo_editor::job_engine::JobError;
use photo_editor::replay::{replay, SliderEvent};
use photo_editor_tests::recording_backend::{grey_image, Call, RecordingBackend};
use photo_editor_tests::test_log::TestLog;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session(
    debounce_ms: u64,
    processing: ProcessingMode,
    backend: &RecordingBackend,
) -> EditingSession {
    let config = DebounceConfig::default()
        .with_debounce(Duration::from_millis(debounce_ms))
        .with_processing(processing);
    EditingSession::with_backend(&config, Arc::new(backend.clone()))
        .unwrap_or_else(|e| panic!("failed to start editing session: {e}"))
}

fn drag(adjustment: AdjustmentKind, factors: &[f64], delay_ms: u64) -> Vec<SliderEvent> {
    factors
        .iter()
        .map(|&factor| SliderEvent {
            adjustment,
            factor,
            delay_ms,
        })
        .collect()
}

#[test]
fn test_slider_drag_applies_only_the_final_value() {
    init_logging();
    let backend = RecordingBackend::new();
    let session = session(150, ProcessingMode::InLoop, &backend);

    let events = drag(AdjustmentKind::Brightness, &[1.1, 1.2, 1.3, 1.4, 1.5], 10);
    let report = replay(&session, grey_image(100), &events).unwrap();
    let log = TestLog::from_report(&report);
    println!("{}", log.to_json());

    assert_eq!(report.cancelled, 4, "{}", log.to_json());
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.latest().map(|a| a.event.factor), Some(1.5));
    assert_eq!(backend.calls(), vec![Call::Brightness(1.5)]);
}

#[test]
fn test_each_adjustment_kind_has_its_own_debouncer() {
    init_logging();
    let backend = RecordingBackend::new();
    let session = session(100, ProcessingMode::InLoop, &backend);

    let events = vec![
        SliderEvent {
            adjustment: AdjustmentKind::Brightness,
            factor: 1.5,
            delay_ms: 0,
        },
        SliderEvent {
            adjustment: AdjustmentKind::Sharpen,
            factor: 2.0,
            delay_ms: 5,
        },
    ];
    let report = replay(&session, grey_image(100), &events).unwrap();

    assert_eq!(report.cancelled, 0, "{}", TestLog::from_report(&report).to_json());
    assert_eq!(report.applied.len(), 2);
    assert!(report.failed.is_empty());
}

#[test]
fn test_full_sharpen_shares_the_sharpen_debouncer() {
    init_logging();
    let backend = RecordingBackend::new();
    let session = session(150, ProcessingMode::InLoop, &backend);
    let params = SharpenParams {
        sigma: 1.0,
        x1: 2.0,
        m2: 3.0,
    };

    let (by_factor, full) = thread::scope(|s| {
        let by_factor = s.spawn(|| session.adjust_sharpen(grey_image(80), 1.0));
        thread::sleep(Duration::from_millis(30));
        let full = s.spawn(|| session.adjust_sharpen_full(grey_image(80), params));
        (by_factor.join().unwrap(), full.join().unwrap())
    });

    assert_eq!(by_factor.unwrap_err(), JobError::Cancelled);
    assert!(full.is_ok());
    assert_eq!(backend.calls(), vec![Call::Sharpen(params)]);
}

#[test]
fn test_pixels_are_adjusted() {
    let backend = RecordingBackend::new();
    let session = session(10, ProcessingMode::InLoop, &backend);

    let darker = session.adjust_brightness(grey_image(200), 0.5).unwrap();
    assert_eq!(darker.to_rgba8().get_pixel(3, 3), &Rgba([100, 100, 100, 255]));
}

#[test]
fn test_invalid_factor_is_reported_not_cancelled() {
    let backend = RecordingBackend::new();
    let session = session(10, ProcessingMode::InLoop, &backend);

    let outcome = session.adjust(AdjustmentKind::Brightness, grey_image(10), -2.0);
    assert_eq!(
        outcome.unwrap_err(),
        JobError::Processing(AdjustmentError::InvalidParameter {
            name: "factor",
            value: -2.0
        })
    );

    let report = replay(
        &session,
        grey_image(10),
        &drag(AdjustmentKind::Sharpen, &[-1.0], 0),
    )
    .unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(report.latest().is_none());
}

#[test]
fn test_detached_processing_keeps_accepting_slider_input() {
    init_logging();
    let backend = RecordingBackend::with_delay(Duration::from_millis(300));
    let session = session(20, ProcessingMode::Detached, &backend);

    let events = vec![
        SliderEvent {
            adjustment: AdjustmentKind::Brightness,
            factor: 1.0,
            delay_ms: 0,
        },
        SliderEvent {
            adjustment: AdjustmentKind::Brightness,
            factor: 1.1,
            delay_ms: 100,
        },
        SliderEvent {
            adjustment: AdjustmentKind::Brightness,
            factor: 1.2,
            delay_ms: 10,
        },
        SliderEvent {
            adjustment: AdjustmentKind::Brightness,
            factor: 1.3,
            delay_ms: 10,
        },
    ];
    let report = replay(&session, grey_image(100), &events).unwrap();
    let log = TestLog::from_report(&report);

    assert_eq!(report.cancelled, 2, "{}", log.to_json());
    let applied: Vec<f64> = report.applied.iter().map(|a| a.event.factor).collect();
    assert_eq!(applied, vec![1.0, 1.3]);
    assert_eq!(
        backend.calls(),
        vec![Call::Brightness(1.0), Call::Brightness(1.3)]
    );
}

#[test]
fn test_closing_the_session_releases_waiting_sliders() {
    init_logging();
    let backend = RecordingBackend::new();
    let session = session(10_000, ProcessingMode::InLoop, &backend);

    let waiting = thread::scope(|s| {
        let waiting = s.spawn(|| session.adjust_brightness(grey_image(50), 1.2));
        thread::sleep(Duration::from_millis(50));
        session.wait_until_finished();
        waiting.join().unwrap()
    });

    assert_eq!(waiting.unwrap_err(), JobError::ShuttingDown);
    assert!(backend.calls().is_empty());
    assert_eq!(
        session.adjust_sharpen(grey_image(50), 1.0).unwrap_err(),
        JobError::ShuttingDown
    );
}
