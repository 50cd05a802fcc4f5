//! UI automation tests using egui_kittest and AccessKit
//!
//! The full application is rendered against the in-memory backend and mock
//! audio devices; widgets are found by their accessibility labels.

use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tone_canvas::audio::{CaptureDevice, MockCapture, MockSink, SharedSink};
use tone_canvas::backend::MockBackend;
use tone_canvas::config::AppConfig;
use tone_canvas::state::AppStatus;
use tone_canvas::ui::{DeviceFactory, ToneCanvasApp};
use tone_canvas::ToneCanvasError;

fn mock_devices() -> DeviceFactory {
    Box::new(|| {
        let capture: Box<dyn CaptureDevice> = Box::new(MockCapture::silent(16_000));
        Ok((SharedSink::new(MockSink::new(16_000, 1)), capture))
    })
}

fn missing_devices() -> DeviceFactory {
    Box::new(|| Err(ToneCanvasError::AudioDeviceError("no devices".into())))
}

fn harness(devices: DeviceFactory) -> Harness<'static, ToneCanvasApp> {
    let app = ToneCanvasApp::with_devices(
        &AppConfig::default(),
        Arc::new(MockBackend::new()),
        devices,
    );

    Harness::builder()
        .with_size(egui::Vec2::new(900.0, 600.0))
        .build_state(|ctx, app: &mut ToneCanvasApp| app.show(ctx), app)
}

fn enable_audio(harness: &mut Harness<'static, ToneCanvasApp>) {
    harness.get_by_label("Enable audio").click();
    harness.run();
}

/// Controls are hidden until the user enables audio
#[test]
fn test_controls_hidden_until_audio_enabled() {
    let mut harness = harness(mock_devices());
    harness.run();

    assert!(harness.query_by_label("Play").is_none());
    assert!(harness.query_by_label("Switch").is_none());
    assert!(!harness.state().ui_state().audio_initialized());

    enable_audio(&mut harness);

    assert!(harness.state().ui_state().audio_initialized());
    assert!(harness.query_by_label("Enable audio").is_none());
    let _play = harness.get_by_label("Play");
    let _switch = harness.get_by_label("Switch");
    let _record = harness.get_by_label("Start Recording");
    let _preview = harness.get_by_label("Preview");
    let _upload = harness.get_by_label("Upload");
}

/// A device failure keeps the gate closed and shows the reason
#[test]
fn test_device_failure_keeps_controls_hidden() {
    let mut harness = harness(missing_devices());
    harness.run();

    enable_audio(&mut harness);

    assert!(!harness.state().ui_state().audio_initialized());
    assert!(harness.state().audio_error().is_some());
    assert!(harness.query_by_label("Play").is_none());
    let _retry = harness.get_by_label("Enable audio");
}

/// The canvas and status line are always present
#[test]
fn test_canvas_and_status_exist() {
    let mut harness = harness(mock_devices());
    harness.run();

    let _canvas = harness.get_by_label("Drawing canvas");
    let _status = harness.get_by_label("Status: Idle");
}

/// The green dot is shown only while the app status is Play
#[test]
fn test_ready_indicator_follows_play_status() {
    let mut harness = harness(mock_devices());
    harness.run();
    enable_audio(&mut harness);

    assert!(harness.query_by_label("Ready to play").is_none());

    harness.state().ui_state().set_app_status(AppStatus::Play);
    harness.run();
    let _dot = harness.get_by_label("Ready to play");
    let _status = harness.get_by_label("Status: Play");

    harness.state().ui_state().set_app_status(AppStatus::Idle);
    harness.run();
    assert!(harness.query_by_label("Ready to play").is_none());
}

/// Clicking Switch advances the corpus and lights the indicator
#[test]
fn test_switch_click_sets_play_status() {
    let mut harness = harness(mock_devices());
    harness.run();
    enable_audio(&mut harness);

    harness.get_by_label("Switch").click();

    // Step frames by hand while the worker runs
    let mut switched = false;
    for _ in 0..200 {
        harness.step();
        if harness.state().ui_state().app_status() == AppStatus::Play {
            switched = true;
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    assert!(switched, "switch should complete");
    assert_eq!(harness.state().corpus().get().current_index, 1);
}
