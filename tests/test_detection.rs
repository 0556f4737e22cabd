extern crate sight_guide;

mod common;

use std::time::Duration;
use image::RgbImage;
use sight_guide::{init_detector, spawn_detector, Frame, GuideConfig, InferenceProcess, Position};
use common::{channels_first, FakeRuntime};

fn person_runtime() -> FakeRuntime {
    // normalized box in the middle of the input
    FakeRuntime::new(channels_first(100, &[(42, [0.5, 0.5, 0.2, 0.3], 0, 0.9)]))
}

#[test]
fn detect_single_frame() {
    let config = GuideConfig::default();
    let mut detector = init_detector(&config, Ok(person_runtime())).expect("detector");

    let report = detector.detect(&Frame::from(RgbImage::new(640, 480))).unwrap();
    assert_eq!((report.frame_width, report.frame_height), (640, 480));
    assert_eq!(report.detections.len(), 1);
    let d = &report.detections[0];
    assert_eq!(d.label, "person");
    assert_eq!(d.position, Position::Center);
    assert!((d.bbox.cx() - 0.5).abs() < 1e-4);
    assert!((d.bbox.height() - 0.3).abs() < 1e-4);
}

#[test]
fn rotated_frame_reports_upright_size() {
    let mut detector = init_detector(&GuideConfig::default(), Ok(person_runtime())).unwrap();
    let frame = Frame::from(RgbImage::new(640, 480)).with_rotation(90);
    let report = detector.detect(&frame).unwrap();
    assert_eq!((report.frame_width, report.frame_height), (480, 640));
}

#[test]
fn runtime_input_size_wins() {
    let config = GuideConfig::default().with_input_size(320);
    let mut detector = init_detector(&config, Ok(person_runtime())).unwrap();
    let prepared = detector.preprocess(&Frame::from(RgbImage::new(32, 32))).unwrap();
    assert_eq!(prepared.input.shape(), &[1, 3, 64, 64]);
    assert_eq!(detector.run(&Frame::from(RgbImage::new(32, 32))).unwrap().len(), 1);
}

#[test]
fn worker_delivers_reports() {
    let config = GuideConfig::default().with_min_inference_interval_ms(10_000);
    let runtime = person_runtime();
    let calls = runtime.calls.clone();
    let detector = init_detector(&config, Ok(runtime)).unwrap();
    let (mut feeder, reports, handle) = spawn_detector(detector, &config).unwrap();

    assert!(feeder.submit(Frame::from(RgbImage::new(320, 240))));
    let report = reports.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(report.detections.len(), 1);
    assert_eq!(report.frame_width, 320);

    // inside the admission window
    assert!(!feeder.submit(Frame::from(RgbImage::new(320, 240))));

    feeder.stop();
    handle.join().unwrap();
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn burst_is_throttled() {
    let config = GuideConfig::default().with_min_inference_interval_ms(10_000);
    let detector = init_detector(&config, Ok(person_runtime())).unwrap();
    let (feeder, reports, handle) = spawn_detector(detector, &config).unwrap();

    let accepted = (0..50)
        .filter(|_| feeder.submit(Frame::from(RgbImage::new(64, 64))))
        .count();
    assert_eq!(accepted, 1);
    assert!(reports.recv_timeout(Duration::from_secs(10)).is_ok());

    drop(feeder);
    handle.join().unwrap();
    assert!(reports.try_recv().is_err());
}
