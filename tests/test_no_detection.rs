extern crate sight_guide;

mod common;

use std::time::{Duration, Instant};
use image::RgbImage;
use sight_guide::data::RawTensor;
use sight_guide::{init_detector, spawn_detector, Frame, GuideConfig};
use common::{channels_first, FakeRuntime};

#[test]
fn empty_output_gives_no_detections() {
    let mut detector = init_detector(&GuideConfig::default(), Ok(FakeRuntime::new(channels_first(100, &[])))).unwrap();
    let report = detector.detect(&Frame::from(RgbImage::new(100, 100))).unwrap();
    assert!(report.detections.is_empty());
}

#[test]
fn garbage_output_gives_no_detections() {
    let garbage = RawTensor::from_shape_vec(&[84, 10], vec![0.7; 840]).unwrap();
    let mut detector = init_detector(&GuideConfig::default(), Ok(FakeRuntime::new(garbage))).unwrap();
    let report = detector.detect(&Frame::from(RgbImage::new(100, 100))).unwrap();
    assert!(report.detections.is_empty());
}

#[test]
fn missing_runtime_disables_detection() {
    let detector = init_detector::<FakeRuntime>(&GuideConfig::default(), Err(anyhow::anyhow!("no model file")));
    assert!(detector.is_none());
}

#[test]
fn failed_cycle_sends_nothing_and_frees_the_slot() {
    let config = GuideConfig::default().with_min_inference_interval_ms(0);
    let runtime = FakeRuntime::failing();
    let calls = runtime.calls.clone();
    let detector = init_detector(&config, Ok(runtime)).unwrap();
    let (mut feeder, reports, handle) = spawn_detector(detector, &config).unwrap();

    assert!(feeder.submit(Frame::from(RgbImage::new(64, 64))));
    assert!(reports.recv_timeout(Duration::from_millis(300)).is_err());

    let deadline = Instant::now() + Duration::from_secs(10);
    while feeder.throttle().is_busy() {
        assert!(Instant::now() < deadline, "slot never released");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(feeder.submit(Frame::from(RgbImage::new(64, 64))));

    feeder.stop();
    handle.join().unwrap();
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn panicking_runtime_does_not_stop_detection() {
    let config = GuideConfig::default().with_min_inference_interval_ms(0);
    let runtime = FakeRuntime::panicking_once(channels_first(10, &[(3, [0.5, 0.5, 0.2, 0.3], 0, 0.9)]));
    let calls = runtime.calls.clone();
    let detector = init_detector(&config, Ok(runtime)).unwrap();
    let (mut feeder, reports, handle) = spawn_detector(detector, &config).unwrap();

    assert!(feeder.submit(Frame::from(RgbImage::new(64, 64))));
    assert!(reports.recv_timeout(Duration::from_millis(300)).is_err());

    let deadline = Instant::now() + Duration::from_secs(10);
    while feeder.throttle().is_busy() {
        assert!(Instant::now() < deadline, "slot never released");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(feeder.submit(Frame::from(RgbImage::new(64, 64))));
    let report = reports.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(report.detections.len(), 1);

    feeder.stop();
    handle.join().unwrap();
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}
