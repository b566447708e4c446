//! Happy-path scans and response envelope shape.

use mediascan::detector::Prediction;
use mediascan::{DetectorStatus, Label, Tier, Upload};
use std::sync::atomic::Ordering;

use crate::common::*;

#[tokio::test]
async fn test_real_upload_on_mock_tier() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());

    let response = scanner
        .handle_scan(Upload::new("photo_REAL_01.png", PNG.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.message, "Scan completed");
    assert_eq!(response.prediction, Label::Real);
    assert!((85.0..=99.0).contains(&response.confidence));
    assert_eq!(response.analysis.outcome.mode(), Some(Tier::MockFallback));
    assert!(response.explanation.starts_with("Demo Mode: "));
    assert_eq!(response.file_info.original_name, "photo_REAL_01.png");
    assert_eq!(response.file_info.content_type, "image/png");

    // Heatmap is written beside the stored upload and exposed under /uploads.
    assert!(response.heatmap.starts_with("/uploads/heatmap_"));
    assert!(response.heatmap.ends_with("_photo_REAL_01.svg"));
    let heatmap_file = response
        .analysis
        .outcome
        .heatmap()
        .map(std::path::PathBuf::from)
        .unwrap();
    assert!(heatmap_file.exists());
    assert_eq!(
        heatmap_file.parent(),
        response.file_info.local_path.parent()
    );
}

#[tokio::test]
async fn test_envelope_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());

    let response = scanner
        .handle_scan(Upload::new("clip.mp4", b"not really a video".to_vec()))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    for key in [
        "status",
        "message",
        "file_info",
        "analysis",
        "prediction",
        "confidence",
        "heatmap",
        "explanation",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["prediction"], "FAKE");
    assert_eq!(json["analysis"]["label"], "FAKE");
    assert_eq!(json["analysis"]["mode"], "MOCK_FALLBACK");
    assert_eq!(json["analysis"]["heatmap_url"], json["heatmap"]);
    assert_eq!(json["file_info"]["media_kind"], "video");
}

#[tokio::test]
async fn test_model_tier_loads_once() {
    let dir = tempfile::tempdir().unwrap();
    let (loader, loads) = StubLoader::new(Behavior::Predict(vec![
        Prediction::new("Fake", 0.04),
        Prediction::new("Real", 0.96),
    ]));
    let scanner = scanner_with_loader(config_in(dir.path()), loader);
    assert_eq!(scanner.detector().status(), DetectorStatus::Uninitialized);

    for name in ["a.png", "b.png"] {
        let response = scanner
            .handle_scan(Upload::new(name, PNG.to_vec()))
            .await
            .unwrap();
        assert_eq!(response.prediction, Label::Real);
        assert_eq!(response.confidence, 96.0);
        assert_eq!(response.analysis.outcome.mode(), Some(Tier::Model));
        assert_eq!(
            response.explanation,
            "No significant manipulation artifacts detected in facial features."
        );
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(scanner.detector().is_loaded());
    assert!(scanner.health().detector.loaded);
}

#[tokio::test]
async fn test_lite_mode_never_loads_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.detector.lite_mode = true;
    let (loader, loads) = StubLoader::new(Behavior::Predict(vec![Prediction::new("fake", 0.99)]));
    let scanner = scanner_with_loader(config, loader);

    let response = scanner
        .handle_scan(Upload::new("selfie.png", PNG.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.analysis.outcome.mode(), Some(Tier::MockFallback));
    assert_eq!(loads.load(Ordering::SeqCst), 0);
    assert_eq!(scanner.health().detector_status, DetectorStatus::Skipped);
}

#[tokio::test]
async fn test_failed_load_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let (loader, loads) = StubLoader::new(Behavior::FailLoad);
    let scanner = scanner_with_loader(config_in(dir.path()), loader);

    for _ in 0..3 {
        let response = scanner
            .handle_scan(Upload::new("frame.png", PNG.to_vec()))
            .await
            .unwrap();
        assert_eq!(response.analysis.outcome.mode(), Some(Tier::MockFallback));
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(scanner.detector().status(), DetectorStatus::Failed);
}

#[tokio::test]
async fn test_panicking_load_settles_on_mock_tier() {
    let dir = tempfile::tempdir().unwrap();
    let (loader, loads) = StubLoader::new(Behavior::PanicOnLoad);
    let scanner = scanner_with_loader(config_in(dir.path()), loader);

    for _ in 0..3 {
        let response = scanner
            .handle_scan(Upload::new("frame.png", PNG.to_vec()))
            .await
            .unwrap();
        assert_eq!(response.analysis.outcome.mode(), Some(Tier::MockFallback));
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(scanner.detector().status(), DetectorStatus::Failed);
    assert!(scanner.health().detector.load_attempted);
}
