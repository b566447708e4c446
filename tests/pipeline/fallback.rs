//! Failure containment: safe mode, model errors and storage failures.

use mediascan::detector::Prediction;
use mediascan::scan::{SAFE_MODE_EXPLANATION, SAFE_MODE_SCORE};
use mediascan::{
    ChannelObserver, Detector, Explainer, Label, Notifier, ScanError, Scanner, StorageError, Tier,
    Upload,
};
use std::sync::Arc;
use std::time::Duration;

use crate::common::*;

#[tokio::test]
async fn test_detection_panic_uses_safe_mode() {
    let dir = tempfile::tempdir().unwrap();
    let (loader, _) = StubLoader::new(Behavior::Panic);
    let scanner = scanner_with_loader(config_in(dir.path()), loader);
    let (observer, mut alerts) = ChannelObserver::pair();
    scanner.notifier().connect(Arc::new(observer));

    let response = scanner
        .handle_scan(Upload::new("photo_real.png", PNG.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.prediction, Label::Fake);
    assert_eq!(response.confidence, SAFE_MODE_SCORE);
    assert_eq!(response.explanation, SAFE_MODE_EXPLANATION);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["analysis"]["mode"], "SAFE_MODE");
    assert_eq!(json["analysis"]["score"], 95.5);

    // Heatmap still produced for the safe-mode result, and the alert goes out.
    assert!(response.heatmap.starts_with("/uploads/heatmap_"));
    let alert: serde_json::Value = serde_json::from_str(&alerts.try_recv().unwrap()).unwrap();
    assert_eq!(alert["confidence"], 95.5);
}

#[tokio::test]
async fn test_detection_deadline_uses_safe_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.pipeline.detection_timeout_secs = Some(1);
    let (loader, _) = StubLoader::new(Behavior::Sleep(Duration::from_secs(2)));
    let scanner = scanner_with_loader(config, loader);

    let response = scanner
        .handle_scan(Upload::new("slow.png", PNG.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.analysis.outcome.mode(), Some(Tier::SafeMode));
    assert_eq!(response.confidence, 95.5);
}

#[tokio::test]
async fn test_abandoned_detection_keeps_safe_mode_heatmap() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.pipeline.detection_timeout_secs = Some(1);
    // The stub classifier answers REAL once it wakes up.
    let (loader, _) = StubLoader::new(Behavior::Sleep(Duration::from_secs(2)));
    let scanner = scanner_with_loader(config, loader);

    let response = scanner
        .handle_scan(Upload::new("slow.png", PNG.to_vec()))
        .await
        .unwrap();
    assert_eq!(response.prediction, Label::Fake);
    assert!(response.heatmap.ends_with("_slow_safe.svg"));

    let heatmap = std::path::PathBuf::from(response.analysis.outcome.heatmap().unwrap());
    assert!(std::fs::read_to_string(&heatmap).unwrap().contains("<desc>FAKE"));

    // Let the abandoned task finish and write its own overlay.
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(std::fs::read_to_string(&heatmap).unwrap().contains("<desc>FAKE"));
    let model_heatmap = heatmap.with_file_name(
        heatmap
            .file_name()
            .unwrap()
            .to_string_lossy()
            .replace("_safe.svg", ".svg"),
    );
    assert!(std::fs::read_to_string(model_heatmap).unwrap().contains("<desc>REAL"));
}

#[tokio::test]
async fn test_model_error_is_an_error_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let (loader, _) = StubLoader::new(Behavior::Predict(vec![Prediction::new("cartoon", 0.8)]));
    let scanner = scanner_with_loader(config_in(dir.path()), loader);
    let (observer, mut alerts) = ChannelObserver::pair();
    scanner.notifier().connect(Arc::new(observer));

    let response = scanner
        .handle_scan(Upload::new("frame.png", PNG.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.prediction, Label::Error);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(response.heatmap, "");
    assert!(response.analysis.outcome.details().is_some());
    assert!(alerts.try_recv().is_err(), "ERROR outcomes never alert");
}

#[tokio::test]
async fn test_storage_failure_returns_error_without_alert() {
    let config = mediascan::ScanConfig::default();
    let explainer = Explainer::overlay();
    let detector = Arc::new(Detector::without_backend(&config.detector, explainer.clone()));
    let notifier = Arc::new(Notifier::new());
    let (observer, mut alerts) = ChannelObserver::pair();
    notifier.connect(Arc::new(observer));

    let scanner = Scanner::new(config, FailingStorage, detector.clone(), explainer, notifier);
    let err = scanner
        .handle_scan(Upload::new("clip.mp4", vec![1u8, 2, 3]))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Storage(StorageError::Io { .. })));
    assert_eq!(err.to_response().status_code, 500);
    assert!(err.to_response().detail.starts_with("File save error:"));
    assert!(alerts.try_recv().is_err());
    assert!(!detector.state().load_attempted, "detection never ran");
}

#[tokio::test]
async fn test_empty_upload_is_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());

    let err = scanner
        .handle_scan(Upload::new("empty.png", Vec::<u8>::new()))
        .await
        .unwrap_err();

    let resp = err.to_response();
    assert_eq!(resp.status, "error");
    assert_eq!(resp.status_code, 400);
    assert_eq!(resp.detail, "File save error: No file uploaded");
}
