//! Alert fan-out triggered by scans.

use mediascan::error::BroadcastError;
use mediascan::{ChannelObserver, Observer, ObserverId, Upload};
use std::sync::Arc;

use crate::common::*;

struct ClosedSocket(ObserverId);

impl Observer for ClosedSocket {
    fn id(&self) -> ObserverId {
        self.0
    }

    fn send(&self, _frame: &str) -> Result<(), BroadcastError> {
        Err(BroadcastError::Disconnected(self.0.to_string()))
    }
}

#[tokio::test]
async fn test_fake_scan_alerts_every_observer() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());
    let (a, mut rx_a) = ChannelObserver::pair();
    let (b, mut rx_b) = ChannelObserver::pair();
    let dead = ObserverId::new();
    scanner.notifier().connect(Arc::new(a));
    scanner.notifier().connect(Arc::new(ClosedSocket(dead)));
    scanner.notifier().connect(Arc::new(b));

    let response = scanner
        .handle_scan(Upload::new("clip.mp4", b"frames".to_vec()))
        .await
        .unwrap();

    for rx in [&mut rx_a, &mut rx_b] {
        let alert: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(alert["type"], "THREAT_ALERT");
        assert_eq!(alert["severity"], "HIGH");
        assert_eq!(alert["confidence"], response.confidence);
        assert_eq!(alert["image_url"], response.heatmap.as_str());
        assert_eq!(
            alert["message"],
            format!("Deepfake detected: {}", response.explanation).as_str()
        );
    }

    assert_eq!(scanner.notifier().len(), 2);
    assert!(!scanner.notifier().is_connected(dead));
    assert_eq!(scanner.health().observers, 2);
}

#[tokio::test]
async fn test_real_scan_does_not_alert() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());
    let (observer, mut rx) = ChannelObserver::pair();
    scanner.notifier().connect(Arc::new(observer));

    scanner
        .handle_scan(Upload::new("REAL_portrait.png", PNG.to_vec()))
        .await
        .unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_alert_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    // Mock FAKE scores top out at 98.
    config.alerts.min_confidence = 99.5;
    let loader = Box::new(mediascan::detector::MissingBackend::new("none"));
    let scanner = scanner_with_loader(config, loader);
    let (observer, mut rx) = ChannelObserver::pair();
    scanner.notifier().connect(Arc::new(observer));

    let response = scanner
        .handle_scan(Upload::new("clip.mp4", b"frames".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.prediction, mediascan::Label::Fake);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_scan_with_no_observers() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = mock_scanner(dir.path());
    assert!(scanner.notifier().is_empty());

    let response = scanner
        .handle_scan(Upload::new("clip.mp4", b"frames".to_vec()))
        .await
        .unwrap();
    assert_eq!(response.status, "success");
}
