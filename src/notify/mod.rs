//! Broadcast registry for real-time alerts.
//!
//! Observers connect and disconnect at any time. A broadcast works on a
//! snapshot of the registry taken when it starts; the registry lock is held
//! only while copying or mutating the set, never while sending.

pub mod observer;

use crate::core::AlertPayload;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

pub use observer::{ChannelObserver, Observer, ObserverId};

/// Delivery statistics for one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: Vec<ObserverId>,
}

#[derive(Default)]
pub struct Notifier {
    observers: Mutex<HashMap<ObserverId, Arc<dyn Observer>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<ObserverId, Arc<dyn Observer>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer. Connecting an already registered id is a no-op.
    pub fn connect(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = observer.id();
        let mut registry = self.registry();
        if registry.contains_key(&id) {
            debug!(observer = %id, "Observer already connected");
        } else {
            registry.insert(id, observer);
            info!(observer = %id, total = registry.len(), "Observer connected");
        }
        id
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn disconnect(&self, id: ObserverId) {
        let mut registry = self.registry();
        if registry.remove(&id).is_some() {
            info!(observer = %id, total = registry.len(), "Observer disconnected");
        }
    }

    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    pub fn is_connected(&self, id: ObserverId) -> bool {
        self.registry().contains_key(&id)
    }

    /// Deliver `payload` to every connected observer, pruning the ones whose
    /// send fails. Always completes.
    pub fn broadcast(&self, payload: &AlertPayload) {
        let _ = self.broadcast_report(payload);
    }

    /// [`Notifier::broadcast`], returning delivery statistics.
    pub fn broadcast_report(&self, payload: &AlertPayload) -> BroadcastReport {
        let frame = match serde_json::to_string(payload) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Failed to encode alert, nothing sent");
                return BroadcastReport::default();
            }
        };

        let snapshot: Vec<Arc<dyn Observer>> = self.registry().values().cloned().collect();
        let mut report = BroadcastReport::default();
        for observer in &snapshot {
            match observer.send(&frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(observer = %observer.id(), error = %e, "Alert delivery failed");
                    report.dropped.push(observer.id());
                }
            }
        }

        if !report.dropped.is_empty() {
            let mut registry = self.registry();
            for id in &report.dropped {
                registry.remove(id);
            }
        }

        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "Broadcast complete"
        );
        report
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.len())
            .finish()
    }
}
