//! Observer handles that receive broadcast alerts.

use crate::error::BroadcastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of a connected observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(Uuid);

impl ObserverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A connected endpoint. `send` must not block; a failure means the
/// endpoint is gone and it will be disconnected.
pub trait Observer: Send + Sync {
    fn id(&self) -> ObserverId;

    /// Deliver one encoded alert frame.
    fn send(&self, frame: &str) -> Result<(), BroadcastError>;
}

/// Observer backed by an unbounded channel, e.g. the write half of a socket task.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    id: ObserverId,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelObserver {
    /// Create an observer and the receiver its frames arrive on.
    /// Dropping the receiver disconnects the observer on its next send.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::pair_with_id(ObserverId::new())
    }

    pub fn pair_with_id(id: ObserverId) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn send(&self, frame: &str) -> Result<(), BroadcastError> {
        self.tx
            .send(frame.to_string())
            .map_err(|_| BroadcastError::Disconnected(self.id.to_string()))
    }
}
