//! Deadline wrapper for pipeline stages.
//!
//! The core imposes no deadline on inference by default; a deployment can
//! configure one, in which case the stage is abandoned when it expires.

use crate::error::DetectionFailure;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Deadline configuration for one stage.
#[derive(Debug, Clone)]
pub struct Deadline {
    /// Maximum duration for the stage; `None` waits indefinitely.
    pub duration: Option<Duration>,
    /// Stage name for logging.
    pub stage: String,
}

impl Deadline {
    pub fn new(seconds: Option<u64>, stage: impl Into<String>) -> Self {
        Self {
            duration: seconds.map(Duration::from_secs),
            stage: stage.into(),
        }
    }

    pub fn unbounded(stage: impl Into<String>) -> Self {
        Self::new(None, stage)
    }
}

/// Run a stage under an optional deadline.
pub async fn with_deadline<T, F>(deadline: Deadline, future: F) -> Result<T, DetectionFailure>
where
    F: Future<Output = Result<T, DetectionFailure>>,
{
    let Some(duration) = deadline.duration else {
        return future.await;
    };

    debug!(
        stage = %deadline.stage,
        seconds = duration.as_secs(),
        "Running stage under deadline"
    );

    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                stage = %deadline.stage,
                seconds = duration.as_secs(),
                "Stage timed out"
            );
            Err(DetectionFailure::Timeout {
                seconds: duration.as_secs(),
            })
        }
    }
}
