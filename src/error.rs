//! Pipeline error taxonomy.
//!
//! Only connection-level failures are allowed to terminate a process. Per-frame
//! failures (bad payload, unwritable artifact) are isolated so one bad frame
//! never aborts a session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload is not a valid frame envelope (bad JSON, bad base64, or a
    /// corrupt/truncated JPEG). Recoverable: drop the frame, keep consuming.
    #[error("frame decode failed: {0}")]
    Decode(String),

    /// Broker unreachable or connection dropped. Fatal to the owning process;
    /// reconnect policy is an operations concern, not handled here.
    #[error("channel connection failed: {0}")]
    Channel(String),

    /// Violation frame could not be persisted. Recoverable: log and continue;
    /// tracker state is unaffected.
    #[error("artifact persistence failed: {0}")]
    Artifact(String),
}

impl PipelineError {
    /// True when the consuming loop may keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::Channel(_))
    }
}
