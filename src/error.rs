//! # Channel Error Types
//!
//! Error taxonomy for the chunk channel. Completion is deliberately *not* an
//! error: a clean end of stream is reported through
//! [`ReadOutcome::EndOfStream`](crate::channel::ReadOutcome), so callers never
//! have to classify a low-level failure after the fact to decide whether the
//! stream finished or broke.

use thiserror::Error;

/// Errors that can occur on channel operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Channel or read parameters are invalid (e.g., zero capacity).
    #[error("Invalid channel configuration: {0}")]
    InvalidConfiguration(String),

    /// A write was attempted after the producer signalled completion, or
    /// after the channel reached its clean terminal state.
    #[error("Channel is closed for writing")]
    ClosedForWriting,

    /// The channel was torn down before natural completion. Any bytes that
    /// were buffered but not yet delivered are lost; downstream must not
    /// treat this as a short read.
    #[error("Channel aborted before completion")]
    Aborted,
}

impl ChannelError {
    /// Returns `true` if the error reports abnormal stream termination.
    pub fn is_abort(&self) -> bool {
        matches!(self, ChannelError::Aborted)
    }

    /// Returns `true` if the error is a caller-side usage problem rather
    /// than a channel state change.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ChannelError::InvalidConfiguration(_))
    }
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
