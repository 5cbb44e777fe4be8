//! # Channel Configuration
//!
//! Configuration and diagnostics types for the chunk channel.
//!
//! The channel exposes exactly one tunable: buffer capacity in bytes. The
//! presets cover the operating points seen in practice, from conservative
//! memory use on constrained devices up to smoother high-bitrate ingestion.

use crate::error::{ChannelError, Result};
use serde::{Deserialize, Serialize};

/// Chunk channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Maximum number of buffered, unread bytes.
    ///
    /// A write that would exceed this bound blocks the producer until the
    /// consumer frees space; the backlog never grows past it.
    ///
    /// Default: 1 MiB.
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: default_capacity_bytes(),
        }
    }
}

impl ChannelConfig {
    /// Configuration for conservative memory use (64 KiB).
    ///
    /// Suited to short clips or memory-constrained hosts; a fast producer
    /// will spend more time blocked on backpressure.
    pub fn conservative() -> Self {
        Self {
            capacity_bytes: 64 * 1024,
        }
    }

    /// Configuration for high-bitrate ingestion (2 MiB).
    ///
    /// Absorbs bursty network delivery without throttling the producer as
    /// often, at the cost of more resident memory per session.
    pub fn high_bitrate() -> Self {
        Self {
            capacity_bytes: 2 * 1024 * 1024,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.capacity_bytes == 0 {
            return Err(ChannelError::InvalidConfiguration(
                "capacity_bytes must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_capacity_bytes() -> usize {
    1024 * 1024 // 1 MiB
}

// ============================================================================
// Channel State
// ============================================================================

/// Lifecycle state of a chunk channel.
///
/// The only legal transitions are `Open -> Draining -> Closed` for a clean
/// finish and `Open | Draining -> Aborted` for teardown before completion.
/// `Closed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Accepting writes and reads.
    Open,
    /// Producer signalled completion; remaining backlog may still be read.
    Draining,
    /// All written bytes were delivered and the producer declared completion.
    Closed,
    /// Torn down before natural completion; undelivered bytes are lost.
    Aborted,
}

impl ChannelState {
    /// Returns `true` if writes are still accepted.
    pub fn accepts_writes(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if no further data will ever flow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Aborted)
    }
}

// ============================================================================
// Channel Statistics
// ============================================================================

/// Snapshot of channel counters for diagnostics and telemetry.
///
/// `bytes_written` and `bytes_read` are monotonic; while the channel is live,
/// `bytes_written - bytes_read == backlog_bytes`. After an abort the backlog
/// is released, so undelivered bytes remain visible only as the difference
/// between the two counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// Total bytes accepted from the producer.
    pub bytes_written: u64,
    /// Total bytes delivered to the consumer.
    pub bytes_read: u64,
    /// Bytes currently buffered and not yet delivered.
    pub backlog_bytes: usize,
    /// Current lifecycle state.
    pub state: ChannelState,
}

impl ChannelStats {
    /// Buffer fill level as a fraction of the given capacity (0.0 to 1.0).
    pub fn fill_ratio(&self, capacity: usize) -> f32 {
        if capacity == 0 {
            return 0.0;
        }
        (self.backlog_bytes as f32 / capacity as f32).min(1.0)
    }

    /// Returns `true` if a pull would make progress without blocking:
    /// data is buffered, or the producer already finished.
    pub fn is_ready(&self) -> bool {
        self.backlog_bytes > 0 || self.state != ChannelState::Open
    }
}
