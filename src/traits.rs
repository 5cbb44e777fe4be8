//! # Channel Seam Traits
//!
//! The channel sits between two collaborators that are not part of this
//! crate: the producer pushing bytes (network callback, IPC handler) and the
//! decoder driver pulling them. These traits describe exactly the interface
//! each side needs, so the bridge layer and the decoder can be written
//! against an abstraction and handed any conforming channel.
//!
//! [`ChunkChannel`] implements both; a session typically hands one clone to
//! each side as the narrower trait object.

use crate::channel::{ChunkChannel, ReadOutcome};
use crate::config::ChannelStats;
use crate::error::Result;

/// Push side of a streaming byte session.
///
/// Exactly one producer context should hold this per channel instance.
pub trait ChunkSink: Send + Sync {
    /// Append a chunk, blocking while the buffer is full.
    fn write(&self, chunk: &[u8]) -> Result<()>;

    /// Declare that no further bytes will be written. Idempotent.
    fn signal_complete(&self);

    /// Tear the session down before completion. Idempotent.
    fn close(&self);
}

/// Pull side of a streaming byte session, the contract a media-source
/// abstraction drives from the decoder thread.
pub trait ByteSource: Send + Sync {
    /// Pull up to `max_len` bytes, blocking while the stream is open and
    /// empty. See [`ChunkChannel::read`] for the full contract.
    fn pull(&self, max_len: usize) -> Result<ReadOutcome>;

    /// Non-blocking counter snapshot for diagnostics.
    fn stats(&self) -> ChannelStats;
}

impl ChunkSink for ChunkChannel {
    fn write(&self, chunk: &[u8]) -> Result<()> {
        ChunkChannel::write(self, chunk)
    }

    fn signal_complete(&self) {
        ChunkChannel::signal_complete(self)
    }

    fn close(&self) {
        ChunkChannel::close(self)
    }
}

impl ByteSource for ChunkChannel {
    fn pull(&self, max_len: usize) -> Result<ReadOutcome> {
        ChunkChannel::read(self, max_len)
    }

    fn stats(&self) -> ChannelStats {
        ChunkChannel::stats(self)
    }
}
