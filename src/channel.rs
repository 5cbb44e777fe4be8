//! # Chunk Channel
//!
//! A bounded, ordered, single-producer/single-consumer byte channel that
//! bridges push-style writes and pull-style reads.
//!
//! ## Architecture
//!
//! Audio bytes arrive irregularly (network callback, IPC handler, application
//! code appending decoded chunks) while the decoder expects a synchronous,
//! blocking `read` contract on its own thread. The channel sits between the
//! two:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Producer (network / IPC)         │
//! │                                         │
//! │  write(chunk)  signal_complete()        │
//! └────────────┬────────────────────────────┘
//!              │ bytes (blocking on full buffer)
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │      ChunkChannel (bounded backlog)     │
//! └────────────┬────────────────────────────┘
//!              │ bytes (blocking on empty buffer)
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │    Decoder driver (consumer thread)     │
//! │                                         │
//! │  read(max_len) -> Data | EndOfStream    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The capacity bound gives structural backpressure: a slow consumer throttles
//! a fast producer through blocking instead of unbounded memory growth or a
//! polling pump thread. All waits are condvar-based; `close()` wakes both
//! sides in the same critical section that flips state.
//!
//! ## Terminal states
//!
//! A clean finish (`signal_complete` then backlog drained) surfaces as
//! [`ReadOutcome::EndOfStream`]; teardown before completion surfaces as
//! [`ChannelError::Aborted`]. The two are distinct, first-class outcomes of
//! `read` — consumers never have to guess which one a failure meant.
//!
//! ## Usage
//!
//! ```rust
//! use chunk_channel::ChunkChannel;
//!
//! let channel = ChunkChannel::open(64 * 1024)?;
//!
//! // Producer side (network callback, any thread):
//! channel.write(&[0x01, 0x02, 0x03])?;
//! channel.signal_complete();
//!
//! // Consumer side (decoder thread):
//! use chunk_channel::ReadOutcome;
//! loop {
//!     match channel.read(4096)? {
//!         ReadOutcome::Data(_bytes) => { /* feed decoder */ }
//!         ReadOutcome::EndOfStream => break,
//!     }
//! }
//! # Ok::<(), chunk_channel::ChannelError>(())
//! ```

use crate::config::{ChannelConfig, ChannelState, ChannelStats};
use crate::error::{ChannelError, Result};
use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Read Outcome
// ============================================================================

/// Successful result of a pull from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Between 1 and `max_len` bytes, in write order. Never empty.
    Data(Bytes),
    /// The producer declared completion and every written byte was delivered.
    EndOfStream,
}

impl ReadOutcome {
    /// Returns `true` if this outcome is the end-of-stream sentinel.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }

    /// Consumes the outcome, returning the payload if data was delivered.
    pub fn into_data(self) -> Option<Bytes> {
        match self {
            ReadOutcome::Data(bytes) => Some(bytes),
            ReadOutcome::EndOfStream => None,
        }
    }
}

// ============================================================================
// ChunkChannel
// ============================================================================

/// Bounded SPSC byte channel with explicit terminal-state signalling.
///
/// Cloning is cheap and shares the underlying channel; hand one clone to the
/// producer context and one to the consumer context. All operations are
/// internally synchronized and safe to call from separate threads.
#[derive(Clone)]
pub struct ChunkChannel {
    shared: Arc<Shared>,
}

struct Shared {
    capacity: usize,
    inner: Mutex<Inner>,
    /// Signalled when bytes are appended or the channel leaves `Open`.
    data_available: Condvar,
    /// Signalled when bytes are drained or the channel leaves `Open`.
    space_available: Condvar,
    /// Serializes producers. The supported contract is a single producer,
    /// but misuse must not interleave chunks or corrupt state.
    producer_gate: Mutex<()>,
}

struct Inner {
    backlog: VecDeque<u8>,
    state: ChannelState,
    bytes_written: u64,
    bytes_read: u64,
}

impl Inner {
    fn free_space(&self, capacity: usize) -> usize {
        capacity - self.backlog.len()
    }
}

impl ChunkChannel {
    /// Open a new channel in the `Open` state.
    ///
    /// `capacity` is the maximum number of buffered, unread bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::InvalidConfiguration`] if `capacity` is zero.
    pub fn open(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ChannelError::InvalidConfiguration(
                "capacity must be > 0".to_string(),
            ));
        }

        debug!(capacity, "opening chunk channel");

        Ok(Self {
            shared: Arc::new(Shared {
                capacity,
                inner: Mutex::new(Inner {
                    backlog: VecDeque::with_capacity(capacity),
                    state: ChannelState::Open,
                    bytes_written: 0,
                    bytes_read: 0,
                }),
                data_available: Condvar::new(),
                space_available: Condvar::new(),
                producer_gate: Mutex::new(()),
            }),
        })
    }

    /// Open a new channel from a validated configuration.
    pub fn with_config(config: &ChannelConfig) -> Result<Self> {
        config.validate()?;
        Self::open(config.capacity_bytes)
    }

    /// Total capacity of the channel in bytes.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.shared.inner.lock().state
    }

    /// Append a chunk to the channel, blocking while the buffer is full.
    ///
    /// The whole chunk is accepted before returning, even when it exceeds
    /// the free space (or the total capacity): bytes are appended as the
    /// consumer frees room. An empty chunk is accepted without effect.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::ClosedForWriting`] if completion was already
    ///   signalled or the channel finished cleanly.
    /// - [`ChannelError::Aborted`] if the channel was torn down, at call
    ///   time or while this call was blocked. Bytes appended before the
    ///   abort are lost along with the rest of the backlog.
    pub fn write(&self, chunk: &[u8]) -> Result<()> {
        let _producer = self.shared.producer_gate.lock();
        let mut inner = self.shared.inner.lock();
        let mut offset = 0;

        loop {
            match inner.state {
                ChannelState::Open => {}
                ChannelState::Aborted => return Err(ChannelError::Aborted),
                ChannelState::Draining | ChannelState::Closed => {
                    return Err(ChannelError::ClosedForWriting)
                }
            }

            if offset == chunk.len() {
                return Ok(());
            }

            let free = inner.free_space(self.shared.capacity);
            if free == 0 {
                self.shared.space_available.wait(&mut inner);
                continue;
            }

            let take = free.min(chunk.len() - offset);
            inner.backlog.extend(&chunk[offset..offset + take]);
            inner.bytes_written += take as u64;
            offset += take;
            self.shared.data_available.notify_one();
        }
    }

    /// Pull up to `max_len` bytes, blocking while the channel is open and
    /// empty.
    ///
    /// On success returns between 1 and `max_len` bytes — never more than
    /// currently buffered, and never an empty [`ReadOutcome::Data`].
    /// [`ReadOutcome::EndOfStream`] is returned exactly when the producer
    /// signalled completion and all written bytes have been delivered; every
    /// subsequent read returns it again.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::Aborted`] if the channel was torn down before
    ///   completion, at call time or while this call was blocked.
    /// - [`ChannelError::InvalidConfiguration`] if `max_len` is zero. A
    ///   zero-length pull is a driver bug; allowing it would alias the
    ///   end-of-stream sentinel.
    pub fn read(&self, max_len: usize) -> Result<ReadOutcome> {
        if max_len == 0 {
            return Err(ChannelError::InvalidConfiguration(
                "read size must be > 0".to_string(),
            ));
        }

        let mut inner = self.shared.inner.lock();

        loop {
            if !inner.backlog.is_empty() {
                let take = inner.backlog.len().min(max_len);
                let data: Vec<u8> = inner.backlog.drain(..take).collect();
                inner.bytes_read += take as u64;
                self.shared.space_available.notify_one();
                return Ok(ReadOutcome::Data(Bytes::from(data)));
            }

            match inner.state {
                ChannelState::Open => self.shared.data_available.wait(&mut inner),
                ChannelState::Draining => {
                    inner.state = ChannelState::Closed;
                    info!(
                        bytes_delivered = inner.bytes_read,
                        "backlog drained, channel closed"
                    );
                    return Ok(ReadOutcome::EndOfStream);
                }
                ChannelState::Closed => return Ok(ReadOutcome::EndOfStream),
                ChannelState::Aborted => return Err(ChannelError::Aborted),
            }
        }
    }

    /// Declare that no further bytes will be written.
    ///
    /// Transitions `Open -> Draining`; the consumer may still drain the
    /// remaining backlog. Idempotent: second and later calls (and calls
    /// after teardown) are no-ops.
    pub fn signal_complete(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state == ChannelState::Open {
            inner.state = ChannelState::Draining;
            debug!(
                bytes_written = inner.bytes_written,
                backlog = inner.backlog.len(),
                "producer signalled completion"
            );
            // Wake a reader blocked on empty backlog so it can observe the
            // drain, and any writer blocked on a full buffer so it can fail
            // with ClosedForWriting instead of hanging.
            self.shared.data_available.notify_all();
            self.shared.space_available.notify_all();
        }
    }

    /// Tear the channel down, forcing `Aborted` unless it already finished
    /// cleanly.
    ///
    /// All threads blocked in [`write`](Self::write) or [`read`](Self::read)
    /// are woken within the same critical section and fail with
    /// [`ChannelError::Aborted`]; buffered memory is released exactly once.
    /// Idempotent from either side: calling it again, or after a natural
    /// `Closed`, is a no-op rather than an error.
    pub fn close(&self) {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            ChannelState::Closed | ChannelState::Aborted => {}
            ChannelState::Open | ChannelState::Draining => {
                let lost = inner.backlog.len();
                inner.backlog = VecDeque::new();
                inner.state = ChannelState::Aborted;

                if lost > 0 {
                    warn!(
                        lost_bytes = lost,
                        bytes_written = inner.bytes_written,
                        bytes_read = inner.bytes_read,
                        "channel aborted with undelivered bytes"
                    );
                } else {
                    info!(
                        bytes_written = inner.bytes_written,
                        bytes_read = inner.bytes_read,
                        "channel aborted"
                    );
                }

                self.shared.data_available.notify_all();
                self.shared.space_available.notify_all();
            }
        }
    }

    /// Non-blocking snapshot of channel counters, callable from any thread.
    pub fn stats(&self) -> ChannelStats {
        let inner = self.shared.inner.lock();
        ChannelStats {
            bytes_written: inner.bytes_written,
            bytes_read: inner.bytes_read,
            backlog_bytes: inner.backlog.len(),
            state: inner.state,
        }
    }
}

impl std::fmt::Debug for ChunkChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ChunkChannel")
            .field("capacity", &self.shared.capacity)
            .field("state", &stats.state)
            .field("backlog_bytes", &stats.backlog_bytes)
            .finish()
    }
}

// ============================================================================
// io::Read adapter
// ============================================================================

/// Blocking `Read` view of the channel, matching the synchronous
/// `read(buffer, offset, length)` contract of media-source abstractions.
///
/// A clean finish maps to `Ok(0)`; an abort maps to
/// [`io::ErrorKind::ConnectionAborted`], so drivers can still distinguish
/// the two through the standard interface.
impl io::Read for ChunkChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        match ChunkChannel::read(self, buf.len()) {
            Ok(ReadOutcome::Data(data)) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
            Ok(ReadOutcome::EndOfStream) => Ok(0),
            Err(err @ ChannelError::Aborted) => {
                Err(io::Error::new(io::ErrorKind::ConnectionAborted, err))
            }
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidInput, err)),
        }
    }
}
