//! # chunk-channel
//!
//! Real-time streaming byte channel for media playback pipelines.
//!
//! ## Overview
//!
//! This crate provides [`ChunkChannel`], a bounded, ordered,
//! single-producer/single-consumer byte channel that lets audio bytes
//! arriving irregularly and asynchronously be consumed by a decoder that
//! expects a synchronous, pull-based `read` contract. It handles:
//!
//! - Backpressure: a fixed capacity bound with blocking writes, so a slow
//!   consumer throttles a fast producer without unbounded memory growth
//! - Explicit terminal states: a clean finish ([`ReadOutcome::EndOfStream`])
//!   is a different outcome than an abort ([`ChannelError::Aborted`])
//! - Cancellation: [`ChunkChannel::close`] wakes both sides immediately,
//!   with no polling anywhere on the decoder's critical path
//! - Diagnostics: non-blocking counter snapshots via
//!   [`ChunkChannel::stats`]
//!
//! Decoding, transport, caching, and playback-state handling belong to the
//! surrounding layers; their seams are described by [`traits::ChunkSink`]
//! and [`traits::ByteSource`].

pub mod channel;
pub mod config;
pub mod error;
pub mod traits;

pub use channel::{ChunkChannel, ReadOutcome};
pub use config::{ChannelConfig, ChannelState, ChannelStats};
pub use error::{ChannelError, Result};
