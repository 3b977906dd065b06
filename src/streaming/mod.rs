//! Continuous, cancellable chunk streams on top of a [`SignalSource`].
//!
//! A [`StreamPump`] repeatedly reads from a shared source on tokio's blocking
//! pool and forwards non-empty chunks to exactly one consumer through a bounded
//! channel, so a slow consumer applies backpressure instead of growing a queue.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use signal_source::streaming::*;
//!
//! let (handle, mut chunks) = StreamPump::new(source, PumpConfig::default()).spawn()?;
//! while let Some(chunk) = chunks.next().await {
//!     forward(chunk);
//! }
//! handle.stop();
//! ```
//!
//! [`SignalSource`]: crate::SignalSource

pub mod pump;

#[cfg(test)]
mod tests;

pub use pump::{ChunkStream, PumpExit, PumpHandle, StreamPump};
