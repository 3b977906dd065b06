// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![deny(missing_docs)] // Documentation is a must for release

//! # SignalSource
//!
//! Sampled 8-bit signal data from the `signal_reader` character device, or from
//! a deterministic file-driven simulation when the device is not there.
//!
//! ## Overview
//!
//! A [`SignalSource`] is built once per process. At construction it checks the
//! platform and the device node and settles on one backend for its whole
//! lifetime:
//!
//! - **Real device**: the node is opened non-blocking, channels are switched
//!   with the driver's `_IOW('s', 0, int)` control call, and reads are raw.
//! - **Simulation**: one raw sample file per channel (`sig1.bin`, `sig2.bin`),
//!   read circularly, falling back to a synthesized sine period when a file is
//!   missing or empty.
//!
//! Either way the consumer sees the same contract: [`SignalSource::select_channel`],
//! [`SignalSource::read_chunk`] and [`SignalSource::close`]. Device faults never
//! escape the source; a failed read is an empty chunk.
//!
//! ## Streaming
//!
//! With the `streaming` feature (default), [`streaming::StreamPump`] turns the
//! blocking read into a cancellable stream of [`SampleChunk`]s for one consumer.
//!
//! ## Error Handling
//!
//! ```rust
//! use signal_source::{SignalError, SignalSource, SourceConfig};
//!
//! let dir = std::env::temp_dir().join("signal_source_doc");
//! let source = SignalSource::simulated(&SourceConfig::simulation_in(&dir));
//!
//! match source.select_channel(2) {
//!     Ok(channel) => println!("now on channel {channel}"),
//!     Err(SignalError::InvalidChannel(id)) => eprintln!("no channel {id}"),
//!     Err(err) if err.is_user_visible() => eprintln!("{err}"),
//!     Err(err) => tracing::warn!(%err, "channel switch failed"),
//! }
//! ```
//!
//! ## Features
//!
//! - `streaming`: async chunk streams (tokio, tokio-util, futures)
//! - `cli`: the `signal-source` binary (clap, tracing-subscriber)

pub mod channel;
pub mod chunk;
pub mod config;
pub mod error;
pub mod ioctl;
pub mod signal_source;
pub mod sources;

#[cfg(feature = "streaming")]
pub mod streaming;

#[cfg(feature = "cli")]
pub mod logging;

pub use channel::ChannelId;
pub use chunk::SampleChunk;
pub use config::{PumpConfig, SourceConfig};
pub use error::{DeviceUnavailableReason, SignalError, SignalResult};
pub use signal_source::{BackendKind, BackendMode, SignalSource};
pub use sources::{DeviceSource, SimulationBuffer, SimulationSource};

#[cfg(feature = "streaming")]
pub use streaming::{ChunkStream, PumpExit, PumpHandle, StreamPump};
