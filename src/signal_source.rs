//! The signal source facade.
//!
//! A [`SignalSource`] decides once, at construction, whether a real device or
//! the file-driven simulation backs the data, and then offers the same
//! select / read / close contract for either. The backend never changes for the
//! lifetime of an instance; only the channel inside it does.
//!
//! ```rust,no_run
//! use signal_source::{SignalSource, SourceConfig};
//! use std::sync::Arc;
//!
//! let source = Arc::new(SignalSource::open(&SourceConfig::from_env()));
//! source.select_channel(1)?;
//! let chunk = source.read_chunk(16);
//! println!("{:?}", chunk.as_slice());
//! source.close();
//! # Ok::<(), signal_source::SignalError>(())
//! ```

use crate::channel::ChannelId;
use crate::chunk::SampleChunk;
use crate::config::SourceConfig;
use crate::error::{SignalError, SignalResult};
use crate::sources::{DeviceSource, SimulationSource};
use std::fmt;

/// The backend chosen at construction.
#[derive(Debug)]
pub enum BackendMode {
    /// File-driven simulation
    Simulated(SimulationSource),
    /// Real character device
    RealDevice(DeviceSource),
}

/// Which backend variant is active, without the backend itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Simulation backend
    Simulated,
    /// Real device backend
    RealDevice,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::RealDevice => write!(f, "device"),
        }
    }
}

/// Uniform access to sampled signal data from a device or a simulation.
///
/// Share one instance per process behind an `Arc`. Backend state is guarded by
/// a lock inside each backend, so a channel switch never interleaves with the
/// byte-level mechanics of a single read; it takes effect on the next read.
#[derive(Debug)]
pub struct SignalSource {
    mode: BackendMode,
}

impl SignalSource {
    /// Probe for the device and fall back to simulation if it cannot be used.
    pub fn open(config: &SourceConfig) -> Self {
        match DeviceSource::probe(config) {
            Ok(device) => {
                tracing::info!(path = %device.path().display(), "using real signal device");
                Self {
                    mode: BackendMode::RealDevice(device),
                }
            }
            Err(error) => {
                tracing::warn!(%error, "switching to simulation mode");
                Self::simulated(config)
            }
        }
    }

    /// Build a simulation-backed source without probing for a device.
    pub fn simulated(config: &SourceConfig) -> Self {
        Self {
            mode: BackendMode::Simulated(SimulationSource::new(config)),
        }
    }

    /// Wrap an already opened device.
    pub fn from_device(device: DeviceSource) -> Self {
        Self {
            mode: BackendMode::RealDevice(device),
        }
    }

    /// Which backend is active.
    pub fn kind(&self) -> BackendKind {
        match &self.mode {
            BackendMode::Simulated(_) => BackendKind::Simulated,
            BackendMode::RealDevice(_) => BackendKind::RealDevice,
        }
    }

    /// Whether the simulation backend is active.
    pub fn is_simulated(&self) -> bool {
        matches!(self.kind(), BackendKind::Simulated)
    }

    /// The active backend.
    pub const fn mode(&self) -> &BackendMode {
        &self.mode
    }

    /// Validate a raw channel id and switch to it.
    ///
    /// Ids outside {0, 1} are rejected with [`SignalError::InvalidChannel`]
    /// before any backend is touched.
    pub fn select_channel(&self, channel: i64) -> SignalResult<ChannelId> {
        let channel = ChannelId::try_from(channel).inspect_err(|error| {
            tracing::warn!(%error, "rejected channel selection");
        })?;
        self.set_channel(channel)?;
        Ok(channel)
    }

    /// Switch the active backend to `channel`.
    ///
    /// The switch is observed by the next read. A failed device switch leaves
    /// the previous channel active and is reported as [`SignalError::IoctlFailed`].
    pub fn set_channel(&self, channel: ChannelId) -> SignalResult<()> {
        match &self.mode {
            BackendMode::Simulated(sim) => {
                sim.select_channel(channel);
                Ok(())
            }
            BackendMode::RealDevice(device) => device.set_channel(channel),
        }
    }

    /// Channel currently active in the backend.
    pub fn current_channel(&self) -> SignalResult<ChannelId> {
        match &self.mode {
            BackendMode::Simulated(sim) => Ok(sim.channel()),
            BackendMode::RealDevice(device) => device.channel(),
        }
    }

    /// Read the next chunk of up to `n` samples.
    ///
    /// This call may block (simulated latency, device I/O); async callers must
    /// run it on a blocking-capable thread. An empty chunk means "no data this
    /// round" and is never an error.
    pub fn read_chunk(&self, n: usize) -> SampleChunk {
        match &self.mode {
            BackendMode::Simulated(sim) => sim.read_chunk(n),
            BackendMode::RealDevice(device) => device.read_chunk(n),
        }
    }

    /// Release the device descriptor, if any. Safe to call repeatedly.
    ///
    /// Readers still running afterwards get empty chunks.
    pub fn close(&self) {
        if let BackendMode::RealDevice(device) = &self.mode {
            device.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    fn simulated_with_files() -> (tempfile::TempDir, SignalSource) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sig1.bin"), ramp(64)).unwrap();
        std::fs::write(dir.path().join("sig2.bin"), [9u8; 8]).unwrap();
        let source = SignalSource::simulated(&SourceConfig::simulation_in(dir.path()));
        (dir, source)
    }

    #[test]
    fn test_missing_device_falls_back_to_simulation() {
        let dir = tempfile::tempdir().unwrap();
        let config = SourceConfig {
            device_path: dir.path().join("signal_reader"),
            ..SourceConfig::simulation_in(dir.path())
        };
        let source = SignalSource::open(&config);

        assert_eq!(source.kind(), BackendKind::Simulated);
        assert_eq!(source.read_chunk(16).len(), 16);
        source.close();
        source.close();
        assert_eq!(source.kind(), BackendKind::Simulated);
    }

    #[test]
    fn test_invalid_channel_leaves_state_untouched() {
        let (_dir, source) = simulated_with_files();
        assert_eq!(source.read_chunk(4).as_slice(), &[0, 1, 2, 3]);

        for bad in [2, -1, 100] {
            assert!(matches!(
                source.select_channel(bad),
                Err(SignalError::InvalidChannel(value)) if value == bad
            ));
        }

        assert_eq!(source.current_channel().unwrap(), ChannelId::Channel0);
        assert_eq!(source.read_chunk(4).as_slice(), &[4, 5, 6, 7]);
    }

    #[test]
    fn test_select_channel_switches_simulation_file() {
        let (_dir, source) = simulated_with_files();
        source.read_chunk(10);

        assert_eq!(source.select_channel(1).unwrap(), ChannelId::Channel1);
        assert_eq!(source.current_channel().unwrap(), ChannelId::Channel1);
        assert_eq!(source.read_chunk(4).as_slice(), &[9, 9, 9, 9]);

        source.set_channel(ChannelId::Channel0).unwrap();
        assert_eq!(source.read_chunk(3).as_slice(), &[0, 1, 2]);
    }

    #[cfg(unix)]
    #[test]
    fn test_device_mode_dispatch_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal_reader");
        std::fs::write(&path, ramp(32)).unwrap();

        let source = SignalSource::from_device(DeviceSource::open(&path).unwrap());
        assert_eq!(source.kind(), BackendKind::RealDevice);
        assert_eq!(source.read_chunk(16).as_slice(), &ramp(16)[..]);

        assert!(matches!(
            source.select_channel(1),
            Err(SignalError::IoctlFailed { .. })
        ));
        assert!(matches!(
            source.select_channel(5),
            Err(SignalError::InvalidChannel(5))
        ));

        source.close();
        source.close();
        assert!(source.read_chunk(16).is_empty());
        assert_eq!(source.kind(), BackendKind::RealDevice);
    }
}
