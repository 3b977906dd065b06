//! Configuration for the signal source and the stream pump.

use crate::channel::ChannelId;
use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Conventional device node created by the signal reader driver.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/signal_reader";

/// Environment variable overriding [`SourceConfig::device_path`].
pub const DEVICE_PATH_ENV: &str = "SIGNAL_DEVICE_PATH";

/// Environment variable overriding [`SourceConfig::simulation_dir`].
pub const SIM_DIR_ENV: &str = "SIGNAL_SIM_DIR";

/// Configuration for backend selection and the two backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Character device probed at construction
    pub device_path: PathBuf,

    /// Directory holding the per-channel simulation files
    pub simulation_dir: PathBuf,

    /// Simulation file for each channel, indexed by channel id
    pub channel_files: [String; 2],

    /// Artificial latency of one simulated read
    pub simulated_read_delay: Duration,

    /// Deliver device reads shorter than requested instead of dropping them.
    ///
    /// Off by default, so a short read counts as "no data". The live driver
    /// queues one byte per dispatch period and hands back whatever is queued,
    /// so with this off nearly every read drains kernel data and discards it.
    /// Turn it on when streaming from real hardware.
    pub deliver_short_reads: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            simulation_dir: PathBuf::from("."),
            channel_files: ["sig1.bin".to_string(), "sig2.bin".to_string()],
            simulated_read_delay: Duration::from_millis(50),
            deliver_short_reads: false,
        }
    }
}

impl SourceConfig {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SIGNAL_DEVICE_PATH` and `SIGNAL_SIM_DIR` if they are set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(DEVICE_PATH_ENV) {
            self.device_path = PathBuf::from(path);
        }
        if let Some(dir) = std::env::var_os(SIM_DIR_ENV) {
            self.simulation_dir = PathBuf::from(dir);
        }
        self
    }

    /// Configuration for tests and demos: simulation files under `dir`, no read delay.
    pub fn simulation_in(dir: impl Into<PathBuf>) -> Self {
        Self {
            simulation_dir: dir.into(),
            simulated_read_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Simulation file backing `channel`.
    pub fn simulation_path(&self, channel: ChannelId) -> PathBuf {
        self.simulation_dir.join(&self.channel_files[channel.index()])
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> SignalResult<()> {
        if self.device_path.as_os_str().is_empty() {
            return Err(SignalError::InvalidConfig(
                "device path must not be empty".to_string(),
            ));
        }
        if self.channel_files.iter().any(|name| name.is_empty()) {
            return Err(SignalError::InvalidConfig(
                "simulation file names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a stream pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    /// Samples requested per read
    pub chunk_size: usize,

    /// Pause after every iteration in simulated mode
    pub simulated_interval: Duration,

    /// Pause after every iteration against a real device
    pub device_poll_interval: Duration,

    /// Chunks buffered for a slow consumer before the pump waits
    pub channel_capacity: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            simulated_interval: Duration::from_millis(100),
            device_poll_interval: Duration::from_millis(10),
            channel_capacity: 4,
        }
    }
}

impl PumpConfig {
    /// Configuration without pacing, for tests and offline draining.
    pub fn unpaced() -> Self {
        Self {
            simulated_interval: Duration::ZERO,
            device_poll_interval: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> SignalResult<()> {
        if self.chunk_size == 0 {
            return Err(SignalError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(SignalError::InvalidConfig(
                "channel capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
