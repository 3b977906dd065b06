//! Error types and result utilities for signal source operations.

use crate::channel::ChannelId;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience type alias for results that may contain SignalError
pub type SignalResult<T> = Result<T, SignalError>;

/// Why a real device could not back the signal source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceUnavailableReason {
    /// The host OS does not provide the device I/O primitive.
    PlatformUnsupported,
    /// The device node does not exist.
    NodeMissing,
    /// The node exists but opening it failed (permissions, driver not loaded, ...).
    OpenFailed(String),
}

impl std::fmt::Display for DeviceUnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformUnsupported => write!(f, "platform does not support device I/O"),
            Self::NodeMissing => write!(f, "device node not found"),
            Self::OpenFailed(reason) => write!(f, "open failed: {reason}"),
        }
    }
}

/// Error types that can occur while selecting, reading or streaming signal data.
#[derive(Error, Debug)]
pub enum SignalError {
    /// No real device is available; the caller falls back to simulation.
    #[error("Device {} not available: {reason}", path.display())]
    DeviceUnavailable {
        /// Device node that was probed
        path: PathBuf,
        /// What made the device unusable
        reason: DeviceUnavailableReason,
    },

    /// The channel control call on the real device failed.
    ///
    /// The device keeps its previous channel; the caller may retry.
    #[error("ioctl for channel {channel} failed: {source}")]
    IoctlFailed {
        /// Channel that was requested
        channel: ChannelId,
        /// OS error reported by the control call
        #[source]
        source: std::io::Error,
    },

    /// Requested channel id is outside the valid set.
    #[error("Invalid channel {0}: expected 0 or 1")]
    InvalidChannel(i64),

    /// A pump loop ended because of an unexpected fault.
    #[error("Stream terminated: {0}")]
    StreamTerminated(String),

    /// Configuration values that cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Other I/O failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalError {
    /// Create a device-unavailable error
    pub fn device_unavailable(path: impl Into<PathBuf>, reason: DeviceUnavailableReason) -> Self {
        Self::DeviceUnavailable {
            path: path.into(),
            reason,
        }
    }

    /// Whether the boundary layer should show this error to its user as a status.
    ///
    /// Only channel validation and device availability are surfaced; everything
    /// else stays inside the source.
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::InvalidChannel(_) | Self::DeviceUnavailable { .. })
    }

    /// No condition in the signal source terminates the process.
    pub const fn is_fatal(&self) -> bool {
        false
    }
}
