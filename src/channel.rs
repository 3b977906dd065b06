//! Selectable signal channels.

use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent signal inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ChannelId {
    /// First signal line (driver channel `SIG1`)
    Channel0,
    /// Second signal line (driver channel `SIG2`)
    Channel1,
}

impl ChannelId {
    /// All valid channels, in id order.
    pub const ALL: [ChannelId; 2] = [ChannelId::Channel0, ChannelId::Channel1];

    /// Numeric id as understood by the driver.
    pub const fn id(self) -> u32 {
        match self {
            Self::Channel0 => 0,
            Self::Channel1 => 1,
        }
    }

    /// Position of this channel in per-channel tables.
    pub const fn index(self) -> usize {
        self.id() as usize
    }

    /// Control-call argument: the id as a 4-byte little-endian word.
    pub const fn to_ioctl_arg(self) -> [u8; 4] {
        self.id().to_le_bytes()
    }

    /// Decode a 4-byte little-endian word returned by the driver.
    pub fn from_ioctl_arg(arg: [u8; 4]) -> SignalResult<Self> {
        Self::try_from(i64::from(i32::from_le_bytes(arg)))
    }
}

impl TryFrom<i64> for ChannelId {
    type Error = SignalError;

    fn try_from(value: i64) -> SignalResult<Self> {
        match value {
            0 => Ok(Self::Channel0),
            1 => Ok(Self::Channel1),
            other => Err(SignalError::InvalidChannel(other)),
        }
    }
}

impl From<ChannelId> for i64 {
    fn from(channel: ChannelId) -> Self {
        i64::from(channel.id())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
