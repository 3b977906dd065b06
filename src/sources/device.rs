//! Character-device backend for the signal reader driver.
//!
//! The node is opened once in non-blocking read mode. Channel switches go
//! through the driver's `SET_CHANNEL` control call; reads are raw and
//! fail-soft: anything other than a full chunk of data comes back as an empty
//! chunk so a pump never stops because of the device.

use crate::channel::ChannelId;
use crate::chunk::SampleChunk;
use crate::config::SourceConfig;
use crate::error::{DeviceUnavailableReason, SignalError, SignalResult};
use crate::ioctl;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[cfg(unix)]
mod sys {
    use std::fs::{File, OpenOptions};
    use std::io;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    pub(super) const SUPPORTED: bool = cfg!(target_os = "linux");

    pub(super) fn open_nonblocking(path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
    }

    pub(super) fn ioctl_write(file: &File, request: u32, arg: &[u8; 4]) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `file` and open; the driver copies
        // exactly four bytes from `arg`, which outlives the call.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), request as _, arg.as_ptr()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub(super) fn ioctl_read(file: &File, request: u32, arg: &mut [u8; 4]) -> io::Result<()> {
        // SAFETY: as above; the driver writes exactly four bytes into `arg`.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), request as _, arg.as_mut_ptr()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod sys {
    use std::fs::File;
    use std::io;
    use std::path::Path;

    pub(super) const SUPPORTED: bool = false;

    fn unsupported() -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, "device I/O requires a unix host")
    }

    pub(super) fn open_nonblocking(_path: &Path) -> io::Result<File> {
        Err(unsupported())
    }

    pub(super) fn ioctl_write(_file: &File, _request: u32, _arg: &[u8; 4]) -> io::Result<()> {
        Err(unsupported())
    }

    pub(super) fn ioctl_read(_file: &File, _request: u32, _arg: &mut [u8; 4]) -> io::Result<()> {
        Err(unsupported())
    }
}

/// An exclusively owned, non-blocking handle on the signal reader device.
///
/// The descriptor is released once, by [`DeviceSource::close`] or on drop.
#[derive(Debug)]
pub struct DeviceSource {
    path: PathBuf,
    file: Mutex<Option<File>>,
    deliver_short_reads: bool,
}

impl DeviceSource {
    /// Whether this host provides the device I/O primitive at all.
    pub const fn platform_supported() -> bool {
        sys::SUPPORTED
    }

    /// Check platform support and node existence, then open the configured device.
    pub fn probe(config: &SourceConfig) -> SignalResult<Self> {
        let path = &config.device_path;
        if !Self::platform_supported() {
            return Err(SignalError::device_unavailable(
                path,
                DeviceUnavailableReason::PlatformUnsupported,
            ));
        }
        if !path.exists() {
            return Err(SignalError::device_unavailable(
                path,
                DeviceUnavailableReason::NodeMissing,
            ));
        }

        let mut device = Self::open(path)?;
        device.deliver_short_reads = config.deliver_short_reads;
        Ok(device)
    }

    /// Open `path` for non-blocking reads.
    pub fn open(path: impl AsRef<Path>) -> SignalResult<Self> {
        let path = path.as_ref();
        let file = sys::open_nonblocking(path).map_err(|e| {
            SignalError::device_unavailable(
                path,
                DeviceUnavailableReason::OpenFailed(e.to_string()),
            )
        })?;

        tracing::info!(path = %path.display(), "opened signal device");
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
            deliver_short_reads: false,
        })
    }

    /// Keep reads shorter than requested instead of treating them as "no data".
    pub fn with_short_reads(mut self, deliver: bool) -> Self {
        self.deliver_short_reads = deliver;
        self
    }

    /// Device node this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the descriptor has been released.
    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    /// Switch the driver to `channel`.
    ///
    /// On failure the driver keeps its current channel; nothing is retried.
    pub fn set_channel(&self, channel: ChannelId) -> SignalResult<()> {
        let guard = self.file.lock();
        let result = match guard.as_ref() {
            Some(file) => sys::ioctl_write(file, ioctl::SET_CHANNEL, &channel.to_ioctl_arg()),
            None => Err(closed()),
        };
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(%channel, "device switched channel");
                Ok(())
            }
            Err(source) => {
                tracing::error!(%channel, error = %source, "channel ioctl failed");
                Err(SignalError::IoctlFailed { channel, source })
            }
        }
    }

    /// Ask the driver which channel is active.
    pub fn channel(&self) -> SignalResult<ChannelId> {
        let mut arg = [0u8; 4];
        let guard = self.file.lock();
        let result = match guard.as_ref() {
            Some(file) => sys::ioctl_read(file, ioctl::GET_CHANNEL, &mut arg),
            None => Err(closed()),
        };
        drop(guard);

        match result {
            Ok(()) => ChannelId::from_ioctl_arg(arg),
            Err(source) => {
                tracing::warn!(error = %source, "channel read-back failed");
                Err(SignalError::Io(source))
            }
        }
    }

    /// Read up to `n` bytes without blocking.
    ///
    /// Would-block, end of data, closed handles and OS errors all yield an
    /// empty chunk. Short reads are dropped unless short reads are enabled.
    pub fn read_chunk(&self, n: usize) -> SampleChunk {
        let mut guard = self.file.lock();
        let Some(file) = guard.as_mut() else {
            return SampleChunk::empty();
        };

        let mut buf = vec![0u8; n];
        match file.read(&mut buf) {
            Ok(0) => SampleChunk::empty(),
            Ok(read) if read < n && !self.deliver_short_reads => {
                tracing::trace!(read, requested = n, "short device read dropped");
                SampleChunk::empty()
            }
            Ok(read) => {
                buf.truncate(read);
                buf.into()
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                tracing::trace!("no device data this round");
                SampleChunk::empty()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "device read failed");
                SampleChunk::empty()
            }
        }
    }

    /// Release the descriptor. Returns `true` only for the call that released it.
    pub fn close(&self) -> bool {
        match self.file.lock().take() {
            Some(file) => {
                drop(file);
                tracing::info!(path = %self.path.display(), "closed signal device");
                true
            }
            None => false,
        }
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "device handle is closed")
}
