//! File-driven simulation backend.

use super::fallback::{FallbackChain, FallbackStep};
use crate::channel::ChannelId;
use crate::chunk::SampleChunk;
use crate::config::SourceConfig;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A finite sample buffer read circularly.
///
/// The cursor stays in `[0, len)` for a non-empty buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationBuffer {
    samples: Arc<[u8]>,
    cursor: usize,
}

impl SimulationBuffer {
    /// Wrap `samples` with the cursor at the start.
    pub fn new(samples: Vec<u8>) -> Self {
        Self {
            samples: samples.into(),
            cursor: 0,
        }
    }

    /// Load `path`, falling back to the default sine wave if it is missing or empty.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let resolved = FallbackChain::new()
            .then(FallbackStep::File(path.as_ref().to_path_buf()))
            .resolve();
        Self::new(resolved.samples)
    }

    /// Number of samples in one period.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the next sample to read.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The whole period.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Read `n` samples from the cursor, wrapping at the end of the buffer.
    pub fn read(&mut self, n: usize) -> SampleChunk {
        let len = self.samples.len();
        if len == 0 || n == 0 {
            return SampleChunk::empty();
        }

        let chunk: Vec<u8> = (0..n)
            .map(|offset| self.samples[(self.cursor + offset) % len])
            .collect();
        self.cursor = (self.cursor + n % len) % len;
        chunk.into()
    }
}

#[derive(Debug)]
struct SimulationState {
    buffer: SimulationBuffer,
    path: PathBuf,
    channel: ChannelId,
}

/// Simulation backend: one buffer per active channel, reloaded on channel switch.
///
/// Reads copy out of the buffer under the lock and then sleep for the configured
/// read delay outside it, so a channel switch never waits on the pacing delay.
#[derive(Debug)]
pub struct SimulationSource {
    config: SourceConfig,
    state: Mutex<SimulationState>,
}

impl SimulationSource {
    /// Start on channel 0 with its configured file.
    pub fn new(config: &SourceConfig) -> Self {
        let channel = ChannelId::Channel0;
        let path = config.simulation_path(channel);
        let buffer = SimulationBuffer::load(&path);
        tracing::info!(
            path = %path.display(),
            samples = buffer.len(),
            "loaded simulation data"
        );

        Self {
            config: config.clone(),
            state: Mutex::new(SimulationState {
                buffer,
                path,
                channel,
            }),
        }
    }

    /// Read the next `n` samples, then wait out the simulated read latency.
    pub fn read_chunk(&self, n: usize) -> SampleChunk {
        let chunk = self.state.lock().buffer.read(n);
        if !self.config.simulated_read_delay.is_zero() {
            std::thread::sleep(self.config.simulated_read_delay);
        }
        chunk
    }

    /// Switch to `channel`'s file and restart from its first sample.
    ///
    /// The file is loaded before the lock is taken; a read in progress finishes
    /// against the old buffer.
    pub fn select_channel(&self, channel: ChannelId) {
        let path = self.config.simulation_path(channel);
        let buffer = SimulationBuffer::load(&path);
        let samples = buffer.len();

        let mut state = self.state.lock();
        state.buffer = buffer;
        state.path = path;
        state.channel = channel;
        drop(state);

        tracing::info!(%channel, samples, "simulation switched channel");
    }

    /// Channel currently being replayed.
    pub fn channel(&self) -> ChannelId {
        self.state.lock().channel
    }

    /// File the current buffer was requested from.
    pub fn source_path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Snapshot of the current buffer and cursor.
    pub fn buffer(&self) -> SimulationBuffer {
        self.state.lock().buffer.clone()
    }

    /// Pacing delay applied to each read.
    pub const fn read_delay(&self) -> Duration {
        self.config.simulated_read_delay
    }
}
