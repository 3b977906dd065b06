//! Bridge from blocking chunk reads to an async chunk stream.

use crate::chunk::SampleChunk;
use crate::config::PumpConfig;
use crate::error::{SignalError, SignalResult};
use crate::signal_source::{BackendKind, SignalSource};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How a pump loop ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The cancellation token fired.
    Cancelled,
    /// The consumer dropped or closed its stream.
    Detached,
}

/// Drives one consumer's stream from a shared [`SignalSource`].
pub struct StreamPump {
    source: Arc<SignalSource>,
    config: PumpConfig,
    cancel: CancellationToken,
}

impl StreamPump {
    /// Create a pump over `source` with its own cancellation token.
    pub fn new(source: Arc<SignalSource>, config: PumpConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` for cancellation, e.g. a child of a server-wide shutdown token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Pause between iterations for the source's backend.
    pub fn pacing(&self) -> Duration {
        match self.source.kind() {
            BackendKind::Simulated => self.config.simulated_interval,
            BackendKind::RealDevice => self.config.device_poll_interval,
        }
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// Returns a handle to stop or await the loop and the consumer's stream.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> SignalResult<(PumpHandle, ChunkStream)> {
        self.config.validate()?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let cancel = self.cancel.clone();
        let task = tokio::spawn(self.run(tx));

        Ok((PumpHandle { cancel, task }, ChunkStream { rx }))
    }

    /// Run the loop until cancellation, consumer detach or a fault.
    ///
    /// Reads happen on tokio's blocking pool; the loop itself only awaits them.
    /// Empty chunks are skipped. A fault ends this stream only and is returned
    /// as [`SignalError::StreamTerminated`].
    pub async fn run(self, tx: mpsc::Sender<SampleChunk>) -> SignalResult<PumpExit> {
        let pause = self.pacing();
        let chunk_size = self.config.chunk_size;
        tracing::debug!(
            mode = %self.source.kind(),
            chunk_size,
            ?pause,
            "stream pump started"
        );

        let mut delivered: u64 = 0;
        let exit = loop {
            let source = Arc::clone(&self.source);
            let read = tokio::task::spawn_blocking(move || source.read_chunk(chunk_size));

            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Ok(PumpExit::Cancelled),
                _ = tx.closed() => break Ok(PumpExit::Detached),
                joined = read => match joined {
                    Ok(chunk) => chunk,
                    Err(e) => break Err(SignalError::StreamTerminated(format!("read task failed: {e}"))),
                },
            };

            if !chunk.is_empty() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break Ok(PumpExit::Cancelled),
                    sent = tx.send(chunk) => {
                        if sent.is_err() {
                            break Ok(PumpExit::Detached);
                        }
                        delivered += 1;
                    }
                }
            }

            if pause.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break Ok(PumpExit::Cancelled),
                    _ = tx.closed() => break Ok(PumpExit::Detached),
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        };

        match &exit {
            Ok(PumpExit::Cancelled) => tracing::info!(delivered, "stream pump cancelled"),
            Ok(PumpExit::Detached) => {
                tracing::info!(delivered, "client disconnected, stopping stream")
            }
            Err(error) => tracing::error!(delivered, %error, "stream pump failed"),
        }
        exit
    }
}

/// Control over a spawned pump.
#[derive(Debug)]
pub struct PumpHandle {
    cancel: CancellationToken,
    task: JoinHandle<SignalResult<PumpExit>>,
}

impl PumpHandle {
    /// Ask the loop to stop. It exits at its next await point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the loop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the loop has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end.
    pub async fn join(self) -> SignalResult<PumpExit> {
        match self.task.await {
            Ok(exit) => exit,
            Err(e) => Err(SignalError::StreamTerminated(format!("pump task failed: {e}"))),
        }
    }
}

/// The consumer side of a pump: an ordered stream of non-empty chunks.
///
/// Ends when the pump stops. Dropping it detaches the consumer.
#[derive(Debug)]
pub struct ChunkStream {
    rx: mpsc::Receiver<SampleChunk>,
}

impl ChunkStream {
    /// Receive the next chunk, or `None` once the pump has stopped.
    pub async fn next_chunk(&mut self) -> Option<SampleChunk> {
        self.rx.recv().await
    }

    /// Detach from the pump; chunks already buffered can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Stream for ChunkStream {
    type Item = SampleChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
