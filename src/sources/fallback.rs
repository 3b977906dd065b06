//! Ordered fallback chain for simulation sample data.
//!
//! Each step either yields samples or passes to the next one. The chain ends
//! in a synthesized sine period, so resolving it never produces an empty buffer.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Number of samples in the synthesized fallback period.
pub const SINE_FALLBACK_LEN: usize = 256;

/// Outcome of a single fallback step.
#[derive(Debug)]
pub enum Attempt {
    /// The step produced usable samples.
    Data(Vec<u8>),
    /// The step produced nothing; try the next one.
    Next(String),
}

/// A way of obtaining simulation samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackStep {
    /// Raw bytes of a file, used only if the file exists and is non-empty.
    File(PathBuf),
}

impl FallbackStep {
    /// Run this step.
    pub fn attempt(&self) -> Attempt {
        match self {
            Self::File(path) => read_samples_file(path),
        }
    }
}

fn read_samples_file(path: &Path) -> Attempt {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Attempt::Next(format!("{} is empty", path.display())),
        Ok(bytes) => Attempt::Data(bytes),
        Err(e) => Attempt::Next(format!("cannot read {}: {e}", path.display())),
    }
}

/// An ordered list of fallback steps terminated by the sine default.
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    steps: Vec<FallbackStep>,
}

/// Samples resolved from a chain, with where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Non-empty sample data
    pub samples: Vec<u8>,
    /// Step that produced the data, `None` for the synthesized default
    pub step: Option<FallbackStep>,
}

impl FallbackChain {
    /// An empty chain (resolves straight to the sine default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn then(mut self, step: FallbackStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Evaluate the steps in order; the first one yielding data wins.
    pub fn resolve(&self) -> Resolved {
        for step in &self.steps {
            match step.attempt() {
                Attempt::Data(samples) => {
                    return Resolved {
                        samples,
                        step: Some(step.clone()),
                    };
                }
                Attempt::Next(reason) => {
                    tracing::warn!(%reason, "simulation data unavailable, trying next source");
                }
            }
        }

        tracing::warn!(
            samples = SINE_FALLBACK_LEN,
            "no simulation file usable, using default sine wave"
        );
        Resolved {
            samples: sine_fallback(),
            step: None,
        }
    }
}

/// One period of a full-scale 8-bit sine: `round(127.5 + 127.5 * sin(2*pi*i/256))`.
pub fn sine_fallback() -> Vec<u8> {
    (0..SINE_FALLBACK_LEN)
        .map(|i| {
            let phase = 2.0 * PI * i as f64 / SINE_FALLBACK_LEN as f64;
            (127.5 + 127.5 * phase.sin()).round().clamp(0.0, 255.0) as u8
        })
        .collect()
}
