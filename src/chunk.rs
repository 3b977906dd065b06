//! Sample chunks handed to consumers.

use std::ops::Deref;

/// An ordered batch of 8-bit samples produced by one read.
///
/// Chunks are either empty (no data this round) or carry the samples of a
/// single read. They are immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleChunk {
    samples: Box<[u8]>,
}

impl SampleChunk {
    /// The "no data" chunk.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of samples in the chunk.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the read produced no data.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the samples.
    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }

    /// Take ownership of the samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.samples.into_vec()
    }
}

impl From<Vec<u8>> for SampleChunk {
    fn from(samples: Vec<u8>) -> Self {
        Self {
            samples: samples.into_boxed_slice(),
        }
    }
}

impl From<&[u8]> for SampleChunk {
    fn from(samples: &[u8]) -> Self {
        Self {
            samples: samples.into(),
        }
    }
}

impl Deref for SampleChunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.samples
    }
}

impl AsRef<[u8]> for SampleChunk {
    fn as_ref(&self) -> &[u8] {
        &self.samples
    }
}
