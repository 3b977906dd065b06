//! Tests for the stream pump.
//!
//! Fixtures build simulation-backed sources from files in a temporary directory,
//! or device-backed sources over plain files and FIFOs.

use crate::{SignalSource, SourceConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod pump_tests;

/// Bytes `0, 1, ..., len - 1` (wrapping at 256).
pub(crate) fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

/// A simulated source whose channel files hold `sig1` and `sig2`.
pub(crate) fn simulated_source(
    dir: &Path,
    sig1: &[u8],
    sig2: &[u8],
    read_delay: Duration,
) -> Arc<SignalSource> {
    std::fs::write(dir.join("sig1.bin"), sig1).expect("write sig1.bin");
    std::fs::write(dir.join("sig2.bin"), sig2).expect("write sig2.bin");
    let config = SourceConfig {
        simulated_read_delay: read_delay,
        ..SourceConfig::simulation_in(dir)
    };
    Arc::new(SignalSource::simulated(&config))
}
