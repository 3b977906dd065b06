//! Tests for pump delivery, pacing and termination.

use super::*;
use crate::config::PumpConfig;
use crate::error::SignalError;
use crate::streaming::pump::*;
use futures::StreamExt;
use tokio::time::{Instant, timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pump_delivers_whole_buffer_then_wraps() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(256), &[0; 4], Duration::ZERO);

    let (handle, stream) = StreamPump::new(source, PumpConfig::unpaced()).spawn().unwrap();
    let chunks: Vec<_> = timeout(Duration::from_secs(5), stream.take(17).collect())
        .await
        .expect("pump stalled");

    let mut seen = Vec::new();
    for chunk in &chunks[..16] {
        assert_eq!(chunk.len(), 16);
        seen.extend_from_slice(chunk);
    }
    assert_eq!(seen, ramp(256));
    assert_eq!(chunks[16].as_slice(), &ramp(16)[..]);

    handle.stop();
    let exit = timeout(Duration::from_secs(1), handle.join()).await.unwrap();
    assert!(matches!(exit, Ok(PumpExit::Cancelled) | Ok(PumpExit::Detached)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_during_pacing_stops_emission() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(64), &ramp(64), Duration::ZERO);
    let config = PumpConfig {
        channel_capacity: 1,
        ..PumpConfig::default()
    };

    let (handle, mut stream) = StreamPump::new(source, config).spawn().unwrap();
    let first = timeout(Duration::from_secs(1), stream.next_chunk())
        .await
        .unwrap()
        .expect("first chunk");
    assert_eq!(first.as_slice(), &ramp(16)[..]);

    let cancelled_at = Instant::now();
    handle.stop();
    let exit = timeout(Duration::from_millis(150), handle.join())
        .await
        .expect("pump did not stop within one pacing interval");
    assert_eq!(exit.unwrap(), PumpExit::Cancelled);
    assert!(cancelled_at.elapsed() < Duration::from_millis(150));

    assert!(stream.next_chunk().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_during_blocking_read_does_not_wait_for_it() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(
        dir.path(),
        &ramp(64),
        &ramp(64),
        Duration::from_millis(400),
    );

    let (handle, mut stream) = StreamPump::new(source, PumpConfig::default()).spawn().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    handle.stop();
    let exit = timeout(Duration::from_millis(150), handle.join())
        .await
        .expect("pump waited for the in-flight read");
    assert_eq!(exit.unwrap(), PumpExit::Cancelled);
    assert!(stream.next_chunk().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropping_stream_detaches_pump() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(64), &ramp(64), Duration::ZERO);

    let (handle, stream) = StreamPump::new(Arc::clone(&source), PumpConfig::default())
        .spawn()
        .unwrap();
    drop(stream);

    let exit = timeout(Duration::from_secs(1), handle.join()).await.unwrap();
    assert_eq!(exit.unwrap(), PumpExit::Detached);

    // The shared source is unaffected.
    assert_eq!(source.read_chunk(16).len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parent_token_cancels_every_pump() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(64), &ramp(64), Duration::ZERO);
    let shutdown = tokio_util::sync::CancellationToken::new();

    let mut pumps = Vec::new();
    for _ in 0..3 {
        let pump = StreamPump::new(Arc::clone(&source), PumpConfig::default())
            .with_cancellation(shutdown.child_token());
        pumps.push(pump.spawn().unwrap());
    }

    shutdown.cancel();
    for (handle, _stream) in pumps {
        let exit = timeout(Duration::from_millis(500), handle.join()).await.unwrap();
        assert_eq!(exit.unwrap(), PumpExit::Cancelled);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_channel_switch_mid_stream_never_mixes_buffers() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(64), &[200; 32], Duration::ZERO);
    let config = PumpConfig {
        channel_capacity: 1,
        ..PumpConfig::unpaced()
    };

    let (handle, mut stream) = StreamPump::new(Arc::clone(&source), config).spawn().unwrap();
    for _ in 0..3 {
        let chunk = stream.next_chunk().await.unwrap();
        assert!(chunk.iter().all(|&b| b < 64));
    }

    let switcher = Arc::clone(&source);
    tokio::task::spawn_blocking(move || switcher.select_channel(1))
        .await
        .unwrap()
        .unwrap();

    let mut switched = false;
    for _ in 0..20 {
        let chunk = timeout(Duration::from_secs(1), stream.next_chunk())
            .await
            .unwrap()
            .unwrap();
        let old = chunk.windows(2).all(|w| w[1] == (w[0] + 1) % 64);
        let new = chunk.iter().all(|&b| b == 200);
        assert!(old || new, "chunk mixes both channels: {chunk:?}");
        if new {
            switched = true;
        } else {
            assert!(!switched, "old channel data after the switch took effect");
        }
    }
    assert!(switched);

    handle.stop();
    timeout(Duration::from_secs(1), handle.join())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(8), &ramp(8), Duration::ZERO);
    let config = PumpConfig {
        chunk_size: 0,
        ..PumpConfig::default()
    };

    assert!(matches!(
        StreamPump::new(source, config).spawn(),
        Err(SignalError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_pacing_follows_backend() {
    let dir = tempfile::tempdir().unwrap();
    let source = simulated_source(dir.path(), &ramp(8), &ramp(8), Duration::ZERO);
    let pump = StreamPump::new(source, PumpConfig::default());
    assert_eq!(pump.pacing(), Duration::from_millis(100));
}

#[cfg(unix)]
mod device {
    use super::*;
    use crate::sources::DeviceSource;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_device_pump_skips_empty_reads_and_survives_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal_reader");
        std::fs::write(&path, ramp(40)).unwrap();

        let source = Arc::new(SignalSource::from_device(DeviceSource::open(&path).unwrap()));
        let config = PumpConfig {
            device_poll_interval: Duration::from_millis(1),
            ..PumpConfig::default()
        };
        let pump = StreamPump::new(Arc::clone(&source), config);
        assert_eq!(pump.pacing(), Duration::from_millis(1));

        let (handle, mut stream) = pump.spawn().unwrap();
        assert_eq!(stream.next_chunk().await.unwrap().as_slice(), &ramp(16)[..]);
        assert_eq!(stream.next_chunk().await.unwrap().as_slice(), &ramp(32)[16..]);

        // The 8-byte tail is a short read and everything after is empty.
        assert!(
            timeout(Duration::from_millis(50), stream.next_chunk())
                .await
                .is_err()
        );

        source.close();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        handle.stop();
        let exit = timeout(Duration::from_millis(200), handle.join()).await.unwrap();
        assert_eq!(exit.unwrap(), PumpExit::Cancelled);
    }
}
