//! Stream signal chunks from the device (or its simulation) to stdout.
//!
//! Each chunk is printed as one `data: [..]` line, the framing the viewer's
//! event stream uses.

use clap::Parser;
use signal_source::logging::{LogFormat, LogLevel, init_logging};
use signal_source::{PumpConfig, SignalError, SignalSource, SourceConfig, StreamPump};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "signal-source")]
#[command(author, version, about = "Stream 8-bit signal samples from /dev/signal_reader or its simulation")]
struct Cli {
    /// Device node to probe
    #[arg(long, env = "SIGNAL_DEVICE_PATH")]
    device: Option<PathBuf>,

    /// Directory holding sig1.bin / sig2.bin for simulation mode
    #[arg(long, env = "SIGNAL_SIM_DIR")]
    sim_dir: Option<PathBuf>,

    /// Skip the device probe and simulate
    #[arg(long)]
    force_simulation: bool,

    /// Channel to select before streaming (0 or 1)
    #[arg(short, long, default_value_t = 0)]
    channel: i64,

    /// Stop after this many chunks (runs until Ctrl-C otherwise)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    chunks: Option<u64>,

    /// Samples per chunk
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Drop device reads shorter than the chunk size instead of printing them
    #[arg(long)]
    drop_short_reads: bool,

    /// Log level (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Cli {
    fn source_config(&self) -> SourceConfig {
        let mut config = SourceConfig::default();
        if let Some(device) = &self.device {
            config.device_path = device.clone();
        }
        if let Some(dir) = &self.sim_dir {
            config.simulation_dir = dir.clone();
        }
        config.deliver_short_reads = !self.drop_short_reads;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), SignalError> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    let config = cli.source_config();
    config.validate()?;

    let source = Arc::new(if cli.force_simulation {
        SignalSource::simulated(&config)
    } else {
        SignalSource::open(&config)
    });
    tracing::info!(mode = %source.kind(), "signal source ready");

    if let Err(error) = source.select_channel(cli.channel) {
        if error.is_user_visible() {
            source.close();
            return Err(error);
        }
        tracing::warn!(%error, "continuing on the previous channel");
    }

    let pump_config = PumpConfig {
        chunk_size: cli.chunk_size,
        ..PumpConfig::default()
    };
    let (handle, mut stream) = StreamPump::new(Arc::clone(&source), pump_config).spawn()?;

    let ctrl_c_token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            ctrl_c_token.cancel();
        }
    });

    let mut printed: u64 = 0;
    let mut stdout = std::io::stdout().lock();
    while let Some(chunk) = stream.next_chunk().await {
        writeln!(stdout, "data: {:?}", chunk.as_slice())?;
        printed += 1;
        if cli.chunks.is_some_and(|limit| printed >= limit) {
            break;
        }
    }
    drop(stdout);

    handle.stop();
    let exit = handle.join().await;
    source.close();
    tracing::info!(printed, ?exit, "stream finished");
    exit.map(|_| ())
}
