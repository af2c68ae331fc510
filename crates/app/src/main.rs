//! huffcode: compress files with Huffman codes whose tree is stored as text.
//!
//! `compress` writes two files: `<stem>.code`, the tree as symbol/code line
//! pairs, and `<stem>.short`, the packed bits in a small checked container.
//! `decompress` reads both back and rebuilds the original bytes.

mod commands;
mod config;
mod container;
mod encoder;
mod error;
mod input_gen;
mod metrics;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use config::{Cli, Config, Task};
use error::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match Config::from_cli(cli).and_then(|config| run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    if config.print_config {
        config.print();
    }

    let metrics = match &config.task {
        Task::Compress { input, out_dir } => commands::compress(input, out_dir)?,
        Task::Decompress {
            code_file,
            short_file,
            output_file,
        } => commands::decompress(code_file, short_file, output_file)?,
        Task::Codes { input_file } => return commands::print_codes(input_file),
    };

    debug!(metrics = %metrics.export_text(), "run metrics");
    if config.print_metrics {
        metrics.print_summary();
    }
    metrics.print_result();
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the `-v` count.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}
