mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use i2c_oneshot::Stop;
use tracing_subscriber::EnvFilter;

use crate::cli::{hex_line, Cli, Commands};

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Outermost context only. The library has already logged the cause.
fn summary(err: &anyhow::Error) -> String {
    err.to_string()
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Write { bus, addr, data } => {
            let n = i2c_oneshot::write(&bus, addr, &data).with_context(|| {
                format!("write to 0x{addr:02X} on {}", bus.display())
            })?;
            if n < data.len() {
                tracing::warn!(
                    requested = data.len(),
                    wrote = n,
                    "short write"
                );
            }
            println!("wrote {n} byte(s)");
        }
        Commands::Read { bus, addr, len } => {
            let mut buf = vec![0u8; len];
            let n = i2c_oneshot::read(&bus, addr, &mut buf).with_context(|| {
                format!("read from 0x{addr:02X} on {}", bus.display())
            })?;
            println!("{}", hex_line(&buf[..n]));
        }
        Commands::WriteRead { bus, addr, data, len, no_stop } => {
            let stop = if no_stop { Stop::RepeatedStart } else { Stop::Between };
            let mut buf = vec![0u8; len];
            let n = i2c_oneshot::write_read(&bus, addr, &data, &mut buf, stop)
                .with_context(|| {
                    format!("write-read with 0x{addr:02X} on {}", bus.display())
                })?;
            println!("{}", hex_line(&buf[..n]));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{} failed", summary(&err));
            ExitCode::FAILURE
        }
    }
}
