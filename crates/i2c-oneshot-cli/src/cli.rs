use std::path::PathBuf;

use clap::{Parser, Subcommand};
use i2c_oneshot::{bus_path, Address};

#[derive(Parser)]
#[command(author, version, about = "One-shot transactions on Linux I2C buses")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write bytes to a device
    Write {
        /// Bus index (1) or device node (/dev/i2c-1)
        #[arg(value_parser = parse_bus)]
        bus: PathBuf,

        /// 7-bit device address, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_address)]
        addr: u8,

        /// Bytes to write, as hex (0x1f or 1f)
        #[arg(required = true, value_parser = parse_byte)]
        data: Vec<u8>,
    },
    /// Read bytes from a device
    Read {
        #[arg(value_parser = parse_bus)]
        bus: PathBuf,

        #[arg(value_parser = parse_address)]
        addr: u8,

        /// Number of bytes to read
        #[arg(short, long, default_value_t = 1)]
        len: usize,
    },
    /// Write bytes, then read from the same device
    WriteRead {
        #[arg(value_parser = parse_bus)]
        bus: PathBuf,

        #[arg(value_parser = parse_address)]
        addr: u8,

        #[arg(required = true, value_parser = parse_byte)]
        data: Vec<u8>,

        #[arg(short, long, default_value_t = 1)]
        len: usize,

        /// Use a repeated START instead of a STOP between the phases
        #[arg(long)]
        no_stop: bool,
    },
}

pub fn parse_bus(s: &str) -> Result<PathBuf, String> {
    match s.parse::<u32>() {
        Ok(n) => Ok(bus_path(n)),
        Err(_) if !s.is_empty() => Ok(PathBuf::from(s)),
        Err(_) => Err("bus must not be empty".to_string()),
    }
}

pub fn parse_address(s: &str) -> Result<u8, String> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    }
    .map_err(|e| format!("invalid address '{s}': {e}"))?;
    Address::new(value)
        .map(Address::get)
        .map_err(|v| format!("address 0x{v:02X} exceeds 7 bits"))
}

pub fn parse_byte(s: &str) -> Result<u8, String> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u8::from_str_radix(hex, 16).map_err(|e| format!("invalid byte '{s}': {e}"))
}

/// Space-separated `0x..` bytes.
pub fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
