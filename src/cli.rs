//! Command line interface for the `rf24-transport` simulation binary.
//!
//! The binary runs two nodes over an in-memory radio medium so fragmentation,
//! reassembly and timeout eviction can be observed without hardware. This
//! module is also compiled by `build.rs` to render the man page, so it only
//! depends on `clap`.

use std::num::NonZeroUsize;

use clap::Parser;

/// Parse a node address written in octal, with or without a `0o` prefix.
///
/// # Errors
///
/// Returns a message when `value` is not a valid 16-bit octal number.
pub fn parse_octal_address(value: &str) -> Result<u16, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u16::from_str_radix(digits, 8).map_err(|err| format!("invalid octal address {value:?}: {err}"))
}

/// Command line arguments for the `rf24-transport` binary.
#[derive(Debug, Parser)]
#[command(
    name = "rf24-transport",
    version,
    about = "Simulate fragmented message delivery between two RF24 nodes"
)]
pub struct Cli {
    /// Number of messages the sender transmits.
    #[arg(short, long, default_value_t = 4)]
    pub messages: u32,

    /// Size of each message payload in bytes.
    #[arg(short, long, default_value_t = 73)]
    pub payload_size: usize,

    /// Refuse every N-th packet on the simulated link.
    #[arg(long)]
    pub nack_every: Option<NonZeroUsize>,

    /// Times the sender retries a message whose send was aborted.
    #[arg(long, default_value_t = 0)]
    pub retries: u8,

    /// Age in milliseconds after which incomplete messages are evicted.
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Simulated milliseconds between messages.
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,

    /// Octal address of the sending node.
    #[arg(long, default_value = "1", value_parser = parse_octal_address)]
    pub sender: u16,

    /// Octal address of the receiving node.
    #[arg(long, default_value = "0", value_parser = parse_octal_address)]
    pub receiver: u16,
}
