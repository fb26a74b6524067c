use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use simplemac_frame::Address;
use simplemac_link::{ElementKind, MacConfig};

use crate::exit::{mac_error, CliError, CliResult};
use crate::output::OutputFormat;

#[cfg(unix)]
pub mod listen;
pub mod loopback;
#[cfg(unix)]
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run packets through TX, an in-memory loopback, and RX on one node.
    Loopback(LoopbackArgs),
    /// Send one packet to a listening node over a Unix datagram socket.
    #[cfg(unix)]
    Send(SendArgs),
    /// Bind a Unix datagram socket and print packets accepted by this node.
    #[cfg(unix)]
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: MacConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Loopback(args) => loopback::run(args, config, format),
        #[cfg(unix)]
        Command::Send(args) => send::run(args, config, format),
        #[cfg(unix)]
        Command::Listen(args) => listen::run(args, config, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct LoopbackArgs {
    /// This node's address (decimal, 0x-hex, or "broadcast"). Overrides --config.
    #[arg(long, short = 'a')]
    pub address: Option<Address>,
    /// Recipient tag for every packet. Default: untagged (broadcast).
    #[arg(long, short = 'r')]
    pub recipient: Option<Address>,
    /// Text payload. Default: a generated byte pattern of --size bytes.
    #[arg(long, conflicts_with = "size")]
    pub data: Option<String>,
    /// Generated payload size in bytes.
    #[arg(long, default_value = "100")]
    pub size: usize,
    /// Number of packets to send.
    #[arg(long, default_value = "1")]
    pub count: usize,
    /// Element type of the payload (uint8, int16, float32, ...). Both ends of
    /// the loopback read payloads as this type.
    #[arg(long, value_name = "TYPE")]
    pub dtype: Option<ElementKind>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path of the receiving node.
    pub path: PathBuf,
    /// This node's address, stamped as sender. Overrides --config.
    #[arg(long, short = 'a')]
    pub address: Option<Address>,
    /// Recipient tag. Default: untagged (broadcast).
    #[arg(long, short = 'r')]
    pub recipient: Option<Address>,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// This node's address. Overrides --config.
    #[arg(long, short = 'a')]
    pub address: Option<Address>,
    /// Exit after N accepted packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit after this long without any frame (e.g. 5s, 500ms). Default: wait forever.
    #[arg(long)]
    pub idle_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Load `--config` if given, else defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<MacConfig> {
    match path {
        Some(path) => MacConfig::from_path(path).map_err(|err| mac_error("config failed", err)),
        None => Ok(MacConfig::default()),
    }
}

/// The node address: command-line flag first, then config file.
pub fn resolve_address(flag: Option<Address>, config: &MacConfig) -> CliResult<Address> {
    flag.or(config.address).ok_or_else(|| {
        CliError::usage("no node address configured (pass --address or set \"address\" in --config)")
    })
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn flag_address_wins_over_config() {
        let config = MacConfig {
            address: Some(Address::new(1)),
            ..MacConfig::default()
        };
        assert_eq!(
            resolve_address(Some(Address::new(2)), &config).unwrap(),
            Address::new(2)
        );
        assert_eq!(resolve_address(None, &config).unwrap(), Address::new(1));

        let err = resolve_address(None, &MacConfig::default()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
