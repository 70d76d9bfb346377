use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Receive images over TCP and print each one to the display sequence.
    Serve(ServeArgs),
    /// Send an image file to a running server.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = pixelport_server::DEFAULT_PORT)]
    pub port: u16,
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    /// Maximum accepted payload size (e.g. 64MiB, 512KiB, 1048576).
    #[arg(long, value_name = "SIZE", default_value = "64MiB")]
    pub max_payload: String,
    /// Close connections idle longer than this (e.g. 30s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub read_timeout: Option<String>,
    /// Exit after displaying N images.
    #[arg(long)]
    pub count: Option<usize>,
    /// Write each received image into this directory as PNG.
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Image file to send.
    pub image: PathBuf,
    /// Server host name or address.
    #[arg(long, default_value = "localhost")]
    pub server: String,
    /// Server port.
    #[arg(long, default_value_t = pixelport_server::DEFAULT_PORT)]
    pub port: u16,
    /// Send the file bytes verbatim, skipping JPEG preprocessing.
    #[arg(long)]
    pub raw: bool,
    /// Byte budget the preprocessed payload must fit (e.g. 10MiB).
    #[arg(long, value_name = "SIZE", default_value = "10MiB")]
    pub max_bytes: String,
    /// Maximum width before downscaling.
    #[arg(long, default_value_t = 3024)]
    pub max_width: u32,
    /// Maximum height before downscaling.
    #[arg(long, default_value_t = 4032)]
    pub max_height: u32,
    /// Connect and response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
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
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

pub fn parse_size(input: &str) -> CliResult<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "size must not be empty"));
    }

    let (number, multiplier) = if let Some(num) = input.strip_suffix("MiB") {
        (num, 1024 * 1024)
    } else if let Some(num) = input.strip_suffix("KiB") {
        (num, 1024)
    } else if let Some(num) = input.strip_suffix("MB") {
        (num, 1_000_000)
    } else if let Some(num) = input.strip_suffix("KB") {
        (num, 1_000)
    } else if let Some(num) = input.strip_suffix('B') {
        (num, 1)
    } else {
        (input, 1)
    };

    let value: usize = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid size value: {input}")))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| CliError::new(USAGE, format!("size overflows: {input}")))
}
