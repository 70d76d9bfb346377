mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pixelport", version, about = "TCP image display server")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "pixelport",
            "serve",
            "--port",
            "9000",
            "--max-payload",
            "16MiB",
            "--count",
            "3",
        ])
        .expect("serve args should parse");

        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "pixelport",
            "send",
            "/tmp/photo.jpg",
            "--server",
            "10.0.0.5",
            "--raw",
        ])
        .expect("send args should parse");

        let args = match cli.command {
            Command::Send(args) => args,
            other => panic!("expected send command, got {other:?}"),
        };
        assert!(args.raw);
        assert_eq!(args.server, "10.0.0.5");
        assert_eq!(args.port, 8080);
    }

    #[test]
    fn rejects_invalid_bind_address() {
        let err = Cli::try_parse_from(["pixelport", "serve", "--bind", "not-an-ip"])
            .expect_err("invalid bind address should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
