use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use image::ImageFormat;
use pixelport_server::ReceivedImage;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ImageRecord<'a> {
    seq: usize,
    peer: String,
    width: u32,
    height: u32,
    format: &'a str,
    timestamp: String,
}

/// Append one decoded image to the display sequence on stdout.
pub fn print_received(seq: usize, received: &ReceivedImage, format: OutputFormat) {
    let format_name = format_name(received.image.format());
    match format {
        OutputFormat::Json => {
            let record = ImageRecord {
                seq,
                peer: received.peer.to_string(),
                width: received.image.width(),
                height: received.image.height(),
                format: format_name,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "PEER", "SIZE", "FORMAT"])
                .add_row(vec![
                    seq.to_string(),
                    received.peer.to_string(),
                    format!("{}x{}", received.image.width(), received.image.height()),
                    format_name.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "image #{seq} from {}: {}x{} {}",
                received.peer,
                received.image.width(),
                received.image.height(),
                format_name
            );
        }
    }
}

#[derive(Serialize)]
pub struct SendReport<'a> {
    pub image: &'a str,
    pub bytes: usize,
    pub status: &'a str,
}

/// Report the outcome of a transmit on stdout.
pub fn print_send_report(report: &SendReport<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["IMAGE", "BYTES", "STATUS"])
                .add_row(vec![
                    report.image.to_string(),
                    report.bytes.to_string(),
                    report.status.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sent {} ({} bytes): {}",
                report.image, report.bytes, report.status
            );
        }
    }
}

pub fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("unknown")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
