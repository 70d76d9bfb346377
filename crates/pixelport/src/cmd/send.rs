use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GenericImageView, RgbImage};
use pixelport_frame::encode_frame;

use crate::cmd::{parse_duration, parse_size, SendArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS, TIMEOUT};
use crate::output::{print_send_report, OutputFormat, SendReport};

/// Lowest JPEG quality the preprocessor will fall back to.
const MIN_JPEG_QUALITY: u8 = 30;
const INITIAL_JPEG_QUALITY: u8 = 95;
const QUALITY_STEP: u8 = 5;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let payload = if args.raw {
        fs::read(&args.image).map_err(|err| {
            io_error(&format!("failed reading {}", args.image.display()), err)
        })?
    } else {
        preprocess(
            &args.image,
            args.max_width,
            args.max_height,
            parse_size(&args.max_bytes)?,
        )?
    };

    let mut wire = BytesMut::new();
    encode_frame(&payload, &mut wire).map_err(|err| frame_error("encode failed", err))?;

    let mut stream = connect(&args.server, args.port, timeout)?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|err| io_error("failed applying timeout", err))?;
    stream
        .write_all(&wire)
        .map_err(|err| io_error("send failed", err))?;

    let status = read_status_line(&mut stream)?;
    print_send_report(
        &SendReport {
            image: &args.image.display().to_string(),
            bytes: payload.len(),
            status: &status,
        },
        format,
    );

    if status.starts_with("HTTP/1.1 200") {
        Ok(SUCCESS)
    } else {
        Err(CliError::new(
            FAILURE,
            format!("server rejected image: {status}"),
        ))
    }
}

/// Re-encode the image the way the display expects it: RGB JPEG,
/// downscaled to fit the dimension bounds, quality stepped down until
/// the payload fits the byte budget (or the quality floor is hit).
fn preprocess(path: &Path, max_width: u32, max_height: u32, max_bytes: usize) -> CliResult<Vec<u8>> {
    let opened = image::open(path).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("failed decoding {}: {err}", path.display()),
        )
    })?;

    let (width, height) = (opened.width(), opened.height());
    let bounded = if width > max_width || height > max_height {
        let resized = opened.resize(max_width, max_height, FilterType::Lanczos3);
        tracing::info!(
            from = format!("{width}x{height}"),
            to = format!("{}x{}", resized.width(), resized.height()),
            "downscaled image to fit dimension bounds"
        );
        resized
    } else {
        opened
    };

    // JPEG carries no alpha; flatten to RGB before encoding.
    let rgb: RgbImage = bounded.to_rgb8();

    let mut quality = INITIAL_JPEG_QUALITY;
    loop {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&rgb)
            .map_err(|err| {
                CliError::new(crate::exit::INTERNAL, format!("jpeg encoding failed: {err}"))
            })?;

        if out.len() <= max_bytes {
            tracing::debug!(bytes = out.len(), quality, "preprocessed image");
            return Ok(out);
        }
        if quality <= MIN_JPEG_QUALITY {
            tracing::warn!(
                bytes = out.len(),
                max_bytes,
                "payload still over budget at minimum quality; sending anyway"
            );
            return Ok(out);
        }
        quality -= QUALITY_STEP;
        tracing::debug!(bytes = out.len(), quality, "payload over budget; lowering quality");
    }
}

fn connect(host: &str, port: u16, timeout: Duration) -> CliResult<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|err| io_error(&format!("failed resolving {host}"), err))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    let err = last_err.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::NotFound, format!("{host} resolved to no addresses"))
    });
    Err(io_error(&format!("failed connecting to {host}:{port}"), err))
}

/// Read the server's acknowledgement status line.
fn read_status_line(stream: &mut TcpStream) -> CliResult<String> {
    let mut collected = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let read = match stream.read(&mut byte) {
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(CliError::new(TIMEOUT, "timed out waiting for server response"));
            }
            Err(err) => return Err(io_error("failed reading response", err)),
        };
        if read == 0 {
            return Err(CliError::new(
                FAILURE,
                "connection closed before a response arrived",
            ));
        }
        if byte[0] == b'\n' {
            break;
        }
        collected.push(byte[0]);
    }
    if collected.last() == Some(&b'\r') {
        collected.pop();
    }
    String::from_utf8(collected)
        .map_err(|_| CliError::new(FAILURE, "server response was not valid UTF-8"))
}
