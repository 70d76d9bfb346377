use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use image::ImageFormat;
use pixelport_frame::FrameConfig;
use pixelport_server::{ImageListener, ImageSink, ReceivedImage, ServerConfig};

use crate::cmd::{parse_duration, parse_size, ServeArgs};
use crate::exit::{server_error, CliError, CliResult, SUCCESS};
use crate::output::{print_received, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = ServerConfig {
        frame: FrameConfig {
            max_payload_size: parse_size(&args.max_payload)?,
        },
        read_timeout: args
            .read_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?,
    };

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = ImageListener::bind(addr)
        .map_err(|err| server_error("bind failed", err))?
        .with_config(config);

    let (sink, images) = ImageSink::channel();
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    thread::spawn(move || {
        if let Err(err) = listener.run(sink) {
            tracing::error!(error = %err, "accept loop failed");
        }
    });

    // The display sequence: one consumer appends images in delivery
    // order, with no synchronization against the connection threads
    // beyond the channel itself.
    let mut displayed = 0usize;
    while running.load(Ordering::SeqCst) {
        let received = match images.recv_timeout(Duration::from_millis(200)) {
            Ok(received) => received,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        displayed += 1;
        print_received(displayed, &received, format);

        if let Some(dir) = &args.save_dir {
            match save_image(dir, displayed, &received) {
                Ok(path) => tracing::debug!(path = %path.display(), "saved image"),
                Err(err) => tracing::warn!(error = %err, "failed saving image"),
            }
        }

        if let Some(count) = args.count {
            if displayed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn save_image(
    dir: &Path,
    seq: usize,
    received: &ReceivedImage,
) -> Result<PathBuf, image::ImageError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("image-{seq:05}.png"));
    received
        .image
        .bitmap()
        .save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
