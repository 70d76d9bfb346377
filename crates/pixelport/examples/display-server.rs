//! Minimal display consumer — receives images and prints each one.
//!
//! Run with:
//!   cargo run --example display-server
//!
//! In another terminal:
//!   cargo run --features cli -- send photo.jpg --server 127.0.0.1

use std::net::SocketAddr;
use std::thread;

use pixelport::server::{ImageListener, ImageSink, DEFAULT_PORT};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = ([127, 0, 0, 1], DEFAULT_PORT).into();
    let listener = ImageListener::bind(addr)?;
    eprintln!("Listening on {}", listener.local_addr());

    let (sink, images) = ImageSink::channel();
    thread::spawn(move || {
        let _ = listener.run(sink);
    });

    for (seq, received) in images.into_iter().enumerate() {
        eprintln!(
            "image #{} from {}: {}x{}",
            seq + 1,
            received.peer,
            received.image.width(),
            received.image.height()
        );
    }

    Ok(())
}
