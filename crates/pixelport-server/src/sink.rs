use std::net::SocketAddr;
use std::sync::mpsc;

use pixelport_decode::DecodedImage;
use tracing::warn;

/// A decoded image together with where it came from.
#[derive(Debug)]
pub struct ReceivedImage {
    /// The decoded bitmap, ownership transferred to the consumer.
    pub image: DecodedImage,
    /// Peer address of the connection that sent it.
    pub peer: SocketAddr,
}

/// Handle for publishing decoded images to the display consumer.
///
/// One handle is cloned into each connection thread; a single consumer
/// drains the paired receiver, which serializes the display append
/// across connections without any shared state. Publishing is
/// fire-and-forget — the receive loop never waits on the consumer.
#[derive(Debug, Clone)]
pub struct ImageSink {
    tx: mpsc::Sender<ReceivedImage>,
}

impl ImageSink {
    /// Create a sink and the receiver the display layer consumes.
    pub fn channel() -> (Self, mpsc::Receiver<ReceivedImage>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Publish one decoded image. Delivery is best-effort: if the
    /// consumer is gone the image is dropped with a warning.
    pub fn publish(&self, received: ReceivedImage) {
        if self.tx.send(received).is_err() {
            warn!("image sink consumer is gone; dropping decoded image");
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;

    fn test_image() -> ReceivedImage {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(2, 2))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        ReceivedImage {
            image: pixelport_decode::decode(&bytes.into_inner()).unwrap(),
            peer: "127.0.0.1:9".parse().unwrap(),
        }
    }

    #[test]
    fn publish_reaches_consumer() {
        let (sink, rx) = ImageSink::channel();
        sink.publish(test_image());

        let received = rx.recv().unwrap();
        assert_eq!(received.image.width(), 2);
    }

    #[test]
    fn publish_after_consumer_dropped_does_not_panic() {
        let (sink, rx) = ImageSink::channel();
        drop(rx);
        sink.publish(test_image());
    }

    #[test]
    fn clones_feed_the_same_consumer() {
        let (sink, rx) = ImageSink::channel();
        let other = sink.clone();

        sink.publish(test_image());
        other.publish(test_image());

        assert!(rx.recv().is_ok());
        assert!(rx.recv().is_ok());
    }
}
