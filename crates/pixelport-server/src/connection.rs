use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};

use bytes::Bytes;
use pixelport_frame::{FrameAssembler, FrameConfig};
use tracing::{debug, trace, warn};

use crate::error::ConnectionError;
use crate::response::Ack;
use crate::sink::{ImageSink, ReceivedImage};

/// Maximum bytes read from the socket per call.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Owns one accepted connection for its whole lifetime.
///
/// Drives the receive loop: reads chunks, feeds the frame assembler,
/// decodes each completed payload, writes the acknowledgement, and
/// publishes decoded images to the sink. Framing state is exclusively
/// owned here — nothing is shared across connections.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    assembler: FrameAssembler,
    sink: ImageSink,
}

impl ConnectionHandler {
    /// Wrap an accepted stream with fresh framing state.
    pub fn new(stream: TcpStream, peer: SocketAddr, config: FrameConfig, sink: ImageSink) -> Self {
        Self {
            stream,
            peer,
            assembler: FrameAssembler::with_config(config),
            sink,
        }
    }

    /// Run the receive loop until the peer closes or the connection
    /// fails.
    ///
    /// Clean EOF returns `Ok(())` even mid-frame: the partial frame is
    /// discarded and never reaches the decoder. Read errors and
    /// unsynchronizable framing errors close the connection with an
    /// error; neither affects any other connection.
    pub fn run(mut self) -> Result<(), ConnectionError> {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.stream.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    debug!(peer = %self.peer, "read timed out; closing idle connection");
                    return Ok(());
                }
                Err(err) => return Err(ConnectionError::Read(err)),
            };

            if read == 0 {
                if !self.assembler.is_idle() {
                    debug!(
                        peer = %self.peer,
                        buffered = self.assembler.buffered_len(),
                        phase = ?self.assembler.phase(),
                        "peer closed mid-frame; discarding partial state"
                    );
                }
                return Ok(());
            }

            trace!(peer = %self.peer, bytes = read, "received chunk");
            self.assembler.extend_from_slice(&chunk[..read]);

            // Drain every frame completed by this chunk; leftover bytes
            // of the next frame stay buffered in the assembler.
            while let Some(payload) = self.assembler.advance()? {
                self.handle_frame(payload);
            }
        }
    }

    fn handle_frame(&mut self, payload: Bytes) {
        match pixelport_decode::decode(&payload) {
            Ok(image) => {
                debug!(
                    peer = %self.peer,
                    width = image.width(),
                    height = image.height(),
                    format = ?image.format(),
                    "decoded image"
                );
                self.acknowledge(Ack::Ok);
                self.sink.publish(ReceivedImage {
                    image,
                    peer: self.peer,
                });
            }
            Err(err) => {
                debug!(
                    peer = %self.peer,
                    size = payload.len(),
                    error = %err,
                    "payload failed to decode"
                );
                self.acknowledge(Ack::BadRequest);
            }
        }
    }

    // Best-effort: a peer that stopped reading must not take the
    // receive loop down with it.
    fn acknowledge(&mut self, ack: Ack) {
        let result = self
            .stream
            .write_all(ack.as_bytes())
            .and_then(|()| self.stream.flush());
        if let Err(err) = result {
            warn!(
                peer = %self.peer,
                status = ack.status_line(),
                error = %err,
                "failed writing acknowledgement"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Shutdown, TcpListener};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use bytes::BytesMut;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use pixelport_frame::{encode_frame, FrameError};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn spawn_handler(
        config: FrameConfig,
    ) -> (
        TcpStream,
        mpsc::Receiver<ReceivedImage>,
        thread::JoinHandle<Result<(), ConnectionError>>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, peer) = listener.accept().unwrap();
        let (sink, rx) = ImageSink::channel();
        let handle =
            thread::spawn(move || ConnectionHandler::new(stream, peer, config, sink).run());
        (client, rx, handle)
    }

    fn read_ack(client: &mut TcpStream) -> String {
        let mut collected = Vec::new();
        let mut byte = [0u8; 1];
        while !collected.ends_with(b"\r\n\r\n") {
            let n = client.read(&mut byte).unwrap();
            assert!(n > 0, "connection closed before acknowledgement completed");
            collected.push(byte[0]);
        }
        String::from_utf8(collected).unwrap()
    }

    #[test]
    fn valid_image_gets_200_and_reaches_sink() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig::default());
        let payload = png_bytes(4, 3);

        client.write_all(&frame(&payload)).unwrap();
        let ack = read_ack(&mut client);
        assert!(ack.starts_with("HTTP/1.1 200 OK\r\n"));

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((received.image.width(), received.image.height()), (4, 3));

        drop(client);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn undecodable_payload_gets_400_and_connection_survives() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig::default());

        // 00 00 00 05 01 02 03 04 05 — five bytes that are no image.
        client
            .write_all(&[0x00, 0x00, 0x00, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05])
            .unwrap();
        let ack = read_ack(&mut client);
        assert!(ack.starts_with("HTTP/1.1 400 Bad Request\r\n"));

        // Connection stays open: a valid frame afterwards still works.
        client.write_all(&frame(&png_bytes(2, 2))).unwrap();
        let ack = read_ack(&mut client);
        assert!(ack.starts_with("HTTP/1.1 200 OK\r\n"));

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.image.width(), 2);

        drop(client);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn zero_length_frame_gets_400() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig::default());

        client.write_all(&[0x00, 0x00, 0x00, 0x00]).unwrap();
        let ack = read_ack(&mut client);
        assert!(ack.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(rx.try_recv().is_err());

        drop(client);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn pipelined_frames_in_one_write_are_processed_in_order() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig::default());

        let mut wire = frame(&png_bytes(5, 5));
        wire.extend_from_slice(&frame(&png_bytes(7, 7)));
        client.write_all(&wire).unwrap();

        assert!(read_ack(&mut client).starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(read_ack(&mut client).starts_with("HTTP/1.1 200 OK\r\n"));

        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.image.width(), 5);
        assert_eq!(second.image.width(), 7);

        drop(client);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn partial_header_then_close_produces_nothing() {
        let (client, rx, handle) = spawn_handler(FrameConfig::default());

        (&client).write_all(&[0x00, 0x00]).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        // Clean EOF mid-frame is not a connection error.
        handle.join().unwrap().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn oversized_announcement_closes_the_connection() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig {
            max_payload_size: 1024,
        });

        client.write_all(&[0x00, 0x10, 0x00, 0x00]).unwrap();

        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::Frame(FrameError::PayloadTooLarge { .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn byte_by_byte_delivery_still_completes_one_frame() {
        let (mut client, rx, handle) = spawn_handler(FrameConfig::default());

        for byte in frame(&png_bytes(3, 3)) {
            client.write_all(&[byte]).unwrap();
        }
        assert!(read_ack(&mut client).starts_with("HTTP/1.1 200 OK\r\n"));

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.image.height(), 3);

        drop(client);
        handle.join().unwrap().unwrap();
    }
}
