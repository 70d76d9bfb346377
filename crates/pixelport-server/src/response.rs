//! Acknowledgement lines written back after every decode attempt.
//!
//! The protocol acknowledges each frame with a single HTTP status line
//! and `Content-Length: 0`; there is never a body and the connection
//! stays open for the next frame.

/// Outcome of one decode attempt, as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// The payload decoded into a well-formed image.
    Ok,
    /// The payload was not a recognizable image.
    BadRequest,
}

impl Ack {
    /// The exact bytes written to the peer.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Ack::Ok => b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n",
            Ack::BadRequest => b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n",
        }
    }

    /// Status line without headers, for logging.
    pub fn status_line(self) -> &'static str {
        match self {
            Ack::Ok => "200 OK",
            Ack::BadRequest => "400 Bad Request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_carry_no_body() {
        for ack in [Ack::Ok, Ack::BadRequest] {
            let text = std::str::from_utf8(ack.as_bytes()).unwrap();
            assert!(text.starts_with("HTTP/1.1 "));
            assert!(text.contains("Content-Length: 0"));
            assert!(text.ends_with("\r\n\r\n"));
        }
    }

    #[test]
    fn status_lines_match_wire_bytes() {
        assert_eq!(Ack::Ok.status_line(), "200 OK");
        assert_eq!(Ack::BadRequest.status_line(), "400 Bad Request");
    }
}
