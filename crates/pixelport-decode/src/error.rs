/// Errors that can occur while decoding an image payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload bytes are not a recognized, well-formed image.
    #[error("payload is not a well-formed image: {reason}")]
    InvalidFormat { reason: String },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
