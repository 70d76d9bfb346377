use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::error::{DecodeError, Result};

/// A successfully decoded image payload.
///
/// Owns the decoded bitmap; the receive path holds no reference after
/// handing one of these to the display layer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bitmap: DynamicImage,
    format: ImageFormat,
}

impl DecodedImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// The container format detected from the payload bytes.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Borrow the decoded bitmap.
    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }

    /// Consume the wrapper and return the decoded bitmap.
    pub fn into_bitmap(self) -> DynamicImage {
        self.bitmap
    }
}

/// Decode an image payload.
///
/// The container format is sniffed from the bytes themselves; no
/// specific format is assumed. Malformed, truncated, unsupported, or
/// empty input yields [`DecodeError::InvalidFormat`] — never a panic.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat {
            reason: "empty payload".to_string(),
        });
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| DecodeError::InvalidFormat {
            reason: err.to_string(),
        })?;

    let format = reader.format().ok_or_else(|| DecodeError::InvalidFormat {
        reason: "unrecognized image container".to_string(),
    })?;

    let bitmap = reader.decode().map_err(|err| DecodeError::InvalidFormat {
        reason: err.to_string(),
    })?;

    Ok(DecodedImage { bitmap, format })
}
