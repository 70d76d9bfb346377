//! Image payload validation and decoding.
//!
//! A thin, stateless layer over the `image` codec crate: given the raw
//! bytes of a completed frame, either produce a [`DecodedImage`] or a
//! typed [`DecodeError`]. Framing never reaches this crate — callers
//! hand in complete payloads only.

pub mod decoder;
pub mod error;

pub use decoder::{decode, DecodedImage};
pub use error::{DecodeError, Result};
