//! JSON codec for OpenDeck wire frames.
//!
//! Encoding and decoding are deliberately thin wrappers over serde_json —
//! the interesting part is the error taxonomy.  A decode failure is *never*
//! fatal to the bridge: the receive loop logs it and moves on to the next
//! frame, because the server may legitimately speak newer message kinds.
//!
//! The one piece of real parsing here is [`decode_image_data_uri`]:
//! `setImage` carries images as data URIs
//! (`data:image/png;base64,<payload>`), and the raw image bytes are the
//! base64 payload after the first comma.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::messages::{IncomingMessage, OutgoingMessage};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur while decoding an inbound frame.
///
/// All of these are "log and skip" conditions — none of them abort the
/// connection.  I/O failures are handled separately by the transport layer.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The frame is not valid JSON, names an unknown `event`, or is missing
    /// a required field.  The serde error message is preserved for logging.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// An image string is not a data URI: it has no comma separating the
    /// media-type prefix from the base64 payload.
    #[error("image payload is not a data URI (no comma separator)")]
    MissingDataUriSeparator,

    /// The base64 segment of a data URI could not be decoded.
    #[error("invalid base64 image payload: {0}")]
    InvalidBase64(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OutgoingMessage`] as a JSON text frame.
///
/// # Example
///
/// ```rust
/// use opendeck_protocol::{encode, OutgoingMessage};
///
/// let frame = encode(&OutgoingMessage::RerenderImages {
///     payload: "sd-ABC123".to_string(),
/// });
/// assert_eq!(frame, r#"{"event":"rerenderImages","payload":"sd-ABC123"}"#);
/// ```
pub fn encode(msg: &OutgoingMessage) -> String {
    // Serializing OutgoingMessage cannot fail: every field is a string or an
    // integer and the enum is internally tagged with string keys.
    serde_json::to_string(msg).expect("outgoing messages always serialize to JSON")
}

/// Decodes one JSON text frame into an [`IncomingMessage`].
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] for invalid JSON, an unknown `event`,
/// or missing required fields.  Callers treat this as a skippable frame.
///
/// # Example
///
/// ```rust
/// use opendeck_protocol::{decode, IncomingMessage};
///
/// let msg = decode(r#"{"event":"setImage","device":"sd-X","controller":"Keypad"}"#).unwrap();
/// assert!(matches!(msg, IncomingMessage::SetImage { .. }));
/// ```
pub fn decode(frame: &str) -> Result<IncomingMessage, DecodeError> {
    serde_json::from_str(frame).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Extracts the raw image bytes from a `setImage` data URI.
///
/// The URI looks like `data:image/png;base64,iVBORw0KGgo...`; everything
/// after the *first* comma is standard base64.  The media-type prefix is not
/// validated — the host's image setter accepts whatever format the server
/// pushed, and rejecting unknown prefixes here would only break future
/// formats.
///
/// # Errors
///
/// - [`DecodeError::MissingDataUriSeparator`] when the string has no comma.
/// - [`DecodeError::InvalidBase64`] when the payload is not valid base64.
pub fn decode_image_data_uri(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let (_prefix, payload) = uri
        .split_once(',')
        .ok_or(DecodeError::MissingDataUriSeparator)?;

    BASE64
        .decode(payload)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
