//! Payload representation and normalization.
//!
//! Payloads reach the codec from two kinds of sources: text produced by
//! `encrypt` (base64), and values read back through contract or relayer
//! layers, which may arrive as `0x`-hex text or as raw bytes. All of them
//! are folded into bytes by [`Payload::into_bytes`] before any crypto runs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{Error, Result};

/// Marker that selects hex decoding
pub const HEX_PREFIX: &str = "0x";

/// An encrypted payload in either textual or raw form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Base64 or `0x`-hex text
    Text(String),
    /// Raw `nonce || ciphertext || tag` bytes
    Bytes(Vec<u8>),
}

/// How a textual payload was decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Raw bytes, no decoding
    Raw,
    /// `0x`-prefixed hex
    Hex,
    /// Standard base64
    Base64,
}

impl Payload {
    /// Resolve the payload to raw bytes
    ///
    /// Precedence:
    /// 1. `Bytes` are used as-is.
    /// 2. Trimmed text starting with `0x` whose remainder is all hex digits
    ///    is hex-decoded; an odd digit count is malformed.
    /// 3. Anything else has all whitespace removed and is base64-decoded.
    ///
    /// Text such as `0xZm9v…` that merely begins with the marker but is not
    /// hex falls through to base64, since base64 output can start with `0x`.
    pub fn into_bytes(self) -> Result<(Vec<u8>, Encoding)> {
        match self {
            Payload::Bytes(bytes) => Ok((bytes, Encoding::Raw)),
            Payload::Text(text) => decode_text(&text),
        }
    }
}

fn decode_text(text: &str) -> Result<(Vec<u8>, Encoding)> {
    let trimmed = text.trim();

    if let Some(digits) = trimmed.strip_prefix(HEX_PREFIX) {
        if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            if digits.len() % 2 != 0 {
                return Err(Error::MalformedPayload(format!(
                    "hex payload has an odd number of digits ({})",
                    digits.len()
                )));
            }
            let bytes = hex::decode(digits)
                .map_err(|e| Error::MalformedPayload(format!("invalid hex: {e}")))?;
            return Ok((bytes, Encoding::Hex));
        }
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::MalformedPayload(format!("invalid base64: {e}")))?;
    Ok((bytes, Encoding::Base64))
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_owned())
    }
}

impl From<&String> for Payload {
    fn from(text: &String) -> Self {
        Payload::Text(text.clone())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}
