//! Hex text to bytes and back.
//!
//! Fixtures and raw block-payload files carry byte strings as hex. Two decode
//! entry points exist: [`decode`] rejects malformed input, [`decode_lenient`]
//! keeps going with a best-effort result and reports the problem through the
//! log. The loaders use the lenient form.

use ::hex::FromHexError;
use log::warn;

use crate::error::HexDecodeError;

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode a hex string, high nibble first.
pub fn decode(hex: &str) -> Result<Vec<u8>, HexDecodeError> {
    ::hex::decode(hex).map_err(|e| match e {
        FromHexError::InvalidHexCharacter { index, .. } => invalid_digit(hex, index),
        _ => HexDecodeError::OddLength(hex.len()),
    })
}

fn invalid_digit(hex: &str, index: usize) -> HexDecodeError {
    // Byte index may fall inside a multi-byte char; report what is there.
    let found = hex
        .get(index..)
        .and_then(|s| s.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    HexDecodeError::InvalidDigit { index, found }
}

/// Decode a hex string without failing.
///
/// Every violation is logged. Invalid digits decode as a zero nibble and a
/// trailing unpaired digit is dropped, so the output always has
/// `hex.len() / 2` bytes.
pub fn decode_lenient(hex: &str) -> Vec<u8> {
    let raw = hex.as_bytes();
    if raw.len() % 2 == 1 {
        warn!("{}", HexDecodeError::OddLength(raw.len()));
    }
    let mut reported = false;
    let mut out = Vec::with_capacity(raw.len() / 2);
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        let mut digit = |offset: usize| {
            nibble(pair[offset]).unwrap_or_else(|| {
                if !reported {
                    warn!("{}", invalid_digit(hex, i * 2 + offset));
                    reported = true;
                }
                0
            })
        };
        let hi = digit(0);
        let lo = digit(1);
        out.push(hi << 4 | lo);
    }
    out
}

/// Encode bytes as lowercase hex, two characters per byte.
pub fn encode(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Remove all whitespace, including line breaks inside wrapped hex dumps.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
