//! Transfer codec for the text-oriented exec channel.
//!
//! Binary content crossing the channel is base64-encoded; the encoded form
//! can be split into fixed-width lines for transports that dislike long
//! lines, and decoding tolerates any whitespace the transport introduced.
//! Nothing here knows about pods or commands, so it is testable on its own.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode bytes as a single-line base64 payload.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode bytes as base64 split into lines of at most `width` characters.
pub fn encode_chunked(bytes: &[u8], width: usize) -> String {
    let encoded = STANDARD.encode(bytes);
    if width == 0 || encoded.len() <= width {
        return encoded;
    }
    let mut out = String::with_capacity(encoded.len() + encoded.len() / width + 1);
    let raw = encoded.as_bytes();
    for chunk in raw.chunks(width) {
        if !out.is_empty() {
            out.push('\n');
        }
        // base64 output is ASCII, so chunking on byte boundaries is safe.
        out.push_str(std::str::from_utf8(chunk).expect("base64 is ascii"));
    }
    out
}

/// Decode a base64 payload, ignoring embedded whitespace.
pub fn decode(payload: &str) -> Result<Vec<u8>, String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| e.to_string())
}
