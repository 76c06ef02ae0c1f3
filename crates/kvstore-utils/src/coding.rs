//! Hex and printable renderings of raw keys and values.

use std::fmt::Write;

pub fn hex_encode(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

/// Parse an even-length hex string (either case). `None` on any bad digit.
pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    s.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

/// Text when the bytes are UTF-8 without control characters, otherwise
/// `0x`-prefixed hex.
pub fn display_bytes(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) if !s.chars().any(char::is_control) => s.to_string(),
        _ => format!("0x{}", hex_encode(data)),
    }
}
