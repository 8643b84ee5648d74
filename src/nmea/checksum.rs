//! NMEA 0183 checksum.
//!
//! The checksum is the XOR of every byte between the leading `$` and the
//! `*` delimiter, transmitted as two hexadecimal digits after the `*`.

use core::fmt::Write;

/// XOR of every byte in `body` (the text between `$` and `*`).
pub fn xor(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, b| acc ^ b)
}

/// Validate a complete `$<body>*HH` sentence. Trailing CR/LF is ignored.
///
/// Returns `false` when the start marker, the `*` delimiter, or either
/// checksum digit is missing.
pub fn verify(sentence: &str) -> bool {
    let bytes = sentence.trim_end_matches(['\r', '\n']).as_bytes();
    if bytes.first() != Some(&b'$') {
        return false;
    }
    let Some(star) = bytes.iter().position(|&b| b == b'*') else {
        return false;
    };
    let Some(received) = bytes.get(star + 1..star + 3).and_then(parse_hex_pair) else {
        return false;
    };
    xor(&bytes[1..star]) == received
}

/// Parse two ASCII hex digits (either case) into a byte.
pub fn parse_hex_pair(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => Some((hex_nibble(*hi)? << 4) | hex_nibble(*lo)?),
        _ => None,
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Write `$<body>*HH\r\n` into `out`.
pub fn write_framed(body: &str, out: &mut impl Write) -> core::fmt::Result {
    write!(out, "${}*{:02X}\r\n", body, xor(body.as_bytes()))
}
