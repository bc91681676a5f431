//! The cyclic XOR scramble used by the string pool and hashed string fields.
//!
//! Scrambling is position-relative: the key restarts at the first byte of
//! every scrambled run. Applying [`scramble`] twice restores the input.
//!
//! Strings are stored one byte per character (Latin-1). Characters above
//! `U+00FF` cannot be represented and are rejected on encode.

use crate::error::NameError;

/// The cyclic XOR key.
pub const HASH_KEY: [u8; 8] = [0x95, 0x3A, 0xC5, 0x2A, 0x95, 0x7A, 0x95, 0x6A];

/// XOR `bytes` in place with [`HASH_KEY`], starting at key position 0.
pub fn scramble(bytes: &mut [u8]) {
    for (b, k) in bytes.iter_mut().zip(HASH_KEY.iter().cycle()) {
        *b ^= k;
    }
}

/// Convert a string to one byte per character.
pub fn to_latin1(s: &str) -> Result<Vec<u8>, NameError> {
    s.chars()
        .map(|ch| match u8::try_from(ch) {
            Ok(0) => Err(NameError::EmbeddedNul),
            Ok(b) => Ok(b),
            Err(_) => Err(NameError::Unencodable { ch }),
        })
        .collect()
}

/// Convert one-byte-per-character data back to a string.
pub fn from_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode `s` plus a NUL terminator and scramble the result.
///
/// The returned length includes the terminator but no padding.
pub fn encode_hashed(s: &str) -> Result<Vec<u8>, NameError> {
    let mut out = to_latin1(s)?;
    out.push(0);
    scramble(&mut out);
    Ok(out)
}

/// Descramble `bytes` and return the string up to the first NUL.
///
/// Bytes after the terminator (padding, garbage) are ignored.
pub fn decode_hashed(bytes: &[u8]) -> String {
    let mut buf = bytes.to_vec();
    scramble(&mut buf);
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    from_latin1(&buf[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scramble_is_an_involution() {
        let mut data = b"SPHERES.BMP\0".to_vec();
        scramble(&mut data);
        assert_ne!(&data, b"SPHERES.BMP\0");
        scramble(&mut data);
        assert_eq!(&data, b"SPHERES.BMP\0");
    }

    #[test]
    fn terminator_is_scrambled_with_its_position() {
        // "A\0" -> [0x41 ^ 0x95, 0x00 ^ 0x3A]
        assert_eq!(encode_hashed("A").unwrap(), vec![0x41 ^ 0x95, 0x3A]);
    }

    #[test]
    fn decode_ignores_padding_after_terminator() {
        let mut bytes = encode_hashed("palette.bmp").unwrap();
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(decode_hashed(&bytes), "palette.bmp");
    }

    #[test]
    fn rejects_wide_and_nul_characters() {
        assert_eq!(
            encode_hashed("snow\u{2603}"),
            Err(NameError::Unencodable { ch: '\u{2603}' })
        );
        assert_eq!(encode_hashed("a\0b"), Err(NameError::EmbeddedNul));
    }

    #[test]
    fn latin1_high_bytes_survive() {
        let s = "caf\u{e9}";
        assert_eq!(decode_hashed(&encode_hashed(s).unwrap()), s);
    }

    proptest! {
        #[test]
        fn hashed_string_roundtrip(s in "[ -~]{0,255}") {
            prop_assert_eq!(decode_hashed(&encode_hashed(&s).unwrap()), s);
        }
    }
}
