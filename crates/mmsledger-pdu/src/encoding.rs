//! Primitive value encodings of the MMS encapsulation.
//!
//! Supports short/long/uintvar integers, text and quoted strings,
//! value-length prefixes and date values (WAP-230 WSP, WAP-209 MMS).
//!
//! Every writer appends to a byte buffer and never fails. The accepted
//! range of each encoding is carried by its parameter type; the only lossy
//! case is [`write_short_integer`], which masks values above 127.

use crate::error::{Error, Result};

/// Marks a text string whose first octet is above 127.
pub const TEXT_QUOTE: u8 = 127;

/// Opens a quoted string.
pub const QUOTED_STRING_FLAG: u8 = 34;

/// Terminates text and quoted strings.
pub const END_OF_STRING: u8 = 0;

/// Announces a uintvar length after it.
pub const LENGTH_QUOTE: u8 = 31;

/// Largest length encoded as a single short-length octet.
pub const SHORT_LENGTH_MAX: u32 = 30;

/// Largest value a short integer can carry.
pub const SHORT_INTEGER_MAX: u8 = 127;

/// Writes a short integer: the value with the high bit set.
///
/// Values above [`SHORT_INTEGER_MAX`] are not representable; their high bit
/// is simply absorbed, so `128` encodes exactly like `0`.
pub fn write_short_integer(buf: &mut Vec<u8>, value: u8) {
    buf.push(value | 0x80);
}

/// Writes a raw octet.
pub fn write_octet(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

/// Returns the number of octets in the minimal big-endian form of `value`.
#[must_use]
pub const fn long_integer_octets(value: u64) -> u8 {
    // At most 8, never truncates.
    #[allow(clippy::cast_possible_truncation)]
    let octets = (u64::BITS - value.leading_zeros()).div_ceil(8) as u8;
    octets
}

/// Writes a long integer: short-length octet count, then big-endian octets.
///
/// Zero encodes as a lone `0x00` length with no content.
pub fn write_long_integer(buf: &mut Vec<u8>, value: u64) {
    let octets = long_integer_octets(value);
    buf.push(octets);
    let bytes = value.to_be_bytes();
    buf.extend_from_slice(&bytes[bytes.len() - usize::from(octets)..]);
}

/// Writes a uintvar integer.
///
/// Seven bits per octet, most significant group first, continuation bit on
/// every octet but the last. A `u32` always fits in five groups.
pub fn write_uintvar(buf: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut rest = value;

    loop {
        // Masked to 7 bits.
        #[allow(clippy::cast_possible_truncation)]
        let group = (rest & 0x7F) as u8;
        groups[count] = group;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }

    for i in (0..count).rev() {
        if i == 0 {
            buf.push(groups[i]);
        } else {
            buf.push(groups[i] | 0x80);
        }
    }
}

/// Writes a text string.
///
/// A [`TEXT_QUOTE`] is emitted first only when the first octet is above 127.
pub fn write_text_string(buf: &mut Vec<u8>, text: &[u8]) {
    if text.first().is_some_and(|&b| b > SHORT_INTEGER_MAX) {
        buf.push(TEXT_QUOTE);
    }
    buf.extend_from_slice(text);
    buf.push(END_OF_STRING);
}

/// Writes a quoted string: `"` followed by the text, NUL terminated.
pub fn write_quoted_string(buf: &mut Vec<u8>, text: &[u8]) {
    buf.push(QUOTED_STRING_FLAG);
    buf.extend_from_slice(text);
    buf.push(END_OF_STRING);
}

/// Writes a value-length prefix.
///
/// Lengths up to 30 take one octet; anything longer is [`LENGTH_QUOTE`]
/// followed by a uintvar.
pub fn write_value_length(buf: &mut Vec<u8>, length: u32) {
    if length <= SHORT_LENGTH_MAX {
        // Checked above.
        #[allow(clippy::cast_possible_truncation)]
        buf.push(length as u8);
    } else {
        buf.push(LENGTH_QUOTE);
        write_uintvar(buf, length);
    }
}

/// Writes a date value (seconds since the Unix epoch) as a long integer.
pub fn write_date_value(buf: &mut Vec<u8>, seconds: u64) {
    write_long_integer(buf, seconds);
}

/// Converts a buffer length into the range of a uintvar.
///
/// # Errors
///
/// Returns [`Error::ValueTooLarge`] if the length exceeds `u32::MAX`.
pub fn checked_length(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| Error::ValueTooLarge(length))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::unreadable_literal,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Decodes a uintvar, returning the value and the octets consumed.
    fn read_uintvar(bytes: &[u8]) -> (u64, usize) {
        let mut value = 0u64;
        for (i, b) in bytes.iter().enumerate() {
            value = (value << 7) | u64::from(b & 0x7F);
            if b & 0x80 == 0 {
                return (value, i + 1);
            }
        }
        panic!("unterminated uintvar");
    }

    fn encode(f: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf);
        buf
    }

    #[test]
    fn test_short_integer() {
        assert_eq!(encode(|b| write_short_integer(b, 0)), [0x80]);
        assert_eq!(encode(|b| write_short_integer(b, 0x12)), [0x92]);
        assert_eq!(encode(|b| write_short_integer(b, 127)), [0xFF]);
    }

    #[test]
    fn test_short_integer_out_of_range_is_masked() {
        // Not representable: the high bit is absorbed silently.
        assert_eq!(encode(|b| write_short_integer(b, 128)), [0x80]);
        assert_eq!(encode(|b| write_short_integer(b, 200)), [200]);
    }

    #[test]
    fn test_octet() {
        assert_eq!(encode(|b| write_octet(b, 0x8C)), [0x8C]);
        assert_eq!(encode(|b| write_octet(b, 0x05)), [0x05]);
    }

    #[test]
    fn test_long_integer() {
        assert_eq!(encode(|b| write_long_integer(b, 0)), [0x00]);
        assert_eq!(encode(|b| write_long_integer(b, 1)), [0x01, 0x01]);
        assert_eq!(encode(|b| write_long_integer(b, 0xFF)), [0x01, 0xFF]);
        assert_eq!(encode(|b| write_long_integer(b, 0x100)), [0x02, 0x01, 0x00]);
        assert_eq!(
            encode(|b| write_long_integer(b, 1_700_000_000)),
            [0x04, 0x65, 0x53, 0xF1, 0x00]
        );
        assert_eq!(
            encode(|b| write_long_integer(b, u64::MAX)),
            [0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_uintvar() {
        assert_eq!(encode(|b| write_uintvar(b, 0)), [0x00]);
        assert_eq!(encode(|b| write_uintvar(b, 0x7F)), [0x7F]);
        assert_eq!(encode(|b| write_uintvar(b, 0x80)), [0x81, 0x00]);
        assert_eq!(encode(|b| write_uintvar(b, 0x3FFF)), [0xFF, 0x7F]);
        assert_eq!(
            encode(|b| write_uintvar(b, u32::MAX)),
            [0x8F, 0xFF, 0xFF, 0xFF, 0x7F]
        );
    }

    #[test]
    fn test_value_length_boundary() {
        assert_eq!(encode(|b| write_value_length(b, 0)), [0x00]);
        assert_eq!(encode(|b| write_value_length(b, 30)), [30]);
        assert_eq!(encode(|b| write_value_length(b, 31)), [31, 31]);
        assert_eq!(encode(|b| write_value_length(b, 200)), [31, 0x81, 0x48]);
    }

    #[test]
    fn test_text_string() {
        assert_eq!(encode(|b| write_text_string(b, b"T1")), b"T1\0");
        assert_eq!(encode(|b| write_text_string(b, b"")), [0x00]);
        assert_eq!(
            encode(|b| write_text_string(b, &[0x80, 0x41])),
            [TEXT_QUOTE, 0x80, 0x41, 0x00]
        );
        // Only the first octet decides.
        assert_eq!(
            encode(|b| write_text_string(b, &[0x41, 0xC3])),
            [0x41, 0xC3, 0x00]
        );
    }

    #[test]
    fn test_quoted_string() {
        assert_eq!(encode(|b| write_quoted_string(b, b"<0>")), b"\"<0>\0");
        assert_eq!(
            encode(|b| write_quoted_string(b, &[0xE4])),
            [QUOTED_STRING_FLAG, 0xE4, 0x00]
        );
    }

    #[test]
    fn test_date_value_matches_long_integer() {
        let date = encode(|b| write_date_value(b, 1_234_567_890));
        let long = encode(|b| write_long_integer(b, 1_234_567_890));
        assert_eq!(date, long);
    }

    #[test]
    fn test_checked_length() {
        assert_eq!(checked_length(42).unwrap(), 42);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            checked_length(usize::MAX),
            Err(Error::ValueTooLarge(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_short_value_length_is_one_octet(n in 0u32..=30) {
            prop_assert_eq!(encode(|b| write_value_length(b, n)), vec![n as u8]);
        }

        #[test]
        fn prop_long_value_length_is_quoted_uintvar(n in 31u32..) {
            let out = encode(|b| write_value_length(b, n));
            prop_assert_eq!(out[0], LENGTH_QUOTE);
            let (value, used) = read_uintvar(&out[1..]);
            prop_assert_eq!(value, u64::from(n));
            prop_assert_eq!(used, out.len() - 1);
        }

        #[test]
        fn prop_uintvar_decodes_back(n in any::<u32>()) {
            let out = encode(|b| write_uintvar(b, n));
            prop_assert!(out.len() <= 5);
            let (value, used) = read_uintvar(&out);
            prop_assert_eq!(value, u64::from(n));
            prop_assert_eq!(used, out.len());
        }

        #[test]
        fn prop_text_string_quote_rule(text in proptest::collection::vec(any::<u8>(), 1..64)) {
            let out = encode(|b| write_text_string(b, &text));
            let mut expected = Vec::new();
            if text[0] > 127 {
                expected.push(TEXT_QUOTE);
            }
            expected.extend_from_slice(&text);
            expected.push(0);
            prop_assert_eq!(out, expected);
        }

        #[test]
        fn prop_long_integer_is_minimal(v in 1u64..) {
            let out = encode(|b| write_long_integer(b, v));
            let n = usize::from(out[0]);
            prop_assert_eq!(out.len(), n + 1);
            // Minimal: no leading zero octet and v < 256^n.
            prop_assert_ne!(out[1], 0);
            let rebuilt = out[1..].iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
            prop_assert_eq!(rebuilt, v);
        }
    }
}
