//! Charset-tagged text values.
//!
//! An encoded-string value on the wire is a value-length group holding the
//! charset as a short integer followed by the text as a text string.

use std::borrow::Cow;

use crate::encoding::{SHORT_INTEGER_MAX, write_short_integer, write_text_string};
use crate::error::{Error, Result};
use crate::headers::Field;
use crate::stack::BufferStack;

/// IANA MIBenum of US-ASCII.
pub const CHARSET_US_ASCII: u32 = 3;

/// IANA MIBenum of UTF-8.
pub const CHARSET_UTF_8: u32 = 106;

/// Text together with the charset it is encoded in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodedString {
    charset: u32,
    text: Vec<u8>,
}

impl EncodedString {
    /// Creates a UTF-8 encoded string.
    #[must_use]
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self::with_charset(CHARSET_UTF_8, text)
    }

    /// Creates an encoded string with an explicit charset.
    #[must_use]
    pub fn with_charset(charset: u32, text: impl Into<Vec<u8>>) -> Self {
        Self {
            charset,
            text: text.into(),
        }
    }

    /// Returns the charset MIBenum.
    #[must_use]
    pub const fn charset(&self) -> u32 {
        self.charset
    }

    /// Returns the raw text bytes.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Returns true if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Appends raw bytes to the text, keeping the charset.
    pub fn append_text(&mut self, suffix: &[u8]) {
        self.text.extend_from_slice(suffix);
    }

    /// Returns the charset as a short-integer value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the charset is above 127.
    pub fn short_charset(&self, field: Field) -> Result<u8> {
        u8::try_from(self.charset)
            .ok()
            .filter(|charset| *charset <= SHORT_INTEGER_MAX)
            .ok_or_else(|| Error::InvalidValue {
                field,
                reason: format!("charset {} is not a short integer", self.charset),
            })
    }
}

impl From<&str> for EncodedString {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for EncodedString {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Writes an encoded-string value as a value-length group.
///
/// Returns the group length.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] if the charset does not fit a short
/// integer; nothing is written in that case.
pub fn write_encoded_string(
    stack: &mut BufferStack,
    field: Field,
    value: &EncodedString,
) -> Result<usize> {
    let charset = value.short_charset(field)?;
    stack.write_value_length_group(|s| {
        write_short_integer(s.out(), charset);
        write_text_string(s.out(), value.text());
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Splits a value-length group back into charset and text.
    fn decode(bytes: &[u8]) -> (u8, Vec<u8>) {
        let len = usize::from(bytes[0]);
        assert!(len <= 30);
        let group = &bytes[1..];
        assert_eq!(group.len(), len);
        let charset = group[0] & 0x7F;
        let mut text = &group[1..];
        if text[0] == 127 {
            text = &text[1..];
        }
        assert_eq!(text.last(), Some(&0));
        (charset, text[..text.len() - 1].to_vec())
    }

    #[test]
    fn test_new_defaults_to_utf8() {
        let value = EncodedString::new("hello");
        assert_eq!(value.charset(), CHARSET_UTF_8);
        assert_eq!(value.text(), b"hello");
        assert!(!value.is_empty());
    }

    #[test]
    fn test_append_text_keeps_charset() {
        let mut value = EncodedString::with_charset(CHARSET_US_ASCII, "+1555");
        value.append_text(b"/TYPE=PLMN");
        assert_eq!(value.charset(), CHARSET_US_ASCII);
        assert_eq!(value.to_string_lossy(), "+1555/TYPE=PLMN");
    }

    #[test]
    fn test_write_encoded_string() {
        let mut stack = BufferStack::new();
        let len = write_encoded_string(&mut stack, Field::Subject, &"Hi".into()).unwrap();
        assert_eq!(len, 4);
        assert_eq!(stack.finish().unwrap(), [0x04, 0xEA, b'H', b'i', 0x00]);
    }

    #[test]
    fn test_write_encoded_string_round_trip() {
        let value = EncodedString::with_charset(CHARSET_US_ASCII, "Meeting at noon");
        let mut stack = BufferStack::new();
        write_encoded_string(&mut stack, Field::Subject, &value).unwrap();
        let (charset, text) = decode(&stack.finish().unwrap());
        assert_eq!(u32::from(charset), CHARSET_US_ASCII);
        assert_eq!(text, value.text());
    }

    #[test]
    fn test_write_encoded_string_high_first_byte() {
        let value = EncodedString::new("\u{e9}t\u{e9}");
        let mut stack = BufferStack::new();
        write_encoded_string(&mut stack, Field::Subject, &value).unwrap();
        let out = stack.finish().unwrap();
        assert_eq!(out[2], 127);
        let (_, text) = decode(&out);
        assert_eq!(text, value.text());
    }

    #[test]
    fn test_write_encoded_string_rejects_wide_charset() {
        let value = EncodedString::with_charset(1000, "ucs2");
        let mut stack = BufferStack::new();
        let err = write_encoded_string(&mut stack, Field::Subject, &value).unwrap_err();
        assert!(err.is_content_error());
        assert!(stack.finish().unwrap().is_empty());
    }

    #[test]
    fn test_short_charset_boundary() {
        assert_eq!(
            EncodedString::with_charset(127, "x")
                .short_charset(Field::Subject)
                .unwrap(),
            127
        );
        assert!(
            EncodedString::with_charset(128, "x")
                .short_charset(Field::Subject)
                .is_err()
        );
    }
}
