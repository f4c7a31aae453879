//! Header field encoding.

use super::Context;
use crate::address::with_type_suffix;
use crate::encoded_string::{EncodedString, write_encoded_string};
use crate::encoding::{
    write_date_value, write_long_integer, write_octet, write_short_integer, write_text_string,
    write_value_length,
};
use crate::error::{Error, Result};
use crate::headers::{
    EXPIRY_RELATIVE_TOKEN, FROM_ADDRESS_PRESENT_TOKEN, FROM_INSERT_ADDRESS_TOKEN,
    FROM_INSERT_ADDRESS_TOKEN_TEXT, Field, HeaderAccess, MessageClass,
};

impl<H: HeaderAccess + ?Sized> Context<'_, H> {
    /// Appends one header field: its tag followed by its value.
    ///
    /// Returns [`Error::FieldNotSet`] without writing anything when the
    /// field has no value.
    pub(super) fn append_header(&mut self, field: Field) -> Result<()> {
        let headers = self.headers;
        match field {
            Field::MmsVersion => {
                let version = match headers.octet(field) {
                    0 => self.config.default_version,
                    version => version,
                };
                self.append_tag(field);
                write_short_integer(self.stack.out(), version);
            }

            Field::MessageId | Field::TransactionId | Field::ContentLocation => {
                let text = headers
                    .text_string(field)
                    .ok_or(Error::FieldNotSet(field))?;
                self.append_tag(field);
                write_text_string(self.stack.out(), text);
            }

            Field::To | Field::Cc | Field::Bcc => {
                let addresses = headers
                    .encoded_strings(field)
                    .filter(|addresses| !addresses.is_empty())
                    .ok_or(Error::FieldNotSet(field))?;
                let typed = addresses
                    .iter()
                    .map(|address| typed_address(field, address))
                    .collect::<Result<Vec<_>>>()?;
                for address in &typed {
                    self.append_tag(field);
                    write_encoded_string(&mut self.stack, field, address)?;
                }
            }

            Field::From => self.append_from()?,

            Field::ReadStatus
            | Field::Status
            | Field::ReportAllowed
            | Field::Priority
            | Field::DeliveryReport
            | Field::ReadReport => {
                let value = headers.octet(field);
                if value == 0 {
                    return Err(Error::FieldNotSet(field));
                }
                self.append_tag(field);
                write_octet(self.stack.out(), value);
            }

            Field::Date => {
                let date = self.long_value(field)?;
                self.append_tag(field);
                write_date_value(self.stack.out(), date);
            }

            Field::Subject => {
                let subject = headers
                    .encoded_string(field)
                    .ok_or(Error::FieldNotSet(field))?;
                subject.short_charset(field)?;
                self.append_tag(field);
                write_encoded_string(&mut self.stack, field, subject)?;
            }

            Field::MessageClass => {
                let class = headers
                    .text_string(field)
                    .ok_or(Error::FieldNotSet(field))?;
                self.append_tag(field);
                match MessageClass::from_bytes(class) {
                    Some(known) => write_octet(self.stack.out(), known.octet()),
                    None => write_text_string(self.stack.out(), class),
                }
            }

            Field::Expiry | Field::MessageSize => {
                let value = self.long_value(field)?;
                self.append_tag(field);
                self.stack.write_value_length_group(|s| {
                    write_octet(s.out(), EXPIRY_RELATIVE_TOKEN);
                    write_long_integer(s.out(), value);
                    Ok(())
                })?;
            }

            _ => return Err(Error::FieldNotSupported(field)),
        }
        Ok(())
    }

    fn append_tag(&mut self, field: Field) {
        write_octet(self.stack.out(), field.tag());
    }

    fn append_from(&mut self) -> Result<()> {
        let headers = self.headers;
        let from = headers
            .encoded_string(Field::From)
            .filter(|from| !from.is_empty() && from.text() != FROM_INSERT_ADDRESS_TOKEN_TEXT);

        let Some(from) = from else {
            self.append_tag(Field::From);
            write_value_length(self.stack.out(), 1);
            write_octet(self.stack.out(), FROM_INSERT_ADDRESS_TOKEN);
            return Ok(());
        };

        let typed = typed_address(Field::From, from)?;
        self.append_tag(Field::From);
        self.stack.write_value_length_group(|s| {
            write_octet(s.out(), FROM_ADDRESS_PRESENT_TOKEN);
            write_encoded_string(s, Field::From, &typed)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Reads a non-negative long-integer field.
    fn long_value(&self, field: Field) -> Result<u64> {
        match self.headers.long_integer(field) {
            None | Some(-1) => Err(Error::FieldNotSet(field)),
            Some(value) => u64::try_from(value).map_err(|_| Error::InvalidValue {
                field,
                reason: format!("negative value {value}"),
            }),
        }
    }
}

/// Checks the charset and appends the address type suffix.
fn typed_address(field: Field, address: &EncodedString) -> Result<EncodedString> {
    address.short_charset(field)?;
    with_type_suffix(address)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ComposerConfig;
    use crate::encoded_string::CHARSET_US_ASCII;
    use crate::headers::{PRIORITY_HIGH, PduHeaders};
    use crate::part::NoResolver;
    use crate::stack::BufferStack;

    fn encode(headers: &PduHeaders, field: Field) -> Result<Vec<u8>> {
        let config = ComposerConfig::default();
        let mut ctx = Context {
            stack: BufferStack::new(),
            headers,
            config: &config,
            resolver: &NoResolver,
        };
        ctx.append_header(field)?;
        ctx.stack.finish()
    }

    #[test]
    fn test_version() {
        let mut headers = PduHeaders::default();
        assert_eq!(encode(&headers, Field::MmsVersion).unwrap(), [0x8D, 0x92]);
        headers.set_octet(Field::MmsVersion, 0x11);
        assert_eq!(encode(&headers, Field::MmsVersion).unwrap(), [0x8D, 0x91]);
    }

    #[test]
    fn test_text_fields() {
        let mut headers = PduHeaders::default();
        headers.set_text_string(Field::ContentLocation, "http://mmsc/1");
        let out = encode(&headers, Field::ContentLocation).unwrap();
        assert_eq!(out[0], 0x83);
        assert_eq!(&out[1..], b"http://mmsc/1\0");

        assert!(matches!(
            encode(&headers, Field::MessageId),
            Err(Error::FieldNotSet(Field::MessageId))
        ));
    }

    #[test]
    fn test_address_list() {
        let mut headers = PduHeaders::default();
        for text in ["123", "a@b.c"] {
            let address = EncodedString::with_charset(CHARSET_US_ASCII, text);
            headers.add_recipient(Field::Cc, address);
        }
        let out = encode(&headers, Field::Cc).unwrap();

        let mut expected = vec![0x82, 15, 0x83];
        expected.extend_from_slice(b"123/TYPE=PLMN\0");
        expected.extend_from_slice(&[0x82, 7, 0x83]);
        expected.extend_from_slice(b"a@b.c\0");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_address_list_unknown_type_writes_nothing() {
        let mut headers = PduHeaders::default();
        headers.add_recipient(Field::To, "+1555");
        headers.add_recipient(Field::To, "no way");
        let err = encode(&headers, Field::To).unwrap_err();
        assert!(matches!(err, Error::UnknownAddressType(_)));
    }

    #[test]
    fn test_empty_address_list_is_not_set() {
        let mut headers = PduHeaders::default();
        headers.set_encoded_strings(Field::Bcc, Vec::new());
        let err = encode(&headers, Field::Bcc).unwrap_err();
        assert!(err.is_field_not_set());
    }

    #[test]
    fn test_from_insert_address() {
        let mut headers = PduHeaders::default();
        let expected = [0x89, 0x01, 0x81];
        assert_eq!(encode(&headers, Field::From).unwrap(), expected);

        headers.set_from("");
        assert_eq!(encode(&headers, Field::From).unwrap(), expected);

        headers.set_from("insert-address-token");
        assert_eq!(encode(&headers, Field::From).unwrap(), expected);
    }

    #[test]
    fn test_from_address_present() {
        let mut headers = PduHeaders::default();
        headers.set_from("10.0.0.1");
        let out = encode(&headers, Field::From).unwrap();

        let mut expected = vec![0x89, 22, 0x80, 20, 0xEA];
        expected.extend_from_slice(b"10.0.0.1/TYPE=IPV4\0");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_from_unknown_type() {
        let mut headers = PduHeaders::default();
        headers.set_from("???");
        let err = encode(&headers, Field::From).unwrap_err();
        assert!(err.is_content_error());
    }

    #[test]
    fn test_flag_zero_is_not_set() {
        let mut headers = PduHeaders::default();
        let err = encode(&headers, Field::Priority).unwrap_err();
        assert!(err.is_field_not_set());
        headers.set_octet(Field::Priority, PRIORITY_HIGH);
        assert_eq!(encode(&headers, Field::Priority).unwrap(), [0x8F, 0x82]);
    }

    #[test]
    fn test_date() {
        let mut headers = PduHeaders::default();
        headers.set_long_integer(Field::Date, 0x0102_0304);
        assert_eq!(
            encode(&headers, Field::Date).unwrap(),
            [0x85, 0x04, 0x01, 0x02, 0x03, 0x04]
        );

        headers.set_long_integer(Field::Date, -5);
        assert!(matches!(
            encode(&headers, Field::Date),
            Err(Error::InvalidValue {
                field: Field::Date,
                ..
            })
        ));
    }

    #[test]
    fn test_subject() {
        let mut headers = PduHeaders::default();
        headers.set_subject("Hi");
        assert_eq!(
            encode(&headers, Field::Subject).unwrap(),
            [0x96, 0x04, 0xEA, b'H', b'i', 0x00]
        );
    }

    #[test]
    fn test_message_class() {
        let mut headers = PduHeaders::default();
        headers.set_text_string(Field::MessageClass, "auto");
        assert_eq!(encode(&headers, Field::MessageClass).unwrap(), [0x8A, 0x83]);

        headers.set_text_string(Field::MessageClass, "x-custom");
        assert_eq!(
            encode(&headers, Field::MessageClass).unwrap(),
            b"\x8Ax-custom\0"
        );
    }

    #[test]
    fn test_expiry_and_size() {
        let mut headers = PduHeaders::default();
        headers.set_long_integer(Field::Expiry, 3600);
        assert_eq!(
            encode(&headers, Field::Expiry).unwrap(),
            [0x88, 0x04, 0x81, 0x02, 0x0E, 0x10]
        );

        headers.set_long_integer(Field::MessageSize, 0);
        assert_eq!(
            encode(&headers, Field::MessageSize).unwrap(),
            [0x8E, 0x02, 0x81, 0x00]
        );
    }

    #[test]
    fn test_unsupported_field() {
        let headers = PduHeaders::default();
        assert!(matches!(
            encode(&headers, Field::ResponseText),
            Err(Error::FieldNotSupported(Field::ResponseText))
        ));
    }
}
