//! PDU composition.
//!
//! [`PduComposer`] selects the header sequence for the message type, writes
//! every field through the header encoder and, for send requests, appends
//! the multipart body. Composition is all-or-nothing: on any error the
//! partial output is dropped.
//!
//! # Example
//!
//! ```
//! use mmsledger_pdu::{Field, MessageType, PduBody, PduComposer, PduHeaders, PduPart};
//!
//! let mut headers = PduHeaders::new(MessageType::SendRequest);
//! headers.set_transaction_id("T1");
//! headers.set_from("alice@example.com");
//! headers.add_recipient(Field::To, "+15551234");
//! headers.set_content_type("application/vnd.wap.multipart.mixed");
//!
//! let body = PduBody::new().with_part(PduPart::inline("text/plain", "Hello"));
//! let pdu = PduComposer::default().compose(&headers, Some(&body)).unwrap();
//! assert_eq!(&pdu[..2], [0x8C, 0x80]);
//! ```

mod body;
mod header;

use crate::config::ComposerConfig;
use crate::encoding::{write_octet, write_text_string};
use crate::error::{Error, Result};
use crate::headers::{Field, HeaderAccess, MessageType};
use crate::part::{NoResolver, PartResolver, PduBody};
use crate::stack::BufferStack;

/// Builds binary PDUs from headers and an optional body.
pub struct PduComposer<'r> {
    config: ComposerConfig,
    resolver: &'r dyn PartResolver,
}

impl PduComposer<'static> {
    /// Creates a composer that cannot open external part data.
    #[must_use]
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            resolver: &NoResolver,
        }
    }
}

impl Default for PduComposer<'static> {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl std::fmt::Debug for PduComposer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PduComposer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'r> PduComposer<'r> {
    /// Creates a composer that opens external part data through `resolver`.
    #[must_use]
    pub fn with_resolver(config: ComposerConfig, resolver: &'r dyn PartResolver) -> Self {
        Self { config, resolver }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Composes one PDU.
    ///
    /// `body` is only used for send requests; `None` writes an empty body.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMessageType`] for a missing or unsupported type
    /// - content errors when mandatory data is missing or invalid
    /// - [`Error::FieldNotSupported`] for a field without encoding rules
    /// - internal errors when length accounting fails
    pub fn compose<H>(&self, headers: &H, body: Option<&PduBody>) -> Result<Vec<u8>>
    where
        H: HeaderAccess + ?Sized,
    {
        let tag = headers.octet(Field::MessageType);
        let message_type = MessageType::from_tag(tag)
            .filter(|kind| kind.is_composable())
            .ok_or(Error::UnsupportedMessageType(tag))?;

        tracing::debug!(?message_type, "Composing PDU");

        let mut ctx = Context {
            stack: BufferStack::new(),
            headers,
            config: &self.config,
            resolver: self.resolver,
        };
        ctx.append_message_type(message_type);

        let result = match message_type {
            MessageType::SendRequest => ctx.send_request(body),
            MessageType::Notification => ctx.notification(),
            MessageType::NotifyResponse => ctx.notify_response(),
            MessageType::Acknowledge => ctx.acknowledge(),
            MessageType::ReadReceipt => ctx.read_receipt(),
            _ => Err(Error::UnsupportedMessageType(tag)),
        };
        if let Err(err) = &result {
            tracing::debug!(?message_type, error = %err, "PDU composition failed");
        }
        result?;

        let pdu = ctx.stack.finish()?;
        tracing::debug!(?message_type, size = pdu.len(), "Composed PDU");
        Ok(pdu)
    }
}

/// Composes one PDU with the default configuration.
///
/// External part data cannot be resolved; use
/// [`PduComposer::with_resolver`] for that.
///
/// # Errors
///
/// See [`PduComposer::compose`].
pub fn compose<H>(headers: &H, body: Option<&PduBody>) -> Result<Vec<u8>>
where
    H: HeaderAccess + ?Sized,
{
    PduComposer::default().compose(headers, body)
}

/// State of a single composition.
struct Context<'a, H: ?Sized> {
    stack: BufferStack,
    headers: &'a H,
    config: &'a ComposerConfig,
    resolver: &'a dyn PartResolver,
}

impl<H: HeaderAccess + ?Sized> Context<'_, H> {
    fn append_message_type(&mut self, message_type: MessageType) {
        write_octet(self.stack.out(), Field::MessageType.tag());
        write_octet(self.stack.out(), message_type.tag());
    }

    fn mandatory(&mut self, field: Field) -> Result<()> {
        self.append_header(field).map_err(Error::into_mandatory)
    }

    fn optional(&mut self, field: Field) -> Result<()> {
        match self.append_header(field) {
            Err(Error::FieldNotSet(field)) => {
                tracing::trace!(?field, "Skipping unset optional field");
                Ok(())
            }
            other => other,
        }
    }

    fn send_request(&mut self, body: Option<&PduBody>) -> Result<()> {
        // Written directly; the generic path would report it as optional.
        let transaction_id = self
            .headers
            .text_string(Field::TransactionId)
            .ok_or(Error::MissingField(Field::TransactionId))?;
        write_octet(self.stack.out(), Field::TransactionId.tag());
        write_text_string(self.stack.out(), transaction_id);

        self.mandatory(Field::MmsVersion)?;
        self.optional(Field::Date)?;
        self.mandatory(Field::From)?;

        // A bad recipient field is dropped as long as another one encodes.
        let mut recipients = 0;
        let mut first_failure = None;
        for field in [Field::To, Field::Cc, Field::Bcc] {
            match self.append_header(field) {
                Ok(()) => recipients += 1,
                Err(Error::FieldNotSet(_)) => {
                    tracing::trace!(?field, "No recipients in field");
                }
                Err(err) if err.is_content_error() => {
                    tracing::warn!(?field, error = %err, "Dropping recipient field");
                    first_failure.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        if recipients == 0 {
            return Err(first_failure.unwrap_or(Error::NoRecipients));
        }

        for field in [
            Field::Subject,
            Field::MessageClass,
            Field::Expiry,
            Field::Priority,
            Field::DeliveryReport,
            Field::ReadReport,
        ] {
            self.optional(field)?;
        }

        write_octet(self.stack.out(), Field::ContentType.tag());
        self.append_body(body)
    }

    fn notification(&mut self) -> Result<()> {
        self.mandatory(Field::TransactionId)?;
        self.mandatory(Field::MmsVersion)?;
        self.mandatory(Field::From)?;
        self.optional(Field::Subject)?;
        self.mandatory(Field::MessageClass)?;
        self.mandatory(Field::MessageSize)?;
        self.mandatory(Field::Expiry)?;
        self.mandatory(Field::ContentLocation)
    }

    fn notify_response(&mut self) -> Result<()> {
        self.mandatory(Field::TransactionId)?;
        self.mandatory(Field::MmsVersion)?;
        self.mandatory(Field::Status)
    }

    fn acknowledge(&mut self) -> Result<()> {
        self.mandatory(Field::TransactionId)?;
        self.mandatory(Field::MmsVersion)?;
        self.optional(Field::ReportAllowed)
    }

    fn read_receipt(&mut self) -> Result<()> {
        self.mandatory(Field::MmsVersion)?;
        self.mandatory(Field::MessageId)?;
        self.mandatory(Field::To)?;
        self.mandatory(Field::From)?;
        self.optional(Field::Date)?;
        self.mandatory(Field::ReadStatus)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::headers::{PduHeaders, STATUS_RETRIEVED, VALUE_NO};

    #[test]
    fn test_unset_message_type() {
        let headers = PduHeaders::default();
        let err = compose(&headers, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMessageType(0)));
    }

    #[test]
    fn test_known_but_unsupported_message_type() {
        let headers = PduHeaders::new(MessageType::RetrieveConf);
        let err = compose(&headers, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMessageType(0x84)));
    }

    #[test]
    fn test_acknowledge() {
        let mut headers = PduHeaders::new(MessageType::Acknowledge);
        headers.set_transaction_id("T1");
        let pdu = compose(&headers, None).unwrap();
        assert_eq!(pdu, [0x8C, 0x85, 0x98, b'T', b'1', 0x00, 0x8D, 0x92]);

        headers.set_octet(Field::ReportAllowed, VALUE_NO);
        let pdu = compose(&headers, None).unwrap();
        assert_eq!(&pdu[pdu.len() - 2..], [0x91, 0x81]);
    }

    #[test]
    fn test_notify_response_requires_status() {
        let mut headers = PduHeaders::new(MessageType::NotifyResponse);
        headers.set_transaction_id("T2");
        let err = compose(&headers, None).unwrap_err();
        assert!(matches!(err, Error::MissingField(Field::Status)));

        headers.set_octet(Field::Status, STATUS_RETRIEVED);
        headers.set_octet(Field::ReportAllowed, VALUE_NO);
        let pdu = compose(&headers, None).unwrap();
        assert_eq!(&pdu[pdu.len() - 2..], [0x95, 0x81]);
    }

    #[test]
    fn test_mandatory_transaction_id() {
        let headers = PduHeaders::new(MessageType::Acknowledge);
        let err = compose(&headers, None).unwrap_err();
        assert!(matches!(err, Error::MissingField(Field::TransactionId)));
        assert!(err.is_content_error());
    }

    #[test]
    fn test_bad_recipient_field_is_dropped() {
        let mut headers = PduHeaders::new(MessageType::SendRequest);
        headers.set_transaction_id("T");
        headers.set_from("alice@x.com");
        headers.set_content_type("application/vnd.wap.multipart.mixed");
        headers.add_recipient(Field::Cc, "not an address");

        let err = compose(&headers, None).unwrap_err();
        assert!(matches!(err, Error::UnknownAddressType(_)));
        assert!(err.is_content_error());

        headers.add_recipient(Field::Bcc, "bob@x.com");
        let pdu = compose(&headers, None).unwrap();
        assert!(pdu.windows(10).any(|w| w == b"bob@x.com\0"));
        assert!(!pdu.contains(&Field::Cc.tag()));
    }

    #[test]
    fn test_configured_default_version() {
        let mut headers = PduHeaders::new(MessageType::Acknowledge);
        headers.set_transaction_id("T");
        let composer = PduComposer::new(ComposerConfig::builder().default_version(0x10).build());
        let pdu = composer.compose(&headers, None).unwrap();
        assert_eq!(&pdu[pdu.len() - 2..], [0x8D, 0x90]);
    }
}
