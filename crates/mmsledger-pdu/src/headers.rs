//! PDU header fields and the header accessor.
//!
//! Field identifiers, message types and the token values of the MMS
//! encapsulation, plus [`PduHeaders`], a map-backed [`HeaderAccess`]
//! implementation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::encoded_string::EncodedString;

/// MMS version 1.0.
pub const MMS_VERSION_1_0: u8 = 0x10;
/// MMS version 1.1.
pub const MMS_VERSION_1_1: u8 = 0x11;
/// MMS version 1.2.
pub const MMS_VERSION_1_2: u8 = 0x12;
/// Version written when the header does not set one.
pub const CURRENT_MMS_VERSION: u8 = MMS_VERSION_1_2;

/// Boolean "yes" for Delivery-Report, Read-Report and Report-Allowed.
pub const VALUE_YES: u8 = 0x80;
/// Boolean "no".
pub const VALUE_NO: u8 = 0x81;

/// Priority: low.
pub const PRIORITY_LOW: u8 = 0x80;
/// Priority: normal.
pub const PRIORITY_NORMAL: u8 = 0x81;
/// Priority: high.
pub const PRIORITY_HIGH: u8 = 0x82;

/// Read-Status: read.
pub const READ_STATUS_READ: u8 = 0x80;
/// Read-Status: deleted without being read.
pub const READ_STATUS_DELETED_WITHOUT_BEING_READ: u8 = 0x81;

/// Status: expired.
pub const STATUS_EXPIRED: u8 = 0x80;
/// Status: retrieved.
pub const STATUS_RETRIEVED: u8 = 0x81;
/// Status: rejected.
pub const STATUS_REJECTED: u8 = 0x82;
/// Status: deferred.
pub const STATUS_DEFERRED: u8 = 0x83;
/// Status: unrecognised.
pub const STATUS_UNRECOGNIZED: u8 = 0x84;

/// From: an address follows.
pub const FROM_ADDRESS_PRESENT_TOKEN: u8 = 0x80;
/// From: the relay inserts the sender address.
pub const FROM_INSERT_ADDRESS_TOKEN: u8 = 0x81;
/// From value asking for the insert-address form.
pub const FROM_INSERT_ADDRESS_TOKEN_TEXT: &[u8] = b"insert-address-token";

/// Expiry/size value is an absolute date.
pub const EXPIRY_ABSOLUTE_TOKEN: u8 = 0x80;
/// Expiry/size value is relative.
pub const EXPIRY_RELATIVE_TOKEN: u8 = 0x81;

/// Header field identifiers.
///
/// The discriminant is the field tag written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Field {
    Bcc = 0x81,
    Cc = 0x82,
    ContentLocation = 0x83,
    ContentType = 0x84,
    Date = 0x85,
    DeliveryReport = 0x86,
    DeliveryTime = 0x87,
    Expiry = 0x88,
    From = 0x89,
    MessageClass = 0x8A,
    MessageId = 0x8B,
    MessageType = 0x8C,
    MmsVersion = 0x8D,
    MessageSize = 0x8E,
    Priority = 0x8F,
    ReadReport = 0x90,
    ReportAllowed = 0x91,
    ResponseStatus = 0x92,
    ResponseText = 0x93,
    SenderVisibility = 0x94,
    Status = 0x95,
    Subject = 0x96,
    To = 0x97,
    TransactionId = 0x98,
    RetrieveStatus = 0x99,
    RetrieveText = 0x9A,
    ReadStatus = 0x9B,
    ReplyCharging = 0x9C,
    ReplyChargingDeadline = 0x9D,
    ReplyChargingId = 0x9E,
    ReplyChargingSize = 0x9F,
    PreviouslySentBy = 0xA0,
    PreviouslySentDate = 0xA1,
}

impl Field {
    /// Returns the wire tag of the field.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// MMS message types (X-Mms-Message-Type values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// m-send-req
    SendRequest,
    /// m-send-conf
    SendConf,
    /// m-notification-ind
    Notification,
    /// m-notifyresp-ind
    NotifyResponse,
    /// m-retrieve-conf
    RetrieveConf,
    /// m-acknowledge-ind
    Acknowledge,
    /// m-delivery-ind
    DeliveryInd,
    /// m-read-rec-ind
    ReadReceipt,
    /// m-read-orig-ind
    ReadOrigInd,
}

impl MessageType {
    /// Returns the wire value of the message type.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::SendRequest => 0x80,
            Self::SendConf => 0x81,
            Self::Notification => 0x82,
            Self::NotifyResponse => 0x83,
            Self::RetrieveConf => 0x84,
            Self::Acknowledge => 0x85,
            Self::DeliveryInd => 0x86,
            Self::ReadReceipt => 0x87,
            Self::ReadOrigInd => 0x88,
        }
    }

    /// Parses a wire value.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x80 => Some(Self::SendRequest),
            0x81 => Some(Self::SendConf),
            0x82 => Some(Self::Notification),
            0x83 => Some(Self::NotifyResponse),
            0x84 => Some(Self::RetrieveConf),
            0x85 => Some(Self::Acknowledge),
            0x86 => Some(Self::DeliveryInd),
            0x87 => Some(Self::ReadReceipt),
            0x88 => Some(Self::ReadOrigInd),
            _ => None,
        }
    }

    /// Returns true if the composer can build this message type.
    #[must_use]
    pub const fn is_composable(self) -> bool {
        matches!(
            self,
            Self::SendRequest
                | Self::Notification
                | Self::NotifyResponse
                | Self::Acknowledge
                | Self::ReadReceipt
        )
    }
}

/// Well-known message classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// Person-to-person message.
    Personal,
    /// Advertisement.
    Advertisement,
    /// Informational message.
    Informational,
    /// Automatically generated message.
    Auto,
}

impl MessageClass {
    /// Parses the class text.
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Option<Self> {
        match text {
            b"personal" => Some(Self::Personal),
            b"advertisement" => Some(Self::Advertisement),
            b"informational" => Some(Self::Informational),
            b"auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Returns the class token.
    #[must_use]
    pub const fn octet(self) -> u8 {
        match self {
            Self::Personal => 0x80,
            Self::Advertisement => 0x81,
            Self::Informational => 0x82,
            Self::Auto => 0x83,
        }
    }

    /// Returns the class text.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Personal => b"personal",
            Self::Advertisement => b"advertisement",
            Self::Informational => b"informational",
            Self::Auto => b"auto",
        }
    }
}

/// Read access to typed header values.
///
/// Absent values are reported as `0` for octets and `None` otherwise.
pub trait HeaderAccess {
    /// Returns an octet value, or `0` if unset.
    fn octet(&self, field: Field) -> u8;

    /// Returns a text value.
    fn text_string(&self, field: Field) -> Option<&[u8]>;

    /// Returns a long-integer value. `-1` also means unset.
    fn long_integer(&self, field: Field) -> Option<i64>;

    /// Returns an encoded-string value.
    fn encoded_string(&self, field: Field) -> Option<&EncodedString>;

    /// Returns a multi-valued encoded-string field (address lists).
    fn encoded_strings(&self, field: Field) -> Option<&[EncodedString]>;
}

/// A stored header value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderValue {
    /// Single octet (types, flags, status codes).
    Octet(u8),
    /// Raw text.
    Text(Vec<u8>),
    /// Long integer (dates, sizes, expiry).
    Long(i64),
    /// One charset-tagged string.
    Encoded(EncodedString),
    /// Several charset-tagged strings.
    EncodedList(Vec<EncodedString>),
}

/// Header map for one PDU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PduHeaders {
    values: HashMap<Field, HeaderValue>,
}

impl PduHeaders {
    /// Creates headers for the given message type.
    #[must_use]
    pub fn new(message_type: MessageType) -> Self {
        let mut headers = Self::default();
        headers.set_octet(Field::MessageType, message_type.tag());
        headers
    }

    /// Returns the message type, if set and known.
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_tag(self.octet(Field::MessageType))
    }

    /// Returns the stored value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&HeaderValue> {
        self.values.get(&field)
    }

    /// Returns true if the field has a value.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: Field) -> Option<HeaderValue> {
        self.values.remove(&field)
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sets an octet field. `0` clears it.
    pub fn set_octet(&mut self, field: Field, value: u8) {
        if value == 0 {
            self.values.remove(&field);
        } else {
            self.values.insert(field, HeaderValue::Octet(value));
        }
    }

    /// Sets a text field.
    pub fn set_text_string(&mut self, field: Field, value: impl Into<Vec<u8>>) {
        self.values.insert(field, HeaderValue::Text(value.into()));
    }

    /// Sets a long-integer field. `-1` clears it.
    pub fn set_long_integer(&mut self, field: Field, value: i64) {
        if value == -1 {
            self.values.remove(&field);
        } else {
            self.values.insert(field, HeaderValue::Long(value));
        }
    }

    /// Sets an encoded-string field.
    pub fn set_encoded_string(&mut self, field: Field, value: impl Into<EncodedString>) {
        self.values
            .insert(field, HeaderValue::Encoded(value.into()));
    }

    /// Replaces a multi-valued field.
    pub fn set_encoded_strings(&mut self, field: Field, values: Vec<EncodedString>) {
        self.values.insert(field, HeaderValue::EncodedList(values));
    }

    /// Appends to a multi-valued field.
    ///
    /// A single-valued entry under the same field is converted to a list.
    pub fn append_encoded_string(&mut self, field: Field, value: impl Into<EncodedString>) {
        let value = value.into();
        match self.values.remove(&field) {
            Some(HeaderValue::EncodedList(mut list)) => {
                list.push(value);
                self.values.insert(field, HeaderValue::EncodedList(list));
            }
            Some(HeaderValue::Encoded(first)) => {
                self.values
                    .insert(field, HeaderValue::EncodedList(vec![first, value]));
            }
            _ => {
                self.values
                    .insert(field, HeaderValue::EncodedList(vec![value]));
            }
        }
    }

    /// Sets the Date field from a timestamp, in seconds.
    pub fn set_date_time(&mut self, date: DateTime<Utc>) {
        self.set_long_integer(Field::Date, date.timestamp());
    }

    /// Sets the Transaction-ID.
    pub fn set_transaction_id(&mut self, id: impl Into<Vec<u8>>) {
        self.set_text_string(Field::TransactionId, id);
    }

    /// Sets the Message-ID.
    pub fn set_message_id(&mut self, id: impl Into<Vec<u8>>) {
        self.set_text_string(Field::MessageId, id);
    }

    /// Sets the sender address.
    pub fn set_from(&mut self, address: impl Into<EncodedString>) {
        self.set_encoded_string(Field::From, address);
    }

    /// Adds a recipient to To, Cc or Bcc.
    pub fn add_recipient(&mut self, field: Field, address: impl Into<EncodedString>) {
        self.append_encoded_string(field, address);
    }

    /// Sets the Subject.
    pub fn set_subject(&mut self, subject: impl Into<EncodedString>) {
        self.set_encoded_string(Field::Subject, subject);
    }

    /// Sets the message Content-Type.
    pub fn set_content_type(&mut self, content_type: impl Into<Vec<u8>>) {
        self.set_text_string(Field::ContentType, content_type);
    }

    /// Sets the Message-Class to a well-known class.
    pub fn set_message_class(&mut self, class: MessageClass) {
        self.set_text_string(Field::MessageClass, class.as_bytes());
    }
}

impl HeaderAccess for PduHeaders {
    fn octet(&self, field: Field) -> u8 {
        match self.values.get(&field) {
            Some(HeaderValue::Octet(value)) => *value,
            _ => 0,
        }
    }

    fn text_string(&self, field: Field) -> Option<&[u8]> {
        match self.values.get(&field) {
            Some(HeaderValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    fn long_integer(&self, field: Field) -> Option<i64> {
        match self.values.get(&field) {
            Some(HeaderValue::Long(value)) => Some(*value),
            _ => None,
        }
    }

    fn encoded_string(&self, field: Field) -> Option<&EncodedString> {
        match self.values.get(&field) {
            Some(HeaderValue::Encoded(value)) => Some(value),
            Some(HeaderValue::EncodedList(values)) => values.first(),
            _ => None,
        }
    }

    fn encoded_strings(&self, field: Field) -> Option<&[EncodedString]> {
        match self.values.get(&field) {
            Some(HeaderValue::EncodedList(values)) => Some(values),
            Some(HeaderValue::Encoded(value)) => Some(std::slice::from_ref(value)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_field_tags() {
        assert_eq!(Field::Bcc.tag(), 0x81);
        assert_eq!(Field::MessageType.tag(), 0x8C);
        assert_eq!(Field::TransactionId.tag(), 0x98);
        assert_eq!(Field::PreviouslySentDate.tag(), 0xA1);
    }

    #[test]
    fn test_message_type_round_trip() {
        for tag in 0x80..=0x88 {
            let kind = MessageType::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(MessageType::from_tag(0x89), None);
        assert_eq!(MessageType::from_tag(0), None);
    }

    #[test]
    fn test_composable_types() {
        assert!(MessageType::SendRequest.is_composable());
        assert!(MessageType::ReadReceipt.is_composable());
        assert!(!MessageType::SendConf.is_composable());
        assert!(!MessageType::RetrieveConf.is_composable());
    }

    #[test]
    fn test_message_class() {
        assert_eq!(
            MessageClass::from_bytes(b"personal"),
            Some(MessageClass::Personal)
        );
        assert_eq!(MessageClass::from_bytes(b"Personal"), None);
        assert_eq!(MessageClass::Auto.octet(), 0x83);
        assert_eq!(MessageClass::Informational.as_bytes(), b"informational");
    }

    #[test]
    fn test_new_sets_message_type() {
        let headers = PduHeaders::new(MessageType::Acknowledge);
        assert_eq!(headers.octet(Field::MessageType), 0x85);
        assert_eq!(headers.message_type(), Some(MessageType::Acknowledge));
    }

    #[test]
    fn test_unset_values() {
        let headers = PduHeaders::default();
        assert!(headers.is_empty());
        assert_eq!(headers.octet(Field::Priority), 0);
        assert_eq!(headers.text_string(Field::MessageId), None);
        assert_eq!(headers.long_integer(Field::Date), None);
        assert!(headers.encoded_string(Field::Subject).is_none());
        assert!(headers.encoded_strings(Field::To).is_none());
    }

    #[test]
    fn test_sentinels_clear_fields() {
        let mut headers = PduHeaders::default();
        headers.set_octet(Field::Priority, PRIORITY_HIGH);
        headers.set_long_integer(Field::Expiry, 3600);
        assert_eq!(headers.len(), 2);

        headers.set_octet(Field::Priority, 0);
        headers.set_long_integer(Field::Expiry, -1);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_typed_access_ignores_other_kinds() {
        let mut headers = PduHeaders::default();
        headers.set_text_string(Field::Status, "retrieved");
        assert_eq!(headers.octet(Field::Status), 0);
        assert_eq!(headers.long_integer(Field::Status), None);
    }

    #[test]
    fn test_recipients() {
        let mut headers = PduHeaders::default();
        headers.add_recipient(Field::To, "bob@x.com");
        headers.add_recipient(Field::To, "+15551234");
        let to = headers.encoded_strings(Field::To).unwrap();
        assert_eq!(to.len(), 2);
        assert_eq!(to[1].text(), b"+15551234");
    }

    #[test]
    fn test_single_value_is_a_list_of_one() {
        let mut headers = PduHeaders::default();
        headers.set_encoded_string(Field::To, "bob@x.com");
        assert_eq!(headers.encoded_strings(Field::To).unwrap().len(), 1);

        headers.append_encoded_string(Field::To, "carol@x.com");
        let to = headers.encoded_strings(Field::To).unwrap();
        assert_eq!(to[0].text(), b"bob@x.com");
        assert_eq!(to[1].text(), b"carol@x.com");
    }

    #[test]
    fn test_set_date_time() {
        let mut headers = PduHeaders::default();
        let date = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        headers.set_date_time(date);
        assert_eq!(headers.long_integer(Field::Date), Some(1_700_000_000));
    }

    #[test]
    fn test_message_class_setter() {
        let mut headers = PduHeaders::default();
        headers.set_message_class(MessageClass::Advertisement);
        assert_eq!(
            headers.text_string(Field::MessageClass),
            Some(&b"advertisement"[..])
        );
    }
}
