//! # mmsledger-pdu
//!
//! Binary MMS PDU composer (WAP-209 / OMA MMS encapsulation).
//!
//! ## Features
//!
//! - **Message types**: send request, notification, notify response,
//!   acknowledge and read receipt
//! - **Single pass**: length prefixes are spliced in through a nested
//!   [`BufferStack`], no size pre-computation
//! - **Addresses**: phone, e-mail, IPv4 and IPv6 addresses typed automatically
//! - **Bodies**: multipart bodies with inline or streamed part data
//!
//! ## Quick Start
//!
//! ### Composing a Send Request
//!
//! ```
//! use mmsledger_pdu::{Field, MessageType, PduBody, PduHeaders, PduPart, compose};
//!
//! let mut headers = PduHeaders::new(MessageType::SendRequest);
//! headers.set_transaction_id("T1");
//! headers.set_from("alice@example.com");
//! headers.add_recipient(Field::To, "+1-555-1234");
//! headers.set_subject("Hello");
//! headers.set_content_type("application/vnd.wap.multipart.related");
//!
//! let body = PduBody::new()
//!     .with_part(PduPart::inline("application/smil", "<smil/>").with_content_id("smil"))
//!     .with_part(PduPart::inline("text/plain", "Hi Bob").with_charset(106));
//!
//! let pdu = compose(&headers, Some(&body))?;
//! assert_eq!(pdu[0], 0x8C);
//! # Ok::<(), mmsledger_pdu::Error>(())
//! ```
//!
//! ### Streaming Part Data
//!
//! ```ignore
//! use std::fs::File;
//! use mmsledger_pdu::{ComposerConfig, PduComposer};
//!
//! let open = |path: &str| File::open(path);
//! let composer = PduComposer::with_resolver(ComposerConfig::default(), &open);
//! let pdu = composer.compose(&headers, Some(&body))?;
//! ```
//!
//! ### Primitive Encodings
//!
//! ```
//! use mmsledger_pdu::encoding::{write_uintvar, write_value_length};
//!
//! let mut buf = Vec::new();
//! write_value_length(&mut buf, 200);
//! assert_eq!(buf, [31, 0x81, 0x48]);
//!
//! buf.clear();
//! write_uintvar(&mut buf, 0x80);
//! assert_eq!(buf, [0x81, 0x00]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod compose;
mod config;
mod content_type;
mod encoded_string;
mod error;
mod headers;
mod part;
mod stack;

pub mod encoding;

pub use address::{AddressType, SUFFIX_IPV4, SUFFIX_IPV6, SUFFIX_PLMN, with_type_suffix};
pub use compose::{PduComposer, compose};
pub use config::{ComposerConfig, ComposerConfigBuilder, DEFAULT_BLOCK_SIZE, DEFAULT_PART_NAME};
pub use content_type::{
    CONTENT_TYPES, MULTIPART_MIXED, MULTIPART_RELATED, content_type_index, content_type_name,
};
pub use encoded_string::{CHARSET_US_ASCII, CHARSET_UTF_8, EncodedString, write_encoded_string};
pub use error::{Error, Result};
pub use headers::{
    CURRENT_MMS_VERSION, EXPIRY_ABSOLUTE_TOKEN, EXPIRY_RELATIVE_TOKEN, FROM_ADDRESS_PRESENT_TOKEN,
    FROM_INSERT_ADDRESS_TOKEN, FROM_INSERT_ADDRESS_TOKEN_TEXT, Field, HeaderAccess, HeaderValue,
    MMS_VERSION_1_0, MMS_VERSION_1_1, MMS_VERSION_1_2, MessageClass, MessageType, PRIORITY_HIGH,
    PRIORITY_LOW, PRIORITY_NORMAL, PduHeaders, READ_STATUS_DELETED_WITHOUT_BEING_READ,
    READ_STATUS_READ, STATUS_DEFERRED, STATUS_EXPIRED, STATUS_REJECTED, STATUS_RETRIEVED,
    STATUS_UNRECOGNIZED, VALUE_NO, VALUE_YES,
};
pub use part::{
    NoResolver, PARAM_CHARSET, PARAM_CONTENT_ID, PARAM_CONTENT_LOCATION, PARAM_NAME, PARAM_START,
    PARAM_TYPE, PartData, PartResolver, PduBody, PduPart,
};
pub use stack::{BufferStack, PositionMarker};
