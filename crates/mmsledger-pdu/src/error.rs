//! Error types for PDU composition.

use std::io;

use crate::headers::Field;

/// Result type alias for PDU operations.
pub type Result<T> = std::result::Result<T, Error>;

/// PDU composition error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header field has no value. Recoverable for optional fields.
    #[error("Field not set: {0:?}")]
    FieldNotSet(Field),

    /// Mandatory header field is absent.
    #[error("Mandatory field missing: {0:?}")]
    MissingField(Field),

    /// None of To, Cc or Bcc could be encoded.
    #[error("At least one of To, Cc or Bcc is required")]
    NoRecipients,

    /// Address matches none of the known address families.
    #[error("Unknown address type: {0}")]
    UnknownAddressType(String),

    /// Message has no Content-Type header.
    #[error("Message content type is missing")]
    MissingContentType,

    /// Content type is not in the well-known table.
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    /// Body part has no content type.
    #[error("Part {index} has no content type")]
    MissingPartContentType {
        /// Index of the offending part.
        index: usize,
    },

    /// Header value cannot be represented on the wire.
    #[error("Invalid value for {field:?}: {reason}")]
    InvalidValue {
        /// Field carrying the value.
        field: Field,
        /// What is wrong with it.
        reason: String,
    },

    /// Reading an externally stored part payload failed.
    #[error("Failed to read data of part {index}: {source}")]
    PartData {
        /// Index of the offending part.
        index: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Length does not fit a uintvar integer.
    #[error("Value too large for uintvar encoding: {0}")]
    ValueTooLarge(usize),

    /// Field identifier has no encoding routine.
    #[error("Field not supported: {0:?}")]
    FieldNotSupported(Field),

    /// Message type is not one the composer can build.
    #[error("Unsupported message type: {0:#04x}")]
    UnsupportedMessageType(u8),

    /// Position marker used after its buffer stopped being live.
    #[error("Stale position marker (marked at depth {marked_depth}, now at depth {current_depth})")]
    StaleMarker {
        /// Stack depth recorded by the marker.
        marked_depth: usize,
        /// Stack depth when the length was requested.
        current_depth: usize,
    },

    /// Position marker taken in a sibling buffer that has since been closed.
    #[error("Stale position marker (taken in buffer {marked}, live buffer is {current})")]
    StaleGeneration {
        /// Buffer generation recorded by the marker.
        marked: u64,
        /// Generation of the live buffer.
        current: u64,
    },

    /// A closed buffer is still waiting to be copied into its parent.
    #[error("Buffer stack has an uncommitted copy")]
    PendingCopy,

    /// `commit_copy` called with nothing to copy.
    #[error("Buffer stack has no pending copy")]
    NoPendingCopy,

    /// `close_nested` called at the root buffer.
    #[error("Buffer stack has no open nested buffer")]
    NoOpenFrame,

    /// Output requested while nested buffers are still open.
    #[error("Buffer stack still has {0} open nested buffer(s)")]
    UnclosedBuffers(usize),

    /// Attachment header/data length accounting disagrees.
    #[error(
        "Length sanity check failed for part {index}: data {data_length} != attachment {attachment_length} - header {header_length}"
    )]
    LengthMismatch {
        /// Index of the offending part.
        index: usize,
        /// Bytes of part headers.
        header_length: usize,
        /// Payload bytes reported by the source.
        data_length: usize,
        /// Total bytes actually written for the attachment.
        attachment_length: usize,
    },
}

impl Error {
    /// Returns true if this is the recoverable "field not set" signal.
    #[must_use]
    pub const fn is_field_not_set(&self) -> bool {
        matches!(self, Self::FieldNotSet(_))
    }

    /// Returns true if required data was missing or invalid.
    #[must_use]
    pub const fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::NoRecipients
                | Self::UnknownAddressType(_)
                | Self::MissingContentType
                | Self::UnknownContentType(_)
                | Self::MissingPartContentType { .. }
                | Self::InvalidValue { .. }
                | Self::PartData { .. }
                | Self::ValueTooLarge(_)
        )
    }

    /// Returns true if this indicates a defect in the composer itself.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::StaleMarker { .. }
                | Self::StaleGeneration { .. }
                | Self::PendingCopy
                | Self::NoPendingCopy
                | Self::NoOpenFrame
                | Self::UnclosedBuffers(_)
                | Self::LengthMismatch { .. }
        )
    }

    /// Promotes "field not set" to a missing mandatory field.
    ///
    /// Other errors pass through unchanged.
    #[must_use]
    pub fn into_mandatory(self) -> Self {
        match self {
            Self::FieldNotSet(field) => Self::MissingField(field),
            other => other,
        }
    }
}
