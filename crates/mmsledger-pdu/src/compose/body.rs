//! Multipart body encoding.
//!
//! ```text
//! body      = content-type-group part-count *part
//! part      = uintvar(header-length) uintvar(data-length) headers data
//! headers   = value-length(type-params) type-params [content-id] [content-location]
//! ```

use std::borrow::Cow;
use std::io::{self, Read};

use super::Context;
use crate::content_type::content_type_index;
use crate::encoding::{
    SHORT_INTEGER_MAX, checked_length, write_octet, write_quoted_string, write_short_integer,
    write_text_string, write_uintvar,
};
use crate::error::{Error, Result};
use crate::headers::{Field, HeaderAccess};
use crate::part::{
    PARAM_CHARSET, PARAM_CONTENT_ID, PARAM_CONTENT_LOCATION, PARAM_NAME, PARAM_START, PARAM_TYPE,
    PartData, PduBody, PduPart,
};

impl<H: HeaderAccess + ?Sized> Context<'_, H> {
    /// Appends the message body, starting with its content type.
    pub(super) fn append_body(&mut self, body: Option<&PduBody>) -> Result<()> {
        let content_type = self
            .headers
            .text_string(Field::ContentType)
            .ok_or(Error::MissingContentType)?;
        let Some(type_index) = content_type_index(content_type) else {
            let content_type = String::from_utf8_lossy(content_type).into_owned();
            tracing::warn!(%content_type, "Message content type is not well-known");
            return Err(Error::UnknownContentType(content_type));
        };

        let parts = body.map_or(&[][..], PduBody::parts);
        let Some(first) = parts.first() else {
            write_short_integer(self.stack.out(), type_index);
            write_uintvar(self.stack.out(), 0);
            return Ok(());
        };

        let root_type = first
            .content_type
            .as_deref()
            .ok_or(Error::MissingPartContentType { index: 0 })?;
        self.stack.write_value_length_group(|s| {
            write_short_integer(s.out(), type_index);
            if let Some(start) = &first.content_id {
                write_octet(s.out(), PARAM_START);
                write_text_string(s.out(), &angle_bracketed(start));
            }
            write_octet(s.out(), PARAM_TYPE);
            write_text_string(s.out(), root_type);
            Ok(())
        })?;

        write_uintvar(self.stack.out(), checked_length(parts.len())?);
        for (index, part) in parts.iter().enumerate() {
            self.append_part(index, part)?;
        }
        Ok(())
    }

    fn append_part(&mut self, index: usize, part: &PduPart) -> Result<()> {
        let content_type = part
            .content_type
            .as_deref()
            .ok_or(Error::MissingPartContentType { index })?;
        let charset = match part.charset {
            0 => None,
            charset => Some(
                u8::try_from(charset)
                    .ok()
                    .filter(|c| *c <= SHORT_INTEGER_MAX)
                    .ok_or_else(|| Error::InvalidValue {
                        field: Field::ContentType,
                        reason: format!("part {index} charset {charset} is not a short integer"),
                    })?,
            ),
        };
        let config = self.config;
        let name = part
            .name
            .as_deref()
            .or(part.filename.as_deref())
            .or(part.content_location.as_deref())
            .unwrap_or(config.default_part_name.as_bytes());

        self.stack.open_nested()?;
        let attachment = self.stack.mark();

        self.stack.write_value_length_group(|s| {
            match content_type_index(content_type) {
                Some(type_index) => write_short_integer(s.out(), type_index),
                None => write_text_string(s.out(), content_type),
            }
            write_octet(s.out(), PARAM_NAME);
            write_text_string(s.out(), name);
            if let Some(charset) = charset {
                write_octet(s.out(), PARAM_CHARSET);
                write_short_integer(s.out(), charset);
            }
            Ok(())
        })?;

        if let Some(id) = &part.content_id {
            write_octet(self.stack.out(), PARAM_CONTENT_ID);
            write_quoted_string(self.stack.out(), &angle_bracketed(id));
        }
        if let Some(location) = &part.content_location {
            write_octet(self.stack.out(), PARAM_CONTENT_LOCATION);
            write_text_string(self.stack.out(), location);
        }

        let header_length = attachment.length(&self.stack)?;
        let data_length = match &part.data {
            PartData::Inline(data) => {
                self.stack.write(data);
                data.len()
            }
            PartData::External(locator) => self.copy_external(index, locator)?,
        };

        let attachment_length = attachment.length(&self.stack)?;
        if attachment_length.checked_sub(header_length) != Some(data_length) {
            tracing::error!(
                index,
                header_length,
                data_length,
                attachment_length,
                "Part length sanity check failed"
            );
            return Err(Error::LengthMismatch {
                index,
                header_length,
                data_length,
                attachment_length,
            });
        }

        self.stack.close_nested()?;
        write_uintvar(self.stack.out(), checked_length(header_length)?);
        write_uintvar(self.stack.out(), checked_length(data_length)?);
        self.stack.commit_copy()?;

        tracing::trace!(index, header_length, data_length, "Wrote body part");
        Ok(())
    }

    /// Copies external part data block by block, returning the byte count
    /// the reader reported.
    fn copy_external(&mut self, index: usize, locator: &str) -> Result<usize> {
        let mut reader = self
            .resolver
            .open(locator)
            .map_err(|source| Error::PartData { index, source })?;

        let mut block = vec![0u8; self.config.block_size.max(1)];
        let mut total = 0usize;
        loop {
            let read = match reader.read(&mut block) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(Error::PartData { index, source }),
            };
            self.stack.write(&block[..read.min(block.len())]);
            total += read;
        }
        Ok(total)
    }
}

/// Wraps a Content-ID in angle brackets unless it already has them.
fn angle_bracketed(id: &[u8]) -> Cow<'_, [u8]> {
    if id.len() >= 2 && id.starts_with(b"<") && id.ends_with(b">") {
        Cow::Borrowed(id)
    } else {
        let mut wrapped = Vec::with_capacity(id.len() + 2);
        wrapped.push(b'<');
        wrapped.extend_from_slice(id);
        wrapped.push(b'>');
        Cow::Owned(wrapped)
    }
}
