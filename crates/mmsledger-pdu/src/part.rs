//! Message body parts.
//!
//! A part's payload is either held in memory or stored elsewhere and pulled
//! through a [`PartResolver`] while the body is written.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// Part parameter: charset.
pub const PARAM_CHARSET: u8 = 0x81;
/// Part parameter: name.
pub const PARAM_NAME: u8 = 0x85;
/// Multipart/related parameter: type of the root part.
pub const PARAM_TYPE: u8 = 0x89;
/// Multipart/related parameter: Content-ID of the root part.
pub const PARAM_START: u8 = 0x8A;
/// Part header: Content-Location.
pub const PARAM_CONTENT_LOCATION: u8 = 0x8E;
/// Part header: Content-ID.
pub const PARAM_CONTENT_ID: u8 = 0xC0;

/// Payload of a body part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartData {
    /// Bytes held in memory.
    Inline(Vec<u8>),
    /// Locator handed to the [`PartResolver`].
    External(String),
}

/// A single body part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PduPart {
    /// Content type, e.g. `image/jpeg`.
    pub content_type: Option<Vec<u8>>,
    /// Name parameter.
    pub name: Option<Vec<u8>>,
    /// File name from the content disposition.
    pub filename: Option<Vec<u8>>,
    /// Content-Location.
    pub content_location: Option<Vec<u8>>,
    /// Content-ID, with or without angle brackets.
    pub content_id: Option<Vec<u8>>,
    /// Charset MIBenum; 0 when unset.
    pub charset: u32,
    /// Payload.
    pub data: PartData,
}

impl PduPart {
    /// Creates a part with no content type.
    #[must_use]
    pub const fn new(data: PartData) -> Self {
        Self {
            content_type: None,
            name: None,
            filename: None,
            content_location: None,
            content_id: None,
            charset: 0,
            data,
        }
    }

    /// Creates a part with in-memory data.
    #[must_use]
    pub fn inline(content_type: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(PartData::Inline(data.into())).with_content_type(content_type)
    }

    /// Creates a part whose data is opened through a resolver.
    #[must_use]
    pub fn external(content_type: impl Into<Vec<u8>>, locator: impl Into<String>) -> Self {
        Self::new(PartData::External(locator.into())).with_content_type(content_type)
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the name parameter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Vec<u8>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<Vec<u8>>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the Content-Location.
    #[must_use]
    pub fn with_content_location(mut self, location: impl Into<Vec<u8>>) -> Self {
        self.content_location = Some(location.into());
        self
    }

    /// Sets the Content-ID.
    #[must_use]
    pub fn with_content_id(mut self, id: impl Into<Vec<u8>>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    /// Sets the charset.
    #[must_use]
    pub const fn with_charset(mut self, charset: u32) -> Self {
        self.charset = charset;
        self
    }
}

/// Ordered list of body parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PduBody {
    parts: Vec<PduPart>,
}

impl PduBody {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a part.
    pub fn push(&mut self, part: PduPart) {
        self.parts.push(part);
    }

    /// Appends a part, builder style.
    #[must_use]
    pub fn with_part(mut self, part: PduPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Returns the parts in order.
    #[must_use]
    pub fn parts(&self) -> &[PduPart] {
        &self.parts
    }

    /// Returns the part at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PduPart> {
        self.parts.get(index)
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the body has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromIterator<PduPart> for PduBody {
    fn from_iter<I: IntoIterator<Item = PduPart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

/// Opens the payload of externally stored parts.
///
/// The returned reader is dropped as soon as the part is written, on success
/// and on failure.
pub trait PartResolver {
    /// Opens the data behind `locator`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the data cannot be found or opened.
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read + '_>>;
}

impl<F, R> PartResolver for F
where
    F: Fn(&str) -> io::Result<R>,
    R: Read + 'static,
{
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self(locator)?))
    }
}

impl PartResolver for HashMap<String, Vec<u8>> {
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read + '_>> {
        self.get(locator)
            .map(|data| Box::new(Cursor::new(data.as_slice())) as Box<dyn Read + '_>)
            .ok_or_else(|| not_found(locator))
    }
}

/// Resolver for bodies without external parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl PartResolver for NoResolver {
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read + '_>> {
        Err(not_found(locator))
    }
}

fn not_found(locator: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no data for part locator {locator:?}"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn read_all(mut reader: Box<dyn Read + '_>) -> Vec<u8> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_part_builders() {
        let part = PduPart::inline("text/plain", "hello")
            .with_name("hello.txt")
            .with_content_id("<0>")
            .with_charset(106);
        assert_eq!(part.content_type.as_deref(), Some(&b"text/plain"[..]));
        assert_eq!(part.name.as_deref(), Some(&b"hello.txt"[..]));
        assert_eq!(part.content_id.as_deref(), Some(&b"<0>"[..]));
        assert_eq!(part.charset, 106);
        assert_eq!(part.data, PartData::Inline(b"hello".to_vec()));
    }

    #[test]
    fn test_external_part() {
        let part = PduPart::external("image/jpeg", "content://parts/7");
        assert_eq!(part.data, PartData::External("content://parts/7".into()));
        assert!(part.name.is_none());
        assert_eq!(part.charset, 0);
    }

    #[test]
    fn test_body() {
        let body: PduBody = [
            PduPart::inline("text/plain", "a"),
            PduPart::inline("text/plain", "b"),
        ]
        .into_iter()
        .collect();
        assert_eq!(body.len(), 2);
        assert!(body.get(2).is_none());

        let body = PduBody::new().with_part(PduPart::inline("text/plain", "c"));
        assert_eq!(body.parts().len(), 1);
        assert!(PduBody::new().is_empty());
    }

    #[test]
    fn test_map_resolver() {
        let mut store = HashMap::new();
        store.insert("part-1".to_string(), b"payload".to_vec());
        assert_eq!(read_all(store.open("part-1").unwrap()), b"payload");

        let err = store.open("part-2").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |locator: &str| -> io::Result<Cursor<Vec<u8>>> {
            Ok(Cursor::new(locator.as_bytes().to_vec()))
        };
        assert_eq!(read_all(resolver.open("abc").unwrap()), b"abc");
    }

    #[test]
    fn test_no_resolver() {
        let err = NoResolver.open("anything").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
