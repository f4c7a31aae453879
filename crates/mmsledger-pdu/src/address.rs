//! Address classification for MMS address fields.
//!
//! Recipient and sender addresses carry a `/TYPE=` suffix naming their
//! family, except e-mail addresses which are sent as-is.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::encoded_string::EncodedString;
use crate::error::{Error, Result};

/// Suffix of phone-number addresses.
pub const SUFFIX_PLMN: &[u8] = b"/TYPE=PLMN";

/// Suffix of IPv4 addresses.
pub const SUFFIX_IPV4: &[u8] = b"/TYPE=IPV4";

/// Suffix of IPv6 addresses.
pub const SUFFIX_IPV6: &[u8] = b"/TYPE=IPV6";

#[allow(clippy::expect_used)]
static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").expect("valid IPv4 pattern")
});

#[allow(clippy::expect_used)]
static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9.\-]+$").expect("valid phone number pattern"));

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9 ._'"-]*<?[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+>?$"#)
        .expect("valid e-mail pattern")
});

#[allow(clippy::expect_used)]
static IPV6: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{4}(:[0-9A-Fa-f]{4}){7}$").expect("valid IPv6 pattern")
});

/// Address family of an MMS address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Phone number (public land mobile network).
    Plmn,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// Colon-separated IPv6 address.
    Ipv6,
    /// E-mail address.
    Email,
}

impl AddressType {
    /// Classifies a bare address.
    ///
    /// IPv4 is tested before phone numbers, since a dotted quad also matches
    /// the phone-number pattern. Returns `None` for unknown addresses.
    #[must_use]
    pub fn classify(address: &[u8]) -> Option<Self> {
        if IPV4.is_match(address) {
            Some(Self::Ipv4)
        } else if PHONE_NUMBER.is_match(address) {
            Some(Self::Plmn)
        } else if EMAIL.is_match(address) {
            Some(Self::Email)
        } else if IPV6.is_match(address) {
            Some(Self::Ipv6)
        } else {
            None
        }
    }

    /// Returns the type suffix appended on the wire, if any.
    #[must_use]
    pub const fn suffix(self) -> Option<&'static [u8]> {
        match self {
            Self::Plmn => Some(SUFFIX_PLMN),
            Self::Ipv4 => Some(SUFFIX_IPV4),
            Self::Ipv6 => Some(SUFFIX_IPV6),
            Self::Email => None,
        }
    }
}

/// Returns a copy of `address` with its type suffix appended.
///
/// # Errors
///
/// Returns [`Error::UnknownAddressType`] if the address matches no family.
pub fn with_type_suffix(address: &EncodedString) -> Result<EncodedString> {
    let Some(kind) = AddressType::classify(address.text()) else {
        tracing::warn!(address = %address.to_string_lossy(), "Unknown address type");
        return Err(Error::UnknownAddressType(
            address.to_string_lossy().into_owned(),
        ));
    };

    let mut typed = address.clone();
    if let Some(suffix) = kind.suffix() {
        typed.append_text(suffix);
    }
    Ok(typed)
}
