//! Tag values and the expected-tag guard of a write.

use std::fmt;

use bytes::Bytes;

/// Expected-tag spelling meaning "the object must not exist yet".
pub const NO_PRIOR_TAG: &str = "";

/// Legacy spelling of [`NO_PRIOR_TAG`].
pub const LEGACY_NO_PRIOR_TAG: &str = "0";

/// An opaque version marker stored in an object attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(Bytes);

impl Tag {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Tag {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<Vec<u8>> for Tag {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// What a tagged write expects to find before it applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpectedTag {
    /// The object must not exist; the write creates it.
    NoPriorVersion,
    /// The attribute must currently hold exactly this value.
    Value(Bytes),
}

impl ExpectedTag {
    /// Parse a caller-supplied expected tag.
    ///
    /// `""` always means [`ExpectedTag::NoPriorVersion`]; `"0"` does too
    /// when `zero_is_sentinel` is set.
    pub fn parse(raw: &str, zero_is_sentinel: bool) -> Self {
        if raw == NO_PRIOR_TAG || (zero_is_sentinel && raw == LEGACY_NO_PRIOR_TAG) {
            Self::NoPriorVersion
        } else {
            Self::Value(Bytes::copy_from_slice(raw.as_bytes()))
        }
    }

    pub fn is_no_prior_version(&self) -> bool {
        matches!(self, Self::NoPriorVersion)
    }
}

impl From<&str> for ExpectedTag {
    fn from(raw: &str) -> Self {
        Self::parse(raw, true)
    }
}

/// A tag read back from an object is matched byte for byte, so a stored
/// `"0"` is a value, not the sentinel. `None` (no tag) means no prior version.
impl From<Option<Tag>> for ExpectedTag {
    fn from(tag: Option<Tag>) -> Self {
        match tag {
            Some(tag) => Self::Value(tag.into_bytes()),
            None => Self::NoPriorVersion,
        }
    }
}
