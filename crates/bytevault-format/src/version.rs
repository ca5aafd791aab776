//! Version tags and format versions

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-width, space-padded identifier of a framing format
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionTag([u8; 32]);

impl VersionTag {
    /// Width of every tag in bytes
    pub const LEN: usize = 32;

    /// Legacy format without a stored tag
    pub const V0: VersionTag = VersionTag(*b"BytecodeStorage_V0.0.0_________ ");
    /// First tagged format
    pub const V1: VersionTag = VersionTag(*b"BytecodeStorage_V1.0.0_________ ");
    /// Tagged format with a compression flag
    pub const V2: VersionTag = VersionTag(*b"BytecodeStorage_V2.0.0_________ ");
    /// Reported for content no known format matches
    pub const UNKNOWN: VersionTag = VersionTag(*b"UNKNOWN_VERSION_STRING_________ ");

    /// Create a tag from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        VersionTag(bytes)
    }

    /// Raw tag bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the unknown-version sentinel
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Compare against a raw slice, byte-for-byte over the full width
    pub fn matches(&self, bytes: &[u8]) -> bool {
        bytes == self.0.as_slice()
    }

    /// Tag text including padding
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Debug for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionTag({:?})", self.to_text())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Format versions this crate can write
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    /// Legacy untagged format
    V0,
    /// Tagged, author recorded
    V1,
    /// Tagged, compression flag, author recorded
    V2,
}

impl FormatVersion {
    /// Newest format
    pub const LATEST: FormatVersion = FormatVersion::V2;

    /// Tag identifying this version
    pub fn tag(&self) -> VersionTag {
        match self {
            FormatVersion::V0 => VersionTag::V0,
            FormatVersion::V1 => VersionTag::V1,
            FormatVersion::V2 => VersionTag::V2,
        }
    }

    /// Map a tag back to its version
    pub fn from_tag(tag: &VersionTag) -> Option<Self> {
        [FormatVersion::V0, FormatVersion::V1, FormatVersion::V2]
            .into_iter()
            .find(|v| v.tag() == *tag)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatVersion::V0 => "v0",
            FormatVersion::V1 => "v1",
            FormatVersion::V2 => "v2",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatVersion {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v0" | "0" => Ok(FormatVersion::V0),
            "v1" | "1" => Ok(FormatVersion::V1),
            "v2" | "2" => Ok(FormatVersion::V2),
            other => Err(FormatError::UnknownVersion(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_fixed_width_and_space_padded() {
        for tag in [VersionTag::V0, VersionTag::V1, VersionTag::V2, VersionTag::UNKNOWN] {
            assert_eq!(tag.as_bytes().len(), VersionTag::LEN);
            assert_eq!(tag.as_bytes()[31], b' ');
            assert!(tag.as_bytes().is_ascii());
        }
        assert_eq!(VersionTag::V2.to_text(), "BytecodeStorage_V2.0.0_________ ");
        assert_eq!(VersionTag::UNKNOWN.to_text(), "UNKNOWN_VERSION_STRING_________ ");
    }

    #[test]
    fn test_tag_matching_is_exact() {
        let tag = VersionTag::V1;
        assert!(tag.matches(b"BytecodeStorage_V1.0.0_________ "));
        // prefix and unpadded variants never match
        assert!(!tag.matches(b"BytecodeStorage_V1.0.0"));
        assert!(!tag.matches(b"BytecodeStorage_V1.0.0_________"));
        assert!(!tag.matches(b"BytecodeStorage_V1.0.0_________  "));
        assert!(!tag.matches(b"BytecodeStorage_V1.0.1_________ "));
    }

    #[test]
    fn test_version_tag_roundtrip() {
        for version in [FormatVersion::V0, FormatVersion::V1, FormatVersion::V2] {
            assert_eq!(FormatVersion::from_tag(&version.tag()), Some(version));
        }
        assert_eq!(FormatVersion::from_tag(&VersionTag::UNKNOWN), None);
    }

    #[test]
    fn test_format_version_parse() {
        assert_eq!("v2".parse::<FormatVersion>().unwrap(), FormatVersion::V2);
        assert_eq!("V1".parse::<FormatVersion>().unwrap(), FormatVersion::V1);
        assert_eq!(" 0 ".parse::<FormatVersion>().unwrap(), FormatVersion::V0);
        assert_eq!(
            "v3".parse::<FormatVersion>(),
            Err(FormatError::UnknownVersion("v3".to_string()))
        );
        assert_eq!(FormatVersion::LATEST.to_string(), "v2");
    }

    #[test]
    fn test_format_version_serde() {
        let json = serde_json::to_string(&FormatVersion::V1).unwrap();
        assert_eq!(json, "\"v1\"");
        let back: FormatVersion = serde_json::from_str("\"v2\"").unwrap();
        assert_eq!(back, FormatVersion::V2);
    }
}
