//! 20-byte account address

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
    /// A 32-byte word whose upper 12 bytes are not zero
    #[error("word is not a left-padded address")]
    DirtyWordPadding,
}

/// 20-byte address identifying a writer or a storage unit
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Size of an address widened to a 32-byte word
    pub const WORD_LEN: usize = 32;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 20] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength(slice.len()))?;
        Ok(Address(bytes))
    }

    /// Decode an address stored as a left-padded 32-byte word
    pub fn from_word(word: &[u8]) -> Result<Self, AddressError> {
        if word.len() != Self::WORD_LEN {
            return Err(AddressError::InvalidLength(word.len()));
        }
        let (padding, body) = word.split_at(Self::WORD_LEN - Self::LEN);
        if padding.iter().any(|b| *b != 0) {
            return Err(AddressError::DirtyWordPadding);
        }
        Self::from_slice(body)
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Widen to a left-padded 32-byte word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[Self::WORD_LEN - Self::LEN..].copy_from_slice(&self.0);
        word
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

    impl Encodable for Address {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.0);
        }
    }

    impl Decodable for Address {
        fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
            rlp.decoder().decode_value(|bytes| {
                Address::from_slice(bytes).map_err(|_| DecoderError::RlpInvalidLength)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";

    // ==================== Parsing ====================

    #[test]
    fn test_address_from_hex() {
        let addr = Address::from_hex(SAMPLE).unwrap();
        assert!(!addr.is_zero());

        let unprefixed = Address::from_hex(&SAMPLE[2..]).unwrap();
        assert_eq!(addr, unprefixed);
    }

    #[test]
    fn test_address_from_hex_mixed_case() {
        let lower = Address::from_hex(&SAMPLE.to_lowercase()).unwrap();
        let mixed = Address::from_hex(SAMPLE).unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_address_from_hex_invalid_chars() {
        let result = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aGGG");
        assert!(matches!(result, Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn test_address_from_hex_wrong_lengths() {
        assert_eq!(Address::from_hex("0x"), Err(AddressError::InvalidLength(0)));
        assert_eq!(
            Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB"),
            Err(AddressError::InvalidLength(19))
        );
        assert_eq!(
            Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d00"),
            Err(AddressError::InvalidLength(21))
        );
    }

    #[test]
    fn test_address_from_str_trims() {
        let addr: Address = format!("  {}\n", SAMPLE).parse().unwrap();
        assert_eq!(addr, Address::from_hex(SAMPLE).unwrap());
    }

    // ==================== Word conversion ====================

    #[test]
    fn test_address_word_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], addr.as_bytes());
        assert_eq!(Address::from_word(&word).unwrap(), addr);
    }

    #[test]
    fn test_address_from_word_dirty_padding() {
        let mut word = Address::from_bytes([0x11; 20]).to_word();
        word[0] = 1;
        assert_eq!(Address::from_word(&word), Err(AddressError::DirtyWordPadding));
    }

    #[test]
    fn test_address_from_word_wrong_length() {
        assert_eq!(Address::from_word(&[0u8; 20]), Err(AddressError::InvalidLength(20)));
    }

    // ==================== Formatting ====================

    #[test]
    fn test_address_display_is_lowercase() {
        let addr = Address::from_hex(SAMPLE).unwrap();
        assert_eq!(addr.to_string(), SAMPLE.to_lowercase());
        assert_eq!(
            format!("{:?}", addr),
            format!("Address({})", SAMPLE.to_lowercase())
        );
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::default(), Address::ZERO);
        assert_eq!(Address::ZERO.to_hex(), "0x0000000000000000000000000000000000000000");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_address_serde_hex_string() {
        let addr = Address::from_hex(SAMPLE).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE.to_lowercase()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
