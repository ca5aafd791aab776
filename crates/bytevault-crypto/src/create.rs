//! CREATE address derivation

use crate::hash::keccak256;
use bytevault_primitives::Address;
use rlp::RlpStream;

/// Address of the unit deployed by `sender` at `nonce`:
/// `keccak256(rlp([sender, nonce]))[12..]`
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    let hash = keccak256(&stream.out());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_address_known_vectors() {
        // Well-known mainnet deployer used in many tooling test suites
        let sender = Address::from_hex("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0").unwrap();
        assert_eq!(
            create_address(&sender, 0).to_hex(),
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"
        );
        assert_eq!(
            create_address(&sender, 1).to_hex(),
            "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8"
        );
        assert_eq!(
            create_address(&sender, 2).to_hex(),
            "0xf778b86fa74e846c4f0a1fbd1335fe81c00a0c91"
        );
    }

    #[test]
    fn test_create_address_sequential_nonces_unique() {
        let sender = Address::from_bytes([0x42; 20]);
        let mut seen = std::collections::HashSet::new();
        for nonce in 0..256u64 {
            assert!(seen.insert(create_address(&sender, nonce)));
        }
    }

    #[test]
    fn test_create_address_depends_on_sender() {
        let a = Address::from_bytes([0x01; 20]);
        let b = Address::from_bytes([0x02; 20]);
        assert_ne!(create_address(&a, 1), create_address(&b, 1));
    }
}
