//! Keccak-256 hashing and address derivation.

use std::fmt;

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use stakemod_types::{Address, constants};

/// A 32-byte message hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHash(pub [u8; 32]);

impl MessageHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for MessageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> MessageHash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    MessageHash(out)
}

/// Digest a wallet signs when asked to sign `hash` as a personal message:
/// `keccak256("\x19Ethereum Signed Message:\n32" || hash)`.
#[must_use]
pub fn personal_message_hash(hash: &MessageHash) -> MessageHash {
    let mut hasher = Keccak256::new();
    hasher.update(constants::PERSONAL_MESSAGE_PREFIX);
    hasher.update(hash.0);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    MessageHash(out)
}

/// Address of a public key: the last 20 bytes of the keccak-256 of its
/// uncompressed encoding without the `0x04` tag.
#[must_use]
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_word(&hash.0)
}
