//! Signing capability.
//!
//! Key provisioning lives outside the protocol; anything that can produce a
//! recoverable signature for a 32-byte digest can act as a [`Signer`].

use std::fmt;

use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, SignOnly};
use stakemod_types::{Address, ModerationError, Result};

use crate::{
    hash::{MessageHash, address_from_public_key, personal_message_hash},
    signature::Signature,
};

/// Produces recoverable signatures on behalf of one address.
pub trait Signer {
    /// The address signatures recover to.
    fn address(&self) -> Address;

    /// Sign the digest exactly as given.
    fn sign_hash(&self, hash: &MessageHash) -> Signature;

    /// Sign `hash` as a personal message (see [`personal_message_hash`]).
    fn sign_message(&self, hash: &MessageHash) -> Signature {
        self.sign_hash(&personal_message_hash(hash))
    }
}

/// A signer holding a secp256k1 secret key in memory.
#[derive(Clone)]
pub struct LocalSigner {
    secp: Secp256k1<SignOnly>,
    secret: SecretKey,
    address: Address,
}

impl LocalSigner {
    /// # Errors
    /// Returns `InvalidSignature` if the bytes are not a valid secret key
    /// (zero or not below the curve order).
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes).map_err(|e| ModerationError::InvalidSignature {
            reason: format!("invalid secret key: {e}"),
        })?;
        Ok(Self::from_secret(secret))
    }

    #[must_use]
    pub fn from_secret(secret: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret);
        Self {
            secp,
            secret,
            address: address_from_public_key(&public_key),
        }
    }
}

/// Freshly generated signer for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl LocalSigner {
    #[must_use]
    pub fn random() -> Self {
        Self::from_secret(SecretKey::new(&mut rand::thread_rng()))
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_hash(&self, hash: &MessageHash) -> Signature {
        let msg = Message::from_digest(hash.0);
        let sig = self.secp.sign_ecdsa_recoverable(&msg, &self.secret);
        Signature::from_recoverable(&sig)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
