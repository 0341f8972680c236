//! Recoverable secp256k1 signatures and signer recovery.
//!
//! A [`Signature`] is 65 bytes: `r || s || v`. The recovery byte `v` is
//! accepted both raw (`0`/`1`) and in the legacy wallet encoding (`27`/`28`).
//!
//! Recovery never hashes: callers pass the exact 32-byte digest that was
//! signed. A well-formed signature over a different digest simply recovers
//! a different address; rejecting that is the caller's job.

use std::fmt;

use secp256k1::{
    Message, Secp256k1, VerifyOnly,
    ecdsa::{RecoverableSignature, RecoveryId},
};
use serde::{Deserialize, Serialize};
use stakemod_types::{Address, ModerationError, Result, constants};

use crate::hash::{MessageHash, address_from_public_key};

/// Raw recoverable signature bytes. Validated only when used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex string, with or without `0x`.
    ///
    /// # Errors
    /// Returns `InvalidSignature` if the string is not hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits)
            .map(Self)
            .map_err(|e| ModerationError::InvalidSignature {
                reason: format!("not hex: {e}"),
            })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Build from a compact signature and its recovery id, using the
    /// `27 + id` wallet encoding for `v`.
    #[must_use]
    pub(crate) fn from_recoverable(sig: &RecoverableSignature) -> Self {
        let (rec_id, compact) = sig.serialize_compact();
        let mut bytes = Vec::with_capacity(constants::SIGNATURE_LEN);
        bytes.extend_from_slice(&compact);
        // Recovery ids are always 0..=3.
        bytes.push(27 + u8::try_from(rec_id.to_i32()).unwrap_or(0));
        Self(bytes)
    }

    /// Decode into a secp256k1 recoverable signature.
    ///
    /// # Errors
    /// Returns `InvalidSignature` for a wrong length, an unknown `v`, or
    /// out-of-range `r`/`s`.
    pub fn to_recoverable(&self) -> Result<RecoverableSignature> {
        if self.0.len() != constants::SIGNATURE_LEN {
            return Err(ModerationError::InvalidSignature {
                reason: format!(
                    "expected {} bytes, got {}",
                    constants::SIGNATURE_LEN,
                    self.0.len()
                ),
            });
        }
        let v = self.0[64];
        let id = match v {
            0 | 1 => i32::from(v),
            27 | 28 => i32::from(v - 27),
            other => {
                return Err(ModerationError::InvalidSignature {
                    reason: format!("unsupported recovery byte {other}"),
                });
            }
        };
        let rec_id = RecoveryId::from_i32(id).map_err(|e| ModerationError::InvalidSignature {
            reason: e.to_string(),
        })?;
        RecoverableSignature::from_compact(&self.0[..64], rec_id).map_err(|e| {
            ModerationError::InvalidSignature {
                reason: e.to_string(),
            }
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Recovers the address that signed a message hash.
pub trait SignatureVerifier {
    /// # Errors
    /// Returns `InvalidSignature` if the signature is malformed or no
    /// public key can be recovered from it.
    fn recover_signer(&self, hash: &MessageHash, signature: &Signature) -> Result<Address>;
}

/// [`SignatureVerifier`] backed by libsecp256k1.
#[derive(Debug, Clone)]
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn recover_signer(&self, hash: &MessageHash, signature: &Signature) -> Result<Address> {
        let sig = signature.to_recoverable()?;
        let msg = Message::from_digest(hash.0);
        let public_key =
            self.secp
                .recover_ecdsa(&msg, &sig)
                .map_err(|e| ModerationError::InvalidSignature {
                    reason: format!("recovery failed: {e}"),
                })?;
        Ok(address_from_public_key(&public_key))
    }
}
