//! Post certificates and the two-party attestation check.
//!
//! ## Layout
//!
//! ```text
//!   ┌──────────────────────────────┬──────────────────────┐
//!   │ poster address (32-byte word)│ post reference bytes │
//!   └──────────────────────────────┴──────────────────────┘
//! ```
//!
//! The contestation engine treats certificates as opaque bytes: it hashes
//! them and checks who signed the hash. Only issuers and observers decode
//! the embedded poster.
//!
//! ## Flow
//!
//! 1. The poster builds a certificate for its post and signs it.
//! 2. The server checks that signature against the embedded poster and
//!    countersigns ([`CertificateIssuer::countersign`]).
//! 3. A moderator presenting the certificate must carry both signatures;
//!    [`CertificateVerifier::verify`] recovers each and compares.

use serde::{Deserialize, Serialize};
use stakemod_types::{Address, ModerationError, Result};

use crate::{
    hash::{MessageHash, keccak256, personal_message_hash},
    signature::{Secp256k1Verifier, Signature, SignatureVerifier},
    signer::Signer,
};

/// Opaque certificate bytes referencing one poster's post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Certificate(pub Vec<u8>);

impl Certificate {
    /// Canonical certificate for `poster`'s post identified by `post_ref`.
    #[must_use]
    pub fn for_post(poster: Address, post_ref: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(32 + post_ref.len());
        bytes.extend_from_slice(&poster.to_word());
        bytes.extend_from_slice(post_ref);
        Self(bytes)
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Keccak-256 of the certificate bytes; the value both parties sign.
    #[must_use]
    pub fn hash(&self) -> MessageHash {
        keccak256(&self.0)
    }

    /// The embedded poster, if the leading word is a left-padded address.
    #[must_use]
    pub fn poster(&self) -> Option<Address> {
        let word: &[u8; 32] = self.0.get(..32)?.try_into().ok()?;
        if word[..12].iter().any(|b| *b != 0) {
            return None;
        }
        Some(Address::from_word(word))
    }

    /// Bytes after the poster word.
    #[must_use]
    pub fn post_ref(&self) -> &[u8] {
        self.0.get(32..).unwrap_or_default()
    }

    /// Endorse the certificate: `signer` signs its hash as a personal message.
    #[must_use]
    pub fn sign_with(&self, signer: &impl Signer) -> Signature {
        signer.sign_message(&self.hash())
    }
}

/// A certificate together with the server's countersignature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCertificate {
    pub certificate: Certificate,
    pub server_signature: Signature,
}

/// The trusted forum server that countersigns poster certificates.
#[derive(Debug, Clone)]
pub struct CertificateIssuer<S, V = Secp256k1Verifier> {
    signer: S,
    verifier: V,
}

impl<S: Signer> CertificateIssuer<S> {
    #[must_use]
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            verifier: Secp256k1Verifier::new(),
        }
    }
}

impl<S: Signer, V: SignatureVerifier> CertificateIssuer<S, V> {
    #[must_use]
    pub fn with_verifier(signer: S, verifier: V) -> Self {
        Self { signer, verifier }
    }

    /// The address contestations must be countersigned by.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Accept a post: check that the embedded poster signed `certificate`,
    /// then countersign it.
    ///
    /// # Errors
    /// - `InvalidCertificate` if no poster is embedded or the signature
    ///   recovers to someone else
    /// - `InvalidSignature` if `poster_signature` is malformed
    pub fn countersign(
        &self,
        certificate: Certificate,
        poster_signature: &Signature,
    ) -> Result<IssuedCertificate> {
        let poster = certificate
            .poster()
            .ok_or_else(|| ModerationError::InvalidCertificate {
                reason: "no poster address embedded".into(),
            })?;
        let digest = personal_message_hash(&certificate.hash());
        let signer = self.verifier.recover_signer(&digest, poster_signature)?;
        if signer != poster {
            tracing::warn!(
                poster = %poster,
                signer = %signer,
                "Refusing to countersign certificate signed by another address"
            );
            return Err(ModerationError::InvalidCertificate {
                reason: format!("poster signature recovers to {signer}, expected {poster}"),
            });
        }
        let server_signature = certificate.sign_with(&self.signer);
        tracing::debug!(poster = %poster, "Certificate countersigned");
        Ok(IssuedCertificate {
            certificate,
            server_signature,
        })
    }

    /// Issue a certificate for a post whose poster signature was checked
    /// out of band.
    #[must_use]
    pub fn issue(&self, poster: Address, post_ref: &[u8]) -> IssuedCertificate {
        let certificate = Certificate::for_post(poster, post_ref);
        let server_signature = certificate.sign_with(&self.signer);
        IssuedCertificate {
            certificate,
            server_signature,
        }
    }
}

/// Checks that a certificate was signed by both the registered server and
/// the named poster.
#[derive(Debug, Clone)]
pub struct CertificateVerifier<V = Secp256k1Verifier> {
    server: Address,
    verifier: V,
}

impl CertificateVerifier {
    #[must_use]
    pub fn new(server: Address) -> Self {
        Self {
            server,
            verifier: Secp256k1Verifier::new(),
        }
    }
}

impl<V: SignatureVerifier> CertificateVerifier<V> {
    #[must_use]
    pub fn with_verifier(server: Address, verifier: V) -> Self {
        Self { server, verifier }
    }

    /// The registered server address.
    #[must_use]
    pub fn server(&self) -> Address {
        self.server
    }

    /// Verify both signatures over `certificate`.
    ///
    /// # Errors
    /// - `InvalidSignature` if either signature is malformed
    /// - `InvalidCertificate` if the server signature does not recover to
    ///   the registered server, or the poster signature does not recover
    ///   to `poster`
    pub fn verify(
        &self,
        poster: Address,
        certificate: &[u8],
        server_signature: &Signature,
        poster_signature: &Signature,
    ) -> Result<()> {
        let digest = personal_message_hash(&keccak256(certificate));
        let server_signer = self.verifier.recover_signer(&digest, server_signature)?;
        let poster_signer = self.verifier.recover_signer(&digest, poster_signature)?;

        if server_signer != self.server {
            return Err(ModerationError::InvalidCertificate {
                reason: format!(
                    "server signature recovers to {server_signer}, expected {}",
                    self.server
                ),
            });
        }
        if poster_signer != poster {
            return Err(ModerationError::InvalidCertificate {
                reason: format!("poster signature recovers to {poster_signer}, expected {poster}"),
            });
        }
        Ok(())
    }
}
