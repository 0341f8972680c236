//! # stakemod-attest
//!
//! **Attestation layer**: the cryptography that decides who may contest whom.
//!
//! A certificate references one poster's post. It is valid when two parties
//! have signed its keccak-256 hash as a personal message:
//! 1. **The poster**: binds the certificate to a specific address
//! 2. **The trusted server**: proves the forum actually issued it
//!
//! ## Components
//!
//! - [`keccak256`] / [`personal_message_hash`]: hashing primitives
//! - [`SignatureVerifier`]: recovers the signing address of a hash
//! - [`Signer`] / [`LocalSigner`]: produces recoverable signatures
//! - [`CertificateIssuer`]: the server side, countersigns poster certificates
//! - [`CertificateVerifier`]: the two-party check run before a contestation opens

pub mod certificate;
pub mod hash;
pub mod signature;
pub mod signer;

pub use certificate::{Certificate, CertificateIssuer, CertificateVerifier, IssuedCertificate};
pub use hash::{MessageHash, address_from_public_key, keccak256, personal_message_hash};
pub use signature::{Secp256k1Verifier, Signature, SignatureVerifier};
pub use signer::{LocalSigner, Signer};
