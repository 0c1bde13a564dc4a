//! Request-signing capabilities and a secp256k1 implementation.
//!
//! The client only ever sees a key through two narrow traits:
//! [`SigningKey`] produces signatures and [`PublicKeyRef`] produces the
//! identity string sent in `x-identity`. [`EcdsaKeyPair`] implements both.

use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey as Secp256k1SigningKey};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid private key")]
    InvalidKey,
    #[error("Invalid hex encoding of private key")]
    InvalidHex,
    #[error("Failed to sign request: {0}")]
    Signing(#[source] k256::ecdsa::Error),
}

/// Produces a signature over a byte message.
pub trait SigningKey: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// A public key in the encoding the API accepts in `x-identity`.
pub trait PublicKeyRef: Send + Sync {
    fn to_identity_string(&self) -> String;
}

impl<T: SigningKey + ?Sized> SigningKey for Arc<T> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        (**self).sign(message)
    }
}

impl<T: PublicKeyRef + ?Sized> PublicKeyRef for Arc<T> {
    fn to_identity_string(&self) -> String {
        (**self).to_identity_string()
    }
}

/// A secp256k1 key pair.
///
/// Signatures are deterministic (RFC 6979) ECDSA over SHA-256, DER-encoded.
/// The identity is the hex-encoded compressed SEC1 public key.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    key: Secp256k1SigningKey,
    identity: String,
}

impl EcdsaKeyPair {
    pub fn new(key: Secp256k1SigningKey) -> Self {
        let identity = hex::encode(key.verifying_key().to_encoded_point(true).as_bytes());
        Self { key, identity }
    }

    /// Create a key pair from 32 raw private key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let key = Secp256k1SigningKey::from_slice(bytes).map_err(|_| SignerError::InvalidKey)?;
        Ok(Self::new(key))
    }

    /// Create a key pair from a hex string, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| SignerError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    pub fn verifying_key(&self) -> &k256::ecdsa::VerifyingKey {
        self.key.verifying_key()
    }
}

impl FromStr for EcdsaKeyPair {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaKeyPair")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl SigningKey for EcdsaKeyPair {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signature: Signature = self.key.try_sign(message).map_err(SignerError::Signing)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl PublicKeyRef for EcdsaKeyPair {
    fn to_identity_string(&self) -> String {
        self.identity.clone()
    }
}
