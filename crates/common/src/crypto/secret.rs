//! Payload encryption using XChaCha20-Poly1305
//!
//! Every payload is sealed under the key derived from its passphrase with a fresh random
//! nonce. The output is self-contained: `nonce (24 bytes) || ciphertext || tag (16 bytes)`,
//! so decryption needs nothing but the key.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of XChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 24;
/// Size of XChaCha20-Poly1305 key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;
/// Size of the Poly1305 authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
///
/// Decryption failures are deliberately opaque: a wrong key, a flipped bit and a
/// truncated blob all look the same.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("failed to generate nonce: {0}")]
    NonceGeneration(getrandom::Error),
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed (wrong passphrase or corrupted data)")]
    DecryptionFailed,
}

/// A 256-bit symmetric key for payload encryption
///
/// Wiped from memory on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Get a reference to the secret key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt data using XChaCha20-Poly1305 AEAD, with no associated data
    ///
    /// A random nonce is generated for each call. There is no shared counter between
    /// senders, so the 192-bit random nonce is what keeps nonces from repeating.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.bytes()));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes).map_err(SecretError::NonceGeneration)?;
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| SecretError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(ciphertext.as_ref());

        Ok(out)
    }

    /// Decrypt data produced by [`Secret::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::DecryptionFailed`] if the data is shorter than a nonce or
    /// the authentication tag does not verify.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE {
            return Err(SecretError::DecryptionFailed);
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.bytes()));
        cipher
            .decrypt(XNonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| SecretError::DecryptionFailed)
    }
}
