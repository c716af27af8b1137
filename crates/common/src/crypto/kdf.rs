//! Passphrase key derivation
//!
//! HKDF-SHA256 over the passphrase with a fixed, versioned salt and a fixed context
//! label. The code id is public and is never mixed in.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use super::secret::{Secret, SECRET_SIZE};

/// Salt for key derivation. Bumping the version invalidates every outstanding code.
pub const KDF_SALT: &[u8] = b"git-share-v1";
/// Context label binding derived keys to payload encryption
pub const KDF_INFO: &[u8] = b"encryption-key";

#[derive(Debug, thiserror::Error)]
pub enum KdfError {
    #[error("key derivation failed")]
    DerivationFailure,
}

/// Derive the payload encryption key from a passphrase
///
/// The same passphrase always yields the same key, so sender and receiver compute it
/// independently and it never has to travel.
pub fn derive_key(passphrase: &str) -> Result<Secret, KdfError> {
    let hkdf = Hkdf::<Sha256>::new(Some(KDF_SALT), passphrase.as_bytes());
    let mut okm = [0u8; SECRET_SIZE];
    hkdf.expand(KDF_INFO, &mut okm)
        .map_err(|_| KdfError::DerivationFailure)?;
    let secret = Secret::from(okm);
    okm.zeroize();
    Ok(secret)
}
