//! Cryptographic primitives for git-share
//!
//! This module provides everything the two endpoints need to exchange a payload through
//! a relay that only ever sees ciphertext:
//!
//! - **Share codes**: a public lookup id plus a secret word passphrase
//! - **Key derivation**: HKDF-SHA256 from the passphrase to a 256-bit key
//! - **Encryption**: XChaCha20-Poly1305 with a random nonce per payload
//!
//! # Security Model
//!
//! The relay stores blobs under the code id only. The passphrase never leaves the
//! sender and receiver; both derive the same key from it independently. Anyone holding
//! just the code id can at most consume (and thereby destroy) the blob, never read it.

mod code;
mod kdf;
mod secret;
mod wordlist;

pub use code::{
    Code, CodeError, CodeScheme, CODE_ID_ALPHABET, DEFAULT_CODE_ID_LENGTH,
    DEFAULT_PASSPHRASE_WORDS, SEPARATOR,
};
pub use kdf::{derive_key, KdfError, KDF_INFO, KDF_SALT};
pub use secret::{Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};
pub use wordlist::{WORDS, WORD_COUNT};
