//! Share codes
//!
//! A share code is the only thing the sender hands to the receiver. It has two halves
//! joined by [`SEPARATOR`]:
//!
//! - **Code id**: a random base62 string. It is sent to the relay as a lookup key and
//!   carries no secrecy on its own.
//! - **Passphrase**: random words from [`WORDS`]. It never leaves the two endpoints and is
//!   the sole input to key derivation.
//!
//! ```text
//! k7Xm9pQ2wR-acid-bolt-cafe-dune
//! \________/ \_________________/
//!  code id       passphrase
//! ```

use std::fmt;
use std::str::FromStr;

use super::wordlist::WORDS;

/// Characters a code id is drawn from
pub const CODE_ID_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
/// Default code id length in characters
pub const DEFAULT_CODE_ID_LENGTH: usize = 10;
/// Default number of passphrase words
pub const DEFAULT_PASSPHRASE_WORDS: usize = 4;
/// Separates the code id from the passphrase and the passphrase words from each other
pub const SEPARATOR: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("failed to gather randomness: {0}")]
    GenerationFailure(getrandom::Error),
    #[error("invalid code format: {0}")]
    InvalidFormat(String),
}

/// A parsed or freshly generated share code
#[derive(Clone, PartialEq, Eq)]
pub struct Code {
    id: String,
    passphrase: String,
}

impl Code {
    /// The public lookup half
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The secret half, used for key derivation
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.id, SEPARATOR, self.passphrase)
    }
}

// The passphrase must not end up in logs by accident
impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Code")
            .field("id", &self.id)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl FromStr for Code {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodeScheme::default().parse(s)
    }
}

/// Shape of the share codes in use: code id length and passphrase word count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeScheme {
    id_length: usize,
    word_count: usize,
}

impl Default for CodeScheme {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_ID_LENGTH, DEFAULT_PASSPHRASE_WORDS)
    }
}

impl CodeScheme {
    /// Both halves always hold at least one symbol, so zero is raised to one.
    pub const fn new(id_length: usize, word_count: usize) -> Self {
        Self {
            id_length: if id_length == 0 { 1 } else { id_length },
            word_count: if word_count == 0 { 1 } else { word_count },
        }
    }

    pub fn id_length(&self) -> usize {
        self.id_length
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Generate a new code from the operating system's CSPRNG
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::GenerationFailure`] if the entropy source fails. The caller
    /// must abort; there is nothing to retry with.
    pub fn generate(&self) -> Result<Code, CodeError> {
        let mut id = String::with_capacity(self.id_length);
        for _ in 0..self.id_length {
            let idx = uniform_index(CODE_ID_ALPHABET.len())?;
            id.push(char::from(CODE_ID_ALPHABET[idx]));
        }

        let mut words = Vec::with_capacity(self.word_count);
        for _ in 0..self.word_count {
            words.push(WORDS[uniform_index(WORDS.len())?]);
        }
        let passphrase = words.join(SEPARATOR);

        Ok(Code { id, passphrase })
    }

    /// Split a combined code into its code id and passphrase
    ///
    /// The split happens at the first separator. The passphrase half must hold exactly
    /// `word_count` non-empty words.
    pub fn parse(&self, code: &str) -> Result<Code, CodeError> {
        let Some((id, passphrase)) = code.split_once(SEPARATOR) else {
            return Err(self.format_error());
        };
        if id.is_empty() || passphrase.is_empty() {
            return Err(self.format_error());
        }

        let words: Vec<&str> = passphrase.split(SEPARATOR).collect();
        if words.len() != self.word_count {
            return Err(CodeError::InvalidFormat(format!(
                "passphrase should have {} words, got {}",
                self.word_count,
                words.len()
            )));
        }
        if words.iter().any(|word| word.is_empty()) {
            return Err(CodeError::InvalidFormat(
                "passphrase contains an empty word".to_string(),
            ));
        }

        Ok(Code {
            id: id.to_string(),
            passphrase: passphrase.to_string(),
        })
    }

    fn format_error(&self) -> CodeError {
        let words: Vec<String> = (1..=self.word_count).map(|i| format!("<word{i}>")).collect();
        CodeError::InvalidFormat(format!(
            "expected <codeId>{}{}",
            SEPARATOR,
            words.join(SEPARATOR)
        ))
    }
}

/// Uniform index in `0..bound` via rejection sampling, so no modulo bias
fn uniform_index(bound: usize) -> Result<usize, CodeError> {
    debug_assert!(bound > 0 && bound <= u32::MAX as usize);
    let bound = bound as u64;
    let range = 1u64 << 32;
    // largest multiple of `bound` that fits in a u32
    let zone = range - (range % bound);

    loop {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).map_err(CodeError::GenerationFailure)?;
        let sample = u64::from(u32::from_le_bytes(buf));
        if sample < zone {
            return Ok((sample % bound) as usize);
        }
    }
}
