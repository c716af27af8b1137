/**
 * Cryptographic types and operations.
 *  - Share codes (lookup id + passphrase)
 *  - Passphrase key derivation
 *  - Payload encryption
 */
pub mod crypto;
/**
 * Helper for reporting build version information
 *  at runtime.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{
        derive_key, Code, CodeError, CodeScheme, KdfError, Secret, SecretError,
    };
    pub use crate::version::{build_info, BuildInfo};
}
