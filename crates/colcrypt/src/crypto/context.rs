//! [`CipherContext`]: the expanded AES-256-GCM key schedule for one statement.

use aes_gcm::{aead::KeyInit, Aes256Gcm, Key};

use super::key::KeyBytes;

/// Key-derived state reused by every encrypt/decrypt call of a statement.
///
/// Built once from a [`KeyBytes`] and immutable afterwards, so it can be shared
/// by reference across all rows without locking. The expanded key is zeroed on
/// drop.
pub struct CipherContext {
    cipher: Aes256Gcm,
}

impl CipherContext {
    /// Expand `key` into a reusable context.
    pub fn derive(key: &KeyBytes) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub(super) fn cipher(&self) -> &Aes256Gcm {
        &self.cipher
    }
}

impl std::fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherContext([REDACTED])")
    }
}
