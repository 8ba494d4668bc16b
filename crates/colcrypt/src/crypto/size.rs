//! Length arithmetic between plaintext and envelope, and the [`Envelope`]
//! buffer that enforces it.

use super::{NONCE_LEN, OVERHEAD, TAG_LEN};

/// Envelope length for a plaintext of `plaintext_len` bytes.
pub fn ciphertext_length(plaintext_len: usize) -> usize {
    plaintext_len + OVERHEAD
}

/// Plaintext length carried by an envelope of `ciphertext_len` bytes, or
/// `None` if the envelope is shorter than [`OVERHEAD`].
pub fn plaintext_length(ciphertext_len: usize) -> Option<usize> {
    ciphertext_len.checked_sub(OVERHEAD)
}

/// Declared result length for an encrypt whose argument is declared with
/// `plaintext_len`. Host column lengths must be positive.
pub fn declared_ciphertext_length(plaintext_len: i64) -> i64 {
    plaintext_len.saturating_add(OVERHEAD as i64).max(1)
}

/// Declared result length for a decrypt whose argument is declared with
/// `ciphertext_len`, floored at 1.
pub fn declared_plaintext_length(ciphertext_len: i64) -> i64 {
    ciphertext_len.saturating_sub(OVERHEAD as i64).max(1)
}

/// An owned `nonce || ciphertext || tag` buffer.
///
/// Only constructible with a length of at least [`OVERHEAD`], so the region
/// accessors never go out of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope(Vec<u8>);

/// Borrowed view of an envelope split into its three regions.
#[derive(Debug)]
pub struct EnvelopeParts<'a> {
    pub nonce: &'a [u8],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8],
}

/// Mutable view used while sealing.
pub(super) struct EnvelopePartsMut<'a> {
    pub nonce: &'a mut [u8],
    pub ciphertext: &'a mut [u8],
    pub tag: &'a mut [u8],
}

impl Envelope {
    /// Zeroed buffer sized for `plaintext_len` bytes of plaintext.
    pub(super) fn for_plaintext(plaintext_len: usize) -> Self {
        Self(vec![0u8; ciphertext_length(plaintext_len)])
    }

    /// Split a borrowed envelope, or `None` if it is shorter than [`OVERHEAD`].
    pub fn parse(bytes: &[u8]) -> Option<EnvelopeParts<'_>> {
        let plaintext_len = plaintext_length(bytes.len())?;
        let (nonce, rest) = bytes.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(plaintext_len);
        debug_assert_eq!(tag.len(), TAG_LEN);
        Some(EnvelopeParts {
            nonce,
            ciphertext,
            tag,
        })
    }

    pub(super) fn parts_mut(&mut self) -> EnvelopePartsMut<'_> {
        let plaintext_len = self.plaintext_len();
        let (nonce, rest) = self.0.split_at_mut(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at_mut(plaintext_len);
        EnvelopePartsMut {
            nonce,
            ciphertext,
            tag,
        }
    }

    /// Length of the plaintext this envelope carries.
    pub fn plaintext_len(&self) -> usize {
        self.0.len() - OVERHEAD
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}
