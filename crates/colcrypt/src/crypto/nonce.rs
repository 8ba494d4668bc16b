//! Per-batch nonce sequence.
//!
//! Each encrypting batch draws one random 96-bit starting point from the OS
//! CSPRNG and then counts upwards, so randomness is paid for once per batch
//! rather than once per row. Uniqueness within a batch follows from the
//! counter; uniqueness across batches and across parallel instances relies on
//! the 96-bit random seed.
//!
//! The counter is little-endian: byte 0 is the least significant. The nonce is
//! carried verbatim in the envelope, so decryption never interprets it.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use super::NONCE_LEN;

/// A 96-bit GCM nonce.
pub type Nonce = [u8; NONCE_LEN];

/// Owns the nonce for one batch-processing loop.
///
/// Not `Clone`: two copies of a sequencer would hand out the same nonces.
#[derive(Debug)]
pub struct NonceSequencer {
    current: Nonce,
}

impl NonceSequencer {
    /// Start a new sequence at a random point.
    pub fn start() -> Self {
        let mut current = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut current);
        Self { current }
    }

    /// Start a sequence at a known point.
    #[cfg(test)]
    pub fn from_seed(seed: Nonce) -> Self {
        Self { current: seed }
    }

    /// The nonce to use for the next encryption.
    pub fn current(&self) -> &Nonce {
        &self.current
    }

    /// Move to the next nonce. Call once after every successful encryption.
    pub fn advance(&mut self) {
        increment_le(&mut self.current);
    }
}

/// Add one to `nonce` read as a little-endian unsigned integer, wrapping to
/// zero on overflow.
pub fn increment_le(nonce: &mut Nonce) {
    for byte in nonce.iter_mut() {
        let (next, carry) = byte.overflowing_add(1);
        *byte = next;
        if !carry {
            return;
        }
    }
}
