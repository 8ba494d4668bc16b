//! AES-256-GCM column encryption primitives.
//!
//! This module has no HTTP or host-registration concerns.
//! It provides key loading, the per-statement cipher context, the per-batch
//! nonce sequence, and the envelope encrypt/decrypt operations used by the
//! function layer.
//!
//! # Envelope format
//!
//! ```text
//! offset 0..12    nonce (little-endian counter, random-seeded per batch)
//! offset 12..N-16 ciphertext (same length as the plaintext)
//! offset N-16..N  authentication tag
//! ```
//!
//! `N` is always the plaintext length plus [`OVERHEAD`].

pub mod codec;
pub mod context;
pub mod key;
pub mod nonce;
pub mod platform;
pub mod size;

pub use codec::CodecError;
pub use context::CipherContext;
pub use key::{load_key_file, KeyError};
pub use nonce::NonceSequencer;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM public nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Bytes added to every plaintext: the nonce prefix plus the tag.
pub const OVERHEAD: usize = NONCE_LEN + TAG_LEN;
