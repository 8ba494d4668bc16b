//! Structured JSON logging.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, associated data or ciphertext** may appear
//!   in any span attribute or log field. Column names, row counts and row
//!   indices are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), and
//!   `RUST_LOG` overrides it when set.

pub mod init;

pub use init::init;
