//! Common types, protocol definitions, and errors shared across `colcrypt` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
