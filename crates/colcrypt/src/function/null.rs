//! Null passthrough for per-row operations.
//!
//! A null value produces a null result before any cryptographic state is
//! touched: the operation closure is not called, so the nonce does not advance
//! and the associated data is never read. Null or empty associated data is
//! the same as no associated data.

use super::block::Row;
use super::error::FunctionError;

/// Apply `op` to a row's value and associated data, passing nulls through.
pub fn map_row<F>(row: Row<'_>, op: F) -> Result<Option<Vec<u8>>, FunctionError>
where
    F: FnOnce(&[u8], Option<&[u8]>) -> Result<Vec<u8>, FunctionError>,
{
    let Some(value) = row.primary() else {
        return Ok(None);
    };
    op(value, normalize_associated_data(row.associated_data())).map(Some)
}

/// Collapse empty associated data to absent.
pub fn normalize_associated_data(ad: Option<&[u8]>) -> Option<&[u8]> {
    ad.filter(|ad| !ad.is_empty())
}
