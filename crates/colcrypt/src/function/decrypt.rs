//! `aesgcm_decrypt`: varbinary envelope in, varchar out.
//!
//! The nonce is read from the envelope prefix. The result column is declared
//! 28 bytes shorter than the argument, but never shorter than 1.

use common::protocol::{ColumnSpec, ColumnType, Volatility};
use tracing::{debug, warn};

use crate::crypto::{codec, size};

use super::block::ArgumentBlock;
use super::error::FunctionError;
use super::null;
use super::setup::{AesGcmFunction, SetupContext};
use super::{first_length, prototype, FunctionFactory, ScalarFunction, DECRYPT_FUNCTION};

/// A decrypting function instance.
#[derive(Debug)]
pub struct AesGcmDecrypt {
    base: AesGcmFunction,
}

impl AesGcmDecrypt {
    pub fn new(base: AesGcmFunction) -> Self {
        Self { base }
    }
}

impl ScalarFunction for AesGcmDecrypt {
    fn process_block(&mut self, block: &ArgumentBlock) -> Result<Vec<Option<Vec<u8>>>, FunctionError> {
        self.base.check_block_arity(block.column_count())?;

        let ctx = self.base.context();
        let column = self.base.column_name();
        let mut results = Vec::with_capacity(block.len());

        for (index, row) in block.rows().enumerate() {
            let value = null::map_row(row, |envelope, ad| {
                codec::decrypt(ctx, envelope, ad)
                    .map_err(|e| FunctionError::from_codec(e, column, "decryption"))
            })
            .inspect_err(|e| warn!(column, row = index, error = %e, "decryption aborted"))?;
            results.push(value);
        }

        debug!(column, rows = block.len(), "block decrypted");
        Ok(results)
    }
}

/// Factory for one `aesgcm_decrypt` overload.
#[derive(Debug, Clone, Copy)]
pub struct DecryptFactory {
    associated_data: Option<ColumnType>,
}

impl DecryptFactory {
    /// Overload taking a varbinary envelope and, optionally, associated data
    /// of the given type.
    pub const fn new(associated_data: Option<ColumnType>) -> Self {
        Self { associated_data }
    }
}

impl FunctionFactory for DecryptFactory {
    fn name(&self) -> &'static str {
        DECRYPT_FUNCTION
    }

    fn arguments(&self) -> Vec<ColumnType> {
        prototype(ColumnType::Varbinary, self.associated_data)
    }

    fn result_type(&self) -> ColumnType {
        ColumnType::Varchar
    }

    // Fixed for a statement; the key file may change between statements.
    fn volatility(&self) -> Volatility {
        Volatility::Stable
    }

    fn return_type(&self, arg_types: &[ColumnSpec]) -> ColumnSpec {
        ColumnSpec::new(
            DECRYPT_FUNCTION,
            ColumnType::Varchar,
            size::declared_plaintext_length(first_length(arg_types)),
        )
    }

    fn create(&self, setup: &SetupContext<'_>) -> Result<Box<dyn ScalarFunction>, FunctionError> {
        Ok(Box::new(AesGcmDecrypt::new(AesGcmFunction::setup(setup)?)))
    }
}
