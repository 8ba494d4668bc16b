//! `aesgcm_encrypt`: varchar in, varbinary envelope out.
//!
//! One random nonce is drawn per block and incremented after every encrypted
//! row. The result column is declared 28 bytes longer than the argument.

use common::protocol::{ColumnSpec, ColumnType, Volatility};
use tracing::debug;

use crate::crypto::{codec, size, NonceSequencer};

use super::block::ArgumentBlock;
use super::error::FunctionError;
use super::null;
use super::setup::{AesGcmFunction, SetupContext};
use super::{first_length, prototype, FunctionFactory, ScalarFunction, ENCRYPT_FUNCTION};

/// An encrypting function instance.
#[derive(Debug)]
pub struct AesGcmEncrypt {
    base: AesGcmFunction,
}

impl AesGcmEncrypt {
    pub fn new(base: AesGcmFunction) -> Self {
        Self { base }
    }
}

impl ScalarFunction for AesGcmEncrypt {
    fn process_block(&mut self, block: &ArgumentBlock) -> Result<Vec<Option<Vec<u8>>>, FunctionError> {
        self.base.check_block_arity(block.column_count())?;

        let ctx = self.base.context();
        let column = self.base.column_name();
        let mut nonces = NonceSequencer::start();
        let mut results = Vec::with_capacity(block.len());
        let mut encrypted = 0usize;

        for row in block.rows() {
            let value = null::map_row(row, |plaintext, ad| {
                let envelope = codec::encrypt(ctx, nonces.current(), plaintext, ad)
                    .map_err(|e| FunctionError::from_codec(e, column, "encryption"))?;
                nonces.advance();
                encrypted += 1;
                Ok(envelope.into_bytes())
            })?;
            results.push(value);
        }

        debug!(
            column,
            rows = block.len(),
            encrypted,
            backend = ?self.base.backend(),
            "block encrypted"
        );
        Ok(results)
    }
}

/// Factory for one `aesgcm_encrypt` overload.
#[derive(Debug, Clone, Copy)]
pub struct EncryptFactory {
    associated_data: Option<ColumnType>,
}

impl EncryptFactory {
    /// Overload taking a varchar value and, optionally, associated data of
    /// the given type.
    pub const fn new(associated_data: Option<ColumnType>) -> Self {
        Self { associated_data }
    }
}

impl FunctionFactory for EncryptFactory {
    fn name(&self) -> &'static str {
        ENCRYPT_FUNCTION
    }

    fn arguments(&self) -> Vec<ColumnType> {
        prototype(ColumnType::Varchar, self.associated_data)
    }

    fn result_type(&self) -> ColumnType {
        ColumnType::Varbinary
    }

    // Every call draws a fresh nonce.
    fn volatility(&self) -> Volatility {
        Volatility::Volatile
    }

    fn return_type(&self, arg_types: &[ColumnSpec]) -> ColumnSpec {
        ColumnSpec::new(
            ENCRYPT_FUNCTION,
            ColumnType::Varbinary,
            size::declared_ciphertext_length(first_length(arg_types)),
        )
    }

    fn create(&self, setup: &SetupContext<'_>) -> Result<Box<dyn ScalarFunction>, FunctionError> {
        Ok(Box::new(AesGcmEncrypt::new(AesGcmFunction::setup(setup)?)))
    }
}
