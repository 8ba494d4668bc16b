//! The set of registered overloads, and statement execution against it.

use std::collections::HashMap;

use common::protocol::{ColumnSpec, ColumnType, FunctionDescriptor};
use tracing::info;

use super::block::{ArgumentBlock, RowValues};
use super::decrypt::DecryptFactory;
use super::encrypt::EncryptFactory;
use super::error::FunctionError;
use super::setup::{check_arity, SetupContext};
use super::FunctionFactory;

/// One statement's worth of input.
#[derive(Debug)]
pub struct Statement<'a> {
    pub function: &'a str,
    pub parameters: &'a HashMap<String, String>,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<RowValues>,
}

/// Result of a statement: the negotiated column and one value per row.
#[derive(Debug)]
pub struct StatementOutput {
    pub return_type: ColumnSpec,
    pub rows: Vec<Option<Vec<u8>>>,
}

/// Every function overload the service exposes.
pub struct Registry {
    factories: Vec<Box<dyn FunctionFactory>>,
}

impl Registry {
    /// Register encrypt and decrypt, each without associated data and with
    /// varchar or varbinary associated data.
    pub fn new() -> Self {
        let ad_variants = [None, Some(ColumnType::Varchar), Some(ColumnType::Varbinary)];
        let mut factories: Vec<Box<dyn FunctionFactory>> = Vec::with_capacity(6);
        for ad in ad_variants {
            factories.push(Box::new(EncryptFactory::new(ad)));
        }
        for ad in ad_variants {
            factories.push(Box::new(DecryptFactory::new(ad)));
        }
        Self { factories }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn describe(&self) -> Vec<FunctionDescriptor> {
        self.factories.iter().map(|f| f.describe()).collect()
    }

    /// Find the overload of `name` matching `arg_types`.
    ///
    /// # Errors
    ///
    /// - [`FunctionError::UnknownFunction`] if nothing is registered as `name`.
    /// - [`FunctionError::Arity`] for anything other than 1 or 2 arguments.
    /// - [`FunctionError::NoMatchingOverload`] if the types match no overload.
    pub fn resolve(
        &self,
        name: &str,
        arg_types: &[ColumnSpec],
    ) -> Result<&dyn FunctionFactory, FunctionError> {
        if !self.factories.iter().any(|f| f.name() == name) {
            return Err(FunctionError::UnknownFunction(name.to_owned()));
        }
        check_arity(arg_types.len())?;

        let types: Vec<ColumnType> = arg_types.iter().map(|c| c.column_type).collect();
        self.factories
            .iter()
            .find(|f| f.name() == name && f.arguments() == types)
            .map(|f| &**f)
            .ok_or_else(|| FunctionError::NoMatchingOverload {
                name: name.to_owned(),
                types: types
                    .iter()
                    .map(|t| format!("{t:?}").to_lowercase())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Resolve, set up and run one statement as a single block.
    ///
    /// Blocking: reads the key file and does all the crypto on the calling
    /// thread.
    pub fn execute(
        &self,
        statement: Statement<'_>,
        require_hardware: bool,
    ) -> Result<StatementOutput, FunctionError> {
        let factory = self.resolve(statement.function, &statement.columns)?;
        let return_type = factory.return_type(&statement.columns);

        let mut function = factory.create(&SetupContext {
            parameters: statement.parameters,
            arg_types: &statement.columns,
            require_hardware,
        })?;

        let block = ArgumentBlock::new(statement.columns, statement.rows)?;
        let rows = function.process_block(&block)?;

        info!(
            function = statement.function,
            rows = rows.len(),
            return_length = return_type.length,
            "statement complete"
        );
        Ok(StatementOutput { return_type, rows })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
