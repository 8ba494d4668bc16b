//! Scalar functions exposing the codec to a tabular host.
//!
//! The host protocol is modelled on database UDx registration: each overload
//! has a factory that declares its prototype, negotiates a sized return type
//! from the argument types, declares the `key` parameter and per-instance
//! resources, and creates function instances. An instance is set up once per
//! statement and then fed blocks of rows.
//!
//! The cryptographic core only ever sees `(value, Option<associated_data>)`;
//! the six type combinations differ in this layer alone.
//!
//! # Module invariants
//!
//! - Every error is fatal for the statement. Rows after a failure are not
//!   processed and partial results are discarded.
//! - Null values never reach [`crate::crypto`].

pub mod block;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod null;
pub mod registry;
pub mod setup;

pub use block::{ArgumentBlock, RowValues};
pub use error::FunctionError;
pub use registry::Registry;
pub use setup::SetupContext;

use common::protocol::{ColumnSpec, ColumnType, FunctionDescriptor, ParameterDescriptor, Volatility};

/// Name of the encrypting function.
pub const ENCRYPT_FUNCTION: &str = "aesgcm_encrypt";

/// Name of the decrypting function.
pub const DECRYPT_FUNCTION: &str = "aesgcm_decrypt";

/// A set-up function instance.
pub trait ScalarFunction: Send {
    /// Produce one result per row of `block`, in order.
    fn process_block(&mut self, block: &ArgumentBlock) -> Result<Vec<Option<Vec<u8>>>, FunctionError>;
}

/// Metadata and construction for one function overload.
pub trait FunctionFactory: Send + Sync {
    fn name(&self) -> &'static str;

    /// Argument column types, in order.
    fn arguments(&self) -> Vec<ColumnType>;

    /// Result column type.
    fn result_type(&self) -> ColumnType;

    fn volatility(&self) -> Volatility;

    /// Negotiate the sized result column for the given argument columns.
    fn return_type(&self, arg_types: &[ColumnSpec]) -> ColumnSpec;

    fn parameter_types(&self) -> Vec<ParameterDescriptor> {
        vec![setup::key_parameter()]
    }

    /// File handles each instance opens (the key file).
    fn per_instance_file_handles(&self) -> u32 {
        1
    }

    /// Set up a new instance for one statement.
    fn create(&self, setup: &SetupContext<'_>) -> Result<Box<dyn ScalarFunction>, FunctionError>;

    fn describe(&self) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name().into(),
            arguments: self.arguments(),
            return_type: self.result_type(),
            volatility: self.volatility(),
            parameters: self.parameter_types(),
            file_handles: self.per_instance_file_handles(),
        }
    }
}

/// Build argument types for a value column plus optional associated data.
fn prototype(value: ColumnType, associated_data: Option<ColumnType>) -> Vec<ColumnType> {
    std::iter::once(value).chain(associated_data).collect()
}

/// Declared length of the first argument column, or 0 if there is none.
fn first_length(arg_types: &[ColumnSpec]) -> i64 {
    arg_types.first().map_or(0, |c| c.length)
}
