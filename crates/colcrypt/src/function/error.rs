//! Errors raised by the scalar-function layer.
//!
//! Every variant is fatal for the statement that raised it: there is no
//! row-skip and no retry.

use common::ServiceError;
use thiserror::Error;

use crate::crypto::{platform::PlatformError, CodecError, KeyError};

#[derive(Debug, Error)]
pub enum FunctionError {
    /// Wrong number of argument columns.
    #[error("function accepts either 1 or 2 arguments, but {0} provided")]
    Arity(usize),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The argument types match no registered overload.
    #[error("no overload of {name} accepts ({types})")]
    NoMatchingOverload { name: String, types: String },

    #[error("required parameter \"{0}\" missing")]
    MissingParameter(&'static str),

    #[error("parameter \"{name}\" is longer than the maximum of {max} bytes")]
    ParameterTooLong { name: &'static str, max: usize },

    #[error(transparent)]
    KeyFormat(#[from] KeyError),

    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    /// A row does not carry one value per declared argument column.
    #[error("row {row} has {found} values but {expected} argument columns are declared")]
    RowShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("ciphertext in column '{column}' is too short ({actual}) expected at least {minimum}")]
    InputTooShort {
        column: String,
        actual: usize,
        minimum: usize,
    },

    #[error("failed to verify ciphertext in column '{column}'")]
    AuthenticationFailed { column: String },

    #[error("error encountered during {operation} of column '{column}'")]
    Internal {
        column: String,
        operation: &'static str,
    },
}

impl FunctionError {
    /// Attach the column name to a codec failure.
    pub fn from_codec(err: CodecError, column: &str, operation: &'static str) -> Self {
        match err {
            CodecError::InputTooShort { actual, minimum } => FunctionError::InputTooShort {
                column: column.to_owned(),
                actual,
                minimum,
            },
            CodecError::AuthenticationFailed => FunctionError::AuthenticationFailed {
                column: column.to_owned(),
            },
            CodecError::Internal => FunctionError::Internal {
                column: column.to_owned(),
                operation,
            },
        }
    }
}

impl From<FunctionError> for ServiceError {
    fn from(err: FunctionError) -> Self {
        let message = err.to_string();
        match err {
            FunctionError::AuthenticationFailed { .. } => ServiceError::AuthenticationFailed(message),
            FunctionError::Internal { .. } => ServiceError::EncryptionFailure(message),
            FunctionError::UnsupportedPlatform(_) => ServiceError::Unavailable(message),
            FunctionError::Arity(_)
            | FunctionError::UnknownFunction(_)
            | FunctionError::NoMatchingOverload { .. }
            | FunctionError::MissingParameter(_)
            | FunctionError::ParameterTooLong { .. }
            | FunctionError::KeyFormat(_)
            | FunctionError::RowShape { .. }
            | FunctionError::InputTooShort { .. } => ServiceError::BadRequest(message),
        }
    }
}
