//! Setup shared by the encrypt and decrypt functions: arity, the `key`
//! parameter, key loading, platform check and context derivation.

use std::collections::HashMap;
use std::path::Path;

use common::protocol::{ColumnSpec, ColumnType, ParameterDescriptor};
use tracing::{debug, info};

use crate::crypto::platform::{self, Backend};
use crate::crypto::{load_key_file, CipherContext};

use super::error::FunctionError;

/// Name of the parameter holding the key file path.
pub const KEY_PATH_PARAM: &str = "key";

/// Longest accepted host string.
pub const MAX_VARCHAR_LEN: usize = 65_000;

/// Platform path length limit.
pub const PATH_MAX: usize = 4096;

/// Longest accepted key path: the smaller of the path limit and the host
/// string limit.
pub const MAX_KEY_PATH: usize = if PATH_MAX <= MAX_VARCHAR_LEN {
    PATH_MAX
} else {
    MAX_VARCHAR_LEN
};

/// Everything a factory needs to set up one function instance.
#[derive(Debug, Clone, Copy)]
pub struct SetupContext<'a> {
    pub parameters: &'a HashMap<String, String>,
    pub arg_types: &'a [ColumnSpec],
    pub require_hardware: bool,
}

/// Reject any argument count other than 1 or 2.
pub fn check_arity(count: usize) -> Result<(), FunctionError> {
    if count == 0 || count > 2 {
        return Err(FunctionError::Arity(count));
    }
    Ok(())
}

/// Declaration of the `key` parameter.
pub fn key_parameter() -> ParameterDescriptor {
    ParameterDescriptor {
        name: KEY_PATH_PARAM.into(),
        column_type: ColumnType::Varchar,
        length: MAX_KEY_PATH as i64,
        required: true,
        nullable: false,
        description:
            "Specifies the path to a file containing a 256-bit AES key in hexadecimal representation."
                .into(),
    }
}

/// State shared by both directions for the lifetime of one statement.
#[derive(Debug)]
pub struct AesGcmFunction {
    context: CipherContext,
    column_name: String,
    backend: Backend,
}

impl AesGcmFunction {
    /// Validate the arguments, read the key and derive the cipher context.
    ///
    /// # Errors
    ///
    /// - [`FunctionError::Arity`] for anything other than 1 or 2 arguments.
    /// - [`FunctionError::MissingParameter`] / [`FunctionError::ParameterTooLong`]
    ///   for a missing or oversized `key` parameter.
    /// - [`FunctionError::KeyFormat`] if the key file is unreadable or malformed.
    /// - [`FunctionError::UnsupportedPlatform`] if hardware AES is required but absent.
    pub fn setup(setup: &SetupContext<'_>) -> Result<Self, FunctionError> {
        check_arity(setup.arg_types.len())?;
        let column_name = setup.arg_types[0].name.clone();

        let key_path = setup
            .parameters
            .get(KEY_PATH_PARAM)
            .ok_or(FunctionError::MissingParameter(KEY_PATH_PARAM))?;
        if key_path.len() > MAX_KEY_PATH {
            return Err(FunctionError::ParameterTooLong {
                name: KEY_PATH_PARAM,
                max: MAX_KEY_PATH,
            });
        }

        let key = load_key_file(Path::new(key_path))?;
        let backend = platform::check_support(setup.require_hardware)?;
        let context = CipherContext::derive(&key);
        drop(key);

        info!(column = %column_name, key_path = %key_path, ?backend, "function set up");
        Ok(Self {
            context,
            column_name,
            backend,
        })
    }

    pub fn context(&self) -> &CipherContext {
        &self.context
    }

    /// Name of the first argument column, used in error messages.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Re-check the block's width before reading any row.
    pub fn check_block_arity(&self, column_count: usize) -> Result<(), FunctionError> {
        check_arity(column_count).inspect_err(|_| {
            debug!(column = %self.column_name, column_count, "block rejected for arity");
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{key_file, ZERO_KEY_HEX};
    use super::*;

    fn columns(n: usize) -> Vec<ColumnSpec> {
        (0..n)
            .map(|i| ColumnSpec::new(format!("col{i}"), ColumnType::Varchar, 32))
            .collect()
    }

    fn params(path: &str) -> HashMap<String, String> {
        HashMap::from([(KEY_PATH_PARAM.to_owned(), path.to_owned())])
    }

    #[test]
    fn max_key_path_is_path_max() {
        assert_eq!(MAX_KEY_PATH, 4096);
    }

    #[test]
    fn arity_bounds() {
        assert!(check_arity(1).is_ok());
        assert!(check_arity(2).is_ok());
        assert!(matches!(check_arity(0), Err(FunctionError::Arity(0))));
        assert!(matches!(check_arity(3), Err(FunctionError::Arity(3))));
    }

    #[test]
    fn setup_with_valid_key() {
        let file = key_file(ZERO_KEY_HEX);
        let parameters = params(file.path().to_str().unwrap());
        let cols = columns(2);
        let f = AesGcmFunction::setup(&SetupContext {
            parameters: &parameters,
            arg_types: &cols,
            require_hardware: false,
        })
        .unwrap();
        assert_eq!(f.column_name(), "col0");
    }

    #[test]
    fn setup_rejects_three_arguments_before_reading_key() {
        let parameters = HashMap::new();
        let cols = columns(3);
        let err = AesGcmFunction::setup(&SetupContext {
            parameters: &parameters,
            arg_types: &cols,
            require_hardware: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("but 3 provided"));
    }

    #[test]
    fn setup_requires_key_parameter() {
        let parameters = HashMap::new();
        let cols = columns(1);
        let err = AesGcmFunction::setup(&SetupContext {
            parameters: &parameters,
            arg_types: &cols,
            require_hardware: false,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "required parameter \"key\" missing");
    }

    #[test]
    fn setup_rejects_oversized_path() {
        let parameters = params(&"k".repeat(MAX_KEY_PATH + 1));
        let cols = columns(1);
        let err = AesGcmFunction::setup(&SetupContext {
            parameters: &parameters,
            arg_types: &cols,
            require_hardware: false,
        })
        .unwrap_err();
        assert!(matches!(err, FunctionError::ParameterTooLong { .. }));
    }

    #[test]
    fn setup_reports_bad_key_file_path() {
        let file = key_file("not-a-key");
        let path = file.path().to_str().unwrap().to_owned();
        let parameters = params(&path);
        let cols = columns(1);
        let err = AesGcmFunction::setup(&SetupContext {
            parameters: &parameters,
            arg_types: &cols,
            require_hardware: false,
        })
        .unwrap_err();
        assert!(matches!(err, FunctionError::KeyFormat(_)));
        assert!(err.to_string().contains(&path));
    }

    #[test]
    fn key_parameter_declaration() {
        let p = key_parameter();
        assert_eq!(p.name, "key");
        assert!(p.required);
        assert!(!p.nullable);
        assert_eq!(p.length, MAX_KEY_PATH as i64);
    }
}
