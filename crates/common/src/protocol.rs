//! Request and response types exchanged with the function host.
//!
//! These types are serialised as JSON. Varchar values travel as JSON strings,
//! varbinary values as standard base64 strings, and SQL NULL as JSON `null`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column types
// ---------------------------------------------------------------------------

/// Host column types the functions accept or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Variable-length text.
    Varchar,
    /// Variable-length binary.
    Varbinary,
}

/// A named column with its declared maximum length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, used in error messages.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Declared maximum length in bytes. Always positive for valid columns.
    pub length: i64,
}

impl ColumnSpec {
    /// Construct a [`ColumnSpec`].
    pub fn new(name: impl Into<String>, column_type: ColumnType, length: i64) -> Self {
        Self {
            name: name.into(),
            column_type,
            length,
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt` and `POST /decrypt`.
///
/// One request is one statement: the function is set up once from
/// `parameters` and `columns`, then processes `rows` as a single block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Named function parameters, e.g. `{"key": "/etc/colcrypt/column.key"}`.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Argument columns: the value column, optionally followed by an
    /// associated-data column.
    pub columns: Vec<ColumnSpec>,
    /// Row values, one entry per argument column.
    #[serde(default)]
    pub rows: Vec<Vec<Option<String>>>,
}

/// Successful response body for `POST /encrypt` and `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Negotiated result column type.
    pub return_type: ColumnSpec,
    /// One result value per input row, in order.
    pub rows: Vec<Option<String>>,
}

// ---------------------------------------------------------------------------
// Function catalogue
// ---------------------------------------------------------------------------

/// Whether repeated calls with the same arguments return the same result
/// within a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    /// Every call may differ.
    Volatile,
    /// Results are fixed for the duration of a statement.
    Stable,
}

/// A named parameter a function declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub length: i64,
    pub required: bool,
    pub nullable: bool,
    pub description: String,
}

/// One registered function overload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub arguments: Vec<ColumnType>,
    pub return_type: ColumnType,
    pub volatility: Volatility,
    pub parameters: Vec<ParameterDescriptor>,
    /// File handles each function instance opens.
    pub file_handles: u32,
}

/// Response body for `GET /functions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsResponse {
    pub functions: Vec<FunctionDescriptor>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"`.
    pub status: String,
    /// Number of function overloads registered.
    pub functions_registered: usize,
    /// Whether AES-GCM runs on hardware instructions in this process.
    pub hardware_aes: bool,
}
