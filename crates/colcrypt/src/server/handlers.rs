//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::{
    ColumnSpec, ColumnType, ErrorResponse, FunctionsResponse, HealthResponse, InvokeRequest,
    InvokeResponse,
};
use common::ServiceError;
use tracing::warn;

use crate::function::registry::Statement;
use crate::function::{FunctionError, RowValues, DECRYPT_FUNCTION, ENCRYPT_FUNCTION};
use super::state::AppState;

/// `POST /encrypt`: run `aesgcm_encrypt` over the request rows.
///
/// Each request is one statement: the key named by the `key` parameter is
/// loaded once and one random nonce seeds the whole block.
pub async fn encrypt(State(state): State<AppState>, Json(req): Json<InvokeRequest>) -> Response {
    respond(ENCRYPT_FUNCTION, invoke(state, ENCRYPT_FUNCTION, req).await)
}

/// `POST /decrypt`: run `aesgcm_decrypt` over the request rows.
///
/// Any row that is too short or fails verification aborts the whole request.
pub async fn decrypt(State(state): State<AppState>, Json(req): Json<InvokeRequest>) -> Response {
    respond(DECRYPT_FUNCTION, invoke(state, DECRYPT_FUNCTION, req).await)
}

/// `GET /functions`: list every registered overload.
pub async fn functions(State(state): State<AppState>) -> Json<FunctionsResponse> {
    Json(FunctionsResponse {
        functions: state.registry.describe(),
    })
}

/// `GET /health`: liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        functions_registered: state.registry.len(),
        hardware_aes: state.hardware_aes,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Statement execution
// ---------------------------------------------------------------------------

async fn invoke(
    state: AppState,
    function: &'static str,
    req: InvokeRequest,
) -> Result<InvokeResponse, ServiceError> {
    let InvokeRequest {
        parameters,
        columns,
        rows,
    } = req;

    // Arity and overload problems are reported before any row is looked at.
    state.registry.resolve(function, &columns)?;

    if rows.len() > state.max_rows_per_block {
        return Err(ServiceError::BadRequest(format!(
            "block of {} rows exceeds the maximum of {}",
            rows.len(),
            state.max_rows_per_block
        )));
    }
    let rows = decode_rows(&columns, rows)?;

    let registry = state.registry.clone();
    let require_hardware = state.require_hardware;
    let output = tokio::task::spawn_blocking(move || {
        registry.execute(
            Statement {
                function,
                parameters: &parameters,
                columns,
                rows,
            },
            require_hardware,
        )
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("statement task failed: {e}")))??;

    let column_type = output.return_type.column_type;
    let rows = output
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.map(|v| encode_value(v, column_type, row)).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InvokeResponse {
        return_type: output.return_type,
        rows,
    })
}

fn respond(function: &str, result: Result<InvokeResponse, ServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            warn!(function, code = e.code(), error = %e, "invocation failed");
            let status =
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorResponse::new(e.code(), e.to_string()))).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Value encoding
// ---------------------------------------------------------------------------

/// Convert JSON row values to raw bytes according to each column's type.
fn decode_rows(
    columns: &[ColumnSpec],
    rows: Vec<Vec<Option<String>>>,
) -> Result<Vec<RowValues>, ServiceError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != columns.len() {
                return Err(FunctionError::RowShape {
                    row: index,
                    found: row.len(),
                    expected: columns.len(),
                }
                .into());
            }
            row.into_iter()
                .zip(columns)
                .map(|(value, column)| value.map(|v| decode_value(v, column, index)).transpose())
                .collect()
        })
        .collect()
}

fn decode_value(value: String, column: &ColumnSpec, row: usize) -> Result<Vec<u8>, ServiceError> {
    match column.column_type {
        ColumnType::Varchar => Ok(value.into_bytes()),
        ColumnType::Varbinary => STANDARD.decode(value).map_err(|_| {
            ServiceError::BadRequest(format!(
                "row {row}: value in column '{}' is not valid base64",
                column.name
            ))
        }),
    }
}

fn encode_value(value: Vec<u8>, column_type: ColumnType, row: usize) -> Result<String, ServiceError> {
    match column_type {
        ColumnType::Varbinary => Ok(STANDARD.encode(value)),
        ColumnType::Varchar => String::from_utf8(value).map_err(|_| {
            ServiceError::BadRequest(format!("row {row}: decrypted value is not valid UTF-8"))
        }),
    }
}
