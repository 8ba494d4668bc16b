//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::crypto::platform;
use crate::function::Registry;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying the registry.
#[derive(Clone)]
pub struct AppState {
    /// Every registered function overload.
    pub registry: Arc<Registry>,
    /// Fail setup when AES-GCM would run without hardware support.
    pub require_hardware: bool,
    /// Largest block accepted in one request.
    pub max_rows_per_block: usize,
    /// Whether the CPU exposes AES instructions, probed once at startup.
    pub hardware_aes: bool,
}

impl AppState {
    /// Create a new [`AppState`] with a full registry.
    pub fn new(require_hardware: bool, max_rows_per_block: usize) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            require_hardware,
            max_rows_per_block,
            hardware_aes: platform::hardware_available(),
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] that accepts software AES, suitable for tests.
    fn default() -> Self {
        Self::new(false, 1_000_000)
    }
}
