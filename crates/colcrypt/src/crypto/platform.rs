//! Runtime detection of hardware support for AES-GCM.

use thiserror::Error;

/// Which AES-GCM implementation will serve this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// AES and carry-less multiply instructions are available.
    Hardware,
    /// Constant-time software fallback.
    Software,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("system support required for AES256-GCM is unavailable")]
    Unsupported,
}

/// Returns `true` if the CPU exposes AES and carry-less multiply instructions.
pub fn hardware_available() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        std::arch::is_x86_feature_detected!("aes") && std::arch::is_x86_feature_detected!("pclmulqdq")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("aes")
            && std::arch::is_aarch64_feature_detected!("pmull")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// Decide which backend serves this process, once per function setup.
///
/// # Errors
///
/// Returns [`PlatformError::Unsupported`] when `require_hardware` is set and the
/// CPU lacks the instructions.
pub fn check_support(require_hardware: bool) -> Result<Backend, PlatformError> {
    select_backend(hardware_available(), require_hardware)
}

fn select_backend(hardware: bool, require_hardware: bool) -> Result<Backend, PlatformError> {
    match (hardware, require_hardware) {
        (true, _) => Ok(Backend::Hardware),
        (false, false) => Ok(Backend::Software),
        (false, true) => Err(PlatformError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_always_selected_when_present() {
        assert_eq!(select_backend(true, true).unwrap(), Backend::Hardware);
        assert_eq!(select_backend(true, false).unwrap(), Backend::Hardware);
    }

    #[test]
    fn software_fallback_when_not_required() {
        assert_eq!(select_backend(false, false).unwrap(), Backend::Software);
    }

    #[test]
    fn missing_hardware_is_fatal_when_required() {
        let err = select_backend(false, true).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn check_without_requirement_never_fails() {
        assert!(check_support(false).is_ok());
    }
}
