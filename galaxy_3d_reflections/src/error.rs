//! Error types for the Galaxy3D reflection system
//!
//! This module defines the error types used throughout the crate,
//! including renderer backend failures, resource lookups, precondition
//! violations of the mirror lifecycle, and scene configuration problems.

use std::fmt;

/// Result type for Galaxy3D reflection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D reflection errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (render target allocation, draw submission, etc.)
    BackendError(String),

    /// Invalid resource (stale camera key, unknown render target, etc.)
    InvalidResource(String),

    /// Initialization failed (mirror, manager, renderer)
    InitializationFailed(String),

    /// Operation called in a state that does not allow it
    /// (rendering or destroying a mirror that was never initialized)
    InvalidState(String),

    /// Scene configuration could not be read or failed validation
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error (with file:line) and build the matching `Error` value.
///
/// The variant defaults to `BackendError`. Another variant can be selected
/// with the `Variant =>` prefix.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("galaxy3d::Mirror", "render target {} lost", id);
/// let err = engine_err!("galaxy3d::Mirror", InvalidState => "'{}' is not initialized", name);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $kind:ident => $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::$kind(message)
    }};
    ($source:expr, $($arg:tt)*) => {
        $crate::engine_err!($source, BackendError => $($arg)*)
    };
}

/// Log an error and return it from the current function.
///
/// Accepts the same forms as `engine_err!`.
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
