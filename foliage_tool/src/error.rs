//! Error types for the foliage tool
//!
//! One error enum is shared by the grid, the renderers and the graphics
//! device abstraction. Lookups never produce errors (they return `Option`);
//! errors are reserved for rejected inputs and backend failures.

use std::fmt;

/// Result type for foliage tool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Foliage tool errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (device, command recording, lock poisoning)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid or already released resource (buffer, mesh, foliage type)
    InvalidResource(String),

    /// Rejected input (bad cell size, empty transform list, zero-size buffer)
    InvalidArgument(String),

    /// Initialization failed (manager attach, kernel creation)
    InitializationFailed(String),

    /// Scene document or configuration could not be (de)serialized
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Log an error and build an `Error::BackendError` from it.
///
/// # Example
///
/// ```ignore
/// let lock = device.lock().map_err(|_| foliage_err!("foliage::Manager", "device lock poisoned"))?;
/// ```
#[macro_export]
macro_rules! foliage_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::foliage_error!($source, "{}", message);
        $crate::foliage::Error::BackendError(message)
    }};
}

/// Log an error and return early with an `Error::BackendError`.
#[macro_export]
macro_rules! foliage_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::foliage_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
