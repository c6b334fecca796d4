//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("device lost".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("device lost"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("buffer already released".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("buffer already released"));
}

#[test]
fn test_invalid_argument_display() {
    let err = Error::InvalidArgument("cell size must be positive".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid argument"));
    assert!(display.contains("cell size must be positive"));
}

#[test]
fn test_serialization_display() {
    let err = Error::Serialization("unexpected end of input".to_string());
    assert!(format!("{}", err).starts_with("Serialization error"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::InitializationFailed("listener".to_string());
    assert_eq!(err.clone(), err);
}

#[test]
fn test_from_serde_json_error() {
    let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Serialization(_)));
}

// ============================================================================
// MACROS
// ============================================================================

fn bail_when(fail: bool) -> Result<u32> {
    if fail {
        crate::foliage_bail!("foliage::tests", "failed with code {}", 7);
    }
    Ok(1)
}

#[test]
fn test_foliage_bail_returns_backend_error() {
    assert_eq!(bail_when(false), Ok(1));
    match bail_when(true) {
        Err(Error::BackendError(msg)) => assert_eq!(msg, "failed with code 7"),
        other => panic!("unexpected result: {:?}", other),
    }
}
