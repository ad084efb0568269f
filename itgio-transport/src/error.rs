//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        classify_hid_message(e.to_string())
    }
}

/// Map a hidapi error message onto the matching variant
fn classify_hid_message(msg: String) -> TransportError {
    if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
        TransportError::HidPermissionDenied(msg)
    } else if msg.contains("No such device") || msg.contains("ENODEV") {
        TransportError::Disconnected
    } else {
        TransportError::HidError(msg)
    }
}
