//! Device layer error types

use itgio_transport::TransportError;
use thiserror::Error;

use crate::class::LedClassError;

/// Errors from device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// LED index outside 0..16
    #[error("LED index {0} invalid")]
    InvalidLedIndex(usize),

    /// Output buffer could not be allocated
    #[error("Failed to allocate {0}-byte output buffer")]
    Allocation(usize),

    /// Class-device registration of one LED failed
    #[error("Failed to register LED {index}: {source}")]
    Registration {
        index: usize,
        #[source]
        source: LedClassError,
    },
}
