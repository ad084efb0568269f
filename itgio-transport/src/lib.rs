//! Transport abstraction layer for the UltraCade ITG-IO
//!
//! The board shows up as several HID interfaces under one VID/PID. This crate
//! identifies them, opens them through hidapi and exposes the three raw
//! operations the device layer needs: output-report writes, input-report
//! reads and report-descriptor retrieval.

pub mod device_registry;
pub mod error;
pub mod types;

mod discovery;
mod hid_raw;

pub use device_registry::{is_itgio_pid, is_supported, PRODUCT_IDS, VENDOR_ID};
pub use discovery::{list_interfaces, open_interface, HidDiscovery};
pub use error::TransportError;
pub use hid_raw::HidRawTransport;
pub use types::{DiscoveredInterface, TransportDeviceInfo};

/// The core transport trait - all backends implement this
///
/// Every call blocks until the host has completed the request; any timeout
/// belongs to the backend.
pub trait Transport: Send + Sync {
    /// Issue a SET_REPORT(Output) request
    ///
    /// # Arguments
    /// * `report_id` - Report selector byte (0 for boards without report IDs)
    /// * `data` - Report payload, excluding the selector
    ///
    /// # Returns
    /// Number of bytes handed to the host, selector included
    fn write_output_report(&self, report_id: u8, data: &[u8]) -> Result<usize, TransportError>;

    /// Read one raw input report
    ///
    /// # Returns
    /// Report length, or `0` if nothing arrived within `timeout_ms`
    fn read_input_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError>;

    /// Fetch the interface's report descriptor as supplied by the device
    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError>;

    /// Get interface information
    fn device_info(&self) -> &TransportDeviceInfo;
}
