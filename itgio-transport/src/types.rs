//! Common types for transport layer

use serde::Serialize;

/// Interface identification information
#[derive(Debug, Clone, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number (-1 when the platform cannot tell)
    pub interface: i32,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// Short `vid:pid/ifN` label used in log lines
    pub fn label(&self) -> String {
        format!("{:04x}:{:04x}/if{}", self.vid, self.pid, self.interface)
    }
}

/// Discovered interface that can be opened
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredInterface {
    /// Interface information
    pub info: TransportDeviceInfo,
}
