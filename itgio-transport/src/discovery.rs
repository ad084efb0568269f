//! Interface discovery for ITG-IO boards

use std::sync::Arc;

use hidapi::HidApi;
use tracing::{debug, info};

use crate::device_registry;
use crate::error::TransportError;
use crate::hid_raw::HidRawTransport;
use crate::types::{DiscoveredInterface, TransportDeviceInfo};
use crate::Transport;

/// HID discovery for ITG-IO interfaces
///
/// An ITG-IO enumerates as several HID interfaces under one VID/PID; each one
/// is listed separately because the driver treats them differently.
pub struct HidDiscovery {
    /// Known VID/PID pairs to look for
    known_devices: Vec<(u16, u16)>,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self {
            known_devices: device_registry::PRODUCT_IDS
                .iter()
                .map(|&pid| (device_registry::VENDOR_ID, pid))
                .collect(),
        }
    }

    /// Check if a device matches our known devices
    fn is_known_device(&self, vid: u16, pid: u16) -> bool {
        self.known_devices.contains(&(vid, pid))
    }

    /// List every interface of every connected board
    pub fn list_interfaces(&self) -> Result<Vec<DiscoveredInterface>, TransportError> {
        let api = HidApi::new()?;
        let mut interfaces: Vec<DiscoveredInterface> = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();

            if !self.is_known_device(vid, pid) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();

            // hidapi reports one entry per top-level collection on some
            // backends; keep the first entry per path.
            if interfaces.iter().any(|i| i.info.device_path == path) {
                continue;
            }

            debug!(
                "Found interface: VID={:04X} PID={:04X} if={} path={}",
                vid,
                pid,
                device_info.interface_number(),
                path
            );

            interfaces.push(DiscoveredInterface {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    interface: device_info.interface_number(),
                    device_path: path,
                    serial: device_info.serial_number().map(|s| s.to_string()),
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
            });
        }

        interfaces.sort_by_key(|i| (i.info.pid, i.info.interface));
        Ok(interfaces)
    }

    /// Open one interface as a transport
    pub fn open_interface(
        &self,
        interface: &DiscoveredInterface,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let api = HidApi::new()?;
        let path = std::ffi::CString::new(interface.info.device_path.clone())
            .map_err(|e| TransportError::Internal(e.to_string()))?;

        let device = api.open_path(&path)?;
        info!("Opened {}", interface.info.label());

        Ok(Arc::new(HidRawTransport::new(device, interface.info.clone())))
    }
}

/// List all ITG-IO interfaces
pub fn list_interfaces() -> Result<Vec<DiscoveredInterface>, TransportError> {
    HidDiscovery::new().list_interfaces()
}

/// Open a specific interface
pub fn open_interface(
    interface: &DiscoveredInterface,
) -> Result<Arc<dyn Transport>, TransportError> {
    HidDiscovery::new().open_interface(interface)
}
