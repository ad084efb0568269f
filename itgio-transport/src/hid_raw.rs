//! hidapi-backed transport for one ITG-IO interface

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Largest report descriptor the host API can hand back
const MAX_REPORT_DESCRIPTOR_SIZE: usize = 4096;

/// HID transport for a single USB interface
///
/// Requests are serialized through a mutex so that an output report and an
/// input read never interleave on the same handle.
pub struct HidRawTransport {
    device: Mutex<HidDevice>,
    info: TransportDeviceInfo,
}

impl HidRawTransport {
    /// Wrap an opened HID device
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            info,
        }
    }
}

impl Transport for HidRawTransport {
    fn write_output_report(&self, report_id: u8, data: &[u8]) -> Result<usize, TransportError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(report_id);
        frame.extend_from_slice(data);

        debug!("{} SET_REPORT(Output) {:02X?}", self.info.label(), frame);

        let written = self.device.lock().write(&frame)?;
        if written < frame.len() {
            return Err(TransportError::ShortWrite {
                expected: frame.len(),
                actual: written,
            });
        }
        Ok(written)
    }

    fn read_input_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        let len = self.device.lock().read_timeout(buf, timeout_ms)?;
        Ok(len)
    }

    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; MAX_REPORT_DESCRIPTOR_SIZE];
        let len = self.device.lock().get_report_descriptor(&mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

impl Drop for HidRawTransport {
    fn drop(&mut self) {
        debug!("HidRawTransport {} dropped", self.info.label());
    }
}
