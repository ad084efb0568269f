//! Shared doubles for the device-layer integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use itgio_device::{BrightnessSet, LedClass, LedClassDev, LedClassError};
use itgio_transport::{Transport, TransportDeviceInfo, TransportError, VENDOR_ID};
use parking_lot::Mutex;

/// Lighting interface descriptor as the board reports it
pub const OUTPUT_RDESC: [u8; 33] = [
    0x05, 0x01, 0x09, 0x00, 0xA1, 0x01, 0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x10, 0x05,
    0x09, 0x19, 0x01, 0x29, 0x10, 0x81, 0x02, 0x05, 0x08, 0x19, 0x01, 0x95, 0x10, 0x75, 0x01,
    0x91, 0x02, 0xC0,
];

/// Second interface with byte-wide fields and report ID 0xFF
pub const INPUT_RDESC: [u8; 24] = [
    0x05, 0x01, 0x09, 0x00, 0xA1, 0x01, 0x15, 0x00, 0x25, 0xFF, 0x75, 0x08, 0x09, 0x01, 0x85,
    0xFF, 0x09, 0x01, 0x95, 0x04, 0x81, 0x02, 0xC0, 0x00,
];

/// Fake interface that keeps every output report it is handed
pub struct FakeBoard {
    info: TransportDeviceInfo,
    pub reports: Mutex<Vec<Vec<u8>>>,
}

impl FakeBoard {
    pub fn new(interface: i32) -> Self {
        Self {
            info: TransportDeviceInfo {
                vid: VENDOR_ID,
                pid: 0x1584,
                interface,
                device_path: format!("fake:{interface}"),
                serial: None,
                product_name: Some("ITG-IO".into()),
            },
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Reports as they would appear on the wire, selector first
    pub fn wire(&self) -> Vec<Vec<u8>> {
        self.reports.lock().clone()
    }
}

impl Transport for FakeBoard {
    fn write_output_report(&self, report_id: u8, data: &[u8]) -> Result<usize, TransportError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(report_id);
        frame.extend_from_slice(data);
        let len = frame.len();
        self.reports.lock().push(frame);
        Ok(len)
    }

    fn read_input_report(&self, _buf: &mut [u8], _timeout_ms: i32) -> Result<usize, TransportError> {
        Ok(0)
    }

    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError> {
        Ok(if self.info.interface == 0 {
            OUTPUT_RDESC.to_vec()
        } else {
            INPUT_RDESC.to_vec()
        })
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

/// Class-device layer that just remembers callbacks
#[derive(Default)]
pub struct CallbackTable {
    leds: Mutex<HashMap<String, BrightnessSet>>,
}

impl CallbackTable {
    pub fn len(&self) -> usize {
        self.leds.lock().len()
    }

    pub fn write(&self, name: &str, level: u8) {
        let cb = self.leds.lock().get(name).cloned();
        if let Some(cb) = cb {
            cb(level);
        }
    }
}

impl LedClass for CallbackTable {
    fn register(&self, led: LedClassDev) -> Result<(), LedClassError> {
        self.leds.lock().insert(led.name, led.brightness_set);
        Ok(())
    }

    fn relax_permissions(&self, _name: &str, _mode: u32) -> Result<(), LedClassError> {
        Ok(())
    }

    fn unregister(&self, name: &str) {
        self.leds.lock().remove(name);
    }
}
