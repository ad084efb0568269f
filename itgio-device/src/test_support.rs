//! In-memory doubles for unit tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use itgio_transport::{Transport, TransportDeviceInfo, TransportError, VENDOR_ID};
use parking_lot::Mutex;

use crate::class::{BrightnessSet, LedClass, LedClassDev, LedClassError};
use crate::output::OutputDiagnostics;

/// Transport that records successful output reports
pub struct RecordingTransport {
    info: TransportDeviceInfo,
    writes: Mutex<Vec<(u8, Vec<u8>)>>,
    fail: AtomicBool,
}

impl RecordingTransport {
    pub fn with_interface(pid: u16, interface: i32) -> Self {
        Self {
            info: TransportDeviceInfo {
                vid: VENDOR_ID,
                pid,
                interface,
                device_path: "mock".into(),
                serial: None,
                product_name: Some("ITG-IO".into()),
            },
            writes: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.writes.lock().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::with_interface(0x1584, 1)
    }
}

impl Transport for RecordingTransport {
    fn write_output_report(&self, report_id: u8, data: &[u8]) -> Result<usize, TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        self.writes.lock().push((report_id, data.to_vec()));
        Ok(data.len() + 1)
    }

    fn read_input_report(&self, _buf: &mut [u8], _timeout_ms: i32) -> Result<usize, TransportError> {
        Err(TransportError::Timeout)
    }

    fn report_descriptor(&self) -> Result<Vec<u8>, TransportError> {
        Ok(Vec::new())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

#[derive(Default)]
pub struct CountingDiagnostics {
    rejected: AtomicUsize,
    failed: AtomicUsize,
}

impl CountingDiagnostics {
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl OutputDiagnostics for CountingDiagnostics {
    fn write_failed(&self, _index: usize, _error: &TransportError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn index_rejected(&self, _index: usize) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }
}

/// Class-device layer kept in a map
#[derive(Default)]
pub struct MemoryLedClass {
    leds: Mutex<BTreeMap<String, (LedClassDev, u32)>>,
    unregistered: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl MemoryLedClass {
    /// Reject registration of `name`
    pub fn failing_at(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.leds.lock().keys().cloned().collect()
    }

    pub fn mode_of(&self, name: &str) -> Option<u32> {
        self.leds.lock().get(name).map(|(_, mode)| *mode)
    }

    /// Names in the order they were withdrawn
    pub fn unregistered(&self) -> Vec<String> {
        self.unregistered.lock().clone()
    }

    pub fn callback(&self, name: &str) -> Option<BrightnessSet> {
        self.leds
            .lock()
            .get(name)
            .map(|(dev, _)| dev.brightness_set.clone())
    }

    /// Simulate a write to the endpoint's brightness file
    pub fn set_brightness(&self, name: &str, level: u8) -> bool {
        match self.callback(name) {
            Some(cb) => {
                cb(level);
                true
            }
            None => false,
        }
    }
}

impl LedClass for MemoryLedClass {
    fn register(&self, led: LedClassDev) -> Result<(), LedClassError> {
        if self.fail_on.as_deref() == Some(led.name.as_str()) {
            return Err(LedClassError::Rejected(led.name));
        }
        let mut leds = self.leds.lock();
        if leds.contains_key(&led.name) {
            return Err(LedClassError::AlreadyRegistered(led.name));
        }
        leds.insert(led.name.clone(), (led, 0o644));
        Ok(())
    }

    fn relax_permissions(&self, name: &str, mode: u32) -> Result<(), LedClassError> {
        match self.leds.lock().get_mut(name) {
            Some(entry) => {
                entry.1 = mode;
                Ok(())
            }
            None => Err(LedClassError::NotRegistered(name.to_string())),
        }
    }

    fn unregister(&self, name: &str) {
        self.leds.lock().remove(name);
        self.unregistered.lock().push(name.to_string());
    }
}
