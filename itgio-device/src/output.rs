//! LED output synchronizer
//!
//! Brightness requests arrive concurrently from the class-device layer. Each
//! one mutates the shared [`LedBank`] and issues the output report while
//! holding the bank lock, so writes reach the board in the order their
//! mutations happened.

use std::sync::Arc;

use itgio_transport::{Transport, TransportError};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

use crate::error::DeviceError;
use crate::led::LedBank;

/// What a brightness request ended up doing
///
/// Informational only: none of these is an error for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedWrite {
    /// Index out of range; nothing changed
    Rejected,
    /// LED byte unchanged; no report sent
    Unchanged,
    /// Report sent
    Written,
    /// Report attempted and failed; the bank keeps the requested state
    WriteFailed,
}

/// Observer for the output path
///
/// Transport failures are not propagated to brightness callers, so this is
/// the place to see them.
pub trait OutputDiagnostics: Send + Sync {
    /// A report went out
    fn write_issued(&self, _index: usize, _report: &[u8]) {}

    /// Change detection suppressed a report
    fn write_skipped(&self, _index: usize) {}

    /// A report failed
    fn write_failed(&self, index: usize, error: &TransportError);

    /// A request named an LED that does not exist
    fn index_rejected(&self, _index: usize) {}
}

/// Default diagnostics: log and move on
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl OutputDiagnostics for TracingDiagnostics {
    fn write_failed(&self, index: usize, error: &TransportError) {
        warn!("LED {} output report failed: {}", index, error);
    }
}

/// Serializes brightness changes against the shared bank
pub struct LedController {
    transport: Arc<dyn Transport>,
    bank: Mutex<LedBank>,
    diagnostics: Arc<dyn OutputDiagnostics>,
}

impl LedController {
    pub fn new(transport: Arc<dyn Transport>, bank: LedBank) -> Self {
        Self {
            transport,
            bank: Mutex::new(bank),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Replace the diagnostics hook
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn OutputDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Apply a brightness level (0 = off, anything else = on) to LED `index`
    pub fn set_brightness(&self, index: usize, level: u8) -> LedWrite {
        let mut bank = self.bank.lock();

        let change = match bank.set(index, level != 0) {
            Ok(change) => change,
            Err(e) => {
                error!("{}", e);
                self.diagnostics.index_rejected(index);
                return LedWrite::Rejected;
            }
        };

        bank.stamp_selector();

        if bank.variant().detects_changes() && !change.changed() {
            debug!("LED {} already {}, skipping write", index, level != 0);
            self.diagnostics.write_skipped(index);
            return LedWrite::Unchanged;
        }

        let (report_id, payload) = bank.wire_report();
        debug!(
            "LED {} -> {}: byte {} {:02X} -> {:02X}",
            index, level, change.byte_index, change.before, change.after
        );

        match self.transport.write_output_report(report_id, payload) {
            Ok(_) => {
                self.diagnostics.write_issued(index, payload);
                LedWrite::Written
            }
            Err(e) => {
                self.diagnostics.write_failed(index, &e);
                LedWrite::WriteFailed
            }
        }
    }

    /// Adopt a bitmap read back from the board, without writing
    pub fn restore(&self, bitmap: u16) {
        let mut bank = self.bank.lock();
        bank.set_bitmap(bitmap);
        debug!("LED bank restored to {:04X}", bitmap);
    }

    /// Send the whole bank regardless of change detection
    pub fn flush(&self) -> Result<(), DeviceError> {
        let mut bank = self.bank.lock();
        bank.stamp_selector();
        let (report_id, payload) = bank.wire_report();
        self.transport.write_output_report(report_id, payload)?;
        Ok(())
    }

    /// Current logical state of LED `index`
    pub fn get(&self, index: usize) -> Result<bool, DeviceError> {
        self.bank.lock().get(index)
    }

    /// Logical LED bitmap, LED 0 in bit 0
    pub fn bitmap(&self) -> u16 {
        self.bank.lock().bitmap()
    }

    /// Copy of the output buffer
    pub fn snapshot(&self) -> Vec<u8> {
        self.bank.lock().as_bytes().to_vec()
    }

    /// Hold the bank lock, keeping every brightness request out
    pub(crate) fn lock_bank(&self) -> MutexGuard<'_, LedBank> {
        self.bank.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingDiagnostics, RecordingTransport};
    use crate::variant::Variant;

    fn controller(variant: Variant) -> (Arc<RecordingTransport>, LedController) {
        let transport = Arc::new(RecordingTransport::default());
        let bank = LedBank::new(variant).unwrap();
        let ctl = LedController::new(transport.clone(), bank);
        (transport, ctl)
    }

    #[test]
    fn test_refined_writes_only_on_change() {
        let (transport, ctl) = controller(Variant::Refined);

        assert_eq!(ctl.set_brightness(3, 1), LedWrite::Written);
        assert_eq!(ctl.set_brightness(3, 1), LedWrite::Unchanged);
        assert_eq!(ctl.set_brightness(3, 0), LedWrite::Written);

        let writes = transport.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], (0x00, vec![0x08, 0x00, 0xFF, 0xFF]));
        assert_eq!(writes[1], (0x00, vec![0x00, 0x00, 0xFF, 0xFF]));
    }

    #[test]
    fn test_basic_always_writes() {
        let (transport, ctl) = controller(Variant::Basic);

        assert_eq!(ctl.set_brightness(8, 1), LedWrite::Written);
        assert_eq!(ctl.set_brightness(8, 1), LedWrite::Written);

        let writes = transport.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1], (0x00, vec![0x00, 0x01, 0xFF, 0xFF]));
        assert_eq!(ctl.snapshot(), vec![0x00, 0x00, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn test_invalid_index_is_rejected_without_write() {
        let transport = Arc::new(RecordingTransport::default());
        let diagnostics = Arc::new(CountingDiagnostics::default());
        let ctl = LedController::new(transport.clone(), LedBank::new(Variant::Basic).unwrap())
            .with_diagnostics(diagnostics.clone());
        let before = ctl.snapshot();

        assert_eq!(ctl.set_brightness(16, 1), LedWrite::Rejected);
        assert_eq!(ctl.set_brightness(usize::MAX, 0), LedWrite::Rejected);

        assert_eq!(ctl.snapshot(), before);
        assert!(transport.writes().is_empty());
        assert_eq!(diagnostics.rejected(), 2);
    }

    #[test]
    fn test_write_failure_keeps_state_and_reports() {
        let transport = Arc::new(RecordingTransport::default());
        let diagnostics = Arc::new(CountingDiagnostics::default());
        let ctl = LedController::new(transport.clone(), LedBank::new(Variant::Refined).unwrap())
            .with_diagnostics(diagnostics.clone());

        transport.fail_writes(true);
        assert_eq!(ctl.set_brightness(0, 1), LedWrite::WriteFailed);
        assert!(ctl.get(0).unwrap());
        assert_eq!(diagnostics.failed(), 1);

        // Same byte again: the bank already holds it, so nothing is retried
        transport.fail_writes(false);
        assert_eq!(ctl.set_brightness(0, 1), LedWrite::Unchanged);
        assert!(transport.writes().is_empty());

        // The next differing write carries the earlier bit as well
        assert_eq!(ctl.set_brightness(1, 1), LedWrite::Written);
        assert_eq!(transport.writes()[0].1[0], 0x03);
    }

    #[test]
    fn test_restore_then_flush() {
        let (transport, ctl) = controller(Variant::Refined);

        ctl.restore(0x0101);
        assert!(transport.writes().is_empty());
        assert_eq!(ctl.set_brightness(0, 1), LedWrite::Unchanged);

        ctl.flush().unwrap();
        assert_eq!(transport.writes(), vec![(0x00, vec![0x01, 0x01, 0xFF, 0xFF])]);

        transport.fail_writes(true);
        assert!(ctl.flush().is_err());
    }

    #[test]
    fn test_concurrent_writers_leave_consistent_bank() {
        let (transport, ctl) = controller(Variant::Refined);
        let ctl = Arc::new(ctl);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ctl = Arc::clone(&ctl);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        ctl.set_brightness(i, 1);
                        ctl.set_brightness(i, 0);
                    }
                    ctl.set_brightness(i, (i % 2) as u8);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ctl.bitmap(), 0xAAAA);
        // Every report observed a fully-formed buffer
        for (id, payload) in transport.writes() {
            assert_eq!(id, 0x00);
            assert_eq!(&payload[2..], &[0xFF, 0xFF]);
        }
    }
}
