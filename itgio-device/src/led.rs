//! LED bank state
//!
//! The sixteen outputs are packed eight to a byte, LED `i` living at bit
//! `i % 8` of LED byte `i / 8`. LEDs are active high on the wire.

use crate::error::DeviceError;
use crate::variant::{Variant, OUTPUT_REPORT_SELECTOR};

/// Number of addressable outputs
pub const MAX_LEDS: usize = 16;

/// Highest brightness an output accepts (outputs are on/off only)
pub const LED_ON: u8 = 1;

/// Cabinet meaning of each output, in index order
pub const LIGHT_NAMES: [&str; MAX_LEDS] = [
    "P1 Right",
    "P1 Left",
    "P1 Down",
    "P1 Up",
    "P2 Right",
    "P2 Left",
    "P2 Down",
    "P2 Up",
    "P1 Upper Left Marquee",
    "P1 Lower Left Marquee",
    "P2 Upper Right Marquee",
    "P2 Lower Right Marquee",
    "P2 Button",
    "P1 Button",
    "Coin Counter",
    "Neon",
];

/// Class-device name of output `index` (e.g. `itgio::output3`)
pub fn led_name(index: usize) -> String {
    format!("itgio::output{index}")
}

/// Before/after view of the byte touched by one bit update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitChange {
    /// Buffer position of the LED byte
    pub byte_index: usize,
    /// Byte value before the update
    pub before: u8,
    /// Byte value after the update
    pub after: u8,
}

impl BitChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Authoritative output bitmap in wire layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedBank {
    variant: Variant,
    buf: Vec<u8>,
}

impl LedBank {
    /// Allocate a bank with every non-LED byte at its enable value
    ///
    /// The two trailing bytes must read back high or the board stops
    /// reporting input; LED bytes start cleared.
    pub fn new(variant: Variant) -> Result<Self, DeviceError> {
        let len = variant.report_len();
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| DeviceError::Allocation(len))?;
        buf.resize(len, 0);

        buf[len - 1] = 0xFF;
        buf[len - 2] = 0xFF;

        Ok(Self { variant, buf })
    }

    /// Buffer position and bit mask of LED `index`
    fn locate(&self, index: usize) -> Result<(usize, u8), DeviceError> {
        if index >= MAX_LEDS {
            return Err(DeviceError::InvalidLedIndex(index));
        }
        Ok((index / 8 + self.variant.led_offset(), 1 << (index % 8)))
    }

    /// Current state of LED `index`
    pub fn get(&self, index: usize) -> Result<bool, DeviceError> {
        let (byte, mask) = self.locate(index)?;
        Ok(self.buf[byte] & mask != 0)
    }

    /// Set or clear LED `index`
    ///
    /// Out-of-range indices are rejected without touching the buffer.
    pub fn set(&mut self, index: usize, on: bool) -> Result<BitChange, DeviceError> {
        let (byte_index, mask) = self.locate(index)?;
        let before = self.buf[byte_index];

        if on {
            self.buf[byte_index] |= mask;
        } else {
            self.buf[byte_index] &= !mask;
        }

        Ok(BitChange {
            byte_index,
            before,
            after: self.buf[byte_index],
        })
    }

    /// Overwrite both LED bytes from a logical bitmap
    pub fn set_bitmap(&mut self, bitmap: u16) {
        let off = self.variant.led_offset();
        self.buf[off..off + 2].copy_from_slice(&bitmap.to_le_bytes());
    }

    /// Force the report selector, for layouts that carry one
    pub fn stamp_selector(&mut self) {
        if self.variant.has_selector() {
            self.buf[0] = OUTPUT_REPORT_SELECTOR;
        }
    }

    /// Report selector and payload as handed to the transport
    pub fn wire_report(&self) -> (u8, &[u8]) {
        if self.variant.has_selector() {
            (self.buf[0], &self.buf[1..])
        } else {
            (OUTPUT_REPORT_SELECTOR, &self.buf[..])
        }
    }

    /// Logical LED bitmap, LED 0 in bit 0
    pub fn bitmap(&self) -> u16 {
        let off = self.variant.led_offset();
        u16::from_le_bytes([self.buf[off], self.buf[off + 1]])
    }

    /// Raw buffer contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}
