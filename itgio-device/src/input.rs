//! Button input translation
//!
//! The board answers every poll with a 4-byte report:
//! - `[0..2]` echo of the current light state (active high)
//! - `[2..4]` button state (active low)
//!
//! The translator moves the buttons to the bottom two bytes and inverts them,
//! so the generic HID layer sees an ordinary active-high gamepad bitmap.

/// Minimum length of a report carrying button state
pub const INPUT_REPORT_LEN: usize = 4;

/// Number of buttons in the bitmap
pub const BUTTON_COUNT: usize = 16;

/// Rewrite a raw input report in place
///
/// Reports shorter than [`INPUT_REPORT_LEN`] are left untouched. Never blocks
/// and never fails.
#[inline]
pub fn translate_raw_report(data: &mut [u8]) {
    if data.len() < INPUT_REPORT_LEN {
        return;
    }

    data[0] = !data[2];
    data[1] = !data[3];

    // The light echo is meaningless here; the LED bank owns light state.
    data[2] = 0;
    data[3] = 0;
}

/// Logical (active-high) button bitmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonState(pub u16);

impl ButtonState {
    /// Decode from a report that already went through [`translate_raw_report`]
    pub fn from_translated(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }
        Some(Self(u16::from_le_bytes([data[0], data[1]])))
    }

    /// Decode straight from a raw (active-low) report
    pub fn from_raw(data: &[u8]) -> Option<Self> {
        if data.len() < INPUT_REPORT_LEN {
            return None;
        }
        Some(Self(!u16::from_le_bytes([data[2], data[3]])))
    }

    /// Whether button `index` is held
    pub fn is_pressed(&self, index: usize) -> bool {
        index < BUTTON_COUNT && self.0 & (1 << index) != 0
    }

    /// Indices of held buttons, ascending
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BUTTON_COUNT).filter(move |&i| self.is_pressed(i))
    }

    /// Buttons whose state differs from `previous`, with their new state
    pub fn changed_since(&self, previous: ButtonState) -> Vec<(usize, bool)> {
        let diff = self.0 ^ previous.0;
        (0..BUTTON_COUNT)
            .filter(|&i| diff & (1 << i) != 0)
            .map(|i| (i, self.is_pressed(i)))
            .collect()
    }
}
