//! Driver variants
//!
//! Two generations of the driver exist. They put the same four bytes on the
//! wire but differ in how the host-side buffer is laid out, how the report
//! descriptor is recognized and whether unchanged LED bytes are written.

use serde::{Deserialize, Serialize};

/// Selector byte for output reports; the board has no report IDs
pub const OUTPUT_REPORT_SELECTOR: u8 = 0x00;

/// Driver variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Fixed-offset descriptor patch, selector-prefixed 5-byte buffer,
    /// writes on every brightness call
    Basic,
    /// Signature-matching descriptor patch, bare 4-byte buffer,
    /// writes only when the LED byte changed
    #[default]
    Refined,
}

impl Variant {
    /// Host-side output buffer length
    pub const fn report_len(self) -> usize {
        match self {
            Self::Basic => 5,
            Self::Refined => 4,
        }
    }

    /// Whether byte 0 of the buffer is the report selector
    pub const fn has_selector(self) -> bool {
        matches!(self, Self::Basic)
    }

    /// Index of the first LED byte in the buffer
    pub const fn led_offset(self) -> usize {
        if self.has_selector() {
            1
        } else {
            0
        }
    }

    /// Whether unchanged LED bytes skip the transport write
    pub const fn detects_changes(self) -> bool {
        matches!(self, Self::Refined)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Refined => "refined",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" | "v1" => Ok(Self::Basic),
            "refined" | "v2" => Ok(Self::Refined),
            other => Err(format!("unknown variant '{other}' (expected basic or refined)")),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
