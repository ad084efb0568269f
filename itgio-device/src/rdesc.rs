//! Report descriptor fixup
//!
//! The board ships a vendor descriptor on each interface. Before the generic
//! HID layer parses it we rewrite a handful of known items in place:
//!
//! - the top-level usage becomes Gamepad (`09 05`) so the buttons bind as a
//!   joystick,
//! - the vendor's 1-bit LED output field is shrunk to nothing so the generic
//!   layer does not try to drive the lights itself,
//! - the interface we do not use is made unparseable.
//!
//! Every rule is a literal `(offset, expected bytes, writes)` entry checked
//! against the raw bytes. There is no general descriptor parser here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::variant::Variant;

/// What an interface turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceRole {
    /// Carries the LED bank; gets the lighting machinery
    Output,
    /// Carries buttons only
    Input,
    /// Not used; neutralized so the HID layer skips it
    Inert,
    /// Layout not recognized; passed through untouched
    Unrecognized,
}

impl InterfaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Input => "input",
            Self::Inert => "inert",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for InterfaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signature check and the bytes it rewrites
#[derive(Debug, Clone, Copy)]
pub struct PatchRule {
    /// Short name used in logs and [`PatchReport::applied`]
    pub name: &'static str,
    /// Descriptor must be at least this long for the rule to be considered
    pub min_size: usize,
    /// `(offset, bytes)` that must match exactly; `None` always matches
    pub expect: Option<(usize, &'static [u8])>,
    /// `(offset, bytes)` written when the rule matches
    pub writes: &'static [(usize, &'static [u8])],
    /// Role implied by a match
    pub role: Option<InterfaceRole>,
    /// Stop evaluating further rules after a match
    pub terminal: bool,
}

impl PatchRule {
    fn matches(&self, rdesc: &[u8]) -> bool {
        if rdesc.len() < self.min_size {
            return false;
        }
        match self.expect {
            Some((offset, bytes)) => rdesc.get(offset..offset + bytes.len()) == Some(bytes),
            None => true,
        }
    }

    fn apply(&self, rdesc: &mut [u8]) {
        for &(offset, bytes) in self.writes {
            rdesc[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
    }
}

/// Report ID item `85 FF` at offset 14 marks the unused interface
///
/// Every rule needs that offset in range: a descriptor too short to be
/// checked for the report ID is left alone.
pub const BASIC_RULES: &[PatchRule] = &[
    PatchRule {
        name: "unused-interface",
        min_size: 16,
        expect: Some((14, &[0x85, 0xFF])),
        writes: &[(0, &[0x00])],
        role: Some(InterfaceRole::Inert),
        terminal: true,
    },
    PatchRule {
        name: "gamepad-usage",
        min_size: 16,
        expect: None,
        writes: &[(2, &[0x09, 0x05])],
        role: Some(InterfaceRole::Output),
        terminal: false,
    },
    PatchRule {
        name: "input-size",
        min_size: 30,
        expect: None,
        writes: &[(28, &[0x75, 0x00])],
        role: None,
        terminal: false,
    },
];

pub const REFINED_RULES: &[PatchRule] = &[
    PatchRule {
        name: "gamepad-usage",
        min_size: 5,
        expect: Some((2, &[0x09, 0x00])),
        writes: &[(2, &[0x09, 0x05])],
        role: None,
        terminal: false,
    },
    PatchRule {
        name: "vendor-led-output",
        min_size: 31,
        expect: Some((28, &[0x75, 0x01])),
        writes: &[(26, &[0x95, 0x00]), (28, &[0x75, 0x00])],
        role: None,
        terminal: false,
    },
    PatchRule {
        name: "byte-input-field",
        min_size: 20,
        expect: Some((10, &[0x75, 0x08])),
        writes: &[(10, &[0x75, 0x00]), (18, &[0x95, 0x00])],
        role: Some(InterfaceRole::Input),
        terminal: false,
    },
];

/// Result of one fixup pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Detected (or overridden) interface role
    pub role: InterfaceRole,
    /// Names of the rules that matched, in evaluation order
    pub applied: Vec<&'static str>,
}

impl PatchReport {
    /// Whether this interface should get the LED bank
    pub fn wants_leds(&self) -> bool {
        self.role == InterfaceRole::Output
    }
}

/// Rule table evaluator
#[derive(Debug, Clone)]
pub struct DescriptorPatcher {
    variant: Variant,
    rules: &'static [PatchRule],
    role_override: Option<InterfaceRole>,
}

impl DescriptorPatcher {
    pub fn new(variant: Variant) -> Self {
        let rules = match variant {
            Variant::Basic => BASIC_RULES,
            Variant::Refined => REFINED_RULES,
        };
        Self {
            variant,
            rules,
            role_override: None,
        }
    }

    /// Use a calibrated role instead of the byte heuristic
    pub fn with_role(mut self, role: Option<InterfaceRole>) -> Self {
        self.role_override = role;
        self
    }

    /// Rewrite `rdesc` in place and classify the interface
    ///
    /// The buffer is always left usable by the caller; descriptors that match
    /// nothing come back byte-for-byte unchanged.
    pub fn patch(&self, rdesc: &mut [u8]) -> PatchReport {
        let mut applied = Vec::new();
        let mut role = None;

        for rule in self.rules {
            if !rule.matches(rdesc) {
                continue;
            }
            rule.apply(rdesc);
            applied.push(rule.name);
            debug!("rdesc fixup: applied {}", rule.name);

            if let Some(r) = rule.role {
                role = Some(r);
            }
            if rule.terminal {
                break;
            }
        }

        if self.variant == Variant::Basic
            && applied.contains(&"gamepad-usage")
            && !applied.contains(&"input-size")
        {
            warn!(
                "descriptor too short ({} bytes) to disable the input field",
                rdesc.len()
            );
        }

        let detected = match role {
            Some(r) => r,
            None if applied.is_empty() => InterfaceRole::Unrecognized,
            None => InterfaceRole::Output,
        };

        let role = match self.role_override {
            Some(InterfaceRole::Inert) if detected != InterfaceRole::Inert => {
                neutralize(rdesc);
                InterfaceRole::Inert
            }
            Some(r) => r,
            None => detected,
        };

        PatchReport { role, applied }
    }
}

/// Corrupt the first item so the HID parser rejects the descriptor
fn neutralize(rdesc: &mut [u8]) {
    if let Some(first) = rdesc.first_mut() {
        *first = 0x00;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lighting interface as the board reports it
    const OUTPUT_RDESC: [u8; 33] = [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x00, // Usage (Undefined)
        0xA1, 0x01, // Collection (Application)
        0x15, 0x00, //   Logical Minimum (0)
        0x25, 0x01, //   Logical Maximum (1)
        0x75, 0x01, //   Report Size (1)
        0x95, 0x10, //   Report Count (16)
        0x05, 0x09, //   Usage Page (Button)
        0x19, 0x01, //   Usage Minimum (1)
        0x29, 0x10, //   Usage Maximum (16)
        0x81, 0x02, //   Input (Data,Var,Abs)
        0x05, 0x08, //   Usage Page (LEDs)
        0x19, 0x01, //   Usage Minimum (1)
        0x95, 0x10, //   Report Count (16)
        0x75, 0x01, //   Report Size (1)
        0x91, 0x02, //   Output (Data,Var,Abs)
        0xC0, // End Collection
    ];

    /// Second interface, byte-wide echo fields
    const INPUT_RDESC: [u8; 24] = [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x00, // Usage (Undefined)
        0xA1, 0x01, // Collection (Application)
        0x15, 0x00, //   Logical Minimum (0)
        0x25, 0xFF, //   Logical Maximum (255)
        0x75, 0x08, //   Report Size (8)
        0x09, 0x01, //   Usage (Pointer)
        0x85, 0xFF, //   Report ID (255)
        0x09, 0x01, //   Usage (Pointer)
        0x95, 0x04, //   Report Count (4)
        0x81, 0x02, //   Input (Data,Var,Abs)
        0xC0, 0x00,
    ];

    #[test]
    fn test_refined_output_interface() {
        let mut rdesc = OUTPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Refined).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Output);
        assert_eq!(report.applied, vec!["gamepad-usage", "vendor-led-output"]);
        assert_eq!(&rdesc[2..4], &[0x09, 0x05]);
        assert_eq!(&rdesc[26..30], &[0x95, 0x00, 0x75, 0x00]);
        // Button field untouched
        assert_eq!(&rdesc[10..14], &[0x75, 0x01, 0x95, 0x10]);
    }

    #[test]
    fn test_refined_input_interface() {
        let mut rdesc = INPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Refined).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Input);
        assert_eq!(report.applied, vec!["gamepad-usage", "byte-input-field"]);
        assert_eq!(&rdesc[10..12], &[0x75, 0x00]);
        assert_eq!(&rdesc[18..20], &[0x95, 0x00]);
    }

    #[test]
    fn test_refined_unrecognized_passes_through() {
        let mut rdesc = [0x06, 0x00, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0xC0];
        let original = rdesc;
        let report = DescriptorPatcher::new(Variant::Refined).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Unrecognized);
        assert!(report.applied.is_empty());
        assert_eq!(rdesc, original);
    }

    #[test]
    fn test_refined_size_guards() {
        // Usage signature present but descriptor only 4 bytes long
        let mut rdesc = [0x05, 0x01, 0x09, 0x00];
        let report = DescriptorPatcher::new(Variant::Refined).patch(&mut rdesc);
        assert_eq!(report.role, InterfaceRole::Unrecognized);
        assert_eq!(rdesc, [0x05, 0x01, 0x09, 0x00]);

        // LED signature at 28 but descriptor ends at 30
        let mut rdesc = OUTPUT_RDESC[..30].to_vec();
        let report = DescriptorPatcher::new(Variant::Refined).patch(&mut rdesc);
        assert_eq!(report.applied, vec!["gamepad-usage"]);
        assert_eq!(&rdesc[28..30], &[0x75, 0x01]);
    }

    #[test]
    fn test_basic_output_interface() {
        let mut rdesc = OUTPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Basic).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Output);
        assert_eq!(report.applied, vec!["gamepad-usage", "input-size"]);
        assert_eq!(&rdesc[2..4], &[0x09, 0x05]);
        assert_eq!(&rdesc[28..30], &[0x75, 0x00]);
        // Report count left alone in this variant
        assert_eq!(&rdesc[26..28], &[0x95, 0x10]);
    }

    #[test]
    fn test_basic_unused_interface_is_neutralized() {
        let mut rdesc = INPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Basic).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Inert);
        assert_eq!(report.applied, vec!["unused-interface"]);
        assert_eq!(rdesc[0], 0x00);
        assert_eq!(&rdesc[1..], &INPUT_RDESC[1..]);
    }

    #[test]
    fn test_basic_tiny_descriptor_untouched() {
        let mut rdesc = [0x05, 0x01, 0x09];
        let report = DescriptorPatcher::new(Variant::Basic).patch(&mut rdesc);
        assert_eq!(report.role, InterfaceRole::Unrecognized);
        assert_eq!(rdesc, [0x05, 0x01, 0x09]);
    }

    #[test]
    fn test_basic_short_descriptor_untouched() {
        let original = [0x05, 0x01, 0x09, 0x00, 0xA1, 0x01, 0x15, 0x00];
        let mut rdesc = original;
        let report = DescriptorPatcher::new(Variant::Basic).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Unrecognized);
        assert!(report.applied.is_empty());
        assert!(!report.wants_leds());
        assert_eq!(rdesc, original);
    }

    #[test]
    fn test_basic_descriptor_without_room_for_input_size() {
        let mut rdesc = [0u8; 20];
        rdesc[2..4].copy_from_slice(&[0x09, 0x00]);
        let report = DescriptorPatcher::new(Variant::Basic).patch(&mut rdesc);

        assert_eq!(report.role, InterfaceRole::Output);
        assert_eq!(report.applied, vec!["gamepad-usage"]);
        assert_eq!(&rdesc[2..4], &[0x09, 0x05]);
    }

    #[test]
    fn test_role_override() {
        let mut rdesc = INPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Refined)
            .with_role(Some(InterfaceRole::Output))
            .patch(&mut rdesc);
        assert!(report.wants_leds());

        let mut rdesc = OUTPUT_RDESC;
        let report = DescriptorPatcher::new(Variant::Refined)
            .with_role(Some(InterfaceRole::Inert))
            .patch(&mut rdesc);
        assert_eq!(report.role, InterfaceRole::Inert);
        assert_eq!(rdesc[0], 0x00);
    }
}
