//! Device layer for the UltraCade ITG-IO
//!
//! Works on top of any [`Transport`](itgio_transport::Transport):
//! - report-descriptor fixups that expose the button interface as a gamepad
//! - polarity translation of the active-low button report
//! - the sixteen-LED output bank and its class-device lifecycle

pub mod class;
pub mod driver;
pub mod error;
pub mod input;
pub mod led;
pub mod lifecycle;
pub mod output;
pub mod rdesc;
pub mod variant;

#[cfg(test)]
mod test_support;

pub use class::{BrightnessSet, LedClass, LedClassDev, LedClassError, MODE_WORLD_RW};
pub use driver::{Attachment, ItgioDriver, RoleOverride, RoleOverrides};
pub use error::DeviceError;
pub use input::{translate_raw_report, ButtonState, BUTTON_COUNT, INPUT_REPORT_LEN};
pub use led::{led_name, LedBank, LED_ON, LIGHT_NAMES, MAX_LEDS};
pub use lifecycle::{LedDevice, LedRegistration};
pub use output::{LedController, LedWrite, OutputDiagnostics, TracingDiagnostics};
pub use rdesc::{DescriptorPatcher, InterfaceRole, PatchReport};
pub use variant::{Variant, OUTPUT_REPORT_SELECTOR};
