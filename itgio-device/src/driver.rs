//! Attach/remove glue
//!
//! Ties the descriptor fixup, the LED bank and the input translator together
//! the way the host HID layer drives a driver: fixup at attach, raw events
//! while bound, teardown at remove. The device instance is returned to the
//! caller instead of living in a global.

use std::sync::Arc;

use itgio_transport::Transport;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::class::{LedClass, MODE_WORLD_RW};
use crate::error::DeviceError;
use crate::input::translate_raw_report;
use crate::lifecycle::LedDevice;
use crate::output::OutputDiagnostics;
use crate::rdesc::{DescriptorPatcher, InterfaceRole, PatchReport};
use crate::variant::Variant;

/// Calibrated role for one interface of one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverride {
    pub product_id: u16,
    pub interface: i32,
    pub role: InterfaceRole,
}

/// Table of calibrated interface roles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleOverrides(pub Vec<RoleOverride>);

impl RoleOverrides {
    pub fn lookup(&self, product_id: u16, interface: i32) -> Option<InterfaceRole> {
        self.0
            .iter()
            .find(|o| o.product_id == product_id && o.interface == interface)
            .map(|o| o.role)
    }
}

/// Outcome of attaching one interface
pub struct Attachment {
    pub report: PatchReport,
    /// Present for the lighting interface once its LEDs are registered
    pub device: Option<LedDevice>,
    /// Why a lighting interface ended up without LEDs
    pub lighting_error: Option<DeviceError>,
}

/// Driver configuration and entry points
#[derive(Clone)]
pub struct ItgioDriver {
    variant: Variant,
    overrides: RoleOverrides,
    led_mode: u32,
    diagnostics: Option<Arc<dyn OutputDiagnostics>>,
}

impl ItgioDriver {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            overrides: RoleOverrides::default(),
            led_mode: MODE_WORLD_RW,
            diagnostics: None,
        }
    }

    pub fn with_overrides(mut self, overrides: RoleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Access mode applied to each brightness endpoint
    pub fn with_led_mode(mut self, mode: u32) -> Self {
        self.led_mode = mode;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn OutputDiagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Run the descriptor fixup for `transport`'s interface
    pub fn fixup(&self, transport: &dyn Transport, rdesc: &mut [u8]) -> PatchReport {
        let info = transport.device_info();
        let role = self.overrides.lookup(info.pid, info.interface);
        if let Some(role) = role {
            debug!("{}: calibrated role {}", info.label(), role);
        }

        DescriptorPatcher::new(self.variant)
            .with_role(role)
            .patch(rdesc)
    }

    /// Attach one interface
    ///
    /// Patches `rdesc` in place. For the lighting interface the LED bank is
    /// created and its sixteen endpoints registered with `class`. If that
    /// fails the interface stays attached without lighting: the report and
    /// the patched descriptor are still valid, and input keeps flowing.
    pub fn attach(
        &self,
        rdesc: &mut [u8],
        transport: Arc<dyn Transport>,
        class: Arc<dyn LedClass>,
    ) -> Attachment {
        let report = self.fixup(transport.as_ref(), rdesc);
        let label = transport.device_info().label();
        info!(
            "{}: {} interface ({})",
            label,
            report.role,
            if report.applied.is_empty() {
                "no fixups".to_string()
            } else {
                report.applied.join(", ")
            }
        );

        if !report.wants_leds() {
            return Attachment {
                report,
                device: None,
                lighting_error: None,
            };
        }

        match self.attach_leds(transport, class) {
            Ok(device) => Attachment {
                report,
                device: Some(device),
                lighting_error: None,
            },
            Err(e) => {
                error!("{}: lighting unavailable: {}", label, e);
                Attachment {
                    report,
                    device: None,
                    lighting_error: Some(e),
                }
            }
        }
    }

    fn attach_leds(
        &self,
        transport: Arc<dyn Transport>,
        class: Arc<dyn LedClass>,
    ) -> Result<LedDevice, DeviceError> {
        let device = match &self.diagnostics {
            Some(d) => LedDevice::initialize_with_diagnostics(transport, self.variant, d.clone())?,
            None => LedDevice::initialize(transport, self.variant)?,
        };
        device.register_leds(class, self.led_mode)?;
        Ok(device)
    }

    /// Translate one inbound raw report in place
    #[inline]
    pub fn raw_event(&self, data: &mut [u8]) {
        translate_raw_report(data);
    }

    /// Tear down and free a device instance
    pub fn remove(&self, device: LedDevice) {
        device.teardown();
        info!("LED bank removed");
    }
}
