//! LED bank lifecycle
//!
//! A [`LedDevice`] is the per-attach device instance: it owns the output
//! controller and one registration record per LED. Dropping it tears the LED
//! endpoints down, so nothing outlives the interface it was created for.

use std::sync::{Arc, Weak};

use itgio_transport::Transport;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::class::{LedClass, LedClassDev};
use crate::error::DeviceError;
use crate::led::{led_name, LedBank, LED_ON, MAX_LEDS};
use crate::output::{LedController, OutputDiagnostics, TracingDiagnostics};
use crate::variant::Variant;

/// Registration record for one LED endpoint
#[derive(Debug)]
pub struct LedRegistration {
    pub index: usize,
    pub name: String,
    controller: Weak<LedController>,
    registered: bool,
}

impl LedRegistration {
    fn new(index: usize, controller: Weak<LedController>) -> Self {
        Self {
            index,
            name: led_name(index),
            controller,
            registered: false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Class-device payload wired to the output synchronizer
    fn class_dev(&self) -> LedClassDev {
        let index = self.index;
        let controller = self.controller.clone();
        LedClassDev {
            name: self.name.clone(),
            max_brightness: LED_ON,
            brightness_set: Arc::new(move |level| {
                if let Some(ctl) = controller.upgrade() {
                    ctl.set_brightness(index, level);
                }
            }),
        }
    }
}

/// Device instance for the lighting interface
pub struct LedDevice {
    controller: Arc<LedController>,
    leds: Mutex<Vec<LedRegistration>>,
    class: Mutex<Option<Arc<dyn LedClass>>>,
}

impl LedDevice {
    /// Allocate the output buffer and unregistered LED records
    pub fn initialize(transport: Arc<dyn Transport>, variant: Variant) -> Result<Self, DeviceError> {
        Self::initialize_with_diagnostics(transport, variant, Arc::new(TracingDiagnostics))
    }

    /// Same as [`initialize`](Self::initialize) with a custom diagnostics hook
    pub fn initialize_with_diagnostics(
        transport: Arc<dyn Transport>,
        variant: Variant,
        diagnostics: Arc<dyn OutputDiagnostics>,
    ) -> Result<Self, DeviceError> {
        let bank = LedBank::new(variant).inspect_err(|e| {
            error!("{}: {}", transport.device_info().label(), e);
        })?;

        Ok(Self::from_controller(
            LedController::new(transport, bank).with_diagnostics(diagnostics),
        ))
    }

    fn from_controller(controller: LedController) -> Self {
        let controller = Arc::new(controller);
        let leds = (0..MAX_LEDS)
            .map(|i| LedRegistration::new(i, Arc::downgrade(&controller)))
            .collect();

        Self {
            controller,
            leds: Mutex::new(leds),
            class: Mutex::new(None),
        }
    }

    /// Publish all sixteen LEDs and open their brightness files to everyone
    ///
    /// If any registration fails, the LEDs registered so far are withdrawn in
    /// reverse order and the failure is returned.
    pub fn register_leds(&self, class: Arc<dyn LedClass>, mode: u32) -> Result<(), DeviceError> {
        let mut leds = self.leds.lock();

        for i in 0..leds.len() {
            let dev = leds[i].class_dev();

            if let Err(source) = class.register(dev) {
                error!("Failed to register {}: {}", leds[i].name, source);

                for led in leds[..i].iter_mut().rev() {
                    if led.registered {
                        class.unregister(&led.name);
                        led.registered = false;
                    }
                }
                return Err(DeviceError::Registration { index: i, source });
            }
            leds[i].registered = true;

            if let Err(e) = class.relax_permissions(&leds[i].name, mode) {
                warn!("Could not relax permissions on {}: {}", leds[i].name, e);
            }
        }

        *self.class.lock() = Some(class);
        info!("Registered {} LEDs", leds.len());
        Ok(())
    }

    /// Withdraw every registered LED
    ///
    /// Holds the bank lock throughout, so no brightness write is in flight
    /// while records are withdrawn. Safe to call repeatedly.
    pub fn teardown(&self) {
        let _bank = self.controller.lock_bank();
        let class = self.class.lock().clone();
        let mut leds = self.leds.lock();

        let Some(class) = class else {
            return;
        };

        for led in leds.iter_mut().filter(|l| l.registered) {
            debug!("Unregistering {}", led.name);
            class.unregister(&led.name);
            led.registered = false;
        }
    }

    /// Number of LEDs currently registered
    pub fn registered_count(&self) -> usize {
        self.leds.lock().iter().filter(|l| l.registered).count()
    }

    /// Output synchronizer, for driving LEDs without the class layer
    pub fn controller(&self) -> &Arc<LedController> {
        &self.controller
    }
}

impl Drop for LedDevice {
    fn drop(&mut self) {
        self.teardown();
        debug!("LedDevice dropped");
    }
}
