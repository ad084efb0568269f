//! Virtual gamepad device using evdev/uinput
//!
//! Re-publishes the translated button bitmap as a 16-button gamepad, so the
//! board works with software that only looks at evdev devices.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key,
};
use itgio_device::{ButtonState, BUTTON_COUNT};
use thiserror::Error;

/// Errors from virtual gamepad operations
#[derive(Debug, Error)]
pub enum GamepadError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Failed to emit event: {0}")]
    EmitEvent(#[source] std::io::Error),
}

/// Key code for button `index`
pub fn button_key(index: usize) -> Key {
    Key::new(Key::BTN_TRIGGER_HAPPY1.code() + index as u16)
}

/// Virtual gamepad device
pub struct VirtualGamepad {
    device: VirtualDevice,
    /// Last state sent (for change detection)
    state: ButtonState,
}

impl VirtualGamepad {
    /// Create a new virtual gamepad
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest` and game controller settings)
    pub fn new(name: &str) -> Result<Self, GamepadError> {
        let mut keys = AttributeSet::<Key>::new();
        for i in 0..BUTTON_COUNT {
            keys.insert(button_key(i));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(GamepadError::CreateDevice)?
            .name(name)
            .with_keys(&keys)
            .map_err(GamepadError::CreateDevice)?
            .build()
            .map_err(GamepadError::CreateDevice)?;

        Ok(Self {
            device,
            state: ButtonState::default(),
        })
    }

    /// Send the buttons that changed since the last update
    ///
    /// Returns the number of key events emitted.
    pub fn update(&mut self, state: ButtonState) -> Result<usize, GamepadError> {
        let events: Vec<_> = state
            .changed_since(self.state)
            .into_iter()
            .map(|(i, pressed)| {
                InputEvent::new_now(EventType::KEY, button_key(i).code(), i32::from(pressed))
            })
            .collect();

        if !events.is_empty() {
            self.device
                .emit(&events)
                .map_err(GamepadError::EmitEvent)?;
        }
        self.state = state;
        Ok(events.len())
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}
