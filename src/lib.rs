// ITG-IO userspace driver - shared library
// Configuration, LED endpoints and the virtual gamepad used by the daemon

pub mod config;
pub mod gamepad;
pub mod led_class;

pub use config::ItgioConfig;
pub use gamepad::{GamepadError, VirtualGamepad};
pub use led_class::DirLedClass;
