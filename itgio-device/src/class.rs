//! LED class-device seam
//!
//! The class-device subsystem publishes each LED as a brightness endpoint and
//! calls back into the driver when someone writes to it. Implementations live
//! outside this crate (a sysfs-like directory in the daemon, in-memory doubles
//! in tests).

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// World read/write permission bits for brightness endpoints
pub const MODE_WORLD_RW: u32 = 0o666;

/// Callback invoked with the requested brightness level
pub type BrightnessSet = Arc<dyn Fn(u8) + Send + Sync>;

/// Registration payload for one LED
#[derive(Clone)]
pub struct LedClassDev {
    /// Stable endpoint name, e.g. `itgio::output3`
    pub name: String,
    /// Highest level the endpoint accepts
    pub max_brightness: u8,
    /// Entry point for brightness changes
    pub brightness_set: BrightnessSet,
}

impl fmt::Debug for LedClassDev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedClassDev")
            .field("name", &self.name)
            .field("max_brightness", &self.max_brightness)
            .finish_non_exhaustive()
    }
}

/// Errors reported by a class-device backend
#[derive(Error, Debug)]
pub enum LedClassError {
    #[error("LED '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("LED '{0}' is not registered")]
    NotRegistered(String),

    #[error("I/O error on LED '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Registration rejected: {0}")]
    Rejected(String),
}

/// Class-device subsystem
pub trait LedClass: Send + Sync {
    /// Publish an LED endpoint
    fn register(&self, led: LedClassDev) -> Result<(), LedClassError>;

    /// Change the access mode of the endpoint's brightness attribute
    fn relax_permissions(&self, name: &str, mode: u32) -> Result<(), LedClassError>;

    /// Withdraw an LED endpoint
    fn unregister(&self, name: &str);
}
