//! Directory-backed LED class
//!
//! Publishes each LED as a sysfs-like directory:
//! ```text
//! <led_dir>/itgio::output3/brightness
//! <led_dir>/itgio::output3/max_brightness
//! ```
//! Writing `1` or `0` to `brightness` and waiting for the next [`DirLedClass::poll`]
//! drives the LED, the same way a write to the kernel attribute would.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use itgio_device::{BrightnessSet, LedClass, LedClassDev, LedClassError};
use parking_lot::Mutex;
use tracing::{debug, warn};

const BRIGHTNESS_FILE: &str = "brightness";
const MAX_BRIGHTNESS_FILE: &str = "max_brightness";

struct DirLed {
    path: PathBuf,
    max_brightness: u8,
    last: u8,
    brightness_set: BrightnessSet,
}

/// LED class rooted at a runtime directory
pub struct DirLedClass {
    base_path: PathBuf,
    leds: Mutex<BTreeMap<String, DirLed>>,
}

impl DirLedClass {
    /// Create the base directory if needed
    pub fn new(base_path: impl Into<PathBuf>) -> io::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            leds: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Directory of one LED
    pub fn led_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Names of the published LEDs
    pub fn names(&self) -> Vec<String> {
        self.leds.lock().keys().cloned().collect()
    }

    /// Pick up brightness writes
    ///
    /// Every LED whose file content differs from the last seen value gets its
    /// callback invoked once. Values above `max_brightness` are clamped and
    /// written back. Returns the number of callbacks invoked.
    pub fn poll(&self) -> usize {
        let mut pending = Vec::new();

        {
            let mut leds = self.leds.lock();
            for (name, led) in leds.iter_mut() {
                let Some(value) = read_brightness(&led.path, name) else {
                    continue;
                };
                let clamped = value.min(u32::from(led.max_brightness)) as u8;
                if clamped != led.last {
                    led.last = clamped;
                    pending.push((name.clone(), led.brightness_set.clone(), clamped));
                }
                if value != u32::from(clamped) {
                    if let Err(e) = write_file(&led.path, BRIGHTNESS_FILE, clamped) {
                        warn!("{}: could not write back clamped value: {}", name, e);
                    }
                }
            }
        }

        // Callbacks take the bank lock; teardown holds that lock while calling
        // back into this class, so they must run with `leds` released.
        for (name, callback, level) in &pending {
            debug!("{} <- {}", name, level);
            callback(*level);
        }
        pending.len()
    }

    /// Poll every `interval` until `running` clears
    ///
    /// Blocks the calling thread: callbacks issue output reports synchronously.
    pub fn poll_until(&self, running: &AtomicBool, interval: Duration) {
        while running.load(Ordering::SeqCst) {
            self.poll();
            thread::sleep(interval);
        }
    }
}

impl LedClass for DirLedClass {
    fn register(&self, led: LedClassDev) -> Result<(), LedClassError> {
        let mut leds = self.leds.lock();
        if leds.contains_key(&led.name) {
            return Err(LedClassError::AlreadyRegistered(led.name));
        }

        let path = self.led_path(&led.name);
        let io_err = |source| LedClassError::Io {
            name: led.name.clone(),
            source,
        };
        fs::create_dir_all(&path).map_err(io_err)?;
        write_file(&path, MAX_BRIGHTNESS_FILE, led.max_brightness).map_err(io_err)?;
        write_file(&path, BRIGHTNESS_FILE, 0).map_err(io_err)?;

        debug!("Published {}", path.display());
        leds.insert(
            led.name,
            DirLed {
                path,
                max_brightness: led.max_brightness,
                last: 0,
                brightness_set: led.brightness_set,
            },
        );
        Ok(())
    }

    fn relax_permissions(&self, name: &str, mode: u32) -> Result<(), LedClassError> {
        let leds = self.leds.lock();
        let led = leds
            .get(name)
            .ok_or_else(|| LedClassError::NotRegistered(name.to_string()))?;

        fs::set_permissions(
            led.path.join(BRIGHTNESS_FILE),
            fs::Permissions::from_mode(mode),
        )
        .map_err(|source| LedClassError::Io {
            name: name.to_string(),
            source,
        })
    }

    fn unregister(&self, name: &str) {
        let Some(led) = self.leds.lock().remove(name) else {
            return;
        };
        if let Err(e) = fs::remove_dir_all(&led.path) {
            debug!("Could not remove {}: {}", led.path.display(), e);
        }
    }
}

impl Drop for DirLedClass {
    fn drop(&mut self) {
        for led in self.leds.get_mut().values() {
            let _ = fs::remove_dir_all(&led.path);
        }
    }
}

fn read_brightness(dir: &Path, name: &str) -> Option<u32> {
    let raw = match fs::read_to_string(dir.join(BRIGHTNESS_FILE)) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("{}: {}", name, e);
            return None;
        }
    };
    match raw.trim().parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("{}: ignoring brightness {:?}", name, raw.trim());
            None
        }
    }
}

/// Write a value to a sysfs-like file
fn write_file(dir: &Path, name: &str, value: u8) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dir.join(name))?;
    writeln!(file, "{}", value)?;
    Ok(())
}
