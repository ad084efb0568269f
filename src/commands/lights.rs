//! Light commands: set, test

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use itgio_device::{ItgioDriver, LedDevice, LedWrite, INPUT_REPORT_LEN, LIGHT_NAMES, MAX_LEDS};
use itgio_transport::Transport;
use tracing::{debug, info};

use super::{open_lighting, stop_flag, CommandResult};

/// Open the lighting interface with a bank seeded from the board
fn open_bank(driver: &ItgioDriver) -> anyhow::Result<LedDevice> {
    let iface = open_lighting(driver)?;
    let device = LedDevice::initialize(iface.transport.clone(), driver.variant())?;

    match read_light_echo(iface.transport.as_ref()) {
        Some(bitmap) => device.controller().restore(bitmap),
        None => {
            debug!("No light echo from board, starting from all off");
            device.controller().flush()?;
        }
    }
    Ok(device)
}

/// Current lights as reported back in the first two bytes of an input report
fn read_light_echo(transport: &dyn Transport) -> Option<u16> {
    let mut buf = [0u8; 64];
    match transport.read_input_report(&mut buf, 250) {
        Ok(n) if n >= INPUT_REPORT_LEN => Some(u16::from_le_bytes([buf[0], buf[1]])),
        _ => None,
    }
}

/// Switch one light
pub fn set(driver: &ItgioDriver, index: usize, level: u8) -> CommandResult {
    if index >= MAX_LEDS {
        bail!("Light index {} out of range (0-{})", index, MAX_LEDS - 1);
    }

    let device = open_bank(driver)?;
    let state = if level != 0 { "on" } else { "off" };

    match device.controller().set_brightness(index, level) {
        LedWrite::Written => println!("{} ({}) {}", index, LIGHT_NAMES[index], state),
        LedWrite::Unchanged => println!("{} ({}) already {}", index, LIGHT_NAMES[index], state),
        LedWrite::WriteFailed => bail!("Failed to update light {}", index),
        LedWrite::Rejected => bail!("Light index {} rejected", index),
    }
    Ok(())
}

/// Clear every light, then walk them in cabinet order until Ctrl+C
pub fn test(driver: &ItgioDriver, delay_ms: u64) -> CommandResult {
    let running = stop_flag()?;
    let device = open_bank(driver)?;
    let ctl = device.controller();
    let delay = Duration::from_millis(delay_ms);

    ctl.restore(0);
    ctl.flush().context("clearing lights")?;
    info!("Light test running. Press Ctrl+C to exit.");

    'outer: while running.load(Ordering::SeqCst) {
        for (index, name) in LIGHT_NAMES.iter().enumerate() {
            if !running.load(Ordering::SeqCst) {
                break 'outer;
            }
            println!("{name}");
            ctl.set_brightness(index, 1);
            thread::sleep(delay);
            ctl.set_brightness(index, 0);
            thread::sleep(delay);
        }
    }

    ctl.restore(0);
    ctl.flush().context("clearing lights")?;
    println!("Lights cleared");
    Ok(())
}
