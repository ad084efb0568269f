//! Driver daemon
//!
//! Attaches every interface, publishes the lights under `led_dir`, forwards
//! buttons to the virtual gamepad and tears everything down on Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use itgio_device::{Attachment, ButtonState, ItgioDriver, LedClass, LedDevice};
use itgio_driver::{DirLedClass, ItgioConfig, VirtualGamepad};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{open_all, read_buttons, CommandResult};

/// Pick the interfaces to read buttons from and the devices to tear down
///
/// Buttons arrive on the lighting interface, so it is read even when its
/// LEDs failed to register.
fn split_attachments<T>(attached: Vec<(T, Attachment)>) -> (Vec<T>, Vec<LedDevice>) {
    let mut inputs = Vec::new();
    let mut devices = Vec::new();
    for (transport, attachment) in attached {
        if !attachment.report.wants_leds() {
            continue;
        }
        inputs.push(transport);
        devices.extend(attachment.device);
    }
    (inputs, devices)
}

pub async fn serve(config: &ItgioConfig, driver: ItgioDriver) -> CommandResult {
    let class = Arc::new(
        DirLedClass::new(&config.led_dir)
            .with_context(|| format!("creating {}", config.led_dir.display()))?,
    );
    info!("Publishing lights under {}", class.path().display());

    let mut attached = Vec::new();
    for iface in open_all(&driver)? {
        let mut rdesc = iface.raw.clone();
        let class: Arc<dyn LedClass> = class.clone();
        let attachment = driver.attach(&mut rdesc, iface.transport.clone(), class);
        attached.push((iface.transport, attachment));
    }
    let (inputs, devices) = split_attachments(attached);
    if inputs.is_empty() {
        bail!("No lighting interface found (check the variant or [[interfaces]] calibration)");
    }
    if devices.is_empty() {
        warn!("No lights published; forwarding buttons only");
    }

    let mut gamepad = if config.gamepad {
        match VirtualGamepad::new(&config.gamepad_name) {
            Ok(mut pad) => {
                if let Some(path) = pad.device_path() {
                    info!("Virtual gamepad at {}", path.display());
                }
                Some(pad)
            }
            Err(e) => {
                warn!("Virtual gamepad unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let running = Arc::new(AtomicBool::new(true));
    let (tx, mut rx) = mpsc::unbounded_channel::<ButtonState>();
    let mut readers = Vec::new();
    for transport in inputs {
        let driver = driver.clone();
        let running = running.clone();
        let tx = tx.clone();
        readers.push(tokio::task::spawn_blocking(move || {
            let label = transport.device_info().label();
            let result = read_buttons(transport.as_ref(), &driver, &running, |state, _| {
                tx.send(state).is_ok()
            });
            if let Err(e) = result {
                error!("{}: button reader stopped: {:#}", label, e);
            }
        }));
    }
    drop(tx);

    // Off the executor: each brightness change is a blocking output write
    let poller = {
        let class = class.clone();
        let running = running.clone();
        let interval = config.poll_interval();
        tokio::task::spawn_blocking(move || class.poll_until(&running, interval))
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Driver running. Press Ctrl+C to exit.");
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Shutting down");
                break;
            }
            Some(state) = rx.recv() => {
                if let Some(pad) = gamepad.as_mut() {
                    if let Err(e) = pad.update(state) {
                        warn!("Failed to update gamepad: {}", e);
                    }
                }
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    let _ = poller.await;
    for reader in readers {
        let _ = reader.await;
    }
    for device in devices {
        driver.remove(device);
    }
    Ok(())
}
