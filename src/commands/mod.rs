//! Command handlers for the CLI application.
//!
//! - `query`: read-only commands (list, descriptor)
//! - `lights`: light commands (set, test)
//! - `watch`: button monitor
//! - `serve`: driver daemon

pub mod lights;
pub mod query;
pub mod serve;
pub mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use itgio_device::{ButtonState, ItgioDriver, PatchReport, INPUT_REPORT_LEN};
use itgio_transport::{list_interfaces, open_interface, Transport};
use tracing::{debug, warn};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Largest input report we expect from the board
const INPUT_BUF_LEN: usize = 64;

/// Read timeout that keeps the stop flag responsive
const READ_TIMEOUT_MS: i32 = 20;

/// One opened interface with its descriptor before and after fixup
pub struct ClassifiedInterface {
    pub transport: Arc<dyn Transport>,
    pub raw: Vec<u8>,
    pub patched: Vec<u8>,
    pub report: PatchReport,
}

/// Fetch and patch the descriptor of an opened interface
pub fn classify(
    driver: &ItgioDriver,
    transport: Arc<dyn Transport>,
) -> anyhow::Result<ClassifiedInterface> {
    let raw = transport
        .report_descriptor()
        .with_context(|| format!("reading descriptor of {}", transport.device_info().label()))?;
    let mut patched = raw.clone();
    let report = driver.fixup(transport.as_ref(), &mut patched);

    Ok(ClassifiedInterface {
        transport,
        raw,
        patched,
        report,
    })
}

/// Open and classify every connected ITG-IO interface
pub fn open_all(driver: &ItgioDriver) -> anyhow::Result<Vec<ClassifiedInterface>> {
    let interfaces = list_interfaces()?;
    if interfaces.is_empty() {
        bail!("No ITG-IO found");
    }

    let mut opened = Vec::with_capacity(interfaces.len());
    for iface in &interfaces {
        match open_interface(iface) {
            Ok(transport) => opened.push(classify(driver, transport)?),
            Err(e) => warn!("Skipping {}: {}", iface.info.label(), e),
        }
    }
    if opened.is_empty() {
        bail!("No ITG-IO interface could be opened");
    }
    Ok(opened)
}

/// Open the interface that carries the lights (and the buttons)
pub fn open_lighting(driver: &ItgioDriver) -> anyhow::Result<ClassifiedInterface> {
    open_all(driver)?
        .into_iter()
        .find(|i| i.report.wants_leds())
        .context("No lighting interface found (check the variant or [[interfaces]] calibration)")
}

/// Flag cleared by Ctrl+C
pub fn stop_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl+C handler")?;
    Ok(running)
}

/// Read input reports until `running` clears or `on_change` returns false
///
/// Each report goes through the polarity translator first; `on_change` only
/// sees states that differ from the previous one.
pub fn read_buttons<F>(
    transport: &dyn Transport,
    driver: &ItgioDriver,
    running: &AtomicBool,
    mut on_change: F,
) -> anyhow::Result<()>
where
    F: FnMut(ButtonState, ButtonState) -> bool,
{
    let mut buf = [0u8; INPUT_BUF_LEN];
    let mut last = ButtonState::default();

    while running.load(Ordering::SeqCst) {
        let n = transport
            .read_input_report(&mut buf, READ_TIMEOUT_MS)
            .with_context(|| format!("reading {}", transport.device_info().label()))?;
        if n == 0 {
            continue;
        }
        if n < INPUT_REPORT_LEN {
            debug!("Ignoring {}-byte report", n);
            continue;
        }

        let report = &mut buf[..n];
        driver.raw_event(report);
        let Some(state) = ButtonState::from_translated(report) else {
            continue;
        };

        if state != last {
            let previous = std::mem::replace(&mut last, state);
            if !on_change(state, previous) {
                break;
            }
        }
    }
    Ok(())
}
