//! Button monitor

use itgio_device::{ButtonState, ItgioDriver};
use tracing::info;

use super::{open_lighting, read_buttons, stop_flag, CommandResult};

/// Print every button change until Ctrl+C
pub fn watch(driver: &ItgioDriver) -> CommandResult {
    let running = stop_flag()?;
    let iface = open_lighting(driver)?;
    info!(
        "Watching {}. Press Ctrl+C to exit.",
        iface.transport.device_info().label()
    );

    read_buttons(iface.transport.as_ref(), driver, &running, |state, previous| {
        for (index, pressed) in state.changed_since(previous) {
            println!(
                "button {:2} {:8} held: {}",
                index,
                if pressed { "pressed" } else { "released" },
                describe(state)
            );
        }
        true
    })
}

/// Held buttons as a space-separated list
fn describe(state: ButtonState) -> String {
    let pressed: Vec<String> = state.pressed().map(|i| i.to_string()).collect();
    if pressed.is_empty() {
        "none".to_string()
    } else {
        pressed.join(" ")
    }
}
