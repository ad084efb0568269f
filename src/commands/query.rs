//! Query commands: list, descriptor

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use itgio_device::{DescriptorPatcher, ItgioDriver, PatchReport};
use itgio_transport::list_interfaces;

use super::{open_all, CommandResult};

/// List connected interfaces
pub fn list(json: bool) -> CommandResult {
    let interfaces = list_interfaces()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&interfaces)?);
        return Ok(());
    }

    if interfaces.is_empty() {
        println!("No ITG-IO found");
        return Ok(());
    }

    println!("Found {} ITG-IO interface(s):", interfaces.len());
    for iface in &interfaces {
        let info = &iface.info;
        println!(
            "  {}  {}  {}{}",
            info.label(),
            info.device_path,
            info.product_name.as_deref().unwrap_or("Unknown"),
            info.serial
                .as_deref()
                .map(|s| format!(" (serial {s})"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Show raw and patched descriptors, from a file or every connected interface
pub fn descriptor(driver: &ItgioDriver, file: Option<&Path>, write: Option<&Path>) -> CommandResult {
    if let Some(file) = file {
        let raw = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        let mut patched = raw.clone();
        let report = DescriptorPatcher::new(driver.variant()).patch(&mut patched);

        print_descriptor(&file.display().to_string(), &raw, &patched, &report);
        if let Some(out) = write {
            save(out, &patched)?;
        }
        return Ok(());
    }

    let interfaces = open_all(driver)?;
    for iface in &interfaces {
        print_descriptor(
            &iface.transport.device_info().label(),
            &iface.raw,
            &iface.patched,
            &iface.report,
        );
    }

    if let Some(out) = write {
        let lighting = interfaces
            .iter()
            .find(|i| i.report.wants_leds())
            .context("No lighting interface to write")?;
        save(out, &lighting.patched)?;
    }
    Ok(())
}

fn save(out: &Path, patched: &[u8]) -> CommandResult {
    std::fs::write(out, patched).with_context(|| format!("writing {}", out.display()))?;
    println!("Patched descriptor written to {}", out.display());
    Ok(())
}

fn print_descriptor(source: &str, raw: &[u8], patched: &[u8], report: &PatchReport) {
    println!("{source}: {} bytes, role {}", raw.len(), report.role);
    if report.applied.is_empty() {
        println!("  no fixups applied");
    } else {
        println!("  fixups: {}", report.applied.join(", "));
    }
    println!("  raw:");
    print!("{}", hex_rows(raw, None));
    if patched != raw {
        println!("  patched:");
        print!("{}", hex_rows(patched, Some(raw)));
    }
}

/// Hex dump, 16 bytes per row; bytes that differ from `base` are bracketed
fn hex_rows(bytes: &[u8], base: Option<&[u8]>) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "    {:04x}:", row * 16);
        for (i, b) in chunk.iter().enumerate() {
            let changed = base
                .and_then(|base| base.get(row * 16 + i))
                .is_some_and(|orig| orig != b);
            if changed {
                let _ = write!(out, "[{b:02x}]");
            } else {
                let _ = write!(out, " {b:02x} ");
            }
        }
        out.push('\n');
    }
    out
}
