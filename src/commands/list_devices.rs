//! List available audio input devices.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::audio::capture::suppress_alsa_warnings;

/// One input device as shown to the user.
struct DeviceEntry {
    name: String,
    is_default: bool,
    config: Option<(u32, u16)>,
}

/// Lists all available audio input devices on the system.
///
/// The ID column is what `--device` and `audio.device` accept, besides the name.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let entries = suppress_alsa_warnings(|| -> anyhow::Result<Vec<DeviceEntry>> {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?;

        // Devices that cannot report a name are skipped
        Ok(devices
            .filter_map(|device| {
                let name = device.name().ok()?;
                let config = device
                    .default_input_config()
                    .ok()
                    .map(|c| (c.sample_rate().0, c.channels()));
                Some(DeviceEntry {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    config,
                })
            })
            .collect())
    })?;

    if entries.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Available audio input devices:");
    println!();
    for (index, entry) in entries.iter().enumerate() {
        print!("{}", describe(index, entry));
    }

    Ok(())
}

fn describe(index: usize, entry: &DeviceEntry) -> String {
    let default_indicator = if entry.is_default { " [DEFAULT]" } else { "" };
    let config = match entry.config {
        Some((rate, channels)) => format!("{rate}Hz, {channels} channels"),
        None => "configuration unavailable".to_string(),
    };
    format!(
        "  ID: {index}\n    Name: {}{default_indicator}\n    Config: {config}\n\n",
        entry.name
    )
}
