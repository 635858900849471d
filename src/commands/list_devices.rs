//! List available audio input and output devices.

use crate::audio::device::{list_devices, Direction};
use cpal::traits::DeviceTrait;

/// Prints input and output devices with their IDs and default configurations.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    println!();
    println!("voxclip audio devices");

    print_devices(Direction::Input)?;
    print_devices(Direction::Output)?;

    println!("Use an ID or name as input_device/output_device in ~/.config/voxclip/voxclip.toml");
    Ok(())
}

fn print_devices(direction: Direction) -> anyhow::Result<()> {
    let (devices, default_name) = list_devices(direction)?;
    let heading = match direction {
        Direction::Input => "Input devices (recording)",
        Direction::Output => "Output devices (playback)",
    };

    println!();
    println!("{heading}:");
    println!();

    if devices.is_empty() {
        println!("  No devices found.");
        println!();
        return Ok(());
    }

    for (index, device) in devices.iter().enumerate() {
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let default_indicator = if default_name.as_ref() == Some(&device_name) {
            " [DEFAULT]"
        } else {
            ""
        };

        let config = match direction {
            Direction::Input => device.default_input_config(),
            Direction::Output => device.default_output_config(),
        };
        let config_info = match config {
            Ok(config) => format!(
                " ({}Hz, {} channels, {:?})",
                config.sample_rate().0,
                config.channels(),
                config.sample_format()
            ),
            Err(_) => " (configuration unavailable)".to_string(),
        };

        println!("  ID: {index}");
        println!("    Name: {device_name}{default_indicator}");
        println!("    Config:{config_info}");
        println!();
    }

    Ok(())
}
