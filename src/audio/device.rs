//! Audio device lookup shared by capture, playback and `list-devices`.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Direction of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Resolves a device spec: "default", a numeric index, or a device name.
///
/// # Errors
/// - If no default device exists
/// - If the index is out of range or the name matches no device
pub fn resolve_device(direction: Direction, spec: &str) -> Result<cpal::Device> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if spec == "default" {
            let device = match direction {
                Direction::Input => host.default_input_device(),
                Direction::Output => host.default_output_device(),
            };
            return device.ok_or_else(|| anyhow!("No audio {} device available", direction.label()));
        }

        find_device(&host, direction, spec)
    })
}

/// Lists devices for one direction, skipping devices whose name cannot be read.
pub fn list_devices(direction: Direction) -> Result<(Vec<cpal::Device>, Option<String>)> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let devices = named(enumerate(&host, direction)?, |d| d.name().ok())
            .into_iter()
            .map(|(device, _)| device)
            .collect();
        let default_name = match direction {
            Direction::Input => host.default_input_device(),
            Direction::Output => host.default_output_device(),
        }
        .and_then(|d| d.name().ok());
        Ok((devices, default_name))
    })
}

fn enumerate(host: &cpal::Host, direction: Direction) -> Result<Vec<cpal::Device>> {
    let devices = match direction {
        Direction::Input => host.input_devices().map(|d| d.collect()),
        Direction::Output => host.output_devices().map(|d| d.collect()),
    };
    devices.map_err(|e| anyhow!("Failed to enumerate devices: {e}"))
}

/// Pairs devices with their names, dropping the ones whose name cannot be read.
///
/// Indices in a device spec refer to this list, as printed by `list-devices`.
fn named<D>(devices: Vec<D>, name_of: impl Fn(&D) -> Option<String>) -> Vec<(D, String)> {
    devices
        .into_iter()
        .filter_map(|device| name_of(&device).map(|name| (device, name)))
        .collect()
}

fn find_device(host: &cpal::Host, direction: Direction, spec: &str) -> Result<cpal::Device> {
    let devices = named(enumerate(host, direction)?, |d| d.name().ok());
    select_device(devices, direction, spec)
}

fn select_device<D>(devices: Vec<(D, String)>, direction: Direction, spec: &str) -> Result<D> {
    if let Ok(index) = spec.parse::<usize>() {
        let count = devices.len();
        return devices
            .into_iter()
            .nth(index)
            .map(|(device, _)| device)
            .ok_or_else(|| {
                anyhow!(
                    "Device index {} is out of range (0-{})",
                    index,
                    count.saturating_sub(1)
                )
            });
    }

    devices
        .into_iter()
        .find(|(_, name)| name == spec)
        .map(|(device, _)| device)
        .ok_or_else(|| {
            anyhow!(
                "Audio {} device '{spec}' not found. Use 'voxclip list-devices' to see available devices.",
                direction.label()
            )
        })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// ALSA only exists on Linux, nothing to suppress elsewhere.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
