//! Microphone capture module.
//!
//! This module handles audio input device selection and live PCM capture.
//! Audio is captured from the configured (or system default) input device,
//! converted to mono, and kept in a bounded tap that the analyser reads the
//! most recent window from.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Largest window the analyser can request.
pub const TAP_CAPACITY: usize = 32768;

/// Bounded, shared buffer of the most recent mono samples.
#[derive(Debug, Clone)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Appends samples, dropping the oldest beyond capacity.
    pub fn push(&self, data: &[f32]) {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        samples.extend(data.iter().copied());
        let excess = samples.len().saturating_sub(self.capacity);
        samples.drain(..excess);
    }

    /// Copies the most recent `out.len()` samples into `out`, oldest first.
    /// Missing history is filled with silence at the front.
    pub fn latest(&self, out: &mut [f32]) {
        let samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        let available = samples.len().min(out.len());
        let pad = out.len() - available;
        out[..pad].fill(0.0);
        for (slot, &sample) in out[pad..]
            .iter_mut()
            .zip(samples.iter().skip(samples.len() - available))
        {
            *slot = sample;
        }
    }
}

/// Live microphone input feeding a [`SampleTap`].
///
/// The stream keeps running until this value is dropped.
pub struct MicrophoneStream {
    /// Actual capture sample rate from device
    sample_rate: u32,
    /// Number of channels in device's native format
    device_channels: usize,
    /// Human-readable device name
    device_name: String,
    /// Active audio input stream (kept alive while capturing)
    _stream: cpal::Stream,
}

impl MicrophoneStream {
    /// Opens the requested input device and starts streaming into `tap`.
    ///
    /// # Arguments
    /// * `device_spec` - "default", a device index, or a device name
    /// * `requested_sample_rate` - The desired sample rate in Hz (the device rate wins)
    /// * `tap` - Destination for mono samples
    ///
    /// # Errors
    /// - `NotSupported` if no input device or usable stream configuration exists
    /// - `PermissionDenied` if the backend refuses access to the device
    pub fn open(device_spec: &str, requested_sample_rate: u32, tap: SampleTap) -> Result<Self> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if device_spec == "default" {
                host.default_input_device()
                    .ok_or_else(|| Error::NotSupported("No audio input device available".to_string()))
            } else {
                find_device_by_name(&host, device_spec)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config().map_err(classify)?;
        let sample_rate = device_config.sample_rate().0;
        let device_channels = device_config.channels() as usize;

        if sample_rate != requested_sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                requested_sample_rate,
                sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            device_channels,
            device_config.sample_format()
        );

        let stream_config: cpal::StreamConfig = device_config.clone().into();
        let stream = match device_config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, tap, device_channels)
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, tap, device_channels)
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, tap, device_channels)
            }
            other => Err(Error::NotSupported(format!(
                "Unsupported sample format: {other:?}"
            ))),
        }?;

        stream.play().map_err(classify)?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            sample_rate,
            device_channels,
            device_name,
            _stream: stream,
        })
    }

    /// Returns the actual sample rate of the capture.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_channels(&self) -> usize {
        self.device_channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tap: SampleTap,
    channels: usize,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut mono = Vec::new();
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                downmix(data, channels, &mut mono);
                tap.push(&mono);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(classify)
}

/// Averages interleaved frames of `channels` samples into mono.
fn downmix<T>(data: &[T], channels: usize, out: &mut Vec<f32>)
where
    T: Sample,
    f32: FromSample<T>,
{
    out.clear();
    match channels {
        0 | 1 => out.extend(data.iter().map(|&s| f32::from_sample(s))),
        _ => {
            for frame in data.chunks_exact(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                out.push(sum / channels as f32);
            }
        }
    }
}

/// Maps a backend failure onto the acquisition error taxonomy.
fn classify(err: impl std::fmt::Display) -> Error {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if ["permission", "denied", "not permitted", "access"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        Error::PermissionDenied(message)
    } else {
        Error::NotSupported(message)
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| Error::NotSupported(format!("Failed to enumerate devices: {e}")))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            Error::NotSupported(format!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().map(|name| name == device_spec).unwrap_or(false))
        .ok_or_else(|| {
            Error::NotSupported(format!(
                "Audio input device '{device_spec}' not found. Use 'sgram list-devices' to see available devices."
            ))
        })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let dev_null = match OpenOptions::new().write(true).open("/dev/null") {
        Ok(file) => file,
        // Without /dev/null the warnings are merely noisy
        Err(_) => return f(),
    };

    let dev_null_fd = dev_null.as_raw_fd();

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }

    // Redirect stderr to /dev/null
    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_keeps_most_recent() {
        let tap = SampleTap::new(4);
        tap.push(&[1.0, 2.0, 3.0]);
        tap.push(&[4.0, 5.0, 6.0]);

        let mut out = [0.0; 3];
        tap.latest(&mut out);
        assert_eq!(out, [4.0, 5.0, 6.0]);

        // only four samples are retained
        let mut all = [9.0; 6];
        tap.latest(&mut all);
        assert_eq!(all, [0.0, 0.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_tap_pads_missing_history() {
        let tap = SampleTap::new(8);
        tap.push(&[0.5, 0.25]);
        let mut out = [9.0; 4];
        tap.latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.5, 0.25]);
    }

    #[test]
    fn test_downmix_averages_channels() {
        let mut out = Vec::new();
        downmix(&[0.5f32, -0.5, 1.0, 0.0], 2, &mut out);
        assert_eq!(out, vec![0.0, 0.5]);

        downmix(&[i16::MAX, i16::MAX], 1, &mut out);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_classify_permission_errors() {
        assert!(matches!(
            classify("Permission denied (os error 13)"),
            Error::PermissionDenied(_)
        ));
        assert!(matches!(
            classify("The requested device is no longer available"),
            Error::NotSupported(_)
        ));
    }
}
