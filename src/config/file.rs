//! Configuration file management for sgram.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::store::{control, ParamKey};
use crate::error::Error;

/// How spectrum columns are laid out across the canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicyKind {
    /// One-pixel columns over the whole terminal, wrapping continuously
    Scrolling,
    /// Fixed-duration sweep inside an aspect-constrained box, painted with opacity
    #[default]
    Sweep,
}

impl std::fmt::Display for RenderPolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scrolling => write!(f, "scrolling"),
            Self::Sweep => write!(f, "sweep"),
        }
    }
}

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `sgram list-devices`
    /// - device name from `sgram list-devices`
    pub device: String,
    /// Requested capture sample rate in Hz (the device rate wins if it differs)
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            sample_rate: 22050,
        }
    }
}

/// Frequency analysis settings, applied live to the analyser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// FFT window size, a power of two between 32 and 32768
    #[serde(default = "default_fft_size")]
    pub fft_size: u32,
    /// Time averaging between frames (0 = none, 1 = frozen)
    #[serde(default = "default_smoothing_time_constant")]
    pub smoothing_time_constant: f64,
    /// Level mapped to magnitude 0
    #[serde(default = "default_min_decibels")]
    pub min_decibels: f64,
    /// Level mapped to magnitude 255
    #[serde(default = "default_max_decibels")]
    pub max_decibels: f64,
}

impl AnalysisConfig {
    /// Number of frequency bins produced per snapshot.
    pub fn spectrum_length(&self) -> usize {
        self.fft_size as usize / 2
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing_time_constant: default_smoothing_time_constant(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
        }
    }
}

/// Display and rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Column layout: "sweep" or "scrolling"
    #[serde(default)]
    pub policy: RenderPolicyKind,
    /// Seconds for one full horizontal sweep (sweep policy)
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Rendered spectrum columns per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Brightness of a full-scale bin
    #[serde(default = "default_peak_bright")]
    pub peak_bright: u8,
    /// Brightness of the quietest non-silent bin
    #[serde(default = "default_mid_bright")]
    pub mid_bright: u8,
    /// Opacity of each painted column (sweep policy)
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
    /// Height to width ratio of the sweep box
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
    /// Canvas pixels per layout pixel
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    /// Refresh tick interval in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Quiet period after the last resize before the canvas is rebuilt
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Show the measured frame rate in the footer
    #[serde(default)]
    pub show_fps: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            policy: RenderPolicyKind::default(),
            duration: default_duration(),
            frame_rate: default_frame_rate(),
            peak_bright: default_peak_bright(),
            mid_bright: default_mid_bright(),
            fill_opacity: default_fill_opacity(),
            aspect_ratio: default_aspect_ratio(),
            pixel_ratio: default_pixel_ratio(),
            refresh_interval_ms: default_refresh_interval_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            show_fps: false,
        }
    }
}

fn default_fft_size() -> u32 {
    2048
}

fn default_smoothing_time_constant() -> f64 {
    0.1
}

fn default_min_decibels() -> f64 {
    -100.0
}

fn default_max_decibels() -> f64 {
    -70.0
}

fn default_duration() -> f64 {
    15.0
}

fn default_frame_rate() -> u32 {
    24
}

fn default_peak_bright() -> u8 {
    255
}

fn default_mid_bright() -> u8 {
    15
}

fn default_fill_opacity() -> f64 {
    0.9
}

fn default_aspect_ratio() -> f64 {
    1.25
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_refresh_interval_ms() -> u64 {
    16
}

fn default_resize_debounce_ms() -> u64 {
    100
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SgramConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl SgramConfig {
    /// Loads and validates configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed or a value is out of range
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        Self::from_toml(&config_content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: SgramConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every adjustable value against its control bounds and the
    /// remaining display values for positivity.
    ///
    /// # Errors
    /// - `Config` naming the first offending value
    pub fn validate(&self) -> Result<(), Error> {
        let fft = control(ParamKey::FftSize);
        if !fft.accepts(self.analysis.fft_size as f64) {
            return Err(Error::Config(format!(
                "fft_size must be a power of two between 32 and 32768, got {}",
                self.analysis.fft_size
            )));
        }

        let bounded = [
            (ParamKey::SmoothingTimeConstant, self.analysis.smoothing_time_constant),
            (ParamKey::MinDecibels, self.analysis.min_decibels),
            (ParamKey::MaxDecibels, self.analysis.max_decibels),
            (ParamKey::PeakBright, self.display.peak_bright as f64),
            (ParamKey::MidBright, self.display.mid_bright as f64),
            (ParamKey::FillOpacity, self.display.fill_opacity),
            (ParamKey::Duration, self.display.duration),
        ];
        for (key, value) in bounded {
            if !control(key).accepts(value) {
                let c = control(key);
                return Err(Error::Config(format!(
                    "{} must be within [{}, {}], got {}",
                    key, c.min, c.max, value
                )));
            }
        }

        if self.analysis.min_decibels >= self.analysis.max_decibels {
            return Err(Error::Config(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.analysis.min_decibels, self.analysis.max_decibels
            )));
        }

        let positive = [
            ("frame_rate", self.display.frame_rate as f64),
            ("aspect_ratio", self.display.aspect_ratio),
            ("pixel_ratio", self.display.pixel_ratio),
            ("refresh_interval_ms", self.display.refresh_interval_ms as f64),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }

        Ok(())
    }
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find home directory",
            )
        })?
        .join(".config")
        .join("sgram");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("sgram.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let template = include_str!("../../environments/sgram.toml");
        let config = SgramConfig::from_toml(template).unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = SgramConfig::from_toml(
            "[audio]\ndevice = \"default\"\nsample_rate = 44100\n",
        )
        .unwrap();
        assert_eq!(config.analysis.fft_size, 2048);
        assert_eq!(config.analysis.spectrum_length(), 1024);
        assert_eq!(config.display.policy, RenderPolicyKind::Sweep);
        assert_eq!(config.display.frame_rate, 24);
    }

    #[test]
    fn test_policy_parses_lowercase() {
        let config = SgramConfig::from_toml(
            "[audio]\ndevice = \"default\"\nsample_rate = 44100\n[display]\npolicy = \"scrolling\"\n",
        )
        .unwrap();
        assert_eq!(config.display.policy, RenderPolicyKind::Scrolling);
    }

    #[test]
    fn test_rejects_invalid_fft_size() {
        let mut config = SgramConfig::default();
        config.analysis.fft_size = 1000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_degenerate_decibel_window() {
        let mut config = SgramConfig::default();
        config.analysis.min_decibels = -50.0;
        config.analysis.max_decibels = -50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = SgramConfig::default();
        config.display.fill_opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = SgramConfig::default();
        config.display.frame_rate = 0;
        assert!(config.validate().is_err());

        let mut config = SgramConfig::default();
        config.display.duration = 0.0;
        assert!(config.validate().is_err());
    }
}
