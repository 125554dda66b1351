//! Live, user-adjustable parameter set.
//!
//! Every adjustment goes through [`ConfigStore::adjust`], which moves a value by
//! one step (or one position in an enumerated list), rounds it to the control's
//! display precision and keeps it inside the control bounds. The decibel window
//! is kept non-degenerate across both of its ends.

use std::fmt;
use std::str::FromStr;

use super::file::{AnalysisConfig, DisplayConfig};
use crate::error::{Error, Result};

/// Parameters exposed on the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    FftSize,
    SmoothingTimeConstant,
    MinDecibels,
    MaxDecibels,
    PeakBright,
    MidBright,
    FillOpacity,
    Duration,
}

impl ParamKey {
    /// All keys in panel order.
    pub const ALL: [ParamKey; 8] = [
        ParamKey::FftSize,
        ParamKey::SmoothingTimeConstant,
        ParamKey::MinDecibels,
        ParamKey::MaxDecibels,
        ParamKey::PeakBright,
        ParamKey::MidBright,
        ParamKey::FillOpacity,
        ParamKey::Duration,
    ];

    /// Stable identifier, as accepted by [`FromStr`].
    pub fn id(self) -> &'static str {
        match self {
            ParamKey::FftSize => "fftSize",
            ParamKey::SmoothingTimeConstant => "smoothingTimeConstant",
            ParamKey::MinDecibels => "minDecibels",
            ParamKey::MaxDecibels => "maxDecibels",
            ParamKey::PeakBright => "peakBright",
            ParamKey::MidBright => "midBright",
            ParamKey::FillOpacity => "fillOpacity",
            ParamKey::Duration => "duration",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParamKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ParamKey::ALL
            .into_iter()
            .find(|key| key.id() == s)
            .ok_or_else(|| Error::Config(format!("Unknown parameter '{s}'")))
    }
}

/// Direction of a single adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

/// How a control moves between values.
#[derive(Debug, Clone, Copy)]
pub enum Stepping {
    /// Add or subtract a fixed step
    Step(f64),
    /// Move one position through an ordered list
    Values(&'static [f64]),
}

/// Bounds and stepping for one adjustable parameter.
#[derive(Debug, Clone, Copy)]
pub struct Control {
    pub key: ParamKey,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub stepping: Stepping,
    /// Decimal places kept after each adjustment
    pub precision: u32,
}

impl Control {
    /// Whether `value` is a legal setting for this control.
    pub fn accepts(&self, value: f64) -> bool {
        match self.stepping {
            Stepping::Values(values) => values.contains(&value),
            Stepping::Step(_) => value.is_finite() && value >= self.min && value <= self.max,
        }
    }

    fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        (value * scale).round() / scale
    }
}

const FFT_SIZES: [f64; 11] = [
    32.0, 64.0, 128.0, 256.0, 512.0, 1024.0, 2048.0, 4096.0, 8192.0, 16384.0, 32768.0,
];

const CONTROLS: [Control; 8] = [
    Control {
        key: ParamKey::FftSize,
        label: "FFT Size",
        min: 32.0,
        max: 32768.0,
        stepping: Stepping::Values(&FFT_SIZES),
        precision: 0,
    },
    Control {
        key: ParamKey::SmoothingTimeConstant,
        label: "Smoothing Time Constant",
        min: 0.0,
        max: 1.0,
        stepping: Stepping::Step(0.1),
        precision: 1,
    },
    Control {
        key: ParamKey::MinDecibels,
        label: "Min Decibels",
        min: -100.0,
        max: 0.0,
        stepping: Stepping::Step(10.0),
        precision: 0,
    },
    Control {
        key: ParamKey::MaxDecibels,
        label: "Max Decibels",
        min: -100.0,
        max: 0.0,
        stepping: Stepping::Step(10.0),
        precision: 0,
    },
    Control {
        key: ParamKey::PeakBright,
        label: "Peak Bright",
        min: 0.0,
        max: 255.0,
        stepping: Stepping::Step(15.0),
        precision: 0,
    },
    Control {
        key: ParamKey::MidBright,
        label: "Mid Bright",
        min: 0.0,
        max: 255.0,
        stepping: Stepping::Step(15.0),
        precision: 0,
    },
    Control {
        key: ParamKey::FillOpacity,
        label: "Fill Opacity",
        min: 0.0,
        max: 1.0,
        stepping: Stepping::Step(0.1),
        precision: 1,
    },
    Control {
        key: ParamKey::Duration,
        label: "Duration (s)",
        min: 1.0,
        max: 60.0,
        stepping: Stepping::Step(1.0),
        precision: 0,
    },
];

/// Returns the control descriptor for `key`.
pub fn control(key: ParamKey) -> &'static Control {
    let index = match key {
        ParamKey::FftSize => 0,
        ParamKey::SmoothingTimeConstant => 1,
        ParamKey::MinDecibels => 2,
        ParamKey::MaxDecibels => 3,
        ParamKey::PeakBright => 4,
        ParamKey::MidBright => 5,
        ParamKey::FillOpacity => 6,
        ParamKey::Duration => 7,
    };
    &CONTROLS[index]
}

/// The live parameter set read by the analyser, geometry and renderer.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    analysis: AnalysisConfig,
    display: DisplayConfig,
}

impl ConfigStore {
    pub fn new(analysis: AnalysisConfig, display: DisplayConfig) -> Self {
        Self { analysis, display }
    }

    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Current value of `key` as a number.
    pub fn current_value(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::FftSize => self.analysis.fft_size as f64,
            ParamKey::SmoothingTimeConstant => self.analysis.smoothing_time_constant,
            ParamKey::MinDecibels => self.analysis.min_decibels,
            ParamKey::MaxDecibels => self.analysis.max_decibels,
            ParamKey::PeakBright => self.display.peak_bright as f64,
            ParamKey::MidBright => self.display.mid_bright as f64,
            ParamKey::FillOpacity => self.display.fill_opacity,
            ParamKey::Duration => self.display.duration,
        }
    }

    fn set_value(&mut self, key: ParamKey, value: f64) {
        match key {
            ParamKey::FftSize => self.analysis.fft_size = value as u32,
            ParamKey::SmoothingTimeConstant => self.analysis.smoothing_time_constant = value,
            ParamKey::MinDecibels => self.analysis.min_decibels = value,
            ParamKey::MaxDecibels => self.analysis.max_decibels = value,
            ParamKey::PeakBright => self.display.peak_bright = value as u8,
            ParamKey::MidBright => self.display.mid_bright = value as u8,
            ParamKey::FillOpacity => self.display.fill_opacity = value,
            ParamKey::Duration => self.display.duration = value,
        }
    }

    /// Moves `key` one step in `direction` and returns the resulting value.
    ///
    /// Enumerated controls stop at either end of their list. Stepped controls are
    /// rounded to their precision and clamped to their bounds. `minDecibels` never
    /// reaches `maxDecibels` and vice versa.
    pub fn adjust(&mut self, key: ParamKey, direction: Direction) -> f64 {
        let control = control(key);
        let current = self.current_value(key);

        let mut next = match control.stepping {
            Stepping::Values(values) => {
                let index = values.iter().position(|v| *v == current).unwrap_or(0);
                let next_index = match direction {
                    Direction::Decrement => index.saturating_sub(1),
                    Direction::Increment => (index + 1).min(values.len() - 1),
                };
                values[next_index]
            }
            Stepping::Step(step) => {
                let moved = match direction {
                    Direction::Decrement => current - step,
                    Direction::Increment => current + step,
                };
                control.round(moved).clamp(control.min, control.max)
            }
        };

        // The fallback stays inside the control bounds and never moves against
        // the requested direction. Otherwise the value is left where it was.
        if let Stepping::Step(step) = control.stepping {
            match key {
                ParamKey::MinDecibels if next >= self.analysis.max_decibels => {
                    let fallback = (self.analysis.max_decibels - step).clamp(control.min, control.max);
                    next = if fallback < self.analysis.max_decibels && fallback >= current {
                        fallback
                    } else {
                        current
                    };
                }
                ParamKey::MaxDecibels if next <= self.analysis.min_decibels => {
                    let fallback = (self.analysis.min_decibels + step).clamp(control.min, control.max);
                    next = if fallback > self.analysis.min_decibels && fallback <= current {
                        fallback
                    } else {
                        current
                    };
                }
                _ => {}
            }
        }

        if next != current {
            tracing::debug!("Adjusted {} from {} to {}", key, current, next);
        }
        self.set_value(key, next);
        next
    }

    /// Whether moving `key` in `direction` is blocked by the control bounds.
    pub fn is_at_bound(&self, key: ParamKey, direction: Direction) -> bool {
        let control = control(key);
        let current = self.current_value(key);
        match direction {
            Direction::Decrement => current <= control.min,
            Direction::Increment => current >= control.max,
        }
    }
}
