//! Byte-scaled frequency analysis of the live capture.
//!
//! Produces one magnitude per bin in 0..=255 from the most recent `fft_size`
//! samples: Blackman window, forward FFT, time smoothing between snapshots,
//! and a linear decibel window mapped onto the byte range.

use rustfft::{num_complex::Complex, FftPlanner};

use super::capture::SampleTap;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};

/// Source of spectrum snapshots for the render pipeline.
pub trait AnalysisEngine {
    /// Applies live analysis settings. A changed FFT size changes `spectrum_length`.
    fn apply(&mut self, settings: &AnalysisConfig);

    /// Number of bins per snapshot (`fft_size / 2`).
    fn spectrum_length(&self) -> usize;

    /// Writes the current magnitudes into `buffer`.
    ///
    /// # Errors
    /// - `PreconditionViolation` if `buffer` is not `spectrum_length` long
    fn fill_spectrum(&mut self, buffer: &mut [u8]) -> Result<()>;
}

/// FFT analyser reading from a capture tap.
pub struct Analyser {
    tap: SampleTap,
    fft_planner: FftPlanner<f32>,
    settings: AnalysisConfig,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    smoothed: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl Analyser {
    pub fn new(tap: SampleTap, settings: &AnalysisConfig) -> Self {
        let mut analyser = Self {
            tap,
            fft_planner: FftPlanner::new(),
            settings: settings.clone(),
            window: Vec::new(),
            time_domain: Vec::new(),
            smoothed: Vec::new(),
            buffer: Vec::new(),
        };
        analyser.resize(settings.fft_size as usize);
        analyser
    }

    fn resize(&mut self, fft_size: usize) {
        self.window = blackman_window(fft_size);
        self.time_domain = vec![0.0; fft_size];
        self.smoothed = vec![0.0; fft_size / 2];
        self.buffer = vec![Complex::new(0.0, 0.0); fft_size];
    }

    /// Analyses the captured window in `time_domain` into `out`.
    fn analyse(&mut self, out: &mut [u8]) {
        let fft_size = self.time_domain.len();

        for ((slot, &sample), &w) in self
            .buffer
            .iter_mut()
            .zip(self.time_domain.iter())
            .zip(self.window.iter())
        {
            *slot = Complex::new(sample * w, 0.0);
        }

        let fft = self.fft_planner.plan_fft_forward(fft_size);
        fft.process(&mut self.buffer);

        let tau = self.settings.smoothing_time_constant as f32;
        let min_db = self.settings.min_decibels as f32;
        let range_db = (self.settings.max_decibels - self.settings.min_decibels) as f32;
        let scale = 1.0 / fft_size as f32;

        for ((level, bin), byte) in self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .zip(out.iter_mut())
        {
            let magnitude = bin.norm() * scale;
            let mut next = tau * *level + (1.0 - tau) * magnitude;
            if !next.is_finite() {
                next = 0.0;
            }
            *level = next;

            let db = 20.0 * next.log10();
            let scaled = (255.0 / range_db * (db - min_db)).floor();
            *byte = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }
    }
}

impl AnalysisEngine for Analyser {
    fn apply(&mut self, settings: &AnalysisConfig) {
        if settings.fft_size != self.settings.fft_size {
            tracing::debug!(
                "Analyser FFT size changed from {} to {}",
                self.settings.fft_size,
                settings.fft_size
            );
            self.resize(settings.fft_size as usize);
        }
        self.settings = settings.clone();
    }

    fn spectrum_length(&self) -> usize {
        self.settings.spectrum_length()
    }

    fn fill_spectrum(&mut self, buffer: &mut [u8]) -> Result<()> {
        let expected = self.spectrum_length();
        if buffer.len() != expected {
            return Err(Error::PreconditionViolation {
                expected,
                actual: buffer.len(),
            });
        }

        self.tap.latest(&mut self.time_domain);
        self.analyse(buffer);
        Ok(())
    }
}

/// Blackman window coefficients for `len` samples.
fn blackman_window(len: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    let n = len as f32;
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / n;
            A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
        })
        .collect()
}
