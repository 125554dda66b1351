//! Error types for the spectrogram pipeline.
//!
//! Acquisition failures are reported once and leave the application idle.
//! Everything else is a contract violation that aborts the current operation.

use thiserror::Error;

/// Top-level error type for the capture, analysis and render pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The microphone exists but access to it was refused.
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),
    /// No usable audio input is available on this system.
    #[error("Audio input not supported: {0}")]
    NotSupported(String),
    /// A remap was requested over an empty source range, or produced a non-finite value.
    #[error("Invalid remap range: [{from_min}, {from_max}]")]
    InvalidRange { from_min: f64, from_max: f64 },
    /// A spectrum snapshot did not have the length the current geometry expects.
    #[error("Spectrum has {actual} bins, expected {expected}")]
    PreconditionViolation { expected: usize, actual: usize },
    /// A configuration value is out of range or unknown.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
