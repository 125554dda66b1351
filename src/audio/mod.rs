//! Audio input for sgram.
//!
//! Provides microphone capture and the FFT analyser that turns the captured
//! signal into byte-scaled spectrum snapshots.

pub mod analyser;
pub mod capture;

pub use analyser::{AnalysisEngine, Analyser};
pub use capture::{MicrophoneStream, SampleTap, TAP_CAPACITY};
