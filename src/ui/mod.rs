//! Terminal presentation: the live spectrogram view and the error screen.

pub mod error;
pub mod view;

pub use error::report;
pub use view::{SpectrogramTui, ViewCommand};
