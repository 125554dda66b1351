//! Spectrogram rendering pipeline.
//!
//! Turns spectrum snapshots into columns on an owned pixel canvas: geometry
//! resolution, frame pacing, column painting and the session that ties them to
//! the live configuration.

pub mod canvas;
pub mod clock;
pub mod debounce;
pub mod geometry;
pub mod policy;
pub mod remap;
pub mod renderer;
pub mod session;

pub use canvas::Canvas;
pub use clock::{FrameClock, Tick};
pub use debounce::Debounce;
pub use geometry::Viewport;
pub use session::Session;
