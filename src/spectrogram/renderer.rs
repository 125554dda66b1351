//! Paints spectrum snapshots as vertical strips and tracks the write cursor.
//!
//! Bins are bottom-anchored: bin 0 (lowest frequency) sits at the bottom edge
//! of the canvas and higher bins stack upwards.

use super::canvas::{Canvas, Fill, BLACK};
use super::geometry::Geometry;
use super::policy::RenderPolicy;
use super::remap::remap;
use crate::config::DisplayConfig;
use crate::error::{Error, Result};

/// Horizontal position where the next column is painted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WriteHead {
    x: f64,
}

impl WriteHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        self.x
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
    }

    /// Moves one column to the right, returning to 0 once the canvas edge is reached.
    pub fn advance(&mut self, block_width: f64, canvas_width: usize) -> f64 {
        self.x += block_width;
        if self.x >= canvas_width as f64 {
            self.x = 0.0;
        }
        self.x
    }
}

/// Maps a byte magnitude onto the `[mid_bright, peak_bright]` brightness range.
///
/// Silence stays black. The range is not clamped or reordered, so a
/// `mid_bright` above `peak_bright` inverts the image.
pub fn brightness(magnitude: u8, display: &DisplayConfig) -> Result<u8> {
    if magnitude == 0 {
        return Ok(0);
    }
    let level = remap(
        magnitude as f64,
        0.0,
        255.0,
        display.mid_bright as f64,
        display.peak_bright as f64,
        false,
    )?;
    Ok(level.round() as u8)
}

/// Paints one spectrum snapshot as a column at the write head, then advances it.
///
/// Returns the new cursor position.
///
/// # Errors
/// - `PreconditionViolation` if `spectrum` does not have `geometry.spectrum_length` bins;
///   nothing is painted in that case
pub fn render_frame(
    canvas: &mut Canvas,
    spectrum: &[u8],
    geometry: &Geometry,
    display: &DisplayConfig,
    policy: &dyn RenderPolicy,
    head: &mut WriteHead,
) -> Result<f64> {
    if spectrum.len() != geometry.spectrum_length {
        return Err(Error::PreconditionViolation {
            expected: geometry.spectrum_length,
            actual: spectrum.len(),
        });
    }

    let x = head.position();
    let canvas_height = geometry.canvas_height as f64;
    let block_height = geometry.block_height;

    if policy.erases_column() {
        canvas.fill_rect(x, 0.0, geometry.block_width, canvas_height, Fill::opaque(BLACK));
    }

    for (i, &magnitude) in spectrum.iter().enumerate() {
        let level = brightness(magnitude, display)?;
        let y = canvas_height - block_height - i as f64 * block_height;
        canvas.fill_rect(x, y, geometry.block_width, block_height, policy.fill(level, display));
    }

    Ok(head.advance(geometry.block_width, geometry.canvas_width))
}
