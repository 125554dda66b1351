//! Canvas and block dimensions derived from the viewport and configuration.

use super::policy::RenderPolicy;
use crate::config::{AnalysisConfig, DisplayConfig};

/// Space available to the canvas, in layout pixels, and the scale to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

/// Pixel dimensions of the canvas and of one rendered spectrum block.
///
/// Always produced by [`resolve`]; a geometry kept across a configuration or
/// viewport change is stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Box size in layout pixels
    pub box_width: f64,
    pub box_height: f64,
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub block_width: f64,
    pub block_height: f64,
    pub spectrum_length: usize,
}

/// Derives the geometry for `viewport` under `policy`.
pub fn resolve(
    viewport: Viewport,
    analysis: &AnalysisConfig,
    display: &DisplayConfig,
    policy: &dyn RenderPolicy,
) -> Geometry {
    let (box_width, box_height) = policy.fit_box(viewport.width.max(0.0), viewport.height.max(0.0), display);
    let canvas_width = (box_width * viewport.pixel_ratio).floor() as usize;
    let canvas_height = (box_height * viewport.pixel_ratio).floor() as usize;
    let spectrum_length = analysis.spectrum_length();

    Geometry {
        box_width,
        box_height,
        canvas_width,
        canvas_height,
        block_width: policy.block_width(canvas_width, display),
        block_height: canvas_height as f64 / spectrum_length as f64,
        spectrum_length,
    }
}
