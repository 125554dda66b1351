//! Column layout policies.
//!
//! The scrolling policy paints opaque one-pixel columns across the whole
//! container and wraps continuously. The sweep policy fits an aspect-constrained
//! box, sizes its columns so one pass takes `duration` seconds, and paints over
//! older columns with partial opacity instead of erasing them.

use std::fmt;

use super::canvas::Fill;
use crate::config::{DisplayConfig, RenderPolicyKind};

/// Layout and painting rules shared by geometry resolution and rendering.
pub trait RenderPolicy: fmt::Debug + Send {
    fn kind(&self) -> RenderPolicyKind;

    /// Box the canvas occupies inside a `width × height` container, in layout pixels.
    fn fit_box(&self, width: f64, height: f64, display: &DisplayConfig) -> (f64, f64);

    /// Width of one spectrum column in canvas pixels.
    fn block_width(&self, canvas_width: usize, display: &DisplayConfig) -> f64;

    /// Fill used for a bin of the given brightness.
    fn fill(&self, brightness: u8, display: &DisplayConfig) -> Fill;

    /// Whether the column is erased to black before it is painted.
    fn erases_column(&self) -> bool;

    /// Whether a resize moves the write cursor back to the left edge.
    fn resets_cursor_on_resize(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scrolling;

impl RenderPolicy for Scrolling {
    fn kind(&self) -> RenderPolicyKind {
        RenderPolicyKind::Scrolling
    }

    fn fit_box(&self, width: f64, height: f64, _display: &DisplayConfig) -> (f64, f64) {
        (width.floor(), height.floor())
    }

    fn block_width(&self, _canvas_width: usize, _display: &DisplayConfig) -> f64 {
        1.0
    }

    fn fill(&self, brightness: u8, _display: &DisplayConfig) -> Fill {
        Fill::gray(brightness, 1.0)
    }

    fn erases_column(&self) -> bool {
        true
    }

    fn resets_cursor_on_resize(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sweep;

impl RenderPolicy for Sweep {
    fn kind(&self) -> RenderPolicyKind {
        RenderPolicyKind::Sweep
    }

    fn fit_box(&self, width: f64, height: f64, display: &DisplayConfig) -> (f64, f64) {
        let ratio = display.aspect_ratio;
        let (w, h) = if height > width * ratio {
            (width, width * ratio)
        } else {
            (height / ratio, height)
        };
        (w.floor(), h.floor())
    }

    fn block_width(&self, canvas_width: usize, display: &DisplayConfig) -> f64 {
        canvas_width as f64 / (display.duration * display.frame_rate as f64)
    }

    fn fill(&self, brightness: u8, display: &DisplayConfig) -> Fill {
        Fill::gray(brightness, display.fill_opacity)
    }

    fn erases_column(&self) -> bool {
        false
    }

    fn resets_cursor_on_resize(&self) -> bool {
        false
    }
}

impl RenderPolicyKind {
    /// Instantiates the policy this kind names.
    pub fn policy(self) -> Box<dyn RenderPolicy> {
        match self {
            RenderPolicyKind::Scrolling => Box::new(Scrolling),
            RenderPolicyKind::Sweep => Box::new(Sweep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_box_in_tall_container() {
        let display = DisplayConfig::default();
        assert_eq!(Sweep.fit_box(100.0, 500.0, &display), (100.0, 125.0));
    }

    #[test]
    fn test_sweep_box_in_wide_container() {
        let display = DisplayConfig::default();
        assert_eq!(Sweep.fit_box(500.0, 100.0, &display), (80.0, 100.0));
        // fractional sizes are floored
        assert_eq!(Sweep.fit_box(500.0, 101.0, &display), (80.0, 101.0));
        assert_eq!(Sweep.fit_box(500.0, 99.0, &display), (79.0, 99.0));
    }

    #[test]
    fn test_scrolling_box_fills_container() {
        let display = DisplayConfig::default();
        assert_eq!(Scrolling.fit_box(320.4, 99.9, &display), (320.0, 99.0));
        assert_eq!(Scrolling.block_width(320, &display), 1.0);
    }

    #[test]
    fn test_sweep_block_width_spans_duration() {
        let display = DisplayConfig::default();
        // 15 s at 24 fps is 360 columns
        assert_eq!(Sweep.block_width(720, &display), 2.0);
    }

    #[test]
    fn test_fills() {
        let display = DisplayConfig::default();
        assert_eq!(Scrolling.fill(40, &display), Fill::gray(40, 1.0));
        assert_eq!(Sweep.fill(40, &display), Fill::gray(40, 0.9));
        assert!(Scrolling.erases_column() && !Sweep.erases_column());
        assert_eq!(RenderPolicyKind::Sweep.policy().kind(), RenderPolicyKind::Sweep);
    }
}
