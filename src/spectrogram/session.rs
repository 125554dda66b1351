//! Pipeline owner tying configuration, analysis, geometry and the canvas together.

use super::canvas::Canvas;
use super::geometry::{resolve, Geometry, Viewport};
use super::policy::RenderPolicy;
use super::renderer::{render_frame, WriteHead};
use crate::audio::AnalysisEngine;
use crate::config::{ConfigStore, Direction, ParamKey, RenderPolicyKind};
use crate::error::Result;

/// One live spectrogram: the control surface plus everything a frame needs.
pub struct Session<E: AnalysisEngine> {
    store: ConfigStore,
    engine: E,
    policy: Box<dyn RenderPolicy>,
    viewport: Viewport,
    geometry: Geometry,
    canvas: Canvas,
    spectrum: Vec<u8>,
    head: WriteHead,
}

impl<E: AnalysisEngine> Session<E> {
    pub fn new(store: ConfigStore, mut engine: E, policy: RenderPolicyKind, viewport: Viewport) -> Self {
        engine.apply(store.analysis());
        let policy = policy.policy();
        let geometry = resolve(viewport, store.analysis(), store.display(), policy.as_ref());
        tracing::debug!("Initial geometry: {:?}", geometry);

        Self {
            canvas: Canvas::new(geometry.canvas_width, geometry.canvas_height),
            spectrum: vec![0; engine.spectrum_length()],
            head: WriteHead::new(),
            store,
            engine,
            policy,
            viewport,
            geometry,
        }
    }

    /// Moves `key` one step and returns its new value.
    ///
    /// The engine sees the new analysis settings and geometry is recomputed
    /// before the next frame.
    pub fn adjust(&mut self, key: ParamKey, direction: Direction) -> f64 {
        let value = self.store.adjust(key, direction);
        self.engine.apply(self.store.analysis());
        self.spectrum.resize(self.engine.spectrum_length(), 0);
        self.recompute();
        value
    }

    /// Clears the canvas and moves the cursor back to the left edge.
    pub fn reset_cursor(&mut self) {
        self.canvas.clear();
        self.head.reset();
        tracing::debug!("Cursor reset");
    }

    pub fn current_value(&self, key: ParamKey) -> f64 {
        self.store.current_value(key)
    }

    pub fn is_at_bound(&self, key: ParamKey, direction: Direction) -> bool {
        self.store.is_at_bound(key, direction)
    }

    /// Applies a new viewport. The canvas is reallocated and starts black.
    ///
    /// A cursor left past the new right edge returns to 0.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.recompute();
        self.canvas
            .resize(self.geometry.canvas_width, self.geometry.canvas_height);
        if self.policy.resets_cursor_on_resize()
            || self.head.position() >= self.geometry.canvas_width as f64
        {
            self.head.reset();
        }
        tracing::debug!(
            "Resized canvas to {}x{}",
            self.geometry.canvas_width,
            self.geometry.canvas_height
        );
    }

    /// Pulls one snapshot from the engine and paints it. Returns the new cursor.
    pub fn render_frame(&mut self) -> Result<f64> {
        self.engine.fill_spectrum(&mut self.spectrum)?;
        render_frame(
            &mut self.canvas,
            &self.spectrum,
            &self.geometry,
            self.store.display(),
            self.policy.as_ref(),
            &mut self.head,
        )
    }

    fn recompute(&mut self) {
        self.geometry = resolve(
            self.viewport,
            self.store.analysis(),
            self.store.display(),
            self.policy.as_ref(),
        );
        if self.canvas.width() != self.geometry.canvas_width
            || self.canvas.height() != self.geometry.canvas_height
        {
            self.canvas
                .resize(self.geometry.canvas_width, self.geometry.canvas_height);
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn cursor(&self) -> f64 {
        self.head.position()
    }

    pub fn policy_kind(&self) -> RenderPolicyKind {
        self.policy.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, DisplayConfig};
    use crate::error::Error;
    use crate::spectrogram::canvas::BLACK;

    struct FakeEngine {
        settings: AnalysisConfig,
        level: u8,
        applied: usize,
    }

    impl FakeEngine {
        fn new(level: u8) -> Self {
            Self {
                settings: AnalysisConfig::default(),
                level,
                applied: 0,
            }
        }
    }

    impl AnalysisEngine for FakeEngine {
        fn apply(&mut self, settings: &AnalysisConfig) {
            self.settings = settings.clone();
            self.applied += 1;
        }

        fn spectrum_length(&self) -> usize {
            self.settings.spectrum_length()
        }

        fn fill_spectrum(&mut self, buffer: &mut [u8]) -> Result<()> {
            if buffer.len() != self.spectrum_length() {
                return Err(Error::PreconditionViolation {
                    expected: self.spectrum_length(),
                    actual: buffer.len(),
                });
            }
            buffer.fill(self.level);
            Ok(())
        }
    }

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    fn session(level: u8, policy: RenderPolicyKind) -> Session<FakeEngine> {
        let store = ConfigStore::new(AnalysisConfig::default(), DisplayConfig::default());
        Session::new(store, FakeEngine::new(level), policy, viewport(100.0, 1024.0))
    }

    #[test]
    fn test_end_to_end_white_column() {
        let mut session = session(255, RenderPolicyKind::Scrolling);
        assert_eq!(session.geometry().spectrum_length, 1024);
        assert_eq!(session.geometry().block_height, 1.0);

        let cursor = session.render_frame().unwrap();
        assert_eq!(cursor, 1.0);
        let canvas = session.canvas();
        assert!((0..canvas.height()).all(|y| canvas.pixel(0, y) == Some([255, 255, 255])));
        assert_eq!(canvas.pixel(1, 0), Some(BLACK));
    }

    #[test]
    fn test_adjust_propagates_to_engine_and_geometry() {
        let mut session = session(40, RenderPolicyKind::Scrolling);
        let applied = session.engine.applied;

        assert_eq!(session.adjust(ParamKey::FftSize, Direction::Decrement), 1024.0);
        assert_eq!(session.engine.applied, applied + 1);
        assert_eq!(session.engine.spectrum_length(), 512);
        assert_eq!(session.geometry().spectrum_length, 512);
        assert_eq!(session.geometry().block_height, 2.0);

        // the reallocated buffer matches the new length
        session.render_frame().unwrap();
    }

    #[test]
    fn test_duration_changes_sweep_block_width() {
        let mut session = session(40, RenderPolicyKind::Sweep);
        let before = session.geometry().block_width;
        session.adjust(ParamKey::Duration, Direction::Increment);
        let after = session.geometry().block_width;
        assert!(after < before);
        assert_eq!(session.current_value(ParamKey::Duration), 16.0);
    }

    #[test]
    fn test_reset_cursor_clears_canvas() {
        let mut session = session(255, RenderPolicyKind::Scrolling);
        session.render_frame().unwrap();
        session.render_frame().unwrap();
        assert_eq!(session.cursor(), 2.0);

        session.reset_cursor();
        assert_eq!(session.cursor(), 0.0);
        let canvas = session.canvas();
        assert!((0..canvas.height()).all(|y| canvas.pixel(0, y) == Some(BLACK)));
    }

    #[test]
    fn test_resize_under_scrolling_resets_cursor() {
        let mut session = session(255, RenderPolicyKind::Scrolling);
        session.render_frame().unwrap();
        session.resize(viewport(50.0, 512.0));

        assert_eq!(session.cursor(), 0.0);
        assert_eq!(session.canvas().width(), 50);
        assert_eq!(session.canvas().height(), 512);
        assert_eq!(session.canvas().pixel(0, 511), Some(BLACK));
        assert_eq!(session.geometry().block_height, 0.5);
    }

    #[test]
    fn test_resize_under_sweep_keeps_cursor() {
        let mut session = session(255, RenderPolicyKind::Sweep);
        let cursor = session.render_frame().unwrap();
        assert!(cursor > 0.0);

        session.resize(viewport(200.0, 1000.0));
        assert_eq!(session.cursor(), cursor);
        assert_eq!(session.policy_kind(), RenderPolicyKind::Sweep);
        // canvas starts black after any resize
        assert_eq!(session.canvas().pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn test_sweep_cursor_past_narrower_canvas_returns_to_start() {
        let mut session = session(255, RenderPolicyKind::Sweep);
        while session.cursor() < 60.0 {
            session.render_frame().unwrap();
        }

        session.resize(viewport(40.0, 1024.0));
        assert_eq!(session.canvas().width(), 40);
        assert_eq!(session.cursor(), 0.0);

        // the next column starts at the left edge
        let cursor = session.render_frame().unwrap();
        assert_eq!(cursor, session.geometry().block_width);
    }

    #[test]
    fn test_sweep_cursor_inside_narrower_canvas_is_kept() {
        let mut session = session(255, RenderPolicyKind::Sweep);
        while session.cursor() < 10.0 {
            session.render_frame().unwrap();
        }
        let cursor = session.cursor();

        session.resize(viewport(40.0, 1024.0));
        assert_eq!(session.cursor(), cursor);
    }

    #[test]
    fn test_bound_queries_follow_store() {
        let mut session = session(0, RenderPolicyKind::Sweep);
        assert!(session.is_at_bound(ParamKey::PeakBright, Direction::Increment));
        session.adjust(ParamKey::PeakBright, Direction::Decrement);
        assert!(!session.is_at_bound(ParamKey::PeakBright, Direction::Increment));
        assert_eq!(session.current_value(ParamKey::PeakBright), 240.0);
    }
}
