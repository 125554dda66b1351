//! Persistent RGB pixel buffer the spectrogram is painted into.

/// An RGB color.
pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];

/// Color plus opacity used by [`Canvas::fill_rect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub color: Rgb,
    /// 0.0 leaves the canvas untouched, 1.0 replaces it
    pub alpha: f64,
}

impl Fill {
    pub fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }

    pub fn gray(level: u8, alpha: f64) -> Self {
        Self {
            color: [level, level, level],
            alpha,
        }
    }
}

/// Owned canvas with fractional-coordinate rectangle fills.
///
/// Rectangles are rasterized by rounding their edges to the nearest pixel
/// boundary, so adjacent rectangles never overlap or leave seams.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Replaces the backing store. All previous pixels are discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![BLACK; width * height];
    }

    /// Paints the whole canvas black.
    pub fn clear(&mut self) {
        self.pixels.fill(BLACK);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Fills `[x, x + w) × [y, y + h)` with `fill`, compositing source-over.
    /// Parts outside the canvas are clipped.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Fill) {
        let (x0, x1) = span(x, w, self.width);
        let (y0, y1) = span(y, h, self.height);
        if x0 >= x1 || y0 >= y1 || fill.alpha <= 0.0 {
            return;
        }

        let alpha = fill.alpha.min(1.0);
        for row in y0..y1 {
            let start = row * self.width;
            for px in &mut self.pixels[start + x0..start + x1] {
                *px = blend(*px, fill.color, alpha);
            }
        }
    }
}

/// Pixel range covered by `[start, start + len)`, clipped to `[0, limit)`.
fn span(start: f64, len: f64, limit: usize) -> (usize, usize) {
    let lo = start.round().max(0.0);
    let hi = (start + len).round().max(0.0);
    ((lo as usize).min(limit), (hi as usize).min(limit))
}

fn blend(dst: Rgb, src: Rgb, alpha: f64) -> Rgb {
    if alpha >= 1.0 {
        return src;
    }
    let mix = |d: u8, s: u8| (s as f64 * alpha + d as f64 * (1.0 - alpha)).round() as u8;
    [mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_black() {
        let canvas = Canvas::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), Some(BLACK));
            }
        }
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_rect_opaque_and_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(2.0, -1.0, 5.0, 2.0, Fill::opaque([10, 20, 30]));
        assert_eq!(canvas.pixel(2, 0), Some([10, 20, 30]));
        assert_eq!(canvas.pixel(3, 0), Some([10, 20, 30]));
        assert_eq!(canvas.pixel(1, 0), Some(BLACK));
        assert_eq!(canvas.pixel(2, 1), Some(BLACK));
    }

    #[test]
    fn test_fractional_rects_tile_without_gaps() {
        let mut canvas = Canvas::new(10, 1);
        let w = 10.0 / 3.0;
        for i in 0..3 {
            canvas.fill_rect(i as f64 * w, 0.0, w, 1.0, Fill::gray(200, 1.0));
        }
        for x in 0..10 {
            assert_eq!(canvas.pixel(x, 0), Some([200, 200, 200]));
        }
    }

    #[test]
    fn test_alpha_composites_over_existing() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Fill::gray(200, 0.5));
        assert_eq!(canvas.pixel(0, 0), Some([100, 100, 100]));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Fill::gray(200, 0.5));
        assert_eq!(canvas.pixel(0, 0), Some([150, 150, 150]));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Fill::gray(255, 0.0));
        assert_eq!(canvas.pixel(0, 0), Some([150, 150, 150]));
    }

    #[test]
    fn test_resize_discards_pixels() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0, Fill::opaque([255, 255, 255]));
        canvas.resize(3, 1);
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 1);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
        canvas.fill_rect(0.0, 0.0, 3.0, 1.0, Fill::opaque([9, 9, 9]));
        canvas.clear();
        assert_eq!(canvas.pixel(2, 0), Some(BLACK));
    }
}
