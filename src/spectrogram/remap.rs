//! Linear value remapping used to turn measurements into pixel and color values.

use crate::error::{Error, Result};

/// Linearly maps `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// With `clamp` set the result is kept inside the target range regardless of
/// whether the target range is ascending or inverted.
///
/// # Errors
/// - `InvalidRange` if `from_min == from_max`, or if the result is not finite
pub fn remap(
    value: f64,
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
    clamp: bool,
) -> Result<f64> {
    let span = from_max - from_min;
    if span == 0.0 || !span.is_finite() {
        return Err(Error::InvalidRange { from_min, from_max });
    }

    let mapped = (value - from_min) / span * (to_max - to_min) + to_min;
    if !mapped.is_finite() {
        return Err(Error::InvalidRange { from_min, from_max });
    }

    if !clamp {
        return Ok(mapped);
    }

    if to_min < to_max {
        Ok(constrain(mapped, to_min, to_max))
    } else {
        Ok(constrain(mapped, to_max, to_min))
    }
}

/// Clamps `value` into `[low, high]`. Callers guarantee `low <= high`.
pub fn constrain(value: f64, low: f64, high: f64) -> f64 {
    value.min(high).max(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_linear() {
        assert_eq!(remap(5.0, 0.0, 10.0, 0.0, 100.0, false).unwrap(), 50.0);
        assert_eq!(remap(0.0, 0.0, 10.0, 20.0, 40.0, false).unwrap(), 20.0);
        assert_eq!(remap(10.0, 0.0, 10.0, 40.0, 20.0, false).unwrap(), 20.0);
    }

    #[test]
    fn test_remap_round_trip() {
        let (a, b, c, d) = (-3.0, 17.0, 255.0, 15.0);
        for step in 0..=40 {
            let x = a + (b - a) * step as f64 / 40.0;
            let there = remap(x, a, b, c, d, false).unwrap();
            let back = remap(there, c, d, a, b, false).unwrap();
            assert!((back - x).abs() < 1e-9, "{x} came back as {back}");
        }
    }

    #[test]
    fn test_remap_clamp_stays_in_range() {
        for &(c, d) in &[(0.0, 255.0), (255.0, 0.0), (-1.0, -1.0)] {
            for step in -20..=40 {
                let x = step as f64 * 10.0;
                let y = remap(x, 0.0, 200.0, c, d, true).unwrap();
                let (lo, hi) = if c < d { (c, d) } else { (d, c) };
                assert!(y >= lo && y <= hi, "{y} outside [{lo}, {hi}]");
                assert_eq!(constrain(y, lo, hi), y);
            }
        }
    }

    #[test]
    fn test_remap_unclamped_extrapolates() {
        assert_eq!(remap(20.0, 0.0, 10.0, 0.0, 1.0, false).unwrap(), 2.0);
        assert_eq!(remap(20.0, 0.0, 10.0, 0.0, 1.0, true).unwrap(), 1.0);
    }

    #[test]
    fn test_remap_degenerate_range() {
        match remap(1.0, 4.0, 4.0, 0.0, 1.0, false) {
            Err(Error::InvalidRange { from_min, from_max }) => {
                assert_eq!(from_min, 4.0);
                assert_eq!(from_max, 4.0);
            }
            other => panic!("expected InvalidRange, got {other:?}"),
        }
        assert!(remap(f64::NAN, 0.0, 1.0, 0.0, 1.0, false).is_err());
    }

    #[test]
    fn test_constrain() {
        assert_eq!(constrain(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(constrain(5.0, 0.0, 1.0), 1.0);
        assert_eq!(constrain(0.5, 0.0, 1.0), 0.5);
    }
}
