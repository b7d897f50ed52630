//! Auto-fit sizing.
//!
//! Finds the largest font size at which wrapped text fits a box, stepping
//! down from the maximum. Sizes whose single line is taller than the box
//! are skipped without wrapping, and the search makes at most
//! [`MAX_FIT_ATTEMPTS`] attempts: wider ranges use a coarser step.

use super::{FontMetrics, TextStyle, wrap_text};

/// Default size decrement (canvas pixels).
pub const AUTO_FIT_STEP: f32 = 0.5;

/// Upper bound on wrap attempts per search.
pub const MAX_FIT_ATTEMPTS: usize = 256;

/// Slack for float noise when comparing against the box.
const EPSILON: f32 = 1e-3;

/// Result of an auto-fit search.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoFit {
    /// Chosen size, always within `[min, max]`.
    pub font_size: f32,
    /// True when even `min` does not fit.
    pub overflows: bool,
    /// The text wrapped at `font_size`.
    pub lines: Vec<String>,
}

/// Largest size in `[min_size, max_size]`, stepping by [`AUTO_FIT_STEP`].
pub fn calc_auto_fit_font_size(
    metrics: &dyn FontMetrics,
    text: &str,
    box_width: f32,
    box_height: f32,
    max_size: f32,
    min_size: f32,
    style: TextStyle,
) -> AutoFit {
    calc_auto_fit_with_step(
        metrics,
        text,
        box_width,
        box_height,
        max_size,
        min_size,
        style,
        AUTO_FIT_STEP,
    )
}

/// [`calc_auto_fit_font_size`] with an explicit step (the printer renderer
/// steps one dot at a time).
#[allow(clippy::too_many_arguments)]
pub fn calc_auto_fit_with_step(
    metrics: &dyn FontMetrics,
    text: &str,
    box_width: f32,
    box_height: f32,
    max_size: f32,
    min_size: f32,
    style: TextStyle,
    step: f32,
) -> AutoFit {
    let max_size = if max_size.is_finite() && max_size > 0.0 {
        max_size
    } else {
        min_size.max(1.0)
    };
    let min_size = if min_size.is_finite() && min_size > 0.0 {
        min_size.min(max_size)
    } else {
        max_size
    };
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        AUTO_FIT_STEP
    };

    if text.trim().is_empty() {
        return AutoFit {
            font_size: max_size,
            overflows: false,
            lines: vec![text.to_string()],
        };
    }

    let attempt = |size: f32| -> (bool, Vec<String>) {
        let lines = wrap_text(metrics, text, size, style, box_width);
        let height = lines.len() as f32 * metrics.line_height(size);
        let widest = lines
            .iter()
            .map(|l| metrics.text_width(l, size, style))
            .fold(0.0f32, f32::max);
        let fits = height <= box_height + EPSILON && widest <= box_width + EPSILON;
        (fits, lines)
    };

    // first size on the step grid whose line height fits the box
    let tallest = box_height / metrics.line_height(1.0);
    let start = if tallest.is_finite() && tallest < max_size {
        let skipped = ((max_size - tallest) / step).ceil();
        (max_size - skipped * step).max(min_size)
    } else {
        max_size
    };
    let step = step.max((start - min_size) / MAX_FIT_ATTEMPTS as f32);

    let steps = ((start - min_size) / step).floor() as usize;
    for i in 0..=steps.min(MAX_FIT_ATTEMPTS) {
        let size = start - i as f32 * step;
        if size < min_size {
            break;
        }
        let (fits, lines) = attempt(size);
        if fits {
            return AutoFit {
                font_size: size,
                overflows: false,
                lines,
            };
        }
    }

    let (fits, lines) = attempt(min_size);
    AutoFit {
        font_size: min_size,
        overflows: !fits,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::BuiltinMetrics;

    struct HalfEm;

    impl FontMetrics for HalfEm {
        fn text_width(&self, text: &str, size: f32, _style: TextStyle) -> f32 {
            text.chars().count() as f32 * size / 2.0
        }
    }

    #[test]
    fn test_fits_at_max() {
        // "abcd" at 10 → 20 wide, 12 tall
        let fit = calc_auto_fit_font_size(&HalfEm, "abcd", 100.0, 50.0, 10.0, 6.0, TextStyle::REGULAR);
        assert_eq!(fit.font_size, 10.0);
        assert!(!fit.overflows);
        assert_eq!(fit.lines, vec!["abcd"]);
    }

    #[test]
    fn test_shrinks_until_fits() {
        // 10 chars must fit 30 wide: size ≤ 6; height 6*1.2 = 7.2 ≤ 10
        let fit = calc_auto_fit_font_size(&HalfEm, "abcdefghij", 30.0, 10.0, 20.0, 2.0, TextStyle::REGULAR);
        assert_eq!(fit.font_size, 6.0);
        assert!(!fit.overflows);
    }

    #[test]
    fn test_floor_overflows() {
        let fit = calc_auto_fit_font_size(
            &HalfEm,
            "a very long sentence that will never fit",
            5.0,
            2.0,
            12.0,
            6.0,
            TextStyle::REGULAR,
        );
        assert_eq!(fit.font_size, 6.0);
        assert!(fit.overflows);
    }

    #[test]
    fn test_min_above_max_is_clamped() {
        let fit = calc_auto_fit_font_size(&HalfEm, "ab", 100.0, 100.0, 8.0, 12.0, TextStyle::REGULAR);
        assert_eq!(fit.font_size, 8.0);
    }

    #[test]
    fn test_empty_text() {
        let fit = calc_auto_fit_font_size(&HalfEm, "  ", 1.0, 1.0, 14.0, 6.0, TextStyle::REGULAR);
        assert_eq!(fit.font_size, 14.0);
        assert!(!fit.overflows);
    }

    #[test]
    fn test_result_within_bounds_and_monotonic() {
        let m = BuiltinMetrics;
        let text = "Aceite de oliva extra virgen 500 ml";
        let mut previous = 0.0;
        for width in [20.0, 40.0, 80.0, 160.0, 320.0] {
            let fit = calc_auto_fit_font_size(&m, text, width, 40.0, 24.0, 6.0, TextStyle::REGULAR);
            assert!(fit.font_size >= 6.0 && fit.font_size <= 24.0);
            assert!(fit.font_size >= previous, "wider box must not shrink text");
            previous = fit.font_size;
        }
    }

    #[test]
    fn test_huge_maximum_starts_at_box_height() {
        // 40 wide, 10 tall: one line of "abcd" fits at 8 (height 9.6)
        let fit = calc_auto_fit_with_step(&HalfEm, "abcd", 40.0, 10.0, 2e7, 1.0, TextStyle::REGULAR, 1.0);
        assert_eq!(fit.font_size, 8.0);
        assert!(!fit.overflows);
        assert_eq!(fit.lines, vec!["abcd"]);
    }

    #[test]
    fn test_wide_range_uses_coarser_step() {
        let fit = calc_auto_fit_with_step(&HalfEm, "ab", 1e6, 1e6, 1e6, 1.0, TextStyle::REGULAR, 0.001);
        assert!(!fit.overflows);
        assert!(fit.font_size * 1.2 <= 1e6 + 1.0);
        assert!(fit.font_size >= 1.0);
    }

    #[test]
    fn test_custom_step() {
        let fit = calc_auto_fit_with_step(&HalfEm, "abcdefghij", 30.0, 10.0, 20.0, 2.0, TextStyle::REGULAR, 3.0);
        // 20, 17, 14, 11, 8, 5 → 5 is the first that fits
        assert_eq!(fit.font_size, 5.0);
    }
}
