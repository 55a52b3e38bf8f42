//! Text measurement and wrapping.
//!
//! The core only needs two things from a text collaborator: the size a piece
//! of text occupies and, for wrapped text, where its lines break. A measurer
//! may fail (missing font, unsupported glyphs); callers fall back to a zero
//! size through [`measure_or_zero`] instead of failing the frame.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::error::MeasureError;
use crate::geometry::Size;

/// Measures text for layout.
pub trait TextMeasure {
    /// Size of `content` when wrapped at `wrap_width` cells (`None` = no wrapping).
    fn measure(&self, content: &str, wrap_width: Option<i32>) -> Result<Size, MeasureError>;
}

/// Terminal cell measurement: display width per grapheme, one row per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMetrics;

impl TextMeasure for CellMetrics {
    fn measure(&self, content: &str, wrap_width: Option<i32>) -> Result<Size, MeasureError> {
        let lines = match wrap_width {
            Some(width) => wrap_lines(content, width),
            None => content.split('\n').map(str::to_owned).collect(),
        };
        let width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
        Ok(Size::new(width as i32, lines.len() as i32))
    }
}

/// Measure `content`, logging and substituting [`Size::ZERO`] on failure.
pub fn measure_or_zero(metrics: &dyn TextMeasure, content: &str, wrap_width: Option<i32>) -> Size {
    match metrics.measure(content, wrap_width) {
        Ok(size) => size,
        Err(err) => {
            tracing::warn!(%err, "text measurement failed, using a zero size");
            Size::ZERO
        }
    }
}

/// Cells `text` occupies on a terminal.
///
/// East Asian wide glyphs and emoji take two cells, combining marks none.
pub fn display_width(text: &str) -> usize {
    glyphs(text).map(|(_, width)| width).sum()
}

/// Grapheme clusters of `text` with their display widths.
pub fn glyphs(text: &str) -> impl Iterator<Item = (&str, usize)> {
    text.graphemes(true).map(|g| (g, UnicodeWidthStr::width(g)))
}

/// The longest prefix of `text` that fits in `max_width` cells.
pub fn clip_to_width(text: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (start, g) in text.grapheme_indices(true) {
        let width = UnicodeWidthStr::width(g);
        if used + width > max_width {
            return &text[..start];
        }
        used += width;
    }
    text
}

/// Word-wrap `text` to lines of at most `max_width` cells.
///
/// Explicit newlines are hard breaks. Words longer than a line are split.
/// Whitespace at a wrap point is dropped. `max_width <= 0` disables wrapping.
pub fn wrap_lines(text: &str, max_width: i32) -> Vec<String> {
    if max_width <= 0 {
        return text.split('\n').map(str::to_owned).collect();
    }
    let max = max_width as usize;
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw_line.split(' ') {
            let word_len = display_width(word);
            let needed = if current_len == 0 { word_len } else { current_len + 1 + word_len };

            if needed <= max {
                if current_len > 0 {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            // Hard-split words that cannot fit on a line of their own.
            for (glyph, width) in glyphs(word) {
                if current_len + width > max && current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push_str(glyph);
                current_len += width;
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl TextMeasure for Broken {
        fn measure(&self, content: &str, _: Option<i32>) -> Result<Size, MeasureError> {
            Err(MeasureError::FontUnavailable(content.to_owned()))
        }
    }

    #[test]
    fn cell_metrics_counts_chars_and_lines() {
        let m = CellMetrics;
        assert_eq!(m.measure("héllo", None), Ok(Size::new(5, 1)));
        assert_eq!(m.measure("ab\ncdef", None), Ok(Size::new(4, 2)));
        assert_eq!(m.measure("", None), Ok(Size::new(0, 1)));
    }

    #[test]
    fn wide_glyphs_take_two_cells() {
        let m = CellMetrics;
        assert_eq!(m.measure("日本", None), Ok(Size::new(4, 1)));
        assert_eq!(m.measure("e\u{301}", None), Ok(Size::new(1, 1)));
        assert_eq!(clip_to_width("日本語", 5), "日本");
    }

    #[test]
    fn wrap_splits_wide_words_by_width() {
        assert_eq!(wrap_lines("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn cell_metrics_wraps() {
        let m = CellMetrics;
        assert_eq!(m.measure("aaa bbb ccc", Some(7)), Ok(Size::new(7, 2)));
    }

    #[test]
    fn failed_measurement_falls_back_to_zero() {
        assert_eq!(measure_or_zero(&Broken, "x", None), Size::ZERO);
    }

    #[test]
    fn wrap_breaks_at_spaces() {
        assert_eq!(wrap_lines("the quick brown fox", 10), vec!["the quick", "brown fox"]);
    }

    #[test]
    fn wrap_honours_newlines() {
        assert_eq!(wrap_lines("a\nb c", 10), vec!["a", "b c"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap_lines("abcdefgh xy", 3), vec!["abc", "def", "gh", "xy"]);
    }

    #[test]
    fn wrap_exact_fit_word() {
        assert_eq!(wrap_lines("abc de", 3), vec!["abc", "de"]);
    }

    #[test]
    fn wrap_disabled_for_non_positive_width() {
        assert_eq!(wrap_lines("a b", 0), vec!["a b"]);
    }
}
