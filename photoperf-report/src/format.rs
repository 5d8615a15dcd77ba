//! Text Helpers
//!
//! Small presentation helpers shared by the terminal renderers.

use photoperf_stats::BYTES_PER_MB;
use std::borrow::Cow;

/// Bytes to binary megabytes
pub fn bytes_to_mb(bytes: impl Into<u128>) -> f64 {
    bytes.into() as f64 / BYTES_PER_MB
}

/// Shorten `name` to `width` characters, ending in `...` when cut
pub fn truncate_name(name: &str, width: usize) -> Cow<'_, str> {
    if name.chars().count() <= width {
        return Cow::Borrowed(name);
    }
    let keep = width.saturating_sub(3);
    let head: String = name.chars().take(keep).collect();
    Cow::Owned(format!("{head}..."))
}

/// Horizontal bar for a percentage, clamped to [0, 100]
///
/// `filled = floor(percent / 100 * width)` cells are solid, the rest shaded.
pub fn render_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let filled = ((percent / 100.0 * width as f64).floor() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_mb() {
        assert!((bytes_to_mb(3 * 1_048_576u64) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("IMG_0001.DNG", 50), "IMG_0001.DNG");

        let long = "a".repeat(60);
        let cut = truncate_name(&long, 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(50.0, 10), "█████░░░░░");
        assert_eq!(render_bar(150.0, 4), "████");
        assert_eq!(render_bar(-3.0, 4), "░░░░");
        // 19.9% of 10 cells floors to 1
        assert_eq!(render_bar(19.9, 10).chars().filter(|&c| c == '█').count(), 1);
    }
}
