// Second render phase: placement decides where labels go, then the
// renderer measures the drawn text and fits a background behind it.

use serde::Serialize;

use super::types::{LabelDecision, TextAnchor};
use crate::error::{LabelError, Result};
use crate::text_metrics::{TextMetrics, measure_text};
use crate::theme::Theme;

const FALLBACK_CHAR_WIDTH_EM: f32 = 0.56;
const FALLBACK_ASCENT_EM: f32 = 0.905;
const FALLBACK_DESCENT_EM: f32 = 0.212;

/// Bounding box of drawn label text, relative to the label origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextExtent {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Background rectangle behind a line-end label, relative to its group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BackgroundBox {
    /// Pad the text box by one pixel and stretch it left to the group
    /// origin so the marker dot sits on the background too.
    pub fn around(extent: &TextExtent) -> Self {
        Self {
            x: -1.0,
            y: extent.y - 1.0,
            width: extent.x + extent.width + 3.0,
            height: extent.height + 2.0,
        }
    }
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> TextMetrics;
}

/// Measures with installed system fonts, falling back to a fixed
/// per-character width when no font resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetricsMeasurer;

impl TextMeasurer for FontMetricsMeasurer {
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> TextMetrics {
        measure_text(text, font_size, font_family)
            .unwrap_or_else(|| FixedWidthMeasurer::default().measure(text, font_size, font_family))
    }
}

/// Every character is `char_width` em wide. Deterministic regardless of
/// the fonts installed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasurer {
    pub char_width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self {
            char_width: FALLBACK_CHAR_WIDTH_EM,
            ascent: FALLBACK_ASCENT_EM,
            descent: FALLBACK_DESCENT_EM,
        }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str, font_size: f32, _font_family: &str) -> TextMetrics {
        let chars = text.chars().filter(|&ch| ch != '\n').count() as f32;
        TextMetrics {
            width: chars * self.char_width * font_size,
            ascent: self.ascent * font_size,
            descent: self.descent * font_size,
        }
    }
}

/// Extent of a label's text given its measured metrics.
pub fn text_extent(label: &LabelDecision, metrics: TextMetrics, font_size: f32) -> TextExtent {
    let x = match label.text_anchor {
        TextAnchor::Start => label.dx,
        TextAnchor::Middle => label.dx - metrics.width / 2.0,
        TextAnchor::End => label.dx - metrics.width,
    };
    let baseline = label.dy + label.baseline_shift * font_size;
    TextExtent {
        x,
        y: baseline - metrics.ascent,
        width: metrics.width,
        height: metrics.ascent + metrics.descent,
    }
}

pub fn measure_labels(
    labels: &[LabelDecision],
    measurer: &dyn TextMeasurer,
    theme: &Theme,
) -> Vec<TextExtent> {
    labels
        .iter()
        .map(|label| {
            let metrics = measurer.measure(&label.text, theme.font_size, &theme.font_family);
            text_extent(label, metrics, theme.font_size)
        })
        .collect()
}

/// One background per label from extents measured after the labels were
/// drawn. `extents` must be parallel to `labels`.
pub fn fit_backgrounds(
    labels: &[LabelDecision],
    extents: &[TextExtent],
) -> Result<Vec<BackgroundBox>> {
    if labels.len() != extents.len() {
        return Err(LabelError::ExtentCount {
            expected: labels.len(),
            actual: extents.len(),
        });
    }
    Ok(extents.iter().map(BackgroundBox::around).collect())
}
