use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Compass direction of a label relative to its data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Right,
    Bottom,
    Left,
    Top,
}

impl Orientation {
    /// Quantize a screen-space angle (radians, y growing downward) into
    /// four buckets centred on the axes. Half-way angles round towards
    /// positive infinity, so -π/4 is `Right` and -3π/4 is `Top`.
    pub fn from_angle(angle: f32) -> Self {
        let bucket =
            ((angle / std::f32::consts::FRAC_PI_2 + 0.5).floor() as i32).rem_euclid(4);
        match bucket {
            0 => Self::Right,
            1 => Self::Bottom,
            2 => Self::Left,
            _ => Self::Top,
        }
    }

    pub fn text_anchor(self) -> TextAnchor {
        match self {
            Self::Right => TextAnchor::Start,
            Self::Left => TextAnchor::End,
            Self::Top | Self::Bottom => TextAnchor::Middle,
        }
    }

    /// Text origin relative to the point, before rotation.
    pub fn offset(self, padding: f32) -> (f32, f32) {
        match self {
            Self::Right => (padding, 0.0),
            Self::Left => (-padding, 0.0),
            Self::Top => (0.0, -padding),
            Self::Bottom => (0.0, padding),
        }
    }

    /// Baseline shift in em so the text box hangs on the correct side of
    /// the origin.
    pub fn baseline_shift(self) -> f32 {
        match self {
            Self::Right | Self::Left => 0.35,
            Self::Top => 0.0,
            Self::Bottom => 0.71,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Where and how to draw one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDecision {
    /// Index of the source record.
    pub index: usize,
    /// Translation applied to the label before any rotation.
    pub x: f32,
    pub y: f32,
    pub orientation: Orientation,
    pub text_anchor: TextAnchor,
    /// Text origin inside the translated (and rotated) frame.
    pub dx: f32,
    pub dy: f32,
    /// Extra baseline shift in em.
    pub baseline_shift: f32,
    /// Degrees, applied after the translation.
    pub rotate: Option<f32>,
    pub text: String,
    pub visible: bool,
    /// Text fill; `None` defers to the theme.
    pub fill: Option<String>,
    /// Series color for the marker drawn next to line-end labels.
    pub color: Option<String>,
    /// Area of the owned cell for region labels.
    pub cell_area: Option<f32>,
    /// Projected y before collision resolution for line-end labels.
    pub original_y: Option<f32>,
}

impl LabelDecision {
    /// SVG transform: translate first, then rotate.
    pub fn transform(&self) -> String {
        let mut transform = format!("translate({:.2},{:.2})", self.x, self.y);
        if let Some(angle) = self.rotate {
            transform.push_str(&format!(" rotate({angle})"));
        }
        transform
    }
}

/// The region owned by one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub index: usize,
    pub site: Point,
    pub polygon: Vec<Point>,
}

/// A projected data point drawn as a dot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMark {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub color: Option<String>,
}

/// One series drawn as a polyline, ordered by x.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPath {
    pub key: String,
    pub points: Vec<Point>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn quantizes_axis_angles() {
        assert_eq!(Orientation::from_angle(0.0), Orientation::Right);
        assert_eq!(Orientation::from_angle(FRAC_PI_2), Orientation::Bottom);
        assert_eq!(Orientation::from_angle(PI), Orientation::Left);
        assert_eq!(Orientation::from_angle(-PI), Orientation::Left);
        assert_eq!(Orientation::from_angle(-FRAC_PI_2), Orientation::Top);
    }

    #[test]
    fn quantizes_between_axes() {
        assert_eq!(Orientation::from_angle(FRAC_PI_4 - 0.1), Orientation::Right);
        assert_eq!(Orientation::from_angle(FRAC_PI_4 + 0.1), Orientation::Bottom);
        assert_eq!(Orientation::from_angle(-FRAC_PI_4 - 0.1), Orientation::Top);
        assert_eq!(Orientation::from_angle(3.0 * FRAC_PI_4 + 0.1), Orientation::Left);
    }

    #[test]
    fn half_way_angles_round_up() {
        assert_eq!(Orientation::from_angle(-FRAC_PI_4), Orientation::Right);
        assert_eq!(Orientation::from_angle(-3.0 * FRAC_PI_4), Orientation::Top);
        assert_eq!(Orientation::from_angle(FRAC_PI_4), Orientation::Bottom);
        assert_eq!(Orientation::from_angle(3.0 * FRAC_PI_4), Orientation::Left);
    }

    #[test]
    fn offsets_follow_orientation() {
        assert_eq!(Orientation::Right.offset(5.0), (5.0, 0.0));
        assert_eq!(Orientation::Left.offset(5.0), (-5.0, 0.0));
        assert_eq!(Orientation::Top.offset(5.0), (0.0, -5.0));
        assert_eq!(Orientation::Bottom.offset(5.0), (0.0, 5.0));
        assert_eq!(Orientation::Left.text_anchor(), TextAnchor::End);
        assert_eq!(Orientation::Top.text_anchor(), TextAnchor::Middle);
    }

    #[test]
    fn transform_rotates_after_translate() {
        let label = LabelDecision {
            index: 0,
            x: 10.0,
            y: 20.5,
            orientation: Orientation::Right,
            text_anchor: TextAnchor::Start,
            dx: 5.0,
            dy: 0.0,
            baseline_shift: 0.35,
            rotate: Some(-30.0),
            text: "a".to_string(),
            visible: true,
            fill: None,
            color: None,
            cell_area: None,
            original_y: None,
        };
        assert_eq!(label.transform(), "translate(10.00,20.50) rotate(-30)");
    }
}
