// Labels for the last point of every series in a line chart. Labels all
// sit near the right edge, so overlap only needs resolving along y.

use std::collections::HashMap;

use serde::Serialize;

use super::collision::{CollisionConfig, CollisionReport, VerticalSlot, resolve_vertical_collisions};
use super::project_record;
use super::types::{LabelDecision, Orientation};
use crate::config::LineEndLabelConfig;
use crate::error::{LabelError, Result};
use crate::ir::{Dataset, FieldSpec, Record, group_key, numeric_field, text_field};
use crate::scale::{CoordinateMapper, Scales};

/// Marker dot drawn between the line end and the label text.
pub const END_LABEL_DOT_X: f32 = 4.0;
pub const END_LABEL_DOT_RADIUS: f32 = 3.0;
/// Text origin inside a label group, leaving room for the dot.
pub const END_LABEL_TEXT_X: f32 = 10.0;
pub const END_LABEL_BASELINE_SHIFT: f32 = 0.35;

/// Color of a series, looked up by its group key.
pub trait ColorResolver {
    fn resolve(&self, group: &str) -> Option<String>;
}

impl<F> ColorResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, group: &str) -> Option<String> {
        self(group)
    }
}

/// Ordinal color scale: the n-th key of the domain gets the n-th color,
/// wrapping around the palette.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalPalette {
    colors: Vec<String>,
    domain: HashMap<String, usize>,
}

impl OrdinalPalette {
    pub fn new<I, K>(colors: Vec<String>, domain: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut positions = HashMap::new();
        for key in domain {
            let next = positions.len();
            positions.entry(key.into()).or_insert(next);
        }
        Self {
            colors,
            domain: positions,
        }
    }
}

impl ColorResolver for OrdinalPalette {
    fn resolve(&self, group: &str) -> Option<String> {
        if self.colors.is_empty() {
            return None;
        }
        let position = self.domain.get(group)?;
        Some(self.colors[position % self.colors.len()].clone())
    }
}

/// Distinct group keys in first-seen order.
pub fn group_domain(data: &Dataset, field: &str) -> Vec<String> {
    let mut seen = HashMap::new();
    let mut keys = Vec::new();
    for record in data {
        let key = group_key(record, field);
        if seen.insert(key.clone(), ()).is_none() {
            keys.push(key);
        }
    }
    keys
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineEndPlacement {
    /// One label per series, sorted by final y.
    pub labels: Vec<LabelDecision>,
    pub report: CollisionReport,
}

#[derive(Debug, Clone)]
struct EndCandidate {
    index: usize,
    key: String,
    x: f32,
    y: f32,
    original_y: f32,
}

impl VerticalSlot for EndCandidate {
    fn y(&self) -> f32 {
        self.y
    }

    fn set_y(&mut self, y: f32) {
        self.y = y;
    }
}

/// The rightmost record of each series, in order of first appearance.
/// Ties on x keep the earlier record.
pub fn last_points(data: &Dataset, x_field: &str, z_field: &str) -> Result<Vec<usize>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut last: Vec<(usize, f32)> = Vec::new();
    for (idx, record) in data.iter().enumerate() {
        let x = numeric_field(record, x_field, idx)?;
        let key = group_key(record, z_field);
        match slots.get(&key) {
            Some(&slot) => {
                if x > last[slot].1 {
                    last[slot] = (idx, x);
                }
            }
            None => {
                slots.insert(key, last.len());
                last.push((idx, x));
            }
        }
    }
    Ok(last.into_iter().map(|(idx, _)| idx).collect())
}

/// Label the end of every series of `data` inside a frame `height` tall.
///
/// Overlap left after the iteration budget is not an error: the best
/// arrangement found is returned and `report.converged` is false.
pub fn place_line_end_labels<X, Y>(
    data: &Dataset,
    fields: &FieldSpec,
    scales: &Scales<X, Y>,
    height: f32,
    config: &LineEndLabelConfig,
    colors: Option<&dyn ColorResolver>,
) -> Result<LineEndPlacement>
where
    X: CoordinateMapper,
    Y: CoordinateMapper,
{
    config.validate()?;
    let z_field = fields.z.as_deref().ok_or_else(|| LabelError::InvalidOption {
        name: "z",
        reason: "line-end labels need a series field".to_string(),
    })?;
    data.require_fields(fields.required())?;

    let records: &[Record] = data.records();
    let mut candidates = Vec::new();
    for idx in last_points(data, &fields.x, z_field)? {
        let record = &records[idx];
        let (x, y) = project_record(record, idx, fields, scales)?;
        candidates.push(EndCandidate {
            index: idx,
            key: group_key(record, z_field),
            x,
            y,
            original_y: y,
        });
    }

    let collision = CollisionConfig {
        min_spacing: config.line_height,
        min_y: config.min_y.unwrap_or(0.0),
        max_y: config.max_y.unwrap_or(height),
        max_iterations: config.max_iterations,
        margin: config.separation_margin,
    };
    let report = resolve_vertical_collisions(&mut candidates, &collision);
    if report.converged {
        tracing::debug!(
            series = candidates.len(),
            passes = report.passes,
            "placed line-end labels"
        );
    } else {
        tracing::warn!(
            series = candidates.len(),
            passes = report.passes,
            "line-end labels still overlap after the iteration budget"
        );
    }

    let labels = candidates
        .into_iter()
        .map(|candidate| {
            let color = colors
                .and_then(|resolver| resolver.resolve(&candidate.key))
                .unwrap_or_else(|| config.fill.clone());
            LabelDecision {
                index: candidate.index,
                x: candidate.x + config.padding,
                y: candidate.y,
                orientation: Orientation::Right,
                text_anchor: Orientation::Right.text_anchor(),
                dx: END_LABEL_TEXT_X,
                dy: 0.0,
                baseline_shift: END_LABEL_BASELINE_SHIFT,
                rotate: None,
                text: text_field(&records[candidate.index], &fields.label),
                visible: true,
                fill: Some(config.fill.clone()),
                color: Some(color),
                cell_area: None,
                original_y: Some(candidate.original_y),
            }
        })
        .collect();

    Ok(LineEndPlacement { labels, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(v: f32) -> f32 {
        v
    }

    fn identity() -> Scales<fn(f32) -> f32, fn(f32) -> f32> {
        Scales { x: id, y: id }
    }

    fn fields() -> FieldSpec {
        FieldSpec::new("x", "y", "name").with_group("name")
    }

    fn place(data: serde_json::Value) -> LineEndPlacement {
        place_line_end_labels(
            &Dataset::from_value(data).unwrap(),
            &fields(),
            &identity(),
            100.0,
            &LineEndLabelConfig::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn picks_rightmost_point_per_series() {
        let placement = place(json!([
            {"x": 0, "y": 10, "name": "a"},
            {"x": 5, "y": 80, "name": "a"},
            {"x": 3, "y": 20, "name": "a"},
            {"x": 1, "y": 40, "name": "b"},
        ]));
        assert_eq!(placement.labels.len(), 2);
        let a = placement.labels.iter().find(|l| l.text == "a").unwrap();
        assert_eq!(a.index, 1);
        assert_eq!(a.x, 5.0 + 5.0);
        assert_eq!(a.y, 80.0);
    }

    #[test]
    fn x_ties_keep_first_seen() {
        let data = Dataset::from_value(json!([
            {"x": 2, "y": 10, "name": "a"},
            {"x": 2, "y": 60, "name": "a"},
        ]))
        .unwrap();
        assert_eq!(last_points(&data, "x", "name").unwrap(), vec![0]);
    }

    #[test]
    fn overlapping_ends_are_separated() {
        let placement = place(json!([
            {"x": 9, "y": 50, "name": "a"},
            {"x": 9, "y": 52, "name": "b"},
            {"x": 9, "y": 51, "name": "c"},
        ]));
        assert!(placement.report.converged);
        let ys: Vec<f32> = placement.labels.iter().map(|l| l.y).collect();
        assert!(ys.windows(2).all(|pair| pair[1] - pair[0] >= 14.0), "{ys:?}");
        let original: Vec<f32> = placement.labels.iter().map(|l| l.original_y.unwrap()).collect();
        assert_eq!(original, vec![50.0, 51.0, 52.0]);
    }

    #[test]
    fn colors_come_from_resolver_with_fallback() {
        let palette = OrdinalPalette::new(vec!["red".to_string()], ["a"]);
        let placement = place_line_end_labels(
            &Dataset::from_value(json!([
                {"x": 0, "y": 20, "name": "a"},
                {"x": 0, "y": 70, "name": "b"},
            ]))
            .unwrap(),
            &fields(),
            &identity(),
            100.0,
            &LineEndLabelConfig::default(),
            Some(&palette),
        )
        .unwrap();
        assert_eq!(placement.labels[0].color.as_deref(), Some("red"));
        assert_eq!(placement.labels[1].color.as_deref(), Some("currentColor"));
        assert_eq!(placement.labels[1].fill.as_deref(), Some("currentColor"));
    }

    #[test]
    fn palette_wraps_in_domain_order() {
        let palette = OrdinalPalette::new(
            vec!["c0".to_string(), "c1".to_string()],
            ["x", "y", "z", "x"],
        );
        assert_eq!(palette.resolve("x").as_deref(), Some("c0"));
        assert_eq!(palette.resolve("y").as_deref(), Some("c1"));
        assert_eq!(palette.resolve("z").as_deref(), Some("c0"));
        assert_eq!(palette.resolve("w"), None);
    }

    #[test]
    fn closure_resolver() {
        let resolver = |key: &str| Some(format!("color-{key}"));
        assert_eq!(resolver.resolve("a").as_deref(), Some("color-a"));
    }

    #[test]
    fn group_domain_is_first_seen_order() {
        let data = Dataset::from_value(json!([
            {"team": "b"}, {"team": "a"}, {"team": "b"}, {"team": 3}
        ]))
        .unwrap();
        assert_eq!(group_domain(&data, "team"), vec!["b", "a", "3"]);
    }

    #[test]
    fn series_field_is_required() {
        let err = place_line_end_labels(
            &Dataset::default(),
            &FieldSpec::new("x", "y", "name"),
            &identity(),
            100.0,
            &LineEndLabelConfig::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LabelError::InvalidOption { name: "z", .. }));
    }

    #[test]
    fn custom_bounds_are_respected() {
        let config = LineEndLabelConfig {
            min_y: Some(40.0),
            max_y: Some(60.0),
            line_height: 4.0,
            ..Default::default()
        };
        let placement = place_line_end_labels(
            &Dataset::from_value(json!([
                {"x": 0, "y": 0, "name": "a"},
                {"x": 0, "y": 100, "name": "b"},
            ]))
            .unwrap(),
            &fields(),
            &identity(),
            100.0,
            &config,
            None,
        )
        .unwrap();
        let ys: Vec<f32> = placement.labels.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![42.0, 58.0]);
    }
}
