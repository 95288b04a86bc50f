mod collision;
pub mod geometry;
pub mod line_end;
pub mod measure;
pub mod region;
pub(crate) mod types;
mod voronoi;

pub use collision::{CollisionConfig, CollisionReport, VerticalSlot, resolve_vertical_collisions};
pub use geometry::{Bounds, Point};
pub use line_end::{
    ColorResolver, LineEndPlacement, OrdinalPalette, group_domain, last_points,
    place_line_end_labels,
};
pub use measure::{
    BackgroundBox, FixedWidthMeasurer, FontMetricsMeasurer, TextExtent, TextMeasurer,
    fit_backgrounds, measure_labels, text_extent,
};
pub use region::{RegionPlacement, compute_cells, place_region_labels};
pub use types::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{Config, RenderConfig};
use crate::error::{LabelError, Result};
use crate::ir::{Dataset, FieldSpec, Record, group_key, numeric_field};
use crate::scale::{CoordinateMapper, LinearScale, Scales};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Dots labelled through their Voronoi cells.
    Scatter,
    /// One line per series, labelled at its rightmost point.
    LineEnd,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub kind: ChartKind,
    pub width: f32,
    pub height: f32,
    /// Area inside the margins that the scales map onto.
    pub plot: Bounds,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub points: Vec<PointMark>,
    pub series: Vec<SeriesPath>,
    pub cells: Vec<Cell>,
    pub labels: Vec<LabelDecision>,
    pub dropped: Vec<usize>,
    pub collision: Option<CollisionReport>,
}

/// Project one record through the scales, rejecting non-finite pixels.
pub(crate) fn project_record<X, Y>(
    record: &Record,
    idx: usize,
    fields: &FieldSpec,
    scales: &Scales<X, Y>,
) -> Result<Point>
where
    X: CoordinateMapper,
    Y: CoordinateMapper,
{
    let x = numeric_field(record, &fields.x, idx)?;
    let y = numeric_field(record, &fields.y, idx)?;
    let (px, py) = scales.project(x, y);
    if !px.is_finite() || !py.is_finite() {
        return Err(LabelError::NonFinitePosition {
            index: idx,
            x: px,
            y: py,
        });
    }
    Ok((px, py))
}

/// Linear scales from the data extents onto the plot area inside the
/// margins. The y range is flipped so larger values sit higher.
pub fn chart_scales(
    data: &Dataset,
    fields: &FieldSpec,
    render: &RenderConfig,
) -> Result<Scales<LinearScale, LinearScale>> {
    let plot = plot_bounds(render);
    let x_domain = data.extent(&fields.x)?.unwrap_or((0.0, 1.0));
    let y_domain = data.extent(&fields.y)?.unwrap_or((0.0, 1.0));
    let mut x = LinearScale::new(x_domain, (plot.min_x, plot.max_x));
    let mut y = LinearScale::new(y_domain, (plot.max_y, plot.min_y));
    if render.nice {
        x = x.nice(render.ticks);
        y = y.nice(render.ticks);
    }
    Ok(Scales::new(x, y))
}

pub fn plot_bounds(render: &RenderConfig) -> Bounds {
    Bounds::new(
        render.margin_left,
        render.margin_top,
        render.width - render.margin_right,
        render.height - render.margin_bottom,
    )
}

/// Build scales for `data`, project it and place labels for `kind`.
pub fn compute_layout(
    data: &Dataset,
    kind: ChartKind,
    fields: &FieldSpec,
    config: &Config,
) -> Result<Layout> {
    match kind {
        ChartKind::Scatter => {
            data.require_fields([fields.x.as_str(), fields.y.as_str(), fields.label.as_str()])?
        }
        ChartKind::LineEnd => data.require_fields(fields.required())?,
    }

    let render = &config.render;
    let scales = chart_scales(data, fields, render)?;
    let mut layout = Layout {
        kind,
        width: render.width,
        height: render.height,
        plot: plot_bounds(render),
        x_scale: scales.x,
        y_scale: scales.y,
        points: Vec::new(),
        series: Vec::new(),
        cells: Vec::new(),
        labels: Vec::new(),
        dropped: Vec::new(),
        collision: None,
    };

    match kind {
        ChartKind::Scatter => {
            for (idx, record) in data.iter().enumerate() {
                let (x, y) = project_record(record, idx, fields, &scales)?;
                layout.points.push(PointMark {
                    index: idx,
                    x,
                    y,
                    color: Some(config.theme.point_fill.clone()),
                });
            }
            let placement = place_region_labels(
                data,
                fields,
                &scales,
                render.width,
                render.height,
                &config.region,
            )?;
            layout.labels = placement.labels;
            layout.cells = placement.cells;
            layout.dropped = placement.dropped;
        }
        ChartKind::LineEnd => {
            let z_field = fields.z.as_deref().ok_or_else(|| LabelError::InvalidOption {
                name: "z",
                reason: "line-end charts need a series field".to_string(),
            })?;
            let palette =
                OrdinalPalette::new(config.theme.palette.clone(), group_domain(data, z_field));
            layout.series = series_paths(data, fields, z_field, &scales, &palette)?;
            let placement = place_line_end_labels(
                data,
                fields,
                &scales,
                render.height,
                &config.line_end,
                Some(&palette),
            )?;
            layout.labels = placement.labels;
            layout.collision = Some(placement.report);
        }
    }

    Ok(layout)
}

fn series_paths<X, Y>(
    data: &Dataset,
    fields: &FieldSpec,
    z_field: &str,
    scales: &Scales<X, Y>,
    palette: &OrdinalPalette,
) -> Result<Vec<SeriesPath>>
where
    X: CoordinateMapper,
    Y: CoordinateMapper,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<SeriesPath> = Vec::new();
    for (idx, record) in data.iter().enumerate() {
        let key = group_key(record, z_field);
        let point = project_record(record, idx, fields, scales)?;
        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            series.push(SeriesPath {
                color: palette.resolve(&key),
                key,
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[slot].points.push(point);
    }
    for path in &mut series {
        path.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scatter_config() -> Config {
        let mut config = Config::default();
        config.region.min_cell_size = Some(100.0);
        config.render.width = 200.0;
        config.render.height = 200.0;
        config
    }

    #[test]
    fn scatter_layout_projects_points_inside_plot() {
        let data = Dataset::from_value(json!([
            {"x": 1, "y": 1, "name": "a"},
            {"x": 3, "y": 2, "name": "b"},
            {"x": 2, "y": 4, "name": "c"},
        ]))
        .unwrap();
        let layout = compute_layout(
            &data,
            ChartKind::Scatter,
            &FieldSpec::new("x", "y", "name"),
            &scatter_config(),
        )
        .unwrap();
        assert_eq!(layout.points.len(), 3);
        assert_eq!(layout.labels.len(), 3);
        assert!(layout.points.iter().all(|p| layout.plot.contains((p.x, p.y))));
        // larger y is drawn higher
        assert!(layout.points[2].y < layout.points[0].y);
        assert!(layout.collision.is_none());
    }

    #[test]
    fn line_end_layout_builds_sorted_series() {
        let data = Dataset::from_value(json!([
            {"t": 2, "v": 5, "team": "a"},
            {"t": 0, "v": 1, "team": "a"},
            {"t": 1, "v": 3, "team": "b"},
        ]))
        .unwrap();
        let layout = compute_layout(
            &data,
            ChartKind::LineEnd,
            &FieldSpec::new("t", "v", "team").with_group("team"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(layout.series.len(), 2);
        let a = &layout.series[0];
        assert_eq!(a.key, "a");
        assert!(a.points[0].0 < a.points[1].0);
        assert_eq!(a.color.as_deref(), Some(crate::theme::TABLEAU10[0]));
        assert_eq!(layout.labels.len(), 2);
        assert!(layout.collision.unwrap().converged);
    }

    #[test]
    fn missing_field_is_reported_before_scales() {
        let data = Dataset::from_value(json!([{"x": 1, "name": "a"}])).unwrap();
        let err = compute_layout(
            &data,
            ChartKind::Scatter,
            &FieldSpec::new("x", "y", "name"),
            &scatter_config(),
        )
        .unwrap_err();
        assert!(matches!(err, LabelError::MissingField { .. }));
    }

    #[test]
    fn scales_respect_margins() {
        let render = RenderConfig {
            width: 100.0,
            height: 50.0,
            margin_left: 10.0,
            margin_right: 10.0,
            margin_top: 5.0,
            margin_bottom: 5.0,
            nice: false,
            ..Default::default()
        };
        let data = Dataset::from_value(json!([{"x": 0, "y": 0}, {"x": 8, "y": 4}])).unwrap();
        let scales = chart_scales(&data, &FieldSpec::new("x", "y", "x"), &render).unwrap();
        assert_eq!(scales.project(0.0, 0.0), (10.0, 45.0));
        assert_eq!(scales.project(8.0, 4.0), (90.0, 5.0));
    }
}
