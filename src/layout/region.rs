// Scatter labels from a nearest-site partition. Each label leans towards
// the centroid of the cell its point owns and is hidden when that cell is
// too small to host text without crowding a neighbour.

use serde::Serialize;

use super::geometry::{Bounds, Point, polygon_area, polygon_centroid};
use super::types::{Cell, LabelDecision, Orientation};
use super::voronoi::voronoi_cells;
use super::project_record;
use crate::config::RegionLabelConfig;
use crate::error::Result;
use crate::ir::{Dataset, FieldSpec, text_field};
use crate::scale::{CoordinateMapper, Scales};

/// Outward expansion of the frame before partitioning.
const CELL_BOUNDS_PAD: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPlacement {
    /// One decision per record that owns a cell, in input order.
    pub labels: Vec<LabelDecision>,
    pub cells: Vec<Cell>,
    /// Records without a usable cell (coincident with an earlier record or
    /// outside the frame). They get no label.
    pub dropped: Vec<usize>,
}

/// Partition the padded frame `[-1, -1, width + 1, height + 1]` among
/// `sites`; `None` marks a site without a cell.
pub fn compute_cells(sites: &[Point], width: f32, height: f32) -> Vec<Option<Vec<Point>>> {
    voronoi_cells(sites, Bounds::from_size(width, height).inflate(CELL_BOUNDS_PAD))
}

/// Place one label per record of `data` inside a `width` x `height` frame.
///
/// Records coincident with an earlier record are dropped, not reported as
/// errors; their indices are listed in [`RegionPlacement::dropped`].
pub fn place_region_labels<X, Y>(
    data: &Dataset,
    fields: &FieldSpec,
    scales: &Scales<X, Y>,
    width: f32,
    height: f32,
    config: &RegionLabelConfig,
) -> Result<RegionPlacement>
where
    X: CoordinateMapper,
    Y: CoordinateMapper,
{
    let min_cell_size = config.validate()?;
    data.require_fields([fields.x.as_str(), fields.y.as_str(), fields.label.as_str()])?;

    let sites = data
        .iter()
        .enumerate()
        .map(|(idx, record)| project_record(record, idx, fields, scales))
        .collect::<Result<Vec<Point>>>()?;
    let polygons = compute_cells(&sites, width, height);

    let mut labels = Vec::with_capacity(sites.len());
    let mut cells = Vec::with_capacity(sites.len());
    let mut dropped = Vec::new();

    for (idx, (site, polygon)) in sites.into_iter().zip(polygons).enumerate() {
        let Some((polygon, centroid)) =
            polygon.and_then(|polygon| polygon_centroid(&polygon).map(|c| (polygon, c)))
        else {
            dropped.push(idx);
            continue;
        };

        let area = polygon_area(&polygon).abs();
        let angle = (centroid.1 - site.1).atan2(centroid.0 - site.0);
        let orientation = Orientation::from_angle(angle);
        let (dx, dy) = orientation.offset(config.padding);

        labels.push(LabelDecision {
            index: idx,
            x: site.0,
            y: site.1,
            orientation,
            text_anchor: orientation.text_anchor(),
            dx,
            dy,
            baseline_shift: orientation.baseline_shift(),
            rotate: config.rotate,
            text: text_field(&data.records()[idx], &fields.label),
            visible: area > min_cell_size,
            fill: None,
            color: None,
            cell_area: Some(area),
            original_y: None,
        });
        cells.push(Cell {
            index: idx,
            site,
            polygon,
        });
    }

    if !dropped.is_empty() {
        tracing::debug!(dropped = ?dropped, "records without a cell get no label");
    }
    tracing::debug!(
        records = data.len(),
        labels = labels.len(),
        hidden = labels.iter().filter(|label| !label.visible).count(),
        "placed region labels"
    );

    Ok(RegionPlacement {
        labels,
        cells,
        dropped,
    })
}
