use crate::layout::{ChartKind, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, JSON-friendly view of a layout for debugging placements.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub kind: ChartKind,
    pub width: f32,
    pub height: f32,
    pub labels: Vec<LabelDump>,
    pub cells: Vec<CellDump>,
    pub dropped: Vec<usize>,
    pub collision_passes: Option<usize>,
    pub converged: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub index: usize,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub orientation: String,
    pub text_anchor: String,
    pub visible: bool,
    pub cell_area: Option<f32>,
    pub original_y: Option<f32>,
    pub transform: String,
}

#[derive(Debug, Serialize)]
pub struct CellDump {
    pub index: usize,
    pub site: [f32; 2],
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                index: label.index,
                text: label.text.clone(),
                x: label.x,
                y: label.y,
                orientation: format!("{:?}", label.orientation),
                text_anchor: label.text_anchor.as_str().to_string(),
                visible: label.visible,
                cell_area: label.cell_area,
                original_y: label.original_y,
                transform: label.transform(),
            })
            .collect();

        let cells = layout
            .cells
            .iter()
            .map(|cell| CellDump {
                index: cell.index,
                site: [cell.site.0, cell.site.1],
                points: cell.polygon.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            kind: layout.kind,
            width: layout.width,
            height: layout.height,
            labels,
            cells,
            dropped: layout.dropped.clone(),
            collision_passes: layout.collision.map(|report| report.passes),
            converged: layout.collision.map(|report| report.converged),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
