#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scale;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LineEndLabelConfig, RegionLabelConfig, RenderConfig, load_config};
pub use error::{LabelError, Result};
pub use ir::{Dataset, FieldSpec, Record};
pub use layout::{
    ChartKind, LabelDecision, Layout, LineEndPlacement, Orientation, RegionPlacement,
    compute_layout, place_line_end_labels, place_region_labels,
};
pub use scale::{CoordinateMapper, LinearScale, Scales};
pub use theme::Theme;

/// Everything needed to go from raw JSON records to a chart.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub kind: ChartKind,
    pub fields: FieldSpec,
    pub config: Config,
}

impl RenderOptions {
    /// Scatter options; without `min_cell_size` placement reports the
    /// missing threshold instead of guessing one.
    pub fn scatter(fields: FieldSpec, min_cell_size: Option<f32>) -> Self {
        let mut config = Config::default();
        config.region.min_cell_size = min_cell_size;
        Self {
            kind: ChartKind::Scatter,
            fields,
            config,
        }
    }

    pub fn line_end(fields: FieldSpec) -> Self {
        Self {
            kind: ChartKind::LineEnd,
            fields,
            config: Config::default(),
        }
    }
}

pub fn layout_with_options(data_json: &str, options: &RenderOptions) -> Result<Layout> {
    let data = Dataset::from_json_str(data_json)?;
    compute_layout(&data, options.kind, &options.fields, &options.config)
}

pub fn render_with_options(data_json: &str, options: &RenderOptions) -> Result<String> {
    let layout = layout_with_options(data_json, options)?;
    render::render_svg(&layout, &options.config.theme, &options.config.render)
}
