use crate::error::{LabelError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGION_PADDING: f32 = 10.0;
pub const DEFAULT_LINE_END_PADDING: f32 = 5.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 14.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_SEPARATION_MARGIN: f32 = 0.5;

/// Options of the Voronoi scatter labeler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionLabelConfig {
    pub padding: f32,
    /// Labels whose cell area is at or below this are hidden. No default:
    /// the right value depends on font size and label length.
    pub min_cell_size: Option<f32>,
    /// Degrees.
    pub rotate: Option<f32>,
}

impl Default for RegionLabelConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_REGION_PADDING,
            min_cell_size: None,
            rotate: None,
        }
    }
}

impl RegionLabelConfig {
    pub fn with_min_cell_size(min_cell_size: f32) -> Self {
        Self {
            min_cell_size: Some(min_cell_size),
            ..Self::default()
        }
    }

    /// Checks every option and returns the required minimum cell size.
    pub fn validate(&self) -> Result<f32> {
        non_negative("padding", self.padding)?;
        if let Some(rotate) = self.rotate
            && !rotate.is_finite()
        {
            return Err(LabelError::InvalidOption {
                name: "rotate",
                reason: format!("{rotate} is not finite"),
            });
        }
        let min_cell_size = self.min_cell_size.ok_or_else(|| LabelError::InvalidOption {
            name: "minCellSize",
            reason: "required for region labels".to_string(),
        })?;
        non_negative("minCellSize", min_cell_size)?;
        Ok(min_cell_size)
    }
}

/// Options of the line-end labeler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEndLabelConfig {
    pub padding: f32,
    /// Minimum vertical distance between label baselines.
    pub line_height: f32,
    /// Text fill and the series color when no resolver answers.
    pub fill: String,
    pub max_iterations: usize,
    /// Added to each half-overlap push so separated pairs end strictly apart.
    pub separation_margin: f32,
    /// Vertical bounds; default to `[0, height]` of the frame.
    pub min_y: Option<f32>,
    pub max_y: Option<f32>,
}

impl Default for LineEndLabelConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_LINE_END_PADDING,
            line_height: DEFAULT_LINE_HEIGHT,
            fill: "currentColor".to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            separation_margin: DEFAULT_SEPARATION_MARGIN,
            min_y: None,
            max_y: None,
        }
    }
}

impl LineEndLabelConfig {
    pub fn validate(&self) -> Result<()> {
        non_negative("padding", self.padding)?;
        non_negative("lineHeight", self.line_height)?;
        non_negative("separationMargin", self.separation_margin)?;
        for (name, value) in [("minY", self.min_y), ("maxY", self.max_y)] {
            if let Some(value) = value
                && !value.is_finite()
            {
                return Err(LabelError::InvalidOption {
                    name,
                    reason: format!("{value} is not finite"),
                });
            }
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LabelError::InvalidOption {
            name,
            reason: format!("{value} must be a finite, non-negative number"),
        })
    }
}

/// Frame of the rendered chart. Scales map data into the area left inside
/// the margins; placement bounds cover the full frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    /// Round scale domains outward to tick steps.
    pub nice: bool,
    pub ticks: usize,
    pub point_radius: f32,
    pub show_cells: bool,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            margin_top: 20.0,
            margin_right: 40.0,
            margin_bottom: 30.0,
            margin_left: 40.0,
            nice: true,
            ticks: 5,
            point_radius: 4.0,
            show_cells: false,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
    pub region: RegionLabelConfig,
    pub line_end: LineEndLabelConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::observable();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            render,
            region: RegionLabelConfig::default(),
            line_end: LineEndLabelConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    point_fill: Option<String>,
    point_stroke: Option<String>,
    cell_stroke: Option<String>,
    label_background: Option<String>,
    label_background_opacity: Option<f32>,
    background: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin_top: Option<f32>,
    margin_right: Option<f32>,
    margin_bottom: Option<f32>,
    margin_left: Option<f32>,
    nice: Option<bool>,
    ticks: Option<usize>,
    point_radius: Option<f32>,
    show_cells: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionConfigFile {
    padding: Option<f32>,
    min_cell_size: Option<f32>,
    rotate: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineEndConfigFile {
    padding: Option<f32>,
    line_height: Option<f32>,
    fill: Option<String>,
    max_iterations: Option<usize>,
    separation_margin: Option<f32>,
    min_y: Option<f32>,
    max_y: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderConfigFile>,
    region: Option<RegionConfigFile>,
    line_end: Option<LineEndConfigFile>,
}

/// Load defaults, then overlay a JSON (or JSON5) config file when given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.point_fill {
            config.theme.point_fill = v;
        }
        if let Some(v) = vars.point_stroke {
            config.theme.point_stroke = v;
        }
        if let Some(v) = vars.cell_stroke {
            config.theme.cell_stroke = v;
        }
        if let Some(v) = vars.label_background {
            config.theme.label_background = v;
        }
        if let Some(v) = vars.label_background_opacity {
            config.theme.label_background_opacity = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.palette {
            config.theme.palette = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.margin_top {
            config.render.margin_top = v;
        }
        if let Some(v) = render.margin_right {
            config.render.margin_right = v;
        }
        if let Some(v) = render.margin_bottom {
            config.render.margin_bottom = v;
        }
        if let Some(v) = render.margin_left {
            config.render.margin_left = v;
        }
        if let Some(v) = render.nice {
            config.render.nice = v;
        }
        if let Some(v) = render.ticks {
            config.render.ticks = v;
        }
        if let Some(v) = render.point_radius {
            config.render.point_radius = v;
        }
        if let Some(v) = render.show_cells {
            config.render.show_cells = v;
        }
    }

    if let Some(region) = parsed.region {
        if let Some(v) = region.padding {
            config.region.padding = v;
        }
        if region.min_cell_size.is_some() {
            config.region.min_cell_size = region.min_cell_size;
        }
        if region.rotate.is_some() {
            config.region.rotate = region.rotate;
        }
    }

    if let Some(line_end) = parsed.line_end {
        if let Some(v) = line_end.padding {
            config.line_end.padding = v;
        }
        if let Some(v) = line_end.line_height {
            config.line_end.line_height = v;
        }
        if let Some(v) = line_end.fill {
            config.line_end.fill = v;
        }
        if let Some(v) = line_end.max_iterations {
            config.line_end.max_iterations = v;
        }
        if let Some(v) = line_end.separation_margin {
            config.line_end.separation_margin = v;
        }
        if line_end.min_y.is_some() {
            config.line_end.min_y = line_end.min_y;
        }
        if line_end.max_y.is_some() {
            config.line_end.max_y = line_end.max_y;
        }
    }

    Ok(config)
}
