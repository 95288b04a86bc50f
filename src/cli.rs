use crate::config::{Config, load_config};
use crate::ir::{Dataset, FieldSpec};
use crate::layout::{ChartKind, compute_layout};
use crate::layout_dump::write_layout_dump;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "chlabel",
    version,
    about = "Place labels on scatter plots and line-chart series ends"
)]
pub struct Args {
    /// Input JSON file (rows or columns) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Chart kind
    #[arg(short = 'k', long = "kind", value_enum, default_value = "scatter")]
    pub kind: ChartKind,

    #[arg(short = 'x', long = "x", default_value = "x")]
    pub x: String,

    #[arg(short = 'y', long = "y", default_value = "y")]
    pub y: String,

    /// Series field (line-end charts)
    #[arg(short = 'z', long = "z")]
    pub z: Option<String>,

    /// Label text field
    #[arg(short = 'l', long = "label", default_value = "label")]
    pub label: String,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Gap between a point and its label
    #[arg(long = "padding")]
    pub padding: Option<f32>,

    /// Minimum cell area (px²) for a scatter label to be shown
    #[arg(long = "minCellSize")]
    pub min_cell_size: Option<f32>,

    /// Vertical space reserved per line-end label
    #[arg(long = "lineHeight")]
    pub line_height: Option<f32>,

    /// Rotate scatter labels by this many degrees
    #[arg(long = "rotate", allow_hyphen_values = true)]
    pub rotate: Option<f32>,

    /// Keep only the top N percent of records ranked by the y field
    #[arg(long = "topPercentile")]
    pub top_percentile: Option<f32>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Draw the Voronoi cells behind scatter points
    #[arg(long = "showCells")]
    pub show_cells: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = apply_args(load_config(args.config.as_deref())?, &args);

    let input = read_input(args.input.as_deref())?;
    let mut data = Dataset::from_json_str(&input).context("failed to read input data")?;
    if let Some(percent) = args.top_percentile {
        data = data.slice_quantile(&args.y, 1.0 - percent / 100.0)?;
    }

    let mut fields = FieldSpec::new(args.x.as_str(), args.y.as_str(), args.label.as_str());
    if let Some(z) = args.z.as_deref() {
        fields = fields.with_group(z);
    }

    let layout = compute_layout(&data, args.kind, &fields, &config)?;
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)?;
    }

    let svg = render_svg(&layout, &config.theme, &config.render)?;
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Flags override whatever the config file set.
fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(padding) = args.padding {
        config.region.padding = padding;
        config.line_end.padding = padding;
    }
    if args.min_cell_size.is_some() {
        config.region.min_cell_size = args.min_cell_size;
    }
    if args.rotate.is_some() {
        config.region.rotate = args.rotate;
    }
    if let Some(line_height) = args.line_height {
        config.line_end.line_height = line_height;
    }
    if args.show_cells {
        config.render.show_cells = true;
    }
    config
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
