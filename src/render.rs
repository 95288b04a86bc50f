use crate::config::RenderConfig;
use crate::error::Result as LabelResult;
use crate::layout::line_end::{END_LABEL_DOT_RADIUS, END_LABEL_DOT_X};
use crate::layout::{
    BackgroundBox, ChartKind, FontMetricsMeasurer, LabelDecision, Layout, TextMeasurer,
    fit_backgrounds, measure_labels,
};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> LabelResult<String> {
    render_svg_with_measurer(layout, theme, config, &FontMetricsMeasurer)
}

/// Render with an explicit text measurer; line-end backgrounds are sized
/// from what it reports.
pub fn render_svg_with_measurer(
    layout: &Layout,
    theme: &Theme,
    config: &RenderConfig,
    measurer: &dyn TextMeasurer,
) -> LabelResult<String> {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"{}\" font-size=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    if config.show_cells {
        svg.push_str(&format!(
            "<g fill=\"none\" stroke=\"{}\" stroke-width=\"0.5\">",
            theme.cell_stroke
        ));
        for cell in &layout.cells {
            svg.push_str(&format!(
                "<path d=\"{} Z\"/>",
                points_to_path(&cell.polygon)
            ));
        }
        svg.push_str("</g>");
    }

    for series in &layout.series {
        let stroke = series.color.as_deref().unwrap_or(theme.line_color.as_str());
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            points_to_path(&series.points),
            stroke
        ));
    }

    for point in &layout.points {
        let fill = point.color.as_deref().unwrap_or(theme.point_fill.as_str());
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" stroke=\"{}\"/>",
            point.x, point.y, config.point_radius, fill, theme.point_stroke
        ));
    }

    match layout.kind {
        ChartKind::Scatter => {
            for label in &layout.labels {
                svg.push_str(&region_label_svg(label, theme));
            }
        }
        ChartKind::LineEnd => {
            let extents = measure_labels(&layout.labels, measurer, theme);
            let backgrounds = fit_backgrounds(&layout.labels, &extents)?;
            for (label, background) in layout.labels.iter().zip(&backgrounds) {
                svg.push_str(&line_end_label_svg(label, background, theme));
            }
        }
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn region_label_svg(label: &LabelDecision, theme: &Theme) -> String {
    let fill = label.fill.as_deref().unwrap_or(theme.text_color.as_str());
    let display = if label.visible { "" } else { " display=\"none\"" };
    format!(
        "<text transform=\"{}\" x=\"{:.2}\" y=\"{:.2}\" dy=\"{}em\" text-anchor=\"{}\" fill=\"{}\"{display}>{}</text>",
        label.transform(),
        label.dx,
        label.dy,
        label.baseline_shift,
        label.text_anchor.as_str(),
        fill,
        escape_xml(&label.text)
    )
}

fn line_end_label_svg(label: &LabelDecision, background: &BackgroundBox, theme: &Theme) -> String {
    let fill = label.fill.as_deref().unwrap_or(theme.text_color.as_str());
    let dot = label.color.as_deref().unwrap_or(fill);
    let mut group = format!("<g transform=\"{}\">", label.transform());
    group.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"{}\" fill-opacity=\"{}\"/>",
        background.x,
        background.y,
        background.width,
        background.height,
        theme.label_background,
        theme.label_background_opacity
    ));
    group.push_str(&format!(
        "<circle cx=\"{END_LABEL_DOT_X}\" r=\"{END_LABEL_DOT_RADIUS}\" fill=\"{dot}\"/>"
    ));
    group.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" dy=\"{}em\" fill=\"{}\">{}</text>",
        label.dx,
        label.dy,
        label.baseline_shift,
        fill,
        escape_xml(&label.text)
    ));
    group.push_str("</g>");
    group
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid frame size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
