use chart_labels::{
    ChartKind, FieldSpec, RenderOptions, Theme, layout_with_options, render_with_options,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelOptions {
    kind: Option<ChartKind>,
    x: Option<String>,
    y: Option<String>,
    z: Option<String>,
    label: Option<String>,
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    min_cell_size: Option<f32>,
    line_height: Option<f32>,
    rotate: Option<f32>,
}

fn build_render_options(options: LabelOptions) -> RenderOptions {
    let mut fields = FieldSpec::new(
        options.x.unwrap_or_else(|| "x".to_string()),
        options.y.unwrap_or_else(|| "y".to_string()),
        options.label.unwrap_or_else(|| "label".to_string()),
    );
    if let Some(z) = options.z {
        fields = fields.with_group(z);
    }

    let mut render_options = match options.kind.unwrap_or(ChartKind::Scatter) {
        ChartKind::Scatter => RenderOptions::scatter(fields, options.min_cell_size),
        ChartKind::LineEnd => RenderOptions::line_end(fields),
    };
    let config = &mut render_options.config;

    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        config.render.background = theme.background.clone();
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(padding) = options.padding {
        config.region.padding = padding;
        config.line_end.padding = padding;
    }
    config.region.rotate = options.rotate;
    if let Some(line_height) = options.line_height {
        config.line_end.line_height = line_height;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<LabelOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        LabelOptions::default()
    };
    Ok(build_render_options(options))
}

/// Label decisions for `data_json` as a JSON array.
#[wasm_bindgen]
pub fn place_labels_json(data_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let layout = layout_with_options(data_json, &options)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    serde_json::to_string(&layout.labels).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_labels_svg(data_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    render_with_options(data_json, &options).map_err(|error| JsValue::from_str(&error.to_string()))
}
