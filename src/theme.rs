use serde::{Deserialize, Serialize};

/// Categorical palette assigned to series in first-seen order.
pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub line_color: String,
    pub point_fill: String,
    pub point_stroke: String,
    pub cell_stroke: String,
    pub label_background: String,
    pub label_background_opacity: f32,
    pub background: String,
    pub palette: Vec<String>,
}

impl Theme {
    /// 10px sans-serif labels on a white page, the usual notebook chart look.
    pub fn observable() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
            text_color: "currentColor".to_string(),
            line_color: "#4e79a7".to_string(),
            point_fill: "#4e79a7".to_string(),
            point_stroke: "none".to_string(),
            cell_stroke: "#cccccc".to_string(),
            label_background: "white".to_string(),
            label_background_opacity: 0.65,
            background: "#FFFFFF".to_string(),
            palette: TABLEAU10.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            point_fill: "#7A8AA6".to_string(),
            point_stroke: "#FFFFFF".to_string(),
            cell_stroke: "#D7E0F0".to_string(),
            label_background: "#FFFFFF".to_string(),
            label_background_opacity: 0.8,
            background: "#F7F9FC".to_string(),
            palette: TABLEAU10.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "observable" | "default" | "base" => Some(Self::observable()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::observable()
    }
}
