use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Horizontal advance and vertical extent of one line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    /// Distance from the baseline up to the top of the em box.
    pub ascent: f32,
    /// Distance from the baseline down to the bottom of the em box.
    pub descent: f32,
}

/// Measure `text` with the first installed font matching the CSS
/// `font_family` list. `None` when no font resolves.
pub fn measure_text(text: &str, font_size: f32, font_family: &str) -> Option<TextMetrics> {
    if font_size <= 0.0 {
        return None;
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<TextMetrics> {
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(&family_key);
            self.faces.insert(family_key.clone(), face);
        }
        let face = self.faces.get_mut(&family_key)?.as_mut()?;
        Some(face.metrics(&text.replace('\t', "    "), font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|raw| !raw.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(raw),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data, index))
            .flatten()
    }
}

/// Per-font advance table. Glyph advances are read once and cached so the
/// face bytes do not need to outlive loading.
struct FontFace {
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    ascii_advances: [Option<u16>; 128],
    advances: HashMap<char, Option<u16>>,
    data: Vec<u8>,
    index: u32,
}

impl FontFace {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut ascii_advances = [None; 128];
        for byte in 0u8..=127 {
            ascii_advances[byte as usize] = face
                .glyph_index(byte as char)
                .and_then(|glyph| face.glyph_hor_advance(glyph));
        }
        Some(Self {
            units_per_em: face.units_per_em().max(1) as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            ascii_advances,
            advances: HashMap::new(),
            data: data.to_vec(),
            index,
        })
    }

    fn metrics(&mut self, text: &str, font_size: f32) -> TextMetrics {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        let mut face: Option<Face<'_>> = None;

        for ch in text.chars().filter(|&ch| ch != '\n') {
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else if let Some(cached) = self.advances.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                let value = face.as_ref().and_then(|face| {
                    face.glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                });
                self.advances.insert(ch, value);
                value
            };
            width += match advance {
                Some(units) if units > 0 => units as f32 * scale,
                _ => fallback,
            };
        }

        TextMetrics {
            width: width.max(0.0),
            ascent: self.ascender * scale,
            descent: -self.descender * scale,
        }
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
