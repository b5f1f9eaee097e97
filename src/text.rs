use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EditorError, Result};
use crate::raster::{PixelBuffer, PixelRect};
use crate::stroke::Color;

const EMBEDDED_FONT: &str = "<embedded>";

/// Font used to render an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// TrueType/OpenType file; `None` selects the embedded font
    pub path: Option<PathBuf>,
    /// Pixel height
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            path: None,
            size: 20.0,
        }
    }
}

/// A piece of text placed on the canvas, anchored at its top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub id: Uuid,
    pub position: Pos2,
    pub text: String,
    pub color: Color,
    pub font: FontSpec,
}

impl TextAnnotation {
    pub fn new(position: Pos2, text: impl Into<String>, color: Color, font: FontSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            text: text.into(),
            color,
            font,
        }
    }
}

/// Load a font file from disk
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).map_err(|err| EditorError::Font {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    FontArc::try_from_vec(bytes).map_err(|err| EditorError::Font {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// The proportional font egui ships with its default font set
pub fn embedded_font() -> Result<FontArc> {
    let definitions = egui::FontDefinitions::default();
    let data = definitions
        .families
        .get(&egui::FontFamily::Proportional)
        .and_then(|names| names.first())
        .and_then(|name| definitions.font_data.get(name))
        .ok_or_else(|| EditorError::Font {
            path: EMBEDDED_FONT.to_owned(),
            reason: "no proportional font in the default font set".to_owned(),
        })?;

    FontArc::try_from_vec(data.font.to_vec()).map_err(|err| EditorError::Font {
        path: EMBEDDED_FONT.to_owned(),
        reason: err.to_string(),
    })
}

/// Loaded fonts, keyed by file path, with the embedded font as fallback
#[derive(Default)]
pub struct FontCache {
    embedded: Option<FontArc>,
    loaded: HashMap<PathBuf, FontArc>,
    unavailable: HashSet<PathBuf>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Font for `spec`, falling back to the embedded font when the
    /// requested file cannot be used. Errors only if no font at all is available.
    pub fn resolve(&mut self, spec: &FontSpec) -> Result<FontArc> {
        if let Some(path) = &spec.path {
            if let Some(font) = self.loaded.get(path) {
                return Ok(font.clone());
            }
            if !self.unavailable.contains(path) {
                match load_font(path) {
                    Ok(font) => {
                        log::info!("Loaded font {}", path.display());
                        self.loaded.insert(path.clone(), font.clone());
                        return Ok(font);
                    }
                    Err(err) => {
                        log::warn!("{err}; falling back to the embedded font");
                        self.unavailable.insert(path.clone());
                    }
                }
            }
        }
        self.embedded()
    }

    fn embedded(&mut self) -> Result<FontArc> {
        if let Some(font) = &self.embedded {
            return Ok(font.clone());
        }
        let font = embedded_font()?;
        self.embedded = Some(font.clone());
        Ok(font)
    }
}

/// Walk every glyph pixel of `annotation`, reporting its coverage.
///
/// Both the overlay text layer and the save-time flatten go through this,
/// so text looks the same on screen and in the saved file.
pub fn rasterize(font: &FontArc, annotation: &TextAnnotation, mut plot: impl FnMut(i32, i32, f32)) {
    let scale = PxScale::from(annotation.font.size);
    let scaled = font.as_scaled(scale);
    let line_advance = scaled.height() + scaled.line_gap();

    for (line_index, line) in annotation.text.lines().enumerate() {
        let baseline = annotation.position.y + scaled.ascent() + line_advance * line_index as f32;
        let mut caret = point(annotation.position.x, baseline);
        let mut previous: Option<GlyphId> = None;

        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, caret);
            caret.x += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    if coverage > 0.0 {
                        plot(bounds.min.x as i32 + gx as i32, bounds.min.y as i32 + gy as i32, coverage);
                    }
                });
            }
        }
    }
}

/// Burn `annotation` into the buffer
pub fn render_into(buffer: &mut PixelBuffer, font: &FontArc, annotation: &TextAnnotation) -> Option<PixelRect> {
    let mut dirty: Option<PixelRect> = None;
    rasterize(font, annotation, |x, y, coverage| {
        if buffer.contains(x, y) {
            buffer.blend_pixel(x, y, annotation.color, coverage);
            let point = PixelRect {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            };
            dirty = Some(dirty.map_or(point, |r| r.union(point)));
        }
    });
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{BLACK, WHITE};

    #[test]
    fn test_missing_font_file_is_resource_error() {
        let result = load_font(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(EditorError::Font { .. })));
    }

    #[test]
    fn test_cache_falls_back_to_embedded_font() {
        let mut cache = FontCache::new();
        let spec = FontSpec {
            path: Some(PathBuf::from("/nonexistent/font.ttf")),
            size: 16.0,
        };
        let font = cache.resolve(&spec).expect("embedded fallback");
        assert_ne!(font.glyph_id('A'), GlyphId(0));
    }

    #[test]
    fn test_render_into_marks_pixels_near_anchor() {
        let mut cache = FontCache::new();
        let font = cache.resolve(&FontSpec::default()).unwrap();
        let mut buffer = PixelBuffer::new(80, 40, WHITE);
        let annotation = TextAnnotation::new(Pos2::new(5.0, 5.0), "Hi", BLACK, FontSpec::default());

        let dirty = render_into(&mut buffer, &font, &annotation).expect("text drew pixels");
        assert!(dirty.min_x >= 5 && dirty.min_y >= 5);
        assert!(buffer.image().pixels().any(|p| *p != WHITE));
        assert_eq!(buffer.get_pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut cache = FontCache::new();
        let font = cache.resolve(&FontSpec::default()).unwrap();
        let mut buffer = PixelBuffer::new(20, 20, WHITE);
        let annotation = TextAnnotation::new(Pos2::ZERO, "", BLACK, FontSpec::default());
        assert!(render_into(&mut buffer, &font, &annotation).is_none());
    }
}
