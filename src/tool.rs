use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::shape::ShapeKind;
use crate::stroke::{self, Brush, Color, DashPattern, LineStyle};
use crate::text::FontSpec;

pub const MIN_PEN_WIDTH: u32 = 1;
pub const MAX_PEN_WIDTH: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PencilStyle {
    Solid,
    Dotted,
    Wavy,
}

impl PencilStyle {
    pub const ALL: [PencilStyle; 3] = [PencilStyle::Solid, PencilStyle::Dotted, PencilStyle::Wavy];

    pub fn name(&self) -> &'static str {
        match self {
            PencilStyle::Solid => "solid",
            PencilStyle::Dotted => "dotted",
            PencilStyle::Wavy => "wavy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name().eq_ignore_ascii_case(name))
    }
}

/// The tool selected in the toolbar, without its variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Pencil,
    Eraser,
    Shape,
    Fill,
    Text,
}

/// A tool together with the variant it draws with.
///
/// A gesture captures one of these on press and keeps it until release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Pencil(PencilStyle),
    Eraser,
    Shape(ShapeKind),
    Fill,
    Text,
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Pencil(_) => ToolKind::Pencil,
            Tool::Eraser => ToolKind::Eraser,
            Tool::Shape(_) => ToolKind::Shape,
            Tool::Fill => ToolKind::Fill,
            Tool::Text => ToolKind::Text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil(_) => "pencil",
            Tool::Eraser => "eraser",
            Tool::Shape(_) => "shape",
            Tool::Fill => "fill",
            Tool::Text => "text",
        }
    }
}

/// Settings shared by all gesture handling. Only the UI changes them.
#[derive(Debug, Clone)]
pub struct ToolState {
    kind: ToolKind,
    pencil_style: PencilStyle,
    shape: ShapeKind,
    color: Color,
    pen_width: u32,
    eraser_width: u32,
    background: Color,
    dash_pattern: DashPattern,
    font: FontSpec,
}

impl ToolState {
    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        let mut state = Self {
            kind: ToolKind::Pencil,
            pencil_style: PencilStyle::Solid,
            shape: ShapeKind::Rectangle,
            color: stroke::parse_color(&config.color)?,
            pen_width: MIN_PEN_WIDTH,
            eraser_width: config.eraser_width.max(1),
            background: stroke::parse_color(&config.background)?,
            dash_pattern: config.dash_pattern,
            font: config.font.clone(),
        };
        state.set_pen_width(config.pen_width as i64);
        Ok(state)
    }

    /// The current tool with its variant resolved
    pub fn active_tool(&self) -> Tool {
        match self.kind {
            ToolKind::Pencil => Tool::Pencil(self.pencil_style),
            ToolKind::Eraser => Tool::Eraser,
            ToolKind::Shape => Tool::Shape(self.shape),
            ToolKind::Fill => Tool::Fill,
            ToolKind::Text => Tool::Text,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn select(&mut self, tool: Tool) {
        match tool {
            Tool::Pencil(style) => self.pencil_style = style,
            Tool::Shape(kind) => self.shape = kind,
            Tool::Eraser | Tool::Fill | Tool::Text => {}
        }
        self.kind = tool.kind();
    }

    /// Select a tool by name, e.g. `("shape", Some("oval"))` or `("pencil", Some("dotted"))`.
    /// Without a variant the tool keeps its last one.
    pub fn set_tool(&mut self, name: &str, variant: Option<&str>) -> Result<Tool> {
        let tool = match name.to_ascii_lowercase().as_str() {
            "pencil" => Tool::Pencil(match variant {
                Some(v) => PencilStyle::from_name(v).ok_or_else(|| EditorError::UnknownVariant {
                    tool: "pencil",
                    variant: v.to_owned(),
                })?,
                None => self.pencil_style,
            }),
            "shape" => Tool::Shape(match variant {
                Some(v) => ShapeKind::from_name(v).ok_or_else(|| EditorError::UnknownVariant {
                    tool: "shape",
                    variant: v.to_owned(),
                })?,
                None => self.shape,
            }),
            "eraser" => Tool::Eraser,
            "fill" => Tool::Fill,
            "text" => Tool::Text,
            _ => return Err(EditorError::UnknownTool(name.to_owned())),
        };
        self.select(tool);
        log::info!("Tool changed to {:?}", tool);
        Ok(tool)
    }

    pub fn pencil_style(&self) -> PencilStyle {
        self.pencil_style
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }

    /// Store `requested` clamped to [1, 50] and return the stored width
    pub fn set_pen_width(&mut self, requested: i64) -> u32 {
        let width = requested.clamp(MIN_PEN_WIDTH as i64, MAX_PEN_WIDTH as i64) as u32;
        if width as i64 != requested {
            log::debug!("Pen width {} clamped to {}", requested, width);
        }
        self.pen_width = width;
        width
    }

    pub fn eraser_width(&self) -> u32 {
        self.eraser_width
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn brush(&self) -> Brush {
        Brush::new(self.color, self.pen_width)
    }

    pub fn eraser_brush(&self) -> Brush {
        Brush::new(self.background, self.eraser_width)
    }

    pub fn line_style(&self, style: PencilStyle) -> LineStyle {
        match style {
            PencilStyle::Solid => LineStyle::Solid,
            PencilStyle::Dotted => LineStyle::Dotted,
            PencilStyle::Wavy => LineStyle::Dashed(self.dash_pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ToolState {
        ToolState::from_config(&EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_pen_width_clamp() {
        let mut tools = state();
        assert_eq!(tools.set_pen_width(0), 1);
        assert_eq!(tools.pen_width(), 1);
        assert_eq!(tools.set_pen_width(999), 50);
        assert_eq!(tools.pen_width(), 50);
        assert_eq!(tools.set_pen_width(-7), 1);
        assert_eq!(tools.set_pen_width(12), 12);
    }

    #[test]
    fn test_defaults_from_config() {
        let tools = state();
        assert_eq!(tools.active_tool(), Tool::Pencil(PencilStyle::Solid));
        assert_eq!(tools.pen_width(), 5);
        assert_eq!(tools.eraser_width(), 20);
        assert_eq!(tools.eraser_brush().color, crate::stroke::WHITE);
    }

    #[test]
    fn test_set_tool_by_name() {
        let mut tools = state();
        assert_eq!(tools.set_tool("shape", Some("oval")).unwrap(), Tool::Shape(ShapeKind::Oval));
        assert_eq!(tools.set_tool("pencil", Some("Wavy")).unwrap(), Tool::Pencil(PencilStyle::Wavy));
        // Variant is remembered when switching back without one
        assert_eq!(tools.set_tool("shape", None).unwrap(), Tool::Shape(ShapeKind::Oval));
        assert_eq!(tools.set_tool("fill", None).unwrap(), Tool::Fill);
        assert_eq!(tools.kind(), ToolKind::Fill);
    }

    #[test]
    fn test_set_tool_rejects_unknown_names() {
        let mut tools = state();
        assert!(matches!(tools.set_tool("airbrush", None), Err(EditorError::UnknownTool(_))));
        assert!(matches!(
            tools.set_tool("shape", Some("star")),
            Err(EditorError::UnknownVariant { tool: "shape", .. })
        ));
        assert_eq!(tools.kind(), ToolKind::Pencil);
    }

    #[test]
    fn test_wavy_uses_configured_dash_pattern() {
        let tools = state();
        assert_eq!(tools.line_style(PencilStyle::Wavy), LineStyle::Dashed(DashPattern { draw: 4, gap: 2 }));
        assert_eq!(tools.line_style(PencilStyle::Dotted), LineStyle::Dotted);
    }
}
