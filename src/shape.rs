use egui::{Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};

use crate::raster::{PixelBuffer, PixelRect};
use crate::stroke::{Brush, LineStyle};

/// Shapes available from the shape tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Oval,
    Line,
    Triangle,
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Oval,
        ShapeKind::Line,
        ShapeKind::Triangle,
        ShapeKind::Diamond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Oval => "oval",
            ShapeKind::Line => "line",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// An outlined shape spanning a drag from `start` to `end`.
///
/// Previews and commits both rasterize through [`Shape::draw`], so what the
/// overlay shows is exactly what lands in the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub start: Pos2,
    pub end: Pos2,
    pub brush: Brush,
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        Rect::from_two_pos(self.start, self.end)
    }

    pub fn draw(&self, buffer: &mut PixelBuffer) -> Option<PixelRect> {
        let bbox = self.bounds();
        match self.kind {
            ShapeKind::Rectangle => buffer.draw_rectangle(bbox, self.brush, false),
            ShapeKind::Oval => buffer.draw_ellipse(bbox, self.brush, false),
            ShapeKind::Line => buffer.draw_line(self.start, self.end, self.brush, LineStyle::Solid),
            ShapeKind::Triangle => {
                let apex = pos2(bbox.center().x, bbox.min.y);
                buffer.draw_polygon(&[apex, bbox.right_bottom(), bbox.left_bottom()], self.brush, false)
            }
            ShapeKind::Diamond => {
                let c = bbox.center();
                let points = [
                    pos2(c.x, bbox.min.y),
                    pos2(bbox.max.x, c.y),
                    pos2(c.x, bbox.max.y),
                    pos2(bbox.min.x, c.y),
                ];
                buffer.draw_polygon(&points, self.brush, false)
            }
        }
    }
}
