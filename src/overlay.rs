use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage, RgbImage};
use uuid::Uuid;

use crate::raster::{PixelBuffer, PixelRect};
use crate::shape::Shape;
use crate::text::{self, TextAnnotation};

/// Handle to a transient preview item living on an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewHandle(usize);

// Shared by every overlay so handles never collide across sessions
static NEXT_PREVIEW: AtomicUsize = AtomicUsize::new(1);

impl PreviewHandle {
    fn next() -> Self {
        PreviewHandle(NEXT_PREVIEW.fetch_add(1, Ordering::Relaxed))
    }
}

/// The live surface shown to the user.
///
/// It mirrors the raster buffer, carries a text layer above it and may
/// hold shape previews that are not (yet) part of the buffer.
pub trait Overlay {
    fn create_preview(&mut self, shape: Shape) -> PreviewHandle;

    /// Returns false if `handle` no longer exists
    fn replace_preview(&mut self, handle: PreviewHandle, shape: Shape) -> bool;

    /// Remove a preview, handing back the geometry it displayed
    fn delete_preview(&mut self, handle: PreviewHandle) -> Option<Shape>;

    fn preview(&self, handle: PreviewHandle) -> Option<&Shape>;

    /// Copy part of the buffer into the overlay's bitmap
    fn sync_region(&mut self, buffer: &PixelBuffer, region: PixelRect);

    /// Replace the bitmap wholesale. The text layer is dropped and has to be redrawn.
    fn repaint(&mut self, buffer: &PixelBuffer);

    /// Draw text above everything drawn so far on the text layer
    fn draw_text(&mut self, font: &FontArc, annotation: &TextAnnotation);
}

/// In-memory overlay: a bitmap copy of the buffer, a straight-alpha text
/// layer and the live previews, flattened on demand by [`CanvasOverlay::composite`].
pub struct CanvasOverlay {
    bitmap: RgbImage,
    text_layer: RgbaImage,
    text_order: Vec<Uuid>,
    previews: BTreeMap<PreviewHandle, Shape>,
    dirty: bool,
}

impl CanvasOverlay {
    pub fn new(buffer: &PixelBuffer) -> Self {
        Self {
            bitmap: buffer.image().clone(),
            text_layer: RgbaImage::new(buffer.width(), buffer.height()),
            text_order: Vec::new(),
            previews: BTreeMap::new(),
            dirty: true,
        }
    }

    pub fn bitmap(&self) -> &RgbImage {
        &self.bitmap
    }

    /// Ids of the annotations on the text layer, bottom first
    pub fn text_order(&self) -> &[Uuid] {
        &self.text_order
    }

    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }

    /// Whether anything changed since the last call; resets the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// What the user sees: bitmap, then text, then previews in creation order
    pub fn composite(&self) -> RgbImage {
        let mut image = self.bitmap.clone();
        for (dst, src) in image.pixels_mut().zip(self.text_layer.pixels()) {
            let alpha = src.0[3] as f32 / 255.0;
            if alpha == 0.0 {
                continue;
            }
            for c in 0..3 {
                let mixed = dst.0[c] as f32 + (src.0[c] as f32 - dst.0[c] as f32) * alpha;
                dst.0[c] = mixed.round() as u8;
            }
        }

        if self.previews.is_empty() {
            return image;
        }
        let mut surface = PixelBuffer::from_image(image);
        for shape in self.previews.values() {
            shape.draw(&mut surface);
        }
        surface.into_image()
    }
}

/// Straight-alpha "over" of `color` at `coverage` onto a text-layer pixel
fn blend_over(dst: &mut Rgba<u8>, color: [u8; 3], coverage: f32) {
    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = coverage + dst_alpha * (1.0 - coverage);
    if out_alpha <= 0.0 {
        return;
    }
    for c in 0..3 {
        let value = (color[c] as f32 * coverage + dst.0[c] as f32 * dst_alpha * (1.0 - coverage)) / out_alpha;
        dst.0[c] = value.round() as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round() as u8;
}

impl Overlay for CanvasOverlay {
    fn create_preview(&mut self, shape: Shape) -> PreviewHandle {
        let handle = PreviewHandle::next();
        self.previews.insert(handle, shape);
        self.dirty = true;
        handle
    }

    fn replace_preview(&mut self, handle: PreviewHandle, shape: Shape) -> bool {
        match self.previews.get_mut(&handle) {
            Some(existing) => {
                *existing = shape;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    fn delete_preview(&mut self, handle: PreviewHandle) -> Option<Shape> {
        let removed = self.previews.remove(&handle);
        self.dirty |= removed.is_some();
        removed
    }

    fn preview(&self, handle: PreviewHandle) -> Option<&Shape> {
        self.previews.get(&handle)
    }

    fn sync_region(&mut self, buffer: &PixelBuffer, region: PixelRect) {
        for y in region.min_y..=region.max_y {
            for x in region.min_x..=region.max_x {
                if let Some(color) = buffer.get_pixel(x, y) {
                    self.bitmap.put_pixel(x as u32, y as u32, color);
                }
            }
        }
        self.dirty = true;
    }

    fn repaint(&mut self, buffer: &PixelBuffer) {
        self.bitmap.clone_from(buffer.image());
        self.text_layer = RgbaImage::new(buffer.width(), buffer.height());
        self.text_order.clear();
        self.dirty = true;
    }

    fn draw_text(&mut self, font: &FontArc, annotation: &TextAnnotation) {
        let (width, height) = self.text_layer.dimensions();
        let layer = &mut self.text_layer;
        text::rasterize(font, annotation, |x, y, coverage| {
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                blend_over(layer.get_pixel_mut(x as u32, y as u32), annotation.color.0, coverage);
            }
        });
        self.text_order.push(annotation.id);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;
    use crate::stroke::{BLACK, Brush, WHITE};
    use egui::pos2;

    fn rect_shape(end: f32) -> Shape {
        Shape {
            kind: ShapeKind::Rectangle,
            start: pos2(1.0, 1.0),
            end: pos2(end, end),
            brush: Brush::new(BLACK, 1),
        }
    }

    #[test]
    fn test_preview_lifecycle() {
        let buffer = PixelBuffer::new(20, 20, WHITE);
        let mut overlay = CanvasOverlay::new(&buffer);

        let handle = overlay.create_preview(rect_shape(5.0));
        assert!(overlay.replace_preview(handle, rect_shape(8.0)));
        assert_eq!(overlay.preview(handle).map(|s| s.end), Some(pos2(8.0, 8.0)));

        let removed = overlay.delete_preview(handle).unwrap();
        assert_eq!(removed.end, pos2(8.0, 8.0));
        assert_eq!(overlay.preview_count(), 0);
        assert!(!overlay.replace_preview(handle, rect_shape(3.0)));
    }

    #[test]
    fn test_composite_draws_previews_without_touching_bitmap() {
        let buffer = PixelBuffer::new(20, 20, WHITE);
        let mut overlay = CanvasOverlay::new(&buffer);
        overlay.create_preview(rect_shape(10.0));

        assert_eq!(*overlay.composite().get_pixel(1, 1), BLACK);
        assert_eq!(*overlay.bitmap().get_pixel(1, 1), WHITE);
    }

    #[test]
    fn test_repaint_clears_text_layer() {
        let buffer = PixelBuffer::new(20, 20, WHITE);
        let mut overlay = CanvasOverlay::new(&buffer);
        overlay.text_order.push(Uuid::new_v4());
        overlay.text_layer.put_pixel(3, 3, Rgba([0, 0, 0, 255]));

        overlay.repaint(&buffer);
        assert!(overlay.text_order().is_empty());
        assert_eq!(*overlay.composite().get_pixel(3, 3), WHITE);
    }

    #[test]
    fn test_blend_over_later_color_wins_at_full_coverage() {
        let mut pixel = Rgba([0, 0, 0, 0]);
        blend_over(&mut pixel, [255, 0, 0], 1.0);
        blend_over(&mut pixel, [0, 0, 255], 1.0);
        assert_eq!(pixel, Rgba([0, 0, 255, 255]));
    }
}
