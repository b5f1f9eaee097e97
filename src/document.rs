use crate::raster::PixelBuffer;
use crate::stroke::Color;
use crate::text::TextAnnotation;

/// The image being edited: the raster buffer plus the text placed on top of it.
///
/// Annotations are append-only and kept in placement order. Those before
/// `flattened` have already been burned into the buffer by a save.
pub struct Document {
    buffer: PixelBuffer,
    annotations: Vec<TextAnnotation>,
    flattened: usize,
}

impl Document {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height, background),
            annotations: Vec::new(),
            flattened: 0,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn add_annotation(&mut self, annotation: TextAnnotation) {
        self.annotations.push(annotation);
    }

    pub fn annotations(&self) -> &[TextAnnotation] {
        &self.annotations
    }

    /// Annotations not yet burned into the buffer
    pub fn pending_annotations(&self) -> &[TextAnnotation] {
        &self.annotations[self.flattened..]
    }

    pub(crate) fn mark_flattened(&mut self) {
        self.flattened = self.annotations.len();
    }
}
