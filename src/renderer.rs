use eframe::egui::{self, Color32, ColorImage, TextureHandle, TextureOptions};

use crate::overlay::CanvasOverlay;

/// Uploads the overlay composite to the GPU and paints it onto the canvas
#[derive(Default)]
pub struct Renderer {
    texture: Option<TextureHandle>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-upload the canvas texture if the overlay changed since last frame
    pub fn update(&mut self, ctx: &egui::Context, overlay: &mut CanvasOverlay) {
        if !overlay.take_dirty() && self.texture.is_some() {
            return;
        }

        let composite = overlay.composite();
        let size = [composite.width() as usize, composite.height() as usize];
        let image = ColorImage::from_rgb(size, composite.as_raw());

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST)),
        }
    }

    /// Paint the canvas texture into `rect`
    pub fn render(&self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
    }
}
