use std::path::Path;
use std::time::Duration;

use image::ImageFormat;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::Result;
use crate::file_handler;
use crate::flood_fill::FloodFill;
use crate::gesture::{EditContext, GestureMachine};
use crate::input::InputEvent;
use crate::overlay::{CanvasOverlay, Overlay};
use crate::raster::PixelBuffer;
use crate::stroke::{self, Color};
use crate::text::FontCache;
use crate::tool::{Tool, ToolState};

/// One editing session: the document, the live overlay and the tool settings.
///
/// All methods run on the UI thread. A fill blocks until the whole region is
/// recolored, so the buffer is never observed half-filled.
pub struct Editor<O: Overlay = CanvasOverlay> {
    config: EditorConfig,
    tools: ToolState,
    document: Document,
    overlay: O,
    gestures: GestureMachine,
    fill: FloodFill,
    fonts: FontCache,
}

impl Editor<CanvasOverlay> {
    pub fn new(config: EditorConfig) -> Result<Self> {
        Self::with_overlay(config, CanvasOverlay::new)
    }
}

impl<O: Overlay> Editor<O> {
    /// Create a session whose overlay is built from the fresh buffer
    pub fn with_overlay(config: EditorConfig, make_overlay: impl FnOnce(&PixelBuffer) -> O) -> Result<Self> {
        config.validate()?;
        let tools = ToolState::from_config(&config)?;
        let document = Document::new(config.canvas_width, config.canvas_height, tools.background());
        let overlay = make_overlay(document.buffer());
        log::info!("Canvas created: {}x{}", config.canvas_width, config.canvas_height);

        Ok(Self {
            config,
            tools,
            document,
            overlay,
            gestures: GestureMachine::new(),
            fill: FloodFill::new(),
            fonts: FontCache::new(),
        })
    }

    fn context(&mut self) -> (&mut GestureMachine, EditContext<'_>) {
        let ctx = EditContext {
            tools: &self.tools,
            document: &mut self.document,
            overlay: &mut self.overlay,
            fill: &mut self.fill,
            fonts: &mut self.fonts,
            slow_fill_warning: Duration::from_millis(self.config.slow_fill_warning_ms),
        };
        (&mut self.gestures, ctx)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn buffer(&self) -> &PixelBuffer {
        self.document.buffer()
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        let (gestures, mut ctx) = self.context();
        gestures.handle(event, &mut ctx)
    }

    /// Select a tool by name and optional variant. A drag in progress keeps its tool.
    pub fn set_tool(&mut self, name: &str, variant: Option<&str>) -> Result<Tool> {
        self.tools.set_tool(name, variant)
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tools.select(tool);
    }

    pub fn set_color(&mut self, color: Color) {
        self.tools.set_color(color);
    }

    /// Set the stroke color from a `#RRGGBB` string
    pub fn set_color_hex(&mut self, value: &str) -> Result<()> {
        self.tools.set_color(stroke::parse_color(value)?);
        Ok(())
    }

    /// Returns the width actually stored after clamping to [1, 50]
    pub fn set_pen_width(&mut self, requested: i64) -> u32 {
        self.tools.set_pen_width(requested)
    }

    pub fn text_anchor(&self) -> Option<egui::Pos2> {
        self.gestures.text_anchor()
    }

    pub fn confirm_text(&mut self, text: &str) -> Result<bool> {
        let (gestures, mut ctx) = self.context();
        gestures.confirm_text(text, &mut ctx)
    }

    pub fn cancel_text(&mut self) {
        self.gestures.cancel_text();
    }

    /// Repaint the overlay from the buffer and redraw unsaved annotations on top
    pub fn repaint(&mut self) -> Result<()> {
        let (_, mut ctx) = self.context();
        ctx.repaint_overlay()
    }

    /// Flatten text into the buffer and encode it. The overlay is repainted
    /// so the burned-in text becomes part of its bitmap.
    pub fn request_save(&mut self, format: ImageFormat) -> Result<Vec<u8>> {
        file_handler::flatten(&mut self.document, &mut self.fonts)?;
        self.repaint()?;
        let bytes = file_handler::encode(self.document.buffer().image(), format)?;
        log::info!("Encoded canvas as {:?} ({} bytes)", format, bytes.len());
        Ok(bytes)
    }

    /// Save to `path`, picking the format from its extension
    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        let bytes = self.request_save(file_handler::format_for_path(path))?;
        file_handler::write_file(path, &bytes)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    /// Paste an encoded image at the top-left corner. Text annotations in
    /// the file are plain pixels by now and do not come back as annotations.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        let image = file_handler::decode(bytes)?;
        if image.dimensions() != (self.buffer().width(), self.buffer().height()) {
            log::info!(
                "Pasting {}x{} image onto {}x{} canvas",
                image.width(),
                image.height(),
                self.buffer().width(),
                self.buffer().height()
            );
        }
        self.document.buffer_mut().paste_image(&image, (0, 0));
        self.repaint()
    }

    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let bytes = file_handler::read_file(path)?;
        self.load_image(&bytes)?;
        log::info!("Opened {}", path.display());
        Ok(())
    }
}
