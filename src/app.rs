use eframe::egui::{self, Color32};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::Result;
use crate::input::InputHandler;
use crate::renderer::Renderer;
use crate::shape::ShapeKind;
use crate::stroke::{self, Color};
use crate::tool::{PencilStyle, Tool, ToolKind};

fn to_color32(color: Color) -> Color32 {
    let [r, g, b] = color.0;
    Color32::from_rgb(r, g, b)
}

fn from_color32(color: Color32) -> Color {
    image::Rgb([color.r(), color.g(), color.b()])
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Toolbar, canvas and dialogs around an [`Editor`]
pub struct PaintApp {
    editor: Editor,
    renderer: Renderer,
    input: InputHandler,
    palette: Vec<Color>,
    // Widget-side copies of tool settings
    picked_color: Color32,
    pen_width: u32,
    // Inline text entry
    text_draft: String,
    focus_text: bool,
    // Last failure shown to the user
    status: Option<String>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Result<Self> {
        let palette = config
            .palette
            .iter()
            .filter_map(|value| match stroke::parse_color(value) {
                Ok(color) => Some(color),
                Err(err) => {
                    log::warn!("Skipping palette entry: {err}");
                    None
                }
            })
            .collect();
        let editor = Editor::new(config)?;

        Ok(Self {
            picked_color: to_color32(editor.tools().color()),
            pen_width: editor.tools().pen_width(),
            editor,
            renderer: Renderer::new(),
            input: InputHandler::new(egui::Rect::NOTHING),
            palette,
            text_draft: String::new(),
            focus_text: false,
            status: None,
        })
    }

    /// Surface a failed operation without interrupting the session
    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {}
            Err(err) => {
                log::error!("{err}");
                self.status = Some(err.to_string());
            }
        }
    }

    fn set_color(&mut self, color: Color) {
        self.editor.set_color(color);
        self.picked_color = to_color32(color);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let active = self.editor.tools().active_tool();

        ui.horizontal(|ui| {
            ui.menu_button("Pencil Styles", |ui| {
                for style in PencilStyle::ALL {
                    let selected = active == Tool::Pencil(style);
                    if ui.radio(selected, capitalize(style.name())).clicked() {
                        self.editor.select_tool(Tool::Pencil(style));
                        ui.close_menu();
                    }
                }
            });

            if ui.add(egui::Slider::new(&mut self.pen_width, 1..=50)).changed() {
                self.pen_width = self.editor.set_pen_width(self.pen_width as i64);
            }

            if ui.selectable_label(active == Tool::Eraser, "Eraser").clicked() {
                self.editor.select_tool(Tool::Eraser);
            }

            ui.menu_button("Shapes", |ui| {
                for kind in ShapeKind::ALL {
                    let selected = active == Tool::Shape(kind);
                    if ui.radio(selected, capitalize(kind.name())).clicked() {
                        self.editor.select_tool(Tool::Shape(kind));
                        ui.close_menu();
                    }
                }
            });

            if ui.selectable_label(active == Tool::Fill, "Fill").clicked() {
                self.editor.select_tool(Tool::Fill);
            }
            if ui.selectable_label(active == Tool::Text, "Text").clicked() {
                self.editor.select_tool(Tool::Text);
            }

            ui.separator();

            if egui::color_picker::color_edit_button_srgba(ui, &mut self.picked_color, egui::color_picker::Alpha::Opaque)
                .changed()
            {
                self.editor.set_color(from_color32(self.picked_color));
            }

            for color in self.palette.clone() {
                let swatch = egui::Button::new("").fill(to_color32(color)).min_size(egui::vec2(18.0, 18.0));
                if ui.add(swatch).on_hover_text(stroke::format_color(color)).clicked() {
                    self.set_color(color);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save").clicked() {
                    self.save_dialog();
                }
                if ui.button("Open").clicked() {
                    self.open_dialog();
                }
            });
        });
    }

    fn save_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG files", &["png"])
            .add_filter("All files", &["*"])
            .set_file_name("untitled.png")
            .save_file()
        else {
            return;
        };
        let result = self.editor.save_to_path(&path);
        self.report(result);
    }

    fn open_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image files", &["png", "jpg", "jpeg", "bmp"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };
        if !crate::file_handler::is_image_file(&path) {
            log::warn!("Opening file without an image extension: {}", path.display());
        }
        let result = self.editor.open_path(&path);
        self.report(result);
    }

    /// Paint the canvas; also reports whether the pointer is on it and not
    /// covered by a popup or menu
    fn canvas(&mut self, ui: &mut egui::Ui) -> (egui::Rect, bool) {
        let size = egui::vec2(self.editor.buffer().width() as f32, self.editor.buffer().height() as f32);
        egui::ScrollArea::both()
            .show(ui, |ui| {
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
                self.renderer.render(ui.painter(), rect);
                (rect, response.hovered())
            })
            .inner
    }

    fn text_entry(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let Some(anchor) = self.editor.text_anchor() else {
            self.text_draft.clear();
            self.focus_text = true;
            return;
        };

        let mut confirm = false;
        let mut cancel = false;
        egui::Area::new(egui::Id::new("text_entry"))
            .order(egui::Order::Foreground)
            .fixed_pos(canvas_rect.min + anchor.to_vec2())
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let response = ui.text_edit_singleline(&mut self.text_draft);
                        if std::mem::take(&mut self.focus_text) {
                            response.request_focus();
                        }
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            confirm = true;
                        }
                        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            cancel = true;
                        }
                        confirm |= ui.button("OK").clicked();
                        cancel |= ui.button("Cancel").clicked();
                    });
                });
            });

        if confirm {
            let text = std::mem::take(&mut self.text_draft);
            let result = self.editor.confirm_text(&text).map(|_| ());
            self.report(result);
        } else if cancel {
            self.editor.cancel_text();
        }
    }
}

impl eframe::App for PaintApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.renderer.update(ctx, self.editor.overlay_mut());

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        if let Some(message) = self.status.clone() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(Color32::RED, message);
                    if ui.button("Dismiss").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        let (canvas_rect, canvas_hovered) = egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui)).inner;
        self.input.set_canvas_rect(canvas_rect);

        let events = self.input.process_input(ctx, !canvas_hovered);
        for event in events {
            let result = self.editor.handle_input(event);
            self.report(result);
        }

        if self.editor.tools().kind() == ToolKind::Text || self.editor.text_anchor().is_some() {
            self.text_entry(ctx, canvas_rect);
        }

        self.renderer.update(ctx, self.editor.overlay_mut());
    }
}
