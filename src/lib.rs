#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file_handler;
pub mod flood_fill;
pub mod gesture;
pub mod input;
pub mod overlay;
pub mod raster;
pub mod renderer;
pub mod shape;
pub mod stroke;
pub mod text;
pub mod tool;

pub use app::PaintApp;
pub use config::EditorConfig;
pub use document::Document;
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use flood_fill::FloodFill;
pub use gesture::{EditContext, GestureMachine, GestureState};
pub use input::{InputEvent, InputLocation};
pub use overlay::{CanvasOverlay, Overlay, PreviewHandle};
pub use raster::PixelBuffer;
pub use shape::{Shape, ShapeKind};
pub use stroke::{Brush, Color, LineStyle};
pub use text::TextAnnotation;
pub use tool::{PencilStyle, Tool, ToolKind, ToolState};
