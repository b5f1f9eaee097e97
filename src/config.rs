use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::stroke::DashPattern;
use crate::text::FontSpec;

/// Startup settings for the editor, read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Canvas color, also used by the eraser
    pub background: String,
    /// Initial stroke color
    pub color: String,
    pub pen_width: u32,
    pub eraser_width: u32,
    /// Dash runs of the wavy pencil
    pub dash_pattern: DashPattern,
    pub font: FontSpec,
    /// Quick-pick colors shown in the toolbar
    pub palette: Vec<String>,
    /// Fills slower than this are logged as warnings
    pub slow_fill_warning_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1024,
            canvas_height: 768,
            background: "#FFFFFF".to_owned(),
            color: "#000000".to_owned(),
            pen_width: 5,
            eraser_width: 20,
            dash_pattern: DashPattern::default(),
            font: FontSpec::default(),
            palette: [
                "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#800000", "#808000", "#008080",
                "#808080",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            slow_fill_warning_ms: 250,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|err| EditorError::io(path, err))?;
        let config: Self =
            serde_json::from_str(&json).map_err(|err| EditorError::Config(format!("{}: {}", path.display(), err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no canvas can be built from
    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(EditorError::Config(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }

    /// Load `path` if given, otherwise (or on failure) use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }
}
