use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the editing session.
///
/// Out-of-range pen widths are clamped rather than reported, and pointer
/// events that arrive in the wrong gesture state are ignored, so neither
/// has a variant here.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image codec could not decode or encode the data
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// A font needed for text rendering is unavailable
    #[error("Font unavailable ({path}): {reason}")]
    Font { path: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown variant {variant:?} for tool {tool}")]
    UnknownVariant { tool: &'static str, variant: String },

    #[error("Invalid color value: {0:?}")]
    InvalidColor(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EditorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
