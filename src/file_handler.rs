use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::text::{self, FontCache};

/// Format implied by the save path's extension; PNG when there is none we know
pub fn format_for_path(path: &Path) -> ImageFormat {
    match ImageFormat::from_path(path) {
        Ok(format) if format.writing_enabled() => format,
        _ => {
            log::debug!("No writable format for {}; saving as PNG", path.display());
            ImageFormat::Png
        }
    }
}

/// Check if a file looks like a raster image we can open, based on its extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp"))
}

/// Burn every annotation not yet in the buffer into it, in placement order
pub fn flatten(document: &mut Document, fonts: &mut FontCache) -> Result<()> {
    let pending = document.pending_annotations().to_vec();
    for annotation in &pending {
        let font = fonts.resolve(&annotation.font)?;
        text::render_into(document.buffer_mut(), &font, annotation);
    }
    if !pending.is_empty() {
        log::debug!("Flattened {} text annotation(s) into the buffer", pending.len());
    }
    document.mark_flattened();
    Ok(())
}

/// Encode the buffer as-is
pub fn encode(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut bytes, format)?;
    Ok(bytes.into_inner())
}

/// Decode any supported raster format into 8-bit RGB
pub fn decode(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    log::debug!("Decoded image: {}x{}", image.width(), image.height());
    Ok(image.to_rgb8())
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| EditorError::io(path, err))
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|err| EditorError::io(path, err))
}
