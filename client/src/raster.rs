use std::io::Cursor;

use drawpilot_shared::encode_base64;

use crate::error::CanvasError;
use crate::state::{FilterKind, ImageFilter, NotificationKind, RasterImage, State};

/// Reads only the header to get pixel dimensions.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), CanvasError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| CanvasError::Decode(error.to_string()))?
        .into_dimensions()
        .map_err(|error| CanvasError::Decode(error.to_string()))
}

pub fn load_image(state: &mut State, mime: &str, bytes: &[u8]) -> Result<(), CanvasError> {
    if !mime.starts_with("image/") {
        state.notify(NotificationKind::Error, "Please upload an image file");
        return Err(CanvasError::NotAnImage(mime.to_string()));
    }
    let (width, height) = match decode_dimensions(bytes) {
        Ok(size) => size,
        Err(error) => {
            state.notify(NotificationKind::Error, "Could not read the image file");
            return Err(error);
        }
    };
    let raster = RasterImage {
        src: format!("data:{mime};base64,{}", encode_base64(bytes)),
        width,
        height,
    };
    log::info!("Loaded {mime} image {width}x{height}");
    state.image.original = Some(raster.clone());
    state.image.image = Some(raster);
    state.image.filter = ImageFilter::default();
    state.ui.upload_dialog_open = false;
    state.notify(NotificationKind::Success, "Image uploaded successfully");
    Ok(())
}

/// Only records the value; the surface applies it when painting.
pub fn change_filter(state: &mut State, kind: FilterKind, value: f64) {
    if !value.is_finite() {
        return;
    }
    let filter = &mut state.image.filter;
    match kind {
        FilterKind::Brightness => filter.brightness = value,
        FilterKind::Contrast => filter.contrast = value,
        FilterKind::Saturation => filter.saturation = value,
        FilterKind::Blur => filter.blur = value.max(0.0),
    }
}

pub fn reset_image(state: &mut State) {
    if let Some(original) = state.image.original.clone() {
        state.image.image = Some(original);
    }
    state.image.filter = ImageFilter::default();
}

/// Swaps in an edited raster; the original upload stays available for reset.
pub fn replace_image(state: &mut State, raster: RasterImage) {
    if state.image.original.is_none() {
        state.image.original = Some(raster.clone());
    }
    state.image.image = Some(raster);
}
