use image::ExtendedColorType;
use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::{
    assets::decode::RasterImage,
    foundation::error::{CamagruError, CamagruResult},
};

/// Encode the canvas as straight-alpha RGBA PNG at maximum compression.
///
/// Encoding happens entirely in memory so a failure never leaves a partial file behind.
pub fn encode_png(canvas: RasterImage) -> CamagruResult<Vec<u8>> {
    let rgba = canvas.into_straight_rgba();
    let (width, height) = rgba.dimensions();

    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| CamagruError::encode(format!("png {width}x{height}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
