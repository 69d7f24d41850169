use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};

use crate::{
    assets::source::{self, ImageSource},
    foundation::core::Dimensions,
    foundation::error::{CamagruError, CamagruResult},
};

/// Formats accepted for primary images and overlays.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Bounds applied while reading and decoding untrusted images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum encoded size in bytes (decoded base64 payload or file length).
    pub max_bytes: u64,
    /// Maximum `width * height` of the decoded image.
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            max_pixels: 40_000_000,
        }
    }
}

impl DecodeLimits {
    fn image_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_pixels.saturating_mul(4));
        limits
    }
}

/// Decoded bitmap owned by a single compositing call.
///
/// Pixels are premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    premul: RgbaImage,
}

impl RasterImage {
    /// Wrap any decoded image, converting to premultiplied RGBA8.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let mut rgba = img.into_rgba8();
        premultiply_rgba8_in_place(&mut rgba);
        Self { premul: rgba }
    }

    /// Wrap pixels that are already premultiplied.
    pub fn from_premultiplied(premul: RgbaImage) -> Self {
        Self { premul }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.premul.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.premul.height()
    }

    /// Pixel dimensions.
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = self.premul.dimensions();
        Dimensions::new(width, height)
    }

    /// Borrow the premultiplied pixels.
    pub fn premultiplied(&self) -> &RgbaImage {
        &self.premul
    }

    /// Mutably borrow the premultiplied pixels.
    pub fn premultiplied_mut(&mut self) -> &mut RgbaImage {
        &mut self.premul
    }

    /// Convert back to straight (non-premultiplied) RGBA8.
    pub fn into_straight_rgba(self) -> RgbaImage {
        let mut rgba = self.premul;
        unpremultiply_rgba8_in_place(&mut rgba);
        rgba
    }
}

/// Decode encoded bytes. With `format` set the bytes are decoded as that format, otherwise the
/// format is guessed from the content. Either way it must be one of [`SUPPORTED_FORMATS`].
pub fn decode_image(
    bytes: &[u8],
    format: Option<ImageFormat>,
    limits: &DecodeLimits,
) -> CamagruResult<RasterImage> {
    if bytes.len() as u64 > limits.max_bytes {
        return Err(CamagruError::decode(format!(
            "image is {} bytes (limit {})",
            bytes.len(),
            limits.max_bytes
        )));
    }

    let mut reader = ImageReader::new(Cursor::new(bytes));
    match format {
        Some(fmt) => reader.set_format(fmt),
        None => {
            reader = reader
                .with_guessed_format()
                .map_err(|e| CamagruError::decode(format!("probe image format: {e}")))?;
        }
    }

    decode_with_reader(reader, limits)
}

/// Read and decode an image file, probing its format from content.
pub fn load_image_file(path: &Path, limits: &DecodeLimits) -> CamagruResult<RasterImage> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("stat image '{}'", path.display()))
        .map_err(decode_err)?;
    if !meta.is_file() {
        return Err(CamagruError::decode(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }
    if meta.len() > limits.max_bytes {
        return Err(CamagruError::decode(format!(
            "'{}' is {} bytes (limit {})",
            path.display(),
            meta.len(),
            limits.max_bytes
        )));
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))
        .map_err(decode_err)?;
    decode_image(&bytes, None, limits)
}

/// Decode a data-URI or load a path, whichever `input` is.
pub fn load_source(input: &str, limits: &DecodeLimits) -> CamagruResult<RasterImage> {
    match ImageSource::parse(input) {
        ImageSource::DataUri { subtype, payload } => {
            let format = source::format_for_subtype(subtype)?;
            let bytes = source::decode_base64_payload(payload, limits.max_bytes)?;
            decode_image(&bytes, Some(format), limits)
        }
        ImageSource::Path(path) => load_image_file(path, limits),
    }
}

fn decode_with_reader(
    mut reader: ImageReader<Cursor<&[u8]>>,
    limits: &DecodeLimits,
) -> CamagruResult<RasterImage> {
    let format = reader
        .format()
        .ok_or_else(|| CamagruError::decode("unrecognized image format"))?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(CamagruError::decode(format!(
            "unsupported image format {format:?}"
        )));
    }

    reader.limits(limits.image_limits());
    let img = reader
        .decode()
        .with_context(|| format!("decode {format:?} image"))
        .map_err(decode_err)?;

    let dims = Dimensions::new(img.width(), img.height());
    if dims.pixel_count() == 0 {
        return Err(CamagruError::decode("image has zero area"));
    }
    if dims.pixel_count() > limits.max_pixels {
        return Err(CamagruError::decode(format!(
            "image is {}x{} (limit {} pixels)",
            dims.width, dims.height, limits.max_pixels
        )));
    }

    Ok(RasterImage::from_dynamic(img))
}

fn decode_err(e: anyhow::Error) -> CamagruError {
    CamagruError::decode(format!("{e:#}"))
}

/// Scale color channels by alpha, rounding to nearest.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`]; fully transparent pixels become zero.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
