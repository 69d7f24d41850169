use image::imageops::{self, FilterType};

use crate::{
    assets::decode::RasterImage,
    foundation::core::{Dimensions, Placement, ResolvedPlacement},
    foundation::error::{CamagruError, CamagruResult},
};

/// Filter used when scaling overlays. Bilinear: smooth edges without Lanczos ringing.
pub const OVERLAY_FILTER: FilterType = FilterType::Triangle;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        out[i] = add_sat_u8(src[i], mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Resample an overlay to `size`. Returns the input untouched when no scaling is needed.
pub fn resample_overlay(overlay: RasterImage, size: Dimensions) -> RasterImage {
    if overlay.dimensions() == size {
        return overlay;
    }
    let resized = imageops::resize(
        overlay.premultiplied(),
        size.width,
        size.height,
        OVERLAY_FILTER,
    );
    RasterImage::from_premultiplied(resized)
}

/// Blend an already-scaled overlay onto `canvas` at `placement`, clipping to the canvas.
///
/// Returns the number of canvas pixels covered.
pub fn draw_over(
    canvas: &mut RasterImage,
    overlay: &RasterImage,
    placement: ResolvedPlacement,
) -> u64 {
    debug_assert_eq!(overlay.dimensions(), placement.size());

    let Some(region) = placement.clip_to(canvas.dimensions()) else {
        return 0;
    };

    let src = overlay.premultiplied();
    let dst = canvas.premultiplied_mut();
    for row in 0..region.height {
        for col in 0..region.width {
            let s = src.get_pixel(region.src_x + col, region.src_y + row).0;
            let d = dst.get_pixel_mut(region.dst_x + col, region.dst_y + row);
            d.0 = over(d.0, s);
        }
    }
    u64::from(region.width) * u64::from(region.height)
}

/// Resolve `placement`, scale the overlay, and blend it onto `canvas`.
///
/// The canvas never changes size; any part of the overlay past its edges is dropped. An
/// overlay entirely off the canvas is never resampled. One whose scaled area exceeds
/// `max_scaled_pixels` is rejected before resampling.
pub fn composite_overlay(
    canvas: &mut RasterImage,
    overlay: RasterImage,
    placement: &Placement,
    max_scaled_pixels: u64,
) -> CamagruResult<u64> {
    let resolved = placement.resolve(canvas.dimensions(), overlay.dimensions())?;
    if resolved.clip_to(canvas.dimensions()).is_none() {
        return Ok(0);
    }

    let size = resolved.size();
    if size.pixel_count() > max_scaled_pixels {
        return Err(CamagruError::validation(format!(
            "scaled overlay is {}x{} (limit {max_scaled_pixels} pixels)",
            size.width, size.height
        )));
    }

    let scaled = resample_overlay(overlay, size);
    Ok(draw_over(canvas, &scaled, resolved))
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
