use crate::foundation::error::{CamagruError, CamagruResult};

/// Largest side, in pixels, an overlay may be resampled to.
pub const MAX_SCALED_SIDE: u32 = 16_384;

/// Pixel dimensions of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Construct from width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Where and how large an overlay is drawn, in the primary image's pixel space.
///
/// Every field is optional: a missing `scale` means `1.0`, a missing `x`/`y` centers the
/// scaled overlay on that axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Placement {
    /// Left edge of the overlay (origin top-left). Truncated toward zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top edge of the overlay (origin top-left). Truncated toward zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Uniform multiplier on the overlay's native size; must be finite and > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl Placement {
    /// Explicit position and scale.
    pub fn at(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            scale: Some(scale),
        }
    }

    /// Centered at the given scale.
    pub fn centered(scale: f64) -> Self {
        Self {
            x: None,
            y: None,
            scale: Some(scale),
        }
    }

    /// Effective scale, defaulting to `1.0`.
    pub fn scale_or_default(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }

    /// Resolve against concrete canvas and overlay dimensions.
    pub fn resolve(
        &self,
        canvas: Dimensions,
        overlay: Dimensions,
    ) -> CamagruResult<ResolvedPlacement> {
        let scale = self.scale_or_default();
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CamagruError::validation(format!(
                "placement scale must be finite and > 0 (got {scale})"
            )));
        }

        let scaled_w = f64::from(overlay.width) * scale;
        let scaled_h = f64::from(overlay.height) * scale;
        let width = scaled_side(scaled_w)?;
        let height = scaled_side(scaled_h)?;

        let x = match self.x {
            Some(v) => finite_coord("x", v)?,
            None => ((f64::from(canvas.width) - scaled_w) / 2.0).trunc() as i64,
        };
        let y = match self.y {
            Some(v) => finite_coord("y", v)?,
            None => ((f64::from(canvas.height) - scaled_h) / 2.0).trunc() as i64,
        };

        Ok(ResolvedPlacement {
            x,
            y,
            width,
            height,
        })
    }
}

fn scaled_side(v: f64) -> CamagruResult<u32> {
    let side = v.round().max(1.0);
    if side > f64::from(MAX_SCALED_SIDE) {
        return Err(CamagruError::validation(format!(
            "scaled overlay side {side} exceeds {MAX_SCALED_SIDE}px"
        )));
    }
    Ok(side as u32)
}

fn finite_coord(axis: &str, v: f64) -> CamagruResult<i64> {
    if !v.is_finite() {
        return Err(CamagruError::validation(format!(
            "placement {axis} must be finite (got {v})"
        )));
    }
    Ok(v.trunc() as i64)
}

/// Integer destination rectangle of a scaled overlay. `x`/`y` may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPlacement {
    /// Destination left edge.
    pub x: i64,
    /// Destination top edge.
    pub y: i64,
    /// Scaled overlay width.
    pub width: u32,
    /// Scaled overlay height.
    pub height: u32,
}

impl ResolvedPlacement {
    /// Scaled overlay size.
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Intersect with a canvas. `None` when the overlay lies entirely outside it.
    pub fn clip_to(&self, canvas: Dimensions) -> Option<ClippedRegion> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self
            .x
            .saturating_add(i64::from(self.width))
            .min(i64::from(canvas.width));
        let y1 = self
            .y
            .saturating_add(i64::from(self.height))
            .min(i64::from(canvas.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(ClippedRegion {
            dst_x: x0 as u32,
            dst_y: y0 as u32,
            src_x: (x0 - self.x) as u32,
            src_y: (y0 - self.y) as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Visible part of an overlay after clipping to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedRegion {
    /// Canvas column of the first visible overlay pixel.
    pub dst_x: u32,
    /// Canvas row of the first visible overlay pixel.
    pub dst_y: u32,
    /// Overlay column of the first visible pixel.
    pub src_x: u32,
    /// Overlay row of the first visible pixel.
    pub src_y: u32,
    /// Visible width.
    pub width: u32,
    /// Visible height.
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
