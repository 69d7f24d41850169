//! Camagru's server-side sticker compositor.
//!
//! Publishing a post turns an uploaded or webcam photo plus optional stickers into one
//! flattened PNG on disk:
//!
//! 1. **Decode**: data-URI or file path -> [`RasterImage`] (JPEG, PNG, GIF, WebP)
//! 2. **Overlay**: resolve each sticker (catalog id, data-URI, or path), scale it with a
//!    bilinear filter and blend it source-over at its [`Placement`], clipped to the photo
//! 3. **Encode**: PNG at maximum compression, fully in memory
//! 4. **Persist**: `image_<user>_<millis>_<uuid>.png` via a temp file and a no-clobber link
//!
//! Only the primary image is mandatory. A sticker that fails to load is skipped and the
//! photo is published without it.
//!
//! ```no_run
//! use camagru::{Compositor, CompositorConfig, Placement};
//!
//! let compositor = Compositor::new(&CompositorConfig::default())?;
//! let stored = compositor.composite(
//!     "42",
//!     "data:image/png;base64,iVBORw0KGgo...",
//!     Some("0_cat_ears.png"),
//!     Some(Placement::at(150.0, 150.0, 1.0)),
//! )?;
//! println!("{}", stored.rel_path);
//! # Ok::<(), camagru::CamagruError>(())
//! ```
#![forbid(unsafe_code)]

mod assets;
mod compositor;
mod config;
mod encode;
mod foundation;
mod render;
mod storage;

pub use assets::decode::{
    DecodeLimits, RasterImage, SUPPORTED_FORMATS, decode_image, load_image_file, load_source,
};
pub use assets::source::{ImageSource, decode_base64_payload, format_for_subtype};
pub use assets::stickers::{StickerCatalog, StickerInfo, display_name, normalize_rel_path};
pub use compositor::{Compositor, OverlayLayer};
pub use config::{CompositorConfig, ENV_PREFIX};
pub use encode::png::encode_png;
pub use foundation::core::{ClippedRegion, Dimensions, Placement, ResolvedPlacement};
pub use foundation::error::{CamagruError, CamagruResult, ErrorKind};
pub use render::composite::{
    OVERLAY_FILTER, PremulRgba8, composite_overlay, draw_over, over, resample_overlay,
};
pub use storage::store::{ImageStore, StoredImage};
