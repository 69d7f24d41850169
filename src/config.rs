use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::DecodeLimits;
use crate::foundation::error::{CamagruError, CamagruResult};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "CAMAGRU_";

/// Settings for a [`crate::Compositor`].
///
/// Resolution order is defaults, then an optional JSON file, then `CAMAGRU_*` environment
/// variables.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    /// Directory composited images are written to.
    pub upload_dir: PathBuf,
    /// Prefix of the relative paths handed back to callers.
    pub public_prefix: String,
    /// Directory of pre-installed stickers.
    pub sticker_dir: PathBuf,
    /// URL prefix used in sticker listings.
    pub sticker_url_prefix: String,
    /// Largest accepted encoded image, in bytes.
    pub max_upload_bytes: u64,
    /// Largest accepted decoded image, in pixels.
    pub max_decoded_pixels: u64,
    /// Most overlays accepted in one call.
    pub max_layers: usize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads/images"),
            public_prefix: "uploads/images".to_string(),
            sticker_dir: PathBuf::from("uploads/stickers"),
            sticker_url_prefix: "/uploads/stickers".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_layers: 16,
        }
    }
}

impl CompositorConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> CamagruResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| CamagruError::validation(format!("parse config JSON: {e}")))?;
        Ok(cfg)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> CamagruResult<Self> {
        let mut cfg = Self::default();
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Apply `CAMAGRU_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CamagruResult<()> {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PUBLIC_PREFIX") {
            self.public_prefix = v;
        }
        if let Some(v) = get("STICKER_DIR") {
            self.sticker_dir = PathBuf::from(v);
        }
        if let Some(v) = get("STICKER_URL_PREFIX") {
            self.sticker_url_prefix = v;
        }
        if let Some(v) = get("MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_num("MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = get("MAX_DECODED_PIXELS") {
            self.max_decoded_pixels = parse_num("MAX_DECODED_PIXELS", &v)?;
        }
        if let Some(v) = get("MAX_LAYERS") {
            self.max_layers = parse_num("MAX_LAYERS", &v)?;
        }
        Ok(())
    }

    /// Check limits and paths.
    pub fn validate(&self) -> CamagruResult<()> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(CamagruError::validation("upload_dir must be non-empty"));
        }
        if self.sticker_dir.as_os_str().is_empty() {
            return Err(CamagruError::validation("sticker_dir must be non-empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(CamagruError::validation("max_upload_bytes must be > 0"));
        }
        if self.max_decoded_pixels == 0 {
            return Err(CamagruError::validation("max_decoded_pixels must be > 0"));
        }
        if self.max_layers == 0 {
            return Err(CamagruError::validation("max_layers must be > 0"));
        }
        Ok(())
    }

    /// Decode limits derived from this config.
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_bytes: self.max_upload_bytes,
            max_pixels: self.max_decoded_pixels,
        }
    }
}

fn parse_num<T: std::str::FromStr>(name: &str, v: &str) -> CamagruResult<T>
where
    T::Err: std::fmt::Display,
{
    v.parse::<T>().map_err(|e| {
        CamagruError::validation(format!("{ENV_PREFIX}{name}='{v}' is not a valid number: {e}"))
    })
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
