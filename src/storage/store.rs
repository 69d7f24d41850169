use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::Dimensions;
use crate::foundation::error::{CamagruError, CamagruResult};

const FILE_PREFIX: &str = "image_";
const FILE_EXT: &str = "png";

/// A composited image that has been written to the store.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StoredImage {
    /// Stable relative path to record against the post, e.g. `uploads/images/image_7_..png`.
    pub rel_path: String,
    /// Absolute (or base-dir relative) location on disk.
    pub abs_path: PathBuf,
    /// Pixel dimensions of the stored image.
    pub dimensions: Dimensions,
}

/// Output directory for composited images.
///
/// Names are `image_<user>_<unix millis>_<uuid>.png`; the UUID makes two writes in the same
/// millisecond for the same user distinct, and the final link refuses to overwrite.
#[derive(Clone, Debug)]
pub struct ImageStore {
    base_dir: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    /// Store writing into `base_dir`, reporting paths under `public_prefix`.
    pub fn new(base_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            public_prefix: public_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Directory images are written to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the output directory if needed.
    pub fn ensure_dir(&self) -> CamagruResult<()> {
        if self.base_dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            CamagruError::storage(format!(
                "create output dir '{}': {e}",
                self.base_dir.display()
            ))
        })?;
        if !self.base_dir.is_dir() {
            return Err(CamagruError::storage(format!(
                "'{}' is not a directory",
                self.base_dir.display()
            )));
        }
        Ok(())
    }

    /// Fresh file name for `user_id`.
    pub fn unique_file_name(user_id: &str) -> String {
        format!(
            "{FILE_PREFIX}{}_{}_{}.{FILE_EXT}",
            sanitize_user_id(user_id),
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        )
    }

    /// Write encoded PNG bytes under a unique name.
    ///
    /// Bytes go to a temporary file in the output directory first and are then linked into
    /// place; the temporary file is removed on every failure path.
    pub fn persist(
        &self,
        user_id: &str,
        png: &[u8],
        dimensions: Dimensions,
    ) -> CamagruResult<StoredImage> {
        self.ensure_dir()?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".camagru-")
            .suffix(".tmp")
            .tempfile_in(&self.base_dir)
            .with_context(|| format!("create temp file in '{}'", self.base_dir.display()))
            .map_err(encode_err)?;
        tmp.write_all(png)
            .and_then(|()| tmp.as_file().sync_all())
            .context("write png bytes")
            .map_err(encode_err)?;

        let name = Self::unique_file_name(user_id);
        let abs_path = self.base_dir.join(&name);
        tmp.persist_noclobber(&abs_path)
            .map_err(|e| e.error)
            .with_context(|| format!("persist '{}'", abs_path.display()))
            .map_err(encode_err)?;

        tracing::debug!(path = %abs_path.display(), bytes = png.len(), "stored image");
        Ok(StoredImage {
            rel_path: self.rel_path_for(&name),
            abs_path,
            dimensions,
        })
    }

    /// Map a relative path produced by [`ImageStore::persist`] back to its file.
    pub fn resolve(&self, rel_path: &str) -> CamagruResult<PathBuf> {
        let rel = rel_path.trim_start_matches('/');
        let name = if self.public_prefix.is_empty() {
            rel
        } else {
            rel.strip_prefix(self.public_prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| {
                    CamagruError::validation(format!(
                        "'{rel_path}' is not under '{}'",
                        self.public_prefix
                    ))
                })?
        };

        if !is_stored_file_name(name) {
            return Err(CamagruError::validation(format!(
                "'{rel_path}' does not name a stored image"
            )));
        }
        Ok(self.base_dir.join(name))
    }

    /// Delete a stored image. Returns `false` if it was already gone.
    pub fn remove(&self, rel_path: &str) -> CamagruResult<bool> {
        let path = self.resolve(rel_path)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove '{}'", path.display()))
                .into()),
        }
    }

    fn rel_path_for(&self, name: &str) -> String {
        if self.public_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.public_prefix)
        }
    }
}

fn sanitize_user_id(user_id: &str) -> String {
    let s: String = user_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if s.is_empty() { "anon".to_string() } else { s }
}

fn is_stored_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX)
        && name.ends_with(&format!(".{FILE_EXT}"))
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

fn encode_err(e: anyhow::Error) -> CamagruError {
    CamagruError::encode(format!("{e:#}"))
}

#[cfg(test)]
#[path = "../../tests/unit/storage/store.rs"]
mod tests;
