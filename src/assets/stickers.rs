use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{CamagruError, CamagruResult};

const STICKER_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
const THUMB_SUFFIX: &str = "_thumb";

/// One pre-installed overlay as presented to clients before composing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StickerInfo {
    /// File name; pass this back as the overlay identifier.
    pub id: String,
    /// Human readable name derived from the file stem.
    pub name: String,
    /// Public URL of the asset.
    pub url: String,
}

/// Read-only view over the directory of pre-installed stickers.
#[derive(Clone, Debug)]
pub struct StickerCatalog {
    dir: PathBuf,
    url_prefix: String,
}

impl StickerCatalog {
    /// Catalog rooted at `dir`; listing URLs are `<url_prefix>/<id>`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Sticker directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All stickers sorted by file name. A missing directory lists as empty.
    pub fn list(&self) -> CamagruResult<Vec<StickerInfo>> {
        let mut names = self.file_names()?;
        names.sort();
        Ok(names
            .into_iter()
            .map(|id| StickerInfo {
                name: display_name(&id),
                url: format!("{}/{}", self.url_prefix, id),
                id,
            })
            .collect())
    }

    /// Path of the sticker called `id`: a plain file name that [`StickerCatalog::list`] would
    /// report and that exists in the directory.
    pub fn resolve(&self, id: &str) -> Option<PathBuf> {
        let norm = normalize_rel_path(id).ok()?;
        if norm.contains('/') || !is_sticker_file_name(&norm) {
            return None;
        }
        let path = self.dir.join(&norm);
        path.is_file().then_some(path)
    }

    /// Path of the `index`-th sticker in listing order.
    pub fn by_index(&self, index: usize) -> CamagruResult<Option<PathBuf>> {
        let mut names = self.file_names()?;
        names.sort();
        Ok(names.get(index).map(|id| self.dir.join(id)))
    }

    fn file_names(&self) -> CamagruResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("list stickers in '{}'", self.dir.display()))
                    .into());
            }
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("read entry in '{}'", self.dir.display()))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_sticker_file_name(&name) {
                out.push(name);
            }
        }
        Ok(out)
    }
}

/// Image extension and not a thumbnail.
pub fn is_sticker_file_name(name: &str) -> bool {
    let path = Path::new(name);
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    if !STICKER_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    !stem.is_empty() && !stem.to_ascii_lowercase().ends_with(THUMB_SUFFIX)
}

/// `0_cat_ears.png` -> `Cat Ears`.
pub fn display_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let stem = match stem.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty()
                && !rest.is_empty()
                && prefix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    };

    stem.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a relative asset path: backslashes become `/`, `.` segments are dropped, and
/// absolute paths, empty paths and `..` are refused.
pub fn normalize_rel_path(source: &str) -> CamagruResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || s.contains(':') {
        return Err(CamagruError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CamagruError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CamagruError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CamagruError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/stickers.rs"]
mod tests;
