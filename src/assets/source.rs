use std::borrow::Cow;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;

use crate::foundation::error::{CamagruError, CamagruResult};

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Where an encoded image comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// `data:image/<subtype>;base64,<payload>`.
    DataUri {
        /// MIME subtype as declared, e.g. `png` or `jpeg`.
        subtype: &'a str,
        /// Base64 payload after the comma.
        payload: &'a str,
    },
    /// Anything that is not a well-formed image data-URI is treated as a filesystem path.
    Path(&'a Path),
}

impl<'a> ImageSource<'a> {
    /// Classify `input`. The subtype must be a non-empty run of `[A-Za-z0-9_]`.
    pub fn parse(input: &'a str) -> Self {
        let trimmed = input.trim();
        if let Some(rest) = trimmed.strip_prefix(DATA_URI_PREFIX)
            && let Some(marker) = rest.find(BASE64_MARKER)
        {
            let subtype = &rest[..marker];
            if !subtype.is_empty()
                && subtype
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                return Self::DataUri {
                    subtype,
                    payload: &rest[marker + BASE64_MARKER.len()..],
                };
            }
        }
        Self::Path(Path::new(input))
    }

    /// Whether `input` parses as a data-URI.
    pub fn is_data_uri(input: &str) -> bool {
        matches!(ImageSource::parse(input), ImageSource::DataUri { .. })
    }
}

/// Map a declared MIME subtype to a supported format.
pub fn format_for_subtype(subtype: &str) -> CamagruResult<ImageFormat> {
    match subtype.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" | "pjpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "gif" => Ok(ImageFormat::Gif),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(CamagruError::decode(format!(
            "unsupported image type 'image/{other}'"
        ))),
    }
}

/// Upper bound on the decoded length of a base64 payload.
pub fn estimate_decoded_len(payload: &str) -> u64 {
    let len = payload.len() as u64;
    len.div_ceil(4).saturating_mul(3)
}

/// Decode a base64 payload, refusing anything that would exceed `max_bytes` once decoded.
pub fn decode_base64_payload(payload: &str, max_bytes: u64) -> CamagruResult<Vec<u8>> {
    let payload: Cow<'_, str> = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(payload)
    };

    if payload.is_empty() {
        return Err(CamagruError::decode("empty base64 payload"));
    }

    let estimated = estimate_decoded_len(&payload);
    if estimated > max_bytes {
        return Err(CamagruError::decode(format!(
            "payload too large: ~{estimated} bytes (limit {max_bytes})"
        )));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| CamagruError::decode(format!("invalid base64 payload: {e}")))?;

    if bytes.len() as u64 > max_bytes {
        return Err(CamagruError::decode(format!(
            "payload too large: {} bytes (limit {max_bytes})",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
