/// Bitmap decoding with size limits and premultiplication.
pub mod decode;
/// Data-URI recognition and base64 payload decoding.
pub mod source;
/// Pre-installed sticker directory.
pub mod stickers;
