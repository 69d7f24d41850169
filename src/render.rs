/// Premultiplied blending and overlay placement onto a canvas.
pub mod composite;
