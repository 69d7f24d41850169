/// Final PNG encoding of a composited canvas.
pub mod png;
