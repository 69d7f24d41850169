/// Unique, atomic persistence of composited images.
pub mod store;
