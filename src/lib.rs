// MIT/Apache2 License

//! Drawing primitives for 2D rendering contexts, plus a cache that loads each image source once and replays
//! draws that were requested before the image was ready.

mod error;

pub mod canvas;
pub mod color;
pub mod context;
pub mod image;
pub mod intensity;
pub mod raster;
pub mod shape;

mod path;

#[cfg(test)]
mod testing;

pub use canvas::*;
pub use color::*;
pub use context::*;
pub use error::*;
pub use image::*;
pub use intensity::*;
pub use raster::*;
pub use shape::*;
