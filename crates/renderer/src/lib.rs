//! Legend rendering for tile layer color scales.
//!
//! - `legend`: bar, overflow triangles, ticks and title
//! - `canvas`: packed raster buffer and the presented drawing surface
//! - `text`: bitmap and TrueType label fonts
//! - `png`: canvas export

pub mod canvas;
pub mod legend;
pub mod png;
pub mod text;

pub use canvas::{pack_rgba, unpack_rgba, LegendCanvas, PackedImage, OPAQUE_WHITE};
pub use legend::{rasterize, Legend, LegendLayout, LegendRenderer, Tick};
pub use text::LabelFont;
