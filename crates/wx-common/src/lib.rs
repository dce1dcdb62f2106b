//! Common types shared by the legend renderer and the viewer service.

pub mod config;
pub mod error;
pub mod json;
pub mod style;

pub use config::{AppConfig, BaseLayerOptions, LayerControlEntry, LayerControlKind, TileFormat};
pub use error::{WxError, WxResult};
pub use style::{ColorRef, ColorSchemes, ColorStyle, ColorStyles, Fill, Mask, VectorType};
