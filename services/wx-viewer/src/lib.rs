//! Viewer application core.
//!
//! The map widget and the tile layer itself live outside this crate. What is
//! here is the state the viewer keeps between events and the handlers that
//! move it along:
//!
//! - `app`: `AppState` and the event handlers
//! - `layer`: seam to the external tile layer
//! - `catalog`: data server client (datasets, instances, meta)
//! - `editor`: custom style form model
//! - `select`: option list with a selection, used by every selector
//! - `info`: probe text for the info panel and popups
//! - `animation`: time animation driver
//! - `props`: loading of the `props/` directory

pub mod animation;
pub mod app;
pub mod catalog;
pub mod editor;
pub mod info;
pub mod layer;
pub mod props;
pub mod select;

pub use animation::{run_animation, spawn_animation};
pub use app::{AppState, ControlEntry, PlayState, ViewerOptions, HOLD_MESSAGE, WRONG_STYLE_MESSAGE};
pub use catalog::{variable_options, DataServer, DatasetMeta, HttpDataServer};
pub use editor::{EditorChange, StyleEditor};
pub use layer::{
    DataSource, LatLng, LayerFactory, LayerOptions, LayerSettings, MinMax, ProbeInfo, TileLayer,
    TimeRequest,
};
pub use props::Props;
pub use select::{Select, SelectOption};
