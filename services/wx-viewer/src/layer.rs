//! Seam to the external tile layer.
//!
//! Fetching, decoding and color-mapping tiles is done by the tile layer
//! library. The viewer only creates layers from [`LayerSettings`], drives them
//! through [`TileLayer`] and reads back times, styles, legends and probe data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use renderer::Legend;
use wx_common::style::UnitDefinitions;
use wx_common::{ColorStyle, ColorStyles, TileFormat, WxResult};

/// Where a layer takes its data from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(rename = "serverURI")]
    pub server_uri: String,

    #[serde(rename = "maskServerURI")]
    pub mask_server_uri: String,

    pub ext: TileFormat,

    pub dataset: String,

    /// One variable for scalar fields; eastward and northward components for vectors
    pub variables: Vec<String>,

    /// `<dataset>/<variable label>`, shown in the layer control and info panel
    pub name: String,

    /// Style id applied when the layer is created
    pub style_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    pub opacity: f64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

/// Everything needed to create a tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSettings {
    pub data_source: DataSource,
    #[serde(default)]
    pub options: LayerOptions,
    /// Unit conversions from `uconv.json`
    #[serde(default)]
    pub units: UnitDefinitions,
}

/// Requested layer time. The layer picks the closest time step it has.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeRequest {
    /// A time step string as listed by [`TileLayer::times`]
    Step(String),
    Instant(DateTime<Utc>),
}

/// A map position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Round to 6 decimals; trailing zeros are not printed.
fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6 + 0.0
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatLng({}, {})", round6(self.lat), round6(self.lng))
    }
}

/// Data value under a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeInfo {
    /// Fill color at the position
    pub hex_color: String,
    /// One value per layer variable, in style units
    pub in_style_units: Vec<f64>,
    pub style_units: String,
    /// One value per layer variable, in data units
    pub data: Vec<f64>,
    /// Pixel within the tile
    pub tile_point: (u32, u32),
}

/// Range of the data currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

/// A tile layer on the map.
#[async_trait]
pub trait TileLayer: Send + Sync {
    fn data_source(&self) -> &DataSource;

    /// Resolves once the layer's metadata is loaded. Must be awaited before
    /// any other call.
    async fn setup_complete(&mut self) -> WxResult<()>;

    /// Available time steps, in order.
    fn times(&self) -> Vec<String>;

    /// Current time step.
    fn time(&self) -> String;

    async fn set_time(&mut self, time: TimeRequest) -> WxResult<()>;

    /// Switch to coarser tiles while animating.
    fn set_time_animation_mode(&mut self, coarse_level: u32);

    async fn unset_time_animation_mode(&mut self);

    /// Apply a style from `styles`. The layer resolves inheritance itself.
    fn set_style(&mut self, style_id: &str, styles: &ColorStyles) -> WxResult<()>;

    /// The resolved style in effect.
    fn style(&self) -> ColorStyle;

    /// Legend data for a bar `width` pixels wide, if the layer has a palette.
    fn legend_data(&self, width: u32) -> Option<Legend>;

    fn info_at(&self, position: LatLng) -> Option<ProbeInfo>;

    fn min_max(&self) -> MinMax;

    /// Dataset instance the layer reads from.
    fn instance(&self) -> String;

    /// Units of the raw data.
    fn units(&self) -> String;
}

/// Creates tile layers.
pub trait LayerFactory: Send + Sync {
    fn create(&self, settings: LayerSettings) -> WxResult<Box<dyn TileLayer>>;
}
