//! Viewer application configuration (`props/config.json`).

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{WxError, WxResult};

/// First `/data` path segment of a data server URI, any case.
static DATA_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"/data/?")
        .case_insensitive(true)
        .build()
        .expect("data segment pattern is valid")
});

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URI of the tile data server
    pub data_server: String,

    /// Tile image format served by the data server
    #[serde(default)]
    pub ext: TileFormat,

    /// Initial map view
    #[serde(default)]
    pub map: Option<MapOptions>,

    #[serde(default)]
    pub base_layers: Vec<BaseLayerOptions>,

    /// `[pattern, styleId]` pairs offering styles for matching variables
    #[serde(default)]
    pub var_to_style_map: Vec<(String, String)>,
}

impl AppConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> WxResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WxError::ConfigNotFound(format!("{}: {}", path.display(), e))
        })?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            _ => Self::from_json(&content)?,
        };
        debug!(path = %path.display(), data_server = %config.data_server, "Loaded config");
        Ok(config)
    }

    /// Parse configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> WxResult<Self> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| WxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> WxResult<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WxResult<()> {
        if self.data_server.trim().is_empty() {
            return Err(WxError::InvalidConfig("dataServer must not be empty".to_string()));
        }
        for (pattern, style) in &self.var_to_style_map {
            variable_pattern(pattern).map_err(|e| {
                WxError::InvalidConfig(format!("varToStyleMap entry for '{}': {}", style, e))
            })?;
        }
        Ok(())
    }

    /// Mask tile URI template derived from the data server URI.
    ///
    /// The first `/data` or `/data/` segment (any case) becomes `/mask/{z}/{x}/{y}`.
    pub fn mask_server_uri(&self) -> String {
        DATA_SEGMENT
            .replace(&self.data_server, "/mask/{z}/{x}/{y}")
            .into_owned()
    }

    /// Compiled `varToStyleMap` patterns paired with their style ids.
    pub fn style_matchers(&self) -> WxResult<Vec<(Regex, String)>> {
        self.var_to_style_map
            .iter()
            .map(|(pattern, style)| {
                variable_pattern(pattern)
                    .map(|re| (re, style.clone()))
                    .map_err(|e| WxError::InvalidConfig(e.to_string()))
            })
            .collect()
    }

    /// Base layers to register with the layer control.
    ///
    /// Only entries with `add: true` are included. A `zIndex` of 0 marks a base
    /// layer; everything else is an overlay.
    pub fn layer_control_entries(&self) -> Vec<LayerControlEntry> {
        self.base_layers
            .iter()
            .filter(|layer| layer.add)
            .map(|layer| {
                let is_base = layer
                    .options
                    .as_ref()
                    .and_then(|o| o.z_index)
                    .map(|z| z == 0)
                    .unwrap_or(false);
                LayerControlEntry {
                    name: layer.name.clone(),
                    url: layer.url.clone(),
                    kind: if is_base {
                        LayerControlKind::Base
                    } else {
                        LayerControlKind::Overlay
                    },
                }
            })
            .collect()
    }
}

/// Case-insensitive variable pattern from `varToStyleMap`.
pub fn variable_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Tile image format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    #[default]
    Webp,
    Png,
}

/// Initial map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// `[lat, lon]`
    #[serde(default)]
    pub center: Option<[f64; 2]>,

    #[serde(default)]
    pub zoom: Option<f64>,

    #[serde(default)]
    pub zoom_control: Option<bool>,
}

/// A background tile layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLayerOptions {
    pub name: String,

    #[serde(rename = "URL")]
    pub url: String,

    #[serde(default)]
    pub options: Option<TileLayerOptions>,

    #[serde(default)]
    pub add: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerOptions {
    #[serde(default)]
    pub z_index: Option<i32>,

    #[serde(default)]
    pub max_zoom: Option<u32>,

    #[serde(default)]
    pub attribution: Option<String>,
}

/// Entry shown in the layer control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerControlEntry {
    pub name: String,
    pub url: String,
    pub kind: LayerControlKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerControlKind {
    Base,
    Overlay,
}
