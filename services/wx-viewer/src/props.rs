//! Loading of the `props/` directory.
//!
//! `config.json` is required. `styles.json`, `uconv.json` and
//! `colorschemes.json` are optional; when one is missing or invalid a warning
//! is logged and the built-in defaults are used.

use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

pub use wx_common::style::UnitDefinitions;
use wx_common::{AppConfig, ColorSchemes, ColorStyles, WxResult};

pub const CONFIG_FILE: &str = "config.json";
pub const STYLES_FILE: &str = "styles.json";
pub const UNITS_FILE: &str = "uconv.json";
pub const COLOR_SCHEMES_FILE: &str = "colorschemes.json";

/// Everything read from the props directory.
#[derive(Debug, Clone)]
pub struct Props {
    pub config: AppConfig,
    pub styles: ColorStyles,
    pub units: UnitDefinitions,
    pub color_schemes: ColorSchemes,
}

impl Props {
    pub fn load(dir: impl AsRef<Path>) -> WxResult<Self> {
        let dir = dir.as_ref();
        let config = AppConfig::from_file(dir.join(CONFIG_FILE))?;

        let styles = load_optional(dir, STYLES_FILE, |p| ColorStyles::from_file(p));
        let units = load_optional(dir, UNITS_FILE, |p| read_json::<UnitDefinitions>(p));
        let color_schemes = load_optional(dir, COLOR_SCHEMES_FILE, |p| ColorSchemes::from_file(p));

        info!(
            dir = %dir.display(),
            styles = styles.len(),
            units = units.len(),
            "Loaded props"
        );

        Ok(Self {
            config,
            styles,
            units,
            color_schemes,
        })
    }

    /// Props with default styles, units and color schemes.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            styles: ColorStyles::default(),
            units: UnitDefinitions::new(),
            color_schemes: ColorSchemes::default(),
        }
    }
}

fn load_optional<T, F>(dir: &Path, name: &str, load: F) -> T
where
    T: Default,
    F: FnOnce(&Path) -> WxResult<T>,
{
    let path = dir.join(name);
    match load(&path) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Using defaults");
            T::default()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> WxResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
