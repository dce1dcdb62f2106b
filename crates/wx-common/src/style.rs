//! Color style records for tile layers.
//!
//! A `ColorStyle` is the validated form of a style entry from `styles.json`
//! or the custom style editor. Entries in `styles.json` are partial: a field
//! an entry leaves out is taken from its `parent` style (the base style when
//! no parent is named), and the base style falls back to built-in defaults.
//! Unknown fields are rejected, and `validate` checks value ranges before a
//! style is handed to a layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{WxError, WxResult};
use crate::json::to_sorted_pretty_string;

/// Name of the style every layer starts with.
pub const BASE_STYLE: &str = "base";

/// Name of the style slot written by the style editor.
pub const CUSTOM_STYLE: &str = "custom";

/// Maximum blur radius accepted by the tile layer.
pub const MAX_BLUR_RADIUS: u32 = 10;

/// A `[value, color]` pair of an explicit color map.
pub type ColorMapEntry = (f64, String);

/// A complete color style.
///
/// Deserializing a single style fills missing fields from the built-in
/// defaults; use `ColorStyles::from_json` to inherit from parent styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StyleEntry")]
pub struct ColorStyle {
    /// Style this one was derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Human-readable name, used as the legend title
    pub name: String,

    pub fill: Fill,

    pub isoline_color: ColorRef,

    pub isoline_text: bool,

    pub vector_type: VectorType,

    pub vector_color: ColorRef,

    pub stream_line_color: ColorRef,

    pub stream_line_speed_factor: f64,

    pub stream_line_static: bool,

    /// Draw the below-minimum triangle on the legend
    pub show_below_min: bool,

    /// Draw the above-maximum triangle on the legend
    pub show_above_max: bool,

    /// Key into the color scheme table
    pub color_scheme: String,

    /// Explicit palette, overrides `color_scheme`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<Vec<ColorMapEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<f64>>,

    pub blur_radius: u32,

    pub add_degrees: f64,

    /// Display units
    pub units: String,

    /// Additional display units keyed by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_units: Option<BTreeMap<String, UnitConversion>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
}

impl Default for ColorStyle {
    fn default() -> Self {
        Self {
            parent: None,
            name: BASE_STYLE.to_string(),
            fill: Fill::Gradient,
            isoline_color: ColorRef::Inverted,
            isoline_text: true,
            vector_type: VectorType::Arrows,
            vector_color: ColorRef::Inverted,
            stream_line_color: ColorRef::Inverted,
            stream_line_speed_factor: 1.0,
            stream_line_static: false,
            show_below_min: true,
            show_above_max: true,
            color_scheme: "wb".to_string(),
            colors: None,
            color_map: None,
            levels: None,
            blur_radius: 0,
            add_degrees: 0.0,
            units: String::new(),
            extra_units: None,
            mask: None,
        }
    }
}

impl ColorStyle {
    /// Parse a single style and validate it.
    pub fn from_json(json: &str) -> WxResult<Self> {
        let style: ColorStyle =
            serde_json::from_str(json).map_err(|e| WxError::StyleParse(e.to_string()))?;
        style.validate()?;
        Ok(style)
    }

    /// Check value ranges the tile layer relies on.
    pub fn validate(&self) -> WxResult<()> {
        self.check()
            .map_err(|msg| WxError::StyleValidation(format!("{}: {}", self.name, msg)))
    }

    fn check(&self) -> Result<(), String> {
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(format!(
                "blurRadius {} exceeds {}",
                self.blur_radius, MAX_BLUR_RADIUS
            ));
        }

        if !(0.0..=360.0).contains(&self.add_degrees) {
            return Err(format!("addDegrees {} outside 0..=360", self.add_degrees));
        }

        if !(0.1..=10.0).contains(&self.stream_line_speed_factor) {
            return Err(format!(
                "streamLineSpeedFactor {} outside 0.1..=10",
                self.stream_line_speed_factor
            ));
        }

        if let Some(levels) = &self.levels {
            if !strictly_ascending(levels.iter().copied()) {
                return Err("levels must be finite and strictly ascending".to_string());
            }
        }

        if let Some(color_map) = &self.color_map {
            if !strictly_ascending(color_map.iter().map(|(v, _)| *v)) {
                return Err("colorMap values must be finite and strictly ascending".to_string());
            }
            if let Some((_, bad)) = color_map.iter().find(|(_, c)| !is_hex_color(c)) {
                return Err(format!("colorMap color '{}' is not a hex color", bad));
            }
        }

        if let Some(colors) = &self.colors {
            if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
                return Err(format!("color '{}' is not a hex color", bad));
            }
        }

        Ok(())
    }

    /// Pretty JSON with case-insensitively sorted keys, as shown in the style text view.
    pub fn to_sorted_json(&self) -> WxResult<String> {
        let value = serde_json::to_value(self)?;
        Ok(to_sorted_pretty_string(value)?)
    }
}

fn strictly_ascending(values: impl Iterator<Item = f64>) -> bool {
    let mut prev: Option<f64> = None;
    for v in values {
        if !v.is_finite() {
            return false;
        }
        if let Some(p) = prev {
            if v <= p {
                return false;
            }
        }
        prev = Some(v);
    }
    true
}

/// A style entry as written in `styles.json`, before inheritance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StyleEntry {
    parent: Option<String>,
    name: Option<String>,
    fill: Option<Fill>,
    isoline_color: Option<ColorRef>,
    isoline_text: Option<bool>,
    vector_type: Option<VectorType>,
    vector_color: Option<ColorRef>,
    stream_line_color: Option<ColorRef>,
    stream_line_speed_factor: Option<f64>,
    stream_line_static: Option<bool>,
    show_below_min: Option<bool>,
    show_above_max: Option<bool>,
    color_scheme: Option<String>,
    colors: Option<Vec<String>>,
    color_map: Option<Vec<ColorMapEntry>>,
    levels: Option<Vec<f64>>,
    blur_radius: Option<u32>,
    add_degrees: Option<f64>,
    units: Option<String>,
    extra_units: Option<BTreeMap<String, UnitConversion>>,
    mask: Option<Mask>,
}

impl StyleEntry {
    /// Fill the fields this entry leaves out from `inherited`.
    ///
    /// `parent` is the entry's own, never inherited.
    fn resolve(self, inherited: &ColorStyle) -> ColorStyle {
        let inherited = inherited.clone();
        ColorStyle {
            parent: self.parent,
            name: self.name.unwrap_or(inherited.name),
            fill: self.fill.unwrap_or(inherited.fill),
            isoline_color: self.isoline_color.unwrap_or(inherited.isoline_color),
            isoline_text: self.isoline_text.unwrap_or(inherited.isoline_text),
            vector_type: self.vector_type.unwrap_or(inherited.vector_type),
            vector_color: self.vector_color.unwrap_or(inherited.vector_color),
            stream_line_color: self.stream_line_color.unwrap_or(inherited.stream_line_color),
            stream_line_speed_factor: self
                .stream_line_speed_factor
                .unwrap_or(inherited.stream_line_speed_factor),
            stream_line_static: self.stream_line_static.unwrap_or(inherited.stream_line_static),
            show_below_min: self.show_below_min.unwrap_or(inherited.show_below_min),
            show_above_max: self.show_above_max.unwrap_or(inherited.show_above_max),
            color_scheme: self.color_scheme.unwrap_or(inherited.color_scheme),
            colors: self.colors.or(inherited.colors),
            color_map: self.color_map.or(inherited.color_map),
            levels: self.levels.or(inherited.levels),
            blur_radius: self.blur_radius.unwrap_or(inherited.blur_radius),
            add_degrees: self.add_degrees.unwrap_or(inherited.add_degrees),
            units: self.units.unwrap_or(inherited.units),
            extra_units: self.extra_units.or(inherited.extra_units),
            mask: self.mask.or(inherited.mask),
        }
    }
}

impl From<StyleEntry> for ColorStyle {
    fn from(entry: StyleEntry) -> Self {
        entry.resolve(&ColorStyle::default())
    }
}

/// How the data field is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    #[default]
    Gradient,
    Solid,
    None,
}

impl Fill {
    pub const ALL: [Fill; 3] = [Fill::Gradient, Fill::Solid, Fill::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fill::Gradient => "gradient",
            Fill::Solid => "solid",
            Fill::None => "none",
        }
    }
}

/// Vector field glyphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorType {
    #[default]
    Arrows,
    Barbs,
    None,
}

impl VectorType {
    pub const ALL: [VectorType; 3] = [VectorType::Arrows, VectorType::Barbs, VectorType::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            VectorType::Arrows => "arrows",
            VectorType::Barbs => "barbs",
            VectorType::None => "none",
        }
    }
}

/// Land/sea masking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mask {
    #[default]
    None,
    Sea,
    Land,
}

impl Mask {
    pub const ALL: [Mask; 3] = [Mask::None, Mask::Sea, Mask::Land];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mask::None => "none",
            Mask::Sea => "sea",
            Mask::Land => "land",
        }
    }
}

/// Color reference for isolines, vectors and streamlines.
///
/// Serialized as a plain string: `inverted`, `fill`, `none` or a `#` hex color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorRef {
    /// Inverse of the fill color under the feature
    Inverted,
    /// Same as the fill color
    Fill,
    None,
    /// Explicit `#rgb`, `#rrggbb` or `#rrggbbaa` color
    Custom(String),
}

impl TryFrom<String> for ColorRef {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "inverted" => Ok(ColorRef::Inverted),
            "fill" => Ok(ColorRef::Fill),
            "none" => Ok(ColorRef::None),
            hex if is_hex_color(hex) => Ok(ColorRef::Custom(s)),
            other => Err(format!("unknown color reference '{}'", other)),
        }
    }
}

impl From<ColorRef> for String {
    fn from(c: ColorRef) -> Self {
        c.to_string()
    }
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorRef::Inverted => f.write_str("inverted"),
            ColorRef::Fill => f.write_str("fill"),
            ColorRef::None => f.write_str("none"),
            ColorRef::Custom(hex) => f.write_str(hex),
        }
    }
}

/// Conversion to an extra display unit: `[unit, scale]` or `[unit, scale, offset]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitConversion {
    Affine(String, f64, f64),
    Scaled(String, f64),
}

/// Unit conversions keyed by unit name, as in `uconv.json`.
pub type UnitDefinitions = BTreeMap<String, UnitConversion>;

/// Whether `s` is `#` followed by 3, 6 or 8 hex digits.
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// All styles available to the viewer, keyed by style id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorStyles(BTreeMap<String, ColorStyle>);

impl Default for ColorStyles {
    fn default() -> Self {
        let mut styles = BTreeMap::new();
        styles.insert(BASE_STYLE.to_string(), ColorStyle::default());
        Self(styles)
    }
}

impl ColorStyles {
    /// Parse a `styles.json` document and resolve every entry against its
    /// parent chain. The base style is always present afterwards.
    ///
    /// Unknown parents and parent cycles are errors.
    pub fn from_json(json: &str) -> WxResult<Self> {
        let entries: BTreeMap<String, StyleEntry> =
            serde_json::from_str(json).map_err(|e| WxError::StyleParse(e.to_string()))?;

        let mut resolved = BTreeMap::new();
        resolve_style(BASE_STYLE, &entries, &mut resolved, &mut Vec::new())?;
        for id in entries.keys() {
            resolve_style(id, &entries, &mut resolved, &mut Vec::new())?;
        }

        let styles = Self(resolved);
        styles.validate()?;
        Ok(styles)
    }

    /// Load a `styles.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> WxResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate all styles in the table.
    pub fn validate(&self) -> WxResult<()> {
        for (id, style) in &self.0 {
            style
                .check()
                .map_err(|msg| WxError::StyleValidation(format!("{}: {}", id, msg)))?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ColorStyle> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Insert or replace a style.
    pub fn insert(&mut self, id: impl Into<String>, style: ColorStyle) {
        self.0.insert(id.into(), style);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve `id` into `resolved`, resolving its ancestors first.
///
/// `chain` holds the ids being resolved below this one.
fn resolve_style(
    id: &str,
    entries: &BTreeMap<String, StyleEntry>,
    resolved: &mut BTreeMap<String, ColorStyle>,
    chain: &mut Vec<String>,
) -> WxResult<ColorStyle> {
    if let Some(style) = resolved.get(id) {
        return Ok(style.clone());
    }
    if chain.iter().any(|c| c == id) {
        chain.push(id.to_string());
        return Err(WxError::StyleParse(format!(
            "parent cycle: {}",
            chain.join(" -> ")
        )));
    }

    let entry = match entries.get(id) {
        Some(entry) => entry.clone(),
        None if id == BASE_STYLE => StyleEntry::default(),
        None => {
            let child = chain.last().map(String::as_str).unwrap_or(id);
            return Err(WxError::StyleParse(format!(
                "{}: unknown parent style '{}'",
                child, id
            )));
        }
    };

    let parent = match entry.parent.as_deref() {
        Some(parent) => Some(parent),
        None if id != BASE_STYLE => Some(BASE_STYLE),
        None => None,
    };
    let inherited = match parent {
        Some(parent) => {
            chain.push(id.to_string());
            let inherited = resolve_style(parent, entries, resolved, chain)?;
            chain.pop();
            inherited
        }
        None => ColorStyle::default(),
    };

    let style = entry.resolve(&inherited);
    resolved.insert(id.to_string(), style.clone());
    Ok(style)
}

/// Named color schemes, as in `colorschemes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSchemes(BTreeMap<String, Vec<String>>);

impl Default for ColorSchemes {
    fn default() -> Self {
        let mut schemes = BTreeMap::new();
        schemes.insert(
            "bw".to_string(),
            vec!["#000000".to_string(), "#ffffff".to_string()],
        );
        schemes.insert(
            "wb".to_string(),
            vec!["#ffffff".to_string(), "#000000".to_string()],
        );
        schemes.insert(
            "rainbow".to_string(),
            ["#0000ff", "#00ffff", "#00ff00", "#ffff00", "#ff0000"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        Self(schemes)
    }
}

impl ColorSchemes {
    pub fn from_json(json: &str) -> WxResult<Self> {
        let schemes: ColorSchemes = serde_json::from_str(json)?;
        for (name, colors) in &schemes.0 {
            if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
                return Err(WxError::InvalidConfig(format!(
                    "color scheme '{}' has invalid color '{}'",
                    name, bad
                )));
            }
        }
        Ok(schemes)
    }

    pub fn from_file(path: impl AsRef<Path>) -> WxResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_base_defaults() {
        let style = ColorStyle::from_json(r#"{"name":"Temperature","units":"C"}"#).unwrap();
        assert_eq!(style.name, "Temperature");
        assert_eq!(style.units, "C");
        assert_eq!(style.fill, Fill::Gradient);
        assert!(style.show_below_min);
        assert_eq!(style.stream_line_speed_factor, 1.0);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#FF5500"));
        assert!(is_hex_color("#ff550080"));
        assert!(!is_hex_color("ff5500"));
        assert!(!is_hex_color("#ff55"));
        assert!(!is_hex_color("#GGGGGG"));

    }

    #[test]
    fn test_color_ref_round_trip_strings() {
        let c: ColorRef = serde_json::from_str("\"#123456\"").unwrap();
        assert_eq!(c, ColorRef::Custom("#123456".to_string()));
        assert_eq!(serde_json::to_string(&ColorRef::Fill).unwrap(), "\"fill\"");
        assert!(serde_json::from_str::<ColorRef>("\"purple\"").is_err());
    }
}
