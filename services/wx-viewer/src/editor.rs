//! Custom style editor form.
//!
//! The form holds raw input values the way a user edits them: numbers as
//! text, color references as a choice plus a custom hex field. A style is
//! rebuilt from the form and validated on every change. Palette fields
//! (`colors`, `colorMap`, `levels`) and `extraUnits` have no inputs and are
//! not carried over.

use tracing::debug;

use wx_common::{ColorRef, ColorSchemes, ColorStyle, Fill, Mask, VectorType, WxError, WxResult};

use crate::select::Select;

/// Choice value meaning "use the custom hex input".
pub const CUSTOM_COLOR: &str = "custom";

const COLOR_REF_CHOICES: [&str; 4] = ["inverted", "fill", "none", CUSTOM_COLOR];

/// Value of an unset color input.
const DEFAULT_COLOR_INPUT: &str = "#000000";

/// A single form edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorChange {
    Parent(String),
    Name(String),
    AddDegrees(String),
    BlurRadius(String),
    ColorScheme(String),
    Fill(String),
    Mask(String),
    IsolineColor(String),
    IsolineColorCustom(String),
    IsolineText(bool),
    ShowAboveMax(bool),
    ShowBelowMin(bool),
    StreamLineColor(String),
    StreamLineSpeedFactor(String),
    StreamLineStatic(bool),
    Units(String),
    VectorColor(String),
    VectorColorCustom(String),
    VectorType(String),
}

/// Form state of the style editor.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEditor {
    pub parent: String,
    pub name: String,
    pub add_degrees: String,
    pub blur_radius: String,
    pub color_scheme: Select,
    pub fill: Select,
    pub mask: Select,
    pub isoline_color: Select,
    pub isoline_color_custom: String,
    pub isoline_text: bool,
    pub show_above_max: bool,
    pub show_below_min: bool,
    pub stream_line_color: String,
    pub stream_line_speed_factor: String,
    pub stream_line_static: bool,
    pub units: String,
    pub vector_color: Select,
    pub vector_color_custom: String,
    pub vector_type: Select,
}

impl Default for StyleEditor {
    fn default() -> Self {
        Self {
            parent: String::new(),
            name: String::new(),
            add_degrees: String::new(),
            blur_radius: String::new(),
            color_scheme: Select::new(),
            fill: Select::from_values(Fill::ALL.iter().map(Fill::as_str)),
            mask: Select::from_values(Mask::ALL.iter().map(Mask::as_str)),
            isoline_color: Select::from_values(COLOR_REF_CHOICES),
            isoline_color_custom: DEFAULT_COLOR_INPUT.to_string(),
            isoline_text: false,
            show_above_max: false,
            show_below_min: false,
            stream_line_color: DEFAULT_COLOR_INPUT.to_string(),
            stream_line_speed_factor: String::new(),
            stream_line_static: false,
            units: String::new(),
            vector_color: Select::from_values(COLOR_REF_CHOICES),
            vector_color_custom: DEFAULT_COLOR_INPUT.to_string(),
            vector_type: Select::from_values(VectorType::ALL.iter().map(VectorType::as_str)),
        }
    }
}

impl StyleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the form from `style`.
    ///
    /// Color scheme names are taken from `schemes` the first time only.
    pub fn load_style(&mut self, style: &ColorStyle, schemes: &ColorSchemes) {
        if self.color_scheme.is_empty() {
            self.color_scheme = Select::from_values(schemes.names());
            self.color_scheme.set_selected_index(1);
        }

        self.parent = style.parent.clone().unwrap_or_default();
        self.name = style.name.clone();
        self.fill.set_value(style.fill.as_str());
        load_color_ref(&mut self.isoline_color, &mut self.isoline_color_custom, &style.isoline_color);
        self.isoline_text = style.isoline_text;
        self.vector_type.set_value(style.vector_type.as_str());
        load_color_ref(&mut self.vector_color, &mut self.vector_color_custom, &style.vector_color);
        self.stream_line_color = style.stream_line_color.to_string();
        self.stream_line_speed_factor = style.stream_line_speed_factor.to_string();
        self.stream_line_static = style.stream_line_static;
        self.show_below_min = style.show_below_min;
        self.show_above_max = style.show_above_max;
        self.color_scheme.set_value(&style.color_scheme);
        self.blur_radius = style.blur_radius.to_string();
        self.add_degrees = style.add_degrees.to_string();
        self.units = style.units.clone();
        match style.mask {
            Some(mask) => self.mask.set_value(mask.as_str()),
            None => self.mask.set_value(""),
        };

        debug!(name = %style.name, "Loaded style into editor");
    }

    /// Rebuild and validate a style from the form.
    pub fn style(&self) -> WxResult<ColorStyle> {
        let style = ColorStyle {
            parent: Some(self.parent.clone()).filter(|p| !p.is_empty()),
            name: self.name.clone(),
            fill: choice(&self.fill, "fill", &Fill::ALL, Fill::as_str)?,
            isoline_color: color_ref(&self.isoline_color, &self.isoline_color_custom, "isolineColor")?,
            isoline_text: self.isoline_text,
            vector_type: choice(&self.vector_type, "vectorType", &VectorType::ALL, VectorType::as_str)?,
            vector_color: color_ref(&self.vector_color, &self.vector_color_custom, "vectorColor")?,
            stream_line_color: ColorRef::try_from(self.stream_line_color.clone())
                .map_err(WxError::StyleValidation)?,
            stream_line_speed_factor: number(&self.stream_line_speed_factor, "streamLineSpeedFactor")?,
            stream_line_static: self.stream_line_static,
            show_below_min: self.show_below_min,
            show_above_max: self.show_above_max,
            color_scheme: self.color_scheme.value().unwrap_or_default().to_string(),
            colors: None,
            color_map: None,
            levels: None,
            blur_radius: whole_number(&self.blur_radius, "blurRadius")?,
            add_degrees: number(&self.add_degrees, "addDegrees")?,
            units: self.units.clone(),
            extra_units: None,
            mask: match self.mask.value() {
                Some(_) => Some(choice(&self.mask, "mask", &Mask::ALL, Mask::as_str)?),
                None => None,
            },
        };

        style.validate()?;
        Ok(style)
    }

    /// Apply one edit and rebuild the style.
    ///
    /// The edit is kept even when the resulting style is invalid.
    pub fn apply(&mut self, change: EditorChange) -> WxResult<ColorStyle> {
        match change {
            EditorChange::Parent(v) => self.parent = v,
            EditorChange::Name(v) => self.name = v,
            EditorChange::AddDegrees(v) => self.add_degrees = v,
            EditorChange::BlurRadius(v) => self.blur_radius = v,
            EditorChange::ColorScheme(v) => pick(&mut self.color_scheme, &v, "colorScheme")?,
            EditorChange::Fill(v) => pick(&mut self.fill, &v, "fill")?,
            EditorChange::Mask(v) => pick(&mut self.mask, &v, "mask")?,
            EditorChange::IsolineColor(v) => pick(&mut self.isoline_color, &v, "isolineColor")?,
            EditorChange::IsolineColorCustom(v) => self.isoline_color_custom = v,
            EditorChange::IsolineText(v) => self.isoline_text = v,
            EditorChange::ShowAboveMax(v) => self.show_above_max = v,
            EditorChange::ShowBelowMin(v) => self.show_below_min = v,
            EditorChange::StreamLineColor(v) => self.stream_line_color = v,
            EditorChange::StreamLineSpeedFactor(v) => self.stream_line_speed_factor = v,
            EditorChange::StreamLineStatic(v) => self.stream_line_static = v,
            EditorChange::Units(v) => self.units = v,
            EditorChange::VectorColor(v) => pick(&mut self.vector_color, &v, "vectorColor")?,
            EditorChange::VectorColorCustom(v) => self.vector_color_custom = v,
            EditorChange::VectorType(v) => pick(&mut self.vector_type, &v, "vectorType")?,
        }
        self.style()
    }

    /// The form's style as pretty JSON with sorted keys.
    pub fn style_text(&self) -> WxResult<String> {
        self.style()?.to_sorted_json()
    }
}

fn load_color_ref(select: &mut Select, custom: &mut String, value: &ColorRef) {
    match value {
        ColorRef::Custom(hex) => {
            select.set_value(CUSTOM_COLOR);
            *custom = hex.clone();
        }
        other => {
            select.set_value(&other.to_string());
        }
    }
}

fn pick(select: &mut Select, value: &str, field: &str) -> WxResult<()> {
    if !select.contains(value) {
        return Err(WxError::StyleValidation(format!(
            "'{}' is not a {} option",
            value, field
        )));
    }
    select.set_value(value);
    Ok(())
}

fn choice<T: Copy>(
    select: &Select,
    field: &str,
    all: &[T],
    as_str: fn(&T) -> &'static str,
) -> WxResult<T> {
    let value = select.value().unwrap_or_default();
    all.iter()
        .find(|v| as_str(v) == value)
        .copied()
        .ok_or_else(|| WxError::StyleValidation(format!("{}: no valid choice selected", field)))
}

fn color_ref(select: &Select, custom: &str, field: &str) -> WxResult<ColorRef> {
    let value = match select.value() {
        Some(CUSTOM_COLOR) => custom,
        Some(v) => v,
        None => {
            return Err(WxError::StyleValidation(format!("{}: nothing selected", field)));
        }
    };
    ColorRef::try_from(value.to_string())
        .map_err(|e| WxError::StyleValidation(format!("{}: {}", field, e)))
}

/// Empty input reads as zero.
fn number(input: &str, field: &str) -> WxResult<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }
    input
        .parse::<f64>()
        .map_err(|_| WxError::StyleValidation(format!("{}: '{}' is not a number", field, input)))
}

fn whole_number(input: &str, field: &str) -> WxResult<u32> {
    let value = number(input, field)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(WxError::StyleValidation(format!(
            "{}: '{}' is not a non-negative whole number",
            field, input
        )));
    }
    Ok(value as u32)
}
