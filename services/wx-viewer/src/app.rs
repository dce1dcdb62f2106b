//! Application state and event handlers.
//!
//! `AppState` is the single context object of the viewer. Every UI event maps
//! to one handler method; collaborators that suspend (the data server and the
//! layer factory) are passed in explicitly. Handlers take `&mut self`, so only
//! one runs at a time.

use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use renderer::legend::LABEL_ALLOWANCE;
use renderer::{LegendCanvas, LegendRenderer};
use wx_common::style::{UnitDefinitions, BASE_STYLE, CUSTOM_STYLE};
use wx_common::{AppConfig, ColorSchemes, ColorStyles, LayerControlKind, WxResult};

use crate::animation::remaining_delay;
use crate::catalog::{self, layer_variables, variable_options, DataServer};
use crate::editor::{EditorChange, StyleEditor};
use crate::info;
use crate::layer::{
    DataSource, LatLng, LayerFactory, LayerOptions, LayerSettings, TileLayer, TimeRequest,
};
use crate::props::Props;
use crate::select::{Select, SelectOption};

/// Shown after a layer is held.
pub const HOLD_MESSAGE: &str = "This layer was \"held\". \
You can hold as many layers as you want, but you can't control them after holding. \
New layers will appear OVER the held layers. \
Use the \"clear\" button to clear the ALL VISIBLE layers.";

/// Drawn on the legend canvas when the custom style does not validate.
pub const WRONG_STYLE_MESSAGE: &str = "Wrong custom style";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// Viewer settings that are not part of `config.json`.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub legend_width: u32,
    pub legend_height: u32,
    /// Target time between animation steps
    pub anim_delay: Duration,
    /// Tile zoom reduction while animating
    pub coarse_level: u32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            legend_width: 300,
            legend_height: 50,
            anim_delay: Duration::from_millis(100),
            coarse_level: 2,
        }
    }
}

/// Entry of the layer control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry {
    pub name: String,
    pub kind: LayerControlKind,
    /// Set for tile layers created by the viewer
    pub layer_id: Option<u64>,
}

struct MapLayer {
    id: u64,
    layer: Box<dyn TileLayer>,
}

/// Viewer state.
pub struct AppState {
    config: AppConfig,
    styles: ColorStyles,
    units: UnitDefinitions,
    color_schemes: ColorSchemes,

    pub datasets: Select,
    pub variables: Select,
    pub times: Select,
    pub style_select: Select,
    pub editor: StyleEditor,

    legend: LegendCanvas,
    legend_renderer: LegendRenderer,

    /// Layer the controls act on
    layer: Option<MapLayer>,
    /// Layers kept on the map but detached from the controls
    held: Vec<MapLayer>,
    controls: Vec<ControlEntry>,
    next_layer_id: u64,

    play: PlayState,
    pub anim_delay: Duration,
    pub coarse_level: u32,

    last_position: Option<LatLng>,
    info_panel: String,
}

impl AppState {
    pub fn new(props: Props, options: ViewerOptions, legend_renderer: LegendRenderer) -> Self {
        let controls = props
            .config
            .layer_control_entries()
            .into_iter()
            .map(|entry| ControlEntry {
                name: entry.name,
                kind: entry.kind,
                layer_id: None,
            })
            .collect();

        Self {
            config: props.config,
            styles: props.styles,
            units: props.units,
            color_schemes: props.color_schemes,
            datasets: Select::new(),
            variables: Select::new(),
            times: Select::new(),
            style_select: Select::new(),
            editor: StyleEditor::new(),
            legend: LegendCanvas::new(options.legend_width, options.legend_height),
            legend_renderer,
            layer: None,
            held: Vec::new(),
            controls,
            next_layer_id: 0,
            play: PlayState::Stopped,
            anim_delay: options.anim_delay,
            coarse_level: options.coarse_level,
            last_position: None,
            info_panel: String::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn styles(&self) -> &ColorStyles {
        &self.styles
    }

    pub fn legend(&self) -> &LegendCanvas {
        &self.legend
    }

    /// The layer the controls act on.
    pub fn layer(&self) -> Option<&dyn TileLayer> {
        self.layer.as_ref().map(|m| m.layer.as_ref())
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn controls(&self) -> &[ControlEntry] {
        &self.controls
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn info_panel(&self) -> &str {
        &self.info_panel
    }

    /// Held layers first, then the current one, in drawing order.
    fn map_layers(&self) -> impl Iterator<Item = &dyn TileLayer> + '_ {
        self.held
            .iter()
            .chain(self.layer.iter())
            .map(|m| m.layer.as_ref() as &dyn TileLayer)
    }

    /// Load dataset names and select `default_dataset` when listed, then
    /// load the selected dataset.
    #[instrument(skip_all)]
    pub async fn fill_datasets(
        &mut self,
        server: &dyn DataServer,
        factory: &dyn LayerFactory,
        default_dataset: Option<&str>,
        default_variable: Option<&str>,
    ) -> WxResult<()> {
        let mut names = match server.datasets().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Failed to load datasets");
                return Ok(());
            }
        };
        names.sort();
        info!(count = names.len(), "Loaded datasets");

        self.datasets = Select::from_values(names);
        if let Some(default) = default_dataset {
            if self.datasets.contains(default) {
                self.datasets.set_value(default);
            }
        }

        self.on_dataset_change(server, factory, default_variable).await
    }

    /// Load the variables of the selected dataset's newest instance, keeping
    /// the previous variable when the dataset also has it.
    #[instrument(skip_all)]
    pub async fn on_dataset_change(
        &mut self,
        server: &dyn DataServer,
        factory: &dyn LayerFactory,
        default_variable: Option<&str>,
    ) -> WxResult<()> {
        let Some(dataset) = self.datasets.value().map(str::to_string) else {
            warn!("No dataset selected");
            return Ok(());
        };
        let previous = self.variables.value().map(str::to_string);

        let meta = match catalog::latest_meta(server, &dataset).await {
            Ok((instance, meta)) => {
                debug!(dataset = %dataset, instance = %instance, variables = meta.variables.len(), "Loaded meta");
                meta
            }
            Err(e) => {
                warn!(dataset = %dataset, error = %e, "Failed to load dataset meta");
                return Ok(());
            }
        };

        self.variables.replace(variable_options(&meta.variables));
        for wanted in [previous.as_deref(), default_variable].into_iter().flatten() {
            if self.variables.contains(wanted) {
                self.variables.set_value(wanted);
            }
        }

        self.on_variable_change(factory).await
    }

    fn layer_settings(&self, dataset: &str, variable: &str, label: &str) -> LayerSettings {
        LayerSettings {
            data_source: DataSource {
                server_uri: self.config.data_server.clone(),
                mask_server_uri: self.config.mask_server_uri(),
                ext: self.config.ext,
                dataset: dataset.to_string(),
                variables: layer_variables(variable),
                name: format!("{}/{}", dataset, label),
                style_name: variable.to_string(),
            },
            options: LayerOptions::default(),
            units: self.units.clone(),
        }
    }

    /// Replace the current layer with one for the selected variable.
    ///
    /// The time selected before the change is requested from the new layer,
    /// not the new layer's own initial time. With no time selected yet the
    /// current instant is requested.
    #[instrument(skip_all)]
    pub async fn on_variable_change(&mut self, factory: &dyn LayerFactory) -> WxResult<()> {
        self.stop_play().await;

        let Some(variable) = self.variables.value().map(str::to_string) else {
            warn!("No variable selected");
            return Ok(());
        };
        let dataset = self.datasets.value().unwrap_or_default().to_string();
        let label = self.variables.label().unwrap_or(&variable).to_string();
        let settings = self.layer_settings(&dataset, &variable, &label);
        info!(dataset = %dataset, variable = %variable, "Loading variable");

        let mut layer = factory.create(settings)?;
        layer.setup_complete().await?;

        let id = self.next_layer_id;
        self.next_layer_id += 1;
        let name = layer.data_source().name.clone();
        if let Some(old) = self.layer.replace(MapLayer { id, layer }) {
            self.controls.retain(|e| e.layer_id != Some(old.id));
        }
        self.controls.push(ControlEntry {
            name,
            kind: LayerControlKind::Overlay,
            layer_id: Some(id),
        });

        let previous_time = self.times.value().map(str::to_string);
        self.fill_times();
        self.fill_styles()?;

        let request = match previous_time {
            Some(time) => TimeRequest::Step(time),
            None => TimeRequest::Instant(Utc::now()),
        };
        if let Some(current) = self.layer.as_mut() {
            current.layer.set_time(request).await?;
            let time = current.layer.time();
            self.times.set_value(&time);
        }
        Ok(())
    }

    /// List the layer's times and select its current one.
    pub fn fill_times(&mut self) {
        let Some(current) = &self.layer else {
            return;
        };
        self.times = Select::from_values(current.layer.times());
        self.times.set_value(&current.layer.time());
    }

    /// Offer the styles mapped to the layer's variable, then `base` and
    /// `custom`, and apply the first.
    pub fn fill_styles(&mut self) -> WxResult<()> {
        let Some(current) = &self.layer else {
            return Ok(());
        };
        let variable = current
            .layer
            .data_source()
            .variables
            .first()
            .cloned()
            .unwrap_or_default();

        let mut options = Vec::new();
        for (pattern, style_id) in self.config.style_matchers()? {
            if let Some(style) = self.styles.get(&style_id) {
                if pattern.is_match(&variable) {
                    options.push(SelectOption::new(style_id, style.name.clone()));
                }
            }
        }
        options.push(SelectOption::plain(BASE_STYLE));
        options.push(SelectOption::plain(CUSTOM_STYLE));
        self.style_select.replace(options);

        self.on_style_change()
    }

    /// Apply the selected style and redraw the legend.
    pub fn on_style_change(&mut self) -> WxResult<()> {
        let Some(current) = self.layer.as_mut() else {
            return Ok(());
        };
        let style_id = self.style_select.value().unwrap_or(BASE_STYLE).to_string();

        if style_id == CUSTOM_STYLE {
            match self.editor.style() {
                Ok(style) => self.styles.insert(CUSTOM_STYLE, style),
                Err(e) => {
                    warn!(error = %e, "Wrong custom style");
                    self.legend_renderer
                        .draw_message(&mut self.legend, WRONG_STYLE_MESSAGE);
                    return Ok(());
                }
            }
        }

        current.layer.set_style(&style_id, &self.styles)?;
        let style = current.layer.style();
        self.editor.load_style(&style, &self.color_schemes);

        let width = self.legend.width().saturating_sub(LABEL_ALLOWANCE);
        if let Some(legend) = current.layer.legend_data(width) {
            self.legend_renderer.draw(&mut self.legend, &legend, &style.name);
        }
        debug!(style = %style_id, "Style applied");
        Ok(())
    }

    /// Show the layer at `time`.
    pub async fn on_time_change(&mut self, time: &str) -> WxResult<()> {
        if self.layer.is_none() {
            return Ok(());
        }
        if self.play == PlayState::Playing {
            self.stop_play().await;
        }

        if let Some(current) = self.layer.as_mut() {
            current.layer.set_time(TimeRequest::Step(time.to_string())).await?;
            let actual = current.layer.time();
            self.times.set_value(&actual);
        }
        self.update_info_panel(None);
        Ok(())
    }

    /// Start animating. Returns false when there is no layer.
    pub fn start_play(&mut self) -> bool {
        let Some(current) = self.layer.as_mut() else {
            return false;
        };
        self.play = PlayState::Playing;
        current.layer.set_time_animation_mode(self.coarse_level);
        info!(coarse_level = self.coarse_level, "Animation started");
        true
    }

    pub async fn stop_play(&mut self) {
        if self.play != PlayState::Playing {
            return;
        }
        self.play = PlayState::Stopped;
        if let Some(current) = self.layer.as_mut() {
            current.layer.unset_time_animation_mode().await;
        }
        info!("Animation stopped");
    }

    /// Show the selected time and advance the selector.
    ///
    /// Returns how long to wait before the next step, or `None` once playing
    /// has stopped.
    pub async fn next_time_step(&mut self) -> WxResult<Option<Duration>> {
        if self.play != PlayState::Playing {
            return Ok(None);
        }
        let Some(current) = self.layer.as_mut() else {
            return Ok(None);
        };

        let start = Instant::now();
        if let Some(time) = self.times.value() {
            current.layer.set_time(TimeRequest::Step(time.to_string())).await?;
        }
        self.update_info_panel(None);
        self.times.advance_wrapping();

        Ok(Some(remaining_delay(self.anim_delay, start.elapsed())))
    }

    /// Apply a style editor change as the `custom` style.
    pub fn on_editor_change(&mut self, change: EditorChange) -> WxResult<()> {
        let style = self.editor.apply(change)?;
        self.styles.insert(CUSTOM_STYLE, style);
        if let Some(current) = self.layer.as_mut() {
            current.layer.set_style(CUSTOM_STYLE, &self.styles)?;
        }
        Ok(())
    }

    /// Keep the current layer on the map and detach it from the controls.
    pub async fn hold(&mut self) -> &'static str {
        self.stop_play().await;
        if let Some(layer) = self.layer.take() {
            info!(name = %layer.layer.data_source().name, "Layer held");
            self.held.push(layer);
        }
        HOLD_MESSAGE
    }

    /// Remove every tile layer, held ones included, and reload the variable.
    pub async fn clear(&mut self, factory: &dyn LayerFactory) -> WxResult<()> {
        self.stop_play().await;
        let removed = self.held.len() + usize::from(self.layer.is_some());
        self.held.clear();
        self.layer = None;
        self.controls.retain(|e| e.layer_id.is_none());
        info!(removed, "Cleared layers");

        self.on_variable_change(factory).await
    }

    /// Rebuild the info panel for `position`, or for the last position seen.
    pub fn update_info_panel(&mut self, position: Option<LatLng>) -> &str {
        if position.is_some() {
            self.last_position = position;
        }
        let Some(position) = self.last_position else {
            return &self.info_panel;
        };

        let mut content = format!("{}\n", position);
        for layer in self.map_layers() {
            if let Some(probe) = layer.info_at(position) {
                let name = &layer.data_source().name;
                content.push_str(&info::info_line(name, &probe, layer.min_max(), &layer.time()));
                content.push('\n');
            }
        }
        self.info_panel = content;
        &self.info_panel
    }

    /// Detailed probe text for every layer at `position`.
    pub fn popup_info(&self, position: LatLng) -> String {
        let mut content = String::new();
        for layer in self.map_layers() {
            if let Some(probe) = layer.info_at(position) {
                content.push_str(&info::popup_block(layer, &probe));
            }
        }
        content.push_str(&position.to_string());
        content
    }
}
