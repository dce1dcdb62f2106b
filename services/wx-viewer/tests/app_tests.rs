//! Tests for the viewer event handlers.
//!
//! The tile layer and data server are replaced by in-memory mocks that record
//! every call, so handler sequencing can be checked without a network or map.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

use renderer::{Legend, LegendRenderer, Tick};
use test_utils::{config_json, ramp_palette, STYLES_JSON};
use wx_common::style::UnitConversion;
use wx_common::{AppConfig, ColorStyle, ColorStyles, LayerControlKind, WxError, WxResult};
use wx_viewer::{
    spawn_animation, AppState, DataServer, DataSource, DatasetMeta, EditorChange, LatLng,
    LayerFactory, LayerSettings, MinMax, PlayState, ProbeInfo, Props, TileLayer, TimeRequest,
    ViewerOptions, HOLD_MESSAGE,
};

const TIMES: [&str; 3] = [
    "2024-01-01T00:00:00Z",
    "2024-01-01T03:00:00Z",
    "2024-01-01T06:00:00Z",
];

// ============================================================================
// Mocks
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(LayerSettings),
    SetTime(TimeRequest),
    SetStyle(String),
    AnimationMode(Option<u32>),
    LegendData(u32),
}

type CallLog = Arc<StdMutex<Vec<Call>>>;

fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}

struct MockLayer {
    source: DataSource,
    time: String,
    style: ColorStyle,
    log: CallLog,
}

impl MockLayer {
    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TileLayer for MockLayer {
    fn data_source(&self) -> &DataSource {
        &self.source
    }

    async fn setup_complete(&mut self) -> WxResult<()> {
        Ok(())
    }

    fn times(&self) -> Vec<String> {
        TIMES.iter().map(|t| t.to_string()).collect()
    }

    fn time(&self) -> String {
        self.time.clone()
    }

    async fn set_time(&mut self, time: TimeRequest) -> WxResult<()> {
        self.record(Call::SetTime(time.clone()));
        self.time = match time {
            TimeRequest::Step(t) if TIMES.contains(&t.as_str()) => t,
            TimeRequest::Step(_) => TIMES[0].to_string(),
            TimeRequest::Instant(_) => TIMES[2].to_string(),
        };
        Ok(())
    }

    fn set_time_animation_mode(&mut self, coarse_level: u32) {
        self.record(Call::AnimationMode(Some(coarse_level)));
    }

    async fn unset_time_animation_mode(&mut self) {
        self.record(Call::AnimationMode(None));
    }

    fn set_style(&mut self, style_id: &str, styles: &ColorStyles) -> WxResult<()> {
        self.record(Call::SetStyle(style_id.to_string()));
        self.style = styles
            .get(style_id)
            .cloned()
            .ok_or_else(|| WxError::StyleNotFound(style_id.to_string()))?;
        Ok(())
    }

    fn style(&self) -> ColorStyle {
        self.style.clone()
    }

    fn legend_data(&self, width: u32) -> Option<Legend> {
        self.record(Call::LegendData(width));
        let size = 100.min(width as usize);
        Some(Legend {
            colors: ramp_palette(size),
            size,
            show_below_min: self.style.show_below_min,
            show_above_max: self.style.show_above_max,
            ticks: vec![Tick {
                pos: 0,
                data_string: "0".to_string(),
            }],
            units: self.style.units.clone(),
        })
    }

    fn info_at(&self, _position: LatLng) -> Option<ProbeInfo> {
        Some(ProbeInfo {
            hex_color: "#336699".to_string(),
            in_style_units: vec![12.5],
            style_units: self.style.units.clone(),
            data: vec![285.65],
            tile_point: (3, 4),
        })
    }

    fn min_max(&self) -> MinMax {
        MinMax { min: -5.0, max: 30.0 }
    }

    fn instance(&self) -> String {
        "2024-01-01T00:00:00Z".to_string()
    }

    fn units(&self) -> String {
        "K".to_string()
    }
}

struct MockFactory {
    log: CallLog,
}

impl LayerFactory for MockFactory {
    fn create(&self, settings: LayerSettings) -> WxResult<Box<dyn TileLayer>> {
        self.log.lock().unwrap().push(Call::Create(settings.clone()));
        Ok(Box::new(MockLayer {
            source: settings.data_source,
            time: TIMES[0].to_string(),
            style: ColorStyle::default(),
            log: self.log.clone(),
        }))
    }
}

struct MockServer {
    datasets: BTreeMap<String, Vec<String>>,
    available: bool,
}

impl MockServer {
    fn new() -> Self {
        let variables = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "gfs.global".to_string(),
            variables(&[
                "wind.speed.northward.at-10m",
                "air.temperature.at-2m",
                "wind.speed.eastward.at-10m",
            ]),
        );
        datasets.insert(
            "ecmwf.global".to_string(),
            variables(&["air.temperature.at-2m", "precipitation.rate"]),
        );
        Self {
            datasets,
            available: true,
        }
    }

    fn down() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    fn check(&self, url: &str) -> WxResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(WxError::FetchError {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }
}

#[async_trait]
impl DataServer for MockServer {
    async fn datasets(&self) -> WxResult<Vec<String>> {
        self.check("datasets.json")?;
        // Reverse order to check sorting
        Ok(self.datasets.keys().rev().cloned().collect())
    }

    async fn instances(&self, dataset: &str) -> WxResult<Vec<String>> {
        self.check("instances.json")?;
        Ok(vec![
            format!("{}-2023-12-31", dataset),
            format!("{}-2024-01-01", dataset),
        ])
    }

    async fn meta(&self, dataset: &str, _instance: &str) -> WxResult<DatasetMeta> {
        self.check("meta.json")?;
        Ok(DatasetMeta {
            variables: self.datasets.get(dataset).cloned().unwrap_or_default(),
            ..DatasetMeta::default()
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn new_state() -> AppState {
    let config = AppConfig::from_json(&config_json("https://tiles.example.com/data/")).unwrap();
    let props = Props {
        styles: ColorStyles::from_json(STYLES_JSON).unwrap(),
        ..Props::with_config(config)
    };
    let options = ViewerOptions {
        anim_delay: Duration::from_millis(5),
        ..ViewerOptions::default()
    };
    AppState::new(props, options, LegendRenderer::default())
}

fn created(log: &CallLog) -> Vec<LayerSettings> {
    calls(log)
        .into_iter()
        .filter_map(|c| match c {
            Call::Create(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn overlays(state: &AppState) -> Vec<String> {
    state
        .controls()
        .iter()
        .filter(|e| e.kind == LayerControlKind::Overlay)
        .map(|e| e.name.clone())
        .collect()
}

async fn loaded(variable: &str) -> (AppState, MockServer, MockFactory, CallLog) {
    let log = CallLog::default();
    let factory = MockFactory { log: log.clone() };
    let server = MockServer::new();
    let mut state = new_state();
    state
        .fill_datasets(&server, &factory, Some("gfs.global"), Some(variable))
        .await
        .unwrap();
    (state, server, factory, log)
}

// ============================================================================
// Catalog and layer creation
// ============================================================================

#[tokio::test]
async fn test_fill_datasets_loads_default_variable() {
    let (state, _server, _factory, log) = loaded("air.temperature.at-2m").await;

    assert_eq!(
        state.datasets.values().collect::<Vec<_>>(),
        vec!["ecmwf.global", "gfs.global"]
    );
    assert_eq!(state.datasets.value(), Some("gfs.global"));
    assert_eq!(state.variables.len(), 2);
    assert_eq!(state.variables.value(), Some("air.temperature.at-2m"));

    let settings = created(&log);
    assert_eq!(settings.len(), 1);
    let source = &settings[0].data_source;
    assert_eq!(source.server_uri, "https://tiles.example.com/data/");
    assert_eq!(source.mask_server_uri, "https://tiles.example.com/mask/{z}/{x}/{y}");
    assert_eq!(source.dataset, "gfs.global");
    assert_eq!(source.variables, vec!["air.temperature.at-2m"]);
    assert_eq!(source.name, "gfs.global/air.temperature.at-2m");
    assert_eq!(source.style_name, "air.temperature.at-2m");
    assert_eq!(settings[0].options.opacity, 1.0);

    assert_eq!(overlays(&state), vec!["gfs.global/air.temperature.at-2m"]);
}

#[tokio::test]
async fn test_layers_receive_unit_conversions() {
    let config = AppConfig::from_json(&config_json("https://tiles.example.com/data/")).unwrap();
    let mut props = Props::with_config(config);
    props.units.insert(
        "C".to_string(),
        UnitConversion::Affine("K".to_string(), 1.0, 273.15),
    );
    props
        .units
        .insert("knot".to_string(), UnitConversion::Scaled("m/s".to_string(), 0.514444));
    let expected = props.units.clone();
    let mut state = AppState::new(props, ViewerOptions::default(), LegendRenderer::default());

    let log = CallLog::default();
    let factory = MockFactory { log: log.clone() };
    state
        .fill_datasets(&MockServer::new(), &factory, Some("gfs.global"), None)
        .await
        .unwrap();

    let settings = created(&log);
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].units, expected);
}

#[tokio::test]
async fn test_first_load_requests_current_time() {
    let (state, _server, _factory, log) = loaded("air.temperature.at-2m").await;

    let times: Vec<_> = calls(&log)
        .into_iter()
        .filter(|c| matches!(c, Call::SetTime(_)))
        .collect();
    assert_eq!(times.len(), 1);
    assert!(matches!(times[0], Call::SetTime(TimeRequest::Instant(_))));

    assert_eq!(state.times.len(), 3);
    assert_eq!(state.times.value(), Some(TIMES[2]));
    assert_eq!(state.layer().unwrap().time(), TIMES[2]);
}

#[tokio::test]
async fn test_vector_variable_uses_both_components() {
    let (state, _server, _factory, log) = loaded("wind.speed.eastward.at-10m").await;

    let settings = created(&log);
    let source = &settings[0].data_source;
    assert_eq!(
        source.variables,
        vec!["wind.speed.eastward.at-10m", "wind.speed.northward.at-10m"]
    );
    assert_eq!(source.name, "gfs.global/wind.speed.vector.at-10m");

    // "wind" maps to an existing style and to a missing one
    let styles: Vec<_> = state
        .style_select
        .options()
        .iter()
        .map(|o| (o.value.as_str(), o.label.as_str()))
        .collect();
    assert_eq!(
        styles,
        vec![("Wind Speed", "Wind Speed"), ("base", "base"), ("custom", "custom")]
    );
}

#[tokio::test]
async fn test_fetch_failure_leaves_state_unchanged() {
    let log = CallLog::default();
    let factory = MockFactory { log: log.clone() };
    let mut state = new_state();

    state
        .fill_datasets(&MockServer::down(), &factory, Some("gfs.global"), None)
        .await
        .unwrap();

    assert!(state.datasets.is_empty());
    assert!(state.layer().is_none());
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn test_dataset_change_keeps_variable() {
    let (mut state, server, factory, log) = loaded("air.temperature.at-2m").await;

    state.datasets.set_value("ecmwf.global");
    state.on_dataset_change(&server, &factory, None).await.unwrap();

    assert_eq!(state.variables.value(), Some("air.temperature.at-2m"));
    let settings = created(&log);
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[1].data_source.name, "ecmwf.global/air.temperature.at-2m");
}

#[tokio::test]
async fn test_variable_change_replaces_layer_and_keeps_time() {
    let (mut state, _server, factory, log) = loaded("air.temperature.at-2m").await;
    state.on_time_change(TIMES[1]).await.unwrap();

    state.variables.set_value("wind.speed.eastward.at-10m");
    state.on_variable_change(&factory).await.unwrap();

    assert_eq!(overlays(&state), vec!["gfs.global/wind.speed.vector.at-10m"]);
    assert_eq!(
        calls(&log).last(),
        Some(&Call::SetTime(TimeRequest::Step(TIMES[1].to_string())))
    );
    assert_eq!(state.times.value(), Some(TIMES[1]));
}

// ============================================================================
// Styles and legend
// ============================================================================

#[tokio::test]
async fn test_mapped_style_applied_and_legend_drawn() {
    let (state, _server, _factory, log) = loaded("air.temperature.at-2m").await;

    assert_eq!(state.style_select.value(), Some("temper2m"));
    assert_eq!(state.style_select.label(), Some("Temperature"));
    assert_eq!(state.layer().unwrap().style().name, "Temperature");
    assert_eq!(state.editor.name, "Temperature");
    assert_eq!(state.editor.units, "C");

    // Legend data is requested for the canvas width minus label room
    assert!(calls(&log).contains(&Call::LegendData(250)));
    assert_eq!(state.legend().pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(state.legend().pixel(1, 1), Some([0x88, 0x88, 0x88, 255]));
}

#[tokio::test]
async fn test_invalid_custom_style_shows_message() {
    let (mut state, _server, _factory, log) = loaded("air.temperature.at-2m").await;

    assert!(state
        .on_editor_change(EditorChange::AddDegrees("999".to_string()))
        .is_err());
    state.style_select.set_value("custom");
    state.on_style_change().unwrap();

    // Canvas cleared to transparent, layer style untouched
    assert_eq!(state.legend().pixel(0, 0), Some([0, 0, 0, 0]));
    assert!(!calls(&log).contains(&Call::SetStyle("custom".to_string())));
    assert_eq!(state.layer().unwrap().style().name, "Temperature");
}

#[tokio::test]
async fn test_editor_change_sets_custom_style() {
    let (mut state, _server, _factory, log) = loaded("air.temperature.at-2m").await;

    state
        .on_editor_change(EditorChange::Name("My Temperature".to_string()))
        .unwrap();

    assert_eq!(calls(&log).last(), Some(&Call::SetStyle("custom".to_string())));
    assert_eq!(state.styles().get("custom").unwrap().name, "My Temperature");
    assert_eq!(state.layer().unwrap().style().units, "C");

    state.style_select.set_value("custom");
    state.on_style_change().unwrap();
    assert_eq!(state.editor.name, "My Temperature");
    assert_eq!(state.legend().pixel(0, 0), Some([255, 255, 255, 255]));
}

// ============================================================================
// Time and animation
// ============================================================================

#[tokio::test]
async fn test_play_steps_wrap_around() {
    let (mut state, _server, _factory, log) = loaded("air.temperature.at-2m").await;
    state.times.set_value(TIMES[1]);

    assert!(state.start_play());
    assert_eq!(state.play_state(), PlayState::Playing);
    assert_eq!(calls(&log).last(), Some(&Call::AnimationMode(Some(2))));

    let delay = state.next_time_step().await.unwrap().unwrap();
    assert!(delay <= Duration::from_millis(5));
    assert_eq!(state.layer().unwrap().time(), TIMES[1]);
    assert_eq!(state.times.value(), Some(TIMES[2]));

    state.next_time_step().await.unwrap();
    assert_eq!(state.layer().unwrap().time(), TIMES[2]);
    assert_eq!(state.times.value(), Some(TIMES[0]));

    state.stop_play().await;
    assert_eq!(calls(&log).last(), Some(&Call::AnimationMode(None)));
    assert!(state.next_time_step().await.unwrap().is_none());
}

#[tokio::test]
async fn test_time_change_stops_play() {
    let (mut state, _server, _factory, log) = loaded("air.temperature.at-2m").await;
    state.start_play();

    state.on_time_change(TIMES[0]).await.unwrap();

    assert_eq!(state.play_state(), PlayState::Stopped);
    assert!(calls(&log).contains(&Call::AnimationMode(None)));
    assert_eq!(state.times.value(), Some(TIMES[0]));
}

#[tokio::test]
async fn test_play_without_layer() {
    let mut state = new_state();
    assert!(!state.start_play());
    assert!(state.next_time_step().await.unwrap().is_none());
}

#[tokio::test]
async fn test_animation_driver_stops_with_play() {
    let (mut state, _server, _factory, log) = loaded("air.temperature.at-2m").await;
    state.start_play();
    let state = Arc::new(Mutex::new(state));

    let handle = spawn_animation(state.clone());
    tokio::time::sleep(Duration::from_millis(40)).await;
    state.lock().await.stop_play().await;

    let steps = handle.await.unwrap().unwrap();
    assert!(steps >= 1);
    let step_times = calls(&log)
        .iter()
        .filter(|c| matches!(c, Call::SetTime(TimeRequest::Step(_))))
        .count();
    assert_eq!(step_times as u64, steps);
}

// ============================================================================
// Hold, clear and info
// ============================================================================

#[tokio::test]
async fn test_hold_then_clear() {
    let (mut state, _server, factory, log) = loaded("air.temperature.at-2m").await;

    assert_eq!(state.hold().await, HOLD_MESSAGE);
    assert!(state.layer().is_none());
    assert_eq!(state.held_count(), 1);
    assert_eq!(overlays(&state).len(), 1);

    // Handlers without a layer are no-ops
    state.on_style_change().unwrap();
    state.on_time_change(TIMES[0]).await.unwrap();

    state.on_variable_change(&factory).await.unwrap();
    assert_eq!(overlays(&state).len(), 2);
    let panel = state.update_info_panel(Some(LatLng::new(-41.0, 174.5))).to_string();
    assert_eq!(panel.lines().count(), 3);

    state.clear(&factory).await.unwrap();
    assert_eq!(state.held_count(), 0);
    assert!(state.layer().is_some());
    assert_eq!(overlays(&state).len(), 1);
    assert_eq!(created(&log).len(), 3);
}

#[tokio::test]
async fn test_info_panel_remembers_position() {
    let (mut state, _server, _factory, _log) = loaded("air.temperature.at-2m").await;
    assert_eq!(state.update_info_panel(None), "");

    let position = LatLng::new(-41.25, 174.75);
    state.update_info_panel(Some(position));
    state.on_time_change(TIMES[1]).await.unwrap();

    let panel = state.info_panel();
    assert!(panel.starts_with("LatLng(-41.25, 174.75)\n"));
    assert!(panel.contains(
        "[#336699] gfs.global/air.temperature.at-2m=12.50 C (-5.00, 30.00), time: 2024-01-01T03:00:00Z"
    ));
}

#[tokio::test]
async fn test_popup_info() {
    let (state, _server, _factory, _log) = loaded("air.temperature.at-2m").await;

    let popup = state.popup_info(LatLng::new(-41.0, 174.0));
    assert!(popup.contains("(in style Units = 12.5 C)"));
    assert!(popup.contains("(in data Units = 285.65 K)"));
    assert!(popup.contains("(instance:2024-01-01T00:00:00Z)"));
    assert!(popup.contains("(tilePoint:3,4)"));
    assert!(popup.ends_with("LatLng(-41, 174)"));
}
