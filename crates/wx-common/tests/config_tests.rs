//! Tests for application config loading and derived values.

use std::io::Write;

use wx_common::config::variable_pattern;
use wx_common::{AppConfig, LayerControlKind, TileFormat, WxError};

const FULL_CONFIG: &str = r#"{
    "dataServer": "https://tiles.metoceanapi.com/data/",
    "ext": "png",
    "map": {"center": [-37.8, 174.8], "zoom": 5, "zoomControl": false},
    "baseLayers": [
        {"name": "osm", "URL": "https://tile.openstreetmap.org/{z}/{x}/{y}.png", "options": {"zIndex": 0}, "add": true},
        {"name": "labels", "URL": "https://labels.example.com/{z}/{x}/{y}.png", "options": {"zIndex": 5}, "add": true},
        {"name": "hidden", "URL": "https://hidden.example.com/{z}/{x}/{y}.png", "add": false},
        {"name": "plain", "URL": "https://plain.example.com/{z}/{x}/{y}.png", "add": true}
    ],
    "varToStyleMap": [
        ["air.temperature", "temper2m"],
        ["wind.speed", "Wind Speed"]
    ]
}"#;

#[test]
fn test_full_config_parses() {
    let config = AppConfig::from_json(FULL_CONFIG).unwrap();
    assert_eq!(config.ext, TileFormat::Png);
    assert_eq!(config.base_layers.len(), 4);
    assert_eq!(config.var_to_style_map.len(), 2);

    let map = config.map.as_ref().unwrap();
    assert_eq!(map.center, Some([-37.8, 174.8]));
    assert_eq!(map.zoom, Some(5.0));
}

#[test]
fn test_mask_server_uri() {
    let config = AppConfig::from_json(FULL_CONFIG).unwrap();
    assert_eq!(
        config.mask_server_uri(),
        "https://tiles.metoceanapi.com/mask/{z}/{x}/{y}"
    );

    let config = AppConfig::from_json(r#"{"dataServer":"http://host/DATA"}"#).unwrap();
    assert_eq!(config.mask_server_uri(), "http://host/mask/{z}/{x}/{y}");
}

#[test]
fn test_mask_server_uri_replaces_first_match_only() {
    let config = AppConfig::from_json(r#"{"dataServer":"http://host/data/data/"}"#).unwrap();
    assert_eq!(config.mask_server_uri(), "http://host/mask/{z}/{x}/{y}data/");
}

#[test]
fn test_layer_control_entries() {
    let config = AppConfig::from_json(FULL_CONFIG).unwrap();
    let entries = config.layer_control_entries();

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["osm", "labels", "plain"]);
    assert_eq!(entries[0].kind, LayerControlKind::Base);
    assert_eq!(entries[1].kind, LayerControlKind::Overlay);
    assert_eq!(entries[2].kind, LayerControlKind::Overlay);
}

#[test]
fn test_style_matchers_are_case_insensitive() {
    let config = AppConfig::from_json(FULL_CONFIG).unwrap();
    let matchers = config.style_matchers().unwrap();
    assert_eq!(matchers.len(), 2);
    assert!(matchers[0].0.is_match("AIR.TEMPERATURE.at-2m"));
    assert!(!matchers[1].0.is_match("air.temperature.at-2m"));

    assert!(variable_pattern("^wind").unwrap().is_match("Wind.speed"));
}

#[test]
fn test_yaml_config_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "dataServer: http://host/data/").unwrap();
    writeln!(file, "ext: png").unwrap();
    writeln!(file, "varToStyleMap:").unwrap();
    writeln!(file, "  - [\"temp\", \"temper2m\"]").unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.ext, TileFormat::Png);
    assert_eq!(config.var_to_style_map[0].1, "temper2m");
}

#[test]
fn test_missing_file_is_config_not_found() {
    let err = AppConfig::from_file("/nonexistent/props/config.json").unwrap_err();
    assert!(matches!(err, WxError::ConfigNotFound(_)));
}
