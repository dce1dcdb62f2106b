//! Common test fixtures.
//!
//! Legends are provided as JSON in the shape the tile layer produces, so tests
//! parse them through the same path as real data.

/// Opaque red, packed `0xAABBGGRR`.
pub const RED: u32 = 0xff00_00ff;

/// Opaque green, packed `0xAABBGGRR`.
pub const GREEN: u32 = 0xff00_ff00;

/// Two-color legend with both overflow triangles and one tick (m/s).
pub const TWO_COLOR_LEGEND: &str = r#"{
    "colors": [4278190335, 4278255360],
    "size": 2,
    "showBelowMin": true,
    "showAboveMax": true,
    "ticks": [{"pos": 0, "dataString": "0"}],
    "units": "m/s"
}"#;

/// Build a legend JSON document.
pub fn legend_json(
    colors: &[u32],
    show_below_min: bool,
    show_above_max: bool,
    ticks: &[(usize, &str)],
    units: &str,
) -> String {
    let colors: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
    let ticks: Vec<String> = ticks
        .iter()
        .map(|(pos, label)| format!(r#"{{"pos":{},"dataString":"{}"}}"#, pos, label))
        .collect();
    format!(
        r#"{{"colors":[{}],"size":{},"showBelowMin":{},"showAboveMax":{},"ticks":[{}],"units":"{}"}}"#,
        colors.join(","),
        colors.len(),
        show_below_min,
        show_above_max,
        ticks.join(","),
        units
    )
}

/// Minimal `config.json` pointing at `data_server`.
pub fn config_json(data_server: &str) -> String {
    format!(
        r#"{{
    "dataServer": "{}",
    "ext": "png",
    "varToStyleMap": [
        ["air\\.temperature", "temper2m"],
        ["wind", "Wind Speed"],
        ["wind", "missing-style"]
    ]
}}"#,
        data_server
    )
}

/// `styles.json` with the styles referenced by [`config_json`].
pub const STYLES_JSON: &str = r#"{
    "temper2m": {"name": "Temperature", "units": "C", "showBelowMin": false},
    "Wind Speed": {"name": "Wind Speed", "units": "knot", "vectorType": "barbs"}
}"#;
