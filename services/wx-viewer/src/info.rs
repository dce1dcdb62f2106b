//! Probe text for the info panel and click popups.

use crate::layer::{MinMax, ProbeInfo, TileLayer};

/// One info panel line: values in style units, the data range and the time.
pub fn info_line(name: &str, probe: &ProbeInfo, range: MinMax, time: &str) -> String {
    format!(
        "[{}] {}={} {} ({:.2}, {:.2}), time: {}",
        probe.hex_color,
        name,
        join_fixed(&probe.in_style_units),
        probe.style_units,
        range.min,
        range.max,
        time
    )
}

/// Detailed popup block for one layer.
pub fn popup_block(layer: &dyn TileLayer, probe: &ProbeInfo) -> String {
    format!(
        "[{}] {}\n\
         (in style Units = {} {})\n\
         (in data Units = {} {})\n\
         (time:{})\n\
         (instance:{})\n\
         (tilePoint:{},{})\n",
        probe.hex_color,
        layer.data_source().name,
        join(&probe.in_style_units),
        probe.style_units,
        join(&probe.data),
        layer.units(),
        layer.time(),
        layer.instance(),
        probe.tile_point.0,
        probe.tile_point.1
    )
}

fn join_fixed(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(",")
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_line() {
        let probe = ProbeInfo {
            hex_color: "#ff0000".to_string(),
            in_style_units: vec![3.14159, 2.0],
            style_units: "knot".to_string(),
            data: vec![1.6, 1.0],
            tile_point: (3, 4),
        };
        let range = MinMax { min: -1.0, max: 25.456 };
        assert_eq!(
            info_line("gfs.global/wind", &probe, range, "2024-01-01T00:00:00Z"),
            "[#ff0000] gfs.global/wind=3.14,2.00 knot (-1.00, 25.46), time: 2024-01-01T00:00:00Z"
        );
        assert_eq!(join(&probe.data), "1.6,1");
    }
}
