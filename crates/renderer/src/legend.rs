//! Legend rasterization.
//!
//! A legend is a horizontal color bar built from a layer's palette, with
//! optional triangles marking values below the minimum and above the maximum,
//! labeled ticks, a title and a thin border:
//!
//! ```text
//!  +--------------------------------------+
//!  |  <|||||||||||||||||||||||||||||>     |
//!  |    |      |      |      |            |
//!  |    0      10     20     30           |
//!  |  Temperature (C)                     |
//!  +--------------------------------------+
//! ```
//!
//! Layout is derived from the canvas height only. The bar and triangles are
//! written into a packed buffer first, blitted once, and then ticks, labels,
//! title and border are stroked on the canvas.

use image::Rgba;
use serde::{Deserialize, Serialize};
use tracing::debug;

use wx_common::{WxError, WxResult};

use crate::canvas::{LegendCanvas, PackedImage, OPAQUE_WHITE};
use crate::text::LabelFont;

/// Left margin of the legend graphics.
pub const START_X: usize = 2;

/// Top margin of the legend graphics.
pub const START_Y: usize = 2;

/// Tick label size in pixels.
pub const TICK_FONT_PX: f32 = 8.0;

/// Title size in pixels.
pub const TITLE_FONT_PX: f32 = 12.0;

/// Left edge of the title.
pub const TITLE_X: i32 = 13;

/// Width reserved for labels past the bar end when asking a layer for legend data.
pub const LABEL_ALLOWANCE: u32 = 50;

const TICK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BORDER_COLOR: Rgba<u8> = Rgba([0x88, 0x88, 0x88, 255]);

/// A labeled point on the legend scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    /// Offset into the palette, in pixels
    pub pos: usize,
    pub data_string: String,
}

/// Color scale summary produced by a tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Packed `0xAABBGGRR` colors, one per bar column
    pub colors: Vec<u32>,
    pub size: usize,
    pub show_below_min: bool,
    pub show_above_max: bool,
    #[serde(default)]
    pub ticks: Vec<Tick>,
    #[serde(default)]
    pub units: String,
}

impl Legend {
    pub fn from_json(json: &str) -> WxResult<Self> {
        serde_json::from_str(json).map_err(|e| WxError::JsonError(format!("legend: {}", e)))
    }

    /// Title line: `"<styleName> (<units>)"`.
    pub fn title(&self, style_name: &str) -> String {
        format!("{} ({})", style_name, self.units)
    }

    /// First palette entry, zero when absent.
    fn first_color(&self) -> u32 {
        self.colors.first().copied().unwrap_or(0)
    }

    /// Last palette entry, zero when absent.
    fn last_color(&self) -> u32 {
        self.colors.last().copied().unwrap_or(0)
    }
}

/// Geometry shared by the raster and stroke phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendLayout {
    pub width: usize,
    pub height: usize,
    /// Height of the color bar
    pub half_height: usize,
    /// Width of an overflow triangle
    pub triangle_size: usize,
}

impl LegendLayout {
    pub fn new(width: u32, height: u32) -> Self {
        let half_height = (16 + height as usize) >> 2;
        Self {
            width: width as usize,
            height: height as usize,
            half_height,
            triangle_size: half_height >> 1,
        }
    }

    /// Linear index of the graphics origin.
    fn start_xy(&self) -> usize {
        START_X + self.width * START_Y
    }

    /// Top-left corner of the color bar.
    pub fn bar_origin(&self) -> (usize, usize) {
        (START_X + self.triangle_size, START_Y + 1)
    }

    /// Column of the tick stroke for a palette offset.
    pub fn tick_x(&self, pos: usize) -> usize {
        pos + self.triangle_size + START_X + 1
    }
}

/// Rasterize the bar and overflow triangles into a fresh white buffer.
///
/// A triangle is skipped when its palette entry is zero. The whole bar is
/// skipped when the first palette entry is zero. Writes past the end of the
/// buffer are dropped.
pub fn rasterize(legend: &Legend, width: u32, height: u32) -> PackedImage {
    let layout = LegendLayout::new(width, height);
    let mut im = PackedImage::filled(width, height, OPAQUE_WHITE);

    let w = layout.width;
    let tr = layout.triangle_size;
    let start_xy = layout.start_xy();

    if legend.show_below_min {
        let c = legend.first_color();
        if c != 0 {
            for x in 0..tr {
                for y in tr..tr + x {
                    im.put(start_xy + x + y * w, c);
                    im.put(start_xy + x + (tr * 2 - y) * w, c);
                }
            }
        }
    }

    if legend.first_color() != 0 {
        for x in 0..legend.size {
            let c = legend.colors.get(x).copied().unwrap_or(0);
            for y in 0..layout.half_height {
                im.put(START_X + x + tr + (y + START_Y + 1) * w, c);
            }
        }
    }

    if legend.show_above_max {
        let c = legend.last_color();
        if c != 0 {
            let right = start_xy + tr * 2 + legend.size;
            for x in 0..=tr {
                for y in tr..tr + x {
                    im.put(right - x + y * w, c);
                    im.put(right - x + (tr * 2 - y) * w, c);
                }
            }
        }
    }

    im
}

/// Draws legends and messages on a canvas.
#[derive(Debug, Default)]
pub struct LegendRenderer {
    font: LabelFont,
}

impl LegendRenderer {
    pub fn new(font: LabelFont) -> Self {
        Self { font }
    }

    /// Draw a complete legend, replacing the canvas contents.
    pub fn draw(&self, canvas: &mut LegendCanvas, legend: &Legend, style_name: &str) {
        let (width, height) = (canvas.width(), canvas.height());
        let layout = LegendLayout::new(width, height);
        debug!(
            width,
            height,
            size = legend.size,
            ticks = legend.ticks.len(),
            "Drawing legend"
        );

        canvas.blit(&rasterize(legend, width, height));

        let label_baseline = (layout.half_height + 11) as i32;
        for tick in &legend.ticks {
            let x = layout.tick_x(tick.pos) as i32;
            canvas.stroke_vertical(x, (START_Y + 3) as i32, layout.half_height as i32, TICK_COLOR);
            self.font.draw_text(
                canvas.image_mut(),
                &tick.data_string,
                x,
                label_baseline,
                TICK_FONT_PX,
                TEXT_COLOR,
            );
        }

        let title = legend.title(style_name);
        self.font.draw_text(
            canvas.image_mut(),
            &title,
            TITLE_X,
            height as i32 - 5,
            TITLE_FONT_PX,
            TEXT_COLOR,
        );

        if width >= 4 && height >= 3 {
            canvas.stroke_rect(1, 1, width - 3, height - 2, BORDER_COLOR);
        }
    }

    /// Clear the canvas and show a one-line message in place of a legend.
    pub fn draw_message(&self, canvas: &mut LegendCanvas, message: &str) {
        let height = canvas.height();
        canvas.clear();
        self.font.draw_text(
            canvas.image_mut(),
            message,
            10,
            (height / 2) as i32,
            (height / 2) as f32,
            TEXT_COLOR,
        );
    }

    /// Draw a legend onto a new canvas.
    pub fn render(&self, legend: &Legend, width: u32, height: u32, style_name: &str) -> LegendCanvas {
        let mut canvas = LegendCanvas::new(width, height);
        self.draw(&mut canvas, legend, style_name);
        canvas
    }
}
