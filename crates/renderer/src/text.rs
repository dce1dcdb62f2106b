//! Label text for legends.
//!
//! A built-in 5x7 bitmap font is always available. When a TrueType font file
//! is configured it is used instead, drawn anti-aliased through `imageproc`.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::path::Path;
use tracing::debug;

use wx_common::{WxError, WxResult};

/// Glyph cell of the bitmap font: 5 columns plus 1 spacing, 7 rows.
const GLYPH_W: i32 = 5;
const GLYPH_ADVANCE: i32 = 6;
const GLYPH_H: i32 = 7;

/// Each glyph is 7 rows; the lower 5 bits of a row are pixels, MSB on the left.
/// Covers ASCII 32..=126.
#[rustfmt::skip]
const FONT_5X7: [[u8; 7]; 95] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00], // ' '
    [0x04,0x04,0x04,0x04,0x04,0x00,0x04], // '!'
    [0x0A,0x0A,0x0A,0x00,0x00,0x00,0x00], // '"'
    [0x0A,0x0A,0x1F,0x0A,0x1F,0x0A,0x0A], // '#'
    [0x04,0x0F,0x14,0x0E,0x05,0x1E,0x04], // '$'
    [0x18,0x19,0x02,0x04,0x08,0x13,0x03], // '%'
    [0x0C,0x12,0x14,0x08,0x15,0x12,0x0D], // '&'
    [0x04,0x04,0x08,0x00,0x00,0x00,0x00], // '''
    [0x02,0x04,0x08,0x08,0x08,0x04,0x02], // '('
    [0x08,0x04,0x02,0x02,0x02,0x04,0x08], // ')'
    [0x00,0x04,0x15,0x0E,0x15,0x04,0x00], // '*'
    [0x00,0x04,0x04,0x1F,0x04,0x04,0x00], // '+'
    [0x00,0x00,0x00,0x00,0x00,0x04,0x08], // ','
    [0x00,0x00,0x00,0x1F,0x00,0x00,0x00], // '-'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x04], // '.'
    [0x00,0x01,0x02,0x04,0x08,0x10,0x00], // '/'
    [0x0E,0x11,0x13,0x15,0x19,0x11,0x0E], // '0'
    [0x04,0x0C,0x04,0x04,0x04,0x04,0x0E], // '1'
    [0x0E,0x11,0x01,0x02,0x04,0x08,0x1F], // '2'
    [0x1F,0x02,0x04,0x02,0x01,0x11,0x0E], // '3'
    [0x02,0x06,0x0A,0x12,0x1F,0x02,0x02], // '4'
    [0x1F,0x10,0x1E,0x01,0x01,0x11,0x0E], // '5'
    [0x06,0x08,0x10,0x1E,0x11,0x11,0x0E], // '6'
    [0x1F,0x01,0x02,0x04,0x08,0x08,0x08], // '7'
    [0x0E,0x11,0x11,0x0E,0x11,0x11,0x0E], // '8'
    [0x0E,0x11,0x11,0x0F,0x01,0x02,0x0C], // '9'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x00], // ':'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x08], // ';'
    [0x02,0x04,0x08,0x10,0x08,0x04,0x02], // '<'
    [0x00,0x00,0x1F,0x00,0x1F,0x00,0x00], // '='
    [0x08,0x04,0x02,0x01,0x02,0x04,0x08], // '>'
    [0x0E,0x11,0x01,0x02,0x04,0x00,0x04], // '?'
    [0x0E,0x11,0x17,0x15,0x17,0x10,0x0E], // '@'
    [0x0E,0x11,0x11,0x1F,0x11,0x11,0x11], // 'A'
    [0x1E,0x11,0x11,0x1E,0x11,0x11,0x1E], // 'B'
    [0x0E,0x11,0x10,0x10,0x10,0x11,0x0E], // 'C'
    [0x1C,0x12,0x11,0x11,0x11,0x12,0x1C], // 'D'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x1F], // 'E'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x10], // 'F'
    [0x0E,0x11,0x10,0x17,0x11,0x11,0x0F], // 'G'
    [0x11,0x11,0x11,0x1F,0x11,0x11,0x11], // 'H'
    [0x0E,0x04,0x04,0x04,0x04,0x04,0x0E], // 'I'
    [0x07,0x02,0x02,0x02,0x02,0x12,0x0C], // 'J'
    [0x11,0x12,0x14,0x18,0x14,0x12,0x11], // 'K'
    [0x10,0x10,0x10,0x10,0x10,0x10,0x1F], // 'L'
    [0x11,0x1B,0x15,0x15,0x11,0x11,0x11], // 'M'
    [0x11,0x11,0x19,0x15,0x13,0x11,0x11], // 'N'
    [0x0E,0x11,0x11,0x11,0x11,0x11,0x0E], // 'O'
    [0x1E,0x11,0x11,0x1E,0x10,0x10,0x10], // 'P'
    [0x0E,0x11,0x11,0x11,0x15,0x12,0x0D], // 'Q'
    [0x1E,0x11,0x11,0x1E,0x14,0x12,0x11], // 'R'
    [0x0F,0x10,0x10,0x0E,0x01,0x01,0x1E], // 'S'
    [0x1F,0x04,0x04,0x04,0x04,0x04,0x04], // 'T'
    [0x11,0x11,0x11,0x11,0x11,0x11,0x0E], // 'U'
    [0x11,0x11,0x11,0x11,0x11,0x0A,0x04], // 'V'
    [0x11,0x11,0x11,0x15,0x15,0x1B,0x11], // 'W'
    [0x11,0x11,0x0A,0x04,0x0A,0x11,0x11], // 'X'
    [0x11,0x11,0x0A,0x04,0x04,0x04,0x04], // 'Y'
    [0x1F,0x01,0x02,0x04,0x08,0x10,0x1F], // 'Z'
    [0x0E,0x08,0x08,0x08,0x08,0x08,0x0E], // '['
    [0x00,0x10,0x08,0x04,0x02,0x01,0x00], // '\'
    [0x0E,0x02,0x02,0x02,0x02,0x02,0x0E], // ']'
    [0x04,0x0A,0x11,0x00,0x00,0x00,0x00], // '^'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x1F], // '_'
    [0x08,0x04,0x02,0x00,0x00,0x00,0x00], // '`'
    [0x00,0x00,0x0E,0x01,0x0F,0x11,0x0F], // 'a'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x1E], // 'b'
    [0x00,0x00,0x0E,0x10,0x10,0x11,0x0E], // 'c'
    [0x01,0x01,0x0D,0x13,0x11,0x11,0x0F], // 'd'
    [0x00,0x00,0x0E,0x11,0x1F,0x10,0x0E], // 'e'
    [0x06,0x09,0x08,0x1C,0x08,0x08,0x08], // 'f'
    [0x00,0x00,0x0F,0x11,0x0F,0x01,0x0E], // 'g'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x11], // 'h'
    [0x04,0x00,0x0C,0x04,0x04,0x04,0x0E], // 'i'
    [0x02,0x00,0x06,0x02,0x02,0x12,0x0C], // 'j'
    [0x10,0x10,0x12,0x14,0x18,0x14,0x12], // 'k'
    [0x0C,0x04,0x04,0x04,0x04,0x04,0x0E], // 'l'
    [0x00,0x00,0x1A,0x15,0x15,0x11,0x11], // 'm'
    [0x00,0x00,0x16,0x19,0x11,0x11,0x11], // 'n'
    [0x00,0x00,0x0E,0x11,0x11,0x11,0x0E], // 'o'
    [0x00,0x00,0x1E,0x11,0x1E,0x10,0x10], // 'p'
    [0x00,0x00,0x0D,0x13,0x0F,0x01,0x01], // 'q'
    [0x00,0x00,0x16,0x19,0x10,0x10,0x10], // 'r'
    [0x00,0x00,0x0E,0x10,0x0E,0x01,0x1E], // 's'
    [0x08,0x08,0x1C,0x08,0x08,0x09,0x06], // 't'
    [0x00,0x00,0x11,0x11,0x11,0x13,0x0D], // 'u'
    [0x00,0x00,0x11,0x11,0x11,0x0A,0x04], // 'v'
    [0x00,0x00,0x11,0x11,0x15,0x15,0x0A], // 'w'
    [0x00,0x00,0x11,0x0A,0x04,0x0A,0x11], // 'x'
    [0x00,0x00,0x11,0x11,0x0F,0x01,0x0E], // 'y'
    [0x00,0x00,0x1F,0x02,0x04,0x08,0x1F], // 'z'
    [0x02,0x04,0x04,0x08,0x04,0x04,0x02], // '{'
    [0x04,0x04,0x04,0x04,0x04,0x04,0x04], // '|'
    [0x08,0x04,0x04,0x02,0x04,0x04,0x08], // '}'
    [0x00,0x00,0x08,0x15,0x02,0x00,0x00], // '~'
];

fn glyph(c: char) -> &'static [u8; 7] {
    let code = c as u32;
    if (32..=126).contains(&code) {
        &FONT_5X7[(code - 32) as usize]
    } else {
        &FONT_5X7[('?' as u32 - 32) as usize]
    }
}

/// Font used for tick labels, titles and messages.
#[derive(Default)]
pub enum LabelFont {
    /// Built-in 5x7 pixel font, scaled by whole pixels
    #[default]
    Bitmap,
    TrueType(Font<'static>),
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::Bitmap => f.write_str("LabelFont::Bitmap"),
            LabelFont::TrueType(_) => f.write_str("LabelFont::TrueType"),
        }
    }
}

impl LabelFont {
    /// Load a TrueType font from disk.
    pub fn from_file(path: impl AsRef<Path>) -> WxResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| WxError::FontError(format!("{}: {}", path.display(), e)))?;
        let font = Self::from_bytes(bytes)?;
        debug!(path = %path.display(), "Loaded label font");
        Ok(font)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> WxResult<Self> {
        Font::try_from_vec(bytes)
            .map(LabelFont::TrueType)
            .ok_or_else(|| WxError::FontError("not a TrueType font".to_string()))
    }

    /// Integer scale of the bitmap font for a pixel size.
    fn bitmap_scale(size_px: f32) -> i32 {
        ((size_px / GLYPH_H as f32).round() as i32).max(1)
    }

    /// Horizontal extent of `text` in pixels.
    #[cfg(test)]
    fn text_width(&self, text: &str, size_px: f32) -> u32 {
        match self {
            LabelFont::Bitmap => {
                let n = text.chars().count() as i32;
                if n == 0 {
                    return 0;
                }
                let scale = Self::bitmap_scale(size_px);
                ((n - 1) * GLYPH_ADVANCE + GLYPH_W) as u32 * scale as u32
            }
            LabelFont::TrueType(font) => {
                let scale = Scale::uniform(size_px);
                font.layout(text, scale, rusttype::point(0.0, 0.0))
                    .filter_map(|g| g.pixel_bounding_box())
                    .map(|bb| bb.max.x)
                    .max()
                    .unwrap_or(0)
                    .max(0) as u32
            }
        }
    }

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    ///
    /// Pixels falling outside the image are dropped.
    pub fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: i32,
        baseline: i32,
        size_px: f32,
        color: Rgba<u8>,
    ) {
        match self {
            LabelFont::Bitmap => draw_bitmap_text(image, text, x, baseline, size_px, color),
            LabelFont::TrueType(font) => {
                let scale = Scale::uniform(size_px);
                let ascent = font.v_metrics(scale).ascent.round() as i32;
                draw_text_mut(image, color, x, baseline - ascent, scale, font, text);
            }
        }
    }
}

fn draw_bitmap_text(
    image: &mut RgbaImage,
    text: &str,
    x: i32,
    baseline: i32,
    size_px: f32,
    color: Rgba<u8>,
) {
    let scale = LabelFont::bitmap_scale(size_px);
    let top = baseline - GLYPH_H * scale;
    let (w, h) = (image.width() as i32, image.height() as i32);

    for (i, c) in text.chars().enumerate() {
        let left = x + i as i32 * GLYPH_ADVANCE * scale;
        if left >= w {
            break;
        }
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = left + col * scale + dx;
                        let py = top + row as i32 * scale + dy;
                        if px >= 0 && py >= 0 && px < w && py < h {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn ink(image: &RgbaImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == BLACK.0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_bitmap_text_sits_on_baseline() {
        let mut image = RgbaImage::new(20, 20);
        LabelFont::Bitmap.draw_text(&mut image, "1", 3, 15, 8.0, BLACK);

        let pixels = ink(&image);
        assert!(!pixels.is_empty());
        let min_y = pixels.iter().map(|p| p.1).min().unwrap();
        let max_y = pixels.iter().map(|p| p.1).max().unwrap();
        assert_eq!(min_y, 8);
        assert_eq!(max_y, 14);
        assert!(pixels.iter().all(|p| p.0 >= 3 && p.0 < 8));
    }

    #[test]
    fn test_bitmap_scale_follows_size() {
        assert_eq!(LabelFont::bitmap_scale(8.0), 1);
        assert_eq!(LabelFont::bitmap_scale(12.0), 2);
        assert_eq!(LabelFont::bitmap_scale(1.0), 1);
        assert_eq!(LabelFont::Bitmap.text_width("ab", 8.0), 11);
        assert_eq!(LabelFont::Bitmap.text_width("ab", 14.0), 22);
        assert_eq!(LabelFont::Bitmap.text_width("", 14.0), 0);
    }

    #[test]
    fn test_text_outside_image_is_clipped() {
        let mut image = RgbaImage::new(4, 4);
        LabelFont::Bitmap.draw_text(&mut image, "WWW", -2, 30, 8.0, BLACK);
        assert!(ink(&image).is_empty());
        LabelFont::Bitmap.draw_text(&mut image, "WWW", 2, 3, 8.0, BLACK);
        assert!(!ink(&image).is_empty());
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(matches!(
            LabelFont::from_bytes(vec![0, 1, 2, 3]),
            Err(WxError::FontError(_))
        ));
    }
}
