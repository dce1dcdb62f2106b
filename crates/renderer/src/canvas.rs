//! Pixel surfaces used by the legend renderer.
//!
//! `PackedImage` is the raster-phase buffer: one `u32` per pixel, laid out
//! like a browser `Uint32Array` over RGBA bytes on a little-endian host, so a
//! packed value reads `0xAABBGGRR`. `LegendCanvas` is the presented surface
//! that receives one blit of a packed buffer followed by strokes and text.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use wx_common::WxResult;

use crate::png::encode_png;

/// Opaque white, the `-1` fill of a fresh legend buffer.
pub const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

/// Pack RGBA bytes into the `0xAABBGGRR` layout.
#[inline(always)]
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

/// Split a packed value back into RGBA bytes.
#[inline(always)]
pub fn unpack_rgba(packed: u32) -> [u8; 4] {
    packed.to_le_bytes()
}

/// Linear buffer of packed pixels with top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl PackedImage {
    /// Buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            data: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Write at a linear index. Indices past the end are dropped, as typed arrays do.
    #[inline]
    pub fn put(&mut self, index: usize, color: u32) {
        if let Some(px) = self.data.get_mut(index) {
            *px = color;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(x + y * self.width).copied()
    }
}

/// The drawing surface a legend is presented on.
#[derive(Debug, Clone)]
pub struct LegendCanvas {
    image: RgbaImage,
}

impl LegendCanvas {
    /// Transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// Copy a packed buffer onto the canvas at the origin, replacing what is there.
    pub fn blit(&mut self, src: &PackedImage) {
        let w = (src.width() as u32).min(self.image.width());
        let h = (src.height() as u32).min(self.image.height());
        for y in 0..h {
            for x in 0..w {
                if let Some(c) = src.get(x as usize, y as usize) {
                    self.image.put_pixel(x, y, Rgba(unpack_rgba(c)));
                }
            }
        }
    }

    /// One-pixel vertical stroke from `y0` to `y1` inclusive.
    pub fn stroke_vertical(&mut self, x: i32, y0: i32, y1: i32, color: Rgba<u8>) {
        draw_line_segment_mut(
            &mut self.image,
            (x as f32, y0 as f32),
            (x as f32, y1 as f32),
            color,
        );
    }

    /// One-pixel rectangle outline. Empty rectangles draw nothing.
    pub fn stroke_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        if width == 0 || height == 0 {
            return;
        }
        draw_hollow_rect_mut(&mut self.image, Rect::at(x, y).of_size(width, height), color);
    }

    /// Encode the canvas as PNG.
    pub fn to_png(&self) -> WxResult<Vec<u8>> {
        encode_png(&self.image)
    }
}
