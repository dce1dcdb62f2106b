//! PNG encoding for legend canvases.
//!
//! Legends are mostly flat color: a palette strip, white background and a
//! handful of text and stroke colors. Such images fit an indexed PNG
//! (color type 3). Anti-aliased TrueType labels can push a large canvas past
//! 256 colors, in which case the encoder falls back to RGBA (color type 6).

use image::RgbaImage;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use tracing::debug;

use wx_common::{WxError, WxResult};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels before palette extraction is split across threads
const PARALLEL_THRESHOLD: usize = 4096;

type Palette = Vec<[u8; 4]>;

/// Encode a canvas, choosing indexed or RGBA output.
pub fn encode_png(image: &RgbaImage) -> WxResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let pixels = image.as_raw();

    let palette = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => {
            debug!(width, height, colors = palette.len(), "Encoding indexed PNG");
            encode_indexed(width, height, &palette, &indices)
        }
        None => {
            debug!(width, height, "Encoding RGBA PNG");
            encode_rgba(pixels, width, height)
        }
    }
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Collect unique colors per chunk in parallel, merge, then map pixels to indices.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let chunk_colors: Vec<HashSet<u32>> = pixels
        .par_chunks(chunk_pixels * 4)
        .map(|chunk| {
            let mut local = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                local.insert(pack(px));
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for key in chunk_colors.into_iter().flatten() {
        if lookup.contains_key(&key) {
            continue;
        }
        if palette.len() >= MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(key, palette.len() as u8);
        palette.push(key.to_le_bytes());
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}

/// Indexed PNG (color type 3) with a tRNS chunk when any entry is translucent.
fn encode_indexed(width: u32, height: u32, palette: &[[u8; 4]], indices: &[u8]) -> WxResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width as usize, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// RGBA PNG (color type 6).
fn encode_rgba(pixels: &[u8], width: u32, height: u32) -> WxResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width as usize * 4, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn ihdr(width: u32, height: u32, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix every row with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, rows: usize) -> WxResult<Vec<u8>> {
    if row_bytes == 0 || rows == 0 {
        return Err(WxError::RenderError("cannot encode an empty image".to_string()));
    }

    let mut raw = Vec::with_capacity(rows * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(rows) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| WxError::RenderError(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| WxError::RenderError(format!("IDAT compression failed: {}", e)))
}
