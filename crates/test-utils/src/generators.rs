//! Synthetic palettes and pixel inspection helpers.

/// Creates a palette of `size` distinct opaque colors.
///
/// Red ramps up across the palette and blue ramps down; green carries the
/// high bits of the index so every entry is unique and never zero.
///
/// ```
/// use test_utils::ramp_palette;
///
/// let palette = ramp_palette(300);
/// assert_eq!(palette.len(), 300);
/// assert!(palette.iter().all(|&c| c >> 24 == 0xff));
/// ```
pub fn ramp_palette(size: usize) -> Vec<u32> {
    (0..size)
        .map(|i| {
            let r = (i % 256) as u32;
            let g = (i / 256) as u32 & 0xff;
            let b = 255 - (i % 256) as u32;
            0xff00_0000 | (b << 16) | (g << 8) | r
        })
        .collect()
}

/// Pixels of a packed buffer that differ from `background`, as `(x, y, color)`.
pub fn painted_pixels(data: &[u32], width: usize, background: u32) -> Vec<(usize, usize, u32)> {
    data.iter()
        .enumerate()
        .filter(|(_, &c)| c != background)
        .map(|(i, &c)| (i % width, i / width, c))
        .collect()
}

/// Column `x` of a packed buffer, top to bottom.
pub fn column(data: &[u32], width: usize, x: usize) -> Vec<u32> {
    data.iter().skip(x).step_by(width).copied().collect()
}
