use alloc::vec;
use alloc::vec::Vec;

use crate::palette::{NearestCache, Palette};
use crate::QuantizeMethod;

/// A frame mapped onto a palette: one index per pixel, row-major.
#[derive(Debug, Clone)]
pub struct IndexedFrame {
    pub width: usize,
    pub height: usize,
    pub indices: Vec<u8>,
}

/// 4x4 Bayer threshold matrix for ordered dithering.
#[rustfmt::skip]
const BAYER_4: [[i32; 4]; 4] = [
    [ 0,  8,  2, 10],
    [12,  4, 14,  6],
    [ 3, 11,  1,  9],
    [15,  7, 13,  5],
];

/// Positional perturbation for ordered dithering, centered on zero.
/// Range is [-30, +30] in steps of 4.
fn bayer_offset(x: usize, y: usize) -> i32 {
    (BAYER_4[y % 4][x % 4] * 2 - 15) * 2
}

/// Floyd-Steinberg error shares: forward 7/16, below-left 3/16, below 5/16,
/// below-right 1/16. Division truncates toward zero, so the distributed sum
/// never exceeds the error magnitude.
#[inline]
fn fs_shares(err: i32) -> [i32; 4] {
    [err * 7 / 16, err * 3 / 16, err * 5 / 16, err / 16]
}

/// Map a pixel buffer onto `palette` using the given quantize method.
///
/// Degenerate frames (zero width or height) produce an empty result rather
/// than an error. All transient state (error rows, lookup cache) lives for
/// this call only.
pub fn map_frame(
    pixels: &[rgb::RGBA<u8>],
    width: usize,
    height: usize,
    palette: &Palette,
    method: QuantizeMethod,
) -> IndexedFrame {
    if width == 0 || height == 0 || palette.is_empty() {
        return IndexedFrame {
            width,
            height,
            indices: Vec::new(),
        };
    }

    let indices = match method {
        QuantizeMethod::Threshold | QuantizeMethod::MedianCut => remap_plain(pixels, palette),
        QuantizeMethod::Ordered => remap_ordered(pixels, width, palette),
        QuantizeMethod::Diffuse | QuantizeMethod::MedianCutFloyd => {
            remap_floyd(pixels, width, height, palette)
        }
    };

    IndexedFrame {
        width,
        height,
        indices,
    }
}

/// Direct nearest-color mapping, one lookup per pixel.
fn remap_plain(pixels: &[rgb::RGBA<u8>], palette: &Palette) -> Vec<u8> {
    let mut cache = NearestCache::new();
    pixels
        .iter()
        .map(|p| cache.nearest(palette, p.r, p.g, p.b))
        .collect()
}

/// Nearest-color mapping after a fixed positional threshold perturbation.
fn remap_ordered(pixels: &[rgb::RGBA<u8>], width: usize, palette: &Palette) -> Vec<u8> {
    pixels
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let offset = bayer_offset(i % width, i / width);
            palette.nearest(
                p.r as i32 + offset,
                p.g as i32 + offset,
                p.b as i32 + offset,
            )
        })
        .collect()
}

/// Floyd-Steinberg error diffusion.
///
/// Pixels are processed row-major, left to right. Two error rows per channel
/// (current and next) carry the accumulated diffusion; the adjusted channel
/// values are not clamped before matching. After each row the arrays swap
/// and the fresh next row is zeroed.
fn remap_floyd(
    pixels: &[rgb::RGBA<u8>],
    width: usize,
    height: usize,
    palette: &Palette,
) -> Vec<u8> {
    let mut curr = [vec![0i32; width], vec![0i32; width], vec![0i32; width]];
    let mut next = [vec![0i32; width], vec![0i32; width], vec![0i32; width]];

    let mut indices = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            let p = pixels[y * width + x];
            let adj = [
                p.r as i32 + curr[0][x],
                p.g as i32 + curr[1][x],
                p.b as i32 + curr[2][x],
            ];

            let idx = palette.nearest(adj[0], adj[1], adj[2]);
            indices.push(idx);

            let e = palette.entries()[idx as usize];
            let errs = [
                adj[0] - e.r as i32,
                adj[1] - e.g as i32,
                adj[2] - e.b as i32,
            ];

            for (c, &err) in errs.iter().enumerate() {
                let [fwd, below_left, below, below_right] = fs_shares(err);
                if x + 1 < width {
                    curr[c][x + 1] += fwd;
                    next[c][x + 1] += below_right;
                }
                if x > 0 {
                    next[c][x - 1] += below_left;
                }
                next[c][x] += below;
            }
        }

        core::mem::swap(&mut curr, &mut next);
        for row in &mut next {
            row.iter_mut().for_each(|v| *v = 0);
        }
    }

    indices
}
