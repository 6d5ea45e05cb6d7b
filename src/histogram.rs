use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Upper bound on distinct histogram colors before channel precision is
/// reduced to keep the box set tractable.
pub const MAX_DISTINCT: usize = 65_536;

/// A color histogram: distinct RGBA colors mapped to pixel counts.
///
/// Entries are kept in first-occurrence order. That order is the pinned,
/// reproducible iteration order every downstream tie-break (split-axis
/// selection, nearest-color lookups) is allowed to depend on.
#[derive(Debug, Clone)]
pub struct Histogram {
    entries: Vec<(rgb::RGBA<u8>, u32)>,
    total: u64,
    /// Maximum channel value the entries are expressed in (255 unless
    /// precision was reduced to fit under [`MAX_DISTINCT`]).
    max_value: u8,
}

fn pack(p: rgb::RGBA<u8>) -> u32 {
    (p.r as u32) << 24 | (p.g as u32) << 16 | (p.b as u32) << 8 | p.a as u32
}

impl Histogram {
    /// Count distinct colors in a pixel buffer, first-occurrence ordered.
    pub fn build(pixels: &[rgb::RGBA<u8>]) -> Self {
        Self::build_scaled(pixels, 255)
    }

    /// Count distinct colors with each channel rescaled to `0..=max_value`.
    fn build_scaled(pixels: &[rgb::RGBA<u8>], max_value: u8) -> Self {
        let mut entries: Vec<(rgb::RGBA<u8>, u32)> = Vec::new();
        let mut seen: BTreeMap<u32, usize> = BTreeMap::new();

        for &p in pixels {
            let p = scale_pixel(p, max_value);
            match seen.get(&pack(p)) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    seen.insert(pack(p), entries.len());
                    entries.push((p, 1));
                }
            }
        }

        Self {
            entries,
            total: pixels.len() as u64,
            max_value,
        }
    }

    /// Build a histogram that fits under `cap` distinct colors.
    ///
    /// If the full-precision histogram is too large, the channel maximum is
    /// halved (255, 127, 63, 31, 15) and the histogram rebuilt until it fits.
    /// At a maximum of 15 the color space has at most 16^4 = 65536 cells, so
    /// the loop always terminates within the default cap.
    pub fn build_capped(pixels: &[rgb::RGBA<u8>], cap: usize) -> Self {
        let mut max_value = 255u8;
        loop {
            let hist = Self::build_scaled(pixels, max_value);
            if hist.len() <= cap || max_value <= 15 {
                if max_value < 255 {
                    log::debug!(
                        "histogram reduced to max channel value {} ({} distinct colors)",
                        max_value,
                        hist.len()
                    );
                }
                return hist;
            }
            max_value /= 2;
        }
    }

    /// Distinct colors in first-occurrence order, with pixel counts.
    pub fn entries(&self) -> &[(rgb::RGBA<u8>, u32)] {
        &self.entries
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total pixel count across all entries.
    pub fn total_pixels(&self) -> u64 {
        self.total
    }

    /// Channel maximum the entries are expressed in.
    pub fn max_value(&self) -> u8 {
        self.max_value
    }

    /// Rescale a reduced-precision channel value back to 8 bits.
    pub fn upscale_channel(&self, v: u8) -> u8 {
        if self.max_value == 255 {
            v
        } else {
            (v as u32 * 255 / self.max_value as u32) as u8
        }
    }
}

fn scale_pixel(p: rgb::RGBA<u8>, max_value: u8) -> rgb::RGBA<u8> {
    if max_value == 255 {
        return p;
    }
    let scale = |v: u8| (v as u32 * max_value as u32 / 255) as u8;
    rgb::RGBA {
        r: scale(p.r),
        g: scale(p.g),
        b: scale(p.b),
        a: scale(p.a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(r: u8, g: u8, b: u8) -> rgb::RGBA<u8> {
        rgb::RGBA { r, g, b, a: 255 }
    }

    #[test]
    fn counts_accumulate() {
        let pixels = [rgba(1, 2, 3), rgba(1, 2, 3), rgba(9, 9, 9)];
        let hist = Histogram::build(&pixels);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist.total_pixels(), 3);
        assert_eq!(hist.entries()[0], (rgba(1, 2, 3), 2));
        assert_eq!(hist.entries()[1], (rgba(9, 9, 9), 1));
    }

    #[test]
    fn first_occurrence_order() {
        let pixels = [rgba(200, 0, 0), rgba(0, 200, 0), rgba(200, 0, 0)];
        let hist = Histogram::build(&pixels);
        assert_eq!(hist.entries()[0].0, rgba(200, 0, 0));
        assert_eq!(hist.entries()[1].0, rgba(0, 200, 0));
    }

    #[test]
    fn empty_buffer() {
        let hist = Histogram::build(&[]);
        assert!(hist.is_empty());
        assert_eq!(hist.total_pixels(), 0);
    }

    #[test]
    fn capped_build_reduces_precision() {
        // 4096 distinct colors on a 16-step lattice: every precision above
        // the floor keeps them apart, so the build must walk down to
        // max_value 15 (where the lattice collapses to 15 levels per
        // channel) to satisfy the cap. Total pixel count is preserved.
        let mut pixels = Vec::new();
        for r in 0..16u16 {
            for g in 0..16u16 {
                for b in 0..16u16 {
                    pixels.push(rgba((r * 16) as u8, (g * 16) as u8, (b * 16) as u8));
                }
            }
        }
        let hist = Histogram::build_capped(&pixels, 4095);
        assert!(hist.len() <= 4095);
        assert_eq!(hist.max_value(), 15);
        assert_eq!(hist.total_pixels(), 4096);
    }

    #[test]
    fn upscale_restores_channel_extremes() {
        // Even at its coarsest precision the histogram keeps black and white
        // apart, and upscaling maps the extremes back exactly.
        let pixels = [rgba(0, 0, 0), rgba(255, 255, 255)];
        let hist = Histogram::build_scaled(&pixels, 15);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist.upscale_channel(15), 255);
        assert_eq!(hist.upscale_channel(0), 0);
    }
}
