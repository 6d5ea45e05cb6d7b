use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// An ordered palette of at most 256 RGBA entries.
///
/// The entry order is stable once computed. The GIF color table length is
/// the entry count rounded up to the next power of two (minimum 2), with
/// unused trailing slots padded black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<rgb::RGBA<u8>>,
}

impl Palette {
    pub fn from_colors(entries: Vec<rgb::RGBA<u8>>) -> Self {
        debug_assert!(entries.len() <= 256);
        Self { entries }
    }

    pub fn entries(&self) -> &[rgb::RGBA<u8>] {
        &self.entries
    }

    /// Number of real (unpadded) palette entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded color table length: next power of two, at least 2.
    pub fn table_len(&self) -> usize {
        self.entries.len().max(2).next_power_of_two()
    }

    /// Bits needed to index the encoded table (1..=8).
    pub fn bit_size(&self) -> u8 {
        self.table_len().trailing_zeros() as u8
    }

    /// LZW minimum code size for the raster stream (at least 2 per GIF89a).
    pub fn min_code_size(&self) -> u8 {
        self.bit_size().max(2)
    }

    /// Color table bytes: RGB triples for each entry, trailing slots black.
    pub fn table_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.table_len() * 3);
        for e in &self.entries {
            bytes.extend_from_slice(&[e.r, e.g, e.b]);
        }
        bytes.resize(self.table_len() * 3, 0);
        bytes
    }

    /// Index of the entry minimizing squared Euclidean RGB distance.
    ///
    /// Alpha is excluded from the metric. On exact ties the
    /// first-encountered (lowest) index wins.
    pub fn nearest(&self, r: i32, g: i32, b: i32) -> u8 {
        let mut best = 0usize;
        let mut best_dist = i64::MAX;
        for (i, e) in self.entries.iter().enumerate() {
            let dr = (e.r as i32 - r) as i64;
            let dg = (e.g as i32 - g) as i64;
            let db = (e.b as i32 - b) as i64;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best as u8
    }
}

/// A nearest-color lookup cache for one mapping pass.
///
/// Keyed by exact RGB triple, so it never changes the result versus an
/// uncached lookup. Owned by the caller and discarded at the end of the
/// pass; there is deliberately no process-wide instance.
#[derive(Debug, Default)]
pub struct NearestCache {
    map: BTreeMap<u32, u8>,
}

impl NearestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nearest(&mut self, palette: &Palette, r: u8, g: u8, b: u8) -> u8 {
        let key = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        match self.map.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = palette.nearest(r as i32, g as i32, b as i32);
                self.map.insert(key, idx);
                idx
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rgba(r: u8, g: u8, b: u8) -> rgb::RGBA<u8> {
        rgb::RGBA { r, g, b, a: 255 }
    }

    #[test]
    fn table_len_rounds_to_power_of_two() {
        assert_eq!(Palette::from_colors(vec![rgba(0, 0, 0)]).table_len(), 2);
        let pal3 = Palette::from_colors(vec![rgba(0, 0, 0); 3]);
        assert_eq!(pal3.table_len(), 4);
        assert_eq!(pal3.bit_size(), 2);
        let pal5 = Palette::from_colors(vec![rgba(0, 0, 0); 5]);
        assert_eq!(pal5.table_len(), 8);
        assert_eq!(pal5.bit_size(), 3);
        let pal256 = Palette::from_colors(vec![rgba(0, 0, 0); 256]);
        assert_eq!(pal256.table_len(), 256);
        assert_eq!(pal256.bit_size(), 8);
    }

    #[test]
    fn table_bytes_padded_black() {
        let pal = Palette::from_colors(vec![rgba(1, 2, 3), rgba(4, 5, 6), rgba(7, 8, 9)]);
        let bytes = pal.table_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..9], &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(&bytes[9..], &[0, 0, 0]);
    }

    #[test]
    fn min_code_size_floor_is_two() {
        let pal = Palette::from_colors(vec![rgba(0, 0, 0), rgba(255, 255, 255)]);
        assert_eq!(pal.bit_size(), 1);
        assert_eq!(pal.min_code_size(), 2);
    }

    #[test]
    fn nearest_finds_global_minimum() {
        let pal = Palette::from_colors(vec![
            rgba(0, 0, 0),
            rgba(255, 0, 0),
            rgba(0, 255, 0),
            rgba(255, 255, 255),
        ]);
        assert_eq!(pal.nearest(250, 5, 5), 1);
        assert_eq!(pal.nearest(10, 10, 10), 0);
        assert_eq!(pal.nearest(200, 200, 200), 3);
    }

    #[test]
    fn nearest_tie_takes_lowest_index() {
        // 100 is equidistant from 0 and 200
        let pal = Palette::from_colors(vec![rgba(0, 0, 0), rgba(200, 0, 0)]);
        assert_eq!(pal.nearest(100, 0, 0), 0);
    }

    #[test]
    fn nearest_ignores_alpha() {
        let pal = Palette::from_colors(vec![
            rgb::RGBA {
                r: 10,
                g: 10,
                b: 10,
                a: 0,
            },
            rgba(240, 240, 240),
        ]);
        assert_eq!(pal.nearest(0, 0, 0), 0);
    }

    #[test]
    fn cache_matches_uncached_lookup() {
        let pal = Palette::from_colors(vec![rgba(0, 0, 0), rgba(128, 128, 128), rgba(255, 255, 255)]);
        let mut cache = NearestCache::new();
        for v in (0u8..=255).step_by(17) {
            let cached = cache.nearest(&pal, v, v, v);
            assert_eq!(cached, pal.nearest(v as i32, v as i32, v as i32));
            // Second lookup hits the cache and must agree
            assert_eq!(cache.nearest(&pal, v, v, v), cached);
        }
    }
}
