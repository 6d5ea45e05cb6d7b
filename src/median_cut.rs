use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::histogram::Histogram;

/// Color channel, in split-axis tie-break order: red wins any tie, then
/// green, then blue, then alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    fn of(self, p: rgb::RGBA<u8>) -> u8 {
        match self {
            Channel::R => p.r,
            Channel::G => p.g,
            Channel::B => p.b,
            Channel::A => p.a,
        }
    }
}

/// A splittable cluster of (color, pixel count) pairs.
///
/// Live boxes are mutually exclusive and collectively exhaustive over the
/// histogram, so the sum of box weights always equals the total pixel count.
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(rgb::RGBA<u8>, u32)>,
}

impl ColorBox {
    fn new(entries: Vec<(rgb::RGBA<u8>, u32)>) -> Self {
        Self { entries }
    }

    /// Sum of pixel counts of the members.
    fn weight(&self) -> u64 {
        self.entries.iter().map(|&(_, n)| n as u64).sum()
    }

    fn splittable(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Per-channel value range (max - min) across the members.
    fn ranges(&self) -> [u8; 4] {
        let mut min = [u8::MAX; 4];
        let mut max = [u8::MIN; 4];
        for &(c, _) in &self.entries {
            for (i, ch) in [Channel::R, Channel::G, Channel::B, Channel::A]
                .iter()
                .enumerate()
            {
                let v = ch.of(c);
                min[i] = min[i].min(v);
                max[i] = max[i].max(v);
            }
        }
        [
            max[0] - min[0],
            max[1] - min[1],
            max[2] - min[2],
            max[3] - min[3],
        ]
    }

    /// Splitting axis: the channel with the largest range, ties broken in
    /// channel order R > G > B > A.
    fn widest_axis(&self) -> Channel {
        let [r, g, b, a] = self.ranges();
        if r >= g && r >= b && r >= a {
            Channel::R
        } else if g >= b && g >= a {
            Channel::G
        } else if b >= a {
            Channel::B
        } else {
            Channel::A
        }
    }

    /// Split at the weighted median along the widest axis.
    ///
    /// Members are stable-sorted ascending by the chosen channel, then pixel
    /// counts accumulated until the running sum reaches half the box weight.
    /// If that boundary falls on the last member it is backed off by one so
    /// both halves stay non-empty.
    fn split(mut self) -> (ColorBox, ColorBox) {
        debug_assert!(self.splittable());

        let axis = self.widest_axis();
        self.entries.sort_by_key(|&(c, _)| axis.of(c));

        let total = self.weight();
        let mut acc = 0u64;
        let mut boundary = self.entries.len() - 1;
        for (i, &(_, n)) in self.entries.iter().enumerate() {
            acc += n as u64;
            if acc * 2 >= total {
                boundary = i;
                break;
            }
        }
        if boundary == self.entries.len() - 1 {
            boundary -= 1;
        }

        let upper = self.entries.split_off(boundary + 1);
        (ColorBox::new(self.entries), ColorBox::new(upper))
    }

    /// Representative color: the pixel-count-weighted per-channel average,
    /// rounded to nearest, upscaled back to 8-bit precision.
    fn representative(&self, hist: &Histogram) -> rgb::RGBA<u8> {
        let mut sums = [0u64; 4];
        let mut weight = 0u64;
        for &(c, n) in &self.entries {
            let n = n as u64;
            sums[0] += c.r as u64 * n;
            sums[1] += c.g as u64 * n;
            sums[2] += c.b as u64 * n;
            sums[3] += c.a as u64 * n;
            weight += n;
        }
        let avg = |sum: u64| ((2 * sum + weight) / (2 * weight)) as u8;
        rgb::RGBA {
            r: hist.upscale_channel(avg(sums[0])),
            g: hist.upscale_channel(avg(sums[1])),
            b: hist.upscale_channel(avg(sums[2])),
            a: hist.upscale_channel(avg(sums[3])),
        }
    }
}

/// Weighted median-cut quantization.
///
/// Produces up to `max_colors` representative colors from the histogram. If
/// the histogram holds `max_colors` or fewer distinct colors they are
/// returned exactly, unpadded, in first-occurrence order.
///
/// The box set is keyed by (weight, insertion sequence) in an ordered map;
/// each round scans from the highest weight down to the first box with at
/// least two distinct colors and splits it. Among equal weights the most
/// recently inserted box is reached first. Splitting stops when the box
/// count reaches `max_colors` or no box remains splittable.
pub fn median_cut(hist: &Histogram, max_colors: usize) -> Vec<rgb::RGBA<u8>> {
    if hist.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    if hist.len() <= max_colors {
        return hist
            .entries()
            .iter()
            .map(|&(c, _)| rgb::RGBA {
                r: hist.upscale_channel(c.r),
                g: hist.upscale_channel(c.g),
                b: hist.upscale_channel(c.b),
                a: hist.upscale_channel(c.a),
            })
            .collect();
    }

    let mut boxes: BTreeMap<(u64, u64), ColorBox> = BTreeMap::new();
    let mut seq = 0u64;

    let first = ColorBox::new(hist.entries().to_vec());
    boxes.insert((first.weight(), seq), first);

    while boxes.len() < max_colors {
        let key = boxes
            .iter()
            .rev()
            .find(|(_, b)| b.splittable())
            .map(|(&k, _)| k);
        let Some(key) = key else {
            break;
        };

        let Some(chosen) = boxes.remove(&key) else {
            break;
        };
        let (lower, upper) = chosen.split();
        seq += 1;
        boxes.insert((lower.weight(), seq), lower);
        seq += 1;
        boxes.insert((upper.weight(), seq), upper);

        debug_assert_eq!(
            boxes.values().map(ColorBox::weight).sum::<u64>(),
            hist.total_pixels()
        );
    }

    boxes.values().map(|b| b.representative(hist)).collect()
}
