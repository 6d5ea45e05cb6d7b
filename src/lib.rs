#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod dither;
pub mod error;
pub mod frame;
#[cfg(feature = "std")]
pub mod gif;
pub mod histogram;
pub mod median_cut;
pub mod palette;

pub use dither::IndexedFrame;
pub use error::EncodeError;
pub use frame::{CropRect, Frame};
pub use palette::{NearestCache, Palette};

use alloc::vec::Vec;

/// How frames are mapped onto the shared palette.
///
/// The palette itself always comes from median-cut quantization of frame 0;
/// the method selects the mapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeMethod {
    /// Direct nearest-color mapping, no dithering.
    Threshold,
    /// Nearest-color mapping after a fixed positional (Bayer) perturbation.
    Ordered,
    /// Floyd-Steinberg error diffusion.
    Diffuse,
    /// Direct nearest-color mapping against the median-cut palette.
    MedianCut,
    /// Median-cut palette combined with Floyd-Steinberg diffusion.
    MedianCutFloyd,
}

impl core::str::FromStr for QuantizeMethod {
    type Err = EncodeError;

    /// Parse the selector names used by upstream callers. Unknown names are
    /// an error rather than a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "THRESHOLD" => Ok(Self::Threshold),
            "ORDERED" => Ok(Self::Ordered),
            "DIFFUSE" => Ok(Self::Diffuse),
            "MEDIANCUT" => Ok(Self::MedianCut),
            "MEDIANCUT_FLOYD" => Ok(Self::MedianCutFloyd),
            other => Err(EncodeError::UnknownMethod(other.into())),
        }
    }
}

/// The full encoder input: ordered frames with parallel delay and crop
/// lists, a loop flag and the quantize method.
///
/// The three lists must stay the same length; [`Animation::validate`]
/// enforces this before any output is produced.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Frame>,
    delays: Vec<u16>,
    crops: Vec<Option<CropRect>>,
    looped: bool,
    method: QuantizeMethod,
    max_colors: u32,
}

impl Animation {
    pub fn new(method: QuantizeMethod) -> Self {
        Self {
            frames: Vec::new(),
            delays: Vec::new(),
            crops: Vec::new(),
            looped: false,
            method,
            max_colors: 256,
        }
    }

    /// Assemble an animation from the parallel lists upstream callers hand
    /// over. The lists are validated at encode time, not here.
    pub fn from_parts(
        frames: Vec<Frame>,
        delays: Vec<u16>,
        crops: Vec<Option<CropRect>>,
        looped: bool,
        method: QuantizeMethod,
    ) -> Self {
        Self {
            frames,
            delays,
            crops,
            looped,
            method,
            max_colors: 256,
        }
    }

    /// Append a frame with its delay (container time units) and crop.
    pub fn frame(mut self, frame: Frame, delay: u16, crop: Option<CropRect>) -> Self {
        self.frames.push(frame);
        self.delays.push(delay);
        self.crops.push(crop);
        self
    }

    /// Loop playback indefinitely.
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    /// Target palette size (1..=256). Defaults to 256.
    pub fn max_colors(mut self, n: u32) -> Self {
        self.max_colors = n;
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn delays(&self) -> &[u16] {
        &self.delays
    }

    pub fn crops(&self) -> &[Option<CropRect>] {
        &self.crops
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn method(&self) -> QuantizeMethod {
        self.method
    }

    pub fn palette_size(&self) -> u32 {
        self.max_colors
    }

    /// Check the input shape: at least one frame, parallel lists of equal
    /// length, a representable canvas and a sane palette size.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.frames.is_empty() {
            return Err(EncodeError::EmptyAnimation);
        }
        if self.frames.len() != self.delays.len() || self.frames.len() != self.crops.len() {
            return Err(EncodeError::ShapeMismatch {
                frames: self.frames.len(),
                delays: self.delays.len(),
                crops: self.crops.len(),
            });
        }
        if self.max_colors == 0 || self.max_colors > 256 {
            return Err(EncodeError::InvalidMaxColors(self.max_colors));
        }
        for frame in &self.frames {
            if frame.width() > u16::MAX as usize || frame.height() > u16::MAX as usize {
                return Err(EncodeError::CanvasTooLarge {
                    width: frame.width(),
                    height: frame.height(),
                });
            }
        }
        Ok(())
    }
}

/// Encode an animation to a GIF89a stream.
#[cfg(feature = "std")]
pub fn encode<W: std::io::Write>(anim: &Animation, sink: W) -> Result<(), EncodeError> {
    gif::write_gif(anim, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn method_parses_upstream_names() {
        assert_eq!(
            QuantizeMethod::from_str("MEDIANCUT_FLOYD").unwrap(),
            QuantizeMethod::MedianCutFloyd
        );
        assert_eq!(
            QuantizeMethod::from_str("THRESHOLD").unwrap(),
            QuantizeMethod::Threshold
        );
        assert!(matches!(
            QuantizeMethod::from_str("mediancut"),
            Err(EncodeError::UnknownMethod(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let anim = Animation::new(QuantizeMethod::MedianCut);
        assert!(matches!(anim.validate(), Err(EncodeError::EmptyAnimation)));

        let frame = Frame::new(
            alloc::vec![rgb::RGBA { r: 0, g: 0, b: 0, a: 255 }; 4],
            2,
            2,
        )
        .unwrap();
        let anim = Animation::from_parts(
            alloc::vec![frame.clone(), frame],
            alloc::vec![10],
            alloc::vec![None, None],
            false,
            QuantizeMethod::MedianCut,
        );
        assert!(matches!(
            anim.validate(),
            Err(EncodeError::ShapeMismatch {
                frames: 2,
                delays: 1,
                crops: 2
            })
        ));
    }

    #[test]
    fn validate_rejects_bad_palette_size() {
        let frame = Frame::new(
            alloc::vec![rgb::RGBA { r: 0, g: 0, b: 0, a: 255 }; 1],
            1,
            1,
        )
        .unwrap();
        let anim = Animation::new(QuantizeMethod::MedianCut)
            .frame(frame, 0, None)
            .max_colors(0);
        assert!(matches!(
            anim.validate(),
            Err(EncodeError::InvalidMaxColors(0))
        ));
    }
}
