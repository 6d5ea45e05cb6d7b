use alloc::vec::Vec;

use crate::error::EncodeError;

/// A full-color raster frame: RGBA, 8 bits per channel, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: Vec<rgb::RGBA<u8>>,
    width: usize,
    height: usize,
}

impl Frame {
    /// Create a frame from a row-major RGBA pixel buffer.
    ///
    /// The buffer length must equal `width * height`.
    pub fn new(
        pixels: Vec<rgb::RGBA<u8>>,
        width: usize,
        height: usize,
    ) -> Result<Self, EncodeError> {
        if pixels.len() != width * height {
            return Err(EncodeError::DimensionMismatch {
                len: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn pixels(&self) -> &[rgb::RGBA<u8>] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Extract the sub-image covered by `crop`, clamped to the frame bounds.
    ///
    /// Returns a copy of the frame itself when the crop is degenerate
    /// (zero width or height after clamping).
    pub fn cropped(&self, crop: &CropRect) -> Frame {
        let x0 = crop.x.min(self.width);
        let y0 = crop.y.min(self.height);
        let w = crop.width.min(self.width - x0);
        let h = crop.height.min(self.height - y0);

        if w == 0 || h == 0 {
            return self.clone();
        }

        let mut pixels = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            let row = y * self.width;
            pixels.extend_from_slice(&self.pixels[row + x0..row + x0 + w]);
        }
        Frame {
            pixels,
            width: w,
            height: h,
        }
    }
}

/// A crop rectangle relative to the canvas, in pixels.
///
/// A crop is *valid* when both dimensions are non-zero; degenerate crops
/// are treated as "use the full frame".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Clamp the rectangle to a `width` x `height` canvas.
    ///
    /// Returns `None` when nothing of the rectangle remains inside the
    /// canvas, including when the origin itself lies past the edge.
    pub fn clamped(&self, width: usize, height: usize) -> Option<CropRect> {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let w = self.width.min(width - x);
        let h = self.height.min(height - y);
        if w == 0 || h == 0 {
            None
        } else {
            Some(CropRect::new(x, y, w, h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn checker(width: usize, height: usize) -> Frame {
        let pixels = (0..width * height)
            .map(|i| {
                let v = (i % 256) as u8;
                rgb::RGBA {
                    r: v,
                    g: v,
                    b: v,
                    a: 255,
                }
            })
            .collect();
        Frame::new(pixels, width, height).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let pixels = vec![
            rgb::RGBA {
                r: 0,
                g: 0,
                b: 0,
                a: 255
            };
            5
        ];
        assert!(matches!(
            Frame::new(pixels, 2, 3),
            Err(EncodeError::DimensionMismatch { len: 5, .. })
        ));
    }

    #[test]
    fn crop_extracts_sub_image() {
        let frame = checker(4, 4);
        let sub = frame.cropped(&CropRect::new(1, 1, 2, 2));
        assert_eq!(sub.width(), 2);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.pixels()[0], frame.pixels()[1 * 4 + 1]);
        assert_eq!(sub.pixels()[3], frame.pixels()[2 * 4 + 2]);
    }

    #[test]
    fn crop_clamps_to_bounds() {
        let frame = checker(4, 4);
        let sub = frame.cropped(&CropRect::new(2, 2, 10, 10));
        assert_eq!(sub.width(), 2);
        assert_eq!(sub.height(), 2);
    }

    #[test]
    fn clamped_rect_stays_inside_canvas() {
        let c = CropRect::new(2, 3, 4, 2);
        assert_eq!(c.clamped(8, 8), Some(c));
        // Overhanging edges shrink to what remains
        assert_eq!(
            CropRect::new(2, 2, 10, 10).clamped(4, 4),
            Some(CropRect::new(2, 2, 2, 2))
        );
        // An origin past the canvas leaves nothing
        assert_eq!(CropRect::new(5, 0, 2, 2).clamped(4, 4), None);
        assert_eq!(CropRect::new(0, 9, 1, 1).clamped(4, 4), None);
    }

    #[test]
    fn degenerate_crop_returns_full_frame() {
        let frame = checker(3, 3);
        let sub = frame.cropped(&CropRect::new(1, 1, 0, 5));
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 3);
    }
}
