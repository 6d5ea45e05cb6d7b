use alloc::string::String;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("animation has no frames")]
    EmptyAnimation,

    #[error("frame/delay/crop list lengths disagree: {frames} frames, {delays} delays, {crops} crops")]
    ShapeMismatch {
        frames: usize,
        delays: usize,
        crops: usize,
    },

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("max_colors must be between 1 and 256, got {0}")]
    InvalidMaxColors(u32),

    #[error("canvas {width}x{height} exceeds the container's 16-bit dimensions")]
    CanvasTooLarge { width: usize, height: usize },

    #[error("unknown quantize method: {0}")]
    UnknownMethod(String),

    #[error("LZW compression failed: {0}")]
    Lzw(String),

    #[cfg(feature = "std")]
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}
