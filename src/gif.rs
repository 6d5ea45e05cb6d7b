//! GIF89a container assembly.
//!
//! Writes the byte-exact block sequence: header, logical screen descriptor,
//! global color table, optional NETSCAPE2.0 loop extension, then per frame a
//! graphic control extension, image descriptor, local color table and
//! LZW-compressed raster stream, closed by the trailer.

use std::io::Write;

use crate::dither::{self, IndexedFrame};
use crate::error::EncodeError;
use crate::histogram::{Histogram, MAX_DISTINCT};
use crate::median_cut::median_cut;
use crate::palette::Palette;
use crate::Animation;

/// Encode an animation into `sink` as a GIF89a stream.
///
/// Exactly one palette is computed, from frame 0 uncropped, and every frame
/// is mapped against it, so every local color table is byte-identical to the
/// global one. Shape validation happens before any byte is written; any
/// write failure aborts the remaining blocks.
pub fn write_gif<W: Write>(anim: &Animation, mut sink: W) -> Result<(), EncodeError> {
    anim.validate()?;

    let first = &anim.frames()[0];

    // Global palette: frame 0, full canvas (its own crop is ignored here)
    let hist = Histogram::build_capped(first.pixels(), MAX_DISTINCT);
    let palette = Palette::from_colors(median_cut(&hist, anim.palette_size() as usize));
    log::debug!(
        "global color table: {} colors, encoded length {}",
        palette.len(),
        palette.table_len()
    );

    sink.write_all(b"GIF89a")?;
    write_screen_descriptor(&mut sink, first.width() as u16, first.height() as u16, &palette)?;
    sink.write_all(&palette.table_bytes())?;

    if anim.is_looped() {
        write_loop_extension(&mut sink, 0)?;
    }

    for (i, frame) in anim.frames().iter().enumerate() {
        // A degenerate crop, or one clamped away entirely, falls back to
        // the full frame at the canvas origin so the sub-image and its
        // descriptor position always agree.
        let crop = anim.crops()[i]
            .filter(|c| c.is_valid())
            .and_then(|c| c.clamped(frame.width(), frame.height()));
        let sub;
        let (x, y, image) = match crop {
            Some(c) => {
                sub = frame.cropped(&c);
                (c.x as u16, c.y as u16, &sub)
            }
            None => (0, 0, frame),
        };

        let indexed = dither::map_frame(
            image.pixels(),
            image.width(),
            image.height(),
            &palette,
            anim.method(),
        );

        write_graphic_control(&mut sink, anim.delays()[i])?;
        write_image(&mut sink, x, y, &indexed, &palette)?;
    }

    sink.write_all(&[0x3B])?; // trailer
    sink.flush()?;
    Ok(())
}

/// Logical screen descriptor: canvas size, 8-bit color resolution, global
/// color table flag and size, background index 0, no aspect ratio.
fn write_screen_descriptor<W: Write>(
    w: &mut W,
    width: u16,
    height: u16,
    palette: &Palette,
) -> Result<(), EncodeError> {
    w.write_all(&width.to_le_bytes())?;
    w.write_all(&height.to_le_bytes())?;
    let packed = 0x80 | (7 << 4) | (palette.bit_size() - 1);
    w.write_all(&[packed, 0, 0])?;
    Ok(())
}

/// NETSCAPE2.0 application extension: sub-block {1, count low, count high}.
/// A count of 0 means loop forever.
fn write_loop_extension<W: Write>(w: &mut W, loop_count: u16) -> Result<(), EncodeError> {
    w.write_all(&[0x21, 0xFF, 0x0B])?;
    w.write_all(b"NETSCAPE2.0")?;
    w.write_all(&[0x03, 0x01])?;
    w.write_all(&loop_count.to_le_bytes())?;
    w.write_all(&[0x00])?;
    Ok(())
}

/// Graphic control extension: keep-disposal, no transparency, little-endian
/// delay, placeholder transparent index.
fn write_graphic_control<W: Write>(w: &mut W, delay: u16) -> Result<(), EncodeError> {
    w.write_all(&[0x21, 0xF9, 0x04, 0x04])?;
    w.write_all(&delay.to_le_bytes())?;
    w.write_all(&[0xFF, 0x00])?;
    Ok(())
}

/// Image descriptor, local color table and LZW raster stream.
fn write_image<W: Write>(
    w: &mut W,
    x: u16,
    y: u16,
    frame: &IndexedFrame,
    palette: &Palette,
) -> Result<(), EncodeError> {
    w.write_all(&[0x2C])?;
    w.write_all(&x.to_le_bytes())?;
    w.write_all(&y.to_le_bytes())?;
    w.write_all(&(frame.width as u16).to_le_bytes())?;
    w.write_all(&(frame.height as u16).to_le_bytes())?;
    // Local color table present, same size as the global one
    w.write_all(&[0x80 | (palette.bit_size() - 1)])?;
    w.write_all(&palette.table_bytes())?;

    let min_code = palette.min_code_size();
    w.write_all(&[min_code])?;
    let compressed = weezl::encode::Encoder::new(weezl::BitOrder::Lsb, min_code)
        .encode(&frame.indices)
        .map_err(|e| EncodeError::Lzw(e.to_string()))?;
    for chunk in compressed.chunks(255) {
        w.write_all(&[chunk.len() as u8])?;
        w.write_all(chunk)?;
    }
    w.write_all(&[0x00])?;
    Ok(())
}
