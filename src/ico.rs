use std::io::{self, Write};

use anyhow::Context as _;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{PixformError, PixformResult};

// The signature that all PNG streams start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

const HEADER_LEN: usize = 6;
const DIR_ENTRY_LEN: usize = 16;

/// One rendered icon frame: pixel dimensions plus a complete PNG-encoded
/// bitmap at exactly that size.
#[derive(Clone, Debug)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn is_png(&self) -> bool {
        self.pixels.starts_with(PNG_SIGNATURE)
    }
}

/// Serialize an ordered list of frames into a complete ICO byte buffer.
///
/// Layout: a 6-byte header (reserved, resource type, frame count), one
/// 16-byte directory entry per frame, then each frame's PNG bytes in the
/// same order. All multi-byte fields are little-endian. The output length
/// is exactly `6 + 16 * N + sum(frame lengths)`.
///
/// Frames must already be PNG-encoded and no larger than 256x256; a
/// dimension of exactly 256 is written as a zero byte per the ICO
/// convention. An empty frame list is an input error, never a header-only
/// buffer.
pub fn encode_ico(frames: &[RasterImage]) -> PixformResult<Vec<u8>> {
    validate_frames(frames)?;

    let total = encoded_len(frames);
    let mut buf = Vec::with_capacity(total);
    write_frames(frames, &mut buf).context("write ico stream")?;

    if buf.len() != total {
        return Err(PixformError::encode(format!(
            "ico buffer length mismatch (was {}, expected {total})",
            buf.len()
        )));
    }
    Ok(buf)
}

/// Streaming variant of [`encode_ico`] for callers that already hold a
/// writer. Validation is identical; nothing is written if it fails.
pub fn write_ico<W: Write>(frames: &[RasterImage], writer: W) -> PixformResult<()> {
    validate_frames(frames)?;
    write_frames(frames, writer).context("write ico stream")?;
    Ok(())
}

/// Exact byte length [`encode_ico`] will produce for `frames`.
pub fn encoded_len(frames: &[RasterImage]) -> usize {
    HEADER_LEN
        + DIR_ENTRY_LEN * frames.len()
        + frames.iter().map(|f| f.pixels.len()).sum::<usize>()
}

fn validate_frames(frames: &[RasterImage]) -> PixformResult<()> {
    if frames.is_empty() {
        return Err(PixformError::input("ico needs at least one frame"));
    }
    if frames.len() > u16::MAX as usize {
        return Err(PixformError::input(format!(
            "too many ico frames (was {}, max {})",
            frames.len(),
            u16::MAX
        )));
    }
    for (index, frame) in frames.iter().enumerate() {
        if frame.width == 0 || frame.height == 0 {
            return Err(PixformError::input(format!(
                "ico frame {index} has a zero dimension"
            )));
        }
        if frame.width > 256 || frame.height > 256 {
            return Err(PixformError::input(format!(
                "ico frame {index} is {}x{}, but frames max out at 256x256",
                frame.width, frame.height
            )));
        }
        if !frame.is_png() {
            return Err(PixformError::input(format!(
                "ico frame {index} is not png-encoded"
            )));
        }
    }
    Ok(())
}

fn write_frames<W: Write>(frames: &[RasterImage], mut w: W) -> io::Result<()> {
    w.write_u16::<LittleEndian>(0)?; // reserved
    w.write_u16::<LittleEndian>(1)?; // resource type: icon
    w.write_u16::<LittleEndian>(frames.len() as u16)?;

    let mut data_offset = (HEADER_LEN + DIR_ENTRY_LEN * frames.len()) as u32;
    for frame in frames {
        w.write_u8(dimension_byte(frame.width))?;
        w.write_u8(dimension_byte(frame.height))?;
        w.write_u8(0)?; // no palette
        w.write_u8(0)?; // reserved
        w.write_u16::<LittleEndian>(1)?; // color planes
        w.write_u16::<LittleEndian>(32)?; // bits per pixel
        let data_size = frame.pixels.len() as u32;
        w.write_u32::<LittleEndian>(data_size)?;
        w.write_u32::<LittleEndian>(data_offset)?;
        data_offset += data_size;
    }
    for frame in frames {
        w.write_all(&frame.pixels)?;
    }
    Ok(())
}

// A width/height byte of zero means 256.
fn dimension_byte(px: u32) -> u8 {
    if px == 256 { 0 } else { px as u8 }
}

pub const DEFAULT_ICO_SIZES: &[u32] = &[16, 32, 48];

/// Decode a source raster and build a multi-frame ICO, rendering one
/// frame per requested size with the scale-to-fit policy.
pub fn png_to_ico(bytes: &[u8], sizes: &[u32]) -> PixformResult<Vec<u8>> {
    if sizes.is_empty() {
        return Err(PixformError::input("ico needs at least one frame size"));
    }
    let src = crate::raster::decode_image(bytes)?;
    let mut frames = Vec::with_capacity(sizes.len());
    for &size in sizes {
        frames.push(crate::raster::render_frame(&src, size)?);
    }
    encode_ico(&frames)
}
