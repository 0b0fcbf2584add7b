use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage, imageops};

use crate::{
    error::{PixformError, PixformResult},
    ico::RasterImage,
};

/// Decode any raster format the `image` crate understands (PNG, JPEG, WebP,
/// GIF, BMP, ...) into straight-alpha RGBA.
pub fn decode_image(bytes: &[u8]) -> PixformResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PixformError::input(format!("decode image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Resize `src` to fit a `target` x `target` square without cropping or
/// distortion: scale by `min(target/w, target/h)`, center the result, and
/// leave the padding on the shorter axis fully transparent.
pub fn scale_to_fit(src: &RgbaImage, target: u32) -> PixformResult<RgbaImage> {
    if target == 0 {
        return Err(PixformError::input("target size must be non-zero"));
    }
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return Err(PixformError::input("source image has a zero dimension"));
    }

    let scale = (f64::from(target) / f64::from(sw)).min(f64::from(target) / f64::from(sh));
    let scaled_w = ((f64::from(sw) * scale).round() as u32).clamp(1, target);
    let scaled_h = ((f64::from(sh) * scale).round() as u32).clamp(1, target);
    tracing::debug!(sw, sh, target, scaled_w, scaled_h, "scale to fit");

    let resized = imageops::resize(src, scaled_w, scaled_h, imageops::FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(target, target, Rgba([0, 0, 0, 0]));
    let x = i64::from((target - scaled_w) / 2);
    let y = i64::from((target - scaled_h) / 2);
    imageops::overlay(&mut canvas, &resized, x, y);
    Ok(canvas)
}

/// Render one icon frame: scale-to-fit at `target`, PNG-encode the result.
pub fn render_frame(src: &RgbaImage, target: u32) -> PixformResult<RasterImage> {
    let canvas = scale_to_fit(src, target)?;
    let pixels = encode_png(&canvas)?;
    Ok(RasterImage {
        width: target,
        height: target,
        pixels,
    })
}

pub fn encode_png(img: &RgbaImage) -> PixformResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PixformError::encode(format!("encode png: {e}")))?;
    Ok(buf)
}

/// JPEG has no alpha channel; the image is flattened onto opaque white
/// first, matching what drawing onto a white canvas does.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> PixformResult<Vec<u8>> {
    let flattened = flatten_onto_white(img);
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut cursor,
        quality.clamp(1, 100),
    );
    flattened
        .write_with_encoder(encoder)
        .map_err(|e| PixformError::encode(format!("encode jpeg: {e}")))?;
    Ok(buf)
}

pub fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = RgbImage::new(w, h);
    for (src, dst) in img.pixels().zip(out.pixels_mut()) {
        let a = u32::from(src[3]);
        let inv = 255 - a;
        *dst = Rgb([
            ((u32::from(src[0]) * a + 255 * inv + 127) / 255) as u8,
            ((u32::from(src[1]) * a + 255 * inv + 127) / 255) as u8,
            ((u32::from(src[2]) * a + 255 * inv + 127) / 255) as u8,
        ]);
    }
    out
}

/// Straight-alpha view of a premultiplied rgba8 buffer, in place.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}

pub(crate) fn rgba_image_from_raw(
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> PixformResult<RgbaImage> {
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| PixformError::render("pixel buffer does not match its dimensions"))
}
