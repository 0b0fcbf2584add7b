use image::imageops;

use crate::{
    error::{PixformError, PixformResult},
    raster::{decode_image, encode_jpeg},
};

#[derive(Clone, Copy, Debug)]
pub struct CompressOptions {
    pub quality: u8,
    /// Downscale so the longer side is at most this, preserving aspect.
    pub max_dimension: Option<u32>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: 80,
            max_dimension: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub input_len: usize,
    pub output_len: usize,
}

/// Re-encode an image as JPEG at the requested quality, optionally
/// downscaling first. Transparency is flattened onto white. The returned
/// byte counts let the caller report the saving.
#[tracing::instrument(skip(bytes))]
pub fn compress(bytes: &[u8], opts: &CompressOptions) -> PixformResult<CompressedImage> {
    if opts.max_dimension == Some(0) {
        return Err(PixformError::input("max dimension must be non-zero"));
    }

    let img = decode_image(bytes)?;
    let (w, h) = img.dimensions();

    let img = match opts.max_dimension {
        Some(max) if w.max(h) > max => {
            let scale = f64::from(max) / f64::from(w.max(h));
            let nw = ((f64::from(w) * scale).round() as u32).clamp(1, max);
            let nh = ((f64::from(h) * scale).round() as u32).clamp(1, max);
            tracing::debug!(w, h, nw, nh, "downscale before re-encode");
            imageops::resize(&img, nw, nh, imageops::FilterType::Lanczos3)
        }
        _ => img,
    };

    let (width, height) = img.dimensions();
    let out = encode_jpeg(&img, opts.quality)?;
    Ok(CompressedImage {
        width,
        height,
        input_len: bytes.len(),
        output_len: out.len(),
        bytes: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::encode_png;
    use image::{Rgba, RgbaImage};

    fn noisy_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        encode_png(&img).unwrap()
    }

    #[test]
    fn downscale_respects_bound_and_aspect() {
        let out = compress(
            &noisy_png(200, 100),
            &CompressOptions {
                quality: 80,
                max_dimension: Some(50),
            },
        )
        .unwrap();
        assert_eq!((out.width, out.height), (50, 25));
        assert_eq!(out.output_len, out.bytes.len());
        assert_eq!(
            image::guess_format(&out.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn image_within_bounds_is_only_reencoded() {
        let out = compress(
            &noisy_png(40, 30),
            &CompressOptions {
                quality: 70,
                max_dimension: Some(100),
            },
        )
        .unwrap();
        assert_eq!((out.width, out.height), (40, 30));
    }

    #[test]
    fn zero_max_dimension_is_an_input_error() {
        let err = compress(
            &noisy_png(4, 4),
            &CompressOptions {
                quality: 80,
                max_dimension: Some(0),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("input error:"));
    }
}
