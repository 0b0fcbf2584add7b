use image::RgbaImage;
use kurbo::{Point, RoundedRect, Shape};

use crate::{
    error::{PixformError, PixformResult},
    raster::{decode_image, encode_png},
};

/// Clip an image to a rounded rectangle covering its full bounds and
/// return it as PNG. `radius` is in pixels and is clamped to half the
/// shorter side; zero leaves the alpha channel untouched.
pub fn round_corners(bytes: &[u8], radius: f32) -> PixformResult<Vec<u8>> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(PixformError::input("corner radius must be non-negative"));
    }
    let mut img = decode_image(bytes)?;
    apply_rounded_mask(&mut img, radius);
    encode_png(&img)
}

pub fn apply_rounded_mask(img: &mut RgbaImage, radius: f32) {
    let (w, h) = img.dimensions();
    let r = f64::from(radius).min(f64::from(w.min(h)) / 2.0);
    if r <= 0.0 || w == 0 || h == 0 {
        return;
    }

    let rect = RoundedRect::new(0.0, 0.0, f64::from(w), f64::from(h), r);
    for (x, y, px) in img.enumerate_pixels_mut() {
        if px[3] == 0 {
            continue;
        }
        let hits = pixel_coverage(&rect, x, y);
        if hits >= SUBSAMPLES {
            continue;
        }
        px[3] = ((u32::from(px[3]) * hits + SUBSAMPLES / 2) / SUBSAMPLES) as u8;
    }
}

const SUBSAMPLE_GRID: u32 = 4;
const SUBSAMPLES: u32 = SUBSAMPLE_GRID * SUBSAMPLE_GRID;

// 4x4 supersampled point-in-shape test, so clipped corners get a smoothed
// one-pixel edge band instead of a jagged staircase.
fn pixel_coverage(rect: &RoundedRect, x: u32, y: u32) -> u32 {
    let mut hits = 0;
    for sy in 0..SUBSAMPLE_GRID {
        for sx in 0..SUBSAMPLE_GRID {
            let p = Point::new(
                f64::from(x) + (f64::from(sx) + 0.5) / f64::from(SUBSAMPLE_GRID),
                f64::from(y) + (f64::from(sy) + 0.5) / f64::from(SUBSAMPLE_GRID),
            );
            if rect.contains(p) {
                hits += 1;
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn opaque(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 255]))
    }

    #[test]
    fn corners_clip_and_center_survives() {
        let mut img = opaque(16, 16);
        apply_rounded_mask(&mut img, 6.0);

        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(15, 0)[3], 0);
        assert_eq!(img.get_pixel(0, 15)[3], 0);
        assert_eq!(img.get_pixel(15, 15)[3], 0);
        assert_eq!(img.get_pixel(8, 8)[3], 255);
        // Edge midpoints are outside the corner arcs and stay opaque.
        assert_eq!(img.get_pixel(8, 0)[3], 255);
        assert_eq!(img.get_pixel(0, 8)[3], 255);
    }

    #[test]
    fn zero_radius_is_identity_on_alpha() {
        let mut img = opaque(8, 8);
        apply_rounded_mask(&mut img, 0.0);
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn huge_radius_clamps_to_half_short_side() {
        let mut img = opaque(16, 16);
        apply_rounded_mask(&mut img, 1000.0);
        // Clamped to a circle-ish clip: corners gone, center intact.
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(8, 8)[3], 255);
    }

    #[test]
    fn negative_radius_is_an_input_error() {
        let png = encode_png(&opaque(4, 4)).unwrap();
        assert!(round_corners(&png, -1.0).is_err());
    }
}
