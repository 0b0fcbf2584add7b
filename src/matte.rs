use image::RgbaImage;

use crate::{
    error::PixformResult,
    raster::{decode_image, encode_png},
};

pub const DEFAULT_TOLERANCE: u8 = 24;

/// Make the background of an image transparent and return it as PNG.
///
/// The background color is sampled from the four corner pixels (majority
/// wins, ties resolve toward the top-left). Every pixel within `tolerance`
/// of it, measured as the largest per-channel difference, has its alpha
/// zeroed. A single pass, no flood fill: matching colors inside the
/// subject are cleared too, which is the tool's documented behavior.
pub fn remove_background(bytes: &[u8], tolerance: u8) -> PixformResult<Vec<u8>> {
    let mut img = decode_image(bytes)?;
    clear_matching_background(&mut img, tolerance);
    encode_png(&img)
}

pub fn clear_matching_background(img: &mut RgbaImage, tolerance: u8) {
    let Some(reference) = reference_color(img) else {
        return;
    };
    for px in img.pixels_mut() {
        if channel_distance(reference, [px[0], px[1], px[2]]) <= tolerance {
            px[3] = 0;
        }
    }
}

fn reference_color(img: &RgbaImage) -> Option<[u8; 3]> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let corners = [
        img.get_pixel(0, 0),
        img.get_pixel(w - 1, 0),
        img.get_pixel(0, h - 1),
        img.get_pixel(w - 1, h - 1),
    ]
    .map(|p| [p[0], p[1], p[2]]);

    let mut best = corners[0];
    let mut best_count = 0;
    for &candidate in &corners {
        let count = corners.iter().filter(|&&c| c == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    Some(best)
}

fn channel_distance(a: [u8; 3], b: [u8; 3]) -> u8 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    // White canvas with a red 2x2 subject in the middle.
    fn fixture() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]));
        for y in 2..4 {
            for x in 2..4 {
                img.put_pixel(x, y, Rgba([200, 20, 20, 255]));
            }
        }
        img
    }

    #[test]
    fn background_clears_and_subject_survives() {
        let mut img = fixture();
        clear_matching_background(&mut img, DEFAULT_TOLERANCE);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(5, 5)[3], 0);
        assert_eq!(img.get_pixel(2, 2)[3], 255);
    }

    #[test]
    fn tolerance_absorbs_near_background_noise() {
        let mut img = fixture();
        img.put_pixel(1, 1, Rgba([240, 244, 250, 255]));
        clear_matching_background(&mut img, DEFAULT_TOLERANCE);
        assert_eq!(img.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn corner_tie_resolves_toward_top_left() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        img.put_pixel(3, 0, Rgba([80, 80, 80, 255]));
        img.put_pixel(0, 3, Rgba([160, 160, 160, 255]));
        img.put_pixel(3, 3, Rgba([240, 240, 240, 255]));
        clear_matching_background(&mut img, 5);
        // All four corners differ; the top-left one wins.
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(3, 0)[3], 255);
    }

    #[test]
    fn matching_interior_pixels_clear_too() {
        let mut img = fixture();
        img.put_pixel(3, 3, Rgba([255, 255, 255, 255]));
        clear_matching_background(&mut img, 0);
        assert_eq!(img.get_pixel(3, 3)[3], 0);
    }
}
