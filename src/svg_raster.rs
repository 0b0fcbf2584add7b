use crate::{
    error::{PixformError, PixformResult},
    raster::{encode_png, rgba_image_from_raw, unpremultiply_rgba8_in_place},
};

// Avoid pathological allocations for absurd scale factors or target boxes.
const MAX_DIM: u32 = 16_384;

/// How to size the raster output relative to the SVG's intrinsic size.
///
/// With an explicit `width`/`height` box the document is scaled to fit
/// inside it, preserving aspect ratio; the output is content-tight (no
/// letterbox padding). Otherwise `scale` multiplies the intrinsic size.
#[derive(Clone, Copy, Debug)]
pub struct SvgRenderOptions {
    pub scale: f32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            width: None,
            height: None,
        }
    }
}

#[tracing::instrument(skip(svg))]
pub fn svg_to_png(svg: &[u8], opts: &SvgRenderOptions) -> PixformResult<Vec<u8>> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|e| PixformError::input(format!("parse svg: {e}")))?;

    let (width, height) = raster_size(&tree, opts)?;
    tracing::debug!(width, height, "svg raster size");

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PixformError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut data = pixmap.take();
    unpremultiply_rgba8_in_place(&mut data);
    let img = rgba_image_from_raw(width, height, data)?;
    encode_png(&img)
}

fn raster_size(tree: &usvg::Tree, opts: &SvgRenderOptions) -> PixformResult<(u32, u32)> {
    fn to_px(v: f32) -> PixformResult<f64> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PixformError::input("svg has invalid width/height"));
        }
        Ok(f64::from(v))
    }

    let base_w = to_px(tree.size().width())?;
    let base_h = to_px(tree.size().height())?;

    let scale = match (opts.width, opts.height) {
        (None, None) => {
            let s = f64::from(opts.scale);
            if !s.is_finite() || s <= 0.0 {
                return Err(PixformError::input("svg scale must be positive and finite"));
            }
            s
        }
        (Some(w), None) => f64::from(w) / base_w,
        (None, Some(h)) => f64::from(h) / base_h,
        (Some(w), Some(h)) => (f64::from(w) / base_w).min(f64::from(h) / base_h),
    };
    if scale <= 0.0 {
        return Err(PixformError::input("svg target box must be non-zero"));
    }

    let w = (base_w * scale).round().max(1.0) as u32;
    let h = (base_h * scale).round().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(PixformError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::decode_image;

    const RECT_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#ff0000"/></svg>"##;

    #[test]
    fn scale_factor_multiplies_intrinsic_size() {
        let png = svg_to_png(
            RECT_SVG,
            &SvgRenderOptions {
                scale: 2.0,
                ..Default::default()
            },
        )
        .unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!(img.dimensions(), (40, 20));
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn explicit_box_fits_preserving_aspect() {
        let png = svg_to_png(
            RECT_SVG,
            &SvgRenderOptions {
                scale: 1.0,
                width: Some(100),
                height: Some(100),
            },
        )
        .unwrap();
        let img = decode_image(&png).unwrap();
        // 20x10 fit into 100x100 -> content-tight 100x50.
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn single_axis_pins_that_axis() {
        let png = svg_to_png(
            RECT_SVG,
            &SvgRenderOptions {
                scale: 1.0,
                width: None,
                height: Some(30),
            },
        )
        .unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!(img.dimensions(), (60, 30));
    }

    #[test]
    fn malformed_svg_is_an_input_error() {
        let err = svg_to_png(br#"<svg"#, &SvgRenderOptions::default()).unwrap_err();
        assert!(err.to_string().contains("input error:"));
    }

    #[test]
    fn absurd_scale_is_rejected() {
        let err = svg_to_png(
            RECT_SVG,
            &SvgRenderOptions {
                scale: 1e6,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("render error:"));
    }
}
