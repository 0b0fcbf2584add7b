use crate::{
    error::PixformResult,
    raster::{decode_image, encode_jpeg, encode_png},
};

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// WebP in, PNG out. Alpha is preserved.
///
/// Decoding is delegated to the `image` crate, so any raster it sniffs
/// (not just WebP) converts the same way; the tools do not validate the
/// container beyond that.
pub fn webp_to_png(bytes: &[u8]) -> PixformResult<Vec<u8>> {
    let img = decode_image(bytes)?;
    encode_png(&img)
}

/// WebP in, JPEG out at the given quality. Transparency is flattened onto
/// white since JPEG carries no alpha.
pub fn webp_to_jpeg(bytes: &[u8], quality: u8) -> PixformResult<Vec<u8>> {
    let img = decode_image(bytes)?;
    encode_jpeg(&img, quality)
}
