#![forbid(unsafe_code)]

pub mod error;
pub mod ico;
pub mod iconset;
pub mod matte;
pub mod raster;
pub mod rounded;
pub mod shrink;
pub mod svg_raster;
pub mod webp;

pub use error::{PixformError, PixformResult};
pub use ico::{DEFAULT_ICO_SIZES, RasterImage, encode_ico, encoded_len, png_to_ico, write_ico};
pub use iconset::{IconSet, IconSetManifest, IconSetOptions, generate_icon_set};
pub use matte::{DEFAULT_TOLERANCE, remove_background};
pub use raster::{decode_image, encode_jpeg, encode_png, render_frame, scale_to_fit};
pub use rounded::round_corners;
pub use shrink::{CompressOptions, CompressedImage, compress};
pub use svg_raster::{SvgRenderOptions, svg_to_png};
pub use webp::{DEFAULT_JPEG_QUALITY, webp_to_jpeg, webp_to_png};
