use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pixform", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize an SVG to PNG.
    Svg2png(Svg2pngArgs),
    /// Convert a WebP image to PNG.
    Webp2png(Webp2pngArgs),
    /// Convert a WebP image to JPEG.
    Webp2jpg(Webp2jpgArgs),
    /// Build a multi-size ICO from a raster image.
    Png2ico(Png2icoArgs),
    /// Generate the standard favicon set plus a manifest.
    Iconset(IconsetArgs),
    /// Round the corners of an image.
    Round(RoundArgs),
    /// Make the background transparent.
    Removebg(RemovebgArgs),
    /// Re-encode as JPEG, optionally downscaling, to shrink file size.
    Compress(CompressArgs),
}

#[derive(Parser, Debug)]
struct Svg2pngArgs {
    /// Input SVG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Scale factor applied to the SVG's intrinsic size.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Target width in pixels; overrides --scale.
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels; overrides --scale.
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct Webp2pngArgs {
    /// Input WebP.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct Webp2jpgArgs {
    /// Input WebP.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = pixform::DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct Png2icoArgs {
    /// Input raster image (PNG, JPEG, WebP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output ICO path.
    #[arg(long)]
    out: PathBuf,

    /// Frame sizes to embed.
    #[arg(long, value_delimiter = ',', default_values_t = pixform::DEFAULT_ICO_SIZES.to_vec())]
    sizes: Vec<u32>,
}

#[derive(Parser, Debug)]
struct IconsetArgs {
    /// Input raster image (PNG, JPEG, WebP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the icon files and manifest are written into.
    #[arg(long)]
    out_dir: PathBuf,

    /// Sizes for both the favicon PNGs and the ICO frames.
    #[arg(long, value_delimiter = ',', default_values_t = pixform::DEFAULT_ICO_SIZES.to_vec())]
    sizes: Vec<u32>,

    /// Apple touch icon size.
    #[arg(long, default_value_t = 180)]
    apple_touch: u32,
}

#[derive(Parser, Debug)]
struct RoundArgs {
    /// Input raster image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Corner radius in pixels; clamped to half the shorter side.
    #[arg(long)]
    radius: f32,
}

#[derive(Parser, Debug)]
struct RemovebgArgs {
    /// Input raster image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Per-channel distance from the sampled background color that still
    /// counts as background.
    #[arg(long, default_value_t = pixform::DEFAULT_TOLERANCE)]
    tolerance: u8,
}

#[derive(Parser, Debug)]
struct CompressArgs {
    /// Input raster image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 80)]
    quality: u8,

    /// Downscale so the longer side is at most this many pixels.
    #[arg(long)]
    max_dim: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Svg2png(args) => cmd_svg2png(args),
        Command::Webp2png(args) => cmd_webp2png(args),
        Command::Webp2jpg(args) => cmd_webp2jpg(args),
        Command::Png2ico(args) => cmd_png2ico(args),
        Command::Iconset(args) => cmd_iconset(args),
        Command::Round(args) => cmd_round(args),
        Command::Removebg(args) => cmd_removebg(args),
        Command::Compress(args) => cmd_compress(args),
    }
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read input '{}'", path.display()))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_svg2png(args: Svg2pngArgs) -> anyhow::Result<()> {
    let svg = read_bytes(&args.in_path)?;
    let opts = pixform::SvgRenderOptions {
        scale: args.scale,
        width: args.width,
        height: args.height,
    };
    let png = pixform::svg_to_png(&svg, &opts)?;
    write_bytes(&args.out, &png)
}

fn cmd_webp2png(args: Webp2pngArgs) -> anyhow::Result<()> {
    let webp = read_bytes(&args.in_path)?;
    let png = pixform::webp_to_png(&webp)?;
    write_bytes(&args.out, &png)
}

fn cmd_webp2jpg(args: Webp2jpgArgs) -> anyhow::Result<()> {
    let webp = read_bytes(&args.in_path)?;
    let jpg = pixform::webp_to_jpeg(&webp, args.quality)?;
    write_bytes(&args.out, &jpg)
}

fn cmd_png2ico(args: Png2icoArgs) -> anyhow::Result<()> {
    let src = read_bytes(&args.in_path)?;
    let ico = pixform::png_to_ico(&src, &args.sizes)?;
    write_bytes(&args.out, &ico)
}

fn cmd_iconset(args: IconsetArgs) -> anyhow::Result<()> {
    let src = read_bytes(&args.in_path)?;
    let opts = pixform::IconSetOptions {
        png_sizes: args.sizes.clone(),
        ico_sizes: args.sizes,
        apple_touch_size: args.apple_touch,
    };
    let set = pixform::generate_icon_set(&src, &opts)?;
    set.write_to(&args.out_dir)?;
    eprintln!(
        "wrote {} files to {}",
        set.entries.len() + 1,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_round(args: RoundArgs) -> anyhow::Result<()> {
    let src = read_bytes(&args.in_path)?;
    let png = pixform::round_corners(&src, args.radius)?;
    write_bytes(&args.out, &png)
}

fn cmd_removebg(args: RemovebgArgs) -> anyhow::Result<()> {
    let src = read_bytes(&args.in_path)?;
    let png = pixform::remove_background(&src, args.tolerance)?;
    write_bytes(&args.out, &png)
}

fn cmd_compress(args: CompressArgs) -> anyhow::Result<()> {
    let src = read_bytes(&args.in_path)?;
    let opts = pixform::CompressOptions {
        quality: args.quality,
        max_dimension: args.max_dim,
    };
    let out = pixform::compress(&src, &opts)?;
    eprintln!(
        "{} -> {} bytes ({}x{})",
        out.input_len, out.output_len, out.width, out.height
    );
    write_bytes(&args.out, &out.bytes)
}
