use std::{fs, path::Path};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PixformError, PixformResult},
    ico::encode_ico,
    raster::{decode_image, render_frame},
};

pub const PNG_MEDIA_TYPE: &str = "image/png";
pub const ICO_MEDIA_TYPE: &str = "image/x-icon";

#[derive(Clone, Debug)]
pub struct IconSetOptions {
    /// Standalone favicon PNG sizes.
    pub png_sizes: Vec<u32>,
    /// Frame sizes embedded in favicon.ico.
    pub ico_sizes: Vec<u32>,
    pub apple_touch_size: u32,
}

impl Default for IconSetOptions {
    fn default() -> Self {
        Self {
            png_sizes: vec![16, 32, 48],
            ico_sizes: vec![16, 32, 48],
            apple_touch_size: 180,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IconSetEntry {
    pub file_name: String,
    pub sizes: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IconSetManifest {
    pub icons: Vec<ManifestIcon>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Clone, Debug)]
pub struct IconSet {
    pub entries: Vec<IconSetEntry>,
    pub manifest: IconSetManifest,
}

impl IconSet {
    /// Persist every icon plus `manifest.json` into `dir`, creating it if
    /// needed. Buffers are fully built before this is called, so a failed
    /// generation never reaches the filesystem.
    pub fn write_to(&self, dir: &Path) -> PixformResult<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        for entry in &self.entries {
            let path = dir.join(&entry.file_name);
            fs::write(&path, &entry.bytes)
                .with_context(|| format!("write '{}'", path.display()))?;
        }
        let manifest = serde_json::to_vec_pretty(&self.manifest).context("serialize manifest")?;
        let path = dir.join("manifest.json");
        fs::write(&path, manifest).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

/// Produce the standard favicon family from one source raster: sized
/// favicon PNGs, an apple-touch icon, a multi-frame favicon.ico, and a
/// manifest describing all of them.
#[tracing::instrument(skip(bytes))]
pub fn generate_icon_set(bytes: &[u8], opts: &IconSetOptions) -> PixformResult<IconSet> {
    validate_options(opts)?;
    let src = decode_image(bytes)?;

    let (sw, sh) = src.dimensions();
    let largest = largest_size(opts);
    if sw.min(sh) < largest {
        tracing::warn!(sw, sh, largest, "source is smaller than the largest icon; upscaling");
    }

    let mut entries = Vec::new();
    for &size in &dedup(&opts.png_sizes) {
        let frame = render_frame(&src, size)?;
        entries.push(IconSetEntry {
            file_name: format!("favicon-{size}x{size}.png"),
            sizes: format!("{size}x{size}"),
            media_type: PNG_MEDIA_TYPE,
            bytes: frame.pixels,
        });
    }

    let apple = opts.apple_touch_size;
    let frame = render_frame(&src, apple)?;
    entries.push(IconSetEntry {
        file_name: "apple-touch-icon.png".to_string(),
        sizes: format!("{apple}x{apple}"),
        media_type: PNG_MEDIA_TYPE,
        bytes: frame.pixels,
    });

    let ico_sizes = dedup(&opts.ico_sizes);
    let mut frames = Vec::with_capacity(ico_sizes.len());
    for &size in &ico_sizes {
        frames.push(render_frame(&src, size)?);
    }
    entries.push(IconSetEntry {
        file_name: "favicon.ico".to_string(),
        sizes: ico_sizes
            .iter()
            .map(|s| format!("{s}x{s}"))
            .collect::<Vec<_>>()
            .join(" "),
        media_type: ICO_MEDIA_TYPE,
        bytes: encode_ico(&frames)?,
    });

    let manifest = IconSetManifest {
        icons: entries
            .iter()
            .map(|e| ManifestIcon {
                src: e.file_name.clone(),
                sizes: e.sizes.clone(),
                media_type: e.media_type.to_string(),
            })
            .collect(),
    };
    Ok(IconSet { entries, manifest })
}

fn validate_options(opts: &IconSetOptions) -> PixformResult<()> {
    if opts.png_sizes.is_empty() {
        return Err(PixformError::input("png sizes must be non-empty"));
    }
    if opts.ico_sizes.is_empty() {
        return Err(PixformError::input("ico sizes must be non-empty"));
    }
    let all = opts
        .png_sizes
        .iter()
        .chain(opts.ico_sizes.iter())
        .chain(std::iter::once(&opts.apple_touch_size));
    for &size in all {
        if size == 0 || size > 256 {
            return Err(PixformError::input(format!(
                "icon size {size} is out of range (1..=256)"
            )));
        }
    }
    Ok(())
}

fn largest_size(opts: &IconSetOptions) -> u32 {
    opts.png_sizes
        .iter()
        .chain(opts.ico_sizes.iter())
        .copied()
        .chain(std::iter::once(opts.apple_touch_size))
        .max()
        .unwrap_or(0)
}

fn dedup(sizes: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(sizes.len());
    for &s in sizes {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
