//! Animation export: one date-stamped PNG frame per time layer.
//!
//! All frames share one color scale (fixed min/max over the whole series)
//! so the animation doesn't flicker as per-frame ranges change. Frames are
//! numbered so an external encoder can assemble them in order.

use std::path::{Path, PathBuf};

use tracing::info;

use raster::Raster3;

use crate::error::{RenderError, RenderResult};
use crate::gradient::{render_grid, value_range, ColorScale};
use crate::png::create_png_auto;

/// Options for frame export.
#[derive(Debug, Clone)]
pub struct FrameOptions {
    /// Color scale applied to every frame
    pub scale: ColorScale,
    /// Fixed value range; None derives it from the whole series
    pub min_max: Option<(f32, f32)>,
    /// Filename prefix, e.g. the variable label
    pub prefix: String,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            scale: ColorScale::default(),
            min_max: None,
            prefix: "frame".to_string(),
        }
    }
}

/// Render one layer of a raster to a PNG byte buffer.
pub fn render_layer(
    raster: &Raster3,
    t: usize,
    scale: ColorScale,
    min_max: (f32, f32),
) -> RenderResult<Vec<u8>> {
    let pixels = render_grid(
        raster.layer(t),
        raster.nx(),
        raster.ny(),
        min_max.0,
        min_max.1,
        |norm| scale.color(norm),
    );
    create_png_auto(&pixels, raster.nx(), raster.ny())
}

/// Write every layer of a raster as `<prefix>_<nnnn>_<date>.png` into a
/// directory. Returns the frame paths in time order.
pub fn export_frames(
    raster: &Raster3,
    dir: &Path,
    opts: &FrameOptions,
) -> RenderResult<Vec<PathBuf>> {
    let min_max = match opts.min_max {
        Some(range) => range,
        None => value_range(&raster.data)
            .ok_or_else(|| RenderError::EmptyData("series is entirely NaN".to_string()))?,
    };

    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(raster.nt());
    for t in 0..raster.nt() {
        let png = render_layer(raster, t, opts.scale, min_max)?;
        let name = format!(
            "{}_{:04}_{}.png",
            opts.prefix,
            t,
            raster.times[t].format("%Y%m%d")
        );
        let path = dir.join(name);
        std::fs::write(&path, png)?;
        paths.push(path);
    }

    info!(
        frames = paths.len(),
        dir = %dir.display(),
        min = min_max.0,
        max = min_max.1,
        "Exported animation frames"
    );
    Ok(paths)
}
