//! Map rendering: color gradients, PNG encoding and animation frame
//! export for raster series.

pub mod animation;
pub mod error;
pub mod gradient;
pub mod png;

pub use animation::{export_frames, render_layer, FrameOptions};
pub use error::{RenderError, RenderResult};
pub use gradient::{render_grid, value_range, Color, ColorScale};
pub use png::{create_png, create_png_auto, create_png_indexed};
