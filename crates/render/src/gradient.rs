//! Value-to-color mapping for raster maps.

use serde::Deserialize;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// Map a normalized value (0-1) through a multi-stop gradient.
fn ramp(stops: &[Color], norm: f32) -> Color {
    let norm = norm.clamp(0.0, 1.0);
    if stops.len() == 1 {
        return stops[0];
    }
    let scaled = norm * (stops.len() - 1) as f32;
    let i = (scaled as usize).min(stops.len() - 2);
    interpolate_color(stops[i], stops[i + 1], scaled - i as f32)
}

/// Evapotranspiration scale: dry tan through green to deep blue.
pub fn et_color(norm: f32) -> Color {
    ramp(
        &[
            Color::new(235, 220, 175, 255), // dry
            Color::new(170, 210, 120, 255),
            Color::new(60, 170, 80, 255),
            Color::new(0, 120, 140, 255),
            Color::new(10, 50, 120, 255), // wet
        ],
        norm,
    )
}

/// Vegetation-index scale: bare brown through yellow to dense green.
pub fn ndvi_color(norm: f32) -> Color {
    ramp(
        &[
            Color::new(150, 100, 50, 255),
            Color::new(220, 200, 120, 255),
            Color::new(120, 180, 60, 255),
            Color::new(20, 100, 20, 255),
        ],
        norm,
    )
}

/// Snow-cover scale: dark ground to white snow.
pub fn snow_color(norm: f32) -> Color {
    ramp(
        &[
            Color::new(60, 60, 60, 255),
            Color::new(140, 160, 180, 255),
            Color::new(255, 255, 255, 255),
        ],
        norm,
    )
}

/// Diverging scale for anomaly/EOF maps: blue through white to red,
/// centered at 0.5.
pub fn diverging_color(norm: f32) -> Color {
    ramp(
        &[
            Color::new(30, 60, 180, 255),
            Color::new(255, 255, 255, 255),
            Color::new(180, 30, 40, 255),
        ],
        norm,
    )
}

/// Named color scales, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    #[default]
    Et,
    Ndvi,
    Snow,
    Diverging,
}

impl ColorScale {
    pub fn color(&self, norm: f32) -> Color {
        match self {
            ColorScale::Et => et_color(norm),
            ColorScale::Ndvi => ndvi_color(norm),
            ColorScale::Snow => snow_color(norm),
            ColorScale::Diverging => diverging_color(norm),
        }
    }
}

/// Render grid data as RGBA pixels.
///
/// Values are normalized into `min_val..max_val` before the color function
/// is applied; NaN cells come out fully transparent.
pub fn render_grid<F>(
    data: &[f32],
    width: usize,
    height: usize,
    min_val: f32,
    max_val: f32,
    color_fn: F,
) -> Vec<u8>
where
    F: Fn(f32) -> Color,
{
    let mut pixels = vec![0u8; width * height * 4];

    let range = max_val - min_val;
    let range = if range.abs() < 1e-6 { 1.0 } else { range };

    for (idx, &value) in data.iter().enumerate().take(width * height) {
        let color = if value.is_nan() {
            Color::transparent()
        } else {
            let normalized = ((value - min_val) / range).clamp(0.0, 1.0);
            color_fn(normalized)
        };

        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}

/// Minimum and maximum over a slice, ignoring NaN.
pub fn value_range(data: &[f32]) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in data {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        let lo = et_color(0.0);
        let hi = et_color(1.0);
        assert_eq!(lo, Color::new(235, 220, 175, 255));
        assert_eq!(hi, Color::new(10, 50, 120, 255));
    }

    #[test]
    fn test_diverging_center_is_white() {
        let mid = diverging_color(0.5);
        assert!(mid.r > 240 && mid.g > 240 && mid.b > 240);
    }

    #[test]
    fn test_render_grid_nan_transparent() {
        let data = vec![0.0, f32::NAN, 1.0, 0.5];
        let pixels = render_grid(&data, 2, 2, 0.0, 1.0, et_color);

        assert_eq!(pixels.len(), 16);
        assert_eq!(pixels[7], 0, "NaN pixel must be transparent");
        assert_eq!(pixels[3], 255, "valid pixel must be opaque");
    }

    #[test]
    fn test_render_grid_constant_range() {
        // Degenerate range must not divide by zero
        let data = vec![5.0; 4];
        let pixels = render_grid(&data, 2, 2, 5.0, 5.0, et_color);
        assert_eq!(pixels.len(), 16);
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[1.0, f32::NAN, -2.0, 4.0]), Some((-2.0, 4.0)));
        assert_eq!(value_range(&[f32::NAN]), None);
    }
}
