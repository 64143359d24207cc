//! PNG encoding for RGBA image data.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has <=256 unique
//!   colors. Smaller files, faster to encode.
//! - **RGBA PNG (color type 6)**: fallback for images with more colors.
//!
//! Use `create_png_auto` for automatic mode selection.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RenderError, RenderResult};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Create a PNG image with automatic format selection.
///
/// If the pixel data uses <=256 unique colors an indexed PNG is produced,
/// otherwise a full RGBA PNG.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    match extract_palette(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Create an RGBA PNG (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "pixel buffer has {} bytes, {}x{} RGBA needs {}",
            pixels.len(),
            width,
            height,
            width * height * 4
        )));
    }

    // Raw scanlines, each prefixed with filter type 0 (None)
    let mut raw = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks_exact(width * 4) {
        raw.push(0u8);
        raw.extend_from_slice(row);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr(width, height, 6));
    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Create an indexed PNG (color type 3) from a palette and per-pixel
/// indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> RenderResult<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette has {} entries",
            palette.len()
        )));
    }
    if indices.len() != width * height {
        return Err(RenderError::Encode(format!(
            "index buffer has {} entries, image is {}x{}",
            indices.len(),
            width,
            height
        )));
    }

    let mut plte = Vec::with_capacity(palette.len() * 3);
    let mut trns = Vec::with_capacity(palette.len());
    for &(r, g, b, a) in palette {
        plte.extend_from_slice(&[r, g, b]);
        trns.push(a);
    }

    let mut raw = Vec::with_capacity(height * (1 + width));
    for row in indices.chunks_exact(width) {
        raw.push(0u8);
        raw.extend_from_slice(row);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr(width, height, 3));
    write_chunk(&mut out, b"PLTE", &plte);
    // tRNS is only needed when some entry is not fully opaque
    if trns.iter().any(|&a| a != 255) {
        write_chunk(&mut out, b"tRNS", &trns);
    }
    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Pack RGBA bytes into a u32 for fast hashing.
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Extract a palette and index buffer, or None when the image has more
/// than 256 unique colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression
    data.push(0); // filter
    data.push(0); // interlace
    data
}

fn deflate(raw: &[u8]) -> RenderResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_pixels(width: usize, height: usize) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    ((x * 255) / width.max(1)) as u8,
                    ((y * 255) / height.max(1)) as u8,
                    128,
                    255,
                ]);
            }
        }
        pixels
    }

    #[test]
    fn test_png_signature_and_ihdr() {
        let pixels = gradient_pixels(16, 8);
        let png = create_png(&pixels, 16, 8).unwrap();

        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        // IHDR chunk: length 13, type, then width/height big-endian
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &16u32.to_be_bytes());
        assert_eq!(&png[20..24], &8u32.to_be_bytes());
        // RGBA color type
        assert_eq!(png[25], 6);
        // File ends with IEND
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_auto_uses_indexed_for_few_colors() {
        // Two colors only
        let mut pixels = Vec::new();
        for i in 0..64 {
            if i % 2 == 0 {
                pixels.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 255, 0]);
            }
        }

        let png = create_png_auto(&pixels, 8, 8).unwrap();
        // Indexed color type in IHDR
        assert_eq!(png[25], 3);
        // Palette chunk present
        assert!(png.windows(4).any(|w| w == b"PLTE"));
        // Transparency chunk present (one entry has alpha 0)
        assert!(png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_auto_falls_back_to_rgba() {
        // 16x16 gradient with ~256+ unique colors plus alpha variation
        let mut pixels = Vec::new();
        for i in 0..512usize {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 2 % 256) as u8, 7, 255]);
        }
        let png = create_png_auto(&pixels, 32, 16).unwrap();
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        assert!(create_png(&[0u8; 10], 4, 4).is_err());
        assert!(create_png_indexed(4, 4, &[(0, 0, 0, 255)], &[0u8; 10]).is_err());
    }
}
