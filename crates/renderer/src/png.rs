//! PNG encoding for rendered tiles and legends.
//!
//! Tiles styled through a colour ramp usually hold few distinct colours, so
//! the encoder first tries an indexed image (colour type 3, with a `tRNS`
//! chunk when any entry is translucent) and falls back to truecolour with
//! alpha (colour type 6) once more than 256 colours are seen.

use ows_common::RenderError;
use std::collections::HashMap;
use std::io::Write;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const MAX_PALETTE_SIZE: usize = 256;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode RGBA8 pixels, picking indexed or RGBA output automatically.
pub fn encode(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_dimensions(pixels, width, height)?;
    match Palette::extract(pixels) {
        Some(palette) => encode_indexed(&palette, width, height),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode RGBA8 pixels as a truecolour PNG.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_dimensions(pixels, width, height)?;
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_RGBA));
    write_chunk(&mut png, b"IDAT", &deflate_rows(pixels, width * 4)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn encode_indexed(palette: &Palette, width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette
        .colors
        .iter()
        .flat_map(|c| [c[0], c[1], c[2]])
        .collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.colors.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_rows(&palette.indices, width)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Distinct colours of an image plus each pixel's index into them.
#[derive(Debug)]
struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl Palette {
    /// `None` when the image has more than 256 colours.
    fn extract(pixels: &[u8]) -> Option<Self> {
        let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
        let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
        let mut indices = Vec::with_capacity(pixels.len() / 4);

        for px in pixels.chunks_exact(4) {
            let key = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    if colors.len() == MAX_PALETTE_SIZE {
                        return None;
                    }
                    let index = colors.len() as u8;
                    colors.push([px[0], px[1], px[2], px[3]]);
                    lookup.insert(key, index);
                    index
                }
            };
            indices.push(index);
        }
        Some(Self { colors, indices })
    }
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

fn header(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0
    ihdr
}

/// Prefix every scanline with filter type 0 and zlib-compress.
fn deflate_rows(data: &[u8], row_bytes: usize) -> Result<Vec<u8>, RenderError> {
    let mut raw = Vec::with_capacity(data.len() + data.len() / row_bytes);
    for row in data.chunks_exact(row_bytes) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let compress_err = |e: std::io::Error| RenderError::Encode(format!("IDAT compression failed: {}", e));
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
