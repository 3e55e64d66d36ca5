//! Tests for PNG encoding of rendered tiles.

use flate2::read::ZlibDecoder;
use renderer::png::{encode, encode_rgba};
use renderer::RgbaTile;
use std::io::Read;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Split a PNG into (type, data) chunks, checking each CRC.
fn chunks(png: &[u8]) -> Vec<(String, Vec<u8>)> {
    assert_eq!(&png[..8], &SIGNATURE);
    let mut out = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind = &png[pos + 4..pos + 8];
        let data = &png[pos + 8..pos + 8 + len];
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(&[kind, data].concat()));
        out.push((String::from_utf8(kind.to_vec()).unwrap(), data.to_vec()));
        pos += 12 + len;
    }
    out
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut raw = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut raw).unwrap();
    raw
}

#[test]
fn test_few_colours_encode_indexed() {
    let mut tile = RgbaTile::filled(4, 2, [10, 20, 30, 255]).unwrap();
    tile.pixels[0..4].copy_from_slice(&[0, 0, 0, 0]);
    let png = tile.to_png().unwrap();
    let chunks = chunks(&png);

    let names: Vec<_> = chunks.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
    assert_eq!(chunks[0].1[9], 3);
    assert_eq!(chunks[1].1, vec![0, 0, 0, 10, 20, 30]);
    assert_eq!(chunks[2].1, vec![0, 255]);

    // filter byte + one index per pixel, per row
    let raw = inflate(&chunks[3].1);
    assert_eq!(raw, vec![0, 0, 1, 1, 1, 0, 1, 1, 1, 1]);
}

#[test]
fn test_opaque_palette_has_no_trns() {
    let png = encode(&RgbaTile::filled(2, 2, [1, 2, 3, 255]).unwrap().pixels, 2, 2).unwrap();
    assert!(chunks(&png).iter().all(|(n, _)| n != "tRNS"));
}

#[test]
fn test_many_colours_encode_rgba() {
    let width = 300;
    let pixels: Vec<u8> = (0..width as u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let png = encode(&pixels, width, 1).unwrap();
    let chunks = chunks(&png);
    assert_eq!(chunks[0].1[9], 6);

    let raw = inflate(&chunks[1].1);
    assert_eq!(raw[0], 0);
    assert_eq!(&raw[1..], &pixels[..]);
}

#[test]
fn test_forced_rgba_matches_input() {
    let tile = RgbaTile::filled(3, 2, [9, 8, 7, 6]).unwrap();
    let png = encode_rgba(&tile.pixels, 3, 2).unwrap();
    let chunks = chunks(&png);
    let raw = inflate(&chunks[1].1);
    assert_eq!(raw.len(), 2 * (1 + 3 * 4));
}
