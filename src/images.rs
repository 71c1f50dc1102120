//! Image decoding and physical sizing.
//!
//! Images are sized from their embedded resolution: the PNG `pHYs` chunk or the JPEG
//! JFIF density. Files without a usable resolution are treated as 300 DPI.

use std::path::Path;

use genpdf::error::{Context as _, Error};
use genpdf::Mm;
use image::GenericImageView;

pub const DEFAULT_IMAGE_DPI: f64 = 300.0;
pub const MM_PER_INCH: f64 = 25.4;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const METRES_PER_INCH: f64 = 0.0254;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// A decoded image together with its horizontal and vertical resolution.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub image: image::DynamicImage,
    pub dpi_x: f64,
    pub dpi_y: f64,
}

impl LoadedImage {
    /// Loads and decodes the image at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to open image file {}", path.display()))?;
        Self::decode(&bytes)
            .with_context(|| format!("Failed to decode image file {}", path.display()))
    }

    /// Decodes an image held in memory.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        Self::decode(bytes.as_ref()).context("Failed to decode image from provided bytes")
    }

    fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?;
        let (dpi_x, dpi_y) = image_density(bytes).unwrap_or((DEFAULT_IMAGE_DPI, DEFAULT_IMAGE_DPI));
        Ok(Self {
            image,
            dpi_x,
            dpi_y,
        })
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Native width and height in millimetres.
    pub fn size_mm(&self) -> (f64, f64) {
        let (width, height) = self.pixel_size();
        (
            MM_PER_INCH * f64::from(width) / self.dpi_x,
            MM_PER_INCH * f64::from(height) / self.dpi_y,
        )
    }
}

/// Resolution in dots per inch declared by a PNG or JPEG file, if any.
pub fn image_density(bytes: &[u8]) -> Option<(f64, f64)> {
    let density = if bytes.starts_with(PNG_SIGNATURE) {
        png_density(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        jpeg_density(bytes)
    } else {
        None
    };
    density.filter(|(x, y)| *x > 0.0 && *y > 0.0)
}

fn be_u16(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(..2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(..4)?.try_into().ok()?))
}

fn png_density(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut offset = PNG_SIGNATURE.len();
    while offset + 8 <= bytes.len() {
        let length = be_u32(&bytes[offset..])? as usize;
        let kind = &bytes[offset + 4..offset + 8];
        let data = bytes.get(offset + 8..offset + 8 + length)?;
        match kind {
            b"pHYs" if length >= 9 => {
                // Unit 1 is pixels per metre; unit 0 only gives an aspect ratio.
                if data[8] != 1 {
                    return None;
                }
                let x = f64::from(be_u32(data)?) * METRES_PER_INCH;
                let y = f64::from(be_u32(&data[4..])?) * METRES_PER_INCH;
                return Some((x, y));
            }
            b"IDAT" | b"IEND" => return None,
            _ => offset += 12 + length,
        }
    }
    None
}

fn jpeg_density(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut offset = 2;
    while offset + 4 <= bytes.len() {
        if bytes[offset] != 0xFF {
            return None;
        }
        let marker = bytes[offset + 1];
        // Start of scan: no more header segments.
        if marker == 0xDA {
            return None;
        }
        let length = be_u16(&bytes[offset + 2..])? as usize;
        let segment = bytes.get(offset + 4..offset + 2 + length)?;
        if marker == 0xE0 && segment.starts_with(b"JFIF\0") && segment.len() >= 12 {
            let x = f64::from(be_u16(&segment[8..])?);
            let y = f64::from(be_u16(&segment[10..])?);
            return match segment[7] {
                1 => Some((x, y)),
                2 => Some((x * 2.54, y * 2.54)),
                _ => None,
            };
        }
        offset += 2 + length;
    }
    None
}

/// Returns a copy of a PNG file with a `pHYs` chunk declaring `dpi`.
///
/// The chunk is placed right after `IHDR`; an existing `pHYs` chunk is replaced.
/// Returns `None` when `bytes` is not a well-formed PNG header.
pub fn with_png_density(bytes: &[u8], dpi: f64) -> Option<Vec<u8>> {
    if !bytes.starts_with(PNG_SIGNATURE) {
        return None;
    }
    let ppm = (dpi / METRES_PER_INCH).round() as u32;
    let mut chunk_data = Vec::with_capacity(9);
    chunk_data.extend_from_slice(&ppm.to_be_bytes());
    chunk_data.extend_from_slice(&ppm.to_be_bytes());
    chunk_data.push(1);

    let mut output = Vec::with_capacity(bytes.len() + 21);
    output.extend_from_slice(PNG_SIGNATURE);
    let mut offset = PNG_SIGNATURE.len();
    while offset + 8 <= bytes.len() {
        let length = be_u32(&bytes[offset..])? as usize;
        let end = offset + 12 + length;
        let chunk = bytes.get(offset..end)?;
        let kind = &chunk[4..8];
        if kind != b"pHYs" {
            output.extend_from_slice(chunk);
        }
        if kind == b"IHDR" {
            write_png_chunk(&mut output, b"pHYs", &chunk_data);
        }
        offset = end;
    }
    Some(output)
}

fn write_png_chunk(output: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
    output.extend_from_slice(kind);
    output.extend_from_slice(data);
    let crc = crc32(kind.iter().chain(data.iter()).copied());
    output.extend_from_slice(&crc.to_be_bytes());
}

fn crc32(bytes: impl Iterator<Item = u8>) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{DynamicImage, ImageOutputFormat, RgbImage};

    /// Encodes a blank PNG, optionally with a `pHYs` chunk declaring `dpi`.
    pub fn png_bytes(width: u32, height: u32, dpi: Option<f64>) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Vec::new();
        image
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .expect("encode png");
        match dpi {
            Some(dpi) => super::with_png_density(&bytes, dpi).expect("insert pHYs"),
            None => bytes,
        }
    }
}
