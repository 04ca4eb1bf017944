//! PNG decoding into PDF image XObject data
//!
//! PDF has no native PNG filter. The decoded samples are split into a color
//! plane and an optional alpha plane, each re-compressed with zlib so they can
//! be stored as `/FlateDecode` streams. The alpha plane becomes a `/SMask`.

use crate::error::CompositeError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Cursor, Write};

/// Color space of the decoded color plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static [u8] {
        match self {
            ColorSpace::DeviceRgb => b"DeviceRGB",
            ColorSpace::DeviceGray => b"DeviceGray",
        }
    }

    fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceRgb => 3,
            ColorSpace::DeviceGray => 1,
        }
    }
}

/// Flate-compressed image planes ready to embed
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// zlib-compressed color samples, 8 bits per component
    pub color_data: Vec<u8>,
    /// zlib-compressed alpha samples, present only for translucent images
    pub alpha_data: Option<Vec<u8>>,
}

/// Decode a PNG into flate-compressed color and alpha planes
pub fn decode_png(bytes: &[u8]) -> Result<PdfImage, CompositeError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    // Palette and sub-byte depths expand to 8-bit, 16-bit strips to 8-bit
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| CompositeError::ImageDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CompositeError::ImageDecode(e.to_string()))?;
    let samples = &buf[..info.buffer_size()];

    let (color_space, has_alpha_channel) = match info.color_type {
        png::ColorType::Rgb => (ColorSpace::DeviceRgb, false),
        png::ColorType::Rgba => (ColorSpace::DeviceRgb, true),
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, false),
        png::ColorType::GrayscaleAlpha => (ColorSpace::DeviceGray, true),
        png::ColorType::Indexed => {
            return Err(CompositeError::ImageDecode(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };

    let pixel_count = (info.width as usize) * (info.height as usize);
    let components = color_space.components();

    let (color, alpha) = if has_alpha_channel {
        let stride = components + 1;
        let mut color = Vec::with_capacity(pixel_count * components);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in samples.chunks_exact(stride) {
            color.extend_from_slice(&pixel[..components]);
            alpha.push(pixel[components]);
        }
        let translucent = alpha.iter().any(|&a| a != 255);
        (color, translucent.then_some(alpha))
    } else {
        (samples.to_vec(), None)
    };

    let alpha_data = match alpha {
        Some(alpha) => Some(flate_compress(&alpha)?),
        None => None,
    };

    Ok(PdfImage {
        width: info.width,
        height: info.height,
        color_space,
        color_data: flate_compress(&color)?,
        alpha_data,
    })
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>, CompositeError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| CompositeError::ImageEncode(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompositeError::ImageEncode(e.to_string()))
}

#[cfg(test)]
pub(crate) fn encode_test_png(
    width: u32,
    height: u32,
    color: png::ColorType,
    pixels: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(pixels).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rgba_with_transparency_has_smask() {
        let pixels = [255, 0, 0, 255, 0, 0, 255, 0];
        let png = encode_test_png(2, 1, png::ColorType::Rgba, &pixels);

        let image = decode_png(&png).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 1);
        assert_eq!(image.color_space, ColorSpace::DeviceRgb);
        assert_eq!(inflate(&image.color_data), vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(inflate(image.alpha_data.as_ref().unwrap()), vec![255, 0]);
    }

    #[test]
    fn test_opaque_rgba_drops_alpha() {
        let pixels = [10, 20, 30, 255];
        let png = encode_test_png(1, 1, png::ColorType::Rgba, &pixels);

        let image = decode_png(&png).unwrap();
        assert!(image.alpha_data.is_none());
        assert_eq!(inflate(&image.color_data), vec![10, 20, 30]);
    }

    #[test]
    fn test_grayscale() {
        let png = encode_test_png(3, 1, png::ColorType::Grayscale, &[0, 128, 255]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.color_space, ColorSpace::DeviceGray);
        assert_eq!(image.color_space.pdf_name(), b"DeviceGray");
        assert_eq!(inflate(&image.color_data), vec![0, 128, 255]);
    }

    #[test]
    fn test_not_a_png_fails() {
        let err = decode_png(b"%PDF-1.7 definitely not an image").unwrap_err();
        assert!(matches!(err, CompositeError::ImageDecode(_)));
    }

    #[test]
    fn test_empty_bytes_fail() {
        assert!(decode_png(&[]).is_err());
    }
}
