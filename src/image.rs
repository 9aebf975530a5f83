//! Device-independent image descriptors and conversion to straight RGBA.
//!
//! An [`ImageData`] describes pixels the way a producer hands them over: a
//! depth, a row stride and either channel masks or a palette. Drawing code
//! never looks at that layout directly; it asks for [`ImageData::to_rgba`],
//! which classifies the layout and converts it to four-channel,
//! non-premultiplied bytes.

use std::io::Cursor;

use crate::color::{Color, Rgb};
use crate::error::{GcError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteData {
    Direct {
        red_mask: u32,
        green_mask: u32,
        blue_mask: u32,
    },
    Indexed(Vec<Rgb>),
}

impl PaletteData {
    pub fn direct(red_mask: u32, green_mask: u32, blue_mask: u32) -> Self {
        PaletteData::Direct {
            red_mask,
            green_mask,
            blue_mask,
        }
    }
}

/// Memory order of a pixel layout, as far as the converter cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Rgba8888,
    Bgra8888,
    Argb8888,
    Abgr8888,
    Rgb888,
    Bgr888,
    Indexed,
    Other,
}

impl PixelLayout {
    /// Maps a depth and palette to a byte order. 32-bit pixels are read
    /// big-endian, so `red_mask == 0xFF000000` means red is the first byte.
    pub fn classify(depth: u8, palette: &PaletteData) -> PixelLayout {
        let (r, g, b) = match palette {
            PaletteData::Indexed(_) => return PixelLayout::Indexed,
            PaletteData::Direct {
                red_mask,
                green_mask,
                blue_mask,
            } => (*red_mask, *green_mask, *blue_mask),
        };
        match (depth, r, g, b) {
            (32, 0xFF00_0000, 0x00FF_0000, 0x0000_FF00) => PixelLayout::Rgba8888,
            (32, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000) => PixelLayout::Bgra8888,
            (32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF) => PixelLayout::Argb8888,
            (32, 0x0000_00FF, 0x0000_FF00, 0x00FF_0000) => PixelLayout::Abgr8888,
            (24, 0xFF_0000, 0x00_FF00, 0x00_00FF) => PixelLayout::Rgb888,
            (24, 0x00_00FF, 0x00_FF00, 0xFF_0000) => PixelLayout::Bgr888,
            _ => PixelLayout::Other,
        }
    }

    /// Offsets of (r, g, b, a) inside a 4-byte pixel.
    fn quad_offsets(self) -> Option<[usize; 4]> {
        match self {
            PixelLayout::Rgba8888 => Some([0, 1, 2, 3]),
            PixelLayout::Bgra8888 => Some([2, 1, 0, 3]),
            PixelLayout::Argb8888 => Some([1, 2, 3, 0]),
            PixelLayout::Abgr8888 => Some([3, 2, 1, 0]),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    pub bytes_per_line: usize,
    pub palette: PaletteData,
    pub data: Vec<u8>,
    /// Global alpha applied when no per-pixel source exists.
    pub alpha: Option<u8>,
    /// One byte per pixel, `width` bytes per row.
    pub alpha_data: Option<Vec<u8>>,
    /// 1-bit transparency mask, rows padded to `mask_pad` bytes.
    pub mask_data: Option<Vec<u8>>,
    pub mask_pad: usize,
    pub transparent_pixel: Option<u32>,
}

impl ImageData {
    /// An empty image with the given layout; rows are padded to 4 bytes.
    pub fn new(width: u32, height: u32, depth: u8, palette: PaletteData) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GcError::InvalidDimensions { width, height });
        }
        if !matches!(depth, 1 | 2 | 4 | 8 | 16 | 24 | 32) {
            return Err(GcError::InvalidImage(format!("unsupported depth {depth}")));
        }
        let bytes_per_line = (width as usize * depth as usize).div_ceil(32) * 4;
        Ok(Self {
            width,
            height,
            depth,
            bytes_per_line,
            palette,
            data: vec![0; bytes_per_line * height as usize],
            alpha: None,
            alpha_data: None,
            mask_data: None,
            mask_pad: 2,
            transparent_pixel: None,
        })
    }

    /// Wraps straight RGBA bytes in a 32-bit RGBA descriptor with per-pixel
    /// alpha.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(GcError::InvalidImage(format!(
                "expected {expected} bytes of RGBA, got {}",
                rgba.len()
            )));
        }
        let mut image = Self::new(
            width,
            height,
            32,
            PaletteData::direct(0xFF00_0000, 0x00FF_0000, 0x0000_FF00),
        )?;
        image.data.copy_from_slice(rgba);
        image.alpha_data = Some(rgba.chunks_exact(4).map(|px| px[3]).collect());
        Ok(image)
    }

    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let (color_type, _) = reader.output_color_type();
        let (width, height) = {
            let info = reader.info();
            (info.width, info.height)
        };
        let samples = color_type.samples();
        let mut buf = vec![0; width as usize * height as usize * samples];
        let frame = reader.next_frame(&mut buf)?;
        buf.truncate(frame.buffer_size());

        let rgba: Vec<u8> = match color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(GcError::InvalidImage(
                    "indexed png was not expanded".to_string(),
                ));
            }
        };
        log::debug!(target: "gc", "decoded png {}x{} ({:?})", width, height, color_type);
        Self::from_rgba(width, height, &rgba)
    }

    pub fn layout(&self) -> PixelLayout {
        PixelLayout::classify(self.depth, &self.palette)
    }

    /// Raw pixel value at `(x, y)`: a palette index or a masked direct value.
    pub fn pixel(&self, x: u32, y: u32) -> Result<u32> {
        if x >= self.width || y >= self.height {
            return Err(GcError::InvalidArgument(format!(
                "pixel ({x}, {y}) outside {}x{} image",
                self.width, self.height
            )));
        }
        let row = y as usize * self.bytes_per_line;
        let depth = self.depth as usize;
        let value = match depth {
            32 | 24 | 16 => {
                let bytes = depth / 8;
                let start = row + x as usize * bytes;
                let px = self
                    .data
                    .get(start..start + bytes)
                    .ok_or_else(|| self.short_data())?;
                px.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
            }
            8 => *self
                .data
                .get(row + x as usize)
                .ok_or_else(|| self.short_data())? as u32,
            1 | 2 | 4 => {
                let bit = x as usize * depth;
                let byte = *self
                    .data
                    .get(row + bit / 8)
                    .ok_or_else(|| self.short_data())?;
                let shift = 8 - depth - (bit % 8);
                ((byte >> shift) as u32) & ((1 << depth) - 1)
            }
            _ => return Err(GcError::InvalidImage(format!("unsupported depth {depth}"))),
        };
        Ok(value)
    }

    /// Converts to tightly packed, non-premultiplied RGBA.
    ///
    /// 32-bit layouts with a known byte order are swizzled directly; every
    /// other layout is decoded pixel by pixel. Alpha comes from the first
    /// source present: `alpha_data`, `mask_data`, `transparent_pixel`,
    /// `alpha`, otherwise opaque. Indexed images below 8 bits are only as
    /// faithful as their palette.
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let (w, h) = (self.width as usize, self.height as usize);
        let layout = self.layout();
        log::debug!(target: "gc", "converting {}x{} image with layout {:?}", w, h, layout);

        let mut out = vec![0u8; w * h * 4];
        for y in 0..h {
            for x in 0..w {
                let dst = (y * w + x) * 4;
                let (r, g, b) = match layout.quad_offsets() {
                    Some([ro, go, bo, _]) => {
                        let src = y * self.bytes_per_line + x * 4;
                        let px = &self.data[src..src + 4];
                        (px[ro], px[go], px[bo])
                    }
                    None => self.decode_rgb(self.pixel(x as u32, y as u32)?)?,
                };
                out[dst] = r;
                out[dst + 1] = g;
                out[dst + 2] = b;
                out[dst + 3] = self.alpha_at(x, y)?;
            }
        }
        Ok(out)
    }

    fn decode_rgb(&self, pixel: u32) -> Result<(u8, u8, u8)> {
        match &self.palette {
            PaletteData::Indexed(colors) => colors
                .get(pixel as usize)
                .map(|c| (c.red, c.green, c.blue))
                .ok_or_else(|| {
                    GcError::InvalidImage(format!("palette index {pixel} out of range"))
                }),
            PaletteData::Direct {
                red_mask,
                green_mask,
                blue_mask,
            } => Ok((
                extract_channel(pixel, *red_mask),
                extract_channel(pixel, *green_mask),
                extract_channel(pixel, *blue_mask),
            )),
        }
    }

    fn alpha_at(&self, x: usize, y: usize) -> Result<u8> {
        if let Some(alpha) = &self.alpha_data {
            return Ok(alpha[y * self.width as usize + x]);
        }
        if let Some(mask) = &self.mask_data {
            let row_bytes = mask_row_bytes(self.width as usize, self.mask_pad);
            let byte = mask[y * row_bytes + x / 8];
            let set = byte & (0x80 >> (x % 8)) != 0;
            return Ok(if set { 255 } else { 0 });
        }
        if let Some(transparent) = self.transparent_pixel {
            let pixel = self.pixel(x as u32, y as u32)?;
            return Ok(if pixel == transparent { 0 } else { 255 });
        }
        Ok(self.alpha.unwrap_or(255))
    }

    fn validate(&self) -> Result<()> {
        let (w, h) = (self.width as usize, self.height as usize);
        if w == 0 || h == 0 {
            return Err(GcError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let min_stride = (w * self.depth as usize).div_ceil(8);
        if self.bytes_per_line < min_stride || self.data.len() < self.bytes_per_line * h {
            return Err(self.short_data());
        }
        if let Some(alpha) = &self.alpha_data
            && alpha.len() < w * h
        {
            return Err(GcError::InvalidImage(format!(
                "alpha data has {} bytes, need {}",
                alpha.len(),
                w * h
            )));
        }
        if let Some(mask) = &self.mask_data
            && mask.len() < mask_row_bytes(w, self.mask_pad) * h
        {
            return Err(GcError::InvalidImage("mask data too short".to_string()));
        }
        Ok(())
    }

    fn short_data(&self) -> GcError {
        GcError::InvalidImage(format!(
            "{} bytes cannot hold {}x{} pixels at depth {} with stride {}",
            self.data.len(),
            self.width,
            self.height,
            self.depth,
            self.bytes_per_line
        ))
    }

    /// Straight-alpha colour at `(x, y)` after conversion.
    pub fn color_at(&self, x: u32, y: u32) -> Result<Color> {
        let (r, g, b) = self.decode_rgb(self.pixel(x, y)?)?;
        let a = self.alpha_at(x as usize, y as usize)?;
        Ok(Color::rgba(r, g, b, a))
    }
}

fn mask_row_bytes(width: usize, pad: usize) -> usize {
    let pad = pad.max(1);
    width.div_ceil(8).div_ceil(pad) * pad
}

/// Extracts a masked channel and stretches it to 8 bits.
fn extract_channel(pixel: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let shift = mask.trailing_zeros();
    let bits = (mask >> shift).count_ones();
    let value = (pixel & mask) >> shift;
    let max = (1u32 << bits) - 1;
    if bits >= 8 {
        (value >> (bits - 8)) as u8
    } else {
        ((value * 255 + max / 2) / max) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_layouts() {
        let rgba = PaletteData::direct(0xFF00_0000, 0x00FF_0000, 0x0000_FF00);
        let bgr = PaletteData::direct(0x0000FF, 0x00FF00, 0xFF0000);
        assert_eq!(PixelLayout::classify(32, &rgba), PixelLayout::Rgba8888);
        assert_eq!(PixelLayout::classify(24, &bgr), PixelLayout::Bgr888);
        assert_eq!(
            PixelLayout::classify(16, &PaletteData::direct(0x7C00, 0x03E0, 0x001F)),
            PixelLayout::Other
        );
        assert_eq!(
            PixelLayout::classify(8, &PaletteData::Indexed(vec![])),
            PixelLayout::Indexed
        );
    }

    #[test]
    fn bgra_is_swizzled() {
        let mut image = ImageData::new(
            1,
            1,
            32,
            PaletteData::direct(0x0000_FF00, 0x00FF_0000, 0xFF00_0000),
        )
        .unwrap();
        image.data.copy_from_slice(&[10, 20, 30, 0]);
        assert_eq!(image.to_rgba().unwrap(), vec![30, 20, 10, 255]);
    }

    #[test]
    fn rgb555_channels_stretch_to_full_range() {
        let mut image =
            ImageData::new(2, 1, 16, PaletteData::direct(0x7C00, 0x03E0, 0x001F)).unwrap();
        image.data[..4].copy_from_slice(&[0x7C, 0x00, 0x00, 0x1F]);
        let rgba = image.to_rgba().unwrap();
        assert_eq!(&rgba[..4], &[255, 0, 0, 255]);
        assert_eq!(&rgba[4..], &[0, 0, 255, 255]);
    }

    #[test]
    fn indexed_with_mask_synthesises_alpha() {
        let palette = PaletteData::Indexed(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 0)]);
        let mut image = ImageData::new(2, 1, 1, palette).unwrap();
        image.data[0] = 0b0100_0000;
        image.mask_data = Some(vec![0b1000_0000, 0]);
        let rgba = image.to_rgba().unwrap();
        assert_eq!(rgba, vec![0, 0, 0, 255, 255, 255, 0, 0]);
    }

    #[test]
    fn transparent_pixel_clears_alpha() {
        let palette = PaletteData::Indexed(vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
        let mut image = ImageData::new(2, 1, 8, palette).unwrap();
        image.data[..2].copy_from_slice(&[0, 1]);
        image.transparent_pixel = Some(1);
        image.alpha = Some(7);
        assert_eq!(image.to_rgba().unwrap(), vec![1, 2, 3, 255, 4, 5, 6, 0]);
    }

    #[test]
    fn global_alpha_applies_without_per_pixel_source() {
        let mut image = ImageData::new(
            1,
            1,
            24,
            PaletteData::direct(0xFF0000, 0x00FF00, 0x0000FF),
        )
        .unwrap();
        image.data[..3].copy_from_slice(&[9, 8, 7]);
        image.alpha = Some(50);
        assert_eq!(image.color_at(0, 0).unwrap(), Color::rgba(9, 8, 7, 50));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut image = ImageData::new(4, 4, 32, PaletteData::direct(0xFF, 0xFF00, 0xFF0000))
            .unwrap();
        image.data.truncate(10);
        assert!(matches!(image.to_rgba(), Err(GcError::InvalidImage(_))));
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(ImageData::from_rgba(2, 2, &[0; 15]).is_err());
        let image = ImageData::from_rgba(1, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(image.to_rgba().unwrap(), vec![1, 2, 3, 4]);
    }
}
