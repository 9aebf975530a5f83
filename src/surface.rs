//! Drawing surfaces shared by both backends.
//!
//! A [`Surface`] owns a premultiplied RGBA pixel store in physical pixels
//! together with the zoom of the monitor or image it belongs to. Cloning a
//! `Surface` clones the handle, not the pixels.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::color::Color;
use crate::dpi::{self, Zoom};
use crate::error::{GcError, Result};
use crate::image::ImageData;

#[derive(Debug)]
struct SurfaceStore {
    width: u32,
    height: u32,
    zoom: Zoom,
    pixels: RefCell<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub struct Surface {
    store: Rc<SurfaceStore>,
}

impl Surface {
    /// A transparent surface of `width` x `height` physical pixels.
    pub fn new(width: u32, height: u32, zoom: Zoom) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(GcError::InvalidDimensions { width, height });
        }
        Ok(Self {
            store: Rc::new(SurfaceStore {
                width,
                height,
                zoom,
                pixels: RefCell::new(vec![0; width as usize * height as usize * 4]),
            }),
        })
    }

    /// A surface initialised from an image; the image size is taken as
    /// physical pixels.
    pub fn from_image(image: &ImageData, zoom: Zoom) -> Result<Self> {
        let rgba = image.to_rgba()?;
        let surface = Self::new(image.width, image.height, zoom)?;
        {
            let mut pixels = surface.pixels_mut();
            for (dst, src) in pixels.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
                dst.copy_from_slice(&premultiply([src[0], src[1], src[2], src[3]]));
            }
        }
        Ok(surface)
    }

    pub fn width(&self) -> u32 {
        self.store.width
    }

    pub fn height(&self) -> u32 {
        self.store.height
    }

    pub fn zoom(&self) -> Zoom {
        self.store.zoom
    }

    /// Size in logical units.
    pub fn logical_size(&self) -> (i32, i32) {
        (
            dpi::to_logical(self.store.width as i32, self.store.zoom),
            dpi::to_logical(self.store.height as i32, self.store.zoom),
        )
    }

    /// Whether both handles refer to the same pixel store.
    pub fn same_store(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    pub fn fill(&self, color: Color) {
        let px = premultiply([color.red, color.green, color.blue, color.alpha]);
        for dst in self.pixels_mut().chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Straight-alpha colour of the physical pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Result<Color> {
        if x >= self.store.width || y >= self.store.height {
            return Err(GcError::InvalidArgument(format!(
                "pixel ({x}, {y}) outside {}x{} surface",
                self.store.width, self.store.height
            )));
        }
        let idx = (y as usize * self.store.width as usize + x as usize) * 4;
        let pixels = self.pixels();
        let [r, g, b, a] = demultiply([
            pixels[idx],
            pixels[idx + 1],
            pixels[idx + 2],
            pixels[idx + 3],
        ]);
        Ok(Color::rgba(r, g, b, a))
    }

    /// Non-premultiplied RGBA copy of the whole surface.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels()
            .chunks_exact(4)
            .flat_map(|p| demultiply([p[0], p[1], p[2], p[3]]))
            .collect()
    }

    pub fn to_image_data(&self) -> Result<ImageData> {
        ImageData::from_rgba(self.store.width, self.store.height, &self.to_rgba())
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.store.width, self.store.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.to_rgba())?;
        }
        Ok(buf)
    }

    pub(crate) fn pixels(&self) -> Ref<'_, Vec<u8>> {
        self.store.pixels.borrow()
    }

    pub(crate) fn pixels_mut(&self) -> RefMut<'_, Vec<u8>> {
        self.store.pixels.borrow_mut()
    }
}

/// Straight to premultiplied alpha, rounding to nearest.
pub(crate) fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    match a {
        255 => [r, g, b, a],
        0 => [0, 0, 0, 0],
        _ => {
            let a16 = a as u16;
            [
                ((r as u16 * a16 + 127) / 255) as u8,
                ((g as u16 * a16 + 127) / 255) as u8,
                ((b as u16 * a16 + 127) / 255) as u8,
                a,
            ]
        }
    }
}

pub(crate) fn demultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    match a {
        255 => [r, g, b, a],
        0 => [0, 0, 0, 0],
        _ => {
            let a32 = a as u32;
            let channel = |c: u8| ((c as u32 * 255 + a32 / 2) / a32).min(255) as u8;
            [channel(r), channel(g), channel(b), a]
        }
    }
}
