//! Logical font descriptors. Backends resolve these lazily into their own
//! glyph-rendering objects.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };
    pub const BOLD: FontStyle = FontStyle {
        bold: true,
        italic: false,
    };
    pub const ITALIC: FontStyle = FontStyle {
        bold: false,
        italic: true,
    };
}

/// Family name, height in points and style bits.
#[derive(Clone, Debug, PartialEq)]
pub struct FontData {
    pub name: String,
    pub height: f32,
    pub style: FontStyle,
}

impl FontData {
    pub fn new(name: impl Into<String>, height: f32, style: FontStyle) -> Self {
        Self {
            name: name.into(),
            height,
            style,
        }
    }

    /// Glyph size in physical pixels: the point height scaled by the surface
    /// zoom and then by the device's text-scale factor.
    pub fn pixel_size(&self, zoom: crate::dpi::Zoom, device_zoom: f32) -> f32 {
        crate::dpi::to_pixels_f(self.height, zoom) * device_zoom
    }
}

impl Default for FontData {
    fn default() -> Self {
        Self::new("Sans", 10.0, FontStyle::NORMAL)
    }
}

/// A font resource. The first descriptor is the one used for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    data: Vec<FontData>,
}

impl Font {
    pub fn new(data: FontData) -> Self {
        Self { data: vec![data] }
    }

    /// Builds a font from several descriptors; the first one wins when
    /// drawing. Returns `None` when `data` is empty.
    pub fn with_fallbacks(data: Vec<FontData>) -> Option<Self> {
        if data.is_empty() {
            None
        } else {
            Some(Self { data })
        }
    }

    pub fn font_data(&self) -> &[FontData] {
        &self.data
    }

    pub fn primary(&self) -> &FontData {
        &self.data[0]
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(FontData::default())
    }
}

/// Font metrics in logical units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub height: i32,
    pub average_char_width: f32,
}
