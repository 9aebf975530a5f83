//! RGBA colour values shared by every backend.

/// An immutable RGBA colour with 8 bits per channel (straight alpha).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const GRAY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GRAY: Color = Color::rgb(128, 128, 128);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns this colour with its alpha multiplied by `alpha / 255`.
    pub fn with_opacity(self, alpha: u8) -> Self {
        let a = (self.alpha as u16 * alpha as u16 + 127) / 255;
        Self {
            alpha: a as u8,
            ..self
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha == 255
    }

    /// Channels as `f64` in `0.0..=1.0`, in r, g, b, a order.
    pub fn to_unit(&self) -> (f64, f64, f64, f64) {
        (
            self.red as f64 / 255.0,
            self.green as f64 / 255.0,
            self.blue as f64 / 255.0,
            self.alpha as f64 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::rgb(rgb.red, rgb.green, rgb.blue)
    }
}

/// Opaque palette entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_compare_by_value() {
        assert_eq!(Color::rgb(255, 0, 0), Color::RED);
        assert_ne!(Color::rgba(255, 0, 0, 254), Color::RED);
    }

    #[test]
    fn opacity_scales_alpha() {
        assert_eq!(Color::RED.with_opacity(255), Color::RED);
        assert_eq!(Color::RED.with_opacity(0).alpha, 0);
        assert_eq!(Color::rgba(0, 0, 0, 200).with_opacity(128).alpha, 100);
    }
}
