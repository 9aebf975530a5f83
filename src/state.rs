//! Drawing state common to both backends, and the logical-to-pixel mapping
//! every draw call goes through.

use crate::api::{Antialias, Clip, FillRule, LineAttributes, LineStyle, Pattern};
use crate::color::Color;
use crate::dpi::{self, Zoom};
use crate::error::{GcError, Result};
use crate::font::Font;
use crate::geometry::{Point, Rectangle, Region};
use crate::transform::Transform;

const DASH: &[i32] = &[18, 6];
const DOT: &[i32] = &[3, 3];
const DASH_DOT: &[i32] = &[9, 6, 3, 6];
const DASH_DOT_DOT: &[i32] = &[9, 3, 3, 3, 3, 3];

/// Everything a context remembers between calls. Fresh contexts start from
/// `GcState::default()`; children never inherit their parent's state.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GcState {
    pub foreground: Color,
    pub background: Color,
    pub alpha: u8,
    pub font: Font,
    pub line: LineAttributes,
    pub antialias: Antialias,
    pub advanced: bool,
    pub fill_rule: FillRule,
    pub transform: Transform,
    pub xor_mode: bool,
    pub foreground_pattern: Option<Pattern>,
    pub background_pattern: Option<Pattern>,
    pub clip: Option<Clip>,
}

impl Default for GcState {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::WHITE,
            alpha: 255,
            font: Font::default(),
            line: LineAttributes::default(),
            antialias: Antialias::Default,
            advanced: false,
            fill_rule: FillRule::EvenOdd,
            transform: Transform::IDENTITY,
            xor_mode: false,
            foreground_pattern: None,
            background_pattern: None,
            clip: None,
        }
    }
}

impl GcState {
    pub fn set_alpha(&mut self, alpha: u8) {
        if alpha != 255 {
            self.advanced = true;
        }
        self.alpha = alpha;
    }

    pub fn set_antialias(&mut self, antialias: Antialias) {
        if antialias != Antialias::Default {
            self.advanced = true;
        }
        self.antialias = antialias;
    }

    pub fn set_transform(&mut self, transform: Option<&Transform>) {
        match transform {
            Some(t) => {
                self.transform = *t;
                self.advanced = true;
            }
            None => self.transform = Transform::IDENTITY,
        }
    }

    pub fn set_advanced(&mut self, advanced: bool) {
        if !advanced {
            self.alpha = 255;
            self.antialias = Antialias::Default;
            self.transform = Transform::IDENTITY;
        }
        self.advanced = advanced;
    }

    pub fn set_clip(&mut self, clip: Option<&Clip>) {
        if let Some(Clip::Path(_)) = clip {
            self.advanced = true;
        }
        self.clip = clip.cloned();
    }

    pub fn set_line_width(&mut self, width: i32) -> Result<()> {
        if width < 0 {
            return Err(GcError::InvalidArgument(format!(
                "line width must not be negative, got {width}"
            )));
        }
        self.line.width = width;
        Ok(())
    }

    pub fn set_line_style(&mut self, style: LineStyle) {
        self.line.style = match style {
            LineStyle::Custom if self.line.dash.is_none() => LineStyle::Solid,
            other => other,
        };
    }

    pub fn set_line_dash(&mut self, dash: Option<&[i32]>) -> Result<()> {
        match dash {
            Some(d) if !d.is_empty() => {
                validate_dash(d)?;
                self.line.dash = Some(d.to_vec());
                self.line.style = LineStyle::Custom;
            }
            _ => {
                self.line.dash = None;
                self.line.style = LineStyle::Solid;
            }
        }
        Ok(())
    }

    pub fn set_line_attributes(&mut self, attributes: &LineAttributes) -> Result<()> {
        self.set_line_width(attributes.width)?;
        if let Some(d) = &attributes.dash {
            validate_dash(d)?;
        }
        self.line.cap = attributes.cap;
        self.line.join = attributes.join;
        self.line.miter_limit = attributes.miter_limit;
        self.line.dash = attributes.dash.clone().filter(|d| !d.is_empty());
        self.set_line_style(attributes.style);
        Ok(())
    }

    /// Foreground with the global alpha folded in.
    pub fn stroke_color(&self) -> Color {
        self.foreground.with_opacity(self.alpha)
    }

    pub fn fill_color(&self) -> Color {
        self.background.with_opacity(self.alpha)
    }

    pub fn anti_alias(&self) -> bool {
        self.antialias != Antialias::Off
    }

    pub fn line_width_pixels(&self, zoom: Zoom) -> i32 {
        dpi::to_pixels(self.line.width, zoom)
    }

    /// Dash lengths in pixels, or `None` for solid lines. Built-in styles
    /// scale with the line width; the result always has an even length.
    pub fn dash_pixels(&self, zoom: Zoom) -> Option<Vec<f32>> {
        let (base, factor) = match self.line.style {
            LineStyle::Solid => return None,
            LineStyle::Dash => (DASH, self.line.width.max(1)),
            LineStyle::Dot => (DOT, self.line.width.max(1)),
            LineStyle::DashDot => (DASH_DOT, self.line.width.max(1)),
            LineStyle::DashDotDot => (DASH_DOT_DOT, self.line.width.max(1)),
            LineStyle::Custom => (self.line.dash.as_deref()?, 1),
        };
        let mut dash: Vec<f32> = base
            .iter()
            .map(|&v| dpi::to_pixels_f(v as f32 * factor as f32, zoom))
            .collect();
        if dash.len() % 2 == 1 {
            dash.extend_from_within(..);
        }
        Some(dash)
    }

    /// Clip bounds clamped to `area`, or `area` itself when unclipped.
    pub fn clip_bounds(&self, area: Rectangle) -> Rectangle {
        match &self.clip {
            None => area,
            Some(Clip::Rectangle(r)) => r.normalized().intersection(&area),
            Some(Clip::Region(region)) => region.bounds().intersection(&area),
            Some(Clip::Path(path)) => {
                let (x, y, w, h) = path.bounds();
                let left = x.floor() as i32;
                let top = y.floor() as i32;
                let bounds = Rectangle::new(
                    left,
                    top,
                    (x + w).ceil() as i32 - left,
                    (y + h).ceil() as i32 - top,
                );
                bounds.intersection(&area)
            }
        }
    }

    pub fn clip_region(&self, area: Rectangle) -> Region {
        match &self.clip {
            Some(Clip::Region(region)) => {
                let mut clipped = Region::new();
                for r in region.rects() {
                    clipped.add(r.intersection(&area));
                }
                clipped
            }
            _ => Region::from_rect(self.clip_bounds(area)),
        }
    }
}

fn validate_dash(dash: &[i32]) -> Result<()> {
    if dash.iter().any(|&v| v <= 0) {
        return Err(GcError::InvalidArgument(format!(
            "dash lengths must be positive, got {dash:?}"
        )));
    }
    Ok(())
}

/// Maps logical coordinates of one context to physical pixels of its
/// surface: the context origin is added first, then the zoom is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DeviceMapping {
    pub zoom: Zoom,
    pub origin: Point,
}

impl DeviceMapping {
    pub fn new(zoom: Zoom, origin: Point) -> Self {
        Self { zoom, origin }
    }

    pub fn point(&self, x: i32, y: i32) -> (f32, f32) {
        (
            dpi::to_pixels(x.saturating_add(self.origin.x), self.zoom) as f32,
            dpi::to_pixels(y.saturating_add(self.origin.y), self.zoom) as f32,
        )
    }

    pub fn rect(&self, x: i32, y: i32, width: i32, height: i32) -> Rectangle {
        let r = Rectangle::new(x, y, width, height).normalized();
        dpi::rect_to_pixels(r.translated(self.origin), self.zoom)
    }

    pub fn point_f(&self, x: f32, y: f32) -> (f32, f32) {
        let s = self.zoom.factor();
        (
            (x + self.origin.x as f32) * s,
            (y + self.origin.y as f32) * s,
        )
    }

    /// The user transform expressed in pixel space around the context
    /// origin: `T(S·o) · S·U·S⁻¹ · T(-S·o)`. Identity stays exactly identity.
    pub fn matrix(&self, user: &Transform) -> Transform {
        if user.is_identity() {
            return Transform::IDENTITY;
        }
        let (ox, oy) = self.point_f(0.0, 0.0);
        let mut m = Transform::identity();
        m.translate(ox, oy);
        m.multiply(&dpi::transform_to_pixels(user, self.zoom));
        m.translate(-ox, -oy);
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    #[test]
    fn defaults_are_stable() {
        let state = GcState::default();
        assert_eq!(state.foreground, Color::BLACK);
        assert_eq!(state.background, Color::WHITE);
        assert_eq!(state.line.width, 0);
        assert!(!state.advanced);
        assert!(state.clip.is_none());
    }

    #[test]
    fn advanced_mode_follows_setters() {
        let mut state = GcState::default();
        state.set_alpha(255);
        assert!(!state.advanced);
        state.set_alpha(128);
        assert!(state.advanced);
        state.set_advanced(false);
        assert_eq!(state.alpha, 255);

        let mut t = Transform::identity();
        t.rotate(10.0);
        state.set_transform(Some(&t));
        assert!(state.advanced);
        state.set_advanced(false);
        assert!(state.transform.is_identity());

        state.set_clip(Some(&Clip::Path(Path::new())));
        assert!(state.advanced);
    }

    #[test]
    fn builtin_dashes_scale_with_width() {
        let mut state = GcState::default();
        state.set_line_style(LineStyle::Dash);
        assert_eq!(state.dash_pixels(Zoom::IDENTITY), Some(vec![18.0, 6.0]));
        state.set_line_width(2).unwrap();
        assert_eq!(state.dash_pixels(Zoom(150)), Some(vec![54.0, 18.0]));
    }

    #[test]
    fn custom_dash_without_lengths_is_solid() {
        let mut state = GcState::default();
        state.set_line_style(LineStyle::Custom);
        assert_eq!(state.line.style, LineStyle::Solid);

        state.set_line_dash(Some(&[4, 2, 1])).unwrap();
        assert_eq!(state.line.style, LineStyle::Custom);
        assert_eq!(
            state.dash_pixels(Zoom::IDENTITY),
            Some(vec![4.0, 2.0, 1.0, 4.0, 2.0, 1.0])
        );

        state.set_line_dash(None).unwrap();
        assert_eq!(state.line.style, LineStyle::Solid);
        assert!(state.set_line_dash(Some(&[3, 0])).is_err());
    }

    #[test]
    fn clip_bounds_clamp_to_area() {
        let area = Rectangle::new(0, 0, 50, 50);
        let mut state = GcState::default();
        assert_eq!(state.clip_bounds(area), area);
        state.set_clip(Some(&Clip::Rectangle(Rectangle::new(40, -5, 20, 20))));
        assert_eq!(state.clip_bounds(area), Rectangle::new(40, 0, 10, 15));
    }

    #[test]
    fn mapping_adds_origin_before_scaling() {
        let mapping = DeviceMapping::new(Zoom(150), Point::new(1, 1));
        assert_eq!(mapping.point(0, 0), (2.0, 2.0));
        assert_eq!(mapping.rect(0, 0, 2, 2), Rectangle::new(2, 2, 3, 3));
    }

    #[test]
    fn far_coordinates_do_not_overflow() {
        let mapping = DeviceMapping::new(Zoom::IDENTITY, Point::new(5, 5));
        assert_eq!(mapping.point(i32::MAX, 0), (i32::MAX as f32, 5.0));
        let r = mapping.rect(i32::MAX - 1, 0, 10, 10);
        assert_eq!((r.x, r.width), (i32::MAX, 10));

        let mut state = GcState::default();
        state.set_line_width(i32::MAX).unwrap();
        state.set_line_style(LineStyle::Dash);
        let dash = state.dash_pixels(Zoom::IDENTITY).unwrap();
        assert!(dash.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn identity_user_transform_maps_to_identity() {
        let mapping = DeviceMapping::new(Zoom(200), Point::new(7, 3));
        assert!(mapping.matrix(&Transform::IDENTITY).is_identity());

        let mut t = Transform::identity();
        t.translate(1.0, 0.0);
        let m = mapping.matrix(&t);
        assert_eq!(m.transform_point(14.0, 6.0), (16.0, 6.0));
    }
}
