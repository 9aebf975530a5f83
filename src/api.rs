//! The graphics-context contract shared by every backend.
//!
//! All coordinates are logical units. Each backend converts them to the
//! physical pixel grid of its surface before touching it.

use crate::color::Color;
use crate::dpi::Zoom;
use crate::error::Result;
use crate::font::{Font, FontMetrics};
use crate::geometry::{Point, Rectangle, Region};
use crate::image::ImageData;
use crate::path::Path;
use crate::transform::Transform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Native,
    Software,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Software => "software",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Flat,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    Winding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Antialias {
    #[default]
    Default,
    Off,
    On,
}

/// Pen settings applied to stroked primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct LineAttributes {
    pub width: i32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub style: LineStyle,
    /// Custom dash lengths in logical units; only used with `LineStyle::Custom`.
    pub dash: Option<Vec<i32>>,
    pub miter_limit: f32,
}

impl Default for LineAttributes {
    fn default() -> Self {
        Self {
            width: 0,
            cap: LineCap::Flat,
            join: LineJoin::Miter,
            style: LineStyle::Solid,
            dash: None,
            miter_limit: 10.0,
        }
    }
}

/// Processing applied by `draw_text` and `text_extent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextFlags {
    /// Break lines at `\n` (a preceding `\r` belongs to the break).
    pub delimiter: bool,
    /// Expand tabs to the next multiple of eight columns.
    pub tab: bool,
    /// Strip `&` mnemonic markers; `&&` draws a single `&`.
    pub mnemonic: bool,
    /// Leave the background untouched instead of filling the text box.
    pub transparent: bool,
}

impl TextFlags {
    pub const NONE: TextFlags = TextFlags {
        delimiter: false,
        tab: false,
        mnemonic: false,
        transparent: false,
    };
}

impl Default for TextFlags {
    fn default() -> Self {
        Self {
            delimiter: true,
            tab: true,
            mnemonic: false,
            transparent: false,
        }
    }
}

/// A clip shape in logical units, interpreted through the transform that is
/// current when it is set.
#[derive(Clone, Debug, PartialEq)]
pub enum Clip {
    Rectangle(Rectangle),
    Path(Path),
    Region(Region),
}

/// A paint used instead of the plain foreground or background colour.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    LinearGradient {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        from: Color,
        to: Color,
    },
    Image(ImageData),
}

pub trait GcLifecycle {
    /// Backend that draws for this context.
    fn backend(&self) -> BackendKind;
    /// Zoom of the surface the context draws on.
    fn zoom(&self) -> Zoom;
    /// Translation of this context relative to its surface, in logical units.
    fn origin(&self) -> Point;
    /// Size of the drawable area in logical units.
    fn bounds(&self) -> Rectangle;
    /// Whether `dispose` has already run.
    fn is_disposed(&self) -> bool;
    /// Publishes buffered drawing to the surface.
    fn commit(&mut self) -> Result<()>;
    /// Releases the context after restoring any saved clip layer and
    /// committing. A second call fails with `GcError::Disposed`.
    fn dispose(&mut self) -> Result<()>;
}

pub trait GcPaint {
    /// Mirrors GC.setForeground.
    fn set_foreground(&mut self, color: Color) -> Result<()>;
    /// Returns the current foreground colour. Mirrors GC.getForeground.
    fn foreground(&self) -> Result<Color>;
    /// Mirrors GC.setBackground.
    fn set_background(&mut self, color: Color) -> Result<()>;
    /// Returns the current background colour. Mirrors GC.getBackground.
    fn background(&self) -> Result<Color>;
    /// Global opacity applied to every draw; anything but 255 turns on
    /// advanced mode.
    fn set_alpha(&mut self, alpha: u8) -> Result<()>;
    /// Returns the global opacity. Mirrors GC.getAlpha.
    fn alpha(&self) -> Result<u8>;
    /// Paints strokes and text with `pattern` instead of the foreground colour. Mirrors GC.setForegroundPattern.
    fn set_foreground_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()>;
    /// Returns the stroke pattern, if any. Mirrors GC.getForegroundPattern.
    fn foreground_pattern(&self) -> Result<Option<Pattern>>;
    /// Paints fills with `pattern` instead of the background colour. Mirrors GC.setBackgroundPattern.
    fn set_background_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()>;
    /// Returns the fill pattern, if any. Mirrors GC.getBackgroundPattern.
    fn background_pattern(&self) -> Result<Option<Pattern>>;
    /// Combines drawing with the destination by exclusive or. Mirrors GC.setXORMode.
    fn set_xor_mode(&mut self, xor: bool) -> Result<()>;
    /// Returns whether XOR drawing is on. Mirrors GC.getXORMode.
    fn xor_mode(&self) -> Result<bool>;
}

pub trait GcLineStyles {
    /// Sets the pen width in logical units; negative widths are rejected. Mirrors GC.setLineWidth.
    fn set_line_width(&mut self, width: i32) -> Result<()>;
    /// Returns the pen width. Mirrors GC.getLineWidth.
    fn line_width(&self) -> Result<i32>;
    /// Sets the end style of open strokes. Mirrors GC.setLineCap.
    fn set_line_cap(&mut self, cap: LineCap) -> Result<()>;
    /// Returns the end style of open strokes. Mirrors GC.getLineCap.
    fn line_cap(&self) -> Result<LineCap>;
    /// Sets how stroke segments meet. Mirrors GC.setLineJoin.
    fn set_line_join(&mut self, join: LineJoin) -> Result<()>;
    /// Returns how stroke segments meet. Mirrors GC.getLineJoin.
    fn line_join(&self) -> Result<LineJoin>;
    /// Selects a built-in dash pattern. Mirrors GC.setLineStyle.
    fn set_line_style(&mut self, style: LineStyle) -> Result<()>;
    /// Returns the dash style. Mirrors GC.getLineStyle.
    fn line_style(&self) -> Result<LineStyle>;
    /// `None` or an empty slice resets the style to solid.
    fn set_line_dash(&mut self, dash: Option<&[i32]>) -> Result<()>;
    /// Returns the custom dash lengths, if any. Mirrors GC.getLineDash.
    fn line_dash(&self) -> Result<Option<Vec<i32>>>;
    /// Sets every pen attribute at once. Mirrors GC.setLineAttributes.
    fn set_line_attributes(&mut self, attributes: &LineAttributes) -> Result<()>;
    /// Returns every pen attribute. Mirrors GC.getLineAttributes.
    fn line_attributes(&self) -> Result<LineAttributes>;
}

pub trait GcRendering {
    /// Sets shape antialiasing; anything but `Default` turns on advanced mode. Mirrors GC.setAntialias.
    fn set_antialias(&mut self, antialias: Antialias) -> Result<()>;
    /// Returns the antialias setting. Mirrors GC.getAntialias.
    fn antialias(&self) -> Result<Antialias>;
    /// Turning advanced mode off resets alpha, antialias and transform.
    fn set_advanced(&mut self, advanced: bool) -> Result<()>;
    /// Returns whether advanced mode is on. Mirrors GC.getAdvanced.
    fn advanced(&self) -> Result<bool>;
    /// Sets the rule deciding the inside of self-intersecting fills and path clips. Mirrors GC.setFillRule.
    fn set_fill_rule(&mut self, rule: FillRule) -> Result<()>;
    /// Returns the fill rule. Mirrors GC.getFillRule.
    fn fill_rule(&self) -> Result<FillRule>;
}

pub trait GcTransforms {
    /// `None` resets to identity.
    fn set_transform(&mut self, transform: Option<&Transform>) -> Result<()>;
    /// Returns the current user transform. Mirrors GC.getTransform.
    fn transform(&self) -> Result<Transform>;
}

pub trait GcClipping {
    /// Replaces the clip; `None` restores drawing to the whole context area.
    fn set_clipping(&mut self, clip: Option<&Clip>) -> Result<()>;
    /// Bounds of the clip, or of the context area when unclipped.
    fn clipping(&self) -> Result<Rectangle>;
    /// Clip as a region clamped to the context area. Mirrors GC.getClipping(Region).
    fn clipping_region(&self) -> Result<Region>;
    /// Whether a clip is set. Mirrors GC.isClipped.
    fn is_clipped(&self) -> Result<bool>;
}

pub trait GcShapes {
    /// Strokes a line between two points. Mirrors GC.drawLine.
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()>;
    /// Paints one logical pixel in the foreground colour.
    fn draw_point(&mut self, x: i32, y: i32) -> Result<()>;
    /// Strokes a rectangle outline. Mirrors GC.drawRectangle.
    fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()>;
    /// Fills a rectangle with the background colour. Mirrors GC.fillRectangle.
    fn fill_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()>;
    /// Fills from foreground to background, top-down when `vertical`.
    fn fill_gradient_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        vertical: bool,
    ) -> Result<()>;
    /// Strokes the ellipse inscribed in the rectangle. Mirrors GC.drawOval.
    fn draw_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()>;
    /// Fills the ellipse inscribed in the rectangle. Mirrors GC.fillOval.
    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()>;
    /// Angles are degrees counter-clockwise from 3 o'clock.
    fn draw_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> Result<()>;
    /// Fills the pie slice of an arc. Mirrors GC.fillArc.
    fn fill_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> Result<()>;
    /// Strokes a rectangle with rounded corners. Mirrors GC.drawRoundRectangle.
    fn draw_round_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> Result<()>;
    /// Fills a rectangle with rounded corners. Mirrors GC.fillRoundRectangle.
    fn fill_round_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> Result<()>;
    /// `points` holds `x0, y0, x1, y1, ...`; an odd length is an error.
    fn draw_polyline(&mut self, points: &[i32]) -> Result<()>;
    /// Strokes a closed polygon. Mirrors GC.drawPolygon.
    fn draw_polygon(&mut self, points: &[i32]) -> Result<()>;
    /// Fills a polygon using the fill rule. Mirrors GC.fillPolygon.
    fn fill_polygon(&mut self, points: &[i32]) -> Result<()>;
    /// Strokes a path given in logical units. Mirrors GC.drawPath.
    fn draw_path(&mut self, path: &Path) -> Result<()>;
    /// Fills a path given in logical units. Mirrors GC.fillPath.
    fn fill_path(&mut self, path: &Path) -> Result<()>;
    /// Dotted one-pixel focus rectangle.
    fn draw_focus(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()>;
}

pub trait GcText {
    /// Rebuilds the backend font object from `font`.
    fn set_font(&mut self, font: &Font) -> Result<()>;
    /// Returns the current font. Mirrors GC.getFont.
    fn font(&self) -> Result<Font>;
    /// Metrics of the current font in logical units. Mirrors GC.getFontMetrics.
    fn font_metrics(&self) -> Result<FontMetrics>;
    /// Draws a single line without delimiter, tab or mnemonic processing.
    fn draw_string(&mut self, text: &str, x: i32, y: i32, transparent: bool) -> Result<()>;
    /// Draws text honouring `flags` for delimiters, tabs and mnemonics. Mirrors GC.drawText.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, flags: TextFlags) -> Result<()>;
    /// Size `draw_string` would cover. Mirrors GC.stringExtent.
    fn string_extent(&mut self, text: &str) -> Result<Point>;
    /// Size `draw_text` would cover. Mirrors GC.textExtent.
    fn text_extent(&mut self, text: &str, flags: TextFlags) -> Result<Point>;
}

pub trait GcImages {
    /// Draws `image` at its own size with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, image: &ImageData, x: i32, y: i32) -> Result<()>;
    /// Draws the `src` part of `image` (image pixels) scaled into `dst`.
    fn draw_image_scaled(&mut self, image: &ImageData, src: Rectangle, dst: Rectangle)
    -> Result<()>;
}

pub trait GraphicsContext:
    GcLifecycle
    + GcPaint
    + GcLineStyles
    + GcRendering
    + GcTransforms
    + GcClipping
    + GcShapes
    + GcText
    + GcImages
{
}

impl<T> GraphicsContext for T where
    T: GcLifecycle
        + GcPaint
        + GcLineStyles
        + GcRendering
        + GcTransforms
        + GcClipping
        + GcShapes
        + GcText
        + GcImages
{
}
