//! Backend selection. A factory is configured once and creates contexts of
//! the configured backend for any number of surfaces.

use std::cell::OnceCell;

use crate::api::*;
#[cfg(feature = "cairo")]
use crate::backends::native::NativeGc;
use crate::backends::software::{SharedTextEngine, SoftwareGc, TextEngine};
use crate::color::Color;
use crate::config::GcConfig;
use crate::dpi::Zoom;
use crate::error::{GcError, Result};
use crate::font::{Font, FontMetrics};
use crate::geometry::{Point, Rectangle, Region};
use crate::image::ImageData;
use crate::path::Path;
use crate::surface::Surface;
use crate::transform::Transform;

/// Creates graphics contexts for surfaces.
pub struct GcFactory {
    config: GcConfig,
    text: OnceCell<SharedTextEngine>,
}

impl GcFactory {
    pub fn new(config: GcConfig) -> Self {
        log::debug!(
            target: "gc",
            "gc factory using {} backend, device zoom {}",
            config.backend.name(),
            config.device_zoom
        );
        Self {
            config,
            text: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(GcConfig::from_env())
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Creates a root context drawing on `surface`.
    pub fn create(&self, surface: &Surface) -> Result<Gc> {
        log::debug!(
            target: "gc",
            "creating {} context for {}x{} surface",
            self.config.backend.name(),
            surface.width(),
            surface.height()
        );
        match self.config.backend {
            #[cfg(feature = "cairo")]
            BackendKind::Native => Ok(Gc::Native(NativeGc::new(surface, self.config.device_zoom)?)),
            #[cfg(not(feature = "cairo"))]
            BackendKind::Native => Err(GcError::BackendUnavailable("native")),
            BackendKind::Software => Ok(Gc::Software(SoftwareGc::with_engine(
                surface,
                self.text_engine().clone(),
                self.config.device_zoom,
            )?)),
        }
    }

    /// The font database is only loaded once a software context needs it.
    fn text_engine(&self) -> &SharedTextEngine {
        self.text
            .get_or_init(|| TextEngine::new(&self.config.fonts).shared())
    }
}

/// A context of either backend.
pub enum Gc {
    #[cfg(feature = "cairo")]
    Native(NativeGc),
    Software(SoftwareGc),
}

macro_rules! dispatch {
    ($gc:expr, $inner:ident => $body:expr) => {
        match $gc {
            #[cfg(feature = "cairo")]
            Gc::Native($inner) => $body,
            Gc::Software($inner) => $body,
        }
    };
}

impl Gc {
    /// Derives a child context of the same backend for `bounds`, given in
    /// this context's coordinates.
    pub fn child(&self, bounds: Rectangle) -> Result<Gc> {
        match self {
            #[cfg(feature = "cairo")]
            Gc::Native(gc) => Ok(Gc::Native(gc.child(bounds)?)),
            Gc::Software(gc) => Ok(Gc::Software(gc.child(bounds)?)),
        }
    }
}

#[cfg(feature = "cairo")]
impl NativeGc {
    /// Derives a native child from `parent`, which must be native too.
    pub fn child_of(parent: &Gc, bounds: Rectangle) -> Result<NativeGc> {
        match parent {
            Gc::Native(gc) => gc.child(bounds),
            other => Err(GcError::BackendMismatch {
                expected: BackendKind::Native,
                found: other.backend(),
            }),
        }
    }
}

impl SoftwareGc {
    /// Derives a software child from `parent`, which must be software too.
    #[allow(unreachable_patterns)]
    pub fn child_of(parent: &Gc, bounds: Rectangle) -> Result<SoftwareGc> {
        match parent {
            Gc::Software(gc) => gc.child(bounds),
            other => Err(GcError::BackendMismatch {
                expected: BackendKind::Software,
                found: other.backend(),
            }),
        }
    }
}

impl GcLifecycle for Gc {
    fn backend(&self) -> BackendKind {
        dispatch!(self, gc => gc.backend())
    }

    fn zoom(&self) -> Zoom {
        dispatch!(self, gc => gc.zoom())
    }

    fn origin(&self) -> Point {
        dispatch!(self, gc => gc.origin())
    }

    fn bounds(&self) -> Rectangle {
        dispatch!(self, gc => gc.bounds())
    }

    fn is_disposed(&self) -> bool {
        dispatch!(self, gc => gc.is_disposed())
    }

    fn commit(&mut self) -> Result<()> {
        dispatch!(self, gc => gc.commit())
    }

    fn dispose(&mut self) -> Result<()> {
        dispatch!(self, gc => gc.dispose())
    }
}

impl GcPaint for Gc {
    fn set_foreground(&mut self, color: Color) -> Result<()> {
        dispatch!(self, gc => gc.set_foreground(color))
    }

    fn foreground(&self) -> Result<Color> {
        dispatch!(self, gc => gc.foreground())
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        dispatch!(self, gc => gc.set_background(color))
    }

    fn background(&self) -> Result<Color> {
        dispatch!(self, gc => gc.background())
    }

    fn set_alpha(&mut self, alpha: u8) -> Result<()> {
        dispatch!(self, gc => gc.set_alpha(alpha))
    }

    fn alpha(&self) -> Result<u8> {
        dispatch!(self, gc => gc.alpha())
    }

    fn set_foreground_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()> {
        dispatch!(self, gc => gc.set_foreground_pattern(pattern))
    }

    fn foreground_pattern(&self) -> Result<Option<Pattern>> {
        dispatch!(self, gc => gc.foreground_pattern())
    }

    fn set_background_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()> {
        dispatch!(self, gc => gc.set_background_pattern(pattern))
    }

    fn background_pattern(&self) -> Result<Option<Pattern>> {
        dispatch!(self, gc => gc.background_pattern())
    }

    fn set_xor_mode(&mut self, xor: bool) -> Result<()> {
        dispatch!(self, gc => gc.set_xor_mode(xor))
    }

    fn xor_mode(&self) -> Result<bool> {
        dispatch!(self, gc => gc.xor_mode())
    }
}

impl GcLineStyles for Gc {
    fn set_line_width(&mut self, width: i32) -> Result<()> {
        dispatch!(self, gc => gc.set_line_width(width))
    }

    fn line_width(&self) -> Result<i32> {
        dispatch!(self, gc => gc.line_width())
    }

    fn set_line_cap(&mut self, cap: LineCap) -> Result<()> {
        dispatch!(self, gc => gc.set_line_cap(cap))
    }

    fn line_cap(&self) -> Result<LineCap> {
        dispatch!(self, gc => gc.line_cap())
    }

    fn set_line_join(&mut self, join: LineJoin) -> Result<()> {
        dispatch!(self, gc => gc.set_line_join(join))
    }

    fn line_join(&self) -> Result<LineJoin> {
        dispatch!(self, gc => gc.line_join())
    }

    fn set_line_style(&mut self, style: LineStyle) -> Result<()> {
        dispatch!(self, gc => gc.set_line_style(style))
    }

    fn line_style(&self) -> Result<LineStyle> {
        dispatch!(self, gc => gc.line_style())
    }

    fn set_line_dash(&mut self, dash: Option<&[i32]>) -> Result<()> {
        dispatch!(self, gc => gc.set_line_dash(dash))
    }

    fn line_dash(&self) -> Result<Option<Vec<i32>>> {
        dispatch!(self, gc => gc.line_dash())
    }

    fn set_line_attributes(&mut self, attributes: &LineAttributes) -> Result<()> {
        dispatch!(self, gc => gc.set_line_attributes(attributes))
    }

    fn line_attributes(&self) -> Result<LineAttributes> {
        dispatch!(self, gc => gc.line_attributes())
    }
}

impl GcRendering for Gc {
    fn set_antialias(&mut self, antialias: Antialias) -> Result<()> {
        dispatch!(self, gc => gc.set_antialias(antialias))
    }

    fn antialias(&self) -> Result<Antialias> {
        dispatch!(self, gc => gc.antialias())
    }

    fn set_advanced(&mut self, advanced: bool) -> Result<()> {
        dispatch!(self, gc => gc.set_advanced(advanced))
    }

    fn advanced(&self) -> Result<bool> {
        dispatch!(self, gc => gc.advanced())
    }

    fn set_fill_rule(&mut self, rule: FillRule) -> Result<()> {
        dispatch!(self, gc => gc.set_fill_rule(rule))
    }

    fn fill_rule(&self) -> Result<FillRule> {
        dispatch!(self, gc => gc.fill_rule())
    }
}

impl GcTransforms for Gc {
    fn set_transform(&mut self, transform: Option<&Transform>) -> Result<()> {
        dispatch!(self, gc => gc.set_transform(transform))
    }

    fn transform(&self) -> Result<Transform> {
        dispatch!(self, gc => gc.transform())
    }
}

impl GcClipping for Gc {
    fn set_clipping(&mut self, clip: Option<&Clip>) -> Result<()> {
        dispatch!(self, gc => gc.set_clipping(clip))
    }

    fn clipping(&self) -> Result<Rectangle> {
        dispatch!(self, gc => gc.clipping())
    }

    fn clipping_region(&self) -> Result<Region> {
        dispatch!(self, gc => gc.clipping_region())
    }

    fn is_clipped(&self) -> Result<bool> {
        dispatch!(self, gc => gc.is_clipped())
    }
}

impl GcShapes for Gc {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_line(x1, y1, x2, y2))
    }

    fn draw_point(&mut self, x: i32, y: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_point(x, y))
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_rectangle(x, y, width, height))
    }

    fn fill_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        dispatch!(self, gc => gc.fill_rectangle(x, y, width, height))
    }

    fn fill_gradient_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        vertical: bool,
    ) -> Result<()> {
        dispatch!(self, gc => gc.fill_gradient_rectangle(x, y, width, height, vertical))
    }

    fn draw_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_oval(x, y, width, height))
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        dispatch!(self, gc => gc.fill_oval(x, y, width, height))
    }

    fn draw_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> Result<()> {
        dispatch!(self, gc => gc.draw_arc(x, y, width, height, start_angle, arc_angle))
    }

    fn fill_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> Result<()> {
        dispatch!(self, gc => gc.fill_arc(x, y, width, height, start_angle, arc_angle))
    }

    fn draw_round_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> Result<()> {
        dispatch!(self, gc => gc.draw_round_rectangle(x, y, width, height, arc_width, arc_height))
    }

    fn fill_round_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> Result<()> {
        dispatch!(self, gc => gc.fill_round_rectangle(x, y, width, height, arc_width, arc_height))
    }

    fn draw_polyline(&mut self, points: &[i32]) -> Result<()> {
        dispatch!(self, gc => gc.draw_polyline(points))
    }

    fn draw_polygon(&mut self, points: &[i32]) -> Result<()> {
        dispatch!(self, gc => gc.draw_polygon(points))
    }

    fn fill_polygon(&mut self, points: &[i32]) -> Result<()> {
        dispatch!(self, gc => gc.fill_polygon(points))
    }

    fn draw_path(&mut self, path: &Path) -> Result<()> {
        dispatch!(self, gc => gc.draw_path(path))
    }

    fn fill_path(&mut self, path: &Path) -> Result<()> {
        dispatch!(self, gc => gc.fill_path(path))
    }

    fn draw_focus(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_focus(x, y, width, height))
    }
}

impl GcText for Gc {
    fn set_font(&mut self, font: &Font) -> Result<()> {
        dispatch!(self, gc => gc.set_font(font))
    }

    fn font(&self) -> Result<Font> {
        dispatch!(self, gc => gc.font())
    }

    fn font_metrics(&self) -> Result<FontMetrics> {
        dispatch!(self, gc => gc.font_metrics())
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32, transparent: bool) -> Result<()> {
        dispatch!(self, gc => gc.draw_string(text, x, y, transparent))
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, flags: TextFlags) -> Result<()> {
        dispatch!(self, gc => gc.draw_text(text, x, y, flags))
    }

    fn string_extent(&mut self, text: &str) -> Result<Point> {
        dispatch!(self, gc => gc.string_extent(text))
    }

    fn text_extent(&mut self, text: &str, flags: TextFlags) -> Result<Point> {
        dispatch!(self, gc => gc.text_extent(text, flags))
    }
}

impl GcImages for Gc {
    fn draw_image(&mut self, image: &ImageData, x: i32, y: i32) -> Result<()> {
        dispatch!(self, gc => gc.draw_image(image, x, y))
    }

    fn draw_image_scaled(
        &mut self,
        image: &ImageData,
        src: Rectangle,
        dst: Rectangle,
    ) -> Result<()> {
        dispatch!(self, gc => gc.draw_image_scaled(image, src, dst))
    }
}
