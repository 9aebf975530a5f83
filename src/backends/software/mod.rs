//! Pure-Rust backend: tiny-skia rasterizes, cosmic-text shapes text.
//!
//! Unlike the native backend, tiny-skia has no notion of saved clip state,
//! so every context keeps its own clip stack on a [`RasterCanvas`]. Pixels
//! are copied back to the [`Surface`] on commit and dispose.

mod canvas;
mod text;

pub use text::TextEngine;
pub(crate) use text::SharedTextEngine;

use std::rc::Rc;

use tiny_skia::{
    FilterQuality, GradientStop, IntSize, LineCap as SkiaLineCap, LineJoin as SkiaLineJoin,
    LinearGradient, Paint, PathBuilder, Pixmap, Rect, SpreadMode, Stroke, StrokeDash,
};

use crate::api::*;
use crate::backends::{self, FOCUS_DASH};
use crate::color::Color;
use crate::dpi::{self, Zoom};
use crate::error::{GcError, Result};
use crate::font::{Font, FontMetrics};
use crate::geometry::{Point, Rectangle, Region};
use crate::image::ImageData;
use crate::path::{Path, PathSink};
use crate::state::{DeviceMapping, GcState};
use crate::surface::{Surface, premultiply};
use crate::transform::Transform;

use canvas::{RasterCanvas, rect_to_path};
use text::ResolvedFont;

const AVERAGE_WIDTH_SAMPLE: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A graphics context that rasterizes into an in-memory pixmap.
pub struct SoftwareGc {
    canvas: RasterCanvas,
    surface: Surface,
    text: SharedTextEngine,
    font: ResolvedFont,
    state: GcState,
    mapping: DeviceMapping,
    size: (i32, i32),
    device_zoom: f32,
    clip_active: bool,
    disposed: bool,
}

impl SoftwareGc {
    pub fn new(surface: &Surface, engine: TextEngine, device_zoom: f32) -> Result<Self> {
        Self::with_engine(surface, engine.shared(), device_zoom)
    }

    pub(crate) fn with_engine(
        surface: &Surface,
        text: SharedTextEngine,
        device_zoom: f32,
    ) -> Result<Self> {
        let canvas = RasterCanvas::from_surface(surface)?;
        let state = GcState::default();
        let font = resolve(&text, &state.font, surface.zoom(), device_zoom);
        log::debug!(
            target: "gc",
            "created software context {}x{} at zoom {}",
            surface.width(),
            surface.height(),
            surface.zoom().percent()
        );
        Ok(Self {
            canvas,
            surface: surface.clone(),
            text,
            font,
            state,
            mapping: DeviceMapping::new(surface.zoom(), Point::default()),
            size: surface.logical_size(),
            device_zoom,
            clip_active: false,
            disposed: false,
        })
    }

    /// Derives a context for `bounds` (relative to this context) that shares
    /// this context's pixels, clipped to its own area, with fresh state.
    pub fn child(&self, bounds: Rectangle) -> Result<SoftwareGc> {
        self.live()?;
        let bounds = bounds.normalized();
        let mapping = DeviceMapping::new(
            self.mapping.zoom,
            self.mapping.origin.offset(bounds.origin()),
        );
        let mut canvas = self.canvas.share();
        canvas.clip_rect(mapping.rect(0, 0, bounds.width, bounds.height))?;
        let state = GcState::default();
        let font = resolve(&self.text, &state.font, mapping.zoom, self.device_zoom);
        log::debug!(target: "gc", "derived software child at {:?}", mapping.origin);
        Ok(Self {
            canvas,
            surface: self.surface.clone(),
            text: Rc::clone(&self.text),
            font,
            state,
            mapping,
            size: (bounds.width, bounds.height),
            device_zoom: self.device_zoom,
            clip_active: false,
            disposed: false,
        })
    }

    fn live(&self) -> Result<()> {
        if self.disposed {
            Err(GcError::Disposed)
        } else {
            Ok(())
        }
    }

    fn zoom_px(&self) -> Zoom {
        self.mapping.zoom
    }

    fn unsupported(&self, operation: &str) {
        log::warn!(
            target: "gc",
            "unsupported operation '{}' on software context at {:?}",
            operation,
            self.mapping.origin
        );
    }

    fn matrix(&self) -> tiny_skia::Transform {
        self.mapping.matrix(&self.state.transform).into()
    }

    fn solid_paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.red, color.green, color.blue, color.alpha);
        paint.anti_alias = self.state.anti_alias();
        paint
    }

    /// Pen settings plus the crisp-line offset.
    fn pen(&self) -> (Stroke, f32) {
        let width = self.state.line_width_pixels(self.zoom_px());
        let stroke = Stroke {
            width: width as f32,
            line_cap: map_line_cap(self.state.line.cap),
            line_join: map_line_join(self.state.line.join),
            miter_limit: self.state.line.miter_limit,
            dash: self
                .state
                .dash_pixels(self.zoom_px())
                .and_then(|dash| StrokeDash::new(dash, 0.0)),
        };
        (stroke, dpi::crisp_offset(width))
    }

    fn stroke(&mut self, path: &Path, stroke: &Stroke, map: impl Fn(f32, f32) -> (f32, f32)) {
        if let Some(path) = to_skia_path(path, map) {
            let paint = self.solid_paint(self.state.stroke_color());
            let ts = self.matrix();
            self.canvas.stroke_path(&path, &paint, stroke, ts);
        }
    }

    fn fill(&mut self, path: &Path, map: impl Fn(f32, f32) -> (f32, f32)) {
        if let Some(path) = to_skia_path(path, map) {
            let paint = self.solid_paint(self.state.fill_color());
            let ts = self.matrix();
            self.canvas
                .fill_path(&path, &paint, map_fill_rule(self.state.fill_rule), ts);
        }
    }

    fn stroke_px(&mut self, path: &Path, stroke: &Stroke) {
        self.stroke(path, stroke, |x, y| (x, y))
    }

    fn fill_px(&mut self, path: &Path) {
        self.fill(path, |x, y| (x, y))
    }

    fn stroke_shape(&mut self, build: impl FnOnce(f32) -> Path) {
        let (stroke, offset) = self.pen();
        let path = build(offset);
        self.stroke_px(&path, &stroke);
    }

    fn mapped_points(&self, points: &[i32]) -> Result<Vec<(f32, f32)>> {
        Ok(backends::point_pairs(points)?
            .into_iter()
            .map(|(x, y)| self.mapping.point(x, y))
            .collect())
    }

    /// Clip geometry in pixels and the rule to fill it with. `None` means
    /// the shape covers nothing.
    fn clip_shape(&self, clip: &Clip) -> (Option<tiny_skia::Path>, tiny_skia::FillRule) {
        match clip {
            Clip::Rectangle(r) => (
                rect_to_path(self.mapping.rect(r.x, r.y, r.width, r.height)),
                tiny_skia::FillRule::Winding,
            ),
            Clip::Region(region) => {
                let mut builder = PathBuilder::new();
                for r in region.rects() {
                    let r = self.mapping.rect(r.x, r.y, r.width, r.height);
                    if let Some(rect) =
                        Rect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
                    {
                        builder.push_rect(rect);
                    }
                }
                (builder.finish(), tiny_skia::FillRule::Winding)
            }
            Clip::Path(path) => {
                let mapping = self.mapping;
                (
                    to_skia_path(path, move |x, y| mapping.point_f(x, y)),
                    map_fill_rule(self.state.fill_rule),
                )
            }
        }
    }

    fn draw_lines(&mut self, lines: &[String], x: i32, y: i32, transparent: bool) -> Result<()> {
        let shaped: Vec<_> = {
            let mut engine = self.text.borrow_mut();
            lines
                .iter()
                .map(|line| engine.shape(&self.font, line))
                .collect()
        };
        let (px, py) = self.mapping.point(x, y);
        let ts = self.matrix();
        let line_height = self.font.line_height;

        if !transparent {
            let width = shaped.iter().map(|l| l.width).fold(0.0, f32::max);
            let height = line_height * lines.len() as f32;
            if let Some(rect) = Rect::from_xywh(px, py, width.ceil(), height.ceil()) {
                let paint = self.solid_paint(self.state.fill_color());
                self.canvas.fill_rect(rect, &paint, ts);
            }
        }

        let mut builder = PathBuilder::new();
        for (i, line) in shaped.iter().enumerate() {
            let baseline =
                py + i as f32 * line_height + line_height / 2.0 + self.font.cap_height / 2.0;
            line.append_to(&mut builder, px, baseline);
        }
        if let Some(path) = builder.finish() {
            let paint = self.solid_paint(self.state.stroke_color());
            self.canvas
                .fill_path(&path, &paint, tiny_skia::FillRule::Winding, ts);
        }
        Ok(())
    }

    fn extent(&self, lines: &[String]) -> Point {
        let mut engine = self.text.borrow_mut();
        let width = lines
            .iter()
            .map(|line| engine.measure(&self.font, line))
            .fold(0.0, f32::max);
        let height = self.font.line_height * lines.len() as f32;
        Point::new(
            dpi::to_logical(width.ceil() as i32, self.zoom_px()),
            dpi::to_logical(height.ceil() as i32, self.zoom_px()),
        )
    }
}

fn resolve(text: &SharedTextEngine, font: &Font, zoom: Zoom, device_zoom: f32) -> ResolvedFont {
    let data = font.primary();
    text.borrow_mut()
        .resolve(data, data.pixel_size(zoom, device_zoom))
}

impl Drop for SoftwareGc {
    fn drop(&mut self) {
        if !self.disposed
            && let Err(err) = self.dispose()
        {
            log::warn!(target: "gc", "failed to release software context: {}", err);
        }
    }
}

struct SkiaSink {
    builder: PathBuilder,
}

impl PathSink for SkiaSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.builder.quad_to(cx, cy, x, y);
    }

    fn cubic_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) {
        self.builder.cubic_to(cx1, cy1, cx2, cy2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn to_skia_path(path: &Path, map: impl Fn(f32, f32) -> (f32, f32)) -> Option<tiny_skia::Path> {
    let mut sink = SkiaSink {
        builder: PathBuilder::new(),
    };
    path.replay(&mut sink, map);
    sink.builder.finish()
}

impl GcLifecycle for SoftwareGc {
    fn backend(&self) -> BackendKind {
        BackendKind::Software
    }

    fn zoom(&self) -> Zoom {
        self.mapping.zoom
    }

    fn origin(&self) -> Point {
        self.mapping.origin
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.size.0, self.size.1)
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn commit(&mut self) -> Result<()> {
        self.live()?;
        self.canvas.copy_to(&self.surface);
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.live()?;
        self.disposed = true;
        if self.clip_active {
            self.canvas.restore();
            self.clip_active = false;
        }
        if self.canvas.save_count() != 0 {
            log::warn!(
                target: "gc",
                "software context disposed with {} unbalanced clip saves",
                self.canvas.save_count()
            );
        }
        self.canvas.copy_to(&self.surface);
        log::debug!(target: "gc", "disposed software context at {:?}", self.mapping.origin);
        Ok(())
    }
}

impl GcPaint for SoftwareGc {
    fn set_foreground(&mut self, color: Color) -> Result<()> {
        self.live()?;
        self.state.foreground = color;
        Ok(())
    }

    fn foreground(&self) -> Result<Color> {
        self.live()?;
        Ok(self.state.foreground)
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        self.live()?;
        self.state.background = color;
        Ok(())
    }

    fn background(&self) -> Result<Color> {
        self.live()?;
        Ok(self.state.background)
    }

    fn set_alpha(&mut self, alpha: u8) -> Result<()> {
        self.live()?;
        self.state.set_alpha(alpha);
        Ok(())
    }

    fn alpha(&self) -> Result<u8> {
        self.live()?;
        Ok(self.state.alpha)
    }

    fn set_foreground_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()> {
        self.live()?;
        match pattern {
            Some(_) => self.unsupported("set_foreground_pattern"),
            None => self.state.foreground_pattern = None,
        }
        Ok(())
    }

    fn foreground_pattern(&self) -> Result<Option<Pattern>> {
        self.live()?;
        Ok(self.state.foreground_pattern.clone())
    }

    fn set_background_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()> {
        self.live()?;
        match pattern {
            Some(_) => self.unsupported("set_background_pattern"),
            None => self.state.background_pattern = None,
        }
        Ok(())
    }

    fn background_pattern(&self) -> Result<Option<Pattern>> {
        self.live()?;
        Ok(self.state.background_pattern.clone())
    }

    fn set_xor_mode(&mut self, xor: bool) -> Result<()> {
        self.live()?;
        if xor {
            self.unsupported("set_xor_mode");
        }
        Ok(())
    }

    fn xor_mode(&self) -> Result<bool> {
        self.live()?;
        Ok(self.state.xor_mode)
    }
}

impl GcLineStyles for SoftwareGc {
    fn set_line_width(&mut self, width: i32) -> Result<()> {
        self.live()?;
        self.state.set_line_width(width)
    }

    fn line_width(&self) -> Result<i32> {
        self.live()?;
        Ok(self.state.line.width)
    }

    fn set_line_cap(&mut self, cap: LineCap) -> Result<()> {
        self.live()?;
        self.state.line.cap = cap;
        Ok(())
    }

    fn line_cap(&self) -> Result<LineCap> {
        self.live()?;
        Ok(self.state.line.cap)
    }

    fn set_line_join(&mut self, join: LineJoin) -> Result<()> {
        self.live()?;
        self.state.line.join = join;
        Ok(())
    }

    fn line_join(&self) -> Result<LineJoin> {
        self.live()?;
        Ok(self.state.line.join)
    }

    fn set_line_style(&mut self, style: LineStyle) -> Result<()> {
        self.live()?;
        self.state.set_line_style(style);
        Ok(())
    }

    fn line_style(&self) -> Result<LineStyle> {
        self.live()?;
        Ok(self.state.line.style)
    }

    fn set_line_dash(&mut self, dash: Option<&[i32]>) -> Result<()> {
        self.live()?;
        self.state.set_line_dash(dash)
    }

    fn line_dash(&self) -> Result<Option<Vec<i32>>> {
        self.live()?;
        Ok(self.state.line.dash.clone())
    }

    fn set_line_attributes(&mut self, attributes: &LineAttributes) -> Result<()> {
        self.live()?;
        self.state.set_line_attributes(attributes)
    }

    fn line_attributes(&self) -> Result<LineAttributes> {
        self.live()?;
        Ok(self.state.line.clone())
    }
}

impl GcRendering for SoftwareGc {
    fn set_antialias(&mut self, antialias: Antialias) -> Result<()> {
        self.live()?;
        self.state.set_antialias(antialias);
        Ok(())
    }

    fn antialias(&self) -> Result<Antialias> {
        self.live()?;
        Ok(self.state.antialias)
    }

    fn set_advanced(&mut self, advanced: bool) -> Result<()> {
        self.live()?;
        self.state.set_advanced(advanced);
        Ok(())
    }

    fn advanced(&self) -> Result<bool> {
        self.live()?;
        Ok(self.state.advanced)
    }

    fn set_fill_rule(&mut self, rule: FillRule) -> Result<()> {
        self.live()?;
        self.state.fill_rule = rule;
        Ok(())
    }

    fn fill_rule(&self) -> Result<FillRule> {
        self.live()?;
        Ok(self.state.fill_rule)
    }
}

impl GcTransforms for SoftwareGc {
    fn set_transform(&mut self, transform: Option<&Transform>) -> Result<()> {
        self.live()?;
        self.state.set_transform(transform);
        Ok(())
    }

    fn transform(&self) -> Result<Transform> {
        self.live()?;
        Ok(self.state.transform)
    }
}

impl GcClipping for SoftwareGc {
    /// A new clip replaces the previous one rather than intersecting it; the
    /// context area always stays in effect.
    fn set_clipping(&mut self, clip: Option<&Clip>) -> Result<()> {
        self.live()?;
        self.state.set_clip(clip);
        if self.clip_active {
            self.canvas.restore();
            self.clip_active = false;
        }
        if let Some(clip) = clip {
            let (path, rule) = self.clip_shape(clip);
            let ts = self.matrix();
            let anti_alias = self.state.anti_alias();
            self.canvas.save();
            self.clip_active = true;
            self.canvas.clip_path(path.as_ref(), rule, anti_alias, ts)?;
        }
        log::debug!(target: "gc", "software clip set to {:?}", clip);
        Ok(())
    }

    fn clipping(&self) -> Result<Rectangle> {
        self.live()?;
        Ok(self.state.clip_bounds(self.bounds()))
    }

    fn clipping_region(&self) -> Result<Region> {
        self.live()?;
        Ok(self.state.clip_region(self.bounds()))
    }

    fn is_clipped(&self) -> Result<bool> {
        self.live()?;
        Ok(self.state.clip.is_some())
    }
}

impl GcShapes for SoftwareGc {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.live()?;
        let points = [self.mapping.point(x1, y1), self.mapping.point(x2, y2)];
        self.stroke_shape(|offset| backends::poly_path(&points, offset, false));
        Ok(())
    }

    fn draw_point(&mut self, x: i32, y: i32) -> Result<()> {
        self.live()?;
        let r = backends::point_rect(x, y);
        let r = self.mapping.rect(r.x, r.y, r.width, r.height);
        if let Some(path) = rect_to_path(r) {
            let paint = self.solid_paint(self.state.stroke_color());
            let ts = self.matrix();
            self.canvas
                .fill_path(&path, &paint, tiny_skia::FillRule::Winding, ts);
        }
        Ok(())
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_shape(|offset| backends::rect_path(r, offset));
        Ok(())
    }

    fn fill_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.fill_px(&backends::rect_path(r, 0.0));
        Ok(())
    }

    fn fill_gradient_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        vertical: bool,
    ) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        let Some(path) = rect_to_path(r) else {
            return Ok(());
        };
        let start = tiny_skia::Point::from_xy(r.x as f32, r.y as f32);
        let end = if vertical {
            tiny_skia::Point::from_xy(r.x as f32, r.bottom() as f32)
        } else {
            tiny_skia::Point::from_xy(r.right() as f32, r.y as f32)
        };
        let (from, to) = (self.state.stroke_color(), self.state.fill_color());
        let mut paint = self.solid_paint(from);
        if let Some(shader) = LinearGradient::new(
            start,
            end,
            vec![
                GradientStop::new(0.0, skia_color(from)),
                GradientStop::new(1.0, skia_color(to)),
            ],
            SpreadMode::Pad,
            tiny_skia::Transform::identity(),
        ) {
            paint.shader = shader;
        }
        let ts = self.matrix();
        self.canvas
            .fill_path(&path, &paint, tiny_skia::FillRule::Winding, ts);
        Ok(())
    }

    fn draw_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_shape(|offset| backends::oval_path(r, offset));
        Ok(())
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.fill_px(&backends::oval_path(r, 0.0));
        Ok(())
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
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_shape(|offset| backends::arc_path(r, offset, start_angle, arc_angle, false));
        Ok(())
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
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.fill_px(&backends::arc_path(r, 0.0, start_angle, arc_angle, true));
        Ok(())
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
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        let zoom = self.zoom_px();
        let (aw, ah) = (dpi::to_pixels(arc_width, zoom), dpi::to_pixels(arc_height, zoom));
        self.stroke_shape(|offset| backends::round_rect_path(r, offset, aw, ah));
        Ok(())
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
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        let zoom = self.zoom_px();
        let (aw, ah) = (dpi::to_pixels(arc_width, zoom), dpi::to_pixels(arc_height, zoom));
        self.fill_px(&backends::round_rect_path(r, 0.0, aw, ah));
        Ok(())
    }

    fn draw_polyline(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points = self.mapped_points(points)?;
        self.stroke_shape(|offset| backends::poly_path(&points, offset, false));
        Ok(())
    }

    fn draw_polygon(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points = self.mapped_points(points)?;
        self.stroke_shape(|offset| backends::poly_path(&points, offset, true));
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points = self.mapped_points(points)?;
        self.fill_px(&backends::poly_path(&points, 0.0, true));
        Ok(())
    }

    fn draw_path(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        let (stroke, offset) = self.pen();
        let mapping = self.mapping;
        self.stroke(path, &stroke, move |x, y| {
            let (px, py) = mapping.point_f(x, y);
            (px + offset, py + offset)
        });
        Ok(())
    }

    fn fill_path(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        let mapping = self.mapping;
        self.fill(path, move |x, y| mapping.point_f(x, y));
        Ok(())
    }

    fn draw_focus(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        let stroke = Stroke {
            width: 1.0,
            line_cap: SkiaLineCap::Butt,
            dash: StrokeDash::new(FOCUS_DASH.to_vec(), 0.0),
            ..Stroke::default()
        };
        self.stroke_px(&backends::rect_path(r, 0.5), &stroke);
        Ok(())
    }
}

impl GcText for SoftwareGc {
    fn set_font(&mut self, font: &Font) -> Result<()> {
        self.live()?;
        self.state.font = font.clone();
        self.font = resolve(&self.text, font, self.zoom_px(), self.device_zoom);
        Ok(())
    }

    fn font(&self) -> Result<Font> {
        self.live()?;
        Ok(self.state.font.clone())
    }

    fn font_metrics(&self) -> Result<FontMetrics> {
        self.live()?;
        let zoom = self.zoom_px();
        let sample = self
            .text
            .borrow_mut()
            .measure(&self.font, AVERAGE_WIDTH_SAMPLE);
        let average = sample / AVERAGE_WIDTH_SAMPLE.len() as f32;
        Ok(FontMetrics {
            ascent: dpi::to_logical(self.font.ascent.ceil() as i32, zoom),
            descent: dpi::to_logical(self.font.descent.ceil() as i32, zoom),
            height: dpi::to_logical(self.font.line_height.ceil() as i32, zoom),
            average_char_width: dpi::to_logical_f(average, zoom),
        })
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32, transparent: bool) -> Result<()> {
        self.live()?;
        self.draw_lines(&[text.to_string()], x, y, transparent)
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, flags: TextFlags) -> Result<()> {
        self.live()?;
        let lines = crate::text::layout_lines(text, flags);
        self.draw_lines(&lines, x, y, flags.transparent)
    }

    fn string_extent(&mut self, text: &str) -> Result<Point> {
        self.live()?;
        Ok(self.extent(&[text.to_string()]))
    }

    fn text_extent(&mut self, text: &str, flags: TextFlags) -> Result<Point> {
        self.live()?;
        Ok(self.extent(&crate::text::layout_lines(text, flags)))
    }
}

impl GcImages for SoftwareGc {
    fn draw_image(&mut self, image: &ImageData, x: i32, y: i32) -> Result<()> {
        let src = Rectangle::new(0, 0, image.width as i32, image.height as i32);
        let dst = Rectangle::new(x, y, image.width as i32, image.height as i32);
        self.draw_image_scaled(image, src, dst)
    }

    fn draw_image_scaled(
        &mut self,
        image: &ImageData,
        src: Rectangle,
        dst: Rectangle,
    ) -> Result<()> {
        self.live()?;
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        let pixmap = image_pixmap(image)?;
        let dst = self.mapping.rect(dst.x, dst.y, dst.width, dst.height);
        let Some(rect) =
            Rect::from_xywh(dst.x as f32, dst.y as f32, dst.width as f32, dst.height as f32)
        else {
            return Ok(());
        };
        let scale_x = dst.width as f32 / src.width as f32;
        let scale_y = dst.height as f32 / src.height as f32;
        let quality = if scale_x == 1.0 && scale_y == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let shader_ts = tiny_skia::Transform::from_row(
            scale_x,
            0.0,
            0.0,
            scale_y,
            dst.x as f32 - src.x as f32 * scale_x,
            dst.y as f32 - src.y as f32 * scale_y,
        );
        let paint = Paint {
            shader: tiny_skia::Pattern::new(
                pixmap.as_ref(),
                SpreadMode::Pad,
                quality,
                self.state.alpha as f32 / 255.0,
                shader_ts,
            ),
            anti_alias: false,
            ..Paint::default()
        };
        let ts = self.matrix();
        self.canvas.fill_rect(rect, &paint, ts);
        Ok(())
    }
}

fn image_pixmap(image: &ImageData) -> Result<Pixmap> {
    let rgba = image.to_rgba()?;
    let mut data = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        data.extend_from_slice(&premultiply([px[0], px[1], px[2], px[3]]));
    }
    let size = IntSize::from_wh(image.width, image.height).ok_or(GcError::InvalidDimensions {
        width: image.width,
        height: image.height,
    })?;
    Pixmap::from_vec(data, size).ok_or_else(|| {
        GcError::InvalidImage(format!(
            "{}x{} image does not fit a pixmap",
            image.width, image.height
        ))
    })
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.red, color.green, color.blue, color.alpha)
}

fn map_line_cap(cap: LineCap) -> SkiaLineCap {
    match cap {
        LineCap::Flat => SkiaLineCap::Butt,
        LineCap::Round => SkiaLineCap::Round,
        LineCap::Square => SkiaLineCap::Square,
    }
}

fn map_line_join(join: LineJoin) -> SkiaLineJoin {
    match join {
        LineJoin::Bevel => SkiaLineJoin::Bevel,
        LineJoin::Miter => SkiaLineJoin::Miter,
        LineJoin::Round => SkiaLineJoin::Round,
    }
}

fn map_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::Winding => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}
