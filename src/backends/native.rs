//! Cairo backend behind the optional `cairo` crate feature.
//!
//! Drawing goes straight to a Cairo image surface that mirrors the pixels of
//! the target [`Surface`]; Cairo's own clip and matrix state carry the context
//! state. Pixels are published back to the surface when a context is disposed.

use std::rc::Rc;

use cairo::{
    Antialias as CairoAntialias, Context, Extend, FillRule as CairoFillRule, Filter, FontSlant,
    FontWeight, Format, ImageSurface, LineCap as CairoLineCap, LineJoin as CairoLineJoin,
    LinearGradient, Matrix, Operator, SurfacePattern,
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
use crate::text;
use crate::transform::Transform;

const AVERAGE_WIDTH_SAMPLE: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The Cairo mirror of a surface, shared by a root context and its children.
struct NativeTarget {
    surface: Surface,
    image: ImageSurface,
}

impl NativeTarget {
    fn new(surface: &Surface) -> Result<Self> {
        let (width, height) = (surface.width(), surface.height());
        let mut buf = Vec::with_capacity(width as usize * height as usize * 4);
        for px in surface.pixels().chunks_exact(4) {
            buf.extend_from_slice(&pack_argb([px[0], px[1], px[2], px[3]]));
        }
        let image = ImageSurface::create_for_data(
            buf,
            Format::ARgb32,
            width as i32,
            height as i32,
            (width * 4) as i32,
        )?;
        Ok(Self {
            surface: surface.clone(),
            image,
        })
    }

    /// Copies the Cairo pixels into the surface store.
    fn publish(&self) -> Result<()> {
        self.image.flush();
        let row_bytes = self.surface.width() as usize * 4;
        let stride = self.image.stride() as usize;
        let mut pixels = self.surface.pixels_mut();
        self.image.with_data(|data| {
            for (y, row) in pixels.chunks_exact_mut(row_bytes).enumerate() {
                let src = &data[y * stride..y * stride + row_bytes];
                for (dst, px) in row.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    dst.copy_from_slice(&unpack_argb([px[0], px[1], px[2], px[3]]));
                }
            }
        })?;
        Ok(())
    }
}

/// Premultiplied RGBA to Cairo's native-endian ARGB32.
fn pack_argb([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let v = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
    v.to_ne_bytes()
}

fn unpack_argb(px: [u8; 4]) -> [u8; 4] {
    let v = u32::from_ne_bytes(px);
    [(v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8]
}

/// A graphics context that forwards every call to Cairo.
pub struct NativeGc {
    target: Rc<NativeTarget>,
    ctx: Context,
    state: GcState,
    mapping: DeviceMapping,
    size: (i32, i32),
    device_zoom: f32,
    disposed: bool,
}

impl NativeGc {
    pub fn new(surface: &Surface, device_zoom: f32) -> Result<Self> {
        let target = Rc::new(NativeTarget::new(surface)?);
        let ctx = Context::new(&target.image)?;
        let gc = Self {
            target,
            ctx,
            state: GcState::default(),
            mapping: DeviceMapping::new(surface.zoom(), Point::default()),
            size: surface.logical_size(),
            device_zoom,
            disposed: false,
        };
        gc.apply_clip()?;
        log::debug!(
            target: "gc",
            "created native context {}x{} at zoom {}",
            surface.width(),
            surface.height(),
            surface.zoom().percent()
        );
        Ok(gc)
    }

    /// Derives a context for `bounds` (relative to this context) that draws
    /// into the same Cairo surface with fresh state.
    pub fn child(&self, bounds: Rectangle) -> Result<NativeGc> {
        self.live()?;
        let bounds = bounds.normalized();
        let child = Self {
            target: Rc::clone(&self.target),
            ctx: Context::new(&self.target.image)?,
            state: GcState::default(),
            mapping: DeviceMapping::new(self.mapping.zoom, self.mapping.origin.offset(bounds.origin())),
            size: (bounds.width, bounds.height),
            device_zoom: self.device_zoom,
            disposed: false,
        };
        child.apply_clip()?;
        log::debug!(target: "gc", "derived native child at {:?}", child.mapping.origin);
        Ok(child)
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

    /// Loads matrix, antialiasing and operator for the next primitive.
    fn prepare(&self) {
        self.ctx
            .set_matrix(to_cairo_matrix(&self.mapping.matrix(&self.state.transform)));
        self.ctx.set_antialias(map_antialias(self.state.antialias));
        self.ctx.set_operator(if self.state.xor_mode {
            Operator::Difference
        } else {
            Operator::Over
        });
    }

    /// Applies pen settings and returns the crisp-line offset.
    fn apply_line(&self) -> f32 {
        let width = self.state.line_width_pixels(self.zoom_px());
        self.ctx
            .set_line_width(if width == 0 { 1.0 } else { width as f64 });
        self.ctx.set_line_cap(map_line_cap(self.state.line.cap));
        self.ctx.set_line_join(map_line_join(self.state.line.join));
        self.ctx.set_miter_limit(self.state.line.miter_limit as f64);
        match self.state.dash_pixels(self.zoom_px()) {
            Some(dash) => {
                let dash: Vec<f64> = dash.iter().map(|&d| d as f64).collect();
                self.ctx.set_dash(&dash, 0.0);
            }
            None => self.ctx.set_dash(&[], 0.0),
        }
        dpi::crisp_offset(width)
    }

    fn apply_paint(&self, pattern: Option<&Pattern>, color: Color) -> Result<()> {
        match pattern {
            None => {
                let (r, g, b, a) = color.to_unit();
                self.ctx.set_source_rgba(r, g, b, a);
            }
            Some(Pattern::LinearGradient {
                x1,
                y1,
                x2,
                y2,
                from,
                to,
            }) => {
                let (sx, sy) = self.mapping.point_f(*x1, *y1);
                let (ex, ey) = self.mapping.point_f(*x2, *y2);
                let gradient = LinearGradient::new(sx as f64, sy as f64, ex as f64, ey as f64);
                for (offset, c) in [(0.0, from), (1.0, to)] {
                    let (r, g, b, a) = c.with_opacity(self.state.alpha).to_unit();
                    gradient.add_color_stop_rgba(offset, r, g, b, a);
                }
                self.ctx.set_source(&gradient)?;
            }
            Some(Pattern::Image(image)) => {
                let surface = image_surface(image)?;
                let pattern = SurfacePattern::create(&surface);
                pattern.set_extend(Extend::Repeat);
                let s = self.zoom_px().factor() as f64;
                let (ox, oy) = self.mapping.point_f(0.0, 0.0);
                pattern.set_matrix(Matrix::new(
                    1.0 / s,
                    0.0,
                    0.0,
                    1.0 / s,
                    -ox as f64 / s,
                    -oy as f64 / s,
                ));
                self.ctx.set_source(&pattern)?;
            }
        }
        Ok(())
    }

    fn apply_font(&self) {
        let data = self.state.font.primary();
        let slant = if data.style.italic {
            FontSlant::Italic
        } else {
            FontSlant::Normal
        };
        let weight = if data.style.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        self.ctx.select_font_face(&data.name, slant, weight);
        self.ctx
            .set_font_size(data.pixel_size(self.zoom_px(), self.device_zoom) as f64);
    }

    /// Runs `f` with the current font under an identity matrix so results
    /// are in pixels.
    fn measure<T>(&self, f: impl FnOnce(&Context) -> Result<T>) -> Result<T> {
        self.ctx.save()?;
        self.ctx.identity_matrix();
        self.apply_font();
        let result = f(&self.ctx);
        self.ctx.restore()?;
        result
    }

    fn stroke(&self, path: &Path, map: impl Fn(f32, f32) -> (f32, f32)) -> Result<()> {
        self.prepare();
        self.apply_paint(self.state.foreground_pattern.as_ref(), self.state.stroke_color())?;
        self.ctx.new_path();
        path.replay(&mut CairoSink::new(&self.ctx), map);
        self.ctx.stroke()?;
        Ok(())
    }

    fn fill(&self, path: &Path, map: impl Fn(f32, f32) -> (f32, f32)) -> Result<()> {
        self.prepare();
        self.apply_paint(self.state.background_pattern.as_ref(), self.state.fill_color())?;
        self.ctx.set_fill_rule(map_fill_rule(self.state.fill_rule));
        self.ctx.new_path();
        path.replay(&mut CairoSink::new(&self.ctx), map);
        self.ctx.fill()?;
        Ok(())
    }

    fn stroke_px(&self, path: &Path) -> Result<()> {
        self.stroke(path, |x, y| (x, y))
    }

    fn fill_px(&self, path: &Path) -> Result<()> {
        self.fill(path, |x, y| (x, y))
    }

    /// Rebuilds Cairo's clip from the context area and the current clip
    /// shape, interpreted through the current transform.
    fn apply_clip(&self) -> Result<()> {
        self.ctx.reset_clip();
        self.ctx.identity_matrix();
        self.ctx.new_path();
        let area = self.mapping.rect(0, 0, self.size.0, self.size.1);
        self.ctx.rectangle(
            area.x as f64,
            area.y as f64,
            area.width as f64,
            area.height as f64,
        );
        self.ctx.clip();

        if let Some(clip) = &self.state.clip {
            self.prepare();
            let rule = match clip {
                Clip::Rectangle(r) => {
                    let r = self.mapping.rect(r.x, r.y, r.width, r.height);
                    self.ctx.rectangle(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
                    FillRule::Winding
                }
                Clip::Region(region) => {
                    for r in region.rects() {
                        let r = self.mapping.rect(r.x, r.y, r.width, r.height);
                        self.ctx
                            .rectangle(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
                    }
                    FillRule::Winding
                }
                Clip::Path(path) => {
                    let mapping = self.mapping;
                    path.replay(&mut CairoSink::new(&self.ctx), move |x, y| mapping.point_f(x, y));
                    self.state.fill_rule
                }
            };
            self.ctx.set_fill_rule(map_fill_rule(rule));
            self.ctx.clip();
        }
        Ok(())
    }

    fn draw_lines(&self, lines: &[String], x: i32, y: i32, transparent: bool) -> Result<()> {
        let (ascent, line_height, widths) = self.measure(|ctx| {
            let extents = ctx.font_extents()?;
            let mut widths = Vec::with_capacity(lines.len());
            for line in lines {
                widths.push(ctx.text_extents(line)?.x_advance());
            }
            Ok((extents.ascent(), extents.height(), widths))
        })?;
        let (px, py) = self.mapping.point(x, y);
        let (px, py) = (px as f64, py as f64);

        self.prepare();
        if !transparent {
            let width = widths.iter().cloned().fold(0.0, f64::max);
            let (r, g, b, a) = self.state.fill_color().to_unit();
            self.ctx.set_source_rgba(r, g, b, a);
            self.ctx.new_path();
            self.ctx
                .rectangle(px, py, width.ceil(), (line_height * lines.len() as f64).ceil());
            self.ctx.fill()?;
        }

        self.apply_font();
        self.apply_paint(self.state.foreground_pattern.as_ref(), self.state.stroke_color())?;
        for (i, line) in lines.iter().enumerate() {
            self.ctx.new_path();
            self.ctx.move_to(px, py + i as f64 * line_height + ascent);
            self.ctx.show_text(line)?;
        }
        self.ctx.new_path();
        Ok(())
    }

    fn extent(&self, lines: &[String]) -> Result<Point> {
        let (width, height) = self.measure(|ctx| {
            let extents = ctx.font_extents()?;
            let mut width: f64 = 0.0;
            for line in lines {
                width = width.max(ctx.text_extents(line)?.x_advance());
            }
            Ok((width, extents.height() * lines.len() as f64))
        })?;
        Ok(Point::new(
            dpi::to_logical(width.ceil() as i32, self.zoom_px()),
            dpi::to_logical(height.ceil() as i32, self.zoom_px()),
        ))
    }
}

impl Drop for NativeGc {
    fn drop(&mut self) {
        if !self.disposed
            && let Err(err) = self.dispose()
        {
            log::warn!(target: "gc", "failed to release native context: {}", err);
        }
    }
}

struct CairoSink<'a> {
    ctx: &'a Context,
    last: (f32, f32),
    start: (f32, f32),
}

impl<'a> CairoSink<'a> {
    fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            last: (0.0, 0.0),
            start: (0.0, 0.0),
        }
    }
}

impl PathSink for CairoSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
        self.last = (x, y);
        self.start = (x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
        self.last = (x, y);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let (sx, sy) = self.last;
        self.cubic_to(
            sx + 2.0 / 3.0 * (cx - sx),
            sy + 2.0 / 3.0 * (cy - sy),
            x + 2.0 / 3.0 * (cx - x),
            y + 2.0 / 3.0 * (cy - y),
            x,
            y,
        );
    }

    fn cubic_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) {
        self.ctx.curve_to(
            cx1 as f64, cy1 as f64, cx2 as f64, cy2 as f64, x as f64, y as f64,
        );
        self.last = (x, y);
    }

    fn close(&mut self) {
        self.ctx.close_path();
        self.last = self.start;
    }
}

impl GcLifecycle for NativeGc {
    fn backend(&self) -> BackendKind {
        BackendKind::Native
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
        self.target.image.flush();
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.live()?;
        self.disposed = true;
        self.target.publish()?;
        log::debug!(target: "gc", "disposed native context at {:?}", self.mapping.origin);
        Ok(())
    }
}

impl GcPaint for NativeGc {
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
        self.state.foreground_pattern = pattern.cloned();
        Ok(())
    }

    fn foreground_pattern(&self) -> Result<Option<Pattern>> {
        self.live()?;
        Ok(self.state.foreground_pattern.clone())
    }

    fn set_background_pattern(&mut self, pattern: Option<&Pattern>) -> Result<()> {
        self.live()?;
        self.state.background_pattern = pattern.cloned();
        Ok(())
    }

    fn background_pattern(&self) -> Result<Option<Pattern>> {
        self.live()?;
        Ok(self.state.background_pattern.clone())
    }

    fn set_xor_mode(&mut self, xor: bool) -> Result<()> {
        self.live()?;
        self.state.xor_mode = xor;
        Ok(())
    }

    fn xor_mode(&self) -> Result<bool> {
        self.live()?;
        Ok(self.state.xor_mode)
    }
}

impl GcLineStyles for NativeGc {
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

impl GcRendering for NativeGc {
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

impl GcTransforms for NativeGc {
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

impl GcClipping for NativeGc {
    fn set_clipping(&mut self, clip: Option<&Clip>) -> Result<()> {
        self.live()?;
        self.state.set_clip(clip);
        log::debug!(target: "gc", "native clip set to {:?}", clip);
        self.apply_clip()
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

impl GcShapes for NativeGc {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.live()?;
        let offset = self.apply_line();
        let points = [self.mapping.point(x1, y1), self.mapping.point(x2, y2)];
        self.stroke_px(&backends::poly_path(&points, offset, false))
    }

    fn draw_point(&mut self, x: i32, y: i32) -> Result<()> {
        self.live()?;
        let r = backends::point_rect(x, y);
        let r = self.mapping.rect(r.x, r.y, r.width, r.height);
        self.prepare();
        let (red, g, b, a) = self.state.stroke_color().to_unit();
        self.ctx.set_source_rgba(red, g, b, a);
        self.ctx.new_path();
        self.ctx
            .rectangle(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
        self.ctx.fill()?;
        Ok(())
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let offset = self.apply_line();
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_px(&backends::rect_path(r, offset))
    }

    fn fill_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.fill_px(&backends::rect_path(r, 0.0))
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
        if r.is_empty() {
            return Ok(());
        }
        let (x1, y1) = (r.x as f32, r.y as f32);
        let (x2, y2) = if vertical {
            (x1, r.bottom() as f32)
        } else {
            (r.right() as f32, y1)
        };
        self.prepare();
        let gradient = LinearGradient::new(x1 as f64, y1 as f64, x2 as f64, y2 as f64);
        for (offset, c) in [(0.0, self.state.stroke_color()), (1.0, self.state.fill_color())] {
            let (red, g, b, a) = c.to_unit();
            gradient.add_color_stop_rgba(offset, red, g, b, a);
        }
        self.ctx.set_source(&gradient)?;
        self.ctx.new_path();
        self.ctx
            .rectangle(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
        self.ctx.fill()?;
        Ok(())
    }

    fn draw_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let offset = self.apply_line();
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_px(&backends::oval_path(r, offset))
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.fill_px(&backends::oval_path(r, 0.0))
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
        let offset = self.apply_line();
        let r = self.mapping.rect(x, y, width, height);
        self.stroke_px(&backends::arc_path(r, offset, start_angle, arc_angle, false))
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
        self.fill_px(&backends::arc_path(r, 0.0, start_angle, arc_angle, true))
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
        let offset = self.apply_line();
        let r = self.mapping.rect(x, y, width, height);
        let (aw, ah) = (dpi::to_pixels(arc_width, self.zoom_px()), dpi::to_pixels(arc_height, self.zoom_px()));
        self.stroke_px(&backends::round_rect_path(r, offset, aw, ah))
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
        let (aw, ah) = (dpi::to_pixels(arc_width, self.zoom_px()), dpi::to_pixels(arc_height, self.zoom_px()));
        self.fill_px(&backends::round_rect_path(r, 0.0, aw, ah))
    }

    fn draw_polyline(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points: Vec<_> = backends::point_pairs(points)?
            .into_iter()
            .map(|(x, y)| self.mapping.point(x, y))
            .collect();
        let offset = self.apply_line();
        self.stroke_px(&backends::poly_path(&points, offset, false))
    }

    fn draw_polygon(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points: Vec<_> = backends::point_pairs(points)?
            .into_iter()
            .map(|(x, y)| self.mapping.point(x, y))
            .collect();
        let offset = self.apply_line();
        self.stroke_px(&backends::poly_path(&points, offset, true))
    }

    fn fill_polygon(&mut self, points: &[i32]) -> Result<()> {
        self.live()?;
        let points: Vec<_> = backends::point_pairs(points)?
            .into_iter()
            .map(|(x, y)| self.mapping.point(x, y))
            .collect();
        self.fill_px(&backends::poly_path(&points, 0.0, true))
    }

    fn draw_path(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        let offset = self.apply_line();
        let mapping = self.mapping;
        self.stroke(path, move |x, y| {
            let (px, py) = mapping.point_f(x, y);
            (px + offset, py + offset)
        })
    }

    fn fill_path(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        let mapping = self.mapping;
        self.fill(path, move |x, y| mapping.point_f(x, y))
    }

    fn draw_focus(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.live()?;
        let r = self.mapping.rect(x, y, width, height);
        self.prepare();
        let (red, g, b, a) = self.state.stroke_color().to_unit();
        self.ctx.set_source_rgba(red, g, b, a);
        self.ctx.set_line_width(1.0);
        self.ctx.set_line_cap(CairoLineCap::Butt);
        self.ctx
            .set_dash(&[FOCUS_DASH[0] as f64, FOCUS_DASH[1] as f64], 0.0);
        self.ctx.new_path();
        backends::rect_path(r, 0.5).replay(&mut CairoSink::new(&self.ctx), |x, y| (x, y));
        self.ctx.stroke()?;
        Ok(())
    }
}

impl GcText for NativeGc {
    fn set_font(&mut self, font: &Font) -> Result<()> {
        self.live()?;
        self.state.font = font.clone();
        self.apply_font();
        Ok(())
    }

    fn font(&self) -> Result<Font> {
        self.live()?;
        Ok(self.state.font.clone())
    }

    fn font_metrics(&self) -> Result<FontMetrics> {
        self.live()?;
        let zoom = self.zoom_px();
        self.measure(|ctx| {
            let extents = ctx.font_extents()?;
            let sample = ctx.text_extents(AVERAGE_WIDTH_SAMPLE)?;
            let average = sample.x_advance() / AVERAGE_WIDTH_SAMPLE.len() as f64;
            Ok(FontMetrics {
                ascent: dpi::to_logical(extents.ascent().ceil() as i32, zoom),
                descent: dpi::to_logical(extents.descent().ceil() as i32, zoom),
                height: dpi::to_logical(extents.height().ceil() as i32, zoom),
                average_char_width: dpi::to_logical_f(average as f32, zoom),
            })
        })
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32, transparent: bool) -> Result<()> {
        self.live()?;
        self.draw_lines(&[text.to_string()], x, y, transparent)
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, flags: TextFlags) -> Result<()> {
        self.live()?;
        let lines = text::layout_lines(text, flags);
        self.draw_lines(&lines, x, y, flags.transparent)
    }

    fn string_extent(&mut self, text: &str) -> Result<Point> {
        self.live()?;
        self.extent(&[text.to_string()])
    }

    fn text_extent(&mut self, text: &str, flags: TextFlags) -> Result<Point> {
        self.live()?;
        self.extent(&text::layout_lines(text, flags))
    }
}

impl GcImages for NativeGc {
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
        let surface = image_surface(image)?;
        let dst = self.mapping.rect(dst.x, dst.y, dst.width, dst.height);
        let scale_x = dst.width as f64 / src.width as f64;
        let scale_y = dst.height as f64 / src.height as f64;

        self.prepare();
        self.ctx.save()?;
        self.ctx.new_path();
        self.ctx
            .rectangle(dst.x as f64, dst.y as f64, dst.width as f64, dst.height as f64);
        self.ctx.clip();
        self.ctx.translate(dst.x as f64, dst.y as f64);
        self.ctx.scale(scale_x, scale_y);
        self.ctx.translate(-src.x as f64, -src.y as f64);
        let pattern = SurfacePattern::create(&surface);
        pattern.set_filter(if scale_x == 1.0 && scale_y == 1.0 {
            Filter::Nearest
        } else {
            Filter::Good
        });
        pattern.set_extend(Extend::Pad);
        self.ctx.set_source(&pattern)?;
        self.ctx.paint_with_alpha(self.state.alpha as f64 / 255.0)?;
        self.ctx.restore()?;
        Ok(())
    }
}

fn image_surface(image: &ImageData) -> Result<ImageSurface> {
    let rgba = image.to_rgba()?;
    let mut buf = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        buf.extend_from_slice(&pack_argb(premultiply([px[0], px[1], px[2], px[3]])));
    }
    let surface = ImageSurface::create_for_data(
        buf,
        Format::ARgb32,
        image.width as i32,
        image.height as i32,
        (image.width * 4) as i32,
    )?;
    Ok(surface)
}

fn to_cairo_matrix(t: &Transform) -> Matrix {
    let [a, b, c, d, e, f] = t.elements();
    Matrix::new(a as f64, b as f64, c as f64, d as f64, e as f64, f as f64)
}

fn map_antialias(antialias: Antialias) -> CairoAntialias {
    match antialias {
        Antialias::Default => CairoAntialias::Default,
        Antialias::Off => CairoAntialias::None,
        Antialias::On => CairoAntialias::Gray,
    }
}

fn map_line_cap(cap: LineCap) -> CairoLineCap {
    match cap {
        LineCap::Flat => CairoLineCap::Butt,
        LineCap::Round => CairoLineCap::Round,
        LineCap::Square => CairoLineCap::Square,
    }
}

fn map_line_join(join: LineJoin) -> CairoLineJoin {
    match join {
        LineJoin::Bevel => CairoLineJoin::Bevel,
        LineJoin::Miter => CairoLineJoin::Miter,
        LineJoin::Round => CairoLineJoin::Round,
    }
}

fn map_fill_rule(rule: FillRule) -> CairoFillRule {
    match rule {
        FillRule::Winding => CairoFillRule::Winding,
        FillRule::EvenOdd => CairoFillRule::EvenOdd,
    }
}
