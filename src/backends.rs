//! Backend implementations of the graphics-context contract, plus the
//! pixel-space shape builders both of them share so their geometry agrees.

#[cfg(feature = "cairo")]
pub mod native;
pub mod software;

use crate::error::{GcError, Result};
use crate::geometry::Rectangle;
use crate::path::Path;

/// Pairs up a flat `x0, y0, x1, y1, ...` slice.
pub(crate) fn point_pairs(points: &[i32]) -> Result<Vec<(i32, i32)>> {
    if points.len() % 2 != 0 {
        return Err(GcError::InvalidArgument(format!(
            "point array needs an even number of coordinates, got {}",
            points.len()
        )));
    }
    Ok(points.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

pub(crate) fn rect_path(r: Rectangle, offset: f32) -> Path {
    let mut path = Path::new();
    path.add_rectangle(
        r.x as f32 + offset,
        r.y as f32 + offset,
        r.width as f32,
        r.height as f32,
    );
    path
}

pub(crate) fn oval_path(r: Rectangle, offset: f32) -> Path {
    let mut path = Path::new();
    path.add_arc(
        r.x as f32 + offset,
        r.y as f32 + offset,
        r.width as f32,
        r.height as f32,
        0.0,
        360.0,
    );
    path.close();
    path
}

/// Open arc for strokes, or a pie slice through the centre for fills.
pub(crate) fn arc_path(r: Rectangle, offset: f32, start: i32, extent: i32, pie: bool) -> Path {
    let mut path = Path::new();
    let (x, y) = (r.x as f32 + offset, r.y as f32 + offset);
    let (w, h) = (r.width as f32, r.height as f32);
    if pie {
        path.move_to(x + w / 2.0, y + h / 2.0);
    }
    path.add_arc(x, y, w, h, start as f32, extent as f32);
    if pie {
        path.close();
    }
    path
}

/// `arc_width`/`arc_height` are the corner ellipse diameters in pixels.
pub(crate) fn round_rect_path(r: Rectangle, offset: f32, arc_width: i32, arc_height: i32) -> Path {
    let aw = arc_width.abs().min(r.width) as f32;
    let ah = arc_height.abs().min(r.height) as f32;
    if aw == 0.0 || ah == 0.0 {
        return rect_path(r, offset);
    }
    let (x, y) = (r.x as f32 + offset, r.y as f32 + offset);
    let (w, h) = (r.width as f32, r.height as f32);
    let mut path = Path::new();
    path.move_to(x + aw / 2.0, y);
    path.line_to(x + w - aw / 2.0, y);
    path.add_arc(x + w - aw, y, aw, ah, 90.0, -90.0);
    path.line_to(x + w, y + h - ah / 2.0);
    path.add_arc(x + w - aw, y + h - ah, aw, ah, 0.0, -90.0);
    path.line_to(x + aw / 2.0, y + h);
    path.add_arc(x, y + h - ah, aw, ah, 270.0, -90.0);
    path.line_to(x, y + ah / 2.0);
    path.add_arc(x, y, aw, ah, 180.0, -90.0);
    path.close();
    path
}

pub(crate) fn poly_path(points: &[(f32, f32)], offset: f32, close: bool) -> Path {
    let mut path = Path::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(x + offset, y + offset);
        } else {
            path.line_to(x + offset, y + offset);
        }
    }
    if close {
        path.close();
    }
    path
}

/// Bounding rectangle of a single logical pixel drawn by `draw_point`.
pub(crate) fn point_rect(x: i32, y: i32) -> Rectangle {
    Rectangle::new(x, y, 1, 1)
}

/// Focus rectangles are one-pixel dotted outlines.
pub(crate) const FOCUS_DASH: [f32; 2] = [1.0, 1.0];
