//! Backend-agnostic path description in logical units.

use std::f32::consts::FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    QuadTo {
        cx: f32,
        cy: f32,
        x: f32,
        y: f32,
    },
    CubicTo {
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
        x: f32,
        y: f32,
    },
    /// Elliptical arc inscribed in `(x, y, width, height)`. Angles are in
    /// degrees, counter-clockwise from 3 o'clock.
    Arc {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        start_angle: f32,
        arc_angle: f32,
    },
    Close,
}

/// Receives path geometry with arcs already expanded into cubic curves.
pub trait PathSink {
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    fn cubic_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32);
    fn close(&mut self);
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
    current: Option<(f32, f32)>,
    subpath_start: Option<(f32, f32)>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn current_point(&self) -> Option<(f32, f32)> {
        self.current
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo { x, y });
        self.current = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.ensure_subpath(x, y);
        self.segments.push(PathSegment::LineTo { x, y });
        self.current = Some((x, y));
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.ensure_subpath(cx, cy);
        self.segments.push(PathSegment::QuadTo { cx, cy, x, y });
        self.current = Some((x, y));
    }

    pub fn cubic_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) {
        self.ensure_subpath(cx1, cy1);
        self.segments.push(PathSegment::CubicTo {
            cx1,
            cy1,
            cx2,
            cy2,
            x,
            y,
        });
        self.current = Some((x, y));
    }

    /// Appends an arc; a line joins the current point to the arc start.
    pub fn add_arc(&mut self, x: f32, y: f32, width: f32, height: f32, start_angle: f32, arc_angle: f32) {
        if width == 0.0 || height == 0.0 || arc_angle == 0.0 {
            return;
        }
        let (start, end) = arc_endpoints(x, y, width, height, start_angle, arc_angle);
        if self.current.is_none() {
            self.subpath_start = Some(start);
        }
        self.segments.push(PathSegment::Arc {
            x,
            y,
            width,
            height,
            start_angle,
            arc_angle,
        });
        self.current = Some(end);
    }

    pub fn add_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close();
    }

    pub fn close(&mut self) {
        if self.segments.is_empty() {
            return;
        }
        self.segments.push(PathSegment::Close);
        self.current = self.subpath_start;
    }

    /// Bounding box of all end and control points as `(x, y, width, height)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut min = (f32::MAX, f32::MAX);
        let mut max = (f32::MIN, f32::MIN);
        let mut include = |x: f32, y: f32| {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        };
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => include(x, y),
                PathSegment::QuadTo { cx, cy, x, y } => {
                    include(cx, cy);
                    include(x, y);
                }
                PathSegment::CubicTo {
                    cx1,
                    cy1,
                    cx2,
                    cy2,
                    x,
                    y,
                } => {
                    include(cx1, cy1);
                    include(cx2, cy2);
                    include(x, y);
                }
                PathSegment::Arc {
                    x, y, width, height, ..
                } => {
                    include(x, y);
                    include(x + width, y + height);
                }
                PathSegment::Close => {}
            }
        }
        if min.0 > max.0 {
            return (0.0, 0.0, 0.0, 0.0);
        }
        (min.0, min.1, max.0 - min.0, max.1 - min.1)
    }

    /// Replays the path into `sink`, mapping every coordinate through `map`.
    pub fn replay<S: PathSink>(&self, sink: &mut S, map: impl Fn(f32, f32) -> (f32, f32)) {
        let mut has_point = false;
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo { x, y } => {
                    let (x, y) = map(x, y);
                    sink.move_to(x, y);
                    has_point = true;
                }
                PathSegment::LineTo { x, y } => {
                    let (x, y) = map(x, y);
                    sink.line_to(x, y);
                }
                PathSegment::QuadTo { cx, cy, x, y } => {
                    let (cx, cy) = map(cx, cy);
                    let (x, y) = map(x, y);
                    sink.quad_to(cx, cy, x, y);
                }
                PathSegment::CubicTo {
                    cx1,
                    cy1,
                    cx2,
                    cy2,
                    x,
                    y,
                } => {
                    let (cx1, cy1) = map(cx1, cy1);
                    let (cx2, cy2) = map(cx2, cy2);
                    let (x, y) = map(x, y);
                    sink.cubic_to(cx1, cy1, cx2, cy2, x, y);
                }
                PathSegment::Arc {
                    x,
                    y,
                    width,
                    height,
                    start_angle,
                    arc_angle,
                } => {
                    append_arc(
                        sink,
                        x,
                        y,
                        width,
                        height,
                        start_angle,
                        arc_angle,
                        !has_point,
                        &map,
                    );
                    has_point = true;
                }
                PathSegment::Close => sink.close(),
            }
        }
    }

    fn ensure_subpath(&mut self, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(x, y);
        }
    }
}

fn arc_point(cx: f32, cy: f32, rx: f32, ry: f32, radians: f32) -> (f32, f32) {
    (cx + rx * radians.cos(), cy - ry * radians.sin())
}

fn arc_endpoints(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    start_angle: f32,
    arc_angle: f32,
) -> ((f32, f32), (f32, f32)) {
    let (rx, ry) = (width / 2.0, height / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    let start = start_angle.to_radians();
    let end = (start_angle + arc_angle).to_radians();
    (arc_point(cx, cy, rx, ry, start), arc_point(cx, cy, rx, ry, end))
}

/// Appends an elliptical arc as cubic segments of at most 90 degrees.
/// Starts with a move when `start_new` is set, otherwise joins with a line.
#[allow(clippy::too_many_arguments)]
pub(crate) fn append_arc<S: PathSink>(
    sink: &mut S,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    start_angle: f32,
    arc_angle: f32,
    start_new: bool,
    map: &impl Fn(f32, f32) -> (f32, f32),
) {
    let (rx, ry) = (width / 2.0, height / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    let sweep = arc_angle.clamp(-360.0, 360.0).to_radians();
    if sweep == 0.0 || rx == 0.0 || ry == 0.0 {
        return;
    }
    let start = start_angle.to_radians();
    let segments = (sweep.abs() / FRAC_PI_2 - 1e-4).ceil().max(1.0) as usize;
    let step = sweep / segments as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    let apply = |(px, py): (f32, f32)| map(px, py);

    let (sx, sy) = apply(arc_point(cx, cy, rx, ry, start));
    if start_new {
        sink.move_to(sx, sy);
    } else {
        sink.line_to(sx, sy);
    }

    for i in 0..segments {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        let (c0, s0) = (a0.cos(), a0.sin());
        let (c1, s1) = (a1.cos(), a1.sin());
        // Control points on the unit circle, then flipped into y-down space.
        let p1 = (cx + rx * (c0 - k * s0), cy - ry * (s0 + k * c0));
        let p2 = (cx + rx * (c1 + k * s1), cy - ry * (s1 - k * c1));
        let p3 = (cx + rx * c1, cy - ry * s1);
        let (x1, y1) = apply(p1);
        let (x2, y2) = apply(p2);
        let (x3, y3) = apply(p3);
        sink.cubic_to(x1, y1, x2, y2, x3, y3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        ops: Vec<String>,
        last: (f32, f32),
    }

    impl PathSink for Collect {
        fn move_to(&mut self, x: f32, y: f32) {
            self.ops.push("M".into());
            self.last = (x, y);
        }
        fn line_to(&mut self, x: f32, y: f32) {
            self.ops.push("L".into());
            self.last = (x, y);
        }
        fn quad_to(&mut self, _cx: f32, _cy: f32, x: f32, y: f32) {
            self.ops.push("Q".into());
            self.last = (x, y);
        }
        fn cubic_to(&mut self, _cx1: f32, _cy1: f32, _cx2: f32, _cy2: f32, x: f32, y: f32) {
            self.ops.push("C".into());
            self.last = (x, y);
        }
        fn close(&mut self) {
            self.ops.push("Z".into());
        }
    }

    #[test]
    fn full_circle_expands_to_four_cubics() {
        let mut path = Path::new();
        path.add_arc(0.0, 0.0, 10.0, 10.0, 0.0, 360.0);
        let mut sink = Collect::default();
        path.replay(&mut sink, |x, y| (x, y));
        assert_eq!(sink.ops, vec!["M", "C", "C", "C", "C"]);
        assert!((sink.last.0 - 10.0).abs() < 1e-4);
        assert!((sink.last.1 - 5.0).abs() < 1e-4);
    }

    #[test]
    fn quarter_arc_ends_at_top() {
        let mut path = Path::new();
        path.add_arc(0.0, 0.0, 20.0, 20.0, 0.0, 90.0);
        let end = path.current_point().unwrap();
        assert!((end.0 - 10.0).abs() < 1e-4);
        assert!(end.1.abs() < 1e-4);
    }

    #[test]
    fn arc_after_line_is_joined() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.add_arc(0.0, 0.0, 10.0, 10.0, 90.0, 90.0);
        let mut sink = Collect::default();
        path.replay(&mut sink, |x, y| (x * 2.0, y * 2.0));
        assert_eq!(sink.ops, vec!["M", "L", "C"]);
        assert!(sink.last.0.abs() < 1e-4);
        assert!((sink.last.1 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn rectangle_bounds() {
        let mut path = Path::new();
        path.add_rectangle(2.0, 3.0, 4.0, 5.0);
        assert_eq!(path.bounds(), (2.0, 3.0, 4.0, 5.0));
        assert_eq!(path.current_point(), Some((2.0, 3.0)));
    }

    #[test]
    fn line_without_move_starts_subpath() {
        let mut path = Path::new();
        path.line_to(4.0, 4.0);
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo { x: 4.0, y: 4.0 },
                PathSegment::LineTo { x: 4.0, y: 4.0 }
            ]
        );
    }
}
