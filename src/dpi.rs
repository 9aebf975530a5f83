//! Logical ⇄ physical coordinate scaling.
//!
//! Zoom is a percentage of 100. All conversions round to the nearest integer
//! with ties away from zero, which makes `to_logical(to_pixels(v))` recover `v`
//! exactly for every zoom of 100 or more, and within one unit down to 50.
//! Results saturate at the `i32` range.

use crate::geometry::{Point, Rectangle};
use crate::transform::Transform;

/// Zoom expressed as percent (100 = no scaling).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Zoom(pub u32);

impl Zoom {
    pub const IDENTITY: Zoom = Zoom(100);

    pub fn percent(self) -> u32 {
        self.0
    }

    pub fn factor(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::IDENTITY
    }
}

pub fn to_pixels(value: i32, zoom: Zoom) -> i32 {
    if zoom == Zoom::IDENTITY {
        return value;
    }
    (value as f64 * zoom.0 as f64 / 100.0).round() as i32
}

pub fn to_logical(value: i32, zoom: Zoom) -> i32 {
    if zoom == Zoom::IDENTITY {
        return value;
    }
    (value as f64 * 100.0 / zoom.0 as f64).round() as i32
}

pub fn to_pixels_f(value: f32, zoom: Zoom) -> f32 {
    value * zoom.factor()
}

pub fn to_logical_f(value: f32, zoom: Zoom) -> f32 {
    value / zoom.factor()
}

pub fn point_to_pixels(p: Point, zoom: Zoom) -> Point {
    Point::new(to_pixels(p.x, zoom), to_pixels(p.y, zoom))
}

pub fn point_to_logical(p: Point, zoom: Zoom) -> Point {
    Point::new(to_logical(p.x, zoom), to_logical(p.y, zoom))
}

/// Scales position and size independently, so `rect_to_logical` undoes
/// `rect_to_pixels` to within one unit for every zoom of 50 or more.
pub fn rect_to_pixels(r: Rectangle, zoom: Zoom) -> Rectangle {
    Rectangle::new(
        to_pixels(r.x, zoom),
        to_pixels(r.y, zoom),
        to_pixels(r.width, zoom),
        to_pixels(r.height, zoom),
    )
}

pub fn rect_to_logical(r: Rectangle, zoom: Zoom) -> Rectangle {
    Rectangle::new(
        to_logical(r.x, zoom),
        to_logical(r.y, zoom),
        to_logical(r.width, zoom),
        to_logical(r.height, zoom),
    )
}

/// Half-pixel shift that keeps odd-width strokes on the pixel grid.
/// Zero for hairlines (width 0) and even widths.
pub fn crisp_offset(scaled_line_width: i32) -> f32 {
    if scaled_line_width % 2 == 1 { 0.5 } else { 0.0 }
}

/// Expresses a logical-space `user` transform in pixel space: `S · U · S⁻¹`.
/// With uniform scaling only the translation part changes.
pub fn transform_to_pixels(user: &Transform, zoom: Zoom) -> Transform {
    let [a, b, c, d, e, f] = user.elements();
    let s = zoom.factor();
    Transform::new(a, b, c, d, e * s, f * s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50)]
    #[case(75)]
    #[case(100)]
    #[case(125)]
    #[case(150)]
    #[case(175)]
    #[case(200)]
    #[case(250)]
    #[case(300)]
    fn rect_round_trip_is_within_one_unit(#[case] percent: u32) {
        let zoom = Zoom(percent);
        for x in -7..13 {
            for w in 0..9 {
                let r = Rectangle::new(x, x * 3 - 1, w, w + 2);
                let back = rect_to_logical(rect_to_pixels(r, zoom), zoom);
                assert!((back.x - r.x).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.y - r.y).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.width - r.width).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.height - r.height).abs() <= 1, "{r:?} -> {back:?}");
            }
        }
    }

    #[rstest]
    #[case(150)]
    #[case(175)]
    fn repeated_round_trips_are_idempotent(#[case] percent: u32) {
        let zoom = Zoom(percent);
        for v in -50..50 {
            let once = to_logical(to_pixels(v, zoom), zoom);
            let twice = to_logical(to_pixels(once, zoom), zoom);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn rect_straddling_zero_keeps_its_size() {
        let r = Rectangle::new(-1, 0, 2, 2);
        let px = rect_to_pixels(r, Zoom(50));
        assert_eq!(px, Rectangle::new(-1, 0, 1, 1));
        assert_eq!(rect_to_logical(px, Zoom(50)), Rectangle::new(-2, 0, 2, 2));
    }

    #[test]
    fn extreme_values_saturate() {
        assert_eq!(to_pixels(i32::MAX, Zoom(200)), i32::MAX);
        assert_eq!(to_pixels(i32::MIN, Zoom(300)), i32::MIN);
        let r = rect_to_pixels(Rectangle::new(i32::MAX - 1, 0, 10, 10), Zoom(150));
        assert_eq!((r.x, r.width), (i32::MAX, 15));
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(to_pixels(1, Zoom(150)), 2);
        assert_eq!(to_pixels(-1, Zoom(150)), -2);
        assert_eq!(to_pixels(3, Zoom(150)), 5);
    }

    #[test]
    fn crisp_offset_only_for_odd_widths() {
        assert_eq!(crisp_offset(0), 0.0);
        assert_eq!(crisp_offset(1), 0.5);
        assert_eq!(crisp_offset(2), 0.0);
        assert_eq!(crisp_offset(3), 0.5);
    }

    #[test]
    fn pixel_space_transform_scales_translation_only() {
        let mut t = Transform::identity();
        t.translate(10.0, 4.0);
        t.rotate(30.0);
        let px = transform_to_pixels(&t, Zoom(200));
        let [a, b, c, d, e, f] = t.elements();
        assert_eq!(px.elements(), [a, b, c, d, e * 2.0, f * 2.0]);
    }
}
