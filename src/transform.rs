//! 2D affine transforms.

use crate::error::{GcError, Result};

/// An affine matrix `[m11, m12, m21, m22, dx, dy]` mapping
/// `(x, y)` to `(m11*x + m21*y + dx, m12*x + m22*y + dy)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    elements: [f32; 6],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn new(m11: f32, m12: f32, m21: f32, m22: f32, dx: f32, dy: f32) -> Self {
        Self {
            elements: [m11, m12, m21, m22, dx, dy],
        }
    }

    pub fn elements(&self) -> [f32; 6] {
        self.elements
    }

    pub fn is_identity(&self) -> bool {
        self.elements == Self::IDENTITY.elements
    }

    /// Pre-multiplies `matrix`: points go through `matrix` first, then `self`.
    pub fn multiply(&mut self, matrix: &Transform) {
        let [a, b, c, d, e, f] = self.elements;
        let [na, nb, nc, nd, ne, nf] = matrix.elements;
        self.elements = [
            a * na + c * nb,
            b * na + d * nb,
            a * nc + c * nd,
            b * nc + d * nd,
            a * ne + c * nf + e,
            b * ne + d * nf + f,
        ];
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.multiply(&Transform::new(1.0, 0.0, 0.0, 1.0, x, y));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.multiply(&Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0));
    }

    /// Rotates clockwise (y-down) by `degrees`.
    pub fn rotate(&mut self, degrees: f32) {
        let (s, c) = degrees.to_radians().sin_cos();
        self.multiply(&Transform::new(c, s, -s, c, 0.0, 0.0));
    }

    pub fn invert(&mut self) -> Result<()> {
        let [a, b, c, d, e, f] = self.elements;
        let det = a * d - b * c;
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return Err(GcError::NonInvertible);
        }
        let inv = 1.0 / det;
        self.elements = [
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ];
        Ok(())
    }

    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.elements;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for tiny_skia::Transform {
    fn from(t: Transform) -> Self {
        let [a, b, c, d, e, f] = t.elements;
        tiny_skia::Transform::from_row(a, b, c, d, e, f)
    }
}
