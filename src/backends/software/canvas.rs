//! A tiny-skia pixmap with the save/restore clip stack the rasterizer lacks.

use std::cell::RefCell;
use std::rc::Rc;

use tiny_skia::{FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::{GcError, Result};
use crate::geometry::Rectangle;
use crate::surface::Surface;

/// Drawing target of a software context. Children share the pixmap but keep
/// their own clip stack.
pub(crate) struct RasterCanvas {
    pixmap: Rc<RefCell<Pixmap>>,
    clip: Option<Mask>,
    saved: Vec<Option<Mask>>,
}

impl RasterCanvas {
    /// A canvas seeded with the current pixels of `surface`.
    pub fn from_surface(surface: &Surface) -> Result<Self> {
        let (width, height) = (surface.width(), surface.height());
        let mut pixmap =
            Pixmap::new(width, height).ok_or(GcError::InvalidDimensions { width, height })?;
        pixmap.data_mut().copy_from_slice(&surface.pixels());
        Ok(Self {
            pixmap: Rc::new(RefCell::new(pixmap)),
            clip: None,
            saved: Vec::new(),
        })
    }

    /// Another handle on the same pixels with an empty clip stack.
    pub fn share(&self) -> Self {
        Self {
            pixmap: Rc::clone(&self.pixmap),
            clip: None,
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.borrow().height()
    }

    pub fn save(&mut self) {
        self.saved.push(self.clip.clone());
    }

    /// Returns `false` when there was nothing to restore.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(clip) => {
                self.clip = clip;
                true
            }
            None => false,
        }
    }

    pub fn save_count(&self) -> usize {
        self.saved.len()
    }

    /// Intersects the clip with `path`; `None` clips everything away.
    pub fn clip_path(
        &mut self,
        path: Option<&Path>,
        fill_rule: FillRule,
        anti_alias: bool,
        transform: Transform,
    ) -> Result<()> {
        let (width, height) = (self.width(), self.height());
        let Some(path) = path else {
            self.clip =
                Some(Mask::new(width, height).ok_or(GcError::InvalidDimensions { width, height })?);
            return Ok(());
        };
        match &mut self.clip {
            Some(mask) => mask.intersect_path(path, fill_rule, anti_alias, transform),
            None => {
                let mut mask =
                    Mask::new(width, height).ok_or(GcError::InvalidDimensions { width, height })?;
                mask.fill_path(path, fill_rule, anti_alias, transform);
                self.clip = Some(mask);
            }
        }
        Ok(())
    }

    pub fn clip_rect(&mut self, r: Rectangle) -> Result<()> {
        let path = rect_to_path(r);
        self.clip_path(path.as_ref(), FillRule::Winding, false, Transform::identity())
    }

    pub fn fill_path(&mut self, path: &Path, paint: &Paint, fill_rule: FillRule, transform: Transform) {
        self.pixmap
            .borrow_mut()
            .fill_path(path, paint, fill_rule, transform, self.clip.as_ref());
    }

    pub fn stroke_path(&mut self, path: &Path, paint: &Paint, stroke: &Stroke, transform: Transform) {
        self.pixmap
            .borrow_mut()
            .stroke_path(path, paint, stroke, transform, self.clip.as_ref());
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: &Paint, transform: Transform) {
        self.pixmap
            .borrow_mut()
            .fill_rect(rect, paint, transform, self.clip.as_ref());
    }

    /// Copies the canvas pixels into the surface store.
    pub fn copy_to(&self, surface: &Surface) {
        surface
            .pixels_mut()
            .copy_from_slice(self.pixmap.borrow().data());
    }
}

pub(crate) fn rect_to_path(r: Rectangle) -> Option<Path> {
    let rect = Rect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)?;
    Some(PathBuilder::from_rect(rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::dpi::Zoom;

    fn red() -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 0, 0, 255);
        paint
    }

    fn canvas(width: u32, height: u32) -> (Surface, RasterCanvas) {
        let surface = Surface::new(width, height, Zoom::IDENTITY).unwrap();
        surface.fill(Color::WHITE);
        let canvas = RasterCanvas::from_surface(&surface).unwrap();
        (surface, canvas)
    }

    #[test]
    fn restore_drops_clip() {
        let (surface, mut canvas) = canvas(4, 4);
        canvas.save();
        canvas.clip_rect(Rectangle::new(0, 0, 2, 4)).unwrap();
        assert!(canvas.restore());
        assert!(!canvas.restore());
        let full = rect_to_path(Rectangle::new(0, 0, 4, 4)).unwrap();
        canvas.fill_path(&full, &red(), FillRule::Winding, Transform::identity());
        canvas.copy_to(&surface);
        assert_eq!(surface.pixel(3, 3).unwrap(), Color::RED);
    }

    #[test]
    fn nested_clips_intersect() {
        let (surface, mut canvas) = canvas(4, 4);
        canvas.clip_rect(Rectangle::new(0, 0, 3, 3)).unwrap();
        canvas.clip_rect(Rectangle::new(1, 1, 3, 3)).unwrap();
        let full = rect_to_path(Rectangle::new(0, 0, 4, 4)).unwrap();
        canvas.fill_path(&full, &red(), FillRule::Winding, Transform::identity());
        canvas.copy_to(&surface);
        assert_eq!(surface.pixel(0, 0).unwrap(), Color::WHITE);
        assert_eq!(surface.pixel(1, 1).unwrap(), Color::RED);
        assert_eq!(surface.pixel(3, 3).unwrap(), Color::WHITE);
    }

    #[test]
    fn shared_canvas_draws_into_same_pixels() {
        let (surface, canvas) = canvas(2, 2);
        let mut child = canvas.share();
        let full = rect_to_path(Rectangle::new(0, 0, 2, 2)).unwrap();
        child.fill_path(&full, &red(), FillRule::Winding, Transform::identity());
        canvas.copy_to(&surface);
        assert_eq!(surface.pixel(1, 1).unwrap(), Color::RED);
    }
}
