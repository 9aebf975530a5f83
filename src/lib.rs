//! A backend-polymorphic 2D graphics context.
//!
//! Drawing code talks to the [`GraphicsContext`] contract in logical units;
//! a [`GcFactory`] decides whether a surface is drawn by the native Cairo
//! backend or by the pure-Rust software backend (tiny-skia and cosmic-text).
//!
//! ```no_run
//! use dualgc::{Color, GcConfig, GcFactory, GcPaint, GcShapes, GcLifecycle, Surface, Zoom};
//!
//! # fn main() -> dualgc::Result<()> {
//! let surface = Surface::new(200, 100, Zoom(200))?;
//! let factory = GcFactory::new(GcConfig::software());
//! let mut gc = factory.create(&surface)?;
//! gc.set_background(Color::BLUE)?;
//! gc.fill_rectangle(10, 10, 50, 20)?;
//! gc.dispose()?;
//! let png = surface.to_png()?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backends;
pub mod color;
pub mod config;
pub mod dpi;
pub mod error;
pub mod factory;
pub mod font;
pub mod geometry;
pub mod image;
pub mod path;
mod state;
pub mod surface;
pub mod text;
pub mod transform;

pub use api::*;
#[cfg(feature = "cairo")]
pub use backends::native::NativeGc;
pub use backends::software::{SoftwareGc, TextEngine};
pub use color::{Color, Rgb};
pub use config::{FontConfig, GcConfig};
pub use dpi::Zoom;
pub use error::{GcError, Result};
pub use factory::{Gc, GcFactory};
pub use font::{Font, FontData, FontMetrics, FontStyle};
pub use geometry::{Point, Rectangle, Region};
pub use image::{ImageData, PaletteData, PixelLayout};
pub use path::{Path, PathSegment, PathSink};
pub use surface::Surface;
pub use transform::Transform;
