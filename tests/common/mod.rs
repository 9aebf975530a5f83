#![allow(dead_code)]

use std::path::PathBuf;

use dualgc::{
    BackendKind, Color, FontConfig, Gc, GcConfig, GcFactory, GcLifecycle, Result, Surface, Zoom,
};

pub const TOLERANCE: u8 = 2;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Backends compiled into this build.
pub fn backends() -> Vec<BackendKind> {
    let mut kinds = vec![BackendKind::Software];
    if cfg!(feature = "cairo") {
        kinds.push(BackendKind::Native);
    }
    kinds
}

pub fn factory(backend: BackendKind) -> GcFactory {
    GcFactory::new(GcConfig {
        backend,
        fonts: FontConfig {
            load_system_fonts: false,
            ..FontConfig::default()
        },
        ..GcConfig::default()
    })
}

/// A public-domain face bundled with the tests.
pub const TEST_FAMILY: &str = "Tuffy";

pub fn test_font_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/Tuffy.ttf")
}

/// A factory whose software text engine knows only the bundled face.
pub fn font_factory(backend: BackendKind, device_zoom: f32) -> GcFactory {
    GcFactory::new(GcConfig {
        backend,
        device_zoom,
        fonts: FontConfig {
            load_system_fonts: false,
            font_files: vec![test_font_file()],
            ..FontConfig::default()
        },
    })
}

/// Rows holding at least one pixel that is not white.
pub fn ink_rows(surface: &Surface) -> Vec<u32> {
    (0..surface.height())
        .filter(|&y| {
            (0..surface.width()).any(|x| {
                let px = surface.pixel(x, y).expect("pixel in bounds");
                !close(px, Color::WHITE)
            })
        })
        .collect()
}

/// Runs `draw` on a white surface and returns the surface once the context
/// has been disposed.
pub fn render<F>(backend: BackendKind, width: u32, height: u32, zoom: Zoom, draw: F) -> Surface
where
    F: FnOnce(&mut Gc) -> Result<()>,
{
    let surface = Surface::new(width, height, zoom).expect("create surface");
    surface.fill(Color::WHITE);
    let mut gc = factory(backend).create(&surface).expect("create gc");
    draw(&mut gc).expect("draw operations");
    gc.dispose().expect("dispose");
    surface
}

pub fn close(a: Color, b: Color) -> bool {
    a.red.abs_diff(b.red) <= TOLERANCE
        && a.green.abs_diff(b.green) <= TOLERANCE
        && a.blue.abs_diff(b.blue) <= TOLERANCE
        && a.alpha.abs_diff(b.alpha) <= TOLERANCE
}

pub fn assert_pixel(surface: &Surface, x: u32, y: u32, expected: Color) {
    let actual = surface.pixel(x, y).expect("pixel in bounds");
    assert!(
        close(actual, expected),
        "pixel ({x}, {y}) is {actual:?}, expected {expected:?}"
    );
}

pub fn assert_same_pixels(a: &Surface, b: &Surface) {
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    for y in 0..a.height() {
        for x in 0..a.width() {
            let (pa, pb) = (a.pixel(x, y).unwrap(), b.pixel(x, y).unwrap());
            assert!(close(pa, pb), "pixel ({x}, {y}) differs: {pa:?} vs {pb:?}");
        }
    }
}
