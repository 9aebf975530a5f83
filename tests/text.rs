mod common;

use common::{TEST_FAMILY, font_factory, ink_rows, init};
use dualgc::*;
use rstest::rstest;

fn font(height: f32) -> Font {
    Font::new(FontData::new(TEST_FAMILY, height, FontStyle::NORMAL))
}

#[rstest]
#[case(Zoom(100), 20.0)]
#[case(Zoom(200), 10.0)]
fn capital_ink_is_centred_in_line_box(#[case] zoom: Zoom, #[case] height: f32) {
    init();
    let surface = Surface::new(60, 24, zoom).unwrap();
    surface.fill(Color::WHITE);
    let mut gc = font_factory(BackendKind::Software, 1.0)
        .create(&surface)
        .unwrap();
    gc.set_font(&font(height)).unwrap();
    let line = dpi::to_pixels(gc.font_metrics().unwrap().height, zoom) as u32;
    assert_eq!(line, 24);
    gc.draw_string("H", 1, 0, true).unwrap();
    gc.dispose().unwrap();

    let rows = ink_rows(&surface);
    assert!(!rows.is_empty(), "no glyph ink drawn");
    let (top, bottom) = (rows[0], rows[rows.len() - 1]);
    let above = top;
    let below = line - (bottom + 1);
    assert!(above > 0 && below > 0, "ink rows {top}..={bottom}");
    assert!(
        above.abs_diff(below) <= 1,
        "ink rows {top}..={bottom} not centred in {line}px line"
    );
}

#[test]
fn set_font_changes_extent() {
    init();
    let surface = Surface::new(10, 10, Zoom::IDENTITY).unwrap();
    let mut gc = font_factory(BackendKind::Software, 1.0)
        .create(&surface)
        .unwrap();
    gc.set_font(&font(10.0)).unwrap();
    let small = gc.string_extent("Hello").unwrap();
    let small_metrics = gc.font_metrics().unwrap();
    gc.set_font(&font(20.0)).unwrap();
    let large = gc.string_extent("Hello").unwrap();
    let large_metrics = gc.font_metrics().unwrap();

    assert!(small.x > 0);
    assert!(large.x > small.x, "{large:?} vs {small:?}");
    assert!(large.y > small.y, "{large:?} vs {small:?}");
    assert!(large_metrics.ascent > small_metrics.ascent);
    assert_eq!(gc.font().unwrap(), font(20.0));
}

#[test]
fn device_zoom_scales_text() {
    init();
    let surface = Surface::new(10, 10, Zoom::IDENTITY).unwrap();
    let extent = |device_zoom: f32| {
        let mut gc = font_factory(BackendKind::Software, device_zoom)
            .create(&surface)
            .unwrap();
        gc.set_font(&font(10.0)).unwrap();
        gc.string_extent("Hello").unwrap()
    };
    let one = extent(1.0);
    let two = extent(2.0);
    assert!(two.x.abs_diff(one.x * 2) <= 2, "{two:?} vs {one:?}");
    assert!(two.y.abs_diff(one.y * 2) <= 2, "{two:?} vs {one:?}");
}

#[test]
fn opaque_text_paints_background() {
    init();
    let surface = Surface::new(40, 24, Zoom::IDENTITY).unwrap();
    surface.fill(Color::WHITE);
    let mut gc = font_factory(BackendKind::Software, 1.0)
        .create(&surface)
        .unwrap();
    gc.set_font(&font(10.0)).unwrap();
    gc.set_background(Color::YELLOW).unwrap();
    gc.draw_string("H", 0, 0, false).unwrap();
    gc.dispose().unwrap();
    common::assert_pixel(&surface, 0, 0, Color::YELLOW);
    common::assert_pixel(&surface, 39, 23, Color::WHITE);
}
