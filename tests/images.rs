mod common;

use common::{assert_pixel, backends, close, factory, init};
use dualgc::*;
use rstest::rstest;

fn checker(alpha: u8) -> ImageData {
    let colors = [
        Color::rgba(200, 40, 10, alpha),
        Color::rgba(10, 180, 220, alpha),
        Color::rgba(255, 255, 0, alpha),
        Color::rgba(0, 0, 0, alpha),
    ];
    let mut rgba = Vec::new();
    for y in 0..4 {
        for x in 0..4 {
            let c = colors[(x + y) % colors.len()];
            rgba.extend_from_slice(&[c.red, c.green, c.blue, c.alpha]);
        }
    }
    ImageData::from_rgba(4, 4, &rgba).expect("valid rgba")
}

#[rstest]
#[case(255)]
#[case(150)]
#[case(50)]
#[case(0)]
fn image_round_trips_through_surface(#[case] alpha: u8) {
    init();
    let image = checker(alpha);
    for backend in backends() {
        let surface = Surface::new(4, 4, Zoom::IDENTITY).unwrap();
        let mut gc = factory(backend).create(&surface).unwrap();
        gc.draw_image(&image, 0, 0).unwrap();
        gc.dispose().unwrap();

        let back = surface.to_image_data().unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let expected = image.color_at(x, y).unwrap();
                let actual = back.color_at(x, y).unwrap();
                if alpha == 0 {
                    assert_eq!(actual.alpha, 0, "{backend:?} pixel ({x}, {y})");
                } else {
                    assert!(
                        close(actual, expected),
                        "{backend:?} pixel ({x}, {y}): {actual:?} vs {expected:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn png_export_decodes_to_same_pixels() {
    init();
    let image = checker(255);
    let surface = Surface::from_image(&image, Zoom::IDENTITY).unwrap();
    let decoded = ImageData::from_png(&surface.to_png().unwrap()).unwrap();
    assert_eq!((decoded.width, decoded.height), (4, 4));
    assert_eq!(decoded.to_rgba().unwrap(), image.to_rgba().unwrap());
}

#[test]
fn scaled_image_fills_destination() {
    init();
    let red = ImageData::from_rgba(1, 1, &[255, 0, 0, 255]).unwrap();
    for backend in backends() {
        let surface = Surface::new(8, 8, Zoom::IDENTITY).unwrap();
        surface.fill(Color::WHITE);
        let mut gc = factory(backend).create(&surface).unwrap();
        gc.draw_image_scaled(&red, Rectangle::new(0, 0, 1, 1), Rectangle::new(2, 2, 4, 4))
            .unwrap();
        gc.dispose().unwrap();
        assert_pixel(&surface, 3, 3, Color::RED);
        assert_pixel(&surface, 1, 1, Color::WHITE);
        assert_pixel(&surface, 6, 6, Color::WHITE);
    }
}

#[test]
fn image_scales_with_surface_zoom() {
    init();
    let red = ImageData::from_rgba(2, 2, &[255, 0, 0, 255].repeat(4)).unwrap();
    for backend in backends() {
        let surface = Surface::new(8, 8, Zoom(200)).unwrap();
        surface.fill(Color::WHITE);
        let mut gc = factory(backend).create(&surface).unwrap();
        gc.draw_image(&red, 1, 1).unwrap();
        gc.dispose().unwrap();
        assert_pixel(&surface, 2, 2, Color::RED);
        assert_pixel(&surface, 5, 5, Color::RED);
        assert_pixel(&surface, 6, 6, Color::WHITE);
        assert_pixel(&surface, 1, 1, Color::WHITE);
    }
}
