mod common;

use common::{assert_pixel, assert_same_pixels, backends, factory, init, render};
use dualgc::*;
use rstest::rstest;

#[test]
fn fill_rectangle_matches_across_backends() {
    init();
    let outputs: Vec<Surface> = backends()
        .into_iter()
        .map(|backend| {
            render(backend, 10, 10, Zoom::IDENTITY, |gc| {
                gc.set_background(Color::RED)?;
                gc.fill_rectangle(0, 0, 5, 5)
            })
        })
        .collect();
    for surface in &outputs {
        assert_pixel(surface, 0, 0, Color::RED);
        assert_pixel(surface, 4, 4, Color::RED);
        assert_pixel(surface, 5, 5, Color::WHITE);
        assert_pixel(surface, 5, 0, Color::WHITE);
    }
    for pair in outputs.windows(2) {
        assert_same_pixels(&pair[0], &pair[1]);
    }
}

#[rstest]
#[case(Zoom(100))]
#[case(Zoom(150))]
#[case(Zoom(200))]
fn fill_rectangle_scales_with_zoom(#[case] zoom: Zoom) {
    init();
    for backend in backends() {
        let surface = render(backend, 20, 20, zoom, |gc| {
            gc.set_background(Color::BLUE)?;
            gc.fill_rectangle(2, 2, 4, 4)
        });
        let lo = dpi::to_pixels(2, zoom) as u32;
        let hi = dpi::to_pixels(6, zoom) as u32;
        assert_pixel(&surface, lo, lo, Color::BLUE);
        assert_pixel(&surface, hi - 1, hi - 1, Color::BLUE);
        assert_pixel(&surface, hi, hi, Color::WHITE);
    }
}

#[test]
fn clearing_clip_restores_unclipped_output() {
    init();
    for backend in backends() {
        let draw = |gc: &mut Gc| -> Result<()> {
            gc.set_background(Color::GREEN)?;
            gc.fill_rectangle(0, 0, 8, 8)?;
            gc.set_foreground(Color::BLACK)?;
            gc.draw_line(0, 0, 7, 7)
        };
        let plain = render(backend, 8, 8, Zoom::IDENTITY, draw);
        let clipped = render(backend, 8, 8, Zoom::IDENTITY, |gc| {
            gc.set_clipping(Some(&Clip::Rectangle(Rectangle::new(0, 0, 2, 2))))?;
            assert!(gc.is_clipped()?);
            gc.set_clipping(None)?;
            assert!(!gc.is_clipped()?);
            draw(gc)
        });
        assert_same_pixels(&plain, &clipped);
    }
}

#[test]
fn clip_limits_drawing() {
    init();
    for backend in backends() {
        let surface = render(backend, 8, 8, Zoom::IDENTITY, |gc| {
            let mut region = Region::new();
            region.add(Rectangle::new(0, 0, 2, 2));
            region.add(Rectangle::new(6, 6, 2, 2));
            gc.set_clipping(Some(&Clip::Region(region)))?;
            assert_eq!(gc.clipping()?, Rectangle::new(0, 0, 8, 8));
            gc.set_background(Color::RED)?;
            gc.fill_rectangle(0, 0, 8, 8)
        });
        assert_pixel(&surface, 1, 1, Color::RED);
        assert_pixel(&surface, 7, 7, Color::RED);
        assert_pixel(&surface, 4, 4, Color::WHITE);
    }
}

#[rstest]
#[case(Zoom(100))]
#[case(Zoom(200))]
fn path_clip_limits_drawing(#[case] zoom: Zoom) {
    init();
    for backend in backends() {
        let surface = render(backend, 16, 16, zoom, |gc| {
            let mut triangle = Path::new();
            triangle.move_to(0.0, 0.0);
            triangle.line_to(8.0, 0.0);
            triangle.line_to(0.0, 8.0);
            triangle.close();
            gc.set_clipping(Some(&Clip::Path(triangle)))?;
            assert!(gc.is_clipped()?);
            assert!(gc.advanced()?);
            assert_eq!(gc.clipping()?, Rectangle::new(0, 0, 8, 8));
            gc.set_background(Color::RED)?;
            gc.fill_rectangle(0, 0, 8, 8)
        });
        let px = |v: i32| dpi::to_pixels(v, zoom) as u32;
        assert_pixel(&surface, px(1), px(1), Color::RED);
        assert_pixel(&surface, px(5), px(1), Color::RED);
        assert_pixel(&surface, px(6), px(6), Color::WHITE);
        assert_pixel(&surface, px(7), px(2), Color::WHITE);
    }
}

#[test]
fn clipping_defaults_to_context_bounds() {
    init();
    for backend in backends() {
        let surface = Surface::new(30, 15, Zoom(150)).unwrap();
        let gc = factory(backend).create(&surface).unwrap();
        assert_eq!(gc.clipping().unwrap(), Rectangle::new(0, 0, 20, 10));
        let child = gc.child(Rectangle::new(4, 4, 6, 3)).unwrap();
        assert_eq!(child.clipping().unwrap(), Rectangle::new(0, 0, 6, 3));
    }
}

#[test]
fn identity_transform_equals_no_transform() {
    init();
    let draw = |gc: &mut Gc| -> Result<()> {
        gc.set_line_width(2)?;
        gc.draw_oval(1, 1, 12, 8)?;
        gc.set_background(Color::CYAN)?;
        gc.fill_polygon(&[2, 2, 10, 3, 6, 12])
    };
    for backend in backends() {
        let plain = render(backend, 16, 16, Zoom(150), draw);
        let identity = render(backend, 16, 16, Zoom(150), |gc| {
            gc.set_transform(Some(&Transform::identity()))?;
            draw(gc)
        });
        assert_same_pixels(&plain, &identity);
    }
}

#[test]
fn transform_moves_drawing() {
    init();
    for backend in backends() {
        let surface = render(backend, 10, 10, Zoom::IDENTITY, |gc| {
            let mut t = Transform::identity();
            t.translate(5.0, 0.0);
            gc.set_transform(Some(&t))?;
            assert!(gc.advanced()?);
            gc.set_background(Color::RED)?;
            gc.fill_rectangle(0, 0, 2, 2)
        });
        assert_pixel(&surface, 0, 0, Color::WHITE);
        assert_pixel(&surface, 5, 0, Color::RED);
        assert_pixel(&surface, 6, 1, Color::RED);
    }
}

#[rstest]
#[case(Zoom(100), &[5], &[4, 6])]
#[case(Zoom(200), &[9, 10], &[8, 11])]
fn thin_lines_are_crisp(#[case] zoom: Zoom, #[case] ink: &[u32], #[case] paper: &[u32]) {
    init();
    for backend in backends() {
        let surface = render(backend, 24, 24, zoom, |gc| {
            gc.set_line_width(1)?;
            gc.draw_line(0, 5, 11, 5)
        });
        let x = dpi::to_pixels(4, zoom) as u32;
        for &row in ink {
            assert_pixel(&surface, x, row, Color::BLACK);
        }
        for &row in paper {
            assert_pixel(&surface, x, row, Color::WHITE);
        }
    }
}

#[test]
fn child_offsets_compose() {
    init();
    for backend in backends() {
        let surface = Surface::new(12, 12, Zoom::IDENTITY).unwrap();
        surface.fill(Color::WHITE);
        let mut gc = factory(backend).create(&surface).unwrap();
        let mut child = gc.child(Rectangle::new(2, 3, 6, 6)).unwrap();
        let mut grandchild = child.child(Rectangle::new(1, 1, 3, 3)).unwrap();
        assert_eq!(grandchild.origin(), Point::new(3, 4));
        assert_eq!(grandchild.backend(), backend);

        grandchild.set_background(Color::RED).unwrap();
        grandchild.fill_rectangle(0, 0, 20, 20).unwrap();
        assert_eq!(grandchild.background().unwrap(), Color::RED);
        assert_eq!(child.background().unwrap(), Color::WHITE);

        grandchild.dispose().unwrap();
        child.dispose().unwrap();
        gc.dispose().unwrap();

        assert_pixel(&surface, 3, 4, Color::RED);
        assert_pixel(&surface, 5, 6, Color::RED);
        assert_pixel(&surface, 6, 7, Color::WHITE);
        assert_pixel(&surface, 2, 3, Color::WHITE);
    }
}

#[cfg(feature = "cairo")]
#[test]
fn child_of_other_backend_is_rejected() {
    init();
    let surface = Surface::new(4, 4, Zoom::IDENTITY).unwrap();
    let software = factory(BackendKind::Software).create(&surface).unwrap();
    let native = factory(BackendKind::Native).create(&surface).unwrap();
    let bounds = Rectangle::new(0, 0, 2, 2);
    assert!(matches!(
        NativeGc::child_of(&software, bounds),
        Err(GcError::BackendMismatch {
            expected: BackendKind::Native,
            found: BackendKind::Software,
        })
    ));
    assert!(matches!(
        SoftwareGc::child_of(&native, bounds),
        Err(GcError::BackendMismatch {
            expected: BackendKind::Software,
            found: BackendKind::Native,
        })
    ));
    assert!(NativeGc::child_of(&native, bounds).is_ok());
}

#[test]
fn double_dispose_is_an_error() {
    init();
    for backend in backends() {
        let surface = Surface::new(4, 4, Zoom::IDENTITY).unwrap();
        let mut gc = factory(backend).create(&surface).unwrap();
        gc.dispose().unwrap();
        assert!(gc.is_disposed());
        assert!(matches!(gc.dispose(), Err(GcError::Disposed)));
        assert!(matches!(gc.set_line_width(2), Err(GcError::Disposed)));
        assert!(matches!(gc.child(Rectangle::new(0, 0, 1, 1)), Err(GcError::Disposed)));
    }
}

#[test]
fn setters_are_idempotent() {
    init();
    for backend in backends() {
        let surface = Surface::new(4, 4, Zoom::IDENTITY).unwrap();
        let mut gc = factory(backend).create(&surface).unwrap();
        for _ in 0..2 {
            gc.set_line_width(3).unwrap();
            gc.set_line_cap(LineCap::Round).unwrap();
            gc.set_line_style(LineStyle::Dot).unwrap();
            gc.set_fill_rule(FillRule::Winding).unwrap();
            gc.set_foreground(Color::MAGENTA).unwrap();
        }
        assert_eq!(gc.line_width().unwrap(), 3);
        assert_eq!(gc.line_cap().unwrap(), LineCap::Round);
        assert_eq!(gc.line_style().unwrap(), LineStyle::Dot);
        assert_eq!(gc.fill_rule().unwrap(), FillRule::Winding);
        assert_eq!(gc.foreground().unwrap(), Color::MAGENTA);

        gc.set_line_dash(Some(&[4, 2][..])).unwrap();
        assert_eq!(gc.line_style().unwrap(), LineStyle::Custom);
        gc.set_line_dash(None).unwrap();
        assert_eq!(gc.line_style().unwrap(), LineStyle::Solid);
        assert!(gc.set_line_width(-1).is_err());
    }
}

#[test]
fn advanced_mode_follows_state() {
    init();
    for backend in backends() {
        let surface = Surface::new(4, 4, Zoom::IDENTITY).unwrap();
        let mut gc = factory(backend).create(&surface).unwrap();
        assert!(!gc.advanced().unwrap());
        gc.set_alpha(128).unwrap();
        assert!(gc.advanced().unwrap());
        gc.set_advanced(false).unwrap();
        assert_eq!(gc.alpha().unwrap(), 255);
        assert_eq!(gc.transform().unwrap(), Transform::IDENTITY);
        assert_eq!(gc.antialias().unwrap(), Antialias::Default);
    }
}

#[test]
fn text_extent_grows_with_lines() {
    init();
    for backend in backends() {
        let surface = Surface::new(40, 40, Zoom::IDENTITY).unwrap();
        let mut gc = factory(backend).create(&surface).unwrap();
        let one = gc.text_extent("ab", TextFlags::default()).unwrap();
        let two = gc.text_extent("ab\ncd", TextFlags::default()).unwrap();
        assert!(two.y > one.y);
        assert_eq!(gc.string_extent("").unwrap().x, 0);
        gc.draw_text("a\tb\nc", 1, 1, TextFlags::default()).unwrap();
        gc.draw_string("x", 1, 1, true).unwrap();
        let metrics = gc.font_metrics().unwrap();
        assert!(metrics.height > 0);
    }
}

#[test]
fn software_red_fill_covers_whole_image() {
    init();
    let surface = render(BackendKind::Software, 5, 5, Zoom::IDENTITY, |gc| {
        gc.set_background(Color::rgb(255, 0, 0))?;
        gc.fill_rectangle(0, 0, 5, 5)
    });
    for y in 0..5 {
        for x in 0..5 {
            assert_pixel(&surface, x, y, Color::RED);
        }
    }
}

#[test]
fn width_one_line_on_first_row_is_offset() {
    init();
    for backend in backends() {
        let surface = render(backend, 12, 4, Zoom::IDENTITY, |gc| {
            gc.set_line_width(1)?;
            gc.draw_line(0, 0, 10, 0)
        });
        assert_pixel(&surface, 5, 0, Color::BLACK);
        assert_pixel(&surface, 5, 1, Color::WHITE);
    }
}

#[test]
fn far_coordinates_draw_nothing_without_panicking() {
    init();
    let surface = render(BackendKind::Software, 8, 8, Zoom(150), |gc| {
        gc.set_background(Color::RED)?;
        gc.fill_rectangle(i32::MAX - 1, 0, 10, 10)?;
        gc.draw_line(i32::MAX - 2, 0, i32::MAX, 3)?;
        let child = gc.child(Rectangle::new(i32::MAX - 1, 0, 4, 4))?;
        assert_eq!(child.origin(), Point::new(i32::MAX, 0));
        Ok(())
    });
    for y in 0..8 {
        for x in 0..8 {
            assert_pixel(&surface, x, y, Color::WHITE);
        }
    }
}
