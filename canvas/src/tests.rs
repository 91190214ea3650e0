use gd_raster::codec::{CodecError, Encoding, Format};
use gd_raster::{ArcStyle, Color, Rgba};

use crate::{Arg, Canvas, Config, CopyRegion, Error, Request, ResizeRegion};

fn blank(width: u32, height: u32, true_color: bool) -> Result<Canvas, Error> {
    Canvas::create(Request::Blank {
        width,
        height,
        true_color,
    })
}

#[test]
fn blank_size() -> Result<(), Error> {
    for true_color in [false, true] {
        let canvas = blank(64, 32, true_color)?;
        assert_eq!(canvas.size(), (64, 32));
        assert_eq!(canvas.is_true_color(), true_color);
    }

    Ok(())
}

#[test]
fn zero_dimensions() {
    for true_color in [false, true] {
        for (w, h) in [(0, 10), (10, 0), (0, 0)] {
            let err = blank(w, h, true_color).unwrap_err();
            assert!(matches!(err, Error::ZeroDimension), "{:?}", err);
        }
    }
}

#[test]
fn gd_round_trip() -> Result<(), Error> {
    for true_color in [false, true] {
        let canvas = blank(40, 30, true_color)?;
        let back = canvas.color_allocate(200, 200, 180);
        let ink = canvas.color_allocate(10, 20, 90);
        canvas.filled_rectangle((0, 0), (39, 29), back)?;
        canvas.line((0, 0), (39, 29), ink)?;
        canvas.color_transparent(back)?;

        let bytes = canvas.to_bytes(&Encoding::Gd)?;
        let decoded = Canvas::from_bytes(&bytes, Format::Gd)?;
        assert!(canvas.compare(&decoded).is_empty());
    }

    Ok(())
}

#[test]
fn origin_and_scale() -> Result<(), Error> {
    let canvas = blank(32, 32, false)?;
    canvas.color_allocate(0, 0, 0);
    let red = canvas.color_allocate(255, 0, 0);

    canvas.set_origin((10, 20), (1, -1))?;
    canvas.set_pixel((5, 5), red)?;
    assert_eq!(canvas.image().get_pixel(15, 15), red);
    assert_eq!(canvas.get_pixel((5, 5)), red);
    assert_eq!(canvas.transform().origin(), (10, 20, 1, -1));

    let err = canvas.set_origin((0, 0), (0, 1)).unwrap_err();
    assert!(matches!(err, Error::ZeroScale));
    assert_eq!(canvas.transform().origin(), (10, 20, 1, -1));
    Ok(())
}

#[test]
fn identity_origin_draws_the_same() -> Result<(), Error> {
    let plain = blank(40, 40, false)?;
    let identity = blank(40, 40, false)?;
    for canvas in [&plain, &identity] {
        canvas.color_allocate(255, 255, 255);
        canvas.color_allocate(0, 0, 0);
    }
    identity.set_origin((0, 0), (1, 1))?;

    let black = Color(1);
    let points = [(3, 30), (20, 35), (36, 22), (12, 18)];
    for canvas in [&plain, &identity] {
        canvas.line((1, 1), (38, 12), black)?;
        canvas.polygon(&points, black, None)?;
        canvas.filled_polygon(&[(5, 5), (15, 5), (10, 14)], black)?;
        canvas.arc((20, 20), (24, 16), 30, 300, black)?;
    }

    assert_eq!(plain.get_pixel((1, 1)), black);
    assert!(plain.compare(&identity).is_empty());
    Ok(())
}

#[test]
fn rectangle_corners_reordered() -> Result<(), Error> {
    let forward = blank(20, 20, false)?;
    let reverse = blank(20, 20, false)?;
    for canvas in [&forward, &reverse] {
        canvas.color_allocate(255, 255, 255);
        canvas.color_allocate(0, 0, 0);
    }

    let black = Color(1);
    forward.rectangle((2, 3), (7, 9), black, Some(black.into()))?;
    reverse.rectangle((7, 9), (2, 3), black, Some(black.into()))?;

    assert_eq!(reverse.get_pixel((4, 5)), black);
    assert!(forward.compare(&reverse).is_empty());
    Ok(())
}

#[test]
fn arc_angles_swapped() -> Result<(), Error> {
    let forward = blank(40, 40, false)?;
    let reverse = blank(40, 40, false)?;
    for canvas in [&forward, &reverse] {
        canvas.color_allocate(255, 255, 255);
        canvas.color_allocate(0, 0, 0);
    }

    let black = Color(1);
    forward.filled_arc((20, 20), (30, 30), 0, 90, black, ArcStyle::PIE)?;
    reverse.filled_arc((20, 20), (30, 30), 90, 0, black, ArcStyle::PIE)?;
    assert!(forward.compare(&reverse).is_empty());

    forward.arc((20, 20), (16, 16), 180, 270, black)?;
    reverse.arc((20, 20), (16, 16), 270, 180, black)?;
    assert!(forward.compare(&reverse).is_empty());
    Ok(())
}

#[test]
fn brush_outlives_its_handle() -> Result<(), Error> {
    let canvas = blank(20, 20, false)?;
    let brush = blank(3, 3, false)?;
    canvas.set_brush(&brush)?;
    drop(brush);

    let held = canvas.brush().expect("brush was set");
    assert_eq!(held.size(), (3, 3));

    // Replacing the brush with itself keeps it alive.
    canvas.set_brush(&held)?;
    drop(held);
    assert_eq!(canvas.brush().map(|brush| brush.size()), Some((3, 3)));
    Ok(())
}

#[test]
fn brush_shared_with_drawing() -> Result<(), Error> {
    let canvas = blank(20, 20, false)?;
    canvas.color_allocate(255, 255, 255);
    canvas.color_allocate(0, 0, 0);

    let brush = blank(3, 3, false)?;
    let red = brush.color_allocate(255, 0, 0);
    canvas.set_brush(&brush)?;

    // The brush remains an independent canvas.
    brush.set_pixel((1, 1), red)?;
    canvas.line((10, 10), (10, 10), crate::color::Paint::Brushed)?;
    assert_eq!(canvas.color_components(canvas.get_pixel((10, 10)))?, Rgba::rgb(255, 0, 0));
    Ok(())
}

#[test]
fn self_reference_rejected() -> Result<(), Error> {
    let a = blank(4, 4, false)?;
    let b = blank(4, 4, false)?;

    assert!(matches!(a.set_brush(&a), Err(Error::SelfReference)));
    a.set_tile(&b)?;
    assert!(matches!(b.set_brush(&a), Err(Error::SelfReference)));
    assert!(b.brush().is_none());
    Ok(())
}

#[test]
fn palette_exhaustion() -> Result<(), Error> {
    let canvas = blank(4, 4, false)?;
    for idx in 0..256 {
        let color = canvas.color_allocate(idx as u8, 0, 0);
        assert_eq!(color, Color(idx));
    }

    assert_eq!(canvas.color_allocate(1, 2, 3), Color::NONE);
    assert_eq!(canvas.colors_total(), 256);
    assert_eq!(canvas.color_resolve(1, 2, 3), canvas.color_closest(1, 2, 3));
    Ok(())
}

#[test]
fn color_queries() -> Result<(), Error> {
    let canvas = blank(4, 4, false)?;
    let teal = canvas.color_allocate_alpha(0, 128, 128, 40);
    assert_eq!(canvas.color_exact_alpha(0, 128, 128, 40), teal);
    assert_eq!(canvas.color_exact(0, 128, 128), Color::NONE);
    assert_eq!(canvas.green(teal)?, 128);
    assert_eq!(canvas.alpha(teal)?, 40);

    let err = canvas.red(Color(256)).unwrap_err();
    assert!(matches!(err, Error::ColorOutOfRange(256)));
    let err = canvas.set_pixel((0, 0), Color(-5)).unwrap_err();
    assert!(matches!(err, Error::ColorOutOfRange(-5)));
    Ok(())
}

#[test]
fn truncated_header() {
    for data in [&[0xff, 0xfe, 0x00][..], &[0x12, 0x34, 0, 1, 0, 1][..]] {
        let err = Canvas::from_bytes(data, Format::Gd).unwrap_err();
        assert!(matches!(err, Error::Codec(CodecError::Corrupt(_))), "{:?}", err);
    }
}

#[test]
fn true_color_downgrade() -> Result<(), Error> {
    let request = Request::Blank {
        width: 8,
        height: 8,
        true_color: true,
    };

    let canvas = Canvas::create_with(request, &Config::palette_only())?;
    assert!(!canvas.is_true_color());
    Ok(())
}

#[test]
fn argument_modes() -> Result<(), Error> {
    assert!(matches!(Request::from_args(&[]), Err(Error::InvalidArguments(_))));
    assert!(matches!(
        Request::from_args(&[Arg::Int(3)]),
        Err(Error::InvalidArguments(_))
    ));
    assert!(matches!(
        Request::from_args(&[Arg::Size(3, 3), Arg::Str("x".into())]),
        Err(Error::InvalidArguments(_))
    ));

    let request = Request::from_args(&[Arg::Size(10, 5), Arg::Int(1)])?;
    assert!(matches!(
        request,
        Request::Blank {
            width: 10,
            height: 5,
            true_color: true
        }
    ));

    let source = blank(6, 4, false)?;
    let request = Request::from_args(&[Arg::Canvas(source.clone()), Arg::Size(0, 8)])?;
    let derived = Canvas::create(request)?;
    assert_eq!(derived.size(), (6, 8));

    let request = Request::from_args(&[Arg::Str("picture.gd".into())])?;
    assert!(matches!(request, Request::Decode { format: None, .. }));
    let request = Request::from_args(&[Arg::Str("picture".into()), Arg::Str("gd2".into())])?;
    assert!(matches!(
        request,
        Request::Decode {
            format: Some(Format::Gd2),
            ..
        }
    ));

    let err = Request::from_args(&[Arg::Str("picture".into()), Arg::Str("tiff".into())]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
    Ok(())
}

#[test]
fn derive_keeps_pixels() -> Result<(), Error> {
    let source = blank(8, 8, true)?;
    let green = source.color_allocate(0, 255, 0);
    source.set_pixel((3, 4), green)?;

    let copy = Canvas::create(Request::Derive {
        source: source.clone(),
        size: None,
        true_color: true,
    })?;
    assert!(source.compare(&copy).is_empty());
    assert!(!copy.ptr_eq(&source));
    Ok(())
}

#[test]
fn copy_defaults() -> Result<(), Error> {
    let src = blank(4, 4, true)?;
    let red = src.color_allocate(255, 0, 0);
    src.filled_rectangle((0, 0), (3, 3), red)?;

    let dst = blank(8, 8, true)?;
    src.copy_to(&dst, CopyRegion::new())?;
    assert_eq!(dst.get_pixel((3, 3)), red);
    assert_eq!(dst.get_pixel((4, 4)), Color(0));

    src.copy_to(&dst, CopyRegion::new().dest(6, 6).size(1, 1))?;
    assert_eq!(dst.get_pixel((6, 6)), red);
    assert_eq!(dst.get_pixel((7, 7)), Color(0));

    let resized = blank(8, 8, true)?;
    src.copy_resized_to(&resized, ResizeRegion::new())?;
    assert_eq!(resized.get_pixel((7, 7)), red);
    Ok(())
}

#[test]
fn copy_region_errors() -> Result<(), Error> {
    let src = blank(4, 4, true)?;
    let dst = blank(8, 8, true)?;

    let err = src.copy_to(&dst, CopyRegion::new().source(2, 2)).unwrap_err();
    assert!(matches!(err, Error::InvalidRegion));
    let err = src.copy_to(&dst, CopyRegion::new().size(-1, 2)).unwrap_err();
    assert!(matches!(err, Error::InvalidRegion));
    let err = src.copy_to(&dst, CopyRegion::new().dest(8, 0)).unwrap_err();
    assert!(matches!(err, Error::DestinationTooSmall(8, 0)));
    let err = src
        .copy_resized_to(&dst, ResizeRegion::new().source_size(0, 2))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRegion));
    let err = src.copy_merge_to(&dst, CopyRegion::new(), 101).unwrap_err();
    assert!(matches!(err, Error::InvalidArguments(_)));
    assert!(matches!(src.copy_palette_to(&dst), Err(Error::NotPalette)));
    Ok(())
}

#[test]
fn copy_onto_itself() -> Result<(), Error> {
    let canvas = blank(8, 8, true)?;
    let blue = canvas.color_allocate(0, 0, 255);
    canvas.filled_rectangle((0, 0), (1, 1), blue)?;

    canvas.copy_to(&canvas, CopyRegion::new().dest(4, 4).size(2, 2))?;
    assert_eq!(canvas.get_pixel((5, 5)), blue);
    assert_eq!(canvas.get_pixel((3, 3)), Color(0));
    Ok(())
}

#[test]
fn style_entries() -> Result<(), Error> {
    let canvas = blank(8, 1, false)?;
    let white = canvas.color_allocate(255, 255, 255);
    let black = canvas.color_allocate(0, 0, 0);

    assert!(matches!(canvas.set_style(Vec::new()), Err(Error::EmptyStyle)));
    assert!(matches!(
        canvas.set_style(vec![Some(Color(300))]),
        Err(Error::ColorOutOfRange(300))
    ));

    canvas.set_style(vec![Some(black), None])?;
    canvas.line((0, 0), (7, 0), crate::color::Paint::Styled)?;
    assert_eq!(canvas.get_pixel((0, 0)), black);
    assert_eq!(canvas.get_pixel((1, 0)), white);
    Ok(())
}
