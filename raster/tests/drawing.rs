use gd_raster::{ArcStyle, Color, Font, Image, Paint, Painter, Patterns, Rgba, SizeError};

fn canvas(width: u32, height: u32) -> Result<(Image, Color, Color), SizeError> {
    let mut image = Image::palette(width, height)?;
    let white = image.color_allocate(Rgba::rgb(255, 255, 255));
    let black = image.color_allocate(Rgba::rgb(0, 0, 0));
    Ok((image, white, black))
}

fn count(image: &Image, color: Color) -> usize {
    let (w, h) = image.size();
    (0..h as i32)
        .flat_map(|y| (0..w as i32).map(move |x| (x, y)))
        .filter(|&(x, y)| image.get_pixel(x, y) == color)
        .count()
}

#[test_log::test]
fn rectangle_outline() -> Result<(), SizeError> {
    let (mut image, _, black) = canvas(20, 20)?;
    Painter::new(&mut image).rectangle((2, 3), (7, 9), black.into());

    // Two rows of six and two columns of five remaining pixels.
    assert_eq!(count(&image, black), 2 * 6 + 2 * 5);
    assert_eq!(image.get_pixel(2, 3), black);
    assert_eq!(image.get_pixel(7, 9), black);
    assert_ne!(image.get_pixel(4, 5), black);
    Ok(())
}

#[test_log::test]
fn filled_polygon_triangle() -> Result<(), SizeError> {
    let (mut image, _, black) = canvas(20, 20)?;
    Painter::new(&mut image).filled_polygon(&[(0, 0), (10, 0), (0, 10)], black.into());

    assert_eq!(image.get_pixel(1, 1), black);
    assert_eq!(image.get_pixel(0, 10), black);
    assert_ne!(image.get_pixel(9, 9), black);
    assert_ne!(image.get_pixel(15, 2), black);
    Ok(())
}

#[test_log::test]
fn shapes_past_the_edges() -> Result<(), SizeError> {
    let (mut image, _, black) = canvas(10, 10)?;
    let mut painter = Painter::new(&mut image);
    painter.line((-100, 5), (100, 5), black.into());
    painter.filled_rectangle((-5, -5), (1, 1), black.into());
    painter.filled_polygon(&[(-50, -50), (50, -50), (50, 50)], black.into());

    assert_eq!(image.get_pixel(0, 5), black);
    assert_eq!(image.get_pixel(9, 5), black);
    assert_eq!(image.get_pixel(1, 1), black);
    Ok(())
}

#[test_log::test]
fn full_pie_covers_the_ellipse() -> Result<(), SizeError> {
    let (mut image, _, black) = canvas(41, 41)?;
    Painter::new(&mut image).filled_arc((20, 20), (30, 20), 0, 360, black.into(), ArcStyle::PIE);

    assert_eq!(image.get_pixel(20, 20), black);
    assert_eq!(image.get_pixel(34, 20), black);
    assert_eq!(image.get_pixel(6, 20), black);
    assert_ne!(image.get_pixel(20, 5), black);
    assert_ne!(image.get_pixel(20, 35), black);
    Ok(())
}

#[test_log::test]
fn styled_line_alternates() -> Result<(), SizeError> {
    let (mut image, white, black) = canvas(8, 1)?;
    image.set_style(vec![Some(black), None]);
    Painter::new(&mut image).line((0, 0), (7, 0), Paint::Styled);

    for x in 0..8 {
        let expected = if x % 2 == 0 { black } else { white };
        assert_eq!(image.get_pixel(x, 0), expected, "pixel {}", x);
    }
    Ok(())
}

#[test_log::test]
fn tiled_fill() -> Result<(), SizeError> {
    let mut tile = Image::true_color(2, 2)?;
    tile.set_pixel(0, 0, Color::true_color(Rgba::rgb(255, 0, 0)));

    let mut image = Image::true_color(6, 6)?;
    let patterns = Patterns {
        brush: None,
        tile: Some(&tile),
    };
    Painter::with_patterns(&mut image, patterns).filled_rectangle((0, 0), (5, 5), Paint::Tiled);

    let red = Color::true_color(Rgba::rgb(255, 0, 0));
    assert_eq!(image.get_pixel(0, 0), red);
    assert_eq!(image.get_pixel(4, 2), red);
    assert_ne!(image.get_pixel(1, 0), red);
    Ok(())
}

#[test_log::test]
fn brush_maps_into_the_palette() -> Result<(), SizeError> {
    let mut brush = Image::palette(3, 3)?;
    let green = brush.color_allocate(Rgba::rgb(0, 255, 0));
    Painter::new(&mut brush).filled_rectangle((0, 0), (2, 2), green.into());

    let (mut image, _, _) = canvas(10, 10)?;
    let patterns = Patterns {
        brush: Some(&brush),
        tile: None,
    };
    Painter::with_patterns(&mut image, patterns).set_pixel(5, 5, Paint::Brushed);

    let mapped = image.color_exact(Rgba::rgb(0, 255, 0));
    assert!(!mapped.is_none());
    assert_eq!(count(&image, mapped), 9);
    assert_eq!(image.get_pixel(4, 4), mapped);
    assert_eq!(image.get_pixel(6, 6), mapped);
    Ok(())
}

#[test_log::test]
fn flood_fill_stops_at_border() -> Result<(), SizeError> {
    let (mut image, white, black) = canvas(10, 10)?;
    let red = image.color_allocate(Rgba::rgb(255, 0, 0));
    let mut painter = Painter::new(&mut image);
    painter.filled_rectangle((0, 0), (9, 9), white.into());
    painter.rectangle((2, 2), (7, 7), black.into());
    painter.fill_to_border(4, 4, black, red.into());

    assert_eq!(count(&image, red), 16);
    assert_eq!(image.get_pixel(0, 0), white);
    Ok(())
}

#[test_log::test]
fn builtin_text() -> Result<(), SizeError> {
    let (mut image, _, black) = canvas(40, 20)?;
    Painter::new(&mut image).string(Font::Small, (0, 0), "I", black.into());

    assert!(count(&image, black) > 0);
    let (w, h) = Font::Small.string_size("II");
    assert_eq!((w, h), (12, 13));
    Ok(())
}
