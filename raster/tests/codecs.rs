use gd_raster::codec::{self, CodecError, Encoding, Format, Gd2Compression, Limits};
use gd_raster::{Color, Difference, Image, Painter, Rgba};

fn scene(true_color: bool) -> Image {
    let mut image = if true_color {
        Image::true_color(97, 61)
    } else {
        Image::palette(97, 61)
    }
    .expect("valid size");

    let back = image.color_allocate(Rgba::rgb(250, 250, 240));
    let ink = image.color_allocate(Rgba::rgb(20, 40, 160));
    let mut painter = Painter::new(&mut image);
    painter.filled_rectangle((0, 0), (96, 60), back.into());
    painter.line((0, 60), (96, 0), ink.into());
    painter.filled_ellipse((48, 30), (40, 20), ink.into());
    image.set_transparent(back);
    image
}

fn round_trip(image: &Image, encoding: Encoding) -> Result<Image, CodecError> {
    let mut file = Vec::new();
    codec::encode(image, &encoding, &mut file)?;
    codec::decode(&file, encoding.format(), &Limits::default())
}

#[test_log::test]
fn gd_files_are_lossless() -> Result<(), CodecError> {
    for true_color in [false, true] {
        let image = scene(true_color);
        let back = round_trip(&image, Encoding::Gd)?;
        assert_eq!(image.compare(&back), Difference::empty());

        let gd2 = Encoding::Gd2 {
            chunk_size: Some(64),
            compression: Gd2Compression::Raw,
        };
        let back = round_trip(&image, gd2)?;
        assert_eq!(image.compare(&back), Difference::empty());
    }

    Ok(())
}

#[test_log::test]
#[cfg(feature = "gd2")]
fn compressed_gd2_is_lossless() -> Result<(), CodecError> {
    let image = scene(false);
    let back = round_trip(&image, Encoding::default_for(Format::Gd2).expect("writable"))?;
    assert_eq!(image.compare(&back), Difference::empty());
    Ok(())
}

#[test_log::test]
fn wbmp_keeps_the_foreground() -> Result<(), CodecError> {
    let image = scene(false);
    let ink = image.color_exact(Rgba::rgb(20, 40, 160));
    let back = round_trip(&image, Encoding::Wbmp { foreground: ink })?;

    let black = back.color_exact(Rgba::rgb(0, 0, 0));
    for (x, y) in [(48, 30), (0, 60), (5, 5)] {
        assert_eq!(image.get_pixel(x, y) == ink, back.get_pixel(x, y) == black);
    }
    Ok(())
}

#[test_log::test]
fn limits_checked_before_allocation() -> Result<(), CodecError> {
    let image = scene(true);
    let mut file = Vec::new();
    codec::encode(&image, &Encoding::Gd, &mut file)?;

    let small = Limits {
        max_width: 50,
        ..Limits::default()
    };
    assert!(matches!(
        codec::decode(&file, Format::Gd, &small),
        Err(CodecError::LimitsExceeded { width: 97, height: 61 })
    ));

    // A header promising far more pixels than the file holds.
    let mut header = file[..20].to_vec();
    header[2..6].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]);
    assert!(matches!(
        codec::decode(&header, Format::Gd, &Limits::none()),
        Err(CodecError::Corrupt(_))
    ));
    Ok(())
}

#[test_log::test]
fn xbm_and_xpm_are_read_only() {
    assert!(Encoding::default_for(Format::Xbm).is_none());
    assert!(Encoding::default_for(Format::Xpm).is_none());

    let xbm = b"#define d_width 2\n#define d_height 1\nstatic char d_bits[] = { 0x02 };";
    let image = codec::decode(xbm, Format::Xbm, &Limits::default()).expect("valid bitmap");
    assert_eq!(image.rgba(image.get_pixel(1, 0)), Rgba::rgb(0, 0, 0));
    assert_eq!(image.rgba(image.get_pixel(0, 0)), Rgba::rgb(255, 255, 255));
}

#[test_log::test]
#[cfg(feature = "png")]
fn png_flattens_the_palette() -> Result<(), CodecError> {
    let image = scene(false);
    let back = round_trip(&image, Encoding::Png)?;
    assert!(back.is_true_color());

    let ink = Color::true_color(Rgba::rgb(20, 40, 160));
    assert_eq!(back.get_pixel(48, 30), ink);
    // The transparent palette entry keeps its alpha.
    assert_eq!(Rgba::unpack(back.get_pixel(1, 1)).a, 127);
    Ok(())
}

#[test_log::test]
#[cfg(not(feature = "png"))]
fn png_not_compiled() {
    let image = scene(true);
    let mut file = Vec::new();
    assert!(matches!(
        codec::encode(&image, &Encoding::Png, &mut file),
        Err(CodecError::NotAvailable(Format::Png))
    ));
}
