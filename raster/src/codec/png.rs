// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! PNG through the `image` crate.
use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};

use super::{decode_as, encode_error, rgba8_samples, CodecError, Limits};
use crate::image::Image;

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    decode_as(data, ImageFormat::Png, limits)
}

/// Always written as 8-bit RGBA.
pub(super) fn encode(image: &Image, out: &mut dyn Write) -> Result<(), CodecError> {
    if image.is_interlaced() {
        log::debug!("PNG images are written without interlacing");
    }

    let samples = rgba8_samples(image);
    PngEncoder::new(out)
        .write_image(&samples, image.width(), image.height(), ColorType::Rgba8)
        .map_err(encode_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, Rgba};

    #[test]
    fn round_trip_keeps_alpha() -> Result<(), CodecError> {
        let mut image = Image::true_color(4, 3).map_err(|_| CodecError::Corrupt("size"))?;
        image.set_alpha_blending(false);
        image.set_pixel(1, 1, Color::true_color(Rgba::new(10, 20, 30, 127)));
        image.set_pixel(2, 2, Color::true_color(Rgba::rgb(200, 100, 50)));

        let mut file = Vec::new();
        encode(&image, &mut file)?;
        assert_eq!(&file[1..4], b"PNG");

        let back = decode(&file, &Limits::default())?;
        assert_eq!(back.size(), (4, 3));
        assert_eq!(back.get_pixel(1, 1), Color::true_color(Rgba::new(10, 20, 30, 127)));
        assert_eq!(back.get_pixel(2, 2), Color::true_color(Rgba::rgb(200, 100, 50)));
        Ok(())
    }

    #[test]
    fn garbage() {
        assert!(matches!(
            decode(b"\x89PNG\r\n\x1a\nnope", &Limits::default()),
            Err(CodecError::Corrupt(_))
        ));
    }
}
