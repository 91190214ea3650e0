// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! JPEG through the `image` crate.
use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat};

use super::{decode_as, encode_error, CodecError, Limits};
use crate::color::Rgba;
use crate::image::Image;

const DEFAULT_QUALITY: u8 = 75;

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    decode_as(data, ImageFormat::Jpeg, limits)
}

/// Written as 8-bit RGB, alpha is dropped. Quality is clamped to `1..=100`.
pub(super) fn encode(image: &Image, quality: Option<u8>, out: &mut dyn Write) -> Result<(), CodecError> {
    let quality = quality.unwrap_or(DEFAULT_QUALITY).clamp(1, 100);
    let (width, height) = image.size();

    let mut samples = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let rgba = Rgba::unpack(image.get_true_color_pixel(x, y));
            samples.extend_from_slice(&[rgba.r, rgba.g, rgba.b]);
        }
    }

    JpegEncoder::new_with_quality(out, quality)
        .encode(&samples, width, height, ColorType::Rgb8)
        .map_err(encode_error)
}
