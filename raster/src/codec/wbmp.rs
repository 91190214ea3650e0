// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Wireless bitmaps, type 0 only: one bit per pixel, rows padded to whole bytes, `1` is white.
use std::io::Write;

use super::{allocate, CodecError, Cursor, Limits};
use crate::color::{Color, Rgba};
use crate::image::Image;

fn put_multibyte(value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7f) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }

    for idx in (0..len).rev() {
        let more = if idx > 0 { 0x80 } else { 0 };
        out.push(groups[idx] | more);
    }
}

/// Pixels equal to `foreground` are written black, everything else white.
pub(super) fn encode(image: &Image, foreground: Color, out: &mut dyn Write) -> Result<(), CodecError> {
    let (width, height) = image.size();
    let stride = (width as usize + 7) / 8;
    let mut file = Vec::with_capacity(12 + stride * height as usize);
    // Type 0, no extension headers.
    file.extend_from_slice(&[0, 0]);
    put_multibyte(width, &mut file);
    put_multibyte(height, &mut file);

    for y in 0..height as i32 {
        let mut row = vec![0u8; stride];
        for x in 0..width as i32 {
            if image.get_pixel(x, y) != foreground {
                row[x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        file.extend_from_slice(&row);
    }

    out.write_all(&file)?;
    Ok(())
}

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    let mut r = Cursor::new(data);
    if r.multibyte()? != 0 {
        return Err(CodecError::Corrupt("only type 0 wireless bitmaps are supported"));
    }

    // Fixed header, with extension headers flagged by the top bit.
    while r.u8()? & 0x80 != 0 {}

    let width = r.multibyte()?;
    let height = r.multibyte()?;
    let (width, height) = limits.check(width.into(), height.into())?;

    let stride = (width as usize + 7) / 8;
    let bits = r.take(stride * height as usize)?;

    let mut image = allocate(width, height, false)?;
    let white = image.color_allocate(Rgba::rgb(255, 255, 255));
    let black = image.color_allocate(Rgba::rgb(0, 0, 0));

    for (y, row) in bits.chunks_exact(stride).enumerate() {
        for x in 0..width as usize {
            let set = row[x / 8] & (0x80 >> (x % 8)) != 0;
            image.set_pixel(x as i32, y as i32, if set { white } else { black });
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_integers() -> Result<(), CodecError> {
        for value in [0, 1, 127, 128, 300, 16384, u32::MAX] {
            let mut bytes = Vec::new();
            put_multibyte(value, &mut bytes);
            assert_eq!(Cursor::new(&bytes).multibyte()?, value);
        }

        let mut bytes = Vec::new();
        put_multibyte(300, &mut bytes);
        assert_eq!(bytes, [0x82, 0x2c]);
        Ok(())
    }

    #[test]
    fn foreground_is_black() -> Result<(), CodecError> {
        let mut image = allocate(10, 2, false)?;
        let _ = image.color_allocate(Rgba::rgb(255, 255, 255));
        let ink = image.color_allocate(Rgba::rgb(0, 0, 255));
        image.set_pixel(0, 0, ink);
        image.set_pixel(9, 1, ink);

        let mut file = Vec::new();
        encode(&image, ink, &mut file)?;
        assert_eq!(file, [0, 0, 10, 2, 0x7f, 0xc0, 0xff, 0x80]);

        let back = decode(&file, &Limits::default())?;
        assert_eq!(back.rgba(back.get_pixel(0, 0)), Rgba::rgb(0, 0, 0));
        assert_eq!(back.rgba(back.get_pixel(1, 0)), Rgba::rgb(255, 255, 255));
        assert_eq!(back.rgba(back.get_pixel(9, 1)), Rgba::rgb(0, 0, 0));
        assert_eq!(back.colors_total(), 2);
        Ok(())
    }

    #[test]
    fn short_data() {
        let file = [0, 0, 10, 2, 0x7f, 0xc0, 0xff];
        assert!(matches!(decode(&file, &Limits::default()), Err(CodecError::Corrupt(_))));
        assert!(matches!(decode(&[1, 0, 1, 1, 0], &Limits::default()), Err(CodecError::Corrupt(_))));
    }
}
