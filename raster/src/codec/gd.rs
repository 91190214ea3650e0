// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The uncompressed GD 2.x format.
//!
//! A signature word (`0xFFFE` for true-color, `0xFFFF` for palette images), width and height as
//! words, the color block, then all pixels row by row. Everything is big-endian.
use std::io::Write;

use super::{allocate, CodecError, Cursor, Limits};
use crate::color::{Color, Rgba, MAX_COLORS};
use crate::image::{Image, Pixels};

const TRUE_COLOR_SIGNATURE: u16 = 0xfffe;
const PALETTE_SIGNATURE: u16 = 0xffff;

/// The color block shared by GD and GD2 files.
pub(super) struct ColorTable {
    total: usize,
    transparent: i32,
    entries: Vec<Rgba>,
}

impl ColorTable {
    pub(super) fn read(r: &mut Cursor<'_>, true_color: bool) -> Result<Self, CodecError> {
        let flag = r.u8()?;
        if (flag != 0) != true_color {
            return Err(CodecError::Corrupt("color mode does not match the signature"));
        }

        if true_color {
            let transparent = r.i32()?;
            return Ok(ColorTable {
                total: 0,
                transparent,
                entries: Vec::new(),
            });
        }

        let total = usize::from(r.u16()?);
        if total > MAX_COLORS {
            return Err(CodecError::Corrupt("too many palette entries"));
        }

        let transparent = r.i32()?;
        let raw = r.take(4 * MAX_COLORS)?;
        let entries = raw
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();

        Ok(ColorTable {
            total,
            transparent,
            entries,
        })
    }

    pub(super) fn write(image: &Image, out: &mut Vec<u8>) {
        let true_color = image.is_true_color();
        out.push(u8::from(true_color));
        if !true_color {
            out.extend_from_slice(&(image.colors_total() as u16).to_be_bytes());
        }

        out.extend_from_slice(&image.transparent().0.to_be_bytes());
        if !true_color {
            for idx in 0..MAX_COLORS {
                let rgba = image.palette.get(idx);
                out.extend_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.a]);
            }
        }
    }

    pub(super) fn apply(&self, image: &mut Image) {
        for (idx, &rgba) in self.entries.iter().enumerate() {
            image.palette.set_raw(idx, rgba, idx >= self.total);
        }

        image.palette.set_total(self.total);
        let transparent = if self.transparent < 0 {
            Color::NONE
        } else {
            Color(self.transparent)
        };
        image.set_transparent_raw(transparent);
    }
}

/// Both dimensions as stored in a header word.
pub(super) fn dimensions(image: &Image) -> Result<(u16, u16), CodecError> {
    match (u16::try_from(image.width()), u16::try_from(image.height())) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(CodecError::Encoder(format!(
            "{}x{} is too large for GD files",
            image.width(),
            image.height()
        ))),
    }
}

/// Append the pixels of a rectangle, row by row.
///
/// The rectangle lies within the image.
pub(super) fn put_pixels(image: &Image, xs: core::ops::Range<u32>, ys: core::ops::Range<u32>, out: &mut Vec<u8>) {
    if image.is_true_color() {
        for y in ys {
            for x in xs.clone() {
                let color = image.get_pixel(x as i32, y as i32);
                out.extend_from_slice(&color.0.to_be_bytes());
            }
        }
        return;
    }

    // Palette rows are stored exactly as in the file.
    let (width, bytes) = (image.width() as usize, image.as_bytes());
    for y in ys {
        let row = y as usize * width;
        out.extend_from_slice(&bytes[row + xs.start as usize..row + xs.end as usize]);
    }
}

/// Store pixels of a rectangle from their file representation.
pub(super) fn get_pixels(
    image: &mut Image,
    xs: core::ops::Range<u32>,
    ys: core::ops::Range<u32>,
    bytes: &[u8],
) {
    let width = image.width() as usize;
    let mut at = 0;
    match &mut image.pixels {
        Pixels::Palette(px) => {
            for y in ys {
                for x in xs.clone() {
                    px[y as usize * width + x as usize] = bytes[at];
                    at += 1;
                }
            }
        }
        Pixels::TrueColor(px) => {
            for y in ys {
                for x in xs.clone() {
                    let word = [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
                    px[y as usize * width + x as usize] = u32::from_be_bytes(word);
                    at += 4;
                }
            }
        }
    }
}

pub(super) fn encode(image: &Image, out: &mut dyn Write) -> Result<(), CodecError> {
    let (width, height) = dimensions(image)?;
    let signature = if image.is_true_color() {
        TRUE_COLOR_SIGNATURE
    } else {
        PALETTE_SIGNATURE
    };

    let bpp = if image.is_true_color() { 4 } else { 1 };
    let mut file = Vec::with_capacity(1040 + usize::from(width) * usize::from(height) * bpp);
    for word in [signature, width, height] {
        file.extend_from_slice(&word.to_be_bytes());
    }

    ColorTable::write(image, &mut file);
    put_pixels(image, 0..image.width(), 0..image.height(), &mut file);
    out.write_all(&file)?;
    Ok(())
}

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    let mut r = Cursor::new(data);
    let true_color = match r.u16()? {
        TRUE_COLOR_SIGNATURE => true,
        PALETTE_SIGNATURE => false,
        _ => return Err(CodecError::Corrupt("not a GD 2.x image")),
    };

    let width = r.u16()?;
    let height = r.u16()?;
    let (width, height) = limits.check(width.into(), height.into())?;
    let colors = ColorTable::read(&mut r, true_color)?;

    let bpp = if true_color { 4 } else { 1 };
    let pixels = r.take(width as usize * height as usize * bpp)?;

    let mut image = allocate(width, height, true_color)?;
    colors.apply(&mut image);
    get_pixels(&mut image, 0..width, 0..height, pixels);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_layout() -> Result<(), CodecError> {
        let mut image = allocate(2, 1, false)?;
        let _ = image.color_allocate(Rgba::rgb(1, 2, 3));
        let red = image.color_allocate(Rgba::rgb(255, 0, 0));
        image.set_pixel(1, 0, red);

        let mut file = Vec::new();
        encode(&image, &mut file)?;
        assert_eq!(&file[..6], &[0xff, 0xff, 0, 2, 0, 1]);
        // Flag, total, transparent.
        assert_eq!(&file[6..13], &[0, 0, 2, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(&file[13..17], &[1, 2, 3, 0]);
        assert_eq!(&file[file.len() - 2..], &[0, 1]);
        assert_eq!(file.len(), 13 + 1024 + 2);

        let back = decode(&file, &Limits::default())?;
        assert_eq!(back, image);
        Ok(())
    }

    #[test]
    fn true_color_round_trip() -> Result<(), CodecError> {
        let mut image = allocate(3, 2, true)?;
        image.set_pixel(2, 1, Color::true_color(Rgba::new(9, 8, 7, 6)));
        image.set_transparent(Color::true_color(Rgba::rgb(9, 9, 9)));

        let mut file = Vec::new();
        encode(&image, &mut file)?;
        assert_eq!(&file[..2], &[0xff, 0xfe]);

        let back = decode(&file, &Limits::default())?;
        assert_eq!(back, image);
        Ok(())
    }

    #[test]
    fn truncated() -> Result<(), CodecError> {
        let image = allocate(4, 4, false)?;
        let mut file = Vec::new();
        encode(&image, &mut file)?;

        for len in [0, 1, 5, 100, file.len() - 1] {
            assert!(
                matches!(decode(&file[..len], &Limits::default()), Err(CodecError::Corrupt(_))),
                "accepted {} bytes",
                len
            );
        }

        file[0] = 0x12;
        assert!(matches!(decode(&file, &Limits::default()), Err(CodecError::Corrupt(_))));
        Ok(())
    }
}
