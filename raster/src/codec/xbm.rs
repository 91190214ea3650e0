// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! X11 bitmaps, the C source format with `#define NAME_width` and a `char` array of bits.
use super::{allocate, CodecError, Limits};
use crate::color::Rgba;
use crate::image::Image;

fn define(text: &str, suffix: &str) -> Option<u64> {
    text.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        if words.next() != Some("#define") {
            return None;
        }

        let name = words.next()?;
        if name != suffix.trim_start_matches('_') && !name.ends_with(suffix) {
            return None;
        }

        words.next()?.parse().ok()
    })
}

fn hex_byte(token: &str) -> Option<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))?;
    u8::from_str_radix(digits, 16).ok()
}

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    let Ok(text) = core::str::from_utf8(data) else {
        return Err(CodecError::Corrupt("XBM data is not text"));
    };

    let (Some(width), Some(height)) = (define(text, "_width"), define(text, "_height")) else {
        return Err(CodecError::Corrupt("XBM dimensions missing"));
    };

    let (width, height) = limits.check(width, height)?;

    let Some(open) = text.find('{') else {
        return Err(CodecError::Corrupt("XBM bits missing"));
    };

    let declaration = &text[..open];
    if declaration.contains("short") {
        return Err(CodecError::Corrupt("X10 bitmaps are not supported"));
    }

    let body = &text[open + 1..];
    let body = body.find('}').map_or(body, |close| &body[..close]);

    let stride = (width as usize + 7) / 8;
    let needed = stride * height as usize;
    let mut bits = Vec::with_capacity(needed.min(body.len() / 4 + 1));
    for token in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(byte) = hex_byte(token) else {
            return Err(CodecError::Corrupt("XBM bits are not hexadecimal bytes"));
        };

        bits.push(byte);
        if bits.len() == needed {
            break;
        }
    }

    if bits.len() < needed {
        return Err(CodecError::Corrupt("XBM bits end early"));
    }

    let mut image = allocate(width, height, false)?;
    let white = image.color_allocate(Rgba::rgb(255, 255, 255));
    let black = image.color_allocate(Rgba::rgb(0, 0, 0));

    for (y, row) in bits.chunks_exact(stride).enumerate() {
        for x in 0..width as usize {
            let set = row[x / 8] & (1 << (x % 8)) != 0;
            image.set_pixel(x as i32, y as i32, if set { black } else { white });
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARROW: &str = "#define arrow_width 10\n\
        #define arrow_height 2\n\
        static unsigned char arrow_bits[] = {\n   0x01, 0x02, 0xff, 0x03 };\n";

    #[test]
    fn bits_are_lsb_first() -> Result<(), CodecError> {
        let image = decode(ARROW.as_bytes(), &Limits::default())?;
        assert_eq!(image.size(), (10, 2));

        let black = |x, y| image.rgba(image.get_pixel(x, y)) == Rgba::rgb(0, 0, 0);
        assert!(black(0, 0));
        assert!(!black(1, 0));
        assert!(black(9, 0));
        assert!(!black(8, 0));
        assert!((0..10).all(|x| black(x, 1)));
        Ok(())
    }

    #[test]
    fn rejected() {
        let limits = Limits::default();
        let short = ARROW.replace("unsigned char", "short");
        assert!(matches!(decode(short.as_bytes(), &limits), Err(CodecError::Corrupt(_))));

        let missing = ARROW.replace(", 0x03", "");
        assert!(matches!(decode(missing.as_bytes(), &limits), Err(CodecError::Corrupt(_))));

        let nameless = ARROW.replace("arrow_height", "arrow_depth");
        assert!(matches!(decode(nameless.as_bytes(), &limits), Err(CodecError::Corrupt(_))));
    }
}
