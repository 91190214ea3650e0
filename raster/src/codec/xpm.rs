// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! X11 pixmaps in the XPM3 format.
//!
//! Only the quoted strings of the C source matter: the values line, one line per color and one
//! line per row of pixels. Images with up to 256 colors are read into a palette, larger ones
//! become true-color.
use std::collections::HashMap;

use super::{allocate, CodecError, Limits};
use crate::color::{Color, Rgba, ALPHA_TRANSPARENT, MAX_COLORS};
use crate::image::Image;

/// Longest color key we accept.
const MAX_CPP: usize = 8;

/// Color names besides the hex notations.
const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 255, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("gray", Rgba::rgb(190, 190, 190)),
    ("grey", Rgba::rgb(190, 190, 190)),
];

/// The double-quoted strings in order of appearance, comments skipped.
fn strings(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;
    loop {
        let quote = rest.find('"');
        let comment = rest.find("/*");
        match (quote, comment) {
            (Some(q), Some(c)) if c < q => {
                let Some(end) = rest[c + 2..].find("*/") else {
                    break;
                };
                rest = &rest[c + 2 + end + 2..];
            }
            (Some(q), _) => {
                let body = &rest[q + 1..];
                let Some(end) = body.find('"') else {
                    break;
                };
                found.push(&body[..end]);
                rest = &body[end + 1..];
            }
            (None, _) => break,
        }
    }

    found
}

/// A color specification, `None` for the transparent color.
fn parse_color(spec: &str) -> Result<Option<Rgba>, CodecError> {
    if spec.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    if let Some(hex) = spec.strip_prefix('#') {
        let digits = hex.len() / 3;
        if !hex.is_ascii() || hex.len() % 3 != 0 || !(1..=4).contains(&digits) {
            return Err(CodecError::Corrupt("bad XPM hex color"));
        }

        let mut rgb = [0u8; 3];
        for (idx, component) in rgb.iter_mut().enumerate() {
            let field = &hex[idx * digits..(idx + 1) * digits];
            let value = u16::from_str_radix(field, 16)
                .map_err(|_| CodecError::Corrupt("bad XPM hex color"))?;
            // Keep the most significant byte, or widen a single digit.
            *component = match digits {
                1 => (value * 17) as u8,
                2 => value as u8,
                _ => (value >> (4 * (digits - 2))) as u8,
            };
        }

        return Ok(Some(Rgba::rgb(rgb[0], rgb[1], rgb[2])));
    }

    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(spec))
        .map(|&(_, rgba)| Some(rgba))
        .ok_or(CodecError::Corrupt("unknown XPM color name"))
}

/// Pick the best visual from a color line, preferring color over grayscale over mono.
fn color_spec(line: &str) -> Option<String> {
    const KEYS: [&str; 5] = ["c", "g", "g4", "m", "s"];
    let mut visuals: Vec<(&str, Vec<&str>)> = Vec::new();
    for word in line.split_whitespace() {
        let is_key = KEYS.contains(&word);
        if let Some((_, value)) = visuals.last_mut() {
            if !is_key || value.is_empty() {
                value.push(word);
                continue;
            }
        }

        if !is_key {
            return None;
        }
        visuals.push((word, Vec::new()));
    }

    ["c", "g", "g4", "m"].iter().find_map(|key| {
        visuals
            .iter()
            .find(|(k, value)| k == key && !value.is_empty())
            .map(|(_, value)| value.join(" "))
    })
}

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    let Ok(text) = core::str::from_utf8(data) else {
        return Err(CodecError::Corrupt("XPM data is not text"));
    };

    let lines = strings(text);
    let Some((values, rest)) = lines.split_first() else {
        return Err(CodecError::Corrupt("XPM values missing"));
    };

    let numbers: Vec<u64> = values
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| CodecError::Corrupt("XPM values are not numbers"))?;

    let &[width, height, ncolors, cpp, ..] = numbers.as_slice() else {
        return Err(CodecError::Corrupt("XPM values incomplete"));
    };

    let (width, height) = limits.check(width, height)?;
    let cpp = cpp as usize;
    if cpp == 0 || cpp > MAX_CPP {
        return Err(CodecError::Corrupt("XPM key length out of range"));
    }

    let ncolors = usize::try_from(ncolors).unwrap_or(usize::MAX);
    if ncolors == 0 || rest.len() < ncolors.saturating_add(height as usize) {
        return Err(CodecError::Corrupt("XPM lines missing"));
    }

    let (color_lines, rows) = rest.split_at(ncolors);
    let mut table = Vec::with_capacity(ncolors);
    for line in color_lines {
        let (Some(key), Some(spec)) = (line.get(..cpp), line.get(cpp..)) else {
            return Err(CodecError::Corrupt("XPM color line too short"));
        };

        let Some(spec) = color_spec(spec) else {
            return Err(CodecError::Corrupt("XPM color line without a color"));
        };

        table.push((key.as_bytes(), parse_color(&spec)?));
    }

    let true_color = ncolors > MAX_COLORS;
    let mut image = allocate(width, height, true_color)?;
    let mut keys: HashMap<&[u8], Color> = HashMap::with_capacity(ncolors);
    for (key, rgba) in table {
        let color = match (true_color, rgba) {
            (true, Some(rgba)) => Color::true_color(rgba),
            (true, None) => Color::true_color(Rgba::new(0, 0, 0, ALPHA_TRANSPARENT)),
            (false, Some(rgba)) => image.color_allocate(rgba),
            (false, None) => {
                let color = image.color_allocate(Rgba::rgb(0, 0, 0));
                image.set_transparent(color);
                color
            }
        };

        keys.insert(key, color);
    }

    image.set_alpha_blending(false);
    for (y, row) in rows[..height as usize].iter().enumerate() {
        let row = row.as_bytes();
        if row.len() < width as usize * cpp {
            return Err(CodecError::Corrupt("XPM row too short"));
        }

        for (x, key) in row.chunks_exact(cpp).take(width as usize).enumerate() {
            let Some(&color) = keys.get(key) else {
                return Err(CodecError::Corrupt("XPM pixel with an undefined color"));
            };

            image.set_pixel(x as i32, y as i32, color);
        }
    }

    image.set_alpha_blending(true_color);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUS: &str = r#"/* XPM */
static char *plus[] = {
/* columns rows colors chars-per-pixel */
"3 3 3 1",
"  c None",
". c #FF0000",
"x c blue m black",
/* pixels */
" . ",
".x.",
" . "
};
"#;

    #[test]
    fn palette_pixmap() -> Result<(), CodecError> {
        let image = decode(PLUS.as_bytes(), &Limits::default())?;
        assert!(!image.is_true_color());
        assert_eq!(image.colors_total(), 3);
        assert_eq!(image.transparent(), Color(0));
        assert_eq!(image.get_pixel(0, 0), Color(0));
        assert_eq!(image.rgba(image.get_pixel(1, 0)), Rgba::rgb(255, 0, 0));
        assert_eq!(image.rgba(image.get_pixel(1, 1)), Rgba::rgb(0, 0, 255));
        Ok(())
    }

    #[test]
    fn hex_widths() -> Result<(), CodecError> {
        assert_eq!(parse_color("#f0a")?, Some(Rgba::rgb(255, 0, 170)));
        assert_eq!(parse_color("#123456")?, Some(Rgba::rgb(0x12, 0x34, 0x56)));
        assert_eq!(parse_color("#ffff00008000")?, Some(Rgba::rgb(255, 0, 128)));
        assert_eq!(parse_color("NONE")?, None);
        assert!(parse_color("#12345").is_err());
        Ok(())
    }

    #[test]
    fn visual_preference() {
        assert_eq!(color_spec(" m white c light blue").as_deref(), Some("light blue"));
        assert_eq!(color_spec(" g4 black m white").as_deref(), Some("black"));
        assert_eq!(color_spec(" s background").as_deref(), None);
    }

    #[test]
    fn malformed() {
        let limits = Limits::default();
        let undefined = PLUS.replace(".x.", ".y.");
        assert!(matches!(decode(undefined.as_bytes(), &limits), Err(CodecError::Corrupt(_))));

        let short = PLUS.replace("\" . \"\n};", "};");
        assert!(matches!(decode(short.as_bytes(), &limits), Err(CodecError::Corrupt(_))));

        assert!(matches!(parse_color("#aé"), Err(CodecError::Corrupt(_))));
        let accented = PLUS.replace("#FF0000", "#\u{e9}0");
        assert!(matches!(decode(accented.as_bytes(), &limits), Err(CodecError::Corrupt(_))));
    }
}
