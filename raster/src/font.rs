// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The built-in bitmap fonts.
mod glyphs;

use core::fmt;
use core::str::FromStr;

use crate::paint::{Paint, Painter};

/// One of the five built-in fixed-width fonts.
///
/// All fonts share one set of glyph shapes for printable ASCII, sampled into cells of different
/// sizes. Other characters occupy a cell but draw nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Font {
    Tiny,
    Small,
    MediumBold,
    Large,
    Giant,
}

/// A font name that is not one of the built-in fonts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown built-in font {0:?}")]
pub struct UnknownFont(pub String);

impl Font {
    pub const ALL: [Font; 5] = [
        Font::Tiny,
        Font::Small,
        Font::MediumBold,
        Font::Large,
        Font::Giant,
    ];

    /// The width of a character cell.
    pub const fn width(self) -> u32 {
        match self {
            Font::Tiny => 5,
            Font::Small => 6,
            Font::MediumBold => 7,
            Font::Large => 8,
            Font::Giant => 9,
        }
    }

    /// The height of a character cell.
    pub const fn height(self) -> u32 {
        match self {
            Font::Tiny => 8,
            Font::Small => 13,
            Font::MediumBold => 13,
            Font::Large => 16,
            Font::Giant => 15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Font::Tiny => "tiny",
            Font::Small => "small",
            Font::MediumBold => "medium-bold",
            Font::Large => "large",
            Font::Giant => "giant",
        }
    }

    /// The pixel size of a string drawn in this font, `(width, height)`.
    pub fn string_size(self, text: &str) -> (u32, u32) {
        let len = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        (len.saturating_mul(self.width()), self.height())
    }

    /// Whether the glyph of `c` covers the pixel at column `x` and row `y` of its cell.
    pub fn covers(self, c: char, x: u32, y: u32) -> bool {
        let (width, height) = (self.width(), self.height());
        if x >= width || y >= height {
            return false;
        }

        let Some(glyph) = (c as u32)
            .checked_sub(glyphs::FIRST)
            .and_then(|idx| glyphs::BASIC.get(idx as usize))
        else {
            return false;
        };

        let row = glyph[(y * 8 / height) as usize];
        let column = x * 8 / width;
        let bit = |col: u32| row >> col & 1 == 1;

        match self {
            Font::MediumBold => bit(column) || (column > 0 && bit(column - 1)),
            _ => bit(column),
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Font {
    type Err = UnknownFont;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Font::ALL
            .into_iter()
            .find(|font| font.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownFont(name.to_owned()))
    }
}

impl Painter<'_> {
    /// Draw a character with its cell's top-left corner at `at`.
    pub fn char(&mut self, font: Font, at: (i32, i32), c: char, paint: Paint) {
        let (x, y) = at;
        for cy in 0..font.height() {
            for cx in 0..font.width() {
                if font.covers(c, cx, cy) {
                    self.set_pixel(x.saturating_add(cx as i32), y.saturating_add(cy as i32), paint);
                }
            }
        }
    }

    /// Draw a character rotated a quarter turn counter-clockwise, `at` is its bottom-left corner.
    pub fn char_up(&mut self, font: Font, at: (i32, i32), c: char, paint: Paint) {
        let (x, y) = at;
        for cx in 0..font.width() {
            for cy in 0..font.height() {
                if font.covers(c, cx, cy) {
                    self.set_pixel(x.saturating_add(cy as i32), y.saturating_sub(cx as i32), paint);
                }
            }
        }
    }

    /// Draw a string left to right.
    pub fn string(&mut self, font: Font, at: (i32, i32), text: &str, paint: Paint) {
        let (mut x, y) = at;
        for c in text.chars() {
            self.char(font, (x, y), c, paint);
            x = x.saturating_add(font.width() as i32);
        }
    }

    /// Draw a string bottom to top.
    pub fn string_up(&mut self, font: Font, at: (i32, i32), text: &str, paint: Paint) {
        let (x, mut y) = at;
        for c in text.chars() {
            self.char_up(font, (x, y), c, paint);
            y = y.saturating_sub(font.width() as i32);
        }
    }
}
