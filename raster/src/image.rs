// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The pixel buffer and its per-image drawing state.
use core::fmt;

use crate::color::{alpha_blend, Color, Palette, Rgba, ALPHA_TRANSPARENT};

/// An error when allocating an image of a particular size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SizeError {
    /// One of the dimensions is zero.
    #[error("dimensions cannot be 0")]
    Zero,
    /// The buffer would not fit into addressable memory, or coordinates into an `i32`.
    #[error("an image of {width}x{height} pixels is too large")]
    TooLarge { width: u32, height: u32 },
}

/// A raster image, either indexed with a palette of up to 256 colors or in true-color.
///
/// Besides the pixels the image carries the state that drawing operations consult: the
/// transparent color, line thickness, alpha blending mode and the dash style used by
/// [`Paint::Styled`](crate::Paint::Styled).
#[derive(Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pub(crate) pixels: Pixels,
    pub(crate) palette: Palette,
    transparent: Color,
    interlace: bool,
    thickness: u32,
    alpha_blending: bool,
    style: Vec<Option<Color>>,
    style_pos: usize,
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) enum Pixels {
    Palette(Vec<u8>),
    TrueColor(Vec<u32>),
}

impl Image {
    /// Allocate a palette image. All pixels refer to index `0`, the palette is empty.
    pub fn palette(width: u32, height: u32) -> Result<Self, SizeError> {
        let len = Self::checked_len(width, height, 1)?;
        Ok(Self::with_pixels(width, height, Pixels::Palette(vec![0; len])))
    }

    /// Allocate a true-color image. All pixels are opaque black.
    pub fn true_color(width: u32, height: u32) -> Result<Self, SizeError> {
        let len = Self::checked_len(width, height, 4)?;
        Ok(Self::with_pixels(width, height, Pixels::TrueColor(vec![0; len])))
    }

    fn checked_len(width: u32, height: u32, bytes: usize) -> Result<usize, SizeError> {
        if width == 0 || height == 0 {
            return Err(SizeError::Zero);
        }

        let too_large = SizeError::TooLarge { width, height };
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(too_large);
        }

        let len = usize::try_from(u64::from(width) * u64::from(height)).map_err(|_| too_large)?;
        match len.checked_mul(bytes) {
            Some(total) if total <= isize::MAX as usize => Ok(len),
            _ => Err(too_large),
        }
    }

    fn with_pixels(width: u32, height: u32, pixels: Pixels) -> Self {
        let true_color = matches!(pixels, Pixels::TrueColor(_));
        Image {
            width,
            height,
            pixels,
            palette: Palette::new(),
            transparent: Color::NONE,
            interlace: false,
            thickness: 1,
            alpha_blending: true_color,
            style: Vec::new(),
            style_pos: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The `(width, height)` pair.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_true_color(&self) -> bool {
        matches!(self.pixels, Pixels::TrueColor(_))
    }

    /// Check if the coordinate addresses a pixel of this image.
    pub fn bounds_safe(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some()
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }

    /// The stored color of a pixel, `0` for coordinates outside the image.
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        let Some(idx) = self.offset(x, y) else {
            return Color(0);
        };

        match &self.pixels {
            Pixels::Palette(px) => Color(i32::from(px[idx])),
            Pixels::TrueColor(px) => Color(px[idx] as i32),
        }
    }

    /// The packed true-color value of a pixel, regardless of the color mode.
    ///
    /// In palette images the transparent index reports a fully transparent color.
    pub fn get_true_color_pixel(&self, x: i32, y: i32) -> Color {
        let color = self.get_pixel(x, y);
        if self.is_true_color() {
            return color;
        }

        let mut rgba = self.rgba(color);
        if color == self.transparent {
            rgba.a = ALPHA_TRANSPARENT;
        }

        Color::true_color(rgba)
    }

    /// Write a pixel, ignoring coordinates outside the image.
    ///
    /// True-color pixels are composited when alpha blending is enabled. Palette images ignore
    /// colors that are not a palette index.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(idx) = self.offset(x, y) else {
            return;
        };

        let blending = self.alpha_blending;
        match &mut self.pixels {
            Pixels::Palette(px) => {
                if let Some(index) = color.index() {
                    px[idx] = index as u8;
                }
            }
            Pixels::TrueColor(_) if color.is_none() => {}
            Pixels::TrueColor(px) if blending => {
                px[idx] = alpha_blend(Color(px[idx] as i32), color).0 as u32;
            }
            Pixels::TrueColor(px) => px[idx] = color.0 as u32,
        }
    }

    /// The components of a color of this image.
    ///
    /// For palette images this reads the palette entry, which need not be allocated.
    pub fn rgba(&self, color: Color) -> Rgba {
        if self.is_true_color() {
            Rgba::unpack(color)
        } else {
            color.index().map(|idx| self.palette.get(idx)).unwrap_or_default()
        }
    }

    /// The number of palette slots in use or reusable, `0` for true-color images.
    pub fn colors_total(&self) -> usize {
        if self.is_true_color() {
            0
        } else {
            self.palette.total()
        }
    }

    /// Check if a palette index is unused.
    pub fn is_open(&self, color: Color) -> bool {
        color.index().map_or(true, |idx| self.palette.is_open(idx))
    }

    /// Allocate a new palette entry, or pack the color for true-color images.
    ///
    /// Returns [`Color::NONE`] if all [`MAX_COLORS`](crate::MAX_COLORS) entries are in use.
    pub fn color_allocate(&mut self, rgba: Rgba) -> Color {
        if self.is_true_color() {
            Color::true_color(rgba)
        } else {
            self.palette.allocate(rgba)
        }
    }

    /// The closest palette entry by euclidean distance including alpha.
    pub fn color_closest(&self, rgba: Rgba) -> Color {
        if self.is_true_color() {
            Color::true_color(rgba)
        } else {
            self.palette.closest(rgba)
        }
    }

    /// The closest palette entry in the hue-whiteness-blackness model, ignoring alpha.
    pub fn color_closest_hwb(&self, rgba: Rgba) -> Color {
        if self.is_true_color() {
            Color::true_color(rgba)
        } else {
            self.palette.closest_hwb(rgba)
        }
    }

    /// A palette entry with exactly these components.
    pub fn color_exact(&self, rgba: Rgba) -> Color {
        if self.is_true_color() {
            Color::true_color(rgba)
        } else {
            self.palette.exact(rgba)
        }
    }

    /// The exact color, a newly allocated one, or the closest if the palette is full.
    pub fn color_resolve(&mut self, rgba: Rgba) -> Color {
        if self.is_true_color() {
            Color::true_color(rgba)
        } else {
            self.palette.resolve(rgba)
        }
    }

    /// Mark a palette entry as reusable. Pixels keep their index.
    pub fn color_deallocate(&mut self, color: Color) {
        if let (false, Some(idx)) = (self.is_true_color(), color.index()) {
            self.palette.deallocate(idx);
        }
    }

    /// Declare the transparent color, [`Color::NONE`] for none.
    pub fn set_transparent(&mut self, color: Color) {
        if !self.is_true_color() {
            if let Some(idx) = self.transparent.index() {
                let mut rgba = self.palette.get(idx);
                rgba.a = 0;
                self.palette.set_raw(idx, rgba, self.palette.is_open(idx));
            }

            if let Some(idx) = color.index() {
                let mut rgba = self.palette.get(idx);
                rgba.a = ALPHA_TRANSPARENT;
                self.palette.set_raw(idx, rgba, self.palette.is_open(idx));
            }
        }

        self.transparent = if color.is_none() { Color::NONE } else { color };
    }

    /// Restore the transparent color from a file without touching the palette.
    pub(crate) fn set_transparent_raw(&mut self, color: Color) {
        self.transparent = color;
    }

    pub fn transparent(&self) -> Color {
        self.transparent
    }

    pub fn set_interlace(&mut self, interlace: bool) {
        self.interlace = interlace;
    }

    pub fn is_interlaced(&self) -> bool {
        self.interlace
    }

    /// Set the width of lines, at least one pixel.
    pub fn set_thickness(&mut self, thickness: u32) {
        self.thickness = thickness.max(1);
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// Choose between compositing and replacing when writing true-color pixels.
    pub fn set_alpha_blending(&mut self, blending: bool) {
        self.alpha_blending = blending;
    }

    pub fn alpha_blending(&self) -> bool {
        self.alpha_blending
    }

    /// Install the dash pattern for styled lines, `None` entries leave pixels untouched.
    ///
    /// The running position restarts at the beginning of the pattern.
    pub fn set_style(&mut self, style: Vec<Option<Color>>) {
        self.style = style;
        self.style_pos = 0;
    }

    pub fn style(&self) -> &[Option<Color>] {
        &self.style
    }

    /// Advance the dash pattern, `None` when no pattern is set.
    pub(crate) fn next_style(&mut self) -> Option<Option<Color>> {
        if self.style.is_empty() {
            return None;
        }

        let entry = self.style[self.style_pos % self.style.len()];
        self.style_pos = (self.style_pos + 1) % self.style.len();
        Some(entry)
    }

    /// The pixel bytes, one per pixel for palette images and native-endian packed words otherwise.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.pixels {
            Pixels::Palette(px) => px,
            Pixels::TrueColor(px) => bytemuck::cast_slice(px),
        }
    }

    /// Used palette entries in index order.
    pub fn palette_entries(&self) -> impl Iterator<Item = (Color, Rgba)> + '_ {
        self.palette
            .used()
            .map(|(idx, rgba)| (Color(idx as i32), rgba))
    }

    /// Reinterpret the image as true-color, converting every pixel.
    pub fn to_true_color(&self) -> Image {
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                pixels.push(self.get_true_color_pixel(x, y).0 as u32);
            }
        }

        let mut image = Self::with_pixels(self.width, self.height, Pixels::TrueColor(pixels));
        image.interlace = self.interlace;
        image.thickness = self.thickness;
        image
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("true_color", &self.is_true_color())
            .field("colors_total", &self.colors_total())
            .field("transparent", &self.transparent)
            .finish_non_exhaustive()
    }
}
