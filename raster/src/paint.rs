// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Inks and the painter that applies them to an image.
use crate::color::{Color, Rgba};
use crate::image::Image;

/// What a drawing operation writes into each pixel it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Paint {
    /// A single color of the target image.
    Solid(Color),
    /// The next entry of the image's dash style, skipping `None` entries.
    Styled,
    /// A stamp of the brush centered on every pixel.
    Brushed,
    /// The brush, stamped wherever the dash style has a non-zero color.
    StyledBrushed,
    /// The tile pattern, repeated from the image origin.
    Tiled,
    /// Leaves pixels untouched.
    Transparent,
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl Paint {
    /// The solid color, if this is not a special ink.
    pub fn color(self) -> Option<Color> {
        match self {
            Paint::Solid(color) => Some(color),
            _ => None,
        }
    }
}

/// The auxiliary images that special inks draw from.
#[derive(Clone, Copy, Debug, Default)]
pub struct Patterns<'a> {
    pub brush: Option<&'a Image>,
    pub tile: Option<&'a Image>,
}

/// Draws shapes into an image.
///
/// All coordinates are physical pixel positions. Shapes may extend past the image edges, only
/// the covered pixels inside the image are written.
pub struct Painter<'a> {
    pub(crate) image: &'a mut Image,
    patterns: Patterns<'a>,
}

impl<'a> Painter<'a> {
    pub fn new(image: &'a mut Image) -> Self {
        Painter {
            image,
            patterns: Patterns::default(),
        }
    }

    /// Draw with brush and tile images for the special inks.
    ///
    /// Without a brush or tile, [`Paint::Brushed`] and [`Paint::Tiled`] leave pixels untouched.
    pub fn with_patterns(image: &'a mut Image, patterns: Patterns<'a>) -> Self {
        Painter { image, patterns }
    }

    pub fn image(&self) -> &Image {
        self.image
    }

    /// Write one pixel with the given ink.
    pub fn set_pixel(&mut self, x: i32, y: i32, paint: Paint) {
        match paint {
            Paint::Solid(color) => self.image.set_pixel(x, y, color),
            Paint::Styled => {
                if let Some(Some(color)) = self.image.next_style() {
                    self.image.set_pixel(x, y, color);
                }
            }
            Paint::StyledBrushed => match self.image.next_style() {
                Some(Some(color)) if color != Color(0) => self.stamp_brush(x, y),
                _ => {}
            },
            Paint::Brushed => self.stamp_brush(x, y),
            Paint::Tiled => self.tile_pixel(x, y),
            Paint::Transparent => {}
        }
    }

    fn stamp_brush(&mut self, x: i32, y: i32) {
        let Some(brush) = self.patterns.brush else {
            return;
        };

        let (width, height) = (brush.width() as i32, brush.height() as i32);
        let left = i64::from(x) - i64::from(width / 2);
        let top = i64::from(y) - i64::from(height / 2);
        let transparent = brush.transparent();

        for by in 0..height {
            let Ok(ty) = i32::try_from(top + i64::from(by)) else {
                continue;
            };

            for bx in 0..width {
                let Ok(tx) = i32::try_from(left + i64::from(bx)) else {
                    continue;
                };

                let color = brush.get_pixel(bx, by);
                if color == transparent {
                    continue;
                }

                let mapped = map_color(self.image, brush, color);
                self.image.set_pixel(tx, ty, mapped);
            }
        }
    }

    fn tile_pixel(&mut self, x: i32, y: i32) {
        let Some(tile) = self.patterns.tile else {
            return;
        };

        let tx = x.rem_euclid(tile.width() as i32);
        let ty = y.rem_euclid(tile.height() as i32);
        let color = tile.get_pixel(tx, ty);
        if color == tile.transparent() {
            return;
        }

        let mapped = map_color(self.image, tile, color);
        self.image.set_pixel(x, y, mapped);
    }
}

/// Translate a color of `from` into the color space of `into`.
///
/// Palette targets resolve, possibly allocating, an entry with the same components.
pub(crate) fn map_color(into: &mut Image, from: &Image, color: Color) -> Color {
    match (into.is_true_color(), from.is_true_color()) {
        (true, true) => color,
        (true, false) => Color::true_color(from.rgba(color)),
        (false, _) => {
            let rgba: Rgba = from.rgba(color);
            into.color_resolve(rgba)
        }
    }
}
