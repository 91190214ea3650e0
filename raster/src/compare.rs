// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use bitflags::bitflags;

use crate::image::Image;

bitflags! {
    /// The ways in which two images differ.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Difference: u32 {
        /// The images would not look the same when rendered.
        const IMAGE = 1;
        /// The number of palette entries differs.
        const NUM_COLORS = 2;
        /// Some pixel in the common area has different components.
        const COLOR = 4;
        const SIZE_X = 8;
        const SIZE_Y = 16;
        const TRANSPARENT = 32;
        /// Reserved, images have no background color to compare.
        const BACKGROUND = 64;
        const INTERLACE = 128;
        const TRUECOLOR = 256;
    }
}

impl Image {
    /// Compare two images, pixels are compared by their red, green and blue components.
    ///
    /// Only the area shared by both images is inspected for pixel differences.
    pub fn compare(&self, other: &Image) -> Difference {
        let mut diff = Difference::empty();

        if self.is_interlaced() != other.is_interlaced() {
            diff |= Difference::INTERLACE;
        }

        if self.transparent() != other.transparent() {
            diff |= Difference::TRANSPARENT;
        }

        if self.is_true_color() != other.is_true_color() {
            diff |= Difference::TRUECOLOR;
        }

        if self.width() != other.width() {
            diff |= Difference::SIZE_X | Difference::IMAGE;
        }

        if self.height() != other.height() {
            diff |= Difference::SIZE_Y | Difference::IMAGE;
        }

        if self.colors_total() != other.colors_total() {
            diff |= Difference::NUM_COLORS;
        }

        let width = self.width().min(other.width()) as i32;
        let height = self.height().min(other.height()) as i32;

        'rows: for y in 0..height {
            for x in 0..width {
                let a = self.rgba(self.get_pixel(x, y));
                let b = other.rgba(other.get_pixel(x, y));
                if (a.r, a.g, a.b) != (b.r, b.g, b.b) {
                    diff |= Difference::COLOR | Difference::IMAGE;
                    break 'rows;
                }
            }
        }

        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Rgba};

    #[test]
    fn identical_and_resized() -> Result<(), crate::SizeError> {
        let mut a = Image::palette(4, 4)?;
        a.color_allocate(Rgba::rgb(255, 255, 255));
        let b = a.clone();
        assert_eq!(a.compare(&b), Difference::empty());

        let c = Image::palette(5, 4)?;
        let diff = a.compare(&c);
        assert!(diff.contains(Difference::SIZE_X | Difference::IMAGE | Difference::NUM_COLORS));
        assert!(!diff.contains(Difference::SIZE_Y));
        Ok(())
    }

    #[test]
    fn pixel_color() -> Result<(), crate::SizeError> {
        let mut a = Image::true_color(3, 3)?;
        let b = a.clone();
        a.set_pixel(2, 2, Color::true_color(Rgba::rgb(1, 0, 0)));
        assert_eq!(a.compare(&b), Difference::COLOR | Difference::IMAGE);
        Ok(())
    }
}
