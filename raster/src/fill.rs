// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use crate::color::Color;
use crate::image::Image;
use crate::paint::{Paint, Painter};

impl Painter<'_> {
    /// Flood fill the region of pixels that share the color of the seed pixel.
    ///
    /// The region is 4-connected. Seeds outside the image, and solid fills with the color
    /// already present at the seed, do nothing.
    pub fn fill(&mut self, x: i32, y: i32, paint: Paint) {
        if !self.image.bounds_safe(x, y) {
            return;
        }

        let old = self.image.get_pixel(x, y);
        if paint == Paint::Solid(old) {
            return;
        }

        self.flood(x, y, paint, |color| color == old);
    }

    /// Flood fill outward from the seed until pixels of the `border` color.
    pub fn fill_to_border(&mut self, x: i32, y: i32, border: Color, paint: Paint) {
        if border.is_none() || !self.image.bounds_safe(x, y) {
            return;
        }

        self.flood(x, y, paint, |color| color != border);
    }

    /// Scanline flood fill over pixels accepted by `inside`.
    ///
    /// Every pixel is visited at most once, so inks which leave a pixel unchanged or write a
    /// color that still counts as inside terminate as well.
    fn flood(&mut self, x: i32, y: i32, paint: Paint, inside: impl Fn(Color) -> bool) {
        let width = self.image.width() as usize;
        let height = self.image.height() as usize;
        let mut visited = vec![false; width * height];
        let fillable = |image: &Image, visited: &[bool], x: usize, y: usize| {
            !visited[y * width + x] && inside(image.get_pixel(x as i32, y as i32))
        };

        let mut seeds = vec![(x as usize, y as usize)];
        while let Some((sx, sy)) = seeds.pop() {
            if !fillable(&*self.image, visited.as_slice(), sx, sy) {
                continue;
            }

            let mut left = sx;
            while left > 0 && fillable(&*self.image, visited.as_slice(), left - 1, sy) {
                left -= 1;
            }

            let mut right = sx;
            while right + 1 < width && fillable(&*self.image, visited.as_slice(), right + 1, sy) {
                right += 1;
            }

            for px in left..=right {
                visited[sy * width + px] = true;
                self.set_pixel(px as i32, sy as i32, paint);
            }

            let above = sy.checked_sub(1);
            let below = Some(sy + 1).filter(|&row| row < height);
            for row in [above, below].into_iter().flatten() {
                let mut px = left;
                while px <= right {
                    if fillable(&*self.image, visited.as_slice(), px, row) {
                        seeds.push((px, row));
                        while px <= right && fillable(&*self.image, visited.as_slice(), px, row) {
                            px += 1;
                        }
                    } else {
                        px += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Color, Image, Paint, Painter, Rgba, SizeError};

    #[test]
    fn fill_enclosed_region() -> Result<(), SizeError> {
        let mut image = Image::palette(10, 10)?;
        image.color_allocate(Rgba::rgb(0, 0, 0));
        let white = image.color_allocate(Rgba::rgb(255, 255, 255));
        let red = image.color_allocate(Rgba::rgb(255, 0, 0));

        let mut painter = Painter::new(&mut image);
        painter.rectangle((2, 2), (7, 7), white.into());
        painter.fill(4, 4, red.into());

        assert_eq!(image.get_pixel(3, 3), red);
        assert_eq!(image.get_pixel(6, 6), red);
        assert_eq!(image.get_pixel(2, 2), white);
        assert_eq!(image.get_pixel(0, 0), Color(0));
        Ok(())
    }

    #[test]
    fn fill_to_border_crosses_colors() -> Result<(), SizeError> {
        let mut image = Image::palette(10, 10)?;
        image.color_allocate(Rgba::rgb(0, 0, 0));
        let white = image.color_allocate(Rgba::rgb(255, 255, 255));
        let red = image.color_allocate(Rgba::rgb(255, 0, 0));
        let blue = image.color_allocate(Rgba::rgb(0, 0, 255));

        let mut painter = Painter::new(&mut image);
        painter.rectangle((2, 2), (7, 7), white.into());
        painter.set_pixel(5, 5, blue.into());
        painter.fill_to_border(4, 4, white, red.into());

        assert_eq!(image.get_pixel(5, 5), red);
        assert_eq!(image.get_pixel(1, 1), Color(0));
        Ok(())
    }

    #[test]
    fn translucent_fill_terminates() -> Result<(), SizeError> {
        let mut image = Image::true_color(16, 16)?;
        let clear = Color::true_color(Rgba::new(10, 20, 30, 127));
        Painter::new(&mut image).fill(3, 3, Paint::Solid(clear));
        assert_eq!(image.get_pixel(3, 3), Color(0));
        Ok(())
    }
}
