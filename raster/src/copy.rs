// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Copying rectangles between images.
//!
//! All operations clip writes to the destination. Source pixels outside the source image read as
//! color `0`, callers validate regions beforehand when that is not intended. Pixels of the
//! source's transparent color are skipped.
use crate::color::{Color, Rgba, MAX_COLORS};
use crate::image::{Image, Pixels};
use crate::math::floor;

/// A rectangle of equal size in source and destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub dest: (i32, i32),
    pub source: (i32, i32),
    pub size: (i32, i32),
}

/// A source rectangle stretched onto a destination rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScaledRegion {
    pub dest: (i32, i32),
    pub source: (i32, i32),
    pub dest_size: (i32, i32),
    pub source_size: (i32, i32),
}

/// Caches the translation of source palette indices into the destination.
struct ColorMap {
    map: [Option<Color>; MAX_COLORS],
}

impl ColorMap {
    fn new() -> Self {
        ColorMap {
            map: [None; MAX_COLORS],
        }
    }

    fn map(&mut self, dst: &mut Image, src: &Image, color: Color) -> Color {
        match (dst.is_true_color(), src.is_true_color()) {
            (true, true) => color,
            (true, false) => Color::true_color(src.rgba(color)),
            (false, true) => dst.color_resolve(Rgba::unpack(color)),
            (false, false) => {
                let Some(idx) = color.index() else {
                    return color;
                };

                *self.map[idx].get_or_insert_with(|| dst.color_resolve(src.rgba(color)))
            }
        }
    }
}

/// The offsets into a destination span of `len` pixels at `at` that land inside `0..limit`.
fn visible(at: i32, len: i64, limit: u32) -> core::ops::Range<i64> {
    let at = i64::from(at);
    let start = (-at).max(0);
    let end = (i64::from(limit) - at).min(len);
    start..end.max(start)
}

impl Image {
    /// Copy a rectangle of `src` into this image, translating colors as needed.
    pub fn copy_from(&mut self, src: &Image, region: Region) {
        let mut colors = ColorMap::new();
        let transparent = src.transparent();
        let (w, h) = region.size;

        for y in 0..h.max(0) {
            for x in 0..w.max(0) {
                let color = src.get_pixel(region.source.0 + x, region.source.1 + y);
                if color == transparent {
                    continue;
                }

                let (dx, dy) = (region.dest.0 + x, region.dest.1 + y);
                if !self.bounds_safe(dx, dy) {
                    continue;
                }

                let mapped = colors.map(self, src, color);
                self.set_pixel(dx, dy, mapped);
            }
        }
    }

    /// Copy a rectangle, stretching or shrinking it by pixel replication.
    pub fn copy_resized_from(&mut self, src: &Image, region: ScaledRegion) {
        let (dst_w, dst_h) = (i64::from(region.dest_size.0), i64::from(region.dest_size.1));
        let (src_w, src_h) = (i64::from(region.source_size.0), i64::from(region.source_size.1));
        if src_w <= 0 || src_h <= 0 || dst_w <= 0 || dst_h <= 0 {
            return;
        }

        let xs = visible(region.dest.0, dst_w, self.width());
        let ys = visible(region.dest.1, dst_h, self.height());

        // The source pixel covering a destination offset, each source pixel repeats over
        // `dst / src` destination pixels with the remainder spread evenly.
        let nearest = |offset: i64, dst: i64, src: i64| ((offset + 1) * src - 1) / dst;

        let mut colors = ColorMap::new();
        let transparent = src.transparent();

        for dy in ys {
            let Ok(sy) = i32::try_from(i64::from(region.source.1) + nearest(dy, dst_h, src_h)) else {
                continue;
            };

            for dx in xs.clone() {
                let Ok(sx) = i32::try_from(i64::from(region.source.0) + nearest(dx, dst_w, src_w)) else {
                    continue;
                };

                let color = src.get_pixel(sx, sy);
                if color == transparent {
                    continue;
                }

                let mapped = colors.map(self, src, color);
                let (x, y) = (i64::from(region.dest.0) + dx, i64::from(region.dest.1) + dy);
                self.set_pixel(x as i32, y as i32, mapped);
            }
        }
    }

    /// Copy a rectangle, averaging the covered source area for each destination pixel.
    ///
    /// Palette destinations have no room for the blended colors and fall back to
    /// [`Image::copy_resized_from`].
    pub fn copy_resampled_from(&mut self, src: &Image, region: ScaledRegion) {
        if !self.is_true_color() {
            return self.copy_resized_from(src, region);
        }

        let (dst_w, dst_h) = region.dest_size;
        let (src_w, src_h) = region.source_size;
        if src_w <= 0 || src_h <= 0 || dst_w <= 0 || dst_h <= 0 {
            return;
        }

        let scale_x = f64::from(src_w) / f64::from(dst_w);
        let scale_y = f64::from(src_h) / f64::from(dst_h);

        let xs = visible(region.dest.0, i64::from(dst_w), self.width());
        let ys = visible(region.dest.1, i64::from(dst_h), self.height());

        for y in ys {
            // Both offsets lie below the `i32` sizes.
            let y = y as i32;
            let sy1 = f64::from(y) * scale_y;
            let sy2 = f64::from(y + 1) * scale_y;
            for x in xs.clone() {
                let x = x as i32;
                let (dx, dy) = (region.dest.0 + x, region.dest.1 + y);

                let sx1 = f64::from(x) * scale_x;
                let sx2 = f64::from(x + 1) * scale_x;
                let (mut red, mut green, mut blue, mut alpha) = (0.0, 0.0, 0.0, 0.0);
                let mut coverage = 0.0;

                let mut sy = sy1;
                while sy < sy2 {
                    let y_portion = if floor(sy) == floor(sy1) {
                        let part = 1.0 - (sy - floor(sy));
                        part.min(sy2 - sy1)
                    } else if sy == floor(sy2) {
                        sy2 - floor(sy2)
                    } else {
                        1.0
                    };

                    let mut sx = sx1;
                    while sx < sx2 {
                        let x_portion = if floor(sx) == floor(sx1) {
                            let part = 1.0 - (sx - floor(sx));
                            part.min(sx2 - sx1)
                        } else if sx == floor(sx2) {
                            sx2 - floor(sx2)
                        } else {
                            1.0
                        };

                        let portion = x_portion * y_portion;
                        let px = region.source.0 + sx as i32;
                        let py = region.source.1 + sy as i32;
                        let c = Rgba::unpack(src.get_true_color_pixel(px, py));
                        red += f64::from(c.r) * portion;
                        green += f64::from(c.g) * portion;
                        blue += f64::from(c.b) * portion;
                        alpha += f64::from(c.a) * portion;
                        coverage += portion;
                        sx = floor(sx) + 1.0;
                    }

                    sy = floor(sy) + 1.0;
                }

                if coverage > 0.0 {
                    red /= coverage;
                    green /= coverage;
                    blue /= coverage;
                    alpha /= coverage;
                }

                let channel = |v: f64, max: f64| v.round().clamp(0.0, max) as u8;
                let color = Color::true_color(Rgba::new(
                    channel(red, 255.0),
                    channel(green, 255.0),
                    channel(blue, 255.0),
                    channel(alpha, 127.0),
                ));
                self.set_pixel(dx, dy, color);
            }
        }
    }

    /// Blend a rectangle of `src` over this image, `pct` percent of the source.
    ///
    /// At 100 percent this is a plain copy, at 0 the destination stays as is.
    pub fn copy_merge_from(&mut self, src: &Image, region: Region, pct: u8) {
        let pct = i32::from(pct.min(100));
        let transparent = src.transparent();
        let (w, h) = region.size;

        for y in 0..h.max(0) {
            for x in 0..w.max(0) {
                let (sx, sy) = (region.source.0 + x, region.source.1 + y);
                let (dx, dy) = (region.dest.0 + x, region.dest.1 + y);
                let color = src.get_pixel(sx, sy);
                if color == transparent || !self.bounds_safe(dx, dy) {
                    continue;
                }

                let s = src.rgba(color);
                let d = self.rgba(self.get_pixel(dx, dy));
                let mix = |s: u8, d: u8| {
                    (f64::from(s) * f64::from(pct) / 100.0
                        + f64::from(d) * f64::from(100 - pct) / 100.0) as u8
                };

                let merged = self.color_resolve(Rgba::rgb(mix(s.r, d.r), mix(s.g, d.g), mix(s.b, d.b)));
                self.set_pixel(dx, dy, merged);
            }
        }
    }

    /// Like [`Image::copy_merge_from`] but first reduces the destination pixel to its gray value,
    /// so the source hue is preserved.
    pub fn copy_merge_gray_from(&mut self, src: &Image, region: Region, pct: u8) {
        let pct = f64::from(pct.min(100));
        let transparent = src.transparent();
        let (w, h) = region.size;

        for y in 0..h.max(0) {
            for x in 0..w.max(0) {
                let (sx, sy) = (region.source.0 + x, region.source.1 + y);
                let (dx, dy) = (region.dest.0 + x, region.dest.1 + y);
                let color = src.get_pixel(sx, sy);
                if color == transparent || !self.bounds_safe(dx, dy) {
                    continue;
                }

                let s = src.rgba(color);
                let d = self.rgba(self.get_pixel(dx, dy));
                let gray = 0.299 * f64::from(d.r) + 0.587 * f64::from(d.g) + 0.114 * f64::from(d.b);
                let g = gray * ((100.0 - pct) / 100.0);
                let mix = |s: u8| (f64::from(s) * (pct / 100.0) + g) as u8;
                let rgba = Rgba::rgb(mix(s.r), mix(s.g), mix(s.b));

                let mut merged = self.color_exact(rgba);
                if merged.is_none() {
                    merged = self.color_allocate(rgba);
                }
                if merged.is_none() {
                    merged = self.color_closest(rgba);
                }

                self.set_pixel(dx, dy, merged);
            }
        }
    }

    /// Adopt the palette of `src`, remapping every pixel to the closest new entry.
    ///
    /// Both images must be palette images, otherwise nothing happens.
    pub fn copy_palette_from(&mut self, src: &Image) {
        if self.is_true_color() || src.is_true_color() {
            return;
        }

        let width = self.width() as usize;
        let mut remap: [Option<u8>; MAX_COLORS] = [None; MAX_COLORS];
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                let color = self.get_pixel(x, y);
                let Some(idx) = color.index() else {
                    continue;
                };

                let mapped = match remap[idx] {
                    Some(mapped) => mapped,
                    None => {
                        let closest = src.color_closest(self.rgba(color));
                        let mapped = closest.index().unwrap_or(0) as u8;
                        remap[idx] = Some(mapped);
                        mapped
                    }
                };

                if let Pixels::Palette(px) = &mut self.pixels {
                    px[y as usize * width + x as usize] = mapped;
                }
            }
        }

        self.palette = src.palette.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SizeError;

    #[test]
    fn copy_translates_palette() -> Result<(), SizeError> {
        let mut src = Image::palette(4, 4)?;
        let _ = src.color_allocate(Rgba::rgb(0, 0, 0));
        let red = src.color_allocate(Rgba::rgb(255, 0, 0));
        src.set_pixel(1, 1, red);

        let mut dst = Image::palette(4, 4)?;
        let _ = dst.color_allocate(Rgba::rgb(255, 255, 255));
        dst.copy_from(
            &src,
            Region {
                dest: (1, 1),
                source: (0, 0),
                size: (4, 4),
            },
        );

        // Black and red were added to the destination palette.
        assert_eq!(dst.colors_total(), 3);
        assert_eq!(dst.rgba(dst.get_pixel(2, 2)), Rgba::rgb(255, 0, 0));
        assert_eq!(dst.rgba(dst.get_pixel(0, 0)), Rgba::rgb(255, 255, 255));
        Ok(())
    }

    #[test]
    fn copy_skips_transparent() -> Result<(), SizeError> {
        let mut src = Image::true_color(2, 2)?;
        src.set_transparent(Color(0));

        let mut dst = Image::true_color(2, 2)?;
        let white = Color::true_color(Rgba::rgb(255, 255, 255));
        dst.set_pixel(0, 0, white);
        dst.copy_from(
            &src,
            Region {
                size: (2, 2),
                ..Region::default()
            },
        );

        assert_eq!(dst.get_pixel(0, 0), white);
        Ok(())
    }

    #[test]
    fn resized_doubles_pixels() -> Result<(), SizeError> {
        let mut src = Image::true_color(2, 1)?;
        let white = Color::true_color(Rgba::rgb(255, 255, 255));
        src.set_pixel(1, 0, white);

        let mut dst = Image::true_color(4, 2)?;
        dst.copy_resized_from(
            &src,
            ScaledRegion {
                dest: (0, 0),
                source: (0, 0),
                dest_size: (4, 2),
                source_size: (2, 1),
            },
        );

        let row: Vec<_> = (0..4).map(|x| dst.get_pixel(x, 1) == white).collect();
        assert_eq!(row, [false, false, true, true]);
        Ok(())
    }

    #[test]
    fn huge_destination_is_clipped() -> Result<(), SizeError> {
        let mut src = Image::true_color(2, 1)?;
        let white = Color::true_color(Rgba::rgb(255, 255, 255));
        let red = Color::true_color(Rgba::rgb(255, 0, 0));
        src.set_pixel(0, 0, white);
        src.set_pixel(1, 0, red);

        let region = ScaledRegion {
            dest: (0, 0),
            source: (0, 0),
            dest_size: (i32::MAX, i32::MAX),
            source_size: (2, 1),
        };

        let mut resized = Image::true_color(4, 4)?;
        resized.copy_resized_from(&src, region);
        assert_eq!(resized.get_pixel(3, 3), white);

        let mut resampled = Image::true_color(4, 4)?;
        resampled.copy_resampled_from(&src, region);
        assert_eq!(resampled.get_pixel(3, 3), white);

        // Only the far end of the stretched source reaches the image.
        let shifted = ScaledRegion {
            dest: (4 - i32::MAX, 0),
            ..region
        };
        let mut resized = Image::true_color(4, 4)?;
        resized.copy_resized_from(&src, shifted);
        assert_eq!(resized.get_pixel(0, 0), red);
        assert_eq!(resized.get_pixel(3, 3), red);
        Ok(())
    }

    #[test]
    fn resampled_averages() -> Result<(), SizeError> {
        let mut src = Image::true_color(2, 1)?;
        src.set_pixel(1, 0, Color::true_color(Rgba::rgb(200, 100, 50)));

        let mut dst = Image::true_color(1, 1)?;
        dst.copy_resampled_from(
            &src,
            ScaledRegion {
                dest: (0, 0),
                source: (0, 0),
                dest_size: (1, 1),
                source_size: (2, 1),
            },
        );

        assert_eq!(Rgba::unpack(dst.get_pixel(0, 0)), Rgba::rgb(100, 50, 25));
        Ok(())
    }

    #[test]
    fn merge_percentages() -> Result<(), SizeError> {
        let mut src = Image::true_color(1, 1)?;
        src.set_pixel(0, 0, Color::true_color(Rgba::rgb(200, 200, 200)));
        let region = Region {
            size: (1, 1),
            ..Region::default()
        };

        let mut full = Image::true_color(1, 1)?;
        full.copy_merge_from(&src, region, 100);
        assert_eq!(Rgba::unpack(full.get_pixel(0, 0)), Rgba::rgb(200, 200, 200));

        let mut half = Image::true_color(1, 1)?;
        half.copy_merge_from(&src, region, 50);
        assert_eq!(Rgba::unpack(half.get_pixel(0, 0)), Rgba::rgb(100, 100, 100));

        let mut gray = Image::true_color(1, 1)?;
        gray.copy_merge_gray_from(&src, region, 0);
        assert_eq!(Rgba::unpack(gray.get_pixel(0, 0)), Rgba::rgb(0, 0, 0));
        Ok(())
    }

    #[test]
    fn palette_copy_remaps() -> Result<(), SizeError> {
        let mut src = Image::palette(1, 1)?;
        let _ = src.color_allocate(Rgba::rgb(0, 0, 200));
        let _ = src.color_allocate(Rgba::rgb(250, 0, 0));

        let mut dst = Image::palette(2, 1)?;
        let _ = dst.color_allocate(Rgba::rgb(0, 0, 0));
        let red = dst.color_allocate(Rgba::rgb(255, 0, 0));
        dst.set_pixel(1, 0, red);

        dst.copy_palette_from(&src);
        assert_eq!(dst.colors_total(), 2);
        assert_eq!(dst.get_pixel(1, 0), Color(1));
        assert_eq!(dst.get_pixel(0, 0), Color(0));
        Ok(())
    }
}
