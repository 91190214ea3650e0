// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Color values, palettes and the arithmetic shared by all drawing operations.

/// The number of entries in the palette of a palette image.
pub const MAX_COLORS: usize = 256;

/// Alpha value of a fully opaque color.
pub const ALPHA_OPAQUE: u8 = 0;
/// Alpha value of a fully transparent color.
pub const ALPHA_TRANSPARENT: u8 = 127;
/// The largest representable alpha, colors have seven bits of alpha.
pub const ALPHA_MAX: u8 = 127;

/// A color as stored in an image.
///
/// For a palette image this is the index of a palette entry. For a true-color image it is a packed
/// `0xAARRGGBB` word where the alpha has 7 bits, `0` is opaque and `127` is fully transparent.
/// Since the top bit of a packed color is never set, any negative value is not a color at all.
///
/// Color lookups that can not produce a color return [`Color::NONE`]. Running out of palette
/// entries is an expected outcome and not an error, so callers are expected to check the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Color(pub i32);

/// The components of a color.
///
/// Alpha is in the 7-bit range `0..=127` with `0` being opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// The sentinel returned when no color could be found or allocated.
    pub const NONE: Self = Color(-1);

    /// Pack components into a true-color value.
    pub const fn true_color(rgba: Rgba) -> Self {
        Color(
            ((rgba.a as i32) << 24) | ((rgba.r as i32) << 16) | ((rgba.g as i32) << 8) | rgba.b as i32,
        )
    }

    /// Returns `true` for the sentinel, or any other negative value.
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }

    /// The raw integer value.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Interpret this as a palette index.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&idx| idx < MAX_COLORS)
    }
}

impl Rgba {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba {
            r,
            g,
            b,
            a: ALPHA_OPAQUE,
        }
    }

    /// A color with alpha, which saturates at [`ALPHA_MAX`].
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a = if a > ALPHA_MAX { ALPHA_MAX } else { a };
        Rgba { r, g, b, a }
    }

    /// Split a packed true-color value.
    pub const fn unpack(color: Color) -> Self {
        let c = color.0;
        Rgba {
            a: ((c >> 24) & 0x7f) as u8,
            r: ((c >> 16) & 0xff) as u8,
            g: ((c >> 8) & 0xff) as u8,
            b: (c & 0xff) as u8,
        }
    }

    /// The alpha expanded to 8 bits where `255` is opaque, as most file formats expect.
    pub const fn alpha8(self) -> u8 {
        let a = if self.a > ALPHA_MAX { ALPHA_MAX } else { self.a };
        255 - ((a << 1) + (a >> 6))
    }

    /// Convert an 8-bit opacity back into our 7-bit alpha.
    pub const fn from_alpha8(r: u8, g: u8, b: u8, opacity: u8) -> Self {
        Rgba {
            r,
            g,
            b,
            a: ALPHA_MAX - (opacity >> 1),
        }
    }

    fn distance(self, other: Rgba) -> i64 {
        let d = |a: u8, b: u8| {
            let d = i64::from(a) - i64::from(b);
            d * d
        };

        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b) + d(self.a, other.a)
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgba::rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for Rgba {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Rgba::new(r, g, b, a)
    }
}

/// The palette of an indexed image.
///
/// Entries that were never allocated or have been deallocated are `open` and get reused by the
/// next allocation. Their component values are retained, file formats store them verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Palette {
    entries: [Rgba; MAX_COLORS],
    open: [bool; MAX_COLORS],
    total: usize,
}

impl Palette {
    pub(crate) fn new() -> Self {
        Palette {
            entries: [Rgba::default(); MAX_COLORS],
            open: [true; MAX_COLORS],
            total: 0,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn get(&self, idx: usize) -> Rgba {
        self.entries.get(idx).copied().unwrap_or_default()
    }

    pub(crate) fn is_open(&self, idx: usize) -> bool {
        self.open.get(idx).copied().unwrap_or(true)
    }

    /// Overwrite the raw state, used by decoders and palette copies.
    pub(crate) fn set_raw(&mut self, idx: usize, rgba: Rgba, open: bool) {
        self.entries[idx] = rgba;
        self.open[idx] = open;
    }

    pub(crate) fn set_total(&mut self, total: usize) {
        debug_assert!(total <= MAX_COLORS);
        self.total = total.min(MAX_COLORS);
    }

    /// Slots in use, in index order.
    pub(crate) fn used(&self) -> impl Iterator<Item = (usize, Rgba)> + '_ {
        (0..self.total)
            .filter(move |&idx| !self.open[idx])
            .map(move |idx| (idx, self.entries[idx]))
    }

    pub(crate) fn allocate(&mut self, rgba: Rgba) -> Color {
        let slot = match (0..self.total).find(|&idx| self.open[idx]) {
            Some(idx) => idx,
            None if self.total == MAX_COLORS => return Color::NONE,
            None => {
                self.total += 1;
                self.total - 1
            }
        };

        self.entries[slot] = rgba;
        self.open[slot] = false;
        Color(slot as i32)
    }

    pub(crate) fn deallocate(&mut self, idx: usize) {
        if idx < self.total {
            self.open[idx] = true;
        }
    }

    pub(crate) fn exact(&self, rgba: Rgba) -> Color {
        self.used()
            .find(|&(_, entry)| entry == rgba)
            .map_or(Color::NONE, |(idx, _)| Color(idx as i32))
    }

    pub(crate) fn closest(&self, rgba: Rgba) -> Color {
        let mut best: Option<(usize, i64)> = None;
        for (idx, entry) in self.used() {
            let dist = entry.distance(rgba);
            if best.map_or(true, |(_, min)| dist < min) {
                best = Some((idx, dist));
            }
        }

        best.map_or(Color::NONE, |(idx, _)| Color(idx as i32))
    }

    pub(crate) fn closest_hwb(&self, rgba: Rgba) -> Color {
        let target = Hwb::from_rgb(rgba);
        let mut best: Option<(usize, f32)> = None;
        for (idx, entry) in self.used() {
            let dist = Hwb::from_rgb(entry).distance(&target);
            if best.map_or(true, |(_, min)| dist < min) {
                best = Some((idx, dist));
            }
        }

        best.map_or(Color::NONE, |(idx, _)| Color(idx as i32))
    }

    /// Find the exact color, allocate it, or settle for the closest one.
    pub(crate) fn resolve(&mut self, rgba: Rgba) -> Color {
        // Anything is closer than this.
        let mut min = 4 * 255 * 255 + 1;
        let mut closest = Color::NONE;
        let mut free = None;

        for idx in 0..self.total {
            if self.open[idx] {
                free = Some(idx);
                continue;
            }

            let dist = self.entries[idx].distance(rgba);
            if dist < min {
                if dist == 0 {
                    return Color(idx as i32);
                }

                min = dist;
                closest = Color(idx as i32);
            }
        }

        let slot = match free {
            Some(idx) => idx,
            None if self.total == MAX_COLORS => return closest,
            None => {
                self.total += 1;
                self.total - 1
            }
        };

        self.entries[slot] = rgba;
        self.open[slot] = false;
        Color(slot as i32)
    }
}

/// Hue, whiteness, blackness. The hue is undefined for grays.
struct Hwb {
    h: Option<f32>,
    w: f32,
    b: f32,
}

impl Hwb {
    fn from_rgb(rgba: Rgba) -> Self {
        let r = f32::from(rgba.r) / 255.0;
        let g = f32::from(rgba.g) / 255.0;
        let b = f32::from(rgba.b) / 255.0;

        let w = r.min(g).min(b);
        let v = r.max(g).max(b);
        let black = 1.0 - v;

        if v == w {
            return Hwb {
                h: None,
                w,
                b: black,
            };
        }

        let (f, i) = if r == w {
            (g - b, 3.0)
        } else if g == w {
            (b - r, 5.0)
        } else {
            (r - g, 1.0)
        };

        Hwb {
            h: Some(i - f / (v - w)),
            w,
            b: black,
        }
    }

    fn distance(&self, other: &Hwb) -> f32 {
        let hue = match (self.h, other.h) {
            (Some(h1), Some(h2)) => {
                let diff = (h1 - h2).abs();
                // The hue is a circle of six sectors.
                if diff > 3.0 {
                    6.0 - diff
                } else {
                    diff
                }
            }
            _ => 0.0,
        };

        hue * hue + (self.w - other.w) * (self.w - other.w) + (self.b - other.b) * (self.b - other.b)
    }
}

/// Composite `src` over `dst`, both packed true-color values.
pub(crate) fn alpha_blend(dst: Color, src: Color) -> Color {
    let src_c = Rgba::unpack(src);
    if src_c.a == ALPHA_OPAQUE {
        return src;
    }

    let dst_c = Rgba::unpack(dst);
    if src_c.a == ALPHA_TRANSPARENT {
        return dst;
    }

    if dst_c.a == ALPHA_TRANSPARENT {
        return src;
    }

    let max = i32::from(ALPHA_MAX);
    let src_weight = i32::from(ALPHA_TRANSPARENT - src_c.a);
    let dst_weight = i32::from(ALPHA_TRANSPARENT - dst_c.a) * i32::from(src_c.a) / max;
    let total = src_weight + dst_weight;

    let mix = |s: u8, d: u8| ((i32::from(s) * src_weight + i32::from(d) * dst_weight) / total) as u8;
    let alpha = (i32::from(src_c.a) * i32::from(dst_c.a) / max) as u8;

    Color::true_color(Rgba {
        r: mix(src_c.r, dst_c.r),
        g: mix(src_c.g, dst_c.g),
        b: mix(src_c.b, dst_c.b),
        a: alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let rgba = Rgba::new(0x12, 0x34, 0x56, 0x7f);
        let packed = Color::true_color(rgba);
        assert_eq!(packed, Color(0x7f12_3456));
        assert_eq!(Rgba::unpack(packed), rgba);
        assert!(!packed.is_none());
        assert!(Color::NONE.is_none());
    }

    #[test]
    fn alpha_expansion() {
        assert_eq!(Rgba::rgb(0, 0, 0).alpha8(), 255);
        assert_eq!(Rgba::new(0, 0, 0, ALPHA_TRANSPARENT).alpha8(), 0);
        assert_eq!(Rgba::from_alpha8(1, 2, 3, 255).a, ALPHA_OPAQUE);
        assert_eq!(Rgba::from_alpha8(1, 2, 3, 0).a, ALPHA_TRANSPARENT);
    }

    #[test]
    fn palette_exhaustion() {
        let mut palette = Palette::new();
        for i in 0..MAX_COLORS {
            assert_eq!(palette.allocate(Rgba::rgb(i as u8, 0, 0)), Color(i as i32));
        }

        assert_eq!(palette.allocate(Rgba::rgb(1, 2, 3)), Color::NONE);
        // Resolve falls back to the closest entry.
        assert_eq!(palette.resolve(Rgba::rgb(200, 1, 1)), Color(200));

        palette.deallocate(17);
        assert_eq!(palette.allocate(Rgba::rgb(1, 2, 3)), Color(17));
    }

    #[test]
    fn closest_and_exact() {
        let mut palette = Palette::new();
        assert_eq!(palette.closest(Rgba::rgb(0, 0, 0)), Color::NONE);

        let red = palette.allocate(Rgba::rgb(255, 0, 0));
        let blue = palette.allocate(Rgba::rgb(0, 0, 255));
        assert_eq!(palette.closest(Rgba::rgb(200, 10, 10)), red);
        assert_eq!(palette.closest_hwb(Rgba::rgb(10, 10, 100)), blue);
        assert_eq!(palette.exact(Rgba::rgb(0, 0, 255)), blue);
        assert_eq!(palette.exact(Rgba::rgb(0, 0, 254)), Color::NONE);
    }

    #[test]
    fn blending() {
        let dst = Color::true_color(Rgba::rgb(0, 0, 0));
        let opaque = Color::true_color(Rgba::rgb(255, 255, 255));
        let clear = Color::true_color(Rgba::new(255, 255, 255, ALPHA_TRANSPARENT));
        assert_eq!(alpha_blend(dst, opaque), opaque);
        assert_eq!(alpha_blend(dst, clear), dst);

        let half = Color::true_color(Rgba::new(254, 254, 254, 64));
        let mixed = Rgba::unpack(alpha_blend(dst, half));
        assert!(mixed.r > 100 && mixed.r < 150, "{:?}", mixed);
        assert_eq!(mixed.a, ALPHA_OPAQUE);
    }
}
