// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Text in TrueType and OpenType fonts.
//!
//! Glyph outlines are flattened into line segments and filled with the nonzero winding rule,
//! sampling pixel centers. There is no anti-aliasing, every covered pixel is painted with the ink.
use std::io;
use std::path::{Path, PathBuf};

use crate::paint::{Paint, Painter};

/// Rendering resolution, point sizes are converted to pixels at this many dots per inch.
#[cfg_attr(not(feature = "ttf"), allow(dead_code))]
const DPI: f64 = 96.0;

/// An error loading or using an outline font.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("outline font support is not available")]
    NotAvailable,
    #[error("could not read font {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse font {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// The corners of the box around rendered text, in pixel coordinates.
///
/// The order is lower left, lower right, upper right, upper left, relative to the text
/// direction. A rotated string has a rotated box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextBounds {
    pub corners: [(i32, i32); 4],
}

impl TextBounds {
    /// The eight coordinates `x0, y0, x1, y1, ..` in corner order.
    pub fn to_array(&self) -> [i32; 8] {
        let mut flat = [0; 8];
        for (idx, &(x, y)) in self.corners.iter().enumerate() {
            flat[2 * idx] = x;
            flat[2 * idx + 1] = y;
        }
        flat
    }
}

/// How to lay out a string in an outline font.
#[derive(Clone, Copy, Debug)]
pub struct OutlineText<'a> {
    /// Path of a TrueType or OpenType font file.
    pub font: &'a Path,
    /// The size in points.
    pub size: f64,
    /// Counter-clockwise rotation in radians.
    pub angle: f64,
    /// The left end of the baseline of the first character.
    pub origin: (i32, i32),
    pub text: &'a str,
}

impl OutlineText<'_> {
    /// Lay out the text without drawing, reporting only its bounds.
    pub fn bounds(&self) -> Result<TextBounds, FontError> {
        imp::render(self, None)
    }
}

impl Painter<'_> {
    /// Draw text in an outline font, returning its bounds.
    pub fn outline_text(&mut self, text: &OutlineText<'_>, paint: Paint) -> Result<TextBounds, FontError> {
        imp::render(text, Some((self, paint)))
    }
}

/// Maps unrotated layout coordinates, with `y` pointing down, onto the image.
#[derive(Clone, Copy)]
#[cfg_attr(not(feature = "ttf"), allow(dead_code))]
struct Placement {
    cos: f64,
    sin: f64,
    origin: (f64, f64),
}

#[cfg_attr(not(feature = "ttf"), allow(dead_code))]
impl Placement {
    fn new(text: &OutlineText<'_>) -> Self {
        Placement {
            cos: crate::math::cos(text.angle),
            sin: crate::math::sin(text.angle),
            origin: (f64::from(text.origin.0), f64::from(text.origin.1)),
        }
    }

    fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.origin.0 + x * self.cos + y * self.sin,
            self.origin.1 - x * self.sin + y * self.cos,
        )
    }

    fn corner(&self, point: (f64, f64)) -> (i32, i32) {
        let (x, y) = self.apply(point);
        (crate::math::round(x) as i32, crate::math::round(y) as i32)
    }
}

#[cfg(feature = "ttf")]
mod imp {
    use ttf_parser::{Face, OutlineBuilder};

    use super::{FontError, OutlineText, Placement, TextBounds, DPI};
    use crate::paint::{Paint, Painter};

    /// Quadratic and cubic curves are split into this many lines.
    const CURVE_STEPS: u32 = 8;

    struct Edge {
        from: (f64, f64),
        to: (f64, f64),
    }

    /// Collects the outline of glyphs as edges in image coordinates.
    struct Outline<'p> {
        placement: &'p Placement,
        scale: f64,
        pen: f64,
        start: (f64, f64),
        current: (f64, f64),
        edges: Vec<Edge>,
    }

    impl Outline<'_> {
        fn point(&self, x: f32, y: f32) -> (f64, f64) {
            let local = (self.pen + f64::from(x) * self.scale, -f64::from(y) * self.scale);
            self.placement.apply(local)
        }

        fn push(&mut self, to: (f64, f64)) {
            self.edges.push(Edge {
                from: self.current,
                to,
            });
            self.current = to;
        }
    }

    impl OutlineBuilder for Outline<'_> {
        fn move_to(&mut self, x: f32, y: f32) {
            self.current = self.point(x, y);
            self.start = self.current;
        }

        fn line_to(&mut self, x: f32, y: f32) {
            let to = self.point(x, y);
            self.push(to);
        }

        fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
            let p0 = self.current;
            let p1 = self.point(x1, y1);
            let p2 = self.point(x, y);
            for step in 1..=CURVE_STEPS {
                let t = f64::from(step) / f64::from(CURVE_STEPS);
                let mt = 1.0 - t;
                let at = |a: f64, b: f64, c: f64| mt * mt * a + 2.0 * mt * t * b + t * t * c;
                self.push((at(p0.0, p1.0, p2.0), at(p0.1, p1.1, p2.1)));
            }
        }

        fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
            let p0 = self.current;
            let p1 = self.point(x1, y1);
            let p2 = self.point(x2, y2);
            let p3 = self.point(x, y);
            for step in 1..=CURVE_STEPS {
                let t = f64::from(step) / f64::from(CURVE_STEPS);
                let mt = 1.0 - t;
                let at = |a: f64, b: f64, c: f64, d: f64| {
                    mt * mt * mt * a + 3.0 * mt * mt * t * b + 3.0 * mt * t * t * c + t * t * t * d
                };
                self.push((at(p0.0, p1.0, p2.0, p3.0), at(p0.1, p1.1, p2.1, p3.1)));
            }
        }

        fn close(&mut self) {
            if self.current != self.start {
                let start = self.start;
                self.push(start);
            }
        }
    }

    pub(super) fn render(
        text: &OutlineText<'_>,
        target: Option<(&mut Painter<'_>, Paint)>,
    ) -> Result<TextBounds, FontError> {
        let data = std::fs::read(text.font).map_err(|source| FontError::Io {
            path: text.font.to_owned(),
            source,
        })?;

        let face = Face::parse(&data, 0).map_err(|err| FontError::Parse {
            path: text.font.to_owned(),
            reason: err.to_string(),
        })?;

        let pixels = text.size * DPI / 72.0;
        let scale = pixels / f64::from(face.units_per_em().max(1));
        let placement = Placement::new(text);

        let mut outline = Outline {
            placement: &placement,
            scale,
            pen: 0.0,
            start: (0.0, 0.0),
            current: (0.0, 0.0),
            edges: Vec::new(),
        };

        let mut extent: Option<(f64, f64, f64, f64)> = None;
        for c in text.text.chars() {
            let Some(glyph) = face.glyph_index(c) else {
                log::trace!("no glyph for {:?} in {:?}", c, text.font);
                continue;
            };

            if let Some(rect) = face.outline_glyph(glyph, &mut outline) {
                let x_min = outline.pen + f64::from(rect.x_min) * scale;
                let x_max = outline.pen + f64::from(rect.x_max) * scale;
                // Font units point up, layout coordinates point down.
                let top = -f64::from(rect.y_max) * scale;
                let bottom = -f64::from(rect.y_min) * scale;
                extent = Some(match extent {
                    None => (x_min, top, x_max, bottom),
                    Some((l, t, r, b)) => (l.min(x_min), t.min(top), r.max(x_max), b.max(bottom)),
                });
            }

            let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            outline.pen += f64::from(advance) * scale;
        }

        let (left, top, right, bottom) = extent.unwrap_or((0.0, 0.0, outline.pen, 0.0));
        let bounds = TextBounds {
            corners: [
                placement.corner((left, bottom)),
                placement.corner((right, bottom)),
                placement.corner((right, top)),
                placement.corner((left, top)),
            ],
        };

        if let Some((painter, paint)) = target {
            fill_nonzero(painter, &outline.edges, paint);
        }

        Ok(bounds)
    }

    fn fill_nonzero(painter: &mut Painter<'_>, edges: &[Edge], paint: Paint) {
        let Some((min_y, max_y)) = edges.iter().fold(None, |acc: Option<(f64, f64)>, edge| {
            let lo = edge.from.1.min(edge.to.1);
            let hi = edge.from.1.max(edge.to.1);
            Some(acc.map_or((lo, hi), |(a, b)| (a.min(lo), b.max(hi))))
        }) else {
            return;
        };

        let height = f64::from(painter.image().height());
        let first = crate::math::floor(min_y).max(0.0) as i32;
        let last = crate::math::floor(max_y).min(height - 1.0) as i32;
        let mut crossings: Vec<(f64, i32)> = Vec::new();

        for y in first..=last {
            let sample = f64::from(y) + 0.5;
            crossings.clear();
            for edge in edges {
                let (from, to) = (edge.from, edge.to);
                let winding = if from.1 <= sample && to.1 > sample {
                    1
                } else if to.1 <= sample && from.1 > sample {
                    -1
                } else {
                    continue;
                };

                let t = (sample - from.1) / (to.1 - from.1);
                crossings.push((from.0 + t * (to.0 - from.0), winding));
            }

            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }

                // Pixels whose centers lie inside the span.
                let from = crate::math::round(pair[0].0) as i32;
                let to = crate::math::round(pair[1].0) as i32;
                for x in from..to {
                    painter.set_pixel(x, y, paint);
                }
            }
        }
    }
}

#[cfg(not(feature = "ttf"))]
mod imp {
    use super::{FontError, OutlineText, TextBounds};
    use crate::paint::{Paint, Painter};

    pub(super) fn render(
        _: &OutlineText<'_>,
        _: Option<(&mut Painter<'_>, Paint)>,
    ) -> Result<TextBounds, FontError> {
        Err(FontError::NotAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file() {
        let text = OutlineText {
            font: Path::new("/nonexistent/font.ttf"),
            size: 12.0,
            angle: 0.0,
            origin: (0, 0),
            text: "hi",
        };

        match text.bounds() {
            Err(FontError::Io { .. }) | Err(FontError::NotAvailable) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn flat_bounds() {
        let bounds = TextBounds {
            corners: [(0, 10), (20, 10), (20, 0), (0, 0)],
        };
        assert_eq!(bounds.to_array(), [0, 10, 20, 10, 20, 0, 0, 0]);
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        let text = OutlineText {
            font: Path::new(""),
            size: 1.0,
            angle: core::f64::consts::FRAC_PI_2,
            origin: (10, 10),
            text: "",
        };

        // Along the baseline becomes straight up.
        assert_eq!(Placement::new(&text).corner((5.0, 0.0)), (10, 5));
    }
}
