// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Lines, rectangles, polygons and arcs.
use bitflags::bitflags;

use crate::math;
use crate::paint::{Paint, Painter};

bitflags! {
    /// How [`Painter::filled_arc`] closes and fills an arc.
    ///
    /// The empty set draws a filled pie slice.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArcStyle: u32 {
        /// Connect the end points directly instead of through the center.
        const CHORD = 1;
        /// Only draw the outline.
        const NO_FILL = 2;
        /// With `NO_FILL`, also draw the edges to the center.
        const EDGED = 4;
    }
}

impl ArcStyle {
    /// A filled slice bounded by the arc and two radii.
    pub const PIE: Self = Self::empty();
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Clip a line against `0..=max` along its first coordinate, moving the other along the line.
///
/// Returns `false` if the line lies entirely outside.
fn clip_1d(x0: &mut i64, y0: &mut i64, x1: &mut i64, y1: &mut i64, max: i64) -> bool {
    let slope = |x0: i64, y0: i64, x1: i64, y1: i64| (y1 - y0) as f64 / (x1 - x0) as f64;

    if *x0 < 0 {
        if *x1 < 0 {
            return false;
        }

        let m = slope(*x0, *y0, *x1, *y1);
        *y0 = (*y0 as f64 - m * *x0 as f64) as i64;
        *x0 = 0;
        if *x1 > max {
            *y1 = (*y1 as f64 + m * (max - *x1) as f64) as i64;
            *x1 = max;
        }

        return true;
    }

    if *x0 > max {
        if *x1 > max {
            return false;
        }

        let m = slope(*x0, *y0, *x1, *y1);
        *y0 = (*y0 as f64 + m * (max - *x0) as f64) as i64;
        *x0 = max;
        if *x1 < 0 {
            *y1 = (*y1 as f64 - m * *x1 as f64) as i64;
            *x1 = 0;
        }

        return true;
    }

    if *x1 > max {
        let m = slope(*x0, *y0, *x1, *y1);
        *y1 = (*y1 as f64 + m * (max - *x1) as f64) as i64;
        *x1 = max;
    } else if *x1 < 0 {
        let m = slope(*x0, *y0, *x1, *y1);
        *y1 = (*y1 as f64 - m * *x1 as f64) as i64;
        *x1 = 0;
    }

    true
}

/// The number of pixels across a thick line, measured along the minor axis.
fn stroke_width(thickness: i64, projection: f64) -> i64 {
    if projection == 0.0 {
        1
    } else {
        ((thickness as f64 / projection) as i64).max(1)
    }
}

impl Painter<'_> {
    /// A line between two points, inclusive, honoring the line thickness of the image.
    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), paint: Paint) {
        let (mut x1, mut y1) = (i64::from(from.0), i64::from(from.1));
        let (mut x2, mut y2) = (i64::from(to.0), i64::from(to.1));
        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());

        if !clip_1d(&mut x1, &mut y1, &mut x2, &mut y2, width - 1) {
            return;
        }

        if !clip_1d(&mut y1, &mut x1, &mut y2, &mut x2, height - 1) {
            return;
        }

        let thickness = i64::from(self.image.thickness());
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();

        if dy <= dx {
            // Mostly horizontal, thickness extends vertically.
            let wid = if dx == 0 && dy == 0 {
                1
            } else {
                stroke_width(thickness, math::cos(math::atan2(dy as f64, dx as f64)))
            };

            let mut d = 2 * dy - dx;
            let (incr1, incr2) = (2 * dy, 2 * (dy - dx));
            let (mut x, mut y, ydir, xend) = if x1 > x2 {
                (x2, y2, -1, x1)
            } else {
                (x1, y1, 1, x2)
            };

            let step = if (y2 - y1) * ydir > 0 { 1 } else { -1 };
            self.vertical_span(x, y, wid, paint);
            while x < xend {
                x += 1;
                if d < 0 {
                    d += incr1;
                } else {
                    y += step;
                    d += incr2;
                }

                self.vertical_span(x, y, wid, paint);
            }
        } else {
            // Mostly vertical, thickness extends horizontally.
            let wid = stroke_width(thickness, math::sin(math::atan2(dy as f64, dx as f64)));

            let mut d = 2 * dx - dy;
            let (incr1, incr2) = (2 * dx, 2 * (dx - dy));
            let (mut x, mut y, xdir, yend) = if y1 > y2 {
                (x2, y2, -1, y1)
            } else {
                (x1, y1, 1, y2)
            };

            let step = if (x2 - x1) * xdir > 0 { 1 } else { -1 };
            self.horizontal_span(x, y, wid, paint);
            while y < yend {
                y += 1;
                if d < 0 {
                    d += incr1;
                } else {
                    x += step;
                    d += incr2;
                }

                self.horizontal_span(x, y, wid, paint);
            }
        }
    }

    fn vertical_span(&mut self, x: i64, y: i64, wid: i64, paint: Paint) {
        let start = (y - wid / 2).max(0);
        let end = (y - wid / 2 + wid).min(i64::from(self.image.height()));
        for w in start..end {
            self.set_pixel(x as i32, w as i32, paint);
        }
    }

    fn horizontal_span(&mut self, x: i64, y: i64, wid: i64, paint: Paint) {
        let start = (x - wid / 2).max(0);
        let end = (x - wid / 2 + wid).min(i64::from(self.image.width()));
        for w in start..end {
            self.set_pixel(w as i32, y as i32, paint);
        }
    }

    /// Connect consecutive points with lines.
    pub fn polyline(&mut self, points: &[(i32, i32)], paint: Paint) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], paint);
        }
    }

    /// The outline of a rectangle given by its top-left and bottom-right corners.
    pub fn rectangle(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), paint: Paint) {
        let ((x1, y1), (x2, y2)) = (top_left, bottom_right);
        self.line((x1, y1), (x2, y1), paint);
        if y2 != y1 {
            self.line((x1, y2), (x2, y2), paint);
        }

        // The sides, without the corners already drawn.
        if i64::from(y2) - i64::from(y1) >= 2 {
            self.line((x1, y1 + 1), (x1, y2 - 1), paint);
            if x2 != x1 {
                self.line((x2, y1 + 1), (x2, y2 - 1), paint);
            }
        }
    }

    /// Fill all pixels between the top-left and bottom-right corners, inclusive.
    pub fn filled_rectangle(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), paint: Paint) {
        let x1 = top_left.0.max(0);
        let y1 = top_left.1.max(0);
        let x2 = bottom_right.0.min(self.image.width() as i32 - 1);
        let y2 = bottom_right.1.min(self.image.height() as i32 - 1);

        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set_pixel(x, y, paint);
            }
        }
    }

    /// The closed outline through all points.
    ///
    /// A single point draws a dot, two points a line and no points nothing.
    pub fn polygon(&mut self, points: &[(i32, i32)], paint: Paint) {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return;
        };

        self.line(first, last, paint);
        self.polyline(points, paint);
    }

    /// Fill the interior of a polygon by the even-odd rule.
    ///
    /// Edges are half-open in the vertical direction so that shared vertices are counted once,
    /// only the bottom-most row closes the lower edges.
    pub fn filled_polygon(&mut self, points: &[(i32, i32)], paint: Paint) {
        let Some(&(_, first_y)) = points.first() else {
            return;
        };

        let (mut min_y, mut max_y) = (first_y, first_y);
        for &(_, y) in points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let top = i64::from(min_y.max(0));
        let bottom = i64::from(max_y.min(self.image.height() as i32 - 1));
        let max_y = i64::from(max_y);
        let mut crossings = Vec::with_capacity(points.len());

        for y in top..=bottom {
            crossings.clear();
            for (idx, &end) in points.iter().enumerate() {
                let start = points[if idx == 0 { points.len() - 1 } else { idx - 1 }];
                let ((x1, y1), (x2, y2)) = match start.1.cmp(&end.1) {
                    core::cmp::Ordering::Less => (start, end),
                    core::cmp::Ordering::Greater => (end, start),
                    core::cmp::Ordering::Equal => continue,
                };

                let (x1, y1) = (i64::from(x1), i64::from(y1));
                let (x2, y2) = (i64::from(x2), i64::from(y2));
                let inside = y >= y1 && y < y2;
                let closing = y == max_y && y > y1 && y <= y2;
                if inside || closing {
                    // Edges may span the whole coordinate range, the product needs more than 64 bits.
                    let offset = (y - y1) as f64 * (x2 - x1) as f64 / (y2 - y1) as f64;
                    crossings.push((offset + 0.5 + x1 as f64) as i64);
                }
            }

            crossings.sort_unstable();
            for span in crossings.chunks_exact(2) {
                let from = span[0].max(0);
                let to = span[1].min(i64::from(self.image.width()) - 1);
                for x in from..=to {
                    self.set_pixel(x as i32, y as i32, paint);
                }
            }
        }
    }

    /// The outline of a partial ellipse, angles in degrees clockwise from the positive x axis.
    pub fn arc(&mut self, center: (i32, i32), size: (i32, i32), start: i32, end: i32, paint: Paint) {
        self.filled_arc(center, size, start, end, paint, ArcStyle::NO_FILL);
    }

    /// A partial ellipse with `size` as its full width and height.
    ///
    /// The arc is traced in whole degrees from `start` to `end`. A start equal to the end, modulo
    /// a full turn, draws the full ellipse.
    pub fn filled_arc(
        &mut self,
        center: (i32, i32),
        size: (i32, i32),
        start: i32,
        end: i32,
        paint: Paint,
        style: ArcStyle,
    ) {
        let (start, end) = normalize_angles(i64::from(start), i64::from(end));
        let (cx, cy) = (i64::from(center.0), i64::from(center.1));
        let (w, h) = (i64::from(size.0), i64::from(size.1));
        let table = math::trig_table();

        let point = |deg: i64| {
            let (cos, sin) = table[deg.rem_euclid(360) as usize];
            let x = i64::from(cos) * w / 2048 + cx;
            let y = i64::from(sin) * h / 2048 + cy;
            (saturate(x), saturate(y))
        };

        let center = (saturate(cx), saturate(cy));
        let first = point(start);
        let mut last = first;

        for deg in start + 1..=end {
            let next = point(deg);
            if !style.contains(ArcStyle::CHORD) {
                if style.contains(ArcStyle::NO_FILL) {
                    self.line(last, next, paint);
                } else {
                    self.filled_polygon(&[last, next, center], paint);
                }
            }

            last = next;
        }

        let edged = style.contains(ArcStyle::NO_FILL | ArcStyle::EDGED);
        if edged {
            self.line(center, last, paint);
            self.line(center, first, paint);
        }

        if style.contains(ArcStyle::CHORD) {
            if style.contains(ArcStyle::NO_FILL) {
                self.line(first, last, paint);
            } else {
                self.filled_polygon(&[first, last, center], paint);
            }
        }
    }

    /// A filled ellipse with `size` as its full width and height.
    pub fn filled_ellipse(&mut self, center: (i32, i32), size: (i32, i32), paint: Paint) {
        self.filled_arc(center, size, 0, 360, paint, ArcStyle::PIE);
    }

    /// The outline of an ellipse.
    pub fn ellipse(&mut self, center: (i32, i32), size: (i32, i32), paint: Paint) {
        self.arc(center, size, 0, 360, paint);
    }
}

/// Bring angles into a range with `0 <= start <= end`, both in degrees.
fn normalize_angles(mut start: i64, mut end: i64) -> (i64, i64) {
    if start.rem_euclid(360) == end.rem_euclid(360) {
        return (0, 360);
    }

    if start > 360 {
        start %= 360;
    }

    if end > 360 {
        end %= 360;
    }

    if start < 0 {
        start = start.rem_euclid(360);
    }

    if end < start {
        end += (start - end + 359) / 360 * 360;
    }

    if start == end {
        (0, 360)
    } else {
        (start, end)
    }
}
