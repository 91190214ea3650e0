use std::path::Path;

use gd_raster::{ArcStyle, Color, Font, Image, OutlineText, Paint, TextBounds};

use crate::{Canvas, Error};

fn check_paint(image: &Image, paint: Paint) -> Result<Paint, Error> {
    if let Paint::Solid(color) = paint {
        Canvas::check_color(image, color)?;
    }

    Ok(paint)
}

/// Order two corners as top-left and bottom-right.
fn normalize(a: (i32, i32), b: (i32, i32)) -> ((i32, i32), (i32, i32)) {
    ((a.0.min(b.0), a.1.min(b.1)), (a.0.max(b.0), a.1.max(b.1)))
}

/// Outline text to draw on a canvas, positioned in logical coordinates.
#[derive(Clone, Copy, Debug)]
pub struct TextRun<'a> {
    /// Path of a TrueType or OpenType font.
    pub font: &'a Path,
    /// Size in points.
    pub size: f64,
    /// Counter-clockwise rotation in radians.
    pub angle: f64,
    /// The start of the baseline.
    pub at: (i32, i32),
    pub text: &'a str,
}

impl TextRun<'_> {
    fn physical(&self, canvas: &Canvas) -> OutlineText<'_> {
        OutlineText {
            font: self.font,
            size: self.size,
            angle: self.angle,
            origin: canvas.transform().to_physical(self.at),
            text: self.text,
        }
    }
}

/// Drawing operations, all in logical coordinates.
impl Canvas {
    /// Run a drawing operation after validating its paint.
    fn draw(&self, paint: Paint, f: impl FnOnce(&mut gd_raster::Painter<'_>, &crate::Transform, Paint)) -> Result<(), Error> {
        check_paint(&self.image(), paint)?;
        self.paint(|painter, transform| f(painter, transform, paint));
        Ok(())
    }

    pub fn line(&self, from: (i32, i32), to: (i32, i32), paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            painter.line(t.to_physical(from), t.to_physical(to), paint)
        })
    }

    /// Connect consecutive points with lines.
    pub fn lines(&self, points: &[(i32, i32)], paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            for pair in points.windows(2) {
                painter.line(t.to_physical(pair[0]), t.to_physical(pair[1]), paint);
            }
        })
    }

    /// A closed polygon outline, with its interior filled first if `fill` is given.
    ///
    /// Fewer than three points draw a degenerate shape: nothing, a dot or a line.
    pub fn polygon(&self, points: &[(i32, i32)], paint: impl Into<Paint>, fill: Option<Paint>) -> Result<(), Error> {
        if let Some(fill) = fill {
            self.filled_polygon(points, fill)?;
        }

        self.draw(paint.into(), |painter, t, paint| {
            let mut physical = Vec::with_capacity(points.len());
            physical.extend(points.iter().map(|&p| t.to_physical(p)));
            painter.polygon(&physical, paint)
        })
    }

    pub fn filled_polygon(&self, points: &[(i32, i32)], paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            let mut physical = Vec::with_capacity(points.len());
            physical.extend(points.iter().map(|&p| t.to_physical(p)));
            painter.filled_polygon(&physical, paint)
        })
    }

    /// A rectangle outline between two opposite corners, filled first if `fill` is given.
    pub fn rectangle(&self, a: (i32, i32), b: (i32, i32), paint: impl Into<Paint>, fill: Option<Paint>) -> Result<(), Error> {
        if let Some(fill) = fill {
            self.filled_rectangle(a, b, fill)?;
        }

        self.draw(paint.into(), |painter, t, paint| {
            let (top_left, bottom_right) = normalize(t.to_physical(a), t.to_physical(b));
            painter.rectangle(top_left, bottom_right, paint)
        })
    }

    pub fn filled_rectangle(&self, a: (i32, i32), b: (i32, i32), paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            let (top_left, bottom_right) = normalize(t.to_physical(a), t.to_physical(b));
            painter.filled_rectangle(top_left, bottom_right, paint)
        })
    }

    /// A partial ellipse outline, angles in degrees. A start past the end is swapped.
    pub fn arc(&self, center: (i32, i32), size: (i32, i32), start: i32, end: i32, paint: impl Into<Paint>) -> Result<(), Error> {
        let (start, end) = (start.min(end), start.max(end));
        self.draw(paint.into(), |painter, t, paint| {
            let size = (t.to_physical_w(size.0), t.to_physical_h(size.1));
            painter.arc(t.to_physical(center), size, start, end, paint)
        })
    }

    pub fn filled_arc(
        &self,
        center: (i32, i32),
        size: (i32, i32),
        start: i32,
        end: i32,
        paint: impl Into<Paint>,
        style: ArcStyle,
    ) -> Result<(), Error> {
        let (start, end) = (start.min(end), start.max(end));
        self.draw(paint.into(), |painter, t, paint| {
            let size = (t.to_physical_w(size.0), t.to_physical_h(size.1));
            painter.filled_arc(t.to_physical(center), size, start, end, paint, style)
        })
    }

    pub fn filled_ellipse(&self, center: (i32, i32), size: (i32, i32), paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            let size = (t.to_physical_w(size.0), t.to_physical_h(size.1));
            painter.filled_ellipse(t.to_physical(center), size, paint)
        })
    }

    /// Flood fill the area of the color at `at`.
    pub fn fill(&self, at: (i32, i32), paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            let (x, y) = t.to_physical(at);
            painter.fill(x, y, paint)
        })
    }

    /// Flood fill up to pixels of the `border` color.
    pub fn fill_to_border(&self, at: (i32, i32), border: Color, paint: impl Into<Paint>) -> Result<(), Error> {
        Canvas::check_color(&self.image(), border)?;
        self.draw(paint.into(), |painter, t, paint| {
            let (x, y) = t.to_physical(at);
            painter.fill_to_border(x, y, border, paint)
        })
    }

    pub fn char(&self, font: Font, at: (i32, i32), c: char, paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| painter.char(font, t.to_physical(at), c, paint))
    }

    /// A character rotated by 90 degrees, reading upwards.
    pub fn char_up(&self, font: Font, at: (i32, i32), c: char, paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| painter.char_up(font, t.to_physical(at), c, paint))
    }

    pub fn string(&self, font: Font, at: (i32, i32), text: &str, paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| painter.string(font, t.to_physical(at), text, paint))
    }

    pub fn string_up(&self, font: Font, at: (i32, i32), text: &str, paint: impl Into<Paint>) -> Result<(), Error> {
        self.draw(paint.into(), |painter, t, paint| {
            painter.string_up(font, t.to_physical(at), text, paint)
        })
    }

    /// Draw outline text, returning its bounds in pixels.
    pub fn string_ttf(&self, run: &TextRun<'_>, paint: impl Into<Paint>) -> Result<TextBounds, Error> {
        let paint = check_paint(&self.image(), paint.into())?;
        let text = run.physical(self);
        let bounds = self.paint(|painter, _| painter.outline_text(&text, paint))?;
        Ok(bounds)
    }

    /// Same as [`Canvas::string_ttf`], the name of the FreeType entry point.
    pub fn string_ft(&self, run: &TextRun<'_>, paint: impl Into<Paint>) -> Result<TextBounds, Error> {
        self.string_ttf(run, paint)
    }

    /// The bounds outline text would have, without drawing it.
    pub fn string_bounds(&self, run: &TextRun<'_>) -> Result<TextBounds, Error> {
        Ok(run.physical(self).bounds()?)
    }
}
