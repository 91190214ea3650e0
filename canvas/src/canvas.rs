use core::cell::{Ref, RefCell};
use core::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gd_raster::codec::Format;
use gd_raster::{Color, Difference, Image, Painter, Patterns, Rgba, MAX_COLORS};

use crate::construct::Request;
use crate::transform::Transform;
use crate::Error;

/// An image together with its coordinate system and the patterns used by special inks.
///
/// A `Canvas` is a shared handle: cloning it yields another handle to the same image. This is how
/// a canvas serves as the brush or tile of other canvases while remaining drawable itself. The
/// image is released when the last handle is dropped.
#[derive(Clone)]
pub struct Canvas {
    inner: Rc<RefCell<State>>,
}

pub(crate) struct State {
    pub(crate) image: Image,
    pub(crate) transform: Transform,
    brush: Option<Canvas>,
    tile: Option<Canvas>,
}

/// Where a brush or tile comes from.
#[derive(Clone, Copy, Debug)]
pub enum PatternSource<'a> {
    /// Share an existing canvas.
    Canvas(&'a Canvas),
    /// Decode an image file, with the format from the extension if not given.
    File {
        path: &'a Path,
        format: Option<Format>,
    },
}

impl<'a> From<&'a Canvas> for PatternSource<'a> {
    fn from(canvas: &'a Canvas) -> Self {
        PatternSource::Canvas(canvas)
    }
}

impl<'a> From<&'a Path> for PatternSource<'a> {
    fn from(path: &'a Path) -> Self {
        PatternSource::File { path, format: None }
    }
}

#[derive(Clone, Copy)]
enum Pattern {
    Brush,
    Tile,
}

impl Canvas {
    pub(crate) fn from_image(image: Image) -> Self {
        Canvas {
            inner: Rc::new(RefCell::new(State {
                image,
                transform: Transform::IDENTITY,
                brush: None,
                tile: None,
            })),
        }
    }

    /// Whether two handles refer to the same canvas.
    pub fn ptr_eq(&self, other: &Canvas) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read access to the underlying image.
    pub fn image(&self) -> Ref<'_, Image> {
        Ref::map(self.inner.borrow(), |state| &state.image)
    }

    pub(crate) fn state(&self) -> Ref<'_, State> {
        self.inner.borrow()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Draw with the brush and tile of this canvas.
    pub(crate) fn paint<R>(&self, f: impl FnOnce(&mut Painter<'_>, &Transform) -> R) -> R {
        let mut state = self.inner.borrow_mut();
        let State {
            image,
            transform,
            brush,
            tile,
        } = &mut *state;

        // Neither can be this canvas, assignments that would form a cycle are rejected.
        let brush = brush.as_ref().map(|canvas| canvas.inner.borrow());
        let tile = tile.as_ref().map(|canvas| canvas.inner.borrow());
        let patterns = Patterns {
            brush: brush.as_ref().map(|state| &state.image),
            tile: tile.as_ref().map(|state| &state.image),
        };

        let mut painter = Painter::with_patterns(image, patterns);
        f(&mut painter, transform)
    }

    /// Check that a color can be written into this canvas.
    pub(crate) fn check_color(image: &Image, color: Color) -> Result<Color, Error> {
        if image.is_true_color() || (0..MAX_COLORS as i32).contains(&color.get()) {
            Ok(color)
        } else {
            Err(Error::ColorOutOfRange(color.get()))
        }
    }

    pub fn set_pixel(&self, at: (i32, i32), color: Color) -> Result<(), Error> {
        self.with_state(|state| {
            let color = Self::check_color(&state.image, color)?;
            let (x, y) = state.transform.to_physical(at);
            state.image.set_pixel(x, y, color);
            Ok(())
        })
    }

    /// The color at a point, `0` outside of the image.
    pub fn get_pixel(&self, at: (i32, i32)) -> Color {
        let state = self.state();
        let (x, y) = state.transform.to_physical(at);
        state.image.get_pixel(x, y)
    }

    pub fn bounds_safe(&self, at: (i32, i32)) -> bool {
        let state = self.state();
        let (x, y) = state.transform.to_physical(at);
        state.image.bounds_safe(x, y)
    }

    /// The image stamped by [`Paint::Brushed`](crate::color::Paint::Brushed).
    pub fn set_brush<'s>(&self, source: impl Into<PatternSource<'s>>) -> Result<(), Error> {
        self.set_pattern(Pattern::Brush, source.into())
    }

    /// The image repeated by [`Paint::Tiled`](crate::color::Paint::Tiled).
    pub fn set_tile<'s>(&self, source: impl Into<PatternSource<'s>>) -> Result<(), Error> {
        self.set_pattern(Pattern::Tile, source.into())
    }

    pub fn brush(&self) -> Option<Canvas> {
        self.state().brush.clone()
    }

    pub fn tile(&self) -> Option<Canvas> {
        self.state().tile.clone()
    }

    fn set_pattern(&self, which: Pattern, source: PatternSource<'_>) -> Result<(), Error> {
        let canvas = match source {
            PatternSource::Canvas(canvas) => {
                if canvas.reaches(self) {
                    return Err(Error::SelfReference);
                }
                canvas.clone()
            }
            PatternSource::File { path, format } => Canvas::create(Request::Decode {
                path: PathBuf::from(path),
                format,
            })?,
        };

        let (width, height) = canvas.size();
        let previous = self.with_state(|state| {
            let slot = match which {
                Pattern::Brush => &mut state.brush,
                Pattern::Tile => &mut state.tile,
            };
            slot.replace(canvas)
        });

        match which {
            Pattern::Brush => log::trace!("brush set to {}x{} image", width, height),
            Pattern::Tile => log::trace!("tile set to {}x{} image", width, height),
        }

        // Released only after the new one is installed, it may be the same canvas.
        drop(previous);
        Ok(())
    }

    /// Whether `target` is this canvas or one of its patterns, transitively.
    fn reaches(&self, target: &Canvas) -> bool {
        let mut pending = vec![self.clone()];
        let mut seen: Vec<Canvas> = Vec::new();

        while let Some(canvas) = pending.pop() {
            if canvas.ptr_eq(target) {
                return true;
            }

            if seen.iter().any(|other| other.ptr_eq(&canvas)) {
                continue;
            }

            let state = canvas.state();
            pending.extend(state.brush.iter().cloned());
            pending.extend(state.tile.iter().cloned());
            drop(state);
            seen.push(canvas);
        }

        false
    }

    /// The dash pattern of [`Paint::Styled`](crate::color::Paint::Styled), `None` entries skip.
    pub fn set_style(&self, style: Vec<Option<Color>>) -> Result<(), Error> {
        if style.is_empty() {
            return Err(Error::EmptyStyle);
        }

        self.with_state(|state| {
            for &color in style.iter().flatten() {
                Self::check_color(&state.image, color)?;
            }

            log::trace!("style of {} entries", style.len());
            state.image.set_style(style);
            Ok(())
        })
    }

    pub fn color_allocate(&self, r: u8, g: u8, b: u8) -> Color {
        self.color_allocate_alpha(r, g, b, 0)
    }

    pub fn color_allocate_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Color {
        self.with_state(|state| state.image.color_allocate(Rgba::new(r, g, b, a)))
    }

    pub fn color_closest(&self, r: u8, g: u8, b: u8) -> Color {
        self.color_closest_alpha(r, g, b, 0)
    }

    pub fn color_closest_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Color {
        self.image().color_closest(Rgba::new(r, g, b, a))
    }

    /// Closest by hue, whiteness and blackness.
    pub fn color_closest_hwb(&self, r: u8, g: u8, b: u8) -> Color {
        self.image().color_closest_hwb(Rgba::rgb(r, g, b))
    }

    pub fn color_exact(&self, r: u8, g: u8, b: u8) -> Color {
        self.color_exact_alpha(r, g, b, 0)
    }

    pub fn color_exact_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Color {
        self.image().color_exact(Rgba::new(r, g, b, a))
    }

    /// The exact color, a new one, or the closest one, in that order.
    pub fn color_resolve(&self, r: u8, g: u8, b: u8) -> Color {
        self.color_resolve_alpha(r, g, b, 0)
    }

    pub fn color_resolve_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Color {
        self.with_state(|state| state.image.color_resolve(Rgba::new(r, g, b, a)))
    }

    pub fn color_deallocate(&self, color: Color) -> Result<(), Error> {
        self.with_state(|state| {
            let color = Self::check_color(&state.image, color)?;
            state.image.color_deallocate(color);
            Ok(())
        })
    }

    pub fn color_components(&self, color: Color) -> Result<Rgba, Error> {
        let image = self.image();
        let color = Self::check_color(&image, color)?;
        Ok(image.rgba(color))
    }

    pub fn red(&self, color: Color) -> Result<u8, Error> {
        Ok(self.color_components(color)?.r)
    }

    pub fn green(&self, color: Color) -> Result<u8, Error> {
        Ok(self.color_components(color)?.g)
    }

    pub fn blue(&self, color: Color) -> Result<u8, Error> {
        Ok(self.color_components(color)?.b)
    }

    pub fn alpha(&self, color: Color) -> Result<u8, Error> {
        Ok(self.color_components(color)?.a)
    }

    pub fn colors_total(&self) -> usize {
        self.image().colors_total()
    }

    /// Declare the transparent color, [`Color::NONE`] for none.
    pub fn color_transparent(&self, color: Color) -> Result<(), Error> {
        self.with_state(|state| {
            if !color.is_none() {
                Self::check_color(&state.image, color)?;
            }
            state.image.set_transparent(color);
            Ok(())
        })
    }

    pub fn transparent(&self) -> Color {
        self.image().transparent()
    }

    pub fn interlace(&self, interlace: bool) {
        self.with_state(|state| state.image.set_interlace(interlace));
    }

    pub fn is_interlaced(&self) -> bool {
        self.image().is_interlaced()
    }

    pub fn set_thickness(&self, thickness: u32) {
        self.with_state(|state| state.image.set_thickness(thickness));
    }

    pub fn set_alpha_blending(&self, blending: bool) {
        self.with_state(|state| state.image.set_alpha_blending(blending));
    }

    /// Physical size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.image().size()
    }

    pub fn is_true_color(&self) -> bool {
        self.image().is_true_color()
    }

    /// Replace the coordinate system. Both scales must be non-zero.
    pub fn set_origin(&self, origin: (i32, i32), scale: (i32, i32)) -> Result<(), Error> {
        let transform = Transform::new(origin.0, origin.1, scale.0, scale.1)?;
        self.with_state(|state| state.transform = transform);
        Ok(())
    }

    pub fn transform(&self) -> Transform {
        self.state().transform
    }

    /// Compare the images, an empty set if they are identical.
    pub fn compare(&self, other: &Canvas) -> Difference {
        if self.ptr_eq(other) {
            return Difference::empty();
        }

        self.image().compare(&other.image())
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(state) = self.inner.try_borrow() else {
            return f.debug_struct("Canvas").finish_non_exhaustive();
        };

        f.debug_struct("Canvas")
            .field("image", &state.image)
            .field("transform", &state.transform)
            .field("brush", &state.brush.is_some())
            .field("tile", &state.tile.is_some())
            .finish()
    }
}
