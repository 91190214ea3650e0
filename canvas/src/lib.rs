//! A canvas model over GD-style raster images.
//!
//! A [`Canvas`] owns an image, a logical coordinate system and the brush and tile images used by
//! special inks. Canvases are created from a [`Request`], drawn on in logical coordinates, and
//! written to or read from files in the GD family of formats, PNG and JPEG.
//!
//! # Usage
//!
//! Creating a blank palette canvas and drawing on it:
//!
//! ```
//! use gd_canvas::{Canvas, Request};
//!
//! let canvas = Canvas::create(Request::Blank { width: 64, height: 32, true_color: false })?;
//! let white = canvas.color_allocate(255, 255, 255);
//! let red = canvas.color_allocate(255, 0, 0);
//!
//! canvas.rectangle((0, 0), (63, 31), red, Some(white.into()))?;
//! assert_eq!(canvas.get_pixel((10, 10)), white);
//! # Ok::<(), gd_canvas::Error>(())
//! ```
//!
//! Coordinates go through the canvas transform, here flipping the y axis:
//!
//! ```
//! use gd_canvas::{Canvas, Request};
//! use gd_canvas::codec::Encoding;
//!
//! let canvas = Canvas::create(Request::Blank { width: 16, height: 16, true_color: true })?;
//! canvas.set_origin((0, 15), (1, -1))?;
//!
//! let blue = canvas.color_allocate(0, 0, 255);
//! canvas.set_pixel((2, 0), blue)?;
//! assert_eq!(canvas.image().get_pixel(2, 15), blue);
//!
//! let bytes = canvas.to_bytes(&Encoding::Gd)?;
//! let back = gd_canvas::Canvas::from_bytes(&bytes, gd_canvas::codec::Format::Gd)?;
//! assert!(canvas.compare(&back).is_empty());
//! # Ok::<(), gd_canvas::Error>(())
//! ```
#![deny(unsafe_code)]

/// The canvas resource.
mod canvas;
mod config;
mod construct;
mod copy;
/// Drawing in logical coordinates.
mod draw;
mod error;
/// Encoding and decoding.
mod serialize;
mod transform;

#[cfg(test)]
mod tests;

pub use self::canvas::{Canvas, PatternSource};
pub use self::config::Config;
pub use self::construct::{Arg, Request};
pub use self::copy::{CopyRegion, ResizeRegion};
pub use self::draw::TextRun;
pub use self::error::Error;
pub use self::serialize::Destination;
pub use self::transform::Transform;

pub mod color {
    pub use gd_raster::{Color, Paint, Rgba, ALPHA_MAX, ALPHA_OPAQUE, ALPHA_TRANSPARENT, MAX_COLORS};
}

pub mod shape {
    pub use gd_raster::{ArcStyle, Difference, Font, TextBounds, UnknownFont};
}

pub mod codec {
    pub use gd_raster::codec::{
        Capabilities, CodecError, Encoding, Format, Gd2Compression, Limits, UnknownFormat,
    };
}
