// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Raster
//!
//! Indexed and true-color raster images with the drawing model of the GD library.
//!
//! An [`Image`] either stores one palette index per pixel, with a palette of up to 256 colors, or
//! one packed ARGB word per pixel with a 7-bit alpha where `0` is opaque and `127` transparent. All
//! drawing goes through a [`Painter`] which resolves the [`Paint`] of an operation: a plain
//! color, the dash style of the image, a brush image stamped at each pixel, or a tile image
//! repeated across the plane.
//!
//! ## Usage
//!
//! ```
//! use gd_raster::{Image, Painter, Rgba};
//!
//! let mut image = Image::palette(64, 64)?;
//! let white = image.color_allocate(Rgba::rgb(255, 255, 255));
//! let red = image.color_allocate(Rgba::rgb(255, 0, 0));
//!
//! let mut painter = Painter::new(&mut image);
//! painter.filled_rectangle((0, 0), (63, 63), white.into());
//! painter.line((0, 0), (63, 63), red.into());
//!
//! assert_eq!(image.get_pixel(10, 10), red);
//! # Ok::<(), gd_raster::SizeError>(())
//! ```
//!
//! Images are written and read with [`codec::encode`] and [`codec::decode`]:
//!
//! ```
//! use gd_raster::codec::{self, Encoding, Format, Limits};
//! use gd_raster::{Image, Rgba};
//!
//! let mut image = Image::true_color(8, 8)?;
//! image.set_pixel(3, 4, gd_raster::Color::true_color(Rgba::rgb(1, 2, 3)));
//!
//! let mut file = Vec::new();
//! codec::encode(&image, &Encoding::Gd, &mut file)?;
//! let back = codec::decode(&file, Format::Gd, &Limits::default())?;
//! assert!(image.compare(&back).is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(unsafe_code)]

mod color;
mod compare;
mod copy;
mod draw;
mod fill;
mod font;
mod image;
mod math;
mod outline;
mod paint;

pub mod codec;

pub use self::color::{Color, Rgba, ALPHA_MAX, ALPHA_OPAQUE, ALPHA_TRANSPARENT, MAX_COLORS};
pub use self::compare::Difference;
pub use self::copy::{Region, ScaledRegion};
pub use self::draw::ArcStyle;
pub use self::font::{Font, UnknownFont};
pub use self::image::{Image, SizeError};
pub use self::outline::{FontError, OutlineText, TextBounds};
pub use self::paint::{Paint, Painter, Patterns};
