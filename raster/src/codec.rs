// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Reading and writing images in file formats.
//!
//! The GD, GD2, WBMP, XBM and XPM formats are implemented here. PNG and JPEG go through the
//! `image` crate and, like compressed GD2 chunks, depend on cargo features.
use core::fmt;
use core::str::FromStr;
use std::io::{self, Write};
use std::path::Path;

use crate::color::Color;
use crate::image::Image;

mod cursor;
mod gd;
mod gd2;
#[cfg(feature = "jpeg")]
mod jpeg;
#[cfg(feature = "png")]
mod png;
mod wbmp;
mod xbm;
mod xpm;

pub(crate) use cursor::Cursor;

/// The file formats we know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Png,
    Jpeg,
    Gd,
    Gd2,
    Wbmp,
    Xbm,
    Xpm,
}

/// How to encode an image, with the options of each format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Png,
    /// Quality from `0` to `100`, the encoder default when absent.
    Jpeg { quality: Option<u8> },
    Gd,
    /// Chunk size in pixels, clamped to `64..=4096`, and whether chunks are compressed.
    Gd2 {
        chunk_size: Option<u16>,
        compression: Gd2Compression,
    },
    /// Pixels of the foreground color become black, all others white.
    Wbmp { foreground: Color },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gd2Compression {
    Raw,
    #[default]
    Compressed,
}

/// A format name or file extension we do not recognize.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported file type {0:?}")]
pub struct UnknownFormat(pub String);

/// An error while encoding or decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The format was not compiled in.
    #[error("{0} support is not available")]
    NotAvailable(Format),
    /// The format can only be read.
    #[error("{0} images can not be written")]
    DecodeOnly(Format),
    /// The data does not describe a valid image.
    #[error("corrupt or invalid image file: {0}")]
    Corrupt(&'static str),
    /// The image is larger than the configured limits allow.
    #[error("image of {width}x{height} pixels exceeds the decoding limits")]
    LimitsExceeded { width: u64, height: u64 },
    #[error("encoder failed: {0}")]
    Encoder(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bounds on decoded images, checked against headers before any pixel buffer is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Limits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_pixels: u64,
}

/// The formats and modes compiled into this build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub true_color: bool,
    pub png: bool,
    pub jpeg: bool,
    /// Compressed GD2 chunks, raw chunks are always available.
    pub gd2_compressed: bool,
    pub outline_fonts: bool,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Png,
        Format::Jpeg,
        Format::Gd,
        Format::Gd2,
        Format::Wbmp,
        Format::Xbm,
        Format::Xpm,
    ];

    /// Look up a format by a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Some(match ext.as_str() {
            "png" => Format::Png,
            "jpeg" | "jpg" | "jfif" => Format::Jpeg,
            "gd" => Format::Gd,
            "gd2" => Format::Gd2,
            "wbmp" => Format::Wbmp,
            "xbm" => Format::Xbm,
            "xpm" => Format::Xpm,
            _ => return None,
        })
    }

    /// The format named by the extension of a path.
    ///
    /// Returns `Ok(None)` if the path has no extension at all.
    pub fn from_path(path: &Path) -> Result<Option<Self>, UnknownFormat> {
        let Some(ext) = path.extension() else {
            return Ok(None);
        };

        let ext = ext.to_string_lossy();
        Format::from_extension(&ext)
            .map(Some)
            .ok_or_else(|| UnknownFormat(ext.into_owned()))
    }

    /// The customary extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Gd => "gd",
            Format::Gd2 => "gd2",
            Format::Wbmp => "wbmp",
            Format::Xbm => "xbm",
            Format::Xpm => "xpm",
        }
    }

    pub const fn can_encode(self) -> bool {
        !matches!(self, Format::Xbm | Format::Xpm)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Gd => "GD",
            Format::Gd2 => "GD2",
            Format::Wbmp => "WBMP",
            Format::Xbm => "XBM",
            Format::Xpm => "XPM",
        };

        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.strip_prefix('.').unwrap_or(tag);
        Format::from_extension(tag).ok_or_else(|| UnknownFormat(tag.to_owned()))
    }
}

impl Encoding {
    /// The default encoding of a format, `None` for formats that can only be read.
    pub fn default_for(format: Format) -> Option<Self> {
        Some(match format {
            Format::Png => Encoding::Png,
            Format::Jpeg => Encoding::Jpeg { quality: None },
            Format::Gd => Encoding::Gd,
            Format::Gd2 => Encoding::Gd2 {
                chunk_size: None,
                compression: Gd2Compression::default(),
            },
            Format::Wbmp => Encoding::Wbmp {
                foreground: Color(0),
            },
            Format::Xbm | Format::Xpm => return None,
        })
    }

    pub fn format(&self) -> Format {
        match self {
            Encoding::Png => Format::Png,
            Encoding::Jpeg { .. } => Format::Jpeg,
            Encoding::Gd => Format::Gd,
            Encoding::Gd2 { .. } => Format::Gd2,
            Encoding::Wbmp { .. } => Format::Wbmp,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_width: 1 << 16,
            max_height: 1 << 16,
            max_pixels: 1 << 28,
        }
    }
}

impl Limits {
    /// No bounds beyond what a buffer can address.
    pub const fn none() -> Self {
        Limits {
            max_width: u32::MAX,
            max_height: u32::MAX,
            max_pixels: u64::MAX,
        }
    }

    /// Validate the dimensions from a header.
    pub(crate) fn check(&self, width: u64, height: u64) -> Result<(u32, u32), CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::Corrupt("image has no pixels"));
        }

        let exceeded = CodecError::LimitsExceeded { width, height };
        let w = u32::try_from(width).map_err(|_| CodecError::LimitsExceeded { width, height })?;
        let h = u32::try_from(height).map_err(|_| CodecError::LimitsExceeded { width, height })?;
        if w > self.max_width || h > self.max_height || width * height > self.max_pixels {
            return Err(exceeded);
        }

        Ok((w, h))
    }
}

impl Capabilities {
    /// Everything enabled by the cargo features of this build.
    pub const fn compiled() -> Self {
        Capabilities {
            true_color: true,
            png: cfg!(feature = "png"),
            jpeg: cfg!(feature = "jpeg"),
            gd2_compressed: cfg!(feature = "gd2"),
            outline_fonts: cfg!(feature = "ttf"),
        }
    }

    /// Whether data in a format can be read at all.
    ///
    /// For GD2 this only covers raw chunks, compressed files are detected while decoding.
    pub fn decodes(&self, format: Format) -> bool {
        match format {
            Format::Png => self.png,
            Format::Jpeg => self.jpeg,
            _ => true,
        }
    }

    pub fn encodes(&self, encoding: &Encoding) -> bool {
        match encoding {
            Encoding::Png => self.png,
            Encoding::Jpeg { .. } => self.jpeg,
            Encoding::Gd2 {
                compression: Gd2Compression::Compressed,
                ..
            } => self.gd2_compressed,
            _ => true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::compiled()
    }
}

/// Write an image in the chosen encoding.
pub fn encode(image: &Image, encoding: &Encoding, out: &mut dyn Write) -> Result<(), CodecError> {
    log::debug!("encoding {:?} as {:?}", image, encoding);
    match *encoding {
        Encoding::Gd => gd::encode(image, out),
        Encoding::Gd2 {
            chunk_size,
            compression,
        } => gd2::encode(image, chunk_size, compression, out),
        Encoding::Wbmp { foreground } => wbmp::encode(image, foreground, out),
        #[cfg(feature = "png")]
        Encoding::Png => png::encode(image, out),
        #[cfg(not(feature = "png"))]
        Encoding::Png => Err(CodecError::NotAvailable(Format::Png)),
        #[cfg(feature = "jpeg")]
        Encoding::Jpeg { quality } => jpeg::encode(image, quality, out),
        #[cfg(not(feature = "jpeg"))]
        Encoding::Jpeg { .. } => Err(CodecError::NotAvailable(Format::Jpeg)),
    }
}

/// Read an image from the complete contents of a file.
pub fn decode(data: &[u8], format: Format, limits: &Limits) -> Result<Image, CodecError> {
    log::debug!("decoding {} bytes as {}", data.len(), format);
    match format {
        Format::Gd => gd::decode(data, limits),
        Format::Gd2 => gd2::decode(data, limits),
        Format::Wbmp => wbmp::decode(data, limits),
        Format::Xbm => xbm::decode(data, limits),
        Format::Xpm => xpm::decode(data, limits),
        #[cfg(feature = "png")]
        Format::Png => png::decode(data, limits),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::decode(data, limits),
        #[cfg(any(not(feature = "png"), not(feature = "jpeg")))]
        other => Err(CodecError::NotAvailable(other)),
    }
}

/// Allocate the buffer for a decoded image whose dimensions passed [`Limits::check`].
pub(crate) fn allocate(width: u32, height: u32, true_color: bool) -> Result<Image, CodecError> {
    let image = if true_color {
        Image::true_color(width, height)
    } else {
        Image::palette(width, height)
    };

    image.map_err(|_| CodecError::LimitsExceeded {
        width: width.into(),
        height: height.into(),
    })
}

/// Decoder limits of the `image` crate matching ours.
#[cfg(any(feature = "png", feature = "jpeg"))]
fn reader_limits(limits: &Limits) -> image::io::Limits {
    let mut inner = image::io::Limits::default();
    inner.max_image_width = Some(limits.max_width);
    inner.max_image_height = Some(limits.max_height);
    inner.max_alloc = Some(limits.max_pixels.saturating_mul(4));
    inner
}

#[cfg(any(feature = "png", feature = "jpeg"))]
fn decode_error(err: image::ImageError) -> CodecError {
    match err {
        image::ImageError::IoError(err) => CodecError::Io(err),
        image::ImageError::Limits(_) => CodecError::LimitsExceeded { width: 0, height: 0 },
        other => {
            log::debug!("image decoder failed: {}", other);
            CodecError::Corrupt("the image decoder rejected the data")
        }
    }
}

#[cfg(any(feature = "png", feature = "jpeg"))]
fn encode_error(err: image::ImageError) -> CodecError {
    match err {
        image::ImageError::IoError(err) => CodecError::Io(err),
        other => CodecError::Encoder(other.to_string()),
    }
}

/// Decode any format the `image` crate reads into a true-color image.
#[cfg(any(feature = "png", feature = "jpeg"))]
fn decode_as(data: &[u8], format: image::ImageFormat, limits: &Limits) -> Result<Image, CodecError> {
    let mut reader = image::io::Reader::with_format(std::io::Cursor::new(data), format);
    reader.limits(reader_limits(limits));

    let decoded = reader.decode().map_err(decode_error)?;
    let (width, height) = limits.check(decoded.width().into(), decoded.height().into())?;
    from_rgba8(width, height, decoded.to_rgba8().as_raw())
}

/// Expand any image into 8-bit RGBA samples with `255` as opaque.
#[cfg(any(feature = "png", feature = "jpeg"))]
pub(crate) fn rgba8_samples(image: &Image) -> Vec<u8> {
    let (width, height) = image.size();
    let mut samples = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let rgba = crate::color::Rgba::unpack(image.get_true_color_pixel(x, y));
            samples.extend_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.alpha8()]);
        }
    }

    samples
}

/// Build a true-color image from 8-bit RGBA samples.
#[cfg(any(feature = "png", feature = "jpeg"))]
pub(crate) fn from_rgba8(width: u32, height: u32, samples: &[u8]) -> Result<Image, CodecError> {
    let mut image = allocate(width, height, true)?;
    image.set_alpha_blending(false);

    for (idx, px) in samples.chunks_exact(4).enumerate() {
        let x = (idx % width as usize) as i32;
        let y = (idx / width as usize) as i32;
        let rgba = crate::color::Rgba::from_alpha8(px[0], px[1], px[2], px[3]);
        image.set_pixel(x, y, Color::true_color(rgba));
    }

    image.set_alpha_blending(true);
    Ok(image)
}
