use std::io;

use gd_raster::codec::{CodecError, Format, UnknownFormat};
use gd_raster::{FontError, SizeError};

/// Everything that can go wrong on a canvas.
///
/// Color lookups are not errors, they return [`Color::NONE`](crate::color::Color::NONE).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The arguments match none of the accepted shapes.
    #[error("invalid arguments: {0}")]
    InvalidArguments(&'static str),
    #[error("image dimensions cannot be 0")]
    ZeroDimension,
    #[error("coordinate scale cannot be 0")]
    ZeroScale,
    /// A palette index outside of `0..256`.
    #[error("color index {0} out of range")]
    ColorOutOfRange(i32),
    /// A copy region with negative size or outside of the source image.
    #[error("bad region")]
    InvalidRegion,
    /// The destination offset lies outside of the destination image.
    #[error("destination too small for offset ({0}, {1})")]
    DestinationTooSmall(i32, i32),
    #[error("palette copy requires two palette images")]
    NotPalette,
    /// A brush or tile assignment that would make a canvas reach itself.
    #[error("a canvas cannot be its own brush or tile")]
    SelfReference,
    #[error("style must contain at least one entry")]
    EmptyStyle,
    #[error("need an extension to determine file type (.png|.jpeg|.jpg|.gd|.gd2|.xpm|.xbm|.wbmp)")]
    MissingExtension,
    #[error(transparent)]
    UnsupportedFormat(#[from] UnknownFormat),
    /// The format can only be read from a named file.
    #[error("{0} images can only be read from a path")]
    PathOnly(Format),
    #[error(transparent)]
    Size(SizeError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<SizeError> for Error {
    fn from(err: SizeError) -> Self {
        match err {
            SizeError::Zero => Error::ZeroDimension,
            other => Error::Size(other),
        }
    }
}
