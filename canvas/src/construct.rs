use std::path::PathBuf;

use gd_raster::codec::Format;
use gd_raster::{Image, Region, ScaledRegion};

use crate::{Canvas, Config, Error};

/// How to create a canvas.
#[derive(Clone, Debug)]
pub enum Request {
    /// A copy of another canvas, resized if `size` differs from the source.
    ///
    /// A missing size, or a zero width or height, keeps the source dimension.
    Derive {
        source: Canvas,
        size: Option<(u32, u32)>,
        true_color: bool,
    },
    /// An image of the given size, with every pixel at index or color `0`.
    Blank {
        width: u32,
        height: u32,
        true_color: bool,
    },
    /// An image file, with the format from the extension if not given.
    Decode { path: PathBuf, format: Option<Format> },
}

/// A loosely typed argument, as received from a dynamically typed host.
#[derive(Clone, Debug)]
pub enum Arg {
    Canvas(Canvas),
    Size(i64, i64),
    Int(i64),
    Str(String),
}

fn dimension(value: i64) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| Error::InvalidArguments("dimensions must be non-negative"))
}

impl Request {
    /// Match arguments against the creation modes, first match wins.
    ///
    /// The accepted shapes are `(canvas, [size, [true_color]])`, `(size, [true_color])` and
    /// `(path, [format])`.
    pub fn from_args(args: &[Arg]) -> Result<Self, Error> {
        match args {
            [] => Err(Error::InvalidArguments("image size or source filename required")),
            [Arg::Canvas(source), rest @ ..] => {
                let (size, true_color) = match rest {
                    [] => (None, false),
                    [Arg::Size(w, h)] => (Some((dimension(*w)?, dimension(*h)?)), false),
                    [Arg::Size(w, h), Arg::Int(tc)] => (Some((dimension(*w)?, dimension(*h)?)), *tc != 0),
                    _ => return Err(Error::InvalidArguments("invalid argument list")),
                };

                Ok(Request::Derive {
                    source: source.clone(),
                    size,
                    true_color,
                })
            }
            [Arg::Size(w, h), rest @ ..] => {
                let true_color = match rest {
                    [] => false,
                    [Arg::Int(tc)] => *tc != 0,
                    _ => return Err(Error::InvalidArguments("invalid argument list")),
                };

                Ok(Request::Blank {
                    width: dimension(*w)?,
                    height: dimension(*h)?,
                    true_color,
                })
            }
            [Arg::Str(path), rest @ ..] => {
                let format = match rest {
                    [] => None,
                    [Arg::Str(tag)] => Some(tag.parse::<Format>()?),
                    _ => return Err(Error::InvalidArguments("invalid argument list")),
                };

                Ok(Request::Decode {
                    path: PathBuf::from(path),
                    format,
                })
            }
            _ => Err(Error::InvalidArguments("invalid argument list")),
        }
    }
}

impl Canvas {
    /// Create a canvas with the default [`Config`].
    pub fn create(request: Request) -> Result<Self, Error> {
        Canvas::create_with(request, &Config::default())
    }

    pub fn create_with(request: Request, config: &Config) -> Result<Self, Error> {
        match request {
            Request::Derive {
                source,
                size,
                true_color,
            } => {
                let (src_w, src_h) = source.size();
                let (mut width, mut height) = size.unwrap_or((src_w, src_h));
                if width == 0 {
                    width = src_w;
                }
                if height == 0 {
                    height = src_h;
                }

                log::debug!("deriving {}x{} canvas from {}x{}", width, height, src_w, src_h);
                let mut image = blank(width, height, true_color, config)?;
                let src = source.image();
                if (width, height) == (src_w, src_h) {
                    let region = Region {
                        dest: (0, 0),
                        source: (0, 0),
                        size: (width as i32, height as i32),
                    };
                    image.copy_from(&src, region);
                } else {
                    let region = ScaledRegion {
                        dest: (0, 0),
                        source: (0, 0),
                        dest_size: (width as i32, height as i32),
                        source_size: (src_w as i32, src_h as i32),
                    };
                    image.copy_resized_from(&src, region);
                }

                Ok(Canvas::from_image(image))
            }
            Request::Blank {
                width,
                height,
                true_color,
            } => {
                log::debug!("creating blank {}x{} canvas", width, height);
                Ok(Canvas::from_image(blank(width, height, true_color, config)?))
            }
            Request::Decode { path, format } => {
                log::debug!("creating canvas from {:?}", path);
                Canvas::open_with(&path, format, config)
            }
        }
    }
}

fn blank(width: u32, height: u32, true_color: bool, config: &Config) -> Result<Image, Error> {
    if width == 0 || height == 0 {
        return Err(Error::ZeroDimension);
    }

    let true_color = if true_color && !config.capabilities.true_color {
        log::debug!("true-color is not supported, creating a palette image");
        false
    } else {
        true_color
    };

    let image = if true_color {
        Image::true_color(width, height)?
    } else {
        Image::palette(width, height)?
    };

    Ok(image)
}
