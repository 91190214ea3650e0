use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use gd_raster::codec::{self, Encoding, Format, Gd2Compression};
use gd_raster::Color;

use crate::{Canvas, Config, Error};

/// Where encoded bytes go.
pub enum Destination<'a> {
    /// A file that is created, written and closed by the call.
    Path(PathBuf),
    /// A writer owned by the caller, flushed but left open.
    Writer(&'a mut dyn Write),
}

impl From<PathBuf> for Destination<'_> {
    fn from(path: PathBuf) -> Self {
        Destination::Path(path)
    }
}

impl From<&Path> for Destination<'_> {
    fn from(path: &Path) -> Self {
        Destination::Path(path.to_owned())
    }
}

impl From<&str> for Destination<'_> {
    fn from(path: &str) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

impl<'a, W: Write> From<&'a mut W> for Destination<'a> {
    fn from(writer: &'a mut W) -> Self {
        Destination::Writer(writer)
    }
}

/// The format of a file named by `path`, unless given explicitly.
fn resolve_format(path: &Path, format: Option<Format>) -> Result<Format, Error> {
    match format {
        Some(format) => Ok(format),
        None => Format::from_path(path)?.ok_or(Error::MissingExtension),
    }
}

/// Serialization of canvases.
impl Canvas {
    /// Encode the image into a file or writer.
    pub fn write<'d>(&self, encoding: &Encoding, dest: impl Into<Destination<'d>>) -> Result<(), Error> {
        self.write_with(encoding, dest, &Config::default())
    }

    pub fn write_with<'d>(
        &self,
        encoding: &Encoding,
        dest: impl Into<Destination<'d>>,
        config: &Config,
    ) -> Result<(), Error> {
        if !config.capabilities.encodes(encoding) {
            return Err(codec::CodecError::NotAvailable(encoding.format()).into());
        }

        match dest.into() {
            Destination::Path(path) => {
                // Encoded first, a failing encoder leaves no file behind.
                let mut bytes = Vec::new();
                codec::encode(&self.image(), encoding, &mut bytes)?;
                log::debug!("writing {} to {:?}", encoding.format(), path);
                std::fs::write(&path, bytes)?;
            }
            Destination::Writer(out) => {
                log::debug!("writing {} to a stream", encoding.format());
                codec::encode(&self.image(), encoding, &mut *out)?;
                out.flush()?;
            }
        }

        Ok(())
    }

    pub fn write_png<'d>(&self, dest: impl Into<Destination<'d>>) -> Result<(), Error> {
        self.write(&Encoding::Png, dest)
    }

    /// JPEG with a quality from `0` to `100`, or the encoder default.
    pub fn write_jpeg<'d>(&self, dest: impl Into<Destination<'d>>, quality: Option<u8>) -> Result<(), Error> {
        if quality.map_or(false, |q| q > 100) {
            return Err(Error::InvalidArguments("JPEG quality must be within 0..=100"));
        }

        self.write(&Encoding::Jpeg { quality }, dest)
    }

    pub fn write_gd<'d>(&self, dest: impl Into<Destination<'d>>) -> Result<(), Error> {
        self.write(&Encoding::Gd, dest)
    }

    pub fn write_gd2<'d>(
        &self,
        dest: impl Into<Destination<'d>>,
        chunk_size: Option<u16>,
        compression: Gd2Compression,
    ) -> Result<(), Error> {
        let encoding = Encoding::Gd2 {
            chunk_size,
            compression,
        };
        self.write(&encoding, dest)
    }

    /// WBMP with pixels of `foreground` black, all others white.
    pub fn write_wbmp<'d>(&self, dest: impl Into<Destination<'d>>, foreground: Color) -> Result<(), Error> {
        self.write(&Encoding::Wbmp { foreground }, dest)
    }

    /// Write a file in the default encoding of the format named by its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let format = resolve_format(path, None)?;
        let encoding = Encoding::default_for(format).ok_or(codec::CodecError::DecodeOnly(format))?;
        self.write(&encoding, path)
    }

    /// Encode into memory.
    pub fn to_bytes(&self, encoding: &Encoding) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::new();
        self.write(encoding, &mut bytes)?;
        Ok(bytes)
    }

    /// Decode an image file, the format inferred from its extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Canvas::open_with(path.as_ref(), None, &Config::default())
    }

    pub fn open_as(path: impl AsRef<Path>, format: Format) -> Result<Self, Error> {
        Canvas::open_with(path.as_ref(), Some(format), &Config::default())
    }

    pub(crate) fn open_with(path: &Path, format: Option<Format>, config: &Config) -> Result<Self, Error> {
        let format = resolve_format(path, format)?;
        if !config.capabilities.decodes(format) {
            return Err(codec::CodecError::NotAvailable(format).into());
        }

        log::debug!("reading {} from {:?}", format, path);
        let data = std::fs::read(path)?;
        let image = codec::decode(&data, format, &config.limits)?;
        Ok(Canvas::from_image(image))
    }

    /// Decode from a reader owned by the caller.
    ///
    /// XPM can only be read from a path.
    pub fn decode(mut reader: impl Read, format: Format) -> Result<Self, Error> {
        if format == Format::Xpm {
            return Err(Error::PathOnly(format));
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Canvas::from_bytes(&data, format)
    }

    pub fn from_bytes(data: &[u8], format: Format) -> Result<Self, Error> {
        if format == Format::Xpm {
            return Err(Error::PathOnly(format));
        }

        let config = Config::default();
        log::debug!("reading {} from {} bytes", format, data.len());
        let image = codec::decode(data, format, &config.limits)?;
        Ok(Canvas::from_image(image))
    }
}
