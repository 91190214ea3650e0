// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The chunked GD2 format.
//!
//! The image is cut into square chunks that are stored either raw or zlib compressed. A
//! compressed file carries an index with the offset and length of every chunk.
use std::io::Write;

use super::gd::{dimensions, get_pixels, put_pixels, ColorTable};
#[cfg(not(feature = "gd2"))]
use super::Format;
use super::{allocate, CodecError, Cursor, Gd2Compression, Limits};
use crate::image::Image;

const MAGIC: &[u8; 4] = b"gd2\0";
const VERSION: u16 = 2;

const DEFAULT_CHUNK: u16 = 128;
const MIN_CHUNK: u16 = 64;
const MAX_CHUNK: u16 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Raw = 1,
    Compressed = 2,
    TrueColorRaw = 3,
    TrueColorCompressed = 4,
}

impl Layout {
    fn new(true_color: bool, compression: Gd2Compression) -> Self {
        match (true_color, compression) {
            (false, Gd2Compression::Raw) => Layout::Raw,
            (false, Gd2Compression::Compressed) => Layout::Compressed,
            (true, Gd2Compression::Raw) => Layout::TrueColorRaw,
            (true, Gd2Compression::Compressed) => Layout::TrueColorCompressed,
        }
    }

    fn from_word(word: u16) -> Option<Self> {
        Some(match word {
            1 => Layout::Raw,
            2 => Layout::Compressed,
            3 => Layout::TrueColorRaw,
            4 => Layout::TrueColorCompressed,
            _ => return None,
        })
    }

    fn true_color(self) -> bool {
        matches!(self, Layout::TrueColorRaw | Layout::TrueColorCompressed)
    }

    fn compressed(self) -> bool {
        matches!(self, Layout::Compressed | Layout::TrueColorCompressed)
    }
}

/// The chunk grid of an image.
struct Grid {
    chunk: u32,
    across: u32,
    down: u32,
    width: u32,
    height: u32,
}

impl Grid {
    fn new(width: u32, height: u32, chunk: u32) -> Self {
        Grid {
            chunk,
            across: width / chunk + 1,
            down: height / chunk + 1,
            width,
            height,
        }
    }

    fn count(&self) -> usize {
        self.across as usize * self.down as usize
    }

    /// The pixel ranges of every chunk, row of chunks by row of chunks.
    fn chunks(&self) -> impl Iterator<Item = (core::ops::Range<u32>, core::ops::Range<u32>)> + '_ {
        (0..self.down).flat_map(move |cy| {
            (0..self.across).map(move |cx| {
                let x0 = (cx * self.chunk).min(self.width);
                let y0 = (cy * self.chunk).min(self.height);
                let x1 = (x0 + self.chunk).min(self.width);
                let y1 = (y0 + self.chunk).min(self.height);
                (x0..x1, y0..y1)
            })
        })
    }
}

pub(super) fn encode(
    image: &Image,
    chunk_size: Option<u16>,
    compression: Gd2Compression,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    let (width, height) = dimensions(image)?;
    let chunk = match chunk_size {
        None | Some(0) => DEFAULT_CHUNK,
        Some(size) => size.clamp(MIN_CHUNK, MAX_CHUNK),
    };

    let layout = Layout::new(image.is_true_color(), compression);
    let grid = Grid::new(width.into(), height.into(), chunk.into());

    let mut file = Vec::new();
    file.extend_from_slice(MAGIC);
    for word in [
        VERSION,
        width,
        height,
        chunk,
        layout as u16,
        grid.across as u16,
        grid.down as u16,
    ] {
        file.extend_from_slice(&word.to_be_bytes());
    }

    // Offset and length of each chunk, filled in once the chunks are written.
    let index_at = file.len();
    if layout.compressed() {
        file.resize(index_at + 8 * grid.count(), 0);
    }

    ColorTable::write(image, &mut file);

    let mut raw = Vec::new();
    for (nth, (xs, ys)) in grid.chunks().enumerate() {
        if !layout.compressed() {
            put_pixels(image, xs, ys, &mut file);
            continue;
        }

        raw.clear();
        put_pixels(image, xs, ys, &mut raw);
        let offset = file.len();
        compress(&raw, &mut file)?;
        let length = file.len() - offset;

        let (offset, length) = match (i32::try_from(offset), i32::try_from(length)) {
            (Ok(offset), Ok(length)) => (offset, length),
            _ => return Err(CodecError::Encoder("GD2 file exceeds 2 GiB".into())),
        };

        let entry = index_at + 8 * nth;
        file[entry..entry + 4].copy_from_slice(&offset.to_be_bytes());
        file[entry + 4..entry + 8].copy_from_slice(&length.to_be_bytes());
    }

    out.write_all(&file)?;
    Ok(())
}

pub(super) fn decode(data: &[u8], limits: &Limits) -> Result<Image, CodecError> {
    let mut r = Cursor::new(data);
    if r.take(4)? != MAGIC {
        return Err(CodecError::Corrupt("not a GD2 image"));
    }

    let version = r.u16()?;
    if version != 1 && version != 2 {
        return Err(CodecError::Corrupt("unknown GD2 version"));
    }

    let width = r.u16()?;
    let height = r.u16()?;
    let chunk = r.u16()?;
    if !(MIN_CHUNK..=MAX_CHUNK).contains(&chunk) {
        return Err(CodecError::Corrupt("GD2 chunk size out of range"));
    }

    let Some(layout) = Layout::from_word(r.u16()?) else {
        return Err(CodecError::Corrupt("unknown GD2 chunk format"));
    };

    let (width, height) = limits.check(width.into(), height.into())?;
    let grid = Grid::new(width, height, chunk.into());
    let across = r.u16()?;
    let down = r.u16()?;
    if u32::from(across) != grid.across || u32::from(down) != grid.down {
        return Err(CodecError::Corrupt("GD2 chunk grid does not match the size"));
    }

    let mut index = Vec::new();
    if layout.compressed() {
        let raw = r.take(8 * grid.count())?;
        for entry in raw.chunks_exact(8) {
            let offset = i32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]);
            let length = i32::from_be_bytes([entry[4], entry[5], entry[6], entry[7]]);
            match (usize::try_from(offset), usize::try_from(length)) {
                (Ok(offset), Ok(length)) => index.push((offset, length)),
                _ => return Err(CodecError::Corrupt("negative GD2 chunk offset")),
            }
        }
    }

    let colors = ColorTable::read(&mut r, layout.true_color())?;
    let bpp = if layout.true_color() { 4 } else { 1 };

    if !layout.compressed() && r.remaining() < width as usize * height as usize * bpp {
        return Err(CodecError::Corrupt("unexpected end of data"));
    }

    let mut image = allocate(width, height, layout.true_color())?;
    colors.apply(&mut image);

    let mut buffer = Vec::new();
    for (nth, (xs, ys)) in grid.chunks().enumerate() {
        let expected = xs.len() * ys.len() * bpp;
        let bytes = if layout.compressed() {
            let (offset, length) = index[nth];
            let Some(compressed) = offset.checked_add(length).and_then(|end| data.get(offset..end)) else {
                return Err(CodecError::Corrupt("GD2 chunk outside of the file"));
            };

            buffer.clear();
            decompress(compressed, expected, &mut buffer)?;
            buffer.as_slice()
        } else {
            r.take(expected)?
        };

        get_pixels(&mut image, xs, ys, bytes);
    }

    Ok(image)
}

#[cfg(feature = "gd2")]
fn compress(raw: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(out, Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()?;
    Ok(())
}

#[cfg(not(feature = "gd2"))]
fn compress(_: &[u8], _: &mut Vec<u8>) -> Result<(), CodecError> {
    Err(CodecError::NotAvailable(Format::Gd2))
}

/// Inflate exactly one chunk.
#[cfg(feature = "gd2")]
fn decompress(compressed: &[u8], expected: usize, out: &mut Vec<u8>) -> Result<(), CodecError> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    // One extra byte to notice chunks that inflate to more than they should.
    let limit = expected as u64 + 1;
    ZlibDecoder::new(compressed)
        .take(limit)
        .read_to_end(out)
        .map_err(|_| CodecError::Corrupt("GD2 chunk does not inflate"))?;

    if out.len() != expected {
        return Err(CodecError::Corrupt("GD2 chunk has the wrong length"));
    }

    Ok(())
}

#[cfg(not(feature = "gd2"))]
fn decompress(_: &[u8], _: usize, _: &mut Vec<u8>) -> Result<(), CodecError> {
    Err(CodecError::NotAvailable(Format::Gd2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, Rgba};

    fn checkered(true_color: bool) -> Result<Image, CodecError> {
        let mut image = allocate(150, 70, true_color)?;
        let a = image.color_allocate(Rgba::rgb(10, 20, 30));
        let b = image.color_allocate(Rgba::new(200, 100, 0, 64));
        for y in 0..70 {
            for x in 0..150 {
                image.set_pixel(x, y, if (x / 7 + y / 5) % 2 == 0 { a } else { b });
            }
        }

        Ok(image)
    }

    #[test]
    fn header() -> Result<(), CodecError> {
        let image = checkered(false)?;
        let mut file = Vec::new();
        encode(&image, Some(64), Gd2Compression::Raw, &mut file)?;

        assert_eq!(&file[..4], b"gd2\0");
        // Version, 150x70, chunk 64, raw, 3x2 chunks.
        assert_eq!(&file[4..18], &[0, 2, 0, 150, 0, 70, 0, 64, 0, 1, 0, 3, 0, 2]);
        Ok(())
    }

    #[test]
    fn raw_round_trip() -> Result<(), CodecError> {
        for true_color in [false, true] {
            let image = checkered(true_color)?;
            let mut file = Vec::new();
            encode(&image, Some(10), Gd2Compression::Raw, &mut file)?;
            assert_eq!(decode(&file, &Limits::default())?, image);
        }

        Ok(())
    }

    #[test]
    #[cfg(feature = "gd2")]
    fn compressed_round_trip() -> Result<(), CodecError> {
        for true_color in [false, true] {
            let image = checkered(true_color)?;
            let mut file = Vec::new();
            encode(&image, None, Gd2Compression::Compressed, &mut file)?;
            assert_eq!(decode(&file, &Limits::default())?, image);
        }

        Ok(())
    }

    #[test]
    #[cfg(feature = "gd2")]
    fn truncated_chunk() -> Result<(), CodecError> {
        let mut image = allocate(4, 4, true)?;
        image.set_pixel(1, 1, Color::true_color(Rgba::rgb(1, 1, 1)));
        let mut file = Vec::new();
        encode(&image, None, Gd2Compression::Compressed, &mut file)?;

        file.truncate(file.len() - 3);
        assert!(matches!(decode(&file, &Limits::default()), Err(CodecError::Corrupt(_))));
        Ok(())
    }

    #[test]
    fn bad_chunk_size() -> Result<(), CodecError> {
        let image = allocate(4, 4, false)?;
        let mut file = Vec::new();
        encode(&image, None, Gd2Compression::Raw, &mut file)?;

        file[10] = 0;
        file[11] = 8;
        assert!(matches!(decode(&file, &Limits::default()), Err(CodecError::Corrupt(_))));
        Ok(())
    }
}
