use gd_raster::{Image, Region, ScaledRegion};

use crate::transform::Transform;
use crate::{Canvas, Error};

/// The rectangle of a plain or merging copy, in logical coordinates of the respective canvas.
///
/// Missing fields default when the copy happens: both offsets to `(0, 0)` and the size to the
/// whole source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CopyRegion {
    pub dest: Option<(i32, i32)>,
    pub source: Option<(i32, i32)>,
    pub size: Option<(i32, i32)>,
}

/// The rectangles of a scaling copy.
///
/// Missing sizes default to the whole source and the whole destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResizeRegion {
    pub dest: Option<(i32, i32)>,
    pub source: Option<(i32, i32)>,
    pub dest_size: Option<(i32, i32)>,
    pub source_size: Option<(i32, i32)>,
}

impl CopyRegion {
    pub fn new() -> Self {
        CopyRegion::default()
    }

    pub fn dest(self, x: i32, y: i32) -> Self {
        CopyRegion {
            dest: Some((x, y)),
            ..self
        }
    }

    pub fn source(self, x: i32, y: i32) -> Self {
        CopyRegion {
            source: Some((x, y)),
            ..self
        }
    }

    pub fn size(self, w: i32, h: i32) -> Self {
        CopyRegion {
            size: Some((w, h)),
            ..self
        }
    }
}

impl ResizeRegion {
    pub fn new() -> Self {
        ResizeRegion::default()
    }

    pub fn dest(self, x: i32, y: i32) -> Self {
        ResizeRegion {
            dest: Some((x, y)),
            ..self
        }
    }

    pub fn source(self, x: i32, y: i32) -> Self {
        ResizeRegion {
            source: Some((x, y)),
            ..self
        }
    }

    pub fn dest_size(self, w: i32, h: i32) -> Self {
        ResizeRegion {
            dest_size: Some((w, h)),
            ..self
        }
    }

    pub fn source_size(self, w: i32, h: i32) -> Self {
        ResizeRegion {
            source_size: Some((w, h)),
            ..self
        }
    }
}

fn offset(transform: &Transform, point: Option<(i32, i32)>) -> (i32, i32) {
    point.map_or((0, 0), |p| transform.to_physical(p))
}

fn extent(transform: &Transform, size: Option<(i32, i32)>, whole: (u32, u32)) -> (i32, i32) {
    match size {
        Some((w, h)) => (transform.to_physical_w(w), transform.to_physical_h(h)),
        None => (whole.0 as i32, whole.1 as i32),
    }
}

/// Reject regions that do not lie within the source or miss the destination.
fn check(src: &Image, dst: &Image, dest: (i32, i32), source: (i32, i32), size: (i32, i32)) -> Result<(), Error> {
    let (w, h) = (i64::from(size.0), i64::from(size.1));
    if w < 0 || h < 0 {
        return Err(Error::InvalidRegion);
    }

    let (sx, sy) = (i64::from(source.0), i64::from(source.1));
    if sx < 0 || sy < 0 || sx + w > i64::from(src.width()) || sy + h > i64::from(src.height()) {
        return Err(Error::InvalidRegion);
    }

    if !dst.bounds_safe(dest.0, dest.1) {
        return Err(Error::DestinationTooSmall(dest.0, dest.1));
    }

    Ok(())
}

/// A merge percentage, `100` copies the source unchanged.
fn percent(pct: u32) -> Result<u8, Error> {
    match u8::try_from(pct) {
        Ok(pct) if pct <= 100 => Ok(pct),
        _ => Err(Error::InvalidArguments("merge percentage must be within 0..=100")),
    }
}

impl Canvas {
    /// Run a copy with the physical region computed from both transforms.
    ///
    /// A canvas may be copied onto itself, the source is then a snapshot taken before the copy.
    fn copy_into<T>(
        &self,
        dest: &Canvas,
        region: impl FnOnce(&Transform, &Image, &Transform, &Image) -> Result<T, Error>,
        copy: impl FnOnce(&mut Image, &Image, T),
    ) -> Result<(), Error> {
        if self.ptr_eq(dest) {
            let snapshot = self.image().clone();
            return dest.with_state(|state| {
                let physical = region(&state.transform, &snapshot, &state.transform, &state.image)?;
                copy(&mut state.image, &snapshot, physical);
                Ok(())
            });
        }

        let src = self.state();
        dest.with_state(|state| {
            let physical = region(&src.transform, &src.image, &state.transform, &state.image)?;
            copy(&mut state.image, &src.image, physical);
            Ok(())
        })
    }

    fn plain_region(
        region: CopyRegion,
    ) -> impl FnOnce(&Transform, &Image, &Transform, &Image) -> Result<Region, Error> {
        move |src_t: &Transform, src: &Image, dst_t: &Transform, dst: &Image| {
            let physical = Region {
                dest: offset(dst_t, region.dest),
                source: offset(src_t, region.source),
                size: extent(src_t, region.size, src.size()),
            };

            check(src, dst, physical.dest, physical.source, physical.size)?;
            Ok(physical)
        }
    }

    fn scaled_region(
        region: ResizeRegion,
    ) -> impl FnOnce(&Transform, &Image, &Transform, &Image) -> Result<ScaledRegion, Error> {
        move |src_t: &Transform, src: &Image, dst_t: &Transform, dst: &Image| {
            let physical = ScaledRegion {
                dest: offset(dst_t, region.dest),
                source: offset(src_t, region.source),
                dest_size: extent(dst_t, region.dest_size, dst.size()),
                source_size: extent(src_t, region.source_size, src.size()),
            };

            if physical.source_size.0 == 0 || physical.source_size.1 == 0 {
                return Err(Error::InvalidRegion);
            }

            if physical.dest_size.0 < 0 || physical.dest_size.1 < 0 {
                return Err(Error::InvalidRegion);
            }

            check(src, dst, physical.dest, physical.source, physical.source_size)?;
            Ok(physical)
        }
    }

    /// Copy a rectangle of this canvas into `dest`.
    pub fn copy_to(&self, dest: &Canvas, region: CopyRegion) -> Result<(), Error> {
        self.copy_into(dest, Self::plain_region(region), |into, from, physical| {
            into.copy_from(from, physical)
        })
    }

    /// Copy a rectangle into a rectangle of a different size, replicating pixels.
    pub fn copy_resized_to(&self, dest: &Canvas, region: ResizeRegion) -> Result<(), Error> {
        self.copy_into(dest, Self::scaled_region(region), |into, from, physical| {
            into.copy_resized_from(from, physical)
        })
    }

    /// Copy a rectangle into a rectangle of a different size, averaging pixels.
    pub fn copy_resampled_to(&self, dest: &Canvas, region: ResizeRegion) -> Result<(), Error> {
        self.copy_into(dest, Self::scaled_region(region), |into, from, physical| {
            into.copy_resampled_from(from, physical)
        })
    }

    /// Blend a rectangle over `dest` with `pct` percent of the source.
    pub fn copy_merge_to(&self, dest: &Canvas, region: CopyRegion, pct: u32) -> Result<(), Error> {
        let pct = percent(pct)?;
        self.copy_into(dest, Self::plain_region(region), |into, from, physical| {
            into.copy_merge_from(from, physical, pct)
        })
    }

    /// Like [`Canvas::copy_merge_to`] but keeping the source hue over a grayed destination.
    pub fn copy_merge_gray_to(&self, dest: &Canvas, region: CopyRegion, pct: u32) -> Result<(), Error> {
        let pct = percent(pct)?;
        self.copy_into(dest, Self::plain_region(region), |into, from, physical| {
            into.copy_merge_gray_from(from, physical, pct)
        })
    }

    /// Give `dest` the palette of this canvas, remapping its pixels.
    pub fn copy_palette_to(&self, dest: &Canvas) -> Result<(), Error> {
        if self.is_true_color() || dest.is_true_color() {
            return Err(Error::NotPalette);
        }

        self.copy_into(
            dest,
            |_, _, _, _| Ok(()),
            |into, from, ()| into.copy_palette_from(from),
        )
    }
}
