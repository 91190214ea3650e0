//! Benchmarks flood fills and resampling copies.
use brunch::Bench;

use gd_raster::{Image, Painter, Rgba, ScaledRegion, SizeError};

struct Fill {
    true_color: bool,
    sz: u32,
}

impl Fill {
    fn name(&self) -> String {
        format!("fill(true_color: {}, {})", self.true_color, self.sz)
    }

    fn prepare(self) -> Result<impl FnMut(), SizeError> {
        let mut image = if self.true_color {
            Image::true_color(self.sz, self.sz)?
        } else {
            Image::palette(self.sz, self.sz)?
        };

        let colors = [
            image.color_allocate(Rgba::rgb(255, 255, 255)),
            image.color_allocate(Rgba::rgb(200, 0, 0)),
        ];

        // A ring keeps the fill from covering everything.
        let half = self.sz as i32 / 2;
        Painter::new(&mut image).ellipse((half, half), (half, half), colors[1].into());

        let mut turn = 0;
        Ok(move || {
            turn ^= 1;
            Painter::new(&mut image).fill(0, 0, colors[turn].into());
        })
    }
}

struct Resample {
    from: u32,
    into: u32,
}

impl Resample {
    fn name(&self) -> String {
        format!("resample({} -> {})", self.from, self.into)
    }

    fn prepare(self) -> Result<impl FnMut(), SizeError> {
        let mut from = Image::true_color(self.from, self.from)?;
        let red = from.color_allocate(Rgba::rgb(255, 0, 0));
        Painter::new(&mut from).filled_ellipse((0, 0), (self.from as i32, self.from as i32), red.into());

        let mut into = Image::true_color(self.into, self.into)?;
        let region = ScaledRegion {
            dest: (0, 0),
            source: (0, 0),
            dest_size: (self.into as i32, self.into as i32),
            source_size: (self.from as i32, self.from as i32),
        };

        Ok(move || into.copy_resampled_from(&from, region))
    }
}

fn main() {
    let fills = [
        Fill {
            true_color: false,
            sz: 256,
        },
        Fill {
            true_color: true,
            sz: 256,
        },
        Fill {
            true_color: true,
            sz: 1024,
        },
    ];

    let resamples = [
        Resample { from: 512, into: 128 },
        Resample { from: 128, into: 512 },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(fills.map(|fill| {
        Bench::new(format!("raster::fill::main::{}", fill.name()))
            .run(fill.prepare().expect("Failed to setup benchmark"))
    }));
    benches.extend(resamples.map(|resample| {
        Bench::new(format!("raster::fill::main::{}", resample.name()))
            .run(resample.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
