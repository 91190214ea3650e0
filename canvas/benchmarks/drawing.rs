//! Benchmarks drawing through a transform and encoding.
use brunch::Bench;

use gd_canvas::codec::{Encoding, Gd2Compression};
use gd_canvas::{Canvas, Error, Request};

struct Star {
    true_color: bool,
    sz: u32,
}

impl Star {
    fn name(&self) -> String {
        format!("star(true_color: {}, {})", self.true_color, self.sz)
    }

    fn prepare(&self) -> Result<impl FnMut(), Error> {
        let canvas = Canvas::create(Request::Blank {
            width: self.sz,
            height: self.sz,
            true_color: self.true_color,
        })?;

        let half = self.sz as i32 / 2;
        canvas.set_origin((half, half), (1, -1))?;
        canvas.color_allocate(255, 255, 255);
        let ink = canvas.color_allocate(0, 0, 160);

        let points: Vec<(i32, i32)> = (0..10)
            .map(|idx| {
                let radius = if idx % 2 == 0 { half - 1 } else { half / 3 };
                let angle = f64::from(idx) * core::f64::consts::PI / 5.0;
                let x = f64::from(radius) * angle.cos();
                let y = f64::from(radius) * angle.sin();
                (x as i32, y as i32)
            })
            .collect();

        Ok(move || {
            let _ = canvas.filled_polygon(&points, ink);
        })
    }
}

struct Encode {
    compression: Gd2Compression,
    sz: u32,
}

impl Encode {
    fn name(&self) -> String {
        format!("gd2({:?}, {})", self.compression, self.sz)
    }

    fn prepare(&self) -> Result<impl FnMut(), Error> {
        let canvas = Canvas::create(Request::Blank {
            width: self.sz,
            height: self.sz,
            true_color: true,
        })?;

        let half = self.sz as i32 / 2;
        let red = canvas.color_allocate(255, 0, 0);
        canvas.filled_ellipse((half, half), (half, half), red)?;

        let encoding = Encoding::Gd2 {
            chunk_size: None,
            compression: self.compression,
        };

        Ok(move || {
            let _ = canvas.to_bytes(&encoding);
        })
    }
}

fn main() {
    let stars = [
        Star {
            true_color: false,
            sz: 512,
        },
        Star {
            true_color: true,
            sz: 512,
        },
    ];

    let encodes = [
        Encode {
            compression: Gd2Compression::Raw,
            sz: 512,
        },
        Encode {
            compression: Gd2Compression::Compressed,
            sz: 512,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(stars.map(|star| {
        Bench::new(format!("canvas::drawing::main::{}", star.name()))
            .run(star.prepare().expect("Failed to setup benchmark"))
    }));
    benches.extend(encodes.map(|encode| {
        Bench::new(format!("canvas::drawing::main::{}", encode.name()))
            .run(encode.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
