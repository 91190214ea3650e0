// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use std::sync::OnceLock;

/// Equivalent to `f64::cos` but with results independent of the platform libm.
#[inline]
pub(crate) fn cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Equivalent to `f64::sin` but with results independent of the platform libm.
#[inline]
pub(crate) fn sin(x: f64) -> f64 {
    libm::sin(x)
}

#[inline]
pub(crate) fn atan2(y: f64, x: f64) -> f64 {
    libm::atan2(y, x)
}

#[inline]
pub(crate) fn floor(x: f64) -> f64 {
    libm::floor(x)
}

#[inline]
pub(crate) fn round(x: f64) -> f64 {
    libm::round(x)
}

/// Cosine and sine of each whole degree, in fixed point with 10 fractional bits.
///
/// Arcs are stepped in whole degrees with these to keep their outlines stable across platforms.
pub(crate) fn trig_table() -> &'static [(i32, i32); 360] {
    static TABLE: OnceLock<[(i32, i32); 360]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [(0, 0); 360];
        for (deg, entry) in table.iter_mut().enumerate() {
            let rad = (deg as f64).to_radians();
            *entry = (round(1024.0 * cos(rad)) as i32, round(1024.0 * sin(rad)) as i32);
        }
        table
    })
}

#[test]
fn table_quadrants() {
    let table = trig_table();
    assert_eq!(table[0], (1024, 0));
    assert_eq!(table[90], (0, 1024));
    assert_eq!(table[180], (-1024, 0));
    assert_eq!(table[270], (0, -1024));
}
