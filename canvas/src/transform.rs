use core::num::NonZeroI32;

use crate::Error;

/// Maps logical coordinates onto physical pixels.
///
/// `physical = logical * scale + origin` per axis. Distances only scale. All arithmetic
/// saturates at the bounds of `i32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transform {
    origin_x: i32,
    origin_y: i32,
    scale_x: NonZeroI32,
    scale_y: NonZeroI32,
}

const ONE: NonZeroI32 = match NonZeroI32::new(1) {
    Some(one) => one,
    None => unreachable!(),
};

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Transform {
    pub const IDENTITY: Self = Transform {
        origin_x: 0,
        origin_y: 0,
        scale_x: ONE,
        scale_y: ONE,
    };

    pub fn new(origin_x: i32, origin_y: i32, scale_x: i32, scale_y: i32) -> Result<Self, Error> {
        match (NonZeroI32::new(scale_x), NonZeroI32::new(scale_y)) {
            (Some(scale_x), Some(scale_y)) => Ok(Transform {
                origin_x,
                origin_y,
                scale_x,
                scale_y,
            }),
            _ => Err(Error::ZeroScale),
        }
    }

    pub fn to_physical_x(&self, x: i32) -> i32 {
        saturate(i64::from(x) * i64::from(self.scale_x.get()) + i64::from(self.origin_x))
    }

    pub fn to_physical_y(&self, y: i32) -> i32 {
        saturate(i64::from(y) * i64::from(self.scale_y.get()) + i64::from(self.origin_y))
    }

    pub fn to_physical_w(&self, w: i32) -> i32 {
        saturate(i64::from(w) * i64::from(self.scale_x.get()))
    }

    pub fn to_physical_h(&self, h: i32) -> i32 {
        saturate(i64::from(h) * i64::from(self.scale_y.get()))
    }

    pub fn to_physical(&self, (x, y): (i32, i32)) -> (i32, i32) {
        (self.to_physical_x(x), self.to_physical_y(y))
    }

    /// `(origin_x, origin_y, scale_x, scale_y)`.
    pub fn origin(&self) -> (i32, i32, i32, i32) {
        (
            self.origin_x,
            self.origin_y,
            self.scale_x.get(),
            self.scale_y.get(),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipped_axis() -> Result<(), Error> {
        let t = Transform::new(10, 20, 1, -1)?;
        assert_eq!(t.to_physical_x(5), 15);
        assert_eq!(t.to_physical_y(5), 15);
        assert_eq!(t.to_physical_h(3), -3);
        assert_eq!(t.origin(), (10, 20, 1, -1));
        Ok(())
    }

    #[test]
    fn identity_is_idempotent() {
        let t = Transform::IDENTITY;
        for v in [i32::MIN, -7, 0, 13, i32::MAX] {
            assert_eq!(t.to_physical((v, v)), (v, v));
            assert_eq!(t.to_physical_w(v), v);
        }
    }

    #[test]
    fn saturates() -> Result<(), Error> {
        let t = Transform::new(i32::MAX, 0, 2, 2)?;
        assert_eq!(t.to_physical_x(i32::MAX), i32::MAX);
        assert_eq!(t.to_physical_w(i32::MIN), i32::MIN);
        assert!(matches!(Transform::new(0, 0, 0, 1), Err(Error::ZeroScale)));
        Ok(())
    }
}
