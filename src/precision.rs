//! The fixed-precision coordinate grid.

use crate::{geom::Point, Error};

/// A uniform grid of representable coordinates.
///
/// The grid points are the multiples of `1 / scale`. For example, a scale of
/// `1.0` rounds to integers and a scale of `100.0` rounds to two decimal places.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PrecisionModel {
    scale: f64,
}

impl PrecisionModel {
    /// Creates a grid with the given scale factor, which must be finite and positive.
    pub fn new(scale: f64) -> Result<Self, Error> {
        if scale.is_finite() && scale > 0.0 {
            Ok(PrecisionModel { scale })
        } else {
            Err(Error::InvalidScale(scale))
        }
    }

    /// The scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The distance between adjacent grid lines.
    pub fn grid_size(&self) -> f64 {
        1.0 / self.scale
    }

    /// Rounds a single coordinate to the grid.
    ///
    /// Ties round upwards (towards positive infinity), not away from zero.
    pub fn round_value(&self, x: f64) -> f64 {
        // Adding 0.5 before flooring would round 0.49999999999999994 up.
        let y = x * self.scale;
        let floor = y.floor();
        let rounded = if y - floor >= 0.5 { floor + 1.0 } else { floor };
        rounded / self.scale
    }

    /// Rounds a point to the nearest grid point.
    pub fn round(&self, p: Point) -> Point {
        Point::new(
            self.round_value(p.x.into_inner()),
            self.round_value(p.y.into_inner()),
        )
    }

    /// Is this point already on the grid?
    pub fn is_on_grid(&self, p: Point) -> bool {
        self.round(p) == p
    }
}
