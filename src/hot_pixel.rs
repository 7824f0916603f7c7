//! Hot pixels: the tolerance squares around grid points that snap rounding
//! forces nearby segments through.

use std::collections::BTreeMap;

use robust::Coord;

use crate::{
    geom::{orientation_f64, Orientation, Point},
    precision::PrecisionModel,
};

// Half of a pixel's width, in scaled coordinates.
const TOLERANCE: f64 = 0.5;

/// The tolerance square around a single grid point.
///
/// In scaled coordinates (where grid points are integers), the pixel centered at
/// `(cx, cy)` is the half-open square `[cx - 0.5, cx + 0.5) x [cy - 0.5, cy + 0.5)`:
/// its left and bottom sides belong to it but its top and right sides don't. That
/// way, every point of the plane belongs to exactly one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HotPixel {
    center: Point,
    scale: f64,
    // The center, in scaled coordinates.
    hx: f64,
    hy: f64,
}

impl HotPixel {
    /// Creates a hot pixel around a point, which should already be on the grid.
    pub fn new(center: Point, scale: f64) -> Self {
        // Grid points aren't exactly representable, so scaling them back up can
        // miss the integer by an ulp.
        HotPixel {
            center,
            scale,
            hx: (center.x.into_inner() * scale).round(),
            hy: (center.y.into_inner() * scale).round(),
        }
    }

    /// The grid point at the center of this pixel.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Does this pixel contain the point?
    pub fn contains(&self, p: Point) -> bool {
        let x = p.x.into_inner() * self.scale;
        let y = p.y.into_inner() * self.scale;
        self.hx - TOLERANCE <= x
            && x < self.hx + TOLERANCE
            && self.hy - TOLERANCE <= y
            && y < self.hy + TOLERANCE
    }

    /// Does the segment from `p0` to `p1` intersect this pixel?
    pub fn intersects(&self, p0: Point, p1: Point) -> bool {
        self.intersects_scaled(
            (p0.x.into_inner() * self.scale, p0.y.into_inner() * self.scale),
            (p1.x.into_inner() * self.scale, p1.y.into_inner() * self.scale),
        )
    }

    fn intersects_scaled(&self, p0: (f64, f64), p1: (f64, f64)) -> bool {
        // Orient the segment to point rightwards.
        let ((px, py), (qx, qy)) = if p0.0 > p1.0 { (p1, p0) } else { (p0, p1) };

        // The envelopes must intersect, remembering that the top and right sides are open.
        let max_x = self.hx + TOLERANCE;
        if px.min(qx) >= max_x {
            return false;
        }
        let min_x = self.hx - TOLERANCE;
        if px.max(qx) < min_x {
            return false;
        }
        let max_y = self.hy + TOLERANCE;
        if py.min(qy) >= max_y {
            return false;
        }
        let min_y = self.hy - TOLERANCE;
        if py.max(qy) < min_y {
            return false;
        }

        // Vertical and horizontal segments whose envelope meets the pixel must cross
        // its interior or its closed sides.
        if px == qx || py == qy {
            return true;
        }

        // Otherwise, look at which side of the segment each corner is on. If the segment
        // goes exactly through a corner, the segment's direction tells us whether it enters
        // the pixel or just grazes an open side.
        let seg = |x: f64, y: f64| {
            orientation_f64(
                Coord { x: px, y: py },
                Coord { x: qx, y: qy },
                Coord { x, y },
            )
        };
        let upward = py < qy;

        let upper_left = seg(min_x, max_y);
        if upper_left == Orientation::Collinear {
            return !upward;
        }
        let upper_right = seg(max_x, max_y);
        if upper_right == Orientation::Collinear {
            return upward;
        }
        // Crosses the top side.
        if upper_left != upper_right {
            return true;
        }
        let lower_left = seg(min_x, min_y);
        if lower_left == Orientation::Collinear {
            // The lower-left corner is the only corner belonging to the pixel.
            return true;
        }
        // Crosses the left side.
        if lower_left != upper_left {
            return true;
        }
        let lower_right = seg(max_x, min_y);
        if lower_right == Orientation::Collinear {
            return !upward;
        }
        // Crosses the bottom side, or the right side.
        lower_left != lower_right || lower_right != upper_right
    }
}

/// The collection of hot pixels, with at most one pixel per grid point.
///
/// Pixels are kept sorted by their center, so iteration order doesn't depend on
/// the order in which they were added.
#[derive(Clone, Debug)]
pub struct HotPixelIndex {
    precision: PrecisionModel,
    pixels: BTreeMap<Point, HotPixel>,
}

impl HotPixelIndex {
    /// Creates an empty index.
    pub fn new(precision: PrecisionModel) -> Self {
        HotPixelIndex {
            precision,
            pixels: BTreeMap::new(),
        }
    }

    /// Rounds a point and returns the hot pixel around it, creating it if necessary.
    pub fn add(&mut self, p: Point) -> &HotPixel {
        let center = self.precision.round(p);
        let scale = self.precision.scale();
        self.pixels
            .entry(center)
            .or_insert_with(|| HotPixel::new(center, scale))
    }

    /// Looks up the hot pixel centered at a grid point.
    pub fn get(&self, center: Point) -> Option<&HotPixel> {
        self.pixels.get(&center)
    }

    /// Iterates over all the hot pixels, in increasing order of their centers.
    pub fn pixels(&self) -> impl Iterator<Item = &HotPixel> + '_ {
        self.pixels.values()
    }

    /// The number of hot pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Are there no hot pixels at all?
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{p, Reasonable};
    use proptest::prelude::*;

    fn pixel(x: f64, y: f64) -> HotPixel {
        HotPixel::new(p(x, y), 1.0)
    }

    #[test]
    fn axis_aligned() {
        let hp = pixel(0.0, 0.0);
        assert!(hp.intersects(p(-2.0, 0.0), p(2.0, 0.0)));
        assert!(hp.intersects(p(-2.0, -0.5), p(2.0, -0.5)));
        // The top side is open.
        assert!(!hp.intersects(p(-2.0, 0.5), p(2.0, 0.5)));
        assert!(hp.intersects(p(-0.5, -3.0), p(-0.5, 3.0)));
        // The right side is open.
        assert!(!hp.intersects(p(0.5, -3.0), p(0.5, 3.0)));
        assert!(!hp.intersects(p(1.0, -3.0), p(1.0, 3.0)));
    }

    #[test]
    fn diagonal() {
        let hp = pixel(0.0, 0.0);
        assert!(hp.intersects(p(-3.0, -3.0), p(3.0, 3.0)));
        assert!(hp.intersects(p(-3.0, 3.0), p(3.0, -3.0)));
        // Passes through the upper right corner only: that corner isn't in the pixel.
        assert!(!hp.intersects(p(0.0, 1.0), p(1.0, 0.0)));
        // Passes close by, but misses.
        assert!(!hp.intersects(p(0.0, 1.5), p(1.5, 0.0)));
        // Clips the lower-left corner.
        assert!(hp.intersects(p(-0.6, -0.3), p(-0.3, -0.6)));
        assert!(!hp.intersects(p(-1.0, -0.4), p(-0.4, -1.0)));
    }

    #[test]
    fn endpoint_inside() {
        let hp = pixel(3.0, 4.0);
        assert!(hp.intersects(p(3.2, 4.1), p(10.0, 11.0)));
        assert!(hp.contains(p(3.2, 4.1)));
        assert!(!hp.contains(p(3.5, 4.1)));
    }

    #[test]
    fn scaled() {
        let hp = HotPixel::new(p(0.1, 0.1), 10.0);
        assert!(hp.intersects(p(0.0, 0.1), p(0.2, 0.1)));
        assert!(!hp.intersects(p(0.0, 0.2), p(0.2, 0.2)));
    }

    #[test]
    fn off_integer_center() {
        // -19.99 * 100 is -1998.9999999999998.
        let hp = HotPixel::new(p(-19.99, 0.0), 100.0);
        assert!(hp.contains(p(-19.995, 0.0)));
        assert!(!hp.contains(p(-19.985, 0.0)));
        // A vertical segment along the pixel's left side.
        assert!(hp.intersects(p(-19.995, -1.0), p(-19.995, 1.0)));
    }

    #[test]
    fn pixels_contain_their_points() {
        for (pt, scale) in [
            (p(-19.995, 0.0), 100.0),
            (p(0.049999999999999996, 0.0), 10.0),
            (p(0.49999999999999994, -0.49999999999999994), 1.0),
            (p(2.675, -1.005), 100.0),
        ] {
            let mut index = HotPixelIndex::new(PrecisionModel::new(scale).unwrap());
            assert!(index.add(pt).contains(pt), "{pt:?} at scale {scale}");
        }
    }

    proptest! {
        #[test]
        fn rounded_point_is_in_its_pixel(
            pt in Point::reasonable(),
            scale in prop_oneof![Just(1.0), Just(3.0), Just(10.0), Just(100.0), Just(1000.0)],
        ) {
            let mut index = HotPixelIndex::new(PrecisionModel::new(scale).unwrap());
            prop_assert!(index.add(pt).contains(pt));
        }
    }

    #[test]
    fn one_pixel_per_grid_point() {
        let pm = PrecisionModel::new(1.0).unwrap();
        let mut index = HotPixelIndex::new(pm);
        index.add(p(0.2, 0.3));
        index.add(p(-0.2, 0.1));
        index.add(p(5.0, 1.0));
        index.add(p(1.0, 0.0));
        assert_eq!(index.len(), 3);
        let centers: Vec<_> = index.pixels().map(|hp| hp.center()).collect();
        assert_eq!(centers, vec![p(0.0, 0.0), p(1.0, 0.0), p(5.0, 1.0)]);
        assert!(index.get(p(5.0, 1.0)).is_some());
    }
}
