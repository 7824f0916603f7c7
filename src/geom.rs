//! Low-level geometric primitives: points, envelopes, the orientation
//! predicate, segment intersection and point-in-ring location.

use ordered_float::NotNan;
use robust::Coord;

use crate::{label::Location, Error};

/// The numeric type of our coordinates.
pub type Float = NotNan<f64>;

/// A point in the plane.
///
/// Points are sorted by `y` and then by `x`. Equality and hashing are by value,
/// which is what lets us key hot pixels and graph nodes by their coordinates.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Point {
    /// Vertical coordinate.
    pub y: Float,
    /// Horizontal coordinate.
    pub x: Float,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x.into_inner(), self.y.into_inner())
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl Point {
    /// Creates a new point.
    ///
    /// Panics if either coordinate is NaN. Use [`Point::try_new`] for
    /// unvalidated input.
    pub fn new(x: f64, y: f64) -> Point {
        Point {
            x: NotNan::new(x).unwrap(),
            y: NotNan::new(y).unwrap(),
        }
    }

    /// Creates a new point, checking that both coordinates are finite.
    pub fn try_new(x: f64, y: f64) -> Result<Point, Error> {
        if x.is_nan() || y.is_nan() {
            return Err(Error::NaN);
        }
        if x.is_infinite() || y.is_infinite() {
            return Err(Error::Infinity);
        }
        Ok(Point::new(x, y))
    }

    // Panics on nans. Should be fine as long as everything is finite.
    pub(crate) fn affine(self, other: Point, t: f64) -> Point {
        Point::new(
            (1.0 - t) * self.x.into_inner() + t * other.x.into_inner(),
            (1.0 - t) * self.y.into_inner() + t * other.y.into_inner(),
        )
    }

    fn coord(self) -> Coord<f64> {
        Coord {
            x: self.x.into_inner(),
            y: self.y.into_inner(),
        }
    }
}

impl TryFrom<(f64, f64)> for Point {
    type Error = Error;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Point::try_new(x, y)
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x.into_inner() - rhs.x.into_inner(),
            y: self.y.into_inner() - rhs.y.into_inner(),
        }
    }
}

/// The difference between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vector {
    pub(crate) fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub(crate) fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Which quadrant this vector points into, numbered counter-clockwise
    /// starting from the positive `x` axis.
    ///
    /// The positive axes belong to the first quadrant, the negative `x` axis to
    /// the second and the negative `y` axis to the fourth.
    pub(crate) fn quadrant(self) -> u8 {
        match (self.x >= 0.0, self.y >= 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        }
    }
}

/// The turn direction of three points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The third point is to the left of the line through the first two.
    CounterClockwise,
    /// The third point is to the right of the line through the first two.
    Clockwise,
    /// The three points are collinear.
    Collinear,
}

/// Computes the orientation of `c` relative to the directed line from `a` to `b`.
///
/// The sign of this predicate is exact.
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    orientation_f64(a.coord(), b.coord(), c.coord())
}

pub(crate) fn orientation_f64(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> Orientation {
    let det = robust::orient2d(a, b, c);
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    /// Smallest `x` coordinate.
    pub min_x: f64,
    /// Largest `x` coordinate.
    pub max_x: f64,
    /// Smallest `y` coordinate.
    pub min_y: f64,
    /// Largest `y` coordinate.
    pub max_y: f64,
}

impl Envelope {
    /// The envelope of a segment.
    pub fn of_segment(p: Point, q: Point) -> Self {
        let (px, py, qx, qy) = (
            p.x.into_inner(),
            p.y.into_inner(),
            q.x.into_inner(),
            q.y.into_inner(),
        );
        Envelope {
            min_x: px.min(qx),
            max_x: px.max(qx),
            min_y: py.min(qy),
            max_y: py.max(qy),
        }
    }

    /// The envelope of a collection of points, or `None` if there aren't any.
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut env = Envelope::of_segment(*first, *first);
        for p in points {
            env.expand_to(*p);
        }
        Some(env)
    }

    fn expand_to(&mut self, p: Point) {
        let (x, y) = (p.x.into_inner(), p.y.into_inner());
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Do the two (closed) envelopes share any point?
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Is `other` entirely inside (or on the boundary of) `self`?
    pub fn covers(&self, other: &Envelope) -> bool {
        self.min_x <= other.min_x
            && other.max_x <= self.max_x
            && self.min_y <= other.min_y
            && other.max_y <= self.max_y
    }

    /// Does this envelope contain the point?
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (p.x.into_inner(), p.y.into_inner());
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }
}

/// The result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
    /// The segments don't meet.
    None,
    /// The segments meet at a single point.
    Point(Point),
    /// The segments are collinear and overlap along a sub-segment.
    Collinear(Point, Point),
}

impl SegmentIntersection {
    /// Iterates over the (zero, one or two) intersection points.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let (a, b) = match *self {
            SegmentIntersection::None => (None, None),
            SegmentIntersection::Point(p) => (Some(p), None),
            SegmentIntersection::Collinear(p, q) => (Some(p), Some(q)),
        };
        a.into_iter().chain(b)
    }
}

/// Computes the intersection between the segments `p0 -- p1` and `q0 -- q1`.
///
/// Whether the segments meet (and whether they are collinear) is decided with
/// exact predicates. If they cross properly, the returned crossing point is
/// only approximate, but it is guaranteed to lie inside both segments' envelopes.
pub fn segment_intersection(p0: Point, p1: Point, q0: Point, q1: Point) -> SegmentIntersection {
    let env_p = Envelope::of_segment(p0, p1);
    let env_q = Envelope::of_segment(q0, q1);
    if !env_p.intersects(&env_q) {
        return SegmentIntersection::None;
    }

    let q0_side = orientation(p0, p1, q0);
    let q1_side = orientation(p0, p1, q1);
    if q0_side == q1_side && q0_side != Orientation::Collinear {
        return SegmentIntersection::None;
    }
    let p0_side = orientation(q0, q1, p0);
    let p1_side = orientation(q0, q1, p1);
    if p0_side == p1_side && p0_side != Orientation::Collinear {
        return SegmentIntersection::None;
    }

    if q0_side == Orientation::Collinear && q1_side == Orientation::Collinear {
        return collinear_intersection(p0, p1, q0, q1, &env_p, &env_q);
    }

    // If exactly one endpoint is on the other segment, it's the intersection point.
    if q0_side == Orientation::Collinear {
        return SegmentIntersection::Point(q0);
    }
    if q1_side == Orientation::Collinear {
        return SegmentIntersection::Point(q1);
    }
    if p0_side == Orientation::Collinear {
        return SegmentIntersection::Point(p0);
    }
    if p1_side == Orientation::Collinear {
        return SegmentIntersection::Point(p1);
    }

    SegmentIntersection::Point(proper_intersection(p0, p1, q0, q1, &env_p, &env_q))
}

fn collinear_intersection(
    p0: Point,
    p1: Point,
    q0: Point,
    q1: Point,
    env_p: &Envelope,
    env_q: &Envelope,
) -> SegmentIntersection {
    let mut pts: Vec<Point> = [q0, q1]
        .into_iter()
        .filter(|q| env_p.contains(*q))
        .chain([p0, p1].into_iter().filter(|p| env_q.contains(*p)))
        .collect();
    pts.sort();
    pts.dedup();
    match pts.as_slice() {
        [] => SegmentIntersection::None,
        [p] => SegmentIntersection::Point(*p),
        [p, .., q] => SegmentIntersection::Collinear(*p, *q),
    }
}

fn proper_intersection(
    p0: Point,
    p1: Point,
    q0: Point,
    q1: Point,
    env_p: &Envelope,
    env_q: &Envelope,
) -> Point {
    let dp = p1 - p0;
    let dq = q1 - q0;
    let min_x = env_p.min_x.max(env_q.min_x);
    let max_x = env_p.max_x.min(env_q.max_x);
    let min_y = env_p.min_y.max(env_q.min_y);
    let max_y = env_p.max_y.min(env_q.max_y);

    // The exact predicates told us the segments cross properly, so they aren't parallel.
    // The denominator can still be tiny, so clamp the result to be safe. With huge
    // coordinates the cross products overflow, and then the best we can do is the
    // middle of the region where both segments live.
    let t = (q0 - p0).cross(dq) / dp.cross(dq);
    let (x, y) = if t.is_finite() {
        let p = p0.affine(p1, t.clamp(0.0, 1.0));
        (p.x.into_inner(), p.y.into_inner())
    } else {
        (min_x / 2.0 + max_x / 2.0, min_y / 2.0 + max_y / 2.0)
    };
    Point::new(x.clamp(min_x, max_x), y.clamp(min_y, max_y))
}

/// The signed area of a ring. Positive for counter-clockwise rings.
///
/// The ring may or may not repeat its first point at the end.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let x0 = ring[0].x.into_inner();
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x.into_inner() - x0;
        let y_prev = ring[i - 1].y.into_inner();
        let y_next = ring[i + 1].y.into_inner();
        sum += x * (y_next - y_prev);
    }
    // Close the ring, in case the last point isn't a repeat of the first.
    let n = ring.len();
    let x = ring[n - 1].x.into_inner() - x0;
    sum += x * (ring[0].y.into_inner() - ring[n - 2].y.into_inner());
    sum / 2.0
}

/// Returns true if the ring winds counter-clockwise.
pub fn is_ccw(ring: &[Point]) -> bool {
    signed_area(ring) > 0.0
}

/// Locates a point relative to a ring, using ray-crossing.
///
/// The ring does not need to repeat its first point at the end.
pub fn locate_in_ring(p: Point, ring: &[Point]) -> Location {
    if ring.len() < 2 {
        return Location::Exterior;
    }
    let (px, py) = (p.x.into_inner(), p.y.into_inner());
    let mut crossings = 0;
    let closing = (ring[ring.len() - 1], ring[0]);
    let edges = ring.windows(2).map(|w| (w[0], w[1]));
    for (a, b) in edges.chain(std::iter::once(closing)) {
        if a == b {
            continue;
        }
        let (ax, ay, bx, by) = (
            a.x.into_inner(),
            a.y.into_inner(),
            b.x.into_inner(),
            b.y.into_inner(),
        );

        // A horizontal segment containing the point is a boundary hit. Other horizontal
        // segments don't count as crossings.
        if ay == py && by == py {
            if ax.min(bx) <= px && px <= ax.max(bx) {
                return Location::Boundary;
            }
            continue;
        }

        // Only count segments that straddle the ray's line, with the
        // half-open convention so that vertices aren't counted twice.
        if (ay > py && by <= py) || (by > py && ay <= py) {
            let side = orientation(a, b, p);
            if side == Orientation::Collinear {
                return Location::Boundary;
            }
            // The ray goes to the right. It crosses this segment if the point is on the
            // "upward" side of it.
            let upward = by > ay;
            if (side == Orientation::CounterClockwise) == upward {
                crossings += 1;
            }
        } else if orientation(a, b, p) == Orientation::Collinear
            && Envelope::of_segment(a, b).contains(p)
        {
            return Location::Boundary;
        }
    }

    if crossings % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}
