//! Polygonal and linear geometries, used both as overlay inputs and as results.

use crate::{
    geom::{is_ccw, locate_in_ring, signed_area, Envelope, Point},
    label::Location,
    segments::{EdgeSource, SegmentString},
    Error,
};

/// A polygon: one outer ring (the shell) and any number of holes.
///
/// Rings are stored without repeating their first point at the end. They can
/// wind in either direction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Polygon {
    /// The outer ring.
    pub shell: Vec<Point>,
    /// The inner rings.
    pub holes: Vec<Vec<Point>>,
}

fn open_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn ring_from_coords(coords: &[(f64, f64)]) -> Result<Vec<Point>, Error> {
    coords
        .iter()
        .map(|&c| Point::try_from(c))
        .collect::<Result<Vec<_>, _>>()
        .map(open_ring)
}

impl Polygon {
    /// Creates a polygon. If the rings are closed (with the last point repeating the
    /// first), the repeated point is removed.
    pub fn new(shell: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Polygon {
            shell: open_ring(shell),
            holes: holes.into_iter().map(open_ring).collect(),
        }
    }

    /// Creates a polygon from raw coordinates, checking that they're all finite.
    pub fn from_coords(shell: &[(f64, f64)], holes: &[Vec<(f64, f64)>]) -> Result<Self, Error> {
        Ok(Polygon {
            shell: ring_from_coords(shell)?,
            holes: holes
                .iter()
                .map(|h| ring_from_coords(h))
                .collect::<Result<_, _>>()?,
        })
    }

    /// The enclosed area, not counting the holes.
    pub fn area(&self) -> f64 {
        signed_area(&self.shell).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }

    /// Iterates over all the rings: first the shell, then the holes.
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> + '_ {
        std::iter::once(self.shell.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Locates a point relative to this polygon.
    pub fn locate(&self, p: Point) -> Location {
        match locate_in_ring(p, &self.shell) {
            Location::Exterior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            Location::Interior => {}
        }
        for hole in &self.holes {
            match locate_in_ring(p, hole) {
                Location::Interior => return Location::Exterior,
                Location::Boundary => return Location::Boundary,
                Location::Exterior => {}
            }
        }
        Location::Interior
    }
}

/// A collection of polygons and line strings.
///
/// The polygons are assumed to be valid: their rings are simple, and different
/// polygons have disjoint interiors.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Geometry {
    /// The polygonal part.
    pub polygons: Vec<Polygon>,
    /// The linear part.
    pub lines: Vec<Vec<Point>>,
}

impl Geometry {
    /// The empty geometry.
    pub fn empty() -> Self {
        Geometry::default()
    }

    /// A geometry consisting of some polygons.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Polygon>) -> Self {
        Geometry {
            polygons: polygons.into_iter().collect(),
            lines: Vec::new(),
        }
    }

    /// A geometry consisting of some line strings.
    pub fn from_lines(lines: impl IntoIterator<Item = Vec<Point>>) -> Self {
        Geometry {
            polygons: Vec::new(),
            lines: lines.into_iter().collect(),
        }
    }

    /// Does this geometry have any area?
    pub fn is_area(&self) -> bool {
        !self.polygons.is_empty()
    }

    /// Is this geometry completely empty?
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty()
    }

    /// The total area of the polygons.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Iterates over every vertex in the geometry.
    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.polygons
            .iter()
            .flat_map(|poly| poly.rings().flatten())
            .chain(self.lines.iter().flatten())
    }

    /// The bounding box, or `None` if the geometry is empty.
    pub fn envelope(&self) -> Option<Envelope> {
        Envelope::of_points(self.points())
    }

    /// Locates a point relative to the polygonal part of this geometry.
    ///
    /// The linear part is ignored, so for a purely linear geometry this always
    /// returns [`Location::Exterior`].
    pub fn locate_in_area(&self, p: Point) -> Location {
        for poly in &self.polygons {
            match poly.locate(p) {
                Location::Exterior => {}
                loc => return loc,
            }
        }
        Location::Exterior
    }

    /// Converts this geometry to segment strings for noding, tagging them as
    /// coming from input number `geom`.
    ///
    /// Rings are closed, so their strings end where they start. Rings and lines
    /// without at least two distinct points are skipped.
    pub fn segment_strings(&self, geom: usize) -> Vec<SegmentString> {
        let mut ret = Vec::new();
        for poly in &self.polygons {
            for (i, ring) in poly.rings().enumerate() {
                let mut pts = dedup(ring.iter().copied());
                if pts.len() > 1 && pts.first() == pts.last() {
                    pts.pop();
                }
                if pts.len() < 2 {
                    continue;
                }
                let source = EdgeSource::ring(geom, i > 0, is_ccw(&pts));
                pts.push(pts[0]);
                ret.push(SegmentString::new(pts, source));
            }
        }
        for line in &self.lines {
            let pts = dedup(line.iter().copied());
            if pts.len() >= 2 {
                ret.push(SegmentString::new(pts, EdgeSource::line(geom)));
            }
        }
        ret
    }
}

fn dedup(pts: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut ret: Vec<Point> = Vec::new();
    for p in pts {
        if ret.last() != Some(&p) {
            ret.push(p);
        }
    }
    ret
}

struct WktRing<'a>(&'a [Point]);

impl std::fmt::Display for WktRing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        if let Some(first) = self.0.first() {
            write!(f, ", {first}")?;
        }
        write!(f, ")")
    }
}

struct WktLine<'a>(&'a [Point]);

impl std::fmt::Display for WktLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")
    }
}

struct WktPolygonBody<'a>(&'a Polygon);

impl std::fmt::Display for WktPolygonBody<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, ring) in self.0.rings().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", WktRing(ring))?;
        }
        write!(f, ")")
    }
}

/// Formats as WKT, with closed rings.
impl std::fmt::Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POLYGON {}", WktPolygonBody(self))
    }
}

/// Formats as WKT, using the simplest geometry type that fits.
impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let polys = || -> String {
            match self.polygons.as_slice() {
                [poly] => poly.to_string(),
                polys => {
                    let bodies: Vec<_> = polys.iter().map(|p| WktPolygonBody(p).to_string()).collect();
                    format!("MULTIPOLYGON ({})", bodies.join(", "))
                }
            }
        };
        let lines = || -> String {
            match self.lines.as_slice() {
                [line] => format!("LINESTRING {}", WktLine(line)),
                lines => {
                    let bodies: Vec<_> = lines.iter().map(|l| WktLine(l).to_string()).collect();
                    format!("MULTILINESTRING ({})", bodies.join(", "))
                }
            }
        };

        match (self.polygons.is_empty(), self.lines.is_empty()) {
            (true, true) => write!(f, "GEOMETRYCOLLECTION EMPTY"),
            (false, true) => write!(f, "{}", polys()),
            (true, false) => write!(f, "{}", lines()),
            (false, false) => write!(f, "GEOMETRYCOLLECTION ({}, {})", polys(), lines()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geom::tests::p;

    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]
    }

    pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry {
        Geometry::from_polygons([Polygon::new(rect(x0, y0, x1, y1), Vec::new())])
    }

    #[test]
    fn locate_with_hole() {
        let poly = Polygon::new(rect(0.0, 0.0, 10.0, 10.0), vec![rect(2.0, 2.0, 4.0, 4.0)]);
        assert_eq!(poly.locate(p(1.0, 1.0)), Location::Interior);
        assert_eq!(poly.locate(p(3.0, 3.0)), Location::Exterior);
        assert_eq!(poly.locate(p(2.0, 3.0)), Location::Boundary);
        assert_eq!(poly.locate(p(10.0, 3.0)), Location::Boundary);
        assert_eq!(poly.locate(p(11.0, 3.0)), Location::Exterior);
        assert_eq!(poly.area(), 96.0);
    }

    #[test]
    fn locate_island_in_hole() {
        let geom = Geometry::from_polygons([
            Polygon::new(rect(0.0, 0.0, 10.0, 10.0), vec![rect(2.0, 2.0, 8.0, 8.0)]),
            Polygon::new(rect(4.0, 4.0, 6.0, 6.0), Vec::new()),
        ]);
        assert_eq!(geom.locate_in_area(p(5.0, 5.0)), Location::Interior);
        assert_eq!(geom.locate_in_area(p(3.0, 5.0)), Location::Exterior);
        assert_eq!(geom.locate_in_area(p(1.0, 5.0)), Location::Interior);

        let lines = Geometry::from_lines([vec![p(0.0, 0.0), p(1.0, 1.0)]]);
        assert_eq!(lines.locate_in_area(p(0.5, 0.5)), Location::Exterior);
    }

    #[test]
    fn ring_strings() {
        let mut shell = rect(0.0, 0.0, 2.0, 2.0);
        shell.push(shell[0]);
        let poly = Polygon::new(shell, vec![rect(0.5, 0.5, 1.0, 1.0)]);
        assert_eq!(poly.shell.len(), 4);

        let geom = Geometry {
            polygons: vec![poly],
            lines: vec![vec![p(5.0, 5.0), p(5.0, 5.0)], vec![p(5.0, 5.0), p(6.0, 5.0)]],
        };
        let strings = geom.segment_strings(1);
        assert_eq!(strings.len(), 3);
        // A counter-clockwise shell has its interior on the left.
        assert_eq!(strings[0].source().depth_delta, -1);
        assert_eq!(strings[0].points().len(), 5);
        assert_eq!(strings[0].points()[0], strings[0].points()[4]);
        // A counter-clockwise hole has the polygon interior on the right.
        assert!(strings[1].source().is_hole);
        assert_eq!(strings[1].source().depth_delta, 1);
        assert_eq!(strings[2].source(), EdgeSource::line(1));
    }

    #[test]
    fn bad_coords() {
        assert_matches::assert_matches!(
            Polygon::from_coords(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)], &[]),
            Err(Error::NaN)
        );
        assert_matches::assert_matches!(
            Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0)], &[vec![(f64::INFINITY, 0.0)]]),
            Err(Error::Infinity)
        );
    }

    #[test]
    fn wkt() {
        let geom = Geometry {
            polygons: vec![Polygon::new(
                rect(0.0, 0.0, 2.0, 2.0),
                vec![rect(0.5, 0.5, 1.0, 1.0)],
            )],
            lines: vec![vec![p(3.0, 0.0), p(4.0, -1.5)]],
        };
        insta::assert_snapshot!(
            geom,
            @"GEOMETRYCOLLECTION (POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0), (0.5 0.5, 1 0.5, 1 1, 0.5 1, 0.5 0.5)), LINESTRING (3 0, 4 -1.5))"
        );
        insta::assert_snapshot!(
            square(0.0, 0.0, 1.0, 1.0),
            @"POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))"
        );
        insta::assert_snapshot!(Geometry::empty(), @"GEOMETRYCOLLECTION EMPTY");
    }
}
