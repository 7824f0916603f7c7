//! Segment strings: the input edges, and the nodes that split them into graph edges.

use crate::geom::Point;

/// An index into a collection of segment strings.
///
/// Like all of our indices, this only means something relative to the collection
/// it came from. Be careful not to mix them up.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct StringIdx(pub usize);

impl std::fmt::Debug for StringIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ss_{}", self.0)
    }
}

/// Is a segment string part of an area boundary, or part of a linear geometry?
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum SourceDim {
    /// From a line string.
    Line,
    /// From a polygon ring.
    Area,
}

/// Where a segment string came from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub struct EdgeSource {
    /// Which input geometry (0 or 1).
    pub geom: usize,
    /// Line or area.
    pub dim: SourceDim,
    /// For area edges, whether the ring was a hole.
    pub is_hole: bool,
    /// For area edges, `1` if the interior of the polygon is to the right of the
    /// string's direction and `-1` if it's to the left. Always `0` for lines.
    pub depth_delta: i32,
}

impl EdgeSource {
    /// The source of a line string.
    pub fn line(geom: usize) -> Self {
        EdgeSource {
            geom,
            dim: SourceDim::Line,
            is_hole: false,
            depth_delta: 0,
        }
    }

    /// The source of a polygon ring.
    ///
    /// `ring_is_ccw` is the orientation of the ring as the string traverses it.
    pub fn ring(geom: usize, is_hole: bool, ring_is_ccw: bool) -> Self {
        // Walking along a clockwise shell, the interior is on the right. For holes it's
        // the other way around.
        let interior_on_right = ring_is_ccw == is_hole;
        EdgeSource {
            geom,
            dim: SourceDim::Area,
            is_hole,
            depth_delta: if interior_on_right { 1 } else { -1 },
        }
    }
}

/// A position along a segment string where it needs to be split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentNode {
    /// The point to split at.
    pub point: Point,
    /// The index of the segment containing the node. (Segment `i` goes from
    /// vertex `i` to vertex `i + 1`.)
    pub segment: usize,
    // Position along the segment, for sorting. This is the dot product with the
    // segment direction, so it isn't normalized.
    dist: f64,
}

/// A polyline coming from one input edge, together with the nodes that will
/// split it up.
#[derive(Clone, Debug)]
pub struct SegmentString {
    points: Vec<Point>,
    source: EdgeSource,
    nodes: Vec<SegmentNode>,
}

impl SegmentString {
    /// Creates a segment string with no nodes.
    pub fn new(points: Vec<Point>, source: EdgeSource) -> Self {
        SegmentString {
            points,
            source,
            nodes: Vec::new(),
        }
    }

    /// The vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Where this string came from.
    pub fn source(&self) -> EdgeSource {
        self.source
    }

    /// The nodes that have been added so far, in no particular order.
    pub fn nodes(&self) -> &[SegmentNode] {
        &self.nodes
    }

    /// Iterates over the segments of this string, as pairs of points.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Records a node on segment `segment`.
    pub fn add_node(&mut self, point: Point, segment: usize) {
        debug_assert!(segment + 1 < self.points.len());
        let start = self.points[segment];
        let dir = self.points[segment + 1] - start;
        let dist = (point - start).dot(dir);
        self.nodes.push(SegmentNode {
            point,
            segment,
            dist,
        });
    }

    /// Splits this string at all of its nodes (and at its endpoints), returning
    /// the pieces in order.
    ///
    /// Pieces never have repeated consecutive points, and pieces without at
    /// least two distinct points are dropped.
    pub fn noded_substrings(&self) -> Vec<Vec<Point>> {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return Vec::new();
        };
        if self.points.len() < 2 {
            return Vec::new();
        }

        let mut nodes = self.nodes.clone();
        nodes.push(SegmentNode {
            point: first,
            segment: 0,
            dist: 0.0,
        });
        let last_seg = self.points.len() - 2;
        nodes.push(SegmentNode {
            point: last,
            segment: last_seg,
            dist: (last - self.points[last_seg]).dot(last - self.points[last_seg]),
        });
        nodes.sort_by(|a, b| {
            a.segment
                .cmp(&b.segment)
                .then(a.dist.total_cmp(&b.dist))
        });
        nodes.dedup_by(|a, b| a.segment == b.segment && a.point == b.point);

        let mut ret = Vec::new();
        for pair in nodes.windows(2) {
            let (n0, n1) = (pair[0], pair[1]);
            let mut pts = vec![n0.point];
            for &p in &self.points[(n0.segment + 1)..=n1.segment] {
                push_distinct(&mut pts, p);
            }
            push_distinct(&mut pts, n1.point);
            if pts.len() >= 2 {
                ret.push(pts);
            }
        }
        ret
    }
}

fn push_distinct(pts: &mut Vec<Point>, p: Point) {
    if pts.last() != Some(&p) {
        pts.push(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::p;

    #[test]
    fn depth_delta() {
        assert_eq!(EdgeSource::ring(0, false, false).depth_delta, 1);
        assert_eq!(EdgeSource::ring(0, false, true).depth_delta, -1);
        assert_eq!(EdgeSource::ring(0, true, true).depth_delta, 1);
        assert_eq!(EdgeSource::ring(1, true, false).depth_delta, -1);
        assert_eq!(EdgeSource::line(1).depth_delta, 0);
    }

    #[test]
    fn split_at_nodes() {
        let mut ss = SegmentString::new(
            vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0)],
            EdgeSource::line(0),
        );
        ss.add_node(p(3.0, 0.0), 0);
        ss.add_node(p(1.0, 0.0), 0);
        ss.add_node(p(4.0, 0.0), 0);
        ss.add_node(p(4.0, 0.0), 1);
        ss.add_node(p(4.0, 4.0), 1);

        assert_eq!(
            ss.noded_substrings(),
            vec![
                vec![p(0.0, 0.0), p(1.0, 0.0)],
                vec![p(1.0, 0.0), p(3.0, 0.0)],
                vec![p(3.0, 0.0), p(4.0, 0.0)],
                vec![p(4.0, 0.0), p(4.0, 4.0)],
            ]
        );
    }

    #[test]
    fn unnoded_string_is_one_piece() {
        let ss = SegmentString::new(
            vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0)],
            EdgeSource::line(0),
        );
        assert_eq!(ss.noded_substrings(), vec![ss.points().to_vec()]);
    }

    #[test]
    fn closed_ring() {
        let mut ss = SegmentString::new(
            vec![p(0.0, 0.0), p(2.0, 0.0), p(0.0, 2.0), p(0.0, 0.0)],
            EdgeSource::ring(0, false, true),
        );
        ss.add_node(p(2.0, 0.0), 1);
        assert_eq!(
            ss.noded_substrings(),
            vec![
                vec![p(0.0, 0.0), p(2.0, 0.0)],
                vec![p(2.0, 0.0), p(0.0, 2.0), p(0.0, 0.0)],
            ]
        );
    }

    #[test]
    fn degenerate() {
        let ss = SegmentString::new(vec![p(1.0, 1.0)], EdgeSource::line(0));
        assert!(ss.noded_substrings().is_empty());
        let ss = SegmentString::new(Vec::new(), EdgeSource::line(0));
        assert!(ss.noded_substrings().is_empty());
    }
}
