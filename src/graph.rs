//! A half-edge planar graph built from noded edges.
//!
//! Every undirected edge is stored once, along with its [`Label`]. Each edge has
//! two halves, one pointing in each direction. The half-edges leaving a single
//! point are linked together in a cycle, sorted counter-clockwise by their
//! outgoing direction.

use std::collections::{BTreeMap, HashMap};

use crate::{
    geom::{orientation, Orientation, Point},
    label::{GeomLabel, Label, Location, Side},
    segments::{EdgeSource, SourceDim},
};

/// An index into the edges of a [`Graph`].
///
/// There's no compile-time magic preventing misuse of this index, but you
/// should only use this to index into the [`Graph`] that you got it from.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct EdgeIdx(pub usize);

impl EdgeIdx {
    /// The half-edge pointing in the same direction as the edge's points.
    pub fn forward(self) -> HalfEdgeIdx {
        HalfEdgeIdx {
            idx: self,
            forward: true,
        }
    }

    /// The half-edge pointing in the opposite direction to the edge's points.
    pub fn backward(self) -> HalfEdgeIdx {
        HalfEdgeIdx {
            idx: self,
            forward: false,
        }
    }
}

/// An index that refers to one direction of an edge.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct HalfEdgeIdx {
    idx: EdgeIdx,
    forward: bool,
}

impl HalfEdgeIdx {
    /// The undirected edge that this is half of.
    pub fn edge(self) -> EdgeIdx {
        self.idx
    }

    /// Does this half point the same way as the edge's points?
    pub fn is_forward(self) -> bool {
        self.forward
    }

    /// The other half of the same edge.
    pub fn twin(self) -> Self {
        Self {
            idx: self.idx,
            forward: !self.forward,
        }
    }
}

impl std::fmt::Debug for HalfEdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.forward {
            write!(f, "e{}->", self.idx.0)
        } else {
            write!(f, "e{}<-", self.idx.0)
        }
    }
}

/// A vector indexed by half-edges.
#[derive(Clone, Debug, Hash, PartialEq, Eq, serde::Serialize)]
struct HalfEdgeVec<T> {
    forward: Vec<T>,
    backward: Vec<T>,
}

impl<T: Clone> HalfEdgeVec<T> {
    fn filled(len: usize, val: T) -> Self {
        Self {
            forward: vec![val.clone(); len],
            backward: vec![val; len],
        }
    }
}

impl<T> std::ops::Index<HalfEdgeIdx> for HalfEdgeVec<T> {
    type Output = T;

    fn index(&self, index: HalfEdgeIdx) -> &Self::Output {
        if index.forward {
            &self.forward[index.idx.0]
        } else {
            &self.backward[index.idx.0]
        }
    }
}

impl<T> std::ops::IndexMut<HalfEdgeIdx> for HalfEdgeVec<T> {
    fn index_mut(&mut self, index: HalfEdgeIdx) -> &mut T {
        if index.forward {
            &mut self.forward[index.idx.0]
        } else {
            &mut self.backward[index.idx.0]
        }
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, serde::Serialize)]
struct Neighbors {
    clockwise: HalfEdgeIdx,
    counter_clockwise: HalfEdgeIdx,
}

impl std::fmt::Debug for Neighbors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} o {:?}", self.counter_clockwise, self.clockwise)
    }
}

/// Accumulates the sources of all the noded edges that got merged into one
/// graph edge, for one input geometry.
#[derive(Clone, Copy, Debug, Default)]
struct MergedSource {
    dim: Option<SourceDim>,
    // Relative to the direction of the graph edge.
    depth_delta: i32,
    any_shell: bool,
}

impl MergedSource {
    fn add(&mut self, source: &EdgeSource, same_direction: bool) {
        self.dim = self.dim.max(Some(source.dim));
        if same_direction {
            self.depth_delta += source.depth_delta;
        } else {
            self.depth_delta -= source.depth_delta;
        }
        if source.dim == SourceDim::Area && !source.is_hole {
            self.any_shell = true;
        }
    }

    fn label(&self) -> GeomLabel {
        match self.dim {
            None => GeomLabel::Unrelated { location: None },
            Some(SourceDim::Line) => GeomLabel::Line { location: None },
            Some(SourceDim::Area) => {
                let is_hole = !self.any_shell;
                match self.depth_delta.signum() {
                    0 => GeomLabel::Collapse {
                        is_hole,
                        location: None,
                    },
                    1 => GeomLabel::Boundary {
                        is_hole,
                        left: Location::Exterior,
                        right: Location::Interior,
                    },
                    _ => GeomLabel::Boundary {
                        is_hole,
                        left: Location::Interior,
                        right: Location::Exterior,
                    },
                }
            }
        }
    }
}

/// Compares the directions of two half-edges leaving the same point, by the
/// counter-clockwise angle they make with the positive `x` axis.
fn compare_directions(origin: Point, a: Point, b: Point) -> std::cmp::Ordering {
    let qa = (a - origin).quadrant();
    let qb = (b - origin).quadrant();
    qa.cmp(&qb).then_with(|| match orientation(origin, a, b) {
        Orientation::CounterClockwise => std::cmp::Ordering::Less,
        Orientation::Clockwise => std::cmp::Ordering::Greater,
        Orientation::Collinear => std::cmp::Ordering::Equal,
    })
}

/// The planar graph of noded edges.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Graph {
    /// The points of each edge, in the forward direction.
    points: Vec<Vec<Point>>,
    labels: Vec<Label>,
    neighbors: HalfEdgeVec<Neighbors>,
    in_result: HalfEdgeVec<bool>,
    /// For each distinct point, one of the half-edges leaving it.
    nodes: BTreeMap<Point, HalfEdgeIdx>,
}

impl Graph {
    /// Builds a graph from a collection of noded edges.
    ///
    /// Each edge must have at least two distinct points, and the edges must be
    /// fully noded (no two of them cross or touch except at their endpoints).
    /// Coincident edges (ones with the same points, in either direction) are
    /// merged into a single graph edge, whose label combines all of their sources.
    pub fn new(edges: impl IntoIterator<Item = (Vec<Point>, EdgeSource)>) -> Self {
        let mut points: Vec<Vec<Point>> = Vec::new();
        let mut sources: Vec<[MergedSource; 2]> = Vec::new();
        let mut by_key: HashMap<Vec<Point>, EdgeIdx> = HashMap::new();

        for (pts, source) in edges {
            debug_assert!(pts.len() >= 2);
            let reversed: Vec<Point> = pts.iter().rev().copied().collect();
            let key = pts.clone().min(reversed);
            let idx = *by_key.entry(key).or_insert_with(|| {
                points.push(pts.clone());
                sources.push(Default::default());
                EdgeIdx(points.len() - 1)
            });
            let same_direction = points[idx.0] == pts;
            sources[idx.0][source.geom].add(&source, same_direction);
        }

        let labels: Vec<Label> = sources
            .iter()
            .map(|[s0, s1]| Label::new(s0.label(), s1.label()))
            .collect();

        let placeholder = Neighbors {
            clockwise: EdgeIdx(0).forward(),
            counter_clockwise: EdgeIdx(0).forward(),
        };
        let mut ret = Graph {
            neighbors: HalfEdgeVec::filled(points.len(), placeholder),
            in_result: HalfEdgeVec::filled(points.len(), false),
            points,
            labels,
            nodes: BTreeMap::new(),
        };
        ret.link_nodes();
        ret
    }

    fn link_nodes(&mut self) {
        let mut stars: BTreeMap<Point, Vec<HalfEdgeIdx>> = BTreeMap::new();
        for h in self.half_edges() {
            stars.entry(self.origin(h)).or_default().push(h);
        }

        for (origin, mut star) in stars {
            star.sort_by(|&a, &b| {
                compare_directions(origin, self.direction_point(a), self.direction_point(b))
            });
            let n = star.len();
            for (i, &h) in star.iter().enumerate() {
                self.neighbors[h] = Neighbors {
                    clockwise: star[(i + n - 1) % n],
                    counter_clockwise: star[(i + 1) % n],
                };
            }
            self.nodes.insert(origin, star[0]);
        }
    }

    /// The number of (undirected) edges.
    pub fn edge_count(&self) -> usize {
        self.points.len()
    }

    /// Iterates over all the edges.
    pub fn edges(&self) -> impl Iterator<Item = EdgeIdx> {
        (0..self.points.len()).map(EdgeIdx)
    }

    /// Iterates over all the half-edges.
    pub fn half_edges(&self) -> impl Iterator<Item = HalfEdgeIdx> {
        self.edges().flat_map(|e| [e.forward(), e.backward()])
    }

    /// Iterates over the nodes, in increasing order of their points. Each node
    /// comes with one of the half-edges leaving it.
    pub fn nodes(&self) -> impl Iterator<Item = (Point, HalfEdgeIdx)> + '_ {
        self.nodes.iter().map(|(p, h)| (*p, *h))
    }

    /// Returns one of the half-edges leaving a point, if there are any.
    pub fn node_edge(&self, p: Point) -> Option<HalfEdgeIdx> {
        self.nodes.get(&p).copied()
    }

    /// The points of an edge, in its forward direction.
    pub fn points(&self, e: EdgeIdx) -> &[Point] {
        &self.points[e.0]
    }

    /// The points of a half-edge, in its direction.
    pub fn half_edge_points(&self, h: HalfEdgeIdx) -> Vec<Point> {
        let mut ret = self.points[h.idx.0].clone();
        if !h.forward {
            ret.reverse();
        }
        ret
    }

    /// The point that a half-edge starts from.
    pub fn origin(&self, h: HalfEdgeIdx) -> Point {
        let pts = &self.points[h.idx.0];
        if h.forward {
            pts[0]
        } else {
            pts[pts.len() - 1]
        }
    }

    /// The point that a half-edge ends at.
    pub fn dest(&self, h: HalfEdgeIdx) -> Point {
        self.origin(h.twin())
    }

    /// The second point of a half-edge, which determines its outgoing direction.
    fn direction_point(&self, h: HalfEdgeIdx) -> Point {
        let pts = &self.points[h.idx.0];
        if h.forward {
            pts[1]
        } else {
            pts[pts.len() - 2]
        }
    }

    /// The label of an edge.
    pub fn label(&self, e: EdgeIdx) -> &Label {
        &self.labels[e.0]
    }

    /// Mutable access to the label of an edge.
    pub fn label_mut(&mut self, e: EdgeIdx) -> &mut Label {
        &mut self.labels[e.0]
    }

    /// The location of one side of a half-edge, relative to input `geom`.
    pub fn location(&self, h: HalfEdgeIdx, geom: usize, side: Side) -> Option<Location> {
        self.labels[h.idx.0].location(geom, side, h.forward)
    }

    /// The next half-edge counter-clockwise around the origin.
    pub fn ccw(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self.neighbors[h].counter_clockwise
    }

    /// The next half-edge clockwise around the origin.
    pub fn cw(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self.neighbors[h].clockwise
    }

    /// Iterates over all the half-edges with the same origin as `h`, in
    /// counter-clockwise order starting from `h`.
    pub fn rotation(&self, h: HalfEdgeIdx) -> impl Iterator<Item = HalfEdgeIdx> + '_ {
        let mut next = Some(h);
        std::iter::from_fn(move || {
            let cur = next?;
            let succ = self.ccw(cur);
            next = (succ != h).then_some(succ);
            Some(cur)
        })
    }

    /// The number of half-edges leaving the origin of `h`.
    pub fn degree(&self, h: HalfEdgeIdx) -> usize {
        self.rotation(h).count()
    }

    /// Is this half-edge marked as part of the result area's boundary?
    pub fn is_in_result(&self, h: HalfEdgeIdx) -> bool {
        self.in_result[h]
    }

    /// Marks or unmarks a half-edge as part of the result area's boundary.
    pub fn set_in_result(&mut self, h: HalfEdgeIdx, in_result: bool) {
        self.in_result[h] = in_result;
    }

    /// Iterates over the half-edges that are marked as part of the result.
    pub fn result_half_edges(&self) -> impl Iterator<Item = HalfEdgeIdx> + '_ {
        self.half_edges().filter(|h| self.in_result[*h])
    }
}
