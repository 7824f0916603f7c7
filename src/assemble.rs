//! Turning the marked edges of a labelled graph into output geometry.

use std::collections::HashSet;

use crate::{
    geom::{locate_in_ring, signed_area, Envelope, Point},
    graph::{EdgeIdx, Graph, HalfEdgeIdx},
    input::{Geometry, Polygon},
    label::{Dim, GeomLabel, Location},
    BooleanOp,
};

/// A closed ring of result edges.
#[derive(Clone, Debug)]
struct Ring {
    /// The points, without repeating the first one at the end. The ring starts
    /// at its smallest point.
    points: Vec<Point>,
    signed_area: f64,
    envelope: Envelope,
}

impl Ring {
    fn new(mut points: Vec<Point>) -> Option<Ring> {
        let mut distinct = points.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < 3 {
            return None;
        }

        let min_pos = points
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| **p)
            .map(|(i, _)| i)?;
        points.rotate_left(min_pos);
        let envelope = Envelope::of_points(&points)?;
        Some(Ring {
            signed_area: signed_area(&points),
            points,
            envelope,
        })
    }

    /// The result area is on the right of every result edge, so shells wind
    /// clockwise.
    fn is_shell(&self) -> bool {
        self.signed_area < 0.0
    }

    /// Is the hole inside this shell?
    ///
    /// We test a point of the hole that isn't on the shell. If there isn't one,
    /// the hole isn't inside.
    fn contains_hole(&self, hole: &Ring) -> bool {
        if !self.envelope.covers(&hole.envelope) || self.envelope == hole.envelope {
            return false;
        }
        for p in &hole.points {
            match locate_in_ring(*p, &self.points) {
                Location::Boundary => continue,
                Location::Interior => return true,
                Location::Exterior => return false,
            }
        }
        false
    }
}

/// Walks the marked half-edges of `graph` into closed rings.
///
/// The walk from a half-edge continues along the first marked half-edge that is
/// counter-clockwise of it at its destination. Since the result area is on the
/// right of every marked half-edge, this traces out the boundaries of the faces
/// of the result.
fn build_rings(graph: &Graph) -> Vec<Ring> {
    let max_steps = 2 * graph.edge_count();
    let mut visited: HashSet<HalfEdgeIdx> = HashSet::new();
    let mut ret = Vec::new();

    for start in graph.result_half_edges() {
        if visited.contains(&start) {
            continue;
        }
        let mut points = Vec::new();
        let mut h = start;
        let mut closed = false;
        for _ in 0..max_steps {
            visited.insert(h);
            let pts = graph.half_edge_points(h);
            points.extend_from_slice(&pts[..pts.len() - 1]);

            let next = graph
                .rotation(h.twin())
                .skip(1)
                .find(|c| graph.is_in_result(*c));
            match next {
                Some(n) if n == start => {
                    closed = true;
                    break;
                }
                Some(n) if !visited.contains(&n) => h = n,
                _ => break,
            }
        }

        if !closed {
            tracing::warn!(?start, "result edges don't form a closed ring");
            continue;
        }
        match Ring::new(points) {
            Some(ring) => ret.push(ring),
            None => tracing::trace!(?start, "dropping degenerate ring"),
        }
    }
    ret
}

/// Assembles the marked half-edges of a labelled graph into polygons.
///
/// Each hole is assigned to the smallest shell containing it. Holes that aren't
/// inside any shell (which can only happen if something went wrong earlier)
/// are dropped.
pub fn build_polygons(graph: &Graph) -> Vec<Polygon> {
    let (shells, holes): (Vec<Ring>, Vec<Ring>) =
        build_rings(graph).into_iter().partition(Ring::is_shell);
    tracing::debug!(
        shells = shells.len(),
        holes = holes.len(),
        "assembled rings"
    );

    let mut ret: Vec<Polygon> = shells
        .iter()
        .map(|s| Polygon::new(s.points.clone(), Vec::new()))
        .collect();
    for hole in holes {
        let container = shells
            .iter()
            .enumerate()
            .filter(|(_, shell)| shell.contains_hole(&hole))
            .min_by(|(_, a), (_, b)| a.signed_area.abs().total_cmp(&b.signed_area.abs()))
            .map(|(i, _)| i);
        match container {
            Some(i) => ret[i].holes.push(hole.points),
            None => tracing::warn!(point = ?hole.points[0], "dropping hole with no shell"),
        }
    }
    ret
}

/// The location of an edge relative to one input, for deciding whether it's
/// part of a linear result. Edges belonging to the input count as interior.
fn effective_location(label: &GeomLabel) -> Location {
    match label.dim() {
        Dim::Line | Dim::Collapse => Location::Interior,
        _ => label.line_location().unwrap_or(Location::Exterior),
    }
}

fn is_result_line(graph: &Graph, inputs: &[Geometry; 2], op: BooleanOp, e: EdgeIdx) -> bool {
    let label = graph.label(e);
    if label.is_boundary_either() {
        return false;
    }
    if label.geom(0).dim() != Dim::Line && label.geom(1).dim() != Dim::Line {
        return false;
    }
    // Except for intersections, an area swallows any lines inside it.
    if op != BooleanOp::Intersection {
        let in_area = (0..2).any(|g| {
            inputs[g].is_area()
                && label.geom(g).dim() != Dim::Line
                && label.geom(g).line_location() == Some(Location::Interior)
        });
        if in_area {
            return false;
        }
    }
    op.contains(
        effective_location(label.geom(0)) == Location::Interior,
        effective_location(label.geom(1)) == Location::Interior,
    )
}

/// Collects the linear part of the result of `op`.
///
/// Result edges are joined into longer lines wherever exactly two of them meet.
pub fn build_lines(graph: &Graph, inputs: &[Geometry; 2], op: BooleanOp) -> Vec<Vec<Point>> {
    let in_line: HashSet<EdgeIdx> = graph
        .edges()
        .filter(|&e| is_result_line(graph, inputs, op, e))
        .collect();
    // The other line edge at the origin of `h`, if there's exactly one.
    let continuation = |h: HalfEdgeIdx| -> Option<HalfEdgeIdx> {
        let mut others = graph
            .rotation(h)
            .filter(|c| c.edge() != h.edge() && in_line.contains(&c.edge()));
        let first = others.next()?;
        others.next().is_none().then_some(first)
    };

    let mut visited: HashSet<EdgeIdx> = HashSet::new();
    let mut ret = Vec::new();
    let mut walk = |start: HalfEdgeIdx, visited: &mut HashSet<EdgeIdx>| {
        visited.insert(start.edge());
        let mut points = graph.half_edge_points(start);
        let mut h = start;
        while let Some(next) = continuation(h.twin()) {
            if !visited.insert(next.edge()) {
                break;
            }
            points.extend_from_slice(&graph.half_edge_points(next)[1..]);
            h = next;
        }
        ret.push(points);
    };

    // Start from the ends of lines first, so that lines aren't broken up in the middle.
    for e in graph.edges().filter(|e| in_line.contains(e)) {
        for h in [e.forward(), e.backward()] {
            if !visited.contains(&e) && continuation(h).is_none() {
                walk(h, &mut visited);
            }
        }
    }
    // Whatever is left is made of closed loops.
    for e in graph.edges().filter(|e| in_line.contains(e)) {
        if !visited.contains(&e) {
            walk(e.forward(), &mut visited);
        }
    }

    tracing::debug!(lines = ret.len(), edges = in_line.len(), "assembled lines");
    ret
}
