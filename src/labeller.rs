//! Computing the topological labels of a [`Graph`], and deciding which edges
//! belong to the result of a boolean operation.
//!
//! The labels start out knowing only what the edges themselves know: boundary
//! edges know which side of them is inside their polygon, and everything else
//! knows nothing. The labeller fills in the rest in a fixed sequence of phases,
//! each of which depends on the ones before it:
//!
//! 1. Around each node, walk the boundary edges in rotation order to find the
//!    location of every other edge at that node.
//! 2. Flood those locations along connected non-boundary edges.
//! 3. Resolve edges that came from collapsed rings, and flood again.
//! 4. Resolve whatever is left (which must be disconnected from the boundary of
//!    the geometry in question) by point location in the original input.

use std::collections::VecDeque;

use crate::{
    graph::{Graph, HalfEdgeIdx},
    input::Geometry,
    label::{GeomLabel, Location, Side},
    BooleanOp, Error,
};

/// The order in which the linear flood fill processes its work list.
///
/// This doesn't affect the final labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PropagationOrder {
    /// Process the most recently discovered edge first.
    #[default]
    Lifo,
    /// Process the least recently discovered edge first.
    Fifo,
}

/// Labels the edges of a graph relative to the two input geometries.
#[derive(Debug)]
pub struct Labeller<'a> {
    graph: &'a mut Graph,
    inputs: &'a [Geometry; 2],
    order: PropagationOrder,
}

impl<'a> Labeller<'a> {
    /// Creates a labeller for a graph that was built from `inputs`.
    pub fn new(graph: &'a mut Graph, inputs: &'a [Geometry; 2]) -> Self {
        Labeller {
            graph,
            inputs,
            order: PropagationOrder::default(),
        }
    }

    /// Chooses the order of the linear flood fill.
    pub fn with_order(mut self, order: PropagationOrder) -> Self {
        self.order = order;
        self
    }

    fn has_edges(&self, geom: usize) -> bool {
        !self.inputs[geom].is_empty()
    }

    fn geoms(&self) -> impl Iterator<Item = usize> {
        let second = self.has_edges(1);
        std::iter::once(0).chain(second.then_some(1))
    }

    /// Computes all the locations in all the labels.
    ///
    /// Afterwards, every label is complete. This fails if some node has
    /// inconsistent boundary edges around it, which means either that one of the
    /// inputs wasn't valid or that the noding went wrong.
    pub fn compute_labelling(&mut self) -> Result<(), Error> {
        let nodes: Vec<HalfEdgeIdx> = self.graph.nodes().map(|(_, h)| h).collect();
        for &node in &nodes {
            for geom in self.geoms() {
                self.propagate_area_locations(node, geom)?;
            }
        }
        self.label_connected_linear_edges();

        self.label_collapsed_edges();
        self.label_connected_linear_edges();

        self.label_disconnected_edges();

        debug_assert!(self
            .graph
            .edges()
            .all(|e| self.graph.label(e).is_complete()));
        tracing::debug!(
            edges = self.graph.edge_count(),
            nodes = nodes.len(),
            "labelling complete"
        );
        Ok(())
    }

    /// Walks once around the node that `node` leaves from, assigning locations to
    /// the non-boundary edges there according to the boundary edges of `geom`.
    fn propagate_area_locations(&mut self, node: HalfEdgeIdx, geom: usize) -> Result<(), Error> {
        let graph = &mut *self.graph;
        let star: Vec<HalfEdgeIdx> = graph.rotation(node).collect();
        if star.len() == 1 {
            return Ok(());
        }
        let Some(start_pos) = star
            .iter()
            .position(|h| graph.label(h.edge()).geom(geom).is_boundary())
        else {
            return Ok(());
        };

        let start = star[start_pos];
        let mut curr = graph
            .location(start, geom, Side::Left)
            .unwrap_or(Location::Exterior);
        for i in 1..star.len() {
            let h = star[(start_pos + i) % star.len()];
            let label = graph.label_mut(h.edge()).geom_mut(geom);
            if !label.is_boundary() {
                label.set_line_location(curr);
                continue;
            }
            let right = graph.location(h, geom, Side::Right);
            if right != Some(curr) {
                let point = graph.origin(h);
                tracing::debug!(?point, geom, edge = ?h, "side location conflict");
                return Err(Error::SideLocationConflict { geom, point });
            }
            if let Some(left) = graph.location(h, geom, Side::Left) {
                curr = left;
            }
        }
        Ok(())
    }

    fn label_connected_linear_edges(&mut self) {
        for geom in self.geoms() {
            self.propagate_line_locations(geom);
        }
    }

    /// Floods known locations along non-boundary edges.
    fn propagate_line_locations(&mut self, geom: usize) {
        let mut work: VecDeque<HalfEdgeIdx> = self
            .graph
            .half_edges()
            .filter(|h| {
                let label = self.graph.label(h.edge()).geom(geom);
                !label.is_boundary() && label.line_location().is_some()
            })
            .collect();

        let mut assigned = 0;
        loop {
            let next = match self.order {
                PropagationOrder::Lifo => work.pop_back(),
                PropagationOrder::Fifo => work.pop_front(),
            };
            let Some(h) = next else {
                break;
            };
            assigned += self.propagate_line_location(h, geom, &mut work);
        }
        tracing::trace!(geom, assigned, "propagated line locations");
    }

    /// Copies the location of `h` to all the unknown edges around its origin,
    /// and queues up their far ends. Returns the number of edges updated.
    fn propagate_line_location(
        &mut self,
        h: HalfEdgeIdx,
        geom: usize,
        work: &mut VecDeque<HalfEdgeIdx>,
    ) -> usize {
        let Some(loc) = self.graph.label(h.edge()).geom(geom).line_location() else {
            return 0;
        };
        // A purely linear geometry has no interior to spread.
        if !self.inputs[geom].is_area() && loc != Location::Exterior {
            return 0;
        }

        let star: Vec<HalfEdgeIdx> = self.graph.rotation(h).skip(1).collect();
        let mut count = 0;
        for e in star {
            let label = self.graph.label_mut(e.edge()).geom_mut(geom);
            if label.is_line_location_unknown() {
                label.set_line_location(loc);
                work.push_back(e.twin());
                count += 1;
            }
        }
        count
    }

    /// Assigns locations to collapsed edges that we couldn't reach from the
    /// boundary: a collapsed hole is inside its polygon, and a collapsed shell
    /// is outside it.
    fn label_collapsed_edges(&mut self) {
        let edges: Vec<_> = self.graph.edges().collect();
        for e in edges {
            for geom in 0..2 {
                let label = self.graph.label_mut(e).geom_mut(geom);
                if let GeomLabel::Collapse {
                    is_hole,
                    location: None,
                } = *label
                {
                    let loc = if is_hole {
                        Location::Interior
                    } else {
                        Location::Exterior
                    };
                    tracing::trace!(edge = ?e, geom, ?loc, "labelled collapsed edge");
                    label.set_line_location(loc);
                }
            }
        }
    }

    /// Assigns locations to all edges that are still unknown, by locating their
    /// endpoints in the original input.
    fn label_disconnected_edges(&mut self) {
        let edges: Vec<_> = self.graph.edges().collect();
        for e in edges {
            for geom in 0..2 {
                if !self.graph.label(e).geom(geom).is_line_location_unknown() {
                    continue;
                }
                let input = &self.inputs[geom];
                let loc = if !input.is_area() {
                    Location::Exterior
                } else {
                    let pts = self.graph.points(e);
                    let ends = [pts[0], pts[pts.len() - 1]];
                    if ends
                        .iter()
                        .all(|p| input.locate_in_area(*p) != Location::Exterior)
                    {
                        Location::Interior
                    } else {
                        Location::Exterior
                    }
                };
                tracing::trace!(edge = ?e, geom, ?loc, "labelled disconnected edge");
                self.graph
                    .label_mut(e)
                    .geom_mut(geom)
                    .set_line_location(loc);
            }
        }
    }

    /// Marks the half-edges that bound the result area of `op`.
    ///
    /// A half-edge is marked if it's on the boundary of at least one input and
    /// the region on its right belongs to the result. This should only be called
    /// after [`compute_labelling`](Self::compute_labelling).
    pub fn mark_result_area_edges(&mut self, op: BooleanOp) {
        let half_edges: Vec<_> = self.graph.half_edges().collect();
        let mut marked = 0;
        for h in half_edges {
            let label = *self.graph.label(h.edge());
            if !label.is_boundary_either() {
                continue;
            }
            let inside = |geom: usize| {
                matches!(
                    label.location(geom, Side::Right, h.is_forward()),
                    Some(Location::Interior | Location::Boundary)
                )
            };
            if op.contains(inside(0), inside(1)) {
                self.graph.set_in_result(h, true);
                marked += 1;
            }
        }
        tracing::debug!(?op, marked, "marked result area edges");
    }

    /// Unmarks edges whose two halves are both marked.
    ///
    /// Such an edge has the result on both sides, so it separates two parts of
    /// the result that should be merged.
    pub fn unmark_duplicate_edges(&mut self) {
        let edges: Vec<_> = self.graph.edges().collect();
        for e in edges {
            let (fwd, bwd) = (e.forward(), e.backward());
            if self.graph.is_in_result(fwd) && self.graph.is_in_result(bwd) {
                self.graph.set_in_result(fwd, false);
                self.graph.set_in_result(bwd, false);
            }
        }
    }
}
