//! The overlay pipeline: noding, graph construction, labelling and assembly.

use crate::{
    assemble::{build_lines, build_polygons},
    geom::Point,
    graph::Graph,
    input::Geometry,
    label::Label,
    labeller::Labeller,
    precision::PrecisionModel,
    segments::{EdgeSource, SegmentString},
    snap::SnapRounder,
    validate::{check_noding, NodingViolation},
    BooleanOp, Error,
};

/// An edge produced by snap-rounding, before coincident edges are merged.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodedEdge {
    /// The points of the edge, all on the grid.
    pub points: Vec<Point>,
    /// Where the edge came from.
    pub source: EdgeSource,
}

/// A merged graph edge together with its final label.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LabelledEdge {
    /// The points of the edge, all on the grid.
    pub points: Vec<Point>,
    /// The edge's relation to both inputs. The locations in it are relative to
    /// the direction of `points`.
    pub label: Label,
}

/// A snap-rounded overlay of two geometries.
///
/// The inputs are stored unrounded. Every computation rounds them afresh, and
/// nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Overlay {
    inputs: [Geometry; 2],
    rounder: SnapRounder,
}

impl Overlay {
    /// Prepares to overlay `a` and `b` on the given grid.
    pub fn new(a: Geometry, b: Geometry, precision: PrecisionModel) -> Self {
        Overlay {
            inputs: [a, b],
            rounder: SnapRounder::new(precision),
        }
    }

    /// The two inputs.
    pub fn inputs(&self) -> &[Geometry; 2] {
        &self.inputs
    }

    /// The grid that the result lives on.
    pub fn precision(&self) -> PrecisionModel {
        self.rounder.precision()
    }

    /// The unrounded segment strings of both inputs.
    pub fn segment_strings(&self) -> Vec<SegmentString> {
        self.inputs
            .iter()
            .enumerate()
            .flat_map(|(g, geom)| geom.segment_strings(g))
            .collect()
    }

    /// Snap-rounds both inputs and splits them into edges.
    ///
    /// Coincident edges are not merged, so an edge shared by both inputs
    /// appears (at least) twice.
    pub fn noded_edges(&self) -> Vec<NodedEdge> {
        let noded = self.rounder.node(&self.segment_strings());
        let edges: Vec<NodedEdge> = noded
            .iter()
            .flat_map(|ss| {
                let source = ss.source();
                ss.noded_substrings()
                    .into_iter()
                    .map(move |points| NodedEdge { points, source })
            })
            .collect();
        tracing::debug!(edges = edges.len(), "noded");
        edges
    }

    /// Builds the (unlabelled) graph of noded edges.
    pub fn graph(&self) -> Graph {
        let graph = Graph::new(
            self.noded_edges()
                .into_iter()
                .map(|edge| (edge.points, edge.source)),
        );
        tracing::debug!(
            edges = graph.edge_count(),
            nodes = graph.nodes().count(),
            "built graph"
        );
        graph
    }

    fn labelled_graph(&self) -> Result<Graph, Error> {
        let mut graph = self.graph();
        Labeller::new(&mut graph, &self.inputs).compute_labelling()?;
        Ok(graph)
    }

    /// Returns the merged edges of the overlay, with their labels fully computed.
    pub fn labelled_edges(&self) -> Result<Vec<LabelledEdge>, Error> {
        let graph = self.labelled_graph()?;
        Ok(graph
            .edges()
            .map(|e| LabelledEdge {
                points: graph.points(e).to_vec(),
                label: *graph.label(e),
            })
            .collect())
    }

    /// Computes the result of a boolean operation.
    ///
    /// The result contains the polygons of the result area, and the parts of
    /// any linear inputs that belong to the result and aren't covered by it.
    pub fn compute(&self, op: BooleanOp) -> Result<Geometry, Error> {
        let mut graph = self.labelled_graph()?;
        let mut labeller = Labeller::new(&mut graph, &self.inputs);
        labeller.mark_result_area_edges(op);
        labeller.unmark_duplicate_edges();

        let result = Geometry {
            polygons: build_polygons(&graph),
            lines: build_lines(&graph, &self.inputs, op),
        };
        tracing::debug!(
            ?op,
            polygons = result.polygons.len(),
            lines = result.lines.len(),
            "overlay complete"
        );
        Ok(result)
    }

    /// Checks that the snap-rounded edges are fully noded.
    ///
    /// This isn't part of [`compute`](Self::compute); it's for diagnosing
    /// suspicious results.
    pub fn check_noding(&self) -> Vec<NodingViolation> {
        let strings: Vec<SegmentString> = self
            .noded_edges()
            .into_iter()
            .map(|edge| SegmentString::new(edge.points, edge.source))
            .collect();
        let violations = check_noding(&strings);
        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "noding is incomplete");
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::tests::p,
        input::{
            tests::{rect, square},
            Polygon,
        },
        label::{Dim, GeomLabel, Location},
    };

    fn overlay(a: Geometry, b: Geometry, scale: f64) -> Overlay {
        Overlay::new(a, b, PrecisionModel::new(scale).unwrap())
    }

    fn polygon(pts: &[(f64, f64)]) -> Geometry {
        Geometry::from_polygons([Polygon::from_coords(pts, &[]).unwrap()])
    }

    #[test]
    fn adjacent_squares() {
        let ov = overlay(square(0.0, 0.0, 1.0, 1.0), square(1.0, 0.0, 2.0, 1.0), 1.0);
        let union = ov.compute(BooleanOp::Union).unwrap();
        assert_eq!(union.polygons.len(), 1);
        assert!(union.polygons[0].holes.is_empty());
        assert_eq!(union.polygons[0].shell.len(), 6);
        assert_eq!(union.area(), 2.0);
        insta::assert_snapshot!(union, @"POLYGON ((0 0, 0 1, 1 1, 2 1, 2 0, 1 0, 0 0))");

        let shared = ov
            .labelled_edges()
            .unwrap()
            .into_iter()
            .find(|e| e.points.contains(&p(1.0, 0.0)) && e.points.contains(&p(1.0, 1.0)))
            .unwrap();
        assert_eq!(shared.label.geom(0).dim(), Dim::Boundary);
        assert_eq!(shared.label.geom(1).dim(), Dim::Boundary);

        let intersection = ov.compute(BooleanOp::Intersection).unwrap();
        assert!(intersection.is_empty());
    }

    #[test]
    fn rounding_moves_a_vertex() {
        let ov = overlay(
            polygon(&[(0.4, 0.4), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]),
            Geometry::empty(),
            1.0,
        );
        let union = ov.compute(BooleanOp::Union).unwrap();
        insta::assert_snapshot!(union, @"POLYGON ((0 0, 0 3, 3 3, 3 0, 0 0))");
        assert_eq!(union.area(), 9.0);
    }

    #[test]
    fn collapsed_faces_are_dropped() {
        let sliver = overlay(
            polygon(&[(0.0, 0.0), (3.0, 0.0), (3.0, 0.3)]),
            Geometry::empty(),
            1.0,
        );
        let edges = sliver.labelled_edges().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].label.geom(0),
            &GeomLabel::Collapse {
                is_hole: false,
                location: Some(Location::Exterior),
            }
        );
        assert!(sliver.compute(BooleanOp::Union).unwrap().is_empty());

        let speck = overlay(
            polygon(&[(0.1, 0.1), (0.4, 0.1), (0.1, 0.4)]),
            Geometry::empty(),
            1.0,
        );
        assert!(speck.noded_edges().is_empty());
        insta::assert_snapshot!(
            speck.compute(BooleanOp::Union).unwrap(),
            @"GEOMETRYCOLLECTION EMPTY"
        );
    }

    #[test]
    fn three_lines_near_one_cell() {
        let a = Geometry::from_lines([
            vec![p(0.0, 0.4), p(3.0, 1.7)],
            vec![p(0.0, 2.0), p(3.0, 0.0)],
        ]);
        let b = Geometry::from_lines([vec![p(1.42, -1.0), p(1.62, 3.0)]]);
        let ov = overlay(a, b, 1.0);

        assert_eq!(ov.noded_edges().len(), 9);
        // The edge from (1, 1) to (2, 1) is shared by all three lines.
        assert_eq!(ov.labelled_edges().unwrap().len(), 7);
        assert!(ov.check_noding().is_empty());

        let intersection = ov.compute(BooleanOp::Intersection).unwrap();
        insta::assert_snapshot!(intersection, @"LINESTRING (1 1, 2 1)");
    }

    #[test]
    fn containment() {
        let inner = square(1.0, 1.0, 2.0, 2.0);
        let outer = square(0.0, 0.0, 3.0, 3.0);
        let ov = overlay(inner.clone(), outer.clone(), 1.0);

        insta::assert_snapshot!(
            ov.compute(BooleanOp::Intersection).unwrap(),
            @"POLYGON ((1 1, 1 2, 2 2, 2 1, 1 1))"
        );
        assert!(ov.compute(BooleanOp::Difference).unwrap().is_empty());

        let ov = overlay(outer, inner, 1.0);
        let diff = ov.compute(BooleanOp::Difference).unwrap();
        insta::assert_snapshot!(
            diff,
            @"POLYGON ((0 0, 0 3, 3 3, 3 0, 0 0), (1 1, 2 1, 2 2, 1 2, 1 1))"
        );
        assert_eq!(diff.area(), 8.0);
    }

    #[test]
    fn line_inside_area() {
        let area = square(0.0, 0.0, 4.0, 4.0);
        let line = Geometry::from_lines([vec![p(1.0, 1.0), p(3.0, 3.0)]]);
        let ov = overlay(area, line, 1.0);

        // The area absorbs the line.
        let union = ov.compute(BooleanOp::Union).unwrap();
        assert_eq!(union.polygons.len(), 1);
        assert!(union.lines.is_empty());

        let intersection = ov.compute(BooleanOp::Intersection).unwrap();
        assert!(intersection.polygons.is_empty());
        insta::assert_snapshot!(intersection, @"LINESTRING (1 1, 3 3)");
    }

    #[test]
    fn edge_half_a_cell_from_the_grid() {
        // At this scale -19.995 rounds onto -19.99, which isn't exactly representable.
        // The right side of `a` has to be split where `b`'s corners land on it.
        let a = square(-25.0, 0.0, -19.995, 5.0);
        let b = square(-19.99, 1.0, -10.0, 3.0);
        let ov = overlay(a, b, 100.0);
        assert!(ov.check_noding().is_empty());
        insta::assert_snapshot!(
            ov.compute(BooleanOp::Union).unwrap(),
            @"POLYGON ((-25 0, -25 5, -19.99 5, -19.99 3, -10 3, -10 1, -19.99 1, -19.99 0, -25 0))"
        );
    }

    #[test]
    fn huge_coordinates() {
        let big = 1e200;
        let a = Geometry::from_lines([vec![p(-big, -big), p(big, big)]]);
        let b = Geometry::from_lines([vec![p(-big, big), p(big, -big)]]);
        let ov = overlay(a, b, 1.0);
        assert!(ov.compute(BooleanOp::Union).is_ok());
    }

    #[test]
    fn labelling_is_complete() {
        let a = Geometry::from_polygons([Polygon::new(
            rect(0.0, 0.0, 10.0, 10.0),
            vec![rect(2.0, 2.0, 4.0, 4.0)],
        )]);
        let b = polygon(&[(3.3, 3.1), (12.2, 5.7), (6.1, 11.9)]);
        let ov = overlay(a, b, 1.0);

        let edges = ov.labelled_edges().unwrap();
        assert!(edges.iter().all(|e| e.label.is_complete()));
        for e in &edges {
            assert!(e.points.iter().all(|&q| ov.precision().is_on_grid(q)));
        }
        assert!(ov.check_noding().is_empty());

        for op in [
            BooleanOp::Union,
            BooleanOp::Intersection,
            BooleanOp::Difference,
            BooleanOp::SymDifference,
        ] {
            let result = ov.compute(op).unwrap();
            for q in result.points() {
                assert!(ov.precision().is_on_grid(*q));
            }
        }
    }
}
