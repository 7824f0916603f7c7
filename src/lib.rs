#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod assemble;
pub mod geom;
mod graph;
mod hot_pixel;
mod input;
mod intersect;
pub mod label;
mod labeller;
mod overlay;
mod precision;
mod segments;
mod snap;
mod validate;

pub use geom::{Float, Point};
pub use graph::{EdgeIdx, Graph, HalfEdgeIdx};
pub use hot_pixel::{HotPixel, HotPixelIndex};
pub use input::{Geometry, Polygon};
pub use intersect::SegmentRef;
pub use labeller::{Labeller, PropagationOrder};
pub use overlay::{LabelledEdge, NodedEdge, Overlay};
pub use precision::PrecisionModel;
pub use segments::{EdgeSource, SegmentNode, SegmentString, SourceDim, StringIdx};
pub use snap::SnapRounder;
pub use validate::{check_noding, NodingViolation, ViolationKind};

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
pub enum BooleanOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the symmetric difference of two sets if it is in one or the other, but not both.
    SymDifference,
}

impl BooleanOp {
    /// Given whether a point is in the first and second sets, is it in the result
    /// of this operation?
    pub fn contains(self, in_a: bool, in_b: bool) -> bool {
        match self {
            BooleanOp::Union => in_a || in_b,
            BooleanOp::Intersection => in_a && in_b,
            BooleanOp::Difference => in_a && !in_b,
            BooleanOp::SymDifference => in_a != in_b,
        }
    }
}

/// Things that can go wrong when computing an overlay.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("input coordinate is infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("input coordinate is NaN")]
    NaN,
    /// The grid scale wasn't a positive, finite number.
    #[error("invalid precision scale {0}")]
    InvalidScale(f64),
    /// The boundary edges around some point disagree about which side of them is
    /// inside one of the inputs.
    ///
    /// This means that the input wasn't valid (for example, a self-intersecting
    /// ring) or that noding failed to split some edges where it should have.
    #[error("side location conflict for input {geom} at {point:?}")]
    SideLocationConflict {
        /// Which input the conflict is in.
        geom: usize,
        /// Where the conflict is.
        point: Point,
    },
}

fn extrema(mut xs: impl Iterator<Item = f64>) -> Result<(f64, f64), Error> {
    xs.try_fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        if x.is_nan() {
            Err(Error::NaN)
        } else {
            Ok((x.min(min), x.max(max)))
        }
    })
}

/// Computes a boolean operation between two geometries, with the result rounded
/// to a grid of the given scale.
pub fn overlay(a: Geometry, b: Geometry, scale: f64, op: BooleanOp) -> Result<Geometry, Error> {
    let precision = PrecisionModel::new(scale)?;
    Overlay::new(a, b, precision).compute(op)
}

/// Computes a boolean operation between two sets, each of which is described as a
/// collection of polygons without holes.
///
/// Each polygon is a closed ring; it doesn't matter which way it winds, and it
/// may or may not repeat its first point at the end. The polygons in each set
/// must not overlap one another.
pub fn boolean_op(
    set_a: &[Vec<(f64, f64)>],
    set_b: &[Vec<(f64, f64)>],
    scale: f64,
    op: BooleanOp,
) -> Result<Geometry, Error> {
    let (min, max) = extrema(
        set_a
            .iter()
            .flatten()
            .chain(set_b.iter().flatten())
            .flat_map(|p| [p.0, p.1]),
    )?;
    // With no coordinates at all, min > max.
    if min <= max && (min.is_infinite() || max.is_infinite()) {
        return Err(Error::Infinity);
    }

    let to_geometry = |set: &[Vec<(f64, f64)>]| -> Result<Geometry, Error> {
        let polygons = set
            .iter()
            .map(|ring| Polygon::from_coords(ring, &[]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Geometry::from_polygons(polygons))
    };
    overlay(to_geometry(set_a)?, to_geometry(set_b)?, scale, op)
}
