//! Checking that a noded arrangement really is fully noded.
//!
//! This is a diagnostic: the overlay never runs it on its own. It reports
//! problems and doesn't try to fix them.

use crate::{
    geom::{segment_intersection, Point},
    intersect::{for_each_candidate_pair, SegmentRef},
    segments::{SegmentString, StringIdx},
};

/// What went wrong with the noding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ViolationKind {
    /// Two segments meet at a point that isn't a vertex of both of them.
    Crossing,
    /// A string goes from one point to another and straight back.
    Collapse,
}

/// A single problem found by [`check_noding`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodingViolation {
    /// What kind of problem.
    pub kind: ViolationKind,
    /// Where the problem is.
    pub point: Point,
    /// The first segment involved.
    pub first: SegmentRef,
    /// The second segment involved.
    pub second: SegmentRef,
}

/// Checks a collection of (supposedly) noded segment strings.
///
/// Returns every violation found, sorted by location. An empty list means the
/// arrangement is fully noded.
pub fn check_noding(strings: &[SegmentString]) -> Vec<NodingViolation> {
    let mut ret = Vec::new();

    for (s, ss) in strings.iter().enumerate() {
        for (i, w) in ss.points().windows(3).enumerate() {
            if w[0] == w[2] {
                ret.push(NodingViolation {
                    kind: ViolationKind::Collapse,
                    point: w[1],
                    first: SegmentRef {
                        string: StringIdx(s),
                        segment: i,
                    },
                    second: SegmentRef {
                        string: StringIdx(s),
                        segment: i + 1,
                    },
                });
            }
        }
    }

    for_each_candidate_pair(strings, |a, (p0, p1), b, (q0, q1)| {
        for pt in segment_intersection(p0, p1, q0, q1).points() {
            let vertex_of_p = pt == p0 || pt == p1;
            let vertex_of_q = pt == q0 || pt == q1;
            if !vertex_of_p || !vertex_of_q {
                ret.push(NodingViolation {
                    kind: ViolationKind::Crossing,
                    point: pt,
                    first: a.min(b),
                    second: a.max(b),
                });
            }
        }
    });

    if !ret.is_empty() {
        tracing::debug!(violations = ret.len(), "noding is not valid");
    }
    ret.sort_by(|v, w| v.point.cmp(&w.point).then(v.first.cmp(&w.first)));
    ret
}
