//! Finding intersections between the segments of a collection of segment strings.
//!
//! Candidate pairs are pruned by a sweep over the segments' envelopes, sorted by
//! their left edges. Only pairs whose envelopes meet get handed to the exact
//! intersection test.

use crate::{
    geom::{segment_intersection, Envelope, Point, SegmentIntersection},
    segments::{SegmentString, StringIdx},
};

/// Identifies one segment of one segment string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentRef {
    /// Which string.
    pub string: StringIdx,
    /// Which segment of the string (segment `i` starts at vertex `i`).
    pub segment: usize,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    seg: SegmentRef,
    start: Point,
    end: Point,
    env: Envelope,
}

/// Calls `f` on every pair of distinct segments whose envelopes intersect.
///
/// Each unordered pair is visited at most once.
pub fn for_each_candidate_pair(
    strings: &[SegmentString],
    mut f: impl FnMut(SegmentRef, (Point, Point), SegmentRef, (Point, Point)),
) {
    let mut entries: Vec<Entry> = strings
        .iter()
        .enumerate()
        .flat_map(|(s, ss)| {
            ss.segments()
                .enumerate()
                .map(move |(i, (start, end))| Entry {
                    seg: SegmentRef {
                        string: StringIdx(s),
                        segment: i,
                    },
                    start,
                    end,
                    env: Envelope::of_segment(start, end),
                })
        })
        .collect();
    entries.sort_by(|a, b| a.env.min_x.total_cmp(&b.env.min_x));

    for (i, a) in entries.iter().enumerate() {
        for b in &entries[(i + 1)..] {
            if b.env.min_x > a.env.max_x {
                break;
            }
            if a.env.intersects(&b.env) {
                f(a.seg, (a.start, a.end), b.seg, (b.start, b.end));
            }
        }
    }
}

/// Finds all intersection points between segments that aren't just shared
/// endpoints.
///
/// A point where two segments meet counts if it is in the interior of at least
/// one of them. The returned points are unrounded, sorted, and deduplicated.
pub fn interior_intersections(strings: &[SegmentString]) -> Vec<Point> {
    let mut ret = Vec::new();
    for_each_candidate_pair(strings, |_, (p0, p1), _, (q0, q1)| {
        let isect = segment_intersection(p0, p1, q0, q1);
        if isect == SegmentIntersection::None {
            return;
        }
        for pt in isect.points() {
            let endpoint_of_p = pt == p0 || pt == p1;
            let endpoint_of_q = pt == q0 || pt == q1;
            if !(endpoint_of_p && endpoint_of_q) {
                ret.push(pt);
            }
        }
    });
    ret.sort();
    ret.dedup();
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::tests::p, segments::EdgeSource};

    fn line(pts: &[(f64, f64)]) -> SegmentString {
        SegmentString::new(
            pts.iter().map(|&(x, y)| p(x, y)).collect(),
            EdgeSource::line(0),
        )
    }

    #[test]
    fn crossing_lines() {
        let strings = vec![
            line(&[(0.0, 0.0), (2.0, 2.0)]),
            line(&[(0.0, 2.0), (2.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 6.0)]),
        ];
        assert_eq!(interior_intersections(&strings), vec![p(1.0, 1.0)]);
    }

    #[test]
    fn shared_vertices_dont_count() {
        let strings = vec![line(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)])];
        assert!(interior_intersections(&strings).is_empty());

        let strings = vec![
            line(&[(0.0, 0.0), (2.0, 0.0)]),
            line(&[(2.0, 0.0), (2.0, 2.0)]),
        ];
        assert!(interior_intersections(&strings).is_empty());
    }

    #[test]
    fn touching_and_overlapping() {
        // A T-junction is an interior intersection of the top bar.
        let strings = vec![
            line(&[(0.0, 0.0), (4.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 3.0)]),
        ];
        assert_eq!(interior_intersections(&strings), vec![p(1.0, 0.0)]);

        let strings = vec![
            line(&[(0.0, 0.0), (4.0, 0.0)]),
            line(&[(3.0, 0.0), (6.0, 0.0)]),
        ];
        assert_eq!(
            interior_intersections(&strings),
            vec![p(3.0, 0.0), p(4.0, 0.0)]
        );
    }

    #[test]
    fn every_pair_once() {
        let strings = vec![
            line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
            line(&[(0.5, 0.0), (0.5, 3.0)]),
            line(&[(10.0, 0.0), (11.0, 0.0)]),
        ];
        let mut pairs = Vec::new();
        for_each_candidate_pair(&strings, |a, _, b, _| pairs.push((a.min(b), a.max(b))));
        pairs.sort();
        let before = pairs.len();
        pairs.dedup();
        assert_eq!(pairs.len(), before);
        // The first two segments share a vertex, and the vertical one crosses the
        // first segment. The far-away string never shows up.
        assert!(pairs.iter().all(|(a, b)| a.string.0 < 2 && b.string.0 < 2));
        assert_eq!(pairs.len(), 2);
    }
}
