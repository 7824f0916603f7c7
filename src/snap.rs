//! Snap-rounding noder.
//!
//! Snap rounding takes an arrangement of segment strings and rounds all of their
//! vertices (and all of their intersections) to a grid. Rounding alone could
//! introduce new crossings, so every segment that passes through the tolerance
//! square (the "hot pixel") of some rounded point also gets split at that point.
//! The output arrangement has no crossings except at its vertices, all of which
//! are on the grid.
//!
//! This is a brute-force implementation: every segment gets tested against every
//! hot pixel. The result is guaranteed to be fully noded when the grid scale is an
//! integer, and is very likely (but not certain) to be fully noded otherwise.

use crate::{
    geom::Point,
    hot_pixel::HotPixelIndex,
    intersect,
    precision::PrecisionModel,
    segments::SegmentString,
};

/// Snap-rounds collections of segment strings onto a fixed grid.
#[derive(Clone, Debug)]
pub struct SnapRounder {
    precision: PrecisionModel,
}

impl SnapRounder {
    /// Creates a snap-rounder for the given grid.
    pub fn new(precision: PrecisionModel) -> Self {
        SnapRounder { precision }
    }

    /// The grid we round to.
    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    /// Builds the hot pixels for a collection of segment strings: one for every
    /// rounded vertex and one for every rounded intersection point.
    pub fn hot_pixels(&self, strings: &[SegmentString]) -> HotPixelIndex {
        let mut index = HotPixelIndex::new(self.precision);
        let intersections = intersect::interior_intersections(strings);
        tracing::trace!(count = intersections.len(), "interior intersections");
        for pt in intersections {
            index.add(pt);
        }
        for ss in strings {
            for &pt in ss.points() {
                index.add(pt);
            }
        }
        index
    }

    /// Snap-rounds a collection of segment strings.
    ///
    /// Returns one rounded string for every input string that didn't collapse to
    /// a single point. Each returned string has all of its nodes added, so its
    /// [`noded_substrings`](SegmentString::noded_substrings) are the final edges.
    pub fn node(&self, strings: &[SegmentString]) -> Vec<SegmentString> {
        let pixels = self.hot_pixels(strings);
        tracing::debug!(
            strings = strings.len(),
            hot_pixels = pixels.len(),
            "snap rounding"
        );

        strings
            .iter()
            .filter_map(|ss| self.snap_string(ss, &pixels))
            .collect()
    }

    fn snap_string(&self, ss: &SegmentString, pixels: &HotPixelIndex) -> Option<SegmentString> {
        let pts = ss.points();
        let mut rounded: Vec<Point> = Vec::with_capacity(pts.len());
        for &pt in pts {
            let r = self.precision.round(pt);
            if rounded.last() != Some(&r) {
                rounded.push(r);
            }
        }
        if rounded.len() < 2 {
            tracing::trace!(source = ?ss.source(), "segment string collapsed to a point");
            return None;
        }

        let mut snapped = SegmentString::new(rounded, ss.source());
        // The index of the rounded segment corresponding to the current input segment.
        let mut snapped_idx = 0;
        for (p0, p1) in ss.segments() {
            if self.precision.round(p1) == snapped.points()[snapped_idx] {
                tracing::trace!(?p0, ?p1, "skipping collapsed segment");
                continue;
            }
            // Pixels are tested against the original segment, but the nodes go on the
            // rounded one.
            for hp in pixels.pixels() {
                if hp.intersects(p0, p1) {
                    snapped.add_node(hp.center(), snapped_idx);
                }
            }
            snapped_idx += 1;
        }
        Some(snapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::tests::p, intersect::interior_intersections, segments::EdgeSource};
    use proptest::prelude::*;

    fn line(pts: &[(f64, f64)]) -> SegmentString {
        SegmentString::new(
            pts.iter().map(|&(x, y)| p(x, y)).collect(),
            EdgeSource::line(0),
        )
    }

    fn rounder(scale: f64) -> SnapRounder {
        SnapRounder::new(PrecisionModel::new(scale).unwrap())
    }

    fn edges(strings: &[SegmentString]) -> Vec<Vec<Point>> {
        strings
            .iter()
            .flat_map(SegmentString::noded_substrings)
            .collect()
    }

    #[test]
    fn crossing_is_rounded() {
        let out = rounder(1.0).node(&[
            line(&[(0.0, 0.0), (4.0, 2.2)]),
            line(&[(0.0, 3.0), (4.0, 0.0)]),
        ]);
        // The crossing is near (2.3, 1.3), which rounds to (2, 1).
        assert_eq!(
            edges(&out),
            vec![
                vec![p(0.0, 0.0), p(2.0, 1.0)],
                vec![p(2.0, 1.0), p(4.0, 2.0)],
                vec![p(0.0, 3.0), p(2.0, 1.0)],
                vec![p(2.0, 1.0), p(4.0, 0.0)],
            ]
        );
    }

    #[test]
    fn collapsed_string_is_dropped() {
        let out = rounder(1.0).node(&[
            line(&[(0.1, 0.1), (0.4, 0.3)]),
            line(&[(0.0, 5.0), (3.0, 5.0)]),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points(), &[p(0.0, 5.0), p(3.0, 5.0)]);
    }

    #[test]
    fn collapsed_segment_is_skipped() {
        let out = rounder(1.0).node(&[line(&[(0.0, 0.0), (3.0, 0.0), (3.2, 0.1), (3.0, 3.0)])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points(), &[p(0.0, 0.0), p(3.0, 0.0), p(3.0, 3.0)]);
        assert_eq!(
            edges(&out),
            vec![
                vec![p(0.0, 0.0), p(3.0, 0.0)],
                vec![p(3.0, 0.0), p(3.0, 3.0)],
            ]
        );
    }

    #[test]
    fn segment_through_pixel_is_split() {
        // The short segment makes a hot pixel at (2, 0), and the long one passes
        // through it without touching the vertex itself.
        let out = rounder(1.0).node(&[
            line(&[(0.0, 0.0), (4.0, 0.2)]),
            line(&[(2.0, -0.3), (2.0, -3.0)]),
        ]);
        let e = edges(&out);
        assert_eq!(
            &e[..2],
            &[
                vec![p(0.0, 0.0), p(2.0, 0.0)],
                vec![p(2.0, 0.0), p(4.0, 0.0)],
            ]
        );
    }

    #[test]
    fn three_segments_near_one_cell() {
        // The three crossings are all close to (1.5, 1). One of them rounds to (1, 1)
        // and the other two round to (2, 1).
        let strings = [
            line(&[(0.0, 0.4), (3.0, 1.7)]),
            line(&[(0.0, 2.0), (3.0, 0.0)]),
            line(&[(1.42, -1.0), (1.62, 3.0)]),
        ];
        let rounder = rounder(1.0);
        let mut crossings: Vec<Point> = interior_intersections(&strings)
            .into_iter()
            .map(|pt| rounder.precision().round(pt))
            .collect();
        crossings.sort();
        crossings.dedup();
        assert_eq!(crossings, vec![p(1.0, 1.0), p(2.0, 1.0)]);

        // The third segment doesn't cross anything near (1, 1), but it clips the
        // corner of that pixel so it gets noded there anyway.
        let out = rounder.node(&strings);
        assert_eq!(
            out[2].noded_substrings(),
            vec![
                vec![p(1.0, -1.0), p(1.0, 1.0)],
                vec![p(1.0, 1.0), p(2.0, 1.0)],
                vec![p(2.0, 1.0), p(2.0, 3.0)],
            ]
        );
        assert_eq!(
            out[0].noded_substrings(),
            vec![
                vec![p(0.0, 0.0), p(1.0, 1.0)],
                vec![p(1.0, 1.0), p(2.0, 1.0)],
                vec![p(2.0, 1.0), p(3.0, 2.0)],
            ]
        );
        assert_eq!(
            out[1].noded_substrings(),
            vec![
                vec![p(0.0, 2.0), p(1.0, 1.0)],
                vec![p(1.0, 1.0), p(2.0, 1.0)],
                vec![p(2.0, 1.0), p(3.0, 0.0)],
            ]
        );
    }

    #[test]
    fn renoding_adds_no_nodes() {
        let strings = [
            line(&[(0.0, 0.0), (4.0, 2.2)]),
            line(&[(0.0, 3.0), (4.0, 0.0)]),
        ];
        let rounder = rounder(1.0);
        let once: Vec<SegmentString> = edges(&rounder.node(&strings))
            .into_iter()
            .map(|pts| SegmentString::new(pts, EdgeSource::line(0)))
            .collect();
        let twice = rounder.node(&once);
        assert_eq!(edges(&once), edges(&twice));

        for pt in edges(&twice).into_iter().flatten() {
            assert!(rounder.precision().is_on_grid(pt));
        }
    }

    // Snap rounding in general isn't idempotent: a rounded segment can pass
    // through a hot pixel that the original segment missed. Axis-parallel
    // segments stay in their own row or column, so for them it is.
    fn axis_parallel_line() -> impl Strategy<Value = SegmentString> {
        (any::<bool>(), -20.0..20.0f64, -20.0..20.0f64, -20.0..20.0f64).prop_map(
            |(horizontal, c, a, b)| {
                if horizontal {
                    line(&[(a, c), (b, c)])
                } else {
                    line(&[(c, a), (c, b)])
                }
            },
        )
    }

    proptest! {
        #[test]
        fn renoding_axis_parallel_lines(strings in prop::collection::vec(axis_parallel_line(), 1..8)) {
            let rounder = rounder(1.0);
            let once = edges(&rounder.node(&strings));
            let again: Vec<SegmentString> = once
                .iter()
                .map(|pts| SegmentString::new(pts.clone(), EdgeSource::line(0)))
                .collect();
            prop_assert_eq!(edges(&rounder.node(&again)), once);
        }
    }
}
