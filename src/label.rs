//! Topological labels attached to graph edges.
//!
//! Every undirected edge carries one [`Label`], which stores (for each of the two
//! input geometries) how the edge relates to that geometry. Locations on the left
//! and right are stored relative to the edge's forward direction; the view from
//! the backward half-edge is derived by swapping them.

/// The location of a point (or of one side of an edge) relative to a geometry.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub enum Location {
    /// Strictly inside the geometry.
    Interior,
    /// On the boundary of the geometry.
    Boundary,
    /// Strictly outside the geometry.
    Exterior,
}

/// One side of a directed edge.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Side {
    /// To the left, looking along the edge.
    Left,
    /// To the right, looking along the edge.
    Right,
}

impl Side {
    fn flipped(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The four ways an edge can be related to an input geometry.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub enum Dim {
    /// The edge is part of the boundary of an area.
    Boundary,
    /// The edge is part of a linear input.
    Line,
    /// The edge came from an area boundary, but rounding collapsed the area
    /// on both sides of it.
    Collapse,
    /// The edge doesn't come from this geometry at all.
    Unrelated,
}

/// How an edge relates to one of the input geometries.
///
/// `None` locations are the ones that haven't been determined yet. After
/// labelling, none of them remain.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub enum GeomLabel {
    /// See [`Dim::Boundary`]. Its sides are known as soon as the edge is created.
    Boundary {
        /// Does the edge come from a hole?
        is_hole: bool,
        /// The location to the left of the forward direction.
        left: Location,
        /// The location to the right of the forward direction.
        right: Location,
    },
    /// See [`Dim::Line`].
    Line {
        /// The location of the whole edge.
        location: Option<Location>,
    },
    /// See [`Dim::Collapse`].
    Collapse {
        /// Did the collapsed edge come (only) from holes?
        is_hole: bool,
        /// The location of the whole edge.
        location: Option<Location>,
    },
    /// See [`Dim::Unrelated`].
    Unrelated {
        /// The location of the whole edge.
        location: Option<Location>,
    },
}

impl GeomLabel {
    /// Which kind of label is this?
    pub fn dim(&self) -> Dim {
        match self {
            GeomLabel::Boundary { .. } => Dim::Boundary,
            GeomLabel::Line { .. } => Dim::Line,
            GeomLabel::Collapse { .. } => Dim::Collapse,
            GeomLabel::Unrelated { .. } => Dim::Unrelated,
        }
    }

    /// Is this an area boundary?
    pub fn is_boundary(&self) -> bool {
        matches!(self, GeomLabel::Boundary { .. })
    }

    /// The single location of a non-boundary edge.
    ///
    /// Boundary edges have different locations on their two sides, so they don't
    /// have a line location and this returns `None` for them.
    pub fn line_location(&self) -> Option<Location> {
        match *self {
            GeomLabel::Boundary { .. } => None,
            GeomLabel::Line { location }
            | GeomLabel::Collapse { location, .. }
            | GeomLabel::Unrelated { location } => location,
        }
    }

    /// Is this a non-boundary label whose location hasn't been determined?
    pub fn is_line_location_unknown(&self) -> bool {
        !self.is_boundary() && self.line_location().is_none()
    }

    /// Sets the location of a non-boundary edge. Does nothing to boundary edges.
    pub fn set_line_location(&mut self, loc: Location) {
        match self {
            GeomLabel::Boundary { .. } => {}
            GeomLabel::Line { location }
            | GeomLabel::Collapse { location, .. }
            | GeomLabel::Unrelated { location } => *location = Some(loc),
        }
    }

    /// The location on one side of the edge, looking along its forward direction.
    ///
    /// For non-boundary edges, both sides have the same location.
    pub fn side_location(&self, side: Side) -> Option<Location> {
        match *self {
            GeomLabel::Boundary { left, right, .. } => match side {
                Side::Left => Some(left),
                Side::Right => Some(right),
            },
            _ => self.line_location(),
        }
    }
}

/// The label of one undirected edge, with one [`GeomLabel`] per input geometry.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub struct Label {
    geoms: [GeomLabel; 2],
}

impl Label {
    /// Creates a label from its two per-geometry parts.
    pub fn new(geom_0: GeomLabel, geom_1: GeomLabel) -> Self {
        Label {
            geoms: [geom_0, geom_1],
        }
    }

    /// The part of the label for geometry `g` (which must be 0 or 1).
    pub fn geom(&self, g: usize) -> &GeomLabel {
        &self.geoms[g]
    }

    /// Mutable access to the part of the label for geometry `g`.
    pub fn geom_mut(&mut self, g: usize) -> &mut GeomLabel {
        &mut self.geoms[g]
    }

    /// Is this edge a boundary of either input?
    pub fn is_boundary_either(&self) -> bool {
        self.geoms.iter().any(GeomLabel::is_boundary)
    }

    /// The location on one side of this edge, relative to geometry `g`.
    ///
    /// `forward` says which half-edge we're looking from.
    pub fn location(&self, g: usize, side: Side, forward: bool) -> Option<Location> {
        let side = if forward { side } else { side.flipped() };
        self.geoms[g].side_location(side)
    }

    /// Has every location (for both geometries) been determined?
    pub fn is_complete(&self) -> bool {
        self.geoms.iter().all(|g| !g.is_line_location_unknown())
    }
}
