//! Emitted toolpath items.
//!
//! The generator's output is an ordered list of [`PathItem`]s: polylines
//! whose segments are lines or circular arcs, tagged with the role they
//! play in the cut.

use pocketkit_core::{ArcOrLine, Point};
use serde::{Deserialize, Serialize};

/// Role of a path item within the generated cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathItemKind {
    /// Slice cutting arc.
    Segment,
    /// Connector routed to a branch's first slice.
    BranchEntry,
    /// Straight chord between consecutive slices.
    Chord,
    /// Biarc chord between consecutive slices.
    SmoothChord,
    /// Chord between sub-arcs of a refined slice.
    SegmentChord,
    /// Entry spiral.
    Spiral,
    /// Final connector back to the root slice centre.
    ReturnToBase,
    /// Medial axis curve, diagnostic only.
    DebugMat,
}

/// One emitted move: a polyline of line and arc segments with a role tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    pub kind: PathItemKind,
    pub segments: Vec<ArcOrLine>,
}

impl PathItem {
    pub fn new(kind: PathItemKind, segments: Vec<ArcOrLine>) -> Self {
        Self { kind, segments }
    }

    /// Polyline item built from straight moves between consecutive points.
    pub fn from_points(kind: PathItemKind, points: &[Point]) -> Self {
        let segments = points
            .windows(2)
            .filter(|w| w[0].distance_to(&w[1]) > f64::EPSILON)
            .map(|w| ArcOrLine::Line { p1: w[0], p2: w[1] })
            .collect();
        Self { kind, segments }
    }

    pub fn start_point(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start_point())
    }

    pub fn end_point(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end_point())
    }

    /// Total curve length of the item.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }
}

/// Total curve length over a generated path.
pub fn total_length(items: &[PathItem]) -> f64 {
    items.iter().map(|i| i.length()).sum()
}
