//! Generator parameters, mill direction and emission options.

use crate::error::{ClearingError, Result};
use pocketkit_core::{Point, RotationDir};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Spindle-relative cutting direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MillDirection {
    Cw,
    Ccw,
    /// Direction not specified; cuts are generated clockwise but smooth
    /// chords are unavailable.
    Unknown,
}

impl Default for MillDirection {
    fn default() -> Self {
        Self::Cw
    }
}

impl MillDirection {
    /// Concrete rotation used for cutting moves.
    pub fn rotation(self) -> RotationDir {
        match self {
            MillDirection::Ccw => RotationDir::Ccw,
            MillDirection::Cw | MillDirection::Unknown => RotationDir::Cw,
        }
    }
}

/// Set of path item kinds the generator should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmitOptions(u32);

impl EmitOptions {
    pub const NONE: EmitOptions = EmitOptions(0);
    /// Slice cutting arcs.
    pub const SEGMENT: EmitOptions = EmitOptions(1);
    /// Connector routed to a branch's first slice.
    pub const BRANCH_ENTRY: EmitOptions = EmitOptions(1 << 1);
    /// Straight chord between consecutive slices.
    pub const CHORD: EmitOptions = EmitOptions(1 << 2);
    /// Biarc chord between consecutive slices (excludes CHORD).
    pub const SMOOTH_CHORD: EmitOptions = EmitOptions(1 << 3);
    /// Straight chord between the sub-arcs of a refined slice.
    pub const SEGMENT_CHORD: EmitOptions = EmitOptions(1 << 4);
    /// Entry spiral at the root slice.
    pub const SPIRAL: EmitOptions = EmitOptions(1 << 5);
    /// Final connector back to the root slice centre.
    pub const RETURN_TO_BASE: EmitOptions = EmitOptions(1 << 6);
    /// Medial axis curves, for inspection only.
    pub const DEBUG_MAT: EmitOptions = EmitOptions(1 << 7);

    pub fn contains(self, other: EmitOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: EmitOptions) -> EmitOptions {
        EmitOptions(self.0 | other.0)
    }

    pub fn without(self, other: EmitOptions) -> EmitOptions {
        EmitOptions(self.0 & !other.0)
    }
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions::SEGMENT
            | EmitOptions::BRANCH_ENTRY
            | EmitOptions::CHORD
            | EmitOptions::SEGMENT_CHORD
            | EmitOptions::SPIRAL
            | EmitOptions::RETURN_TO_BASE
    }
}

impl BitOr for EmitOptions {
    type Output = EmitOptions;
    fn bitor(self, rhs: EmitOptions) -> EmitOptions {
        EmitOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for EmitOptions {
    fn bitor_assign(&mut self, rhs: EmitOptions) {
        self.0 |= rhs.0;
    }
}

/// Configuration for one clearing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingParams {
    /// Cutter diameter.
    pub cutter_d: f64,
    /// Geometric equality / intersection tolerance.
    pub general_tolerance: f64,
    /// Extra clearance subtracted from every inscribed-circle radius.
    pub margin: f64,
    /// Upper bound on radial engagement, absolute length.
    pub max_engagement: f64,
    /// Cuts engaging less than this are not worth emitting.
    pub min_engagement: f64,
    /// Engagement derating for slices split by refinement.
    pub segment_derating_k: f64,
    /// Relative engagement tolerance for the placement search.
    pub engagement_tolerance: f64,
    /// Optional user entry point.
    pub startpoint: Option<Point>,
    pub mill_direction: MillDirection,
    pub emit: EmitOptions,
}

impl Default for ClearingParams {
    fn default() -> Self {
        Self {
            cutter_d: 3.0,
            general_tolerance: 1e-3,
            margin: 0.0,
            max_engagement: 1.2,
            min_engagement: 0.3,
            segment_derating_k: 0.5,
            engagement_tolerance: 1e-3,
            startpoint: None,
            mill_direction: MillDirection::default(),
            emit: EmitOptions::default(),
        }
    }
}

impl ClearingParams {
    pub fn cutter_radius(&self) -> f64 {
        self.cutter_d / 2.0
    }

    /// Minimum inscribed-circle radius a point must clear to be traversable.
    pub fn min_passable_mic(&self) -> f64 {
        self.cutter_radius() * 0.1
    }

    /// Rejects contradictory or out-of-range configurations.
    pub fn validate(&self) -> Result<()> {
        if self.emit.contains(EmitOptions::CHORD) && self.emit.contains(EmitOptions::SMOOTH_CHORD) {
            return Err(ClearingError::config(
                "chord and smooth chord emission are mutually exclusive",
            ));
        }
        if self.emit.contains(EmitOptions::SMOOTH_CHORD)
            && self.mill_direction == MillDirection::Unknown
        {
            return Err(ClearingError::config(
                "smooth chords require a known mill direction",
            ));
        }
        if self.cutter_d <= 0.0 {
            return Err(ClearingError::config("cutter diameter must be positive"));
        }
        if self.general_tolerance <= 0.0 {
            return Err(ClearingError::config("general tolerance must be positive"));
        }
        if self.max_engagement <= 0.0 || self.min_engagement < 0.0 {
            return Err(ClearingError::config("engagement bounds must be positive"));
        }
        if self.min_engagement >= self.max_engagement {
            return Err(ClearingError::config(
                "min engagement must stay below max engagement",
            ));
        }
        Ok(())
    }
}
