//! The adaptive clearing generator.
//!
//! Ties the pipeline together: region model, medial axis, corridor tree,
//! slice placement and path stitching.

use crate::error::Result;
use crate::mat::build_mat;
use crate::params::{ClearingParams, EmitOptions, MillDirection};
use crate::path::PathItem;
use crate::region::Region;
use crate::roll::roll_tree;
use crate::stitch::stitch;
use crate::tree::build_tree;
use crate::voronoi::CellVoronoi;
use cavalier_contours::polyline::Polyline;
use pocketkit_core::Point;
use tracing::{debug, warn};

/// Generates adaptive clearing toolpaths for one pocket.
#[derive(Debug, Clone)]
pub struct PocketClearing {
    outer: Polyline<f64>,
    islands: Vec<Polyline<f64>>,
    pub params: ClearingParams,
}

impl PocketClearing {
    /// Creates a generator for a pocket bounded by `outer` with island
    /// polylines left uncut.
    pub fn new(outer: Polyline<f64>, islands: Vec<Polyline<f64>>) -> Self {
        Self {
            outer,
            islands,
            params: ClearingParams::default(),
        }
    }

    /// Sets the cutter diameter in model units.
    pub fn set_cutter_diameter(&mut self, diameter: f64) {
        self.params.cutter_d = diameter;
    }

    /// Sets the geometric tolerance.
    pub fn set_general_tolerance(&mut self, tolerance: f64) {
        self.params.general_tolerance = tolerance;
    }

    /// Sets the extra clearance kept from all boundaries.
    pub fn set_margin(&mut self, margin: f64) {
        self.params.margin = margin;
    }

    /// Sets the radial engagement band.
    pub fn set_engagement_band(&mut self, min: f64, max: f64) {
        self.params.min_engagement = min;
        self.params.max_engagement = max;
    }

    /// Sets the cutting direction.
    pub fn set_mill_direction(&mut self, direction: MillDirection) {
        self.params.mill_direction = direction;
    }

    /// Sets the user entry point; None lets the generator pick the
    /// deepest pocket point.
    pub fn set_startpoint(&mut self, startpoint: Option<Point>) {
        self.params.startpoint = startpoint;
    }

    /// Sets which path item kinds get emitted.
    pub fn set_emit_options(&mut self, emit: EmitOptions) {
        self.params.emit = emit;
    }

    /// Runs the full pipeline.
    ///
    /// Configuration faults return an error. An infeasible pocket (no
    /// medial corridors, bad start point) returns an empty path after
    /// logging a warning; partial failures keep the path built so far.
    pub fn run(&self) -> Result<Vec<PathItem>> {
        self.params.validate()?;

        let region = Region::build(
            self.outer.clone(),
            self.islands.clone(),
            self.params.cutter_radius(),
            self.params.margin,
            self.params.general_tolerance,
        );

        let mat = build_mat(&region, &CellVoronoi, self.params.general_tolerance);
        debug!("medial axis: {} segments", mat.len());

        let Some(mut tree) = build_tree(&mat, &region, &self.params) else {
            warn!("no toolpath generated: pocket has no usable medial axis");
            return Ok(Vec::new());
        };

        let store = roll_tree(&mut tree, &region, &self.params)?;
        if store.is_empty() {
            return Ok(Vec::new());
        }
        debug!("placed {} slices", store.len());

        Ok(stitch(&tree, &store, &self.params))
    }
}
