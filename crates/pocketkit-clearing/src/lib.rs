//! # Pocketkit Clearing
//!
//! Adaptive clearing toolpath generation for 2D pockets.
//!
//! Given a pocket boundary (one outer polyline, any number of island
//! polylines) and a cylindrical cutter, the generator removes all pocket
//! material with a continuous path whose radial engagement stays inside a
//! configured band on every cut:
//!
//! 1. The boundary is sampled and a Voronoi diagram of the samples
//!    approximates the pocket's medial axis ([`mat`], [`voronoi`]).
//! 2. Medial segments are grown into a rooted tree of corridors
//!    ([`tree`]).
//! 3. Each corridor is covered by partial circular cuts ("slices") whose
//!    engagement against already-cut material is binary-searched into the
//!    target band ([`slice`], [`roll`]).
//! 4. A depth-first walk stitches slices, chords, the entry spiral and
//!    branch connectors into one ordered path ([`stitch`], [`connect`],
//!    [`spiral`]).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pocketkit_clearing::PocketClearing;
//!
//! let mut clearing = PocketClearing::new(outer, vec![]);
//! clearing.set_cutter_diameter(3.0);
//! clearing.set_engagement_band(0.3, 1.2);
//! let path = clearing.run()?;
//! ```

pub mod connect;
pub mod error;
pub mod generator;
pub mod mat;
pub mod params;
pub mod path;
pub mod region;
pub mod roll;
pub mod slice;
pub mod spiral;
pub mod stitch;
pub mod tree;
pub mod voronoi;

pub use connect::{may_shortcut, may_shortcut_indexed, SliceStore};
pub use error::{ClearingError, Result};
pub use generator::PocketClearing;
pub use mat::build_mat;
pub use params::{ClearingParams, EmitOptions, MillDirection};
pub use path::{total_length, PathItem, PathItemKind};
pub use region::Region;
pub use roll::roll_tree;
pub use slice::{Ball, Slice};
pub use stitch::stitch;
pub use tree::{build_tree, Branch, MedialTree};
pub use voronoi::{CellVoronoi, VoronoiSource};
