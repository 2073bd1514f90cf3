//! # Pocketkit Core
//!
//! 2D geometry kernel and spatial indexing used by the adaptive
//! clearing pipeline:
//!
//! - **Points**: vector algebra over double-precision 2D points
//! - **Arcs**: circular arcs with extrema, nearest-point and tessellation
//! - **Biarcs**: tangent-continuous arc pairs for smooth connecting moves
//! - **Splines**: cubic Bezier/Hermite sampling with arc-fit post-processing
//! - **Spatial Index**: bounding-box quadtree for segment and slice queries

pub mod arc;
pub mod biarc;
pub mod point;
pub mod spatial_index;
pub mod spline;

pub use arc::{Arc, RotationDir};
pub use biarc::{ArcOrLine, Biarc};
pub use point::Point;
pub use spatial_index::{Bounds, SpatialIndex};
pub use spline::{fit_arcs, sample_cubic_bezier, sample_hermite};
