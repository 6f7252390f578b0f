//! SPLEngine geometry: control points, the per-mode curve evaluators, the
//! nearest-point projection solver and arc-length tables.
//!
//! Everything here is a pure function of borrowed control points, so a
//! [`SplineCurve`] can be shared across threads and queried concurrently.

pub mod arc_length;
pub mod curve;
pub mod point;
pub mod project;
pub mod tessellate;

pub use arc_length::ArcLengthTable;
pub use curve::{Curve, SplineCurve};
pub use point::{Color, ControlPoint, PointSample};
pub use project::Projection;
