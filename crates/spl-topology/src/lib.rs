//! SPLEngine topology: how a flat control point array splits into curve
//! segments for each curve mode, open or closed.

mod mode;
mod topology;

pub use mode::CurveMode;
pub use topology::{BSplineSlot, SegmentLocation, Topology};
