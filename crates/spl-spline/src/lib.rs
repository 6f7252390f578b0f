//! SPLEngine splines: the editable control point store built on the curve
//! engine, with change notification, a lazily built distance cache and
//! junctions between splines.

pub mod cache;
pub mod junction;
pub mod mutate;
pub mod observer;
pub mod spline;

pub use cache::DistanceCache;
pub use junction::{Junction, JunctionEnd, SplineGraph, SplineKey};
pub use observer::{ObserverId, SplineChange, SplineEvent};
pub use spline::{Spline, SplineData};
