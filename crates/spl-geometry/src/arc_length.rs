//! Arc-length tables: convert between traveled distance and curve parameter
//! for constant-speed traversal.
//!
//! A table is a snapshot of the control points it was built from. It does
//! not notice later edits; rebuild it after every mutation.

use serde::{Deserialize, Serialize};
use spl_core::error::{Result, SplError};

use crate::curve::SplineCurve;

/// Cumulative world-space chord lengths at `resolution + 1` uniformly
/// spaced parameters. Starts at zero, non-decreasing, at least two entries;
/// deserialization checks all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArcLengthTable")]
pub struct ArcLengthTable {
    distances: Vec<f64>,
}

#[derive(Deserialize)]
struct RawArcLengthTable {
    distances: Vec<f64>,
}

impl TryFrom<RawArcLengthTable> for ArcLengthTable {
    type Error = SplError;

    fn try_from(raw: RawArcLengthTable) -> Result<Self> {
        Self::from_distances(raw.distances)
    }
}

impl ArcLengthTable {
    /// Sample `curve` at `resolution` uniform steps (at least 1). The step
    /// count is rounded up to a multiple of the segment count so that every
    /// segment boundary is sampled and polyline corners are not cut.
    pub fn build(curve: &SplineCurve<'_>, resolution: usize) -> Self {
        let segments = curve.segment_count().max(1);
        let resolution = resolution.max(1).div_ceil(segments) * segments;
        let mut distances = Vec::with_capacity(resolution + 1);
        let mut total = 0.0;
        let mut prev = curve.position(0.0);
        distances.push(0.0);
        for i in 1..=resolution {
            // Closed splines wrap t = 1 back to t = 0, which is the same point
            let p = curve.position(i as f64 / resolution as f64);
            total += prev.distance(p);
            distances.push(total);
            prev = p;
        }
        log::debug!(
            "built arc-length table: {} steps, length {:.6}",
            resolution,
            total
        );
        Self { distances }
    }

    /// Wrap precomputed cumulative distances.
    pub fn from_distances(distances: Vec<f64>) -> Result<Self> {
        if distances.len() < 2 {
            return Err(SplError::InsufficientPoints {
                required: 2,
                actual: distances.len(),
            });
        }
        if let Some(i) = distances.iter().position(|d| !d.is_finite()) {
            return Err(SplError::NonFinite(format!("arc-length entry {i}")));
        }
        if distances[0] != 0.0 {
            return Err(SplError::InvalidOperation("arc-length table must start at 0".into()));
        }
        if let Some(i) = distances.windows(2).position(|w| w[1] < w[0]) {
            return Err(SplError::InvalidOperation(format!(
                "arc-length entry {} is shorter than entry {i}",
                i + 1
            )));
        }
        Ok(Self { distances })
    }

    pub fn resolution(&self) -> usize {
        self.distances.len() - 1
    }

    pub fn total_length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distance traveled from the start to parameter `t`, clamped to
    /// `[0, 1]`.
    pub fn t_to_distance(&self, t: f64) -> f64 {
        let res = self.resolution();
        let scaled = if t.is_finite() { t.clamp(0.0, 1.0) * res as f64 } else { 0.0 };
        let i = (scaled.floor() as usize).min(res - 1);
        let frac = scaled - i as f64;
        self.distances[i] + (self.distances[i + 1] - self.distances[i]) * frac
    }

    /// Parameter at which `distance` has been traveled, clamped to
    /// `[0, total_length]`. Inside a stationary stretch the start of the
    /// stretch is returned.
    pub fn distance_to_t(&self, distance: f64) -> f64 {
        let res = self.resolution();
        let d = if distance.is_finite() {
            distance.clamp(0.0, self.total_length())
        } else {
            0.0
        };
        // First entry at or past d; entry 0 is 0.0 so idx == 0 only for d == 0
        let idx = self.distances.partition_point(|&x| x < d);
        if idx == 0 {
            return 0.0;
        }
        let idx = idx.min(res);
        let lo = self.distances[idx - 1];
        let span = self.distances[idx] - lo;
        let frac = if span > 0.0 { (d - lo) / span } else { 0.0 };
        ((idx - 1) as f64 + frac.clamp(0.0, 1.0)) / res as f64
    }
}
