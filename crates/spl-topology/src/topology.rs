use serde::{Deserialize, Serialize};
use spl_core::error::{Result, SplError};
use spl_core::traits::Validate;

use crate::CurveMode;

/// Derived shape of a control point array: never stored, always recomputed
/// from `(mode, closed, point_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub mode: CurveMode,
    pub closed: bool,
    pub point_count: usize,
}

/// A whole-curve parameter split into a segment index and the parameter
/// inside that segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLocation {
    pub segment: usize,
    pub local_t: f64,
}

/// One entry of a B-spline evaluation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BSplineSlot {
    /// A stored control point.
    Point(usize),
    /// A phantom point past an open end, extrapolated as
    /// `near + (near - next)`.
    Extrapolated { near: usize, next: usize },
}

impl Topology {
    pub fn resolve(mode: CurveMode, closed: bool, point_count: usize) -> Self {
        Self {
            mode,
            closed,
            point_count,
        }
    }

    /// Too few points for a single segment.
    pub fn is_degenerate(&self) -> bool {
        self.point_count < self.mode.min_points()
    }

    /// Bezier only: stored points that belong to complete 4-point groups,
    /// minus the trailing anchor. Trailing points of an incomplete group are
    /// ignored by evaluation.
    pub fn group_count(&self) -> usize {
        let span = self.point_count.saturating_sub(1);
        span - span % 3
    }

    pub fn segment_count(&self) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        match self.mode {
            // A closed linear spline stores its closing point, so the count
            // is the same either way.
            CurveMode::Linear => self.point_count - 1,
            CurveMode::Bezier => self.group_count() / 3,
            CurveMode::BSpline => {
                if self.closed {
                    self.point_count
                } else {
                    self.point_count - 1
                }
            }
        }
    }

    /// Points lying on the curve, not counting the duplicated closing anchor.
    pub fn anchor_count(&self) -> usize {
        let n = self.point_count;
        match self.mode {
            CurveMode::Linear if self.closed => n.saturating_sub(1),
            CurveMode::Linear | CurveMode::BSpline => n,
            CurveMode::Bezier if n == 0 => 0,
            CurveMode::Bezier => {
                let anchors = self.group_count() / 3 + 1;
                if self.closed && anchors > 1 {
                    anchors - 1
                } else {
                    anchors
                }
            }
        }
    }

    /// Whole-curve parameter width of one segment.
    pub fn segment_width(&self) -> f64 {
        match self.segment_count() {
            0 => 1.0,
            n => 1.0 / n as f64,
        }
    }

    /// Wrap `t` into `[0, 1)` for closed splines, clamp it into `[0, 1]` for
    /// open ones. Non-finite input maps to 0.
    pub fn normalize_t(&self, t: f64) -> f64 {
        if !t.is_finite() {
            return 0.0;
        }
        if self.closed {
            let wrapped = t.rem_euclid(1.0);
            // rem_euclid of a tiny negative value rounds up to exactly 1.0
            if wrapped >= 1.0 {
                0.0
            } else {
                wrapped
            }
        } else {
            t.clamp(0.0, 1.0)
        }
    }

    pub fn locate(&self, t: f64) -> SegmentLocation {
        let segments = self.segment_count();
        if segments == 0 {
            return SegmentLocation {
                segment: 0,
                local_t: 0.0,
            };
        }
        let scaled = self.normalize_t(t) * segments as f64;
        let segment = (scaled.floor() as usize).min(segments - 1);
        SegmentLocation {
            segment,
            local_t: (scaled - segment as f64).clamp(0.0, 1.0),
        }
    }

    /// Inverse of [`Topology::locate`].
    pub fn to_global(&self, segment: usize, local_t: f64) -> f64 {
        let segments = self.segment_count();
        if segments == 0 {
            return 0.0;
        }
        let t = (segment as f64 + local_t.clamp(0.0, 1.0)) / segments as f64;
        self.normalize_t(t)
    }

    /// Map a possibly out-of-range index onto a stored point.
    ///
    /// Closed splines wrap modulo the number of distinct points (the linear
    /// and Bezier closing anchor duplicates point 0); open splines clamp.
    pub fn wrap(&self, index: isize) -> usize {
        let n = self.point_count;
        if n == 0 {
            return 0;
        }
        if !self.closed {
            return index.clamp(0, n as isize - 1) as usize;
        }
        let m = match self.mode {
            CurveMode::Linear => n - 1,
            CurveMode::Bezier => self.group_count(),
            CurveMode::BSpline => n,
        };
        if m == 0 {
            return 0;
        }
        let m = m as isize;
        (((index % m) + m) % m) as usize
    }

    pub fn linear_window(&self, segment: usize) -> [usize; 2] {
        let i = segment as isize;
        [self.wrap(i), self.wrap(i + 1)]
    }

    /// The 4 stored indices of a cubic Bezier segment. The first index is a
    /// multiple of 3 and never past `point_count - 4`.
    pub fn bezier_window(&self, segment: usize) -> [usize; 4] {
        let last_base = self.group_count().saturating_sub(3);
        let base = (segment * 3).min(last_base);
        [base, base + 1, base + 2, base + 3]
    }

    /// The `[i - 1, i, i + 1, i + 2]` window of B-spline segment `i`.
    pub fn bspline_window(&self, segment: usize) -> [BSplineSlot; 4] {
        let n = self.point_count as isize;
        let slot = |offset: isize| {
            let i = segment as isize + offset;
            if self.closed {
                BSplineSlot::Point(self.wrap(i))
            } else if i < 0 {
                BSplineSlot::Extrapolated {
                    near: 0,
                    next: self.wrap(1),
                }
            } else if i >= n {
                BSplineSlot::Extrapolated {
                    near: self.wrap(n - 1),
                    next: self.wrap(n - 2),
                }
            } else {
                BSplineSlot::Point(i as usize)
            }
        };
        [slot(-1), slot(0), slot(1), slot(2)]
    }
}

impl Validate for Topology {
    fn validate(&self) -> Result<()> {
        if !self.mode.is_valid_count(self.point_count) {
            return Err(SplError::InvalidPointCount {
                mode: self.mode.name(),
                count: self.point_count,
            });
        }
        Ok(())
    }
}
