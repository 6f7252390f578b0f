//! Structural edits on the point store.
//!
//! Every operation either leaves the store valid for its mode (Bezier counts
//! stay `1 mod 3`, closed linear and Bezier splines end on their first
//! point) or fails without touching it. Successful edits bump the revision
//! and notify observers; arc-length tables built earlier are stale
//! afterwards.

use spl_core::error::{Result, SplError};
use spl_core::Tolerance;
use spl_geometry::curve::split_segment;
use spl_geometry::ControlPoint;
use spl_math::Point3;
use spl_topology::CurveMode;

use crate::observer::SplineChange;
use crate::spline::Spline;

/// Distance of synthesized Bezier handles from their anchor, as a fraction
/// of the anchor-to-anchor vector.
pub const HANDLE_FRACTION: f64 = 0.25;

fn mirror(anchor: Point3, handle: Point3) -> Point3 {
    anchor + (anchor - handle)
}

/// Turn `follower` to point away from `leader` through `anchor`, keeping its
/// own distance from the anchor. A follower sitting on the anchor becomes the
/// full mirror of `leader`; a leader sitting on the anchor leaves it alone.
fn align(anchor: Point3, leader: Point3, follower: Point3, tolerance: Tolerance) -> Point3 {
    let length = follower.distance(anchor);
    match (anchor - leader).try_normalize() {
        Some(_) if tolerance.is_zero(length) => mirror(anchor, leader),
        Some(dir) => anchor + dir * length,
        None => follower,
    }
}

/// Point between `a` and `b` at `t` with its position replaced.
fn handle_between(a: &ControlPoint, b: &ControlPoint, t: f64, position: Point3) -> ControlPoint {
    ControlPoint {
        position,
        ..a.lerp(b, t)
    }
}

impl Spline {
    /// Add an anchor after the last one and return its index.
    ///
    /// Bezier splines also get the two handles of the new segment: the
    /// first continues the previous segment's incoming handle through the
    /// old end anchor, the second sits a quarter of the way back from the
    /// new anchor. On closed splines the point goes before the closing
    /// segment.
    pub fn append(&mut self, point: ControlPoint) -> Result<usize> {
        if !point.is_finite() {
            return Err(SplError::NonFinite("appended point".into()));
        }
        let index = match (self.mode, self.closed) {
            (_, false) => self.push_anchor(point),
            (CurveMode::Linear, true) => {
                let index = self.points.len() - 1;
                self.points.insert(index, point);
                index
            }
            (CurveMode::Bezier, true) => {
                self.open_store();
                let index = self.push_anchor(point);
                self.close_store();
                index
            }
            (CurveMode::BSpline, true) => self.push_anchor(point),
        };
        self.commit(SplineChange::Appended { index });
        Ok(index)
    }

    fn push_anchor(&mut self, point: ControlPoint) -> usize {
        match self.mode {
            CurveMode::Linear | CurveMode::BSpline => {
                self.points.push(point);
                self.points.len() - 1
            }
            CurveMode::Bezier => self.push_bezier_anchor(point),
        }
    }

    fn push_bezier_anchor(&mut self, point: ControlPoint) -> usize {
        let Some(&last) = self.points.last() else {
            self.points.push(point);
            return 0;
        };
        let n = self.points.len();
        let dir = point.position - last.position;

        let mirrored = (n >= 4)
            .then(|| mirror(last.position, self.points[n - 2].position))
            .filter(|h| !self.settings().tolerance.is_zero(h.distance(last.position)));
        let out = mirrored.unwrap_or(last.position + dir * HANDLE_FRACTION);
        let into = point.position - dir * HANDLE_FRACTION;

        self.points.extend([
            handle_between(&last, &point, 1.0 / 3.0, out),
            handle_between(&last, &point, 2.0 / 3.0, into),
            point,
        ]);
        n + 2
    }

    /// Project `query` (world space) onto the curve and add an anchor
    /// there. Returns the new anchor's index.
    ///
    /// Linear and B-spline splines get the evaluated point inserted after
    /// the segment start. Bezier segments are split exactly, so the curve
    /// keeps its shape: the segment's two handles are shortened and a new
    /// anchor with its own pair of handles goes between them.
    ///
    /// A query that lands on an existing anchor is rejected rather than
    /// duplicating it.
    pub fn insert_at(&mut self, query: Point3) -> Result<usize> {
        if !query.is_finite() {
            return Err(SplError::NonFinite("insertion query".into()));
        }
        let topology = self.topology();
        if topology.is_degenerate() {
            return Err(SplError::InsufficientPoints {
                required: self.mode.min_points(),
                actual: self.points.len(),
            });
        }

        let hit = self.project_detailed(query);
        let tolerance = self.settings().tolerance;
        let on_anchor = |spline: &Self, at: Point3, ends: [usize; 2]| {
            ends.iter()
                .any(|&i| tolerance.points_eq(spline.points[i].position.distance_squared(at)))
        };
        let index = match self.mode {
            CurveMode::Linear | CurveMode::BSpline => {
                let sample = self.local_curve().evaluate(hit.t);
                let ends = topology.linear_window(hit.segment);
                if self.mode == CurveMode::Linear && on_anchor(self, sample.position, ends) {
                    return Err(SplError::InvalidOperation(format!(
                        "insertion point lands on an existing anchor of segment {}",
                        hit.segment
                    )));
                }
                let a = self.points[hit.segment].tag;
                let b = self.points[topology.wrap(hit.segment as isize + 1)].tag;
                let point = ControlPoint {
                    position: sample.position,
                    orientation: sample.orientation,
                    scale: sample.scale,
                    tag: a.lerp(b, hit.local_t as f32),
                };
                let index = hit.segment + 1;
                self.points.insert(index, point);
                index
            }
            CurveMode::Bezier => {
                let [a0, h0, h1, a1] = topology.bezier_window(hit.segment);
                let segment = [self.points[a0], self.points[h0], self.points[h1], self.points[a1]];
                let split = split_segment(segment, hit.local_t);
                if on_anchor(self, split[2].position, [a0, a1]) {
                    return Err(SplError::InvalidOperation(format!(
                        "insertion point lands on an existing anchor of segment {}",
                        hit.segment
                    )));
                }
                self.points.splice(h0..a1, split);
                // Splitting a seam segment shortens one of the seam handles
                self.sync_closing(None);
                a0 + 3
            }
        };
        self.commit(SplineChange::Inserted { index });
        Ok(index)
    }

    /// Reverse the direction of travel. Bezier handles stay handles.
    pub fn reverse(&mut self) -> Result<()> {
        if self.points.len() < 2 {
            return Ok(());
        }
        self.points.reverse();
        self.commit(SplineChange::Reversed);
        Ok(())
    }

    /// Grow or truncate the store. New points are defaults at the origin
    /// and are expected to be overwritten by the caller. On closed splines
    /// the closing point is refreshed afterwards.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        if !self.mode.is_valid_count(len) {
            return Err(SplError::InvalidPointCount {
                mode: self.mode.name(),
                count: len,
            });
        }
        let required = self.mode.min_points() + self.mode.closing_points();
        if self.closed && len < required {
            return Err(SplError::InsufficientPoints { required, actual: len });
        }
        let from = self.points.len();
        if len == from {
            return Ok(());
        }
        self.points.resize(len, ControlPoint::default());
        if self.closed {
            self.sync_closing(None);
        }
        self.commit(SplineChange::Resized { from, to: len });
        Ok(())
    }

    /// Open or close the loop. Linear splines gain or lose the duplicated
    /// first point, Bezier splines the closing segment's two handles and
    /// the duplicated first anchor. B-splines only flip the flag.
    /// Setting the current value does nothing.
    pub fn set_closed(&mut self, closed: bool) -> Result<()> {
        if closed == self.closed {
            return Ok(());
        }
        if closed {
            let required = self.mode.min_points();
            if self.points.len() < required {
                return Err(SplError::InsufficientPoints {
                    required,
                    actual: self.points.len(),
                });
            }
            self.close_store();
        } else {
            self.open_store();
        }
        self.commit(SplineChange::ClosedChanged { closed });
        Ok(())
    }

    fn close_store(&mut self) {
        let n = self.points.len();
        match self.mode {
            CurveMode::Linear => self.points.push(self.points[0]),
            CurveMode::Bezier => {
                let first = self.points[0];
                let last = self.points[n - 1];
                let out = mirror(last.position, self.points[n - 2].position);
                let into = mirror(first.position, self.points[1].position);
                self.points.extend([
                    handle_between(&last, &first, 1.0 / 3.0, out),
                    handle_between(&last, &first, 2.0 / 3.0, into),
                    first,
                ]);
            }
            CurveMode::BSpline => {}
        }
        self.closed = true;
    }

    fn open_store(&mut self) {
        let keep = self.points.len().saturating_sub(self.mode.closing_points());
        self.points.truncate(keep);
        self.closed = false;
    }

    /// Rewrite the closing point (and for Bezier the mirrored closing
    /// handle) from the start of the spline. Returns whether anything
    /// changed.
    pub fn ensure_closed_invariant(&mut self) -> bool {
        let changed = self.sync_closing(None);
        if changed {
            self.commit(SplineChange::ClosingRepaired);
        }
        changed
    }

    /// Keep the duplicated closing anchor in step with the first anchor and
    /// the two seam handles collinear through it. `edited` picks which side
    /// wins; by default the start of the spline does. The losing handle
    /// keeps its length, so shortening one seam handle does not reshape the
    /// segment on the other side.
    fn sync_closing(&mut self, edited: Option<usize>) -> bool {
        let n = self.points.len();
        if !self.closed || n < 2 || self.mode.closing_points() == 0 {
            return false;
        }
        let before = self.points.clone();

        if edited == Some(n - 1) {
            self.points[0] = self.points[n - 1];
        } else {
            self.points[n - 1] = self.points[0];
        }
        let tolerance = self.settings().tolerance;
        if self.mode == CurveMode::Bezier && n >= 4 {
            let anchor = self.points[0].position;
            let (leader, follower) = if edited == Some(n - 2) { (n - 2, 1) } else { (1, n - 2) };
            self.points[follower].position = align(
                anchor,
                self.points[leader].position,
                self.points[follower].position,
                tolerance,
            );
        }

        before
            .iter()
            .zip(&self.points)
            .any(|(a, b)| !a.approx_eq(b, tolerance))
    }

    /// Convert the store to another mode, keeping the anchors. Bezier
    /// splines built this way have straight handles at a third and two
    /// thirds of each segment; a closed one gets the same mirrored closing
    /// segment as [`Spline::set_closed`].
    pub fn set_mode(&mut self, mode: CurveMode) -> Result<()> {
        let from = self.mode;
        if mode == from {
            return Ok(());
        }
        let anchors = self.distinct_anchors();
        let closed = self.closed;

        let mut points = Vec::new();
        match mode {
            CurveMode::Linear | CurveMode::BSpline => points.extend_from_slice(&anchors),
            CurveMode::Bezier => {
                let straight = |a: &ControlPoint, b: &ControlPoint| {
                    [a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), *b]
                };
                points.extend(anchors.first().copied());
                for pair in anchors.windows(2) {
                    points.extend(straight(&pair[0], &pair[1]));
                }
            }
        }

        self.points = points;
        self.mode = mode;
        self.closed = false;
        if closed {
            if self.points.len() >= mode.min_points() {
                self.close_store();
            } else {
                self.closed = true;
            }
        }
        self.commit(SplineChange::ModeChanged { from, to: mode });
        Ok(())
    }

    /// Anchors in order, without the duplicated closing anchor.
    fn distinct_anchors(&self) -> Vec<ControlPoint> {
        let mut anchors: Vec<ControlPoint> = match self.mode {
            CurveMode::Bezier => self.points.iter().step_by(3).copied().collect(),
            CurveMode::Linear | CurveMode::BSpline => self.points.clone(),
        };
        if self.closed && self.mode.closing_points() > 0 && anchors.len() > 1 {
            anchors.pop();
        }
        anchors
    }

    /// Remove the point at `index` and return it. On Bezier splines
    /// `index` must be an anchor; its two neighboring handles go with it.
    /// Closed splines keep at least two anchors.
    pub fn remove_at(&mut self, index: usize) -> Result<ControlPoint> {
        let n = self.points.len();
        if index >= n {
            return Err(SplError::IndexOutOfRange { index, len: n });
        }
        if self.mode == CurveMode::Bezier && !self.mode.is_anchor(index) {
            return Err(SplError::InvalidOperation(format!(
                "point {index} is a bezier handle; remove its anchor instead"
            )));
        }
        let anchors = self.anchor_count();
        if self.closed && anchors <= 2 {
            return Err(SplError::InsufficientPoints {
                required: 3,
                actual: anchors,
            });
        }

        let closing = self.closed && self.mode.closing_points() > 0 && (index == 0 || index == n - 1);
        let removed = match self.mode {
            _ if closing => {
                // Drop the first anchor, then point the closing anchor at the new first
                let removed = self.points[0];
                let span = if self.mode == CurveMode::Bezier { 3 } else { 1 };
                self.points.drain(0..span);
                self.sync_closing(None);
                removed
            }
            CurveMode::Linear | CurveMode::BSpline => self.points.remove(index),
            CurveMode::Bezier if n == 1 => self.points.remove(0),
            CurveMode::Bezier => {
                let range = if index == 0 {
                    0..3
                } else if index == n - 1 {
                    n - 3..n
                } else {
                    index - 1..index + 2
                };
                let removed = self.points[index];
                self.points.drain(range);
                removed
            }
        };
        self.commit(SplineChange::Removed { index });
        Ok(removed)
    }

    /// Overwrite one stored point. Returns `false`, without bumping the
    /// revision, when the new value is approximately equal to the old one.
    /// On closed splines the closing counterpart follows the edit.
    pub fn set_point(&mut self, index: usize, point: ControlPoint) -> Result<bool> {
        let n = self.points.len();
        if index >= n {
            return Err(SplError::IndexOutOfRange { index, len: n });
        }
        if !point.is_finite() {
            return Err(SplError::NonFinite(format!("control point {index}")));
        }
        if self.points[index].approx_eq(&point, self.settings().tolerance) {
            return Ok(false);
        }
        self.points[index] = point;
        self.sync_closing(Some(index));
        self.commit(SplineChange::PointChanged { index });
        Ok(true)
    }
}
