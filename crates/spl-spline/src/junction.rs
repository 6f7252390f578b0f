//! Splines that attach their ends to other splines.
//!
//! A junction is a weak link: the spline at one end stores the key of its
//! target plus where along the target it attaches. Links are only followed
//! when [`SplineGraph::resolve_junctions`] is called; they never own the
//! target and do not keep it alive.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use spl_core::error::{Result, SplError};
use spl_geometry::ControlPoint;
use spl_topology::CurveMode;

use crate::spline::Spline;

new_key_type! {
    pub struct SplineKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JunctionEnd {
    Start,
    End,
}

/// Attachment of one spline end to a point on another spline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub target: SplineKey,
    /// Parameter along the target, in `[0, 1]`.
    pub percent: f64,
    /// Length of the Bezier handle laid along the target's direction.
    pub tightness: f64,
}

impl Junction {
    pub fn new(target: SplineKey, percent: f64, tightness: f64) -> Self {
        Self {
            target,
            percent,
            tightness,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Ends {
    start: Option<Junction>,
    end: Option<Junction>,
}

impl Ends {
    fn get(&self, end: JunctionEnd) -> Option<&Junction> {
        match end {
            JunctionEnd::Start => self.start.as_ref(),
            JunctionEnd::End => self.end.as_ref(),
        }
    }

    fn slot(&mut self, end: JunctionEnd) -> &mut Option<Junction> {
        match end {
            JunctionEnd::Start => &mut self.start,
            JunctionEnd::End => &mut self.end,
        }
    }

    fn targets(&self) -> impl Iterator<Item = SplineKey> + '_ {
        self.start.iter().chain(self.end.iter()).map(|j| j.target)
    }
}

/// Owner of a set of splines and the junctions between them.
///
/// Junctions always form a directed acyclic graph: attaching a spline to
/// itself, directly or through other splines, is rejected.
#[derive(Debug, Default)]
pub struct SplineGraph {
    splines: SlotMap<SplineKey, Spline>,
    junctions: SecondaryMap<SplineKey, Ends>,
}

impl SplineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spline: Spline) -> SplineKey {
        self.splines.insert(spline)
    }

    /// Remove a spline together with its own junctions. Junctions of other
    /// splines that point at it are cleared.
    pub fn remove(&mut self, key: SplineKey) -> Option<Spline> {
        let spline = self.splines.remove(key)?;
        self.junctions.remove(key);
        for (source, ends) in self.junctions.iter_mut() {
            for end in [JunctionEnd::Start, JunctionEnd::End] {
                let slot = ends.slot(end);
                if slot.is_some_and(|j| j.target == key) {
                    log::debug!("cleared {:?} junction of {:?}: target removed", end, source);
                    *slot = None;
                }
            }
        }
        Some(spline)
    }

    pub fn get(&self, key: SplineKey) -> Option<&Spline> {
        self.splines.get(key)
    }

    pub fn get_mut(&mut self, key: SplineKey) -> Option<&mut Spline> {
        self.splines.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SplineKey, &Spline)> {
        self.splines.iter()
    }

    pub fn junction(&self, key: SplineKey, end: JunctionEnd) -> Option<&Junction> {
        self.junctions.get(key).and_then(|ends| ends.get(end))
    }

    /// Attach `end` of `key` to another spline, replacing any junction that
    /// end already had.
    pub fn set_junction(&mut self, key: SplineKey, end: JunctionEnd, junction: Junction) -> Result<()> {
        let spline = self
            .splines
            .get(key)
            .ok_or_else(|| SplError::NotFound(format!("spline {key:?}")))?;
        if !self.splines.contains_key(junction.target) {
            return Err(SplError::NotFound(format!("junction target {:?}", junction.target)));
        }
        if spline.is_closed() {
            return Err(SplError::InvalidOperation("closed splines have no free ends".into()));
        }
        if !junction.percent.is_finite() || !junction.tightness.is_finite() {
            return Err(SplError::NonFinite("junction percent or tightness".into()));
        }
        if junction.target == key {
            return Err(SplError::JunctionCycle(format!("spline {key:?} cannot attach to itself")));
        }
        if self.reaches(junction.target, key) {
            return Err(SplError::JunctionCycle(format!(
                "spline {:?} already depends on {key:?}",
                junction.target
            )));
        }

        let junction = Junction {
            percent: junction.percent.clamp(0.0, 1.0),
            ..junction
        };
        match self.junctions.get_mut(key) {
            Some(ends) => *ends.slot(end) = Some(junction),
            None => {
                let mut ends = Ends::default();
                *ends.slot(end) = Some(junction);
                self.junctions.insert(key, ends);
            }
        }
        log::debug!("attached {:?} end of {:?} to {:?}", end, key, junction.target);
        Ok(())
    }

    pub fn clear_junction(&mut self, key: SplineKey, end: JunctionEnd) -> Option<Junction> {
        self.junctions.get_mut(key).and_then(|ends| ends.slot(end).take())
    }

    /// Whether following junctions from `from` leads to `to`.
    fn reaches(&self, from: SplineKey, to: SplineKey) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(key) = stack.pop() {
            if key == to {
                return true;
            }
            if !visited.insert(key) {
                continue;
            }
            if let Some(ends) = self.junctions.get(key) {
                stack.extend(ends.targets());
            }
        }
        false
    }

    /// Move the attached ends of `key` onto their targets. Bezier ends also
    /// get their handle laid along the target's direction of travel.
    /// Returns whether any point moved.
    pub fn resolve_junctions(&mut self, key: SplineKey) -> Result<bool> {
        let ends = self.junctions.get(key).copied().unwrap_or_default();
        let mut edits = Vec::new();
        for end in [JunctionEnd::Start, JunctionEnd::End] {
            if let Some(junction) = ends.get(end) {
                edits.extend(self.junction_edits(key, end, junction)?);
            }
        }

        let spline = self
            .splines
            .get_mut(key)
            .ok_or_else(|| SplError::NotFound(format!("spline {key:?}")))?;
        let mut changed = false;
        for (index, point) in edits {
            changed |= spline.set_point(index, point)?;
        }
        Ok(changed)
    }

    /// Resolve every spline, targets before the splines attached to them.
    /// Returns how many splines changed.
    pub fn resolve_all(&mut self) -> Result<usize> {
        let mut order = Vec::with_capacity(self.splines.len());
        let mut visited = HashSet::new();
        for key in self.splines.keys() {
            self.visit(key, &mut visited, &mut order);
        }
        let mut changed = 0;
        for key in order {
            if self.resolve_junctions(key)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Post-order walk over junction targets.
    fn visit(&self, key: SplineKey, visited: &mut HashSet<SplineKey>, order: &mut Vec<SplineKey>) {
        if !visited.insert(key) {
            return;
        }
        if let Some(ends) = self.junctions.get(key) {
            for target in ends.targets() {
                self.visit(target, visited, order);
            }
        }
        order.push(key);
    }

    /// New values for the points at `end` of `key`, in the spline's stored
    /// coordinates.
    fn junction_edits(
        &self,
        key: SplineKey,
        end: JunctionEnd,
        junction: &Junction,
    ) -> Result<Vec<(usize, ControlPoint)>> {
        let spline = self
            .splines
            .get(key)
            .ok_or_else(|| SplError::NotFound(format!("spline {key:?}")))?;
        let Some(target) = self.splines.get(junction.target) else {
            log::warn!("junction target {:?} of {:?} no longer exists", junction.target, key);
            return Err(SplError::NotFound(format!("junction target {:?}", junction.target)));
        };
        if spline.is_empty() {
            return Ok(Vec::new());
        }
        if spline.is_closed() {
            log::warn!("skipping junction on closed spline {:?}", key);
            return Ok(Vec::new());
        }

        let world = target.position(junction.percent);
        let forward = target.forward(junction.percent);
        let space = spline.space();
        let n = spline.len();
        let (anchor, handle, sign) = match end {
            JunctionEnd::Start => (0, 1, 1.0),
            JunctionEnd::End => (n - 1, n.saturating_sub(2), -1.0),
        };

        let mut edits = vec![(
            anchor,
            ControlPoint {
                position: space.to_local_point(world),
                ..spline.points()[anchor]
            },
        )];
        if spline.mode() == CurveMode::Bezier && n >= 4 {
            let handle_world = world + forward * (junction.tightness * sign);
            edits.push((
                handle,
                ControlPoint {
                    position: space.to_local_point(handle_world),
                    ..spline.points()[handle]
                },
            ));
        }
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_math::dvec3;

    fn straight(mode: CurveMode, from: (f64, f64, f64), to: (f64, f64, f64)) -> Spline {
        Spline::from_positions(mode, &[dvec3(from.0, from.1, from.2), dvec3(to.0, to.1, to.2)]).unwrap()
    }

    #[test]
    fn test_self_junction_rejected() {
        let mut graph = SplineGraph::new();
        let a = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)));
        let err = graph
            .set_junction(a, JunctionEnd::Start, Junction::new(a, 0.5, 1.0))
            .unwrap_err();
        assert!(matches!(err, SplError::JunctionCycle(_)));
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let mut graph = SplineGraph::new();
        let a = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)));
        let b = graph.insert(straight(CurveMode::Linear, (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)));
        let c = graph.insert(straight(CurveMode::Linear, (0.0, 2.0, 0.0), (1.0, 2.0, 0.0)));
        graph.set_junction(a, JunctionEnd::End, Junction::new(b, 0.0, 1.0)).unwrap();
        graph.set_junction(b, JunctionEnd::End, Junction::new(c, 0.0, 1.0)).unwrap();
        let err = graph
            .set_junction(c, JunctionEnd::Start, Junction::new(a, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SplError::JunctionCycle(_)));
        assert!(graph.junction(c, JunctionEnd::Start).is_none());
    }

    #[test]
    fn test_resolve_linear_end() {
        let mut graph = SplineGraph::new();
        let target = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (10.0, 0.0, 0.0)));
        let branch = graph.insert(straight(CurveMode::Linear, (0.0, 5.0, 0.0), (4.0, 1.0, 0.0)));
        graph
            .set_junction(branch, JunctionEnd::End, Junction::new(target, 0.5, 2.0))
            .unwrap();
        assert!(graph.resolve_junctions(branch).unwrap());
        assert!((graph.get(branch).unwrap().points()[1].position - dvec3(5.0, 0.0, 0.0)).length() < 1e-9);
        // Already in place
        assert!(!graph.resolve_junctions(branch).unwrap());
    }

    #[test]
    fn test_resolve_bezier_start_handle() {
        let mut graph = SplineGraph::new();
        let target = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (10.0, 0.0, 0.0)));
        let branch = graph.insert(straight(CurveMode::Bezier, (2.0, 4.0, 0.0), (2.0, 9.0, 0.0)));
        graph
            .set_junction(branch, JunctionEnd::Start, Junction::new(target, 0.3, 1.5))
            .unwrap();
        graph.resolve_junctions(branch).unwrap();
        let points = graph.get(branch).unwrap().points();
        assert!((points[0].position - dvec3(3.0, 0.0, 0.0)).length() < 1e-9);
        assert!((points[1].position - dvec3(4.5, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut graph = SplineGraph::new();
        let a = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)));
        let b = graph.insert(straight(CurveMode::Linear, (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)));
        graph.set_junction(a, JunctionEnd::Start, Junction::new(b, 3.0, 1.0)).unwrap();
        assert_eq!(graph.junction(a, JunctionEnd::Start).unwrap().percent, 1.0);
    }

    #[test]
    fn test_remove_clears_incoming_junctions() {
        let mut graph = SplineGraph::new();
        let a = graph.insert(straight(CurveMode::Linear, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)));
        let b = graph.insert(straight(CurveMode::Linear, (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)));
        graph.set_junction(a, JunctionEnd::End, Junction::new(b, 0.0, 1.0)).unwrap();
        assert!(graph.remove(b).is_some());
        assert!(graph.junction(a, JunctionEnd::End).is_none());
        assert_eq!(graph.resolve_all().unwrap(), 0);
    }

    #[test]
    fn test_closed_spline_has_no_free_ends() {
        let mut graph = SplineGraph::new();
        let mut loop_spline = straight(CurveMode::Linear, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        loop_spline.set_closed(true).unwrap();
        let a = graph.insert(loop_spline);
        let b = graph.insert(straight(CurveMode::Linear, (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)));
        assert!(matches!(
            graph.set_junction(a, JunctionEnd::Start, Junction::new(b, 0.0, 1.0)),
            Err(SplError::InvalidOperation(_))
        ));
    }
}
