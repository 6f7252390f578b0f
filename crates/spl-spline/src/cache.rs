//! Caller-owned arc-length cache for constant-speed traversal.
//!
//! The cache is built lazily on the first distance query and remembers the
//! spline revision it was built from. It never rebuilds itself after a
//! mutation: call [`DistanceCache::rebuild`]. Reading a stale table through
//! the infallible accessors asserts in debug builds and answers from the old
//! table, clamped, in release builds.

use spl_core::error::{Result, SplError};
use spl_core::SolverSettings;
use spl_geometry::ArcLengthTable;

use crate::spline::Spline;

#[derive(Debug, Clone)]
pub struct DistanceCache {
    resolution: usize,
    table: Option<ArcLengthTable>,
    built_revision: u64,
}

impl DistanceCache {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
            table: None,
            built_revision: 0,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn is_built(&self) -> bool {
        self.table.is_some()
    }

    /// Built from an older revision of `spline`.
    pub fn is_stale(&self, spline: &Spline) -> bool {
        self.is_built() && self.built_revision != spline.revision()
    }

    pub fn table(&self) -> Option<&ArcLengthTable> {
        self.table.as_ref()
    }

    pub fn rebuild(&mut self, spline: &Spline) -> &ArcLengthTable {
        self.built_revision = spline.revision();
        self.table.insert(spline.curve().arc_length_table(self.resolution))
    }

    pub fn clear(&mut self) {
        self.table = None;
    }

    /// The table, built now if this is the first query. A stale table is
    /// returned as is.
    fn current(&mut self, spline: &Spline) -> &ArcLengthTable {
        if self.is_stale(spline) {
            log::warn!(
                "distance cache read at revision {} but built at revision {}",
                spline.revision(),
                self.built_revision
            );
            debug_assert!(
                false,
                "stale distance cache: built at revision {}, spline at revision {}",
                self.built_revision,
                spline.revision()
            );
        }
        if self.table.is_none() {
            self.built_revision = spline.revision();
        }
        let resolution = self.resolution;
        self.table
            .get_or_insert_with(|| spline.curve().arc_length_table(resolution))
    }

    fn checked(&self, spline: &Spline) -> Result<&ArcLengthTable> {
        let table = self.table.as_ref().ok_or(SplError::CacheNotBuilt)?;
        if self.built_revision != spline.revision() {
            return Err(SplError::StaleCache {
                built: self.built_revision,
                current: spline.revision(),
            });
        }
        Ok(table)
    }

    pub fn total_length(&mut self, spline: &Spline) -> f64 {
        self.current(spline).total_length()
    }

    pub fn distance_to_t(&mut self, spline: &Spline, distance: f64) -> f64 {
        self.current(spline).distance_to_t(distance)
    }

    pub fn t_to_distance(&mut self, spline: &Spline, t: f64) -> f64 {
        self.current(spline).t_to_distance(t)
    }

    pub fn try_total_length(&self, spline: &Spline) -> Result<f64> {
        Ok(self.checked(spline)?.total_length())
    }

    pub fn try_distance_to_t(&self, spline: &Spline, distance: f64) -> Result<f64> {
        Ok(self.checked(spline)?.distance_to_t(distance))
    }

    pub fn try_t_to_distance(&self, spline: &Spline, t: f64) -> Result<f64> {
        Ok(self.checked(spline)?.t_to_distance(t))
    }
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new(SolverSettings::DEFAULT_RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use spl_geometry::ControlPoint;
    use spl_math::{dvec3, DQuat, Point3, Space, Transform};
    use spl_topology::CurveMode;

    fn line() -> Spline {
        Spline::from_positions(CurveMode::Linear, &[dvec3(0.0, 0.0, 0.0), dvec3(10.0, 0.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_lazy_build() {
        let spline = line();
        let mut cache = DistanceCache::new(32);
        assert!(!cache.is_built());
        assert_eq!(cache.try_total_length(&spline), Err(SplError::CacheNotBuilt));
        assert_abs_diff_eq!(cache.distance_to_t(&spline, 2.5), 0.25, epsilon = 1e-12);
        assert!(cache.is_built());
        assert_abs_diff_eq!(cache.try_t_to_distance(&spline, 0.5).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_try_reports_stale() {
        let mut spline = line();
        let mut cache = DistanceCache::default();
        cache.rebuild(&spline);
        spline.append(ControlPoint::from_position(dvec3(10.0, 10.0, 0.0))).unwrap();
        assert!(cache.is_stale(&spline));
        assert_eq!(
            cache.try_distance_to_t(&spline, 1.0),
            Err(SplError::StaleCache { built: 0, current: 1 })
        );
        cache.rebuild(&spline);
        assert_abs_diff_eq!(cache.try_total_length(&spline).unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_space_change_makes_cache_stale() {
        let mut spline = line();
        let mut cache = DistanceCache::default();
        cache.rebuild(&spline);
        spline.set_space(Space::Local(Transform::from_scale_rotation_translation(
            dvec3(3.0, 3.0, 3.0),
            DQuat::IDENTITY,
            Point3::ZERO,
        )));
        assert_eq!(
            cache.try_total_length(&spline),
            Err(SplError::StaleCache { built: 0, current: 1 })
        );
        cache.rebuild(&spline);
        assert_abs_diff_eq!(cache.try_total_length(&spline).unwrap(), 30.0, epsilon = 1e-9);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stale distance cache")]
    fn test_stale_read_asserts_in_debug() {
        let mut spline = line();
        let mut cache = DistanceCache::default();
        cache.rebuild(&spline);
        spline.reverse().unwrap();
        cache.total_length(&spline);
    }

    #[test]
    fn test_clear_and_zero_resolution() {
        let spline = line();
        let mut cache = DistanceCache::new(0);
        assert_eq!(cache.resolution(), 1);
        cache.rebuild(&spline);
        cache.clear();
        assert!(cache.table().is_none());
    }
}
