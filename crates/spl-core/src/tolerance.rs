/// Tolerances used by degenerate-input detection and change detection.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Lengths below this are treated as zero (segments, tangents).
    pub linear: f64,
    /// Squared-distance threshold for approximate control point equality.
    pub point_eq_sq: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-9;
    pub const DEFAULT_POINT_EQ_SQ: f64 = 1e-3;

    pub fn new(linear: f64, point_eq_sq: f64) -> Self {
        Self {
            linear,
            point_eq_sq,
        }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            point_eq_sq: Self::DEFAULT_POINT_EQ_SQ,
        }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-6,
            point_eq_sq: 1e-2,
        }
    }

    pub fn tight() -> Self {
        Self {
            linear: 1e-12,
            point_eq_sq: 1e-6,
        }
    }

    /// Check if two values are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a length is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if a squared distance is small enough to call two points equal
    pub fn points_eq(self, distance_sq: f64) -> bool {
        distance_sq < self.point_eq_sq
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_default_precision() {
        assert_eq!(Tolerance::default(), Tolerance::default_precision());
    }

    #[test]
    fn test_is_zero() {
        let tol = Tolerance::default();
        assert!(tol.is_zero(1e-12));
        assert!(!tol.is_zero(1e-3));
        assert!(tol.linear_eq(1.0, 1.0 + 1e-12));
    }

    #[test]
    fn test_points_eq_threshold() {
        let tol = Tolerance::default();
        assert!(tol.points_eq(5e-4));
        assert!(!tol.points_eq(2e-3));
    }
}
