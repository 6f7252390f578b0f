//! Tunable constants for the evaluator, the projection solver and the
//! arc-length table.
//!
//! The projection solver is a bracketing descent: each iteration compares
//! the squared distance at `t - step`, `t` and `t + step` and keeps the
//! closest, then multiplies `step` by `shrink`. The final parameter error per
//! segment is bounded by the last step, so `min_step` sets the accuracy and
//! `shrink` sets how many iterations are needed to reach it
//! (`ln(min_step / initial_step) / ln(shrink)`, about 23 with the defaults).

use crate::tolerance::Tolerance;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Local segment parameter the descent starts from.
    pub initial_t: f64,
    /// First step of the descent, in local segment parameter units.
    pub initial_step: f64,
    /// Factor applied to the step after every iteration. Must be in (0.5, 1).
    pub shrink: f64,
    /// Hard cap on descent iterations per segment.
    pub max_iterations: u32,
    /// The descent stops once the step falls below this.
    pub min_step: f64,
    /// Half-width of the central difference used for forward vectors,
    /// in whole-curve parameter units.
    pub tangent_epsilon: f64,
    /// Number of steps used when an arc-length table is built implicitly.
    pub default_resolution: usize,
    pub tolerance: Tolerance,
}

impl SolverSettings {
    pub const DEFAULT_INITIAL_T: f64 = 0.5;
    pub const DEFAULT_INITIAL_STEP: f64 = 1.0;
    pub const DEFAULT_SHRINK: f64 = 0.6;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 128;
    pub const DEFAULT_MIN_STEP: f64 = 1e-5;
    pub const DEFAULT_TANGENT_EPSILON: f64 = 1.0 / 256.0;
    pub const DEFAULT_RESOLUTION: usize = 256;

    /// Slower shrink and a smaller final step; roughly twice the iterations.
    pub fn precise() -> Self {
        Self {
            shrink: 0.75,
            min_step: 1e-8,
            default_resolution: 1024,
            tolerance: Tolerance::tight(),
            ..Self::default()
        }
    }

    /// Fast shrink and a coarse final step, for interactive previews.
    pub fn fast() -> Self {
        Self {
            shrink: 0.55,
            max_iterations: 32,
            min_step: 1e-3,
            default_resolution: 64,
            ..Self::default()
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            initial_t: Self::DEFAULT_INITIAL_T,
            initial_step: Self::DEFAULT_INITIAL_STEP,
            shrink: Self::DEFAULT_SHRINK,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            min_step: Self::DEFAULT_MIN_STEP,
            tangent_epsilon: Self::DEFAULT_TANGENT_EPSILON,
            default_resolution: Self::DEFAULT_RESOLUTION,
            tolerance: Tolerance::default(),
        }
    }
}
