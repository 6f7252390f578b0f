pub mod error;
pub mod settings;
pub mod tolerance;
pub mod traits;

pub use error::{Result, SplError};
pub use settings::SolverSettings;
pub use tolerance::Tolerance;
