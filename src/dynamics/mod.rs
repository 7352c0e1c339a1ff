//! Simulation dynamics: force integration, constraint passes, stabilization and validation.

pub mod integrator;
pub mod parallel;
pub mod solver;
pub mod stabilizer;
pub mod validator;

pub use integrator::{select_strategy, IntegrationStrategy, Integrator, PointKernel};
pub use solver::{ConstraintSolver, SolverStepMetrics};
pub use stabilizer::Stabilizer;
pub use validator::{ValidationOutcome, Validator};
