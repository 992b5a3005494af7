//! Bounded solution enumeration.
//!
//! Runs a [`CpSolver`](crate::cp::CpSolver) over a
//! [`RotationModel`](crate::rotation::RotationModel), observing each
//! solution in discovery order. Requested solutions are assembled into
//! [`SolutionReport`](crate::report::SolutionReport)s and handed to a
//! [`ReportSink`]; the run stops early once the solution ceiling is
//! reached.
//!
//! # Key Components
//!
//! - [`EnumeratorConfig`]: report indices, ceiling, counting convention
//! - [`SolutionEnumerator`]: the run state machine
//! - [`solve`]: build-and-run entry point
//! - [`RunOutcome`] / [`RunStatistics`]: what a run produced

mod config;
mod runner;
mod types;

pub use config::{CountConvention, EnumeratorConfig};
pub use runner::{solve, SolutionEnumerator};
pub use types::{ReportSink, RunOutcome, RunState, RunStatistics, SolveMode};
