//! Monthly shift-rotation scheduling as a constraint model.
//!
//! Given a roster of workers and a horizon of days, decides which worker is
//! on duty on which day under staffing and fairness rules, and enumerates
//! the feasible schedules up to a configurable ceiling:
//!
//! - **Calendar**: maps day indices to weekdays from a configured start day.
//! - **Rotation model**: one boolean per `(worker, day)` cell with coverage,
//!   workload, days-off, rest and optional weekend-pairing rules, plus an
//!   optional weekend-load objective.
//! - **CP layer**: domain-agnostic boolean modeling (linear rows,
//!   implications, fixings) behind the [`cp::CpSolver`] trait, with a
//!   complete reference engine, [`cp::BacktrackSolver`].
//! - **Enumeration**: drives a solver, counts solutions, reports the
//!   requested ones and stops at the ceiling.
//! - **Reports**: per-day and per-worker breakdowns of one schedule.
//!
//! # Quick start
//!
//! ```
//! use u_rotation::cp::BacktrackSolver;
//! use u_rotation::enumerate::{solve, EnumeratorConfig, RunState};
//! use u_rotation::report::SolutionReport;
//! use u_rotation::rotation::RotationConfig;
//!
//! let mut reports: Vec<SolutionReport> = Vec::new();
//! let outcome = solve(
//!     &RotationConfig::residency_month(),
//!     &EnumeratorConfig::default().with_solution_limit(3),
//!     &BacktrackSolver::new(),
//!     &mut reports,
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.state, RunState::StoppedEarly);
//! assert_eq!(reports.len(), 3);
//! assert_eq!(reports[0].days.len(), 30);
//! ```
//!
//! # Architecture
//!
//! The rotation layer only builds a [`cp::CpModel`]; any engine
//! implementing [`cp::CpSolver`] can solve it. Logging goes through
//! `tracing`; no subscriber is installed by the library.

pub mod calendar;
pub mod cp;
pub mod enumerate;
pub mod error;
pub mod report;
pub mod rotation;

pub use error::{Result, RotationError};
