//! Constraint Programming (CP) layer over boolean variables.
//!
//! The rotation model talks to its search engine only through this layer.
//!
//! # Key Components
//!
//! - **Variables**: [`VarId`] handles to [`BoolVar`] declarations
//! - **Constraints**: [`Constraint`]: linear rows, implications, fixings
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait, enumerate-all and minimize, both
//!   streaming solutions to a [`SolutionCallback`] that may return
//!   [`SearchCommand::Stop`]
//!
//! # Design
//!
//! The [`CpSolver`] trait allows plugging in external engines.
//! [`BacktrackSolver`] is a complete reference engine suitable for
//! small rosters and for testing.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, Objective};
pub use search::BacktrackSolver;
pub use solver::{
    CpSolution, CpSolver, SearchCommand, SearchOutcome, SearchStats, SolutionCallback,
    SolverConfig, SolverStatus,
};
pub use variables::{BoolVar, VarId};
