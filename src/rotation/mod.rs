//! Rotation constraint model.
//!
//! Translates a monthly shift-rotation problem (roster, horizon, days off,
//! coverage, workload, rest and weekend pairing rules) into a boolean
//! [`CpModel`](crate::cp::CpModel) over a `workers × days` assignment grid.
//!
//! # Key Components
//!
//! - [`RotationConfig`]: problem parameters, validated before building
//! - [`RotationModel`]: variable grid and registered constraints
//! - [`ShiftGrid`]: one materialized valuation of the grid
//! - [`audit`]: solver-independent rule check returning [`Violation`]s

mod audit;
mod config;
mod grid;
mod model;

pub use audit::{audit, Violation};
pub use config::{Bounds, CoveragePolicy, RotationConfig};
pub use grid::ShiftGrid;
pub use model::RotationModel;
