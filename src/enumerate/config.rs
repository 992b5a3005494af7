//! Enumerator configuration.

use std::collections::BTreeSet;

use crate::cp::SolverConfig;

/// How the reported solution count treats the solution that reaches the
/// ceiling.
///
/// The solution that triggers an early stop is always observed (and
/// reported if its index is requested). The convention only affects the
/// headline [`solution_count`](super::RunStatistics::solution_count).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CountConvention {
    /// Count every observed solution, including the triggering one.
    #[default]
    IncludeTrigger,
    /// Leave the triggering solution out when the run stopped early.
    ExcludeTrigger,
}

/// Configuration of a [`SolutionEnumerator`](super::SolutionEnumerator).
///
/// # Examples
///
/// ```
/// use u_rotation::enumerate::{CountConvention, EnumeratorConfig};
/// use u_rotation::cp::SolverConfig;
///
/// let config = EnumeratorConfig::default()
///     .with_first_reports(3)
///     .with_solution_limit(50)
///     .with_count_convention(CountConvention::ExcludeTrigger)
///     .with_solver(SolverConfig::default().with_time_limit_ms(5_000));
/// assert!(config.validate().is_ok());
/// assert!(config.report_indices.contains(&2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumeratorConfig {
    /// 0-based discovery ordinals whose solutions are reported in full.
    pub report_indices: BTreeSet<u64>,

    /// Ceiling on observed solutions. Must be at least 1.
    pub solution_limit: u64,

    /// Counting convention for the ceiling-triggering solution.
    pub count_convention: CountConvention,

    /// Budgets passed through to the solver.
    pub solver: SolverConfig,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            report_indices: (0..5).collect(),
            solution_limit: 1000,
            count_convention: CountConvention::default(),
            solver: SolverConfig::default(),
        }
    }
}

impl EnumeratorConfig {
    pub fn with_report_indices(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.report_indices = indices.into_iter().collect();
        self
    }

    /// Reports the first `n` solutions.
    pub fn with_first_reports(self, n: u64) -> Self {
        self.with_report_indices(0..n)
    }

    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = limit;
        self
    }

    pub fn with_count_convention(mut self, convention: CountConvention) -> Self {
        self.count_convention = convention;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.solution_limit == 0 {
            return Err("solution_limit must be at least 1".into());
        }
        Ok(())
    }
}
