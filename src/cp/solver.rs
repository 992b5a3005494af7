//! CP solver interface.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use super::model::CpModel;
use super::variables::VarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Minimization finished and the last reported solution is optimal.
    Optimal,
    /// Enumeration finished: every feasible solution was reported.
    AllSolutions,
    /// The search space was exhausted without any solution.
    Infeasible,
    /// The solution callback asked the search to stop, or the cancel flag
    /// was raised.
    Interrupted,
    /// Solver exceeded its time limit.
    Timeout,
    /// Solver exceeded its branch budget.
    BranchLimit,
    /// Model is invalid or malformed.
    ModelInvalid,
}

impl SolverStatus {
    /// Whether the search explored its whole space.
    pub fn is_proven(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal | SolverStatus::AllSolutions | SolverStatus::Infeasible
        )
    }

    /// Whether the solver stopped on one of its own resource limits.
    pub fn is_limit(self) -> bool {
        matches!(self, SolverStatus::Timeout | SolverStatus::BranchLimit)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::AllSolutions => "all solutions found",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Interrupted => "interrupted",
            SolverStatus::Timeout => "time limit reached",
            SolverStatus::BranchLimit => "branch limit reached",
            SolverStatus::ModelInvalid => "model invalid",
        };
        f.write_str(s)
    }
}

/// One complete assignment handed to a [`SolutionCallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    values: Vec<bool>,
    objective_value: Option<i64>,
}

impl CpSolution {
    pub fn new(values: Vec<bool>, objective_value: Option<i64>) -> Self {
        Self {
            values,
            objective_value,
        }
    }

    /// Value of `var` in this solution.
    ///
    /// Variables the solution does not cover read as `false`.
    #[inline]
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }

    /// All values in declaration order.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Objective value, when the model has an objective.
    pub fn objective_value(&self) -> Option<i64> {
        self.objective_value
    }
}

/// Instruction returned by a solution callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    /// Stop searching at the next decision point.
    Stop,
}

/// Receives solutions as the search discovers them.
///
/// Invocations are strictly sequential; a callback never overlaps with
/// another invocation.
pub trait SolutionCallback {
    fn on_solution(&mut self, solution: &CpSolution) -> SearchCommand;
}

impl<F> SolutionCallback for F
where
    F: FnMut(&CpSolution) -> SearchCommand,
{
    fn on_solution(&mut self, solution: &CpSolution) -> SearchCommand {
        self(solution)
    }
}

/// Search effort counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Propagation failures.
    pub conflicts: u64,
    /// Decisions taken.
    pub branches: u64,
    /// Wall-clock duration of the search.
    pub wall_time: Duration,
}

/// Final report of a solver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Solver status.
    pub status: SolverStatus,
    /// Effort counters.
    pub stats: SearchStats,
    /// Solutions passed to the callback.
    pub solutions: u64,
    /// Best objective value among reported solutions, if any. When
    /// minimizing this is the value of the last reported solution.
    pub best_objective: Option<i64>,
}

impl SearchOutcome {
    /// Creates an outcome with no solutions and no effort.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            stats: SearchStats::default(),
            solutions: 0,
            best_objective: None,
        }
    }

    /// Whether at least one solution was reported.
    pub fn is_solution_found(&self) -> bool {
        self.solutions > 0
    }
}

/// Solver configuration.
///
/// Limits are budgets owned by the solver; a value of 0 disables a limit.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: u64,
    /// Maximum number of decisions.
    pub branch_limit: u64,
    /// Seed for randomized value ordering. `None` keeps a fixed order.
    pub seed: Option<u64>,
    /// Cancellation token, polled before every decision. Raising it ends
    /// the search with [`SolverStatus::Interrupted`].
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            branch_limit: 0,
            seed: None,
            cancel: None,
        }
    }
}

/// Tokens compare by identity.
impl PartialEq for SolverConfig {
    fn eq(&self, other: &Self) -> bool {
        self.time_limit_ms == other.time_limit_ms
            && self.branch_limit == other.branch_limit
            && self.seed == other.seed
            && match (&self.cancel, &other.cancel) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for SolverConfig {}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_branch_limit(mut self, n: u64) -> Self {
        self.branch_limit = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can wrap
/// an external engine or the bundled [`BacktrackSolver`](super::BacktrackSolver).
pub trait CpSolver {
    /// Reports every feasible solution to `callback` until the space is
    /// exhausted, a limit is hit, or the callback returns
    /// [`SearchCommand::Stop`]. Any objective on the model is ignored.
    fn search_all(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        callback: &mut dyn SolutionCallback,
    ) -> SearchOutcome;

    /// Minimizes the model's objective, reporting each strictly improving
    /// solution to `callback`.
    ///
    /// A model without an objective behaves as if every solution scored 0,
    /// so at most one solution is reported.
    fn minimize(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        callback: &mut dyn SolutionCallback,
    ) -> SearchOutcome;
}
