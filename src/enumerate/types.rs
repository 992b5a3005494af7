//! Run states, outcomes and report sinks.

use std::fmt;
use std::time::Duration;

use crate::report::SolutionReport;

/// Lifecycle of a [`SolutionEnumerator`](super::SolutionEnumerator).
///
/// `Idle → Running → {Completed | StoppedEarly | ExhaustedProof}`, or
/// `Running → Aborted` when the solver fails or runs out of budget in a
/// way that leaves the run without an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    Idle,
    Running,
    /// Optimization finished.
    Completed,
    /// The solution ceiling was reached or the run was cancelled.
    StoppedEarly,
    /// Every solution was enumerated. Zero solutions proves infeasibility.
    ExhaustedProof,
    /// The solver stopped without an answer.
    Aborted,
}

impl RunState {
    /// Whether the run has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Idle | RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::StoppedEarly => "stopped early",
            RunState::ExhaustedProof => "exhausted",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What the solver is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveMode {
    /// List every feasible solution.
    EnumerateAll,
    /// Search for minimum weekend load, observing each improvement.
    Optimize,
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMode::EnumerateAll => f.write_str("enumerate"),
            SolveMode::Optimize => f.write_str("optimize"),
        }
    }
}

/// Counters of a finished (or aborted) run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStatistics {
    /// Solutions delivered by the solver and accepted by the enumerator.
    pub solutions_observed: u64,
    /// Headline count after applying the counting convention.
    pub solution_count: u64,
    /// Reports handed to the sink.
    pub reports_emitted: u64,
    /// Solver conflicts.
    pub conflicts: u64,
    /// Solver branches.
    pub branches: u64,
    /// Wall-clock duration of the run.
    pub wall_time: Duration,
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "solutions: {}, conflicts: {}, branches: {}, wall time: {:.3}s",
            self.solution_count,
            self.conflicts,
            self.branches,
            self.wall_time.as_secs_f64()
        )
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Terminal state reached.
    pub state: RunState,
    /// Mode the run was executed in.
    pub mode: SolveMode,
    pub statistics: RunStatistics,
    /// Weekend load of the last observed solution (optimize mode only).
    pub objective: Option<i64>,
    /// Whether `objective` is proven minimal (or the model proven
    /// infeasible). Only meaningful in optimize mode.
    pub proven_optimal: bool,
    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

impl RunOutcome {
    /// Whether the run proved that no schedule exists.
    pub fn is_infeasible(&self) -> bool {
        self.statistics.solutions_observed == 0
            && matches!(self.state, RunState::ExhaustedProof | RunState::Completed)
    }
}

/// Consumer of solution reports.
///
/// Implemented for `Vec<SolutionReport>` (collects) and for closures.
pub trait ReportSink {
    fn on_report(&mut self, report: SolutionReport);
}

impl ReportSink for Vec<SolutionReport> {
    fn on_report(&mut self, report: SolutionReport) {
        self.push(report);
    }
}

impl<F> ReportSink for F
where
    F: FnMut(SolutionReport),
{
    fn on_report(&mut self, report: SolutionReport) {
        self(report)
    }
}
