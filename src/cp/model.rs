//! CP model definition.

use super::variables::{BoolVar, VarId};

/// A constraint over boolean variables.
///
/// Booleans are read as 0/1 integers in linear rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `min <= sum(coef * var) <= max`.
    Linear {
        /// `(variable, coefficient)` pairs.
        terms: Vec<(VarId, i64)>,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// `antecedent => consequent`.
    Implication {
        antecedent: VarId,
        consequent: VarId,
    },

    /// Forces a variable to a constant.
    Fixed { var: VarId, value: bool },
}

impl Constraint {
    /// Whether the constraint holds under a complete assignment.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        match self {
            Constraint::Linear { terms, min, max } => {
                let sum: i64 = terms
                    .iter()
                    .filter(|&&(var, _)| value_of(values, var))
                    .map(|&(_, coef)| coef)
                    .sum();
                *min <= sum && sum <= *max
            }
            Constraint::Implication {
                antecedent,
                consequent,
            } => !value_of(values, *antecedent) || value_of(values, *consequent),
            Constraint::Fixed { var, value } => value_of(values, *var) == *value,
        }
    }

    /// Variables the constraint mentions.
    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Constraint::Linear { terms, .. } => terms.iter().map(|&(v, _)| v).collect(),
            Constraint::Implication {
                antecedent,
                consequent,
            } => vec![*antecedent, *consequent],
            Constraint::Fixed { var, .. } => vec![*var],
        }
    }
}

/// Linear objective to minimize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Objective {
    /// `(variable, coefficient)` pairs.
    pub terms: Vec<(VarId, i64)>,
}

impl Objective {
    /// Objective value under a complete assignment.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|&&(var, _)| value_of(values, var))
            .map(|&(_, coef)| coef)
            .sum()
    }
}

/// Variables past the end of `values` read as `false`.
#[inline]
fn value_of(values: &[bool], var: VarId) -> bool {
    values.get(var.0).copied().unwrap_or(false)
}

/// A constraint programming model over boolean variables.
///
/// Contains variables, constraints, and an optional objective function.
/// Without an objective the model is a pure satisfaction problem.
///
/// # Examples
///
/// ```
/// use u_rotation::cp::CpModel;
///
/// let mut model = CpModel::new("example");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_linear(vec![(a, 1), (b, 1)], 1, 1);
/// model.add_implication(a, b);
/// assert!(model.validate().is_ok());
/// assert!(model.is_satisfied(&[false, true]));
/// assert!(!model.is_satisfied(&[true, false]));
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Boolean variables, indexed by [`VarId`].
    pub bool_vars: Vec<BoolVar>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bool_vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Declares a boolean variable and returns its handle.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.bool_vars.len());
        self.bool_vars.push(BoolVar::new(name));
        id
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add a linear constraint `min <= sum <= max`.
    pub fn add_linear(&mut self, terms: Vec<(VarId, i64)>, min: i64, max: i64) {
        self.constraints.push(Constraint::Linear { terms, min, max });
    }

    /// Convenience: add `antecedent => consequent`.
    pub fn add_implication(&mut self, antecedent: VarId, consequent: VarId) {
        self.constraints.push(Constraint::Implication {
            antecedent,
            consequent,
        });
    }

    /// Convenience: force `var` to `value`.
    pub fn add_fixed(&mut self, var: VarId, value: bool) {
        self.constraints.push(Constraint::Fixed { var, value });
    }

    /// Sets a linear minimization objective.
    pub fn minimize(&mut self, terms: Vec<(VarId, i64)>) {
        self.objective = Some(Objective { terms });
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists and that linear bounds
    /// are ordered.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.bool_vars.len();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some(var) = constraint.vars().into_iter().find(|v| v.0 >= n) {
                return Err(format!("constraint {i}: undefined variable {var}"));
            }
            if let Constraint::Linear { min, max, .. } = constraint {
                if min > max {
                    return Err(format!("constraint {i}: empty range [{min}, {max}]"));
                }
            }
        }
        if let Some(objective) = &self.objective {
            if let Some(&(var, _)) = objective.terms.iter().find(|(v, _)| v.0 >= n) {
                return Err(format!("objective: undefined variable {var}"));
            }
        }
        Ok(())
    }

    /// Whether a complete assignment satisfies every constraint.
    ///
    /// An assignment shorter than the variable list is never satisfying.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        values.len() >= self.bool_vars.len()
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Returns the number of variables.
    pub fn var_count(&self) -> usize {
        self.bool_vars.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
