//! A small owned linear program over bounded variables and equality rows.

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

/// What to optimize when solving a [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Only check that a solution exists.
    Feasibility,
    /// Minimize one variable.
    Minimize(usize),
    /// Maximize one variable.
    Maximize(usize),
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveStatus {
    /// A solution was found; carries the objective value.
    Optimal(f64),
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can grow without limit.
    Unbounded,
}

impl SolveStatus {
    /// Returns true if a solution exists.
    pub fn is_feasible(&self) -> bool {
        !matches!(self, SolveStatus::Infeasible)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    terms: Vec<(usize, f64)>,
    rhs: f64,
}

/// Bounded variables plus an ordered list of equality constraints.
///
/// Constraints are addressed by position. Removing one shifts every later
/// constraint down by one, so temporary constraints must be removed in
/// reverse order of insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearModel {
    bounds: Vec<(f64, f64)>,
    constraints: Vec<Constraint>,
}

impl LinearModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable with inclusive bounds, returning its index.
    pub fn add_variable(&mut self, min: f64, max: f64) -> usize {
        self.bounds.push((min, max));
        self.bounds.len() - 1
    }

    /// Replaces the bounds of a variable.
    pub fn set_bounds(&mut self, var: usize, min: f64, max: f64) {
        self.bounds[var] = (min, max);
    }

    /// Returns the bounds of a variable.
    pub fn bounds(&self, var: usize) -> (f64, f64) {
        self.bounds[var]
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.bounds.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Adds `Σ coeff · var = rhs`, returning its position.
    pub fn add_constraint(&mut self, terms: &[(usize, f64)], rhs: f64) -> usize {
        self.constraints.push(Constraint {
            terms: terms.to_vec(),
            rhs,
        });
        self.constraints.len() - 1
    }

    /// Removes the constraint at `index`. Returns false if there is none.
    pub fn del_constraint(&mut self, index: usize) -> bool {
        if index >= self.constraints.len() {
            return false;
        }
        self.constraints.remove(index);
        true
    }

    /// Solves the model.
    pub fn solve(&self, objective: Objective) -> SolveStatus {
        let (direction, target) = match objective {
            Objective::Feasibility => (OptimizationDirection::Minimize, None),
            Objective::Minimize(var) => (OptimizationDirection::Minimize, Some(var)),
            Objective::Maximize(var) => (OptimizationDirection::Maximize, Some(var)),
        };

        let mut problem = Problem::new(direction);
        let vars: Vec<_> = self
            .bounds
            .iter()
            .enumerate()
            .map(|(index, &bounds)| {
                let coeff = if Some(index) == target { 1.0 } else { 0.0 };
                problem.add_var(coeff, bounds)
            })
            .collect();

        for constraint in &self.constraints {
            let mut expr = LinearExpr::empty();
            for &(var, coeff) in &constraint.terms {
                expr.add(vars[var], coeff);
            }
            problem.add_constraint(expr, ComparisonOp::Eq, constraint.rhs);
        }

        let status = match problem.solve() {
            Ok(solution) => SolveStatus::Optimal(solution.objective()),
            Err(minilp::Error::Infeasible) => SolveStatus::Infeasible,
            Err(minilp::Error::Unbounded) => SolveStatus::Unbounded,
        };
        tracing::trace!(
            ?objective,
            ?status,
            variables = self.bounds.len(),
            constraints = self.constraints.len(),
            "solved linear model"
        );
        status
    }
}
