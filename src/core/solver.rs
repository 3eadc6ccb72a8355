use std::{collections::HashMap, time::Instant};

use good_lp::{ResolutionError, Solution, SolutionStatus, SolverModel, Variable};

use crate::{core::problem::Problem, error::SolveError, prelude::*};

/// Optimal value of every decision variable.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Assignment(HashMap<Variable, f64>);

impl From<HashMap<Variable, f64>> for Assignment {
    fn from(values: HashMap<Variable, f64>) -> Self {
        Self(values)
    }
}

impl Solution for Assignment {
    fn status(&self) -> SolutionStatus {
        SolutionStatus::Optimal
    }

    fn value(&self, variable: Variable) -> f64 {
        self.0[&variable]
    }
}

impl Assignment {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Anything that maximises a [`Problem`].
pub trait Solve {
    fn solve(&self, problem: &Problem) -> Result<Assignment, SolveError>;
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum SolverBackend {
    /// Pure-Rust simplex with branch-and-bound.
    #[default]
    #[value(name = "microlp")]
    MicroLp,

    #[cfg(feature = "highs")]
    #[value(name = "highs")]
    Highs,
}

impl Solve for SolverBackend {
    #[instrument(skip_all, fields(backend = ?self))]
    fn solve(&self, problem: &Problem) -> Result<Assignment, SolveError> {
        let start_instant = Instant::now();
        info!(
            n_variables = problem.variables.len(),
            n_binary = problem.n_binary(),
            n_constraints = problem.constraints.len(),
            "solving…",
        );
        let result = match self {
            Self::MicroLp => solve_using(problem, good_lp::microlp),
            #[cfg(feature = "highs")]
            Self::Highs => solve_using(problem, good_lp::highs),
        };
        match &result {
            Ok(_) => info!(elapsed = ?start_instant.elapsed(), "solved"),
            Err(error) => warn!(elapsed = ?start_instant.elapsed(), %error, "failed"),
        }
        result
    }
}

fn solve_using<S>(problem: &Problem, solver: S) -> Result<Assignment, SolveError>
where
    S: good_lp::Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let mut model = problem.variables.clone().maximise(problem.objective.clone()).using(solver);
    for constraint in &problem.constraints {
        trace!(constraint = %constraint.name(), "adding");
        model = model.with(constraint.to_good_lp());
    }

    let solution = model.solve().map_err(|error| match error {
        ResolutionError::Infeasible => SolveError::Infeasible,
        ResolutionError::Unbounded => SolveError::Unbounded,
        error => SolveError::Solver(error.to_string()),
    })?;
    Ok(Assignment(
        problem
            .variables
            .iter_variables_with_def()
            .map(|(variable, _)| (variable, solution.value(variable)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use good_lp::Expression;

    use super::*;
    use crate::{
        core::problem::{ConstraintFamily, Decision, Relation, tests::declared},
        market::Market,
    };

    /// A single step of continuous variables and nothing else going on.
    fn problem(upper: f64) -> (Problem, Variable, Variable) {
        let (problem, variables) = declared(1, upper);
        let charge = variables.get(Decision::ChargeRate(Market::HalfHourly), 0);
        let discharge = variables.get(Decision::DischargeRate(Market::HalfHourly), 0);
        (problem, charge, discharge)
    }

    #[test]
    fn test_optimum() {
        let (mut problem, charge, discharge) = problem(3.0);
        problem.objective = charge * 2.0 + discharge;
        problem.add_constraint(
            ConstraintFamily::Exclusivity,
            0,
            charge + discharge,
            Relation::LessOrEqual,
            4.0,
        );
        let assignment = SolverBackend::MicroLp.solve(&problem).unwrap();
        assert_eq!(assignment.len(), 6);
        assert_abs_diff_eq!(assignment.value(charge), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(assignment.value(discharge), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_infeasible() {
        let (mut problem, charge, _) = problem(1.0);
        problem.add_constraint(ConstraintFamily::Exclusivity, 0, charge, Relation::Equal, 2.0);
        assert_eq!(SolverBackend::MicroLp.solve(&problem), Err(SolveError::Infeasible));
    }

    #[test]
    fn test_unbounded() {
        let (mut problem, charge, _) = problem(f64::INFINITY);
        problem.objective = Expression::from(charge);
        assert_eq!(SolverBackend::MicroLp.solve(&problem), Err(SolveError::Unbounded));
    }
}
