use std::fmt::{Display, Formatter};

use good_lp::{Expression, ProblemVariables, Variable, constraint, variable};
use itertools::Itertools;

use crate::market::Market;

/// The six per-timestep decision series.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    IsCharging,
    IsDischarging,
    ChargeRate(Market),
    DischargeRate(Market),
}

impl Decision {
    pub const ALL: [Self; 6] = [
        Self::IsCharging,
        Self::IsDischarging,
        Self::ChargeRate(Market::HalfHourly),
        Self::DischargeRate(Market::HalfHourly),
        Self::ChargeRate(Market::Hourly),
        Self::DischargeRate(Market::Hourly),
    ];

    const fn ordinal(self) -> usize {
        match self {
            Self::IsCharging => 0,
            Self::IsDischarging => 1,
            Self::ChargeRate(Market::HalfHourly) => 2,
            Self::DischargeRate(Market::HalfHourly) => 3,
            Self::ChargeRate(Market::Hourly) => 4,
            Self::DischargeRate(Market::Hourly) => 5,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsCharging => write!(f, "is charging"),
            Self::IsDischarging => write!(f, "is discharging"),
            Self::ChargeRate(market) => write!(f, "charge rate {}", market.minutes()),
            Self::DischargeRate(market) => write!(f, "discharge rate {}", market.minutes()),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VariableKind {
    Binary,
    Continuous,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    pub decision: Decision,
    pub step: usize,
    pub kind: VariableKind,
    pub lower: f64,
    pub upper: f64,
}

impl VariableDefinition {
    /// Unique name, for example `charge rate 30[4]`.
    pub fn name(&self) -> String {
        format!("{}[{}]", self.decision, self.step)
    }

    fn to_good_lp(self) -> good_lp::VariableDefinition {
        let definition = match self.kind {
            VariableKind::Binary => variable().binary(),
            VariableKind::Continuous => variable().min(self.lower).max(self.upper),
        };
        definition.name(self.name())
    }
}

/// Flat `decision × step` lookup of the declared variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecisionVariables {
    n_steps: usize,
    handles: Vec<Variable>,
}

impl DecisionVariables {
    pub const fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn get(&self, decision: Decision, step: usize) -> Variable {
        debug_assert!(step < self.n_steps);
        self.handles[decision.ordinal() * self.n_steps + step]
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Relation {
    LessOrEqual,
    Equal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ConstraintFamily {
    Exclusivity,
    MaxChargeRate,
    MaxDischargeRate,
    AvailableStoredEnergy,
    AvailableStorageCapacity,
    HourlyChargeCommitment,
    HourlyDischargeCommitment,
}

impl Display for ConstraintFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exclusivity => write!(f, "exclusivity"),
            Self::MaxChargeRate => write!(f, "max charge rate"),
            Self::MaxDischargeRate => write!(f, "max discharge rate"),
            Self::AvailableStoredEnergy => write!(f, "available stored energy"),
            Self::AvailableStorageCapacity => write!(f, "available storage capacity"),
            Self::HourlyChargeCommitment => write!(f, "hourly commitment (charge)"),
            Self::HourlyDischargeCommitment => write!(f, "hourly commitment (discharge)"),
        }
    }
}

/// Linear constraint `lhs (≤|=) rhs` at the given timestep.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub step: usize,
    pub lhs: Expression,
    pub relation: Relation,
    pub rhs: Expression,
}

impl Constraint {
    pub fn name(&self) -> String {
        format!("{}[{}]", self.family, self.step)
    }

    pub fn to_good_lp(&self) -> good_lp::Constraint {
        let (lhs, rhs) = (self.lhs.clone(), self.rhs.clone());
        match self.relation {
            Relation::LessOrEqual => constraint::leq(lhs, rhs),
            Relation::Equal => constraint::eq(lhs, rhs),
        }
        .set_name(self.name())
    }
}

/// Variables, constraints, and the objective to maximise.
///
/// It knows nothing about the solver backend.
#[derive(Clone, Default)]
#[must_use]
pub struct Problem {
    pub variables: ProblemVariables,

    /// What each of the [`Problem::variables`] stands for, in the declaration order.
    pub definitions: Vec<VariableDefinition>,

    pub constraints: Vec<Constraint>,
    pub objective: Expression,
}

impl Problem {
    /// Declare the decision series, all steps of one decision after another.
    pub fn declare(
        &mut self,
        n_steps: usize,
        definition: impl Fn(Decision, usize) -> VariableDefinition,
    ) -> DecisionVariables {
        debug_assert!(self.definitions.is_empty(), "variables must be declared once");
        let mut handles = Vec::with_capacity(Decision::ALL.len() * n_steps);
        for decision in Decision::ALL {
            for step in 0..n_steps {
                let declared = definition(decision, step);
                handles.push(self.variables.add(declared.to_good_lp()));
                self.definitions.push(declared);
            }
        }
        DecisionVariables { n_steps, handles }
    }

    pub fn add_constraint(
        &mut self,
        family: ConstraintFamily,
        step: usize,
        lhs: impl Into<Expression>,
        relation: Relation,
        rhs: impl Into<Expression>,
    ) {
        self.constraints.push(Constraint {
            family,
            step,
            lhs: lhs.into(),
            relation,
            rhs: rhs.into(),
        });
    }

    #[cfg(test)]
    pub fn constraints_of(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |constraint| constraint.family == family)
    }

    /// Number of constraints per family, in the family order.
    pub fn statistics(&self) -> Vec<(ConstraintFamily, usize)> {
        self.constraints
            .iter()
            .map(|constraint| constraint.family)
            .counts()
            .into_iter()
            .sorted()
            .collect()
    }

    pub fn n_binary(&self) -> usize {
        self.definitions.iter().filter(|definition| definition.kind == VariableKind::Binary).count()
    }
}

#[cfg(test)]
pub mod tests {
    use approx::assert_abs_diff_eq;
    use good_lp::IntoAffineExpression;

    use super::*;

    /// Coefficient of the variable in the expression, zero when absent.
    pub fn coefficient(expression: &Expression, variable: Variable) -> f64 {
        expression
            .linear_coefficients()
            .filter(|(term, _)| *term == variable)
            .map(|(_, coefficient)| coefficient)
            .sum()
    }

    /// Continuous variables within `[0, upper]`.
    pub fn declared(n_steps: usize, upper: f64) -> (Problem, DecisionVariables) {
        let mut problem = Problem::default();
        let variables = problem.declare(n_steps, |decision, step| VariableDefinition {
            decision,
            step,
            kind: VariableKind::Continuous,
            lower: 0.0,
            upper,
        });
        (problem, variables)
    }

    #[test]
    fn test_decision_names() {
        assert_eq!(Decision::IsCharging.to_string(), "is charging");
        assert_eq!(Decision::ChargeRate(Market::HalfHourly).to_string(), "charge rate 30");
        assert_eq!(Decision::DischargeRate(Market::Hourly).to_string(), "discharge rate 60");
    }

    #[test]
    fn test_declare_lays_out_decisions_consecutively() {
        let (problem, variables) = declared(3, 1.0);
        assert_eq!(problem.variables.len(), 18);
        assert_eq!(problem.definitions.len(), 18);
        let handles: Vec<Variable> =
            problem.variables.iter_variables_with_def().map(|(handle, _)| handle).collect();
        for decision in Decision::ALL {
            for step in 0..3 {
                let variable = variables.get(decision, step);
                let position = handles.iter().position(|handle| *handle == variable).unwrap();
                assert_eq!(problem.definitions[position].decision, decision);
                assert_eq!(problem.definitions[position].step, step);
            }
        }
        assert_eq!(problem.definitions[4].name(), "is discharging[1]");
    }

    #[test]
    fn test_declared_bounds() {
        let (problem, _) = declared(1, 2.5);
        for (_, definition) in problem.variables.iter_variables_with_def() {
            assert_abs_diff_eq!(definition.get_min(), 0.0);
            assert_abs_diff_eq!(definition.get_max(), 2.5);
            assert!(!definition.is_integer());
        }
    }
}
