use bon::Builder;
use chrono::TimeDelta;
use good_lp::Expression;

use crate::{
    core::problem::{Decision, DecisionVariables},
    market::Market,
    quantity::energy::MegawattHours,
};

/// Battery flows within a single timestep, summed over the markets.
pub struct StepFlow {
    pub charge: Expression,
    pub discharge: Expression,
}

/// Derives the energy held in the battery at the start of each timestep.
///
/// The charging loss is applied here because the lost energy never enters the storage.
/// The discharging loss only affects the revenue and is accounted for in the objective.
#[derive(Builder)]
pub struct StoredEnergyAccountant {
    initial_stored_energy: MegawattHours,
    timestep: TimeDelta,
    charge_efficiency: f64,
}

impl StoredEnergyAccountant {
    /// Run the lagged recurrence:
    ///
    /// ```text
    /// stored(0) = initial
    /// stored(t + 1) = stored(t) + duration × (charge(t) × efficiency − discharge(t))
    /// ```
    ///
    /// Element `t` depends only on the flows strictly before `t`.
    pub fn stored_energy(&self, flows: impl IntoIterator<Item = StepFlow>) -> Vec<Expression> {
        let hours = self.timestep.as_seconds_f64() / 3600.0;
        flows
            .into_iter()
            .scan(Expression::from(self.initial_stored_energy.0), |stored, flow| {
                let before = stored.clone();
                *stored += (flow.charge * self.charge_efficiency - flow.discharge) * hours;
                Some(before)
            })
            .collect()
    }

    /// Build the stored energy expressions over the declared rate variables of both markets.
    pub fn over(&self, variables: &DecisionVariables) -> Vec<Expression> {
        let flows = (0..variables.n_steps()).map(|step| {
            let rate = |decision| Expression::from(variables.get(decision, step));
            StepFlow {
                charge: rate(Decision::ChargeRate(Market::HalfHourly))
                    + rate(Decision::ChargeRate(Market::Hourly)),
                discharge: rate(Decision::DischargeRate(Market::HalfHourly))
                    + rate(Decision::DischargeRate(Market::Hourly)),
            }
        });
        self.stored_energy(flows)
    }
}
