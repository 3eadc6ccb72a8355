pub mod summary;

use chrono::{NaiveDateTime, TimeDelta};
use good_lp::Solution as _;

use crate::{
    battery::BatteryConfig,
    core::{
        model::BatteryModel,
        problem::Decision,
        solution::summary::FinancialSummary,
        solver::Assignment,
    },
    market::{Market, MarketData, PerMarket},
    quantity::{
        Quantity,
        cost::Cost,
        energy::MegawattHours,
        power::Megawatts,
        rate::MegawattHourRate,
    },
};

/// One row of the reporting table: market prices joined with the optimal decisions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    pub time: NaiveDateTime,
    pub prices: PerMarket<MegawattHourRate>,
    pub is_charging: bool,
    pub is_discharging: bool,
    pub charge_rate: PerMarket<Megawatts>,
    pub discharge_rate: PerMarket<Megawatts>,

    /// Energy held before this step's own flows.
    pub stored_energy: MegawattHours,

    pub export_revenue: Cost,
    pub import_cost: Cost,
}

#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Solution {
    pub steps: Vec<Step>,
    pub summary: FinancialSummary,

    /// Objective recomputed from the assignment.
    pub objective_value: Cost,
}

impl Solution {
    pub fn extract(
        config: &BatteryConfig,
        market_data: &MarketData,
        model: &BatteryModel,
        assignment: &Assignment,
    ) -> Self {
        let (charge_efficiency, discharge_efficiency) =
            (config.charge_efficiency(), config.discharge_efficiency());
        let value = |decision, step| assignment.value(model.variables.get(decision, step));

        let steps: Vec<Step> = market_data
            .points()
            .iter()
            .zip(&model.stored_energy)
            .enumerate()
            .map(|(step, (point, stored_energy))| {
                let charge_rate = PerMarket {
                    half_hourly: Quantity(value(Decision::ChargeRate(Market::HalfHourly), step)),
                    hourly: Quantity(value(Decision::ChargeRate(Market::Hourly), step)),
                };
                let discharge_rate = PerMarket {
                    half_hourly: Quantity(value(Decision::DischargeRate(Market::HalfHourly), step)),
                    hourly: Quantity(value(Decision::DischargeRate(Market::Hourly), step)),
                };
                let (export_revenue, import_cost) = [Market::HalfHourly, Market::Hourly]
                    .into_iter()
                    .map(|market| {
                        // Settled per hour of committed power, the same scale as the objective:
                        let price = point.prices[market];
                        (
                            price * (discharge_rate[market] * TimeDelta::hours(1))
                                * discharge_efficiency,
                            price * (charge_rate[market] * TimeDelta::hours(1))
                                / charge_efficiency,
                        )
                    })
                    .fold((Cost::ZERO, Cost::ZERO), |(revenue, cost), (step_revenue, step_cost)| {
                        (revenue + step_revenue, cost + step_cost)
                    });
                Step {
                    time: point.time,
                    prices: point.prices,
                    is_charging: value(Decision::IsCharging, step) > 0.5,
                    is_discharging: value(Decision::IsDischarging, step) > 0.5,
                    charge_rate,
                    discharge_rate,
                    stored_energy: Quantity(stored_energy.eval_with(assignment)),
                    export_revenue,
                    import_cost,
                }
            })
            .collect();

        let summary =
            FinancialSummary::over(market_data.start(), market_data.end(), &steps, config);
        Self {
            steps,
            summary,
            objective_value: Quantity(model.problem.objective.eval_with(assignment)),
        }
    }
}
