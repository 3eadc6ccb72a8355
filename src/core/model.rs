use chrono::{TimeDelta, Timelike};
use clap::Parser;
use enumset::EnumSet;
use good_lp::Expression;

use crate::{
    battery::BatteryConfig,
    core::{
        problem::{
            ConstraintFamily,
            Decision,
            DecisionVariables,
            Problem,
            Relation,
            VariableDefinition,
            VariableKind,
        },
        solver::SolverBackend,
        stored_energy::StoredEnergyAccountant,
    },
    error::{ConfigurationError, Error, InputShapeError},
    market::{Market, MarketData},
    prelude::*,
    quantity::energy::MegawattHours,
};

/// Model settings, common to all commands.
#[derive(Clone, Debug, Parser)]
#[must_use]
pub struct ModelSettings {
    /// Timestep duration in minutes. Only 30 is accepted: two timesteps make up one hourly
    /// settlement period.
    #[clap(long = "timestep-minutes", default_value = "30", env = "TIMESTEP_MINUTES")]
    pub timestep_minutes: u32,

    /// Energy stored in the battery before the first timestep.
    #[clap(
        long = "initial-stored-energy-mwh",
        default_value = "0",
        env = "INITIAL_STORED_ENERGY_MWH"
    )]
    pub initial_stored_energy: MegawattHours,

    #[clap(long = "solver", value_enum, default_value = "microlp", env = "SOLVER")]
    pub solver: SolverBackend,

    /// Markets to trade in.
    #[clap(
        long = "markets",
        env = "MARKETS",
        value_delimiter = ',',
        value_enum,
        num_args = 1..,
        default_value = "half-hourly,hourly",
    )]
    pub markets: Vec<Market>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            timestep_minutes: 30,
            initial_stored_energy: MegawattHours::ZERO,
            solver: SolverBackend::default(),
            markets: vec![Market::HalfHourly, Market::Hourly],
        }
    }
}

impl ModelSettings {
    const TIMESTEP: TimeDelta = TimeDelta::minutes(30);

    pub fn timestep(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.timestep_minutes))
    }

    pub fn enabled_markets(&self) -> EnumSet<Market> {
        self.markets.iter().copied().collect()
    }

    fn validate(&self, config: &BatteryConfig) -> Result<(), ConfigurationError> {
        if self.timestep() != Self::TIMESTEP {
            return Err(ConfigurationError::UnsupportedTimestep(self.timestep()));
        }
        if self.markets.is_empty() {
            return Err(ConfigurationError::NoMarketsEnabled);
        }
        if !self.initial_stored_energy.is_finite()
            || !self.initial_stored_energy.is_non_negative()
            || self.initial_stored_energy > config.max_storage_volume
        {
            return Err(ConfigurationError::InitialStoredEnergyOutOfRange {
                value: self.initial_stored_energy.0,
                max_storage_volume: config.max_storage_volume.0,
            });
        }
        Ok(())
    }
}

/// Complete optimisation problem for one battery over one time index.
#[must_use]
pub struct BatteryModel {
    pub problem: Problem,
    pub variables: DecisionVariables,

    /// Energy stored at the start of each timestep, derived from the prior flows.
    pub stored_energy: Vec<Expression>,
}

impl BatteryModel {
    /// Validate the inputs, then declare the variables, the constraints, and the objective.
    ///
    /// The hourly commitment pairs the timesteps `(0, 1)`, `(2, 3)`, and so on,
    /// hence the first timestep must start an hourly settlement period.
    #[instrument(skip_all, fields(n_steps = market_data.len()))]
    pub fn try_build(
        config: &BatteryConfig,
        market_data: &MarketData,
        settings: &ModelSettings,
    ) -> Result<Self, Error> {
        settings.validate(config)?;
        let timestep = settings.timestep();
        if market_data.step() != timestep {
            return Err(InputShapeError::StepMismatch {
                expected: timestep,
                actual: market_data.step(),
            }
            .into());
        }
        let settlement_period_seconds = 2 * timestep.num_seconds();
        if i64::from(market_data.start().num_seconds_from_midnight()) % settlement_period_seconds
            != 0
        {
            return Err(InputShapeError::MisalignedStart(market_data.start()).into());
        }

        let enabled_markets = settings.enabled_markets();
        let mut problem = Problem::default();
        let variables = problem.declare(market_data.len(), |decision, step| {
            let (kind, upper) = match decision {
                Decision::IsCharging | Decision::IsDischarging => (VariableKind::Binary, 1.0),
                Decision::ChargeRate(market) if enabled_markets.contains(market) => {
                    (VariableKind::Continuous, config.max_charging_rate.0)
                }
                Decision::DischargeRate(market) if enabled_markets.contains(market) => {
                    (VariableKind::Continuous, config.max_discharging_rate.0)
                }
                Decision::ChargeRate(_) | Decision::DischargeRate(_) => {
                    (VariableKind::Continuous, 0.0)
                }
            };
            VariableDefinition { decision, step, kind, lower: 0.0, upper }
        });

        let stored_energy = StoredEnergyAccountant::builder()
            .initial_stored_energy(settings.initial_stored_energy)
            .timestep(timestep)
            .charge_efficiency(config.charge_efficiency())
            .build()
            .over(&variables);

        let hours = timestep.as_seconds_f64() / 3600.0;
        for (step, stored_energy) in stored_energy.iter().enumerate() {
            let get = |decision| variables.get(decision, step);
            let charge = get(Decision::ChargeRate(Market::HalfHourly))
                + get(Decision::ChargeRate(Market::Hourly));
            let discharge = get(Decision::DischargeRate(Market::HalfHourly))
                + get(Decision::DischargeRate(Market::Hourly));

            problem.add_constraint(
                ConstraintFamily::Exclusivity,
                step,
                get(Decision::IsCharging) + get(Decision::IsDischarging),
                Relation::LessOrEqual,
                1.0,
            );
            problem.add_constraint(
                ConstraintFamily::MaxChargeRate,
                step,
                charge.clone(),
                Relation::LessOrEqual,
                get(Decision::IsCharging) * config.max_charging_rate.0,
            );
            problem.add_constraint(
                ConstraintFamily::MaxDischargeRate,
                step,
                discharge.clone(),
                Relation::LessOrEqual,
                get(Decision::IsDischarging) * config.max_discharging_rate.0,
            );
            problem.add_constraint(
                ConstraintFamily::AvailableStoredEnergy,
                step,
                discharge * hours,
                Relation::LessOrEqual,
                stored_energy.clone(),
            );
            problem.add_constraint(
                ConstraintFamily::AvailableStorageCapacity,
                step,
                charge * hours,
                Relation::LessOrEqual,
                Expression::from(config.max_storage_volume.0) - stored_energy.clone(),
            );
        }

        // An hourly commitment holds for both of its half-hours:
        for step in (0..market_data.len()).step_by(2) {
            for (family, decision) in [
                (ConstraintFamily::HourlyChargeCommitment, Decision::ChargeRate(Market::Hourly)),
                (
                    ConstraintFamily::HourlyDischargeCommitment,
                    Decision::DischargeRate(Market::Hourly),
                ),
            ] {
                problem.add_constraint(
                    family,
                    step,
                    variables.get(decision, step),
                    Relation::Equal,
                    variables.get(decision, step + 1),
                );
            }
        }

        problem.objective = Self::objective(config, market_data, &variables);

        info!(
            n_variables = problem.variables.len(),
            n_constraints = problem.constraints.len(),
            ?enabled_markets,
            "built",
        );
        Ok(Self { problem, variables, stored_energy })
    }

    /// Trading profit: discharging revenue is derated by the discharging loss,
    /// and the charging cost is inflated by the charging loss.
    fn objective(
        config: &BatteryConfig,
        market_data: &MarketData,
        variables: &DecisionVariables,
    ) -> Expression {
        let (charge_efficiency, discharge_efficiency) =
            (config.charge_efficiency(), config.discharge_efficiency());
        let mut objective = Expression::default();
        for (step, point) in market_data.points().iter().enumerate() {
            for market in [Market::HalfHourly, Market::Hourly] {
                let price = point.prices[market].0;
                objective += variables.get(Decision::DischargeRate(market), step)
                    * (price * discharge_efficiency)
                    - variables.get(Decision::ChargeRate(market), step)
                        * (price / charge_efficiency);
            }
        }
        objective
    }
}
