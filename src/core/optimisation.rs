use crate::{
    battery::BatteryConfig,
    core::{
        model::{BatteryModel, ModelSettings},
        solution::Solution,
        solver::{Assignment, Solve},
    },
    error::{Error, SolveError},
    market::MarketData,
    prelude::*,
};

enum Outcome {
    Pending,
    Solved(Assignment),
    Failed(SolveError),
}

/// One optimisation run: the inputs, the built model, and the solve outcome.
#[must_use]
pub struct Optimisation {
    config: BatteryConfig,
    market_data: MarketData,
    model: BatteryModel,
    outcome: Outcome,
}

impl Optimisation {
    pub fn try_new(
        config: BatteryConfig,
        market_data: MarketData,
        settings: &ModelSettings,
    ) -> Result<Self, Error> {
        let model = BatteryModel::try_build(&config, &market_data, settings)?;
        Ok(Self { config, market_data, model, outcome: Outcome::Pending })
    }

    pub const fn model(&self) -> &BatteryModel {
        &self.model
    }

    pub const fn config(&self) -> &BatteryConfig {
        &self.config
    }

    #[cfg(test)]
    pub const fn is_solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved(_))
    }

    /// Solve the model and remember the outcome.
    ///
    /// The failure is returned as is, and the run stays unsolved.
    pub fn solve(&mut self, solver: &impl Solve) -> Result<(), Error> {
        match solver.solve(&self.model.problem) {
            Ok(assignment) => {
                self.outcome = Outcome::Solved(assignment);
                Ok(())
            }
            Err(error) => {
                self.outcome = Outcome::Failed(error.clone());
                Err(error.into())
            }
        }
    }

    /// Extract the reporting table and the financial summary.
    pub fn solution(&self) -> Result<Solution, Error> {
        let Outcome::Solved(assignment) = &self.outcome else {
            if let Outcome::Failed(error) = &self.outcome {
                debug!(%error, "extraction requested after a failed solve");
            }
            return Err(Error::PrematureExtraction);
        };
        let solution = Solution::extract(&self.config, &self.market_data, &self.model, assignment);
        info!(
            objective_value = %solution.objective_value,
            total_profit = %solution.summary.total_profit(),
            "extracted",
        );
        Ok(solution)
    }
}
