use chrono::{NaiveDateTime, TimeDelta};

use crate::{battery::BatteryConfig, core::solution::Step, quantity::cost::Cost};

/// Financial outcome of one run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[must_use]
pub struct FinancialSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub export_revenue: Cost,
    pub import_cost: Cost,
    pub capex: Cost,

    /// Fixed operational cost prorated over the run.
    pub opex: Cost,
}

impl FinancialSummary {
    /// Sum up the steps and prorate the yearly operational cost over the span
    /// between the first and the last timestep.
    pub fn over(
        start: NaiveDateTime,
        end: NaiveDateTime,
        steps: &[Step],
        config: &BatteryConfig,
    ) -> Self {
        let year_fraction = (end - start).as_seconds_f64() / TimeDelta::days(365).as_seconds_f64();
        Self {
            start,
            end,
            export_revenue: steps.iter().map(|step| step.export_revenue).sum(),
            import_cost: steps.iter().map(|step| step.import_cost).sum(),
            capex: config.capex,
            opex: config.fixed_operational_cost * year_fraction,
        }
    }

    pub fn total_profit(&self) -> Cost {
        self.export_revenue - (self.import_cost + self.opex + self.capex)
    }

    /// Trading profit alone, without the capital and operational expenses.
    pub fn trading_profit(&self) -> Cost {
        self.export_revenue - self.import_cost
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{battery::tests::realistic, market::tests::at};

    #[test]
    fn test_opex_is_prorated() {
        let config = realistic();
        let summary = FinancialSummary::over(at(0, 0), at(0, 0) + TimeDelta::days(73), &[], &config);
        assert_abs_diff_eq!(summary.opex.0, 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.capex.0, 500_000.0);
        assert_abs_diff_eq!(summary.total_profit().0, -501_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_timestamp_has_no_opex() {
        let summary = FinancialSummary::over(at(0, 0), at(0, 0), &[], &realistic());
        assert_abs_diff_eq!(summary.opex.0, 0.0);
    }
}
