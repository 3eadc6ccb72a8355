use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    battery::BatteryConfig,
    core::{
        problem::{Problem, VariableKind},
        solution::{Solution, Step, summary::FinancialSummary},
    },
    market::{Market, PerMarket},
    quantity::{Quantity, cost::Cost, power::Megawatts, rate::MegawattHourRate},
};

/// Rates this close to the configured maximum are highlighted.
const AT_BOUND_TOLERANCE: f64 = 1e-6;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

#[must_use]
pub fn build_steps_table(solution: &Solution, config: &BatteryConfig) -> Table {
    let median_prices = PerMarket {
        half_hourly: median(solution.steps.iter().map(|step| step.prices.half_hourly)),
        hourly: median(solution.steps.iter().map(|step| step.prices.hourly)),
    };

    let mut table = new_table();
    table.set_header(vec![
        "Time",
        "30 min",
        "60 min",
        "Mode",
        "Charge 30",
        "Discharge 30",
        "Charge 60",
        "Discharge 60",
        "Stored",
        "Revenue",
        "Cost",
    ]);
    for step in &solution.steps {
        let price_cell = |market: Market| {
            Cell::new(step.prices[market]).set_alignment(CellAlignment::Right).fg(
                if step.prices[market] >= median_prices[market] { Color::Red } else { Color::Green },
            )
        };
        let rate_cell = |rate: Megawatts, max_rate: Megawatts, color: Color| {
            let cell = Cell::new(rate).set_alignment(CellAlignment::Right);
            if rate.0 <= AT_BOUND_TOLERANCE {
                cell.add_attribute(Attribute::Dim)
            } else if rate.0 >= max_rate.0 - AT_BOUND_TOLERANCE {
                cell.fg(color).add_attribute(Attribute::Bold)
            } else {
                cell.fg(color)
            }
        };
        let row = [Market::HalfHourly, Market::Hourly].into_iter().flat_map(|market| {
            [
                rate_cell(step.charge_rate[market], config.max_charging_rate, Color::Green),
                rate_cell(step.discharge_rate[market], config.max_discharging_rate, Color::Red),
            ]
        });
        table.add_row(
            [
                Cell::new(step.time.format("%Y-%m-%d %H:%M")),
                price_cell(Market::HalfHourly),
                price_cell(Market::Hourly),
                mode_cell(step),
            ]
            .into_iter()
            .chain(row)
            .chain([
                Cell::new(step.stored_energy).set_alignment(CellAlignment::Right),
                Cell::new(step.export_revenue).set_alignment(CellAlignment::Right),
                Cell::new(step.import_cost).set_alignment(CellAlignment::Right),
            ]),
        );
    }
    table
}

fn mode_cell(step: &Step) -> Cell {
    match (step.is_charging, step.is_discharging) {
        (true, _) => Cell::new("Charge").fg(Color::Green),
        (_, true) => Cell::new("Discharge").fg(Color::Red),
        _ => Cell::new("Idle").add_attribute(Attribute::Dim),
    }
}

#[must_use]
pub fn build_summary_table(summary: &FinancialSummary, objective_value: Cost) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "End", "Revenue", "Cost", "Capex", "Opex", "Objective", "Profit"]);
    let total_profit = summary.total_profit();
    table.add_row(vec![
        Cell::new(summary.start),
        Cell::new(summary.end),
        Cell::new(summary.export_revenue).set_alignment(CellAlignment::Right).fg(Color::Green),
        Cell::new(summary.import_cost).set_alignment(CellAlignment::Right).fg(Color::Red),
        Cell::new(summary.capex).set_alignment(CellAlignment::Right),
        Cell::new(summary.opex).set_alignment(CellAlignment::Right),
        Cell::new(objective_value).set_alignment(CellAlignment::Right),
        Cell::new(total_profit)
            .set_alignment(CellAlignment::Right)
            .fg(if total_profit >= Cost::ZERO { Color::Green } else { Color::Red })
            .add_attribute(Attribute::Bold),
    ]);
    table
}

#[must_use]
pub fn build_config_table(config: &BatteryConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Parameter", "Value"]);
    for (name, value) in config.parameters() {
        table.add_row(vec![Cell::new(name), Cell::new(value).set_alignment(CellAlignment::Right)]);
    }
    table
}

#[must_use]
pub fn build_statistics_table(problem: &Problem) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Item", "Count"]);
    let n_binary = problem.n_binary();
    let rows = [
        ("binary variables".to_string(), n_binary),
        (
            "continuous variables".to_string(),
            problem
                .definitions
                .iter()
                .filter(|definition| definition.kind == VariableKind::Continuous)
                .count(),
        ),
    ]
    .into_iter()
    .chain(
        problem
            .statistics()
            .into_iter()
            .map(|(family, count)| (format!("{family} constraints"), count)),
    );
    for (item, count) in rows {
        table.add_row(vec![Cell::new(item), Cell::new(count).set_alignment(CellAlignment::Right)]);
    }
    table
}

/// Median price, or zero for an empty series.
fn median(prices: impl Iterator<Item = MegawattHourRate>) -> MegawattHourRate {
    let prices = prices.map(|price| OrderedFloat(price.0)).sorted_unstable().collect_vec();
    let index = prices.len() / 2;
    match prices.len() {
        0 => MegawattHourRate::ZERO,
        n_prices if n_prices % 2 == 1 => Quantity(prices[index].0),
        _ => Quantity((prices[index - 1].0 + prices[index].0) / 2.0),
    }
}
