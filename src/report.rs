//! Spreadsheet-friendly export of a solved run.

use std::{fs, io::Write, path::Path};

use csv::Writer;
use serde::Serialize;

use crate::{
    battery::BatteryConfig,
    core::solution::Solution,
    prelude::*,
    quantity::{cost::Cost, energy::MegawattHours, power::Megawatts, rate::MegawattHourRate},
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct ConfigurationRecord<'a> {
    #[serde(rename = "Parameter")]
    parameter: &'a str,

    #[serde(rename = "Value")]
    value: f64,
}

#[derive(Serialize)]
struct RunRecord {
    #[serde(rename = "Time")]
    time: String,

    #[serde(rename = "Price 30 min (£/MWh)")]
    half_hourly_price: MegawattHourRate,

    #[serde(rename = "Price 60 min (£/MWh)")]
    hourly_price: MegawattHourRate,

    #[serde(rename = "is charging")]
    is_charging: u8,

    #[serde(rename = "is discharging")]
    is_discharging: u8,

    #[serde(rename = "charge rate 30")]
    half_hourly_charge_rate: Megawatts,

    #[serde(rename = "discharge rate 30")]
    half_hourly_discharge_rate: Megawatts,

    #[serde(rename = "charge rate 60")]
    hourly_charge_rate: Megawatts,

    #[serde(rename = "discharge rate 60")]
    hourly_discharge_rate: Megawatts,

    #[serde(rename = "stored energy")]
    stored_energy: MegawattHours,

    #[serde(rename = "export revenue")]
    export_revenue: Cost,

    #[serde(rename = "import cost")]
    import_cost: Cost,
}

#[derive(Serialize)]
struct SummaryRecord {
    #[serde(rename = "Start")]
    start: String,

    #[serde(rename = "End")]
    end: String,

    #[serde(rename = "Export revenue (£)")]
    export_revenue: Cost,

    #[serde(rename = "Import cost (£)")]
    import_cost: Cost,

    #[serde(rename = "Capex (£)")]
    capex: Cost,

    #[serde(rename = "Opex (£)")]
    opex: Cost,

    #[serde(rename = "Total profit (£)")]
    total_profit: Cost,
}

/// The battery configuration, the per-timestep run data, and the financial summary.
#[must_use]
pub struct Report<'a> {
    pub config: &'a BatteryConfig,
    pub solution: &'a Solution,
}

impl Report<'_> {
    pub const CONFIGURATION_FILE_NAME: &'static str = "configuration.csv";
    pub const RUN_FILE_NAME: &'static str = "run.csv";
    pub const SUMMARY_FILE_NAME: &'static str = "summary.csv";

    /// Write the three sections as separate CSV files into the directory.
    #[instrument(skip_all, fields(directory = %directory.display()))]
    pub fn write_to(&self, directory: &Path) -> Result {
        fs::create_dir_all(directory)
            .with_context(|| format!("failed to create `{}`", directory.display()))?;
        let writer = |file_name: &str| {
            let path = directory.join(file_name);
            Writer::from_path(&path).with_context(|| format!("failed to create `{}`", path.display()))
        };
        self.write_configuration(&mut writer(Self::CONFIGURATION_FILE_NAME)?)?;
        self.write_run(&mut writer(Self::RUN_FILE_NAME)?)?;
        self.write_summary(&mut writer(Self::SUMMARY_FILE_NAME)?)?;
        info!("exported");
        Ok(())
    }

    pub fn write_configuration<W: Write>(&self, writer: &mut Writer<W>) -> Result {
        for (parameter, value) in self.config.parameters() {
            writer.serialize(ConfigurationRecord { parameter, value: *value })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_run<W: Write>(&self, writer: &mut Writer<W>) -> Result {
        for step in &self.solution.steps {
            writer.serialize(RunRecord {
                time: step.time.format(TIME_FORMAT).to_string(),
                half_hourly_price: step.prices.half_hourly,
                hourly_price: step.prices.hourly,
                is_charging: u8::from(step.is_charging),
                is_discharging: u8::from(step.is_discharging),
                half_hourly_charge_rate: step.charge_rate.half_hourly,
                half_hourly_discharge_rate: step.discharge_rate.half_hourly,
                hourly_charge_rate: step.charge_rate.hourly,
                hourly_discharge_rate: step.discharge_rate.hourly,
                stored_energy: step.stored_energy,
                export_revenue: step.export_revenue,
                import_cost: step.import_cost,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_summary<W: Write>(&self, writer: &mut Writer<W>) -> Result {
        let summary = &self.solution.summary;
        writer.serialize(SummaryRecord {
            start: summary.start.format(TIME_FORMAT).to_string(),
            end: summary.end.format(TIME_FORMAT).to_string(),
            export_revenue: summary.export_revenue,
            import_cost: summary.import_cost,
            capex: summary.capex,
            opex: summary.opex,
            total_profit: summary.total_profit(),
        })?;
        writer.flush()?;
        Ok(())
    }
}
