use std::path::PathBuf;

use clap::Parser;

use crate::{
    core::{model::ModelSettings, optimisation::Optimisation},
    loader::{load_battery_config, load_market_data},
    prelude::*,
};

#[derive(Parser)]
pub struct InputArgs {
    /// Battery configuration: CSV with a `Values` column, or a TOML table.
    #[clap(long = "battery-config", env = "BATTERY_CONFIG")]
    pub battery_config: PathBuf,

    /// Half-hourly market prices CSV.
    #[clap(long = "half-hourly-market", env = "HALF_HOURLY_MARKET")]
    pub half_hourly_market: PathBuf,

    /// Hourly market prices CSV.
    #[clap(long = "hourly-market", env = "HOURLY_MARKET")]
    pub hourly_market: PathBuf,

    /// Only use the first N half-hours (must be even).
    #[clap(long = "n-rows", env = "N_ROWS")]
    pub n_rows: Option<usize>,

    #[clap(flatten)]
    pub settings: ModelSettings,
}

impl InputArgs {
    /// Load the files and build the model.
    pub fn build(&self) -> Result<Optimisation> {
        let config = load_battery_config(&self.battery_config)?;
        let market_data =
            load_market_data(&self.half_hourly_market, &self.hourly_market, self.n_rows)?;
        Ok(Optimisation::try_new(config, market_data, &self.settings)?)
    }
}
