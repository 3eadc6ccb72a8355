//! Battery configuration and market price files.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Read,
    path::Path,
};

use chrono::{NaiveDateTime, TimeDelta};
use csv::{ReaderBuilder, Trim};

use crate::{
    battery::BatteryConfig,
    error::InputShapeError,
    market::{Market, MarketData, MarketPoint, PerMarket},
    prelude::*,
    quantity::rate::MegawattHourRate,
};

const TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
const VALUES_COLUMN: &str = "Values";

/// Load the battery configuration, TOML or CSV depending on the file extension.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_battery_config(path: &Path) -> Result<BatteryConfig> {
    let result = if path.extension().is_some_and(|extension| extension == "toml") {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        read_battery_config_toml(&text)
    } else {
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        read_battery_config_csv(file)
    };
    let config = result
        .with_context(|| format!("invalid battery configuration in `{}`", path.display()))?;
    info!(n_parameters = config.parameters().len(), "loaded");
    Ok(config)
}

/// Read the parameter name from the first column, and its value from the `Values` column.
pub fn read_battery_config_csv(reader: impl Read) -> Result<BatteryConfig> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let values_index = reader
        .headers()?
        .iter()
        .position(|header| header == VALUES_COLUMN)
        .with_context(|| format!("no `{VALUES_COLUMN}` column"))?;
    ensure!(values_index != 0, "the first column must hold the parameter names");
    let mut parameters = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(0).context("missing parameter name")?;
        let value = record
            .get(values_index)
            .with_context(|| format!("missing value of `{name}`"))?
            .parse::<f64>()
            .with_context(|| format!("invalid value of `{name}`"))?;
        parameters.push((name.to_string(), value));
    }
    Ok(BatteryConfig::try_from_parameters(parameters)?)
}

/// Read a flat `"Parameter name" = value` table.
#[allow(clippy::cast_precision_loss)]
pub fn read_battery_config_toml(text: &str) -> Result<BatteryConfig> {
    let table: toml::Table = toml::from_str(text)?;
    let parameters = table
        .into_iter()
        .map(|(name, value)| {
            let value = value
                .as_float()
                .or_else(|| value.as_integer().map(|value| value as f64))
                .with_context(|| format!("`{name}` is not a number"))?;
            Ok((name, value))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BatteryConfig::try_from_parameters(parameters)?)
}

#[instrument(skip_all, fields(half_hourly = %half_hourly.display(), hourly = %hourly.display()))]
pub fn load_market_data(
    half_hourly: &Path,
    hourly: &Path,
    n_rows: Option<usize>,
) -> Result<MarketData> {
    let open = |path: &Path| {
        File::open(path).with_context(|| format!("failed to open `{}`", path.display()))
    };
    let market_data = read_market_data(open(half_hourly)?, open(hourly)?, n_rows)?;
    info!(
        n_rows = market_data.len(),
        start = %market_data.start(),
        end = %market_data.end(),
        "loaded",
    );
    Ok(market_data)
}

/// Join the hourly prices onto the half-hourly time index.
///
/// Each hourly price also covers the second half of its hour.
/// If `n_rows` is given, only the first `n_rows` half-hours are kept.
pub fn read_market_data(
    half_hourly: impl Read,
    hourly: impl Read,
    n_rows: Option<usize>,
) -> Result<MarketData> {
    if let Some(n_rows) = n_rows
        && n_rows % 2 != 0
    {
        bail!(InputShapeError::OddRowLimit(n_rows));
    }

    let hourly: BTreeMap<NaiveDateTime, MegawattHourRate> = read_prices(hourly)
        .context("failed to read the hourly prices")?
        .into_iter()
        .flat_map(|(time, price)| [(time, price), (time + TimeDelta::minutes(30), price)])
        .collect();

    let mut half_hourly =
        read_prices(half_hourly).context("failed to read the half-hourly prices")?;
    half_hourly.sort_by_key(|(time, _)| *time);
    if let Some(n_rows) = n_rows {
        half_hourly.truncate(n_rows);
    }

    let points = half_hourly
        .into_iter()
        .map(|(time, half_hourly)| {
            let hourly = *hourly
                .get(&time)
                .ok_or(InputShapeError::MissingPrice { market: Market::Hourly, at: time })?;
            Ok(MarketPoint { time, prices: PerMarket { half_hourly, hourly } })
        })
        .collect::<Result<Vec<_>, InputShapeError>>()?;
    Ok(MarketData::try_new(points)?)
}

/// Read the `dd/mm/YYYY HH:MM, price` rows following the single header row.
fn read_prices(reader: impl Read) -> Result<Vec<(NaiveDateTime, MegawattHourRate)>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    reader
        .records()
        .map(|record| {
            let record = record?;
            let (Some(time), Some(price)) = (record.get(0), record.get(1)) else {
                bail!("expected two columns, got {}", record.len());
            };
            let time = NaiveDateTime::parse_from_str(time, TIME_FORMAT)
                .with_context(|| format!("invalid timestamp `{time}`"))?;
            let price =
                price.parse::<f64>().with_context(|| format!("invalid price `{price}`"))?;
            Ok((time, MegawattHourRate::from(price)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{error::ConfigurationError, market::tests::at};

    const BATTERY_CONFIG: &str = "\
,Values
Max charging rate,1.0
Max discharging rate,2.0
Max storage volume,3.0
Battery charging loss,0.04
Battery discharging loss,0.05
Lifetime (1),6.0
Lifetime (2),7000
Storage volume degradation rate,0.008
Capex,900000.0
Fixed Operational Costs,10000.0
";

    const HALF_HOURLY: &str = "\
Datetime, Price (£/MWh)
01/01/2018 00:00, 48.47
01/01/2018 00:30, 49.81
01/01/2018 01:00, 53.65
01/01/2018 01:30, 52.48
01/01/2018 02:00, 47.25
01/01/2018 02:30, 47.18
";

    const HOURLY: &str = "\
Datetime, Price (£/MWh)
01/01/2018 00:00, 51.89
01/01/2018 01:00, 55.49
01/01/2018 02:00, 51.06
";

    #[test]
    fn test_read_battery_config_csv() {
        let config = read_battery_config_csv(BATTERY_CONFIG.as_bytes()).unwrap();
        assert_abs_diff_eq!(config.max_charging_rate.0, 1.0);
        assert_abs_diff_eq!(config.max_discharging_rate.0, 2.0);
        assert_abs_diff_eq!(config.max_storage_volume.0, 3.0);
        assert_abs_diff_eq!(config.charging_loss, 0.04);
        assert_abs_diff_eq!(config.discharging_loss, 0.05);
        assert_abs_diff_eq!(config.capex.0, 900_000.0);
        assert_abs_diff_eq!(config.fixed_operational_cost.0, 10_000.0);
        let names: Vec<&str> = config.parameters().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names[5..8], ["Lifetime (1)", "Lifetime (2)", "Storage volume degradation rate"]);
    }

    #[test]
    fn test_read_battery_config_toml() {
        let text = r#"
            "Max charging rate" = 2
            "Max discharging rate" = 2.0
            "Max storage volume" = 10
            "Battery charging loss" = 0.05
            "Battery discharging loss" = 0.05
            "Capex" = 500000
            "Fixed Operational Costs" = 5000
            "Lifetime (1)" = 6
        "#;
        let config = read_battery_config_toml(text).unwrap();
        assert_abs_diff_eq!(config.max_storage_volume.0, 10.0);
        assert_eq!(config.parameters().len(), 8);
        assert_eq!(config.parameters()[7], ("Lifetime (1)".to_string(), 6.0));
    }

    #[test]
    fn test_missing_parameter() {
        let text = BATTERY_CONFIG.replace("Capex,900000.0\n", "");
        let error = read_battery_config_csv(text.as_bytes()).unwrap_err();
        assert_eq!(
            error.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::MissingParameter("Capex")),
        );
    }

    #[test]
    fn test_missing_values_column() {
        assert!(read_battery_config_csv(",Value\nCapex,1.0\n".as_bytes()).is_err());
    }

    #[test]
    fn test_read_market_data() {
        let market_data =
            read_market_data(HALF_HOURLY.as_bytes(), HOURLY.as_bytes(), None).unwrap();
        assert_eq!(market_data.len(), 6);
        assert_eq!(market_data.start(), at(0, 0));
        assert_eq!(market_data.end(), at(2, 30));
        let hourly: Vec<f64> =
            market_data.points().iter().map(|point| point.prices.hourly.0).collect();
        assert_eq!(hourly, [51.89, 51.89, 55.49, 55.49, 51.06, 51.06]);
        let half_hourly: Vec<f64> =
            market_data.points().iter().map(|point| point.prices.half_hourly.0).collect();
        assert_eq!(half_hourly, [48.47, 49.81, 53.65, 52.48, 47.25, 47.18]);
    }

    #[test]
    fn test_row_limit() {
        let market_data =
            read_market_data(HALF_HOURLY.as_bytes(), HOURLY.as_bytes(), Some(4)).unwrap();
        assert_eq!(market_data.len(), 4);
        assert_eq!(market_data.end(), at(1, 30));
    }

    #[test]
    fn test_odd_row_limit() {
        let error = read_market_data(HALF_HOURLY.as_bytes(), HOURLY.as_bytes(), Some(3))
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<InputShapeError>(),
            Some(&InputShapeError::OddRowLimit(3)),
        );
    }

    #[test]
    fn test_missing_hourly_price() {
        let hourly = HOURLY.replace("01/01/2018 02:00, 51.06\n", "");
        let error =
            read_market_data(HALF_HOURLY.as_bytes(), hourly.as_bytes(), None).unwrap_err();
        assert_eq!(
            error.downcast_ref::<InputShapeError>(),
            Some(&InputShapeError::MissingPrice { market: Market::Hourly, at: at(2, 0) }),
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let half_hourly = "Datetime, Price\n2018-01-01 00:00, 1.0\n";
        assert!(read_market_data(half_hourly.as_bytes(), HOURLY.as_bytes(), None).is_err());
    }
}
