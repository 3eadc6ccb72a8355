//! Physical and financial parameters of a single battery asset.

use bon::bon;

use crate::{
    error::ConfigurationError,
    quantity::{cost::Cost, energy::MegawattHours, power::Megawatts},
};

pub const MAX_CHARGING_RATE: &str = "Max charging rate";
pub const MAX_DISCHARGING_RATE: &str = "Max discharging rate";
pub const MAX_STORAGE_VOLUME: &str = "Max storage volume";
pub const CHARGING_LOSS: &str = "Battery charging loss";
pub const DISCHARGING_LOSS: &str = "Battery discharging loss";
pub const CAPEX: &str = "Capex";
pub const FIXED_OPERATIONAL_COSTS: &str = "Fixed Operational Costs";

/// Immutable battery configuration.
///
/// Keeps the original parameter mapping (including the lifetime and degradation fields
/// which the model does not use) so that it could be exported unchanged.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct BatteryConfig {
    pub max_charging_rate: Megawatts,
    pub max_discharging_rate: Megawatts,
    pub max_storage_volume: MegawattHours,

    /// Fraction of the energy lost when charging, in `[0, 1)`.
    pub charging_loss: f64,

    /// Fraction of the energy lost when discharging, in `[0, 1)`.
    pub discharging_loss: f64,

    pub capex: Cost,

    /// Fixed operational cost per year.
    pub fixed_operational_cost: Cost,

    parameters: Vec<(String, f64)>,
}

#[bon]
impl BatteryConfig {
    #[builder]
    pub fn new(
        max_charging_rate: Megawatts,
        max_discharging_rate: Megawatts,
        max_storage_volume: MegawattHours,
        charging_loss: f64,
        discharging_loss: f64,
        #[builder(default)] capex: Cost,
        #[builder(default)] fixed_operational_cost: Cost,
    ) -> Result<Self, ConfigurationError> {
        Self::try_from_parameters(vec![
            (MAX_CHARGING_RATE.to_string(), max_charging_rate.0),
            (MAX_DISCHARGING_RATE.to_string(), max_discharging_rate.0),
            (MAX_STORAGE_VOLUME.to_string(), max_storage_volume.0),
            (CHARGING_LOSS.to_string(), charging_loss),
            (DISCHARGING_LOSS.to_string(), discharging_loss),
            (CAPEX.to_string(), capex.0),
            (FIXED_OPERATIONAL_COSTS.to_string(), fixed_operational_cost.0),
        ])
    }
}

impl BatteryConfig {
    /// Validate the named parameters, failing on the first missing or out-of-range one.
    pub fn try_from_parameters(parameters: Vec<(String, f64)>) -> Result<Self, ConfigurationError> {
        if let Some((name, value)) = parameters.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigurationError::NotFinite { name: name.clone(), value: *value });
        }
        let get = |name: &'static str| {
            parameters
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| *value)
                .ok_or(ConfigurationError::MissingParameter(name))
        };
        let non_negative = |name: &'static str| -> Result<f64, ConfigurationError> {
            let value = get(name)?;
            if value < 0.0 {
                return Err(ConfigurationError::Negative { name, value });
            }
            Ok(value)
        };
        let loss = |name: &'static str| -> Result<f64, ConfigurationError> {
            let value = get(name)?;
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigurationError::LossOutOfRange { name, value });
            }
            Ok(value)
        };
        Ok(Self {
            max_charging_rate: Megawatts::from(non_negative(MAX_CHARGING_RATE)?),
            max_discharging_rate: Megawatts::from(non_negative(MAX_DISCHARGING_RATE)?),
            max_storage_volume: MegawattHours::from(non_negative(MAX_STORAGE_VOLUME)?),
            charging_loss: loss(CHARGING_LOSS)?,
            discharging_loss: loss(DISCHARGING_LOSS)?,
            capex: Cost::from(non_negative(CAPEX)?),
            fixed_operational_cost: Cost::from(non_negative(FIXED_OPERATIONAL_COSTS)?),
            parameters,
        })
    }

    /// Fraction of the purchased energy which ends up in the storage.
    pub fn charge_efficiency(&self) -> f64 {
        1.0 - self.charging_loss
    }

    /// Fraction of the released energy which gets sold.
    pub fn discharge_efficiency(&self) -> f64 {
        1.0 - self.discharging_loss
    }

    /// All parameters in their original order.
    pub fn parameters(&self) -> &[(String, f64)] {
        &self.parameters
    }
}

#[cfg(test)]
pub mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    /// 2 MW, 10 MWh battery with 5% losses both ways.
    pub fn realistic() -> BatteryConfig {
        BatteryConfig::builder()
            .max_charging_rate(Megawatts::from(2.0))
            .max_discharging_rate(Megawatts::from(2.0))
            .max_storage_volume(MegawattHours::from(10.0))
            .charging_loss(0.05)
            .discharging_loss(0.05)
            .capex(Cost::from(500_000.0))
            .fixed_operational_cost(Cost::from(5_000.0))
            .build()
            .unwrap()
    }

    fn parameters() -> Vec<(String, f64)> {
        [
            (MAX_CHARGING_RATE, 1.0),
            (MAX_DISCHARGING_RATE, 2.0),
            (MAX_STORAGE_VOLUME, 3.0),
            (CHARGING_LOSS, 0.04),
            (DISCHARGING_LOSS, 0.05),
            ("Lifetime (1)", 6.0),
            ("Lifetime (2)", 7000.0),
            ("Storage volume degradation rate", 0.008),
            (CAPEX, 900_000.0),
            (FIXED_OPERATIONAL_COSTS, 10_000.0),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }

    #[test]
    fn test_from_parameters() {
        let config = BatteryConfig::try_from_parameters(parameters()).unwrap();
        assert_eq!(config.max_charging_rate, Megawatts::from(1.0));
        assert_eq!(config.max_discharging_rate, Megawatts::from(2.0));
        assert_eq!(config.max_storage_volume, MegawattHours::from(3.0));
        assert_abs_diff_eq!(config.charge_efficiency(), 0.96, epsilon = 1e-9);
        assert_abs_diff_eq!(config.discharge_efficiency(), 0.95, epsilon = 1e-9);
        assert_eq!(config.capex, Cost::from(900_000.0));
        assert_eq!(config.fixed_operational_cost, Cost::from(10_000.0));
        assert_eq!(config.parameters().len(), 10);
        assert_eq!(config.parameters()[5], ("Lifetime (1)".to_string(), 6.0));
    }

    #[test]
    fn test_missing_parameter() {
        let parameters =
            parameters().into_iter().filter(|(name, _)| name != MAX_STORAGE_VOLUME).collect();
        assert_eq!(
            BatteryConfig::try_from_parameters(parameters),
            Err(ConfigurationError::MissingParameter(MAX_STORAGE_VOLUME)),
        );
    }

    #[test]
    fn test_loss_out_of_range() {
        let mut parameters = parameters();
        parameters[3].1 = 1.0;
        assert_eq!(
            BatteryConfig::try_from_parameters(parameters),
            Err(ConfigurationError::LossOutOfRange { name: CHARGING_LOSS, value: 1.0 }),
        );
    }

    #[test]
    fn test_negative_rate() {
        let result = BatteryConfig::builder()
            .max_charging_rate(Megawatts::from(-1.0))
            .max_discharging_rate(Megawatts::from(1.0))
            .max_storage_volume(MegawattHours::from(1.0))
            .charging_loss(0.0)
            .discharging_loss(0.0)
            .build();
        assert_eq!(
            result,
            Err(ConfigurationError::Negative { name: MAX_CHARGING_RATE, value: -1.0 }),
        );
    }

    #[test]
    fn test_not_finite() {
        let mut parameters = parameters();
        parameters[0].1 = f64::NAN;
        assert!(matches!(
            BatteryConfig::try_from_parameters(parameters),
            Err(ConfigurationError::NotFinite { .. }),
        ));
    }
}
