use std::{
    fmt::{Display, Formatter},
    ops::Index,
};

use chrono::{NaiveDateTime, TimeDelta};
use itertools::Itertools;

use crate::{error::InputShapeError, quantity::rate::MegawattHourRate};

#[derive(Debug, clap::ValueEnum, enumset::EnumSetType)]
pub enum Market {
    /// Fine-grained market settled every half an hour.
    HalfHourly,

    /// Coarse-grained market settled every full hour.
    ///
    /// A commitment holds for both half-hour sub-periods of the hour.
    Hourly,
}

impl Market {
    /// Settlement period length in minutes, as used in the column names.
    pub const fn minutes(self) -> u32 {
        match self {
            Self::HalfHourly => 30,
            Self::Hourly => 60,
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HalfHourly => write!(f, "half-hourly"),
            Self::Hourly => write!(f, "hourly"),
        }
    }
}

/// One value per market.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PerMarket<T> {
    pub half_hourly: T,
    pub hourly: T,
}

impl<T> Index<Market> for PerMarket<T> {
    type Output = T;

    fn index(&self, market: Market) -> &Self::Output {
        match market {
            Market::HalfHourly => &self.half_hourly,
            Market::Hourly => &self.hourly,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarketPoint {
    pub time: NaiveDateTime,

    /// The hourly price is already duplicated onto both half-hours of its hour.
    pub prices: PerMarket<MegawattHourRate>,
}

/// Aligned price series of both markets over a common, evenly spaced time index.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct MarketData {
    points: Vec<MarketPoint>,
}

impl MarketData {
    /// Validate the time index: non-empty, of even length, strictly increasing and evenly spaced.
    pub fn try_new(points: Vec<MarketPoint>) -> Result<Self, InputShapeError> {
        if points.is_empty() {
            return Err(InputShapeError::Empty);
        }
        if points.len() % 2 != 0 {
            return Err(InputShapeError::OddLength(points.len()));
        }
        let expected = points[1].time - points[0].time;
        for (left, right) in points.iter().tuple_windows() {
            let actual = right.time - left.time;
            if actual != expected || actual <= TimeDelta::zero() {
                return Err(InputShapeError::UnevenStep { at: right.time, expected, actual });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[MarketPoint] {
        &self.points
    }

    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Distance between two consecutive timestamps.
    pub fn step(&self) -> TimeDelta {
        self.points[1].time - self.points[0].time
    }

    pub fn start(&self) -> NaiveDateTime {
        self.points[0].time
    }

    pub fn end(&self) -> NaiveDateTime {
        self.points[self.points.len() - 1].time
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    /// Build half-hourly market data starting at midnight.
    pub fn half_hourly(half_hourly: &[f64], hourly: &[f64]) -> MarketData {
        spaced(TimeDelta::minutes(30), half_hourly, hourly)
    }

    pub fn spaced(step: TimeDelta, half_hourly: &[f64], hourly: &[f64]) -> MarketData {
        let points = half_hourly
            .iter()
            .zip(hourly)
            .enumerate()
            .map(|(index, (half_hourly, hourly))| MarketPoint {
                time: at(0, 0) + step * i32::try_from(index).unwrap(),
                prices: PerMarket {
                    half_hourly: MegawattHourRate::from(*half_hourly),
                    hourly: MegawattHourRate::from(*hourly),
                },
            })
            .collect();
        MarketData::try_new(points).unwrap()
    }

    fn point(time: NaiveDateTime) -> MarketPoint {
        MarketPoint { time, prices: PerMarket::default() }
    }

    #[test]
    fn test_valid_index() {
        let market_data = half_hourly(&[1.0, 2.0, 3.0, 4.0], &[5.0, 5.0, 6.0, 6.0]);
        assert_eq!(market_data.len(), 4);
        assert_eq!(market_data.step(), TimeDelta::minutes(30));
        assert_eq!(market_data.start(), at(0, 0));
        assert_eq!(market_data.end(), at(1, 30));
        assert_eq!(market_data.points()[2].prices[Market::Hourly], MegawattHourRate::from(6.0));
    }

    #[test]
    fn test_empty() {
        assert_eq!(MarketData::try_new(vec![]), Err(InputShapeError::Empty));
    }

    #[test]
    fn test_odd_length() {
        let points = vec![point(at(0, 0)), point(at(0, 30)), point(at(1, 0))];
        assert_eq!(MarketData::try_new(points), Err(InputShapeError::OddLength(3)));
    }

    #[test]
    fn test_uneven_step() {
        let points =
            vec![point(at(0, 0)), point(at(0, 30)), point(at(1, 30)), point(at(2, 0))];
        assert_eq!(
            MarketData::try_new(points),
            Err(InputShapeError::UnevenStep {
                at: at(1, 30),
                expected: TimeDelta::minutes(30),
                actual: TimeDelta::hours(1),
            }),
        );
    }

    #[test]
    fn test_non_increasing() {
        let points = vec![point(at(1, 0)), point(at(0, 30))];
        assert!(matches!(
            MarketData::try_new(points),
            Err(InputShapeError::UnevenStep { .. })
        ));
    }
}
