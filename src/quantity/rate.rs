use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::Cost, energy::MegawattHours};

/// Pounds per megawatt-hour.
pub type MegawattHourRate = Quantity<-1, -1, 1>;

impl Display for MegawattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} £/MWh", self.0)
    }
}

impl Debug for MegawattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}£/MWh", self.0)
    }
}

impl Mul<MegawattHours> for MegawattHourRate {
    type Output = Cost;

    fn mul(self, rhs: MegawattHours) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}
