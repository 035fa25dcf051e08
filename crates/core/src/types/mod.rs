//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Kilograms of CO2 kept out of the atmosphere
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Co2Kg(pub f64);

impl Co2Kg {
    pub const ZERO: Co2Kg = Co2Kg(0.0);

    pub fn new(kg: f64) -> Self {
        Co2Kg(kg)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Scale by a factor and round to 2 decimal places (display precision)
    pub fn scaled(&self, factor: f64) -> Self {
        Co2Kg((self.0 * factor * 100.0).round() / 100.0)
    }
}

impl Add for Co2Kg {
    type Output = Co2Kg;

    fn add(self, rhs: Co2Kg) -> Co2Kg {
        Co2Kg(self.0 + rhs.0)
    }
}

impl AddAssign for Co2Kg {
    fn add_assign(&mut self, rhs: Co2Kg) {
        self.0 += rhs.0;
    }
}

/// Fraction in `[0, 1]`, e.g. progress towards the next level
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Fraction(f64);

impl Fraction {
    /// Clamp any value into `[0, 1]`; NaN becomes 0
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Fraction(0.0)
        } else {
            Fraction(value.clamp(0.0, 1.0))
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co2_scaled_rounds_to_cents() {
        assert_eq!(Co2Kg(10.126).scaled(1.0), Co2Kg(10.13));
        assert_eq!(Co2Kg(27.0).scaled(0.1), Co2Kg(2.7));
    }

    #[test]
    fn test_fraction_clamps() {
        assert_eq!(Fraction::clamped(1.7).as_f64(), 1.0);
        assert_eq!(Fraction::clamped(-0.2).as_f64(), 0.0);
        assert_eq!(Fraction::clamped(f64::NAN).as_f64(), 0.0);
        assert_eq!(Fraction::clamped(0.5).as_f64(), 0.5);
    }
}
