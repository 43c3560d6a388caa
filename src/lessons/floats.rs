//! Binary floating point versus decimal arithmetic.
//!
//! `f64` cannot represent most decimal fractions exactly, so `8.2 - 3.8`
//! is not `4.4`. [`DecimalCalculator`] redoes the same arithmetic with
//! `rust_decimal`, converting each float through its shortest decimal form.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Digits kept after the point by [`DecimalCalculator::div`] by default.
pub const DEFAULT_DIVISION_PRECISION: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum FloatLessonError {
    /// NaN or an infinity has no decimal value
    NonFinite(f64),
    /// The float is too large for a 96-bit decimal
    OutOfRange(f64),
    DivisionByZero,
    Overflow,
}

impl fmt::Display for FloatLessonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatLessonError::NonFinite(v) => write!(f, "{v} has no decimal representation"),
            FloatLessonError::OutOfRange(v) => write!(f, "{v} is out of decimal range"),
            FloatLessonError::DivisionByZero => write!(f, "division by zero"),
            FloatLessonError::Overflow => write!(f, "decimal overflow"),
        }
    }
}

impl std::error::Error for FloatLessonError {}

/// Decimal arithmetic on float inputs with a configurable division precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalCalculator {
    division_precision: u32,
}

impl Default for DecimalCalculator {
    fn default() -> Self {
        Self {
            division_precision: DEFAULT_DIVISION_PRECISION,
        }
    }
}

impl DecimalCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_division_precision(division_precision: u32) -> Self {
        Self { division_precision }
    }

    pub fn division_precision(&self) -> u32 {
        self.division_precision
    }

    /// Convert through the shortest decimal that round-trips to `value`,
    /// so `1129.6` becomes exactly `1129.6`.
    pub fn from_float(value: f64) -> Result<Decimal, FloatLessonError> {
        if !value.is_finite() {
            return Err(FloatLessonError::NonFinite(value));
        }
        Decimal::from_str(&value.to_string()).map_err(|_| FloatLessonError::OutOfRange(value))
    }

    pub fn add(&self, a: f64, b: f64) -> Result<Decimal, FloatLessonError> {
        let sum = Self::from_float(a)?
            .checked_add(Self::from_float(b)?)
            .ok_or(FloatLessonError::Overflow)?;
        Ok(sum.normalize())
    }

    pub fn sub(&self, a: f64, b: f64) -> Result<Decimal, FloatLessonError> {
        let difference = Self::from_float(a)?
            .checked_sub(Self::from_float(b)?)
            .ok_or(FloatLessonError::Overflow)?;
        Ok(difference.normalize())
    }

    pub fn mul(&self, a: f64, b: f64) -> Result<Decimal, FloatLessonError> {
        let product = Self::from_float(a)?
            .checked_mul(Self::from_float(b)?)
            .ok_or(FloatLessonError::Overflow)?;
        Ok(product.normalize())
    }

    /// Divide, rounding half away from zero to the division precision.
    pub fn div(&self, a: f64, b: f64) -> Result<Decimal, FloatLessonError> {
        let divisor = Self::from_float(b)?;
        if divisor.is_zero() {
            return Err(FloatLessonError::DivisionByZero);
        }
        let quotient = Self::from_float(a)?
            .checked_div(divisor)
            .ok_or(FloatLessonError::Overflow)?;
        Ok(quotient
            .round_dp_with_strategy(
                self.division_precision,
                RoundingStrategy::MidpointAwayFromZero,
            )
            .normalize())
    }
}

/// Name of a value's type.
fn type_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Default and fixed-width formatting, and the inferred type of a literal.
pub fn formatting() -> Vec<String> {
    let f = 3.1415926;
    vec![
        format!("{f:.6}"),
        format!("{f:.2}"),
        format!("value: {f} -- type: {}", type_of(&f)),
    ]
}

/// The two classic precision surprises, computed in `f64`.
pub fn precision_loss() -> (f64, f64) {
    let d = 1129.6;
    let m1 = 8.2;
    let m2 = 3.8;
    (d * 100.0, m1 - m2)
}

/// The decimal arithmetic walkthrough, one `expression = result` per line.
pub fn decimal_remedy() -> Result<Vec<String>, FloatLessonError> {
    let calc = DecimalCalculator::new();
    let mut lines = vec![
        format!("1129.6 * 100 = {}", calc.mul(1129.6, 100.0)?),
        format!("8.2 - 3.8 = {}", calc.sub(8.2, 3.8)?),
        format!("2.1 + 3 = {}", calc.add(2.1, f64::from(3))?),
        format!("2.1 + 3.1 = {}", calc.add(2.1, 3.1)?),
        format!("2 + 3 = {}", calc.add(2.0, 3.0)?),
        format!("3.1 - 2 = {}", calc.sub(3.1, f64::from(2))?),
        format!("2.1 - 3.1 = {}", calc.sub(2.1, 3.1)?),
        format!("2 - 3 = {}", calc.sub(2.0, 3.0)?),
        format!("3.1 * 2 = {}", calc.mul(3.1, f64::from(2))?),
        format!("2.1 * 3.1 = {}", calc.mul(2.1, 3.1)?),
        format!("2 * 3 = {}", calc.mul(2.0, 3.0)?),
        format!("2 / 3 = {}", calc.div(2.0, 3.0)?),
        format!("2.1 / 3 = {}", calc.div(2.1, f64::from(3))?),
        format!("2.1 / 0.3 = {}", calc.div(2.1, 0.3)?),
    ];
    let three_places = DecimalCalculator::with_division_precision(3);
    lines.push(format!(
        "2 / 3 (precision 3) = {}",
        three_places.div(2.0, 3.0)?
    ));
    Ok(lines)
}

/// Floats written in scientific notation.
pub fn scientific() -> [f64; 3] {
    [5.1234e2, 5.1234e2, 5.1234e-2]
}

/// Every part of the lesson, in order.
pub fn run() -> Result<Vec<String>, FloatLessonError> {
    let mut lines = formatting();
    let (scaled, difference) = precision_loss();
    lines.push(format!("1129.6 * 100 = {scaled}"));
    lines.push(format!("8.2 - 3.8 = {difference}"));
    lines.extend(decimal_remedy()?);
    let [n1, n2, n3] = scientific();
    lines.push(format!("n1 = {n1} n2 = {n2} n3 = {n3}"));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_formatting() {
        let lines = formatting();
        assert_eq!(lines[0], "3.141593");
        assert_eq!(lines[1], "3.14");
        assert!(lines[2].ends_with("type: f64"));
    }

    #[test]
    fn test_binary_floats_lose_precision() {
        let (scaled, difference) = precision_loss();
        assert_ne!(scaled, 112960.0);
        assert_ne!(difference, 4.4);
    }

    #[test]
    fn test_decimal_arithmetic_is_exact() {
        let calc = DecimalCalculator::new();
        assert_eq!(calc.mul(1129.6, 100.0).unwrap(), dec("112960"));
        assert_eq!(calc.sub(8.2, 3.8).unwrap(), dec("4.4"));
        assert_eq!(calc.add(2.1, 3.0).unwrap(), dec("5.1"));
        assert_eq!(calc.sub(3.1, 2.0).unwrap(), dec("1.1"));
        assert_eq!(calc.mul(2.1, 3.1).unwrap(), dec("6.51"));
        assert_eq!(calc.div(2.1, 0.3).unwrap(), dec("7"));
        assert_eq!(calc.div(2.1, 3.0).unwrap(), dec("0.7"));
    }

    #[test]
    fn test_results_print_without_trailing_zeros() {
        let calc = DecimalCalculator::new();
        assert_eq!(calc.mul(1129.6, 100.0).unwrap().to_string(), "112960");
        assert_eq!(calc.sub(2.1, 3.1).unwrap().to_string(), "-1");
    }

    #[test]
    fn test_division_precision() {
        assert_eq!(DecimalCalculator::new().division_precision(), 16);
        assert_eq!(
            DecimalCalculator::new().div(2.0, 3.0).unwrap().to_string(),
            "0.6666666666666667"
        );
        assert_eq!(
            DecimalCalculator::with_division_precision(3)
                .div(2.0, 3.0)
                .unwrap()
                .to_string(),
            "0.667"
        );
    }

    #[test]
    fn test_rejects_non_finite_and_zero_divisor() {
        assert!(matches!(
            DecimalCalculator::from_float(f64::NAN),
            Err(FloatLessonError::NonFinite(_))
        ));
        assert_eq!(
            DecimalCalculator::from_float(f64::INFINITY),
            Err(FloatLessonError::NonFinite(f64::INFINITY))
        );
        assert_eq!(
            DecimalCalculator::from_float(1e300),
            Err(FloatLessonError::OutOfRange(1e300))
        );
        assert_eq!(
            DecimalCalculator::new().div(1.0, 0.0),
            Err(FloatLessonError::DivisionByZero)
        );
    }

    #[test]
    fn test_scientific_notation() {
        let [n1, n2, n3] = scientific();
        assert_eq!(n1, 512.34);
        assert_eq!(n2, n1);
        assert_eq!(n3, 0.051234);
    }

    #[test]
    fn test_run() {
        let lines = run().unwrap();
        assert!(lines.contains(&"8.2 - 3.8 = 4.4".to_string()));
        assert!(lines.contains(&"2 / 3 (precision 3) = 0.667".to_string()));
    }
}
