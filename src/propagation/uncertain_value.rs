use nalgebra::{DMatrix, DVector};
use std::fmt;

/// A nominal value paired with its standard deviation.
///
/// The common output of both propagators: one instance per propagated quantity.
///
/// # Examples
/// ```
/// use properror::propagation::uncertain_value::UncertainValue;
/// let v = UncertainValue::new(10.0, 0.5);
/// assert_eq!(v.variance(), 0.25);
/// assert_eq!(v.to_string(), "10+/-0.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertainValue {
    nominal: f64,
    std_dev: f64,
}

impl UncertainValue {
    pub fn new(nominal: f64, std_dev: f64) -> Self {
        Self { nominal, std_dev }
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// std_dev / |nominal|; infinite for a zero nominal with nonzero spread.
    pub fn relative_uncertainty(&self) -> f64 {
        self.std_dev / self.nominal.abs()
    }

    /// Pairs each nominal value with the square root of the matching diagonal
    /// entry of `covariance`. Off-diagonal entries are ignored.
    pub fn from_diagonal(nominals: &DVector<f64>, covariance: &DMatrix<f64>) -> Vec<UncertainValue> {
        nominals
            .iter()
            .zip(covariance.diagonal().iter())
            .map(|(&nominal, &variance)| UncertainValue::new(nominal, variance.sqrt()))
            .collect()
    }
}

impl From<(f64, f64)> for UncertainValue {
    fn from((nominal, std_dev): (f64, f64)) -> Self {
        UncertainValue::new(nominal, std_dev)
    }
}

impl fmt::Display for UncertainValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}+/-{:.*}", p, self.nominal, p, self.std_dev),
            None => write!(f, "{}+/-{}", self.nominal, self.std_dev),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_diagonal_ignores_off_diagonal() {
        let nominals = DVector::from_vec(vec![1.0, -2.0]);
        let covariance = DMatrix::from_row_slice(2, 2, &[4.0, 100.0, 100.0, 9.0]);
        let values = UncertainValue::from_diagonal(&nominals, &covariance);
        assert_eq!(values, vec![UncertainValue::new(1.0, 2.0), UncertainValue::new(-2.0, 3.0)]);
        assert_relative_eq!(values[1].relative_uncertainty(), 1.5);
    }

    #[test]
    fn test_display_with_precision() {
        let v: UncertainValue = (1.23456, 0.01).into();
        assert_eq!(format!("{:.2}", v), "1.23+/-0.01");
    }
}
