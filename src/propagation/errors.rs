use std::fmt;

/// Error types for uncertainty propagation
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationError {
    /// An input array has a shape inconsistent with the order N of the problem
    DimensionMismatch {
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// The matrix A has no (finite) inverse
    SingularMatrix(String),
    /// An expression references a symbol missing from the evaluation point
    UndefinedVariable(String),
    /// Numeric evaluation produced a non-finite value
    Evaluation(String),
    /// A string could not be parsed into an expression
    InvalidExpression(String),
    /// A covariance input violates the expected symmetry (opt-in check)
    AsymmetricCovariance {
        what: String,
        index: Vec<usize>,
        difference: f64,
    },
}

impl PropagationError {
    pub(crate) fn dimension_mismatch(what: &str, expected: &[usize], found: &[usize]) -> Self {
        PropagationError::DimensionMismatch {
            what: what.to_string(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropagationError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch for {}: expected shape {:?}, found {:?}",
                what, expected, found
            ),
            PropagationError::SingularMatrix(msg) => write!(f, "Singular matrix: {}", msg),
            PropagationError::UndefinedVariable(name) => {
                write!(f, "Variable '{}' has no value at the evaluation point", name)
            }
            PropagationError::Evaluation(msg) => write!(f, "Evaluation failed: {}", msg),
            PropagationError::InvalidExpression(msg) => write!(f, "Invalid expression: {}", msg),
            PropagationError::AsymmetricCovariance {
                what,
                index,
                difference,
            } => write!(
                f,
                "Covariance {} is not symmetric at {:?} (difference {:e})",
                what, index, difference
            ),
        }
    }
}

impl std::error::Error for PropagationError {}
