//! # First-order propagation through differentiable functions
//!
//! Given functions f_1..f_m of variables v_1..v_n, a point and the covariance V
//! of the variables at that point, the variance of the outputs is
//!
//! ```text
//! var = Jᵗ·V·J,   J[v,f] = ∂f/∂v at the point   (J is numVariables × numFunctions)
//! ```
//!
//! `compute_uncertainties` reports the diagonal of `var` as one standard
//! deviation per function; `compute_covariance` exposes the whole matrix.
//!
//! All functions take an [`ExpressionEvaluator`]; the `*_with` forms accept any
//! implementation, the plain forms use the native [`SymbolicEvaluator`].
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use nalgebra::DMatrix;
//! use properror::propagation::jacobian_propagation::compute_uncertainties_from_str;
//!
//! let point = HashMap::from([
//!     ("a".to_string(), 100.0),
//!     ("b".to_string(), 200.0),
//!     ("c".to_string(), 250.0),
//!     ("d".to_string(), 500.0),
//! ]);
//! let values = compute_uncertainties_from_str(
//!     &["a + b + sqrt(c)"],
//!     &["a", "b", "c", "d"],
//!     &point,
//!     &DMatrix::identity(4, 4),
//! )
//! .unwrap();
//! assert!((values[0].nominal() - (300.0 + 250f64.sqrt())).abs() < 1e-12);
//! ```
use crate::propagation::errors::PropagationError;
use crate::propagation::uncertain_value::UncertainValue;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::{ExpressionEvaluator, SymbolicEvaluator};
use log::debug;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// Nominal values and the full joint covariance of a set of functions.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatedCovariance {
    pub nominal: DVector<f64>,
    /// numFunctions × numFunctions
    pub covariance: DMatrix<f64>,
}

impl PropagatedCovariance {
    /// Per-function (nominal, sqrt of diagonal) pairs.
    pub fn uncertainties(&self) -> Vec<UncertainValue> {
        UncertainValue::from_diagonal(&self.nominal, &self.covariance)
    }
}

/// Jacobian of `functions` with respect to `variables` at `point`.
///
/// The result is numVariables × numFunctions: entry [v, f] is ∂f/∂v.
pub fn compute_jacobian_with<E: ExpressionEvaluator>(
    evaluator: &E,
    functions: &[E::Expression],
    variables: &[&str],
    point: &HashMap<String, f64>,
) -> Result<DMatrix<f64>, PropagationError> {
    check_bindings(evaluator, functions, point)?;
    let mut jacobian = DMatrix::zeros(variables.len(), functions.len());
    for (j, function) in functions.iter().enumerate() {
        for (i, variable) in variables.iter().enumerate() {
            let partial = evaluator.differentiate(function, variable);
            jacobian[(i, j)] = evaluator.evaluate(&partial, point)?;
        }
    }
    debug!("jacobian {:?} evaluated", jacobian.shape());
    Ok(jacobian)
}

/// Nominal values and the joint covariance Jᵗ·V·J of `functions`.
pub fn compute_covariance_with<E: ExpressionEvaluator>(
    evaluator: &E,
    functions: &[E::Expression],
    variables: &[&str],
    point: &HashMap<String, f64>,
    covariance: &DMatrix<f64>,
) -> Result<PropagatedCovariance, PropagationError> {
    let n = variables.len();
    if covariance.shape() != (n, n) {
        return Err(PropagationError::dimension_mismatch(
            "covariance",
            &[n, n],
            &[covariance.nrows(), covariance.ncols()],
        ));
    }
    let nominal = functions
        .iter()
        .map(|f| evaluator.evaluate(f, point))
        .collect::<Result<Vec<f64>, _>>()?;
    let jacobian = compute_jacobian_with(evaluator, functions, variables, point)?;
    let variance_matrix = jacobian.transpose() * covariance * &jacobian;
    Ok(PropagatedCovariance {
        nominal: DVector::from_vec(nominal),
        covariance: variance_matrix,
    })
}

/// One `UncertainValue` per function, in input order.
///
/// The standard deviation is the square root of the diagonal of Jᵗ·V·J;
/// cross-function covariance is not reported (see [`compute_covariance_with`]).
/// The covariance is not checked for positive semi-definiteness, so a
/// malformed one can yield a NaN standard deviation.
pub fn compute_uncertainties_with<E: ExpressionEvaluator>(
    evaluator: &E,
    functions: &[E::Expression],
    variables: &[&str],
    point: &HashMap<String, f64>,
    covariance: &DMatrix<f64>,
) -> Result<Vec<UncertainValue>, PropagationError> {
    let propagated = compute_covariance_with(evaluator, functions, variables, point, covariance)?;
    Ok(propagated.uncertainties())
}

pub fn compute_jacobian(
    functions: &[Expr],
    variables: &[&str],
    point: &HashMap<String, f64>,
) -> Result<DMatrix<f64>, PropagationError> {
    compute_jacobian_with(&SymbolicEvaluator, functions, variables, point)
}

pub fn compute_covariance(
    functions: &[Expr],
    variables: &[&str],
    point: &HashMap<String, f64>,
    covariance: &DMatrix<f64>,
) -> Result<PropagatedCovariance, PropagationError> {
    compute_covariance_with(&SymbolicEvaluator, functions, variables, point, covariance)
}

pub fn compute_uncertainties(
    functions: &[Expr],
    variables: &[&str],
    point: &HashMap<String, f64>,
    covariance: &DMatrix<f64>,
) -> Result<Vec<UncertainValue>, PropagationError> {
    compute_uncertainties_with(&SymbolicEvaluator, functions, variables, point, covariance)
}

/// Parses `functions` and propagates as [`compute_uncertainties`].
pub fn compute_uncertainties_from_str(
    functions: &[&str],
    variables: &[&str],
    point: &HashMap<String, f64>,
    covariance: &DMatrix<f64>,
) -> Result<Vec<UncertainValue>, PropagationError> {
    let functions = Expr::parse_vector_expression(functions)?;
    compute_uncertainties(&functions, variables, point, covariance)
}

fn check_bindings<E: ExpressionEvaluator>(
    evaluator: &E,
    functions: &[E::Expression],
    point: &HashMap<String, f64>,
) -> Result<(), PropagationError> {
    for function in functions {
        if let Some(missing) = evaluator
            .symbols(function)
            .into_iter()
            .find(|symbol| !point.contains_key(symbol))
        {
            return Err(PropagationError::UndefinedVariable(missing));
        }
    }
    Ok(())
}
