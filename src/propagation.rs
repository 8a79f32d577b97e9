/// error kinds shared by both propagators
pub mod errors;
///____________________________________________________________________________________________________________________________
/// # Uncertainty propagation through a first-order Jacobian
/// 1) differentiates every function with respect to every variable
/// 2) evaluates the Jacobian at the given point
/// 3) propagates the covariance of the variables: var = Jᵗ·V·J
///
///# Example
/// ```
/// use std::collections::HashMap;
/// use nalgebra::DMatrix;
/// use properror::propagation::jacobian_propagation::compute_jacobian;
/// use properror::symbolic::symbolic_engine::Expr;
/// let functions = Expr::parse_vector_expression(&["x * y"]).unwrap();
/// let point = HashMap::from([("x".to_string(), 2.0), ("y".to_string(), 5.0)]);
/// let jacobian = compute_jacobian(&functions, &["x", "y"], &point).unwrap();
/// assert_eq!(jacobian, DMatrix::from_column_slice(2, 1, &[5.0, 2.0]));
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod jacobian_propagation;
/// solution of A·x = d with uncertain A and d, first-order covariance of x
pub mod matrix_equation;
mod matrix_equation_tests;
/// options of the matrix equation solver
pub mod settings;
mod tensor_contraction;
/// (nominal, standard deviation) pairs
pub mod uncertain_value;
