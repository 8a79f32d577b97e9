#![allow(non_camel_case_types)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use properror::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("a + b + sqrt(c)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.all_arguments_are_variables(), vec!["a", "b", "c"]);
/// ```
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// 1) builds symbolic expressions programmatically or from strings
/// 2) differentiates them analytically
/// 3) evaluates them at a point given as a map of variable values
///
///# Example
/// ```
/// use std::collections::HashMap;
/// use properror::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^2 * ln(y)").unwrap();
/// let df_dx = f.diff("x");
/// let point = HashMap::from([("x".to_string(), 3.0), ("y".to_string(), 1.0)]);
/// assert_eq!(df_dx.eval_expression(&point).unwrap(), 0.0);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
/// the ExpressionEvaluator capability consumed by the propagators and its native implementation
pub mod symbolic_traits;
