//! examples of usage of properror
/// matrix equation and Jacobian propagation examples
pub mod propagation_examples;
