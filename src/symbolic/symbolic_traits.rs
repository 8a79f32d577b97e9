// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// The propagators only need to differentiate an expression, evaluate it at a
// point and list its free symbols. The native engine implements this below;
// other engines plug in by implementing ExpressionEvaluator.

use crate::propagation::errors::PropagationError;
use crate::symbolic::symbolic_engine::Expr;
use std::collections::HashMap;

/// Symbolic differentiation and numeric evaluation capability.
pub trait ExpressionEvaluator {
    type Expression;

    /// Partial derivative of `expr` with respect to `symbol`.
    fn differentiate(&self, expr: &Self::Expression, symbol: &str) -> Self::Expression;

    /// Numeric value of `expr` at `bindings`.
    ///
    /// Fails with `UndefinedVariable` for an unbound symbol and with
    /// `Evaluation` when the value is not a finite real.
    fn evaluate(
        &self,
        expr: &Self::Expression,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, PropagationError>;

    /// Names of all symbols `expr` depends on.
    fn symbols(&self, expr: &Self::Expression) -> Vec<String>;
}

///////////////// IMPLEMENTATION OF THE TRAIT FOR THE NATIVE ENGINE /////////////////////////
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicEvaluator;

impl ExpressionEvaluator for SymbolicEvaluator {
    type Expression = Expr;

    fn differentiate(&self, expr: &Expr, symbol: &str) -> Expr {
        expr.diff(symbol)
    }

    fn evaluate(&self, expr: &Expr, bindings: &HashMap<String, f64>) -> Result<f64, PropagationError> {
        expr.eval_expression(bindings)
    }

    fn symbols(&self, expr: &Expr) -> Vec<String> {
        expr.all_arguments_are_variables()
    }
}
