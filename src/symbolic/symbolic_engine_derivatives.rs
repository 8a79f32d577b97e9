//! # Symbolic Engine Derivatives Module
//!
//! Differentiation, evaluation at a point and parsing for [`Expr`].
//!
//! ## Key Methods
//! - `diff(var: &str)` - analytical partial derivative, simplified
//! - `diff_multi_args(vars)` - gradient with respect to an ordered list of variables
//! - `eval_expression(bindings)` - numeric value at a point, checked for domain errors
//! - `parse_expression(input)` - string to symbolic expression

use crate::propagation::errors::PropagationError;
use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::{Expr, apply_unary};
use std::collections::HashMap;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard rules:
    /// - Power rule: d/dx(f^n) = n*f^(n-1)*f' when n does not depend on x
    /// - General power rule: d/dx(f^g) = f^g * (g'*ln(f) + g*f'/f)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule for every unary function
    ///
    /// The result is passed through [`Expr::simplify_`], so terms that do not
    /// depend on `var` vanish exactly.
    ///
    /// # Examples
    /// ```
    /// use properror::symbolic::symbolic_engine::Expr;
    /// let f = Expr::parse_expression("a + b + sqrt(c)").unwrap();
    /// assert_eq!(f.diff("a"), Expr::Const(1.0));
    /// assert_eq!(f.diff("d"), Expr::Const(0.0));
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        self.diff_raw(var).simplify_()
    }

    fn diff_raw(&self, var: &str) -> Expr {
        if !self.contains_variable(var) {
            return Expr::Const(0.0);
        }
        match self {
            Expr::Var(_) => Expr::Const(1.0),
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => lhs.diff_raw(var) + rhs.diff_raw(var),
            Expr::Sub(lhs, rhs) => lhs.diff_raw(var) - rhs.diff_raw(var),
            Expr::Mul(lhs, rhs) => {
                lhs.diff_raw(var) * *rhs.clone() + *lhs.clone() * rhs.diff_raw(var)
            }
            Expr::Div(lhs, rhs) => {
                (lhs.diff_raw(var) * *rhs.clone() - *lhs.clone() * rhs.diff_raw(var))
                    / (*rhs.clone()).pow(Expr::Const(2.0))
            }
            Expr::Pow(base, exp) => {
                if exp.contains_variable(var) {
                    self.clone()
                        * (exp.diff_raw(var) * (*base.clone()).ln()
                            + *exp.clone() * base.diff_raw(var) / *base.clone())
                } else {
                    *exp.clone()
                        * (*base.clone()).pow(*exp.clone() - Expr::Const(1.0))
                        * base.diff_raw(var)
                }
            }
            Expr::Exp(arg) => self.clone() * arg.diff_raw(var),
            Expr::Ln(arg) => arg.diff_raw(var) / *arg.clone(),
            Expr::sin(arg) => Expr::cos(arg.clone()) * arg.diff_raw(var),
            Expr::cos(arg) => -Expr::sin(arg.clone()) * arg.diff_raw(var),
            Expr::tg(arg) => {
                arg.diff_raw(var) / Expr::cos(arg.clone()).pow(Expr::Const(2.0))
            }
            Expr::ctg(arg) => {
                -arg.diff_raw(var) / Expr::sin(arg.clone()).pow(Expr::Const(2.0))
            }
            Expr::arcsin(arg) => {
                arg.diff_raw(var)
                    / (Expr::Const(1.0) - (*arg.clone()).pow(Expr::Const(2.0))).sqrt()
            }
            Expr::arccos(arg) => {
                -arg.diff_raw(var)
                    / (Expr::Const(1.0) - (*arg.clone()).pow(Expr::Const(2.0))).sqrt()
            }
            Expr::arctg(arg) => {
                arg.diff_raw(var) / (Expr::Const(1.0) + (*arg.clone()).pow(Expr::Const(2.0)))
            }
            Expr::arcctg(arg) => {
                -arg.diff_raw(var) / (Expr::Const(1.0) + (*arg.clone()).pow(Expr::Const(2.0)))
            }
        }
    } // end of diff

    /// Partial derivatives with respect to each of `all_vars`, in order.
    pub fn diff_multi_args(&self, all_vars: &[&str]) -> Vec<Expr> {
        all_vars.iter().map(|var| self.diff(var)).collect()
    }

    /// EVALUATION

    /// Evaluates the expression at the point given by `bindings`.
    ///
    /// Every intermediate value is checked: an unbound symbol yields
    /// [`PropagationError::UndefinedVariable`], a non-finite intermediate (square
    /// root of a negative operand, logarithm of a non-positive one, division by
    /// zero, overflow) yields [`PropagationError::Evaluation`].
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashMap;
    /// use properror::symbolic::symbolic_engine::Expr;
    /// let f = Expr::parse_expression("x*y + 1").unwrap();
    /// let point = HashMap::from([("x".to_string(), 2.0), ("y".to_string(), 3.0)]);
    /// assert_eq!(f.eval_expression(&point).unwrap(), 7.0);
    /// ```
    pub fn eval_expression(&self, bindings: &HashMap<String, f64>) -> Result<f64, PropagationError> {
        let value = match self {
            Expr::Var(name) => *bindings
                .get(name)
                .ok_or_else(|| PropagationError::UndefinedVariable(name.clone()))?,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(bindings)? + rhs.eval_expression(bindings)?,
            Expr::Sub(lhs, rhs) => lhs.eval_expression(bindings)? - rhs.eval_expression(bindings)?,
            Expr::Mul(lhs, rhs) => lhs.eval_expression(bindings)? * rhs.eval_expression(bindings)?,
            Expr::Div(lhs, rhs) => lhs.eval_expression(bindings)? / rhs.eval_expression(bindings)?,
            Expr::Pow(base, exp) => {
                let base = base.eval_expression(bindings)?;
                let exp = exp.eval_expression(bindings)?;
                base.powf(exp)
            }
            _ => match self.argument() {
                Some(arg) => apply_unary(self, arg.eval_expression(bindings)?),
                None => f64::NAN,
            },
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PropagationError::Evaluation(format!(
                "{} evaluates to {}",
                self, value
            )))
        }
    }

    /// PARSING

    /// Parses a string into a symbolic expression.
    ///
    /// # Supported Syntax
    /// - Variables: x, y, var_name
    /// - Constants: 3.14, 2.5, 1e-6
    /// - Operators: +, -, *, /, ^ (or **)
    /// - Functions: exp, ln, log, sqrt, sin, cos, tg/tan, ctg/cot, arcsin, arccos, arctg, arcctg
    /// - Parentheses for grouping
    pub fn parse_expression(input: &str) -> Result<Expr, PropagationError> {
        parse_expression_func(input).map_err(PropagationError::InvalidExpression)
    }

    /// Parses multiple expressions, failing on the first malformed one.
    pub fn parse_vector_expression(input: &[&str]) -> Result<Vec<Expr>, PropagationError> {
        input.iter().map(|s| Expr::parse_expression(s)).collect()
    }
}
