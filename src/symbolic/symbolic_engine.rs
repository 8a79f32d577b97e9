//! # Symbolic Engine Module
//!
//! Symbolic expression tree used to describe the functions whose uncertainty is
//! propagated. Expressions are built either programmatically (operator
//! overloading, builder methods) or parsed from strings, then differentiated and
//! evaluated at a point (see `symbolic_engine_derivatives`).
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, etc. - mathematical functions
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - create multiple variables from comma-separated string
//! - `set_variable_from_map()` - substitute variables with values
//! - `all_arguments_are_variables()` - sorted list of free symbols
//! - `simplify_()` - constant folding and 0/1 identities
//!
//! Square roots have no variant of their own: `sqrt(x)` is `Pow(x, 0.5)`.
//! Trigonometric functions use mathematical notation (tg, ctg) instead of
//! programming conventions (tan, cot).

#![allow(non_camel_case_types)]

use std::collections::HashMap;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```
/// use properror::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// assert_eq!(expr.to_string(), "(x + 2)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y", "velocity")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent
    tg(Box<Expr>),
    /// Cotangent
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// Arctangent
    arctg(Box<Expr>),
    /// Arccotangent
    arcctg(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Expr::Sub(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::DivAssign for Expr {
    fn div_assign(&mut self, rhs: Self) {
        *self = Expr::Div(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// Whitespace is trimmed and empty names are skipped.
    ///
    /// # Examples
    /// ```
    /// use properror::symbolic::symbolic_engine::Expr;
    /// let vars = Expr::Symbols("a, b, c");
    /// assert_eq!(vars.len(), 3);
    /// ```
    #[allow(non_snake_case)]
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Square root, stored as self^0.5.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Checks if expression is exactly one (constant 1.0).
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    /// Rebuilds a unary function node around a new argument, keeping its kind.
    pub(crate) fn with_argument(&self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::ctg(_) => Expr::ctg(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            Expr::arcctg(_) => Expr::arcctg(arg),
            _ => self.clone(),
        }
    }

    /// Argument of a unary function node, `None` for leaves and binary nodes.
    pub(crate) fn argument(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(e)
            | Expr::Ln(e)
            | Expr::sin(e)
            | Expr::cos(e)
            | Expr::tg(e)
            | Expr::ctg(e)
            | Expr::arcsin(e)
            | Expr::arccos(e)
            | Expr::arctg(e)
            | Expr::arcctg(e) => Some(e),
            _ => None,
        }
    }

    /// Operands of a binary node, `None` otherwise.
    pub(crate) fn operands(&self) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => Some((l, r)),
            _ => None,
        }
    }

    /// Rebuilds a binary node of the same kind around new operands.
    fn with_operands(&self, lhs: Expr, rhs: Expr) -> Expr {
        let (lhs, rhs) = (lhs.boxed(), rhs.boxed());
        match self {
            Expr::Add(..) => Expr::Add(lhs, rhs),
            Expr::Sub(..) => Expr::Sub(lhs, rhs),
            Expr::Mul(..) => Expr::Mul(lhs, rhs),
            Expr::Div(..) => Expr::Div(lhs, rhs),
            Expr::Pow(..) => Expr::Pow(lhs, rhs),
            _ => self.clone(),
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            _ => self.map_children(&|child| child.set_variable(var, value)),
        }
    }

    /// Substitutes multiple variables with constant values using a HashMap.
    ///
    /// Only variables present in the map are substituted.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        match self {
            Expr::Var(name) => match var_map.get(name) {
                Some(value) => Expr::Const(*value),
                None => self.clone(),
            },
            Expr::Const(_) => self.clone(),
            _ => self.map_children(&|child| child.set_variable_from_map(var_map)),
        }
    }

    fn map_children(&self, f: &dyn Fn(&Expr) -> Expr) -> Expr {
        if let Some((lhs, rhs)) = self.operands() {
            self.with_operands(f(lhs), f(rhs))
        } else if let Some(arg) = self.argument() {
            self.with_argument(f(arg))
        } else {
            self.clone()
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            _ => {
                if let Some((lhs, rhs)) = self.operands() {
                    lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
                } else {
                    self.argument()
                        .is_some_and(|arg| arg.contains_variable(var_name))
                }
            }
        }
    }

    /// Extracts all unique variable names from the symbolic expression.
    ///
    /// Returns a sorted, deduplicated list of variable names.
    ///
    /// # Examples
    /// ```
    /// use properror::symbolic::symbolic_engine::Expr;
    /// let expr = Expr::parse_expression("x^2 + y*z + x").unwrap();
    /// assert_eq!(expr.all_arguments_are_variables(), vec!["x", "y", "z"]);
    /// ```
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Expr::Var(name) => vars.push(name.clone()),
            Expr::Const(_) => {}
            _ => {
                if let Some((lhs, rhs)) = self.operands() {
                    lhs.collect_variables(vars);
                    rhs.collect_variables(vars);
                } else if let Some(arg) = self.argument() {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Algebraic simplification: constant folding plus the additive and
    /// multiplicative identities.
    ///
    /// - `x + 0 = x`, `0 + x = x`, `x - 0 = x`, `0 - x = -1 * x`
    /// - `x * 1 = x`, `x * 0 = 0`, `0 / x = 0`, `x / 1 = x`
    /// - `x ^ 0 = 1`, `x ^ 1 = x`
    ///
    /// A constant subtree is folded only when the folded value is finite, so
    /// domain violations survive until evaluation and are reported there.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => fold(a + b, lhs + rhs),
                    _ if lhs.is_zero() => rhs,
                    _ if rhs.is_zero() => lhs,
                    _ => lhs + rhs,
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => fold(a - b, lhs - rhs),
                    _ if rhs.is_zero() => lhs,
                    _ if lhs.is_zero() => (-rhs).simplify_(),
                    _ => lhs - rhs,
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => fold(a * b, lhs * rhs),
                    _ if lhs.is_zero() || rhs.is_zero() => Expr::Const(0.0),
                    _ if lhs.is_one() => rhs,
                    _ if rhs.is_one() => lhs,
                    _ => lhs * rhs,
                }
            }
            Expr::Div(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => fold(a / b, lhs / rhs),
                    _ if lhs.is_zero() && !rhs.is_zero() => Expr::Const(0.0),
                    _ if rhs.is_one() => lhs,
                    _ => lhs / rhs,
                }
            }
            Expr::Pow(base, exp) => {
                let (base, exp) = (base.simplify_(), exp.simplify_());
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => fold(a.powf(*b), base.pow(exp)),
                    _ if exp.is_zero() => Expr::Const(1.0),
                    _ if exp.is_one() => base,
                    _ => base.pow(exp),
                }
            }
            _ => match self.argument().map(Expr::simplify_) {
                Some(Expr::Const(a)) => fold(apply_unary(self, a), self.with_argument(Expr::Const(a))),
                Some(arg) => self.with_argument(arg),
                None => self.clone(),
            },
        }
    }
}

fn fold(value: f64, unfolded: Expr) -> Expr {
    if value.is_finite() {
        Expr::Const(value)
    } else {
        unfolded
    }
}

/// Numeric value of a unary function node applied to `x`.
pub(crate) fn apply_unary(node: &Expr, x: f64) -> f64 {
    match node {
        Expr::Exp(_) => x.exp(),
        Expr::Ln(_) => x.ln(),
        Expr::sin(_) => x.sin(),
        Expr::cos(_) => x.cos(),
        Expr::tg(_) => x.tan(),
        Expr::ctg(_) => 1.0 / x.tan(),
        Expr::arcsin(_) => x.asin(),
        Expr::arccos(_) => x.acos(),
        Expr::arctg(_) => x.atan(),
        Expr::arcctg(_) => std::f64::consts::FRAC_PI_2 - x.atan(),
        _ => f64::NAN,
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        ($(
            $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
        ),+)
    };
}
