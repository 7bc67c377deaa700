//! Numeric evaluation with a given number of significant digits.
//!
//! Exact numbers and the constants `pi` and `E` become floats, functions of floats are
//! evaluated, symbols stay symbolic: `N(pi*x, 5)` is `3.1416*x`. Integer exponents are
//! kept exact.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::{DEFAULT_DIGITS, Number};
use std::f64::consts::{E, PI};

impl Expr {
    pub fn evalf(&self, digits: u32) -> Expr {
        match self {
            Expr::Const(n) => Expr::Const(Number::float(n.to_f64(), digits)),
            Expr::Pi => Expr::float(PI, digits),
            Expr::E => Expr::float(E, digits),
            Expr::Var(_) | Expr::ComplexInfinity | Expr::NaN => self.clone(),
            Expr::Pow(base, exp) if exp.as_integer().is_some() => {
                Expr::power(base.evalf(digits), *exp.clone())
            }
            _ => self.map_args(&mut |child| child.evalf(digits)),
        }
    }

    /// Value as f64 when the expression has no free symbols and evaluates to a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self.evalf(DEFAULT_DIGITS) {
            Expr::Const(n) => Some(n.to_f64()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evalf_pi() {
        assert_eq!(Expr::Pi.evalf(10).to_string(), "3.141592654");
        assert_eq!(Expr::Pi.evalf(15).to_string(), "3.14159265358979");
    }

    #[test]
    fn test_evalf_keeps_symbols() {
        let x = Expr::var("x");
        let expr = Expr::Pi * x.clone();
        assert_eq!(expr.evalf(5).to_string(), "3.1416*x");
        let expr = x.clone().pow(Expr::num(2)) + Expr::rational(1, 3);
        assert_eq!(expr.evalf(3).to_string(), "x**2 + 0.333");
    }

    #[test]
    fn test_evalf_functions() {
        let expr = Expr::num(2).sqrt();
        assert_relative_eq!(expr.as_f64().unwrap(), 2f64.sqrt(), epsilon = 1e-12);
        let expr = Expr::new_exp(Expr::one()) + Expr::new_ln(Expr::num(2));
        assert_relative_eq!(expr.as_f64().unwrap(), E + 2f64.ln(), epsilon = 1e-12);
        let expr = Expr::new_sin(Expr::num(1));
        assert_relative_eq!(expr.as_f64().unwrap(), 1f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_as_f64_with_symbols() {
        assert!(Expr::var("x").as_f64().is_none());
        assert_eq!(Expr::rational(-5, 2).as_f64(), Some(-2.5));
    }
}
