//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of canonical expressions.
//!
//! - `diff(var: &str)` - partial derivative with respect to one variable
//!
//! The rules are the usual ones (sum, product, power and chain rule). Derivatives of
//! undefined functions and of factorials stay unevaluated as `Derivative(f(x), x)`;
//! differentiating such a derivative again with respect to the same variable raises its
//! order, `Derivative(f(x), (x, 2))`. All results are built through the canonical
//! constructors, so `d(x**3 + 2*x)` is already `3*x**2 + 2`.

use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g*h) = f'*g*h + f*g'*h + f*g*h'
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    ///
    /// # Returns
    /// New canonical expression representing the derivative
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::var("x");
    /// let f = x.clone().pow(Expr::num(2)); // x**2
    /// let df_dx = f.diff("x"); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        if *self == Expr::NaN {
            return Expr::NaN;
        }
        if !self.contains_variable(var) {
            return Expr::zero();
        }
        match self {
            Expr::Var(_) => Expr::one(),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.diff(var)).collect()),
            Expr::Mul(factors) => {
                let mut terms = Vec::with_capacity(factors.len());
                for (i, factor) in factors.iter().enumerate() {
                    let d = factor.diff(var);
                    if d.is_zero() {
                        continue;
                    }
                    let mut product = factors.clone();
                    product[i] = d;
                    terms.push(Expr::product(product));
                }
                Expr::sum(terms)
            }
            Expr::Pow(base, exp) => {
                let base = *base.clone();
                let exp = *exp.clone();
                if !exp.contains_variable(var) {
                    // d/dx(u^n) = n*u^(n-1)*u'
                    let lowered = Expr::power(base.clone(), exp.clone() - Expr::one());
                    Expr::product(vec![exp, lowered, base.diff(var)])
                } else if !base.contains_variable(var) {
                    // d/dx(a^v) = a^v*ln(a)*v'
                    let d_exp = exp.diff(var);
                    Expr::product(vec![
                        Expr::power(base.clone(), exp),
                        Expr::new_ln(base),
                        d_exp,
                    ])
                } else {
                    // d/dx(u^v) = u^v*(v'*ln(u) + v*u'/u)
                    let d_base = base.diff(var);
                    let d_exp = exp.diff(var);
                    let inner = d_exp * Expr::new_ln(base.clone())
                        + exp.clone() * d_base / base.clone();
                    Expr::power(base, exp) * inner
                }
            }
            Expr::Exp(arg) => Expr::new_exp(*arg.clone()) * arg.diff(var),
            Expr::Ln(arg) => arg.diff(var) / *arg.clone(),
            Expr::sin(arg) => Expr::new_cos(*arg.clone()) * arg.diff(var),
            Expr::cos(arg) => -Expr::new_sin(*arg.clone()) * arg.diff(var),
            Expr::tg(arg) => {
                // d/dx(tan(u)) = (tan(u)^2 + 1)*u'
                let tan = Expr::new_tan(*arg.clone());
                (tan.pow(Expr::num(2)) + Expr::one()) * arg.diff(var)
            }
            Expr::Abs(arg) => *arg.clone() / self.clone() * arg.diff(var),
            Expr::Derivative(inner, v, order) if v == var => {
                Expr::Derivative(inner.clone(), v.clone(), order + 1)
            }
            Expr::Integral(inner, v) if v == var => *inner.clone(),
            Expr::Integral(inner, v) => Expr::Integral(inner.diff(var).boxed(), v.clone()),
            Expr::Func(..) | Expr::Factorial(_) | Expr::Derivative(..) => {
                Expr::Derivative(self.clone().boxed(), var.to_string(), 1)
            }
            Expr::Const(_) | Expr::Pi | Expr::E | Expr::ComplexInfinity | Expr::NaN => {
                Expr::zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn test_polynomial_derivative() {
        let f = x().pow(Expr::num(3)) + Expr::num(2) * x();
        let df = f.diff("x");
        assert_eq!(df, Expr::num(3) * x().pow(Expr::num(2)) + Expr::num(2));
        assert_eq!(df.to_string(), "3*x**2 + 2");
    }

    #[test]
    fn test_constant_derivative() {
        assert!(Expr::num(42).diff("x").is_zero());
        assert!(Expr::var("y").diff("x").is_zero());
        assert!(Expr::Pi.diff("x").is_zero());
    }

    #[test]
    fn test_product_rule() {
        let f = x() * Expr::new_sin(x());
        let df = f.diff("x");
        assert_eq!(df, x() * Expr::new_cos(x()) + Expr::new_sin(x()));
    }

    #[test]
    fn test_chain_rule() {
        let f = Expr::new_exp(Expr::num(-5) * x());
        assert_eq!(f.diff("x"), Expr::num(-5) * Expr::new_exp(Expr::num(-5) * x()));
        let g = Expr::new_ln(x());
        assert_eq!(g.diff("x"), Expr::one() / x());
    }

    #[test]
    fn test_trig_derivatives() {
        assert_eq!(Expr::new_cos(x()).diff("x"), -Expr::new_sin(x()));
        let tan = Expr::new_tan(x());
        assert_eq!(tan.diff("x").to_string(), "tan(x)**2 + 1");
    }

    #[test]
    fn test_exponential_with_variable_exponent() {
        let f = Expr::num(2).pow(x());
        assert_eq!(f.diff("x"), Expr::num(2).pow(x()) * Expr::new_ln(Expr::num(2)));
    }

    #[test]
    fn test_sqrt_derivative() {
        let f = x().sqrt();
        assert_eq!(f.diff("x").to_string(), "1/(2*sqrt(x))");
    }

    #[test]
    fn test_undefined_function_derivative() {
        let f = Expr::new_func("f", vec![x()]);
        let df = f.diff("x");
        assert_eq!(df.to_string(), "Derivative(f(x), x)");
        assert_eq!(df.diff("x").to_string(), "Derivative(f(x), (x, 2))");
    }

    #[test]
    fn test_derivative_of_integral() {
        let integral = Expr::Integral(Expr::new_func("g", vec![x()]).boxed(), "x".to_string());
        assert_eq!(integral.diff("x"), Expr::new_func("g", vec![x()]));
    }
}
