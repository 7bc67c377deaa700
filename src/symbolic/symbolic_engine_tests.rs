use crate::symbolic::symbolic_engine::Expr;
use std::f64;
//___________________________________TESTS____________________________________
// cross-module checks: construction, calculus, solving and numeric evaluation together

#[cfg(test)]
use approx;
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn test_integrate_then_differentiate() {
        let f = x().pow(Expr::num(2)) + Expr::new_sin(x());
        let antiderivative = f.integrate("x").unwrap();
        assert_eq!(antiderivative.diff("x"), f);
    }

    #[test]
    fn test_pythagorean_derivative_cancels() {
        let f = Expr::new_sin(x()).pow(Expr::num(2)) + Expr::new_cos(x()).pow(Expr::num(2));
        assert!(f.diff("x").is_zero());
        assert!(f.simplify().is_one());
    }

    #[test]
    fn test_exp_is_its_own_derivative() {
        assert_eq!(x().exp().diff("x"), x().exp());
        assert_eq!(x().exp().integrate("x").unwrap(), x().exp());
    }

    #[test]
    fn test_unknown_function_stays_unevaluated() {
        let f = Expr::new_func("f", vec![x()]);
        let integral = f.integrate_or_unevaluated("x");
        assert_eq!(integral, Expr::Integral(f.boxed(), "x".to_string()));
        assert_eq!(integral.to_string(), "Integral(f(x), x)");
    }

    #[test]
    fn test_solve_roots_satisfy_equation() {
        let p = x().pow(Expr::num(2)) - Expr::num(4);
        let roots = p.solve("x").unwrap();
        assert_eq!(roots, vec![Expr::num(-2), Expr::num(2)]);
        for root in roots {
            assert!(p.substitute("x", &root).is_zero());
        }
    }

    #[test]
    fn test_expand_square() {
        let expr = (x() + Expr::one()).pow(Expr::num(2));
        let expected = x().pow(Expr::num(2)) + Expr::num(2) * x() + Expr::one();
        assert_eq!(expr.expand(), expected);
    }

    #[test]
    fn test_numeric_values() {
        let pi = Expr::Pi.as_f64().unwrap();
        approx::assert_relative_eq!(pi, f64::consts::PI, epsilon = 1e-12);
        let value = (Expr::E.pow(Expr::num(2)) / Expr::num(2)).as_f64().unwrap();
        approx::assert_relative_eq!(value, f64::consts::E.powi(2) / 2.0, epsilon = 1e-12);
        assert_eq!(Expr::Pi.evalf(5).to_string(), "3.1416");
        assert!(x().as_f64().is_none());
    }
}
