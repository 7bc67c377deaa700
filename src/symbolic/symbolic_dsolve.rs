//! # Ordinary Differential Equations
//!
//! Closed-form solutions of linear ODEs in one unknown function `f(x)`:
//!
//! - first order `a1(x)*f' + a0(x)*f = g(x)` through the integrating factor
//!   `mu = exp(∫ a0/a1 dx)`, `f = (C1 + ∫ mu*g/a1 dx)/mu`
//! - second order homogeneous with constant coefficients `a2*f'' + a1*f' + a0*f = 0`
//!   through the roots of the characteristic polynomial (distinct real, repeated and
//!   complex conjugate roots)
//!
//! Integration constants are the symbols `C1` and `C2`.

use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use std::collections::BTreeMap;

impl Expr {
    /// Solves `self = 0` for the unknown function `func` (e.g. `f(x)`). When `func` is None
    /// the first application of an undefined function to a single symbol is used.
    ///
    /// # Returns
    /// The pair (f(x), solution) of the equation `f(x) = solution`.
    pub fn dsolve(&self, func: Option<&Expr>) -> Result<(Expr, Expr), String> {
        let func = match func {
            Some(f) => f.clone(),
            None => self
                .find_unknown_function()
                .ok_or_else(|| "dsolve: no unknown function f(x) in the equation".to_string())?,
        };
        let var = match &func {
            Expr::Func(_, args) if args.len() == 1 => match &args[0] {
                Expr::Var(name) => name.clone(),
                _ => return Err(format!("dsolve: {} is not a function of a single symbol", func)),
            },
            _ => return Err(format!("dsolve: {} is not an unknown function", func)),
        };

        let (coeffs, forcing) = self.linear_ode_coefficients(&func, &var)?;
        let order = coeffs.keys().next_back().copied().unwrap_or(0);
        debug!("dsolve: order {} equation in {}", order, func);
        let coeff = |k: u32| coeffs.get(&k).cloned().unwrap_or_else(Expr::zero);
        let solution = match order {
            0 => return Err(format!("dsolve: the equation has no derivatives of {}", func)),
            1 => first_order(&coeff(1), &coeff(0), &forcing, &var)?,
            2 => second_order(&coeff(2), &coeff(1), &coeff(0), &forcing, &var)?,
            _ => {
                return Err(format!(
                    "dsolve: equations of order {} are not supported",
                    order
                ));
            }
        };
        Ok((func, solution))
    }

    fn find_unknown_function(&self) -> Option<Expr> {
        match self {
            Expr::Func(_, args) if args.len() == 1 && matches!(args[0], Expr::Var(_)) => {
                Some(self.clone())
            }
            _ => self.args().iter().find_map(|a| a.find_unknown_function()),
        }
    }

    /// Coefficients a_k of the derivatives of `func` and the right-hand side g of
    /// `sum a_k f^(k) = g`.
    fn linear_ode_coefficients(
        &self,
        func: &Expr,
        var: &str,
    ) -> Result<(BTreeMap<u32, Expr>, Expr), String> {
        let mut by_order: BTreeMap<u32, Vec<Expr>> = BTreeMap::new();
        let mut free_terms = Vec::new();
        let depends = |e: &Expr| e.has(&|node: &Expr| node == func);
        for term in self.expand().terms() {
            let mut order = None;
            let mut rest = Vec::new();
            for factor in term.factors() {
                let found = match &factor {
                    f if f == func => Some(0),
                    Expr::Derivative(inner, v, k) if inner.as_ref() == func && v == var => Some(*k),
                    _ => None,
                };
                match found {
                    Some(k) if order.is_none() => order = Some(k),
                    Some(_) => return Err("dsolve: only linear equations are supported".to_string()),
                    None if depends(&factor) => {
                        return Err("dsolve: only linear equations are supported".to_string());
                    }
                    None => rest.push(factor),
                }
            }
            match order {
                Some(k) => by_order.entry(k).or_default().push(Expr::product(rest)),
                None => free_terms.push(term),
            }
        }
        let coeffs = by_order
            .into_iter()
            .map(|(k, parts)| (k, Expr::sum(parts)))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Ok((coeffs, -Expr::sum(free_terms)))
    }
}

fn constant(name: &str) -> Expr {
    Expr::var(name)
}

/// a1*f' + a0*f = g
fn first_order(a1: &Expr, a0: &Expr, g: &Expr, var: &str) -> Result<Expr, String> {
    let p = (a0.clone() / a1.clone()).simplify();
    let q = (g.clone() / a1.clone()).simplify();
    let p_int = p
        .integrate(var)
        .map_err(|e| format!("dsolve: cannot find the integrating factor: {}", e))?;
    let mu = Expr::new_exp(p_int);
    let particular = if q.is_zero() {
        Expr::zero()
    } else {
        (q * mu.clone())
            .expand()
            .integrate(var)
            .map_err(|e| format!("dsolve: cannot integrate the right-hand side: {}", e))?
    };
    let solution = (constant("C1") + particular) / mu;
    Ok(solution.expand().simplify())
}

/// a2*f'' + a1*f' + a0*f = g with constant coefficients and g = 0
fn second_order(a2: &Expr, a1: &Expr, a0: &Expr, g: &Expr, var: &str) -> Result<Expr, String> {
    let constant_coeffs = [a2, a1, a0].iter().all(|c| !c.contains_variable(var));
    if !constant_coeffs || !g.is_zero() {
        return Err(
            "dsolve: only homogeneous second-order equations with constant coefficients are supported"
                .to_string(),
        );
    }
    let x = Expr::var(var);
    let disc = (a1.clone().pow(Expr::num(2)) - Expr::num(4) * a2.clone() * a0.clone()).expand();
    let (Some(d), Some(lead)) = (disc.as_number(), a2.as_number()) else {
        return Err("dsolve: the characteristic equation must have numeric coefficients".to_string());
    };
    let two_a = Expr::num(2) * a2.clone();
    let alpha = (-a1.clone() / two_a.clone()).simplify();
    if d.is_zero() {
        // repeated root: (C1 + C2*x)*exp(r*x)
        let polynomial = constant("C1") + constant("C2") * x.clone();
        return Ok(polynomial * Expr::new_exp(alpha * x));
    }
    if d.is_positive() {
        let root = disc.sqrt() / two_a;
        let (r1, r2) = if lead.is_positive() {
            (alpha.clone() - root.clone(), alpha + root)
        } else {
            (alpha.clone() + root.clone(), alpha - root)
        };
        return Ok(constant("C1") * Expr::new_exp((r1 * x.clone()).expand())
            + constant("C2") * Expr::new_exp((r2 * x).expand()));
    }
    // complex roots alpha ± i*beta
    let mut beta = ((-disc).sqrt() / two_a).simplify();
    if !lead.is_positive() {
        beta = -beta;
    }
    let oscillation = constant("C1") * Expr::new_sin((beta.clone() * x.clone()).expand())
        + constant("C2") * Expr::new_cos((beta * x.clone()).expand());
    Ok(oscillation * Expr::new_exp((alpha * x).expand()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    fn f() -> Expr {
        Expr::new_func("f", vec![x()])
    }

    fn df(order: u32) -> Expr {
        Expr::Derivative(f().boxed(), "x".to_string(), order)
    }

    #[test]
    fn test_exponential_growth() {
        let (lhs, rhs) = (df(1) - f()).dsolve(None).unwrap();
        assert_eq!(lhs, f());
        assert_eq!(rhs.to_string(), "C1*exp(x)");
    }

    #[test]
    fn test_first_order_with_forcing() {
        let eq = df(1) + Expr::num(2) * f() - Expr::num(4);
        let (_, rhs) = eq.dsolve(Some(&f())).unwrap();
        assert_eq!(rhs.to_string(), "C1*exp(-2*x) + 2");
    }

    #[test]
    fn test_first_order_variable_coefficient() {
        // f' + f/x = 0 -> f = C1/x
        let eq = df(1) + f() / x();
        let (_, rhs) = eq.dsolve(None).unwrap();
        assert_eq!(rhs.to_string(), "C1/x");
    }

    #[test]
    fn test_harmonic_oscillator() {
        let (_, rhs) = (df(2) + f()).dsolve(None).unwrap();
        assert_eq!(rhs.to_string(), "C1*sin(x) + C2*cos(x)");
    }

    #[test]
    fn test_distinct_real_roots() {
        let (_, rhs) = (df(2) - f()).dsolve(None).unwrap();
        assert_eq!(rhs.to_string(), "C1*exp(-x) + C2*exp(x)");
    }

    #[test]
    fn test_repeated_root() {
        let eq = df(2) - Expr::num(2) * df(1) + f();
        let (_, rhs) = eq.dsolve(None).unwrap();
        assert_eq!(rhs.to_string(), "(C1 + C2*x)*exp(x)");
    }

    #[test]
    fn test_unsupported_equations() {
        assert!((f() * f() - df(1)).dsolve(None).is_err());
        assert!((df(3) - f()).dsolve(None).is_err());
        assert!((x() + Expr::one()).dsolve(None).is_err());
    }
}
