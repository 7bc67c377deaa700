//! # Equation Solving Module
//!
//! Solving `expr = 0` for one variable and linear systems for several variables.
//!
//! ## Single equations
//! - polynomials (after clearing negative powers of the variable): closed form for degree
//!   one and two and for binomials `a*x**n + c`, rational roots plus deflation otherwise
//! - one term depending on the variable: the term is inverted through `exp`, `log`,
//!   powers with a constant exponent and exponentials with a constant base
//! - products equal to zero: every factor is solved separately
//!
//! Only real roots are returned; a quadratic with a negative discriminant has no
//! solutions. Roots are unique and sorted by value when all of them are numeric.
//!
//! ## Linear systems
//! Gauss-Jordan elimination over expressions; pivot variables are returned in terms of
//! the free ones, an inconsistent system has no solution.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::Number;
use crate::symbolic::utils::{lowest_power, poly_coefficients};
use log::debug;
use num::{BigInt, BigRational, Integer};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Constant terms larger than this are not searched for rational roots.
const MAX_ROOT_SEARCH: u64 = 1_000_000_000_000;

impl Expr {
    /// Solves `self = 0` for `var`.
    ///
    /// # Returns
    /// Sorted unique real roots, an empty vector when there is none, or an error when no
    /// method applies.
    pub fn solve(&self, var: &str) -> Result<Vec<Expr>, String> {
        let expanded = self.expand();
        if !expanded.contains_variable(var) {
            return Ok(Vec::new());
        }
        let mut roots = match solve_polynomial(&expanded, var)? {
            Some(roots) => roots,
            None => solve_by_isolation(&expanded, var)?,
        };
        sort_roots(&mut roots);
        roots.dedup();
        debug!("solve {} = 0 for {}: {} root(s)", self, var, roots.len());
        Ok(roots)
    }
}

fn solve_polynomial(expr: &Expr, var: &str) -> Result<Option<Vec<Expr>>, String> {
    let Some(shift) = lowest_power(expr, var) else {
        return Ok(None);
    };
    let cleared = if shift < 0 {
        (expr.clone() * Expr::var(var).pow(Expr::num(-shift))).expand()
    } else {
        expr.clone()
    };
    let Some(coeffs) = poly_coefficients(&cleared, var) else {
        return Ok(None);
    };
    let mut roots = polynomial_roots(&coeffs)?;
    if shift < 0 {
        // x = 0 is a pole of the original expression
        roots.retain(|r| !r.is_zero());
    }
    Ok(Some(roots))
}

/// Roots of the polynomial with coefficients `coeffs` (lowest degree first).
pub fn polynomial_roots(coeffs: &[Expr]) -> Result<Vec<Expr>, String> {
    let degree = coeffs.len().saturating_sub(1);
    match degree {
        0 => Ok(Vec::new()),
        1 => Ok(vec![(-coeffs[0].clone() / coeffs[1].clone()).simplify()]),
        2 => Ok(quadratic_roots(&coeffs[2], &coeffs[1], &coeffs[0])),
        _ => {
            let zeros = coeffs.iter().take_while(|c| c.is_zero()).count();
            if zeros > 0 {
                let mut roots = polynomial_roots(&coeffs[zeros..])?;
                roots.push(Expr::zero());
                return Ok(roots);
            }
            if let Some(roots) = binomial_roots(coeffs) {
                return Ok(roots);
            }
            let rationals: Option<Vec<BigRational>> =
                coeffs.iter().map(|c| c.as_rational().cloned()).collect();
            let Some(rationals) = rationals else {
                return Err(format!(
                    "cannot solve a polynomial of degree {} with symbolic coefficients",
                    degree
                ));
            };
            match find_rational_root(&rationals) {
                Some(root) => {
                    let deflated: Vec<Expr> = deflate(&rationals, &root)
                        .into_iter()
                        .map(|c| Expr::Const(Number::Rational(c)))
                        .collect();
                    let mut roots = polynomial_roots(&deflated)?;
                    roots.push(Expr::Const(Number::Rational(root)));
                    Ok(roots)
                }
                None => Err(format!(
                    "cannot solve a polynomial of degree {} without rational roots",
                    degree
                )),
            }
        }
    }
}

/// Real roots of a*x^n + c, the n-th roots of -c/a.
/// `None` when a middle coefficient is not zero.
fn binomial_roots(coeffs: &[Expr]) -> Option<Vec<Expr>> {
    let (leading, middle) = coeffs[1..].split_last()?;
    if middle.iter().any(|c| !c.is_zero()) {
        return None;
    }
    let n = i64::try_from(middle.len() + 1).ok()?;
    let value = (-coeffs[0].clone() / leading.clone()).simplify();
    let exponent = Expr::rational(1, n);
    if n % 2 == 1 {
        let root = if value.could_extract_minus_sign() {
            -(-value).pow(exponent)
        } else {
            value.pow(exponent)
        };
        return Some(vec![root.simplify()]);
    }
    if value.as_number().is_some_and(|v| v.is_negative()) {
        return Some(Vec::new());
    }
    let root = value.pow(exponent).simplify();
    Some(vec![-root.clone(), root])
}

/// Real roots of a*x^2 + b*x + c.
fn quadratic_roots(a: &Expr, b: &Expr, c: &Expr) -> Vec<Expr> {
    let disc = (b.clone().pow(Expr::num(2)) - Expr::num(4) * a.clone() * c.clone()).expand();
    let two_a = Expr::num(2) * a.clone();
    if let Some(d) = disc.as_number() {
        if d.is_negative() {
            return Vec::new();
        }
        if d.is_zero() {
            return vec![(-b.clone() / two_a).simplify()];
        }
    }
    let root = disc.sqrt();
    vec![
        ((-b.clone() - root.clone()) / two_a.clone()).simplify(),
        ((-b.clone() + root) / two_a).simplify(),
    ]
}

fn eval_poly(coeffs: &[BigRational], x: &BigRational) -> BigRational {
    coeffs
        .iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * x + c)
}

fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    let n = n.abs().to_u64()?;
    if n > MAX_ROOT_SEARCH {
        return None;
    }
    let mut result = Vec::new();
    let mut i = 1u64;
    while i * i <= n {
        if n % i == 0 {
            result.push(BigInt::from(i));
            if i * i != n {
                result.push(BigInt::from(n / i));
            }
        }
        i += 1;
    }
    Some(result)
}

/// Rational root p/q of the polynomial, p dividing the constant term and q the leading one.
fn find_rational_root(coeffs: &[BigRational]) -> Option<BigRational> {
    let lcm = coeffs
        .iter()
        .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
    let integers: Vec<BigInt> = coeffs
        .iter()
        .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
        .collect();
    let constant = integers.first()?;
    let leading = integers.last()?;
    let ps = divisors(constant)?;
    let qs = divisors(leading)?;
    for p in &ps {
        for q in &qs {
            for sign in [1, -1] {
                let candidate = BigRational::new(p * BigInt::from(sign), q.clone());
                if eval_poly(coeffs, &candidate).is_zero() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Synthetic division by (x - r).
fn deflate(coeffs: &[BigRational], r: &BigRational) -> Vec<BigRational> {
    let n = coeffs.len() - 1;
    let mut out = vec![BigRational::zero(); n];
    let mut carry = BigRational::zero();
    for k in (1..=n).rev() {
        carry = &coeffs[k] + carry * r;
        out[k - 1] = carry.clone();
    }
    out
}

fn solve_by_isolation(expr: &Expr, var: &str) -> Result<Vec<Expr>, String> {
    let (dependent, independent): (Vec<Expr>, Vec<Expr>) = expr
        .terms()
        .into_iter()
        .partition(|t| t.contains_variable(var));
    if dependent.len() != 1 {
        return Err(format!("cannot solve {} = 0 for {}", expr, var));
    }
    let term = &dependent[0];
    let rhs = -Expr::sum(independent);
    let (constant, factors): (Vec<Expr>, Vec<Expr>) = term
        .factors()
        .into_iter()
        .partition(|f| !f.contains_variable(var));
    let rhs = (rhs / Expr::product(constant)).simplify();
    if factors.len() == 1 {
        return invert(&factors[0], &rhs, var);
    }
    if rhs.is_zero() {
        // a product vanishes where one of its factors does
        let mut roots = Vec::new();
        for factor in &factors {
            if let Expr::Pow(_, exp) = factor {
                if exp.as_number().is_some_and(|n| n.is_negative()) {
                    continue;
                }
            }
            roots.extend(factor.solve(var)?);
        }
        return Ok(roots);
    }
    Err(format!("cannot solve {} = 0 for {}", expr, var))
}

/// Solves `h = rhs` for `var`.
fn invert(h: &Expr, rhs: &Expr, var: &str) -> Result<Vec<Expr>, String> {
    match h {
        Expr::Var(_) => Ok(vec![rhs.clone()]),
        Expr::Exp(u) => {
            if rhs.as_number().is_some_and(|n| !n.is_positive()) {
                return Ok(Vec::new());
            }
            (*u.clone() - Expr::new_ln(rhs.clone())).solve(var)
        }
        Expr::Ln(u) => (*u.clone() - Expr::new_exp(rhs.clone())).solve(var),
        Expr::Pow(base, exp) if !exp.contains_variable(var) => {
            if exp.as_number().is_some_and(|n| n.is_negative()) && rhs.is_zero() {
                return Ok(Vec::new());
            }
            let even = exp.as_integer().is_some_and(|n| n.is_even());
            if even && rhs.as_number().is_some_and(|n| n.is_negative()) {
                return Ok(Vec::new());
            }
            let root = Expr::power(rhs.clone(), Expr::one() / *exp.clone());
            let mut roots = (*base.clone() - root.clone()).solve(var)?;
            if even {
                roots.extend((*base.clone() + root).solve(var)?);
            }
            Ok(roots)
        }
        Expr::Pow(base, exp) if !base.contains_variable(var) => {
            if rhs.as_number().is_some_and(|n| !n.is_positive()) {
                return Ok(Vec::new());
            }
            let target = Expr::new_ln(rhs.clone()) / Expr::new_ln(*base.clone());
            (*exp.clone() - target).solve(var)
        }
        _ => Err(format!("cannot invert {} to solve for {}", h, var)),
    }
}

fn sort_roots(roots: &mut [Expr]) {
    let values: Option<Vec<f64>> = roots.iter().map(|r| r.as_f64()).collect();
    match values {
        Some(values) => {
            let mut paired: Vec<(f64, Expr)> = values.into_iter().zip(roots.iter().cloned()).collect();
            paired.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            for (slot, (_, root)) in roots.iter_mut().zip(paired) {
                *slot = root;
            }
        }
        None => roots.sort(),
    }
}

/// Solves a system of linear equations `equations[i] = 0` for `vars`.
///
/// # Returns
/// `Ok(Some(pairs))` with (variable, value) pairs for the pivot variables in the order of
/// `vars`, `Ok(None)` for an inconsistent system, `Err` when an equation is not linear.
pub fn solve_linear_system(
    equations: &[Expr],
    vars: &[String],
) -> Result<Option<Vec<(String, Expr)>>, String> {
    let n = vars.len();
    let mut rows: Vec<Vec<Expr>> = Vec::with_capacity(equations.len());
    for equation in equations {
        let expanded = equation.expand();
        let mut row = Vec::with_capacity(n + 1);
        let mut rest = expanded.clone();
        for v in vars {
            let coeff = expanded.diff(v);
            if vars.iter().any(|w| coeff.contains_variable(w)) {
                return Err(format!(
                    "equation {} = 0 is not linear in {}",
                    equation,
                    vars.join(", ")
                ));
            }
            rest = (rest - coeff.clone() * Expr::var(v)).expand();
            row.push(coeff);
        }
        if vars.iter().any(|w| rest.contains_variable(w)) {
            return Err(format!(
                "equation {} = 0 is not linear in {}",
                equation,
                vars.join(", ")
            ));
        }
        row.push(-rest);
        rows.push(row);
    }

    // Gauss-Jordan elimination
    let mut pivots: Vec<(usize, usize)> = Vec::new();
    let mut r = 0;
    for col in 0..n {
        let Some(found) = (r..rows.len()).find(|&i| !rows[i][col].is_zero()) else {
            continue;
        };
        rows.swap(r, found);
        let pivot = rows[r][col].clone();
        for k in 0..=n {
            rows[r][k] = (rows[r][k].clone() / pivot.clone()).simplify();
        }
        for i in 0..rows.len() {
            if i == r || rows[i][col].is_zero() {
                continue;
            }
            let factor = rows[i][col].clone();
            for k in 0..=n {
                rows[i][k] = (rows[i][k].clone() - factor.clone() * rows[r][k].clone()).simplify();
            }
        }
        pivots.push((r, col));
        r += 1;
        if r == rows.len() {
            break;
        }
    }
    if rows[r..].iter().any(|row| !row[n].is_zero()) {
        return Ok(None);
    }
    let pivot_cols: Vec<usize> = pivots.iter().map(|&(_, c)| c).collect();
    let mut solution = Vec::with_capacity(pivots.len());
    for (row, col) in pivots {
        let mut value = rows[row][n].clone();
        for free in (0..n).filter(|c| !pivot_cols.contains(c)) {
            value = value - rows[row][free].clone() * Expr::var(&vars[free]);
        }
        solution.push((vars[col].clone(), value.simplify()));
    }
    Ok(Some(solution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    fn display(roots: &[Expr]) -> Vec<String> {
        roots.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_linear() {
        let roots = (Expr::num(2) * x() - Expr::num(3)).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["3/2"]);
    }

    #[test]
    fn test_quadratic() {
        let roots = (x().pow(Expr::num(2)) - Expr::num(4)).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["-2", "2"]);
        let roots = (x().pow(Expr::num(2)) - Expr::num(2)).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["-sqrt(2)", "sqrt(2)"]);
        let roots = (x().pow(Expr::num(2)) + Expr::one()).solve("x").unwrap();
        assert!(roots.is_empty());
        let roots = (x().pow(Expr::num(2)) - Expr::num(2) * x() + Expr::one())
            .solve("x")
            .unwrap();
        assert_eq!(display(&roots), vec!["1"]);
    }

    #[test]
    fn test_cubic_with_rational_roots() {
        // (x - 1)(x - 2)(x + 3) = x^3 - 7x + 6
        let p = x().pow(Expr::num(3)) - Expr::num(7) * x() + Expr::num(6);
        let roots = p.solve("x").unwrap();
        assert_eq!(display(&roots), vec!["-3", "1", "2"]);
        let q = x().pow(Expr::num(3)) - x();
        assert_eq!(display(&q.solve("x").unwrap()), vec!["-1", "0", "1"]);
    }

    #[test]
    fn test_binomials() {
        let cube_root = Expr::num(2).pow(Expr::rational(1, 3));
        let roots = (x().pow(Expr::num(3)) - Expr::num(2)).solve("x").unwrap();
        assert_eq!(roots, vec![cube_root.clone()]);
        assert_eq!(display(&roots), vec!["2**(1/3)"]);
        let roots = (x().pow(Expr::num(3)) + Expr::num(2)).solve("x").unwrap();
        assert_eq!(roots, vec![-cube_root]);

        let fourth_root = Expr::num(2).pow(Expr::rational(1, 4));
        let roots = (x().pow(Expr::num(4)) - Expr::num(2)).solve("x").unwrap();
        assert_eq!(roots, vec![-fourth_root.clone(), fourth_root]);
        assert!((x().pow(Expr::num(4)) + Expr::num(2)).solve("x").unwrap().is_empty());

        let y = Expr::var("y");
        let roots = (x().pow(Expr::num(3)) - y.clone()).solve("x").unwrap();
        assert_eq!(roots, vec![y.pow(Expr::rational(1, 3))]);
        assert_eq!(display(&roots), vec!["y**(1/3)"]);
    }

    #[test]
    fn test_perfect_power_binomials() {
        let roots = (x().pow(Expr::num(3)) + Expr::num(8)).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["-2"]);
        let roots = (x().pow(Expr::num(4)) - Expr::num(16)).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["-2", "2"]);
    }

    #[test]
    fn test_no_closed_form() {
        let p = x().pow(Expr::num(5)) - x() + Expr::one();
        assert!(p.solve("x").is_err());
    }

    #[test]
    fn test_rational_function() {
        // x - 1/x = 0
        let expr = x() - Expr::one() / x();
        assert_eq!(display(&expr.solve("x").unwrap()), vec!["-1", "1"]);
    }

    #[test]
    fn test_isolation() {
        let expr = Expr::new_exp(x()) - Expr::num(2);
        assert_eq!(display(&expr.solve("x").unwrap()), vec!["log(2)"]);
        let expr = x().sqrt() - Expr::num(3);
        assert_eq!(display(&expr.solve("x").unwrap()), vec!["9"]);
        let expr = Expr::new_exp(x()) + Expr::one();
        assert!(expr.solve("x").unwrap().is_empty());
    }

    #[test]
    fn test_product_equal_zero() {
        let expr = x() * Expr::new_exp(x());
        assert_eq!(display(&expr.solve("x").unwrap()), vec!["0"]);
    }

    #[test]
    fn test_symbolic_coefficients() {
        let a = Expr::var("a");
        let roots = (a.clone() * x() - Expr::one()).solve("x").unwrap();
        assert_eq!(display(&roots), vec!["1/a"]);
    }

    #[test]
    fn test_no_variable() {
        assert!(Expr::num(3).solve("x").unwrap().is_empty());
    }

    #[test]
    fn test_linear_system() {
        let y = Expr::var("y");
        let equations = vec![
            x() + y.clone() - Expr::num(3),
            x() - y.clone() - Expr::one(),
        ];
        let vars = vec!["x".to_string(), "y".to_string()];
        let solution = solve_linear_system(&equations, &vars).unwrap().unwrap();
        assert_eq!(
            solution,
            vec![("x".to_string(), Expr::num(2)), ("y".to_string(), Expr::one())]
        );
    }

    #[test]
    fn test_underdetermined_and_inconsistent_systems() {
        let y = Expr::var("y");
        let vars = vec!["x".to_string(), "y".to_string()];
        let solution = solve_linear_system(&[x() + y.clone() - Expr::one()], &vars)
            .unwrap()
            .unwrap();
        assert_eq!(solution, vec![("x".to_string(), Expr::one() - y.clone())]);
        let inconsistent = vec![x() + y.clone(), x() + y.clone() - Expr::one()];
        assert!(solve_linear_system(&inconsistent, &vars).unwrap().is_none());
        let nonlinear = vec![x() * y.clone() - Expr::one()];
        assert!(solve_linear_system(&nonlinear, &vars).is_err());
    }
}
