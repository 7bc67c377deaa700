// the collection of utility functions: canonical ordering of terms and factors,
// polynomial coefficient extraction and identifier checks
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::Number;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Order of terms inside a sum: lexicographic on monomials with higher powers first,
/// numbers last, then the non-numeric part, then the coefficient.
pub fn term_order(a: &Expr, b: &Expr) -> Ordering {
    match (a.is_number(), b.is_number()) {
        (true, true) => return a.cmp(b),
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let (coeff_a, rest_a) = a.as_coeff_rest();
    let (coeff_b, rest_b) = b.as_coeff_rest();
    lex_cmp(&a.monomial(), &b.monomial())
        .then_with(|| rest_a.cmp(&rest_b))
        .then_with(|| coeff_a.cmp(&coeff_b))
}

fn lex_cmp(a: &BTreeMap<Expr, Number>, b: &BTreeMap<Expr, Number>) -> Ordering {
    let generators: BTreeSet<&Expr> = a.keys().chain(b.keys()).collect();
    let zero = Number::zero();
    for generator in generators {
        let ea = a.get(generator).unwrap_or(&zero);
        let eb = b.get(generator).unwrap_or(&zero);
        if ea != eb {
            return eb.cmp(ea);
        }
    }
    Ordering::Equal
}

/// Order of factors inside a product: by base, then by exponent.
pub fn factor_order(a: &Expr, b: &Expr) -> Ordering {
    let (base_a, exp_a) = ordering_key(a);
    let (base_b, exp_b) = ordering_key(b);
    base_a.cmp(&base_b).then_with(|| exp_a.cmp(&exp_b))
}

fn ordering_key(factor: &Expr) -> (Expr, Expr) {
    match factor {
        Expr::Pow(base, exp) => (*base.clone(), *exp.clone()),
        _ => (factor.clone(), Expr::one()),
    }
}

/// Degree of `var` in a single factor, None when the factor depends on `var` otherwise.
fn factor_degree(factor: &Expr, var: &str) -> Option<i64> {
    match factor {
        Expr::Var(name) if name == var => Some(1),
        Expr::Pow(base, exp) if matches!(base.as_ref(), Expr::Var(name) if name == var) => {
            exp.as_integer().and_then(|k| k.to_i64())
        }
        other if other.contains_variable(var) => None,
        _ => Some(0),
    }
}

/// Splits a term into (degree of `var`, coefficient free of `var`).
pub fn term_degree(term: &Expr, var: &str) -> Option<(i64, Expr)> {
    let mut degree = 0i64;
    let mut rest = Vec::new();
    for factor in term.factors() {
        let k = factor_degree(&factor, var)?;
        if k == 0 {
            rest.push(factor);
        } else {
            degree += k;
        }
    }
    Some((degree, Expr::product(rest)))
}

/// Coefficients of a polynomial in `var`, lowest degree first.
/// Returns None when the expression is not a polynomial in `var`.
pub fn poly_coefficients(expr: &Expr, var: &str) -> Option<Vec<Expr>> {
    let expanded = expr.expand();
    let mut by_degree: BTreeMap<usize, Vec<Expr>> = BTreeMap::new();
    for term in expanded.terms() {
        let (degree, coeff) = term_degree(&term, var)?;
        let degree = usize::try_from(degree).ok()?;
        by_degree.entry(degree).or_default().push(coeff);
    }
    let top = by_degree.keys().next_back().copied().unwrap_or(0);
    let mut coeffs = vec![Expr::zero(); top + 1];
    for (degree, parts) in by_degree {
        coeffs[degree] = Expr::sum(parts);
    }
    while coeffs.len() > 1 && coeffs.last().is_some_and(|c| c.is_zero()) {
        coeffs.pop();
    }
    Some(coeffs)
}

/// Lowest power of `var` over the terms of the expanded expression, 0 if `var` is absent
/// from some term. None when a term depends on `var` other than through integer powers.
pub fn lowest_power(expr: &Expr, var: &str) -> Option<i64> {
    let expanded = expr.expand();
    let mut lowest: Option<i64> = None;
    for term in expanded.terms() {
        let (degree, _) = term_degree(&term, var)?;
        lowest = Some(lowest.map_or(degree, |l| l.min(degree)));
    }
    lowest
}

/// Identifier: a letter or underscore followed by letters, digits, underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_coefficients() {
        let x = Expr::var("x");
        let expr = x.clone().pow(Expr::num(2)) - Expr::num(4);
        let coeffs = poly_coefficients(&expr, "x").unwrap();
        assert_eq!(coeffs, vec![Expr::num(-4), Expr::zero(), Expr::one()]);
        let not_poly = Expr::new_sin(x.clone()) + x;
        assert!(poly_coefficients(&not_poly, "x").is_none());
    }

    #[test]
    fn test_poly_coefficients_symbolic() {
        let x = Expr::var("x");
        let a = Expr::var("a");
        let expr = a.clone() * x.clone() + a.clone() * Expr::num(3);
        let coeffs = poly_coefficients(&expr, "x").unwrap();
        assert_eq!(coeffs, vec![Expr::num(3) * a.clone(), a]);
    }

    #[test]
    fn test_lowest_power() {
        let x = Expr::var("x");
        let expr = x.clone() + Expr::one() / x.clone();
        assert_eq!(lowest_power(&expr, "x"), Some(-1));
        assert_eq!(lowest_power(&(x + Expr::one()), "x"), Some(0));
    }

    #[test]
    fn test_term_order_puts_numbers_last() {
        let x = Expr::var("x");
        let mut terms = vec![Expr::num(2), x.clone(), x.clone().pow(Expr::num(2))];
        terms.sort_by(term_order);
        assert_eq!(terms, vec![x.clone().pow(Expr::num(2)), x, Expr::num(2)]);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x1"));
        assert!(is_identifier("_u"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
