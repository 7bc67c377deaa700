//! # Symbolic Expression Simplification Module
//!
//! Canonical construction already folds constants, collects like terms and merges powers
//! (see `symbolic_engine`). This module adds the transformations that are not always an
//! improvement and therefore are chosen by a measure of expression size:
//!
//! 1. **Expansion**: distributes products over sums and expands positive integer powers of
//!    sums, `(x + 1)**2 -> x**2 + 2*x + 1`
//! 2. **Pythagorean identity**: `c*sin(u)**2 + c*cos(u)**2 -> c`
//! 3. **Size measure**: `count_ops` counts operations the way they are printed
//!
//! `simplify` simplifies the arguments bottom-up and then returns the smallest of the
//! candidate forms, preferring the unexpanded form on ties.

use crate::symbolic::symbolic_engine::Expr;
use num_traits::ToPrimitive;

/// Largest integer power of a sum that `expand` multiplies out.
const MAX_EXPAND_POWER: u32 = 64;
/// `expand` leaves products alone when distributing would produce more terms than this.
const MAX_EXPANDED_TERMS: usize = 512;

impl Expr {
    //___________________________________EXPANSION____________________________________

    /// Distributes products over sums and multiplies out positive integer powers of sums.
    pub fn expand(&self) -> Expr {
        match self {
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.expand()).collect()),
            Expr::Mul(factors) => distribute(factors.iter().map(|f| f.expand()).collect()),
            Expr::Pow(base, exp) => {
                let base = base.expand();
                let exp = exp.expand();
                let power = exp.as_integer().and_then(|n| n.to_u32());
                if let (Expr::Add(terms), Some(n)) = (&base, power) {
                    let small = expanded_term_count(terms.len(), n)
                        .is_some_and(|count| count <= MAX_EXPANDED_TERMS);
                    if (2..=MAX_EXPAND_POWER).contains(&n) && small {
                        let mut acc = Expr::one();
                        for _ in 0..n {
                            acc = multiply_out(vec![acc, base.clone()]);
                        }
                        return acc;
                    }
                }
                Expr::power(base, exp)
            }
            _ if self.args().is_empty() => self.clone(),
            _ => self.map_args(&mut |child| child.expand()),
        }
    }

    //___________________________________SIZE MEASURE____________________________________

    /// Number of printed operations: binary operators, function applications and signs.
    pub fn count_ops(&self) -> usize {
        match self {
            Expr::Const(n) => {
                let fraction = n.as_rational().is_some_and(|r| !r.is_integer());
                usize::from(n.is_negative()) + usize::from(fraction)
            }
            Expr::Var(_) | Expr::Pi | Expr::E | Expr::ComplexInfinity | Expr::NaN => 0,
            Expr::Add(items) | Expr::Mul(items) => {
                items.len() - 1 + items.iter().map(|i| i.count_ops()).sum::<usize>()
            }
            _ => 1 + self.args().iter().map(|a| a.count_ops()).sum::<usize>(),
        }
    }

    //___________________________________TRIGONOMETRY____________________________________

    /// Applies `c*sin(u)**2 + c*cos(u)**2 = c` throughout the expression.
    pub fn trigsimp(&self) -> Expr {
        let rebuilt = if self.args().is_empty() {
            self.clone()
        } else {
            self.map_args(&mut |child| child.trigsimp())
        };
        match &rebuilt {
            Expr::Add(terms) => pythagorean(terms.clone()),
            _ => rebuilt,
        }
    }

    //___________________________________SIMPLIFICATION____________________________________

    /// Returns the smallest equivalent form among the canonical, expanded and
    /// trigonometrically reduced versions of the expression.
    pub fn simplify(&self) -> Expr {
        if self.args().is_empty() {
            return self.clone();
        }
        let rebuilt = self.map_args(&mut |child| child.simplify());
        let expanded = rebuilt.expand();
        let candidates = [
            rebuilt.trigsimp(),
            expanded.trigsimp(),
            expanded,
        ];
        let mut best = rebuilt;
        let mut best_ops = best.count_ops();
        for candidate in candidates {
            let ops = candidate.count_ops();
            if ops < best_ops {
                best_ops = ops;
                best = candidate;
            }
        }
        best
    }
}

/// Multiplies factors term by term.
fn distribute(factors: Vec<Expr>) -> Expr {
    let total = factors
        .iter()
        .try_fold(1usize, |acc, f| acc.checked_mul(f.terms().len()));
    match total {
        Some(total) if total <= MAX_EXPANDED_TERMS => multiply_out(factors),
        _ => Expr::product(factors),
    }
}

/// Number of monomials in `(t1 + ... + tk)**n`, that is C(n + k - 1, k - 1).
/// `None` once it passes `MAX_EXPANDED_TERMS`.
fn expanded_term_count(terms: usize, n: u32) -> Option<usize> {
    let n = u128::from(n);
    let mut count: u128 = 1;
    // C(n + j, j) = C(n + j - 1, j - 1) * (n + j) / j
    for j in 1..terms as u128 {
        count = count.checked_mul(n + j)? / j;
        if count > MAX_EXPANDED_TERMS as u128 {
            return None;
        }
    }
    usize::try_from(count).ok()
}

fn multiply_out(factors: Vec<Expr>) -> Expr {
    let mut acc: Vec<Expr> = vec![Expr::one()];
    for factor in factors {
        let terms = factor.terms();
        acc = acc
            .iter()
            .flat_map(|a| {
                terms
                    .iter()
                    .map(move |t| Expr::product(vec![a.clone(), t.clone()]))
            })
            .collect();
    }
    Expr::sum(acc)
}

/// Replaces pairs `R*sin(u)**2`, `R*cos(u)**2` of a sum by `R`.
fn pythagorean(mut terms: Vec<Expr>) -> Expr {
    'search: loop {
        for i in 0..terms.len() {
            for factor in terms[i].factors() {
                let Expr::Pow(base, exp) = &factor else {
                    continue;
                };
                let Expr::sin(u) = base.as_ref() else {
                    continue;
                };
                if exp.as_integer().is_none_or(|n| n != 2.into()) {
                    continue;
                }
                let rest = terms[i].clone() / factor.clone();
                let partner = rest.clone() * Expr::new_cos(*u.clone()).pow(Expr::num(2));
                if let Some(j) = terms.iter().position(|t| *t == partner) {
                    terms[i] = rest;
                    terms.remove(j);
                    continue 'search;
                }
            }
        }
        break;
    }
    Expr::sum(terms)
}
