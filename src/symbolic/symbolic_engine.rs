//! # Symbolic Engine Module
//!
//! Core expression type of the calculator. Every expression is kept in a canonical form:
//! constructors evaluate what can be evaluated exactly and normalize the rest, so two
//! mathematically identical inputs written differently usually end up as the same tree
//! and structural equality is a meaningful test.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Atoms**: `Const(Number)` exact rationals or tagged floats, `Var(String)`, `Pi`, `E`
//! - **n-ary operations**: `Add(Vec<Expr>)`, `Mul(Vec<Expr>)`, flattened and sorted
//! - **Power**: `Pow(base, exp)`; division is `a * b^-1`, square root is `b^(1/2)`
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `Abs`, `Factorial`
//! - **Unevaluated forms**: `Func` (undefined function application like `f(x)`),
//!   `Derivative`, `Integral`
//! - **Special values**: `ComplexInfinity` (`zoo`, e.g. `1/0`) and `NaN` (`0/0`)
//!
//! ### Canonical constructors
//! - `Expr::sum(terms)` flattens nested sums, adds numbers and collects like terms
//!   (`x + 2*x -> 3*x`)
//! - `Expr::product(factors)` flattens, multiplies numbers, merges equal bases by adding
//!   exponents (`x*x**2 -> x**3`, `exp(a)*exp(b) -> exp(a + b)`) and distributes a bare
//!   number over a single sum (`-(x - 1) -> 1 - x`)
//! - `Expr::power(base, exp)` evaluates exact powers, extracts perfect powers from roots
//!   (`sqrt(8) -> 2*sqrt(2)`) and rationalizes denominators (`1/sqrt(2) -> sqrt(2)/2`)
//! - `Expr::new_exp`, `new_ln`, `new_sin`, ... evaluate special values (`exp(0)`,
//!   `log(1)`, `sin(pi/6)`) and pull signs out of odd and even functions
//!
//! The std::ops traits (`+ - * /` and unary `-`) go through these constructors, so
//! `x.clone() + x` is already `2*x`.

#![allow(non_camel_case_types)]

use crate::symbolic::symbolic_numbers::{MAX_EXACT_BITS, Number, extract_root};
use num::{BigInt, BigRational, Integer};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::{BTreeMap, BTreeSet};

/// Limit for re-flattening passes in `Expr::product` when merged powers produce products.
const MAX_PRODUCT_PASSES: usize = 4;
/// Limit for exponents of the numerator and denominator inside exact roots.
const MAX_ROOT_EXPONENT: u32 = 64;

/// Symbolic expression tree in canonical form.
///
/// The declaration order of the variants matters: the derived `Ord` is used to sort the
/// factors of products and to break ties between the terms of sums.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Expr {
    /// Exact rational or float number
    Const(Number),
    /// The constant pi
    Pi,
    /// Euler's number
    E,
    /// Symbolic variable with a name (e.g. "x", "t")
    Var(String),
    /// Sum of at least two terms, numbers last
    Add(Vec<Expr>),
    /// Product of at least two factors, numeric coefficient first
    Mul(Vec<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm, printed as log(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Absolute value
    Abs(Box<Expr>),
    /// factorial(n)
    Factorial(Box<Expr>),
    /// Application of an undefined function, f(x)
    Func(String, Vec<Expr>),
    /// Unevaluated derivative of given order with respect to a variable
    Derivative(Box<Expr>, String, u32),
    /// Unevaluated indefinite integral
    Integral(Box<Expr>, String),
    /// Complex infinity, zoo
    ComplexInfinity,
    /// Not a number
    NaN,
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::sum(vec![self, rhs])
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::sum(vec![self, -rhs])
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::product(vec![self, rhs])
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::product(vec![self, Expr::power(rhs, Expr::minus_one())])
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.clone() + rhs;
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.clone() - rhs;
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = self.clone() * rhs;
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::product(vec![Expr::minus_one(), self])
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    #[allow(non_snake_case)]
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Expr::var)
            .collect()
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn num(value: i64) -> Expr {
        Expr::Const(Number::int(value))
    }

    /// exact p/q; q == 0 gives complex infinity (or NaN for 0/0)
    pub fn rational(p: i64, q: i64) -> Expr {
        match Number::rational(p, q) {
            Some(n) => Expr::Const(n),
            None if p == 0 => Expr::NaN,
            None => Expr::ComplexInfinity,
        }
    }

    pub fn float(value: f64, digits: u32) -> Expr {
        Expr::Const(Number::float(value, digits))
    }

    pub fn zero() -> Expr {
        Expr::num(0)
    }

    pub fn one() -> Expr {
        Expr::num(1)
    }

    pub fn minus_one() -> Expr {
        Expr::num(-1)
    }

    pub fn half() -> Expr {
        Expr::rational(1, 2)
    }

    /// Converts the expression into a boxed expression.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Const(n) => Some(n),
            _ => None,
        }
    }

    /// exact zero
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_zero() && !n.is_float())
    }

    /// exact one
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_one() && !n.is_float())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    /// exact integer constant
    pub fn as_integer(&self) -> Option<BigInt> {
        self.as_number().and_then(|n| n.as_integer())
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        self.as_number().and_then(|n| n.as_rational())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::power(self, rhs)
    }

    pub fn exp(self) -> Expr {
        Expr::new_exp(self)
    }

    pub fn ln(self) -> Expr {
        Expr::new_ln(self)
    }

    pub fn sqrt(self) -> Expr {
        Expr::power(self, Expr::half())
    }

    //___________________________________TRAVERSAL___________________________________

    /// Checks whether the expression contains a specific variable anywhere,
    /// including the variable slots of derivatives and integrals.
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Derivative(expr, var, _) | Expr::Integral(expr, var) => {
                var == var_name || expr.contains_variable(var_name)
            }
            _ => self.args().iter().any(|a| a.contains_variable(var_name)),
        }
    }

    /// Free symbols sorted by name. Integration variables of unevaluated integrals are bound.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                symbols.insert(name.clone());
            }
            Expr::Integral(expr, var) => {
                let mut inner = expr.free_symbols();
                inner.remove(var);
                symbols.extend(inner);
            }
            Expr::Derivative(expr, var, _) => {
                expr.collect_symbols(symbols);
                symbols.insert(var.clone());
            }
            _ => {
                for arg in self.args() {
                    arg.collect_symbols(symbols);
                }
            }
        }
    }

    /// Direct children of the node.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Add(items) | Expr::Mul(items) | Expr::Func(_, items) => items.iter().collect(),
            Expr::Pow(base, exp) => vec![base.as_ref(), exp.as_ref()],
            Expr::Exp(a)
            | Expr::Ln(a)
            | Expr::sin(a)
            | Expr::cos(a)
            | Expr::tg(a)
            | Expr::Abs(a)
            | Expr::Factorial(a)
            | Expr::Derivative(a, _, _)
            | Expr::Integral(a, _) => vec![a.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Rebuilds the node from mapped children through the canonical constructors.
    pub fn map_args<F>(&self, f: &mut F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| f(t)).collect()),
            Expr::Mul(factors) => Expr::product(factors.iter().map(|t| f(t)).collect()),
            Expr::Pow(base, exp) => Expr::power(f(base), f(exp)),
            Expr::Exp(a) => Expr::new_exp(f(a)),
            Expr::Ln(a) => Expr::new_ln(f(a)),
            Expr::sin(a) => Expr::new_sin(f(a)),
            Expr::cos(a) => Expr::new_cos(f(a)),
            Expr::tg(a) => Expr::new_tan(f(a)),
            Expr::Abs(a) => Expr::new_abs(f(a)),
            Expr::Factorial(a) => Expr::new_factorial(f(a)),
            Expr::Func(name, args) => Expr::Func(name.clone(), args.iter().map(|a| f(a)).collect()),
            Expr::Derivative(a, var, order) => Expr::Derivative(f(a).boxed(), var.clone(), *order),
            Expr::Integral(a, var) => Expr::Integral(f(a).boxed(), var.clone()),
            _ => self.clone(),
        }
    }

    /// Substitutes a variable with an expression and re-canonicalizes the result.
    pub fn substitute(&self, var: &str, value: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => value.clone(),
            _ if !self.contains_variable(var) => self.clone(),
            _ => self.map_args(&mut |child| child.substitute(var, value)),
        }
    }

    /// Replaces every occurrence of a subexpression.
    pub fn replace(&self, target: &Expr, value: &Expr) -> Expr {
        if self == target {
            return value.clone();
        }
        if self.args().is_empty() {
            return self.clone();
        }
        self.map_args(&mut |child| child.replace(target, value))
    }

    /// True when the expression contains a node matching the predicate.
    pub fn has<P>(&self, predicate: &P) -> bool
    where
        P: Fn(&Expr) -> bool,
    {
        predicate(self) || self.args().iter().any(|a| a.has(predicate))
    }

    //___________________________________DECOMPOSITION___________________________________

    /// Splits a term into numeric coefficient and the rest: `3*x*y -> (3, x*y)`.
    pub fn as_coeff_rest(&self) -> (Number, Expr) {
        match self {
            Expr::Const(n) => (n.clone(), Expr::one()),
            Expr::Mul(factors) => match factors.first() {
                Some(Expr::Const(n)) => {
                    let rest = &factors[1..];
                    let rest = if rest.len() == 1 {
                        rest[0].clone()
                    } else {
                        Expr::Mul(rest.to_vec())
                    };
                    (n.clone(), rest)
                }
                _ => (Number::one(), self.clone()),
            },
            _ => (Number::one(), self.clone()),
        }
    }

    /// Base and exponent: `x**2 -> (x, 2)`, `exp(a) -> (E, a)`, `x -> (x, 1)`.
    pub fn as_base_exp(&self) -> (Expr, Expr) {
        match self {
            Expr::Pow(base, exp) => (*base.clone(), *exp.clone()),
            Expr::Exp(a) => (Expr::E, *a.clone()),
            _ => (self.clone(), Expr::one()),
        }
    }

    /// Factors of a product, the expression itself otherwise.
    pub fn factors(&self) -> Vec<Expr> {
        match self {
            Expr::Mul(factors) => factors.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Terms of a sum, the expression itself otherwise.
    pub fn terms(&self) -> Vec<Expr> {
        match self {
            Expr::Add(terms) => terms.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Negative numbers and products with a negative coefficient.
    pub fn could_extract_minus_sign(&self) -> bool {
        match self {
            Expr::Const(n) => n.is_negative(),
            Expr::Mul(factors) => matches!(factors.first(), Some(Expr::Const(n)) if n.is_negative()),
            _ => false,
        }
    }

    /// Monomial of a term: generator -> exponent, numeric coefficient dropped.
    pub fn monomial(&self) -> BTreeMap<Expr, Number> {
        let mut monomial: BTreeMap<Expr, Number> = BTreeMap::new();
        let (_, rest) = self.as_coeff_rest();
        if rest.is_number() {
            return monomial;
        }
        for factor in rest.factors() {
            let (generator, exponent) = match &factor {
                Expr::Pow(base, exp) => match exp.as_ref() {
                    Expr::Const(n) => (*base.clone(), n.clone()),
                    _ => (factor.clone(), Number::one()),
                },
                _ => (factor.clone(), Number::one()),
            };
            let entry = monomial.entry(generator).or_insert_with(Number::zero);
            *entry = entry.add(&exponent);
        }
        monomial
    }

    /// Multiple of pi as an exact rational: `pi -> 1`, `3*pi/2 -> 3/2`, `0 -> 0`.
    pub fn pi_coefficient(&self) -> Option<BigRational> {
        match self {
            Expr::Pi => Some(BigRational::one()),
            Expr::Const(Number::Rational(r)) if r.is_zero() => Some(BigRational::zero()),
            Expr::Mul(factors) if factors.len() == 2 && factors[1] == Expr::Pi => {
                factors[0].as_rational().cloned()
            }
            _ => None,
        }
    }

    //___________________________________CANONICAL SUM___________________________________

    /// Canonical sum of terms.
    pub fn sum(terms: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Expr::Add(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        let mut constant = Number::zero();
        let mut infinities = 0usize;
        let mut collected: BTreeMap<Expr, Number> = BTreeMap::new();
        for term in flat {
            match term {
                Expr::NaN => return Expr::NaN,
                Expr::ComplexInfinity => infinities += 1,
                Expr::Const(n) => constant = constant.add(&n),
                other => {
                    let (coeff, rest) = other.as_coeff_rest();
                    let entry = collected.entry(rest).or_insert_with(Number::zero);
                    *entry = entry.add(&coeff);
                }
            }
        }
        if infinities > 1 {
            return Expr::NaN;
        }
        if infinities == 1 {
            return Expr::ComplexInfinity;
        }
        let mut result: Vec<Expr> = collected
            .into_iter()
            .filter(|(_, coeff)| !coeff.is_zero())
            .map(|(rest, coeff)| Expr::with_coeff(coeff, rest))
            .collect();
        let keep_constant = !(constant.is_zero() && (!constant.is_float() || !result.is_empty()));
        if keep_constant || result.is_empty() {
            result.push(Expr::Const(constant));
        }
        if result.len() == 1 {
            return result.pop().unwrap_or_else(Expr::zero);
        }
        result.sort_by(crate::symbolic::utils::term_order);
        Expr::Add(result)
    }

    /// `coeff * rest` for a non-numeric canonical `rest`, without re-canonicalizing.
    fn with_coeff(coeff: Number, rest: Expr) -> Expr {
        if coeff.is_one() && !coeff.is_float() {
            return rest;
        }
        match rest {
            Expr::Mul(mut factors) => {
                factors.insert(0, Expr::Const(coeff));
                Expr::Mul(factors)
            }
            other => Expr::Mul(vec![Expr::Const(coeff), other]),
        }
    }

    //___________________________________CANONICAL PRODUCT___________________________________

    /// Canonical product of factors.
    pub fn product(factors: Vec<Expr>) -> Expr {
        Expr::product_pass(factors, 0)
    }

    fn product_pass(factors: Vec<Expr>, pass: usize) -> Expr {
        let mut flat = Vec::with_capacity(factors.len());
        for factor in factors {
            match factor {
                Expr::Mul(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        let mut coeff = Number::one();
        let mut infinity = false;
        // base -> [(exponent, original factor)]
        let mut groups: BTreeMap<Expr, Vec<(Expr, Expr)>> = BTreeMap::new();
        for factor in flat {
            match factor {
                Expr::NaN => return Expr::NaN,
                Expr::ComplexInfinity => infinity = true,
                Expr::Const(n) => coeff = coeff.mul(&n),
                other => {
                    let (base, exp) = other.as_base_exp();
                    groups.entry(base).or_default().push((exp, other));
                }
            }
        }
        if infinity {
            return if coeff.is_zero() {
                Expr::NaN
            } else {
                Expr::ComplexInfinity
            };
        }
        if coeff.is_zero() {
            return Expr::Const(coeff);
        }
        let mut rest: Vec<Expr> = Vec::new();
        let mut needs_pass = false;
        for (base, mut members) in groups {
            let merged = if members.len() == 1 {
                members.pop().map(|(_, original)| original).unwrap_or_else(Expr::one)
            } else {
                let exp = Expr::sum(members.into_iter().map(|(e, _)| e).collect());
                Expr::power(base, exp)
            };
            match merged {
                Expr::Const(n) => coeff = coeff.mul(&n),
                Expr::Mul(_) => {
                    needs_pass = true;
                    rest.push(merged);
                }
                Expr::NaN | Expr::ComplexInfinity => {
                    needs_pass = true;
                    rest.push(merged);
                }
                other => rest.push(other),
            }
        }
        if needs_pass && pass < MAX_PRODUCT_PASSES {
            rest.insert(0, Expr::Const(coeff));
            return Expr::product_pass(rest, pass + 1);
        }
        if coeff.is_zero() {
            return Expr::Const(coeff);
        }
        if rest.is_empty() {
            return Expr::Const(coeff);
        }
        let unit = coeff.is_one() && !coeff.is_float();
        if rest.len() == 1 {
            if unit {
                return rest.pop().unwrap_or_else(Expr::one);
            }
            if let Expr::Add(terms) = &rest[0] {
                // a bare number distributes over a single sum
                return Expr::sum(
                    terms
                        .iter()
                        .map(|t| Expr::product(vec![Expr::Const(coeff.clone()), t.clone()]))
                        .collect(),
                );
            }
        }
        rest.sort_by(crate::symbolic::utils::factor_order);
        if !unit {
            rest.insert(0, Expr::Const(coeff));
        }
        Expr::Mul(rest)
    }

    //___________________________________CANONICAL POWER___________________________________

    /// Canonical power `base ^ exp`.
    pub fn power(base: Expr, exp: Expr) -> Expr {
        if base == Expr::NaN || exp == Expr::NaN {
            return Expr::NaN;
        }
        if let Expr::Const(e) = &exp {
            if e.is_zero() {
                return Expr::one();
            }
            if e.is_one() && !e.is_float() {
                return base;
            }
        }
        let exp_sign = exp.as_number().map(|n| (n.is_positive(), n.is_negative()));
        match &base {
            Expr::Const(b) if b.is_one() && !b.is_float() => return Expr::one(),
            Expr::Const(b) if b.is_zero() => {
                return match exp_sign {
                    Some((true, _)) => Expr::Const(b.clone()),
                    Some((_, true)) => Expr::ComplexInfinity,
                    _ => Expr::Pow(base.boxed(), exp.boxed()),
                };
            }
            Expr::ComplexInfinity => {
                return match exp_sign {
                    Some((true, _)) => Expr::ComplexInfinity,
                    Some((_, true)) => Expr::zero(),
                    _ => Expr::NaN,
                };
            }
            Expr::E => return Expr::new_exp(exp),
            Expr::Exp(a) => return Expr::new_exp(Expr::product(vec![*a.clone(), exp])),
            _ => {}
        }
        if exp == Expr::ComplexInfinity {
            return Expr::NaN;
        }
        if let (Expr::Const(b), Expr::Const(e)) = (&base, &exp) {
            if let Some(value) = b.pow(e) {
                return Expr::Const(value);
            }
            if let (Number::Rational(br), Number::Rational(er)) = (b, e) {
                if let Some(root) = rational_root(br, er) {
                    return root;
                }
            }
            return Expr::Pow(base.boxed(), exp.boxed());
        }
        if exp.as_integer().is_some() {
            match &base {
                Expr::Pow(inner_base, inner_exp) => {
                    return Expr::power(
                        *inner_base.clone(),
                        Expr::product(vec![*inner_exp.clone(), exp]),
                    );
                }
                Expr::Mul(factors) => {
                    return Expr::product(
                        factors
                            .iter()
                            .map(|f| Expr::power(f.clone(), exp.clone()))
                            .collect(),
                    );
                }
                _ => {}
            }
        } else if let Some(e) = exp.as_rational() {
            match &base {
                Expr::Mul(factors) => {
                    if let Some(Expr::Const(Number::Rational(c))) = factors.first() {
                        if c.is_positive() {
                            let (coeff, rest) = base.as_coeff_rest();
                            return Expr::product(vec![
                                Expr::power(Expr::Const(coeff), exp.clone()),
                                Expr::power(rest, exp),
                            ]);
                        }
                    }
                }
                Expr::Pow(inner_base, inner_exp) => {
                    // (b^a)^e = b^(a*e) holds for -1 < a <= 1
                    if let Some(a) = inner_exp.as_rational() {
                        let one = BigRational::one();
                        if a > &-one.clone() && a <= &one && !e.is_integer() {
                            return Expr::power(
                                *inner_base.clone(),
                                Expr::product(vec![*inner_exp.clone(), exp]),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
        Expr::Pow(base.boxed(), exp.boxed())
    }

    //___________________________________ELEMENTARY FUNCTIONS___________________________________

    pub fn new_exp(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN | Expr::ComplexInfinity => Expr::NaN,
            Expr::Const(Number::Float(v, d)) => Expr::float(v.exp(), *d),
            Expr::Const(n) if n.is_zero() => Expr::one(),
            Expr::Const(n) if n.is_one() => Expr::E,
            Expr::Ln(inner) => *inner.clone(),
            Expr::Mul(factors) if factors.len() == 2 && factors[0].as_rational().is_some() => {
                if let Expr::Ln(inner) = &factors[1] {
                    // exp(k*log(x)) = x**k
                    Expr::power(*inner.clone(), factors[0].clone())
                } else {
                    Expr::Exp(arg.boxed())
                }
            }
            _ => Expr::Exp(arg.boxed()),
        }
    }

    pub fn new_ln(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN => Expr::NaN,
            Expr::ComplexInfinity => Expr::ComplexInfinity,
            Expr::Const(n) if n.is_zero() => Expr::ComplexInfinity,
            Expr::Const(Number::Float(v, d)) if *v > 0.0 => Expr::float(v.ln(), *d),
            Expr::Const(n) if n.is_one() => Expr::zero(),
            Expr::Const(Number::Rational(r)) if r.is_positive() && r.numer().is_one() => {
                // log(1/q) = -log(q)
                -Expr::new_ln(Expr::Const(Number::from_bigint(r.denom().clone())))
            }
            Expr::E => Expr::one(),
            Expr::Exp(inner) if inner.is_number() => *inner.clone(),
            _ => Expr::Ln(arg.boxed()),
        }
    }

    pub fn new_sin(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN | Expr::ComplexInfinity => return Expr::NaN,
            Expr::Const(Number::Float(v, d)) => return Expr::float(v.sin(), *d),
            _ => {}
        }
        if let Some(k) = arg.pi_coefficient() {
            if let Some(value) = sin_of_pi_multiple(&k) {
                return value;
            }
        }
        if arg.could_extract_minus_sign() {
            return -Expr::new_sin(-arg);
        }
        Expr::sin(arg.boxed())
    }

    pub fn new_cos(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN | Expr::ComplexInfinity => return Expr::NaN,
            Expr::Const(Number::Float(v, d)) => return Expr::float(v.cos(), *d),
            _ => {}
        }
        if let Some(k) = arg.pi_coefficient() {
            // cos(k*pi) = sin((k + 1/2)*pi)
            let shifted = k + BigRational::new(BigInt::one(), BigInt::from(2));
            if let Some(value) = sin_of_pi_multiple(&shifted) {
                return value;
            }
        }
        if arg.could_extract_minus_sign() {
            return Expr::new_cos(-arg);
        }
        Expr::cos(arg.boxed())
    }

    pub fn new_tan(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN | Expr::ComplexInfinity => return Expr::NaN,
            Expr::Const(Number::Float(v, d)) => return Expr::float(v.tan(), *d),
            _ => {}
        }
        if let Some(k) = arg.pi_coefficient() {
            let half = BigRational::new(BigInt::one(), BigInt::from(2));
            if let (Some(s), Some(c)) = (
                sin_of_pi_multiple(&k),
                sin_of_pi_multiple(&(k.clone() + half)),
            ) {
                if c.is_zero() {
                    return Expr::ComplexInfinity;
                }
                return s / c;
            }
        }
        if arg.could_extract_minus_sign() {
            return -Expr::new_tan(-arg);
        }
        Expr::tg(arg.boxed())
    }

    pub fn new_abs(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN => Expr::NaN,
            Expr::ComplexInfinity => Expr::ComplexInfinity,
            Expr::Const(n) => Expr::Const(n.abs()),
            Expr::Pi | Expr::E | Expr::Abs(_) => arg,
            Expr::Exp(inner) if inner.is_number() => arg,
            Expr::Mul(factors) if factors[0].is_number() => {
                let (coeff, rest) = arg.as_coeff_rest();
                Expr::product(vec![Expr::Const(coeff.abs()), Expr::new_abs(rest)])
            }
            _ => Expr::Abs(arg.boxed()),
        }
    }

    pub fn new_factorial(arg: Expr) -> Expr {
        match &arg {
            Expr::NaN => Expr::NaN,
            Expr::Const(Number::Float(v, d)) if *v >= 0.0 && v.fract() == 0.0 && *v <= 170.0 => {
                let value = (2..=(*v as u32)).fold(1.0_f64, |acc, k| acc * k as f64);
                Expr::float(value, *d)
            }
            Expr::Const(n) => match n.factorial() {
                Some(value) => Expr::Const(value),
                None if n.is_integer() && n.is_negative() => Expr::ComplexInfinity,
                None => Expr::Factorial(arg.boxed()),
            },
            _ => Expr::Factorial(arg.boxed()),
        }
    }

    /// Undefined function application f(args).
    pub fn new_func(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Func(name.to_string(), args)
    }
}

/// Exact value of sin(k*pi) for k with denominator 1, 2, 3, 4 or 6.
fn sin_of_pi_multiple(k: &BigRational) -> Option<Expr> {
    let two = BigRational::from_integer(BigInt::from(2));
    let one = BigRational::one();
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    // reduce to [0, 2)
    let r = k - &two * (k / &two).floor();
    let (r, negative) = if r >= one { (r - &one, true) } else { (r, false) };
    let r = if r > half { &one - r } else { r };
    let denom = r.denom().to_u32()?;
    let numer = r.numer().to_u32()?;
    let value = match (numer, denom) {
        (0, _) => Expr::zero(),
        (1, 6) => Expr::half(),
        (1, 4) => Expr::num(2).sqrt() / Expr::num(2),
        (1, 3) => Expr::num(3).sqrt() / Expr::num(2),
        (1, 2) => Expr::one(),
        _ => return None,
    };
    Some(if negative { -value } else { value })
}

/// Exact power of a positive rational to a non-integer rational exponent:
/// `b^(p/q) = b^k * (n^r * d^(q-r))^(1/q) / d` with the perfect q-th powers pulled out.
fn rational_root(base: &BigRational, exp: &BigRational) -> Option<Expr> {
    if !base.is_positive() || exp.is_integer() {
        return None;
    }
    let q = exp.denom().to_u32()?;
    if q > MAX_ROOT_EXPONENT {
        return None;
    }
    let p = exp.numer();
    let k = p.div_floor(exp.denom());
    let r = (p - &k * exp.denom()).to_u32()?;
    let whole = Number::Rational(base.clone()).pow(&Number::from_bigint(k))?;
    let n = base.numer();
    let d = base.denom();
    let radicand_bits = n.bits() * u64::from(r) + d.bits() * u64::from(q - r);
    if radicand_bits > MAX_EXACT_BITS {
        return None;
    }
    let m = n.pow(r) * d.pow(q - r);
    let (outside, inside) = extract_root(&m, q);
    let coeff = whole.mul(&Number::Rational(BigRational::new(outside, d.clone())));
    if inside.is_one() {
        return Some(Expr::Const(coeff));
    }
    let root = Expr::Pow(
        Expr::Const(Number::from_bigint(inside)).boxed(),
        Expr::Const(Number::Rational(BigRational::new(BigInt::one(), BigInt::from(q)))).boxed(),
    );
    Some(Expr::product(vec![Expr::Const(coeff), root]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    fn y() -> Expr {
        Expr::var("y")
    }

    #[test]
    fn test_collect_like_terms() {
        let expr = x() + Expr::num(2) * x();
        assert_eq!(expr, Expr::num(3) * x());
        let zero = x() - x();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_numbers_are_added_exactly() {
        let expr = Expr::rational(1, 3) + Expr::rational(1, 6);
        assert_eq!(expr, Expr::rational(1, 2));
    }

    #[test]
    fn test_merge_powers() {
        let expr = x() * x().pow(Expr::num(2));
        assert_eq!(expr, x().pow(Expr::num(3)));
        let cancelled = x() / x();
        assert!(cancelled.is_one());
    }

    #[test]
    fn test_exp_merging() {
        let expr = x().exp() * (-x()).exp();
        assert!(expr.is_one());
        let expr = Expr::E.pow(x());
        assert_eq!(expr, Expr::Exp(x().boxed()));
    }

    #[test]
    fn test_distribute_number_over_sum() {
        let expr = -(x() - Expr::one());
        assert_eq!(expr, Expr::one() - x());
    }

    #[test]
    fn test_zero_factor() {
        assert!((Expr::zero() * x()).is_zero());
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Expr::one() / Expr::zero(), Expr::ComplexInfinity);
        assert_eq!(Expr::zero() / Expr::zero(), Expr::NaN);
    }

    #[test]
    fn test_roots() {
        let root = Expr::num(8).sqrt();
        assert_eq!(root, Expr::num(2) * Expr::num(2).sqrt());
        assert_eq!(Expr::num(4).sqrt(), Expr::num(2));
        let inverse = Expr::one() / Expr::num(2).sqrt();
        assert_eq!(inverse, Expr::num(2).sqrt() / Expr::num(2));
    }

    #[test]
    fn test_power_of_product() {
        let expr = (Expr::num(2) * x() * y()).pow(Expr::num(2));
        assert_eq!(
            expr,
            Expr::num(4) * x().pow(Expr::num(2)) * y().pow(Expr::num(2))
        );
    }

    #[test]
    fn test_special_values() {
        assert!(Expr::new_exp(Expr::zero()).is_one());
        assert_eq!(Expr::new_exp(Expr::one()), Expr::E);
        assert!(Expr::new_ln(Expr::one()).is_zero());
        assert!(Expr::new_ln(Expr::E).is_one());
        assert_eq!(Expr::new_ln(Expr::zero()), Expr::ComplexInfinity);
        assert_eq!(Expr::new_exp(Expr::new_ln(x())), x());
    }

    #[test]
    fn test_trig_values() {
        assert!(Expr::new_sin(Expr::Pi).is_zero());
        assert_eq!(Expr::new_cos(Expr::Pi), Expr::minus_one());
        assert_eq!(Expr::new_sin(Expr::Pi / Expr::num(6)), Expr::half());
        assert!(Expr::new_cos(Expr::Pi / Expr::num(2)).is_zero());
        assert_eq!(Expr::new_tan(Expr::Pi / Expr::num(4)), Expr::one());
        assert_eq!(Expr::new_tan(Expr::Pi / Expr::num(2)), Expr::ComplexInfinity);
    }

    #[test]
    fn test_sign_extraction() {
        assert_eq!(Expr::new_sin(-x()), -Expr::new_sin(x()));
        assert_eq!(Expr::new_cos(-x()), Expr::new_cos(x()));
        assert_eq!(Expr::new_abs(-Expr::num(2) * x()), Expr::num(2) * Expr::new_abs(x()));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(Expr::new_factorial(Expr::num(5)), Expr::num(120));
        assert_eq!(Expr::new_factorial(Expr::num(-1)), Expr::ComplexInfinity);
        assert_eq!(Expr::new_factorial(x()), Expr::Factorial(x().boxed()));
    }

    #[test]
    fn test_free_symbols() {
        let expr = x() * y() + Expr::new_sin(x());
        let symbols: Vec<String> = expr.free_symbols().into_iter().collect();
        assert_eq!(symbols, vec!["x".to_string(), "y".to_string()]);
        assert!(Expr::Pi.free_symbols().is_empty());
    }

    #[test]
    fn test_substitute() {
        let expr = x().pow(Expr::num(2)) + y();
        let result = expr.substitute("x", &Expr::num(3));
        assert_eq!(result, y() + Expr::num(9));
    }

    #[test]
    fn test_symbols() {
        let vars = Expr::Symbols("x, y, z");
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[2], Expr::var("z"));
    }
}
