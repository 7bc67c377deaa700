//! Text rendering of expressions.
//!
//! The output is meant to be read back by the calculator: `**` for powers, `sqrt(x)` for
//! square roots, `log` for the natural logarithm, rational coefficients printed as
//! fractions (`3*x**2/2`), negative powers moved into a denominator (`x/(2*y)`) and
//! negative terms of sums written with a binary minus (`x**2 - 4`).

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::Number;
use num_traits::One;
use std::fmt;

const PREC_ADD: u8 = 10;
const PREC_NEG: u8 = 15;
const PREC_MUL: u8 = 20;
const PREC_POW: u8 = 30;
const PREC_ATOM: u8 = 100;

fn is_half(exp: &Expr) -> bool {
    *exp == Expr::half()
}

fn is_minus_half(exp: &Expr) -> bool {
    *exp == Expr::rational(-1, 2)
}

/// Binding strength of the printed form of an expression.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_) => PREC_ADD,
        Expr::Mul(_) => PREC_MUL,
        Expr::Pow(_, exp) => {
            if is_half(exp) {
                PREC_ATOM
            } else if exp.as_number().is_some_and(|n| n.is_negative() && !n.is_float()) {
                PREC_MUL
            } else {
                PREC_POW
            }
        }
        Expr::Const(n) => {
            if n.is_negative() {
                PREC_NEG
            } else if matches!(n, Number::Rational(r) if !r.is_integer()) {
                PREC_MUL
            } else {
                PREC_ATOM
            }
        }
        _ => PREC_ATOM,
    }
}

/// Prints `expr`, wrapped in parentheses when it binds weaker than `level`.
fn parenthesize(expr: &Expr, level: u8) -> String {
    if precedence(expr) < level {
        format!("({})", expr)
    } else {
        expr.to_string()
    }
}

fn join_args(args: &[Expr]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
}

fn fmt_pow(f: &mut fmt::Formatter, base: &Expr, exp: &Expr) -> fmt::Result {
    if is_half(exp) {
        return write!(f, "sqrt({})", base);
    }
    if is_minus_half(exp) {
        return write!(f, "1/sqrt({})", base);
    }
    if *exp == Expr::minus_one() {
        return write!(f, "1/{}", parenthesize(base, PREC_POW + 1));
    }
    write!(
        f,
        "{}**{}",
        parenthesize(base, PREC_POW + 1),
        parenthesize(exp, PREC_ATOM)
    )
}

fn fmt_mul(f: &mut fmt::Formatter, factors: &[Expr]) -> fmt::Result {
    let (coeff, rest) = match factors.first() {
        Some(Expr::Const(n)) => (n.clone(), &factors[1..]),
        _ => (Number::one(), factors),
    };
    let sign = if coeff.is_negative() { "-" } else { "" };
    let coeff = coeff.abs();
    let mut numer: Vec<String> = Vec::new();
    let mut denom: Vec<String> = Vec::new();
    match &coeff {
        Number::Rational(r) => {
            if !r.numer().is_one() {
                numer.push(r.numer().to_string());
            }
            if !r.denom().is_one() {
                denom.push(r.denom().to_string());
            }
        }
        Number::Float(..) => {
            if !coeff.is_one() {
                numer.push(coeff.to_string());
            }
        }
    }
    // factors with a negative exact exponent go to the denominator
    let mut denom_factors: Vec<Expr> = Vec::new();
    for factor in rest {
        match factor {
            Expr::Pow(base, exp)
                if exp
                    .as_number()
                    .is_some_and(|n| n.is_negative() && !n.is_float()) =>
            {
                denom_factors.push(Expr::power(*base.clone(), -*exp.clone()));
            }
            other => numer.push(parenthesize(other, PREC_MUL)),
        }
    }
    for factor in &denom_factors {
        denom.push(parenthesize(factor, PREC_MUL));
    }
    let numer = if numer.is_empty() {
        "1".to_string()
    } else {
        numer.join("*")
    };
    match denom.len() {
        0 => write!(f, "{}{}", sign, numer),
        1 => {
            let single = if denom_factors.len() == 1 {
                parenthesize(&denom_factors[0], PREC_MUL + 1)
            } else {
                denom[0].clone()
            };
            write!(f, "{}{}/{}", sign, numer, single)
        }
        _ => write!(f, "{}{}/({})", sign, numer, denom.join("*")),
    }
}

fn fmt_add(f: &mut fmt::Formatter, terms: &[Expr]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        let negative = term.could_extract_minus_sign();
        if i == 0 {
            write!(f, "{}", term)?;
        } else if negative {
            write!(f, " - {}", -term.clone())?;
        } else {
            write!(f, " + {}", term)?;
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(n) => write!(f, "{}", n),
            Expr::Pi => write!(f, "pi"),
            Expr::E => write!(f, "E"),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Add(terms) => fmt_add(f, terms),
            Expr::Mul(factors) => fmt_mul(f, factors),
            Expr::Pow(base, exp) => fmt_pow(f, base, exp),
            Expr::Exp(a) => write!(f, "exp({})", a),
            Expr::Ln(a) => write!(f, "log({})", a),
            Expr::sin(a) => write!(f, "sin({})", a),
            Expr::cos(a) => write!(f, "cos({})", a),
            Expr::tg(a) => write!(f, "tan({})", a),
            Expr::Abs(a) => write!(f, "Abs({})", a),
            Expr::Factorial(a) => write!(f, "factorial({})", a),
            Expr::Func(name, args) => write!(f, "{}({})", name, join_args(args)),
            Expr::Derivative(a, var, order) => {
                if *order == 1 {
                    write!(f, "Derivative({}, {})", a, var)
                } else {
                    write!(f, "Derivative({}, ({}, {}))", a, var, order)
                }
            }
            Expr::Integral(a, var) => write!(f, "Integral({}, {})", a, var),
            Expr::ComplexInfinity => write!(f, "zoo"),
            Expr::NaN => write!(f, "nan"),
        }
    }
}
