//! # Numbers of the symbolic engine
//!
//! Two kinds of numbers live inside `Expr::Const`:
//! - exact rationals (`BigRational`), produced by integer literals and every
//!   operation between exact numbers, so `1/3 + 1/6` stays `1/2`;
//! - floats tagged with a number of significant digits, produced by decimal
//!   literals and by numeric evaluation `N(expr, digits)`.
//!
//! Mixing a float into an operation makes the result a float; the digit count
//! of the result is the smallest digit count among the float operands.

use num::{BigInt, BigRational};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// default number of significant digits of a float
pub const DEFAULT_DIGITS: u32 = 15;
/// the engine evaluates floats with f64, more digits than this are meaningless
pub const MAX_DIGITS: u32 = 15;
/// largest integer exponent evaluated exactly, bigger powers stay symbolic
const MAX_EXACT_EXPONENT: u32 = 10_000;
/// size limit in bits of an exactly evaluated power, bigger powers stay symbolic
pub const MAX_EXACT_BITS: u64 = 1 << 20;
/// largest argument of an exact factorial
const MAX_EXACT_FACTORIAL: u32 = 5_000;
/// trial division bound for perfect power extraction in roots
const ROOT_TRIAL_DIVISION_BOUND: u32 = 10_000;

#[derive(Clone, Debug)]
pub enum Number {
    /// exact rational number
    Rational(BigRational),
    /// float value with its number of significant digits
    Float(f64, u32),
}

impl Number {
    pub fn int(value: i64) -> Number {
        Number::Rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_bigint(value: BigInt) -> Number {
        Number::Rational(BigRational::from_integer(value))
    }

    /// exact p/q, None when q is zero
    pub fn rational(p: i64, q: i64) -> Option<Number> {
        if q == 0 {
            return None;
        }
        Some(Number::Rational(BigRational::new(
            BigInt::from(p),
            BigInt::from(q),
        )))
    }

    pub fn float(value: f64, digits: u32) -> Number {
        Number::Float(value, digits.clamp(1, MAX_DIGITS))
    }

    pub fn zero() -> Number {
        Number::Rational(BigRational::zero())
    }

    pub fn one() -> Number {
        Number::Rational(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Float(v, _) => *v == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_one(),
            Number::Float(v, _) => *v == 1.0,
        }
    }

    /// only exact -1, used by the printer to drop unit coefficients
    pub fn is_minus_one(&self) -> bool {
        match self {
            Number::Rational(r) => *r == -BigRational::one(),
            Number::Float(..) => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_negative(),
            Number::Float(v, _) => *v < 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_positive(),
            Number::Float(v, _) => *v > 0.0,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(..))
    }

    /// exact integer (floats never count as integers)
    pub fn is_integer(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_integer(),
            Number::Float(..) => false,
        }
    }

    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            Number::Rational(r) if r.is_integer() => Some(r.to_integer()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|i| i.to_i64())
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Number::Rational(r) => Some(r),
            Number::Float(..) => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Rational(r) => r.to_f64().unwrap_or(f64::NAN),
            Number::Float(v, _) => *v,
        }
    }

    fn digits(&self) -> Option<u32> {
        match self {
            Number::Rational(_) => None,
            Number::Float(_, d) => Some(*d),
        }
    }

    /// digit count of the result of a binary operation on self and other
    fn result_digits(&self, other: &Number) -> u32 {
        match (self.digits(), other.digits()) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => DEFAULT_DIGITS,
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(r.abs()),
            Number::Float(v, d) => Number::Float(v.abs(), *d),
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(-r),
            Number::Float(v, d) => Number::Float(-v, *d),
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b),
            _ => Number::Float(self.to_f64() + other.to_f64(), self.result_digits(other)),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b),
            _ => Number::Float(self.to_f64() * other.to_f64(), self.result_digits(other)),
        }
    }

    /// None on division by an exact zero
    pub fn div(&self, other: &Number) -> Option<Number> {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => {
                if b.is_zero() {
                    None
                } else {
                    Some(Number::Rational(a / b))
                }
            }
            _ => Some(Number::Float(
                self.to_f64() / other.to_f64(),
                self.result_digits(other),
            )),
        }
    }

    /// reciprocal, None for an exact zero
    pub fn recip(&self) -> Option<Number> {
        Number::one().div(self)
    }

    /// Power with a number exponent when the result is again a number.
    ///
    /// Exact base with an integer exponent gives an exact result, floats give
    /// floats. Returns None when the power has to stay symbolic (fractional
    /// exponent of an exact number, zero to a negative power, huge exponents
    /// or a negative float base with a fractional exponent).
    pub fn pow(&self, exp: &Number) -> Option<Number> {
        match (self, exp) {
            (Number::Rational(base), Number::Rational(e)) => {
                if !e.is_integer() {
                    return None;
                }
                let e = e.to_integer();
                let magnitude = e.abs().to_u32()?;
                if magnitude > MAX_EXACT_EXPONENT {
                    return None;
                }
                if base.is_zero() && e.is_negative() {
                    return None;
                }
                let bits = base.numer().bits().max(base.denom().bits());
                if bits.saturating_mul(u64::from(magnitude)) > MAX_EXACT_BITS {
                    return None;
                }
                let numer = base.numer().pow(magnitude);
                let denom = base.denom().pow(magnitude);
                let result = BigRational::new(numer, denom);
                if e.is_negative() {
                    Some(Number::Rational(result.recip()))
                } else {
                    Some(Number::Rational(result))
                }
            }
            _ => {
                let b = self.to_f64();
                let e = exp.to_f64();
                if b < 0.0 && e.fract() != 0.0 {
                    return None;
                }
                if b == 0.0 && e < 0.0 {
                    return None;
                }
                Some(Number::Float(b.powf(e), self.result_digits(exp)))
            }
        }
    }

    /// Exact factorial of a non-negative integer, None otherwise.
    pub fn factorial(&self) -> Option<Number> {
        let n = self.as_integer()?;
        if n.is_negative() {
            return None;
        }
        let n = n.to_u32()?;
        if n > MAX_EXACT_FACTORIAL {
            return None;
        }
        let mut acc = BigInt::one();
        for k in 2..=n {
            acc *= BigInt::from(k);
        }
        Some(Number::from_bigint(acc))
    }

    /// Converts a float into the exact rational with the same binary value.
    pub fn to_exact(&self) -> Option<Number> {
        match self {
            Number::Rational(_) => Some(self.clone()),
            Number::Float(v, _) => BigRational::from_float(*v).map(Number::Rational),
        }
    }
}

/// Splits a positive integer into `outside^q * inside` pulling out as many
/// perfect q-th powers as trial division finds, e.g. (8, 2) -> (2, 2).
pub fn extract_root(n: &BigInt, q: u32) -> (BigInt, BigInt) {
    let mut outside = BigInt::one();
    let mut inside = n.clone();
    if inside <= BigInt::one() || q < 2 {
        return (outside, inside);
    }
    let exact = inside.nth_root(q);
    if exact.pow(q) == inside {
        return (exact, BigInt::one());
    }
    let mut p: u32 = 2;
    while p <= ROOT_TRIAL_DIVISION_BOUND {
        let prime = BigInt::from(p);
        let prime_q = prime.pow(q);
        if prime_q > inside {
            break;
        }
        while (&inside % &prime_q).is_zero() {
            inside /= &prime_q;
            outside *= &prime;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    let rest = inside.nth_root(q);
    if rest.pow(q) == inside {
        outside *= rest;
        inside = BigInt::one();
    }
    (outside, inside)
}

/// Formats a float with exactly `digits` significant digits, using fixed
/// notation inside the window (min(-digits/3, -5), digits) of decimal
/// exponents and `d.ddde+NN` outside of it.
pub fn format_float(value: f64, digits: u32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "oo".to_string() } else { "-oo".to_string() };
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    let digits = digits.clamp(1, MAX_DIGITS) as usize;
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let min_fixed = (-(digits as i32) / 3).min(-5);
    let max_fixed = digits as i32;
    if exponent <= min_fixed || exponent >= max_fixed {
        let exp_sign = if exponent < 0 { "-" } else { "+" };
        return format!("{}{}e{}{}", sign, mantissa, exp_sign, exponent.abs());
    }
    let significant: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        format!("{}0.{}{}", sign, zeros, significant)
    } else {
        let split = (exponent + 1) as usize;
        let (int_part, frac_part) = significant.split_at(split.min(significant.len()));
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Number::Float(v, d) => write!(f, "{}", format_float(*v, *d)),
        }
    }
}

// Numbers are ordered by value; on equal values exact numbers come before
// floats so that the order stays total and consistent with equality.
impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a.cmp(b),
            (Number::Float(a, da), Number::Float(b, db)) => a.total_cmp(b).then(da.cmp(db)),
            (Number::Rational(_), Number::Float(..)) => self
                .to_f64()
                .total_cmp(&other.to_f64())
                .then(Ordering::Less),
            (Number::Float(..), Number::Rational(_)) => self
                .to_f64()
                .total_cmp(&other.to_f64())
                .then(Ordering::Greater),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}
