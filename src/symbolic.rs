#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a syntax tree
///
///# Example
/// ```rust, ignore
/// use RustedCalc::symbolic::parse_expr::{parse_expression_func, ParseOptions};
/// let tree = parse_expression_func("x^2 + 3!", &ParseOptions::default()).unwrap();
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
/// exact rationals and fixed-precision floats
pub mod symbolic_numbers;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// canonical expression tree: constructors evaluate exact arithmetic, collect like terms and merge powers
///# Example#
/// ```rust, ignore
/// use RustedCalc::symbolic::symbolic_engine::Expr;
/// let x = Expr::var("x");
/// let expr = x.clone() * x.clone().pow(Expr::num(2)) + Expr::num(2) * x;
/// assert_eq!(expr.to_string(), "x**3 + 2*x");
/// // differentiate with respect to x
/// let df_dx = expr.diff("x");
/// assert_eq!(df_dx.to_string(), "3*x**2 + 2");
/// // integrate back
/// let f = df_dx.integrate("x").unwrap();
/// assert_eq!(f.to_string(), "x**3 + 2*x");
/// ```
pub mod symbolic_engine;
/// symbolic differentiation
pub mod symbolic_engine_derivatives;
#[cfg(test)]
mod symbolic_engine_tests;
pub mod symbolic_print;
/// expand, trigsimp and simplify
pub mod symbolic_simplify;
/// rule-based indefinite integration
pub mod symbolic_integration;
/// roots of polynomial and exponential equations, linear systems
pub mod symbolic_solve;
/// linear ODEs of first order and constant coefficient second order
pub mod symbolic_dsolve;
pub mod symbolic_evalf;
/// term and factor ordering, polynomial coefficients
pub mod utils;
