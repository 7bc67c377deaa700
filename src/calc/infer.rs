//! Variable Inferencer for calculus operators called without an explicit variable.

use crate::calc::calc_errors::CalcError;
use crate::symbolic::symbolic_engine::Expr;

/// The single free symbol of `expr`.
///
/// Free symbols are collected into a set ordered by name, so the outcome never depends
/// on where the symbols occur in the expression.
///
/// # Errors
/// `NoVariable` for constant expressions and `AmbiguousVariable` when two or more symbols
/// are free; both messages name `op_name` (e.g. `d(expr)`).
pub fn infer_variable(expr: &Expr, op_name: &str) -> Result<String, CalcError> {
    let mut symbols = expr.free_symbols().into_iter();
    match (symbols.next(), symbols.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(CalcError::NoVariable {
            op: op_name.to_string(),
        }),
        (Some(_), Some(_)) => Err(CalcError::AmbiguousVariable {
            op: op_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_symbol() {
        let expr = Expr::var("t").pow(Expr::num(2)) + Expr::new_sin(Expr::var("t"));
        assert_eq!(infer_variable(&expr, "d(expr)").unwrap(), "t");
    }

    #[test]
    fn test_no_symbol() {
        let err = infer_variable(&Expr::num(42), "d(expr)").unwrap_err();
        assert_eq!(err.to_string(), "d(expr) requires a variable (no symbols found)");
        // pi is a constant, not a symbol
        assert!(infer_variable(&Expr::Pi, "int(expr)").is_err());
    }

    #[test]
    fn test_ambiguous() {
        let expr = Expr::var("x") * Expr::var("y");
        let err = infer_variable(&expr, "int(expr)").unwrap_err();
        assert_eq!(err.to_string(), "ambiguous variable for int(expr); pass one explicitly");
    }

    #[test]
    fn test_bound_integration_variable_is_not_free() {
        let integral = Expr::Integral(
            Expr::new_func("f", vec![Expr::var("x")]).boxed(),
            "x".to_string(),
        );
        let expr = integral * Expr::var("y");
        assert_eq!(infer_variable(&expr, "d(expr)").unwrap(), "y");
    }
}
