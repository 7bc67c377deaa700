//! # Expression Pipeline
//!
//! `evaluate(expression, relaxed)`: validate -> normalize -> parse with the transform set of
//! the chosen mode -> interpret in the restricted context -> simplify.
//!
//! Lists and mappings (solution sets) come back as they are; expressions and both sides of
//! equations are simplified. A `Calculator` carries the per-session options; the free
//! function `evaluate` uses the defaults.
//!
//! # Example
//! ```rust, ignore
//! let value = evaluate("d(x^3 + 2*x)", false).unwrap();
//! assert_eq!(value.to_string(), "3*x**2 + 2");
//! ```

use crate::Utils::settings::CalcSettings;
use crate::calc::calc_errors::CalcError;
use crate::calc::context::{EvaluationContext, TransformSet};
use crate::calc::interpreter::{Interpreter, Value, check_digits};
use crate::calc::normalizer::normalize;
use crate::calc::validator::validate;
use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::DEFAULT_DIGITS;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calculator {
    relaxed: bool,
    precision: u32,
}

impl Default for Calculator {
    fn default() -> Self {
        Calculator {
            relaxed: false,
            precision: DEFAULT_DIGITS,
        }
    }
}

impl Calculator {
    pub fn new(relaxed: bool) -> Self {
        Calculator {
            relaxed,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &CalcSettings) -> Result<Self, CalcError> {
        Calculator::new(settings.relaxed).set_precision(settings.precision)
    }

    pub fn set_relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    /// default digit count of `N(expr)`, from 1 to 15
    pub fn set_precision(mut self, digits: u32) -> Result<Self, CalcError> {
        self.precision = check_digits(digits)?;
        Ok(self)
    }

    pub fn is_relaxed(&self) -> bool {
        self.relaxed
    }

    pub fn evaluate(&self, expression: &str) -> Result<Value, CalcError> {
        validate(expression)?;
        let normalized = normalize(expression);
        debug!("normalized: {}", normalized);
        let transforms = TransformSet::for_mode(self.relaxed);
        let tree = parse_expression_func(&normalized, &transforms.parse_options())
            .map_err(CalcError::Parse)?;
        debug!("parsed with {:?}", transforms.transforms());
        let value = Interpreter::new(EvaluationContext::shared(), transforms)
            .with_precision(self.precision)?
            .eval(&tree)?;
        if value.is_collection() {
            return Ok(value);
        }
        let simplified = value.map_exprs(&|e: &Expr| e.simplify());
        debug!("result: {}", simplified);
        Ok(simplified)
    }
}

/// Evaluates one line of input with default options.
pub fn evaluate(expression: &str, relaxed: bool) -> Result<Value, CalcError> {
    Calculator::new(relaxed).evaluate(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_run_in_order() {
        // rejected by the validator before normalization could touch it
        assert_eq!(evaluate("{__}", false), Err(CalcError::BlockedToken));
        // normalized before parsing: braces would be a syntax error
        assert_eq!(evaluate("2^{3}", false).unwrap().to_string(), "8");
        assert!(matches!(evaluate("2x", false), Err(CalcError::Parse(_))));
        assert_eq!(evaluate("2x", true).unwrap().to_string(), "2*x");
    }

    #[test]
    fn test_collections_are_not_simplified() {
        let value = evaluate("[sin(x)**2 + cos(x)**2, 1]", false).unwrap();
        assert_eq!(value.to_string(), "[sin(x)**2 + cos(x)**2, 1]");
        let value = evaluate("sin(x)**2 + cos(x)**2", false).unwrap();
        assert_eq!(value.to_string(), "1");
    }

    #[test]
    fn test_precision_setting() {
        let calculator = Calculator::default().set_precision(5).unwrap();
        assert_eq!(calculator.evaluate("N(pi)").unwrap().to_string(), "3.1416");
        assert_eq!(calculator.evaluate("N(pi, 3)").unwrap().to_string(), "3.14");
        assert_eq!(
            Calculator::new(false).set_precision(40).unwrap_err(),
            CalcError::Precision { got: 40, max: 15 }
        );
        assert!(Calculator::new(false).set_precision(0).is_err());
        let calculator = Calculator::new(false).set_precision(15).unwrap();
        assert_eq!(
            calculator.evaluate("N(1/3)").unwrap().to_string(),
            "0.333333333333333"
        );
        assert_eq!(
            calculator.evaluate("N(1/3, 40)").unwrap_err().to_string(),
            "precision of 40 digits is not supported (1 to 15)"
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = CalcSettings::default().set_relaxed(true);
        let calculator = Calculator::from_settings(&settings).unwrap();
        assert!(calculator.is_relaxed());
        assert_eq!(calculator.evaluate("3t").unwrap().to_string(), "3*t");
    }
}
