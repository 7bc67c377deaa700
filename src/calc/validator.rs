//! Input Validator: rejects raw input before anything else looks at it.

use crate::calc::calc_errors::CalcError;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

/// Longest accepted input, in characters.
pub const MAX_EXPRESSION_CHARS: usize = 2000;

/// double underscore, statement separator and line breaks
static BLOCKED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(__|;|\n|\r)").expect("blocked-token pattern is valid"));

/// Checks emptiness, length and blocked tokens, in this order, on the raw input.
pub fn validate(expression: &str) -> Result<(), CalcError> {
    if expression.trim().is_empty() {
        return Err(CalcError::EmptyInput);
    }
    let length = expression.chars().count();
    if length > MAX_EXPRESSION_CHARS {
        warn!("rejected input of {} chars", length);
        return Err(CalcError::TooLong {
            max: MAX_EXPRESSION_CHARS,
        });
    }
    if BLOCKED_PATTERN.is_match(expression) {
        warn!("rejected input with a blocked token");
        return Err(CalcError::BlockedToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_input() {
        assert!(validate("x^2 + 1").is_ok());
        assert!(validate("  d(x_1)  ").is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate(""), Err(CalcError::EmptyInput));
        assert_eq!(validate(" \t "), Err(CalcError::EmptyInput));
        // whitespace-only input containing a line break is empty first
        assert_eq!(validate("\n"), Err(CalcError::EmptyInput));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "x".repeat(MAX_EXPRESSION_CHARS);
        assert!(validate(&at_limit).is_ok());
        let over = "x".repeat(MAX_EXPRESSION_CHARS + 1);
        assert_eq!(
            validate(&over),
            Err(CalcError::TooLong {
                max: MAX_EXPRESSION_CHARS
            })
        );
        // multi-byte characters count once
        let minus = "\u{2212}".repeat(MAX_EXPRESSION_CHARS);
        assert!(validate(&minus).is_ok());
    }

    #[test]
    fn test_blocked_tokens() {
        for input in ["x.__class__", "1+2;3", "1+2\n3", "1\r+2", "__import__('os')"] {
            assert_eq!(validate(input), Err(CalcError::BlockedToken), "{}", input);
        }
        // a single underscore is fine
        assert!(validate("x_1 + y_2").is_ok());
    }
}
