//! Notation Normalizer: rewrites accepted shorthand into the grammar's own syntax.
//!
//! - `{` `}` become `(` `)` (exponents copied from typeset math: `e^{-5t}`)
//! - the unicode minus sign U+2212 becomes `-`
//! - `ln(` becomes `log(` when `ln` is a standalone word
//!
//! None of the rewrites can produce a blocked token, so the result is not validated again.

use regex::Regex;
use std::sync::LazyLock;

static NATURAL_LOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bln\s*\(").expect("natural log pattern is valid"));

pub fn normalize(expression: &str) -> String {
    let normalized = expression
        .replace('{', "(")
        .replace('}', ")")
        .replace('\u{2212}', "-");
    NATURAL_LOG.replace_all(&normalized, "log(").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braces() {
        assert_eq!(normalize("e^{-5t}"), "e^(-5t)");
    }

    #[test]
    fn test_unicode_minus() {
        assert_eq!(normalize("2\u{2212}1"), "2-1");
    }

    #[test]
    fn test_natural_log() {
        assert_eq!(normalize("ln(x)"), "log(x)");
        assert_eq!(normalize("2*ln (x) + ln(y)"), "2*log(x) + log(y)");
        assert_eq!(normalize("t ln{t}"), "t log(t)");
    }

    #[test]
    fn test_ln_inside_identifiers_is_kept() {
        assert_eq!(normalize("kiln(x)"), "kiln(x)");
        assert_eq!(normalize("x_ln(x)"), "x_ln(x)");
        assert_eq!(normalize("lnx"), "lnx");
    }
}
