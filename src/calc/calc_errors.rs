use thiserror::Error;

/// Everything that can go wrong while evaluating one line of input.
/// Each error is scoped to a single `evaluate` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    EmptyInput,
    #[error("expression too long (max {max} chars)")]
    TooLong { max: usize },
    /// the offending token is deliberately not reported
    #[error("blocked token in expression")]
    BlockedToken,
    #[error("{op} requires a variable (no symbols found)")]
    NoVariable { op: String },
    #[error("ambiguous variable for {op}; pass one explicitly")]
    AmbiguousVariable { op: String },
    #[error("invalid syntax: {0}")]
    Parse(String),
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    #[error("'{0}' is not callable")]
    NotCallable(String),
    #[error("{name}() takes {expected} arguments ({got} given)")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("precision of {got} digits is not supported (1 to {max})")]
    Precision { got: u32, max: u32 },
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Engine(String),
}

impl CalcError {
    pub fn arity(name: &str, expected: &str, got: usize) -> Self {
        CalcError::Arity {
            name: name.to_string(),
            expected: expected.to_string(),
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(CalcError::EmptyInput.to_string(), "empty expression");
        assert_eq!(
            CalcError::TooLong { max: 2000 }.to_string(),
            "expression too long (max 2000 chars)"
        );
        let err = CalcError::NoVariable {
            op: "d(expr)".to_string(),
        };
        assert_eq!(err.to_string(), "d(expr) requires a variable (no symbols found)");
        let err = CalcError::Precision { got: 40, max: 15 };
        assert_eq!(err.to_string(), "precision of 40 digits is not supported (1 to 15)");
        let err = CalcError::arity("sin", "1", 2);
        assert_eq!(err.to_string(), "sin() takes 1 arguments (2 given)");
    }
}
