//! # Restricted Evaluation Context
//!
//! The complete vocabulary of the expression language lives in two fixed tables:
//!
//! - the **local** table: the symbols `x y z t`, the constants `pi e`, the generic function
//!   `f`, the operators `d int solve dsolve Eq N` and the elementary functions
//!   `sin cos tan exp log sqrt abs`
//! - the **global** table: literal constructors only, `Integer Float Rational Symbol` and
//!   `factorial` (the target of postfix `!`)
//!
//! A name found in neither table is an error. Both tables are built once and never mutated,
//! so one context is shared by every evaluation on every thread. Anything added here becomes
//! nameable from untrusted input.
//!
//! The module also holds the two transform sets: strict and relaxed. Relaxed mode applies
//! callable names without parentheses (`sin x`, `sin^2 x`).

use crate::symbolic::parse_expr::ParseOptions;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use strum::{IntoEnumIterator, VariantNames};
use strum_macros::{Display, EnumIter, VariantNames};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum SymbolName {
    #[strum(to_string = "x")]
    X,
    #[strum(to_string = "y")]
    Y,
    #[strum(to_string = "z")]
    Z,
    #[strum(to_string = "t")]
    T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum NamedConstant {
    #[strum(to_string = "pi")]
    Pi,
    #[strum(to_string = "e")]
    E,
}

/// Calculus, solving and construction operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, VariantNames)]
pub enum Operator {
    /// d(expr[, var])
    #[strum(to_string = "d")]
    Diff,
    /// int(expr[, var])
    #[strum(to_string = "int")]
    Integrate,
    /// solve(expr[, var]), solve([eqs], [vars])
    #[strum(to_string = "solve")]
    Solve,
    /// dsolve(eq[, f(x)])
    #[strum(to_string = "dsolve")]
    Dsolve,
    /// Eq(lhs, rhs)
    #[strum(to_string = "Eq")]
    Equation,
    /// N(expr[, digits])
    #[strum(to_string = "N")]
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, VariantNames)]
pub enum Elementary {
    #[strum(to_string = "sin")]
    Sin,
    #[strum(to_string = "cos")]
    Cos,
    #[strum(to_string = "tan")]
    Tan,
    #[strum(to_string = "exp")]
    Exp,
    #[strum(to_string = "log")]
    Log,
    #[strum(to_string = "sqrt")]
    Sqrt,
    #[strum(to_string = "abs")]
    Abs,
}

/// Constructors reachable only through the global table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum LiteralCtor {
    Integer,
    Float,
    Rational,
    Symbol,
    #[strum(to_string = "factorial")]
    Factorial,
}

/// What a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Symbol(SymbolName),
    Constant(NamedConstant),
    /// the undefined function `f`
    GenericFunction,
    Operator(Operator),
    Elementary(Elementary),
    Literal(LiteralCtor),
}

impl Binding {
    /// Names that stand for a value rather than something to call.
    pub fn is_value(&self) -> bool {
        matches!(self, Binding::Symbol(_) | Binding::Constant(_))
    }
}

pub const GENERIC_FUNCTION: &str = "f";

pub struct EvaluationContext {
    locals: BTreeMap<String, Binding>,
    globals: BTreeMap<String, Binding>,
}

static SHARED_CONTEXT: LazyLock<EvaluationContext> = LazyLock::new(EvaluationContext::new);

/// Callable local names, applied without parentheses in relaxed mode.
static CALLABLE_NAMES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    Operator::VARIANTS
        .iter()
        .chain(Elementary::VARIANTS)
        .copied()
        .chain([GENERIC_FUNCTION])
        .collect()
});

impl EvaluationContext {
    fn new() -> Self {
        let mut locals = BTreeMap::new();
        for symbol in SymbolName::iter() {
            locals.insert(symbol.to_string(), Binding::Symbol(symbol));
        }
        for constant in NamedConstant::iter() {
            locals.insert(constant.to_string(), Binding::Constant(constant));
        }
        locals.insert(GENERIC_FUNCTION.to_string(), Binding::GenericFunction);
        for operator in Operator::iter() {
            locals.insert(operator.to_string(), Binding::Operator(operator));
        }
        for function in Elementary::iter() {
            locals.insert(function.to_string(), Binding::Elementary(function));
        }
        let globals = LiteralCtor::iter()
            .map(|ctor| (ctor.to_string(), Binding::Literal(ctor)))
            .collect();
        EvaluationContext { locals, globals }
    }

    /// The process-wide read-only context.
    pub fn shared() -> &'static EvaluationContext {
        &SHARED_CONTEXT
    }

    /// Local table first, then the global one.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .copied()
    }

    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.locals.keys().map(String::as_str)
    }

    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.globals.keys().map(String::as_str)
    }
}

//___________________________________TRANSFORMS___________________________________

/// Parse-time grammar rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Transform {
    /// literals become exact integers and rationals; otherwise every literal is a float
    AutoNumber,
    /// postfix `!`
    FactorialNotation,
    /// `^` as power
    ConvertXor,
    /// `2x`, `x(x + 1)`, `xy`
    ImplicitMultiplication,
    /// `sin x`, `2 log x`
    ImplicitApplication,
    /// `sin^2(x)`, `cos^2 x`
    FunctionExponentiation,
}

static STRICT: [Transform; 3] = [
    Transform::AutoNumber,
    Transform::FactorialNotation,
    Transform::ConvertXor,
];

static RELAXED: [Transform; 6] = [
    Transform::AutoNumber,
    Transform::FactorialNotation,
    Transform::ConvertXor,
    Transform::ImplicitMultiplication,
    Transform::ImplicitApplication,
    Transform::FunctionExponentiation,
];

/// Ordered set of transforms, chosen once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSet {
    transforms: &'static [Transform],
}

impl TransformSet {
    pub fn strict() -> Self {
        TransformSet { transforms: &STRICT }
    }

    pub fn relaxed() -> Self {
        TransformSet {
            transforms: &RELAXED,
        }
    }

    pub fn for_mode(relaxed: bool) -> Self {
        if relaxed {
            Self::relaxed()
        } else {
            Self::strict()
        }
    }

    pub fn contains(&self, transform: Transform) -> bool {
        self.transforms.contains(&transform)
    }

    pub fn transforms(&self) -> &'static [Transform] {
        self.transforms
    }

    pub fn parse_options(&self) -> ParseOptions {
        let applies = self.contains(Transform::ImplicitApplication)
            || self.contains(Transform::FunctionExponentiation);
        ParseOptions {
            caret_is_power: self.contains(Transform::ConvertXor),
            factorial_notation: self.contains(Transform::FactorialNotation),
            implicit_multiplication: self.contains(Transform::ImplicitMultiplication),
            implicit_application: self.contains(Transform::ImplicitApplication),
            function_exponentiation: self.contains(Transform::FunctionExponentiation),
            function_names: if applies { CALLABLE_NAMES.as_slice() } else { &[] },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_vocabulary() {
        let context = EvaluationContext::shared();
        let names: Vec<&str> = context.local_names().collect();
        assert_eq!(names.len(), 20);
        for name in ["x", "y", "z", "t", "pi", "e", "f", "d", "int", "solve", "dsolve", "Eq", "N"] {
            assert!(names.contains(&name), "{}", name);
        }
        assert_eq!(context.resolve("x"), Some(Binding::Symbol(SymbolName::X)));
        assert_eq!(context.resolve("e"), Some(Binding::Constant(NamedConstant::E)));
        assert_eq!(context.resolve("abs"), Some(Binding::Elementary(Elementary::Abs)));
        assert_eq!(context.resolve("N"), Some(Binding::Operator(Operator::Numeric)));
    }

    #[test]
    fn test_global_vocabulary_has_only_literal_constructors() {
        let context = EvaluationContext::shared();
        let names: Vec<&str> = context.global_names().collect();
        assert_eq!(names, vec!["Float", "Integer", "Rational", "Symbol", "factorial"]);
        assert_eq!(
            context.resolve("factorial"),
            Some(Binding::Literal(LiteralCtor::Factorial))
        );
    }

    #[test]
    fn test_no_host_capabilities() {
        let context = EvaluationContext::shared();
        for name in ["eval", "exec", "open", "import", "__import__", "system", "getattr", "E", "I"] {
            assert_eq!(context.resolve(name), None, "{}", name);
        }
    }

    #[test]
    fn test_transform_sets() {
        let strict = TransformSet::strict();
        assert!(!strict.contains(Transform::ImplicitMultiplication));
        assert!(!strict.parse_options().implicit_multiplication);
        let relaxed = TransformSet::for_mode(true);
        assert_eq!(relaxed.transforms().len(), 6);
        assert!(relaxed.parse_options().implicit_multiplication);
        assert!(relaxed.parse_options().implicit_application);
        assert!(relaxed.parse_options().function_exponentiation);
        assert!(relaxed.parse_options().caret_is_power);
        assert_eq!(relaxed.transforms()[..3], strict.transforms()[..]);
        assert!(!strict.parse_options().implicit_application);
    }

    #[test]
    fn test_applicable_function_names() {
        let names = TransformSet::relaxed().parse_options().function_names;
        assert_eq!(names.len(), 14);
        for name in ["d", "int", "N", "sin", "log", "abs", "f"] {
            assert!(names.contains(&name), "{}", name);
        }
        for name in names {
            let binding = EvaluationContext::shared().resolve(name);
            assert!(binding.is_some_and(|b| !b.is_value()), "{}", name);
        }
        assert!(TransformSet::strict().parse_options().function_names.is_empty());
    }
}
