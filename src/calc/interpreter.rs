//! # Interpreter
//!
//! Walks the syntax tree produced by `parse_expr` and builds values with the algebra engine.
//! Every name goes through the `EvaluationContext`; there is no other way for input text to
//! reach a capability.
//!
//! ## Values
//! - expressions, the only values arithmetic is defined on
//! - equations `Eq(lhs, rhs)` and booleans (an `Eq` that decides to `True`/`False`)
//! - lists (`[a, b]`, solution sets) and mappings (solutions of linear systems)
//! - strings, accepted only as arguments of the literal constructors (`Symbol("w")`)
//!
//! ## Relaxed mode
//! With implicit multiplication on, a value name followed by parentheses multiplies
//! (`x(x + 1)`), and an unknown name spelled with single-letter value names is their
//! product (`xy`, `te`).

use crate::calc::calc_errors::CalcError;
use crate::calc::context::{
    Binding, Elementary, EvaluationContext, LiteralCtor, NamedConstant, Operator, Transform,
    TransformSet,
};
use crate::calc::infer::infer_variable;
use crate::symbolic::parse_expr::{BinOp, Node};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::{DEFAULT_DIGITS, MAX_DIGITS, Number};
use crate::symbolic::symbolic_solve::solve_linear_system;
use crate::symbolic::utils::is_identifier;
use itertools::Itertools;
use log::debug;
use num::{BigInt, BigRational};
use num_traits::{FromPrimitive, ToPrimitive};
use std::collections::BTreeSet;
use std::fmt;

/// Result of evaluating a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Expr(Expr),
    Equation(Expr, Expr),
    Bool(bool),
    List(Vec<Value>),
    /// ordered (key, value) pairs
    Map(Vec<(Expr, Expr)>),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Expr(_) => "expression",
            Value::Equation(..) => "equation",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
            Value::Str(_) => "string",
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Applies `f` to every expression inside the value.
    pub fn map_exprs<F>(self, f: &F) -> Value
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Value::Expr(e) => Value::Expr(f(&e)),
            Value::Equation(lhs, rhs) => Value::Equation(f(&lhs), f(&rhs)),
            Value::List(items) => Value::List(items.into_iter().map(|v| v.map_exprs(f)).collect()),
            Value::Map(pairs) => Value::Map(pairs.into_iter().map(|(k, v)| (k, f(&v))).collect()),
            other => other,
        }
    }

    fn into_expr(self, context: &str) -> Result<Expr, CalcError> {
        match self {
            Value::Expr(e) => Ok(e),
            other => Err(CalcError::Type(format!(
                "{} expects an expression, got a {}",
                context,
                other.kind()
            ))),
        }
    }

    /// `lhs - rhs` for equations, the expression itself otherwise.
    fn into_equation_expr(self, context: &str) -> Result<Expr, CalcError> {
        match self {
            Value::Equation(lhs, rhs) => Ok(lhs - rhs),
            other => other.into_expr(context),
        }
    }

    fn into_symbol(self, context: &str) -> Result<String, CalcError> {
        match self {
            Value::Expr(Expr::Var(name)) => Ok(name),
            other => Err(CalcError::Type(format!("{}: {} is not a symbol", context, other))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Expr(e) => write!(f, "{}", e),
            Value::Equation(lhs, rhs) => write!(f, "Eq({}, {})", lhs, rhs),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Map(pairs) => write!(
                f,
                "{{{}}}",
                pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
            Value::Str(s) => write!(f, "'{}'", s),
        }
    }
}

fn check_arity(name: &str, args: &[Node], min: usize, max: usize) -> Result<(), CalcError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(CalcError::arity(name, &expected, args.len()));
    }
    Ok(())
}

/// Expression a value name stands for; None for callables.
fn value_of(binding: Binding) -> Option<Expr> {
    match binding {
        Binding::Symbol(symbol) => Some(Expr::var(&symbol.to_string())),
        Binding::Constant(NamedConstant::Pi) => Some(Expr::Pi),
        Binding::Constant(NamedConstant::E) => Some(Expr::E),
        _ => None,
    }
}

/// `Eq(lhs, rhs)`: decided to a boolean when the difference simplifies to a number.
fn equation(lhs: Expr, rhs: Expr) -> Value {
    let difference = (lhs.clone() - rhs.clone()).simplify();
    if difference.is_zero() {
        return Value::Bool(true);
    }
    match difference.as_f64() {
        Some(v) if v.is_finite() => Value::Bool(v == 0.0),
        _ => Value::Equation(lhs, rhs),
    }
}

/// Floats are f64, so more than `MAX_DIGITS` significant digits cannot be honoured.
pub fn check_digits(digits: u32) -> Result<u32, CalcError> {
    if (1..=MAX_DIGITS).contains(&digits) {
        Ok(digits)
    } else {
        Err(CalcError::Precision {
            got: digits,
            max: MAX_DIGITS,
        })
    }
}

pub struct Interpreter<'a> {
    context: &'a EvaluationContext,
    transforms: TransformSet,
    /// digits of N(expr) without an explicit digit count
    precision: u32,
}

impl<'a> Interpreter<'a> {
    pub fn new(context: &'a EvaluationContext, transforms: TransformSet) -> Self {
        Interpreter {
            context,
            transforms,
            precision: DEFAULT_DIGITS,
        }
    }

    pub fn with_precision(mut self, digits: u32) -> Result<Self, CalcError> {
        self.precision = check_digits(digits)?;
        Ok(self)
    }

    fn relaxed(&self) -> bool {
        self.transforms.contains(Transform::ImplicitMultiplication)
    }

    pub fn eval(&self, node: &Node) -> Result<Value, CalcError> {
        match node {
            Node::Number(text) => self.number(text).map(Value::Expr),
            Node::Str(text) => Ok(Value::Str(text.clone())),
            Node::Name(name) => self.name(name),
            Node::Neg(inner) => Ok(Value::Expr(-self.eval_expr(inner, "unary -")?)),
            Node::Binary(op, left, right) => self.binary(*op, left, right),
            Node::Implicit(left, right) => self.binary(BinOp::Mul, left, right),
            Node::Factorial(inner) => match self.context.resolve("factorial") {
                Some(Binding::Literal(LiteralCtor::Factorial)) => {
                    self.literal(LiteralCtor::Factorial, std::slice::from_ref(&**inner))
                }
                _ => Err(CalcError::UnknownName("factorial".to_string())),
            },
            Node::Call(name, args) => self.call(name, args),
            Node::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
        }
    }

    fn eval_expr(&self, node: &Node, context: &str) -> Result<Expr, CalcError> {
        self.eval(node)?.into_expr(context)
    }

    fn number(&self, text: &str) -> Result<Expr, CalcError> {
        let invalid = || CalcError::Parse(format!("invalid number literal {}", text));
        let is_float = text.contains(|c: char| matches!(c, '.' | 'e' | 'E'));
        if is_float || !self.transforms.contains(Transform::AutoNumber) {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            return Ok(Expr::float(value, DEFAULT_DIGITS));
        }
        let value: BigInt = text.parse().map_err(|_| invalid())?;
        Ok(Expr::Const(Number::from_bigint(value)))
    }

    fn name(&self, name: &str) -> Result<Value, CalcError> {
        match self.context.resolve(name) {
            Some(binding) => value_of(binding).map(Value::Expr).ok_or_else(|| {
                CalcError::Type(format!("function '{}' must be called with arguments", name))
            }),
            None => self
                .split_name(name)
                .map(Value::Expr)
                .ok_or_else(|| CalcError::UnknownName(name.to_string())),
        }
    }

    /// `xy -> x*y` in relaxed mode when every letter is a value name.
    fn split_name(&self, name: &str) -> Option<Expr> {
        if !self.relaxed() || name.chars().count() < 2 {
            return None;
        }
        let factors = name
            .chars()
            .map(|c| self.context.resolve(&c.to_string()).and_then(value_of))
            .collect::<Option<Vec<Expr>>>()?;
        debug!("split '{}' into {} factors", name, factors.len());
        Some(Expr::product(factors))
    }

    fn binary(&self, op: BinOp, left: &Node, right: &Node) -> Result<Value, CalcError> {
        let symbol = match op {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
        };
        let (a, b) = match (self.eval(left)?, self.eval(right)?) {
            (Value::Expr(a), Value::Expr(b)) => (a, b),
            (a, b) => {
                return Err(CalcError::Type(format!(
                    "unsupported operand types for {}: {} and {}",
                    symbol,
                    a.kind(),
                    b.kind()
                )));
            }
        };
        let result = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Pow => a.pow(b),
        };
        Ok(Value::Expr(result))
    }

    //___________________________________CALLS___________________________________

    fn call(&self, name: &str, args: &[Node]) -> Result<Value, CalcError> {
        match self.context.resolve(name) {
            Some(Binding::Operator(op)) => self.operator(op, args),
            Some(Binding::Elementary(function)) => self.elementary(function, args),
            Some(Binding::Literal(ctor)) => self.literal(ctor, args),
            Some(Binding::GenericFunction) => {
                if args.is_empty() {
                    return Err(CalcError::arity(name, "at least 1", 0));
                }
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a, name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Expr(Expr::new_func(name, args)))
            }
            Some(binding) if binding.is_value() => self.value_call(name, value_of(binding), args),
            Some(_) => Err(CalcError::NotCallable(name.to_string())),
            None => match self.split_name(name) {
                Some(value) => self.value_call(name, Some(value), args),
                None => Err(CalcError::UnknownName(name.to_string())),
            },
        }
    }

    /// `x(x + 1)` is a product in relaxed mode and an error otherwise.
    fn value_call(&self, name: &str, value: Option<Expr>, args: &[Node]) -> Result<Value, CalcError> {
        match (value, args) {
            (Some(value), [arg]) if self.relaxed() => {
                Ok(Value::Expr(value * self.eval_expr(arg, "*")?))
            }
            _ => Err(CalcError::NotCallable(name.to_string())),
        }
    }

    /// Explicit variable argument, or the only free symbol of `expr`.
    fn variable_or_inferred(
        &self,
        expr: &Expr,
        node: Option<&Node>,
        op_name: &str,
    ) -> Result<String, CalcError> {
        match node {
            Some(node) => self.eval(node)?.into_symbol(op_name),
            None => infer_variable(expr, op_name),
        }
    }

    fn operator(&self, op: Operator, args: &[Node]) -> Result<Value, CalcError> {
        let name = op.to_string();
        match op {
            Operator::Diff => {
                check_arity(&name, args, 1, 2)?;
                let expr = self.eval_expr(&args[0], "d")?;
                let var = self.variable_or_inferred(&expr, args.get(1), "d(expr)")?;
                debug!("d({}) with respect to {}", expr, var);
                Ok(Value::Expr(expr.diff(&var)))
            }
            Operator::Integrate => {
                check_arity(&name, args, 1, 2)?;
                let expr = self.eval_expr(&args[0], "int")?;
                let var = self.variable_or_inferred(&expr, args.get(1), "int(expr)")?;
                debug!("int({}) with respect to {}", expr, var);
                Ok(Value::Expr(expr.integrate_or_unevaluated(&var)))
            }
            Operator::Solve => {
                check_arity(&name, args, 1, 2)?;
                self.solve(args)
            }
            Operator::Dsolve => {
                check_arity(&name, args, 1, 2)?;
                let equation = self.eval(&args[0])?.into_equation_expr("dsolve")?;
                let func = match args.get(1) {
                    Some(node) => Some(self.eval_expr(node, "dsolve")?),
                    None => None,
                };
                let (lhs, rhs) = equation.dsolve(func.as_ref()).map_err(CalcError::Engine)?;
                Ok(Value::Equation(lhs, rhs))
            }
            Operator::Equation => {
                check_arity(&name, args, 2, 2)?;
                let lhs = self.eval_expr(&args[0], "Eq")?;
                let rhs = self.eval_expr(&args[1], "Eq")?;
                Ok(equation(lhs, rhs))
            }
            Operator::Numeric => {
                check_arity(&name, args, 1, 2)?;
                let digits = match args.get(1) {
                    Some(node) => self.digits(node)?,
                    None => self.precision,
                };
                let value = self.eval(&args[0])?;
                Ok(value.map_exprs(&|e: &Expr| e.evalf(digits)))
            }
        }
    }

    fn digits(&self, node: &Node) -> Result<u32, CalcError> {
        let expr = self.eval_expr(node, "N")?;
        let digits = expr
            .as_integer()
            .and_then(|n| n.to_u32())
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                CalcError::Type(format!(
                    "N: number of digits must be a positive integer, got {}",
                    expr
                ))
            })?;
        check_digits(digits)
    }

    fn solve(&self, args: &[Node]) -> Result<Value, CalcError> {
        match self.eval(&args[0])? {
            // Eq(..) already decided to True/False leaves no variable to solve for
            Value::Bool(_) => Ok(Value::List(Vec::new())),
            Value::List(items) => {
                if items.iter().any(|v| matches!(v, Value::Bool(false))) {
                    return Ok(Value::List(Vec::new()));
                }
                let equations = items
                    .into_iter()
                    .filter(|v| !matches!(v, Value::Bool(true)))
                    .map(|v| v.into_equation_expr("solve"))
                    .collect::<Result<Vec<_>, _>>()?;
                let vars = match args.get(1) {
                    Some(node) => match self.eval(node)? {
                        Value::List(vars) => vars
                            .into_iter()
                            .map(|v| v.into_symbol("solve"))
                            .collect::<Result<Vec<_>, _>>()?,
                        other => vec![other.into_symbol("solve")?],
                    },
                    None => {
                        let symbols: BTreeSet<String> =
                            equations.iter().flat_map(|e| e.free_symbols()).collect();
                        if symbols.is_empty() {
                            return Err(CalcError::NoVariable {
                                op: "solve(expr)".to_string(),
                            });
                        }
                        symbols.into_iter().collect()
                    }
                };
                debug!("solving a linear system of {} equations", equations.len());
                let solution = solve_linear_system(&equations, &vars).map_err(CalcError::Engine)?;
                Ok(match solution {
                    Some(pairs) => Value::Map(
                        pairs
                            .into_iter()
                            .map(|(var, value)| (Expr::var(&var), value))
                            .collect(),
                    ),
                    None => Value::List(Vec::new()),
                })
            }
            other => {
                let expr = other.into_equation_expr("solve")?;
                let var = self.variable_or_inferred(&expr, args.get(1), "solve(expr)")?;
                let roots = expr.solve(&var).map_err(CalcError::Engine)?;
                Ok(Value::List(roots.into_iter().map(Value::Expr).collect()))
            }
        }
    }

    fn elementary(&self, function: Elementary, args: &[Node]) -> Result<Value, CalcError> {
        let name = function.to_string();
        if function == Elementary::Log {
            check_arity(&name, args, 1, 2)?;
            let arg = self.eval_expr(&args[0], &name)?;
            let value = match args.get(1) {
                Some(base) => Expr::new_ln(arg) / Expr::new_ln(self.eval_expr(base, &name)?),
                None => Expr::new_ln(arg),
            };
            return Ok(Value::Expr(value));
        }
        check_arity(&name, args, 1, 1)?;
        let arg = self.eval_expr(&args[0], &name)?;
        let value = match function {
            Elementary::Sin => Expr::new_sin(arg),
            Elementary::Cos => Expr::new_cos(arg),
            Elementary::Tan => Expr::new_tan(arg),
            Elementary::Exp => Expr::new_exp(arg),
            Elementary::Log => Expr::new_ln(arg),
            Elementary::Sqrt => arg.sqrt(),
            Elementary::Abs => Expr::new_abs(arg),
        };
        Ok(Value::Expr(value))
    }

    //___________________________________LITERAL CONSTRUCTORS___________________________________

    fn literal(&self, ctor: LiteralCtor, args: &[Node]) -> Result<Value, CalcError> {
        let name = ctor.to_string();
        let invalid = |what: &dyn fmt::Display| {
            CalcError::Type(format!("invalid literal for {}(): {}", name, what))
        };
        match ctor {
            LiteralCtor::Integer => {
                check_arity(&name, args, 1, 1)?;
                let value = match self.eval(&args[0])? {
                    Value::Str(text) => text.trim().parse::<BigInt>().map_err(|_| invalid(&text))?,
                    Value::Expr(Expr::Const(n)) => match n {
                        Number::Rational(r) => r.trunc().to_integer(),
                        Number::Float(v, _) => BigInt::from_f64(v.trunc()).ok_or_else(|| invalid(&v))?,
                    },
                    other => return Err(invalid(&other)),
                };
                Ok(Value::Expr(Expr::Const(Number::from_bigint(value))))
            }
            LiteralCtor::Float => {
                check_arity(&name, args, 1, 2)?;
                let digits = match args.get(1) {
                    Some(node) => self.digits(node)?,
                    None => DEFAULT_DIGITS,
                };
                let value = match self.eval(&args[0])? {
                    Value::Str(text) => text.trim().parse::<f64>().map_err(|_| invalid(&text))?,
                    Value::Expr(e) => e.as_f64().ok_or_else(|| invalid(&e))?,
                    other => return Err(invalid(&other)),
                };
                Ok(Value::Expr(Expr::float(value, digits)))
            }
            LiteralCtor::Rational => {
                check_arity(&name, args, 1, 2)?;
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    let exact = match self.eval(arg)? {
                        Value::Str(text) => text
                            .trim()
                            .parse::<BigRational>()
                            .map(Number::Rational)
                            .map_err(|_| invalid(&text))?,
                        Value::Expr(Expr::Const(n)) => n.to_exact().ok_or_else(|| invalid(&n))?,
                        other => return Err(invalid(&other)),
                    };
                    parts.push(Expr::Const(exact));
                }
                let mut parts = parts.into_iter();
                let numerator = parts.next().unwrap_or_else(Expr::zero);
                Ok(Value::Expr(match parts.next() {
                    Some(denominator) => numerator / denominator,
                    None => numerator,
                }))
            }
            LiteralCtor::Symbol => {
                check_arity(&name, args, 1, 1)?;
                match self.eval(&args[0])? {
                    Value::Str(text) if is_identifier(&text) => Ok(Value::Expr(Expr::var(&text))),
                    other => Err(invalid(&other)),
                }
            }
            LiteralCtor::Factorial => {
                check_arity(&name, args, 1, 1)?;
                let arg = self.eval_expr(&args[0], &name)?;
                Ok(Value::Expr(Expr::new_factorial(arg)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;

    fn run(input: &str, relaxed: bool) -> Result<Value, CalcError> {
        let transforms = TransformSet::for_mode(relaxed);
        let tree = parse_expression_func(input, &transforms.parse_options())
            .map_err(CalcError::Parse)?;
        Interpreter::new(EvaluationContext::shared(), transforms).eval(&tree)
    }

    fn show(input: &str) -> String {
        run(input, false).unwrap().to_string()
    }

    #[test]
    fn test_literals() {
        assert_eq!(show("12"), "12");
        assert_eq!(show("1/3"), "1/3");
        assert_eq!(show("1.5"), "1.50000000000000");
        assert_eq!(show("Integer('12') + 1"), "13");
        assert_eq!(show("Integer(2.7)"), "2");
        assert_eq!(show("Rational(3, 6)"), "1/2");
        assert_eq!(show("Rational('2/4')"), "1/2");
        assert_eq!(show("Rational(0.5)"), "1/2");
        assert_eq!(show("Float(1/4, 3)"), "0.250");
        assert_eq!(show("Symbol('w') + 1"), "w + 1");
    }

    #[test]
    fn test_factorial_resolves_through_globals() {
        assert_eq!(show("5!"), "120");
        assert_eq!(show("factorial(4)"), "24");
        assert_eq!(show("x!"), "factorial(x)");
    }

    #[test]
    fn test_names() {
        assert_eq!(show("e"), "E");
        assert_eq!(show("pi"), "pi");
        assert_eq!(
            run("w", false).unwrap_err(),
            CalcError::UnknownName("w".to_string())
        );
        assert!(matches!(run("sin", false), Err(CalcError::Type(_))));
        assert!(matches!(run("Symbol('1a')", false), Err(CalcError::Type(_))));
    }

    #[test]
    fn test_calls() {
        assert_eq!(show("f(x)"), "f(x)");
        assert_eq!(show("d(f(x))"), "Derivative(f(x), x)");
        assert_eq!(show("log(x)"), "log(x)");
        assert_eq!(show("abs(-2*x)"), "2*Abs(x)");
        assert_eq!(show("Eq(x, 1)"), "Eq(x, 1)");
        assert_eq!(show("Eq(2, 2)"), "True");
        assert_eq!(show("Eq(1, 2)"), "False");
        assert_eq!(show("N(x + pi, 5)"), "x + 3.1416");
        assert_eq!(show("N(pi, 15)"), "3.14159265358979");
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            run("x(2)", false).unwrap_err(),
            CalcError::NotCallable("x".to_string())
        );
        assert_eq!(
            run("sin(x, y)", false).unwrap_err(),
            CalcError::arity("sin", "1", 2)
        );
        assert_eq!(
            run("d(x, x, x)", false).unwrap_err(),
            CalcError::arity("d", "1 to 2", 3)
        );
        assert!(matches!(run("d(x**2, 2)", false), Err(CalcError::Type(_))));
        assert!(matches!(run("N(x, 0)", false), Err(CalcError::Type(_))));
        assert_eq!(
            run("N(pi, 40)", false).unwrap_err(),
            CalcError::Precision { got: 40, max: 15 }
        );
        assert!(matches!(run("[1] + 1", false), Err(CalcError::Type(_))));
    }

    #[test]
    fn test_relaxed_values() {
        assert_eq!(run("x(x + 1)", true).unwrap().to_string(), "x*(x + 1)");
        assert_eq!(run("xy", true).unwrap().to_string(), "x*y");
        assert_eq!(run("2te", true).unwrap().to_string(), "2*E*t");
        assert_eq!(
            run("xw", true).unwrap_err(),
            CalcError::UnknownName("xw".to_string())
        );
    }

    #[test]
    fn test_solve_forms() {
        assert_eq!(show("solve(x**2 - 4, x)"), "[-2, 2]");
        assert_eq!(show("solve(Eq(2*x, 6))"), "[3]");
        assert_eq!(
            show("solve([x + y - 3, x - y - 1], [x, y])"),
            "{x: 2, y: 1}"
        );
        assert_eq!(show("solve([x + y - 3, x + y - 1])"), "[]");
    }

    #[test]
    fn test_solve_decided_equations() {
        assert_eq!(show("solve(Eq(x, x + 1))"), "[]");
        assert_eq!(show("solve(Eq(x, x + 1), x)"), "[]");
        assert_eq!(show("solve(Eq(x, x))"), "[]");
        assert_eq!(show("solve([Eq(x, x + 1), x - 1], [x])"), "[]");
        assert_eq!(show("solve([Eq(y, y), x - 1], [x])"), "{x: 1}");
    }

    #[test]
    fn test_solve_binomial() {
        assert_eq!(show("solve(x**3 - 2)"), "[2**(1/3)]");
        assert_eq!(show("solve(x**3 - y, x)"), "[y**(1/3)]");
    }

    #[test]
    fn test_dsolve() {
        assert_eq!(
            show("dsolve(d(f(x)) - f(x))"),
            "Eq(f(x), C1*exp(x))"
        );
        assert_eq!(
            show("dsolve(Eq(d(d(f(x))), -f(x)), f(x))"),
            "Eq(f(x), C1*sin(x) + C2*cos(x))"
        );
    }

    #[test]
    fn test_value_display() {
        let value = Value::List(vec![Value::Expr(Expr::num(-2)), Value::Bool(true)]);
        assert_eq!(value.to_string(), "[-2, True]");
        assert!(value.is_collection());
        assert_eq!(Value::Str("w".to_string()).to_string(), "'w'");
    }
}
