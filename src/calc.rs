/// # Calculator core
///
/// Safety and normalization layer between untrusted text and the algebra engine.
///
/// ```rust, ignore
/// use RustedCalc::calc::pipeline::evaluate;
/// let result = evaluate("int(sin(x))", false).unwrap();
/// assert_eq!(result.to_string(), "-cos(x)");
/// // relaxed mode accepts implicit multiplication
/// let result = evaluate("t e^{-5t}", true).unwrap();
/// assert_eq!(result.to_string(), "t*exp(-5*t)");
/// ```
pub mod calc_errors;
/// fixed name tables and transform sets
pub mod context;
pub mod infer;
/// explicit interpreter over the syntax tree
pub mod interpreter;
pub mod normalizer;
pub mod pipeline;
/// raw input checks: emptiness, length, blocked tokens
pub mod validator;
