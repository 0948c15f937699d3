use crate::value::Value;

/// The interpreter surface available to native functions.
///
/// Native functions live in the value model, but the evaluator lives in a
/// crate above it; this trait is the seam between the two.
pub trait Context {
    /// Return the interned symbol named `name`.
    fn symbol_ref(&self, name: &str) -> Value;

    fn eval(&self, expr: &Value, env: &Value) -> Value;

    fn apply(&self, fun: &Value, args: &Value, env: &Value) -> Value;

    /// True for lambda forms and native functions.
    fn functionp(&self, obj: &Value) -> bool;

    fn print_to_string(&self, obj: &Value) -> String;

    fn pretty_print_to_string(&self, obj: &Value, margin: usize) -> String;
}
