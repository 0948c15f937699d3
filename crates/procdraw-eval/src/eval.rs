use procdraw_core::{Context, NativeFn, Result, SymbolTable, Value};
use procdraw_reader::BalancedState;

use crate::builtins;
use crate::env;

/// A procdraw Lisp interpreter instance.
///
/// Owns its symbol table, so every global binding lives and dies with the
/// interpreter. Not thread-safe: one instance per thread.
pub struct Interpreter {
    symbols: SymbolTable,
    s_def: Value,
    s_if: Value,
    s_lambda: Value,
    s_progn: Value,
    s_quote: Value,
    s_setq: Value,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with the built-in functions and `pi` installed.
    pub fn new() -> Self {
        let interp = Self::bare();
        builtins::register_builtins(&interp);
        interp
    }

    /// An interpreter that knows only the special forms.
    pub fn bare() -> Self {
        let symbols = SymbolTable::new();
        Interpreter {
            s_def: symbols.intern("def"),
            s_if: symbols.intern("if"),
            s_lambda: symbols.intern("lambda"),
            s_progn: symbols.intern("progn"),
            s_quote: symbols.intern("quote"),
            s_setq: symbols.intern("setq"),
            symbols,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The interned symbol named `name`.
    pub fn symbol_ref(&self, name: &str) -> Value {
        self.symbols.intern(name)
    }

    /// Bind the global `name` to a native function.
    ///
    /// The closure receives the interpreter, the evaluated argument list and
    /// the caller's environment. Host state is whatever the closure captures.
    pub fn register_native_fn<F>(&self, name: &str, f: F) -> Value
    where
        F: Fn(&dyn Context, &Value, &Value) -> Value + 'static,
    {
        tracing::trace!(name, "registering native function");
        self.set_global(name, Value::native_fn(NativeFn::new(name, f)))
    }

    /// Set the global value of the symbol `name`.
    pub fn set_global(&self, name: &str, value: Value) -> Value {
        env::set(&self.symbol_ref(name), value, &Value::Null)
    }

    // --- Reading ---

    pub fn read(&self, text: &str) -> Result<Value> {
        procdraw_reader::read(&self.symbols, text)
    }

    pub fn read_many(&self, text: &str) -> Result<Vec<Value>> {
        procdraw_reader::read_many(&self.symbols, text)
    }

    pub fn check_balanced(&self, text: &str) -> BalancedState {
        procdraw_reader::check_balanced(text)
    }

    // --- Evaluation ---

    pub fn eval(&self, expr: &Value, env: &Value) -> Value {
        match expr {
            Value::Cons(_) => self.eval_form(expr, env),
            // Only symbols can be bound; other reference atoms look up as nil
            Value::Symbol(_) | Value::NativeFn(_) | Value::Dict(_) => env::value(expr, env),
            _ => expr.clone(),
        }
    }

    /// Evaluate in the empty (global) environment.
    pub fn eval_global(&self, expr: &Value) -> Value {
        self.eval(expr, &Value::Null)
    }

    /// Read one expression from `text` and evaluate it globally. Incomplete
    /// input evaluates to `Eof`.
    pub fn eval_str(&self, text: &str) -> Result<Value> {
        let expr = self.read(text)?;
        Ok(self.eval_global(&expr))
    }

    fn eval_form(&self, expr: &Value, env: &Value) -> Value {
        let head = expr.car();
        if head == self.s_def {
            let lambda = Value::cons(self.s_lambda.clone(), expr.cddr());
            env::set(&expr.cadr(), lambda, env)
        } else if head == self.s_if {
            self.evif(&expr.cdr(), env)
        } else if head == self.s_lambda {
            expr.clone()
        } else if head == self.s_progn {
            self.progn(&expr.cdr(), env)
        } else if head == self.s_quote {
            expr.cadr()
        } else if head == self.s_setq {
            let value = self.eval(&expr.caddr(), env);
            env::set(&expr.cadr(), value, env)
        } else {
            let fun = self.eval(&head, env);
            let args = self.evlis(&expr.cdr(), env);
            self.apply(&fun, &args, env)
        }
    }

    /// `(test then else)`: a missing branch evaluates to `nil`.
    pub fn evif(&self, arglist: &Value, env: &Value) -> Value {
        if self.eval(&arglist.car(), env).bool_val() {
            self.eval(&arglist.cadr(), env)
        } else {
            self.eval(&arglist.caddr(), env)
        }
    }

    /// Evaluate each element of `arglist` left to right into a fresh list.
    pub fn evlis(&self, arglist: &Value, env: &Value) -> Value {
        Value::list(arglist.iter().map(|arg| self.eval(&arg, env)).collect())
    }

    /// Evaluate `body` in order, returning the last value (`nil` if empty).
    pub fn progn(&self, body: &Value, env: &Value) -> Value {
        body.iter().fold(Value::Null, |_, form| self.eval(&form, env))
    }

    /// Call `fun` with an already evaluated argument list.
    ///
    /// Lambdas are not closures: the body runs in `env` extended with the
    /// parameter bindings, so free variables resolve against the caller.
    pub fn apply(&self, fun: &Value, args: &Value, env: &Value) -> Value {
        match fun {
            Value::NativeFn(native) => native.call(self, args, env),
            Value::Cons(_) if fun.car() == self.s_lambda => {
                let env = env::bind(&fun.cadr(), args, env);
                self.progn(&fun.cddr(), &env)
            }
            _ => {
                tracing::debug!(kind = fun.type_name(), "apply of a non-function gives nil");
                Value::Null
            }
        }
    }

    /// Apply the global function `name` to no arguments.
    pub fn call(&self, name: &str) -> Value {
        let fun = env::value(&self.symbol_ref(name), &Value::Null);
        self.apply(&fun, &Value::Null, &Value::Null)
    }

    /// True for lambda forms and native functions.
    pub fn functionp(&self, obj: &Value) -> bool {
        match obj {
            Value::NativeFn(_) => true,
            Value::Cons(_) => obj.car() == self.s_lambda,
            _ => false,
        }
    }

    // --- Printing ---

    pub fn print_to_string(&self, obj: &Value) -> String {
        procdraw_fmt::print_flat(obj)
    }

    pub fn pretty_print_to_string(&self, obj: &Value, margin: usize) -> String {
        procdraw_fmt::pretty_print(obj, margin)
    }
}

impl Context for Interpreter {
    fn symbol_ref(&self, name: &str) -> Value {
        Interpreter::symbol_ref(self, name)
    }

    fn eval(&self, expr: &Value, env: &Value) -> Value {
        Interpreter::eval(self, expr, env)
    }

    fn apply(&self, fun: &Value, args: &Value, env: &Value) -> Value {
        Interpreter::apply(self, fun, args, env)
    }

    fn functionp(&self, obj: &Value) -> bool {
        Interpreter::functionp(self, obj)
    }

    fn print_to_string(&self, obj: &Value) -> String {
        Interpreter::print_to_string(self, obj)
    }

    fn pretty_print_to_string(&self, obj: &Value, margin: usize) -> String {
        Interpreter::pretty_print_to_string(self, obj, margin)
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Recursive definitions hold their own symbol; empty the slots so
        // the Rc cycles can be freed.
        self.symbols.clear_values();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(interp: &Interpreter, input: &str) -> Value {
        interp.eval_str(input).unwrap()
    }

    #[test]
    fn test_self_evaluating_atoms() {
        let interp = Interpreter::bare();
        assert!(interp.eval_global(&Value::Null).is_null());
        assert_eq!(interp.eval_global(&Value::number(42.0)).num_val(), 42.0);
        assert!(interp.eval_global(&Value::Bool(true)).bool_val());
        assert!(!interp.eval_global(&Value::Bool(false)).bool_val());
        assert_eq!(
            interp.eval_global(&Value::string("some string")).string_val(),
            "some string"
        );
        assert!(interp.eval_global(&Value::Eof).is_eof());
    }

    #[test]
    fn test_unbound_symbol_is_nil() {
        let interp = Interpreter::bare();
        assert!(interp.eval_global(&interp.symbol_ref("a")).is_null());
    }

    #[test]
    fn test_symbol_bound_in_env() {
        let interp = Interpreter::bare();
        let a = interp.symbol_ref("a");
        let env = Value::list(vec![Value::cons(a.clone(), Value::number(42.0))]);
        assert_eq!(interp.eval(&a, &env).num_val(), 42.0);
    }

    #[test]
    fn test_quote() {
        let interp = Interpreter::bare();
        assert_eq!(eval(&interp, "(quote foo)").symbol_name(), "foo");
        assert_eq!(eval(&interp, "'foo").symbol_name(), "foo");
        assert_eq!(eval(&interp, "(quote (a b))").to_string(), "(a b)");
    }

    #[test]
    fn test_if() {
        let interp = Interpreter::bare();
        assert_eq!(eval(&interp, "(if true 1 2)").num_val(), 1.0);
        assert_eq!(eval(&interp, "(if false 1 2)").num_val(), 2.0);
        assert_eq!(eval(&interp, "(if nil 1 2)").num_val(), 2.0);
        assert_eq!(eval(&interp, "(if 0 1 2)").num_val(), 1.0);
        assert!(eval(&interp, "(if false 1)").is_null());
    }

    #[test]
    fn test_progn() {
        let interp = Interpreter::bare();
        assert!(eval(&interp, "(progn)").is_null());
        assert_eq!(eval(&interp, "(progn 1)").num_val(), 1.0);
        assert_eq!(eval(&interp, "(progn 1 2 3)").num_val(), 3.0);
    }

    #[test]
    fn test_setq_global() {
        let interp = Interpreter::bare();
        assert_eq!(eval(&interp, "(setq x 5)").num_val(), 5.0);
        assert_eq!(eval(&interp, "x").num_val(), 5.0);
    }

    #[test]
    fn test_lambda_is_self_representing() {
        let interp = Interpreter::bare();
        let lambda = eval(&interp, "(lambda (n) n)");
        assert_eq!(interp.print_to_string(&lambda), "(lambda (n) n)");
        assert!(interp.functionp(&lambda));
    }

    #[test]
    fn test_def_stores_lambda() {
        let interp = Interpreter::bare();
        let def = eval(&interp, "(def f (n) n)");
        assert!(def.car() == interp.symbol_ref("lambda"));
        assert_eq!(eval(&interp, "(f 7)").num_val(), 7.0);
    }

    #[test]
    fn test_dynamic_scope() {
        let interp = Interpreter::bare();
        eval(&interp, "(def get-x () x)");
        eval(&interp, "(setq x 1)");
        assert_eq!(eval(&interp, "(get-x)").num_val(), 1.0);
        assert_eq!(eval(&interp, "((lambda (x) (get-x)) 2)").num_val(), 2.0);
    }

    #[test]
    fn test_apply_non_function_is_nil() {
        let interp = Interpreter::bare();
        assert!(eval(&interp, "(1 2 3)").is_null());
        assert!(eval(&interp, "(undefined-fn 1)").is_null());
        assert!(eval(&interp, "('(a b) 1)").is_null());
    }

    #[test]
    fn test_call() {
        let interp = Interpreter::bare();
        eval(&interp, "(def answer () 42)");
        assert_eq!(interp.call("answer").num_val(), 42.0);
        assert!(interp.call("missing").is_null());
    }

    #[test]
    fn test_register_native_fn_with_host_data() {
        let interp = Interpreter::bare();
        let data = 42.0;
        interp.register_native_fn("test-cfun", move |_, args, _| {
            Value::number(args.car().num_val() + data)
        });
        assert_eq!(eval(&interp, "(test-cfun 10)").num_val(), 52.0);
    }

    #[test]
    fn test_native_fn_calls_back_into_interpreter() {
        let interp = Interpreter::bare();
        interp.register_native_fn("twice", |ctx, args, env| {
            let f = args.car();
            let x = ctx.apply(&f, &args.cdr(), env);
            ctx.apply(&f, &Value::list(vec![x]), env)
        });
        eval(&interp, "(def inc (n) (if n 1 0))");
        assert_eq!(eval(&interp, "(twice inc 5)").num_val(), 1.0);
    }

    #[test]
    fn test_eval_str_incomplete_is_eof() {
        let interp = Interpreter::bare();
        assert!(eval(&interp, "(progn 1").is_eof());
        assert!(interp.eval_str("\"open").is_err());
    }

    #[test]
    fn test_drop_clears_globals() {
        let sym;
        {
            let interp = Interpreter::bare();
            eval(&interp, "(def f () (f))");
            sym = interp.symbol_ref("f");
            assert!(!sym.symbol_value().is_null());
        }
        assert!(sym.symbol_value().is_null());
    }
}
