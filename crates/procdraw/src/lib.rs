//! procdraw: a small embeddable Lisp with an Oppen-style pretty-printer.
//!
//! # Quick Start
//!
//! ```no_run
//! use procdraw::{InterpreterBuilder, Value};
//!
//! let interp = InterpreterBuilder::new().build();
//! let result = interp.eval_str("(+ 1 2)").unwrap();
//! assert_eq!(result.num_val(), 3.0);
//! ```

pub use procdraw_core::{Context, LispError, NativeFn, Position, Result, SymbolTable, Value, ValueType};
pub use procdraw_eval::{env, math, BalancedState, Interpreter};
pub use procdraw_fmt::{pretty_print, print_flat, PrettyPrinter};
pub use procdraw_reader::{check_balanced, read, read_many};

/// Builder for configuring and constructing an [`Interpreter`].
///
/// By default the built-in functions and `pi` are installed.
pub struct InterpreterBuilder {
    builtins: bool,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self { builtins: true }
    }

    /// Enable or disable the built-in functions (default: `true`).
    pub fn with_builtins(mut self, enable: bool) -> Self {
        self.builtins = enable;
        self
    }

    /// Leave only the special forms; the host registers everything else.
    pub fn without_builtins(self) -> Self {
        self.with_builtins(false)
    }

    pub fn build(self) -> Interpreter {
        if self.builtins {
            Interpreter::new()
        } else {
            Interpreter::bare()
        }
    }
}
