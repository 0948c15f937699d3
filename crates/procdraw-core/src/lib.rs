#![allow(clippy::mutable_key_type)]
pub mod context;
pub mod error;
pub mod symbols;
pub mod value;

pub use context::Context;
pub use error::{LispError, Position, Result};
pub use symbols::SymbolTable;
pub use value::{Cons, DictMap, ListIter, NativeFn, NativeFnInner, Symbol, Value, ValueType};
