#![allow(clippy::mutable_key_type)]
mod builtins;
pub mod env;
mod eval;
pub mod math;

pub use eval::Interpreter;
pub use procdraw_reader::BalancedState;
