use std::cell::RefCell;

use lasso::{Key, Rodeo};

use crate::value::Value;

/// The interning table: one symbol object per distinct name.
///
/// Owned by an interpreter instance rather than held in a global, so separate
/// interpreters never share symbols or global bindings.
#[derive(Default)]
pub struct SymbolTable {
    names: RefCell<Rodeo>,
    // Indexed by the name's key
    symbols: RefCell<Vec<Value>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the symbol named `name`, creating it on first use.
    pub fn intern(&self, name: &str) -> Value {
        let index = self.names.borrow_mut().get_or_intern(name).into_usize();
        let mut symbols = self.symbols.borrow_mut();
        if let Some(symbol) = symbols.get(index) {
            return symbol.clone();
        }
        let symbol = Value::make_symbol(name);
        symbols.push(symbol.clone());
        symbol
    }

    /// Look a symbol up without creating it.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let key = self.names.borrow().get(name)?;
        self.symbols.borrow().get(key.into_usize()).cloned()
    }

    pub fn len(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every interned symbol, in interning order.
    pub fn symbols(&self) -> Vec<Value> {
        self.symbols.borrow().clone()
    }

    /// Reset every symbol's global slot to `nil`.
    ///
    /// Global definitions routinely refer back to their own symbol (a
    /// recursive function stored in `f` mentions `f`), forming `Rc` cycles
    /// that are only released once the slots are emptied.
    pub fn clear_values(&self) {
        for symbol in self.symbols.borrow().iter() {
            symbol.set_symbol_value(Value::Null);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_returns_same_symbol() {
        let table = SymbolTable::new();
        let hello1 = table.intern("HELLO");
        let hello2 = table.intern("HELLO");
        assert_eq!(hello1.symbol_name(), "HELLO");
        assert!(hello1 == hello2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_names_are_distinct_symbols() {
        let table = SymbolTable::new();
        assert!(table.intern("a") != table.intern("b"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_tables_are_isolated() {
        let t1 = SymbolTable::new();
        let t2 = SymbolTable::new();
        assert!(t1.intern("x") != t2.intern("x"));
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let table = SymbolTable::new();
        assert!(table.lookup("missing").is_none());
        assert!(table.is_empty());
        let sym = table.intern("present");
        assert!(table.lookup("present") == Some(sym));
    }

    #[test]
    fn test_clear_values() {
        let table = SymbolTable::new();
        let sym = table.intern("pi");
        sym.set_symbol_value(Value::number(3.0));
        table.clear_values();
        assert!(sym.symbol_value().is_null());
    }
}
