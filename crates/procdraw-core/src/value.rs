use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use hashbrown::HashMap;

use crate::context::Context;

/// A native function callable from Lisp.
///
/// Receives the interpreter, the evaluated argument list and the caller's
/// environment. Host data travels in the closure's captured state.
pub type NativeFnInner = dyn Fn(&dyn Context, &Value, &Value) -> Value;

pub struct NativeFn {
    pub name: String,
    pub func: Box<NativeFnInner>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&dyn Context, &Value, &Value) -> Value + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            func: Box::new(f),
        }
    }

    pub fn call(&self, ctx: &dyn Context, args: &Value, env: &Value) -> Value {
        (self.func)(ctx, args, env)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native-fn {}>", self.name)
    }
}

/// A symbol with its global value slot.
pub struct Symbol {
    name: String,
    value: RefCell<Value>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

/// A mutable pair.
pub struct Cons {
    car: RefCell<Value>,
    cdr: RefCell<Value>,
}

/// Dictionary storage. Numbers and strings are keyed by content, everything
/// else by identity (see the `PartialEq`/`Hash` impls on `Value`).
pub type DictMap = HashMap<Value, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Number,
    Symbol,
    Cons,
    NativeFn,
    Boolean,
    String,
    Dictionary,
    Eof,
}

/// The core Value type for all Lisp data.
///
/// `Null`, `Bool`, and `Eof` carry no identity of their own, so each behaves
/// as a single shared instance: every `nil` is `eq` to every other `nil`.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Symbol(Rc<Symbol>),
    Cons(Rc<Cons>),
    NativeFn(Rc<NativeFn>),
    Dict(Rc<RefCell<DictMap>>),
    Eof,
}

impl Value {
    // --- Factories ---

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    /// Allocate a fresh, uninterned symbol. Interning is the job of
    /// [`crate::SymbolTable`]; two calls here never yield `eq` symbols.
    pub fn make_symbol(name: &str) -> Value {
        Value::Symbol(Rc::new(Symbol {
            name: name.to_string(),
            value: RefCell::new(Value::Null),
        }))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Cons(Rc::new(Cons {
            car: RefCell::new(car),
            cdr: RefCell::new(cdr),
        }))
    }

    pub fn dict() -> Value {
        Value::Dict(Rc::new(RefCell::new(DictMap::new())))
    }

    pub fn native_fn(f: NativeFn) -> Value {
        Value::NativeFn(Rc::new(f))
    }

    /// Build a proper list; an empty vector gives `nil`.
    pub fn list(items: Vec<Value>) -> Value {
        items
            .into_iter()
            .rev()
            .fold(Value::Null, |tail, item| Value::cons(item, tail))
    }

    // --- Type tests ---

    pub fn type_of(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Symbol(_) => ValueType::Symbol,
            Value::Cons(_) => ValueType::Cons,
            Value::NativeFn(_) => ValueType::NativeFn,
            Value::Dict(_) => ValueType::Dictionary,
            Value::Eof => ValueType::Eof,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Cons(_) => "cons",
            Value::NativeFn(_) => "native-fn",
            Value::Dict(_) => "dictionary",
            Value::Eof => "eof",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Value::Eof)
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::Cons(_))
    }

    pub fn is_symbol_named(&self, name: &str) -> bool {
        matches!(self, Value::Symbol(s) if s.name == name)
    }

    // --- Lenient accessors ---

    /// The numeric value, or NaN for anything that is not a number.
    pub fn num_val(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => f64::NAN,
        }
    }

    /// Truthiness: `nil` and `false` are false, everything else is true.
    pub fn bool_val(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        }
    }

    pub fn string_val(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    pub fn symbol_name(&self) -> &str {
        match self {
            Value::Symbol(s) => &s.name,
            _ => "",
        }
    }

    pub fn symbol_value(&self) -> Value {
        match self {
            Value::Symbol(s) => s.value.borrow().clone(),
            _ => Value::Null,
        }
    }

    pub fn set_symbol_value(&self, value: Value) -> Value {
        match self {
            Value::Symbol(s) => {
                *s.value.borrow_mut() = value.clone();
                value
            }
            _ => Value::Null,
        }
    }

    pub fn car(&self) -> Value {
        match self {
            Value::Cons(c) => c.car.borrow().clone(),
            _ => Value::Null,
        }
    }

    pub fn cdr(&self) -> Value {
        match self {
            Value::Cons(c) => c.cdr.borrow().clone(),
            _ => Value::Null,
        }
    }

    pub fn caar(&self) -> Value {
        self.car().car()
    }

    pub fn cadr(&self) -> Value {
        self.cdr().car()
    }

    pub fn cdar(&self) -> Value {
        self.car().cdr()
    }

    pub fn cddr(&self) -> Value {
        self.cdr().cdr()
    }

    pub fn caddr(&self) -> Value {
        self.cddr().car()
    }

    pub fn cadddr(&self) -> Value {
        self.cddr().cdr().car()
    }

    pub fn caddddr(&self) -> Value {
        self.cddr().cddr().car()
    }

    /// Replace the car in place. Returns the cons (or `self` unchanged when
    /// it is not a cons).
    pub fn rplaca(&self, value: Value) -> Value {
        if let Value::Cons(c) = self {
            *c.car.borrow_mut() = value;
        }
        self.clone()
    }

    pub fn rplacd(&self, value: Value) -> Value {
        if let Value::Cons(c) = self {
            *c.cdr.borrow_mut() = value;
        }
        self.clone()
    }

    // --- Dictionary operations (self is the dictionary) ---

    pub fn get(&self, key: &Value) -> Value {
        self.get_or(key, Value::Null)
    }

    /// Look up `key`, returning `not_found` when the dictionary lacks it.
    /// A non-dictionary always yields `nil`.
    pub fn get_or(&self, key: &Value, not_found: Value) -> Value {
        match self {
            Value::Dict(d) => d.borrow().get(key).cloned().unwrap_or(not_found),
            _ => Value::Null,
        }
    }

    pub fn put(&self, key: Value, value: Value) -> Value {
        match self {
            Value::Dict(d) => {
                d.borrow_mut().insert(key, value.clone());
                value
            }
            _ => Value::Null,
        }
    }

    pub fn keys(&self) -> Value {
        match self {
            Value::Dict(d) => d
                .borrow()
                .keys()
                .fold(Value::Null, |tail, key| Value::cons(key.clone(), tail)),
            _ => Value::Null,
        }
    }

    pub fn clear(&self) -> Value {
        match self {
            Value::Dict(d) => {
                d.borrow_mut().clear();
                self.clone()
            }
            _ => Value::Null,
        }
    }

    pub fn iter(&self) -> ListIter {
        ListIter { rest: self.clone() }
    }

    /// Structural equality: lists compared element-wise, atoms under `eq`.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Cons(_), Value::Cons(_)) => {
                self.car().equal(&other.car()) && self.cdr().equal(&other.cdr())
            }
            _ => self == other,
        }
    }

    fn identity(&self) -> usize {
        match self {
            Value::Symbol(s) => Rc::as_ptr(s) as *const () as usize,
            Value::Cons(c) => Rc::as_ptr(c) as *const () as usize,
            Value::NativeFn(f) => Rc::as_ptr(f) as *const () as usize,
            Value::Dict(d) => Rc::as_ptr(d) as *const () as usize,
            _ => 0,
        }
    }
}

// `eq` semantics: numbers and strings by content, everything else by
// identity. Backs dictionary key lookup as well.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Eof, Value::Eof) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFn(a), Value::NativeFn(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// NaN is never equal to itself, so a NaN key can be stored but not found.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Eof => {}
            Value::Bool(b) => b.hash(state),
            // 0.0 and -0.0 compare equal and must hash alike
            Value::Number(n) if *n == 0.0 => 0u64.hash(state),
            Value::Number(n) => n.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            _ => self.identity().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil"),
            Value::Bool(true) => write!(f, "true"),
            Value::Bool(false) => write!(f, "false"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{}", s.name),
            Value::NativeFn(_) => write!(f, "<CFunction>"),
            Value::Dict(_) => write!(f, "<Dictionary>"),
            Value::Eof => write!(f, "<Eof>"),
            Value::Cons(_) => {
                if let Some(prefix) = self.reader_prefix() {
                    return write!(f, "{prefix}{}", self.cadr());
                }
                write!(f, "(")?;
                let mut n = self.clone();
                loop {
                    write!(f, "{}", n.car())?;
                    n = n.cdr();
                    match n {
                        Value::Null => break,
                        Value::Cons(_) => write!(f, " ")?,
                        ref tail => {
                            write!(f, " . {tail}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Value {
    /// The reader sigil for `(quote x)` and `(sigval x)` forms, if `self` is
    /// exactly such a two-element list.
    pub fn reader_prefix(&self) -> Option<&'static str> {
        let rest = self.cdr();
        if !matches!(rest, Value::Cons(_)) || !rest.cdr().is_null() {
            return None;
        }
        let head = self.car();
        if head.is_symbol_named("quote") {
            Some("'")
        } else if head.is_symbol_named("sigval") {
            Some("$")
        } else {
            None
        }
    }
}

/// Iterator over the elements of a list. Stops at the first non-cons tail.
pub struct ListIter {
    rest: Value,
}

impl Iterator for ListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if !matches!(self.rest, Value::Cons(_)) {
            return None;
        }
        let item = self.rest.car();
        self.rest = self.rest.cdr();
        Some(item)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(ns: &[f64]) -> Value {
        Value::list(ns.iter().map(|n| Value::number(*n)).collect())
    }

    #[test]
    fn test_make_list_empty_is_nil() {
        assert!(Value::list(vec![]).is_null());
    }

    #[test]
    fn test_make_list_multiple_items() {
        let list = nums(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(list.type_of(), ValueType::Cons);
        assert_eq!(list.car().num_val(), 1.0);
        assert_eq!(list.cadr().num_val(), 2.0);
        assert_eq!(list.caddr().num_val(), 3.0);
        assert_eq!(list.cadddr().num_val(), 4.0);
        assert!(list.cddr().cddr().is_null());
    }

    #[test]
    fn test_iter_stops_at_dotted_tail() {
        let dotted = Value::cons(Value::number(1.0), Value::number(2.0));
        let items: Vec<f64> = dotted.iter().map(|v| v.num_val()).collect();
        assert_eq!(items, vec![1.0]);
        assert_eq!(nums(&[1.0, 2.0, 3.0]).iter().count(), 3);
        assert_eq!(Value::Null.iter().count(), 0);
    }

    #[test]
    fn test_car_cdr_of_atoms_are_nil() {
        assert!(Value::number(42.0).car().is_null());
        assert!(Value::number(42.0).cdr().is_null());
        assert!(Value::Null.car().is_null());
        assert!(Value::Null.cdr().is_null());
        assert!(Value::string("x").caddr().is_null());
    }

    #[test]
    fn test_rplaca_rplacd() {
        let cell = Value::cons(Value::number(1.0), Value::number(2.0));
        let result = cell.rplaca(Value::number(10.0));
        assert_eq!(cell.car().num_val(), 10.0);
        assert_eq!(cell.cdr().num_val(), 2.0);
        assert!(result == cell);

        cell.rplacd(Value::number(20.0));
        assert_eq!(cell.car().num_val(), 10.0);
        assert_eq!(cell.cdr().num_val(), 20.0);
    }

    #[test]
    fn test_rplacd_on_atom_is_noop() {
        let n = Value::number(3.0);
        let result = n.rplacd(Value::number(4.0));
        assert_eq!(result.num_val(), 3.0);
    }

    #[test]
    fn test_eq_relation() {
        assert!(Value::Null == Value::Null);
        assert!(Value::number(42.0) == Value::number(42.0));
        assert!(Value::number(42.0) != Value::number(1.0));
        assert!(Value::number(42.0) != Value::Null);
        assert!(Value::string("hello") == Value::string("hello"));
        assert!(Value::string("hello") != Value::string("world"));
        assert!(Value::make_symbol("a") != Value::make_symbol("a"));

        let list = nums(&[42.0]);
        assert!(list == list.clone());
        assert!(list != nums(&[42.0]));
        assert!(list.equal(&nums(&[42.0])));
    }

    #[test]
    fn test_num_val_of_non_numbers_is_nan() {
        assert!(Value::Null.num_val().is_nan());
        assert!(Value::make_symbol("s").num_val().is_nan());
        assert!(Value::Bool(true).num_val().is_nan());
        assert!(Value::string("1").num_val().is_nan());
        assert!(Value::dict().num_val().is_nan());
        assert!(Value::Eof.num_val().is_nan());
    }

    #[test]
    fn test_bool_val() {
        assert!(!Value::Null.bool_val());
        assert!(!Value::Bool(false).bool_val());
        assert!(Value::Bool(true).bool_val());
        assert!(Value::number(0.0).bool_val());
        assert!(Value::string("").bool_val());
        assert!(Value::dict().bool_val());
        assert!(Value::Eof.bool_val());
    }

    #[test]
    fn test_dict_get_put_clear() {
        let dict = Value::dict();
        let key1 = Value::make_symbol("key1");
        let key2 = Value::make_symbol("key2");
        assert!(dict.get(&key1).is_null());
        assert_eq!(dict.get_or(&key1, Value::number(100.0)).num_val(), 100.0);

        assert_eq!(dict.put(key1.clone(), Value::number(42.0)).num_val(), 42.0);
        assert_eq!(dict.get(&key1).num_val(), 42.0);
        dict.put(key1.clone(), Value::number(10.0));
        assert_eq!(dict.get(&key1).num_val(), 10.0);
        assert!(dict.get(&key2).is_null());

        dict.clear();
        assert!(dict.get(&key1).is_null());
        assert!(dict.keys().is_null());
    }

    #[test]
    fn test_dict_content_keys() {
        let dict = Value::dict();
        dict.put(Value::string("key1"), Value::number(42.0));
        dict.put(Value::number(0.0), Value::number(1.0));
        assert_eq!(dict.get(&Value::string("key1")).num_val(), 42.0);
        assert_eq!(dict.get(&Value::number(-0.0)).num_val(), 1.0);
    }

    #[test]
    fn test_dict_ops_on_non_dict() {
        let n = Value::number(1.0);
        assert!(n.get(&Value::Null).is_null());
        assert!(n.put(Value::Null, Value::number(2.0)).is_null());
        assert!(n.keys().is_null());
        assert!(n.clear().is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::number(42.0).to_string(), "42");
        assert_eq!(Value::number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Null.to_string(), "nil");
        assert_eq!(Value::string("some string").to_string(), "\"some string\"");
        assert_eq!(
            Value::cons(Value::number(1.0), Value::number(2.0)).to_string(),
            "(1 . 2)"
        );
        let nested = Value::list(vec![nums(&[1.0, 2.0]), Value::number(3.0)]);
        assert_eq!(nested.to_string(), "((1 2) 3)");
        let quoted = Value::list(vec![Value::make_symbol("quote"), Value::number(42.0)]);
        assert_eq!(quoted.to_string(), "'42");
        assert_eq!(Value::dict().to_string(), "<Dictionary>");
    }
}
