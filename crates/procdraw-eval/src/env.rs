//! Association-list environments and the list helpers built on them.
//!
//! An environment is a list of `(symbol . value)` pairs searched front to
//! back; a symbol missing from it resolves to its own global slot.

use procdraw_core::Value;

/// Walk `alist` for a pair whose key is `eq` to `key`.
///
/// Returns `Ok(pair)` on a hit, else `Err(last_cell)`: the final cons of the
/// list (or `alist` itself when it is empty), where a new pair can be linked.
fn find_pair(key: &Value, alist: &Value) -> Result<Value, Value> {
    let mut prev = alist.clone();
    let mut next = alist.clone();
    while let Value::Cons(_) = next {
        let pair = next.car();
        if pair.car() == *key {
            return Ok(pair);
        }
        prev = next.clone();
        next = next.cdr();
    }
    Err(prev)
}

/// The first `(key . value)` pair in `alist` whose key is `eq` to `key`, or
/// `nil`.
pub fn assoc(key: &Value, alist: &Value) -> Value {
    find_pair(key, alist).unwrap_or_default()
}

/// Update the first pair keyed by `key`, or append `(key . val)` to the end
/// of `alist`. Returns `val`. Does nothing when `alist` is not a cons, since
/// there is no cell to attach to.
pub fn putassoc(key: &Value, val: Value, alist: &Value) -> Value {
    if !matches!(alist, Value::Cons(_)) {
        tracing::debug!(%key, "putassoc on a non-list is ignored");
        return val;
    }
    match find_pair(key, alist) {
        Ok(pair) => {
            pair.rplacd(val.clone());
        }
        Err(last) => {
            last.rplacd(Value::list(vec![Value::cons(key.clone(), val.clone())]));
        }
    }
    val
}

/// True when some element of `list` is `eq` to `obj`.
pub fn memb(obj: &Value, list: &Value) -> bool {
    list.iter().any(|item| item == *obj)
}

/// Extend `env` with one `(param . arg)` pair per parameter.
///
/// Extra arguments are dropped; parameters without an argument bind `nil`.
pub fn bind(params: &Value, args: &Value, env: &Value) -> Value {
    let mut env = env.clone();
    let mut args = args.clone();
    for param in params.iter() {
        env = Value::cons(Value::cons(param, args.car()), env);
        args = args.cdr();
    }
    env
}

/// The value of `symbol`: its innermost binding in `env`, else its global
/// slot.
pub fn value(symbol: &Value, env: &Value) -> Value {
    match assoc(symbol, env) {
        Value::Null => symbol.symbol_value(),
        binding => binding.cdr(),
    }
}

/// Assign `symbol`. A binding in `env` is updated in place; otherwise the
/// global slot is set. Returns `value`.
pub fn set(symbol: &Value, value: Value, env: &Value) -> Value {
    match assoc(symbol, env) {
        Value::Null => {
            symbol.set_symbol_value(value.clone());
        }
        binding => {
            binding.rplacd(value.clone());
        }
    }
    value
}

/// Logical negation under the truthiness rules: `nil` and `false` give
/// `true`, everything else `false`.
pub fn not(obj: &Value) -> Value {
    Value::Bool(!obj.bool_val())
}
