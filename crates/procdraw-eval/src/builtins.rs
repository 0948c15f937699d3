use procdraw_core::Value;

use crate::env;
use crate::eval::Interpreter;
use crate::math;

fn sum(args: &Value) -> f64 {
    args.iter().map(|x| x.num_val()).sum()
}

fn product(args: &Value) -> f64 {
    args.iter().map(|x| x.num_val()).product()
}

/// `(-)` is 0, `(- x)` negates, otherwise subtract the rest from the first.
fn difference(args: &Value) -> f64 {
    let mut nums = args.iter().map(|x| x.num_val());
    match nums.next() {
        None => 0.0,
        Some(first) => {
            let rest = args.cdr();
            if rest.is_null() {
                -first
            } else {
                nums.fold(first, |acc, x| acc - x)
            }
        }
    }
}

/// `(/)` is 1, `(/ x)` is the reciprocal, otherwise divide the first by the
/// rest. Division by zero follows IEEE rules.
fn quotient(args: &Value) -> f64 {
    let mut nums = args.iter().map(|x| x.num_val());
    match nums.next() {
        None => 1.0,
        Some(first) => {
            if args.cdr().is_null() {
                1.0 / first
            } else {
                nums.fold(first, |acc, x| acc / x)
            }
        }
    }
}

/// The first `N` arguments as numbers; missing ones read as NaN.
fn num_args<const N: usize>(args: &Value) -> [f64; N] {
    let mut out = [f64::NAN; N];
    for (slot, arg) in out.iter_mut().zip(args.iter()) {
        *slot = arg.num_val();
    }
    out
}

pub fn register_builtins(interp: &Interpreter) {
    // Arithmetic
    interp.register_native_fn("*", |_, args, _| Value::number(product(args)));
    interp.register_native_fn("+", |_, args, _| Value::number(sum(args)));
    interp.register_native_fn("-", |_, args, _| Value::number(difference(args)));
    interp.register_native_fn("/", |_, args, _| Value::number(quotient(args)));

    // Lists and application
    interp.register_native_fn("apply", |ctx, args, env| {
        ctx.apply(&args.car(), &args.cadr(), env)
    });
    interp.register_native_fn("assoc", |_, args, _| {
        env::assoc(&args.car(), &args.cadr())
    });
    interp.register_native_fn("car", |_, args, _| args.caar());
    interp.register_native_fn("cdr", |_, args, _| args.cdar());
    interp.register_native_fn("cons", |_, args, _| {
        Value::cons(args.car(), args.cadr())
    });
    interp.register_native_fn("eq", |_, args, _| {
        Value::Bool(args.car() == args.cadr())
    });
    interp.register_native_fn("functionp", |ctx, args, _| {
        Value::Bool(ctx.functionp(&args.car()))
    });
    interp.register_native_fn("memb", |_, args, _| {
        Value::Bool(env::memb(&args.car(), &args.cadr()))
    });
    interp.register_native_fn("not", |_, args, _| env::not(&args.car()));
    interp.register_native_fn("putassoc", |_, args, _| {
        env::putassoc(&args.car(), args.cadr(), &args.caddr())
    });

    // Dictionaries: (get dict key), (put dict key val)
    interp.register_native_fn("clear", |_, args, _| args.car().clear());
    interp.register_native_fn("get", |_, args, _| args.car().get(&args.cadr()));
    interp.register_native_fn("keys", |_, args, _| args.car().keys());
    interp.register_native_fn("make-dict", |_, _, _| Value::dict());
    interp.register_native_fn("put", |_, args, _| {
        args.car().put(args.cadr(), args.caddr())
    });

    // Ranges
    interp.register_native_fn("lerp", |_, args, _| {
        let [start, stop, v] = num_args::<3>(args);
        Value::number(math::lerp(start, stop, v))
    });
    interp.register_native_fn("map-range", |_, args, _| {
        let [start1, stop1, start2, stop2, v] = num_args::<5>(args);
        Value::number(math::map_range(start1, stop1, start2, stop2, v))
    });
    interp.register_native_fn("norm", |_, args, _| {
        let [start, stop, v] = num_args::<3>(args);
        Value::number(math::norm(start, stop, v))
    });
    interp.register_native_fn("wrap", |_, args, _| {
        let [start, stop, v] = num_args::<3>(args);
        Value::number(math::wrap(start, stop, v))
    });

    interp.set_global("pi", Value::number(std::f64::consts::PI));
}
