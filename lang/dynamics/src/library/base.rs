//! The base library every fresh environment imports.

use super::{Entry, Library, Ty};
use crate::{
    env::Environment,
    err::{EvalError, Result},
    eval::{Kont, Step},
    syntax::*,
};
use std::{io::Write, rc::Rc};

pub fn library() -> Library {
    let mut lib = Library::new("base");
    for entry in pairs().into_iter().chain(numbers()).chain(text()).chain(vectors()).chain(control()) {
        lib.add(entry);
    }
    lib
}

/// Arguments that got past an entry's contract but not past the pattern
/// match of its implementation.
fn contract(name: &str) -> EvalError {
    EvalError::mismatch(name, "arguments do not satisfy the contract")
}

/* ---------------------------------- Pairs --------------------------------- */

fn pairs() -> Vec<Entry> {
    vec![
        Entry::value("cons", |_, args| match args {
            | [a, b] => Ok(Value::cons(a.clone(), b.clone())),
            | _ => Err(contract("cons")),
        })
        .required([Ty::Any, Ty::Any]),
        Entry::value("car", |_, args| match args {
            | [Value::Pair(p)] => Ok(p.car()),
            | _ => Err(contract("car")),
        })
        .required([Ty::Pair]),
        Entry::value("cdr", |_, args| match args {
            | [Value::Pair(p)] => Ok(p.cdr()),
            | _ => Err(contract("cdr")),
        })
        .required([Ty::Pair]),
        Entry::value("set-car!", |_, args| match args {
            | [Value::Pair(p), v] => {
                p.set_car(v.clone());
                Ok(Value::Unspecified)
            }
            | _ => Err(contract("set-car!")),
        })
        .required([Ty::Pair, Ty::Any]),
        Entry::value("set-cdr!", |_, args| match args {
            | [Value::Pair(p), v] => {
                p.set_cdr(v.clone());
                Ok(Value::Unspecified)
            }
            | _ => Err(contract("set-cdr!")),
        })
        .required([Ty::Pair, Ty::Any]),
        Entry::value("list", |_, args| Ok(Value::list(args.to_vec()))).rest(Ty::Any),
        Entry::value("length", |_, args| match args {
            | [list] => Ok(Value::Number(list.split_list().0.len() as f64)),
            | _ => Err(contract("length")),
        })
        .required([Ty::List]),
        Entry::value("append", |_, args| append(args)).rest(Ty::Any),
        Entry::value("reverse", |_, args| match args {
            | [list] => {
                let (items, _) = list.split_list();
                Ok(Value::list(items.into_iter().rev().collect::<Vec<_>>()))
            }
            | _ => Err(contract("reverse")),
        })
        .required([Ty::List]),
        Entry::value("list-ref", |_, args| match args {
            | [list, Value::Number(n)] => {
                let (items, _) = list.split_list();
                items.get(*n as usize).cloned().filter(|_| *n >= 0.0).ok_or_else(|| {
                    EvalError::mismatch("list-ref", format!("index {} out of range", number_source(*n)))
                })
            }
            | _ => Err(contract("list-ref")),
        })
        .required([Ty::List, Ty::Integer]),
        Entry::value("null?", |_, args| Ok(Value::Bool(matches!(args, [Value::Nil])))).required([Ty::Any]),
        Entry::value("pair?", |_, args| Ok(Value::Bool(matches!(args, [Value::Pair(_)]))))
            .required([Ty::Any]),
        Entry::value("list?", |_, args| Ok(Value::Bool(matches!(args, [v] if v.is_list()))))
            .required([Ty::Any]),
        Entry::value("eq?", |_, args| match args {
            | [a, b] => Ok(Value::Bool(a.is_eq(b))),
            | _ => Err(contract("eq?")),
        })
        .required([Ty::Any, Ty::Any]),
        Entry::value("eqv?", |_, args| match args {
            | [a, b] => Ok(Value::Bool(a.is_eqv(b))),
            | _ => Err(contract("eqv?")),
        })
        .required([Ty::Any, Ty::Any]),
        Entry::value("equal?", |_, args| match args {
            | [a, b] => Ok(Value::Bool(a.is_equal(b))),
            | _ => Err(contract("equal?")),
        })
        .required([Ty::Any, Ty::Any]),
    ]
}

fn append(args: &[Value]) -> Result<Value> {
    let Some((last, init)) = args.split_last() else {
        return Ok(Value::Nil);
    };
    let mut items = Vec::new();
    for (idx, list) in init.iter().enumerate() {
        let list = list
            .list_to_vec()
            .ok_or_else(|| EvalError::mismatch("append", format!("Argument {} is not a list", idx)))?;
        items.extend(list);
    }
    // the last argument is shared, not copied
    Ok(Value::list_with_tail(items, last.clone()))
}

/* --------------------------------- Numbers -------------------------------- */

fn nums(args: &[Value]) -> impl Iterator<Item = f64> + '_ {
    args.iter().filter_map(|v| match v {
        | Value::Number(n) => Some(*n),
        | _ => None,
    })
}

macro_rules! fold {
    ( $name:ident, $unit:expr, $op:tt ) => {
        fn $name(_: &Environment, args: &[Value]) -> Result<Value> {
            Ok(Value::Number(nums(args).fold($unit, |acc, n| acc $op n)))
        }
    };
}

fold!(add, 0.0, +);
fold!(mul, 1.0, *);

/// `(- x)` negates and `(/ x)` takes the reciprocal; otherwise fold from the
/// first argument.
macro_rules! invert {
    ( $name:ident, $unit:expr, $op:tt ) => {
        fn $name(_: &Environment, args: &[Value]) -> Result<Value> {
            let mut ns = nums(args);
            let first = ns.next().unwrap_or($unit);
            Ok(Value::Number(match args.len() {
                | 1 => $unit $op first,
                | _ => ns.fold(first, |acc, n| acc $op n),
            }))
        }
    };
}

invert!(sub, 0.0, -);
invert!(div, 1.0, /);

macro_rules! compare {
    ( $name:ident, $op:tt ) => {
        fn $name(_: &Environment, args: &[Value]) -> Result<Value> {
            let ns: Vec<f64> = nums(args).collect();
            Ok(Value::Bool(ns.windows(2).all(|w| w[0] $op w[1])))
        }
    };
}

compare!(num_eq, ==);
compare!(num_lt, <);
compare!(num_gt, >);
compare!(num_le, <=);
compare!(num_ge, >=);

macro_rules! integer_division {
    ( $name:ident, $prim:literal, $f:expr ) => {
        fn $name(_: &Environment, args: &[Value]) -> Result<Value> {
            match args {
                | [Value::Number(_), Value::Number(b)] if *b == 0.0 => {
                    Err(EvalError::mismatch($prim, "division by zero"))
                }
                | [Value::Number(a), Value::Number(b)] => Ok(Value::Number($f(*a, *b))),
                | _ => Err(contract($prim)),
            }
        }
    };
}

integer_division!(quotient, "quotient", |a: f64, b: f64| (a / b).trunc());
integer_division!(remainder, "remainder", |a: f64, b: f64| a % b);
integer_division!(modulo, "modulo", |a: f64, b: f64| ((a % b) + b) % b);

fn numbers() -> Vec<Entry> {
    vec![
        Entry::value("+", add).rest(Ty::Number),
        Entry::value("*", mul).rest(Ty::Number),
        Entry::value("-", sub).required([Ty::Number]).rest(Ty::Number),
        Entry::value("/", div).required([Ty::Number]).rest(Ty::Number),
        Entry::value("=", num_eq).required([Ty::Number]).rest(Ty::Number),
        Entry::value("<", num_lt).required([Ty::Number]).rest(Ty::Number),
        Entry::value(">", num_gt).required([Ty::Number]).rest(Ty::Number),
        Entry::value("<=", num_le).required([Ty::Number]).rest(Ty::Number),
        Entry::value(">=", num_ge).required([Ty::Number]).rest(Ty::Number),
        Entry::value("quotient", quotient).required([Ty::Integer, Ty::Integer]),
        Entry::value("remainder", remainder).required([Ty::Integer, Ty::Integer]),
        Entry::value("modulo", modulo).required([Ty::Integer, Ty::Integer]),
        Entry::value("number?", |_, args| Ok(Value::Bool(matches!(args, [Value::Number(_)]))))
            .required([Ty::Any]),
        Entry::value("zero?", |_, args| Ok(Value::Bool(matches!(args, [Value::Number(n)] if *n == 0.0))))
            .required([Ty::Number]),
        Entry::value("abs", |_, args| match args {
            | [Value::Number(n)] => Ok(Value::Number(n.abs())),
            | _ => Err(contract("abs")),
        })
        .required([Ty::Number]),
        Entry::value("not", |_, args| Ok(Value::Bool(matches!(args, [Value::Bool(false)]))))
            .required([Ty::Any]),
        Entry::value("boolean?", |_, args| Ok(Value::Bool(matches!(args, [Value::Bool(_)]))))
            .required([Ty::Any]),
    ]
}

/* ------------------------------ Symbols & text ---------------------------- */

fn text() -> Vec<Entry> {
    vec![
        Entry::value("symbol?", |_, args| Ok(Value::Bool(matches!(args, [Value::Symbol(_)]))))
            .required([Ty::Any]),
        Entry::value("string?", |_, args| Ok(Value::Bool(matches!(args, [Value::String(_)]))))
            .required([Ty::Any]),
        Entry::value("char?", |_, args| Ok(Value::Bool(matches!(args, [Value::Char(_)]))))
            .required([Ty::Any]),
        Entry::value("symbol->string", |_, args| match args {
            | [Value::Symbol(s)] => Ok(Value::string(s.name())),
            | _ => Err(contract("symbol->string")),
        })
        .required([Ty::Symbol]),
        Entry::value("string->symbol", |env, args| match args {
            | [Value::String(s)] => Ok(Value::Symbol(env.intern(&s.borrow()))),
            | _ => Err(contract("string->symbol")),
        })
        .required([Ty::String]),
        Entry::value("string-length", |_, args| match args {
            | [Value::String(s)] => Ok(Value::Number(s.borrow().chars().count() as f64)),
            | _ => Err(contract("string-length")),
        })
        .required([Ty::String]),
        Entry::value("string-append", |_, args| {
            let mut out = String::new();
            for arg in args {
                if let Value::String(s) = arg {
                    out.push_str(&s.borrow());
                }
            }
            Ok(Value::string(out))
        })
        .rest(Ty::String),
        Entry::value("string-ref", |_, args| match args {
            | [Value::String(s), Value::Number(n)] => {
                let idx = *n as usize;
                s.borrow().chars().nth(idx).filter(|_| *n >= 0.0).map(Value::Char).ok_or_else(|| {
                    EvalError::mismatch("string-ref", format!("index {} out of range", number_source(*n)))
                })
            }
            | _ => Err(contract("string-ref")),
        })
        .required([Ty::String, Ty::Integer]),
        Entry::value("substring", |_, args| {
            let (s, start, end) = match args {
                | [Value::String(s), Value::Number(start)] => (s, *start, None),
                | [Value::String(s), Value::Number(start), Value::Number(end)] => (s, *start, Some(*end)),
                | _ => return Err(contract("substring")),
            };
            let chars: Vec<char> = s.borrow().chars().collect();
            let end = end.unwrap_or(chars.len() as f64);
            if start < 0.0 || end < start || end as usize > chars.len() {
                return Err(EvalError::mismatch(
                    "substring",
                    format!("range {}..{} out of bounds", number_source(start), number_source(end)),
                ));
            }
            Ok(Value::string(chars[start as usize..end as usize].iter().collect::<String>()))
        })
        .required([Ty::String, Ty::Integer])
        .optional([Ty::Integer]),
    ]
}

/* --------------------------------- Vectors -------------------------------- */

fn vector_index(prim: &str, items: &[Value], n: f64) -> Result<usize> {
    let idx = n as usize;
    if n < 0.0 || idx >= items.len() {
        return Err(EvalError::mismatch(prim, format!("index {} out of range", number_source(n))));
    }
    Ok(idx)
}

/// Longest vector `make-vector` will build.
pub const MAX_VECTOR_LENGTH: usize = 1 << 24;

fn make_vector(n: f64, fill: Value) -> Result<Value> {
    let too_long = || {
        EvalError::mismatch("make-vector", format!("length {} is out of range", number_source(n)))
    };
    if n < 0.0 || n > MAX_VECTOR_LENGTH as f64 {
        return Err(too_long());
    }
    let len = n as usize;
    let mut items = Vec::new();
    items.try_reserve_exact(len).map_err(|_| too_long())?;
    items.resize(len, fill);
    Ok(Value::vector(items))
}

fn vectors() -> Vec<Entry> {
    vec![
        Entry::value("vector", |_, args| Ok(Value::vector(args.to_vec()))).rest(Ty::Any),
        Entry::value("make-vector", |_, args| match args {
            | [Value::Number(n)] => make_vector(*n, Value::Unspecified),
            | [Value::Number(n), fill] => make_vector(*n, fill.clone()),
            | _ => Err(contract("make-vector")),
        })
        .required([Ty::Integer])
        .optional([Ty::Any]),
        Entry::value("vector?", |_, args| Ok(Value::Bool(matches!(args, [Value::Vector(_)]))))
            .required([Ty::Any]),
        Entry::value("vector-ref", |_, args| match args {
            | [Value::Vector(items), Value::Number(n)] => {
                let items = items.borrow();
                Ok(items[vector_index("vector-ref", &items, *n)?].clone())
            }
            | _ => Err(contract("vector-ref")),
        })
        .required([Ty::Vector, Ty::Integer]),
        Entry::value("vector-set!", |_, args| match args {
            | [Value::Vector(items), Value::Number(n), v] => {
                let idx = vector_index("vector-set!", &items.borrow(), *n)?;
                items.borrow_mut()[idx] = v.clone();
                Ok(Value::Unspecified)
            }
            | _ => Err(contract("vector-set!")),
        })
        .required([Ty::Vector, Ty::Integer, Ty::Any]),
        Entry::value("vector-length", |_, args| match args {
            | [Value::Vector(items)] => Ok(Value::Number(items.borrow().len() as f64)),
            | _ => Err(contract("vector-length")),
        })
        .required([Ty::Vector]),
        Entry::value("vector->list", |_, args| match args {
            | [Value::Vector(items)] => Ok(Value::list(items.borrow().clone())),
            | _ => Err(contract("vector->list")),
        })
        .required([Ty::Vector]),
        Entry::value("list->vector", |_, args| match args {
            | [list] => Ok(Value::vector(list.split_list().0)),
            | _ => Err(contract("list->vector")),
        })
        .required([Ty::List]),
    ]
}

/* --------------------------------- Control -------------------------------- */

fn call_cc(env: &Environment, k: Kont, args: Vec<Value>) -> Result<Step> {
    match args.as_slice() {
        | [f] => {
            let cont = Value::Continuation(Rc::new(Continuation { kont: k.clone() }));
            f.apply(env, k, vec![cont])
        }
        | _ => Err(contract("call/cc")),
    }
}

fn apply(env: &Environment, k: Kont, args: Vec<Value>) -> Result<Step> {
    let Some((f, rest)) = args.split_first() else {
        return Err(contract("apply"));
    };
    let mut spread = Vec::new();
    if let Some((last, init)) = rest.split_last() {
        spread.extend(init.iter().cloned());
        let tail = last.list_to_vec().ok_or_else(|| {
            EvalError::mismatch("apply", format!("Argument {} is not a list", rest.len()))
        })?;
        spread.extend(tail);
    }
    f.apply(env, k, spread)
}

/// Evaluate the datum at the caller's top level, on the running trampoline,
/// so continuations captured outside it can still be invoked from inside.
fn eval(env: &Environment, k: Kont, args: Vec<Value>) -> Result<Step> {
    match args.as_slice() {
        | [datum] => env.top_level().eval_nested(datum, k),
        | _ => Err(contract("eval")),
    }
}

fn error(args: &[Value]) -> EvalError {
    let mut msg = match args.first() {
        | Some(first) => first.stringify(),
        | None => String::new(),
    };
    for irritant in args.iter().skip(1) {
        msg.push(' ');
        msg.push_str(&irritant.sourceify());
    }
    EvalError::Raised(msg)
}

fn control() -> Vec<Entry> {
    vec![
        Entry::value("procedure?", |_, args| Ok(Value::Bool(matches!(args, [v] if v.is_procedure()))))
            .required([Ty::Any]),
        Entry::kont("apply", apply).required([Ty::Procedure]).rest(Ty::Any),
        Entry::kont("call-with-current-continuation", call_cc).required([Ty::Procedure]),
        Entry::kont("call/cc", call_cc).required([Ty::Procedure]),
        Entry::kont("eval", eval).required([Ty::Any]),
        Entry::value("error", |_, args| Err(error(args))).required([Ty::Any]).rest(Ty::Any),
        Entry::value("display", |env, args| {
            for arg in args {
                write!(env.world().output(), "{}", arg.stringify())?;
            }
            Ok(Value::Unspecified)
        })
        .required([Ty::Any]),
        Entry::value("write", |env, args| {
            for arg in args {
                write!(env.world().output(), "{}", arg.sourceify())?;
            }
            Ok(Value::Unspecified)
        })
        .required([Ty::Any]),
        Entry::value("newline", |env, _| {
            writeln!(env.world().output())?;
            Ok(Value::Unspecified)
        }),
    ]
}
