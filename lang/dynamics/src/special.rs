//! The core forms: `define`, `lambda`, `if`, `set!` and `begin`. Each
//! transformer returns a fully compiled [`Special`].

use crate::{
    env::{Binding, Environment, Ident},
    err::{EvalError, Result},
    syntax::*,
};
use std::rc::Rc;

/// The operands of `form`, which must be a proper list.
pub fn operands(keyword: &str, form: &Value) -> Result<Vec<Value>> {
    match form.list_to_vec() {
        | Some(mut items) if !items.is_empty() => {
            items.remove(0);
            Ok(items)
        }
        | _ => Err(EvalError::malformed(keyword, "Bad form")),
    }
}

fn ident(keyword: &str, v: &Value) -> Result<Ident> {
    Ident::from_value(v)
        .ok_or_else(|| EvalError::malformed(keyword, format!("{} is not an identifier", v.sourceify())))
}

/* --------------------------------- define --------------------------------- */

pub fn define(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("define", form)?;
    let (name, value) = match ops.as_slice() {
        // (define (name . formals) body ...)
        | [Value::Pair(head), body @ ..] if !body.is_empty() => {
            let name = ident("define", &head.car())?;
            let lambda = lambda_from(env, Some(name.symbol()), &head.cdr(), body)?;
            (name, Value::special(Special::Lambda(Rc::new(lambda))))
        }
        | [name, expr] => {
            let name = ident("define", name)?;
            let value = match expr.compile(env)? {
                | Value::Special(s) => match s.as_ref() {
                    | Special::Lambda(lambda) if lambda.name.is_none() => {
                        let named = Lambda { name: Some(name.symbol()), ..lambda.as_ref().clone() };
                        Value::special(Special::Lambda(Rc::new(named)))
                    }
                    | _ => Value::Special(s),
                },
                | value => value,
            };
            (name, value)
        }
        | [name] => (ident("define", name)?, Value::Unspecified),
        | _ => return Err(EvalError::malformed("define", "Bad form")),
    };
    let target = match env.is_top_level() {
        | true => Target::Global(name.symbol()),
        | false => Target::Local(env.scope_here(&name).unwrap_or_else(|| env.bind_scope(name))),
    };
    Ok(Value::special(Define { target, value }))
}

/// The name an internal `define` introduces, if `form` is one.
fn defined_name(env: &Environment, form: &Value) -> Option<Ident> {
    let Value::Pair(pair) = form else { return None };
    let head = Ident::from_value(&pair.car())?;
    let Binding::Syntax(t) = env.resolve(&head) else { return None };
    let define = env.world().primitive("define")?;
    if !Rc::ptr_eq(&t, define) {
        return None;
    }
    match pair.cdr() {
        | Value::Pair(rest) => match rest.car() {
            | Value::Pair(signature) => Ident::from_value(&signature.car()),
            | name => Ident::from_value(&name),
        },
        | _ => None,
    }
}

/// Compile a body in `scope`, binding its internal defines first so the
/// definitions may refer to each other.
pub fn compile_body(scope: &Environment, body: &[Value]) -> Result<im::Vector<Value>> {
    if !scope.is_top_level() {
        for form in body {
            if let Some(name) = defined_name(scope, form) {
                if scope.scope_here(&name).is_none() {
                    scope.bind_scope(name);
                }
            }
        }
    }
    body.iter().map(|form| form.compile(scope)).collect()
}

/* --------------------------------- lambda --------------------------------- */

pub fn lambda(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("lambda", form)?;
    match ops.split_first() {
        | Some((formals, body)) if !body.is_empty() => {
            Ok(Value::special(Special::Lambda(Rc::new(lambda_from(env, None, formals, body)?))))
        }
        | _ => Err(EvalError::malformed("lambda", "Bad form")),
    }
}

fn lambda_from(env: &Environment, name: Option<Symbol>, formals: &Value, body: &[Value]) -> Result<Lambda> {
    let scope = env.child();
    let (required, rest) = formals.split_list();
    let mut seen: Vec<Ident> = Vec::new();
    let mut bind = |v: &Value| -> Result<LexicalBinding> {
        let id = ident("lambda", v)?;
        if seen.contains(&id) {
            return Err(EvalError::malformed("lambda", format!("duplicate parameter {}", id.symbol())));
        }
        seen.push(id.clone());
        Ok(scope.bind_scope(id))
    };
    let params = required.iter().map(&mut bind).collect::<Result<Vec<_>>>()?;
    let rest = match rest {
        | Value::Nil => None,
        | rest => Some(bind(&rest)?),
    };
    let body = compile_body(&scope, body)?;
    Ok(Lambda { name, params, rest, body })
}

/* ------------------------------- if/set!/begin ---------------------------- */

pub fn if_(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("if", form)?;
    let (test, then, otherwise) = match ops.as_slice() {
        | [test, then] => (test, then, Value::Unspecified),
        | [test, then, otherwise] => (test, then, otherwise.compile(env)?),
        | _ => return Err(EvalError::malformed("if", "Bad form")),
    };
    Ok(Value::special(If { test: test.compile(env)?, then: then.compile(env)?, otherwise }))
}

pub fn set(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("set!", form)?;
    let [name, expr] = ops.as_slice() else {
        return Err(EvalError::malformed("set!", "Bad form"));
    };
    let target = match env.resolve(&ident("set!", name)?) {
        | Binding::Lexical(binding) => Target::Local(binding),
        | Binding::Global(name, _) => Target::Global(name),
        | Binding::Syntax(t) => {
            return Err(EvalError::malformed("set!", format!("cannot assign to keyword {}", t.name)));
        }
    };
    Ok(Value::special(Assign { target, value: expr.compile(env)? }))
}

pub fn begin(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("begin", form)?;
    let body = ops.iter().map(|form| form.compile(env)).collect::<Result<im::Vector<_>>>()?;
    Ok(Value::special(Begin(body)))
}
