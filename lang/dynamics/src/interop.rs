//! Marshalling between runtime values and host values, and the namespace
//! `native-apply` resolves paths in.

use crate::syntax::*;
use auto_impl::auto_impl;
use std::{fmt, rc::Rc};
use thiserror::Error;

/// The shapes a host callable accepts and returns.
#[derive(Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<HostValue>),
    Object(NativeObject),
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | HostValue::Null => write!(f, "null"),
            | HostValue::Bool(b) => write!(f, "{}", b),
            | HostValue::Number(n) => write!(f, "{}", n),
            | HostValue::String(s) => write!(f, "{:?}", s),
            | HostValue::List(items) => f.debug_list().entries(items).finish(),
            | HostValue::Object(obj) => write!(f, "<{}>", obj.type_name),
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            | (HostValue::Null, HostValue::Null) => true,
            | (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            | (HostValue::Number(a), HostValue::Number(b)) => a == b,
            | (HostValue::String(a), HostValue::String(b)) => a == b,
            | (HostValue::List(a), HostValue::List(b)) => a == b,
            | (HostValue::Object(a), HostValue::Object(b)) => a.ptr_eq(b),
            | _ => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("native-apply: {0} is not provided by the host")]
    Unresolved(String),
    #[error("{callee}: cannot pass {value} to the host")]
    Unmarshallable { callee: String, value: String },
    #[error("{callee}: {msg}")]
    Call { callee: String, msg: String },
}

pub type HostFn = Rc<dyn Fn(Vec<HostValue>) -> Result<HostValue, HostError>>;

/// Resolves qualified paths such as `["Math", "max"]` to host callables.
#[auto_impl(&, Box, Rc)]
pub trait HostNamespace {
    fn resolve(&self, path: &[String]) -> Result<HostFn, HostError>;
}

/// A namespace that provides nothing.
pub struct NoHost;

impl HostNamespace for NoHost {
    fn resolve(&self, path: &[String]) -> Result<HostFn, HostError> {
        Err(HostError::Unresolved(path.join(".")))
    }
}

pub fn to_host(callee: &str, v: &Value) -> Result<HostValue, HostError> {
    let unmarshallable =
        || HostError::Unmarshallable { callee: callee.to_string(), value: v.sourceify() };
    Ok(match v {
        | Value::Unspecified => HostValue::Null,
        | Value::Bool(b) => HostValue::Bool(*b),
        | Value::Number(n) => HostValue::Number(*n),
        | Value::Char(c) => HostValue::String(c.to_string()),
        | Value::String(s) => HostValue::String(s.borrow().clone()),
        | Value::Symbol(s) => HostValue::String(s.name().to_string()),
        | Value::Nil | Value::Pair(_) => {
            let items = v.list_to_vec().ok_or_else(unmarshallable)?;
            HostValue::List(items.iter().map(|item| to_host(callee, item)).collect::<Result<_, _>>()?)
        }
        | Value::Vector(items) => HostValue::List(
            items.borrow().iter().map(|item| to_host(callee, item)).collect::<Result<_, _>>()?,
        ),
        | Value::Object(obj) => HostValue::Object(obj.clone()),
        | _ => return Err(unmarshallable()),
    })
}

pub fn from_host(v: HostValue) -> Value {
    match v {
        | HostValue::Null => Value::Unspecified,
        | HostValue::Bool(b) => Value::Bool(b),
        | HostValue::Number(n) => Value::Number(n),
        | HostValue::String(s) => Value::string(s),
        | HostValue::List(items) => Value::list(items.into_iter().map(from_host).collect::<Vec<_>>()),
        | HostValue::Object(obj) => Value::Object(obj),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_marshal_both_ways() {
        let v = Value::list([Value::Number(1.0), Value::string("a"), Value::Bool(true)]);
        let host = to_host("t", &v).unwrap();
        assert_eq!(
            host,
            HostValue::List(vec![
                HostValue::Number(1.0),
                HostValue::String("a".to_string()),
                HostValue::Bool(true)
            ])
        );
        assert!(from_host(host).is_equal(&v));
    }

    #[test]
    fn improper_lists_are_refused() {
        let v = Value::cons(Value::Number(1.0), Value::Number(2.0));
        assert!(matches!(to_host("t", &v), Err(HostError::Unmarshallable { .. })));
    }

    #[test]
    fn no_host_resolves_nothing() {
        let path = vec!["Math".to_string(), "max".to_string()];
        match NoHost.resolve(&path) {
            | Err(err) => assert_eq!(err, HostError::Unresolved("Math.max".to_string())),
            | Ok(_) => panic!("resolved against an empty namespace"),
        }
    }
}
