//! Reader output to runtime values.

use crate::syntax::*;
use roux_surface::Datum;

pub trait Link {
    type Out;
    fn link(&self, symbols: &SymbolTable) -> Self::Out;
}

impl Link for Datum {
    type Out = Value;

    fn link(&self, symbols: &SymbolTable) -> Self::Out {
        match self {
            | Datum::Bool(b) => Value::Bool(*b),
            | Datum::Char(c) => Value::Char(*c),
            | Datum::Number(n) => Value::Number(*n),
            | Datum::String(s) => Value::string(s.clone()),
            | Datum::Symbol(name) => Value::Symbol(symbols.intern(name)),
            | Datum::List(items, tail) => {
                let items = items.link(symbols);
                let tail = match tail {
                    | Some(tail) => tail.link(symbols),
                    | None => Value::Nil,
                };
                Value::list_with_tail(items, tail)
            }
            | Datum::Vector(items) => Value::vector(items.link(symbols)),
        }
    }
}

impl Link for [Datum] {
    type Out = Vec<Value>;

    fn link(&self, symbols: &SymbolTable) -> Self::Out {
        self.iter().map(|datum| datum.link(symbols)).collect()
    }
}
