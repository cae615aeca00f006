use crate::syntax::*;
use std::{cell::RefCell, collections::HashSet, rc::Rc};

/* ------------------------------ Construction ------------------------------ */

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Rc::new(RefCell::new(s.into())))
    }
    pub fn cons(car: Value, cdr: Value) -> Self {
        Value::Pair(Rc::new(Pair::new(car, cdr)))
    }
    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(Rc::new(RefCell::new(items.into_iter().collect())))
    }
    /// A proper list of `items`.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        Value::list_with_tail(items, Value::Nil)
    }
    pub fn list_with_tail<I>(items: I, tail: Value) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items.into_iter().rev().fold(tail, |acc, item| Value::cons(item, acc))
    }
    pub fn special(s: impl Into<Special>) -> Self {
        Value::Special(Rc::new(s.into()))
    }
}

/* -------------------------------- Inspection ------------------------------ */

impl Value {
    /// Everything but `#f` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }
    pub fn is_procedure(&self) -> bool {
        matches!(self, Value::Native(_) | Value::Procedure(_) | Value::Continuation(_))
    }
    /// Split a (possibly improper) list into its elements and final tail.
    /// A spine that loops back on itself stops at the first revisited pair,
    /// which is returned as the tail.
    pub fn split_list(&self) -> (Vec<Value>, Value) {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut cur = self.clone();
        loop {
            match cur {
                | Value::Pair(pair) if seen.insert(Rc::as_ptr(&pair)) => {
                    items.push(pair.car());
                    cur = pair.cdr();
                }
                | tail => break (items, tail),
            }
        }
    }
    /// The elements of a proper list, or `None` for anything else.
    pub fn list_to_vec(&self) -> Option<Vec<Value>> {
        match self.split_list() {
            | (items, Value::Nil) => Some(items),
            | _ => None,
        }
    }
    pub fn is_list(&self) -> bool {
        matches!(self.split_list().1, Value::Nil)
    }
    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            | Value::Unspecified => "unspecified",
            | Value::Nil => "null",
            | Value::Bool(_) => "boolean",
            | Value::Char(_) => "char",
            | Value::Number(_) => "number",
            | Value::String(_) => "string",
            | Value::Symbol(_) => "symbol",
            | Value::Pair(_) => "pair",
            | Value::Vector(_) => "vector",
            | Value::Location(_) => "location",
            | Value::Lexical(_) => "lexical",
            | Value::Native(_) | Value::Procedure(_) | Value::Continuation(_) => "procedure",
            | Value::Transformer(_) => "transformer",
            | Value::Special(_) => "special form",
            | Value::Alias(_) => "alias",
            | Value::Object(obj) => obj.type_name,
        }
    }
}

/* -------------------------------- Equality -------------------------------- */

impl Value {
    /// `eq?`: identity for heap objects, value comparison for atoms.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            | (Value::Unspecified, Value::Unspecified) | (Value::Nil, Value::Nil) => true,
            | (Value::Bool(a), Value::Bool(b)) => a == b,
            | (Value::Char(a), Value::Char(b)) => a == b,
            | (Value::Number(a), Value::Number(b)) => a == b,
            | (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            | (Value::Symbol(a), Value::Symbol(b)) => a == b,
            | (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            | (Value::Vector(a), Value::Vector(b)) => Rc::ptr_eq(a, b),
            | (Value::Location(a), Value::Location(b)) => Rc::ptr_eq(a, b),
            | (Value::Lexical(a), Value::Lexical(b)) => a.slot == b.slot,
            | (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            | (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            | (Value::Continuation(a), Value::Continuation(b)) => Rc::ptr_eq(a, b),
            | (Value::Transformer(a), Value::Transformer(b)) => Rc::ptr_eq(a, b),
            | (Value::Special(a), Value::Special(b)) => Rc::ptr_eq(a, b),
            | (Value::Alias(a), Value::Alias(b)) => Rc::ptr_eq(a, b),
            | (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            | _ => false,
        }
    }
    /// `eqv?` coincides with `eq?` here: numbers and characters already
    /// compare by value.
    pub fn is_eqv(&self, other: &Value) -> bool {
        self.is_eq(other)
    }
    /// `equal?`: structural comparison of pairs, vectors and strings.
    pub fn is_equal(&self, other: &Value) -> bool {
        let (mut a, mut b) = (self.clone(), other.clone());
        // walk the spine iteratively so long lists don't recurse
        let mut seen = HashSet::new();
        loop {
            match (&a, &b) {
                | (Value::Pair(x), Value::Pair(y)) => {
                    // revisiting a pair of cells means both spines cycle in step
                    if Rc::ptr_eq(x, y) || !seen.insert((Rc::as_ptr(x), Rc::as_ptr(y))) {
                        return true;
                    }
                    if !x.car().is_equal(&y.car()) {
                        return false;
                    }
                    let (next_a, next_b) = (x.cdr(), y.cdr());
                    a = next_a;
                    b = next_b;
                }
                | (Value::String(x), Value::String(y)) => return *x.borrow() == *y.borrow(),
                | (Value::Vector(x), Value::Vector(y)) => {
                    let (x, y) = (x.borrow(), y.borrow());
                    return x.len() == y.len() && x.iter().zip(y.iter()).all(|(x, y)| x.is_equal(y));
                }
                | _ => return a.is_eqv(&b),
            }
        }
    }
}

/* --------------------------------- Aliases -------------------------------- */

impl Value {
    /// Replace every alias inside the datum by its base symbol. Returns `None`
    /// when there is nothing to replace, so callers can keep the original
    /// object.
    pub fn strip_aliases(&self) -> Option<Value> {
        match self {
            | Value::Alias(alias) => Some(Value::Symbol(alias.ident.symbol())),
            | Value::Pair(_) => {
                let (items, tail) = self.split_list();
                let stripped: Vec<_> = items.iter().map(|v| v.strip_aliases()).collect();
                let tail_stripped = match tail {
                    | Value::Pair(_) => None,
                    | _ => tail.strip_aliases(),
                };
                if stripped.iter().all(Option::is_none) && tail_stripped.is_none() {
                    return None;
                }
                let items = items.into_iter().zip(stripped).map(|(old, new)| new.unwrap_or(old));
                let items: Vec<_> = items.collect();
                Some(Value::list_with_tail(items, tail_stripped.unwrap_or(tail)))
            }
            | Value::Vector(items) => {
                let items = items.borrow();
                let stripped: Vec<_> = items.iter().map(|v| v.strip_aliases()).collect();
                if stripped.iter().all(Option::is_none) {
                    return None;
                }
                let items = items.iter().zip(stripped).map(|(old, new)| new.unwrap_or(old.clone()));
                Some(Value::vector(items.collect::<Vec<_>>()))
            }
            | _ => None,
        }
    }
}
