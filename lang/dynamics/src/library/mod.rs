//! Named collections of native procedures with declared argument contracts.

pub mod base;

use crate::{
    env::Environment,
    err::{EvalError, Result},
    eval::{Kont, Step},
    syntax::*,
};
use indexmap::IndexMap;
use std::rc::Rc;

/// Argument type contract, checked before an entry runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ty {
    Any,
    Number,
    Integer,
    String,
    Symbol,
    Char,
    Bool,
    Pair,
    List,
    Vector,
    Procedure,
    /// A host object of the named type.
    Object(&'static str),
}

impl Ty {
    pub fn check(&self, v: &Value) -> bool {
        match self {
            | Ty::Any => true,
            | Ty::Number => matches!(v, Value::Number(_)),
            | Ty::Integer => matches!(v, Value::Number(n) if n.fract() == 0.0),
            | Ty::String => matches!(v, Value::String(_)),
            | Ty::Symbol => matches!(v, Value::Symbol(_)),
            | Ty::Char => matches!(v, Value::Char(_)),
            | Ty::Bool => matches!(v, Value::Bool(_)),
            | Ty::Pair => matches!(v, Value::Pair(_)),
            | Ty::List => v.is_list(),
            | Ty::Vector => matches!(v, Value::Vector(_)),
            | Ty::Procedure => v.is_procedure(),
            | Ty::Object(name) => matches!(v, Value::Object(obj) if obj.type_name == *name),
        }
    }
    fn describe(&self) -> String {
        match self {
            | Ty::Any => "a value".to_string(),
            | Ty::Number => "a number".to_string(),
            | Ty::Integer => "an integer".to_string(),
            | Ty::String => "a string".to_string(),
            | Ty::Symbol => "a symbol".to_string(),
            | Ty::Char => "a char".to_string(),
            | Ty::Bool => "a boolean".to_string(),
            | Ty::Pair => "a pair".to_string(),
            | Ty::List => "a list".to_string(),
            | Ty::Vector => "a vector".to_string(),
            | Ty::Procedure => "a procedure".to_string(),
            | Ty::Object(name) => match name.starts_with(['a', 'e', 'i', 'o', 'u']) {
                | true => format!("an {}", name),
                | false => format!("a {}", name),
            },
        }
    }
}

pub type ValueImpl = dyn Fn(&Environment, &[Value]) -> Result<Value>;
pub type KontImpl = dyn Fn(&Environment, Kont, Vec<Value>) -> Result<Step>;

pub enum Imp {
    /// Returns a value; the runtime passes it on to the continuation.
    Value(Rc<ValueImpl>),
    /// Takes over the continuation.
    Kont(Rc<KontImpl>),
}

pub struct Entry {
    pub name: String,
    pub required: Vec<Ty>,
    pub optional: Vec<Ty>,
    /// Type of every argument past the optional ones; `None` forbids extras.
    pub rest: Option<Ty>,
    pub imp: Imp,
}

impl Entry {
    pub fn value(
        name: impl Into<String>, f: impl Fn(&Environment, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Entry::with(name, Imp::Value(Rc::new(f)))
    }
    pub fn kont(
        name: impl Into<String>,
        f: impl Fn(&Environment, Kont, Vec<Value>) -> Result<Step> + 'static,
    ) -> Self {
        Entry::with(name, Imp::Kont(Rc::new(f)))
    }
    fn with(name: impl Into<String>, imp: Imp) -> Self {
        Entry { name: name.into(), required: Vec::new(), optional: Vec::new(), rest: None, imp }
    }
    pub fn required(mut self, tys: impl IntoIterator<Item = Ty>) -> Self {
        self.required = tys.into_iter().collect();
        self
    }
    pub fn optional(mut self, tys: impl IntoIterator<Item = Ty>) -> Self {
        self.optional = tys.into_iter().collect();
        self
    }
    pub fn rest(mut self, ty: Ty) -> Self {
        self.rest = Some(ty);
        self
    }

    fn expected(&self) -> String {
        let (lo, hi) = (self.required.len(), self.required.len() + self.optional.len());
        match self.rest {
            | Some(_) => format!("at least {}", lo),
            | None if lo == hi => lo.to_string(),
            | None => format!("{} to {}", lo, hi),
        }
    }

    /// Check arity and argument types against the contract.
    pub fn check(&self, args: &[Value]) -> Result<()> {
        let (lo, hi) = (self.required.len(), self.required.len() + self.optional.len());
        if args.len() < lo || (self.rest.is_none() && args.len() > hi) {
            return Err(EvalError::ArityError {
                prim: self.name.clone(),
                expected: self.expected(),
                got: args.len(),
            });
        }
        let tys = self.required.iter().chain(self.optional.iter()).chain(self.rest.iter().cycle());
        for (idx, (arg, ty)) in args.iter().zip(tys).enumerate() {
            if !ty.check(arg) {
                return Err(EvalError::mismatch(
                    self.name.clone(),
                    format!("Argument {} is not {}", idx, ty.describe()),
                ));
            }
        }
        Ok(())
    }

    /// The callable installed into an environment.
    pub fn to_native(&self) -> NativeFunction {
        let contract = Entry {
            name: self.name.clone(),
            required: self.required.clone(),
            optional: self.optional.clone(),
            rest: self.rest,
            imp: match &self.imp {
                | Imp::Value(f) => Imp::Value(f.clone()),
                | Imp::Kont(f) => Imp::Kont(f.clone()),
            },
        };
        NativeFunction::new(self.name.clone(), move |env, k, args| {
            contract.check(&args)?;
            match &contract.imp {
                | Imp::Value(f) => Ok(k.bounce(f(env, &args)?)),
                | Imp::Kont(f) => f(env, k, args),
            }
        })
    }
}

pub struct Library {
    pub name: String,
    entries: IndexMap<String, Entry>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Library { name: name.into(), entries: IndexMap::new() }
    }
    /// Add an entry, replacing one of the same name.
    pub fn entry(mut self, entry: Entry) -> Self {
        self.add(entry);
        self
    }
    pub fn add(&mut self, entry: Entry) {
        self.entries.insert(entry.name.clone(), entry);
    }
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
