pub use roux_syntax::*;

use crate::{
    env::{Environment, Ident},
    err::Result,
    eval::{Kont, Step},
};
use derive_more::From;
use roux_utils::new_key_type;
use std::{any::Any, cell::RefCell, rc::Rc};

new_key_type! {
    /// A lexical variable slot; minted once per binding occurrence at compile time.
    pub struct SlotId;
}

/* ---------------------------------- Value --------------------------------- */

/// Every runtime object. Heap variants are reference counted, so cloning a
/// `Value` shares the object and `eq?` compares the pointers.
#[derive(Clone)]
pub enum Value {
    Unspecified,
    Nil,
    Bool(bool),
    Char(char),
    Number(f64),
    String(Rc<RefCell<String>>),
    Symbol(Symbol),
    Pair(Rc<Pair>),
    Vector(Rc<RefCell<Vec<Value>>>),
    /// A compiled reference to a global binding.
    Location(Rc<Location>),
    /// A compiled reference to a lexical slot.
    Lexical(LexicalBinding),
    Native(Rc<NativeFunction>),
    Procedure(Rc<Procedure>),
    Continuation(Rc<Continuation>),
    Transformer(Rc<Transformer>),
    /// A compiled core form.
    Special(Rc<Special>),
    /// An identifier renamed by a macro expansion.
    Alias(Rc<Alias>),
    Object(NativeObject),
}

macro_rules! value_from {
    ( $($ty:ty => $variant:ident),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    char => Char,
    f64 => Number,
    Symbol => Symbol,
    Rc<Pair> => Pair,
    Rc<Location> => Location,
    LexicalBinding => Lexical,
    Rc<NativeFunction> => Native,
    Rc<Procedure> => Procedure,
    Rc<Continuation> => Continuation,
    Rc<Transformer> => Transformer,
    Rc<Special> => Special,
    Rc<Alias> => Alias,
    NativeObject => Object,
}

pub struct Pair {
    car: RefCell<Value>,
    cdr: RefCell<Value>,
}

impl Pair {
    pub fn new(car: Value, cdr: Value) -> Self {
        Pair { car: RefCell::new(car), cdr: RefCell::new(cdr) }
    }
    pub fn car(&self) -> Value {
        self.car.borrow().clone()
    }
    pub fn cdr(&self) -> Value {
        self.cdr.borrow().clone()
    }
    pub fn set_car(&self, v: Value) {
        *self.car.borrow_mut() = v;
    }
    pub fn set_cdr(&self, v: Value) {
        *self.cdr.borrow_mut() = v;
    }
}

/// A mutable cell holding a binding's current value.
pub struct Location {
    pub name: Symbol,
    value: RefCell<Value>,
}

impl Location {
    pub fn new(name: Symbol, value: Value) -> Self {
        Location { name, value: RefCell::new(value) }
    }
    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }
    pub fn set(&self, v: Value) {
        *self.value.borrow_mut() = v;
    }
}

#[derive(Clone, Debug)]
pub struct LexicalBinding {
    pub name: Symbol,
    pub slot: SlotId,
}

/* -------------------------------- Callables ------------------------------- */

pub type NativeImpl = dyn Fn(&Environment, Kont, Vec<Value>) -> Result<Step>;

/// A callable implemented in Rust. It receives the caller's continuation and
/// decides itself how to resume.
pub struct NativeFunction {
    pub name: String,
    pub imp: Rc<NativeImpl>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        imp: impl Fn(&Environment, Kont, Vec<Value>) -> Result<Step> + 'static,
    ) -> Self {
        NativeFunction { name: name.into(), imp: Rc::new(imp) }
    }
}

/// The compiled shape of a `lambda`.
#[derive(Clone)]
pub struct Lambda {
    pub name: Option<Symbol>,
    pub params: Vec<LexicalBinding>,
    pub rest: Option<LexicalBinding>,
    pub body: im::Vector<Value>,
}

/// A closure: a lambda paired with the environment it was created in.
pub struct Procedure {
    pub lambda: Rc<Lambda>,
    pub env: Environment,
}

/// A captured continuation, callable with exactly one argument.
pub struct Continuation {
    pub kont: Kont,
}

pub type TransformImpl = dyn Fn(&Environment, &Value) -> Result<Value>;

/// A syntax transformer: rewrites a whole form at compile time.
pub struct Transformer {
    pub name: String,
    pub transform: Rc<TransformImpl>,
}

impl Transformer {
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(&Environment, &Value) -> Result<Value> + 'static,
    ) -> Self {
        Transformer { name: name.into(), transform: Rc::new(transform) }
    }
    /// The same rewriting under another keyword.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Transformer { name: name.into(), transform: self.transform.clone() }
    }
}

/* ---------------------------------- Core ---------------------------------- */

#[derive(Clone, Debug)]
pub enum Target {
    Global(Symbol),
    Local(LexicalBinding),
}

pub struct If {
    pub test: Value,
    pub then: Value,
    pub otherwise: Value,
}

pub struct Define {
    pub target: Target,
    pub value: Value,
}

pub struct Assign {
    pub target: Target,
    pub value: Value,
}

pub struct Begin(pub im::Vector<Value>);

#[derive(From)]
pub enum Special {
    If(If),
    Define(Define),
    Assign(Assign),
    Lambda(Rc<Lambda>),
    Begin(Begin),
}

/* ---------------------------------- Misc ---------------------------------- */

/// An identifier introduced by a template, resolved in the environment that
/// defined the macro.
pub struct Alias {
    pub ident: Ident,
    pub env: Environment,
}

/// An opaque host object.
#[derive(Clone)]
pub struct NativeObject {
    pub type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl NativeObject {
    pub fn new<T: Any>(type_name: &'static str, value: T) -> Self {
        NativeObject { type_name, inner: Rc::new(value) }
    }
    pub fn from_rc<T: Any>(type_name: &'static str, value: Rc<T>) -> Self {
        NativeObject { type_name, inner: value }
    }
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }
    pub fn ptr_eq(&self, other: &NativeObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
