use crate::{
    err::{EvalError, Result},
    library::Library,
    syntax::*,
    world::World,
};
use std::{cell::RefCell, hash, rc::Rc};

/* ---------------------------------- Ident --------------------------------- */

/// Something that can be bound: a plain symbol, or a symbol renamed by a
/// particular macro expansion.
#[derive(Clone)]
pub enum Ident {
    Symbol(Symbol),
    Alias(Rc<Alias>),
}

impl Ident {
    pub fn from_value(v: &Value) -> Option<Ident> {
        match v {
            | Value::Symbol(s) => Some(Ident::Symbol(s.clone())),
            | Value::Alias(a) => Some(Ident::Alias(a.clone())),
            | _ => None,
        }
    }
    pub fn to_value(&self) -> Value {
        match self {
            | Ident::Symbol(s) => Value::Symbol(s.clone()),
            | Ident::Alias(a) => Value::Alias(a.clone()),
        }
    }
    /// The symbol underneath every layer of renaming.
    pub fn symbol(&self) -> Symbol {
        match self {
            | Ident::Symbol(s) => s.clone(),
            | Ident::Alias(a) => a.ident.symbol(),
        }
    }
}

impl std::fmt::Debug for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            | Ident::Symbol(s) => write!(f, "{}", s),
            | Ident::Alias(a) => write!(f, "{}@{:p}", a.ident.symbol(), Rc::as_ptr(a)),
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            | (Ident::Symbol(a), Ident::Symbol(b)) => a == b,
            | (Ident::Alias(a), Ident::Alias(b)) => Rc::ptr_eq(a, b),
            | _ => false,
        }
    }
}
impl Eq for Ident {}

impl hash::Hash for Ident {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self {
            | Ident::Symbol(s) => s.hash(state),
            | Ident::Alias(a) => std::ptr::hash(Rc::as_ptr(a), state),
        }
    }
}

/// What an identifier means at a given point of compilation.
#[derive(Clone)]
pub enum Binding {
    Lexical(LexicalBinding),
    Syntax(Rc<Transformer>),
    /// Not bound lexically or as syntax; looked up by name in `env` later.
    Global(Symbol, Environment),
}

impl Binding {
    /// Two identifiers denote the same thing.
    pub fn same(&self, other: &Binding) -> bool {
        match (self, other) {
            | (Binding::Lexical(a), Binding::Lexical(b)) => a.slot == b.slot,
            | (Binding::Syntax(a), Binding::Syntax(b)) => Rc::ptr_eq(a, b),
            | (Binding::Global(a, _), Binding::Global(b, _)) => a == b,
            | _ => false,
        }
    }
}

/* ------------------------------- Environment ------------------------------ */

/// A frame in the environment chain. Top-level frames own global variables
/// and syntax; the others hold compile-time scopes or a call's locals.
pub struct Frame {
    world: Rc<World>,
    parent: Option<Environment>,
    top_level: bool,
    globals: RefCell<im::HashMap<Symbol, Rc<Location>>>,
    syntax: RefCell<im::HashMap<Ident, Rc<Transformer>>>,
    scope: RefCell<im::HashMap<Ident, SlotId>>,
    locals: RefCell<im::HashMap<SlotId, Rc<Location>>>,
}

#[derive(Clone)]
pub struct Environment(Rc<Frame>);

impl Environment {
    fn frame(world: Rc<World>, parent: Option<Environment>, top_level: bool) -> Self {
        Environment(Rc::new(Frame {
            world,
            parent,
            top_level,
            globals: RefCell::new(im::HashMap::new()),
            syntax: RefCell::new(im::HashMap::new()),
            scope: RefCell::new(im::HashMap::new()),
            locals: RefCell::new(im::HashMap::new()),
        }))
    }

    /// A top-level environment with the primitive syntax and the base library
    /// but without the prelude.
    pub fn bare(world: Rc<World>) -> Self {
        let env = Environment::frame(world.clone(), None, true);
        for (name, transformer) in world.primitives() {
            env.0.syntax.borrow_mut().insert(Ident::Symbol(name.clone()), transformer.clone());
        }
        env.import_library(world.base());
        env
    }

    /// A fresh top-level environment, prelude loaded.
    pub fn new(world: Rc<World>) -> Result<Self> {
        let env = Environment::bare(world);
        env.load_prelude()?;
        Ok(env)
    }

    /// A top-level environment that defers unresolved names to `self`.
    pub fn nested(&self) -> Self {
        Environment::frame(self.0.world.clone(), Some(self.clone()), true)
    }

    /// A non-top-level child, used for lambda scopes and call frames.
    pub fn child(&self) -> Self {
        Environment::frame(self.0.world.clone(), Some(self.clone()), false)
    }

    pub fn world(&self) -> &Rc<World> {
        &self.0.world
    }
    pub fn is_top_level(&self) -> bool {
        self.0.top_level
    }
    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }
    /// The nearest enclosing top-level frame.
    pub fn top_level(&self) -> Environment {
        let mut env = self.clone();
        while !env.is_top_level() {
            match env.parent() {
                | Some(parent) => env = parent.clone(),
                | None => break,
            }
        }
        env
    }
    pub fn intern(&self, name: &str) -> Symbol {
        self.0.world.symbols.intern(name)
    }
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn ancestors(&self) -> impl Iterator<Item = Environment> {
        std::iter::successors(Some(self.clone()), |env| env.parent().cloned())
    }

    /* --------------------------- compile-time scope --------------------------- */

    /// Resolve an identifier: the innermost lexical or syntax binding wins;
    /// an unbound alias is looked up again where its macro was defined.
    pub fn resolve(&self, ident: &Ident) -> Binding {
        for env in self.ancestors() {
            if let Some(slot) = env.0.scope.borrow().get(ident) {
                return Binding::Lexical(LexicalBinding { name: ident.symbol(), slot: *slot });
            }
            if let Some(t) = env.0.syntax.borrow().get(ident) {
                return Binding::Syntax(t.clone());
            }
        }
        match ident {
            | Ident::Symbol(s) => Binding::Global(s.clone(), self.clone()),
            | Ident::Alias(alias) => alias.env.resolve(&alias.ident),
        }
    }

    /// Bind `ident` to a fresh slot in this frame's scope.
    pub fn bind_scope(&self, ident: Ident) -> LexicalBinding {
        let slot = self.0.world.slots.mint();
        let name = ident.symbol();
        self.0.scope.borrow_mut().insert(ident, slot);
        LexicalBinding { name, slot }
    }
    /// A lexical binding of `ident` made directly in this frame.
    pub fn scope_here(&self, ident: &Ident) -> Option<LexicalBinding> {
        let slot = *self.0.scope.borrow().get(ident)?;
        Some(LexicalBinding { name: ident.symbol(), slot })
    }

    /// Top-level syntax definition.
    pub fn bind_syntax(&self, name: Symbol, transformer: Rc<Transformer>) -> Result<()> {
        if !self.is_top_level() {
            return Err(EvalError::malformed("define-syntax", "invalid outside top-level"));
        }
        log::debug!("syntax `{}` bound", name);
        self.0.syntax.borrow_mut().insert(Ident::Symbol(name), transformer);
        Ok(())
    }
    /// Syntax visible only inside this frame, as `let-syntax` makes.
    pub fn scope_syntax(&self, ident: Ident, transformer: Rc<Transformer>) {
        self.0.syntax.borrow_mut().insert(ident, transformer);
    }

    /* -------------------------------- globals ------------------------------- */

    pub fn lookup_global(&self, name: &Symbol) -> Option<Rc<Location>> {
        self.ancestors().find_map(|env| env.0.globals.borrow().get(name).cloned())
    }
    /// Bind `name` in the nearest top-level frame, reusing its location when
    /// it is already defined there.
    pub fn define_global(&self, name: Symbol, value: Value) {
        let top = self.top_level();
        let existing = top.0.globals.borrow().get(&name).cloned();
        match existing {
            | Some(loc) => loc.set(value),
            | None => {
                let loc = Rc::new(Location::new(name.clone(), value));
                top.0.globals.borrow_mut().insert(name, loc);
            }
        }
    }

    /// Install every entry of `library` as a global of this frame.
    pub fn import_library(&self, library: &Library) {
        log::debug!("importing library `{}` ({} entries)", library.name, library.len());
        for entry in library.entries() {
            let name = self.intern(&entry.name);
            self.define_global(name, Value::Native(Rc::new(entry.to_native())));
        }
    }

    /* -------------------------------- locals -------------------------------- */

    pub fn lookup_local(&self, binding: &LexicalBinding) -> Result<Rc<Location>> {
        self.ancestors()
            .find_map(|env| env.0.locals.borrow().get(&binding.slot).cloned())
            .ok_or_else(|| EvalError::UnboundReference(binding.name.to_string()))
    }
    /// Bind a slot in this frame, replacing an earlier binding of it.
    pub fn define_local(&self, binding: &LexicalBinding, value: Value) {
        let existing = self.0.locals.borrow().get(&binding.slot).cloned();
        match existing {
            | Some(loc) => loc.set(value),
            | None => {
                let loc = Rc::new(Location::new(binding.name.clone(), value));
                self.0.locals.borrow_mut().insert(binding.slot, loc);
            }
        }
    }
}
