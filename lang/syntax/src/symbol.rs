use std::{cell::RefCell, collections::HashMap, fmt, hash, rc::Rc};

/// An identifier name.
///
/// Symbols built through the same [`SymbolTable`] share their backing
/// allocation, so identity comparison is a pointer check.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }
    /// Identity comparison, as `eq?` sees it.
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}
impl Eq for Symbol {}

impl hash::Hash for Symbol {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}", self.0)
    }
}

/// Name-keyed interner; one per runtime.
#[derive(Default)]
pub struct SymbolTable {
    table: RefCell<HashMap<Rc<str>, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn intern(&self, name: &str) -> Symbol {
        if let Some(sym) = self.table.borrow().get(name) {
            return sym.clone();
        }
        let name: Rc<str> = Rc::from(name);
        let sym = Symbol(name.clone());
        self.table.borrow_mut().insert(name, sym.clone());
        sym
    }
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_aliases_by_name() {
        let table = SymbolTable::new();
        let a = table.intern("car");
        let b = table.intern("car");
        let c = table.intern("cdr");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(table.len(), 2);
        assert_eq!(a.name(), "car");
    }
}
