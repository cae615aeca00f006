//! Process-wide state shared by every environment of one runtime.

use crate::{
    builtin,
    interop::HostNamespace,
    library::{Library, base},
    syntax::*,
};
use std::{
    cell::{RefCell, RefMut},
    io::Write,
    rc::Rc,
};
use roux_utils::arena::Minter;

pub struct World {
    pub symbols: SymbolTable,
    pub slots: Minter<SlotId>,
    pub host: Rc<dyn HostNamespace>,
    output: RefCell<Box<dyn Write>>,
    primitives: Vec<(Symbol, Rc<Transformer>)>,
    base: Library,
}

impl World {
    pub fn new(host: Rc<dyn HostNamespace>, output: Box<dyn Write>) -> Rc<Self> {
        let symbols = SymbolTable::new();
        let primitives = builtin::primitives()
            .into_iter()
            .map(|t| (symbols.intern(&t.name), Rc::new(t)))
            .collect();
        Rc::new(World {
            symbols,
            slots: Minter::new(),
            host,
            output: RefCell::new(output),
            primitives,
            base: base::library(),
        })
    }
    pub fn primitives(&self) -> &[(Symbol, Rc<Transformer>)] {
        &self.primitives
    }
    /// The primitive transformer bound to `name` in fresh environments.
    pub fn primitive(&self, name: &str) -> Option<&Rc<Transformer>> {
        self.primitives.iter().find(|(sym, _)| sym.name() == name).map(|(_, t)| t)
    }
    pub fn base(&self) -> &Library {
        &self.base
    }
    pub fn output(&self) -> RefMut<'_, Box<dyn Write>> {
        self.output.borrow_mut()
    }
}

/// An output port that collects everything written to it.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
