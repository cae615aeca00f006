//! A small host for embedding: an element tree owned by a window, the
//! `document` and `window` libraries over it, and a registry of host
//! callables for `native-apply`.

pub mod dom;
pub use dom::{DomError, Element, Window};
pub mod library;
pub mod registry;
pub use registry::HostRegistry;

use roux_dynamics::library::Library;
use std::rc::Rc;

pub const LIBRARIES: &[&str] = &["document", "window"];

/// Everything the host exposes to one runtime.
pub struct Host {
    pub window: Rc<Window>,
}

impl Host {
    pub fn new(title: impl Into<String>) -> Self {
        Host { window: Window::new(title) }
    }
    pub fn library(&self, name: &str) -> Option<Library> {
        match name {
            | "document" => Some(library::document(&self.window)),
            | "window" => Some(library::window(&self.window)),
            | _ => None,
        }
    }
    pub fn registry(&self) -> HostRegistry {
        HostRegistry::new().with_math().with_window(&self.window)
    }
}

#[cfg(test)]
mod tests;
