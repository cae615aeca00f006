use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};
use thiserror::Error;

/// Type names of the host objects as seen by `Ty::Object`.
pub const ELEMENT: &str = "element";
pub const WINDOW: &str = "window";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("cannot append <{0}> inside itself")]
    Cycle(String),
}

#[derive(Debug)]
pub struct Element {
    tag: String,
    text: RefCell<String>,
    children: RefCell<Vec<Rc<Element>>>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Rc<Self> {
        Rc::new(Element { tag: tag.into(), text: RefCell::default(), children: RefCell::default() })
    }
    pub fn tag(&self) -> &str {
        &self.tag
    }
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }
    pub fn children(&self) -> Ref<'_, Vec<Rc<Element>>> {
        self.children.borrow()
    }
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn contains(&self, other: &Element) -> bool {
        std::ptr::eq(self, other) || self.children.borrow().iter().any(|c| c.contains(other))
    }

    /// The tree stays acyclic: `child` may not be `self` or an ancestor of it.
    pub fn append_child(&self, child: Rc<Element>) -> Result<(), DomError> {
        if child.contains(self) {
            return Err(DomError::Cycle(child.tag.clone()));
        }
        self.children.borrow_mut().push(child);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Window {
    title: RefCell<String>,
    body: Rc<Element>,
}

impl Window {
    pub fn new(title: impl Into<String>) -> Rc<Self> {
        Rc::new(Window { title: RefCell::new(title.into()), body: Element::new("body") })
    }
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        log::debug!("window title set to {:?}", title);
        *self.title.borrow_mut() = title;
    }
    pub fn body(&self) -> &Rc<Element> {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_keeps_order() {
        let ul = Element::new("ul");
        for text in ["a", "b"] {
            let li = Element::new("li");
            li.set_text(text);
            ul.append_child(li).unwrap();
        }
        let texts: Vec<_> = ul.children().iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn cycles_are_refused() {
        let outer = Element::new("div");
        let inner = Element::new("span");
        outer.append_child(inner.clone()).unwrap();
        assert_eq!(inner.append_child(outer.clone()), Err(DomError::Cycle("div".to_string())));
        assert_eq!(outer.append_child(outer.clone()), Err(DomError::Cycle("div".to_string())));
        assert_eq!(inner.child_count(), 0);
        assert_eq!(outer.child_count(), 1);
    }
}
