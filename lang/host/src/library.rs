//! The `document` and `window` libraries. Elements and the window cross
//! into the runtime as native objects.

use crate::dom::{ELEMENT, Element, WINDOW, Window};
use roux_dynamics::{
    err::{EvalError, Result},
    library::{Entry, Library, Ty},
    syntax::*,
};
use std::rc::Rc;

pub fn element_object(element: Rc<Element>) -> NativeObject {
    NativeObject::from_rc(ELEMENT, element)
}

pub fn object_element(obj: &NativeObject) -> Option<Rc<Element>> {
    match obj.type_name {
        | ELEMENT => obj.downcast::<Element>(),
        | _ => None,
    }
}

pub fn wrap_element(element: Rc<Element>) -> Value {
    Value::Object(element_object(element))
}

pub fn wrap_window(window: Rc<Window>) -> Value {
    Value::Object(NativeObject::from_rc(WINDOW, window))
}

pub fn unwrap_element(v: &Value) -> Option<Rc<Element>> {
    match v {
        | Value::Object(obj) => object_element(obj),
        | _ => None,
    }
}

fn element_arg(name: &str, v: &Value) -> Result<Rc<Element>> {
    unwrap_element(v)
        .ok_or_else(|| EvalError::mismatch(name, format!("Invalid object {}", v.sourceify())))
}

fn string_arg(name: &str, v: &Value) -> Result<String> {
    match v {
        | Value::String(s) => Ok(s.borrow().clone()),
        | _ => Err(EvalError::mismatch(name, format!("{} is not a string", v.sourceify()))),
    }
}

pub fn document(window: &Rc<Window>) -> Library {
    let body = window.body().clone();
    Library::new("document")
        .entry(Entry::value("document-body", move |_, _| Ok(wrap_element(body.clone()))))
        .entry(
            Entry::value("create-element", |_, args| {
                let tag = string_arg("create-element", &args[0])?;
                Ok(wrap_element(Element::new(tag)))
            })
            .required([Ty::String]),
        )
        .entry(
            // both operands are checked before the tree is touched
            Entry::value("append-child!", |_, args| {
                let parent = element_arg("append-child!", &args[0])?;
                let child = element_arg("append-child!", &args[1])?;
                parent
                    .append_child(child)
                    .map_err(|err| EvalError::mismatch("append-child!", err.to_string()))?;
                Ok(Value::Unspecified)
            })
            .required([Ty::Any, Ty::Any]),
        )
        .entry(
            Entry::value("element-tag", |_, args| {
                Ok(Value::string(element_arg("element-tag", &args[0])?.tag()))
            })
            .required([Ty::Object(ELEMENT)]),
        )
        .entry(
            Entry::value("element-text", |_, args| {
                Ok(Value::string(element_arg("element-text", &args[0])?.text()))
            })
            .required([Ty::Object(ELEMENT)]),
        )
        .entry(
            Entry::value("set-text!", |_, args| {
                let element = element_arg("set-text!", &args[0])?;
                element.set_text(string_arg("set-text!", &args[1])?);
                Ok(Value::Unspecified)
            })
            .required([Ty::Object(ELEMENT), Ty::String]),
        )
        .entry(
            Entry::value("child-count", |_, args| {
                Ok(Value::Number(element_arg("child-count", &args[0])?.child_count() as f64))
            })
            .required([Ty::Object(ELEMENT)]),
        )
        .entry(
            Entry::value("element-children", |_, args| {
                let element = element_arg("element-children", &args[0])?;
                let children = element.children().iter().cloned().map(wrap_element).collect::<Vec<_>>();
                Ok(Value::list(children))
            })
            .required([Ty::Object(ELEMENT)]),
        )
        .entry(
            Entry::value("element?", |_, args| Ok(Value::Bool(unwrap_element(&args[0]).is_some())))
                .required([Ty::Any]),
        )
}

pub fn window(window: &Rc<Window>) -> Library {
    let (reader, writer, this) = (window.clone(), window.clone(), window.clone());
    Library::new("window")
        .entry(Entry::value("current-window", move |_, _| Ok(wrap_window(this.clone()))))
        .entry(Entry::value("window-title", move |_, _| Ok(Value::string(reader.title()))))
        .entry(
            Entry::value("set-title!", move |_, args| {
                writer.set_title(string_arg("set-title!", &args[0])?);
                Ok(Value::Unspecified)
            })
            .required([Ty::String]),
        )
}
