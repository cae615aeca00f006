use crate::{
    dom::Window,
    library::{element_object, object_element},
};
use indexmap::IndexMap;
use roux_dynamics::interop::{HostError, HostFn, HostNamespace, HostValue};
use std::rc::Rc;

/// Host callables addressed by dotted path, e.g. `Math.max`.
#[derive(Default)]
pub struct HostRegistry {
    fns: IndexMap<String, HostFn>,
}

fn numbers(callee: &str, args: &[HostValue]) -> Result<Vec<f64>, HostError> {
    args.iter()
        .map(|arg| match arg {
            | HostValue::Number(n) => Ok(*n),
            | other => Err(HostError::Call {
                callee: callee.to_string(),
                msg: format!("{:?} is not a number", other),
            }),
        })
        .collect()
}

macro_rules! unary {
    ( $registry:expr, $( $name:literal => $op:expr ),* $(,)? ) => {
        $(
            $registry.register($name, |args| match numbers($name, &args)?.as_slice() {
                | [x] => Ok(HostValue::Number($op(*x))),
                | _ => Err(HostError::Call {
                    callee: $name.to_string(),
                    msg: "expects one number".to_string(),
                }),
            });
        )*
    };
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self, path: impl Into<String>,
        f: impl Fn(Vec<HostValue>) -> Result<HostValue, HostError> + 'static,
    ) {
        self.fns.insert(path.into(), Rc::new(f));
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fns.keys().map(String::as_str)
    }

    pub fn with_math(mut self) -> Self {
        unary! { self,
            "Math.abs" => f64::abs,
            "Math.floor" => f64::floor,
            "Math.ceil" => f64::ceil,
            "Math.round" => f64::round,
            "Math.sqrt" => f64::sqrt,
        }
        self.register("Math.max", |args| {
            Ok(HostValue::Number(numbers("Math.max", &args)?.into_iter().fold(f64::NEG_INFINITY, f64::max)))
        });
        self.register("Math.min", |args| {
            Ok(HostValue::Number(numbers("Math.min", &args)?.into_iter().fold(f64::INFINITY, f64::min)))
        });
        self.register("Math.pow", |args| match numbers("Math.pow", &args)?.as_slice() {
            | [base, exp] => Ok(HostValue::Number(base.powf(*exp))),
            | _ => Err(HostError::Call {
                callee: "Math.pow".to_string(),
                msg: "expects two numbers".to_string(),
            }),
        });
        self
    }

    /// `window.title` reads the title with no arguments and writes it with
    /// one; `document.body` hands out the root element.
    pub fn with_window(mut self, window: &Rc<Window>) -> Self {
        let title = window.clone();
        self.register("window.title", move |args| match args.as_slice() {
            | [] => Ok(HostValue::String(title.title())),
            | [HostValue::String(s)] => {
                title.set_title(s.clone());
                Ok(HostValue::Null)
            }
            | _ => Err(HostError::Call {
                callee: "window.title".to_string(),
                msg: "expects nothing or a string".to_string(),
            }),
        });
        let body = window.body().clone();
        self.register("document.body", move |_| Ok(HostValue::Object(element_object(body.clone()))));
        self.register("document.tag", |args| match args.as_slice() {
            | [HostValue::Object(obj)] => {
                let element = object_element(obj).ok_or_else(|| HostError::Call {
                    callee: "document.tag".to_string(),
                    msg: format!("Invalid object <{}>", obj.type_name),
                })?;
                Ok(HostValue::String(element.tag().to_string()))
            }
            | _ => Err(HostError::Call {
                callee: "document.tag".to_string(),
                msg: "expects an element".to_string(),
            }),
        });
        self
    }
}

impl HostNamespace for HostRegistry {
    fn resolve(&self, path: &[String]) -> Result<HostFn, HostError> {
        let key = path.join(".");
        self.fns.get(&key).cloned().ok_or(HostError::Unresolved(key))
    }
}
