use crate::*;
use pretty_assertions::assert_eq;
use roux_dynamics::{EvalError, Environment, SharedOutput, World, syntax::*};
use std::rc::Rc;
use unindent::unindent;

fn session() -> (Host, Environment) {
    let host = Host::new("untitled");
    let world = World::new(Rc::new(host.registry()), Box::new(SharedOutput::new()));
    let env = Environment::new(world).unwrap();
    for name in LIBRARIES {
        env.import_library(&host.library(name).unwrap());
    }
    (host, env)
}

#[test]
fn building_a_tree() {
    let (host, env) = session();
    let src = unindent(
        r#"
        (define list-el (create-element "ul"))
        (for-each
          (lambda (text)
            (let ((item (create-element "li")))
              (set-text! item text)
              (append-child! list-el item)))
          '("one" "two"))
        (append-child! (document-body) list-el)
        (map element-text (element-children list-el))
    "#,
    );
    assert_eq!(env.eval_source(&src).unwrap().sourceify(), "(\"one\" \"two\")");
    let body = host.window.body();
    assert_eq!(body.child_count(), 1);
    assert_eq!(body.children()[0].tag(), "ul");
    assert_eq!(body.children()[0].child_count(), 2);
}

#[test]
fn appending_a_non_element_is_refused() {
    let (host, env) = session();
    let err = env.eval_source("(append-child! (document-body) 5)").unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
    assert!(err.to_string().contains("Invalid object"));
    let err = env.eval_source("(append-child! \"body\" (create-element \"p\"))").unwrap_err();
    assert!(err.to_string().contains("Invalid object"));
    assert_eq!(host.window.body().child_count(), 0);
}

#[test]
fn element_predicates_and_accessors() {
    let (_, env) = session();
    assert_eq!(env.eval_source("(element? (document-body))").unwrap().sourceify(), "#t");
    assert_eq!(env.eval_source("(element? 'body)").unwrap().sourceify(), "#f");
    assert_eq!(env.eval_source("(element-tag (document-body))").unwrap().sourceify(), "\"body\"");
    assert_eq!(env.eval_source("(document-body)").unwrap().sourceify(), "#<element>");
    assert_eq!(
        env.eval_source("(element-tag 1)").unwrap_err().to_string(),
        "element-tag: Argument 0 is not an element"
    );
}

#[test]
fn window_title() {
    let (host, env) = session();
    assert_eq!(env.eval_source("(window-title)").unwrap().sourceify(), "\"untitled\"");
    env.eval_source("(set-title! \"roux\")").unwrap();
    assert_eq!(host.window.title(), "roux");
    assert_eq!(
        env.eval_source("(set-title! 'roux)").unwrap_err().to_string(),
        "set-title!: Argument 0 is not a string"
    );
    assert_eq!(host.window.title(), "roux");
}

#[test]
fn registry_through_native_apply() {
    let (host, env) = session();
    assert_eq!(env.eval_source("(native-apply Math.max 1 7 3)").unwrap().sourceify(), "7");
    assert_eq!(env.eval_source("(native-apply Math.sqrt 16)").unwrap().sourceify(), "4");
    assert_eq!(env.eval_source("(native-apply Math.pow 2 10)").unwrap().sourceify(), "1024");
    env.eval_source("(native-apply window.title \"from host\")").unwrap();
    assert_eq!(host.window.title(), "from host");
    assert_eq!(env.eval_source("(native-apply window.title)").unwrap().sourceify(), "\"from host\"");
    assert_eq!(
        env.eval_source("(native-apply document.tag (native-apply document.body))").unwrap().sourceify(),
        "\"body\""
    );
    assert!(matches!(
        env.eval_source("(native-apply Math.sqrt 'x)"),
        Err(EvalError::HostInterop(_))
    ));
}

#[test]
fn registry_lists_its_paths() {
    let host = Host::new("t");
    let paths: Vec<_> = host.registry().paths().map(str::to_string).collect();
    assert!(paths.contains(&"Math.max".to_string()));
    assert!(paths.contains(&"window.title".to_string()));
    assert!(host.library("nothing").is_none());
}
