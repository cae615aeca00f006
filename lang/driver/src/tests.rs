use crate::*;
use pretty_assertions::assert_eq;
use roux_dynamics::{
    EvalError, SharedOutput,
    syntax::{Sourceify, Value},
};
use unindent::unindent;

fn session(conf: Conf) -> (Session, SharedOutput) {
    let out = SharedOutput::new();
    let session = Session::new(conf, Box::new(out.clone())).unwrap();
    (session, out)
}

#[test]
fn values_are_reported_in_order() {
    let (session, _) = session(Conf::default());
    let mut seen = Vec::new();
    let last = session
        .run_source(None, "(car (cons 1 2)) (cdr (cons 1 2))", |v, last| seen.push((v.sourceify(), last)))
        .unwrap();
    assert_eq!(seen, vec![("1".to_string(), false), ("2".to_string(), true)]);
    assert_eq!(last.sourceify(), "2");
}

#[test]
fn programs_write_to_the_session_output() {
    let (session, out) = session(Conf::default());
    let src = unindent(
        r#"
        (define (greet name)
          (display "hello, ")
          (display name)
          (newline))
        (greet "roux")
    "#,
    );
    session.run_source(None, &src, |_, _| {}).unwrap();
    assert_eq!(out.contents(), "hello, roux\n");
}

#[test]
fn parse_errors_render_with_the_source() {
    let (session, _) = session(Conf::default());
    let err = session.run_source(None, "(car (cons 1 2)", |_, _| {}).unwrap_err();
    assert!(matches!(err, DriverError::ParseError { .. }));
    assert!(err.render().contains("Parse error"));
    assert!(err.to_string().starts_with("<input>:"));
}

#[test]
fn eval_errors_pass_through() {
    let (session, _) = session(Conf::default());
    let err = session.run_source(None, "(car 1)", |_, _| {}).unwrap_err();
    assert!(matches!(err, DriverError::EvalError(EvalError::TypeMismatch { .. })));
    assert_eq!(err.render(), "car: Argument 0 is not a pair");
}

#[test]
fn the_prelude_can_be_left_out() {
    let conf = Conf { prelude: false, ..Conf::default() };
    let (session, _) = session(conf);
    assert!(session.run_source(None, "(let ((x 1)) x)", |_, _| {}).is_err());
    assert_eq!(session.run_source(None, "((lambda (x) x) 1)", |_, _| {}).unwrap().sourceify(), "1");
}

#[test]
fn libraries_follow_the_configuration() {
    let conf = Conf { libraries: vec!["window".to_string()], window_title: "cfg".to_string(), ..Conf::default() };
    let (session, _) = session(conf);
    assert_eq!(session.run_source(None, "(window-title)", |_, _| {}).unwrap().sourceify(), "\"cfg\"");
    assert!(session.run_source(None, "(document-body)", |_, _| {}).is_err());

    let conf = Conf { libraries: vec!["canvas".to_string()], ..Conf::default() };
    let err = Session::new(conf, Box::new(SharedOutput::new())).err();
    assert!(matches!(err, Some(DriverError::UnknownLibrary(name)) if name == "canvas"));
}

#[test]
fn missing_files_are_io_errors() {
    let (session, _) = session(Conf::default());
    let err = session.run_file("/definitely/not/here.scm").unwrap_err();
    assert!(matches!(err, DriverError::IoError(_)));
}

#[test]
fn check_only_parses() {
    assert_eq!(check_source(None, "(undefined-thing) 1 2").unwrap().len(), 3);
    assert!(check_source(None, "#(1 2").is_err());
}

fn scratch(name: &str, text: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("roux-{}-{}.scm", name, std::process::id()));
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn files_report_every_value() {
    let path = scratch("values", "(define x 2)\n(* x 3)\n(display x)\n(list x)\n");
    let (session, out) = session(Conf::default());
    let mut shown = Vec::new();
    let result = session.run_file_with(&path, |v, _| {
        if !matches!(v, Value::Unspecified) {
            shown.push(v.sourceify());
        }
    });
    std::fs::remove_file(&path).unwrap();
    assert_eq!(result.unwrap().sourceify(), "(2)");
    assert_eq!(shown, vec!["6".to_string(), "(2)".to_string()]);
    assert_eq!(out.contents(), "2");
}

#[test]
fn passing_test_files_report_aloud() {
    let path = scratch("passing", "(define x 1)\n(= x 1)\n");
    let (session, _) = session(Conf::default());
    let result = session.test_file("passing", &path, true);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_ok());
}
