use super::*;
use pretty_assertions::assert_eq;
use roux_syntax::Sourceify;

fn read_one(src: &str) -> Datum {
    let mut forms = parse(src).unwrap();
    assert_eq!(forms.len(), 1, "expected one form in {:?}", src);
    forms.pop().unwrap()
}

#[test]
fn atoms() {
    assert_eq!(read_one("42"), Datum::Number(42.0));
    assert_eq!(read_one("-1.5e2"), Datum::Number(-150.0));
    assert_eq!(read_one(".5"), Datum::Number(0.5));
    assert_eq!(read_one("#t"), Datum::Bool(true));
    assert_eq!(read_one("#false"), Datum::Bool(false));
    assert_eq!(read_one("#\\a"), Datum::Char('a'));
    assert_eq!(read_one("#\\space"), Datum::Char(' '));
    assert_eq!(read_one("#\\x41"), Datum::Char('A'));
    assert_eq!(read_one(r#""a\nb""#), Datum::String("a\nb".to_string()));
    assert_eq!(read_one("set-car!"), Datum::symbol("set-car!"));
    assert_eq!(read_one("..."), Datum::symbol("..."));
    assert_eq!(read_one("+"), Datum::symbol("+"));
    assert_eq!(read_one("1+"), Datum::symbol("1+"));
    assert_eq!(read_one("Math.max"), Datum::symbol("Math.max"));
}

#[test]
fn lists_and_vectors() {
    assert_eq!(read_one("(1 2 3)").sourceify(), "(1 2 3)");
    assert_eq!(read_one("[a . b]").sourceify(), "(a . b)");
    assert_eq!(read_one("(a b . c)").sourceify(), "(a b . c)");
    assert_eq!(read_one("#(1 #\\a \"s\")").sourceify(), "#(1 #\\a \"s\")");
    assert_eq!(read_one("()"), Datum::nil());
    assert_eq!(read_one("'x"), Datum::list([Datum::symbol("quote"), Datum::symbol("x")]));
}

#[test]
fn comments_are_skipped() {
    let forms = parse("; line\n1 #| block #| nested |# still |# 2").unwrap();
    assert_eq!(forms, vec![Datum::Number(1.0), Datum::Number(2.0)]);
}

#[test]
fn errors_carry_spans() {
    match parse("(1 2") {
        | Err(ParseError::UnexpectedEof { span, .. }) => assert_eq!(span.start, 4),
        | other => panic!("unexpected {:?}", other),
    }
    match parse("(1 . 2 3)") {
        | Err(ParseError::Unexpected { found, .. }) => assert_eq!(found, "3"),
        | other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(parse(")"), Err(ParseError::Unexpected { .. })));
    assert!(matches!(parse("#| open"), Err(ParseError::UnterminatedComment { .. })));
    assert!(matches!(parse("#\\bogus"), Err(ParseError::BadLiteral { .. })));
}
