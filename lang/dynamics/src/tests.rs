use crate::{
    interop::{HostError, HostFn, HostNamespace, HostValue},
    library::{Entry, Library, Ty},
    link::Link,
    *,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;
use syntax::*;
use unindent::unindent;

fn fresh() -> (Environment, SharedOutput) {
    let out = SharedOutput::new();
    let world = World::new(Rc::new(interop::NoHost), Box::new(out.clone()));
    let env = Environment::new(world).expect("prelude loads");
    (env, out)
}

fn eval(src: &str) -> Result<Value> {
    fresh().0.eval_source(&unindent(src))
}

fn show(src: &str) -> String {
    match eval(src) {
        | Ok(v) => v.sourceify(),
        | Err(err) => panic!("{}", err),
    }
}

fn fails(src: &str) -> String {
    match eval(src) {
        | Ok(v) => panic!("expected an error, got {}", v.sourceify()),
        | Err(err) => err.to_string(),
    }
}

/* --------------------------------- Values --------------------------------- */

#[test]
fn singletons_are_identical() {
    assert!(Value::Nil.is_eq(&Value::Nil));
    assert!(Value::Unspecified.is_eq(&Value::Unspecified));
    assert_eq!(show("(eq? '() '())"), "#t");
    assert_eq!(show("(eq? (if #f #f) (begin))"), "#t");
}

#[test]
fn cons_keeps_its_parts() {
    let car = Value::string("a");
    let cdr = Value::vector(vec![Value::Number(1.0)]);
    let pair = Value::cons(car.clone(), cdr.clone());
    let Value::Pair(p) = &pair else { panic!("not a pair") };
    assert!(p.car().is_eq(&car));
    assert!(p.cdr().is_eq(&cdr));
    assert_eq!(
        show("(let ((a (list 1)) (b \"s\")) (and (eq? (car (cons a b)) a) (eq? (cdr (cons a b)) b)))"),
        "#t"
    );
}

#[test]
fn lists_render() {
    assert_eq!(show("(cons 1 2)"), "(1 . 2)");
    assert_eq!(show("(list 1 2 3)"), "(1 2 3)");
    assert_eq!(show("(cons 1 (cons 2 3))"), "(1 2 . 3)");
    assert_eq!(show("(vector 1 \"two\" #\\3)"), "#(1 \"two\" #\\3)");
    assert_eq!(show("'sym"), "sym");
}

#[test]
fn structural_equality() {
    assert_eq!(show("(equal? (list 1 (vector 2 \"x\")) (list 1 (vector 2 \"x\")))"), "#t");
    assert_eq!(show("(eq? (list 1) (list 1))"), "#f");
    assert_eq!(show("(eqv? 2 2)"), "#t");
}

#[test]
fn quoted_data_is_the_same_object() {
    let src = r#"
        (define (f) '(1 2))
        (eq? (f) (f))
    "#;
    assert_eq!(show(src), "#t");
}

/* -------------------------------- Evaluation ------------------------------ */

#[test]
fn arithmetic_and_comparison() {
    assert_eq!(show("(+ 1 2 3)"), "6");
    assert_eq!(show("(- 10)"), "-10");
    assert_eq!(show("(/ 1 4)"), "0.25");
    assert_eq!(show("(< 1 2 3)"), "#t");
    assert_eq!(show("(< 1 3 2)"), "#f");
    assert_eq!(show("(quotient 7 2)"), "3");
}

#[test]
fn procedures_and_rest_arguments() {
    assert_eq!(show("((lambda (a . rest) rest) 1 2 3)"), "(2 3)");
    assert_eq!(show("((lambda args args))"), "()");
    assert_eq!(show("(apply + 1 2 '(3 4))"), "10");
}

#[test]
fn internal_defines_see_each_other() {
    let src = r#"
        (define (parity n)
          (define (ev? n) (if (= n 0) #t (od? (- n 1))))
          (define (od? n) (if (= n 0) #f (ev? (- n 1))))
          (ev? n))
        (list (parity 10) (parity 7))
    "#;
    assert_eq!(show(src), "(#t #f)");
}

#[test]
fn assignment() {
    let src = r#"
        (define counter 0)
        (define (bump!) (set! counter (+ counter 1)) counter)
        (bump!)
        (bump!)
    "#;
    assert_eq!(show(src), "2");
    assert_eq!(show("(let ((x 1)) (set! x 5) x)"), "5");
    assert_eq!(fails("(set! nowhere 1)"), "nowhere: unbound variable");
}

#[test]
fn unbound_variables_fail_when_evaluated() {
    assert_eq!(fails("missing"), "missing: unbound variable");
    // a reference inside a lambda is fine until the lambda runs
    assert_eq!(show("(define (later) not-yet) (define not-yet 3) (later)"), "3");
}

#[test]
fn library_contracts() {
    assert_eq!(fails("(car 1)"), "car: Argument 0 is not a pair");
    assert!(matches!(eval("(car)"), Err(EvalError::ArityError { got: 0, .. })));
    assert!(matches!(eval("((lambda (x) x))"), Err(EvalError::ArityError { .. })));
    assert!(matches!(eval("(5 1)"), Err(EvalError::TypeMismatch { .. })));
}

#[test]
fn raised_errors_carry_their_message() {
    assert_eq!(fails("(error \"boom\" 1 'two)"), "boom 1 two");
}

#[test]
fn output_goes_to_the_world_port() {
    let (env, out) = fresh();
    env.eval_source("(display \"hi\") (write \"hi\") (newline) (display '(1 #\\a))").unwrap();
    assert_eq!(out.contents(), "hi\"hi\"\n(1 a)");
}

#[test]
fn eval_runs_at_top_level() {
    assert_eq!(show("(eval '(+ 1 2))"), "3");
    assert_eq!(show("(eval '(define zz 5)) zz"), "5");
}

#[test]
fn cyclic_lists_stay_finite() {
    let src = r#"
        (define c (list 1 2))
        (set-cdr! (cdr c) c)
        (define d (list 1 2))
        (set-cdr! (cdr d) d)
        (write c)
        (list (list? c) (equal? c c) (equal? c d) (equal? c (list 1 2)))
    "#;
    let (env, out) = fresh();
    assert_eq!(env.eval_source(&unindent(src)).unwrap().sourceify(), "(#f #t #t #f)");
    assert_eq!(out.contents(), "(1 2 ...)");
    assert!(matches!(
        env.eval_source("(length c)"),
        Err(EvalError::TypeMismatch { prim, .. }) if prim == "length"
    ));
}

#[test]
fn oversized_vectors_are_refused() {
    assert_eq!(show("(vector-length (make-vector 3 'a))"), "3");
    assert_eq!(show("(make-vector 0)"), "#()");
    for src in ["(make-vector 1e18)", "(make-vector -1)"] {
        assert!(matches!(
            eval(src),
            Err(EvalError::TypeMismatch { prim, .. }) if prim == "make-vector"
        ));
    }
}

/* ------------------------------ Control flow ------------------------------ */

#[test]
fn tail_calls_run_in_constant_space() {
    let src = r#"
        (define (loop n) (if (= n 0) 'done (loop (- n 1))))
        (loop 100000)
    "#;
    assert_eq!(show(src), "done");
    let src = r#"
        (let sum ((i 0) (acc 0))
          (if (= i 100000) acc (sum (+ i 1) (+ acc 1))))
    "#;
    assert_eq!(show(src), "100000");
}

#[test]
fn deep_non_tail_recursion_does_not_overflow() {
    let src = r#"
        (define (count n) (if (= n 0) 0 (+ 1 (count (- n 1)))))
        (count 10000)
    "#;
    assert_eq!(show(src), "10000");
}

#[test]
fn continuations_escape() {
    assert_eq!(show("(+ 1 (call/cc (lambda (k) (* 10 (k 5)))))"), "6");
    let src = r#"
        (define (find-first pred xs)
          (call/cc
            (lambda (return)
              (for-each (lambda (x) (if (pred x) (return x))) xs)
              #f)))
        (find-first (lambda (x) (> x 2)) '(1 2 3 4))
    "#;
    assert_eq!(show(src), "3");
}

#[test]
fn continuations_reenter() {
    let src = r#"
        (let ((n 0) (r '()) (k #f))
          (set! r (cons (call/cc (lambda (c) (set! k c) n)) r))
          (set! n (+ n 1))
          (if (< n 3) (k n) (reverse r)))
    "#;
    assert_eq!(show(src), "(0 1 2)");
}

#[test]
fn continuations_take_one_argument() {
    let err = eval("(call/cc (lambda (k) (k)))");
    assert!(matches!(err, Err(EvalError::ArityError { ref prim, got: 0, .. }) if prim == "continuation"));
    let err = eval("(call/cc (lambda (k) (k 1 2)))");
    assert!(matches!(err, Err(EvalError::ArityError { got: 2, .. })));
}


#[test]
fn continuations_escape_from_eval() {
    let src = r#"
        (define out '())
        (define (note x) (set! out (cons x out)))
        (note (call/cc (lambda (k) (eval (list k 1)))))
        out
    "#;
    assert_eq!(show(src), "(1)");
}

fn run_apart(env: &Environment, k: Kont, args: Vec<Value>) -> Result<Step> {
    let outcome = match args.as_slice() {
        | [Value::String(src)] => {
            Environment::new(env.world().clone()).and_then(|apart| apart.eval_source(&src.borrow()))
        }
        | _ => Err(EvalError::mismatch("run-apart", "expects a string")),
    };
    env.continue_program(outcome, k)
}

#[test]
fn separate_programs_resume_the_caller() {
    let (env, _) = fresh();
    env.import_library(&Library::new("apart").entry(Entry::kont("run-apart", run_apart).required([Ty::String])));
    let v = env.eval_source(r#"(define x 1) (+ 10 (run-apart "(define x 5) x"))"#).unwrap();
    assert_eq!(v.sourceify(), "15");
    assert_eq!(env.eval_source("x").unwrap().sourceify(), "1");
    assert!(matches!(
        env.eval_source(r#"(run-apart "(car 1)")"#),
        Err(EvalError::TypeMismatch { prim, .. }) if prim == "car"
    ));
}

/* --------------------------------- Macros --------------------------------- */

#[test]
fn derived_forms() {
    assert_eq!(show("(let* ((a 1) (b (+ a 1))) (list a b))"), "(1 2)");
    assert_eq!(show("(letrec ((f (lambda (n) (if (= n 0) 1 (* n (f (- n 1))))))) (f 5))"), "120");
    assert_eq!(show("(cond ((assv 2 '((1 . a) (2 . b))) => cdr) (else 'none))"), "b");
    assert_eq!(show("(case (* 2 3) ((2 3 5 7) 'prime) ((1 4 6 8 9) 'composite))"), "composite");
    assert_eq!(show("(when (> 1 0) 'a 'b)"), "b");
    assert_eq!(show("(unless (> 1 0) 'a)"), "#<unspecified>");
    assert_eq!(show("(map (lambda (x) (* x x)) '(1 2 3))"), "(1 4 9)");
    assert_eq!(show("(and 1 2 #f 3)"), "#f");
}

#[test]
fn or_does_not_capture_user_names() {
    assert_eq!(show("(let ((t 5)) (or #f t))"), "5");
    assert_eq!(show("(define t 7) (or #f t)"), "7");
}

#[test]
fn templates_keep_their_meaning_under_shadowing() {
    let src = r#"
        (define-syntax my-if
          (syntax-rules ()
            ((_ c a b) (cond (c a) (else b)))))
        (let ((else #f) (if list)) (my-if #f 1 2))
    "#;
    assert_eq!(show(src), "2");
}

#[test]
fn literals_match_by_binding() {
    let src = r#"
        (define-syntax which
          (syntax-rules (left)
            ((_ left) 'literal)
            ((_ x) 'other)))
        (list (which left) (let ((left 1)) (which left)))
    "#;
    assert_eq!(show(src), "(literal other)");
}

#[test]
fn nested_ellipses() {
    let src = r#"
        (define-syntax regroup
          (syntax-rules ()
            ((_ (a b ...) ...) '(a ... (b ...) ...))))
        (regroup (1 2 3) (4) (5 6))
    "#;
    assert_eq!(show(src), "(1 4 5 (2 3) () (6))");
    let src = r#"
        (define-syntax flatten
          (syntax-rules ()
            ((_ (x ...) ...) '(x ... ...))))
        (flatten (1 2) () (3))
    "#;
    assert_eq!(show(src), "(1 2 3)");
}

#[test]
fn custom_ellipsis_and_tails() {
    let src = r#"
        (define-syntax my-list
          (syntax-rules ::: ()
            ((_ x :::) (list x :::))))
        (my-list 1 2 3)
    "#;
    assert_eq!(show(src), "(1 2 3)");
    let src = r#"
        (define-syntax tail
          (syntax-rules ()
            ((_ a ... . r) 'r)))
        (tail 1 2 . 3)
    "#;
    assert_eq!(show(src), "3");
}

#[test]
fn no_matching_rule() {
    let src = r#"
        (define-syntax two (syntax-rules () ((_ a b) 'ok)))
        (two 1)
    "#;
    assert_eq!(fails(src), "syntax-rules: no matching syntax rule");
}

#[test]
fn let_syntax_is_scoped() {
    assert_eq!(show("(let-syntax ((double (syntax-rules () ((_ x) (* x 2))))) (double 21))"), "42");
    assert_eq!(fails("(let-syntax ((double (syntax-rules () ((_ x) x)))) 1) (double 1)"), "double: unbound variable");
}

#[test]
fn define_syntax_only_at_top_level() {
    let src = r#"
        ((lambda ()
           (define-syntax inner (syntax-rules () ((_) 1)))
           (inner)))
    "#;
    assert_eq!(fails(src), "define-syntax: invalid outside top-level");
    let (env, _) = fresh();
    assert!(env.eval_source(src).is_err());
    assert!(matches!(env.eval_source("(inner)"), Err(EvalError::UnboundReference(_))));
}

#[test]
fn keywords_are_not_values() {
    assert!(matches!(eval("(list if)"), Err(EvalError::MalformedForm { .. })));
}

#[test]
fn malformed_syntax_forms() {
    assert_eq!(fails("(quote)"), "quote: Bad form");
    assert_eq!(fails("(quote a b)"), "quote: Bad form");
    assert_eq!(fails("(define-syntax foo)"), "define-syntax: Bad form");
    assert_eq!(fails("(define-syntax foo (syntax-rules ()) 1)"), "define-syntax: Bad form");
    assert_eq!(fails("(define-syntax 1 (syntax-rules ()))"), "define-syntax: 1 is not an identifier");
    assert_eq!(fails("(define-syntax foo 5)"), "define-syntax: 5 is not a transformer");
    assert_eq!(fails("(let-syntax x 1)"), "let-syntax: bindings must be a list");
    assert_eq!(fails("(let-syntax ((m)) 1)"), "let-syntax: bad binding (m)");
}

/* --------------------------------- Programs -------------------------------- */

#[test]
fn programs_report_each_value() {
    let (env, _) = fresh();
    let forms = roux_surface::parse("(car (cons 1 2)) (cdr (cons 1 2))").unwrap();
    let mut seen = Vec::new();
    let mut failed = None;
    env.eval_program(
        forms.link(&env.world().symbols),
        |v, last| seen.push((v.sourceify(), last)),
        |err| failed = Some(err),
    );
    assert!(failed.is_none());
    assert_eq!(seen, vec![("1".to_string(), false), ("2".to_string(), true)]);
}

#[test]
fn programs_stop_at_the_first_error() {
    let (env, _) = fresh();
    let forms = roux_surface::parse("(define a 1) (car '()) (set! a 2)").unwrap();
    let mut seen = 0;
    let mut failed = None;
    env.eval_program(forms.link(&env.world().symbols), |_, _| seen += 1, |err| failed = Some(err));
    assert_eq!(seen, 1);
    assert_eq!(failed.map(|e| e.to_string()), Some("car: Argument 0 is not a pair".to_string()));
    assert_eq!(env.eval_source("a").unwrap().sourceify(), "1");
}

#[test]
fn quoted_list_program() {
    assert_eq!(show("(quote (1 2 3))"), "(1 2 3)");
}

#[test]
fn nested_environments_share_globals_but_not_definitions() {
    let (env, _) = fresh();
    env.eval_source("(define shared 1)").unwrap();
    let inner = env.nested();
    inner.eval_source("(define private 2)").unwrap();
    assert_eq!(inner.eval_source("(+ shared private)").unwrap().sourceify(), "3");
    assert!(env.eval_source("private").is_err());
}

/* ---------------------------------- Host ---------------------------------- */

struct Maths;

impl HostNamespace for Maths {
    fn resolve(&self, path: &[String]) -> std::result::Result<HostFn, HostError> {
        match path {
            | [ns, f] if ns == "Math" && f == "max" => Ok(Rc::new(|args| {
                let mut best = f64::NEG_INFINITY;
                for arg in args {
                    match arg {
                        | HostValue::Number(n) => best = best.max(n),
                        | other => {
                            return Err(HostError::Call {
                                callee: "Math.max".to_string(),
                                msg: format!("{:?} is not a number", other),
                            });
                        }
                    }
                }
                Ok(HostValue::Number(best))
            })),
            | _ => Err(HostError::Unresolved(path.join("."))),
        }
    }
}

#[test]
fn native_apply_calls_the_host() {
    let env = Environment::new(World::new(Rc::new(Maths), Box::new(SharedOutput::new()))).unwrap();
    assert_eq!(env.eval_source("(native-apply Math.max 1 5 3)").unwrap().sourceify(), "5");
    assert_eq!(env.eval_source("(native-apply (Math max) 2 (+ 4 4))").unwrap().sourceify(), "8");
    assert!(matches!(
        env.eval_source("(native-apply Math.min 1)"),
        Err(EvalError::HostInterop(HostError::Unresolved(_)))
    ));
    assert!(matches!(
        env.eval_source("(native-apply Math.max 'a)"),
        Err(EvalError::HostInterop(HostError::Call { .. }))
    ));
}
