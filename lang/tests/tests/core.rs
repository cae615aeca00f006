use roux_tests::scm_test;

scm_test!(core, lists, "0-lists");
scm_test!(core, closures, "1-closures");
scm_test!(core, tail_calls, "2-tail-calls");
scm_test!(core, continuations, "3-continuations");
scm_test!(core, vectors_and_strings, "4-vectors-and-strings");
scm_test!(core, eval_and_apply, "5-eval-and-apply");
