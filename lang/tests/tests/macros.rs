use roux_tests::scm_test;

scm_test!(macros, derived_forms, "0-derived-forms");
scm_test!(macros, hygiene, "1-hygiene");
scm_test!(macros, ellipses, "2-ellipses");
scm_test!(macros, let_syntax, "3-let-syntax");
