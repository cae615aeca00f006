use roux_tests::scm_test;

scm_test!(host, document, "0-document");
scm_test!(host, window, "1-window");
scm_test!(host, native_apply, "2-native-apply");
