//! Compile-fail tests for `#[derive(Reflect)]` error paths.
//!
//! These tests verify that the derive produces helpful error messages
//! when used incorrectly.

#[test]
fn macro_compile_fail_tests() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/*.rs");
}
