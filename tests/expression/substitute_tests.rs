//! Tests for label substitution

use fitgrid::expression::{extract_parameters, substitute_labels};
use proptest::prelude::*;

#[test]
fn test_greek_labels() {
    assert_eq!(
        substitute_labels("A*x + B", &["A", "B"], &["\\alpha", "\\beta"]),
        "\\alpha*x + \\beta"
    );
}

#[test]
fn test_interleaved_parameters_keep_offsets() {
    let out = substitute_labels(
        "B*A + A*x + B**2",
        &["A", "B"],
        &["\\alpha_{long}", "b"],
    );
    assert_eq!(out, "b*\\alpha_{long} + \\alpha_{long}*x + b**2");
}

#[test]
fn test_function_names_untouched() {
    let out = substitute_labels("A*exp(-k*x)", &["A", "k", "exp"], &["a", "\\kappa", "E"]);
    assert_eq!(out, "a*exp(-\\kappa*x)");
}

#[test]
fn test_missing_labels_leave_parameter() {
    let out = substitute_labels("A*x + B", &["A", "B"], &["\\alpha"]);
    assert_eq!(out, "\\alpha*x + B");
}

proptest! {
    #[test]
    fn prop_identity_labels_are_noop(
        names in proptest::collection::vec("[a-w][a-z0-9_]{0,4}", 1..5),
        ops in proptest::collection::vec(prop_oneof![Just("+"), Just("*"), Just("-"), Just("/")], 5)
    ) {
        let mut expr = String::from("x");
        for (i, name) in names.iter().enumerate() {
            expr.push_str(ops[i % ops.len()]);
            expr.push_str(name);
        }
        let params = extract_parameters(&expr);
        prop_assert_eq!(substitute_labels(&expr, &params, &params), expr);
    }
}
