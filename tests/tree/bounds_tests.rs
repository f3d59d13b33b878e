//! Tests for the bounds rule

use crate::test_helpers::{instance, tree_with_fits};
use fitgrid::functions::FunctionTable;
use fitgrid::tree::{NodeId, Role, SettingsTree};
use fitgrid::value::ValueCell;

fn linear_fits(count: i64) -> (SettingsTree, FunctionTable) {
    let (mut tree, functions) = tree_with_fits(count);
    let selector = tree.role(Role::FitFunction).unwrap();
    tree.set_value(selector, "Linear", &functions);
    (tree, functions)
}

fn bound_leaf(tree: &SettingsTree, role: Role, index: usize, param: &str) -> NodeId {
    let container = tree.parameter_container(role, index).unwrap();
    tree.find_child(container, param).unwrap()
}

fn enabled(tree: &SettingsTree, id: NodeId) -> bool {
    tree.node(id).unwrap().is_enabled()
}

#[test]
fn test_bound_locks_only_its_instance() {
    let (mut tree, functions) = linear_fits(2);
    let method1 = instance(&tree, "Fit Method", 1);
    let method2 = instance(&tree, "Fit Method", 2);
    assert!(!tree.any_bounds_present());

    let leaf = bound_leaf(&tree, Role::BoundsMin, 2, "A");
    tree.set_value(leaf, 0.0, &functions);

    assert_eq!(tree.value(method2).as_str(), Some("trf"));
    assert!(!enabled(&tree, method2));
    assert!(enabled(&tree, method1));
    assert!(tree.value(method1).is_unspecified());
    assert!(tree.any_bounds_present());

    tree.set_value(leaf, ValueCell::Unspecified, &functions);
    assert!(enabled(&tree, method2));
    assert!(!tree.any_bounds_present());
}

#[test]
fn test_last_bound_releases_method() {
    let (mut tree, functions) = linear_fits(2);
    let method1 = instance(&tree, "Fit Method", 1);
    let low = bound_leaf(&tree, Role::BoundsMin, 1, "B");
    let high = bound_leaf(&tree, Role::BoundsMax, 1, "B");

    tree.set_value(low, -1.0, &functions);
    tree.set_value(high, 1.0, &functions);
    tree.set_value(low, ValueCell::Unspecified, &functions);
    assert!(!enabled(&tree, method1));

    tree.set_value(high, ValueCell::Unspecified, &functions);
    assert!(enabled(&tree, method1));
}

#[test]
fn test_group_method_skips_locked_instances() {
    let (mut tree, functions) = linear_fits(3);
    let method = tree.role(Role::FitMethod).unwrap();
    let leaf = bound_leaf(&tree, Role::BoundsMax, 2, "A");
    tree.set_value(leaf, 10.0, &functions);

    tree.set_value(method, "odr", &functions);

    assert!(tree.value(method).is_unspecified());
    assert_eq!(tree.value(instance(&tree, "Fit Method", 1)).as_str(), Some("odr"));
    assert_eq!(tree.value(instance(&tree, "Fit Method", 2)).as_str(), Some("trf"));
    assert_eq!(tree.value(instance(&tree, "Fit Method", 3)).as_str(), Some("odr"));
    assert_eq!(tree.display_text(method), "odr; trf; odr");
}

#[test]
fn test_group_method_without_bounds_expands() {
    let (mut tree, functions) = linear_fits(2);
    let method = tree.role(Role::FitMethod).unwrap();
    let first = instance(&tree, "Fit Method", 1);
    tree.set_value(first, "dogbox", &functions);

    tree.set_value(method, "lm", &functions);
    assert_eq!(tree.value(method).as_str(), Some("lm"));
    assert!(tree
        .children(method)
        .iter()
        .all(|&c| tree.value(c).is_unspecified()));
}

#[test]
fn test_single_fit_locks_group_method() {
    let (mut tree, functions) = linear_fits(1);
    let method = tree.role(Role::FitMethod).unwrap();
    let leaf = bound_leaf(&tree, Role::BoundsMin, 1, "A");

    tree.set_value(leaf, 0.5, &functions);
    assert_eq!(tree.value(method).as_str(), Some("trf"));
    assert!(!enabled(&tree, method));

    tree.set_value(leaf, ValueCell::Unspecified, &functions);
    assert!(enabled(&tree, method));
}
