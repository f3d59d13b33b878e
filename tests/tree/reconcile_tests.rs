//! Tests for collapse-to-parent, expand-to-children and composed text

use crate::test_helpers::{instance, tree_with_fits};
use fitgrid::tree::{PatchOp, Role};
use fitgrid::value::ValueCell;

#[test]
fn test_collapse_fills_unset_siblings() {
    let (mut tree, functions) = tree_with_fits(3);
    let order = tree.find("Fit Order").unwrap();
    let first = instance(&tree, "Fit Order", 1);

    tree.set_value(first, 5i64, &functions);

    assert!(tree.value(first).is_unspecified());
    for index in [2, 3] {
        assert_eq!(tree.value(instance(&tree, "Fit Order", index)).as_i64(), Some(5));
    }
    assert!(tree.value(order).is_unspecified());
    assert_eq!(tree.display_text(order), "5; 5");
}

#[test]
fn test_collapse_leaves_set_siblings_alone() {
    let (mut tree, functions) = tree_with_fits(3);
    let color = tree.find("Fit Color").unwrap();
    let second = instance(&tree, "Fit Color", 2);
    let third = instance(&tree, "Fit Color", 3);

    // Fit 1 and Fit 3 adopt red
    tree.set_value(second, "red", &functions);
    tree.set_value(second, "green", &functions);
    // nothing unset remains, so green stays put
    assert_eq!(tree.value(second).as_str(), Some("green"));
    assert_eq!(tree.value(third).as_str(), Some("red"));
    assert_eq!(tree.display_text(color), "red; green; red");
}

#[test]
fn test_invalid_choice_is_unspecified() {
    let (mut tree, functions) = tree_with_fits(2);
    let first = instance(&tree, "Fit Color", 1);
    let patch = tree.set_value(first, "chartreuse", &functions);
    assert!(tree.value(first).is_unspecified());
    assert!(patch.is_empty());
}

#[test]
fn test_group_value_overrides_instances() {
    let (mut tree, functions) = tree_with_fits(2);
    let name = tree.find("Fit Name").unwrap();
    let first = instance(&tree, "Fit Name", 1);
    let second = instance(&tree, "Fit Name", 2);
    tree.set_value(first, "a", &functions);
    tree.set_value(first, "b", &functions);

    let patch = tree.set_value(name, "shared", &functions);
    assert!(tree.value(first).is_unspecified());
    assert!(tree.value(second).is_unspecified());
    assert_eq!(tree.display_text(name), "shared");
    assert!(patch.ops().contains(&PatchOp::Collapse { id: name }));
}

#[test]
fn test_composed_text_of_parameter_containers() {
    let (mut tree, functions) = tree_with_fits(2);
    let selector = tree.role(Role::FitFunction).unwrap();
    tree.set_value(selector, "Linear", &functions);

    let start = tree.role(Role::StartValues).unwrap();
    let fit1 = tree.parameter_container(Role::StartValues, 1).unwrap();
    let fit2 = tree.parameter_container(Role::StartValues, 2).unwrap();
    let a1 = tree.find_child(fit1, "A").unwrap();
    let b1 = tree.find_child(fit1, "B").unwrap();
    let a2 = tree.find_child(fit2, "A").unwrap();

    tree.set_value(a1, 1.5, &functions);
    tree.set_value(b1, 2.0, &functions);
    tree.set_value(a2, 3.0, &functions);

    // start values never collapse into siblings
    assert!(tree.value(tree.find_child(fit2, "B").unwrap()).is_unspecified());
    assert_eq!(tree.display_text(start), "[1.5; 2]; [3]");
    assert_eq!(tree.value(fit1), &ValueCell::text("<composed>"));
}

#[test]
fn test_new_choice_on_instance_selector() {
    let (mut tree, functions) = tree_with_fits(2);
    let selector = tree.role(Role::FitFunction).unwrap();
    let second = tree.find_child(selector, "Fit 2").unwrap();

    let patch = tree.set_value(second, "[new]", &functions);
    assert!(patch.requests_function_editor());
    assert!(patch
        .ops()
        .contains(&PatchOp::OpenFunctionEditor { selector: second }));
    assert!(tree.value(second).is_unspecified());
    assert!(tree.value(instance(&tree, "Fitfunction", 1)).is_unspecified());
}

#[test]
fn test_instance_function_selection() {
    let (mut tree, functions) = tree_with_fits(2);
    let selector = tree.role(Role::FitFunction).unwrap();
    let first = tree.find_child(selector, "Fit 1").unwrap();
    let second = tree.find_child(selector, "Fit 2").unwrap();

    tree.set_value(first, "Quadratic", &functions);
    // the selection collapsed into Fit 2
    assert_eq!(tree.value(second).as_str(), Some("Quadratic"));
    tree.set_value(first, "Linear", &functions);

    assert_eq!(
        tree.effective_functions(),
        vec![Some("Linear".to_string()), Some("Quadratic".to_string())]
    );
    let fit1 = tree.parameter_container(Role::StartValues, 1).unwrap();
    let fit2 = tree.parameter_container(Role::StartValues, 2).unwrap();
    assert_eq!(tree.children(fit1).len(), 2);
    assert_eq!(tree.children(fit2).len(), 3);
}
