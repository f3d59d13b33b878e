//! Tests for count drivers and group resize

use crate::test_helpers::{child_names, tree_with_fits};
use fitgrid::tree::{NoFunctions, Role, SettingsTree};
use fitgrid::value::ValueCell;
use proptest::prelude::*;

fn expected_names(count: i64) -> Vec<String> {
    if count > 1 {
        (1..=count).map(|i| format!("Fit {}", i)).collect()
    } else {
        Vec::new()
    }
}

#[test]
fn test_fit_templates_follow_count() {
    let (mut tree, functions) = tree_with_fits(3);
    let color = tree.find("Fit Color").unwrap();
    let method = tree.find("Fit Method").unwrap();
    assert_eq!(child_names(&tree, color), vec!["Fit 1", "Fit 2", "Fit 3"]);
    assert_eq!(tree.children(method).len(), 3);

    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value(driver, 2i64, &functions);
    assert_eq!(child_names(&tree, color), vec!["Fit 1", "Fit 2"]);
}

#[test]
fn test_single_instance_folds_into_template() {
    let (mut tree, functions) = tree_with_fits(2);
    let first = tree.find("Fit Name.Fit 1").unwrap();
    tree.set_value_str(first, "Rise", &functions);
    // Fit 2 adopted "Rise", so this edit stays on Fit 1
    tree.set_value_str(first, "Decay", &functions);

    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value(driver, 1i64, &functions);

    let template = tree.find("Fit Name").unwrap();
    assert!(tree.children(template).is_empty());
    assert_eq!(tree.value(template).as_str(), Some("Decay"));
}

#[test]
fn test_zero_hides_fit_grid() {
    let (mut tree, functions) = tree_with_fits(2);
    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value(driver, 0i64, &functions);

    for &id in tree.children(tree.fit_root()) {
        let node = tree.node(id).unwrap();
        assert_eq!(node.is_hidden(), id != driver, "{}", node.name());
        assert!(node.children().is_empty(), "{}", node.name());
    }
}

#[test]
fn test_new_instances_start_unset() {
    let (mut tree, functions) = tree_with_fits(2);
    let order = tree.find("Fit Order").unwrap();
    tree.set_value(order, 4i64, &functions);

    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value(driver, 4i64, &functions);
    for &child in tree.children(order) {
        assert_eq!(tree.value(child), &ValueCell::Unspecified);
    }
    assert_eq!(tree.value(order).as_i64(), Some(4));
}

#[test]
fn test_zoom_driver_skips_help_lines() {
    let mut tree = SettingsTree::new();
    let zooms = tree.role(Role::ZoomCount).unwrap();
    tree.set_value(zooms, 2i64, &NoFunctions);

    let x_min = tree.find("Zoom X-Minimum").unwrap();
    let help = tree.find("Help lines for zooms?").unwrap();
    assert_eq!(child_names(&tree, x_min), vec!["Zoom 1", "Zoom 2"]);
    assert!(tree.children(help).is_empty());
    assert_eq!(tree.zoom_count(), 2);
}

#[test]
fn test_invalid_count_reads_as_zero() {
    let mut tree = SettingsTree::new();
    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value_str(driver, "many", &NoFunctions);
    assert_eq!(tree.fit_count(), 0);
    assert_eq!(tree.value(driver).as_i64(), Some(0));
}

proptest! {
    #[test]
    fn prop_instances_match_count(counts in proptest::collection::vec(-2i64..6, 1..8)) {
        let mut tree = SettingsTree::new();
        let driver = tree.role(Role::FitCount).unwrap();
        let color = tree.find("Fit Color").unwrap();
        let bounds = tree.role(Role::BoundsMin).unwrap();

        for count in counts {
            tree.set_value(driver, count, &NoFunctions);
            prop_assert_eq!(tree.fit_count() as i64, count.max(0));
            prop_assert_eq!(child_names(&tree, color), expected_names(count));
            prop_assert_eq!(child_names(&tree, bounds), expected_names(count));
        }
    }
}
