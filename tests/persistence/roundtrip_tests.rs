//! Round-trip tests for the flattened settings format

use crate::test_helpers::{instance, tree_with_fits};
use fitgrid::functions::FunctionTable;
use fitgrid::persistence::{load_tree, save_tree};
use fitgrid::tree::{Role, SettingsTree};
use proptest::prelude::*;

/// Load `text` into a fresh tree offering the same functions.
fn reload(text: &str, functions: &FunctionTable) -> SettingsTree {
    let mut tree = SettingsTree::new();
    tree.set_function_choices(&functions.names());
    let lines: Vec<&str> = text.lines().collect();
    let used = load_tree(&mut tree, &lines, functions);
    assert_eq!(used, lines.len(), "every stored pair is consumed");
    tree
}

#[test]
fn test_roundtrip_with_collapse_and_bounds() {
    let (mut tree, functions) = tree_with_fits(3);
    let selector = tree.role(Role::FitFunction).unwrap();
    tree.set_value(selector, "Quadratic", &functions);

    tree.set_value(instance(&tree, "Fit Order", 2), 5i64, &functions);
    tree.set_value(instance(&tree, "Fit Color", 1), "red", &functions);
    tree.set_value(instance(&tree, "Fit Color", 1), "green", &functions);
    let name = tree.find("Fit Name").unwrap();
    tree.set_value(name, "Decay", &functions);

    let low = tree.parameter_container(Role::BoundsMin, 2).unwrap();
    let a = tree.find_child(low, "A").unwrap();
    tree.set_value(a, -0.5, &functions);
    let start = tree.parameter_container(Role::StartValues, 3).unwrap();
    let c = tree.find_child(start, "C").unwrap();
    tree.set_value(c, 1e-3, &functions);

    let zooms = tree.role(Role::ZoomCount).unwrap();
    tree.set_value(zooms, 2i64, &functions);
    tree.set_value(tree.find("Zoom X-Minimum.Zoom 2").unwrap(), 4.0, &functions);
    tree.set_value(tree.find("X-Label").unwrap(), "$t$ / s", &functions);
    tree.set_value(tree.find("Projection").unwrap(), true, &functions);

    let saved = save_tree(&tree);
    let loaded = reload(&saved, &functions);
    assert_eq!(save_tree(&loaded), saved);

    let method2 = instance(&loaded, "Fit Method", 2);
    assert_eq!(loaded.value(method2).as_str(), Some("trf"));
    assert!(!loaded.node(method2).unwrap().is_enabled());
    assert!(loaded.any_bounds_present());
    // the edited instance of a collapse stays unset
    assert!(loaded.value(instance(&loaded, "Fit Order", 2)).is_unspecified());
}

#[test]
fn test_roundtrip_single_fit() {
    let (mut tree, functions) = tree_with_fits(1);
    let selector = tree.role(Role::FitFunction).unwrap();
    tree.set_value(selector, "Linear", &functions);
    let start = tree.role(Role::StartValues).unwrap();
    let b = tree.find_child(start, "B").unwrap();
    tree.set_value(b, 3.25, &functions);

    let saved = save_tree(&tree);
    let loaded = reload(&saved, &functions);
    assert_eq!(save_tree(&loaded), saved);

    let start = loaded.role(Role::StartValues).unwrap();
    let b = loaded.find_child(start, "B").unwrap();
    assert_eq!(loaded.value(b).as_f64(), Some(3.25));
    assert!(loaded
        .value(loaded.find_child(start, "A").unwrap())
        .is_unspecified());
}

#[test]
fn test_multiline_label_does_not_shift_later_settings() {
    let functions = FunctionTable::defaults();
    let mut tree = SettingsTree::new();
    tree.set_function_choices(&functions.names());
    let x_label = tree.find("X-Label").unwrap();
    let y_label = tree.find("Y-Label").unwrap();
    tree.set_value(x_label, "line1\nline2", &functions);
    tree.set_value(y_label, "volts", &functions);
    assert!(tree.value(x_label).is_unspecified());

    let saved = save_tree(&tree);
    let loaded = reload(&saved, &functions);
    assert!(loaded.value(loaded.find("X-Label").unwrap()).is_unspecified());
    assert_eq!(
        loaded.value(loaded.find("Y-Label").unwrap()).as_str(),
        Some("volts")
    );
    assert_eq!(save_tree(&loaded), saved);
}

#[test]
fn test_untouched_tree_roundtrips() {
    let functions = FunctionTable::defaults();
    let mut tree = SettingsTree::new();
    tree.set_function_choices(&functions.names());
    let saved = save_tree(&tree);
    assert_eq!(save_tree(&reload(&saved, &functions)), saved);
}

#[test]
fn test_unknown_labels_stop_loading() {
    let functions = FunctionTable::defaults();
    let mut tree = SettingsTree::new();
    let lines = ["Amount of Fits", "2", "Renamed Setting", "7"];
    assert_eq!(load_tree(&mut tree, &lines, &functions), 2);
    assert_eq!(tree.fit_count(), 2);
}

proptest! {
    #[test]
    fn prop_linewidth_edits_roundtrip(
        count in 2i64..5,
        edits in proptest::collection::vec((0usize..5, 0.0f64..10.0), 0..8)
    ) {
        let (mut tree, functions) = tree_with_fits(count);
        let width = tree.find("Fit Linewidth").unwrap();
        for (index, value) in edits {
            let target = if index == 0 || index > count as usize {
                width
            } else {
                instance(&tree, "Fit Linewidth", index)
            };
            tree.set_value(target, value, &functions);
        }

        let saved = save_tree(&tree);
        let loaded = reload(&saved, &functions);
        prop_assert_eq!(save_tree(&loaded), saved);
    }
}
