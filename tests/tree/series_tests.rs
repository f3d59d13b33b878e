//! Tests for data-series driven markers and legend labels

use crate::test_helpers::{child_names, strings, tree_with_fits};
use fitgrid::tree::{NoFunctions, Role, SettingsTree};

#[test]
fn test_legend_tracks_series_and_fits() {
    let (mut tree, functions) = tree_with_fits(1);
    tree.sync_data_series(&strings(&["U", "I"]));

    let labels = tree.role(Role::LegendLabels).unwrap();
    assert_eq!(
        child_names(&tree, labels),
        vec!["U", "I", "Fit 1", "Underground", "MeanLine"]
    );

    let driver = tree.role(Role::FitCount).unwrap();
    tree.set_value(driver, 3i64, &functions);
    tree.sync_data_series(&strings(&["I"]));
    assert_eq!(
        child_names(&tree, labels),
        vec!["I", "Fit 1", "Fit 2", "Fit 3", "Underground", "MeanLine"]
    );
}

#[test]
fn test_legend_label_values_survive_resync() {
    let mut tree = SettingsTree::new();
    tree.sync_data_series(&strings(&["U", "I"]));
    let labels = tree.role(Role::LegendLabels).unwrap();
    let u = tree.find_child(labels, "U").unwrap();
    tree.set_value(u, "Voltage", &NoFunctions);

    tree.sync_data_series(&strings(&["P", "U"]));
    assert_eq!(child_names(&tree, labels), vec!["P", "U"]);
    assert_eq!(tree.value(u).as_str(), Some("Voltage"));
}

#[test]
fn test_markers_instanced_only_for_several_series() {
    let mut tree = SettingsTree::new();
    let size = tree.find("Marker Size").unwrap();

    tree.sync_data_series(&strings(&["U"]));
    assert!(tree.children(size).is_empty());

    tree.sync_data_series(&strings(&["U", "I", "P"]));
    assert_eq!(child_names(&tree, size), vec!["U", "I", "P"]);

    let style = tree.find("Marker Style").unwrap();
    let p = tree.find_child(style, "P").unwrap();
    tree.set_value(p, "square", &NoFunctions);
    // U and I adopted the style, P itself is reset
    assert_eq!(tree.display_text(style), "square; square");
}

#[test]
fn test_duplicate_series_names_collapse() {
    let mut tree = SettingsTree::new();
    tree.sync_data_series(&strings(&["U", "U", "I"]));
    assert_eq!(tree.series(), strings(&["U", "I"]).as_slice());
    let color = tree.find("Marker Color").unwrap();
    assert_eq!(child_names(&tree, color), vec!["U", "I"]);
}

#[test]
fn test_series_named_like_a_fit_gets_its_own_legend_entry() {
    let (mut tree, functions) = tree_with_fits(1);
    tree.sync_data_series(&strings(&["Fit 1"]));

    let labels = tree.role(Role::LegendLabels).unwrap();
    let entries = tree.children(labels).to_vec();
    assert_eq!(
        child_names(&tree, labels),
        vec!["Fit 1", "Fit 1", "Underground", "MeanLine"]
    );
    assert_ne!(entries[0], entries[1]);

    tree.set_value(entries[0], "measured", &functions);
    tree.set_value(entries[1], "model", &functions);
    assert_eq!(tree.value(entries[0]).as_str(), Some("measured"));
    assert_eq!(tree.value(entries[1]).as_str(), Some("model"));

    // a resync keeps both entries and their values
    tree.sync_data_series(&strings(&["Fit 1"]));
    assert_eq!(tree.children(labels), entries.as_slice());
}
