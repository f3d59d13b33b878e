//! Tests for value conversion

use fitgrid::bridge::{
    to_foreign_value, try_to_foreign_value, ForeignError, ForeignObject, ObjectGraph,
};
use fitgrid::value::ValueCell;
use serde_json::json;

#[test]
fn test_mapping_with_unset_entry() {
    let cell = ValueCell::map([
        ("a", ValueCell::Unspecified),
        ("b", ValueCell::seq([1i64, 2, 3])),
    ]);
    let object = to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap();

    assert_eq!(object.get("a"), Some(&ForeignObject::None));
    assert_eq!(
        object.get("b"),
        Some(&ForeignObject::List(vec![
            ForeignObject::Int(1),
            ForeignObject::Int(2),
            ForeignObject::Int(3),
        ]))
    );
    assert_eq!(object.to_json(), json!({"a": null, "b": [1, 2, 3]}));
}

#[test]
fn test_strict_and_lenient_agree_on_supported_shapes() {
    let cell = ValueCell::map([
        ("limits", ValueCell::pair(-1.0, 1.0)),
        ("labels", ValueCell::map([("A", ValueCell::seq(["\\alpha"]))])),
        ("flag", ValueCell::from(true)),
    ]);
    let lenient = to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap();
    let strict = try_to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap();
    assert_eq!(lenient, strict);
}

#[test]
fn test_nested_dynamic_map_fails_loudly_in_strict_mode() {
    let inner = ValueCell::map([("z", ValueCell::from(1i64))]);
    let nested = ValueCell::map([("fit", ValueCell::map([("inner", inner)]))]);
    let cell = ValueCell::seq([nested]);

    let err = try_to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap_err();
    assert!(matches!(err, ForeignError::UnsupportedShape { .. }));

    let degraded = to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap();
    assert_eq!(degraded.to_json(), json!([null]));
}

#[test]
fn test_conversion_leaves_input_untouched() {
    let cell = ValueCell::seq([ValueCell::pair(0.5, ValueCell::Unspecified)]);
    let before = cell.clone();
    let mut graph = ObjectGraph::new();
    graph.convert(&cell);
    assert_eq!(cell, before);
    // float, tuple and list; null is a singleton
    assert_eq!(graph.objects_built(), 3);
}

#[cfg(feature = "arrays")]
#[test]
fn test_ndarray_columns() {
    use ndarray::array;

    let column: ValueCell = array![0.5, 1.5].into();
    let table: ValueCell = array![[1.0, 2.0], [3.0, 4.0]].into();
    let mut graph = ObjectGraph::new();
    assert_eq!(graph.convert(&column).to_json(), json!([0.5, 1.5]));
    assert_eq!(graph.convert(&table).to_json(), json!([[1.0, 2.0], [3.0, 4.0]]));
}
