//! Tests for the function definitions file

use fitgrid::functions::{FunctionError, FunctionSpec, FunctionTable};
use fitgrid::tree::ParameterSource;
use std::fs;

#[test]
fn test_definitions_file_roundtrip_on_disk() {
    let mut table = FunctionTable::defaults();
    table
        .insert(
            FunctionSpec::new("Decay", "N0*numpy.exp(-k*x)")
                .with_display("N_0 e^{-k x}")
                .with_labels(["N_0", "k"]),
        )
        .unwrap();

    let path = std::env::temp_dir().join(format!("fitgrid-functions-{}.txt", std::process::id()));
    table.save(&path).unwrap();
    let loaded = FunctionTable::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded, table);
    assert_eq!(loaded.names(), vec!["Decay", "GaussCDF", "GaussPDF", "Linear", "Quadratic"]);
}

#[test]
fn test_record_layout() {
    let mut table = FunctionTable::new();
    table.upsert(FunctionSpec::new("Line", "m*x+c").with_labels(["m"]));
    assert_eq!(table.render(), "Line\nm*x+c\nm*x+c\nm\nc\n");
}

#[test]
fn test_truncated_record() {
    let err = FunctionTable::parse("Linear\nA*x+B\nA x + B\n\\alpha\n").unwrap_err();
    assert!(matches!(err, FunctionError::Malformed { .. }));
}

#[test]
fn test_module_source() {
    let mut table = FunctionTable::new();
    table.upsert(FunctionSpec::new("Linear", "A*x+B"));
    table.upsert(FunctionSpec::new("Decay", "N0*numpy.exp(-k*x)"));
    assert_eq!(
        table.render_module(),
        "import numpy\nimport scipy\n\
         def Decay(x, N0, k): return N0*numpy.exp(-k*x)\n\
         def Linear(x, A, B): return A*x+B\n"
    );
}

#[test]
fn test_parameter_source() {
    let table = FunctionTable::defaults();
    assert_eq!(
        table.parameters("Quadratic"),
        Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
    );
    assert_eq!(table.parameters("Cubic"), None);
}

#[test]
fn test_insert_and_remove() {
    let mut table = FunctionTable::defaults();
    let err = table.insert(FunctionSpec::new("Linear", "a*x")).unwrap_err();
    assert_eq!(err, FunctionError::DuplicateName { name: "Linear".into() });

    let removed = table.remove("Linear").unwrap();
    assert_eq!(removed.expression, "A*x+B");
    assert!(matches!(
        table.remove("Linear"),
        Err(FunctionError::UnknownFunction { .. })
    ));
}
