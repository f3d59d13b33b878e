//! Tests for payload extraction and engine runs

use approx::assert_relative_eq;
use fitgrid::bridge::{ForeignError, ForeignObject, ForeignRuntime, ObjectGraph};
use fitgrid::engine::{ComputationEngine, FAILURE_MESSAGE};
use fitgrid::tree::Role;
use fitgrid::workspace::{ColumnKind, Workspace};
use fitgrid::FitGridError;
use serde_json::{json, Value as Json};

/// Engine that records its arguments and answers with a fixed status.
struct Recording {
    graph: ObjectGraph,
    status: i64,
    refuse: Option<String>,
    calls: Vec<Vec<ForeignObject>>,
    diagnostics: String,
}

impl Recording {
    fn new(status: i64) -> Self {
        Self {
            graph: ObjectGraph::new(),
            status,
            refuse: None,
            calls: Vec::new(),
            diagnostics: String::new(),
        }
    }

    fn argument(&self, position: usize) -> Json {
        self.calls[0][position].to_json()
    }
}

impl ForeignRuntime for Recording {
    type Object = ForeignObject;

    fn none(&mut self) -> ForeignObject {
        self.graph.none()
    }
    fn bool(&mut self, value: bool) -> Result<ForeignObject, ForeignError> {
        self.graph.bool(value)
    }
    fn int(&mut self, value: i64) -> Result<ForeignObject, ForeignError> {
        self.graph.int(value)
    }
    fn float(&mut self, value: f64) -> Result<ForeignObject, ForeignError> {
        self.graph.float(value)
    }
    fn str(&mut self, value: &str) -> Result<ForeignObject, ForeignError> {
        if self.refuse.as_deref() == Some(value) {
            return Err(ForeignError::Runtime {
                message: format!("cannot encode {}", value),
            });
        }
        self.graph.str(value)
    }
    fn list(&mut self, items: Vec<ForeignObject>) -> Result<ForeignObject, ForeignError> {
        self.graph.list(items)
    }
    fn tuple(&mut self, a: ForeignObject, b: ForeignObject) -> Result<ForeignObject, ForeignError> {
        self.graph.tuple(a, b)
    }
    fn dict(
        &mut self,
        entries: Vec<(ForeignObject, ForeignObject)>,
    ) -> Result<ForeignObject, ForeignError> {
        self.graph.dict(entries)
    }
    fn function(&mut self, name: &str) -> Result<ForeignObject, ForeignError> {
        self.graph.function(name)
    }
}

impl ComputationEngine for Recording {
    fn invoke(
        &mut self,
        data: ForeignObject,
        plot: ForeignObject,
        functions: ForeignObject,
        fit: ForeignObject,
    ) -> Result<i64, ForeignError> {
        self.calls.push(vec![data, plot, functions, fit]);
        self.diagnostics.push_str("fit converged\n");
        Ok(self.status)
    }

    fn take_diagnostics(&mut self) -> String {
        std::mem::take(&mut self.diagnostics)
    }
}

fn linear_workspace() -> Workspace {
    let mut ws = Workspace::new();
    ws.set_table_path("data/iv.csv");
    ws.add_series(ColumnKind::X, "t");
    ws.add_series(ColumnKind::Y, "Voltage");

    let fits = ws.tree().role(Role::FitCount).unwrap();
    ws.set_value(fits, 1i64);
    let selector = ws.tree().role(Role::FitFunction).unwrap();
    ws.set_value(selector, "Linear");
    let fitted = ws.tree().role(Role::FittedData).unwrap();
    ws.set_value(fitted, "Voltage");

    let start = ws.tree().role(Role::StartValues).unwrap();
    let a = ws.tree().find_child(start, "A").unwrap();
    ws.set_value(a, 2.0);
    ws
}

#[test]
fn test_successful_run_passes_four_arguments() {
    let ws = linear_workspace();
    let mut engine = Recording::new(1);

    let outcome = ws.run(&mut engine).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.diagnostics(), "fit converged\n");
    assert_eq!(outcome.user_message(), None);
    assert_eq!(engine.calls.len(), 1);

    let data = engine.argument(0);
    assert_eq!(data["Path"], "data/iv.csv");
    assert_eq!(data["xColumns"], json!(["t"]));
    assert_eq!(data["yColumns"], json!(["Voltage"]));

    assert_eq!(engine.argument(2), json!("<function Linear>"));

    let fit = engine.argument(3);
    assert_eq!(fit["NumFits"], 1);
    assert_eq!(fit["DataNo"], 0);
    assert_eq!(fit["sParams"], json!([[2.0, 1.0]]));
    assert_eq!(fit["Bounds"], json!([[["-inf", "-inf"], ["inf", "inf"]]]));
    assert_eq!(fit["LatexFuncs"]["Linear"], "A x + B");
    assert_eq!(fit["LatexParams"]["Linear"], json!(["A", "B"]));
    // a single fit leaves unset fields to the engine
    assert_eq!(fit["Method"], json!(null));
    assert_eq!(fit["LogBase"], json!(null));
    assert_relative_eq!(fit["sParams"][0][0].as_f64().unwrap(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_failed_status_gives_generic_message() {
    let ws = linear_workspace();
    let mut engine = Recording::new(0);

    let outcome = ws.run(&mut engine).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.user_message(), Some(FAILURE_MESSAGE));
    // diagnostics are drained even on failure
    assert_eq!(outcome.diagnostics(), "fit converged\n");
    assert!(engine.diagnostics.is_empty());
}

#[test]
fn test_refused_value_aborts_before_invocation() {
    let ws = linear_workspace();
    let mut engine = Recording::new(1);
    engine.refuse = Some("Voltage".to_string());

    let err = ws.run(&mut engine).unwrap_err();
    assert!(matches!(err, FitGridError::Marshal(ForeignError::Runtime { .. })));
    assert!(engine.calls.is_empty());
}

#[test]
fn test_per_fit_handles() {
    let mut ws = Workspace::new();
    let fits = ws.tree().role(Role::FitCount).unwrap();
    ws.set_value(fits, 2i64);
    let selector = ws.tree().role(Role::FitFunction).unwrap();
    let second = ws.tree().find_child(selector, "Fit 2").unwrap();
    ws.set_value(second, "Quadratic");

    let mut engine = Recording::new(1);
    ws.run(&mut engine).unwrap();
    // Fit 1 adopted the selection made on Fit 2
    assert_eq!(
        engine.argument(2),
        json!(["<function Quadratic>", null])
    );
}
