//! # fitgrid-rs
//!
//! `fitgrid-rs` is the non-visual core of a plot-and-fit settings editor: a
//! tree of named settings whose interior nodes compose the values of their
//! children, whose shape follows "amount of ..." count fields, and whose
//! contents are marshaled into the object graph of an external plotting and
//! fitting engine.
//!
//! The library provides:
//! - A settings tree with composed values, group resize and the bounds rule
//! - Regeneration of per-fit parameter containers from fit-function expressions
//! - A function table with its definitions file and editing workflow
//! - Line-oriented persistence of settings and projects
//! - Extraction of the engine's input maps and a marshaling bridge into any
//!   foreign runtime
//!
//! ## Basic Usage
//!
//! ```
//! use fitgrid::tree::Role;
//! use fitgrid::workspace::{ColumnKind, Workspace};
//!
//! let mut ws = Workspace::new();
//! ws.add_series(ColumnKind::Y, "Voltage");
//!
//! let fits = ws.tree().role(Role::FitCount).unwrap();
//! ws.set_value(fits, 1i64);
//! let function = ws.tree().role(Role::FitFunction).unwrap();
//! ws.set_value(function, "Linear");
//!
//! let start = ws.tree().role(Role::StartValues).unwrap();
//! assert_eq!(ws.tree().children(start).len(), 2);
//! ```

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod functions;
pub mod output;
pub mod persistence;
pub mod tree;
pub mod value;
pub mod workspace;

// Re-exports for convenience
pub use bridge::{to_foreign_value, try_to_foreign_value, ForeignError, ForeignRuntime};
pub use config::{CsvSettings, GridConfig};
pub use engine::{ComputationEngine, RunOutcome};
pub use error::{FitGridError, Result};
pub use functions::{FunctionDraft, FunctionError, FunctionSpec, FunctionTable};
pub use tree::{NodeId, ParameterSource, Role, SettingsTree, TreePatch};
pub use value::{Value, ValueCell, ValueType};
pub use workspace::Workspace;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
