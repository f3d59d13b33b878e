//! Composed-value settings tree
//!
//! The tree holds every plot and fit setting as a node with a [`ValueCell`].
//! Interior nodes may own numbered instances ("Fit 1", "Fit 2", ...) whose
//! number is controlled by a count driver; the parent then shows the composed
//! text of its instances.
//!
//! # Features
//!
//! - Arena storage with [`NodeId`] handles, two roots (fit grid, plot grid)
//! - Static schema with typed, validated templates
//! - Reconciliation after every change: collapse-to-parent, expand-to-children,
//!   the bounds rule, group resize
//! - Regeneration of per-function parameter containers
//! - Data-series driven marker and legend-label sync
//! - Presentation patches instead of UI side effects
//!
//! # Example
//!
//! ```
//! use fitgrid::tree::{NoFunctions, Role, SettingsTree};
//!
//! let mut tree = SettingsTree::new();
//! let fits = tree.role(Role::FitCount).unwrap();
//! tree.set_value(fits, 2i64, &NoFunctions);
//!
//! let color = tree.find("Fit Color").unwrap();
//! assert_eq!(tree.children(color).len(), 2);
//! ```
//!
//! [`ValueCell`]: crate::value::ValueCell

pub mod arena;
pub mod node;
pub mod patch;
pub mod reconcile;
pub mod regenerate;
pub mod schema;
pub mod series;

pub use arena::SettingsTree;
pub use node::{Group, NodeId, NodeKind, NodeTemplate, Role, SettingsNode};
pub use patch::{PatchOp, PresentationSink, RecordingSink, TreePatch};
pub use regenerate::{NoFunctions, ParameterSource};
