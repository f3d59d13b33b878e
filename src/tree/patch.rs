//! Presentation patches produced by tree reconciliation
//!
//! Reconciliation never touches a UI. Each mutating tree operation returns a
//! [`TreePatch`] describing what changed; a [`PresentationSink`] applies it to
//! whatever front end is in use.

use super::NodeId;

/// A single presentation change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// A node was inserted under `parent`.
    Created { id: NodeId, parent: NodeId },
    /// A node and its subtree were dropped.
    Removed { id: NodeId },
    /// The stored cell of a node changed.
    ValueChanged { id: NodeId },
    /// The node's children should be folded away.
    Collapse { id: NodeId },
    Hidden { id: NodeId, hidden: bool },
    Enabled { id: NodeId, enabled: bool },
    /// The user picked the "new function" entry of a function selector.
    OpenFunctionEditor { selector: NodeId },
}

/// Ordered list of presentation changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePatch {
    ops: Vec<PatchOp>,
}

impl TreePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, op: PatchOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Append another patch after this one.
    pub fn extend(&mut self, other: TreePatch) {
        self.ops.extend(other.ops);
    }

    /// True if the patch asks for the function editor to open.
    pub fn requests_function_editor(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, PatchOp::OpenFunctionEditor { .. }))
    }
}

impl IntoIterator for TreePatch {
    type Item = PatchOp;
    type IntoIter = std::vec::IntoIter<PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Applies patches to a presentation layer.
pub trait PresentationSink {
    fn apply(&mut self, op: &PatchOp);

    fn apply_patch(&mut self, patch: &TreePatch) {
        for op in patch.ops() {
            self.apply(op);
        }
    }
}

/// Sink that records every op, for tests and headless use.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<PatchOp>,
}

impl PresentationSink for RecordingSink {
    fn apply(&mut self, op: &PatchOp) {
        self.ops.push(op.clone());
    }
}
