//! Arena storage, lookup and traversal for the settings tree

use super::node::{Group, NodeId, NodeKind, NodeTemplate, Role, SettingsNode};
use super::patch::{PatchOp, TreePatch};
use crate::config::GridConfig;
use crate::value::ValueCell;
use std::collections::{BTreeMap, HashMap};

/// The settings tree.
///
/// Two parentless roots share one arena: the fit grid and the plot grid.
/// Nodes are addressed by generational [`NodeId`]s. Removed slots go on a
/// free list and are reused with a bumped generation, so a stale id stops
/// resolving.
#[derive(Debug, Clone)]
pub struct SettingsTree {
    nodes: Vec<Slot>,
    free_list: Vec<usize>,
    pub(crate) fit_root: NodeId,
    pub(crate) plot_root: NodeId,
    pub(crate) roles: HashMap<Role, NodeId>,
    pub(crate) templates: BTreeMap<Group, Vec<NodeId>>,
    pub(crate) config: GridConfig,
    /// Data-series names as last synchronised.
    pub(crate) series: Vec<String>,
    pub(crate) any_bounds: bool,
    /// Function each fit instance's parameter containers were built for.
    pub(crate) built_functions: Vec<Option<String>>,
    pub(crate) patch: TreePatch,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<SettingsNode>,
}

impl Default for SettingsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsTree {
    /// Build the static schema with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GridConfig::default())
    }

    pub fn with_config(config: GridConfig) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            fit_root: NodeId::new(0, 0),
            plot_root: NodeId::new(1, 0),
            roles: HashMap::new(),
            templates: BTreeMap::new(),
            config,
            series: Vec::new(),
            any_bounds: false,
            built_functions: Vec::new(),
            patch: TreePatch::new(),
        };
        tree.fit_root =
            tree.push_node(SettingsNode::new("Fit Settings", NodeTemplate::category()));
        tree.plot_root =
            tree.push_node(SettingsNode::new("Plot Settings", NodeTemplate::category()));
        super::schema::build(&mut tree);
        tree.patch = TreePatch::new();
        tree
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn fit_root(&self) -> NodeId {
        self.fit_root
    }

    pub fn plot_root(&self) -> NodeId {
        self.plot_root
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.fit_root || id == self.plot_root
    }

    pub fn node(&self, id: NodeId) -> Option<&SettingsNode> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut SettingsNode> {
        self.nodes
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Number of live nodes, roots included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The node holding `role`, if it currently exists.
    pub fn role(&self, role: Role) -> Option<NodeId> {
        self.roles.get(&role).copied()
    }

    /// Cell of a node; unknown ids read as `Unspecified`.
    pub fn value(&self, id: NodeId) -> &ValueCell {
        static UNSET: ValueCell = ValueCell::Unspecified;
        self.node(id).map_or(&UNSET, |n| &n.cell)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(SettingsNode::kind)
    }

    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.node(c).is_some_and(|n| n.name == name))
    }

    /// Resolve a name path below either root, e.g. `["Fit Bounds Minimum", "Fit 2", "A"]`.
    ///
    /// Categories may be skipped: `["Marker Size"]` finds the node under "Markers".
    pub fn lookup(&self, path: &[&str]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let start = [self.fit_root, self.plot_root]
            .into_iter()
            .flat_map(|root| self.preorder(root))
            .find(|&id| !self.is_root(id) && self.node(id).is_some_and(|n| n.name == *first))?;
        rest.iter()
            .try_fold(start, |node, name| self.find_child(node, name))
    }

    /// Dotted form of [`lookup`](Self::lookup).
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let parts: Vec<&str> = path.split('.').collect();
        self.lookup(&parts)
    }

    /// Topmost ancestor below a root or category.
    pub fn main_ancestor(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let parent_is_heading =
                self.is_root(parent) || self.kind(parent) == Some(NodeKind::Category);
            if parent_is_heading {
                break;
            }
            current = parent;
        }
        current
    }

    /// Pre-order listing of `root`'s subtree, `root` first.
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.node(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Nodes that carry values, fit grid first, in pre-order.
    pub fn value_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut next = self.next_value_node(None);
        while let Some(id) = next {
            out.push(id);
            next = self.next_value_node(Some(id));
        }
        out
    }

    /// The value node after `after` in traversal order, computed from the
    /// current structure so callers may mutate the tree between steps.
    pub fn next_value_node(&self, after: Option<NodeId>) -> Option<NodeId> {
        let mut candidate = match after {
            None => Some(self.fit_root),
            Some(id) => self.preorder_successor(id),
        };
        while let Some(id) = candidate {
            if !self.is_root(id) && self.kind(id) != Some(NodeKind::Category) {
                return Some(id);
            }
            candidate = self.preorder_successor(id);
        }
        None
    }

    fn preorder_successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(&first) = self.children(id).first() {
            return Some(first);
        }
        let mut current = id;
        loop {
            match self.parent(current) {
                Some(parent) => {
                    let siblings = self.children(parent);
                    let pos = siblings.iter().position(|&s| s == current)?;
                    if let Some(&next) = siblings.get(pos + 1) {
                        return Some(next);
                    }
                    current = parent;
                }
                None if current == self.fit_root => return Some(self.plot_root),
                None => return None,
            }
        }
    }

    /// Numbered or per-series instances of a template.
    pub fn instances(&self, template: NodeId) -> Vec<NodeId> {
        self.children(template).to_vec()
    }

    /// Templates instantiated per member of `group`.
    pub fn group_templates(&self, group: Group) -> &[NodeId] {
        self.templates.get(&group).map_or(&[], Vec::as_slice)
    }

    /// Number of group instances, counting a collapsed single instance as one.
    pub fn instance_count(&self, group: Group) -> usize {
        match group {
            Group::Fits => self.driver_count(Role::FitCount),
            Group::Zooms => self.driver_count(Role::ZoomCount),
            Group::Series => self.series.len(),
        }
    }

    /// Numbered instances currently materialised under the group's templates.
    pub fn numbered_instances(&self, group: Group) -> usize {
        self.group_templates(group)
            .first()
            .map_or(0, |&t| self.children(t).len())
    }

    pub(crate) fn driver_count(&self, role: Role) -> usize {
        self.role(role)
            .and_then(|id| self.value(id).as_i64())
            .map_or(0, |n| n.max(0) as usize)
    }

    pub fn fit_count(&self) -> usize {
        self.driver_count(Role::FitCount)
    }

    pub fn zoom_count(&self) -> usize {
        self.driver_count(Role::ZoomCount)
    }

    pub fn any_bounds_present(&self) -> bool {
        self.any_bounds
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Whether a node's display text is its children's composed text.
    pub fn is_composed_root(&self, id: NodeId) -> bool {
        if self.kind(id) == Some(NodeKind::ComposedGroup) {
            return true;
        }
        match self.parent(id) {
            Some(parent) => {
                self.is_root(parent)
                    || matches!(
                        self.node(parent).and_then(|n| n.role),
                        Some(Role::ZoomCategory) | Some(Role::MarkersCategory)
                    )
            }
            None => false,
        }
    }

    /// Concrete child values joined by the separator.
    pub fn composed_text(&self, id: NodeId) -> String {
        let parts: Vec<String> = self
            .children(id)
            .iter()
            .filter_map(|&c| {
                let node = self.node(c)?;
                if node.kind() == NodeKind::ComposedGroup {
                    (!node.children.is_empty()).then(|| format!("[{}]", self.composed_text(c)))
                } else {
                    node.cell.is_specified().then(|| node.cell.display_string())
                }
            })
            .collect();
        parts.join(&self.config.separator)
    }

    /// Text shown for a node. Derived on every call, never stored.
    pub fn display_text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let own_value = node.kind() != NodeKind::ComposedGroup && node.cell.is_specified();
        if own_value {
            node.cell.display_string()
        } else if !node.children.is_empty() && self.is_composed_root(id) {
            self.composed_text(id)
        } else {
            String::new()
        }
    }

    fn push_node(&mut self, node: SettingsNode) -> NodeId {
        let role = node.role;
        let id = match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                self.nodes.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(self.nodes.len() - 1, 0)
            }
        };
        if let Some(role) = role {
            self.roles.insert(role, id);
        }
        id
    }

    /// Allocated slots, live or free.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a node under `parent`, at `position` or at the end.
    pub(crate) fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        template: NodeTemplate,
        position: Option<usize>,
    ) -> NodeId {
        let mut node = SettingsNode::new(name, template);
        node.parent = Some(parent);
        if node.kind() == NodeKind::ComposedGroup {
            node.cell = ValueCell::text(self.config.composed_marker.clone());
        }
        let id = self.push_node(node);
        if let Some(p) = self.node_mut(parent) {
            let at = position.unwrap_or(p.children.len()).min(p.children.len());
            p.children.insert(at, id);
        }
        self.patch.push(PatchOp::Created { id, parent });
        id
    }

    pub(crate) fn add_role_node(
        &mut self,
        parent: NodeId,
        name: &str,
        template: NodeTemplate,
        role: Role,
        position: Option<usize>,
    ) -> NodeId {
        let id = self.add_node(parent, name, template, position);
        if let Some(node) = self.node_mut(id) {
            node.role = Some(role);
        }
        self.roles.insert(role, id);
        id
    }

    /// Detach `id` from its parent and drop its whole subtree.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for victim in self.preorder(id) {
            let Some(slot) = self.nodes.get_mut(victim.index) else {
                continue;
            };
            if slot.generation != victim.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(victim.index);
                if let Some(role) = node.role {
                    self.roles.remove(&role);
                }
            }
        }
        self.patch.push(PatchOp::Removed { id });
    }

    pub(crate) fn remove_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove_subtree(child);
        }
    }

    /// Store a cell without running reconciliation.
    pub(crate) fn assign(&mut self, id: NodeId, cell: ValueCell) {
        let marker = self.config.composed_marker.clone();
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let cell = match node.kind() {
            NodeKind::ComposedGroup => ValueCell::text(marker),
            _ => node.template.coerce(cell),
        };
        if node.cell != cell {
            node.cell = cell;
            self.patch.push(PatchOp::ValueChanged { id });
        }
    }

    pub(crate) fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            if node.hidden != hidden {
                node.hidden = hidden;
                self.patch.push(PatchOp::Hidden { id, hidden });
            }
        }
    }

    pub(crate) fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.node_mut(id) {
            if node.enabled != enabled {
                node.enabled = enabled;
                self.patch.push(PatchOp::Enabled { id, enabled });
            }
        }
    }

    /// Change a node's user-facing label.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.label = label.into();
        }
    }

    /// Replace the choice list of a template and all its instances.
    ///
    /// Selections no longer offered become `Unspecified`.
    pub(crate) fn set_choices(&mut self, template: NodeId, choices: Vec<String>) {
        let mut targets = vec![template];
        targets.extend(self.children(template).iter().copied());
        for id in targets {
            if let Some(node) = self.node_mut(id) {
                node.template.choices = choices.clone();
            }
            let cell = self.value(id).clone();
            self.assign(id, cell);
        }
    }

    pub(crate) fn take_patch(&mut self) -> TreePatch {
        std::mem::take(&mut self.patch)
    }
}
