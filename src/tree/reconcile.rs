//! Value propagation after a node changes
//!
//! [`SettingsTree::on_node_changed`] applies, in priority order:
//!
//! 1. the bounds rule for leaves under the bounds containers (leaves under
//!    the starting-value container stop here too);
//! 2. collapse-to-parent: a concrete value set on an instance is copied to
//!    every unset, enabled sibling, the instance itself is reset and the
//!    parent shows the composed text of its children;
//! 3. expand-to-children: a concrete value set on a node with instances
//!    resets all instances;
//! 4. group resize when a count driver changes.
//!
//! Function selectors additionally rebuild the parameter containers of every
//! instance whose selected function changed.

use super::arena::SettingsTree;
use super::node::{Group, NodeId, NodeKind, Role};
use super::patch::{PatchOp, TreePatch};
use super::regenerate::ParameterSource;
use crate::value::{ValueCell, ValueType};
use tracing::debug;

/// How a change reached the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeSource {
    /// An edit by the user.
    Edit,
    /// A stored value being replayed; stored instance values are already
    /// reconciled, so collapse-to-parent is skipped.
    Replay,
}

impl SettingsTree {
    /// Set a node's value and reconcile the tree.
    ///
    /// Input the node cannot hold is stored as `Unspecified`.
    pub fn set_value(
        &mut self,
        id: NodeId,
        cell: impl Into<ValueCell>,
        functions: &dyn ParameterSource,
    ) -> TreePatch {
        self.assign(id, cell.into());
        self.reconcile(id, functions, ChangeSource::Edit);
        self.take_patch()
    }

    /// Parse `text` for the node's type, then behave like [`set_value`](Self::set_value).
    pub fn set_value_str(
        &mut self,
        id: NodeId,
        text: &str,
        functions: &dyn ParameterSource,
    ) -> TreePatch {
        let cell = self.parse_for(id, text);
        self.set_value(id, cell, functions)
    }

    /// Reconcile the tree after `id` changed.
    pub fn on_node_changed(&mut self, id: NodeId, functions: &dyn ParameterSource) -> TreePatch {
        self.reconcile(id, functions, ChangeSource::Edit);
        self.take_patch()
    }

    pub(crate) fn replay_value(&mut self, id: NodeId, text: &str, functions: &dyn ParameterSource) {
        let cell = self.parse_for(id, text);
        self.assign(id, cell);
        self.reconcile(id, functions, ChangeSource::Replay);
    }

    fn parse_for(&self, id: NodeId, text: &str) -> ValueCell {
        let ty = self
            .node(id)
            .map_or(ValueType::Text, |n| n.template.value_type);
        ValueCell::parse(ty, text)
    }

    pub(crate) fn reconcile(
        &mut self,
        id: NodeId,
        functions: &dyn ParameterSource,
        source: ChangeSource,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        let kind = node.kind();
        let has_children = !node.children.is_empty();
        let concrete = node.cell.is_specified();

        let wants_editor =
            self.value(id).as_str() == Some(self.config.new_function_choice.as_str());
        if wants_editor && self.is_function_selector(id) {
            self.assign(id, ValueCell::Unspecified);
            self.patch.push(PatchOp::OpenFunctionEditor { selector: id });
            self.sync_function_selection(functions);
            return;
        }

        let main = self.main_ancestor(id);
        match self.node(main).and_then(|n| n.role) {
            Some(Role::BoundsMin) | Some(Role::BoundsMax) => {
                self.refresh_bounds_state();
                return;
            }
            Some(Role::StartValues) => return,
            _ => {}
        }

        if source == ChangeSource::Edit && self.collapse_applies(id) {
            self.collapse_to_parent(id);
        } else if has_children && concrete && kind != NodeKind::CountDriver {
            self.expand_to_children(id);
        } else if kind == NodeKind::CountDriver {
            self.resize_group(id, functions);
        }

        if self.is_function_selector(id) {
            self.sync_function_selection(functions);
        }
    }

    fn is_function_selector(&self, id: NodeId) -> bool {
        let selector = self.role(Role::FitFunction);
        selector.is_some() && (Some(id) == selector || self.parent(id) == selector)
    }

    fn collapse_applies(&self, id: NodeId) -> bool {
        if self.value(id).is_unspecified() {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if self.is_root(parent) || self.kind(parent) == Some(NodeKind::Category) {
            return false;
        }
        self.children(parent)
            .iter()
            .any(|&s| s != id && self.value(s).is_unspecified())
    }

    fn collapse_to_parent(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let value = self.value(id).clone();
        for sibling in self.children(parent).to_vec() {
            let adopt = sibling != id
                && self.value(sibling).is_unspecified()
                && self.node(sibling).is_some_and(|n| n.enabled);
            if adopt {
                self.assign(sibling, value.clone());
            }
        }
        self.assign(id, ValueCell::Unspecified);
        self.assign(parent, ValueCell::Unspecified);
    }

    fn expand_to_children(&mut self, id: NodeId) {
        let is_method = self.node(id).and_then(|n| n.role) == Some(Role::FitMethod);
        if is_method && self.any_bounds {
            self.distribute_group_value(id, None);
        } else {
            for child in self.children(id).to_vec() {
                self.assign(child, ValueCell::Unspecified);
            }
        }
        self.patch.push(PatchOp::Collapse { id });
    }

    /// Copy the group value to every enabled instance except `skip`, then
    /// reset the group so the instances speak for themselves.
    fn distribute_group_value(&mut self, group: NodeId, skip: Option<NodeId>) {
        let value = self.value(group).clone();
        for child in self.children(group).to_vec() {
            let enabled = self.node(child).is_some_and(|n| n.enabled);
            if enabled && Some(child) != skip {
                self.assign(child, value.clone());
            }
        }
        self.assign(group, ValueCell::Unspecified);
    }

    /// Re-derive which fit instances carry bounds and lock their method.
    pub(crate) fn refresh_bounds_state(&mut self) {
        let Some(method) = self.role(Role::FitMethod) else {
            return;
        };
        let count = self.fit_count();
        if count != 1 {
            self.set_enabled(method, true);
        }

        let mut any = false;
        for index in 1..=count {
            let bounded = [Role::BoundsMin, Role::BoundsMax].into_iter().any(|role| {
                self.parameter_container(role, index).is_some_and(|c| {
                    self.children(c)
                        .iter()
                        .any(|&leaf| self.value(leaf).is_specified())
                })
            });
            let target = if count == 1 {
                Some(method)
            } else {
                self.find_child(method, &Group::Fits.instance_name(index))
            };
            let Some(target) = target else {
                any |= bounded;
                continue;
            };

            if bounded {
                any = true;
                if self.node(target).is_some_and(|n| n.enabled) {
                    self.lock_bounded_method(method, target);
                }
            } else {
                self.set_enabled(target, true);
            }
        }
        self.any_bounds = any;
    }

    fn lock_bounded_method(&mut self, method: NodeId, target: NodeId) {
        if target != method && self.value(method).is_specified() {
            self.distribute_group_value(method, Some(target));
        }
        let bounded = ValueCell::text(self.config.bounded_method.clone());
        self.assign(target, bounded);
        self.set_enabled(target, false);
        debug!(node = target.index(), "fit method locked by bounds");
    }

    fn resize_group(&mut self, driver: NodeId, functions: &dyn ParameterSource) {
        let Some(group) = self.node(driver).and_then(|n| n.template.group) else {
            return;
        };
        if self.value(driver).is_unspecified() {
            self.assign(driver, ValueCell::from(0i64));
        }
        let count = self.instance_count(group);
        let previous = self.numbered_instances(group);
        debug!(?group, old = previous, new = count, "resizing group");

        for template in self.group_templates(group).to_vec() {
            self.resize_template(template, group, count);
        }
        self.apply_group_visibility(group);

        if group == Group::Fits {
            self.sync_legend_labels();
            self.rebuild_parameters(true, functions);
        }
    }

    fn resize_template(&mut self, template: NodeId, group: Group, count: usize) {
        let instances = self.children(template).to_vec();
        if count <= 1 {
            if count == 1 {
                let folded = instances
                    .first()
                    .map(|&first| self.value(first).clone())
                    .filter(ValueCell::is_specified);
                if let Some(cell) = folded {
                    self.assign(template, cell);
                }
            }
            for instance in instances {
                self.remove_subtree(instance);
            }
            return;
        }

        for &extra in instances.iter().skip(count) {
            self.remove_subtree(extra);
        }
        let Some(shape) = self.node(template).and_then(|n| n.template.instantiate()) else {
            return;
        };
        let existing = instances.len().min(count);
        for index in existing + 1..=count {
            self.add_node(template, group.instance_name(index), shape.clone(), None);
        }
        if existing == 0 {
            self.patch.push(PatchOp::Collapse { id: template });
        }
    }

    /// Hide a group's nodes while its count is zero.
    pub(crate) fn apply_group_visibility(&mut self, group: Group) {
        match group {
            Group::Fits => {
                let hidden = self.fit_count() == 0;
                let driver = self.role(Role::FitCount);
                for id in self.children(self.fit_root).to_vec() {
                    if Some(id) != driver {
                        self.set_hidden(id, hidden);
                    }
                }
            }
            Group::Zooms => {
                let hidden = self.zoom_count() == 0;
                for id in self.group_templates(Group::Zooms).to_vec() {
                    self.set_hidden(id, hidden);
                }
            }
            Group::Series => {}
        }
    }

    /// Reset every value, drop every instance and clear the data series.
    pub fn clear_all(&mut self, functions: &dyn ParameterSource) -> TreePatch {
        for role in [Role::FitCount, Role::ZoomCount] {
            if let Some(driver) = self.role(role) {
                self.assign(driver, ValueCell::from(0i64));
                self.resize_group(driver, functions);
            }
        }
        self.apply_data_series(&[]);

        for id in self.value_nodes() {
            if self.kind(id) != Some(NodeKind::CountDriver) {
                self.assign(id, ValueCell::Unspecified);
            }
            self.set_enabled(id, true);
        }
        self.any_bounds = false;
        self.built_functions.clear();
        self.take_patch()
    }
}
