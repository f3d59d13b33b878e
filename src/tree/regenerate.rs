//! Rebuilding per-function parameter containers
//!
//! Every fit instance owns three containers, in this order: minimum bounds,
//! maximum bounds and starting values. Each holds one float leaf per free
//! parameter of the instance's fit function. With a single fit the group
//! nodes are the containers; with more, each group node holds one `Fit i`
//! container per instance.

use super::arena::SettingsTree;
use super::node::{Group, NodeId, NodeKind, NodeTemplate, Role};
use super::patch::TreePatch;
use crate::value::ValueCell;
use std::collections::HashMap;
use tracing::debug;

/// Looks up the free parameters of a fit function by name.
pub trait ParameterSource {
    /// Parameter identifiers in first-appearance order, or `None` if the
    /// function is unknown.
    fn parameters(&self, function: &str) -> Option<Vec<String>>;
}

/// A source that knows no functions. Every instance regenerates empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFunctions;

impl ParameterSource for NoFunctions {
    fn parameters(&self, _function: &str) -> Option<Vec<String>> {
        None
    }
}

impl<F> ParameterSource for F
where
    F: Fn(&str) -> Option<Vec<String>>,
{
    fn parameters(&self, function: &str) -> Option<Vec<String>> {
        self(function)
    }
}

pub(crate) const CONTAINER_ROLES: [Role; 3] = [Role::BoundsMin, Role::BoundsMax, Role::StartValues];

type LeafValues = Vec<(String, ValueCell)>;

impl SettingsTree {
    /// Function selected for fit instance `index` (1-based).
    ///
    /// A concrete group-level selection applies to every instance.
    pub fn function_for(&self, index: usize) -> Option<String> {
        let selector = self.role(Role::FitFunction)?;
        if let Some(name) = self.value(selector).as_str() {
            return Some(name.to_string());
        }
        if self.fit_count() <= 1 {
            return None;
        }
        let child = self.find_child(selector, &Group::Fits.instance_name(index))?;
        self.value(child).as_str().map(str::to_string)
    }

    /// Selected function of every fit instance.
    pub fn effective_functions(&self) -> Vec<Option<String>> {
        (1..=self.fit_count()).map(|i| self.function_for(i)).collect()
    }

    /// The container of `role` (bounds or start values) for instance `index`.
    ///
    /// With a single fit this is the group node itself.
    pub fn parameter_container(&self, role: Role, index: usize) -> Option<NodeId> {
        let group = self.role(role)?;
        match self.fit_count() {
            0 => None,
            1 => (index == 1).then_some(group),
            _ => self.find_child(group, &Group::Fits.instance_name(index)),
        }
    }

    /// Rebuild the parameter containers of one fit instance.
    ///
    /// Unknown or missing functions produce empty containers. With
    /// `keep_values`, values of same-named parameters survive; others are
    /// dropped.
    pub fn regenerate(
        &mut self,
        index: usize,
        function: Option<&str>,
        keep_values: bool,
        functions: &dyn ParameterSource,
    ) -> TreePatch {
        self.regenerate_instance(index, function, keep_values, functions);
        self.refresh_bounds_state();
        self.take_patch()
    }

    /// Rebuild the parameter containers of every fit instance.
    pub fn regenerate_all(
        &mut self,
        keep_values: bool,
        functions: &dyn ParameterSource,
    ) -> TreePatch {
        self.rebuild_parameters(keep_values, functions);
        self.take_patch()
    }

    pub(crate) fn regenerate_instance(
        &mut self,
        index: usize,
        function: Option<&str>,
        keep_values: bool,
        functions: &dyn ParameterSource,
    ) {
        let count = self.fit_count();
        if index == 0 || index > count {
            return;
        }
        let params = function
            .and_then(|f| functions.parameters(f))
            .unwrap_or_default();

        for role in CONTAINER_ROLES {
            let Some(group) = self.role(role) else {
                continue;
            };
            let (container, previous) = if count == 1 {
                let previous = self.leaf_values(group);
                self.remove_children(group);
                (group, previous)
            } else {
                let name = Group::Fits.instance_name(index);
                let existing = self.find_child(group, &name);
                let previous = existing.map(|c| self.leaf_values(c)).unwrap_or_default();
                let position = existing
                    .and_then(|c| self.children(group).iter().position(|&x| x == c))
                    .unwrap_or_else(|| self.instance_slot(group, index));
                if let Some(old) = existing {
                    self.remove_subtree(old);
                }
                let container =
                    self.add_node(group, name, NodeTemplate::composed(), Some(position));
                (container, previous)
            };
            self.populate(container, &params, keep_values.then_some(&previous));
        }

        if self.built_functions.len() < count {
            self.built_functions.resize(count, None);
        }
        self.built_functions[index - 1] = function.map(str::to_string);
        debug!(
            instance = index,
            function = function.unwrap_or(""),
            parameters = params.len(),
            keep_values,
            "regenerated parameter containers"
        );
    }

    pub(crate) fn rebuild_parameters(
        &mut self,
        keep_values: bool,
        functions: &dyn ParameterSource,
    ) {
        let count = self.fit_count();
        let selected = self.effective_functions();

        let mut snapshots: HashMap<Role, HashMap<usize, LeafValues>> = HashMap::new();
        for role in CONTAINER_ROLES {
            if let Some(group) = self.role(role) {
                snapshots.insert(role, self.snapshot(group));
                self.remove_children(group);
            }
        }

        for (offset, function) in selected.iter().enumerate() {
            let index = offset + 1;
            let params = function
                .as_deref()
                .and_then(|f| functions.parameters(f))
                .unwrap_or_default();
            for role in CONTAINER_ROLES {
                let Some(group) = self.role(role) else {
                    continue;
                };
                let container = if count == 1 {
                    group
                } else {
                    self.add_node(
                        group,
                        Group::Fits.instance_name(index),
                        NodeTemplate::composed(),
                        None,
                    )
                };
                let previous = snapshots
                    .get(&role)
                    .and_then(|s| s.get(&index))
                    .filter(|_| keep_values);
                self.populate(container, &params, previous);
            }
        }

        debug!(instances = count, keep_values, "rebuilt all parameter containers");
        self.built_functions = selected;
        self.refresh_bounds_state();
    }

    /// Rebuild only the instances whose selected function changed.
    pub(crate) fn sync_function_selection(&mut self, functions: &dyn ParameterSource) {
        let selected = self.effective_functions();
        if selected.len() != self.built_functions.len() {
            self.rebuild_parameters(false, functions);
            return;
        }
        for (offset, function) in selected.iter().enumerate() {
            if self.built_functions[offset] != *function {
                self.regenerate_instance(offset + 1, function.as_deref(), false, functions);
            }
        }
        self.refresh_bounds_state();
    }

    fn populate(&mut self, container: NodeId, params: &[String], previous: Option<&LeafValues>) {
        for param in params {
            let leaf = self.add_node(container, param.clone(), NodeTemplate::float(), None);
            let restored = previous.and_then(|p| p.iter().find(|(name, _)| name == param));
            if let Some((_, cell)) = restored {
                self.assign(leaf, cell.clone());
            }
        }
    }

    /// Values of the direct leaf children of `container`.
    fn leaf_values(&self, container: NodeId) -> LeafValues {
        self.children(container)
            .iter()
            .filter_map(|&c| self.node(c))
            .filter(|n| n.kind() == NodeKind::Leaf)
            .map(|n| (n.name.clone(), n.cell.clone()))
            .collect()
    }

    /// Leaf values of a group node keyed by instance index. Leaves held
    /// directly by the group belong to instance 1.
    fn snapshot(&self, group: NodeId) -> HashMap<usize, LeafValues> {
        let mut out: HashMap<usize, LeafValues> = HashMap::new();
        let direct = self.leaf_values(group);
        if !direct.is_empty() {
            out.insert(1, direct);
        }
        for &child in self.children(group) {
            let Some(node) = self.node(child) else {
                continue;
            };
            if node.kind() != NodeKind::ComposedGroup {
                continue;
            }
            if let Some(index) = Group::Fits.instance_index(&node.name) {
                out.insert(index, self.leaf_values(child));
            }
        }
        out
    }

    /// Child position that keeps `Fit i` containers in ascending order.
    fn instance_slot(&self, group: NodeId, index: usize) -> usize {
        self.children(group)
            .iter()
            .filter(|&&c| {
                self.node(c)
                    .and_then(|n| Group::Fits.instance_index(&n.name))
                    .is_some_and(|i| i < index)
            })
            .count()
    }
}
