//! Keeping marker groups and legend labels in step with the data series

use super::arena::SettingsTree;
use super::node::{Group, NodeId, NodeTemplate, Role};
use super::patch::TreePatch;
use super::schema::{LEGEND_LABELS, MEAN_LINE, UNDERGROUND};
use tracing::debug;

impl SettingsTree {
    /// Resynchronise everything keyed by data-series name.
    ///
    /// Marker templates get one instance per series when more than one series
    /// is plotted; the fitted-data selector offers exactly these names; the
    /// legend-label category lists the series, then the fits, then the
    /// synthetic entries.
    pub fn sync_data_series(&mut self, names: &[String]) -> TreePatch {
        self.apply_data_series(names);
        self.take_patch()
    }

    pub(crate) fn apply_data_series(&mut self, names: &[String]) {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(name) {
                unique.push(name.clone());
            }
        }
        debug!(series = unique.len(), "syncing data series");
        self.series = unique.clone();

        for template in self.group_templates(Group::Series).to_vec() {
            self.sync_series_template(template, &unique);
        }
        if let Some(fitted) = self.role(Role::FittedData) {
            self.set_choices(fitted, unique);
        }
        self.sync_legend_labels();
    }

    fn sync_series_template(&mut self, template: NodeId, names: &[String]) {
        if names.len() > 1 {
            if let Some(shape) = self.node(template).and_then(|n| n.template.instantiate()) {
                self.sync_children(template, names, &shape);
            }
            return;
        }

        let survivor = names
            .first()
            .and_then(|only| self.find_child(template, only))
            .map(|c| self.value(c).clone())
            .filter(|cell| cell.is_specified());
        if let Some(cell) = survivor {
            self.assign(template, cell);
        }
        self.remove_children(template);
    }

    /// Legend labels: data series, `Fit 1..N`, then the synthetic entries.
    pub(crate) fn sync_legend_labels(&mut self) {
        let fits = self.fit_count();
        let mut desired = self.series.clone();
        desired.extend((1..=fits).map(|i| Group::Fits.instance_name(i)));
        if fits > 0 {
            desired.push(UNDERGROUND.to_string());
            desired.push(MEAN_LINE.to_string());
        }

        let existing = self.role(Role::LegendLabels);
        if desired.is_empty() {
            if let Some(labels) = existing {
                self.remove_subtree(labels);
            }
            return;
        }
        let labels = match existing {
            Some(labels) => labels,
            None => {
                let Some(legend) = self.role(Role::LegendCategory) else {
                    return;
                };
                self.add_role_node(
                    legend,
                    LEGEND_LABELS,
                    NodeTemplate::category(),
                    Role::LegendLabels,
                    Some(0),
                )
            }
        };
        self.sync_children(labels, &desired, &NodeTemplate::text());
    }

    /// Make `parent`'s children exactly `desired`, in that order. Surviving
    /// entries keep their values; missing ones are created from `shape`.
    ///
    /// Each existing child fills at most one slot, so a name that appears
    /// twice in `desired` gets two nodes.
    fn sync_children(&mut self, parent: NodeId, desired: &[String], shape: &NodeTemplate) {
        let mut unclaimed = self.children(parent).to_vec();

        let mut ordered = Vec::with_capacity(desired.len());
        for name in desired {
            let reused = unclaimed
                .iter()
                .position(|&c| self.node(c).is_some_and(|n| n.name == *name))
                .map(|at| unclaimed.remove(at));
            let id = match reused {
                Some(id) => id,
                None => self.add_node(parent, name.clone(), shape.clone(), None),
            };
            ordered.push(id);
        }
        for child in unclaimed {
            self.remove_subtree(child);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children = ordered;
        }
    }

    /// Offer `names` (plus the "new function" entry) in every fit-function selector.
    pub fn set_function_choices(&mut self, names: &[String]) {
        let Some(selector) = self.role(Role::FitFunction) else {
            return;
        };
        let mut choices = names.to_vec();
        choices.push(self.config.new_function_choice.clone());
        self.set_choices(selector, choices);
    }
}
