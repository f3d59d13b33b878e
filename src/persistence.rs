//! Line-oriented persistence of the settings tree and project files
//!
//! The tree is flattened to `label\nvalue\n` pairs over
//! [`SettingsTree::value_nodes`], fit grid first. Loading walks the live
//! traversal again and consumes a pair whenever the node's label matches the
//! next stored label, so instances created by replayed count drivers are
//! picked up by the stored lines that follow them.
//!
//! A project file prefixes the flattened tree with the data table path, the
//! sizes of the X, X error, Y and Y error column lists, and the lists
//! themselves.

use crate::error::{FitGridError, Result};
use crate::tree::{NodeId, ParameterSource, SettingsTree};
use tracing::debug;

/// Flatten every value node to label/value line pairs.
///
/// Unset values are written as empty lines.
pub fn save_tree(tree: &SettingsTree) -> String {
    let mut out = String::new();
    for id in tree.value_nodes() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        out.push_str(node.label());
        out.push('\n');
        out.push_str(&node.cell().display_string());
        out.push('\n');
    }
    out
}

/// Replay stored label/value pairs into `tree`.
///
/// Returns the number of lines consumed. Pairs with an empty value are
/// consumed without touching the node. A stored label that matches no
/// remaining node stops consumption there.
pub fn load_tree(
    tree: &mut SettingsTree,
    lines: &[&str],
    functions: &dyn ParameterSource,
) -> usize {
    let mut line = 0;
    let mut cursor = tree.next_value_node(None);

    while let Some(id) = cursor {
        if line >= lines.len() {
            break;
        }
        let fallback = tree.next_value_node(Some(id));
        let matches = tree.node(id).is_some_and(|n| n.label() == lines[line]);
        if matches {
            let text = lines.get(line + 1).copied().unwrap_or("");
            if !text.is_empty() {
                tree.replay_value(id, text, functions);
            }
            line += 2;
        }
        cursor = advance(tree, id, fallback);
    }

    debug!(lines = line, "settings replayed");
    line
}

fn advance(tree: &SettingsTree, id: NodeId, fallback: Option<NodeId>) -> Option<NodeId> {
    if tree.node(id).is_some() {
        tree.next_value_node(Some(id))
    } else {
        fallback.filter(|&f| tree.node(f).is_some())
    }
}

/// Header of a project file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectHeader {
    /// Path of the data table; empty when none is loaded.
    pub table_path: String,
    pub x_columns: Vec<String>,
    pub x_error_columns: Vec<String>,
    pub y_columns: Vec<String>,
    pub y_error_columns: Vec<String>,
}

impl ProjectHeader {
    pub fn render(&self) -> String {
        let lists = [
            &self.x_columns,
            &self.x_error_columns,
            &self.y_columns,
            &self.y_error_columns,
        ];
        let mut out = format!("{}\n", self.table_path);
        for list in lists {
            out.push_str(&format!("{}\n", list.len()));
        }
        for list in lists {
            for column in list {
                out.push_str(column);
                out.push('\n');
            }
        }
        out
    }

    /// Parse the header from the start of `lines`, returning it with the
    /// number of lines consumed.
    pub fn parse(lines: &[&str]) -> Result<(Self, usize)> {
        let table_path = lines
            .first()
            .ok_or_else(|| FitGridError::MalformedFile("empty project file".to_string()))?
            .to_string();

        let mut sizes = [0usize; 4];
        for (i, size) in sizes.iter_mut().enumerate() {
            let text = lines.get(1 + i).ok_or_else(|| {
                FitGridError::MalformedFile("project header is truncated".to_string())
            })?;
            *size = text.trim().parse().map_err(|_| {
                FitGridError::MalformedFile(format!("invalid list size '{}'", text))
            })?;
        }

        let mut next: usize = 5;
        let mut take = |count: usize| -> Result<Vec<String>> {
            let end = next
                .checked_add(count)
                .filter(|&end| end <= lines.len())
                .ok_or_else(|| {
                    FitGridError::MalformedFile("column list is truncated".to_string())
                })?;
            let list = lines[next..end].iter().map(|s| s.to_string()).collect();
            next = end;
            Ok(list)
        };
        let header = Self {
            table_path,
            x_columns: take(sizes[0])?,
            x_error_columns: take(sizes[1])?,
            y_columns: take(sizes[2])?,
            y_error_columns: take(sizes[3])?,
        };
        Ok((header, next))
    }
}

/// Render a whole project file.
pub fn save_project(header: &ProjectHeader, tree: &SettingsTree) -> String {
    let mut out = header.render();
    out.push_str(&save_tree(tree));
    out
}
