//! Session façade tying the settings tree to functions, data columns and
//! the computation engine

use crate::config::{CsvSettings, GridConfig};
use crate::engine::{self, ComputationEngine, RunOutcome};
use crate::error::{FitGridError, Result};
use crate::functions::{FunctionDraft, FunctionError, FunctionSpec, FunctionTable};
use crate::output::{self, Payload};
use crate::persistence::{self, ProjectHeader};
use crate::tree::{NodeId, Role, SettingsTree, TreePatch};
use crate::value::ValueCell;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// The four data-column lists of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    X,
    XError,
    /// Plotted data series.
    Y,
    YError,
}

/// One editing session.
#[derive(Debug, Clone)]
pub struct Workspace {
    tree: SettingsTree,
    functions: FunctionTable,
    columns: ProjectHeader,
    csv: CsvSettings,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A session with the default configuration and functions.
    pub fn new() -> Self {
        Self::with_parts(GridConfig::default(), FunctionTable::defaults())
    }

    /// A session from explicit parts. The table adopts the configured
    /// independent variable.
    pub fn with_parts(config: GridConfig, mut functions: FunctionTable) -> Self {
        functions.set_variable(config.independent_variable.clone());
        let mut tree = SettingsTree::with_config(config);
        tree.set_function_choices(&functions.names());
        tree.take_patch();
        Self {
            tree,
            functions,
            columns: ProjectHeader::default(),
            csv: CsvSettings::default(),
        }
    }

    pub fn tree(&self) -> &SettingsTree {
        &self.tree
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn config(&self) -> &GridConfig {
        self.tree.config()
    }

    pub fn columns(&self) -> &ProjectHeader {
        &self.columns
    }

    pub fn csv(&self) -> &CsvSettings {
        &self.csv
    }

    pub fn set_csv(&mut self, csv: CsvSettings) {
        self.csv = csv;
    }

    pub fn set_table_path(&mut self, path: impl Into<String>) {
        self.columns.table_path = path.into();
    }

    pub fn set_value(&mut self, id: NodeId, cell: impl Into<ValueCell>) -> TreePatch {
        self.tree.set_value(id, cell, &self.functions)
    }

    pub fn set_value_str(&mut self, id: NodeId, text: &str) -> TreePatch {
        self.tree.set_value_str(id, text, &self.functions)
    }

    fn list_mut(&mut self, kind: ColumnKind) -> &mut Vec<String> {
        match kind {
            ColumnKind::X => &mut self.columns.x_columns,
            ColumnKind::XError => &mut self.columns.x_error_columns,
            ColumnKind::Y => &mut self.columns.y_columns,
            ColumnKind::YError => &mut self.columns.y_error_columns,
        }
    }

    /// Append a column to one of the lists. Adding a Y column resyncs the
    /// per-series settings.
    pub fn add_series(&mut self, kind: ColumnKind, name: impl Into<String>) -> TreePatch {
        self.list_mut(kind).push(name.into());
        self.sync_series(kind)
    }

    /// Remove the first column called `name` from one of the lists.
    pub fn remove_series(&mut self, kind: ColumnKind, name: &str) -> TreePatch {
        let list = self.list_mut(kind);
        if let Some(pos) = list.iter().position(|c| c == name) {
            list.remove(pos);
        }
        self.sync_series(kind)
    }

    fn sync_series(&mut self, kind: ColumnKind) -> TreePatch {
        if kind != ColumnKind::Y {
            return TreePatch::new();
        }
        self.tree.sync_data_series(&self.columns.y_columns)
    }

    /// Whether any fit-function selector has `name` selected.
    pub fn is_function_selected(&self, name: &str) -> bool {
        let Some(selector) = self.tree.role(Role::FitFunction) else {
            return false;
        };
        std::iter::once(selector)
            .chain(self.tree.children(selector).iter().copied())
            .any(|id| self.tree.value(id).as_str() == Some(name))
    }

    fn functions_changed(&mut self) -> TreePatch {
        self.tree.set_function_choices(&self.functions.names());
        self.tree.regenerate_all(true, &self.functions)
    }

    /// Add or replace a function and refresh the selectors.
    pub fn upsert_function(&mut self, spec: FunctionSpec) -> TreePatch {
        debug!(name = %spec.name, "function stored");
        self.functions.upsert(spec);
        self.functions_changed()
    }

    /// An empty editor draft over the session's independent variable.
    pub fn new_function_draft(&self) -> FunctionDraft {
        FunctionDraft::for_variable(self.functions.variable())
    }

    /// Commit an editor draft and refresh the selectors.
    pub fn commit_function(&mut self, draft: &FunctionDraft) -> Result<TreePatch> {
        draft.commit(&mut self.functions)?;
        Ok(self.functions_changed())
    }

    /// Delete a function. Fails while any fit still selects it.
    pub fn remove_function(&mut self, name: &str) -> Result<TreePatch> {
        if self.is_function_selected(name) {
            warn!(name, "refusing to delete a selected function");
            return Err(FunctionError::InUse {
                name: name.to_string(),
            }
            .into());
        }
        self.functions.remove(name)?;
        Ok(self.functions_changed())
    }

    /// Reset counts, values and column lists.
    pub fn clear_all(&mut self) -> TreePatch {
        self.columns = ProjectHeader::default();
        self.tree.clear_all(&self.functions)
    }

    /// Render the project file.
    pub fn save_project(&self) -> String {
        persistence::save_project(&self.columns, &self.tree)
    }

    /// Replace the session state with a project file's contents.
    pub fn load_project(&mut self, text: &str) -> Result<TreePatch> {
        let lines: Vec<&str> = text.lines().collect();
        let (header, used) = ProjectHeader::parse(&lines)?;

        let mut patch = self.clear_all();
        self.columns = header;
        patch.extend(self.tree.sync_data_series(&self.columns.y_columns));

        persistence::load_tree(&mut self.tree, &lines[used..], &self.functions);
        patch.extend(self.tree.take_patch());
        Ok(patch)
    }

    pub fn save_project_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.save_project())?;
        Ok(())
    }

    pub fn load_project_file<P: AsRef<Path>>(&mut self, path: P) -> Result<TreePatch> {
        let text = fs::read_to_string(path)?;
        self.load_project(&text)
    }

    pub fn build_payload(&self) -> Payload {
        output::build_payload(&self.tree, &self.columns, &self.csv, &self.functions)
    }

    /// Build the payload and run it through `engine`.
    pub fn run<E>(&self, engine: &mut E) -> Result<RunOutcome>
    where
        E: ComputationEngine + ?Sized,
    {
        engine::run(engine, &self.build_payload()).map_err(FitGridError::from)
    }
}
