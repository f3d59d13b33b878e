//! Editing a function before it is committed to the table

use super::{FunctionError, FunctionSpec, FunctionTable};
use crate::expression::{
    extract_parameters_excluding, is_identifier, substitute_labels_excluding, INDEPENDENT_VARIABLE,
};
use tracing::debug;

/// One parameter row of the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    pub identifier: String,
    pub label: String,
}

/// Working copy of a function while the user edits it.
///
/// The display expression is "derived" while it still equals what the editor
/// would have generated itself; derived displays follow later edits, a
/// display typed by hand is left alone.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDraft {
    /// Name of the function being edited; `None` when creating a new one.
    original: Option<String>,
    name: String,
    expression: String,
    display: Option<String>,
    params: Vec<ParamRow>,
    variable: String,
}

impl Default for FunctionDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionDraft {
    /// An empty draft for a new function over `x`.
    pub fn new() -> Self {
        Self::for_variable(INDEPENDENT_VARIABLE)
    }

    /// An empty draft for a new function over `variable`.
    pub fn for_variable(variable: impl Into<String>) -> Self {
        Self {
            original: None,
            name: String::new(),
            expression: String::new(),
            display: None,
            params: Vec::new(),
            variable: variable.into(),
        }
    }

    /// A draft pre-filled from an existing function.
    pub fn edit(spec: &FunctionSpec) -> Self {
        let params = spec
            .parameters()
            .into_iter()
            .zip(spec.aligned_labels())
            .map(|(identifier, label)| ParamRow { identifier, label })
            .collect();
        Self {
            original: Some(spec.name.clone()),
            name: spec.name.clone(),
            expression: spec.expression.clone(),
            display: Some(spec.display_expression.clone()),
            params,
            variable: spec.variable.clone(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn display_expression(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn params(&self) -> &[ParamRow] {
        &self.params
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
    }

    /// Replace the expression and re-derive the parameter rows.
    ///
    /// Rows whose identifier is unchanged keep their label; new or moved
    /// identifiers start labelled with themselves.
    pub fn set_expression(&mut self, expression: &str) {
        let expression = expression.trim();
        let derived = self.display_is_derived();
        self.expression = expression.to_string();

        if expression.is_empty() {
            self.display = None;
            self.params.clear();
            return;
        }

        let identifiers = extract_parameters_excluding(expression, &self.variable);
        self.params.truncate(identifiers.len());
        for (i, identifier) in identifiers.into_iter().enumerate() {
            match self.params.get_mut(i) {
                Some(row) if row.identifier == identifier => {}
                Some(row) => {
                    row.label = identifier.clone();
                    row.identifier = identifier;
                }
                None => self.params.push(ParamRow {
                    label: identifier.clone(),
                    identifier,
                }),
            }
        }

        if derived {
            self.display = Some(self.generated_display());
        }
        debug!(params = self.params.len(), "function expression changed");
    }

    /// Relabel one parameter. Returns `false` if there is no such row.
    pub fn set_param_label(&mut self, index: usize, label: impl Into<String>) -> bool {
        let derived = self.display_is_derived();
        let Some(row) = self.params.get_mut(index) else {
            return false;
        };
        row.label = label.into();
        if derived {
            self.display = Some(self.generated_display());
        }
        true
    }

    /// Overwrite the display expression by hand.
    pub fn set_display_expression(&mut self, display: impl Into<String>) {
        let display = display.into();
        self.display = (!display.is_empty()).then_some(display);
    }

    fn generated_display(&self) -> String {
        let identifiers: Vec<&str> = self.params.iter().map(|r| r.identifier.as_str()).collect();
        let labels: Vec<&str> = self.params.iter().map(|r| r.label.as_str()).collect();
        substitute_labels_excluding(&self.expression, &identifiers, &labels, &self.variable)
    }

    fn display_is_derived(&self) -> bool {
        match &self.display {
            None => true,
            Some(display) => *display == self.expression || *display == self.generated_display(),
        }
    }

    /// Validate the draft and store it in `table`.
    ///
    /// A renamed function replaces its old entry.
    pub fn commit(&self, table: &mut FunctionTable) -> Result<FunctionSpec, FunctionError> {
        if self.name.is_empty() {
            return Err(FunctionError::EmptyName);
        }
        if !is_identifier(&self.name) {
            return Err(FunctionError::InvalidName {
                name: self.name.clone(),
            });
        }
        let renamed = self.original.as_deref() != Some(self.name.as_str());
        if renamed && table.contains(&self.name) {
            return Err(FunctionError::DuplicateName {
                name: self.name.clone(),
            });
        }

        let spec = FunctionSpec::new(self.name.clone(), self.expression.clone())
            .with_variable(table.variable())
            .with_display(
                self.display
                    .clone()
                    .unwrap_or_else(|| self.expression.clone()),
            )
            .with_labels(self.params.iter().map(|r| r.label.clone()));

        if let Some(original) = self.original.as_deref().filter(|_| renamed) {
            let _ = table.remove(original);
        }
        table.upsert(spec.clone());
        debug!(name = %spec.name, "function committed");
        Ok(spec)
    }
}
