//! Function specs, the function table and its file formats

use super::FunctionError;
use crate::error::Result;
use crate::expression::{extract_parameters_excluding, INDEPENDENT_VARIABLE};
use crate::tree::ParameterSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A named fit function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    /// Source expression over [`variable`](Self::variable), e.g. `A*x+B`.
    pub expression: String,
    /// Display form, usually LaTeX.
    pub display_expression: String,
    /// Display label per parameter, aligned with [`parameters`](Self::parameters).
    pub labels: Vec<String>,
    /// Identifier the expression is a function of.
    #[serde(default = "default_variable")]
    pub variable: String,
}

fn default_variable() -> String {
    INDEPENDENT_VARIABLE.to_string()
}

impl FunctionSpec {
    /// Create a spec whose display form and labels default to the raw text.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitgrid::functions::FunctionSpec;
    ///
    /// let spec = FunctionSpec::new("Linear", "A*x+B");
    /// assert_eq!(spec.parameters(), vec!["A", "B"]);
    /// assert_eq!(spec.labels, vec!["A", "B"]);
    /// ```
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let labels = extract_parameters_excluding(&expression, INDEPENDENT_VARIABLE);
        Self {
            name: name.into(),
            display_expression: expression.clone(),
            expression,
            labels,
            variable: default_variable(),
        }
    }

    /// Treat `variable` as the independent variable. Labels still equal to
    /// the old parameter list are re-derived.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        let variable = variable.into();
        if variable == self.variable {
            return self;
        }
        let derived = self.labels == self.parameters();
        self.variable = variable;
        if derived {
            self.labels = self.parameters();
        }
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_expression = display.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Free parameters of the expression, in first-appearance order.
    pub fn parameters(&self) -> Vec<String> {
        extract_parameters_excluding(&self.expression, &self.variable)
    }

    /// Labels padded or cut to the parameter count; missing labels fall back
    /// to the parameter identifier.
    pub fn aligned_labels(&self) -> Vec<String> {
        self.parameters()
            .into_iter()
            .enumerate()
            .map(|(i, param)| self.labels.get(i).cloned().unwrap_or(param))
            .collect()
    }

    /// `def Name(x, A, B): return A*x+B`
    pub fn module_source(&self) -> String {
        let mut args = vec![self.variable.clone()];
        args.extend(self.parameters());
        format!("def {}({}): return {}", self.name, args.join(", "), self.expression)
    }
}

/// Function specs keyed by name, iterated in name order.
///
/// Every stored spec shares the table's independent variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTable {
    specs: BTreeMap<String, FunctionSpec>,
    #[serde(default = "default_variable")]
    variable: String,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self {
            specs: BTreeMap::new(),
            variable: default_variable(),
        }
    }
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Switch the independent variable of the table and every spec in it.
    pub fn set_variable(&mut self, variable: impl Into<String>) {
        let variable = variable.into();
        self.specs = std::mem::take(&mut self.specs)
            .into_iter()
            .map(|(name, spec)| (name, spec.with_variable(&variable)))
            .collect();
        self.variable = variable;
    }

    /// The functions shipped before the user defines any.
    pub fn defaults() -> Self {
        let mut table = Self::new();
        for spec in [
            FunctionSpec::new(
                "GaussCDF",
                "A * 1/2 * (1 + scipy.special.erf(1/numpy.sqrt(2.*SD**2) * (x-EV)))",
            )
            .with_display("\\frac{A}{2} \\left(1 + \\mathrm{erf}\\left(\\frac{x-EV}{\\sqrt{2} SD}\\right)\\right)"),
            FunctionSpec::new(
                "GaussPDF",
                "A / numpy.sqrt(2.*numpy.pi*SD**2) * numpy.exp(-(x-EV)**2/(2.*SD**2))",
            )
            .with_display("\\frac{A}{\\sqrt{2\\pi SD^2}} e^{-\\frac{(x-EV)^2}{2 SD^2}}"),
            FunctionSpec::new("Linear", "A*x+B").with_display("A x + B"),
            FunctionSpec::new("Quadratic", "A*x**2+B*x+C").with_display("A x^2 + B x + C"),
        ] {
            table.specs.insert(spec.name.clone(), spec);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.specs.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.specs.values()
    }

    /// Add a new function; fails if the name is taken.
    pub fn insert(&mut self, spec: FunctionSpec) -> std::result::Result<(), FunctionError> {
        if self.contains(&spec.name) {
            return Err(FunctionError::DuplicateName { name: spec.name });
        }
        self.upsert(spec);
        Ok(())
    }

    /// Add or replace a function.
    pub fn upsert(&mut self, spec: FunctionSpec) {
        let spec = spec.with_variable(&self.variable);
        self.specs.insert(spec.name.clone(), spec);
    }

    /// Remove a function. Whether it is still selected somewhere is the
    /// caller's concern.
    pub fn remove(&mut self, name: &str) -> std::result::Result<FunctionSpec, FunctionError> {
        self.specs
            .remove(name)
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Parse the definitions file: per function its name, expression,
    /// display expression, then one label line per parameter.
    pub fn parse(text: &str) -> std::result::Result<Self, FunctionError> {
        Self::parse_with_variable(text, INDEPENDENT_VARIABLE)
    }

    /// Like [`parse`](Self::parse) for expressions over `variable`.
    pub fn parse_with_variable(
        text: &str,
        variable: &str,
    ) -> std::result::Result<Self, FunctionError> {
        let mut table = Self::new();
        table.variable = variable.to_string();
        let mut lines = text.lines();

        while let Some(name) = lines.next() {
            if name.trim().is_empty() {
                continue;
            }
            let mut field = |what: &str| {
                lines.next().map(str::to_string).ok_or_else(|| FunctionError::Malformed {
                    message: format!("{} missing for '{}'", what, name),
                })
            };
            let expression = field("expression")?;
            let display = field("display expression")?;
            let count = extract_parameters_excluding(&expression, variable).len();
            let labels = (0..count)
                .map(|_| field("parameter label"))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            table.upsert(
                FunctionSpec::new(name, expression)
                    .with_variable(variable)
                    .with_display(display)
                    .with_labels(labels),
            );
        }

        Ok(table)
    }

    /// Render the definitions file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for spec in self.iter().filter(|s| !s.name.is_empty()) {
            out.push_str(&spec.name);
            out.push('\n');
            out.push_str(&spec.expression);
            out.push('\n');
            out.push_str(&spec.display_expression);
            out.push('\n');
            for label in spec.aligned_labels() {
                out.push_str(&label);
                out.push('\n');
            }
        }
        out
    }

    /// Render the module the computation engine imports the functions from.
    pub fn render_module(&self) -> String {
        let mut out = String::from("import numpy\nimport scipy\n");
        for spec in self.iter().filter(|s| !s.name.is_empty()) {
            out.push_str(&spec.module_source());
            out.push('\n');
        }
        out
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    pub fn save_module<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render_module())?;
        Ok(())
    }
}

impl ParameterSource for FunctionTable {
    fn parameters(&self, function: &str) -> Option<Vec<String>> {
        self.get(function).map(FunctionSpec::parameters)
    }
}
