//! Settings nodes and the templates they are instantiated from

use crate::value::{ValueCell, ValueType};
use serde::{Deserialize, Serialize};

/// Generational handle to a node in a [`SettingsTree`](super::SettingsTree) arena.
///
/// Slots are reused after removal; a handle whose generation no longer
/// matches its slot stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A value-bearing property. May own numbered instance children.
    Leaf,
    /// A heading. Holds no value.
    Category,
    /// A per-function parameter container. Its value is the composed sentinel.
    ComposedGroup,
    /// An integer leaf that controls how many group instances exist.
    CountDriver,
}

/// A family of nodes instantiated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    /// Fit instances, driven by "Amount of Fits".
    Fits,
    /// Zoom regions, driven by "Amount of Zooms".
    Zooms,
    /// Marker settings, one instance per plotted data series.
    Series,
}

impl Group {
    /// Name prefix of numbered instances. Series instances are named after the series.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Group::Fits => Some("Fit "),
            Group::Zooms => Some("Zoom "),
            Group::Series => None,
        }
    }

    /// Name of the numbered instance `index` (1-based).
    pub fn instance_name(self, index: usize) -> String {
        format!("{}{}", self.prefix().unwrap_or_default(), index)
    }

    /// Parse the 1-based index back out of an instance name.
    pub fn instance_index(self, name: &str) -> Option<usize> {
        name.strip_prefix(self.prefix()?)?.parse().ok()
    }
}

/// Nodes the reconciliation rules refer to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    FitCount,
    FitFunction,
    StartValues,
    FittedData,
    BoundsMin,
    BoundsMax,
    FitMethod,
    ZoomCount,
    ZoomHelpLines,
    ZoomCategory,
    MarkersCategory,
    LegendCategory,
    LegendLabels,
}

/// The prototype shape of a node: type, validators, choices and hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    pub kind: NodeKind,
    pub value_type: ValueType,
    pub choices: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub hint: Option<String>,
    pub help: Option<String>,
    /// Set when the node is a template instantiated once per group member.
    pub group: Option<Group>,
}

impl NodeTemplate {
    fn base(kind: NodeKind, value_type: ValueType) -> Self {
        Self {
            kind,
            value_type,
            choices: Vec::new(),
            min: None,
            max: None,
            hint: None,
            help: None,
            group: None,
        }
    }

    pub fn category() -> Self {
        Self::base(NodeKind::Category, ValueType::Text)
    }

    pub fn boolean() -> Self {
        Self::base(NodeKind::Leaf, ValueType::Bool)
    }

    pub fn int() -> Self {
        Self::base(NodeKind::Leaf, ValueType::Int)
    }

    pub fn float() -> Self {
        Self::base(NodeKind::Leaf, ValueType::Float)
    }

    pub fn text() -> Self {
        Self::base(NodeKind::Leaf, ValueType::Text)
    }

    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut template = Self::base(NodeKind::Leaf, ValueType::Choice);
        template.choices = choices.into_iter().map(Into::into).collect();
        template
    }

    pub fn composed() -> Self {
        Self::base(NodeKind::ComposedGroup, ValueType::Text)
    }

    /// An integer driver for `group`, never negative.
    pub fn count_driver(group: Group) -> Self {
        let mut template = Self::base(NodeKind::CountDriver, ValueType::Int);
        template.min = Some(0.0);
        template.group = Some(group);
        template
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn per(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Factory for group instances of this template.
    ///
    /// Instances keep type, validators, choices and hint but are never
    /// templates themselves. Categories and count drivers are not cloned.
    pub fn instantiate(&self) -> Option<NodeTemplate> {
        match self.kind {
            NodeKind::Leaf | NodeKind::ComposedGroup => Some(NodeTemplate {
                group: None,
                ..self.clone()
            }),
            NodeKind::Category | NodeKind::CountDriver => None,
        }
    }

    /// Coerce a candidate cell to what this template accepts.
    ///
    /// Anything that does not fit becomes `Unspecified`. Composed containers
    /// are handled by the tree, which owns the sentinel text.
    pub fn coerce(&self, cell: ValueCell) -> ValueCell {
        use crate::value::Value;

        let value = match cell {
            ValueCell::Unspecified => return ValueCell::Unspecified,
            ValueCell::Set(v) => v,
        };
        if self.kind == NodeKind::Category {
            return ValueCell::Unspecified;
        }

        let coerced = match (self.value_type, value) {
            (ty, Value::Text(s)) if ty != ValueType::Text && ty != ValueType::Choice => {
                ValueCell::parse(ty, &s)
            }
            (ValueType::Bool, Value::Bool(b)) => ValueCell::from(b),
            (ValueType::Int, Value::Int(i)) => ValueCell::from(i),
            (ValueType::Int, Value::Float(f)) if f.fract() == 0.0 && f.is_finite() => {
                ValueCell::from(f as i64)
            }
            (ValueType::Float, Value::Float(f)) if !f.is_nan() => ValueCell::from(f),
            (ValueType::Float, Value::Int(i)) => ValueCell::from(i as f64),
            (ValueType::Text, Value::Text(s)) => ValueCell::parse(ValueType::Text, &s),
            (ValueType::Text, v @ (Value::Bool(_) | Value::Int(_) | Value::Float(_))) => {
                ValueCell::text(v.to_string())
            }
            (ValueType::Choice, Value::Text(s)) => ValueCell::parse(ValueType::Choice, &s),
            _ => ValueCell::Unspecified,
        };

        self.validate(coerced)
    }

    fn validate(&self, cell: ValueCell) -> ValueCell {
        if let Some(x) = cell.as_f64() {
            if self.min.is_some_and(|min| x < min) || self.max.is_some_and(|max| x > max) {
                return ValueCell::Unspecified;
            }
        }
        // Stored one value per line
        if cell.as_str().is_some_and(|s| s.contains(['\n', '\r'])) {
            return ValueCell::Unspecified;
        }
        if self.value_type == ValueType::Choice {
            if let Some(s) = cell.as_str() {
                if !self.choices.iter().any(|c| c == s) {
                    return ValueCell::Unspecified;
                }
            }
        }
        cell
    }
}

/// A node of the settings tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsNode {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cell: ValueCell,
    pub(crate) template: NodeTemplate,
    pub(crate) role: Option<Role>,
    pub(crate) hidden: bool,
    pub(crate) enabled: bool,
}

impl SettingsNode {
    pub(crate) fn new(name: impl Into<String>, template: NodeTemplate) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            parent: None,
            children: Vec::new(),
            cell: ValueCell::Unspecified,
            template,
            role: None,
            hidden: false,
            enabled: true,
        }
    }

    /// Stable key used for lookups.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// User-facing label; also the persistence key.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn cell(&self) -> &ValueCell {
        &self.cell
    }

    pub fn kind(&self) -> NodeKind {
        self.template.kind
    }

    pub fn template(&self) -> &NodeTemplate {
        &self.template
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
