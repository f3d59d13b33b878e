//! Extraction of the engine inputs from the settings tree
//!
//! The computation engine takes four positional arguments: the data
//! description, the plot settings, the fit-function handles and the fit
//! settings. The maps built here use the engine's key names; unset settings
//! become null unless the engine expects a concrete default.

use crate::config::CsvSettings;
use crate::functions::FunctionTable;
use crate::persistence::ProjectHeader;
use crate::tree::{Group, NodeId, Role, SettingsTree};
use crate::value::{Value, ValueCell};
use std::collections::BTreeMap;
use std::f64::consts::E;

/// Glyph code of a marker style; unknown styles draw circles.
pub fn marker_glyph(style: &str) -> &'static str {
    match style {
        "point" => ".",
        "triangle_down" => "v",
        "triangle_up" => "^",
        "triangle_left" => "<",
        "triangle_right" => ">",
        "octagon" => "8",
        "square" => "s",
        "pentagon" => "p",
        "plus" => "P",
        "star" => "*",
        "hexagon" => "h",
        "X" => "X",
        "diamond" => "D",
        _ => "o",
    }
}

/// Engine code of a fit plot-area choice.
pub fn plot_area_code(choice: &str) -> &'static str {
    match choice {
        "Fit-Area" => "fit",
        "X-Interceptions" => "cross",
        _ => "",
    }
}

/// Fit functions to hand to the engine, by name.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionHandles {
    /// One function for every fit.
    Single(Option<String>),
    /// One function per fit instance.
    List(Vec<Option<String>>),
}

/// The four engine arguments, ready for marshaling.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub data: ValueCell,
    pub plot: ValueCell,
    pub functions: FunctionHandles,
    pub fit: ValueCell,
}

/// Build all four engine arguments.
pub fn build_payload(
    tree: &SettingsTree,
    data: &ProjectHeader,
    csv: &CsvSettings,
    functions: &FunctionTable,
) -> Payload {
    Payload {
        data: data_infos(data, csv),
        plot: plot_settings(tree),
        functions: fit_function_handles(tree),
        fit: fit_settings(tree, functions),
    }
}

type Entries = BTreeMap<String, ValueCell>;

fn insert(map: &mut Entries, key: &str, cell: impl Into<ValueCell>) {
    map.insert(key.to_string(), cell.into());
}

fn list(items: Vec<ValueCell>) -> ValueCell {
    ValueCell::Set(Value::Seq(items))
}

fn strings(items: &[String]) -> ValueCell {
    ValueCell::seq(items.iter().cloned())
}

/// `DataInfos`: table path, column lists and CSV settings.
pub fn data_infos(data: &ProjectHeader, csv: &CsvSettings) -> ValueCell {
    let mut map = Entries::new();
    insert(&mut map, "Path", data.table_path.as_str());
    insert(&mut map, "xColumns", strings(&data.x_columns));
    insert(&mut map, "yColumns", strings(&data.y_columns));
    insert(&mut map, "xErrorColumns", strings(&data.x_error_columns));
    insert(&mut map, "yErrorColumns", strings(&data.y_error_columns));
    insert(&mut map, "Seperator", csv.separator.as_str());
    insert(&mut map, "Decimal", csv.decimal.as_str());
    ValueCell::Set(Value::Map(map))
}

fn value_of(tree: &SettingsTree, name: &str) -> ValueCell {
    tree.find(name)
        .map_or(ValueCell::Unspecified, |id| tree.value(id).clone())
}

fn or_default(cell: ValueCell, default: impl Into<ValueCell>) -> ValueCell {
    if cell.is_specified() {
        cell
    } else {
        default.into()
    }
}

fn same(cell: &ValueCell) -> ValueCell {
    cell.clone()
}

fn glyph(cell: &ValueCell) -> ValueCell {
    ValueCell::from(marker_glyph(cell.as_str().unwrap_or_default()))
}

fn area(cell: &ValueCell) -> ValueCell {
    ValueCell::from(plot_area_code(cell.as_str().unwrap_or_default()))
}

/// The group value when set, else the concrete instance values, else null.
fn scalar_or_instances(
    tree: &SettingsTree,
    name: &str,
    convert: fn(&ValueCell) -> ValueCell,
) -> ValueCell {
    let Some(id) = tree.find(name) else {
        return ValueCell::Unspecified;
    };
    let own = tree.value(id);
    if own.is_specified() {
        return convert(own);
    }
    let values: Vec<ValueCell> = tree
        .children(id)
        .iter()
        .map(|&c| tree.value(c))
        .filter(|cell| cell.is_specified())
        .map(convert)
        .collect();
    if values.is_empty() {
        ValueCell::Unspecified
    } else {
        list(values)
    }
}

fn instance_or_template(
    tree: &SettingsTree,
    template: NodeId,
    group: Group,
    index: usize,
) -> NodeId {
    if tree.value(template).is_specified() {
        return template;
    }
    tree.find_child(template, &group.instance_name(index))
        .unwrap_or(template)
}

fn range(tree: &SettingsTree, min: &str, max: &str) -> ValueCell {
    let (min, max) = (value_of(tree, min), value_of(tree, max));
    if min.is_specified() && max.is_specified() {
        ValueCell::pair(min, max)
    } else {
        ValueCell::Unspecified
    }
}

fn zoom_regions(tree: &SettingsTree) -> ValueCell {
    let names = [
        "Zoom X-Minimum",
        "Zoom X-Maximum",
        "Zoom Y-Minimum",
        "Zoom Y-Maximum",
    ];
    let templates: Option<Vec<NodeId>> = names.iter().map(|n| tree.find(n)).collect();
    let Some(templates) = templates else {
        return list(Vec::new());
    };

    let zooms = (1..=tree.zoom_count())
        .map(|index| {
            let [x_min, x_max, y_min, y_max] = [0, 1, 2, 3].map(|i| {
                tree.value(instance_or_template(tree, templates[i], Group::Zooms, index))
                    .clone()
            });
            ValueCell::pair(ValueCell::pair(x_min, x_max), ValueCell::pair(y_min, y_max))
        })
        .collect();
    list(zooms)
}

/// Legend order and labels. Series entries become `Data {index}` the first
/// time their index is seen; blank labels are skipped.
fn legend(tree: &SettingsTree) -> (ValueCell, ValueCell) {
    let mut order = Vec::new();
    let mut labels = Vec::new();
    let mut seen = Vec::new();

    if let Some(category) = tree.role(Role::LegendLabels) {
        for &entry in tree.children(category) {
            let Some(node) = tree.node(entry) else {
                continue;
            };
            let label = node.cell().display_string();
            if label.trim().is_empty() {
                continue;
            }
            let key = match tree.series().iter().position(|s| s == node.name()) {
                Some(index) if !seen.contains(&index) => {
                    seen.push(index);
                    format!("Data {}", index)
                }
                _ => node.name().to_string(),
            };
            order.push(ValueCell::from(key));
            labels.push(ValueCell::from(label));
        }
    }
    (list(order), list(labels))
}

/// Plot settings map.
pub fn plot_settings(tree: &SettingsTree) -> ValueCell {
    let mut map = Entries::new();

    insert(&mut map, "Zoom", zoom_regions(tree));
    let (order, labels) = legend(tree);
    insert(&mut map, "LegendOrder", order);
    insert(&mut map, "LegendLabels", labels);

    let markers: [(&str, &str, fn(&ValueCell) -> ValueCell); 8] = [
        ("mColors", "Marker Color", same),
        ("mSizes", "Marker Size", same),
        ("mStyles", "Marker Style", glyph),
        ("mOrders", "Marker Order", same),
        ("mAlphas", "Marker Alpha", same),
        ("mConnects", "Connect Markers?", same),
        ("ErrWidths", "Error Bars Width", same),
        ("ErrCapsizes", "Error Capsize", same),
    ];
    for (key, name, convert) in markers {
        insert(&mut map, key, scalar_or_instances(tree, name, convert));
    }

    let zoom_axes = [
        ("SciStyleXZoom", "Zoom X-Axis Scientific Notation"),
        ("SciStyleYZoom", "Zoom Y-Axis Scientific Notation"),
        ("MajorTicksPeriodXZoom", "Zoom X Major Ticks Period"),
        ("MajorTicksPeriodYZoom", "Zoom Y Major Ticks Period"),
    ];
    for (key, name) in zoom_axes {
        insert(&mut map, key, scalar_or_instances(tree, name, same));
    }

    insert(&mut map, "xLimit", range(tree, "X-Limit Minimum", "X-Limit Maximum"));
    insert(&mut map, "yLimit", range(tree, "Y-Limit Minimum", "Y-Limit Maximum"));

    insert(&mut map, "ZoomHelpLines", or_default(value_of(tree, "Help lines for zooms?"), true));
    insert(&mut map, "Projection", or_default(value_of(tree, "Projection"), false));
    insert(
        &mut map,
        "LogScaleBaseX",
        or_default(value_of(tree, "Base of X-Axis Logarithmic Scale"), E),
    );
    insert(
        &mut map,
        "LogScaleBaseY",
        or_default(value_of(tree, "Base of Y-Axis Logarithmic Scale"), E),
    );

    let plain = [
        ("LabelX", "X-Label"),
        ("LabelY", "Y-Label"),
        ("LabelSize", "Labelsize"),
        ("FigWidth", "Figure Width"),
        ("FigHeight", "Figure Height"),
        ("LegendRelX", "Legend relative X-Position"),
        ("LegendRelY", "Legend relative Y-Position"),
        ("LegendFontsize", "Legend Fontsize"),
        ("LegendHandlelength", "Legend Handlelength"),
        ("LegendMarkerscale", "Legend Markerscale"),
        ("LogScaleX", "X-Axis Logarithmic Scale?"),
        ("LogScaleY", "Y-Axis Logarithmic Scale?"),
        ("SciStyleX", "X-Axis Scientific Notation"),
        ("SciStyleY", "Y-Axis Scientific Notation"),
        ("TickLabelSize", "Size of Tick Labels"),
        ("TickDirection", "Tick Direction"),
        ("MajorTickLength", "Major Tick Length"),
        ("MajorTickWidth", "Major Tick Width"),
        ("MajorTicksPeriodX", "X Major Ticks Period"),
        ("MajorTicksPeriodY", "Y Major Ticks Period"),
        ("MinorTicksX", "X Minor Ticks"),
        ("MinorTicksY", "Y Minor Ticks"),
        ("MinorTicksPeriodX", "X Minor Ticks Period"),
        ("MinorTicksPeriodY", "Y Minor Ticks Period"),
        ("MinorTickLength", "Minor Tick Length"),
        ("MinorTickWidth", "Minor Tick Width"),
    ];
    for (key, name) in plain {
        insert(&mut map, key, value_of(tree, name));
    }

    for key in [
        "RemoveMajorXTicks",
        "RemoveMajorYTicks",
        "RemoveMinorXTicks",
        "RemoveMinorYTicks",
    ] {
        insert(&mut map, key, list(Vec::new()));
    }

    ValueCell::Set(Value::Map(map))
}

/// Function handles: one when the fit count is 1 or the group selector is
/// set, else one per fit.
pub fn fit_function_handles(tree: &SettingsTree) -> FunctionHandles {
    let count = tree.fit_count();
    let Some(selector) = tree.role(Role::FitFunction) else {
        return FunctionHandles::List(Vec::new());
    };
    let name_of = |id: NodeId| tree.value(id).as_str().map(str::to_string);

    if count == 1 || tree.value(selector).is_specified() {
        return FunctionHandles::Single(name_of(selector));
    }
    FunctionHandles::List(
        (1..=count)
            .map(|i| {
                tree.find_child(selector, &Group::Fits.instance_name(i))
                    .and_then(name_of)
            })
            .collect(),
    )
}

struct Fits<'a> {
    tree: &'a SettingsTree,
    count: usize,
}

impl Fits<'_> {
    fn node(&self, name: &str, index: usize) -> Option<NodeId> {
        let template = self.tree.find(name)?;
        Some(instance_or_template(self.tree, template, Group::Fits, index))
    }

    fn cell(&self, name: &str, index: usize) -> ValueCell {
        self.node(name, index)
            .map_or(ValueCell::Unspecified, |id| self.tree.value(id).clone())
    }

    /// Scalar when the group node is set, else one entry per fit with
    /// `default` standing in for unset instances. A single fit has no
    /// instances, so an unset group node gives null.
    fn field(
        &self,
        name: &str,
        default: impl Fn(usize) -> ValueCell,
        convert: impl Fn(&ValueCell) -> ValueCell,
    ) -> ValueCell {
        let group = value_of(self.tree, name);
        if group.is_specified() {
            return convert(&group);
        }
        if self.count <= 1 {
            return ValueCell::Unspecified;
        }
        list(
            (1..=self.count)
                .map(|i| {
                    let cell = self.cell(name, i);
                    if cell.is_specified() {
                        convert(&cell)
                    } else {
                        default(i)
                    }
                })
                .collect(),
        )
    }

    /// One `(min, max)` pair per fit; unset sides are null.
    fn pairs(&self, min: &str, max: &str, convert: fn(&ValueCell) -> ValueCell) -> ValueCell {
        if self.count == 0 {
            return ValueCell::Unspecified;
        }
        list(
            (1..=self.count)
                .map(|i| {
                    let lo = self.cell(min, i);
                    let hi = self.cell(max, i);
                    let side = |c: ValueCell| if c.is_specified() { convert(&c) } else { c };
                    ValueCell::pair(side(lo), side(hi))
                })
                .collect(),
        )
    }

    fn parameter_values(&self, role: Role, default: f64) -> Vec<Vec<ValueCell>> {
        (1..=self.count)
            .map(|i| {
                self.tree
                    .parameter_container(role, i)
                    .map(|c| {
                        self.tree
                            .children(c)
                            .iter()
                            .map(|&leaf| {
                                ValueCell::from(self.tree.value(leaf).as_f64().unwrap_or(default))
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Fit settings map.
pub fn fit_settings(tree: &SettingsTree, functions: &FunctionTable) -> ValueCell {
    let fits = Fits {
        tree,
        count: tree.fit_count(),
    };
    let mut map = Entries::new();

    let latex_funcs = functions
        .iter()
        .map(|f| (f.name.clone(), ValueCell::from(f.display_expression.as_str())));
    insert(&mut map, "LatexFuncs", ValueCell::map(latex_funcs));
    let latex_params = functions
        .iter()
        .map(|f| (f.name.clone(), strings(&f.aligned_labels())));
    insert(&mut map, "LatexParams", ValueCell::map(latex_params));

    let start = fits.parameter_values(Role::StartValues, 1.0);
    let start = if start.is_empty() {
        ValueCell::Unspecified
    } else {
        list(start.into_iter().map(list).collect())
    };
    insert(&mut map, "sParams", start);

    let mins = fits.parameter_values(Role::BoundsMin, f64::NEG_INFINITY);
    let maxs = fits.parameter_values(Role::BoundsMax, f64::INFINITY);
    let bounds = if mins.is_empty() {
        ValueCell::Unspecified
    } else {
        list(
            mins.into_iter()
                .zip(maxs)
                .map(|(lo, hi)| ValueCell::seq([list(lo), list(hi)]))
                .collect(),
        )
    };
    insert(&mut map, "Bounds", bounds);

    let series = tree.series();
    let data_index = |cell: &ValueCell| {
        let index = cell
            .as_str()
            .and_then(|name| series.iter().position(|s| s == name))
            .map_or(-1, |i| i as i64);
        ValueCell::from(index)
    };
    insert(&mut map, "DataNo", fits.field("Fitted Data", |_| 0i64.into(), data_index));

    insert(&mut map, "Area", fits.pairs("Fit X-Minimum", "Fit X-Maximum", same));
    insert(
        &mut map,
        "ExArea",
        fits.pairs("Fit excluded area X-Minimum", "Fit excluded area X-Maximum", same),
    );
    let plot_areas = fits.pairs("Fit Plot X-Minimum", "Fit Plot X-Maximum", area);
    insert(&mut map, "pArea", plot_areas);

    insert(&mut map, "Color", fits.field("Fit Color", |_| "blue".into(), same));
    insert(
        &mut map,
        "Name",
        fits.field("Fit Name", |i| Group::Fits.instance_name(i).into(), same),
    );
    insert(&mut map, "Line", fits.field("Fit Line", |_| "solid".into(), same));
    insert(&mut map, "pRes", fits.field("Print Residuals?", |_| false.into(), same));
    insert(&mut map, "Method", fits.field("Fit Method", |_| "lm".into(), same));
    insert(
        &mut map,
        "LogFit",
        fits.field("Use Logarithmus on Fit and Data?", |_| false.into(), same),
    );
    insert(&mut map, "LogBase", fits.field("Fit Logarithmic Base", |_| E.into(), same));
    insert(&mut map, "Loss", fits.field("Fit Loss-Function", |_| "linear".into(), same));
    insert(&mut map, "LossScale", fits.field("Fit Loss-Scale", |_| 1.0.into(), same));
    insert(&mut map, "FitLinewidth", fits.field("Fit Linewidth", |_| 3.0.into(), same));
    insert(&mut map, "FitOrder", fits.field("Fit Order", |_| 3i64.into(), same));
    insert(
        &mut map,
        "FitOrdersZoom",
        fits.field("Fit Order of Zoom", |_| 3i64.into(), same),
    );

    insert(&mut map, "NumFits", fits.count);
    for key in ["ExEr", "odrType", "CV"] {
        insert(&mut map, key, ValueCell::none());
    }

    ValueCell::Set(Value::Map(map))
}
