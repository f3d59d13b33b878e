//! Static schema of the fit and plot grids

use super::arena::SettingsTree;
use super::node::{Group, NodeId, NodeTemplate, Role};
use crate::value::ValueCell;

pub const COLORS: [&str; 15] = [
    "black", "blue", "green", "red", "purple", "brown", "pink", "gray", "olive", "yellow", "cyan",
    "magenta", "darkblue", "yellowgreen", "darkcyan",
];

pub const MARKER_STYLES: [&str; 14] = [
    "circle", "point", "triangle_down", "triangle_up", "triangle_left", "triangle_right",
    "octagon", "square", "pentagon", "plus", "star", "hexagon", "X", "diamond",
];

pub const LINE_STYLES: [&str; 6] = [
    "solid", "dotted", "dashed", "dashdot", "dashdotdot", "densely dashed",
];

pub const FIT_METHODS: [&str; 4] = ["odr", "lm", "trf", "dogbox"];

pub const LOSS_FUNCTIONS: [&str; 5] = ["linear", "soft_l1", "huber", "cauchy", "arctan"];

pub const PLOT_AREAS: [&str; 3] = ["Fit-Area", "X-Interceptions", ""];

pub const TICK_DIRECTIONS: [&str; 2] = ["out", "in"];

/// Synthetic legend entries present while at least one fit exists.
pub const UNDERGROUND: &str = "Underground";
pub const MEAN_LINE: &str = "MeanLine";

pub const LEGEND_LABELS: &str = "Legend Labels";

struct Builder<'a> {
    tree: &'a mut SettingsTree,
    parent: NodeId,
}

impl Builder<'_> {
    fn add(&mut self, name: &str, template: NodeTemplate) -> NodeId {
        let group = template.group;
        let id = self.tree.add_node(self.parent, name, template, None);
        if let Some(group) = group {
            self.tree.templates.entry(group).or_default().push(id);
        }
        id
    }

    fn role(&mut self, name: &str, template: NodeTemplate, role: Role) -> NodeId {
        let id = self.add(name, template);
        if let Some(node) = self.tree.node_mut(id) {
            node.role = Some(role);
        }
        self.tree.roles.insert(role, id);
        id
    }

    fn category(&mut self, name: &str, role: Option<Role>) -> Builder<'_> {
        let parent = match role {
            Some(role) => self.role(name, NodeTemplate::category(), role),
            None => self.add(name, NodeTemplate::category()),
        };
        Builder {
            tree: &mut *self.tree,
            parent,
        }
    }
}

pub(crate) fn build(tree: &mut SettingsTree) {
    let fit_root = tree.fit_root;
    let plot_root = tree.plot_root;
    build_fit_grid(&mut Builder {
        tree: &mut *tree,
        parent: fit_root,
    });
    build_plot_grid(&mut Builder {
        tree: &mut *tree,
        parent: plot_root,
    });

    for role in [Role::FitCount, Role::ZoomCount] {
        if let Some(id) = tree.role(role) {
            tree.assign(id, ValueCell::from(0i64));
        }
    }
    tree.set_function_choices(&[]);
    tree.apply_group_visibility(Group::Fits);
    tree.apply_group_visibility(Group::Zooms);
}

fn build_fit_grid(b: &mut Builder<'_>) {
    let fits = Group::Fits;
    b.role(
        "Amount of Fits",
        NodeTemplate::count_driver(fits).help("Number of fits to perform."),
        Role::FitCount,
    );
    b.role(
        "Fitfunction",
        NodeTemplate::choice(Vec::<String>::new()).per(fits),
        Role::FitFunction,
    );
    b.role("Fit Starting Values", NodeTemplate::composed(), Role::StartValues);
    b.role(
        "Fitted Data",
        NodeTemplate::choice(Vec::<String>::new())
            .per(fits)
            .help("Data series the fit is performed on."),
        Role::FittedData,
    );
    b.add("Fit X-Minimum", NodeTemplate::float().per(fits));
    b.add("Fit X-Maximum", NodeTemplate::float().per(fits));
    b.add("Fit Color", NodeTemplate::choice(COLORS).hint("blue").per(fits));
    b.add("Fit Name", NodeTemplate::text().per(fits).help("Name shown in the legend."));
    b.add("Fit excluded area X-Minimum", NodeTemplate::float().per(fits));
    b.add("Fit excluded area X-Maximum", NodeTemplate::float().per(fits));
    b.add("Fit Plot X-Minimum", NodeTemplate::choice(PLOT_AREAS).per(fits));
    b.add("Fit Plot X-Maximum", NodeTemplate::choice(PLOT_AREAS).per(fits));
    b.add("Fit Line", NodeTemplate::choice(LINE_STYLES).hint("solid").per(fits));
    b.add("Print Residuals?", NodeTemplate::boolean().hint("False").per(fits));
    b.role("Fit Bounds Minimum", NodeTemplate::composed(), Role::BoundsMin);
    b.role("Fit Bounds Maximum", NodeTemplate::composed(), Role::BoundsMax);
    b.role(
        "Fit Method",
        NodeTemplate::choice(FIT_METHODS)
            .hint("lm")
            .per(fits)
            .help("Bounded fits always use trf."),
        Role::FitMethod,
    );
    b.add("Use Logarithmus on Fit and Data?", NodeTemplate::boolean().hint("False").per(fits));
    b.add("Fit Logarithmic Base", NodeTemplate::float().min(0.0).hint("e").per(fits));
    b.add("Fit Loss-Function", NodeTemplate::choice(LOSS_FUNCTIONS).hint("linear").per(fits));
    b.add("Fit Loss-Scale", NodeTemplate::float().min(0.0).hint("1.0").per(fits));
    b.add("Fit Linewidth", NodeTemplate::float().min(0.0).hint("3.0").per(fits));
    b.add("Fit Order", NodeTemplate::int().hint("3").per(fits));
    b.add("Fit Order of Zoom", NodeTemplate::int().hint("3").per(fits));
}

fn build_plot_grid(b: &mut Builder<'_>) {
    {
        let mut general = b.category("General", None);
        general.add("Figure Width", NodeTemplate::float().min(0.0).hint("9.5"));
        general.add("Figure Height", NodeTemplate::float().min(0.0).hint("4.0"));
        general.add(
            "Projection",
            NodeTemplate::boolean()
                .hint("False")
                .help("Shrink the figure so that it fits a projector."),
        );
    }
    {
        let mut legend = b.category("Legend", Some(Role::LegendCategory));
        let unit = || NodeTemplate::float().min(0.0).max(1.0);
        legend.add("Legend relative X-Position", unit().hint("0.8"));
        legend.add("Legend relative Y-Position", unit().hint("0.8"));
        legend.add("Legend Fontsize", NodeTemplate::float().min(0.0).hint("20"));
        legend.add("Legend Handlelength", NodeTemplate::float().min(0.0).hint("3"));
        legend.add("Legend Markerscale", NodeTemplate::float().min(0.0).hint("2.0"));
    }
    {
        let zooms = Group::Zooms;
        let mut zoom = b.category("Zoom", Some(Role::ZoomCategory));
        zoom.role(
            "Amount of Zooms",
            NodeTemplate::count_driver(zooms),
            Role::ZoomCount,
        );
        for axis in ["X", "Y"] {
            zoom.add(&format!("Zoom {}-Minimum", axis), NodeTemplate::float().per(zooms));
            zoom.add(&format!("Zoom {}-Maximum", axis), NodeTemplate::float().per(zooms));
        }
        for axis in ["X", "Y"] {
            zoom.add(
                &format!("Zoom {}-Axis Scientific Notation", axis),
                NodeTemplate::int().per(zooms),
            );
        }
        for axis in ["X", "Y"] {
            zoom.add(
                &format!("Zoom {} Major Ticks Period", axis),
                NodeTemplate::float().min(0.0).per(zooms),
            );
        }
        zoom.role(
            "Help lines for zooms?",
            NodeTemplate::boolean().hint("True"),
            Role::ZoomHelpLines,
        );
    }
    {
        let series = Group::Series;
        let mut markers = b.category("Markers", Some(Role::MarkersCategory));
        markers.add("Marker Color", NodeTemplate::choice(COLORS).hint("black").per(series));
        markers.add("Marker Size", NodeTemplate::float().min(0.0).hint("20").per(series));
        markers.add(
            "Marker Style",
            NodeTemplate::choice(MARKER_STYLES).hint("circle").per(series),
        );
        markers.add("Marker Order", NodeTemplate::int().hint("2").per(series));
        markers.add(
            "Marker Alpha",
            NodeTemplate::float().min(0.0).max(1.0).hint("1").per(series),
        );
        markers.add("Connect Markers?", NodeTemplate::boolean().hint("False").per(series));
        markers.add("Error Bars Width", NodeTemplate::float().min(0.0).hint("2").per(series));
        markers.add("Error Capsize", NodeTemplate::float().min(0.0).hint("3").per(series));
    }
    {
        let mut axis = b.category("Axis", None);
        axis.add("X-Label", NodeTemplate::text());
        axis.add("Y-Label", NodeTemplate::text());
        axis.add("Labelsize", NodeTemplate::float().min(0.0).hint("30"));
        for name in [
            "X-Limit Minimum",
            "X-Limit Maximum",
            "Y-Limit Minimum",
            "Y-Limit Maximum",
        ] {
            axis.add(name, NodeTemplate::float());
        }
        axis.add("X-Axis Logarithmic Scale?", NodeTemplate::boolean().hint("False"));
        axis.add("Y-Axis Logarithmic Scale?", NodeTemplate::boolean().hint("False"));
        axis.add("Base of X-Axis Logarithmic Scale", NodeTemplate::float().min(0.0).hint("e"));
        axis.add("Base of Y-Axis Logarithmic Scale", NodeTemplate::float().min(0.0).hint("e"));
        axis.add("X-Axis Scientific Notation", NodeTemplate::int());
        axis.add("Y-Axis Scientific Notation", NodeTemplate::int());
        axis.add("Size of Tick Labels", NodeTemplate::float().min(0.0).hint("20"));
        axis.add("Tick Direction", NodeTemplate::choice(TICK_DIRECTIONS).hint("out"));
        axis.add("Major Tick Length", NodeTemplate::float().min(0.0).hint("10"));
        axis.add("Major Tick Width", NodeTemplate::float().min(0.0).hint("2.5"));
        axis.add("X Major Ticks Period", NodeTemplate::float().min(0.0));
        axis.add("Y Major Ticks Period", NodeTemplate::float().min(0.0));
        axis.add("X Minor Ticks", NodeTemplate::boolean().hint("False"));
        axis.add("Y Minor Ticks", NodeTemplate::boolean().hint("False"));
        axis.add("X Minor Ticks Period", NodeTemplate::float().min(0.0));
        axis.add("Y Minor Ticks Period", NodeTemplate::float().min(0.0));
        axis.add("Minor Tick Length", NodeTemplate::float().min(0.0).hint("5"));
        axis.add("Minor Tick Width", NodeTemplate::float().min(0.0).hint("1.5"));
    }
}
