use std::fmt;

use tracing::debug;

use super::category::{DistanceCategory, DistanceFilter};
use super::graph::{Graph, GraphArc, build};
use super::matrix::SimilarityMatrix;
use super::nodes::NodeRegistry;
use super::word_order::{HeadDirectionRates, WordOrderSummary, summarize};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Selected(code) => Some(code),
        }
    }
}

/// Request for the comparison view of two languages, by primary code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    pub from_code: String,
    pub to_code: String,
}

impl NavigationRequest {
    pub fn route(&self) -> String {
        format!("/compare/{}/{}", self.from_code, self.to_code)
    }
}

impl fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from_code, self.to_code)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankEntry {
    pub code: String,
    pub display_name: String,
    pub distance: f64,
    pub similarity: f64,
}

/// Read-only inputs the graph is derived from.
#[derive(Clone, Copy)]
pub struct GraphInputs<'a> {
    pub nodes: &'a NodeRegistry,
    pub matrix: &'a SimilarityMatrix,
}

/// Owns the mutable view state (selection and distance filter) and the graph
/// derived from it. Every mutation rebuilds the graph.
#[derive(Clone, Debug)]
pub struct SelectionController {
    selection: Selection,
    filter: DistanceFilter,
    graph: Graph,
}

impl SelectionController {
    pub fn new(inputs: GraphInputs<'_>) -> Self {
        Self::with_state(inputs, Selection::Unselected, DistanceFilter::default())
    }

    pub fn with_state(inputs: GraphInputs<'_>, selection: Selection, filter: DistanceFilter) -> Self {
        let mut controller = Self {
            selection,
            filter,
            graph: Graph::default(),
        };
        controller.refresh(inputs);
        controller
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_code(&self) -> Option<&str> {
        self.selection.code()
    }

    pub fn filter(&self) -> &DistanceFilter {
        &self.filter
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Selects `code`, or clears the selection when `code` is already selected.
    pub fn click_node(&mut self, code: &str, inputs: GraphInputs<'_>) {
        self.selection = if self.selection.code() == Some(code) {
            Selection::Unselected
        } else {
            Selection::Selected(code.to_owned())
        };
        debug!(selection = ?self.selection, "node clicked");
        self.refresh(inputs);
    }

    pub fn clear(&mut self, inputs: GraphInputs<'_>) {
        if self.selection == Selection::Unselected {
            return;
        }
        self.selection = Selection::Unselected;
        debug!("selection cleared");
        self.refresh(inputs);
    }

    pub fn set_filter(&mut self, category: DistanceCategory, enabled: bool, inputs: GraphInputs<'_>) {
        if self.filter.is_enabled(category) == enabled {
            return;
        }
        self.filter.set(category, enabled);
        debug!(%category, enabled, "distance filter changed");
        self.refresh(inputs);
    }

    pub fn replace_filter(&mut self, filter: DistanceFilter, inputs: GraphInputs<'_>) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.refresh(inputs);
    }

    /// Recomputes the graph, e.g. after the active matrix changed.
    pub fn refresh(&mut self, inputs: GraphInputs<'_>) {
        self.graph = build(inputs.nodes, inputs.matrix, &self.filter, self.selected_code());
    }

    /// Arc activation never touches the selection; clickable arcs resolve to a
    /// navigation request between the two primary languages.
    pub fn activate_arc(&self, arc: &GraphArc, nodes: &NodeRegistry) -> Option<NavigationRequest> {
        if !arc.clickable() {
            return None;
        }

        let request = NavigationRequest {
            from_code: nodes.primary_code(&arc.source_code)?.to_owned(),
            to_code: nodes.primary_code(&arc.target_code)?.to_owned(),
        };
        debug!(route = %request.route(), "arc activated");
        Some(request)
    }

    /// Every other language ordered from most to least similar to the
    /// selection. Variants of the selected language are left out, as are
    /// nodes without a distance.
    pub fn ranking(&self, inputs: GraphInputs<'_>) -> Vec<RankEntry> {
        let Some(selected) = self.selected_code().and_then(|code| inputs.nodes.get(code)) else {
            return Vec::new();
        };
        let Some(selected_name) = inputs.nodes.representative_name(selected) else {
            return Vec::new();
        };

        let mut entries = inputs
            .nodes
            .nodes()
            .iter()
            .filter(|node| node.code != selected.code && !inputs.nodes.same_language(node, selected))
            .filter_map(|node| {
                let name = inputs.nodes.representative_name(node)?;
                if name == selected_name {
                    return None;
                }
                let distance = inputs.matrix.distance(selected_name, name)?;
                Some(RankEntry {
                    code: node.code.clone(),
                    display_name: node.display_name.clone(),
                    distance,
                    similarity: 1.0 - distance,
                })
            })
            .collect::<Vec<_>>();

        entries.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.code.cmp(&b.code))
        });
        entries
    }

    pub fn details(&self, nodes: &NodeRegistry, rates: &HeadDirectionRates) -> Option<WordOrderSummary> {
        summarize(nodes, rates, self.selected_code()?)
    }
}
