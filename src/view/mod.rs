//! View configuration and filtered graph derivations.
//!
//! `GraphConfigStore` owns the current graph result and the mutable view
//! configuration, and derives the visible node/edge subsets without mutating
//! the underlying graph. Derivations are plain methods recomputed on demand;
//! there is no hidden reactivity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{category_color, GraphEdge, GraphNode, GraphStatistics, KnowledgeGraphData};

/// Graph layout algorithm selected in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    #[default]
    Force,
    Circular,
    Hierarchical,
}

/// Mutable view configuration, owned by the view session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    /// Minimum edge similarity shown in the view, in [0, 1]
    pub similarity_threshold: f64,

    /// Node size multiplier, > 0
    pub node_size_factor: f64,

    /// Whether node labels are rendered
    pub show_labels: bool,

    pub layout_type: LayoutType,

    /// Category groups to show; empty means all
    pub selected_categories: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            node_size_factor: 1.0,
            show_labels: true,
            layout_type: LayoutType::Force,
            selected_categories: Vec::new(),
        }
    }
}

/// Partial configuration change; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct GraphConfigUpdate {
    pub similarity_threshold: Option<f64>,
    pub node_size_factor: Option<f64>,
    pub show_labels: Option<bool>,
    pub layout_type: Option<LayoutType>,
    pub selected_categories: Option<Vec<String>>,
}

/// One legend row: a category group with its node count and color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLegend {
    pub name: String,
    pub count: usize,
    pub color: String,
}

/// Holds the current graph result and view configuration.
#[derive(Debug, Default)]
pub struct GraphConfigStore {
    graph: Option<KnowledgeGraphData>,
    current_date: String,
    config: GraphConfig,
}

impl GraphConfigStore {
    /// Create a store with the default configuration and no graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The date of the stored graph, empty when no graph is loaded.
    pub fn current_date(&self) -> &str {
        &self.current_date
    }

    /// The stored graph, if any.
    pub fn graph(&self) -> Option<&KnowledgeGraphData> {
        self.graph.as_ref()
    }

    /// Statistics of the stored graph, if any.
    pub fn statistics(&self) -> Option<&GraphStatistics> {
        self.graph.as_ref().map(|g| &g.statistics)
    }

    /// All nodes of the stored graph (unfiltered).
    pub fn nodes(&self) -> &[GraphNode] {
        self.graph.as_ref().map(|g| g.nodes.as_slice()).unwrap_or(&[])
    }

    /// All edges of the stored graph (unfiltered).
    pub fn edges(&self) -> &[GraphEdge] {
        self.graph.as_ref().map(|g| g.edges.as_slice()).unwrap_or(&[])
    }

    /// Replace the stored graph and track its date.
    pub fn set_graph_data(&mut self, data: KnowledgeGraphData) {
        self.current_date = data.date.clone();
        self.graph = Some(data);
    }

    /// Drop the stored graph.
    pub fn clear_graph(&mut self) {
        self.graph = None;
        self.current_date.clear();
    }

    /// Shallow-merge a partial update into the configuration.
    pub fn update_config(&mut self, update: GraphConfigUpdate) {
        if let Some(threshold) = update.similarity_threshold {
            self.config.similarity_threshold = threshold;
        }
        if let Some(factor) = update.node_size_factor {
            self.config.node_size_factor = factor;
        }
        if let Some(show_labels) = update.show_labels {
            self.config.show_labels = show_labels;
        }
        if let Some(layout) = update.layout_type {
            self.config.layout_type = layout;
        }
        if let Some(categories) = update.selected_categories {
            self.config.selected_categories = categories;
        }
    }

    /// Restore the fixed default configuration.
    pub fn reset_config(&mut self) {
        self.config = GraphConfig::default();
    }

    /// Nodes visible under the current category selection.
    ///
    /// An empty selection shows everything.
    pub fn filtered_nodes(&self) -> Vec<&GraphNode> {
        let nodes = self.nodes();
        if self.config.selected_categories.is_empty() {
            return nodes.iter().collect();
        }
        nodes
            .iter()
            .filter(|node| self.config.selected_categories.contains(&node.group))
            .collect()
    }

    /// Edges visible under the current selection and view threshold.
    ///
    /// Both endpoints must survive the node filter, and the edge value must
    /// meet the view threshold. The view threshold is authoritative for
    /// display: it can further restrict the build-time threshold but never
    /// relax it, since weaker edges were never generated.
    pub fn filtered_edges(&self) -> Vec<&GraphEdge> {
        let visible: HashSet<&str> = self
            .filtered_nodes()
            .iter()
            .map(|node| node.id.as_str())
            .collect();

        self.edges()
            .iter()
            .filter(|edge| {
                visible.contains(edge.from.as_str())
                    && visible.contains(edge.to.as_str())
                    && edge.value >= self.config.similarity_threshold
            })
            .collect()
    }

    /// Legend data: node count per category group, sorted descending.
    ///
    /// Colors come from the same lookup used for node construction, so the
    /// legend always matches the rendered nodes.
    pub fn categories(&self) -> Vec<CategoryLegend> {
        let mut legend: Vec<CategoryLegend> = Vec::new();
        for node in self.nodes() {
            match legend.iter_mut().find(|entry| entry.name == node.group) {
                Some(entry) => entry.count += 1,
                None => legend.push(CategoryLegend {
                    name: node.group.clone(),
                    count: 1,
                    color: category_color(&node.group).to_string(),
                }),
            }
        }
        legend.sort_by(|a, b| b.count.cmp(&a.count));
        legend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build_graph_from_papers;
    use crate::models::Paper;

    fn paper(id: &str, abstract_text: &str, primary: &str) -> Paper {
        Paper {
            id: id.to_string(),
            title: format!("Paper {}", id),
            abstract_text: abstract_text.to_string(),
            authors: vec![],
            primary_category: primary.to_string(),
            categories: vec![primary.to_string()],
            citations: None,
        }
    }

    fn store_with_graph() -> GraphConfigStore {
        let papers = vec![
            paper("a", "deep learning transformers attention", "cs.AI"),
            paper("b", "deep learning transformers vision", "cs.CV"),
            paper("c", "deep learning transformers robots", "cs.AI"),
            paper("d", "quantum chromodynamics lattice", "hep-lat"),
        ];
        let mut store = GraphConfigStore::new();
        // Build with a permissive threshold so view-time filtering has
        // something to restrict.
        store.set_graph_data(build_graph_from_papers(&papers, "2024-02-01", 0.1, 1.0));
        store.update_config(GraphConfigUpdate {
            similarity_threshold: Some(0.1),
            ..Default::default()
        });
        store
    }

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.node_size_factor, 1.0);
        assert!(config.show_labels);
        assert_eq!(config.layout_type, LayoutType::Force);
        assert!(config.selected_categories.is_empty());
    }

    #[test]
    fn test_update_and_reset_config() {
        let mut store = GraphConfigStore::new();
        store.update_config(GraphConfigUpdate {
            similarity_threshold: Some(0.8),
            layout_type: Some(LayoutType::Circular),
            ..Default::default()
        });

        assert_eq!(store.config().similarity_threshold, 0.8);
        assert_eq!(store.config().layout_type, LayoutType::Circular);
        // Untouched fields keep their values.
        assert!(store.config().show_labels);

        store.reset_config();
        assert_eq!(*store.config(), GraphConfig::default());
    }

    #[test]
    fn test_empty_selection_shows_all_nodes() {
        let store = store_with_graph();
        assert_eq!(store.filtered_nodes().len(), 4);
    }

    #[test]
    fn test_category_filter_restricts_nodes_and_edges() {
        let mut store = store_with_graph();
        store.update_config(GraphConfigUpdate {
            selected_categories: Some(vec!["cs.AI".to_string()]),
            ..Default::default()
        });

        let nodes = store.filtered_nodes();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.group == "cs.AI"));

        // Edges are re-derived after filtering: none may dangle.
        let visible: std::collections::HashSet<&str> =
            nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in store.filtered_edges() {
            assert!(visible.contains(edge.from.as_str()));
            assert!(visible.contains(edge.to.as_str()));
        }
    }

    #[test]
    fn test_view_threshold_is_authoritative() {
        let mut store = store_with_graph();
        let all_edges = store.filtered_edges().len();
        assert!(all_edges > 0);

        // Raising the view threshold above every edge value hides them all,
        // even though the build threshold admitted them.
        store.update_config(GraphConfigUpdate {
            similarity_threshold: Some(0.99),
            ..Default::default()
        });
        assert!(store.filtered_edges().is_empty());
    }

    #[test]
    fn test_categories_legend() {
        let store = store_with_graph();
        let legend = store.categories();

        assert_eq!(legend[0].name, "cs.AI");
        assert_eq!(legend[0].count, 2);
        assert_eq!(legend[0].color, category_color("cs.AI"));
        for window in legend.windows(2) {
            assert!(window[0].count >= window[1].count);
        }
    }

    #[test]
    fn test_set_and_clear_graph() {
        let mut store = store_with_graph();
        assert_eq!(store.current_date(), "2024-02-01");
        assert!(store.statistics().is_some());

        store.clear_graph();
        assert!(store.graph().is_none());
        assert_eq!(store.current_date(), "");
        assert!(store.nodes().is_empty());
        assert!(store.edges().is_empty());
    }
}
