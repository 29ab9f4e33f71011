//! Dependency graph for template digest computation.
//!
//! The graph is a rooted, possibly-cyclic directed graph of
//! [`TemplateNode`]s. Node identity is the heart of the design: every
//! reference resolving to the same underlying file (or the same unresolvable
//! name) reuses the same node, looked up through an identity map keyed by
//! [`NodeKey`]. Back-edges therefore point at already-constructed nodes,
//! which is what makes mutually-recursive templates representable without
//! recomputation - and what obliges every traversal to carry its own
//! visited set.
//!
//! Children are ordered: edge weights record discovery order so traversal
//! and digest output are deterministic.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::core::TemplateFormat;

/// Identity key for graph memoization.
///
/// Located nodes are keyed by their canonical file path; unresolvable nodes
/// are keyed by the logical name that failed, so repeated dead references
/// share one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// A located template, identified by canonical path.
    Template(PathBuf),
    /// An unresolvable reference, identified by logical name.
    Unresolved(String),
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Backing file located.
    Template {
        /// Canonical path of the backing file.
        identifier: PathBuf,
        /// Format the lookup matched under.
        format: TemplateFormat,
        /// Hex SHA-256 of the source text as read at build time.
        source_digest: String,
    },
    /// Reference could not be resolved. Terminal: no children.
    Missing,
}

/// One template or component in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    /// Raw reference text as discovered.
    pub name: String,
    /// Normalized identity name.
    pub logical_name: String,
    /// Located template or missing placeholder.
    pub kind: NodeKind,
    /// Whether this node was resolved through the component namespace.
    pub component: bool,
}

impl TemplateNode {
    /// Whether this node is an unresolvable placeholder.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, NodeKind::Missing)
    }

    /// Canonical path of the backing file, if located.
    pub fn identifier(&self) -> Option<&PathBuf> {
        match &self.kind {
            NodeKind::Template { identifier, .. } => Some(identifier),
            NodeKind::Missing => None,
        }
    }
}

impl fmt::Display for TemplateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            write!(f, "{} (missing)", self.logical_name)
        } else {
            write!(f, "{}", self.logical_name)
        }
    }
}

/// Directed graph of template dependencies with identity-keyed memoization.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<TemplateNode, usize>,
    node_map: HashMap<NodeKey, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the node previously interned under `key`.
    pub fn get(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    /// Intern a node under its identity key.
    ///
    /// Interning must happen before the node's children are discovered so a
    /// self-reference found while scanning resolves to the node under
    /// construction instead of recursing.
    pub fn intern(&mut self, key: NodeKey, node: TemplateNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&key) {
            return index;
        }
        let index = self.graph.add_node(node);
        self.node_map.insert(key, index);
        index
    }

    /// Append `child` to `parent`'s ordered children.
    ///
    /// Duplicate edges between the same pair are ignored; self-edges are
    /// legal and represent a template rendering itself.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        if self.graph.edges(parent).any(|edge| edge.target() == child) {
            return;
        }
        let position = self.graph.edges(parent).count();
        self.graph.add_edge(parent, child, position);
    }

    /// A node's children in discovery order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut ordered: Vec<(usize, NodeIndex)> =
            self.graph.edges(index).map(|edge| (*edge.weight(), edge.target())).collect();
        ordered.sort_by_key(|(position, _)| *position);
        ordered.into_iter().map(|(_, target)| target).collect()
    }

    /// Borrow a node's data.
    pub fn node(&self, index: NodeIndex) -> &TemplateNode {
        &self.graph[index]
    }

    /// All nodes with their indices, in interning order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &TemplateNode)> {
        self.graph.node_indices().map(|index| (index, &self.graph[index]))
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Build a human-readable dependency tree representation.
    ///
    /// Revisited nodes are marked as circular references instead of being
    /// expanded again, so the rendering terminates on cyclic graphs.
    pub fn to_tree_string(&self, root: NodeIndex) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();
        self.write_tree(root, &mut result, "", true, &mut visited);
        result
    }

    fn write_tree(
        &self,
        index: NodeIndex,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{}{}{}\n", prefix, connector, self.graph[index]));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(index) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let children = self.children(index);
        for (i, child) in children.iter().enumerate() {
            let is_last_child = i == children.len() - 1;
            self.write_tree(*child, result, &child_prefix, is_last_child, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_node(logical: &str) -> TemplateNode {
        TemplateNode {
            name: logical.to_string(),
            logical_name: logical.to_string(),
            kind: NodeKind::Template {
                identifier: PathBuf::from(format!("/views/{logical}.html.erb")),
                format: TemplateFormat::Html,
                source_digest: "0".repeat(64),
            },
            component: false,
        }
    }

    fn missing_node(logical: &str) -> TemplateNode {
        TemplateNode {
            name: logical.to_string(),
            logical_name: logical.to_string(),
            kind: NodeKind::Missing,
            component: false,
        }
    }

    #[test]
    fn test_intern_reuses_instance() {
        let mut graph = DependencyGraph::new();
        let key = NodeKey::Template(PathBuf::from("/views/a.html.erb"));
        let first = graph.intern(key.clone(), template_node("a"));
        let second = graph.intern(key, template_node("a"));
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_missing_and_template_keys_are_distinct() {
        let mut graph = DependencyGraph::new();
        let a = graph.intern(NodeKey::Unresolved("a".to_string()), missing_node("a"));
        let b = graph.intern(
            NodeKey::Template(PathBuf::from("a")),
            template_node("a"),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_children_preserve_discovery_order() {
        let mut graph = DependencyGraph::new();
        let root = graph.intern(NodeKey::Unresolved("root".to_string()), missing_node("root"));
        let names = ["first", "second", "third"];
        for name in names {
            let child = graph.intern(NodeKey::Unresolved(name.to_string()), missing_node(name));
            graph.add_child(root, child);
        }
        let logical: Vec<&str> =
            graph.children(root).iter().map(|&c| graph.node(c).logical_name.as_str()).collect();
        assert_eq!(logical, names);
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut graph = DependencyGraph::new();
        let root = graph.intern(NodeKey::Unresolved("root".to_string()), missing_node("root"));
        let child = graph.intern(NodeKey::Unresolved("child".to_string()), missing_node("child"));
        graph.add_child(root, child);
        graph.add_child(root, child);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_tree_string_marks_cycles() {
        let mut graph = DependencyGraph::new();
        let a = graph.intern(NodeKey::Unresolved("a".to_string()), missing_node("a"));
        let b = graph.intern(NodeKey::Unresolved("b".to_string()), missing_node("b"));
        graph.add_child(a, b);
        graph.add_child(b, a);

        let rendered = graph.to_tree_string(a);
        assert!(rendered.contains("(circular reference)"));
    }

    #[test]
    fn test_self_edge() {
        let mut graph = DependencyGraph::new();
        let a = graph.intern(NodeKey::Unresolved("a".to_string()), missing_node("a"));
        graph.add_child(a, a);
        assert_eq!(graph.edge_count(), 1);
        let rendered = graph.to_tree_string(a);
        assert!(rendered.contains("(circular reference)"));
    }
}
