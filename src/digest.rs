//! Cache-key digest computation over dependency graphs.
//!
//! The digest of a node folds together its own content fingerprint and the
//! digests of its children, pre-order. Because the graph reuses node
//! instances for every reference to the same template, two guards keep the
//! fold cheap and terminating:
//!
//! - a per-computation memo so each node instance is hashed at most once,
//!   keeping diamond-shaped graphs linear instead of exponential;
//! - an in-progress marker so a back-edge onto a node currently being
//!   folded contributes a fixed placeholder instead of recursing.
//!
//! Content fingerprints are SHA-256 over source bytes, captured when the
//! graph was built. Missing nodes contribute their logical name under a
//! `missing` marker: an unresolvable reference appearing or disappearing
//! is itself a cache-relevant change.

use petgraph::graph::NodeIndex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::graph::{DependencyGraph, NodeKind};

/// Contribution of a node re-encountered while it is still being folded.
const CYCLE_PLACEHOLDER: &str = "cycle";

enum State {
    InProgress,
    Done(String),
}

/// Hex SHA-256 fingerprint of template source text.
///
/// Captured into each graph node at build time so digest computation never
/// re-reads the filesystem.
pub fn fingerprint(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Folds a dependency graph into a stable cache key.
pub struct Digestor;

impl Digestor {
    /// Compute the digest of the tree rooted at `root`.
    ///
    /// Deterministic for a given graph: identical content and structure
    /// yield an identical digest; any reachable node's content change
    /// yields a different one.
    pub fn digest(graph: &DependencyGraph, root: NodeIndex) -> String {
        let mut states: HashMap<NodeIndex, State> = HashMap::new();
        Self::fold(graph, root, &mut states)
    }

    fn fold(
        graph: &DependencyGraph,
        index: NodeIndex,
        states: &mut HashMap<NodeIndex, State>,
    ) -> String {
        match states.get(&index) {
            Some(State::Done(digest)) => return digest.clone(),
            Some(State::InProgress) => return CYCLE_PLACEHOLDER.to_string(),
            None => {}
        }
        states.insert(index, State::InProgress);

        let node = graph.node(index);
        let mut hasher = Sha256::new();
        hasher.update(node.logical_name.as_bytes());
        hasher.update([0u8]);
        match &node.kind {
            NodeKind::Template { source_digest, .. } => hasher.update(source_digest.as_bytes()),
            NodeKind::Missing => hasher.update(b"missing"),
        }
        for child in graph.children(index) {
            hasher.update([0u8]);
            hasher.update(Self::fold(graph, child, states).as_bytes());
        }

        let digest = hex::encode(hasher.finalize());
        states.insert(index, State::Done(digest.clone()));
        digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TemplateFormat;
    use crate::graph::{NodeKey, TemplateNode};
    use std::path::PathBuf;

    fn node(logical: &str, source: &str) -> TemplateNode {
        TemplateNode {
            name: logical.to_string(),
            logical_name: logical.to_string(),
            kind: NodeKind::Template {
                identifier: PathBuf::from(format!("/views/{logical}")),
                format: TemplateFormat::Html,
                source_digest: fingerprint(source),
            },
            component: false,
        }
    }

    fn missing(logical: &str) -> TemplateNode {
        TemplateNode {
            name: logical.to_string(),
            logical_name: logical.to_string(),
            kind: NodeKind::Missing,
            component: false,
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("body"), fingerprint("body"));
        assert_ne!(fingerprint("body"), fingerprint("body2"));
    }

    #[test]
    fn test_digest_depends_on_children() {
        let mut graph = DependencyGraph::new();
        let root = graph.intern(NodeKey::Unresolved("root".into()), node("root", "r"));
        let solo = Digestor::digest(&graph, root);

        let child = graph.intern(NodeKey::Unresolved("child".into()), node("child", "c"));
        graph.add_child(root, child);
        assert_ne!(solo, Digestor::digest(&graph, root));
    }

    #[test]
    fn test_digest_idempotent() {
        let mut graph = DependencyGraph::new();
        let root = graph.intern(NodeKey::Unresolved("root".into()), node("root", "r"));
        let child = graph.intern(NodeKey::Unresolved("child".into()), node("child", "c"));
        graph.add_child(root, child);

        assert_eq!(Digestor::digest(&graph, root), Digestor::digest(&graph, root));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = DependencyGraph::new();
        let a = graph.intern(NodeKey::Unresolved("a".into()), node("a", "aa"));
        let b = graph.intern(NodeKey::Unresolved("b".into()), node("b", "bb"));
        graph.add_child(a, b);
        graph.add_child(b, a);

        let digest = Digestor::digest(&graph, a);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_missing_node_participates() {
        let mut graph = DependencyGraph::new();
        let root = graph.intern(NodeKey::Unresolved("root".into()), node("root", "r"));
        let with_none = Digestor::digest(&graph, root);

        let gone = graph.intern(NodeKey::Unresolved("gone".into()), missing("gone"));
        graph.add_child(root, gone);
        assert_ne!(with_none, Digestor::digest(&graph, root));
    }

    #[test]
    fn test_missing_nodes_differ_by_name() {
        let mut graph_a = DependencyGraph::new();
        let root_a = graph_a.intern(NodeKey::Unresolved("root".into()), node("root", "r"));
        let gone_a = graph_a.intern(NodeKey::Unresolved("one".into()), missing("one"));
        graph_a.add_child(root_a, gone_a);

        let mut graph_b = DependencyGraph::new();
        let root_b = graph_b.intern(NodeKey::Unresolved("root".into()), node("root", "r"));
        let gone_b = graph_b.intern(NodeKey::Unresolved("two".into()), missing("two"));
        graph_b.add_child(root_b, gone_b);

        assert_ne!(Digestor::digest(&graph_a, root_a), Digestor::digest(&graph_b, root_b));
    }
}
