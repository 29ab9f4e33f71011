//! Dependency graph construction.
//!
//! [`GraphBuilder`] turns a template name into the full transitive
//! dependency graph: locate the backing file, scan its source for
//! references, classify and recurse, memoizing every node by resolved
//! identity so cycles terminate and shared dependencies resolve once.
//!
//! Two invariants carry the whole design:
//!
//! - **Intern before recursing.** A node is stored in the identity map
//!   before its children are discovered, so a self-reference (or any cycle
//!   closing back on a node still under construction) resolves to the
//!   existing index instead of recursing forever.
//! - **Never fail on a child.** Unresolvable references degrade to missing
//!   placeholder nodes; one error-level diagnostic is emitted per concrete
//!   dead name per build, and interpolated names stay silent. The only
//!   fatal case is the root itself failing to locate.
//!
//! Lookups always bypass the finder's cache: the graph is rebuilt per
//! digest request and must reflect the filesystem as of invocation.

use anyhow::Result;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use tracing::{debug, error};

use crate::core::{Template, TemplateFormat, TrackerError};
use crate::digest::{Digestor, fingerprint};
use crate::finder::TemplateFinder;
use crate::graph::{DependencyGraph, NodeKey, NodeKind, TemplateNode};
use crate::registry::ComponentRegistry;
use crate::resolver::{NameResolver, ResolvedName, logical_name, underscore};
use crate::scanner::{ReferenceKind, Scanner};

/// Candidates further away than this are not worth suggesting.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Builds dependency graphs for named templates and components.
pub struct GraphBuilder<'a> {
    finder: &'a TemplateFinder,
    registry: &'a ComponentRegistry,
    scanner: Scanner,
    resolver: NameResolver,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder over a finder and a component registry.
    pub fn new(finder: &'a TemplateFinder, registry: &'a ComponentRegistry) -> Self {
        let suffix = &finder.config().component_suffix;
        Self {
            finder,
            registry,
            scanner: Scanner::new(suffix),
            resolver: NameResolver::new(suffix),
        }
    }

    /// Build the transitive dependency graph rooted at `name`.
    ///
    /// `name` may be a template (`posts/show`), a partial (`shared/_row`
    /// or `shared/row`), or a component class (`BadgeComponent`).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::RootNotFound`] when `name` itself cannot be
    /// located. Unresolvable references further down the tree are not
    /// errors; they appear as missing nodes.
    pub fn build(&self, name: &str) -> Result<(DependencyGraph, NodeIndex)> {
        let mut graph = DependencyGraph::new();
        let resolved = self.resolver.classify(name, None);
        let prefer_partial = name.rsplit('/').next().unwrap_or(name).starts_with('_');
        let root = self.build_node(&mut graph, name, resolved, prefer_partial);

        if graph.node(root).is_missing() {
            return Err(TrackerError::RootNotFound {
                name: name.to_string(),
            }
            .into());
        }
        debug!(
            "dependency graph for '{name}': {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok((graph, root))
    }

    /// Build the graph for `name` and fold it into a cache key.
    pub fn digest(&self, name: &str) -> Result<String> {
        let (graph, root) = self.build(name)?;
        Ok(Digestor::digest(&graph, root))
    }

    fn build_node(
        &self,
        graph: &mut DependencyGraph,
        raw: &str,
        resolved: ResolvedName,
        prefer_partial: bool,
    ) -> NodeIndex {
        // A dynamically-interpolated name cannot be resolved statically.
        // Register an inert placeholder and do not recurse; this is the
        // expected case, so no diagnostic.
        if raw.contains("#{") {
            return graph.intern(NodeKey::Unresolved(raw.to_string()), TemplateNode {
                name: raw.to_string(),
                logical_name: raw.to_string(),
                kind: NodeKind::Missing,
                component: false,
            });
        }

        let logical = resolved.logical();

        // A name that already failed to resolve this build keeps its one
        // placeholder and its one diagnostic.
        if let Some(existing) = graph.get(&NodeKey::Unresolved(logical.clone())) {
            return existing;
        }

        let component = matches!(resolved, ResolvedName::Component { .. });
        match self.locate(&resolved, prefer_partial) {
            Some(template) => {
                let key = NodeKey::Template(template.identifier.clone());
                if let Some(existing) = graph.get(&key) {
                    return existing;
                }
                let index = graph.intern(key, TemplateNode {
                    name: raw.to_string(),
                    logical_name: logical,
                    kind: NodeKind::Template {
                        identifier: template.identifier.clone(),
                        format: template.format,
                        source_digest: fingerprint(&template.source),
                    },
                    component,
                });
                self.populate_children(graph, index, &template, &resolved);
                index
            }
            None => {
                self.report_missing(&logical);
                graph.intern(NodeKey::Unresolved(logical.clone()), TemplateNode {
                    name: raw.to_string(),
                    logical_name: logical,
                    kind: NodeKind::Missing,
                    component,
                })
            }
        }
    }

    /// Scan a located node's source and attach its children.
    fn populate_children(
        &self,
        graph: &mut DependencyGraph,
        parent: NodeIndex,
        template: &Template,
        resolved: &ResolvedName,
    ) {
        let references = self.scanner.scan(&template.source);
        let current_dir = template.logical_dir().map(str::to_string);

        let mut seen = HashSet::new();
        let mut children = Vec::new();

        for reference in references {
            let child = match reference.kind {
                ReferenceKind::Component => ResolvedName::Component {
                    class_name: reference.raw.clone(),
                },
                // A partial's children that match the component pattern are
                // still component references; classification is by shape,
                // not by what kind of node discovered them.
                ReferenceKind::Literal | ReferenceKind::Dynamic => {
                    self.resolver.classify(&reference.raw, current_dir.as_deref())
                }
            };
            if !seen.insert(dedup_key(&child)) {
                continue;
            }
            children.push(self.build_node(graph, &reference.raw, child, true));
        }

        // Inheritance-based template reuse: a component may render a
        // template defined by a superclass, which no amount of scanning
        // this file will reveal. Every loaded class in the ancestor chain
        // becomes a child.
        if let ResolvedName::Component { class_name } = resolved {
            let ancestors = self
                .registry
                .classes()
                .filter(|class| {
                    class.name != *class_name && self.registry.is_ancestor(&class.name, class_name)
                })
                .map(|class| class.name.clone())
                .collect::<Vec<_>>();
            for ancestor in ancestors {
                let child = ResolvedName::Component {
                    class_name: ancestor.clone(),
                };
                if !seen.insert(dedup_key(&child)) {
                    continue;
                }
                children.push(self.build_node(graph, &ancestor, child, true));
            }
        }

        for child in children {
            graph.add_child(parent, child);
        }
    }

    /// Locate the file backing a resolved reference, cache-bypassing.
    ///
    /// Component references try the component source root first, then fall
    /// back to ordinary view lookup of the underscored path. Partial
    /// references try their preferred partial mode first, then the other
    /// mode, biasing toward finding something over missing a dependency.
    fn locate(&self, resolved: &ResolvedName, prefer_partial: bool) -> Option<Template> {
        match resolved {
            ResolvedName::Component { class_name } => {
                let source_path = underscore(class_name);
                self.finder
                    .find_component_source_fresh(&source_path)
                    .or_else(|| self.locate_view(&source_path, true))
            }
            ResolvedName::Partial { name } => {
                self.locate_view(&logical_name(name), prefer_partial)
            }
        }
    }

    fn locate_view(&self, logical: &str, prefer_partial: bool) -> Option<Template> {
        let formats = TemplateFormat::RENDERED;
        self.finder
            .find_fresh(logical, &[], prefer_partial, formats)
            .or_else(|| self.finder.find_fresh(logical, &[], !prefer_partial, formats))
    }

    fn report_missing(&self, logical: &str) {
        match self.nearest_name(logical) {
            Some(candidate) => {
                error!(
                    "couldn't find template for digesting: '{logical}' \
                     (closest match: '{candidate}')"
                );
            }
            None => error!("couldn't find template for digesting: '{logical}'"),
        }
    }

    fn nearest_name(&self, name: &str) -> Option<String> {
        self.finder
            .known_names()
            .into_iter()
            .map(|candidate| (strsim::levenshtein(name, &candidate), candidate))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }
}

/// Children are deduplicated by logical identity before recursing, so
/// `a/_b` and `a/b` collapse to one child and one lookup.
fn dedup_key(resolved: &ResolvedName) -> String {
    match resolved {
        ResolvedName::Component { class_name } => format!("component:{class_name}"),
        ResolvedName::Partial { name } => logical_name(name),
    }
}
