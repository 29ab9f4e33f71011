//! viewgraph - template dependency graphs and fragment-cache digests.
//!
//! Server-rendered view trees compose templates, partials, and view
//! components that reference one another - through render calls, layout
//! arguments, slots, and class inheritance. Fragment caching over such a
//! tree needs a cache key that changes exactly when any transitively
//! referenced file changes. viewgraph computes that key: it statically
//! scans template source for references, resolves them through both the
//! partial and the component lookup namespaces, assembles the transitive
//! dependency graph, and folds it into a stable digest.
//!
//! # Architecture Overview
//!
//! Data flows leaf to root:
//!
//! 1. [`scanner`] extracts candidate references from raw source text by
//!    pattern matching around render-invocation keywords.
//! 2. [`resolver`] classifies each candidate (component class vs. partial
//!    path) and normalizes names into their logical form.
//! 3. [`finder`] locates the backing file, trying the component source
//!    namespace and ordinary view lookup in sequence, always against
//!    current filesystem state.
//! 4. [`builder`] assembles the graph recursively, interning every node by
//!    resolved identity before recursing - cycles terminate by construction
//!    and shared dependencies resolve once.
//! 5. [`digest`] folds the finished graph into a hex SHA-256 cache key.
//!
//! Supporting modules: [`config`] (TOML-backed tracker configuration),
//! [`registry`] (loaded component classes and their ancestor chains),
//! [`graph`] (the node/graph data model), [`core`] (errors and template
//! handles).
//!
//! # Design Posture
//!
//! Reference discovery is textual, not semantic. The scanner deliberately
//! over-approximates (dynamic expressions are attempted as literal path
//! guesses) and under-approximates in exactly one place (interpolated
//! names are dropped): a spurious dependency costs a lookup, a missed one
//! silently serves stale caches. Unresolvable references become missing
//! placeholder nodes that still participate in the digest; the only error
//! a digest request can surface is the root template not existing.
//!
//! # Example
//!
//! ```rust,no_run
//! use viewgraph::{
//!     ComponentClass, ComponentRegistry, Digestor, GraphBuilder, TemplateFinder, TrackerConfig,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = TrackerConfig::load(std::path::Path::new("viewgraph.toml"))?;
//! let finder = TemplateFinder::new(config);
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register(ComponentClass::new("BaseComponent"));
//! registry.register(ComponentClass::with_parent("CardComponent", "BaseComponent"));
//!
//! let builder = GraphBuilder::new(&finder, &registry);
//! let (graph, root) = builder.build("posts/show")?;
//! println!("{}", graph.to_tree_string(root));
//!
//! let cache_key = Digestor::digest(&graph, root);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod digest;
pub mod finder;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use crate::builder::GraphBuilder;
pub use crate::config::TrackerConfig;
pub use crate::core::{Template, TemplateFormat, TrackerError};
pub use crate::digest::Digestor;
pub use crate::finder::TemplateFinder;
pub use crate::graph::{DependencyGraph, NodeKey, NodeKind, TemplateNode};
pub use crate::registry::{ComponentClass, ComponentRegistry};
pub use crate::resolver::{NameResolver, ResolvedName};
pub use crate::scanner::{Reference, ReferenceKind, Scanner};
