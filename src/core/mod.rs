//! Core types for viewgraph.
//!
//! This module provides the foundation the rest of the crate builds on:
//!
//! - [`TrackerError`] - the crate's error taxonomy. Child-level resolution
//!   failures never surface as errors; see the module docs in [`error`].
//! - [`Template`] / [`TemplateFormat`] - the located-template handle returned
//!   by lookups and wrapped by graph nodes.
//!
//! # Design Principles
//!
//! Digest computation must be total: a dependency graph is always produced
//! for a root that exists, no matter how broken the references inside it
//! are. Unresolvable branches are represented in the graph (and therefore in
//! the digest) rather than reported, because a reference's absence is itself
//! cache-relevant state.

pub mod error;
pub mod template;

pub use error::TrackerError;
pub use template::{Template, TemplateFormat};
