//! Static reference extraction from template source.
//!
//! The scanner approximates render semantics by pattern matching over raw
//! source text: it never executes or parses the template language. For each
//! occurrence of a render-invocation keyword it inspects the trailing
//! argument text with three patterns, in order, first match wins:
//!
//! 1. **Component**: a capitalized identifier carrying the configured
//!    component suffix followed by a call-dot (`FooComponent.new`,
//!    `Nav::ItemComponent.with_collection`).
//! 2. **Quoted literal**: a `"..."` or `'...'` string naming a partial or
//!    template. Literals containing interpolation (`#{`) are discarded:
//!    a dynamically-built name cannot be resolved statically, and guessing
//!    would poison the digest. This is a deliberate under-approximation.
//! 3. **Bare identifier / method chain**: an unquoted expression
//!    (`@post`, `item.partial_name`). Kept as a dynamic reference; the
//!    builder still attempts it as a literal path guess, biasing the graph
//!    toward over-inclusion.
//!
//! `layout:` keyword arguments are scanned separately with the same three
//! patterns.
//!
//! Like any textual scan, this yields occasional false positives (the word
//! `render` in prose, `layout: true`). Those degrade to missing placeholder
//! nodes downstream; a spurious dependency costs a lookup, a missed one
//! serves stale caches, so the trade is intentional.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::trace;

/// How a reference was recognized in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Component-class reference (`FooComponent.new`).
    Component,
    /// Statically-named partial or template (`"shared/header"`).
    Literal,
    /// Unquoted variable or method chain, attempted as a path guess.
    Dynamic,
}

/// One candidate dependency extracted from template source.
///
/// Transient: consumed by classification and never stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Matched argument text: a class name for component references,
    /// the string body for literals, the expression text for dynamics.
    pub raw: String,
    /// Which extraction pattern matched.
    pub kind: ReferenceKind,
}

static RENDER_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brender\b").expect("render keyword pattern"));

static LAYOUT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blayout:").expect("layout keyword pattern"));

static LITERAL_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*\(?\s*(?:partial:\s*|template:\s*)?(?:"([^"]*)"|'([^']*)')"#)
        .expect("literal argument pattern")
});

static DYNAMIC_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(?\s*(?:partial:\s*|template:\s*)?([@a-z_][\w./]*)")
        .expect("dynamic argument pattern")
});

/// Reference scanner for one component-suffix convention.
///
/// Scanning is a pure function over source text: no I/O, no side effects
/// beyond trace logging.
#[derive(Debug)]
pub struct Scanner {
    component_argument: Regex,
}

impl Scanner {
    /// Build a scanner recognizing classes ending in `component_suffix`.
    pub fn new(component_suffix: &str) -> Self {
        let pattern = format!(
            r"^\s*\(?\s*([A-Z][A-Za-z0-9:]*{})\s*\.",
            regex::escape(component_suffix)
        );
        Self {
            component_argument: Regex::new(&pattern).expect("component argument pattern"),
        }
    }

    /// Extract candidate references from template source.
    ///
    /// Returns references deduplicated by raw text, first-occurrence order
    /// preserved.
    pub fn scan(&self, source: &str) -> Vec<Reference> {
        let mut references = Vec::new();

        for keyword in RENDER_KEYWORD.find_iter(source) {
            if let Some(reference) = self.match_argument(&source[keyword.end()..]) {
                references.push(reference);
            }
        }
        for keyword in LAYOUT_KEYWORD.find_iter(source) {
            if let Some(reference) = self.match_argument(&source[keyword.end()..]) {
                references.push(reference);
            }
        }

        let mut seen = HashSet::new();
        references.retain(|reference| seen.insert(reference.raw.clone()));
        references
    }

    /// Apply the three extraction patterns to the text trailing a keyword.
    fn match_argument(&self, rest: &str) -> Option<Reference> {
        if let Some(captures) = self.component_argument.captures(rest) {
            let class_name = captures.get(1).map(|m| m.as_str())?;
            return Some(Reference {
                raw: class_name.to_string(),
                kind: ReferenceKind::Component,
            });
        }

        if let Some(captures) = LITERAL_ARGUMENT.captures(rest) {
            let body = captures.get(1).or_else(|| captures.get(2)).map(|m| m.as_str())?;
            if body.contains("#{") {
                trace!("dropping interpolated template name: {body}");
                return None;
            }
            if body.is_empty() {
                return None;
            }
            return Some(Reference {
                raw: body.to_string(),
                kind: ReferenceKind::Literal,
            });
        }

        if let Some(captures) = DYNAMIC_ARGUMENT.captures(rest) {
            let matched = captures.get(1)?;
            // An identifier directly followed by ':' is a keyword argument
            // (layout:, locals:), not a render target.
            if rest[matched.end()..].starts_with(':') {
                return None;
            }
            return Some(Reference {
                raw: matched.as_str().to_string(),
                kind: ReferenceKind::Dynamic,
            });
        }

        None
    }
}
