//! Reference classification and name normalization.
//!
//! Scanned references live in one of two lookup namespaces: component-style
//! names resolve through the component registry and the component source
//! root, everything else resolves through ordinary partial/template lookup.
//! This module decides which namespace a reference belongs to and normalizes
//! names into their logical form.
//!
//! Logical names are the graph's identity vocabulary: partial underscore
//! markers are stripped (`shared/_row` and `shared/row` are the same
//! template), so references that differ only in marker spelling collapse to
//! one node.

use regex::Regex;

/// A classified reference, ready for lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedName {
    /// Resolves through the component namespace; the class name is the
    /// registry lookup key.
    Component {
        /// Fully-qualified class name, suffix included.
        class_name: String,
    },
    /// Resolves through ordinary partial/template lookup.
    Partial {
        /// Slash-separated template name, possibly still carrying partial
        /// underscore markers.
        name: String,
    },
}

impl ResolvedName {
    /// The logical identity of this name, used for child deduplication and
    /// missing-node interning.
    pub fn logical(&self) -> String {
        match self {
            Self::Component { class_name } => class_name.clone(),
            Self::Partial { name } => logical_name(name),
        }
    }
}

/// Classifier for one component-suffix convention.
#[derive(Debug)]
pub struct NameResolver {
    component_name: Regex,
}

impl NameResolver {
    /// Build a resolver recognizing class names ending in `component_suffix`.
    pub fn new(component_suffix: &str) -> Self {
        let pattern = format!(r"^[A-Z][A-Za-z0-9:]*{}$", regex::escape(component_suffix));
        Self {
            component_name: Regex::new(&pattern).expect("component name pattern"),
        }
    }

    /// Classify a raw reference.
    ///
    /// Anything after the first call-dot is stripped before the component
    /// pattern is applied; `::` namespacing is preserved. Partial-style
    /// names lacking a path separator are qualified with `current_dir`,
    /// mirroring relative-partial lookup semantics.
    pub fn classify(&self, raw: &str, current_dir: Option<&str>) -> ResolvedName {
        let head = raw.split('.').next().unwrap_or(raw).trim();

        if self.component_name.is_match(head) {
            return ResolvedName::Component {
                class_name: head.to_string(),
            };
        }

        let name = match current_dir {
            Some(dir) if !raw.contains('/') => format!("{dir}/{raw}"),
            _ => raw.to_string(),
        };
        ResolvedName::Partial { name }
    }
}

/// Strip partial underscore markers from a template name.
///
/// `_row` becomes `row`, `shared/_row` becomes `shared/row`. Applied before
/// memoization so every marker spelling of one template shares a node.
pub fn logical_name(name: &str) -> String {
    let collapsed = name.replace("/_", "/");
    collapsed.strip_prefix('_').map_or(collapsed.clone(), str::to_string)
}

/// Convert a class name to its source path: `Nav::ItemComponent` becomes
/// `nav/item_component`.
///
/// Underscores are inserted at lower-to-upper transitions and before the
/// last capital of an acronym run, matching conventional camel-to-snake
/// behavior (`HTMLBadgeComponent` becomes `html_badge_component`).
pub fn underscore(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 8);
    for (i, part) in class_name.split("::").enumerate() {
        if i > 0 {
            out.push('/');
        }
        let chars: Vec<char> = part.chars().collect();
        for (j, &ch) in chars.iter().enumerate() {
            if ch.is_ascii_uppercase() {
                let prev_lower = j > 0 && !chars[j - 1].is_ascii_uppercase();
                let next_lower = chars.get(j + 1).is_some_and(|c| c.is_ascii_lowercase());
                if j > 0 && (prev_lower || next_lower) {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
    }
    out
}
