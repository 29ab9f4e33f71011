//! Template handles and formats.
//!
//! A [`Template`] is the result of a successful lookup: a located file
//! together with its source text and the format it was matched under. The
//! identifier is the canonical filesystem path and serves as the identity
//! key for graph memoization.

use std::fmt;
use std::path::{Path, PathBuf};

/// Format a template was located under.
///
/// Lookup requests carry a list of acceptable formats. Component-namespace
/// lookups fix the format to [`TemplateFormat::Source`] so they match the
/// class-defining file rather than rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateFormat {
    /// HTML-producing template.
    Html,
    /// Plain-text template.
    Text,
    /// Class-defining source file backing a component.
    Source,
}

impl TemplateFormat {
    /// Formats tried for ordinary partial/template lookups.
    pub const RENDERED: &'static [TemplateFormat] = &[TemplateFormat::Html, TemplateFormat::Text];
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Html => "html",
            Self::Text => "text",
            Self::Source => "source",
        };
        write!(f, "{name}")
    }
}

/// A located template: the unit the dependency graph is built over.
#[derive(Debug, Clone)]
pub struct Template {
    /// Canonical path of the backing file. Graph identity key.
    pub identifier: PathBuf,
    /// Normalized lookup name, `/`-separated, without partial markers.
    pub logical_name: String,
    /// Raw source text, as read at lookup time.
    pub source: String,
    /// Format the lookup matched under.
    pub format: TemplateFormat,
}

impl Template {
    /// Directory portion of the logical name, if any.
    ///
    /// Used to qualify relative partial references found in this template's
    /// source (`render "row"` inside `shared/table` resolves to
    /// `shared/row` first).
    pub fn logical_dir(&self) -> Option<&str> {
        self.logical_name.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.identifier
    }
}
