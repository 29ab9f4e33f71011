//! Tracker configuration.
//!
//! [`TrackerConfig`] describes where templates live and how references are
//! recognized: the view roots searched for partials and templates, the
//! component root searched for class-defining component files, the class
//! suffix that marks a component reference, and the file extensions each
//! lookup format matches.
//!
//! Configuration can be built programmatically (tests do this) or loaded
//! from a TOML file, in which case relative roots are resolved against the
//! file's directory:
//!
//! ```toml
//! view_roots = ["app/views"]
//! component_root = "app/components"
//! component_suffix = "Component"
//! template_extensions = ["html.erb", "erb"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{TemplateFormat, TrackerError};

/// Configuration for dependency tracking and digest computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Roots searched for partials and ordinary templates, in order.
    pub view_roots: Vec<PathBuf>,

    /// Root searched for component source files. `None` disables
    /// component-namespace lookups entirely.
    pub component_root: Option<PathBuf>,

    /// Class-name suffix marking a component reference (`FooComponent`).
    pub component_suffix: String,

    /// Extensions matched for HTML-format lookups, without leading dot,
    /// tried in order.
    pub template_extensions: Vec<String>,

    /// Extensions matched for text-format lookups.
    pub text_extensions: Vec<String>,

    /// Extensions matched for source-format (component class) lookups.
    pub source_extensions: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            view_roots: vec![PathBuf::from("app/views")],
            component_root: Some(PathBuf::from("app/components")),
            component_suffix: "Component".to_string(),
            template_extensions: vec!["html.erb".to_string(), "erb".to_string()],
            text_extensions: vec!["text.erb".to_string()],
            source_extensions: vec!["rb".to_string()],
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Relative `view_roots` and `component_root` entries are resolved
    /// against the directory containing the file. The loaded configuration
    /// is validated before being returned.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tracker config: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content).map_err(TrackerError::ConfigParse)?;

        if let Some(base) = path.parent() {
            config.view_roots = config
                .view_roots
                .into_iter()
                .map(|root| resolve_root(base, root))
                .collect();
            config.component_root = config.component_root.map(|root| resolve_root(base, root));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Config`] when no view root is configured,
    /// an extension list relevant to lookups is empty, or the component
    /// suffix does not look like a class-name suffix.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.view_roots.is_empty() {
            return Err(TrackerError::Config {
                reason: "view_roots must not be empty".to_string(),
            });
        }
        if self.template_extensions.is_empty() {
            return Err(TrackerError::Config {
                reason: "template_extensions must not be empty".to_string(),
            });
        }
        if self.component_root.is_some() && self.source_extensions.is_empty() {
            return Err(TrackerError::Config {
                reason: "source_extensions must not be empty when component_root is set"
                    .to_string(),
            });
        }
        if !self.component_suffix.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return Err(TrackerError::Config {
                reason: format!(
                    "component_suffix must start with an uppercase letter, got '{}'",
                    self.component_suffix
                ),
            });
        }
        Ok(())
    }

    /// Extensions tried for a lookup format, in configured order.
    pub fn extensions_for(&self, format: TemplateFormat) -> &[String] {
        match format {
            TemplateFormat::Html => &self.template_extensions,
            TemplateFormat::Text => &self.text_extensions,
            TemplateFormat::Source => &self.source_extensions,
        }
    }
}

fn resolve_root(base: &Path, root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        root
    } else {
        base.join(root)
    }
}
