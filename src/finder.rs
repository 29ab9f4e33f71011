//! Filesystem template lookup.
//!
//! [`TemplateFinder`] resolves logical names to concrete files under the
//! configured roots. Two lookup scopes exist:
//!
//! - **View lookup**: searches every view root, trying prefixes in order,
//!   with partial lookups expecting the `_`-prefixed basename on disk.
//! - **Component lookup**: restricted to the component root with the format
//!   fixed to [`TemplateFormat::Source`], so it matches class-defining files
//!   rather than rendered output.
//!
//! Lookups are cached per finder instance. The graph builder always uses
//! the `_fresh` variants, which bypass and refresh the cache: dependency
//! graphs are rebuilt on every digest request and must observe filesystem
//! state as of invocation, not a stale memo. The cache serves repeated
//! lookups from rendering-adjacent callers between digest requests.
//!
//! The cache is interior-mutable and not synchronized; use one finder per
//! thread for concurrent digest computation.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::TrackerConfig;
use crate::core::{Template, TemplateFormat};
use crate::resolver::logical_name;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    name: String,
    prefixes: Vec<String>,
    partial: bool,
    formats: Vec<TemplateFormat>,
    component: bool,
}

/// Template lookup service over configured filesystem roots.
#[derive(Debug)]
pub struct TemplateFinder {
    config: TrackerConfig,
    cache: RefCell<HashMap<LookupKey, Option<Template>>>,
}

impl TemplateFinder {
    /// Create a finder over the roots described by `config`.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The configuration this finder searches under.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Resolve a logical name to at most one template, consulting the
    /// lookup cache first.
    pub fn find(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        formats: &[TemplateFormat],
    ) -> Option<Template> {
        let key = LookupKey {
            name: name.to_string(),
            prefixes: prefixes.to_vec(),
            partial,
            formats: formats.to_vec(),
            component: false,
        };
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }
        self.find_fresh(name, prefixes, partial, formats)
    }

    /// Resolve a logical name against current filesystem state, bypassing
    /// and refreshing the lookup cache.
    pub fn find_fresh(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        formats: &[TemplateFormat],
    ) -> Option<Template> {
        let key = LookupKey {
            name: name.to_string(),
            prefixes: prefixes.to_vec(),
            partial,
            formats: formats.to_vec(),
            component: false,
        };
        let found = self.locate(&self.config.view_roots, name, prefixes, partial, formats);
        self.cache.borrow_mut().insert(key, found.clone());
        found
    }

    /// Resolve a component source path (`nav/item_component`) within the
    /// component root, consulting the lookup cache first.
    pub fn find_component_source(&self, source_path: &str) -> Option<Template> {
        let key = LookupKey {
            name: source_path.to_string(),
            prefixes: Vec::new(),
            partial: false,
            formats: vec![TemplateFormat::Source],
            component: true,
        };
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }
        self.find_component_source_fresh(source_path)
    }

    /// Resolve a component source path against current filesystem state.
    pub fn find_component_source_fresh(&self, source_path: &str) -> Option<Template> {
        let root = self.config.component_root.clone()?;
        let key = LookupKey {
            name: source_path.to_string(),
            prefixes: Vec::new(),
            partial: false,
            formats: vec![TemplateFormat::Source],
            component: true,
        };
        let found =
            self.locate(&[root], source_path, &[], false, &[TemplateFormat::Source]);
        self.cache.borrow_mut().insert(key, found.clone());
        found
    }

    /// Every logical name currently resolvable under the configured roots.
    ///
    /// Used for nearest-name suggestions when a concrete reference fails to
    /// resolve. Sorted and deduplicated.
    pub fn known_names(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .config
            .template_extensions
            .iter()
            .chain(&self.config.text_extensions)
            .chain(&self.config.source_extensions)
            .map(|ext| format!(".{ext}"))
            .collect();
        // Longest first so "html.erb" wins over "erb".
        extensions.sort_by_key(|ext| std::cmp::Reverse(ext.len()));

        let mut names = BTreeSet::new();
        let roots = self.config.view_roots.iter().chain(self.config.component_root.as_ref());
        for root in roots {
            for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let relative = relative.to_string_lossy().replace('\\', "/");
                if let Some(stripped) =
                    extensions.iter().find_map(|ext| relative.strip_suffix(ext.as_str()))
                {
                    names.insert(logical_name(stripped));
                }
            }
        }
        names.into_iter().collect()
    }

    fn locate(
        &self,
        roots: &[PathBuf],
        name: &str,
        prefixes: &[String],
        partial: bool,
        formats: &[TemplateFormat],
    ) -> Option<Template> {
        for root in roots {
            for prefix in prefixes.iter().map(String::as_str).chain(std::iter::once("")) {
                let qualified = if prefix.is_empty() {
                    name.to_string()
                } else {
                    format!("{prefix}/{name}")
                };
                let (dir, base) = qualified.rsplit_once('/').unwrap_or(("", qualified.as_str()));
                let basename = if partial {
                    format!("_{base}")
                } else {
                    base.to_string()
                };

                for format in formats {
                    for extension in self.config.extensions_for(*format) {
                        let mut path = root.clone();
                        if !dir.is_empty() {
                            path.push(dir);
                        }
                        path.push(format!("{basename}.{extension}"));

                        if !path.is_file() {
                            continue;
                        }
                        let source = match fs::read_to_string(&path) {
                            Ok(source) => source,
                            Err(err) => {
                                debug!("unreadable template candidate {}: {err}", path.display());
                                continue;
                            }
                        };
                        let identifier = path.canonicalize().unwrap_or(path);
                        debug!(
                            "resolved '{name}' (partial: {partial}, format: {format}) to {}",
                            identifier.display()
                        );
                        return Some(Template {
                            identifier,
                            logical_name: logical_name(&qualified),
                            source,
                            format: *format,
                        });
                    }
                }
            }
        }
        debug!("no template for '{name}' (partial: {partial})");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn workspace() -> (TempDir, TemplateFinder) {
        let temp = tempdir().unwrap();
        let views = temp.path().join("views");
        let components = temp.path().join("components");
        fs::create_dir_all(views.join("shared")).unwrap();
        fs::create_dir_all(&components).unwrap();

        fs::write(views.join("home.html.erb"), "<h1>home</h1>").unwrap();
        fs::write(views.join("shared/_header.html.erb"), "<header/>").unwrap();
        fs::write(components.join("badge_component.rb"), "class BadgeComponent; end").unwrap();

        let config = TrackerConfig {
            view_roots: vec![views],
            component_root: Some(components),
            ..Default::default()
        };
        let finder = TemplateFinder::new(config);
        (temp, finder)
    }

    #[test]
    fn test_find_template() {
        let (_temp, finder) = workspace();
        let template = finder.find("home", &[], false, TemplateFormat::RENDERED).unwrap();
        assert_eq!(template.logical_name, "home");
        assert_eq!(template.format, TemplateFormat::Html);
        assert!(template.source.contains("home"));
    }

    #[test]
    fn test_find_partial_adds_underscore() {
        let (_temp, finder) = workspace();
        let template =
            finder.find("shared/header", &[], true, TemplateFormat::RENDERED).unwrap();
        assert!(template.identifier.ends_with("shared/_header.html.erb"));
        assert_eq!(template.logical_name, "shared/header");
    }

    #[test]
    fn test_find_with_prefix() {
        let (_temp, finder) = workspace();
        let template = finder
            .find("header", &["shared".to_string()], true, TemplateFormat::RENDERED)
            .unwrap();
        assert_eq!(template.logical_name, "shared/header");
    }

    #[test]
    fn test_find_component_source() {
        let (_temp, finder) = workspace();
        let template = finder.find_component_source("badge_component").unwrap();
        assert_eq!(template.format, TemplateFormat::Source);
        assert!(template.identifier.ends_with("badge_component.rb"));
    }

    #[test]
    fn test_component_scope_excluded_from_view_lookup() {
        let (_temp, finder) = workspace();
        assert!(finder.find("badge_component", &[], false, TemplateFormat::RENDERED).is_none());
    }

    #[test]
    fn test_missing_template() {
        let (_temp, finder) = workspace();
        assert!(finder.find("nope", &[], false, TemplateFormat::RENDERED).is_none());
    }

    #[test]
    fn test_cached_find_misses_new_file() {
        let (temp, finder) = workspace();
        assert!(finder.find("late", &[], false, TemplateFormat::RENDERED).is_none());

        fs::write(temp.path().join("views/late.html.erb"), "late").unwrap();
        // The cached miss is still served...
        assert!(finder.find("late", &[], false, TemplateFormat::RENDERED).is_none());
        // ...while a fresh lookup observes the new file and refreshes the cache.
        assert!(finder.find_fresh("late", &[], false, TemplateFormat::RENDERED).is_some());
        assert!(finder.find("late", &[], false, TemplateFormat::RENDERED).is_some());
    }

    #[test]
    fn test_known_names() {
        let (_temp, finder) = workspace();
        let names = finder.known_names();
        assert!(names.contains(&"home".to_string()));
        assert!(names.contains(&"shared/header".to_string()));
        assert!(names.contains(&"badge_component".to_string()));
    }
}
