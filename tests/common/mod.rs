//! Common test utilities and fixtures for viewgraph integration tests.
//!
//! This module consolidates the template-workspace setup used across the
//! integration suite: a temporary directory holding a view root and a
//! component root, plus helpers to drop files into them and to construct
//! the finder/registry stack over the result.

// Allow dead code because these utilities are shared across test files and
// not every test file uses every helper.
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use viewgraph::{ComponentClass, ComponentRegistry, TemplateFinder, TrackerConfig};

/// A disposable template workspace: `views/` and `components/` under a
/// temporary directory.
pub struct TestWorkspace {
    _temp: TempDir,
    views: PathBuf,
    components: PathBuf,
    pub registry: ComponentRegistry,
}

impl TestWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp workspace")?;
        let views = temp.path().join("views");
        let components = temp.path().join("components");
        fs::create_dir_all(&views)?;
        fs::create_dir_all(&components)?;
        Ok(Self {
            _temp: temp,
            views,
            components,
            registry: ComponentRegistry::new(),
        })
    }

    /// Write a template under the view root, creating directories as needed.
    pub fn write_view(&self, relative: &str, source: &str) -> Result<()> {
        let path = self.views.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, source)
            .with_context(|| format!("Failed to write view template: {}", path.display()))?;
        Ok(())
    }

    /// Write a component source file under the component root.
    pub fn write_component(&self, relative: &str, source: &str) -> Result<()> {
        let path = self.components.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, source)
            .with_context(|| format!("Failed to write component source: {}", path.display()))?;
        Ok(())
    }

    /// Register a root-level component class.
    pub fn register(&mut self, name: &str) {
        self.registry.register(ComponentClass::new(name));
    }

    /// Register a component class with a superclass.
    pub fn register_child(&mut self, name: &str, parent: &str) {
        self.registry.register(ComponentClass::with_parent(name, parent));
    }

    /// Tracker configuration pointing at this workspace's roots.
    pub fn config(&self) -> TrackerConfig {
        TrackerConfig {
            view_roots: vec![self.views.clone()],
            component_root: Some(self.components.clone()),
            ..Default::default()
        }
    }

    /// A fresh finder over this workspace.
    pub fn finder(&self) -> TemplateFinder {
        TemplateFinder::new(self.config())
    }
}

/// Install a test subscriber so `RUST_LOG=viewgraph=debug` surfaces tracker
/// diagnostics while debugging a failing test. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
