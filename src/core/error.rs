//! Error handling for viewgraph.
//!
//! The error surface of this crate is deliberately narrow. Per-reference
//! resolution failures are absorbed during graph construction and degrade to
//! missing placeholder nodes; the only failure a digest request propagates is
//! the root template itself being unresolvable, which indicates the caller
//! asked to cache a template that does not exist.
//!
//! # Error Categories
//!
//! - **Root resolution**: [`TrackerError::RootNotFound`] - the digested
//!   template could not be located at all. Fatal to the single request.
//! - **Configuration**: [`TrackerError::Config`],
//!   [`TrackerError::ConfigParse`] - invalid or unparseable tracker
//!   configuration.
//! - **I/O**: [`TrackerError::Io`] - filesystem failures surfaced while
//!   loading configuration, converted from [`std::io::Error`].
//!
//! Functions that can fail return [`anyhow::Result`] and attach context at
//! I/O and parse boundaries; callers that need to branch on the failure mode
//! can downcast to [`TrackerError`].

use thiserror::Error;

/// The error type for viewgraph operations.
///
/// # Examples
///
/// ```rust,no_run
/// use viewgraph::TrackerError;
///
/// fn handle(err: anyhow::Error) {
///     match err.downcast_ref::<TrackerError>() {
///         Some(TrackerError::RootNotFound { name }) => {
///             eprintln!("cannot digest '{name}': template does not exist");
///         }
///         _ => eprintln!("unexpected error: {err:#}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The template explicitly requested for digesting does not exist.
    ///
    /// Child references that fail to resolve become missing placeholder
    /// nodes instead; only the root surfaces as an error.
    #[error("template not found for digesting: '{name}'")]
    RootNotFound {
        /// The name the caller asked to digest.
        name: String,
    },

    /// Tracker configuration is structurally invalid.
    #[error("invalid tracker configuration: {reason}")]
    Config {
        /// Human-readable validation failure.
        reason: String,
    },

    /// Tracker configuration file could not be parsed as TOML.
    #[error("failed to parse tracker configuration")]
    ConfigParse(#[from] toml::de::Error),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
